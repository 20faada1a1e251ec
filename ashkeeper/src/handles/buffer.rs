//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Bufferの破棄の処理まで行うBufferHandleを定義する。

use crate::{Error, Result};
use ash::vk;
use std::{ffi::c_void, ptr::NonNull};

/// vk::Bufferと、バインドしたメモリ
pub struct Buffer {
    device: crate::DeviceHandle,
    buffer: vk::Buffer,
    size: vk::DeviceSize,
    memory: Option<crate::BoundMemory>,
}
impl Buffer {
    // bufferを作成して、memoryが返したメモリをバインドする
    // 途中で失敗した場合は作成したbufferを破棄する
    pub(crate) fn create(
        device: crate::DeviceHandle,
        buffer_create_info: &vk::BufferCreateInfo,
        memory: impl FnOnce(vk::MemoryRequirements) -> Result<Option<crate::BoundMemory>>,
    ) -> Result<crate::BufferHandle> {
        let buffer = unsafe { device.raw_device().create_buffer(buffer_create_info) }
            .map_err(Error::creation("buffer"))?;
        let mut pending = crate::PendingHandle::new(Self {
            device,
            buffer,
            size: buffer_create_info.size,
            memory: None,
        });

        let resource = pending.resource_mut();
        let requirements = unsafe {
            resource
                .device
                .raw_device()
                .get_buffer_memory_requirements(buffer)
        };
        if let Some(memory) = memory(requirements)? {
            let (device_memory, offset) = memory.binding();
            resource.memory = Some(memory);
            unsafe {
                resource
                    .device
                    .raw_device()
                    .bind_buffer_memory(buffer, device_memory, offset)
            }
            .map_err(Error::vulkan("vkBindBufferMemory"))?;
        }

        Ok(pending.share())
    }
}
impl crate::Resource for Buffer {
    type Raw = vk::Buffer;
    const NAME: &'static str = "buffer";

    fn raw(&self) -> &vk::Buffer {
        &self.buffer
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_buffer(self.buffer);
        if let Some(memory) = self.memory.as_mut() {
            memory.release();
        }
    }
}

/// vk::Bufferを参照カウントで管理するためのハンドル
pub type BufferHandle = crate::SharedHandle<Buffer>;

impl BufferHandle {
    // Bufferの関数

    /// Bufferのメモリ要件を取得する
    pub fn get_buffer_memory_requirements(&self) -> vk::MemoryRequirements {
        unsafe {
            self.device()
                .raw_device()
                .get_buffer_memory_requirements(self.raw())
        }
    }

    /// 作成時のサイズ
    pub fn size(&self) -> vk::DeviceSize {
        self.resource().size
    }

    /// バインドしたメモリ
    pub fn memory(&self) -> Option<&crate::BoundMemory> {
        self.resource().memory.as_ref()
    }

    /// ホストから見えるメモリにバインドされていればそのポインタを取得する
    pub fn mapped_ptr(&self) -> Option<NonNull<c_void>> {
        self.memory().and_then(|memory| memory.mapped_ptr())
    }

    // raw

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
