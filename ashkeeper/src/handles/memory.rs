//! 参照カウンタで管理して、参照がすべて破棄された際に
//! DeviceMemoryの解放の処理まで行うDeviceMemoryHandleと、
//! BufferやImageにバインドしたメモリを表すBoundMemoryを定義する。

use crate::{Error, Result};
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::{ffi::c_void, ptr::NonNull};

/// vk::DeviceMemory
pub struct DeviceMemory {
    device: crate::DeviceHandle,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
}
impl DeviceMemory {
    pub(crate) fn allocate(
        device: crate::DeviceHandle,
        memory_allocate_info: &vk::MemoryAllocateInfo,
    ) -> Result<crate::DeviceMemoryHandle> {
        let memory = unsafe { device.raw_device().allocate_memory(memory_allocate_info) }
            .map_err(Error::allocation("memory"))?;
        Ok(crate::SharedHandle::new(Self {
            device,
            memory,
            size: memory_allocate_info.allocation_size,
        }))
    }
}
impl crate::Resource for DeviceMemory {
    type Raw = vk::DeviceMemory;
    const NAME: &'static str = "memory";

    fn raw(&self) -> &vk::DeviceMemory {
        &self.memory
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().free_memory(self.memory);
    }
}

/// vk::DeviceMemoryを参照カウントで管理するためのハンドル
pub type DeviceMemoryHandle = crate::SharedHandle<DeviceMemory>;

impl DeviceMemoryHandle {
    /// 割り当てたサイズ
    pub fn size(&self) -> vk::DeviceSize {
        self.resource().size
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}

/// BufferやImageにバインドされたメモリ
///
/// DeviceMemoryHandleの場合は参照を保持するだけで、
/// gpu-allocatorのAllocationの場合はBufferやImageの破棄の直後に解放する。
pub enum BoundMemory {
    /// DeviceMemoryHandleの一部
    Memory {
        /// バインドしたメモリ
        memory: DeviceMemoryHandle,
        /// メモリ内のオフセット
        offset: vk::DeviceSize,
    },
    /// gpu-allocatorで割り当てたメモリ
    Allocation {
        /// 割り当てたAllocator
        allocator: crate::AllocatorHandle,
        /// 解放済みの場合はNone
        allocation: Option<Allocation>,
    },
}
impl BoundMemory {
    pub(crate) fn memory(memory: &DeviceMemoryHandle, offset: vk::DeviceSize) -> Self {
        Self::Memory {
            memory: memory.clone(),
            offset,
        }
    }

    pub(crate) fn allocation(allocator: &crate::AllocatorHandle, allocation: Allocation) -> Self {
        Self::Allocation {
            allocator: allocator.clone(),
            allocation: Some(allocation),
        }
    }

    /// バインドに使うvk::DeviceMemoryとオフセット
    pub fn binding(&self) -> (vk::DeviceMemory, vk::DeviceSize) {
        match self {
            Self::Memory { memory, offset } => (memory.raw(), *offset),
            Self::Allocation {
                allocation: Some(allocation),
                ..
            } => (unsafe { allocation.memory() }, allocation.offset()),
            Self::Allocation { allocation: None, .. } => (vk::DeviceMemory::null(), 0),
        }
    }

    /// gpu-allocatorのAllocationでマップされていればホストから見えるポインタを取得する
    pub fn mapped_ptr(&self) -> Option<NonNull<c_void>> {
        match self {
            Self::Allocation {
                allocation: Some(allocation),
                ..
            } => allocation.mapped_ptr(),
            _ => None,
        }
    }

    // Allocationを解放する。DeviceMemoryHandleの場合は何もしない。
    pub(crate) fn release(&mut self) {
        if let Self::Allocation {
            allocator,
            allocation,
        } = self
        {
            if let Some(allocation) = allocation.take() {
                allocator.free(allocation);
            }
        }
    }
}
