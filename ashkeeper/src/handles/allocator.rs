//! gpu-allocatorのAllocatorを保持するハンドルを定義する。
//! AllocatorはDeviceHandleよりも先に破棄される。

use crate::{Error, Result};
use ash::vk;
use gpu_allocator::{
    vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc},
    MemoryLocation,
};
use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

struct AllocatorHandleData {
    // deviceより先にDropする
    allocator: Mutex<Allocator>,
    device: crate::DeviceHandle,
}

/// gpu_allocatorのAllocatorを参照カウントで管理するためのハンドル
#[derive(Clone)]
pub struct AllocatorHandle {
    data: Arc<AllocatorHandleData>,
}
impl AllocatorHandle {
    pub(crate) fn create(device: crate::DeviceHandle, buffer_device_address: bool) -> Result<Self> {
        let context = device
            .ash_context()
            .ok_or(Error::InvalidHandle("allocator requires an ash device"))?;
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: context.instance.clone(),
            device: context.device.clone(),
            physical_device: context.physical_device,
            debug_settings: Default::default(),
            buffer_device_address,
            allocation_sizes: Default::default(),
        })?;

        Ok(Self {
            data: Arc::new(AllocatorHandleData {
                allocator: Mutex::new(allocator),
                device,
            }),
        })
    }

    // create系

    /// メモリを割り当ててバインドしたBufferHandleを作成する
    pub fn create_buffer(
        &self,
        buffer_create_info: &vk::BufferCreateInfo,
        location: MemoryLocation,
        name: &str,
    ) -> Result<crate::BufferHandle> {
        crate::Buffer::create(self.device(), buffer_create_info, |requirements| {
            let allocation = self.allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear: true,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })?;
            Ok(Some(crate::BoundMemory::allocation(self, allocation)))
        })
    }

    /// メモリを割り当ててバインドしたImageHandleを作成する
    pub fn create_image(
        &self,
        image_create_info: &vk::ImageCreateInfo,
        location: MemoryLocation,
        name: &str,
    ) -> Result<crate::ImageHandle> {
        let linear = image_create_info.tiling == vk::ImageTiling::LINEAR;
        crate::Image::create(self.device(), image_create_info, |requirements| {
            let allocation = self.allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })?;
            Ok(Some(crate::BoundMemory::allocation(self, allocation)))
        })
    }

    // Allocatorの関数

    /// Allocationを割り当てる
    pub fn allocate(&self, allocation_create_desc: &AllocationCreateDesc) -> Result<Allocation> {
        Ok(self.lock().allocate(allocation_create_desc)?)
    }

    /// Allocationを解放する
    /// 解放の失敗は返さずにログに残す。
    pub fn free(&self, allocation: Allocation) {
        tracing::debug!("Freeing allocation {:?}", unsafe { allocation.memory() });
        if let Err(err) = self.lock().free(allocation) {
            tracing::error!("Failed to free allocation: {}", err);
        }
    }

    // raw

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.data.device.clone()
    }

    /// Allocatorをロックして取得する
    pub fn lock(&self) -> MutexGuard<'_, Allocator> {
        self.data
            .allocator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// Debugトレイトの実装
impl Debug for AllocatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocatorHandle")
            .field("device", &self.data.device)
            .finish()
    }
}
