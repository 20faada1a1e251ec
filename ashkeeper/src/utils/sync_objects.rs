use crate::{FenceCreate, Result};
use ash::vk;

/// Fenceを作成する関数
pub fn create_fence(device: &crate::DeviceHandle) -> Result<crate::FenceHandle> {
    device.create_fence(Default::default())
}

/// シグナル状態のFenceを作成する関数
pub fn create_signaled_fence(device: &crate::DeviceHandle) -> Result<crate::FenceHandle> {
    device.create_fence(FenceCreate::Signaled.into())
}

/// Semaphoreを作成する関数
pub fn create_semaphore(device: &crate::DeviceHandle) -> Result<crate::SemaphoreHandle> {
    let create_info = vk::SemaphoreCreateInfo::builder();
    device.create_semaphore(&create_info)
}
