use crate::{BufferUsage, Flags, Result};
use ash::vk;

/// BufferCreateInfoを作成する関数
pub fn buffer_create_info(size: vk::DeviceSize, usage: Flags<BufferUsage>) -> vk::BufferCreateInfo {
    vk::BufferCreateInfo::builder()
        .size(size)
        .usage(usage.into())
        .sharing_mode(vk::SharingMode::EXCLUSIVE)
        .build()
}

/// CPUから書き込めるBufferを作成する関数
pub fn create_host_buffer(
    allocator: &crate::AllocatorHandle,
    size: vk::DeviceSize,
    usage: Flags<BufferUsage>,
    name: &str,
) -> Result<crate::BufferHandle> {
    allocator.create_buffer(
        &buffer_create_info(size, usage),
        gpu_allocator::MemoryLocation::CpuToGpu,
        name,
    )
}

/// GPUからだけ使うBufferを作成する関数
pub fn create_device_local_buffer(
    allocator: &crate::AllocatorHandle,
    size: vk::DeviceSize,
    usage: Flags<BufferUsage>,
    name: &str,
) -> Result<crate::BufferHandle> {
    allocator.create_buffer(
        &buffer_create_info(size, usage),
        gpu_allocator::MemoryLocation::GpuOnly,
        name,
    )
}
