//! テスト用のRawDevice。
//! GPUを使わずに、作成・破棄・解放の呼び出しを記録する。

use crate::{DeviceHandle, RawDevice};
use ash::{
    prelude::VkResult,
    vk::{self, Handle},
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

/// 記録されたネイティブの呼び出し
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    Create(&'static str, u64),
    Destroy(&'static str, u64),
    Free(&'static str, u64),
    Bind(&'static str, u64, u64),
    Reset(&'static str, u64),
    Allocate(&'static str, u32),
    WaitIdle(&'static str),
    Submit(u64),
}

#[derive(Default)]
pub(crate) struct MockLog {
    calls: Mutex<Vec<Call>>,
    next_handle: AtomicU64,
    failures: Mutex<HashMap<&'static str, vk::Result>>,
    // descriptor poolごとの(max_sets, 割り当て済みの数)
    descriptor_pools: Mutex<HashMap<u64, (u32, u32)>>,
}
impl MockLog {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn created(&self, kind: &str) -> Vec<u64> {
        self.filter(|call| match call {
            Call::Create(k, raw) if k == kind => Some(raw),
            _ => None,
        })
    }

    pub(crate) fn destroyed(&self, kind: &str) -> Vec<u64> {
        self.filter(|call| match call {
            Call::Destroy(k, raw) if k == kind => Some(raw),
            _ => None,
        })
    }

    pub(crate) fn freed(&self, kind: &str) -> Vec<u64> {
        self.filter(|call| match call {
            Call::Free(k, raw) if k == kind => Some(raw),
            _ => None,
        })
    }

    /// 指定した種類の次の作成を失敗させる
    pub(crate) fn fail_next(&self, kind: &'static str, result: vk::Result) {
        self.failures.lock().unwrap().insert(kind, result);
    }

    /// 呼び出しの順番を取得する
    pub(crate) fn position(&self, call: Call) -> Option<usize> {
        self.calls().iter().position(|c| *c == call)
    }

    fn filter(&self, f: impl Fn(Call) -> Option<u64>) -> Vec<u64> {
        self.calls().into_iter().filter_map(f).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, kind: &'static str) -> VkResult<()> {
        match self.failures.lock().unwrap().remove(kind) {
            Some(result) => Err(result),
            None => Ok(()),
        }
    }

    fn next(&self) -> u64 {
        0x1000 + self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    fn create<H: Handle>(&self, kind: &'static str) -> VkResult<H> {
        self.check_failure(kind)?;
        let raw = self.next();
        self.record(Call::Create(kind, raw));
        Ok(H::from_raw(raw))
    }

    fn destroy<H: Handle>(&self, kind: &'static str, handle: H) {
        self.record(Call::Destroy(kind, handle.as_raw()));
    }
}

pub(crate) struct MockDevice {
    log: Arc<MockLog>,
}

/// MockDeviceを使ったDeviceHandleを作成する
pub(crate) fn device() -> (DeviceHandle, Arc<MockLog>) {
    let log = Arc::new(MockLog::default());
    let device = DeviceHandle::from_raw_device(MockDevice { log: log.clone() });
    (device, log)
}

const REQUIREMENTS: vk::MemoryRequirements = vk::MemoryRequirements {
    size: 256,
    alignment: 16,
    memory_type_bits: !0,
};

impl RawDevice for MockDevice {
    fn handle(&self) -> vk::Device {
        vk::Device::from_raw(1)
    }

    unsafe fn destroy_device(&self) {
        self.log.destroy("device", self.handle());
    }
    unsafe fn device_wait_idle(&self) -> VkResult<()> {
        self.log.record(Call::WaitIdle("device"));
        Ok(())
    }

    unsafe fn get_device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        vk::Queue::from_raw(0x100 + (queue_family_index as u64) * 16 + queue_index as u64)
    }
    unsafe fn queue_submit(
        &self,
        queue: vk::Queue,
        _submits: &[vk::SubmitInfo],
        _fence: vk::Fence,
    ) -> VkResult<()> {
        self.log.check_failure("submit")?;
        self.log.record(Call::Submit(queue.as_raw()));
        Ok(())
    }
    unsafe fn queue_wait_idle(&self, _queue: vk::Queue) -> VkResult<()> {
        self.log.record(Call::WaitIdle("queue"));
        Ok(())
    }

    unsafe fn allocate_memory(&self, _info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory> {
        self.log.create("memory")
    }
    unsafe fn free_memory(&self, memory: vk::DeviceMemory) {
        self.log.destroy("memory", memory)
    }

    unsafe fn create_buffer(&self, _info: &vk::BufferCreateInfo) -> VkResult<vk::Buffer> {
        self.log.create("buffer")
    }
    unsafe fn destroy_buffer(&self, buffer: vk::Buffer) {
        self.log.destroy("buffer", buffer)
    }
    unsafe fn get_buffer_memory_requirements(&self, _buffer: vk::Buffer) -> vk::MemoryRequirements {
        REQUIREMENTS
    }
    unsafe fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        _offset: vk::DeviceSize,
    ) -> VkResult<()> {
        self.log.check_failure("bind")?;
        self.log
            .record(Call::Bind("buffer", buffer.as_raw(), memory.as_raw()));
        Ok(())
    }

    unsafe fn create_image(&self, _info: &vk::ImageCreateInfo) -> VkResult<vk::Image> {
        self.log.create("image")
    }
    unsafe fn destroy_image(&self, image: vk::Image) {
        self.log.destroy("image", image)
    }
    unsafe fn get_image_memory_requirements(&self, _image: vk::Image) -> vk::MemoryRequirements {
        REQUIREMENTS
    }
    unsafe fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        _offset: vk::DeviceSize,
    ) -> VkResult<()> {
        self.log.check_failure("bind")?;
        self.log
            .record(Call::Bind("image", image.as_raw(), memory.as_raw()));
        Ok(())
    }
    unsafe fn create_image_view(
        &self,
        _info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView> {
        self.log.create("image view")
    }
    unsafe fn destroy_image_view(&self, image_view: vk::ImageView) {
        self.log.destroy("image view", image_view)
    }
    unsafe fn create_sampler(&self, _info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler> {
        self.log.create("sampler")
    }
    unsafe fn destroy_sampler(&self, sampler: vk::Sampler) {
        self.log.destroy("sampler", sampler)
    }

    unsafe fn create_render_pass(
        &self,
        _info: &vk::RenderPassCreateInfo,
    ) -> VkResult<vk::RenderPass> {
        self.log.create("render pass")
    }
    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.log.destroy("render pass", render_pass)
    }
    unsafe fn create_framebuffer(
        &self,
        _info: &vk::FramebufferCreateInfo,
    ) -> VkResult<vk::Framebuffer> {
        self.log.create("framebuffer")
    }
    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.log.destroy("framebuffer", framebuffer)
    }

    unsafe fn create_shader_module(
        &self,
        _info: &vk::ShaderModuleCreateInfo,
    ) -> VkResult<vk::ShaderModule> {
        self.log.create("shader module")
    }
    unsafe fn destroy_shader_module(&self, shader_module: vk::ShaderModule) {
        self.log.destroy("shader module", shader_module)
    }
    unsafe fn create_descriptor_set_layout(
        &self,
        _info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> VkResult<vk::DescriptorSetLayout> {
        self.log.create("descriptor set layout")
    }
    unsafe fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        self.log.destroy("descriptor set layout", layout)
    }
    unsafe fn create_pipeline_layout(
        &self,
        _info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout> {
        self.log.create("pipeline layout")
    }
    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.log.destroy("pipeline layout", layout)
    }
    unsafe fn create_graphics_pipeline(
        &self,
        _cache: vk::PipelineCache,
        _info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        self.log.create("pipeline")
    }
    unsafe fn create_compute_pipeline(
        &self,
        _cache: vk::PipelineCache,
        _info: &vk::ComputePipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        self.log.create("pipeline")
    }
    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.log.destroy("pipeline", pipeline)
    }

    unsafe fn create_semaphore(&self, _info: &vk::SemaphoreCreateInfo) -> VkResult<vk::Semaphore> {
        self.log.create("semaphore")
    }
    unsafe fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        self.log.destroy("semaphore", semaphore)
    }
    unsafe fn create_fence(&self, _info: &vk::FenceCreateInfo) -> VkResult<vk::Fence> {
        self.log.create("fence")
    }
    unsafe fn destroy_fence(&self, fence: vk::Fence) {
        self.log.destroy("fence", fence)
    }
    unsafe fn wait_for_fences(
        &self,
        _fences: &[vk::Fence],
        _wait_all: bool,
        _timeout: u64,
    ) -> VkResult<()> {
        self.log.check_failure("wait fences")
    }
    unsafe fn reset_fences(&self, fences: &[vk::Fence]) -> VkResult<()> {
        for fence in fences {
            self.log.record(Call::Reset("fence", fence.as_raw()));
        }
        Ok(())
    }
    unsafe fn get_fence_status(&self, _fence: vk::Fence) -> VkResult<bool> {
        Ok(true)
    }

    unsafe fn create_command_pool(
        &self,
        _info: &vk::CommandPoolCreateInfo,
    ) -> VkResult<vk::CommandPool> {
        self.log.create("command pool")
    }
    unsafe fn destroy_command_pool(&self, command_pool: vk::CommandPool) {
        self.log.destroy("command pool", command_pool)
    }
    unsafe fn reset_command_pool(
        &self,
        command_pool: vk::CommandPool,
        _flags: vk::CommandPoolResetFlags,
    ) -> VkResult<()> {
        self.log
            .record(Call::Reset("command pool", command_pool.as_raw()));
        Ok(())
    }
    unsafe fn allocate_command_buffers(
        &self,
        info: &vk::CommandBufferAllocateInfo,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        self.log
            .record(Call::Allocate("command buffer", info.command_buffer_count));
        self.log.check_failure("command buffer")?;
        (0..info.command_buffer_count)
            .map(|_| self.log.create("command buffer"))
            .collect()
    }
    unsafe fn free_command_buffers(
        &self,
        _command_pool: vk::CommandPool,
        command_buffers: &[vk::CommandBuffer],
    ) {
        for command_buffer in command_buffers {
            self.log
                .record(Call::Free("command buffer", command_buffer.as_raw()));
        }
    }

    unsafe fn create_descriptor_pool(
        &self,
        info: &vk::DescriptorPoolCreateInfo,
    ) -> VkResult<vk::DescriptorPool> {
        let pool: vk::DescriptorPool = self.log.create("descriptor pool")?;
        self.log
            .descriptor_pools
            .lock()
            .unwrap()
            .insert(pool.as_raw(), (info.max_sets, 0));
        Ok(pool)
    }
    unsafe fn destroy_descriptor_pool(&self, descriptor_pool: vk::DescriptorPool) {
        self.log.destroy("descriptor pool", descriptor_pool)
    }
    unsafe fn reset_descriptor_pool(&self, descriptor_pool: vk::DescriptorPool) -> VkResult<()> {
        if let Some((_, used)) = self
            .log
            .descriptor_pools
            .lock()
            .unwrap()
            .get_mut(&descriptor_pool.as_raw())
        {
            *used = 0;
        }
        self.log
            .record(Call::Reset("descriptor pool", descriptor_pool.as_raw()));
        Ok(())
    }
    unsafe fn allocate_descriptor_sets(
        &self,
        info: &vk::DescriptorSetAllocateInfo,
    ) -> VkResult<Vec<vk::DescriptorSet>> {
        self.log
            .record(Call::Allocate("descriptor set", info.descriptor_set_count));
        self.log.check_failure("descriptor set")?;
        {
            let mut pools = self.log.descriptor_pools.lock().unwrap();
            let (max_sets, used) = pools
                .get_mut(&info.descriptor_pool.as_raw())
                .ok_or(vk::Result::ERROR_UNKNOWN)?;
            if *used + info.descriptor_set_count > *max_sets {
                return Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY);
            }
            *used += info.descriptor_set_count;
        }
        (0..info.descriptor_set_count)
            .map(|_| self.log.create("descriptor set"))
            .collect()
    }
    unsafe fn free_descriptor_sets(
        &self,
        descriptor_pool: vk::DescriptorPool,
        descriptor_sets: &[vk::DescriptorSet],
    ) -> VkResult<()> {
        self.log.check_failure("free descriptor set")?;
        if let Some((_, used)) = self
            .log
            .descriptor_pools
            .lock()
            .unwrap()
            .get_mut(&descriptor_pool.as_raw())
        {
            *used -= descriptor_sets.len() as u32;
        }
        for descriptor_set in descriptor_sets {
            self.log
                .record(Call::Free("descriptor set", descriptor_set.as_raw()));
        }
        Ok(())
    }
    unsafe fn update_descriptor_sets(&self, _writes: &[vk::WriteDescriptorSet]) {}

    unsafe fn create_swapchain(
        &self,
        _info: &vk::SwapchainCreateInfoKHR,
    ) -> VkResult<vk::SwapchainKHR> {
        self.log.create("swapchain")
    }
    unsafe fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.log.destroy("swapchain", swapchain)
    }
    unsafe fn get_swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        Ok(vec![
            vk::Image::from_raw(self.log.next()),
            vk::Image::from_raw(self.log.next()),
        ])
    }
}
