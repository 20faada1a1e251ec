//! Handleが使うネイティブのVulkanの関数群をまとめたRawDeviceトレイトと、
//! そのashによる実装AshDeviceを定義する。
//!
//! 各HandleはVulkanの関数を直接呼ばずに必ずRawDeviceを経由する。
//! 作成関数はステータスコードと新しいハンドルを返し、破棄関数は何も返さない。

use ash::{extensions::khr::Swapchain, prelude::VkResult, vk};

/// gpu-allocatorの作成に必要なashのオブジェクト
#[derive(Clone, Copy)]
pub struct AshContext<'a> {
    /// ash::Instance
    pub instance: &'a ash::Instance,
    /// ash::Device
    pub device: &'a ash::Device,
    /// vk::PhysicalDevice
    pub physical_device: vk::PhysicalDevice,
}

/// 論理デバイスに対するネイティブのVulkanの関数群
///
/// ## Safety
/// 各関数はVulkanの関数をそのまま呼び出すので、Vulkanの仕様上の制約をすべて満たす必要がある。
#[allow(missing_docs)]
pub trait RawDevice: Send + Sync + 'static {
    /// vk::Deviceを取得する
    fn handle(&self) -> vk::Device;

    /// ashで実装されている場合はashのオブジェクトを返す
    fn ash_context(&self) -> Option<AshContext<'_>> {
        None
    }

    // device

    unsafe fn destroy_device(&self);
    unsafe fn device_wait_idle(&self) -> VkResult<()>;

    // queue

    unsafe fn get_device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue;
    unsafe fn queue_submit(
        &self,
        queue: vk::Queue,
        submits: &[vk::SubmitInfo],
        fence: vk::Fence,
    ) -> VkResult<()>;
    unsafe fn queue_wait_idle(&self, queue: vk::Queue) -> VkResult<()>;

    // memory

    unsafe fn allocate_memory(&self, info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory>;
    unsafe fn free_memory(&self, memory: vk::DeviceMemory);

    // buffer

    unsafe fn create_buffer(&self, info: &vk::BufferCreateInfo) -> VkResult<vk::Buffer>;
    unsafe fn destroy_buffer(&self, buffer: vk::Buffer);
    unsafe fn get_buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements;
    unsafe fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> VkResult<()>;

    // image

    unsafe fn create_image(&self, info: &vk::ImageCreateInfo) -> VkResult<vk::Image>;
    unsafe fn destroy_image(&self, image: vk::Image);
    unsafe fn get_image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements;
    unsafe fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> VkResult<()>;
    unsafe fn create_image_view(&self, info: &vk::ImageViewCreateInfo)
        -> VkResult<vk::ImageView>;
    unsafe fn destroy_image_view(&self, image_view: vk::ImageView);
    unsafe fn create_sampler(&self, info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler>;
    unsafe fn destroy_sampler(&self, sampler: vk::Sampler);

    // render pass

    unsafe fn create_render_pass(&self, info: &vk::RenderPassCreateInfo)
        -> VkResult<vk::RenderPass>;
    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass);
    unsafe fn create_framebuffer(&self, info: &vk::FramebufferCreateInfo)
        -> VkResult<vk::Framebuffer>;
    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);

    // pipeline

    unsafe fn create_shader_module(
        &self,
        info: &vk::ShaderModuleCreateInfo,
    ) -> VkResult<vk::ShaderModule>;
    unsafe fn destroy_shader_module(&self, shader_module: vk::ShaderModule);
    unsafe fn create_descriptor_set_layout(
        &self,
        info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> VkResult<vk::DescriptorSetLayout>;
    unsafe fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout);
    unsafe fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout>;
    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);
    unsafe fn create_graphics_pipeline(
        &self,
        cache: vk::PipelineCache,
        info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline>;
    unsafe fn create_compute_pipeline(
        &self,
        cache: vk::PipelineCache,
        info: &vk::ComputePipelineCreateInfo,
    ) -> VkResult<vk::Pipeline>;
    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline);

    // sync

    unsafe fn create_semaphore(&self, info: &vk::SemaphoreCreateInfo) -> VkResult<vk::Semaphore>;
    unsafe fn destroy_semaphore(&self, semaphore: vk::Semaphore);
    unsafe fn create_fence(&self, info: &vk::FenceCreateInfo) -> VkResult<vk::Fence>;
    unsafe fn destroy_fence(&self, fence: vk::Fence);
    unsafe fn wait_for_fences(&self, fences: &[vk::Fence], wait_all: bool, timeout: u64)
        -> VkResult<()>;
    unsafe fn reset_fences(&self, fences: &[vk::Fence]) -> VkResult<()>;
    unsafe fn get_fence_status(&self, fence: vk::Fence) -> VkResult<bool>;

    // command pool

    unsafe fn create_command_pool(
        &self,
        info: &vk::CommandPoolCreateInfo,
    ) -> VkResult<vk::CommandPool>;
    unsafe fn destroy_command_pool(&self, command_pool: vk::CommandPool);
    unsafe fn reset_command_pool(
        &self,
        command_pool: vk::CommandPool,
        flags: vk::CommandPoolResetFlags,
    ) -> VkResult<()>;
    unsafe fn allocate_command_buffers(
        &self,
        info: &vk::CommandBufferAllocateInfo,
    ) -> VkResult<Vec<vk::CommandBuffer>>;
    unsafe fn free_command_buffers(
        &self,
        command_pool: vk::CommandPool,
        command_buffers: &[vk::CommandBuffer],
    );

    // descriptor pool

    unsafe fn create_descriptor_pool(
        &self,
        info: &vk::DescriptorPoolCreateInfo,
    ) -> VkResult<vk::DescriptorPool>;
    unsafe fn destroy_descriptor_pool(&self, descriptor_pool: vk::DescriptorPool);
    unsafe fn reset_descriptor_pool(&self, descriptor_pool: vk::DescriptorPool) -> VkResult<()>;
    unsafe fn allocate_descriptor_sets(
        &self,
        info: &vk::DescriptorSetAllocateInfo,
    ) -> VkResult<Vec<vk::DescriptorSet>>;
    unsafe fn free_descriptor_sets(
        &self,
        descriptor_pool: vk::DescriptorPool,
        descriptor_sets: &[vk::DescriptorSet],
    ) -> VkResult<()>;
    unsafe fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]);

    // swapchain

    unsafe fn create_swapchain(
        &self,
        info: &vk::SwapchainCreateInfoKHR,
    ) -> VkResult<vk::SwapchainKHR>;
    unsafe fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);
    unsafe fn get_swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;
}

/// ashで実装したRawDevice
pub struct AshDevice {
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    swapchain_loader: Swapchain,
}
impl AshDevice {
    /// vk::Deviceを作成する
    ///
    /// ## Safety
    /// device_create_infoはphysical_deviceに対して有効である必要がある。
    pub unsafe fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device_create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<Self> {
        let device = instance.create_device(physical_device, device_create_info, None)?;
        Ok(Self::from_ash(instance.clone(), physical_device, device))
    }

    /// 作成済みのash::Deviceから作成する
    pub fn from_ash(
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
    ) -> Self {
        // swapchain loader
        let swapchain_loader = Swapchain::new(&instance, &device);
        Self {
            instance,
            physical_device,
            device,
            swapchain_loader,
        }
    }
}

// パイプラインを一つだけ作成して、失敗時に作成済みのものがあれば破棄する
fn single_pipeline(
    device: &ash::Device,
    result: Result<Vec<vk::Pipeline>, (Vec<vk::Pipeline>, vk::Result)>,
) -> VkResult<vk::Pipeline> {
    match result {
        Ok(pipelines) => pipelines
            .into_iter()
            .next()
            .ok_or(vk::Result::ERROR_UNKNOWN),
        Err((pipelines, result)) => {
            for pipeline in pipelines {
                if pipeline != vk::Pipeline::null() {
                    unsafe { device.destroy_pipeline(pipeline, None) };
                }
            }
            Err(result)
        }
    }
}

impl RawDevice for AshDevice {
    fn handle(&self) -> vk::Device {
        self.device.handle()
    }

    fn ash_context(&self) -> Option<AshContext<'_>> {
        Some(AshContext {
            instance: &self.instance,
            device: &self.device,
            physical_device: self.physical_device,
        })
    }

    unsafe fn destroy_device(&self) {
        self.device.destroy_device(None)
    }
    unsafe fn device_wait_idle(&self) -> VkResult<()> {
        self.device.device_wait_idle()
    }

    unsafe fn get_device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        self.device.get_device_queue(queue_family_index, queue_index)
    }
    unsafe fn queue_submit(
        &self,
        queue: vk::Queue,
        submits: &[vk::SubmitInfo],
        fence: vk::Fence,
    ) -> VkResult<()> {
        self.device.queue_submit(queue, submits, fence)
    }
    unsafe fn queue_wait_idle(&self, queue: vk::Queue) -> VkResult<()> {
        self.device.queue_wait_idle(queue)
    }

    unsafe fn allocate_memory(&self, info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory> {
        self.device.allocate_memory(info, None)
    }
    unsafe fn free_memory(&self, memory: vk::DeviceMemory) {
        self.device.free_memory(memory, None)
    }

    unsafe fn create_buffer(&self, info: &vk::BufferCreateInfo) -> VkResult<vk::Buffer> {
        self.device.create_buffer(info, None)
    }
    unsafe fn destroy_buffer(&self, buffer: vk::Buffer) {
        self.device.destroy_buffer(buffer, None)
    }
    unsafe fn get_buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        self.device.get_buffer_memory_requirements(buffer)
    }
    unsafe fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> VkResult<()> {
        self.device.bind_buffer_memory(buffer, memory, offset)
    }

    unsafe fn create_image(&self, info: &vk::ImageCreateInfo) -> VkResult<vk::Image> {
        self.device.create_image(info, None)
    }
    unsafe fn destroy_image(&self, image: vk::Image) {
        self.device.destroy_image(image, None)
    }
    unsafe fn get_image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        self.device.get_image_memory_requirements(image)
    }
    unsafe fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> VkResult<()> {
        self.device.bind_image_memory(image, memory, offset)
    }
    unsafe fn create_image_view(
        &self,
        info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView> {
        self.device.create_image_view(info, None)
    }
    unsafe fn destroy_image_view(&self, image_view: vk::ImageView) {
        self.device.destroy_image_view(image_view, None)
    }
    unsafe fn create_sampler(&self, info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler> {
        self.device.create_sampler(info, None)
    }
    unsafe fn destroy_sampler(&self, sampler: vk::Sampler) {
        self.device.destroy_sampler(sampler, None)
    }

    unsafe fn create_render_pass(
        &self,
        info: &vk::RenderPassCreateInfo,
    ) -> VkResult<vk::RenderPass> {
        self.device.create_render_pass(info, None)
    }
    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.device.destroy_render_pass(render_pass, None)
    }
    unsafe fn create_framebuffer(
        &self,
        info: &vk::FramebufferCreateInfo,
    ) -> VkResult<vk::Framebuffer> {
        self.device.create_framebuffer(info, None)
    }
    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.device.destroy_framebuffer(framebuffer, None)
    }

    unsafe fn create_shader_module(
        &self,
        info: &vk::ShaderModuleCreateInfo,
    ) -> VkResult<vk::ShaderModule> {
        self.device.create_shader_module(info, None)
    }
    unsafe fn destroy_shader_module(&self, shader_module: vk::ShaderModule) {
        self.device.destroy_shader_module(shader_module, None)
    }
    unsafe fn create_descriptor_set_layout(
        &self,
        info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> VkResult<vk::DescriptorSetLayout> {
        self.device.create_descriptor_set_layout(info, None)
    }
    unsafe fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        self.device.destroy_descriptor_set_layout(layout, None)
    }
    unsafe fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout> {
        self.device.create_pipeline_layout(info, None)
    }
    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.device.destroy_pipeline_layout(layout, None)
    }
    unsafe fn create_graphics_pipeline(
        &self,
        cache: vk::PipelineCache,
        info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        let result =
            self.device
                .create_graphics_pipelines(cache, std::slice::from_ref(info), None);
        single_pipeline(&self.device, result)
    }
    unsafe fn create_compute_pipeline(
        &self,
        cache: vk::PipelineCache,
        info: &vk::ComputePipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        let result =
            self.device
                .create_compute_pipelines(cache, std::slice::from_ref(info), None);
        single_pipeline(&self.device, result)
    }
    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.device.destroy_pipeline(pipeline, None)
    }

    unsafe fn create_semaphore(&self, info: &vk::SemaphoreCreateInfo) -> VkResult<vk::Semaphore> {
        self.device.create_semaphore(info, None)
    }
    unsafe fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        self.device.destroy_semaphore(semaphore, None)
    }
    unsafe fn create_fence(&self, info: &vk::FenceCreateInfo) -> VkResult<vk::Fence> {
        self.device.create_fence(info, None)
    }
    unsafe fn destroy_fence(&self, fence: vk::Fence) {
        self.device.destroy_fence(fence, None)
    }
    unsafe fn wait_for_fences(
        &self,
        fences: &[vk::Fence],
        wait_all: bool,
        timeout: u64,
    ) -> VkResult<()> {
        self.device.wait_for_fences(fences, wait_all, timeout)
    }
    unsafe fn reset_fences(&self, fences: &[vk::Fence]) -> VkResult<()> {
        self.device.reset_fences(fences)
    }
    unsafe fn get_fence_status(&self, fence: vk::Fence) -> VkResult<bool> {
        self.device.get_fence_status(fence)
    }

    unsafe fn create_command_pool(
        &self,
        info: &vk::CommandPoolCreateInfo,
    ) -> VkResult<vk::CommandPool> {
        self.device.create_command_pool(info, None)
    }
    unsafe fn destroy_command_pool(&self, command_pool: vk::CommandPool) {
        self.device.destroy_command_pool(command_pool, None)
    }
    unsafe fn reset_command_pool(
        &self,
        command_pool: vk::CommandPool,
        flags: vk::CommandPoolResetFlags,
    ) -> VkResult<()> {
        self.device.reset_command_pool(command_pool, flags)
    }
    unsafe fn allocate_command_buffers(
        &self,
        info: &vk::CommandBufferAllocateInfo,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        self.device.allocate_command_buffers(info)
    }
    unsafe fn free_command_buffers(
        &self,
        command_pool: vk::CommandPool,
        command_buffers: &[vk::CommandBuffer],
    ) {
        self.device.free_command_buffers(command_pool, command_buffers)
    }

    unsafe fn create_descriptor_pool(
        &self,
        info: &vk::DescriptorPoolCreateInfo,
    ) -> VkResult<vk::DescriptorPool> {
        self.device.create_descriptor_pool(info, None)
    }
    unsafe fn destroy_descriptor_pool(&self, descriptor_pool: vk::DescriptorPool) {
        self.device.destroy_descriptor_pool(descriptor_pool, None)
    }
    unsafe fn reset_descriptor_pool(&self, descriptor_pool: vk::DescriptorPool) -> VkResult<()> {
        self.device
            .reset_descriptor_pool(descriptor_pool, vk::DescriptorPoolResetFlags::empty())
    }
    unsafe fn allocate_descriptor_sets(
        &self,
        info: &vk::DescriptorSetAllocateInfo,
    ) -> VkResult<Vec<vk::DescriptorSet>> {
        self.device.allocate_descriptor_sets(info)
    }
    unsafe fn free_descriptor_sets(
        &self,
        descriptor_pool: vk::DescriptorPool,
        descriptor_sets: &[vk::DescriptorSet],
    ) -> VkResult<()> {
        self.device
            .free_descriptor_sets(descriptor_pool, descriptor_sets)
    }
    unsafe fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]) {
        self.device.update_descriptor_sets(writes, &[])
    }

    unsafe fn create_swapchain(
        &self,
        info: &vk::SwapchainCreateInfoKHR,
    ) -> VkResult<vk::SwapchainKHR> {
        self.swapchain_loader.create_swapchain(info, None)
    }
    unsafe fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.swapchain_loader.destroy_swapchain(swapchain, None)
    }
    unsafe fn get_swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        self.swapchain_loader.get_swapchain_images(swapchain)
    }
}
