//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Deviceの破棄の処理まで行うDeviceHandleを定義する。
//!
//! 各Handleの作成関数はDeviceHandleにまとめてある。

use crate::{AshContext, Error, RawDevice, Result};
use ash::vk;

/// 論理デバイスと、ネイティブの関数を呼び出すRawDevice
pub struct Device {
    raw: Box<dyn RawDevice>,
    handle: vk::Device,
    instance: Option<crate::InstanceHandle>,
}
impl crate::Resource for Device {
    type Raw = vk::Device;
    const NAME: &'static str = "device";

    fn raw(&self) -> &vk::Device {
        &self.handle
    }

    unsafe fn destroy(&mut self) {
        // 子オブジェクトはすべて破棄済みだが、実行中の処理が残っていることがあるので待つ
        if let Err(result) = self.raw.device_wait_idle() {
            tracing::warn!("Failed to wait for device idle before destroying: {}", result);
        }
        self.raw.destroy_device();
    }
}

/// vk::Deviceを参照カウントで管理するためのハンドル
pub type DeviceHandle = crate::SharedHandle<Device>;

impl DeviceHandle {
    /// 外部で用意したRawDeviceからDeviceHandleを作成する
    ///
    /// RawDeviceの論理デバイスの破棄はこのHandleが行う。
    pub fn from_raw_device(raw: impl RawDevice) -> Self {
        Self::new(Device {
            handle: raw.handle(),
            raw: Box::new(raw),
            instance: None,
        })
    }

    pub(crate) fn with_instance(instance: crate::InstanceHandle, raw: impl RawDevice) -> Self {
        Self::new(Device {
            handle: raw.handle(),
            raw: Box::new(raw),
            instance: Some(instance),
        })
    }

    // create系

    /// DeviceMemoryHandleを割り当てる
    pub fn allocate_memory(
        &self,
        memory_allocate_info: &vk::MemoryAllocateInfo,
    ) -> Result<crate::DeviceMemoryHandle> {
        crate::DeviceMemory::allocate(self.clone(), memory_allocate_info)
    }

    /// AllocatorHandleを作成する
    /// ashで実装されたDeviceでのみ作成できる。
    pub fn create_allocator(&self, buffer_device_address: bool) -> Result<crate::AllocatorHandle> {
        crate::AllocatorHandle::create(self.clone(), buffer_device_address)
    }

    /// メモリをバインドしていないBufferHandleを作成する
    pub fn create_buffer(
        &self,
        buffer_create_info: &vk::BufferCreateInfo,
    ) -> Result<crate::BufferHandle> {
        crate::Buffer::create(self.clone(), buffer_create_info, |_| Ok(None))
    }

    /// DeviceMemoryにバインドしたBufferHandleを作成する
    pub fn create_buffer_bound(
        &self,
        buffer_create_info: &vk::BufferCreateInfo,
        memory: &crate::DeviceMemoryHandle,
        offset: vk::DeviceSize,
    ) -> Result<crate::BufferHandle> {
        crate::Buffer::create(
            self.clone(),
            buffer_create_info,
            |_| Ok(Some(crate::BoundMemory::memory(memory, offset))),
        )
    }

    /// メモリをバインドしていないImageHandleを作成する
    pub fn create_image(&self, image_create_info: &vk::ImageCreateInfo) -> Result<crate::ImageHandle> {
        crate::Image::create(self.clone(), image_create_info, |_| Ok(None))
    }

    /// DeviceMemoryにバインドしたImageHandleを作成する
    pub fn create_image_bound(
        &self,
        image_create_info: &vk::ImageCreateInfo,
        memory: &crate::DeviceMemoryHandle,
        offset: vk::DeviceSize,
    ) -> Result<crate::ImageHandle> {
        crate::Image::create(
            self.clone(),
            image_create_info,
            |_| Ok(Some(crate::BoundMemory::memory(memory, offset))),
        )
    }

    /// ImageViewHandleを作成する
    ///
    /// image_view_create_infoのimageは引数のimageで上書きされる。
    pub fn create_image_view(
        &self,
        image: &crate::ImageHandle,
        image_view_create_info: &vk::ImageViewCreateInfo,
    ) -> Result<crate::ImageViewHandle> {
        crate::ImageView::create(self.clone(), image, image_view_create_info)
    }

    /// SamplerHandleを作成する
    pub fn create_sampler(
        &self,
        sampler_create_info: &vk::SamplerCreateInfo,
    ) -> Result<crate::SamplerHandle> {
        crate::Sampler::create(self.clone(), sampler_create_info)
    }

    /// RenderPassHandleを作成する
    pub fn create_render_pass(
        &self,
        render_pass_create_info: &vk::RenderPassCreateInfo,
    ) -> Result<crate::RenderPassHandle> {
        crate::RenderPass::create(self.clone(), render_pass_create_info)
    }

    /// FramebufferHandleを作成する
    ///
    /// framebuffer_create_infoのrender_passとattachmentsは引数の値で上書きされる。
    pub fn create_framebuffer(
        &self,
        render_pass: &crate::RenderPassHandle,
        attachments: &[crate::ImageViewHandle],
        framebuffer_create_info: &vk::FramebufferCreateInfo,
    ) -> Result<crate::FramebufferHandle> {
        crate::Framebuffer::create(
            self.clone(),
            render_pass,
            attachments,
            framebuffer_create_info,
        )
    }

    /// ShaderModuleHandleを作成する
    pub fn create_shader_module(
        &self,
        shader_module_create_info: &vk::ShaderModuleCreateInfo,
    ) -> Result<crate::ShaderModuleHandle> {
        crate::ShaderModule::create(self.clone(), shader_module_create_info)
    }

    /// DescriptorSetLayoutHandleを作成する
    pub fn create_descriptor_set_layout(
        &self,
        descriptor_set_layout_create_info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> Result<crate::DescriptorSetLayoutHandle> {
        crate::DescriptorSetLayout::create(self.clone(), descriptor_set_layout_create_info)
    }

    /// PipelineLayoutHandleを作成する
    pub fn create_pipeline_layout(
        &self,
        set_layouts: &[crate::DescriptorSetLayoutHandle],
        push_constant_ranges: &[vk::PushConstantRange],
    ) -> Result<crate::PipelineLayoutHandle> {
        crate::PipelineLayout::create(self.clone(), set_layouts, push_constant_ranges)
    }

    /// グラフィックスのPipelineHandleを作成する
    ///
    /// graphics_pipeline_create_infoのstages、layout、render_pass、subpassは
    /// 引数の値で上書きされる。
    pub fn create_graphics_pipeline(
        &self,
        layout: &crate::PipelineLayoutHandle,
        render_pass: &crate::RenderPassHandle,
        subpass: u32,
        stages: &[crate::ShaderStageDesc],
        graphics_pipeline_create_info: &vk::GraphicsPipelineCreateInfo,
    ) -> Result<crate::PipelineHandle> {
        crate::Pipeline::create_graphics(
            self.clone(),
            layout,
            render_pass,
            subpass,
            stages,
            graphics_pipeline_create_info,
        )
    }

    /// コンピュートのPipelineHandleを作成する
    pub fn create_compute_pipeline(
        &self,
        layout: &crate::PipelineLayoutHandle,
        stage: &crate::ShaderStageDesc,
    ) -> Result<crate::PipelineHandle> {
        crate::Pipeline::create_compute(self.clone(), layout, stage)
    }

    /// SemaphoreHandleを作成する
    pub fn create_semaphore(
        &self,
        semaphore_create_info: &vk::SemaphoreCreateInfo,
    ) -> Result<crate::SemaphoreHandle> {
        crate::Semaphore::create(self.clone(), semaphore_create_info)
    }

    /// FenceHandleを作成する
    pub fn create_fence(&self, flags: crate::Flags<crate::FenceCreate>) -> Result<crate::FenceHandle> {
        crate::Fence::create(self.clone(), flags)
    }

    /// SwapchainHandleを作成する
    ///
    /// swapchain_create_infoのsurfaceは引数のsurfaceで上書きされる。
    pub fn create_swapchain(
        &self,
        surface: &crate::SurfaceHandle,
        swapchain_create_info: &vk::SwapchainCreateInfoKHR,
    ) -> Result<crate::SwapchainHandle> {
        crate::Swapchain::create(self.clone(), surface, swapchain_create_info)
    }

    /// DescriptorPoolを作成する
    pub fn create_descriptor_pool(
        &self,
        max_sets: u32,
        pool_sizes: &[vk::DescriptorPoolSize],
        flags: crate::Flags<crate::DescriptorPoolCreate>,
    ) -> Result<crate::DescriptorPool> {
        crate::DescriptorPool::create(self.clone(), max_sets, pool_sizes, flags)
    }

    // 他のDeviceの関数

    /// Queueを取得する
    pub fn get_queue(&self, queue_family_index: u32, queue_index: u32) -> crate::Queue {
        crate::Queue::get(self.clone(), queue_family_index, queue_index)
    }

    /// Deviceがアイドル状態になるまで待つ
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.raw_device().device_wait_idle() }.map_err(Error::vulkan("vkDeviceWaitIdle"))
    }

    // raw

    /// InstanceHandleを取得する
    /// from_raw_deviceで作成した場合はNoneになる。
    pub fn instance(&self) -> Option<crate::InstanceHandle> {
        self.resource().instance.clone()
    }

    /// ネイティブの関数を呼び出すRawDeviceを取得する
    pub fn raw_device(&self) -> &dyn RawDevice {
        self.resource().raw.as_ref()
    }

    /// ashで実装されたDeviceであればashのオブジェクトを取得する
    pub fn ash_context(&self) -> Option<AshContext<'_>> {
        self.raw_device().ash_context()
    }
}
