//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Swapchainの破棄の処理まで行うSwapchainHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::SwapchainKHRと、作成に使ったSurface
pub struct Swapchain {
    device: crate::DeviceHandle,
    surface: crate::SurfaceHandle,
    swapchain: vk::SwapchainKHR,
    format: vk::Format,
    extent: vk::Extent2D,
}
impl Swapchain {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        surface: &crate::SurfaceHandle,
        swapchain_create_info: &vk::SwapchainCreateInfoKHR,
    ) -> Result<crate::SwapchainHandle> {
        let swapchain_create_info = vk::SwapchainCreateInfoKHR {
            surface: surface.raw(),
            ..*swapchain_create_info
        };
        let swapchain = unsafe { device.raw_device().create_swapchain(&swapchain_create_info) }
            .map_err(Error::creation("swapchain"))?;
        Ok(crate::SharedHandle::new(Self {
            device,
            surface: surface.clone(),
            swapchain,
            format: swapchain_create_info.image_format,
            extent: swapchain_create_info.image_extent,
        }))
    }
}
impl crate::Resource for Swapchain {
    type Raw = vk::SwapchainKHR;
    const NAME: &'static str = "swapchain";

    fn raw(&self) -> &vk::SwapchainKHR {
        &self.swapchain
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_swapchain(self.swapchain);
    }
}

/// vk::SwapchainKHRを参照カウントで管理するためのハンドル
pub type SwapchainHandle = crate::SharedHandle<Swapchain>;

impl SwapchainHandle {
    // swapchainの関数

    /// swapchainのイメージを取得する
    /// イメージはswapchainが所有しているので、swapchainより長く使ってはならない。
    pub fn images(&self) -> Result<Vec<vk::Image>> {
        unsafe { self.device().raw_device().get_swapchain_images(self.raw()) }
            .map_err(Error::vulkan("vkGetSwapchainImagesKHR"))
    }

    /// swapchainのイメージすべてにImageViewHandleを作成する
    /// ImageViewHandleはこのSwapchainHandleを保持する。
    pub fn create_image_views(
        &self,
        image_view_create_info: &vk::ImageViewCreateInfo,
    ) -> Result<Vec<crate::ImageViewHandle>> {
        let image_view_create_info = vk::ImageViewCreateInfo {
            format: self.format(),
            ..*image_view_create_info
        };
        self.images()?
            .into_iter()
            .map(|image| crate::ImageView::create_for_swapchain(self, image, &image_view_create_info))
            .collect()
    }

    /// 作成時のフォーマット
    pub fn format(&self) -> vk::Format {
        self.resource().format
    }

    /// 作成時のサイズ
    pub fn extent(&self) -> vk::Extent2D {
        self.resource().extent
    }

    /// SurfaceHandleを取得する
    pub fn surface(&self) -> crate::SurfaceHandle {
        self.resource().surface.clone()
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
