//! 参照カウンタで管理して、参照がすべて破棄された際に
//! ImageViewの破棄の処理まで行うImageViewHandleを定義する。

use crate::{Error, Result};
use ash::vk;

// ImageViewが参照しているimageの所有者
enum ViewTarget {
    Image(crate::ImageHandle),
    Swapchain(crate::SwapchainHandle),
}

/// vk::ImageViewと、参照しているImage
pub struct ImageView {
    device: crate::DeviceHandle,
    target: ViewTarget,
    image_view: vk::ImageView,
}
impl ImageView {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        image: &crate::ImageHandle,
        image_view_create_info: &vk::ImageViewCreateInfo,
    ) -> Result<crate::ImageViewHandle> {
        Self::create_for(
            device,
            ViewTarget::Image(image.clone()),
            image.raw(),
            image_view_create_info,
        )
    }

    pub(crate) fn create_for_swapchain(
        swapchain: &crate::SwapchainHandle,
        image: vk::Image,
        image_view_create_info: &vk::ImageViewCreateInfo,
    ) -> Result<crate::ImageViewHandle> {
        Self::create_for(
            swapchain.device(),
            ViewTarget::Swapchain(swapchain.clone()),
            image,
            image_view_create_info,
        )
    }

    fn create_for(
        device: crate::DeviceHandle,
        target: ViewTarget,
        image: vk::Image,
        image_view_create_info: &vk::ImageViewCreateInfo,
    ) -> Result<crate::ImageViewHandle> {
        let image_view_create_info = vk::ImageViewCreateInfo {
            image,
            ..*image_view_create_info
        };
        let image_view = unsafe { device.raw_device().create_image_view(&image_view_create_info) }
            .map_err(Error::creation("image view"))?;
        Ok(crate::SharedHandle::new(Self {
            device,
            target,
            image_view,
        }))
    }
}
impl crate::Resource for ImageView {
    type Raw = vk::ImageView;
    const NAME: &'static str = "image view";

    fn raw(&self) -> &vk::ImageView {
        &self.image_view
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_image_view(self.image_view);
    }
}

/// vk::ImageViewを参照カウントで管理するためのハンドル
pub type ImageViewHandle = crate::SharedHandle<ImageView>;

impl ImageViewHandle {
    /// ImageHandleから作成した場合はImageHandleを取得する
    pub fn image(&self) -> Option<crate::ImageHandle> {
        match &self.resource().target {
            ViewTarget::Image(image) => Some(image.clone()),
            ViewTarget::Swapchain(_) => None,
        }
    }

    /// Swapchainのimageから作成した場合はSwapchainHandleを取得する
    pub fn swapchain(&self) -> Option<crate::SwapchainHandle> {
        match &self.resource().target {
            ViewTarget::Image(_) => None,
            ViewTarget::Swapchain(swapchain) => Some(swapchain.clone()),
        }
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
