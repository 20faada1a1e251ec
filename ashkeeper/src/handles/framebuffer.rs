//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Framebufferの破棄の処理まで行うFramebufferHandleを定義する。
//!
//! FramebufferHandleはRenderPassHandleとattachmentのImageViewHandleを保持するので、
//! それらはFramebufferより先に破棄されない。

use crate::{Error, Result};
use ash::vk;

/// vk::Framebufferと、作成に使ったRenderPassとattachment
pub struct Framebuffer {
    device: crate::DeviceHandle,
    render_pass: crate::RenderPassHandle,
    attachments: Vec<crate::ImageViewHandle>,
    framebuffer: vk::Framebuffer,
}
impl Framebuffer {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        render_pass: &crate::RenderPassHandle,
        attachments: &[crate::ImageViewHandle],
        framebuffer_create_info: &vk::FramebufferCreateInfo,
    ) -> Result<crate::FramebufferHandle> {
        let raw_attachments = attachments.iter().map(|view| view.raw()).collect::<Vec<_>>();
        let framebuffer_create_info = vk::FramebufferCreateInfo {
            render_pass: render_pass.raw(),
            attachment_count: raw_attachments.len() as u32,
            p_attachments: raw_attachments.as_ptr(),
            ..*framebuffer_create_info
        };
        let framebuffer = unsafe { device.raw_device().create_framebuffer(&framebuffer_create_info) }
            .map_err(Error::creation("framebuffer"))?;

        Ok(crate::SharedHandle::new(Self {
            device,
            render_pass: render_pass.clone(),
            attachments: attachments.to_vec(),
            framebuffer,
        }))
    }
}
impl crate::Resource for Framebuffer {
    type Raw = vk::Framebuffer;
    const NAME: &'static str = "framebuffer";

    fn raw(&self) -> &vk::Framebuffer {
        &self.framebuffer
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_framebuffer(self.framebuffer);
    }
}

/// vk::Framebufferを参照カウントで管理するためのハンドル
pub type FramebufferHandle = crate::SharedHandle<Framebuffer>;

impl FramebufferHandle {
    /// RenderPassHandleを取得する
    pub fn render_pass(&self) -> crate::RenderPassHandle {
        self.resource().render_pass.clone()
    }

    /// attachmentのImageViewHandleを取得する
    pub fn attachments(&self) -> &[crate::ImageViewHandle] {
        &self.resource().attachments
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
