//! 参照カウンタで管理して、参照がすべて破棄された際に
//! RenderPassの破棄の処理まで行うRenderPassHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::RenderPass
pub struct RenderPass {
    device: crate::DeviceHandle,
    render_pass: vk::RenderPass,
    attachment_count: u32,
}
impl RenderPass {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        render_pass_create_info: &vk::RenderPassCreateInfo,
    ) -> Result<crate::RenderPassHandle> {
        let render_pass = unsafe { device.raw_device().create_render_pass(render_pass_create_info) }
            .map_err(Error::creation("render pass"))?;
        Ok(crate::SharedHandle::new(Self {
            device,
            render_pass,
            attachment_count: render_pass_create_info.attachment_count,
        }))
    }
}
impl crate::Resource for RenderPass {
    type Raw = vk::RenderPass;
    const NAME: &'static str = "render pass";

    fn raw(&self) -> &vk::RenderPass {
        &self.render_pass
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_render_pass(self.render_pass);
    }
}

/// vk::RenderPassを参照カウントで管理するためのハンドル
pub type RenderPassHandle = crate::SharedHandle<RenderPass>;

impl RenderPassHandle {
    /// 作成時のattachmentの数
    pub fn attachment_count(&self) -> u32 {
        self.resource().attachment_count
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
