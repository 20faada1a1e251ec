use crate::Result;
use ash::vk;

/// カラーattachmentを一つだけ持つRenderPassを作成する関数
/// 描画後はTRANSFER_SRC_OPTIMALに遷移する。
pub fn create_color_render_pass(
    device: &crate::DeviceHandle,
    format: vk::Format,
) -> Result<crate::RenderPassHandle> {
    let attachments = [vk::AttachmentDescription::builder()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL)
        .build()];
    let color_attachments = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];
    let subpasses = [vk::SubpassDescription::builder()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_attachments)
        .build()];
    let render_pass_create_info = vk::RenderPassCreateInfo::builder()
        .attachments(&attachments)
        .subpasses(&subpasses);
    device.create_render_pass(&render_pass_create_info)
}

/// RenderPassとattachmentからFramebufferを作成する関数
pub fn create_framebuffer(
    render_pass: &crate::RenderPassHandle,
    attachments: &[crate::ImageViewHandle],
    extent: vk::Extent2D,
) -> Result<crate::FramebufferHandle> {
    let framebuffer_create_info = vk::FramebufferCreateInfo::builder()
        .width(extent.width)
        .height(extent.height)
        .layers(1);
    render_pass
        .device()
        .create_framebuffer(render_pass, attachments, &framebuffer_create_info)
}
