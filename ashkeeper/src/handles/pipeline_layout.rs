//! 参照カウンタで管理して、参照がすべて破棄された際に
//! PipelineLayoutの破棄の処理まで行うPipelineLayoutHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::PipelineLayoutと、作成に使ったDescriptorSetLayout
pub struct PipelineLayout {
    device: crate::DeviceHandle,
    set_layouts: Vec<crate::DescriptorSetLayoutHandle>,
    pipeline_layout: vk::PipelineLayout,
}
impl PipelineLayout {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        set_layouts: &[crate::DescriptorSetLayoutHandle],
        push_constant_ranges: &[vk::PushConstantRange],
    ) -> Result<crate::PipelineLayoutHandle> {
        let raw_set_layouts = set_layouts
            .iter()
            .map(|layout| layout.raw())
            .collect::<Vec<_>>();
        let pipeline_layout_create_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(&raw_set_layouts)
            .push_constant_ranges(push_constant_ranges);
        let pipeline_layout = unsafe {
            device
                .raw_device()
                .create_pipeline_layout(&pipeline_layout_create_info)
        }
        .map_err(Error::creation("pipeline layout"))?;

        Ok(crate::SharedHandle::new(Self {
            device,
            set_layouts: set_layouts.to_vec(),
            pipeline_layout,
        }))
    }
}
impl crate::Resource for PipelineLayout {
    type Raw = vk::PipelineLayout;
    const NAME: &'static str = "pipeline layout";

    fn raw(&self) -> &vk::PipelineLayout {
        &self.pipeline_layout
    }

    unsafe fn destroy(&mut self) {
        self.device
            .raw_device()
            .destroy_pipeline_layout(self.pipeline_layout);
    }
}

/// vk::PipelineLayoutを参照カウントで管理するためのハンドル
pub type PipelineLayoutHandle = crate::SharedHandle<PipelineLayout>;

impl PipelineLayoutHandle {
    /// 作成に使ったDescriptorSetLayoutHandleを取得する
    pub fn set_layouts(&self) -> &[crate::DescriptorSetLayoutHandle] {
        &self.resource().set_layouts
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
