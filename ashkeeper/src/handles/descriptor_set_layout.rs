//! 参照カウンタで管理して、参照がすべて破棄された際に
//! DescriptorSetLayoutの破棄の処理まで行うDescriptorSetLayoutHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::DescriptorSetLayout
pub struct DescriptorSetLayout {
    device: crate::DeviceHandle,
    descriptor_set_layout: vk::DescriptorSetLayout,
}
impl DescriptorSetLayout {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        descriptor_set_layout_create_info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> Result<crate::DescriptorSetLayoutHandle> {
        let descriptor_set_layout = unsafe {
            device
                .raw_device()
                .create_descriptor_set_layout(descriptor_set_layout_create_info)
        }
        .map_err(Error::creation("descriptor set layout"))?;
        Ok(crate::SharedHandle::new(Self {
            device,
            descriptor_set_layout,
        }))
    }
}
impl crate::Resource for DescriptorSetLayout {
    type Raw = vk::DescriptorSetLayout;
    const NAME: &'static str = "descriptor set layout";

    fn raw(&self) -> &vk::DescriptorSetLayout {
        &self.descriptor_set_layout
    }

    unsafe fn destroy(&mut self) {
        self.device
            .raw_device()
            .destroy_descriptor_set_layout(self.descriptor_set_layout);
    }
}

/// vk::DescriptorSetLayoutを参照カウントで管理するためのハンドル
pub type DescriptorSetLayoutHandle = crate::SharedHandle<DescriptorSetLayout>;

impl DescriptorSetLayoutHandle {
    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
