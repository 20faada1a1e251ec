//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Samplerの破棄の処理まで行うSamplerHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::Sampler
pub struct Sampler {
    device: crate::DeviceHandle,
    sampler: vk::Sampler,
}
impl Sampler {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        sampler_create_info: &vk::SamplerCreateInfo,
    ) -> Result<crate::SamplerHandle> {
        let sampler = unsafe { device.raw_device().create_sampler(sampler_create_info) }
            .map_err(Error::creation("sampler"))?;
        Ok(crate::SharedHandle::new(Self { device, sampler }))
    }
}
impl crate::Resource for Sampler {
    type Raw = vk::Sampler;
    const NAME: &'static str = "sampler";

    fn raw(&self) -> &vk::Sampler {
        &self.sampler
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_sampler(self.sampler);
    }
}

/// vk::Samplerを参照カウントで管理するためのハンドル
pub type SamplerHandle = crate::SharedHandle<Sampler>;

impl SamplerHandle {
    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
