//! 参照カウンタで管理して、参照がすべて破棄された際に
//! ShaderModuleの破棄の処理まで行うShaderModuleHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::ShaderModule
pub struct ShaderModule {
    device: crate::DeviceHandle,
    shader_module: vk::ShaderModule,
}
impl ShaderModule {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        shader_module_create_info: &vk::ShaderModuleCreateInfo,
    ) -> Result<crate::ShaderModuleHandle> {
        let shader_module =
            unsafe { device.raw_device().create_shader_module(shader_module_create_info) }
                .map_err(Error::creation("shader module"))?;
        Ok(crate::SharedHandle::new(Self {
            device,
            shader_module,
        }))
    }
}
impl crate::Resource for ShaderModule {
    type Raw = vk::ShaderModule;
    const NAME: &'static str = "shader module";

    fn raw(&self) -> &vk::ShaderModule {
        &self.shader_module
    }

    unsafe fn destroy(&mut self) {
        self.device
            .raw_device()
            .destroy_shader_module(self.shader_module);
    }
}

/// vk::ShaderModuleを参照カウントで管理するためのハンドル
pub type ShaderModuleHandle = crate::SharedHandle<ShaderModule>;

impl ShaderModuleHandle {
    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
