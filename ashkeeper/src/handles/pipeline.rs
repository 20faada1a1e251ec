//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Pipelineの破棄の処理まで行うPipelineHandleを定義する。
//!
//! グラフィックスとコンピュートのどちらもPipelineHandleで扱う。

use crate::{Error, Result};
use ash::vk;
use std::ffi::CStr;

/// パイプラインのシェーダーステージ
#[derive(Debug, Clone, Copy)]
pub struct ShaderStageDesc<'a> {
    /// ステージ
    pub stage: crate::ShaderStage,
    /// シェーダーモジュール
    pub module: &'a crate::ShaderModuleHandle,
    /// エントリーポイント名
    pub entry_point: &'a CStr,
}
impl ShaderStageDesc<'_> {
    fn create_info(&self) -> vk::PipelineShaderStageCreateInfo {
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(crate::Flags::from(self.stage).native())
            .module(self.module.raw())
            .name(self.entry_point)
            .build()
    }
}

/// vk::Pipelineと、作成に使ったPipelineLayout、ShaderModule、RenderPass
pub struct Pipeline {
    device: crate::DeviceHandle,
    layout: crate::PipelineLayoutHandle,
    render_pass: Option<crate::RenderPassHandle>,
    shader_modules: Vec<crate::ShaderModuleHandle>,
    bind_point: vk::PipelineBindPoint,
    pipeline: vk::Pipeline,
}
impl Pipeline {
    pub(crate) fn create_graphics(
        device: crate::DeviceHandle,
        layout: &crate::PipelineLayoutHandle,
        render_pass: &crate::RenderPassHandle,
        subpass: u32,
        stages: &[crate::ShaderStageDesc],
        graphics_pipeline_create_info: &vk::GraphicsPipelineCreateInfo,
    ) -> Result<crate::PipelineHandle> {
        let stage_create_infos = stages
            .iter()
            .map(|stage| stage.create_info())
            .collect::<Vec<_>>();
        let graphics_pipeline_create_info = vk::GraphicsPipelineCreateInfo {
            stage_count: stage_create_infos.len() as u32,
            p_stages: stage_create_infos.as_ptr(),
            layout: layout.raw(),
            render_pass: render_pass.raw(),
            subpass,
            ..*graphics_pipeline_create_info
        };
        let pipeline = unsafe {
            device
                .raw_device()
                .create_graphics_pipeline(vk::PipelineCache::null(), &graphics_pipeline_create_info)
        }
        .map_err(Error::creation("pipeline"))?;

        Ok(crate::SharedHandle::new(Self {
            device,
            layout: layout.clone(),
            render_pass: Some(render_pass.clone()),
            shader_modules: stages.iter().map(|stage| stage.module.clone()).collect(),
            bind_point: vk::PipelineBindPoint::GRAPHICS,
            pipeline,
        }))
    }

    pub(crate) fn create_compute(
        device: crate::DeviceHandle,
        layout: &crate::PipelineLayoutHandle,
        stage: &crate::ShaderStageDesc,
    ) -> Result<crate::PipelineHandle> {
        let compute_pipeline_create_info = vk::ComputePipelineCreateInfo::builder()
            .stage(stage.create_info())
            .layout(layout.raw());
        let pipeline = unsafe {
            device
                .raw_device()
                .create_compute_pipeline(vk::PipelineCache::null(), &compute_pipeline_create_info)
        }
        .map_err(Error::creation("pipeline"))?;

        Ok(crate::SharedHandle::new(Self {
            device,
            layout: layout.clone(),
            render_pass: None,
            shader_modules: vec![stage.module.clone()],
            bind_point: vk::PipelineBindPoint::COMPUTE,
            pipeline,
        }))
    }
}
impl crate::Resource for Pipeline {
    type Raw = vk::Pipeline;
    const NAME: &'static str = "pipeline";

    fn raw(&self) -> &vk::Pipeline {
        &self.pipeline
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_pipeline(self.pipeline);
    }
}

/// vk::Pipelineを参照カウントで管理するためのハンドル
pub type PipelineHandle = crate::SharedHandle<Pipeline>;

impl PipelineHandle {
    /// GRAPHICSかCOMPUTE
    pub fn bind_point(&self) -> vk::PipelineBindPoint {
        self.resource().bind_point
    }

    /// PipelineLayoutHandleを取得する
    pub fn layout(&self) -> crate::PipelineLayoutHandle {
        self.resource().layout.clone()
    }

    /// グラフィックスのパイプラインであればRenderPassHandleを取得する
    pub fn render_pass(&self) -> Option<crate::RenderPassHandle> {
        self.resource().render_pass.clone()
    }

    /// 作成に使ったShaderModuleHandleを取得する
    pub fn shader_modules(&self) -> &[crate::ShaderModuleHandle] {
        &self.resource().shader_modules
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        mock::{self, Call},
        ShaderStage, ShaderStageDesc,
    };
    use ash::vk::{self, Handle};
    use std::ffi::CStr;

    const MAIN: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") };

    #[test]
    fn graphics_pipeline_retains_its_whole_chain() {
        let (device, log) = mock::device();
        let set_layout = device
            .create_descriptor_set_layout(&Default::default())
            .unwrap();
        let layout = device.create_pipeline_layout(&[set_layout], &[]).unwrap();
        let render_pass = crate::utils::create_color_render_pass(
            &device,
            vk::Format::B8G8R8A8_SRGB,
        )
        .unwrap();
        let vert = device.create_shader_module(&Default::default()).unwrap();
        let frag = device.create_shader_module(&Default::default()).unwrap();
        let pipeline = device
            .create_graphics_pipeline(
                &layout,
                &render_pass,
                0,
                &[
                    ShaderStageDesc {
                        stage: ShaderStage::Vertex,
                        module: &vert,
                        entry_point: MAIN,
                    },
                    ShaderStageDesc {
                        stage: ShaderStage::Fragment,
                        module: &frag,
                        entry_point: MAIN,
                    },
                ],
                &Default::default(),
            )
            .unwrap();
        drop((layout, render_pass, vert, frag));
        assert!(log.destroyed("pipeline layout").is_empty());
        assert!(log.destroyed("descriptor set layout").is_empty());
        assert!(log.destroyed("render pass").is_empty());
        assert!(log.destroyed("shader module").is_empty());
        assert_eq!(pipeline.bind_point(), vk::PipelineBindPoint::GRAPHICS);
        assert_eq!(pipeline.shader_modules().len(), 2);

        let pipeline_raw = pipeline.as_raw();
        drop(pipeline);
        let pipeline_destroyed = log.position(Call::Destroy("pipeline", pipeline_raw)).unwrap();
        for kind in ["pipeline layout", "descriptor set layout", "render pass", "shader module"] {
            for raw in log.destroyed(kind) {
                assert!(log.position(Call::Destroy(kind, raw)).unwrap() > pipeline_destroyed);
            }
        }
        assert_eq!(log.destroyed("shader module").len(), 2);
        assert_eq!(log.destroyed("descriptor set layout").len(), 1);
    }

    #[test]
    fn compute_pipeline_has_no_render_pass() {
        let (device, log) = mock::device();
        let layout = device.create_pipeline_layout(&[], &[]).unwrap();
        let module = device.create_shader_module(&Default::default()).unwrap();
        let pipeline = device
            .create_compute_pipeline(
                &layout,
                &ShaderStageDesc {
                    stage: ShaderStage::Compute,
                    module: &module,
                    entry_point: MAIN,
                },
            )
            .unwrap();
        assert!(pipeline.render_pass().is_none());
        assert!(pipeline.layout().ptr_eq(&layout));
        assert_eq!(module.ref_count(), 2);

        log.fail_next("pipeline", vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        let err = device
            .create_compute_pipeline(
                &layout,
                &ShaderStageDesc {
                    stage: ShaderStage::Compute,
                    module: &module,
                    entry_point: MAIN,
                },
            )
            .unwrap_err();
        assert_eq!(err.vk_result(), Some(vk::Result::ERROR_OUT_OF_HOST_MEMORY));
        assert_eq!(module.ref_count(), 2);
    }
}
