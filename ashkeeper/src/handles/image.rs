//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Imageの破棄の処理まで行うImageHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::Imageと、バインドしたメモリ
pub struct Image {
    device: crate::DeviceHandle,
    image: vk::Image,
    format: vk::Format,
    extent: vk::Extent3D,
    memory: Option<crate::BoundMemory>,
}
impl Image {
    // imageを作成して、memoryが返したメモリをバインドする
    // 途中で失敗した場合は作成したimageを破棄する
    pub(crate) fn create(
        device: crate::DeviceHandle,
        image_create_info: &vk::ImageCreateInfo,
        memory: impl FnOnce(vk::MemoryRequirements) -> Result<Option<crate::BoundMemory>>,
    ) -> Result<crate::ImageHandle> {
        let image = unsafe { device.raw_device().create_image(image_create_info) }
            .map_err(Error::creation("image"))?;
        let mut pending = crate::PendingHandle::new(Self {
            device,
            image,
            format: image_create_info.format,
            extent: image_create_info.extent,
            memory: None,
        });

        let resource = pending.resource_mut();
        let requirements = unsafe {
            resource
                .device
                .raw_device()
                .get_image_memory_requirements(image)
        };
        if let Some(memory) = memory(requirements)? {
            let (device_memory, offset) = memory.binding();
            resource.memory = Some(memory);
            unsafe {
                resource
                    .device
                    .raw_device()
                    .bind_image_memory(image, device_memory, offset)
            }
            .map_err(Error::vulkan("vkBindImageMemory"))?;
        }

        Ok(pending.share())
    }
}
impl crate::Resource for Image {
    type Raw = vk::Image;
    const NAME: &'static str = "image";

    fn raw(&self) -> &vk::Image {
        &self.image
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_image(self.image);
        if let Some(memory) = self.memory.as_mut() {
            memory.release();
        }
    }
}

/// vk::Imageを参照カウントで管理するためのハンドル
pub type ImageHandle = crate::SharedHandle<Image>;

impl ImageHandle {
    // imageの関数

    /// Imageのメモリ要件を取得する
    pub fn get_image_memory_requirements(&self) -> vk::MemoryRequirements {
        unsafe {
            self.device()
                .raw_device()
                .get_image_memory_requirements(self.raw())
        }
    }

    /// 作成時のフォーマット
    pub fn format(&self) -> vk::Format {
        self.resource().format
    }

    /// 作成時のサイズ
    pub fn extent(&self) -> vk::Extent3D {
        self.resource().extent
    }

    /// バインドしたメモリ
    pub fn memory(&self) -> Option<&crate::BoundMemory> {
        self.resource().memory.as_ref()
    }

    // raw

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::{self, Call};
    use ash::vk::{self, Handle};

    #[test]
    fn image_keeps_its_memory_alive() {
        let (device, log) = mock::device();
        let memory = device
            .allocate_memory(&vk::MemoryAllocateInfo::builder().allocation_size(1024))
            .unwrap();
        let image = device
            .create_image_bound(
                &crate::utils::image_2d_create_info(
                    vk::Format::R8G8B8A8_UNORM,
                    vk::Extent2D {
                        width: 16,
                        height: 16,
                    },
                    crate::ImageUsage::ColorAttachment.into(),
                ),
                &memory,
                0,
            )
            .unwrap();
        assert_eq!(image.format(), vk::Format::R8G8B8A8_UNORM);
        assert_eq!(image.extent().depth, 1);

        let memory_raw = memory.as_raw();
        drop(memory);
        assert!(log.destroyed("memory").is_empty());

        let image_raw = image.as_raw();
        drop(image);
        assert_eq!(
            log.calls()[log.calls().len() - 2..],
            [
                Call::Destroy("image", image_raw),
                Call::Destroy("memory", memory_raw)
            ]
        );
    }
}
