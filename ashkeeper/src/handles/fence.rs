//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Fenceの破棄の処理まで行うFenceHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::Fence
pub struct Fence {
    device: crate::DeviceHandle,
    fence: vk::Fence,
}
impl Fence {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        flags: crate::Flags<crate::FenceCreate>,
    ) -> Result<crate::FenceHandle> {
        let fence_create_info = vk::FenceCreateInfo::builder().flags(flags.into());
        let fence = unsafe { device.raw_device().create_fence(&fence_create_info) }
            .map_err(Error::creation("fence"))?;
        Ok(crate::SharedHandle::new(Self { device, fence }))
    }
}
impl crate::Resource for Fence {
    type Raw = vk::Fence;
    const NAME: &'static str = "fence";

    fn raw(&self) -> &vk::Fence {
        &self.fence
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_fence(self.fence);
    }
}

/// vk::Fenceを参照カウントで管理するためのハンドル
pub type FenceHandle = crate::SharedHandle<Fence>;

impl FenceHandle {
    // fenceの関数

    /// シグナルされるまで待つ
    pub fn wait(&self, timeout: u64) -> Result<()> {
        unsafe {
            self.resource()
                .device
                .raw_device()
                .wait_for_fences(&[self.raw()], true, timeout)
        }
        .map_err(Error::vulkan("vkWaitForFences"))
    }

    /// 非シグナル状態に戻す
    pub fn reset(&self) -> Result<()> {
        unsafe { self.resource().device.raw_device().reset_fences(&[self.raw()]) }
            .map_err(Error::vulkan("vkResetFences"))
    }

    /// シグナルされているかどうか
    pub fn status(&self) -> Result<bool> {
        unsafe { self.resource().device.raw_device().get_fence_status(self.raw()) }
            .map_err(Error::vulkan("vkGetFenceStatus"))
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
        Error, FenceCreate,
    };
    use ash::vk::{self, Handle};

    #[test]
    fn fence_passes_wait_and_reset_through() {
        let (device, log) = mock::device();
        let fence = device.create_fence(FenceCreate::Signaled.into()).unwrap();
        fence.wait(u64::MAX).unwrap();
        assert!(fence.status().unwrap());
        fence.reset().unwrap();
        assert!(log.calls().contains(&Call::Reset("fence", fence.as_raw())));

        log.fail_next("wait fences", vk::Result::TIMEOUT);
        let err = fence.wait(0).unwrap_err();
        assert!(matches!(
            err,
            Error::Vulkan {
                call: "vkWaitForFences",
                result: vk::Result::TIMEOUT
            }
        ));
    }

    #[test]
    fn clones_destroy_the_fence_once() {
        let (device, log) = mock::device();
        let fence = device.create_fence(Default::default()).unwrap();
        let clones = vec![fence.clone(), fence.clone(), fence.clone()];
        let raw = fence.as_raw();
        fence.destroy();
        for clone in clones {
            assert!(log.destroyed("fence").is_empty());
            clone.destroy();
        }
        assert_eq!(log.destroyed("fence"), vec![raw]);
    }
}
