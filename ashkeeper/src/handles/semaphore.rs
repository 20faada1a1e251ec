//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Semaphoreの破棄の処理まで行うSemaphoreHandleを定義する。

use crate::{Error, Result};
use ash::vk;

/// vk::Semaphore
pub struct Semaphore {
    device: crate::DeviceHandle,
    semaphore: vk::Semaphore,
}
impl Semaphore {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        semaphore_create_info: &vk::SemaphoreCreateInfo,
    ) -> Result<crate::SemaphoreHandle> {
        let semaphore = unsafe { device.raw_device().create_semaphore(semaphore_create_info) }
            .map_err(Error::creation("semaphore"))?;
        Ok(crate::SharedHandle::new(Self { device, semaphore }))
    }
}
impl crate::Resource for Semaphore {
    type Raw = vk::Semaphore;
    const NAME: &'static str = "semaphore";

    fn raw(&self) -> &vk::Semaphore {
        &self.semaphore
    }

    unsafe fn destroy(&mut self) {
        self.device.raw_device().destroy_semaphore(self.semaphore);
    }
}

/// vk::Semaphoreを参照カウントで管理するためのハンドル
pub type SemaphoreHandle = crate::SharedHandle<Semaphore>;

impl SemaphoreHandle {
    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.resource().device.clone()
    }
}
