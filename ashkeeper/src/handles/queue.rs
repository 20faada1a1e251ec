//! DeviceHandleを保持したvk::Queueのラッパーを定義する。
//! Queueはネイティブに破棄する必要がないので参照カウントは持たない。

use crate::{Error, Result};
use ash::vk;
use std::{fmt::Debug, ops::Deref};

/// DeviceHandleとvk::Queueの組
#[derive(Clone)]
pub struct Queue {
    device: crate::DeviceHandle,
    queue: vk::Queue,
    family_index: u32,
    index: u32,
}
impl Queue {
    pub(crate) fn get(device: crate::DeviceHandle, family_index: u32, index: u32) -> Self {
        let queue = unsafe { device.raw_device().get_device_queue(family_index, index) };
        Self {
            device,
            queue,
            family_index,
            index,
        }
    }

    // create系

    /// このQueueに提出するCommandPoolを作成する
    pub fn create_command_pool(
        &self,
        flags: crate::Flags<crate::CommandPoolCreate>,
    ) -> Result<crate::CommandPool> {
        crate::CommandPool::create(self.clone(), flags)
    }

    // queueの関数

    /// SubmitInfoを提出する
    ///
    /// fenceを渡した場合は処理の完了時にシグナルされる。
    pub fn submit(&self, submits: &[vk::SubmitInfo], fence: Option<&crate::FenceHandle>) -> Result<()> {
        let fence = fence.map_or(vk::Fence::null(), |fence| fence.raw());
        unsafe {
            self.device
                .raw_device()
                .queue_submit(self.queue, submits, fence)
        }
        .map_err(Error::vulkan("vkQueueSubmit"))
    }

    /// Queueがアイドル状態になるまで待つ
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.raw_device().queue_wait_idle(self.queue) }
            .map_err(Error::vulkan("vkQueueWaitIdle"))
    }

    /// queue familyのindex
    pub fn family_index(&self) -> u32 {
        self.family_index
    }

    /// queue family内のindex
    pub fn index(&self) -> u32 {
        self.index
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> crate::DeviceHandle {
        self.device.clone()
    }
}

// Debugトレイトの実装
impl Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("queue", &self.queue)
            .field("family_index", &self.family_index)
            .field("index", &self.index)
            .finish()
    }
}

// Queueはvk::QueueにDerefする
impl Deref for Queue {
    type Target = vk::Queue;
    fn deref(&self) -> &Self::Target {
        &self.queue
    }
}
