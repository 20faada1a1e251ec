//! Queueに提出するCommandBufferを割り当てるCommandPoolを定義する。

use super::{ChildId, OwningPool, PoolChild, PoolParent};
use crate::{Error, Result};
use ash::{prelude::VkResult, vk};

/// vk::CommandPoolと、提出先のQueue
pub struct CommandPoolParent {
    queue: crate::Queue,
    command_pool: vk::CommandPool,
}
impl PoolParent for CommandPoolParent {
    type Raw = vk::CommandPool;
    type Child = CommandBuffer;
    const NAME: &'static str = "command pool";

    fn raw(&self) -> &vk::CommandPool {
        &self.command_pool
    }

    unsafe fn free_children(&self, children: &[vk::CommandBuffer]) -> VkResult<()> {
        self.queue
            .device()
            .raw_device()
            .free_command_buffers(self.command_pool, children);
        Ok(())
    }

    unsafe fn wait_idle(&self) {
        if let Err(err) = self.queue.wait_idle() {
            tracing::warn!("Failed to wait for queue idle before destroying command pool: {}", err);
        }
    }

    unsafe fn destroy(&mut self) {
        self.queue
            .device()
            .raw_device()
            .destroy_command_pool(self.command_pool);
    }
}

/// CommandPoolから割り当てたvk::CommandBuffer
pub struct CommandBuffer {
    command_buffer: vk::CommandBuffer,
    level: vk::CommandBufferLevel,
}
impl CommandBuffer {
    /// PRIMARYかSECONDARY
    pub fn level(&self) -> vk::CommandBufferLevel {
        self.level
    }
}
impl PoolChild for CommandBuffer {
    type Raw = vk::CommandBuffer;
    const NAME: &'static str = "command buffer";

    fn raw(&self) -> vk::CommandBuffer {
        self.command_buffer
    }
}

/// CommandBufferを所有するpool
pub type CommandPool = OwningPool<CommandPoolParent>;
/// CommandPoolが割り当てたCommandBufferのid
pub type CommandBufferId = ChildId<CommandBuffer>;

impl CommandPool {
    pub(crate) fn create(
        queue: crate::Queue,
        flags: crate::Flags<crate::CommandPoolCreate>,
    ) -> Result<Self> {
        let command_pool_create_info = vk::CommandPoolCreateInfo::builder()
            .flags(flags.into())
            .queue_family_index(queue.family_index());
        let command_pool = unsafe {
            queue
                .device()
                .raw_device()
                .create_command_pool(&command_pool_create_info)
        }
        .map_err(Error::creation("command pool"))?;
        Ok(Self::new(CommandPoolParent {
            queue,
            command_pool,
        }))
    }

    // 割り当て

    /// CommandBufferを割り当てる
    ///
    /// countが0の場合はネイティブの割り当てを呼ばずに空のVecを返す。
    pub fn allocate_command_buffers(
        &mut self,
        level: vk::CommandBufferLevel,
        count: u32,
    ) -> Result<Vec<CommandBufferId>> {
        if count == 0 {
            return Ok(vec![]);
        }
        let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(**self)
            .level(level)
            .command_buffer_count(count);
        let command_buffers = unsafe {
            self.queue()
                .device()
                .raw_device()
                .allocate_command_buffers(&command_buffer_allocate_info)
        }
        .map_err(Error::allocation("command buffer"))?;

        Ok(command_buffers
            .into_iter()
            .map(|command_buffer| {
                tracing::trace!("Allocated command buffer {:?}", command_buffer);
                self.register(CommandBuffer {
                    command_buffer,
                    level,
                })
            })
            .collect())
    }

    /// CommandBufferを一つ割り当てる
    pub fn allocate_command_buffer(
        &mut self,
        level: vk::CommandBufferLevel,
    ) -> Result<CommandBufferId> {
        self.allocate_command_buffers(level, 1)?
            .pop()
            .ok_or(Error::CreationFailed {
                what: "command buffer",
                result: vk::Result::ERROR_UNKNOWN,
            })
    }

    // commandPoolの関数

    /// CommandPoolをリセットする
    ///
    /// CommandBufferは解放されずに初期状態に戻る。
    pub fn reset(&mut self, flags: vk::CommandPoolResetFlags) -> Result<()> {
        unsafe {
            self.queue()
                .device()
                .raw_device()
                .reset_command_pool(**self, flags)
        }
        .map_err(Error::vulkan("vkResetCommandPool"))
    }

    /// CommandBufferをQueueに提出する
    pub fn submit(&self, ids: &[CommandBufferId], fence: Option<&crate::FenceHandle>) -> Result<()> {
        let command_buffers = ids
            .iter()
            .map(|id| self.raw_child(*id))
            .collect::<Result<Vec<_>>>()?;
        let submit_info = vk::SubmitInfo::builder()
            .command_buffers(&command_buffers)
            .build();
        self.queue()
            .submit(std::slice::from_ref(&submit_info), fence)
    }

    /// 提出先のQueueを取得する
    pub fn queue(&self) -> &crate::Queue {
        &self.parent().queue
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        mock::{self, Call},
        CommandPoolCreate, Error,
    };
    use ash::vk::{self, Handle};

    const PRIMARY: vk::CommandBufferLevel = vk::CommandBufferLevel::PRIMARY;

    #[test]
    fn remaining_command_buffer_is_freed_with_the_pool() {
        let (device, log) = mock::device();
        let queue = device.get_queue(0, 0);
        let mut pool = queue
            .create_command_pool(CommandPoolCreate::ResetCommandBuffer.into())
            .unwrap();
        let pool_raw = pool.as_raw();
        let ids = pool.allocate_command_buffers(PRIMARY, 2).unwrap();
        let first = pool.raw_child(ids[0]).unwrap().as_raw();
        let second = pool.raw_child(ids[1]).unwrap().as_raw();

        pool.free(ids[0]).unwrap();
        assert_eq!(pool.len(), 1);
        assert!(!pool.contains(ids[0]));
        drop(pool);

        assert_eq!(log.freed("command buffer"), vec![first, second]);
        let calls = log.calls();
        assert_eq!(
            calls[calls.len() - 3..],
            [
                Call::WaitIdle("queue"),
                Call::Free("command buffer", second),
                Call::Destroy("command pool", pool_raw),
            ]
        );
    }

    #[test]
    fn teardown_frees_every_child_once_then_destroys_the_pool() {
        let (device, log) = mock::device();
        let mut pool = device
            .get_queue(0, 0)
            .create_command_pool(Default::default())
            .unwrap();
        let ids = pool.allocate_command_buffers(PRIMARY, 5).unwrap();
        let mut raws = ids
            .iter()
            .map(|id| pool.raw_child(*id).unwrap().as_raw())
            .collect::<Vec<_>>();
        drop(pool);

        let mut freed = log.freed("command buffer");
        raws.sort();
        freed.sort();
        assert_eq!(freed, raws);
        assert_eq!(log.destroyed("command pool").len(), 1);
        let destroyed_at = log
            .position(Call::Destroy("command pool", log.destroyed("command pool")[0]))
            .unwrap();
        for raw in raws {
            assert!(log.position(Call::Free("command buffer", raw)).unwrap() < destroyed_at);
        }
    }

    #[test]
    fn foreign_or_stale_id_is_invalid() {
        let (device, log) = mock::device();
        let queue = device.get_queue(0, 0);
        let mut pool = queue.create_command_pool(Default::default()).unwrap();
        let mut other = queue.create_command_pool(Default::default()).unwrap();
        let foreign = other.allocate_command_buffer(PRIMARY).unwrap();
        let id = pool.allocate_command_buffer(PRIMARY).unwrap();

        assert!(matches!(pool.free(foreign), Err(Error::InvalidHandle(_))));
        assert!(other.contains(foreign));

        pool.free(id).unwrap();
        assert!(matches!(pool.free(id), Err(Error::InvalidHandle(_))));
        assert_eq!(log.freed("command buffer").len(), 1);

        // 同じslotが再利用されても古いidは無効のまま
        let reused = pool.allocate_command_buffer(PRIMARY).unwrap();
        assert!(matches!(pool.raw_child(id), Err(Error::InvalidHandle(_))));
        assert!(pool.contains(reused));
        assert!(matches!(
            pool.free_many(&[reused, reused]),
            Err(Error::InvalidHandle(_))
        ));
        assert_eq!(log.freed("command buffer").len(), 1);
    }

    #[test]
    fn failed_allocation_registers_nothing() {
        let (device, log) = mock::device();
        let mut pool = device
            .get_queue(0, 0)
            .create_command_pool(Default::default())
            .unwrap();
        log.fail_next("command buffer", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        let err = pool.allocate_command_buffers(PRIMARY, 3).unwrap_err();
        assert!(matches!(err, Error::AllocationExhausted { .. }));
        assert!(pool.is_empty());
        drop(pool);
        assert!(log.freed("command buffer").is_empty());
    }

    #[test]
    fn zero_count_skips_native_allocation() {
        let (device, log) = mock::device();
        let mut pool = device
            .get_queue(0, 0)
            .create_command_pool(Default::default())
            .unwrap();
        log.fail_next("command buffer", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        assert!(pool.allocate_command_buffers(PRIMARY, 0).unwrap().is_empty());
        assert!(pool.is_empty());
        assert!(!log
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Allocate("command buffer", _))));

        // 失敗の指定は消費されずに次の割り当てで使われる
        assert!(pool.allocate_command_buffer(PRIMARY).is_err());
        assert_eq!(
            log.position(Call::Allocate("command buffer", 1)),
            Some(log.calls().len() - 1)
        );
    }

    #[test]
    fn pool_keeps_the_device_alive() {
        let (device, log) = mock::device();
        let mut pool = device
            .get_queue(0, 0)
            .create_command_pool(Default::default())
            .unwrap();
        let id = pool.allocate_command_buffer(PRIMARY).unwrap();
        let fence = device.create_fence(Default::default()).unwrap();
        drop(device);

        pool.submit(&[id], Some(&fence)).unwrap();
        assert!(log.calls().contains(&Call::Submit(pool.queue().as_raw())));
        pool.reset(vk::CommandPoolResetFlags::empty()).unwrap();
        assert!(pool.contains(id));

        drop(pool);
        assert!(log.destroyed("device").is_empty());
        drop(fence);
        assert_eq!(log.destroyed("device"), vec![1]);
    }
}
