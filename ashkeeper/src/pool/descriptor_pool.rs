//! DescriptorSetを割り当てるDescriptorPoolを定義する。
//!
//! 個別に解放できるように、DescriptorPoolは常にFREE_DESCRIPTOR_SETを付けて作成する。

use super::{ChildId, OwningPool, PoolChild, PoolParent};
use crate::{DescriptorPoolCreate, Error, Result};
use ash::{prelude::VkResult, vk};

/// vk::DescriptorPool
pub struct DescriptorPoolParent {
    device: crate::DeviceHandle,
    descriptor_pool: vk::DescriptorPool,
}
impl PoolParent for DescriptorPoolParent {
    type Raw = vk::DescriptorPool;
    type Child = DescriptorSet;
    const NAME: &'static str = "descriptor pool";

    fn raw(&self) -> &vk::DescriptorPool {
        &self.descriptor_pool
    }

    unsafe fn free_children(&self, children: &[vk::DescriptorSet]) -> VkResult<()> {
        self.device
            .raw_device()
            .free_descriptor_sets(self.descriptor_pool, children)
    }

    unsafe fn wait_idle(&self) {
        if let Err(err) = self.device.wait_idle() {
            tracing::warn!("Failed to wait for device idle before destroying descriptor pool: {}", err);
        }
    }

    unsafe fn destroy(&mut self) {
        self.device
            .raw_device()
            .destroy_descriptor_pool(self.descriptor_pool);
    }
}

/// DescriptorPoolから割り当てたvk::DescriptorSetと、そのレイアウト
pub struct DescriptorSet {
    descriptor_set: vk::DescriptorSet,
    layout: crate::DescriptorSetLayoutHandle,
}
impl DescriptorSet {
    /// 割り当てに使ったDescriptorSetLayoutHandle
    pub fn layout(&self) -> &crate::DescriptorSetLayoutHandle {
        &self.layout
    }
}
impl PoolChild for DescriptorSet {
    type Raw = vk::DescriptorSet;
    const NAME: &'static str = "descriptor set";

    fn raw(&self) -> vk::DescriptorSet {
        self.descriptor_set
    }
}

/// DescriptorSetを所有するpool
pub type DescriptorPool = OwningPool<DescriptorPoolParent>;
/// DescriptorPoolが割り当てたDescriptorSetのid
pub type DescriptorSetId = ChildId<DescriptorSet>;

impl DescriptorPool {
    pub(crate) fn create(
        device: crate::DeviceHandle,
        max_sets: u32,
        pool_sizes: &[vk::DescriptorPoolSize],
        flags: crate::Flags<DescriptorPoolCreate>,
    ) -> Result<Self> {
        let descriptor_pool_create_info = vk::DescriptorPoolCreateInfo::builder()
            .flags((flags | DescriptorPoolCreate::FreeDescriptorSet).into())
            .max_sets(max_sets)
            .pool_sizes(pool_sizes);
        let descriptor_pool = unsafe {
            device
                .raw_device()
                .create_descriptor_pool(&descriptor_pool_create_info)
        }
        .map_err(Error::creation("descriptor pool"))?;
        Ok(Self::new(DescriptorPoolParent {
            device,
            descriptor_pool,
        }))
    }

    // 割り当て

    /// レイアウトごとにDescriptorSetを割り当てる
    ///
    /// 各DescriptorSetはレイアウトのHandleを保持する。
    /// layoutsが空の場合はネイティブの割り当てを呼ばずに空のVecを返す。
    pub fn allocate_descriptor_sets(
        &mut self,
        layouts: &[crate::DescriptorSetLayoutHandle],
    ) -> Result<Vec<DescriptorSetId>> {
        if layouts.is_empty() {
            return Ok(vec![]);
        }
        let raw_layouts = layouts.iter().map(|layout| layout.raw()).collect::<Vec<_>>();
        let descriptor_set_allocate_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(**self)
            .set_layouts(&raw_layouts);
        let descriptor_sets = unsafe {
            self.device()
                .raw_device()
                .allocate_descriptor_sets(&descriptor_set_allocate_info)
        }
        .map_err(Error::allocation("descriptor set"))?;

        Ok(descriptor_sets
            .into_iter()
            .zip(layouts)
            .map(|(descriptor_set, layout)| {
                tracing::trace!("Allocated descriptor set {:?}", descriptor_set);
                self.register(DescriptorSet {
                    descriptor_set,
                    layout: layout.clone(),
                })
            })
            .collect())
    }

    /// DescriptorSetを一つ割り当てる
    pub fn allocate_descriptor_set(
        &mut self,
        layout: &crate::DescriptorSetLayoutHandle,
    ) -> Result<DescriptorSetId> {
        self.allocate_descriptor_sets(std::slice::from_ref(layout))?
            .pop()
            .ok_or(Error::CreationFailed {
                what: "descriptor set",
                result: vk::Result::ERROR_UNKNOWN,
            })
    }

    // descriptorPoolの関数

    /// DescriptorPoolをリセットして、割り当てたDescriptorSetをすべて解放する
    ///
    /// 以前に返したidはすべて無効になる。
    pub fn reset(&mut self) -> Result<()> {
        unsafe { self.device().raw_device().reset_descriptor_pool(**self) }
            .map_err(Error::vulkan("vkResetDescriptorPool"))?;
        let released = self.forget_children();
        tracing::debug!(
            "Reset descriptor pool {:?}, released {} descriptor sets",
            **self,
            released.len()
        );
        Ok(())
    }

    /// DescriptorSetを更新する
    ///
    /// 各WriteDescriptorSetのdst_setはidのDescriptorSetで上書きされる。
    pub fn write(&self, writes: &[(DescriptorSetId, vk::WriteDescriptorSet)]) -> Result<()> {
        let writes = writes
            .iter()
            .map(|(id, write)| {
                Ok(vk::WriteDescriptorSet {
                    dst_set: self.raw_child(*id)?,
                    ..*write
                })
            })
            .collect::<Result<Vec<_>>>()?;
        unsafe { self.device().raw_device().update_descriptor_sets(&writes) };
        Ok(())
    }

    /// DeviceHandleを取得する
    pub fn device(&self) -> &crate::DeviceHandle {
        &self.parent().device
    }
}
