//! Vulkanのpoolから割り当てる子オブジェクトを、poolが所有して管理するOwningPoolを定義する。
//!
//! 子オブジェクトは参照カウントを持たず、割り当て時に返す[`ChildId`]で指定する。
//! ChildIdはpoolごとのidとslotのgenerationを持つので、
//! 別のpoolのidや解放済みのidを渡すと[`Error::InvalidHandle`]になり、ネイティブの解放は呼ばれない。
//!
//! poolの破棄時は次の順で処理する。
//! 1. `PoolParent::wait_idle`で使用中の処理の完了を待つ。
//! 2. 残っている子オブジェクトを一度のネイティブの解放でまとめて解放する。
//! 3. pool自体をネイティブのdestroy関数で破棄する。

mod arena;
use arena::Arena;

mod command_pool;
pub use command_pool::{CommandBuffer, CommandBufferId, CommandPool, CommandPoolParent};
mod descriptor_pool;
pub use descriptor_pool::{DescriptorPool, DescriptorPoolParent, DescriptorSet, DescriptorSetId};

use crate::{Error, Result};
use ash::{prelude::VkResult, vk::Handle};
use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::Deref,
    sync::atomic::{AtomicU64, Ordering},
};

/// poolから割り当てられる子オブジェクト
pub trait PoolChild: Send + Sync + 'static {
    /// ネイティブのハンドルの型
    type Raw: Handle + Copy + Debug;
    /// ログなどに使う名前
    const NAME: &'static str;

    /// ネイティブのハンドルを取得する
    fn raw(&self) -> Self::Raw;
}

/// ネイティブのpoolと、その破棄に必要な所有者
pub trait PoolParent: Send + Sync + 'static {
    /// ネイティブのpoolのハンドルの型
    type Raw: Handle + Copy + Debug;
    /// 子オブジェクトの型
    type Child: PoolChild;
    /// ログなどに使う名前
    const NAME: &'static str;

    /// ネイティブのハンドルを取得する
    fn raw(&self) -> &Self::Raw;

    /// 子オブジェクトをまとめて解放する
    ///
    /// ## Safety
    /// childrenはすべてこのpoolから割り当てられて、まだ解放されていないものである必要がある。
    unsafe fn free_children(&self, children: &[<Self::Child as PoolChild>::Raw]) -> VkResult<()>;

    /// 子オブジェクトを使う処理が終わるまで待つ
    ///
    /// ## Safety
    /// poolの破棄の直前に呼ばれる。
    unsafe fn wait_idle(&self);

    /// ネイティブのdestroy関数を呼ぶ
    ///
    /// ## Safety
    /// poolの破棄時に一度だけ呼ばれる。呼んだ後にネイティブのハンドルを使ってはならない。
    unsafe fn destroy(&mut self);
}

/// OwningPoolが割り当てた子オブジェクトを指すid
pub struct ChildId<C> {
    pool: u64,
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> C>,
}
impl<C> ChildId<C> {
    /// 割り当てたpoolのid
    pub fn pool_id(&self) -> u64 {
        self.pool
    }
}
impl<C> Clone for ChildId<C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C> Copy for ChildId<C> {}
impl<C> PartialEq for ChildId<C> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.index == other.index && self.generation == other.generation
    }
}
impl<C> Eq for ChildId<C> {}
impl<C> Hash for ChildId<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.pool, self.index, self.generation).hash(state);
    }
}
// Debugトレイトの実装
impl<C> Debug for ChildId<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChildId({}:{}v{})", self.pool, self.index, self.generation)
    }
}

// poolごとに一意なid
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// 子オブジェクトを所有するpool
///
/// 割り当てや解放は`&mut self`を取るので、一つのpoolを複数のスレッドから使う場合は
/// 呼び出し側でMutexなどを使う必要がある。
pub struct OwningPool<P: PoolParent> {
    id: u64,
    parent: P,
    children: Arena<P::Child>,
}
impl<P: PoolParent> OwningPool<P> {
    pub(crate) fn new(parent: P) -> Self {
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Created {} {:?}", P::NAME, parent.raw());
        Self {
            id,
            parent,
            children: Arena::new(),
        }
    }

    pub(crate) fn register(&mut self, child: P::Child) -> ChildId<P::Child> {
        let (index, generation) = self.children.insert(child);
        ChildId {
            pool: self.id,
            index,
            generation,
            _marker: PhantomData,
        }
    }

    pub(crate) fn parent(&self) -> &P {
        &self.parent
    }

    // ネイティブのpoolのresetの後に、bookkeepingだけを空にする
    pub(crate) fn forget_children(&mut self) -> Vec<P::Child> {
        self.children.drain()
    }

    /// このpoolのid
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 子オブジェクトを解放する
    ///
    /// このpoolで割り当てた生きているidでなければ`InvalidHandle`を返す。
    /// ネイティブの解放が失敗した場合はbookkeepingを変更しない。
    pub fn free(&mut self, id: ChildId<P::Child>) -> Result<()> {
        self.free_many(&[id])
    }

    /// 複数の子オブジェクトを一度のネイティブの解放でまとめて解放する
    ///
    /// 一つでも無効なidや重複があれば、何も解放せずに`InvalidHandle`を返す。
    pub fn free_many(&mut self, ids: &[ChildId<P::Child>]) -> Result<()> {
        let mut raws = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(Error::InvalidHandle("child id passed twice"));
            }
            raws.push(self.raw_child(*id)?);
        }
        if raws.is_empty() {
            return Ok(());
        }

        for raw in &raws {
            tracing::debug!("Freeing {} {:?}", <P::Child as PoolChild>::NAME, raw);
        }
        unsafe { self.parent.free_children(&raws) }
            .map_err(Error::vulkan("free pool children"))?;
        for id in ids {
            self.children.remove(id.index, id.generation);
        }
        Ok(())
    }

    /// 子オブジェクトを取得する
    pub fn get(&self, id: ChildId<P::Child>) -> Option<&P::Child> {
        if id.pool != self.id {
            return None;
        }
        self.children.get(id.index, id.generation)
    }

    /// 子オブジェクトのネイティブのハンドルを取得する
    pub fn raw_child(&self, id: ChildId<P::Child>) -> Result<<P::Child as PoolChild>::Raw> {
        if id.pool != self.id {
            return Err(Error::InvalidHandle("child id belongs to another pool"));
        }
        self.children
            .get(id.index, id.generation)
            .map(|child| child.raw())
            .ok_or(Error::InvalidHandle("child id is not live in this pool"))
    }

    /// このpoolで割り当てた生きているidかどうか
    pub fn contains(&self, id: ChildId<P::Child>) -> bool {
        self.get(id).is_some()
    }

    /// 生きている子オブジェクトの数
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// 生きている子オブジェクトがないかどうか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 生きている子オブジェクトのidを列挙する
    pub fn ids(&self) -> impl Iterator<Item = ChildId<P::Child>> + '_ {
        self.children
            .iter()
            .map(move |(index, generation, _)| ChildId {
                pool: self.id,
                index,
                generation,
                _marker: PhantomData,
            })
    }
}

// Debugトレイトの実装
impl<P: PoolParent> Debug for OwningPool<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwningPool")
            .field("type", &P::NAME)
            .field("raw", self.parent.raw())
            .field("id", &self.id)
            .field("len", &self.len())
            .finish()
    }
}

// OwningPoolはネイティブのpoolのハンドルにDerefする
impl<P: PoolParent> Deref for OwningPool<P> {
    type Target = P::Raw;
    fn deref(&self) -> &Self::Target {
        self.parent.raw()
    }
}

// Drop時に残っている子オブジェクトをすべて解放してからpoolを破棄する
impl<P: PoolParent> Drop for OwningPool<P> {
    fn drop(&mut self) {
        let raw = *self.parent.raw();
        unsafe { self.parent.wait_idle() };

        let children = self
            .children
            .iter()
            .map(|(_, _, child)| child.raw())
            .collect::<Vec<_>>();
        if !children.is_empty() {
            tracing::debug!(
                "Freeing {} remaining {} from {} {:?}",
                children.len(),
                <P::Child as PoolChild>::NAME,
                P::NAME,
                raw
            );
            if let Err(result) = unsafe { self.parent.free_children(&children) } {
                tracing::error!(
                    "Failed to free {} {} from {} {:?}: {}",
                    children.len(),
                    <P::Child as PoolChild>::NAME,
                    P::NAME,
                    raw,
                    result
                );
            }
        }
        // 子オブジェクトが保持しているHandleはネイティブの解放の後に解放する
        drop(self.children.drain());

        tracing::debug!("Destroying {} {:?}", P::NAME, raw);
        unsafe { self.parent.destroy() };
        // parentのフィールドが保持しているDeviceHandleなどはこの後に解放される
    }
}
