//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Vulkanのオブジェクトの破棄の処理まで行うSharedHandleを定義する。
//!
//! 参照カウントの実装には「詳解 Rustアトミック操作とロック ―並行処理実装のための低レイヤプログラミング」の
//! Arcの実装を参考にしている。
//! メモリのOrderingなどは、それに準拠している。
//!
//! 破棄の順序は次の通り。
//! 1. 最後の参照がDropされると、`Resource::destroy`でネイティブのdestroy関数を一度だけ呼ぶ。
//! 2. その後Resourceのフィールドが破棄され、保持していた依存先のHandleの参照が解放される。
//!    依存先の参照がそれで最後なら、依存先の破棄も連鎖して行われる。

use ash::vk::Handle;
use std::{
    fmt::Debug,
    ops::Deref,
    ptr::NonNull,
    sync::atomic::{fence, AtomicUsize, Ordering},
};

/// SharedHandleで管理するVulkanのオブジェクト
///
/// 破棄に必要な所有者(DeviceHandleなど)と、作成時に使った依存先のHandleをフィールドとして持つ。
pub trait Resource: Send + Sync + Sized + 'static {
    /// ネイティブのハンドルの型
    type Raw: Handle + Copy + Debug;
    /// ログなどに使う名前
    const NAME: &'static str;

    /// ネイティブのハンドルを取得する
    fn raw(&self) -> &Self::Raw;

    /// ネイティブのdestroy関数を呼ぶ
    ///
    /// ## Safety
    /// 参照カウントが0になったときに一度だけ呼ばれる。呼んだ後にネイティブのハンドルを使ってはならない。
    unsafe fn destroy(&mut self);
}

struct SharedHandleData<T> {
    resource: T,
    ref_count: AtomicUsize,
}

/// Vulkanのオブジェクトを参照カウントで管理するためのハンドル
pub struct SharedHandle<T: Resource> {
    ptr: NonNull<SharedHandleData<T>>,
}
impl<T: Resource> SharedHandle<T> {
    pub(crate) fn new(resource: T) -> Self {
        tracing::trace!("Created {} {:?}", T::NAME, resource.raw());
        let data = Box::new(SharedHandleData {
            resource,
            ref_count: AtomicUsize::new(1),
        });
        Self {
            ptr: NonNull::from(Box::leak(data)),
        }
    }

    /// nullでないネイティブのハンドルを持っているかどうか
    pub fn is_valid(&self) -> bool {
        self.raw().as_raw() != 0
    }

    /// ネイティブのハンドルを取得する
    /// 少なくとも一つの参照が生きている間だけ有効。
    pub fn raw(&self) -> T::Raw {
        *self.resource().raw()
    }

    /// この参照を破棄する
    /// 最後の参照であればネイティブのオブジェクトも破棄される。
    pub fn destroy(self) {
        drop(self)
    }

    /// 現在の参照の数を取得する
    pub fn ref_count(&self) -> usize {
        self.data().ref_count.load(Ordering::Acquire)
    }

    /// 同じオブジェクトを指しているかどうか
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }

    pub(crate) fn resource(&self) -> &T {
        &self.data().resource
    }

    fn data(&self) -> &SharedHandleData<T> {
        unsafe { self.ptr.as_ref() }
    }
}

// Debugトレイトの実装
impl<T: Resource> Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedHandle")
            .field("type", &T::NAME)
            .field("raw", self.resource().raw())
            .finish()
    }
}

// SharedHandleDataの中身はSendかつSyncなのでSharedHandleはSend
unsafe impl<T: Resource> Send for SharedHandle<T> {}
// SharedHandleDataの中身はSendかつSyncなのでSharedHandleはSync
unsafe impl<T: Resource> Sync for SharedHandle<T> {}

// SharedHandleはネイティブのハンドルにDerefする
impl<T: Resource> Deref for SharedHandle<T> {
    type Target = T::Raw;
    fn deref(&self) -> &Self::Target {
        self.resource().raw()
    }
}

// Cloneで参照カウントを増やす
impl<T: Resource> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        if self.data().ref_count.fetch_add(1, Ordering::Relaxed) > usize::MAX / 2 {
            panic!("Too many references to {}", T::NAME);
        }
        Self { ptr: self.ptr }
    }
}

// Drop時に参照カウントを減らし、0になったら破棄する
impl<T: Resource> Drop for SharedHandle<T> {
    fn drop(&mut self) {
        if self.data().ref_count.fetch_sub(1, Ordering::Release) == 1 {
            fence(Ordering::Acquire);
            let mut data = unsafe { Box::from_raw(self.ptr.as_ptr()) };
            let raw = *data.resource.raw();
            if raw.as_raw() != 0 {
                tracing::debug!("Destroying {} {:?}", T::NAME, raw);
                unsafe { data.resource.destroy() };
            }
            // dataのDropで依存先のHandleの参照が解放される
        }
    }
}

/// 作成途中のVulkanのオブジェクト
///
/// メモリのバインドなど、作成後の処理が失敗した場合にDropでネイティブのオブジェクトを破棄する。
/// 全ての処理が成功したら`share`でSharedHandleにする。
pub(crate) struct PendingHandle<T: Resource> {
    resource: Option<T>,
}
impl<T: Resource> PendingHandle<T> {
    pub(crate) fn new(resource: T) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    pub(crate) fn resource_mut(&mut self) -> &mut T {
        self.resource
            .as_mut()
            .expect("PendingHandle is always populated until shared")
    }

    pub(crate) fn share(mut self) -> SharedHandle<T> {
        let resource = self
            .resource
            .take()
            .expect("PendingHandle is always populated until shared");
        SharedHandle::new(resource)
    }
}
impl<T: Resource> Drop for PendingHandle<T> {
    fn drop(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            tracing::debug!(
                "Discarding partially created {} {:?}",
                T::NAME,
                resource.raw()
            );
            unsafe { resource.destroy() };
        }
    }
}
