//! 一つの列挙型のビットだけを混ぜられるようにしたビットマスクFlags<E>を定義する。
//!
//! 実行時の表現はVulkanのネイティブのマスク(vk::Flags)と同一で、
//! `.into()`でashの各種Flags型にそのまま変換できる。

use ash::vk;
use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

/// Flags<E>に入れられるビットの列挙型
pub trait FlagBits: Copy + Debug + 'static {
    /// 対応するashのFlags型
    type Native: Copy;
    /// すべての列挙子
    const ALL: &'static [Self];

    /// 列挙子のネイティブのビット
    fn bits(self) -> vk::Flags;

    /// 生のマスクからashのFlags型を作る
    fn to_native(mask: vk::Flags) -> Self::Native;
}

/// 列挙型Eのビットだけを持つビットマスク
#[repr(transparent)]
pub struct Flags<E> {
    mask: vk::Flags,
    _marker: PhantomData<fn() -> E>,
}
impl<E: FlagBits> Flags<E> {
    /// 空のマスク
    pub const fn empty() -> Self {
        Self::from_raw(0)
    }

    /// 生のマスクから作成する
    pub const fn from_raw(mask: vk::Flags) -> Self {
        Self {
            mask,
            _marker: PhantomData,
        }
    }

    /// 生のマスクを取得する
    pub const fn bits(self) -> vk::Flags {
        self.mask
    }

    /// 一つもビットが立っていないかどうか
    pub const fn is_empty(self) -> bool {
        self.mask == 0
    }

    /// 指定したビットがすべて立っているかどうか
    pub fn contains(self, other: impl Into<Flags<E>>) -> bool {
        let other = other.into();
        self.mask & other.mask == other.mask
    }

    /// ashのFlags型に変換する
    pub fn native(self) -> E::Native {
        E::to_native(self.mask)
    }
}

impl<E> Clone for Flags<E> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<E> Copy for Flags<E> {}
impl<E> PartialEq for Flags<E> {
    fn eq(&self, other: &Self) -> bool {
        self.mask == other.mask
    }
}
impl<E> Eq for Flags<E> {}
impl<E> Hash for Flags<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mask.hash(state);
    }
}
impl<E: FlagBits> Default for Flags<E> {
    fn default() -> Self {
        Self::empty()
    }
}

// Debugトレイトの実装
impl<E: FlagBits> Debug for Flags<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = E::ALL
            .iter()
            .filter(|bit| self.mask & bit.bits() == bit.bits() && bit.bits() != 0);
        f.debug_tuple("Flags")
            .field(&format_args!("{:#x}", self.mask))
            .field(&set.collect::<Vec<_>>())
            .finish()
    }
}

impl<E: FlagBits> From<E> for Flags<E> {
    fn from(bit: E) -> Self {
        Self::from_raw(bit.bits())
    }
}

impl<E: FlagBits, R: Into<Flags<E>>> BitOr<R> for Flags<E> {
    type Output = Self;
    fn bitor(self, rhs: R) -> Self::Output {
        Self::from_raw(self.mask | rhs.into().mask)
    }
}
impl<E: FlagBits, R: Into<Flags<E>>> BitAnd<R> for Flags<E> {
    type Output = Self;
    fn bitand(self, rhs: R) -> Self::Output {
        Self::from_raw(self.mask & rhs.into().mask)
    }
}
impl<E: FlagBits, R: Into<Flags<E>>> BitOrAssign<R> for Flags<E> {
    fn bitor_assign(&mut self, rhs: R) {
        self.mask |= rhs.into().mask;
    }
}
impl<E: FlagBits, R: Into<Flags<E>>> BitAndAssign<R> for Flags<E> {
    fn bitand_assign(&mut self, rhs: R) {
        self.mask &= rhs.into().mask;
    }
}
// ネイティブのマスクと同じく全ビットを反転する
impl<E: FlagBits> Not for Flags<E> {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self::from_raw(!self.mask)
    }
}

macro_rules! flag_bits {
    (
        $(#[$meta:meta])*
        $name:ident => $native:ty {
            $($(#[$variant_meta:meta])* $variant:ident = $bit:ident,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$variant_meta])* $variant,)+
        }
        impl FlagBits for $name {
            type Native = $native;
            const ALL: &'static [Self] = &[$(Self::$variant,)+];

            fn bits(self) -> vk::Flags {
                match self {
                    $(Self::$variant => <$native>::$bit.as_raw(),)+
                }
            }

            fn to_native(mask: vk::Flags) -> Self::Native {
                <$native>::from_raw(mask)
            }
        }
        impl From<Flags<$name>> for $native {
            fn from(flags: Flags<$name>) -> Self {
                <$native>::from_raw(flags.bits())
            }
        }
        impl<R: Into<Flags<$name>>> BitOr<R> for $name {
            type Output = Flags<$name>;
            fn bitor(self, rhs: R) -> Self::Output {
                Flags::from(self) | rhs
            }
        }
        impl<R: Into<Flags<$name>>> BitAnd<R> for $name {
            type Output = Flags<$name>;
            fn bitand(self, rhs: R) -> Self::Output {
                Flags::from(self) & rhs
            }
        }
    };
}

flag_bits! {
    /// Bufferの用途
    BufferUsage => vk::BufferUsageFlags {
        /// 転送元
        TransferSrc = TRANSFER_SRC,
        /// 転送先
        TransferDst = TRANSFER_DST,
        /// uniform buffer
        UniformBuffer = UNIFORM_BUFFER,
        /// storage buffer
        StorageBuffer = STORAGE_BUFFER,
        /// index buffer
        IndexBuffer = INDEX_BUFFER,
        /// vertex buffer
        VertexBuffer = VERTEX_BUFFER,
        /// indirect buffer
        IndirectBuffer = INDIRECT_BUFFER,
        /// device addressの取得
        ShaderDeviceAddress = SHADER_DEVICE_ADDRESS,
    }
}

flag_bits! {
    /// Imageの用途
    ImageUsage => vk::ImageUsageFlags {
        /// 転送元
        TransferSrc = TRANSFER_SRC,
        /// 転送先
        TransferDst = TRANSFER_DST,
        /// sampled image
        Sampled = SAMPLED,
        /// storage image
        Storage = STORAGE,
        /// color attachment
        ColorAttachment = COLOR_ATTACHMENT,
        /// depth stencil attachment
        DepthStencilAttachment = DEPTH_STENCIL_ATTACHMENT,
    }
}

flag_bits! {
    /// シェーダーステージ
    ShaderStage => vk::ShaderStageFlags {
        /// vertex shader
        Vertex = VERTEX,
        /// fragment shader
        Fragment = FRAGMENT,
        /// compute shader
        Compute = COMPUTE,
    }
}

flag_bits! {
    /// CommandPoolの作成フラグ
    CommandPoolCreate => vk::CommandPoolCreateFlags {
        /// 短命なcommand buffer
        Transient = TRANSIENT,
        /// command bufferを個別にリセットできる
        ResetCommandBuffer = RESET_COMMAND_BUFFER,
    }
}

flag_bits! {
    /// DescriptorPoolの作成フラグ
    DescriptorPoolCreate => vk::DescriptorPoolCreateFlags {
        /// descriptor setを個別に解放できる
        FreeDescriptorSet = FREE_DESCRIPTOR_SET,
        /// update after bind
        UpdateAfterBind = UPDATE_AFTER_BIND,
    }
}

flag_bits! {
    /// Fenceの作成フラグ
    FenceCreate => vk::FenceCreateFlags {
        /// シグナル状態で作成する
        Signaled = SIGNALED,
    }
}
