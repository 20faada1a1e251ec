//! Vulkanのオブジェクトの破棄忘れや破棄順序の間違いをなくすために用意したラッパーライブラリ。
//! Vulkanの各Objectを参照カウンタで管理して、参照がすべて破棄された際に
//! 自動で各種destroy処理を行うようにしたラッパーの構造体の各種Handleが用意されている。
//!
//! 各Handleは作成に使ったHandle(依存先)を内部に保持しているので、
//! 依存先は依存元がすべて破棄されるまで破棄されない。
//! 例えばFramebufferHandleはRenderPassHandleを保持している。
//!
//! CommandBufferやDescriptorSetのようにVulkanのpoolから割り当てられるオブジェクトは
//! 参照カウントではなく[`OwningPool`]が所有して管理する。
//! poolが破棄されるときに残っている子オブジェクトはすべて解放される。
//!
//! ネイティブのVulkanの呼び出しはすべて[`RawDevice`]を経由する。
//! Vulkanの標準以上の便利メソッドはutilsの中で提供する方針。
#![warn(missing_docs)]

pub mod error;
pub use error::{Error, Result};

pub mod flags;
pub use flags::*;

pub mod raw;
pub use raw::{AshContext, AshDevice, RawDevice};

pub mod handles;
pub use handles::*;

pub mod pool;
pub use pool::*;

pub mod utils;

#[cfg(test)]
mod mock;

pub use ash;
