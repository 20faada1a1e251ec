//! ashkeeperのエラー型を定義する。
//!
//! 作成や割り当ての失敗は必ず呼び出し元に返す。
//! 破棄の失敗はVulkan側に回復手段がないので返さずにログに残すだけにする。

use ash::vk;
use thiserror::Error;

/// ashkeeperのエラー
#[derive(Debug, Error)]
pub enum Error {
    /// nullのHandleに対する操作や、割り当てたpoolとは別のpoolでの解放
    #[error("Invalid handle: {0}")]
    InvalidHandle(&'static str),
    /// ネイティブの作成関数が失敗した
    #[error("Failed to create {what}: {result}")]
    CreationFailed {
        /// 作成しようとしたオブジェクト
        what: &'static str,
        /// ネイティブのステータスコード
        result: vk::Result,
    },
    /// poolからの割り当てが容量不足などで失敗した
    #[error("Failed to allocate from {what}, pool exhausted: {result}")]
    AllocationExhausted {
        /// 割り当てようとしたオブジェクト
        what: &'static str,
        /// ネイティブのステータスコード
        result: vk::Result,
    },
    /// 作成以外のネイティブ呼び出しが失敗した
    #[error("Vulkan call {call} failed: {result}")]
    Vulkan {
        /// 呼び出した関数
        call: &'static str,
        /// ネイティブのステータスコード
        result: vk::Result,
    },
    /// gpu-allocatorでのメモリ割り当てに失敗した
    #[error("Failed to allocate memory: {0}")]
    Memory(#[from] gpu_allocator::AllocationError),
    /// Vulkanのローダーの読み込みに失敗した
    #[error("Failed to load Vulkan: {0}")]
    Loading(#[from] ash::LoadingError),
    /// 名前などの文字列に途中のNULが含まれていた
    #[error("Invalid name: {0}")]
    InvalidName(#[from] std::ffi::NulError),
    /// SPIR-Vの読み込みに失敗した
    #[error("Invalid shader code: {0}")]
    ShaderCode(#[from] std::io::Error),
}

/// ashkeeperのResult型
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// 作成失敗のエラーに変換するクロージャを返す
    pub(crate) fn creation(what: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::CreationFailed { what, result }
    }

    /// pool割り当て失敗のエラーに変換するクロージャを返す
    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| match result {
            vk::Result::ERROR_OUT_OF_POOL_MEMORY
            | vk::Result::ERROR_FRAGMENTED_POOL
            | vk::Result::ERROR_OUT_OF_HOST_MEMORY
            | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => Self::AllocationExhausted { what, result },
            result => Self::CreationFailed { what, result },
        }
    }

    /// ネイティブ呼び出し失敗のエラーに変換するクロージャを返す
    pub(crate) fn vulkan(call: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::Vulkan { call, result }
    }

    /// ネイティブのステータスコードがあれば取得する
    pub fn vk_result(&self) -> Option<vk::Result> {
        match self {
            Self::CreationFailed { result, .. }
            | Self::AllocationExhausted { result, .. }
            | Self::Vulkan { result, .. } => Some(*result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_codes_map_to_allocation_exhausted() {
        let err = Error::allocation("descriptor set")(vk::Result::ERROR_OUT_OF_POOL_MEMORY);
        assert!(matches!(err, Error::AllocationExhausted { .. }));
        assert_eq!(err.vk_result(), Some(vk::Result::ERROR_OUT_OF_POOL_MEMORY));

        let err = Error::allocation("descriptor set")(vk::Result::ERROR_FRAGMENTED_POOL);
        assert!(matches!(err, Error::AllocationExhausted { .. }));
    }

    #[test]
    fn other_allocation_codes_stay_creation_failures() {
        let err = Error::allocation("command buffer")(vk::Result::ERROR_DEVICE_LOST);
        assert!(matches!(
            err,
            Error::CreationFailed {
                what: "command buffer",
                result: vk::Result::ERROR_DEVICE_LOST
            }
        ));
    }
}
