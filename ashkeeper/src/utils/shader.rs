use crate::Result;
use ash::vk;
use std::io::Cursor;

/// bytesを与えてShaderModuleを作成するヘルパー関数
///
/// SPIR-Vのマジックナンバーからエンディアンを判定する。
pub fn create_shader_module(
    device: &crate::DeviceHandle,
    bytes: &[u8],
) -> Result<crate::ShaderModuleHandle> {
    let words = ash::util::read_spv(&mut Cursor::new(bytes))?;
    let create_info = vk::ShaderModuleCreateInfo::builder().code(&words);
    device.create_shader_module(&create_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mock, Error};

    // SPIR-Vのヘッダーだけのモジュール
    const HEADER: [u32; 5] = [0x0723_0203, 0x0001_0000, 0, 1, 0];

    #[test]
    fn accepts_little_endian_spirv() {
        let (device, log) = mock::device();
        let bytes = HEADER
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect::<Vec<_>>();
        let module = create_shader_module(&device, &bytes).unwrap();
        assert_eq!(log.created("shader module").len(), 1);
        assert!(module.is_valid());
    }

    #[test]
    fn rejects_truncated_code() {
        let (device, log) = mock::device();
        let err = create_shader_module(&device, &[0x03, 0x02, 0x23]).unwrap_err();
        assert!(matches!(err, Error::ShaderCode(_)));
        assert!(log.calls().is_empty());
    }
}
