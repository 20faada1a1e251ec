use crate::{Flags, ImageUsage, Result};
use ash::vk;

/// 2DのImageCreateInfoを作成する関数
pub fn image_2d_create_info(
    format: vk::Format,
    extent: vk::Extent2D,
    usage: Flags<ImageUsage>,
) -> vk::ImageCreateInfo {
    vk::ImageCreateInfo::builder()
        .image_type(vk::ImageType::TYPE_2D)
        .format(format)
        .extent(vk::Extent3D {
            width: extent.width,
            height: extent.height,
            depth: 1,
        })
        .mip_levels(1)
        .array_layers(1)
        .samples(vk::SampleCountFlags::TYPE_1)
        .tiling(vk::ImageTiling::OPTIMAL)
        .usage(usage.into())
        .sharing_mode(vk::SharingMode::EXCLUSIVE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .build()
}

/// フォーマットからImageAspectFlagsを決める
pub fn aspect_mask(format: vk::Format) -> vk::ImageAspectFlags {
    match format {
        vk::Format::D16_UNORM | vk::Format::D32_SFLOAT | vk::Format::X8_D24_UNORM_PACK32 => {
            vk::ImageAspectFlags::DEPTH
        }
        vk::Format::D16_UNORM_S8_UINT
        | vk::Format::D24_UNORM_S8_UINT
        | vk::Format::D32_SFLOAT_S8_UINT => {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        }
        vk::Format::S8_UINT => vk::ImageAspectFlags::STENCIL,
        _ => vk::ImageAspectFlags::COLOR,
    }
}

/// 2DのImageViewCreateInfoを作成する関数
/// imageは作成時に上書きされるので設定しない。
pub fn image_view_2d_create_info(format: vk::Format) -> vk::ImageViewCreateInfo {
    vk::ImageViewCreateInfo::builder()
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping::default())
        .subresource_range(
            vk::ImageSubresourceRange::builder()
                .aspect_mask(aspect_mask(format))
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1)
                .build(),
        )
        .build()
}

/// Image全体を指す2DのImageViewを作成する関数
pub fn create_image_view_2d(image: &crate::ImageHandle) -> Result<crate::ImageViewHandle> {
    image
        .device()
        .create_image_view(image, &image_view_2d_create_info(image.format()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_format() {
        assert_eq!(
            aspect_mask(vk::Format::R8G8B8A8_UNORM),
            vk::ImageAspectFlags::COLOR
        );
        assert_eq!(aspect_mask(vk::Format::D32_SFLOAT), vk::ImageAspectFlags::DEPTH);
        assert!(aspect_mask(vk::Format::D24_UNORM_S8_UINT).contains(vk::ImageAspectFlags::STENCIL));
    }

    #[test]
    fn image_info_uses_flags_mask() {
        let info = image_2d_create_info(
            vk::Format::R8G8B8A8_UNORM,
            vk::Extent2D {
                width: 8,
                height: 4,
            },
            ImageUsage::Storage | ImageUsage::TransferSrc,
        );
        assert_eq!(
            info.usage,
            vk::ImageUsageFlags::STORAGE | vk::ImageUsageFlags::TRANSFER_SRC
        );
        assert_eq!(info.extent.depth, 1);
    }
}
