use anyhow::{Context, Result};
use ash::vk;
use ashkeeper::{utils, CommandPoolCreate, ImageUsage, InstanceDesc, InstanceHandle};
use gpu_allocator::MemoryLocation;
use std::ffi::CStr;
use tracing_subscriber::filter::LevelFilter;

const EXTENT: vk::Extent2D = vk::Extent2D {
    width: 256,
    height: 256,
};
const FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

// graphicsに対応したqueue familyを持つPhysicalDeviceを選ぶ
fn select_physical_device(instance: &InstanceHandle) -> Result<(vk::PhysicalDevice, u32)> {
    for physical_device in instance.enumerate_physical_devices()? {
        let properties = instance.get_physical_device_properties(physical_device);
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) };
        let family = instance
            .get_physical_device_queue_family_properties(physical_device)
            .iter()
            .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS));
        if let Some(family) = family {
            tracing::info!("Selected physical device: {:?}", name);
            return Ok((physical_device, family as u32));
        }
        tracing::debug!("Skipped physical device without graphics queue: {:?}", name);
    }
    anyhow::bail!("No physical device with a graphics queue")
}

fn main() -> Result<()> {
    // HEADLESS_LOG=debugなどでログレベルを変える
    let level = std::env::var("HEADLESS_LOG")
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    // instance -> device
    let instance = InstanceHandle::create(&InstanceDesc {
        application_name: "headless".to_string(),
        ..Default::default()
    })
    .context("Failed to create instance")?;
    let (physical_device, queue_family_index) = select_physical_device(&instance)?;
    let queue_priorities = [1.0];
    let queue_create_infos = [vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(queue_family_index)
        .queue_priorities(&queue_priorities)
        .build()];
    let device_create_info =
        vk::DeviceCreateInfo::builder().queue_create_infos(&queue_create_infos);
    let device = instance
        .create_device(physical_device, &device_create_info)
        .context("Failed to create device")?;
    // 以降はdeviceがinstanceを保持している
    drop(instance);
    let queue = device.get_queue(queue_family_index, 0);
    let allocator = device
        .create_allocator(false)
        .context("Failed to create allocator")?;

    // image -> image view -> framebuffer
    let image = allocator
        .create_image(
            &utils::image_2d_create_info(
                FORMAT,
                EXTENT,
                ImageUsage::ColorAttachment | ImageUsage::TransferSrc,
            ),
            MemoryLocation::GpuOnly,
            "headless color target",
        )
        .context("Failed to create image")?;
    let image_view = utils::create_image_view_2d(&image)?;
    let render_pass = utils::create_color_render_pass(&device, FORMAT)?;
    let framebuffer = utils::create_framebuffer(&render_pass, &[image_view.clone()], EXTENT)?;
    // render passはframebufferが保持しているので破棄されない
    drop(render_pass);
    tracing::info!(
        "Framebuffer {:?} holds render pass {:?}",
        framebuffer.raw(),
        framebuffer.render_pass().raw()
    );

    // command pool
    let mut command_pool = queue
        .create_command_pool(CommandPoolCreate::ResetCommandBuffer.into())
        .context("Failed to create command pool")?;
    let command_buffers =
        command_pool.allocate_command_buffers(vk::CommandBufferLevel::PRIMARY, 2)?;
    command_pool.free(command_buffers[0])?;
    tracing::info!("{} command buffer left in the pool", command_pool.len());

    // 空のsubmitをfenceで待つ
    let fence = utils::create_fence(&device)?;
    queue.submit(&[], Some(&fence))?;
    fence.wait(u64::MAX).context("Failed to wait for fence")?;

    // 残りのcommand bufferはpoolと一緒に解放される
    drop(command_pool);
    drop(framebuffer);
    drop(image_view);
    drop(image);
    tracing::info!("Done");
    Ok(())
}
