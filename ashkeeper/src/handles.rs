//! Vulkanの各Objectを参照カウンタで管理して、参照がすべて破棄された際に
//! 自動で各種destroy処理を行うようにしたラッパーの構造体の各種Handleを用意している。
//!
//! すべてのHandleは[`SharedHandle`]に各Resourceを入れたもので、
//! Resourceは作成に使った依存先のHandleをフィールドとして保持する。

mod shared;
pub(crate) use shared::PendingHandle;
pub use shared::{Resource, SharedHandle};

mod instance;
pub use instance::{Instance, InstanceDesc, InstanceHandle};
mod surface;
pub use surface::{Surface, SurfaceHandle};
mod device;
pub use device::{Device, DeviceHandle};
mod queue;
pub use queue::Queue;
mod memory;
pub use memory::{BoundMemory, DeviceMemory, DeviceMemoryHandle};
mod allocator;
pub use allocator::AllocatorHandle;
mod buffer;
pub use buffer::{Buffer, BufferHandle};
mod image;
pub use image::{Image, ImageHandle};
mod image_view;
pub use image_view::{ImageView, ImageViewHandle};
mod sampler;
pub use sampler::{Sampler, SamplerHandle};
mod render_pass;
pub use render_pass::{RenderPass, RenderPassHandle};
mod framebuffer;
pub use framebuffer::{Framebuffer, FramebufferHandle};
mod shader_module;
pub use shader_module::{ShaderModule, ShaderModuleHandle};
mod descriptor_set_layout;
pub use descriptor_set_layout::{DescriptorSetLayout, DescriptorSetLayoutHandle};
mod pipeline_layout;
pub use pipeline_layout::{PipelineLayout, PipelineLayoutHandle};
mod pipeline;
pub use pipeline::{Pipeline, PipelineHandle, ShaderStageDesc};
mod semaphore;
pub use semaphore::{Semaphore, SemaphoreHandle};
mod fence;
pub use fence::{Fence, FenceHandle};
mod swapchain;
pub use swapchain::{Swapchain, SwapchainHandle};
