//! # Utility functions and structs
//! Vulkanの本体には存在しないがあると便利なutilityの関数たち。

mod buffer;
pub use buffer::*;
mod image;
pub use image::*;
mod render_pass;
pub use render_pass::*;
mod shader;
pub use shader::*;
mod sync_objects;
pub use sync_objects::*;
