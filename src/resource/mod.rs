//! Shared texture handles and their manager.

pub use crate::resource::texture::{GpuTexture, Texture, TextureWrapping};
pub use crate::resource::texture_manager::{Placeholders, TextureManager};

mod texture;
mod texture_manager;
