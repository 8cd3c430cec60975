//! glTF PBR material state and binding.

pub use crate::material::fetched::FetchedMaterial;
pub use crate::material::gltf::{AlphaMode, GltfMaterial, TextureSlot, TextureTransform};

mod fetched;
mod gltf;
