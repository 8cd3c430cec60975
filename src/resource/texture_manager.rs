//! A resource manager to load textures.

use image::{self, DynamicImage};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::resource::Texture;

/// The fallback textures substituted when a material slot is unset.
///
/// The original viewer keeps these as process-wide statics; here they are an
/// explicit value handed to [`GltfMaterial::bind`](crate::material::GltfMaterial::bind)
/// by the renderer.
#[derive(Clone)]
pub struct Placeholders {
    /// Fully-opaque white 1x1 texture, bound for unset base color,
    /// metallic-roughness and emissive slots.
    pub white: Arc<Texture>,
    /// Flat-normal 1x1 texture, bound for an unset normal map slot.
    pub flat_normal: Arc<Texture>,
}

impl Default for Placeholders {
    fn default() -> Self {
        Placeholders {
            white: Texture::white_placeholder(),
            flat_normal: Texture::flat_normal_placeholder(),
        }
    }
}

/// The texture manager.
///
/// It keeps a cache of already-decoded textures keyed by name, owns the
/// placeholder textures, and can decode new textures from images, memory or
/// files.
pub struct TextureManager {
    placeholders: Placeholders,
    textures: HashMap<String, Arc<Texture>>,
    generate_mipmaps: bool,
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureManager {
    /// Creates a new texture manager.
    pub fn new() -> TextureManager {
        TextureManager {
            placeholders: Placeholders::default(),
            textures: HashMap::new(),
            generate_mipmaps: false,
        }
    }

    /// The placeholder textures used for unset material slots.
    pub fn placeholders(&self) -> Placeholders {
        self.placeholders.clone()
    }

    /// Gets the default, completely white, texture.
    pub fn white(&self) -> Arc<Texture> {
        self.placeholders.white.clone()
    }

    /// Gets the flat-normal texture.
    pub fn flat_normal(&self) -> Arc<Texture> {
        self.placeholders.flat_normal.clone()
    }

    /// Get a texture with the specified name. Returns `None` if the texture is not registered.
    pub fn get(&self, name: &str) -> Option<Arc<Texture>> {
        self.textures.get(name).cloned()
    }

    /// Allocates a new texture read from a `DynamicImage` object.
    ///
    /// If a texture with same name exists, nothing is created and the old texture is returned.
    pub fn add_image(&mut self, image: DynamicImage, name: &str) -> Arc<Texture> {
        let generate_mipmaps = self.generate_mipmaps;
        match self.textures.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut().clone(),
            Entry::Vacant(entry) => {
                log::debug!("decoded texture {:?}", name);
                entry
                    .insert(Texture::from_image(image, name, generate_mipmaps))
                    .clone()
            }
        }
    }

    /// Allocates a new texture and tries to decode it from a bytes array.
    /// Panics if unable to do so.
    /// If a texture with same name exists, nothing is created and the old texture is returned.
    pub fn add_image_from_memory(&mut self, image_data: &[u8], name: &str) -> Arc<Texture> {
        self.add_image(
            image::load_from_memory(image_data).expect("Invalid data"),
            name,
        )
    }

    /// Allocates a new texture read from a file. If a texture with same name exists, nothing is
    /// created and the old texture is returned.
    pub fn add(&mut self, path: &Path, name: &str) -> Arc<Texture> {
        if let Some(tex) = self.textures.get(name) {
            return tex.clone();
        }
        let image = image::open(path)
            .unwrap_or_else(|e| panic!("Unable to load texture from file {:?}: {:?}", path, e));
        self.add_image(image, name)
    }

    /// Removes a texture from the cache. Materials still holding the handle
    /// keep it alive.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Texture>> {
        self.textures.remove(name)
    }

    /// Changes whether textures will have mipmaps generated when they are
    /// loaded; does not affect already loaded textures.
    /// Mipmap generation is disabled by default.
    pub fn set_generate_mipmaps(&mut self, enabled: bool) {
        self.generate_mipmaps = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_textures_are_shared() {
        let mut manager = TextureManager::new();
        let img = DynamicImage::new_rgba8(2, 2);
        let a = manager.add_image(img.clone(), "checker");
        let b = manager.add_image(img, "checker");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn removal_does_not_invalidate_held_handles() {
        let mut manager = TextureManager::new();
        let tex = manager.add_image(DynamicImage::new_rgba8(1, 1), "t");
        manager.remove("t");
        assert!(manager.get("t").is_none());
        assert_eq!(tex.size(), (1, 1));
    }

    #[test]
    fn placeholders_are_stable_across_calls() {
        let manager = TextureManager::new();
        assert!(Arc::ptr_eq(&manager.white(), &manager.placeholders().white));
        assert!(Arc::ptr_eq(
            &manager.flat_normal(),
            &manager.placeholders().flat_normal
        ));
    }
}
