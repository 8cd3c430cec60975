//! Shared texture handles.
//!
//! A [`Texture`] is a reference-counted handle owned jointly by the texture
//! cache and every material that references it. The handle carries the decoded
//! RGBA pixels; the GPU resources are created lazily on first bind, through
//! the global [`Context`].

use image::{DynamicImage, GenericImageView};
use std::sync::{Arc, OnceLock};

use crate::context::Context;

/// Wrapping parameters for a texture.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum TextureWrapping {
    /// Repeats the texture when a texture coordinate is out of bounds.
    Repeat,
    /// Repeats the mirrored texture when a texture coordinate is out of bounds.
    MirroredRepeat,
    /// Repeats the nearest edge point texture color when a texture coordinate is out of bounds.
    ClampToEdge,
}

impl From<TextureWrapping> for wgpu::AddressMode {
    #[inline]
    fn from(val: TextureWrapping) -> Self {
        match val {
            TextureWrapping::Repeat => wgpu::AddressMode::Repeat,
            TextureWrapping::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
            TextureWrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// The GPU half of a texture: the wgpu texture, its view and its sampler.
pub struct GpuTexture {
    /// The underlying wgpu texture.
    pub texture: wgpu::Texture,
    /// The texture view for binding.
    pub view: wgpu::TextureView,
    /// The sampler for the texture.
    pub sampler: wgpu::Sampler,
}

/// A shared texture handle.
///
/// Materials hold these as `Arc<Texture>`; an unset material slot is simply
/// `None`. The pixels live on the CPU from the moment the handle is created
/// (decode time), so handles can exist before any GPU device does.
pub struct Texture {
    name: String,
    size: (u32, u32),
    pixels: Vec<u8>,
    wrapping: TextureWrapping,
    generate_mipmaps: bool,
    gpu: OnceLock<GpuTexture>,
}

impl Texture {
    /// Creates a texture handle from raw RGBA8 pixels.
    ///
    /// # Panics
    /// Panics if `pixels.len() != width * height * 4`.
    pub fn from_pixels(
        name: &str,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        wrapping: TextureWrapping,
        generate_mipmaps: bool,
    ) -> Arc<Texture> {
        assert_eq!(
            pixels.len(),
            (width * height * 4) as usize,
            "texture {:?}: pixel buffer does not match {}x{} RGBA8",
            name,
            width,
            height
        );

        Arc::new(Texture {
            name: name.to_string(),
            size: (width, height),
            pixels,
            wrapping,
            generate_mipmaps,
            gpu: OnceLock::new(),
        })
    }

    /// Creates a texture handle from a decoded image.
    pub fn from_image(image: DynamicImage, name: &str, generate_mipmaps: bool) -> Arc<Texture> {
        let (width, height) = image.dimensions();
        let pixels = image.to_rgba8().into_raw();
        Self::from_pixels(
            name,
            width,
            height,
            pixels,
            TextureWrapping::ClampToEdge,
            generate_mipmaps,
        )
    }

    /// Creates the fully-opaque white 1x1 placeholder.
    pub fn white_placeholder() -> Arc<Texture> {
        Self::from_pixels(
            "placeholder_white",
            1,
            1,
            vec![255, 255, 255, 255],
            TextureWrapping::Repeat,
            false,
        )
    }

    /// Creates the flat-normal 1x1 placeholder (a normal pointing straight
    /// out of the surface, encoded as 0.5, 0.5, 1.0).
    pub fn flat_normal_placeholder() -> Arc<Texture> {
        Self::from_pixels(
            "placeholder_flat_normal",
            1,
            1,
            vec![128, 128, 255, 255],
            TextureWrapping::Repeat,
            false,
        )
    }

    /// The name this texture was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Texture dimensions (width, height).
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// The decoded RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the GPU resources, uploading the pixels on first use.
    ///
    /// # Panics
    /// Panics if the global [`Context`] has not been initialized.
    pub fn gpu(&self) -> &GpuTexture {
        self.gpu.get_or_init(|| self.upload())
    }

    /// Whether the pixels have already been uploaded to the GPU.
    pub fn is_resident(&self) -> bool {
        self.gpu.get().is_some()
    }

    fn upload(&self) -> GpuTexture {
        let ctxt = Context::get();
        let (width, height) = self.size;

        let mip_level_count = if self.generate_mipmaps {
            (width.max(height) as f32).log2().floor() as u32 + 1
        } else {
            1
        };

        let texture = ctxt.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.name),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut data = self.pixels.clone();
        let mut level_width = width;
        let mut level_height = height;

        for mip_level in 0..mip_level_count {
            if mip_level > 0 {
                data = downsample_rgba(&data, level_width, level_height);
                level_width = (level_width / 2).max(1);
                level_height = (level_height / 2).max(1);
            }

            ctxt.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level_width * 4),
                    rows_per_image: Some(level_height),
                },
                wgpu::Extent3d {
                    width: level_width,
                    height: level_height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let address_mode = self.wrapping.into();
        let sampler = ctxt.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: if self.generate_mipmaps {
                wgpu::FilterMode::Linear
            } else {
                wgpu::FilterMode::Nearest
            },
            ..Default::default()
        });

        log::trace!(
            "uploaded texture {:?} ({}x{}, {} mip levels)",
            self.name,
            width,
            height,
            mip_level_count
        );

        GpuTexture {
            texture,
            view,
            sampler,
        }
    }
}

/// Downsamples an RGBA image by half using a box filter.
fn downsample_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let new_width = (width / 2).max(1);
    let new_height = (height / 2).max(1);
    let mut out = vec![0u8; (new_width * new_height * 4) as usize];

    for y in 0..new_height as usize {
        for x in 0..new_width as usize {
            let mut acc = [0u32; 4];
            let mut count = 0u32;

            // 2x2 block from the source, fewer pixels at the edges.
            for dy in 0..2 {
                for dx in 0..2 {
                    let sx = x * 2 + dx;
                    let sy = y * 2 + dy;
                    if sx < width as usize && sy < height as usize {
                        let idx = (sy * width as usize + sx) * 4;
                        for c in 0..4 {
                            acc[c] += data[idx + c] as u32;
                        }
                        count += 1;
                    }
                }
            }

            let dst = (y * new_width as usize + x) * 4;
            for c in 0..4 {
                out[dst + c] = (acc[c] / count) as u8;
            }
        }
    }

    out
}
