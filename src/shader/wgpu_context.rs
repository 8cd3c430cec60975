//! wgpu-backed shader context.
//!
//! Stages the named uniforms of the PBR shader into a single uniform buffer
//! and the four texture channels into a cached bind group. The pipeline that
//! consumes the two bind groups is owned by the host renderer.

use bytemuck::{Pod, Zeroable};
use glamx::Vec3;
use std::sync::Arc;

use crate::context::Context;
use crate::resource::Texture;
use crate::shader::{PbrUniform, ShaderContext};

/// GPU layout of the scalar/vector uniforms, uploaded as one buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PbrUniforms {
    base_color_transform: [[f32; 4]; 2],
    normal_transform: [[f32; 4]; 2],
    metallic_roughness_transform: [[f32; 4]; 2],
    emissive_transform: [[f32; 4]; 2],
    emissive_color: [f32; 3],
    minimum_alpha: f32,
    roughness_factor: f32,
    metallic_factor: f32,
    _padding: [f32; 2],
}

impl Default for PbrUniforms {
    fn default() -> Self {
        Self {
            base_color_transform: identity_transform(),
            normal_transform: identity_transform(),
            metallic_roughness_transform: identity_transform(),
            emissive_transform: identity_transform(),
            emissive_color: [0.0; 3],
            minimum_alpha: -1.0,
            roughness_factor: 1.0,
            metallic_factor: 1.0,
            _padding: [0.0; 2],
        }
    }
}

fn identity_transform() -> [[f32; 4]; 2] {
    [[1.0, 1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]]
}

fn split_packed(value: &[f32; 8]) -> [[f32; 4]; 2] {
    [
        [value[0], value[1], value[2], value[3]],
        [value[4], value[5], value[6], value[7]],
    ]
}

// Texture channel order inside the texture bind group.
const CHANNEL_BASE_COLOR: usize = 0;
const CHANNEL_NORMAL: usize = 1;
const CHANNEL_METALLIC_ROUGHNESS: usize = 2;
const CHANNEL_EMISSIVE: usize = 3;
const CHANNEL_COUNT: usize = 4;

struct GpuState {
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group_layout: wgpu::BindGroupLayout,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group: Option<wgpu::BindGroup>,
    cached_texture_ptrs: [usize; CHANNEL_COUNT],
}

/// [`ShaderContext`] implementation that stages state for a wgpu pipeline.
///
/// Construction is cheap and GPU-free; the buffer and bind group layouts are
/// created on the first [`flush`](WgpuShaderContext::flush), which requires
/// the global [`Context`] to be initialized.
pub struct WgpuShaderContext {
    uniforms: PbrUniforms,
    uniforms_dirty: bool,
    textures: [Option<Arc<Texture>>; CHANNEL_COUNT],
    gpu: Option<GpuState>,
}

impl Default for WgpuShaderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WgpuShaderContext {
    /// Creates a new, empty shader context.
    pub fn new() -> WgpuShaderContext {
        WgpuShaderContext {
            uniforms: PbrUniforms::default(),
            uniforms_dirty: true,
            textures: [None, None, None, None],
            gpu: None,
        }
    }

    /// Uploads pending uniform values and refreshes the texture bind group.
    ///
    /// Call between binding a material and encoding the draw.
    ///
    /// # Panics
    /// Panics if the global [`Context`] has not been initialized.
    pub fn flush(&mut self) {
        let ctxt = Context::get();

        if self.gpu.is_none() {
            self.gpu = Some(Self::create_gpu_state(&ctxt, &self.uniforms));
            self.uniforms_dirty = false;
        } else if self.uniforms_dirty {
            let gpu = self.gpu.as_ref().unwrap();
            ctxt.write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
            self.uniforms_dirty = false;
        }

        self.refresh_texture_bind_group(&ctxt);
    }

    /// The bind group holding the uniform buffer, once [`flush`](Self::flush)
    /// has run.
    pub fn uniform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.uniform_bind_group)
    }

    /// The bind group holding the four texture channels. `None` until every
    /// channel has been bound and flushed.
    pub fn texture_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().and_then(|gpu| gpu.texture_bind_group.as_ref())
    }

    /// The layout of the uniform bind group, for pipeline assembly.
    pub fn uniform_bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.gpu.as_ref().map(|gpu| &gpu.uniform_bind_group_layout)
    }

    /// The layout of the texture bind group, for pipeline assembly.
    pub fn texture_bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.gpu.as_ref().map(|gpu| &gpu.texture_bind_group_layout)
    }

    fn create_gpu_state(ctxt: &Context, uniforms: &PbrUniforms) -> GpuState {
        let uniform_buffer = ctxt.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pbr_uniform_buffer"),
            size: std::mem::size_of::<PbrUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctxt.write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let uniform_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("pbr_uniform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pbr_uniform_bind_group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // One texture + sampler pair per channel: base color, normal,
        // metallic-roughness, emissive.
        let mut entries = Vec::with_capacity(CHANNEL_COUNT * 2);
        for channel in 0..CHANNEL_COUNT as u32 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: channel * 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: channel * 2 + 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        let texture_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("pbr_texture_bind_group_layout"),
                entries: &entries,
            });

        GpuState {
            uniform_buffer,
            uniform_bind_group_layout,
            uniform_bind_group,
            texture_bind_group_layout,
            texture_bind_group: None,
            cached_texture_ptrs: [0; CHANNEL_COUNT],
        }
    }

    fn refresh_texture_bind_group(&mut self, ctxt: &Context) {
        let Self { textures, gpu, .. } = self;
        let gpu = gpu.as_mut().unwrap();

        let ptrs: [usize; CHANNEL_COUNT] = std::array::from_fn(|i| {
            textures[i]
                .as_ref()
                .map(|t| Arc::as_ptr(t) as usize)
                .unwrap_or(0)
        });

        if gpu.texture_bind_group.is_some() && ptrs == gpu.cached_texture_ptrs {
            return;
        }

        if textures.iter().any(|t| t.is_none()) {
            // Shadow pass leaves the non-essential channels unbound; the
            // depth-only pipeline does not sample them.
            gpu.texture_bind_group = None;
            gpu.cached_texture_ptrs = ptrs;
            return;
        }

        let gpu_textures: Vec<_> = textures.iter().map(|t| t.as_ref().unwrap().gpu()).collect();

        let mut entries = Vec::with_capacity(CHANNEL_COUNT * 2);
        for (channel, tex) in gpu_textures.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: channel as u32 * 2,
                resource: wgpu::BindingResource::TextureView(&tex.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: channel as u32 * 2 + 1,
                resource: wgpu::BindingResource::Sampler(&tex.sampler),
            });
        }

        gpu.texture_bind_group = Some(ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pbr_texture_bind_group"),
            layout: &gpu.texture_bind_group_layout,
            entries: &entries,
        }));
        gpu.cached_texture_ptrs = ptrs;
    }

    fn channel_of(uniform: PbrUniform) -> Option<usize> {
        match uniform {
            PbrUniform::BumpMap => Some(CHANNEL_NORMAL),
            PbrUniform::SpecularMap => Some(CHANNEL_METALLIC_ROUGHNESS),
            PbrUniform::EmissiveMap => Some(CHANNEL_EMISSIVE),
            _ => None,
        }
    }
}

impl ShaderContext for WgpuShaderContext {
    fn bind_texture_unit(&mut self, unit: u32, texture: &Arc<Texture>) {
        debug_assert_eq!(unit, 0, "only texture unit 0 (base color) is direct-bound");
        self.textures[CHANNEL_BASE_COLOR] = Some(texture.clone());
    }

    fn bind_texture(&mut self, uniform: PbrUniform, texture: &Arc<Texture>) {
        match Self::channel_of(uniform) {
            Some(channel) => self.textures[channel] = Some(texture.clone()),
            None => log::warn!("{:?} is not a sampler slot", uniform),
        }
    }

    fn uniform_f32(&mut self, uniform: PbrUniform, value: f32) {
        match uniform {
            PbrUniform::MinimumAlpha => self.uniforms.minimum_alpha = value,
            PbrUniform::RoughnessFactor => self.uniforms.roughness_factor = value,
            PbrUniform::MetallicFactor => self.uniforms.metallic_factor = value,
            _ => {
                log::warn!("{:?} is not a scalar uniform", uniform);
                return;
            }
        }
        self.uniforms_dirty = true;
    }

    fn uniform_vec3(&mut self, uniform: PbrUniform, value: Vec3) {
        match uniform {
            PbrUniform::EmissiveColor => self.uniforms.emissive_color = value.to_array(),
            _ => {
                log::warn!("{:?} is not a vec3 uniform", uniform);
                return;
            }
        }
        self.uniforms_dirty = true;
    }

    fn uniform_packed8(&mut self, uniform: PbrUniform, value: &[f32; 8]) {
        match uniform {
            PbrUniform::TextureBaseColorTransform => {
                self.uniforms.base_color_transform = split_packed(value)
            }
            PbrUniform::TextureNormalTransform => {
                self.uniforms.normal_transform = split_packed(value)
            }
            PbrUniform::TextureMetallicRoughnessTransform => {
                self.uniforms.metallic_roughness_transform = split_packed(value)
            }
            PbrUniform::TextureEmissiveTransform => {
                self.uniforms.emissive_transform = split_packed(value)
            }
            _ => {
                log::warn!("{:?} is not a texture-transform uniform", uniform);
                return;
            }
        }
        self.uniforms_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_requires_no_gpu() {
        let mut shader = WgpuShaderContext::new();
        shader.uniform_f32(PbrUniform::RoughnessFactor, 0.25);
        shader.uniform_vec3(PbrUniform::EmissiveColor, Vec3::new(1.0, 0.5, 0.0));
        shader.bind_texture_unit(0, &Texture::white_placeholder());
        assert_eq!(shader.uniforms.roughness_factor, 0.25);
        assert_eq!(shader.uniforms.emissive_color, [1.0, 0.5, 0.0]);
        assert!(shader.textures[CHANNEL_BASE_COLOR].is_some());
        assert!(shader.uniform_bind_group().is_none());
    }

    #[test]
    fn packed_transforms_split_into_vec4_pairs() {
        let mut shader = WgpuShaderContext::new();
        let packed = [2.0, 3.0, 0.5, 0.0, 0.1, 0.2, 0.0, 0.0];
        shader.uniform_packed8(PbrUniform::TextureNormalTransform, &packed);
        assert_eq!(
            shader.uniforms.normal_transform,
            [[2.0, 3.0, 0.5, 0.0], [0.1, 0.2, 0.0, 0.0]]
        );
    }

    #[test]
    fn non_sampler_uniform_is_ignored_as_texture_slot() {
        let mut shader = WgpuShaderContext::new();
        shader.bind_texture(PbrUniform::RoughnessFactor, &Texture::white_placeholder());
        assert!(shader.textures.iter().all(|t| t.is_none()));
    }

    #[test]
    fn uniform_struct_is_pod_sized_for_the_gpu() {
        // 4 transforms * 32 bytes + vec3 + 3 scalars + padding.
        assert_eq!(std::mem::size_of::<PbrUniforms>(), 160);
        assert_eq!(std::mem::size_of::<PbrUniforms>() % 16, 0);
    }
}
