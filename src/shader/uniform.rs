//! Named uniform slots and the shader binding trait.

use glamx::Vec3;
use std::sync::Arc;

use crate::resource::Texture;

/// The named uniform slots of the PBR shader.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PbrUniform {
    /// Alpha-mask threshold the fragment shader compares sampled alpha
    /// against; -1.0 disables masking.
    MinimumAlpha,
    /// Normal map sampler.
    BumpMap,
    /// Metallic-roughness sampler (linear packed occlusion, roughness, metal).
    SpecularMap,
    /// Emissive sampler (sRGB).
    EmissiveMap,
    /// Scalar roughness factor.
    RoughnessFactor,
    /// Scalar metallic factor.
    MetallicFactor,
    /// Emissive color factor.
    EmissiveColor,
    /// Packed base color texture transform.
    TextureBaseColorTransform,
    /// Packed normal texture transform.
    TextureNormalTransform,
    /// Packed metallic-roughness texture transform.
    TextureMetallicRoughnessTransform,
    /// Packed emissive texture transform.
    TextureEmissiveTransform,
}

impl PbrUniform {
    /// The shader-side variable name of this slot.
    pub fn name(self) -> &'static str {
        match self {
            PbrUniform::MinimumAlpha => "minimum_alpha",
            PbrUniform::BumpMap => "bump_map",
            PbrUniform::SpecularMap => "specular_map",
            PbrUniform::EmissiveMap => "emissive_map",
            PbrUniform::RoughnessFactor => "roughness_factor",
            PbrUniform::MetallicFactor => "metallic_factor",
            PbrUniform::EmissiveColor => "emissive_color",
            PbrUniform::TextureBaseColorTransform => "texture_base_color_transform",
            PbrUniform::TextureNormalTransform => "texture_normal_transform",
            PbrUniform::TextureMetallicRoughnessTransform => {
                "texture_metallic_roughness_transform"
            }
            PbrUniform::TextureEmissiveTransform => "texture_emissive_transform",
        }
    }
}

/// The rendering pass a material is being bound for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderPass {
    /// Normal color rendering; every texture channel and factor is bound.
    Color,
    /// Depth/occlusion-only rendering; only the base color texture and the
    /// alpha-mask threshold matter.
    Shadow,
}

impl RenderPass {
    /// Whether this is the shadow (depth-only) pass.
    #[inline]
    pub fn is_shadow(self) -> bool {
        self == RenderPass::Shadow
    }
}

/// Binding surface of the currently active shader.
///
/// The caller guarantees that the shader behind this context is the one the
/// next draw call will use; a material mutates it freely during
/// [`bind`](crate::material::GltfMaterial::bind) and returns nothing.
pub trait ShaderContext {
    /// Binds a texture to a raw texture unit.
    fn bind_texture_unit(&mut self, unit: u32, texture: &Arc<Texture>);

    /// Binds a texture to a named sampler slot.
    fn bind_texture(&mut self, uniform: PbrUniform, texture: &Arc<Texture>);

    /// Sets a scalar uniform.
    fn uniform_f32(&mut self, uniform: PbrUniform, value: f32);

    /// Sets a vector uniform.
    fn uniform_vec3(&mut self, uniform: PbrUniform, value: Vec3);

    /// Sets a packed texture-transform uniform (two vec4s).
    fn uniform_packed8(&mut self, uniform: PbrUniform, value: &[f32; 8]);
}
