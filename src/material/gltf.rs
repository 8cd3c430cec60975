//! The glTF 2.0 PBR material data model and its shader binding.

use glamx::{Vec2, Vec3};
use std::sync::Arc;

use crate::color::{self, Color, ColorRgb};
use crate::resource::{Placeholders, Texture};
use crate::shader::{PbrUniform, RenderPass, ShaderContext};

/// glTF 2.0 alpha coverage mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
    /// Fragments are fully opaque; alpha is ignored.
    #[default]
    Opaque,
    /// Fragments below the alpha cutoff are discarded.
    Mask,
    /// Fragments are alpha-blended.
    Blend,
}

/// The four texture channels of a PBR material.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    /// sRGB base color.
    BaseColor = 0,
    /// Tangent-space normal map.
    Normal = 1,
    /// Linear packed occlusion, roughness, metal.
    MetallicRoughness = 2,
    /// sRGB emissive.
    Emissive = 3,
}

impl TextureSlot {
    /// Number of texture channels.
    pub const COUNT: usize = 4;

    /// All slots, in channel order.
    pub const ALL: [TextureSlot; Self::COUNT] = [
        TextureSlot::BaseColor,
        TextureSlot::Normal,
        TextureSlot::MetallicRoughness,
        TextureSlot::Emissive,
    ];
}

/// A 2D offset/scale/rotation applied to texture coordinates before sampling
/// (KHR_texture_transform).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextureTransform {
    /// UV offset.
    pub offset: Vec2,
    /// UV scale.
    pub scale: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
}

impl Default for TextureTransform {
    fn default() -> Self {
        TextureTransform {
            offset: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl TextureTransform {
    /// Packs the transform into the fixed-size buffer the shader consumes as
    /// two vec4s: `[sx, sy, rotation, 0, ox, oy, 0, 0]`.
    pub fn packed(&self) -> [f32; 8] {
        [
            self.scale.x,
            self.scale.y,
            self.rotation,
            0.0,
            self.offset.x,
            self.offset.y,
            0.0,
            0.0,
        ]
    }
}

/// A resolved glTF PBR material.
///
/// Factors default to the glTF 2.0 specification defaults; texture slots are
/// unset. Texture handles are shared with the texture cache, so dropping a
/// material never invalidates a texture another surface still uses.
pub struct GltfMaterial {
    /// Base color factor (the alpha channel is the material transparency).
    pub base_color: Color,
    /// Emissive color factor.
    pub emissive: ColorRgb,
    /// Metallic factor in [0, 1].
    pub metallic_factor: f32,
    /// Roughness factor in [0, 1].
    pub roughness_factor: f32,
    /// Alpha coverage mode.
    pub alpha_mode: AlphaMode,
    /// Alpha cutoff; only meaningful when `alpha_mode` is [`AlphaMode::Mask`].
    pub alpha_cutoff: f32,
    transforms: [TextureTransform; TextureSlot::COUNT],
    textures: [Option<Arc<Texture>>; TextureSlot::COUNT],
}

impl Default for GltfMaterial {
    fn default() -> Self {
        GltfMaterial {
            base_color: color::WHITE,
            emissive: color::EMISSIVE_NONE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            transforms: [TextureTransform::default(); TextureSlot::COUNT],
            textures: [None, None, None, None],
        }
    }
}

impl GltfMaterial {
    /// Creates a material with the glTF defaults and no textures.
    pub fn new() -> GltfMaterial {
        GltfMaterial::default()
    }

    /// The texture assigned to a slot, if any.
    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<Texture>> {
        self.textures[slot as usize].as_ref()
    }

    /// Assigns a texture to a slot.
    pub fn set_texture(&mut self, slot: TextureSlot, texture: Arc<Texture>) {
        self.textures[slot as usize] = Some(texture);
    }

    /// Clears a texture slot.
    pub fn clear_texture(&mut self, slot: TextureSlot) {
        self.textures[slot as usize] = None;
    }

    /// The texture-coordinate transform of a slot.
    pub fn texture_transform(&self, slot: TextureSlot) -> &TextureTransform {
        &self.transforms[slot as usize]
    }

    /// Replaces the texture-coordinate transform of a slot.
    pub fn set_texture_transform(&mut self, slot: TextureSlot, transform: TextureTransform) {
        self.transforms[slot as usize] = transform;
    }

    /// The alpha-mask threshold handed to the shader.
    ///
    /// -1.0 (masking disabled) unless the alpha mode is `Mask`. Dividing the
    /// cutoff by the base color alpha lets the shader compare directly
    /// against the sampled texture alpha without re-deriving transparency.
    pub fn minimum_alpha(&self) -> f32 {
        // glTF 2.0 Specification 3.9.4. Alpha Coverage
        if self.alpha_mode == AlphaMode::Mask {
            self.alpha_cutoff / self.base_color.a
        } else {
            -1.0
        }
    }

    /// Binds this material's textures and uniforms into the active shader.
    ///
    /// `media_override` replaces both the base color and emissive textures
    /// when present (video/media surfaces). A [`RenderPass::Shadow`] pass
    /// binds only the base color channel and the alpha-mask threshold; the
    /// remaining channels and factors contribute nothing to depth.
    pub fn bind(
        &self,
        shader: &mut dyn ShaderContext,
        pass: RenderPass,
        media_override: Option<&Arc<Texture>>,
        placeholders: &Placeholders,
    ) {
        let base_color_tex = media_override.or_else(|| self.texture(TextureSlot::BaseColor));
        let emissive_tex = media_override.or_else(|| self.texture(TextureSlot::Emissive));

        shader.uniform_f32(PbrUniform::MinimumAlpha, self.minimum_alpha());
        shader.bind_texture_unit(0, base_color_tex.unwrap_or(&placeholders.white));

        if pass.is_shadow() {
            return;
        }

        shader.bind_texture(
            PbrUniform::BumpMap,
            self.texture(TextureSlot::Normal)
                .unwrap_or(&placeholders.flat_normal),
        );
        shader.bind_texture(
            PbrUniform::SpecularMap,
            self.texture(TextureSlot::MetallicRoughness)
                .unwrap_or(&placeholders.white),
        );
        shader.bind_texture(
            PbrUniform::EmissiveMap,
            emissive_tex.unwrap_or(&placeholders.white),
        );

        // NOTE: the base color factor is baked into the vertex stream by the
        // mesh pipeline, so it is not uploaded here.

        shader.uniform_f32(PbrUniform::RoughnessFactor, self.roughness_factor);
        shader.uniform_f32(PbrUniform::MetallicFactor, self.metallic_factor);
        shader.uniform_vec3(
            PbrUniform::EmissiveColor,
            Vec3::new(self.emissive.r, self.emissive.g, self.emissive.b),
        );

        const TRANSFORM_UNIFORMS: [PbrUniform; TextureSlot::COUNT] = [
            PbrUniform::TextureBaseColorTransform,
            PbrUniform::TextureNormalTransform,
            PbrUniform::TextureMetallicRoughnessTransform,
            PbrUniform::TextureEmissiveTransform,
        ];

        for (slot, uniform) in TextureSlot::ALL.iter().zip(TRANSFORM_UNIFORMS) {
            shader.uniform_packed8(uniform, &self.texture_transform(*slot).packed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::recording::RecordingShader;

    fn checker(name: &str) -> Arc<Texture> {
        Texture::from_pixels(
            name,
            1,
            1,
            vec![10, 20, 30, 255],
            crate::resource::TextureWrapping::Repeat,
            false,
        )
    }

    #[test]
    fn minimum_alpha_disabled_outside_mask_mode() {
        for mode in [AlphaMode::Opaque, AlphaMode::Blend] {
            let material = GltfMaterial {
                alpha_mode: mode,
                alpha_cutoff: 0.9,
                ..GltfMaterial::default()
            };
            assert_eq!(material.minimum_alpha(), -1.0);
        }
    }

    #[test]
    fn minimum_alpha_scales_cutoff_by_base_alpha() {
        let mut material = GltfMaterial::new();
        material.alpha_mode = AlphaMode::Mask;
        material.alpha_cutoff = 0.25;
        material.base_color.a = 0.5;
        assert_eq!(material.minimum_alpha(), 0.5);
    }

    #[test]
    fn unset_base_color_binds_the_white_placeholder() {
        let placeholders = Placeholders::default();
        let mut shader = RecordingShader::new();
        GltfMaterial::new().bind(&mut shader, RenderPass::Color, None, &placeholders);
        let bound = shader.unit_texture(0).expect("no base color bound");
        assert!(Arc::ptr_eq(bound, &placeholders.white));
    }

    #[test]
    fn media_override_replaces_base_color_and_emissive() {
        let placeholders = Placeholders::default();
        let mut material = GltfMaterial::new();
        material.set_texture(TextureSlot::BaseColor, checker("base"));
        material.set_texture(TextureSlot::Emissive, checker("glow"));
        let media = checker("video_frame");

        let mut shader = RecordingShader::new();
        material.bind(&mut shader, RenderPass::Color, Some(&media), &placeholders);

        assert!(Arc::ptr_eq(shader.unit_texture(0).unwrap(), &media));
        assert!(Arc::ptr_eq(
            shader.slot_texture(PbrUniform::EmissiveMap).unwrap(),
            &media
        ));
    }

    #[test]
    fn unset_slots_fall_back_to_placeholders() {
        let placeholders = Placeholders::default();
        let mut shader = RecordingShader::new();
        GltfMaterial::new().bind(&mut shader, RenderPass::Color, None, &placeholders);

        assert!(Arc::ptr_eq(
            shader.slot_texture(PbrUniform::BumpMap).unwrap(),
            &placeholders.flat_normal
        ));
        assert!(Arc::ptr_eq(
            shader.slot_texture(PbrUniform::SpecularMap).unwrap(),
            &placeholders.white
        ));
        assert!(Arc::ptr_eq(
            shader.slot_texture(PbrUniform::EmissiveMap).unwrap(),
            &placeholders.white
        ));
    }

    #[test]
    fn shadow_pass_skips_color_channels() {
        let placeholders = Placeholders::default();
        let mut material = GltfMaterial::new();
        material.set_texture(TextureSlot::Normal, checker("normals"));
        material.roughness_factor = 0.1;

        let mut shader = RecordingShader::new();
        material.bind(&mut shader, RenderPass::Shadow, None, &placeholders);

        assert!(shader.unit_texture(0).is_some());
        assert!(shader.f32_value(PbrUniform::MinimumAlpha).is_some());
        assert_eq!(shader.calls.len(), 2);
        for uniform in [
            PbrUniform::BumpMap,
            PbrUniform::SpecularMap,
            PbrUniform::EmissiveMap,
            PbrUniform::RoughnessFactor,
            PbrUniform::MetallicFactor,
            PbrUniform::EmissiveColor,
            PbrUniform::TextureBaseColorTransform,
            PbrUniform::TextureNormalTransform,
            PbrUniform::TextureMetallicRoughnessTransform,
            PbrUniform::TextureEmissiveTransform,
        ] {
            assert!(!shader.touched(uniform), "{:?} issued in shadow pass", uniform);
        }
    }

    #[test]
    fn color_pass_uploads_factors_and_all_four_transforms() {
        let placeholders = Placeholders::default();
        let mut material = GltfMaterial::new();
        material.roughness_factor = 0.3;
        material.metallic_factor = 0.7;
        material.set_texture_transform(
            TextureSlot::Normal,
            TextureTransform {
                offset: Vec2::new(0.5, 0.25),
                scale: Vec2::new(2.0, 2.0),
                rotation: 1.0,
            },
        );

        let mut shader = RecordingShader::new();
        material.bind(&mut shader, RenderPass::Color, None, &placeholders);

        assert_eq!(shader.f32_value(PbrUniform::RoughnessFactor), Some(0.3));
        assert_eq!(shader.f32_value(PbrUniform::MetallicFactor), Some(0.7));
        for uniform in [
            PbrUniform::TextureBaseColorTransform,
            PbrUniform::TextureNormalTransform,
            PbrUniform::TextureMetallicRoughnessTransform,
            PbrUniform::TextureEmissiveTransform,
        ] {
            assert!(shader.touched(uniform), "{:?} not uploaded", uniform);
        }
    }

    #[test]
    fn transform_packing_layout() {
        let transform = TextureTransform {
            offset: Vec2::new(0.25, 0.75),
            scale: Vec2::new(2.0, 4.0),
            rotation: 0.5,
        };
        assert_eq!(
            transform.packed(),
            [2.0, 4.0, 0.5, 0.0, 0.25, 0.75, 0.0, 0.0]
        );
        assert_eq!(
            TextureTransform::default().packed(),
            [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }
}
