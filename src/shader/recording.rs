//! Recording shader context used by unit tests.

use glamx::Vec3;
use std::sync::Arc;

use crate::resource::Texture;
use crate::shader::{PbrUniform, ShaderContext};

/// One call issued against the shader, in issue order.
#[derive(Clone)]
pub enum Call {
    TextureUnit(u32, Arc<Texture>),
    Texture(PbrUniform, Arc<Texture>),
    F32(PbrUniform, f32),
    Vec3(PbrUniform, Vec3),
    Packed8(PbrUniform, [f32; 8]),
}

/// A [`ShaderContext`] that records every call instead of touching the GPU.
#[derive(Default)]
pub struct RecordingShader {
    pub calls: Vec<Call>,
}

impl RecordingShader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The texture bound to a raw unit, if any.
    pub fn unit_texture(&self, unit: u32) -> Option<&Arc<Texture>> {
        self.calls.iter().find_map(|c| match c {
            Call::TextureUnit(u, tex) if *u == unit => Some(tex),
            _ => None,
        })
    }

    /// The texture bound to a named sampler slot, if any.
    pub fn slot_texture(&self, uniform: PbrUniform) -> Option<&Arc<Texture>> {
        self.calls.iter().find_map(|c| match c {
            Call::Texture(u, tex) if *u == uniform => Some(tex),
            _ => None,
        })
    }

    /// The last scalar value set for a uniform, if any.
    pub fn f32_value(&self, uniform: PbrUniform) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::F32(u, v) if *u == uniform => Some(*v),
            _ => None,
        })
    }

    /// Whether any call at all touched the given uniform.
    pub fn touched(&self, uniform: PbrUniform) -> bool {
        self.calls.iter().any(|c| match c {
            Call::Texture(u, _)
            | Call::F32(u, _)
            | Call::Vec3(u, _)
            | Call::Packed8(u, _) => *u == uniform,
            Call::TextureUnit(..) => false,
        })
    }
}

impl ShaderContext for RecordingShader {
    fn bind_texture_unit(&mut self, unit: u32, texture: &Arc<Texture>) {
        self.calls.push(Call::TextureUnit(unit, texture.clone()));
    }

    fn bind_texture(&mut self, uniform: PbrUniform, texture: &Arc<Texture>) {
        self.calls.push(Call::Texture(uniform, texture.clone()));
    }

    fn uniform_f32(&mut self, uniform: PbrUniform, value: f32) {
        self.calls.push(Call::F32(uniform, value));
    }

    fn uniform_vec3(&mut self, uniform: PbrUniform, value: Vec3) {
        self.calls.push(Call::Vec3(uniform, value));
    }

    fn uniform_packed8(&mut self, uniform: PbrUniform, value: &[f32; 8]) {
        self.calls.push(Call::Packed8(uniform, *value));
    }
}
