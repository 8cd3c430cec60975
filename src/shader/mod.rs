//! The shader binding seam.
//!
//! Materials do not talk to wgpu directly; they issue texture-bind and
//! named-uniform-set calls against a [`ShaderContext`]. The renderer supplies
//! the context for whichever shader it has made current, which keeps the
//! "one active shader at a time" contract explicit instead of a process-wide
//! pointer.

pub use crate::shader::uniform::{PbrUniform, RenderPass, ShaderContext};
pub use crate::shader::wgpu_context::WgpuShaderContext;

mod uniform;
mod wgpu_context;

#[cfg(test)]
pub(crate) mod recording;
