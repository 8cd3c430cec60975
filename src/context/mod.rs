//! wgpu rendering context management.

pub use crate::context::context::Context;

#[allow(clippy::module_inception)]
mod context;
