/*!
# gltf-material

glTF 2.0 PBR material state and shader binding for real-time viewers.

This crate is the material subsystem of a 3D viewer: it holds the resolved
parameters of a physically-based material (factors, alpha coverage, texture
transforms, texture references), issues the texture-bind and uniform-set calls
a shader needs to draw a surface with it, and tracks the pending-fetch state of
a material that is still being resolved by the viewer's asset pipeline.

It deliberately does **not** own the render pipeline, the scene graph, or the
texture residency cache. Those stay in the host viewer; the crate talks to the
shader through the [`shader::ShaderContext`] trait and holds textures as shared
[`resource::Texture`] handles.

```no_run
use gltf_material::prelude::*;

let manager = TextureManager::new();
let placeholders = manager.placeholders();

let mut material = FetchedMaterial::new();
material.begin_fetch();
material.on_fetch_complete(|| log::debug!("material ready"));

// ... the asset pipeline fills in factors and textures ...
material.material.roughness_factor = 0.3;
material.complete_fetch();

// At draw time, with the PBR shader active:
# let mut shader = gltf_material::shader::WgpuShaderContext::new();
material.bind(&mut shader, RenderPass::Color, None, &placeholders);
```

The math types come from the [glam](https://docs.rs/glam/) fork `glamx`; GPU
resources are created through the global wgpu [`context::Context`].
*/
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]

pub mod color;
pub mod context;
pub mod material;
pub mod resource;
pub mod shader;

pub mod prelude {
    pub use crate::color::{Color, ColorRgb};
    pub use crate::context::Context;
    pub use crate::material::{
        AlphaMode, FetchedMaterial, GltfMaterial, TextureSlot, TextureTransform,
    };
    pub use crate::resource::{Placeholders, Texture, TextureManager};
    pub use crate::shader::{PbrUniform, RenderPass, ShaderContext};
    pub use glamx::{Vec2, Vec3};
    pub use std::sync::Arc;
}
