//! A material whose description is being resolved by the asset pipeline.

use std::sync::Arc;
use web_time::{Duration, Instant};

use crate::material::GltfMaterial;
use crate::resource::{Placeholders, Texture};
use crate::shader::{RenderPass, ShaderContext};

/// A [`GltfMaterial`] together with the state of its pending fetch.
///
/// The viewer creates one of these as soon as a surface references a material
/// id, starts the fetch, and fills in the factors and textures when the asset
/// resolves. Interested parties register zero-argument completion callbacks;
/// they run exactly once, in registration order, when the fetch ends.
///
/// All operations are single-threaded; the enclosing renderable owns the
/// instance.
pub struct FetchedMaterial {
    /// The material description, mutated by the fetch-completion path.
    pub material: GltfMaterial,
    active: bool,
    fetching: bool,
    fetch_started: Option<Instant>,
    last_fetch_duration: Option<Duration>,
    complete_callbacks: Vec<Box<dyn FnOnce()>>,
}

impl Default for FetchedMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchedMaterial {
    /// Creates an idle material with glTF defaults.
    pub fn new() -> FetchedMaterial {
        FetchedMaterial {
            material: GltfMaterial::new(),
            active: true,
            fetching: false,
            fetch_started: None,
            last_fetch_duration: None,
            complete_callbacks: Vec::new(),
        }
    }

    /// Whether a fetch is currently in flight.
    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Whether any renderable still references this material.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the material as referenced/unreferenced by renderables.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Transitions Idle -> Fetching.
    ///
    /// Calling this while a fetch is already in flight is a caller bug and
    /// fails a debug assertion.
    pub fn begin_fetch(&mut self) {
        debug_assert!(!self.fetching, "begin_fetch while a fetch is in flight");
        self.fetching = true;
        self.fetch_started = Some(Instant::now());
        log::trace!("material fetch started");
    }

    /// Registers a callback for the end of the current fetch.
    ///
    /// When no fetch is in flight the callback runs synchronously before this
    /// returns; otherwise it is queued and runs during
    /// [`complete_fetch`](Self::complete_fetch).
    pub fn on_fetch_complete(&mut self, callback: impl FnOnce() + 'static) {
        if !self.fetching {
            callback();
            return;
        }
        self.complete_callbacks.push(Box::new(callback));
    }

    /// Transitions Fetching -> Idle and drains the completion queue in
    /// registration order.
    ///
    /// The queue is snapshotted before the first invocation: a callback that
    /// registers another callback during the drain observes the idle state,
    /// so the new callback fires immediately rather than being queued. The
    /// queue storage is released afterwards.
    ///
    /// Calling this without a fetch in flight is a caller bug and fails a
    /// debug assertion.
    pub fn complete_fetch(&mut self) {
        debug_assert!(self.fetching, "complete_fetch without begin_fetch");
        self.fetching = false;
        self.last_fetch_duration = self.fetch_started.take().map(|start| start.elapsed());

        let callbacks = std::mem::take(&mut self.complete_callbacks);
        log::debug!(
            "material fetch complete in {:?} ({} queued callbacks)",
            self.last_fetch_duration,
            callbacks.len()
        );
        for callback in callbacks {
            callback();
        }
    }

    /// Number of callbacks waiting for the current fetch to end.
    pub fn pending_callbacks(&self) -> usize {
        self.complete_callbacks.len()
    }

    /// How long the last completed fetch took.
    pub fn last_fetch_duration(&self) -> Option<Duration> {
        self.last_fetch_duration
    }

    /// Binds the material into the active shader; see
    /// [`GltfMaterial::bind`].
    pub fn bind(
        &self,
        shader: &mut dyn ShaderContext,
        pass: RenderPass,
        media_override: Option<&Arc<Texture>>,
        placeholders: &Placeholders,
    ) {
        self.material.bind(shader, pass, media_override, placeholders);
    }
}
