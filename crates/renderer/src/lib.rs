//! wgpu/winit shell for the gallery engine.
//!
//! The engine crate owns the semantics (pointer tracking, parameters,
//! program selection, uniform composition, frame clocking); this crate owns
//! everything that touches the GPU or the window system:
//!
//! ```text
//!   fractalview ── GalleryConfig ──▶ run ──▶ winit event loop
//!                                     │            │ input ─▶ engine tracker
//!                                     │            └ redraw ─▶ Gallery::frame
//!                                     │                          │ bundle
//!                                     ▼                          ▼
//!                            SceneCompiler ─▶ ScenePipeline ─▶ std140 UBO + draw
//! ```
//!
//! Scene shaders are wrapped with a schema-generated uniform block before
//! compilation, so each registered program's block layout, bind group, and
//! packed bytes all derive from the same [`engine::UniformSchema`].

mod compile;
mod gpu;
mod window;

use anyhow::Result;
use engine::{Gallery, ParameterStore, UniformPlan, UniformSchema};

pub use gpu::{SceneCompiler, ScenePipeline};

/// The gallery engine specialised to compiled wgpu pipelines.
pub type SceneGallery = Gallery<ScenePipeline>;

/// One declarative scene: a name, a fragment shader, and the uniforms it
/// consumes.
#[derive(Debug, Clone)]
pub struct SceneDef {
    pub name: String,
    pub fragment: String,
    pub schema: UniformSchema,
}

/// Everything the shell needs to bring the gallery up.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub title: String,
    /// Initial window size in physical pixels.
    pub window_size: (u32, u32),
    /// Optional FPS cap; `None` renders every callback.
    pub target_fps: Option<f32>,
    /// Configured default selection.
    pub default_scene: String,
    /// Optional startup override, applied once and only if it resolves.
    pub deep_link: Option<String>,
    /// Vertex shader shared by every scene (the full-screen quad).
    pub vertex_source: String,
    pub scenes: Vec<SceneDef>,
}

/// Observer/mutator bound to the running gallery.
///
/// Implementations read and write the parameter store and the active
/// selection through the engine's contracts; they carry no state the engine
/// does not already own.
pub trait ControlSurface {
    /// A key was pressed. `key` is the logical character, or a named label
    /// such as `ArrowRight`, `Space`, `Tab`.
    fn on_key(&mut self, key: &str, gallery: &mut SceneGallery);

    /// Runs once per frame before composition, for externally animated
    /// parameter writes.
    fn tick(&mut self, _gallery: &mut SceneGallery, _seconds: f32) {}
}

/// Compiles every scene, applies the deep link, and runs the render loop
/// until the window closes.
///
/// A [`engine::CompileError`] from any scene aborts startup; a failed draw
/// call (other than a stale swapchain) is fatal to the loop.
pub fn run(
    config: GalleryConfig,
    params: ParameterStore,
    plan: UniformPlan,
    control: Box<dyn ControlSurface>,
) -> Result<()> {
    window::run_loop(config, params, plan, control)
}
