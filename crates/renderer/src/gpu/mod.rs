pub(crate) mod context;
pub(crate) mod pipeline;
pub(crate) mod uniforms;

pub use pipeline::{SceneCompiler, ScenePipeline};
