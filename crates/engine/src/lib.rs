//! Parametric shader-gallery engine.
//!
//! The crate ties four owned pieces together under one per-frame step:
//!
//! ```text
//!   input callbacks ──▶ PointerTracker ─┐
//!   control surface ──▶ ParameterStore ─┼─▶ UniformComposer ─▶ UniformBundle
//!   deep link / keys ─▶ ProgramRegistry ┘            ▲
//!                                                    │
//!                          FrameScheduler ── FrameClock per iteration
//! ```
//!
//! Everything here is single-threaded cooperative: the windowing shell runs
//! both the input callbacks and [`Gallery::frame`] on one thread, so input
//! arriving between two frames is fully applied before the next compose. The
//! GPU side (compilation, surface, draw calls) stays behind the
//! [`ProgramCompiler`] seam and whatever handle type the shell registers.

pub mod compose;
pub mod error;
pub mod params;
pub mod pointer;
pub mod registry;
pub mod schedule;
pub mod schema;

use std::time::Instant;

pub use compose::{
    ComposedFrame, FrameInputs, UniformBundle, UniformComposer, UniformPlan, UniformValue,
    MOUSE_POSITION_UNIFORM, MOUSE_VELOCITY_UNIFORM, RESOLUTION_UNIFORM, TIME_UNIFORM,
};
pub use error::{CompileError, ComposeError, UnknownParameterError, UnknownProgramError};
pub use params::{ControlKind, ParameterStore, TreeBuilder, Value};
pub use pointer::{PointerState, PointerTracker};
pub use registry::{ProgramCompiler, ProgramDescriptor, ProgramRegistry};
pub use schedule::{FrameClock, FrameScheduler, Phase};
pub use schema::{UniformSchema, UniformType};

/// Everything the shell needs to issue one draw call.
#[derive(Debug)]
pub struct FrameOutput<'a, H> {
    pub clock: FrameClock,
    pub program: &'a ProgramDescriptor<H>,
    pub uniforms: UniformBundle,
}

/// The assembled engine: one registry, one parameter tree, one pointer
/// tracker, one composer, one scheduler.
///
/// The tracker and store are the only pieces mutated from outside
/// [`frame`](Self::frame) (by input callbacks and the control surface); the
/// registry is read-only after startup apart from selection changes.
pub struct Gallery<H> {
    pub registry: ProgramRegistry<H>,
    pub params: ParameterStore,
    pub tracker: PointerTracker,
    composer: UniformComposer,
    scheduler: FrameScheduler,
}

impl<H> Gallery<H> {
    pub fn new(
        registry: ProgramRegistry<H>,
        params: ParameterStore,
        plan: UniformPlan,
        target_fps: Option<f32>,
    ) -> Self {
        Self {
            registry,
            params,
            tracker: PointerTracker::new(),
            composer: UniformComposer::new(plan),
            scheduler: FrameScheduler::new(target_fps),
        }
    }

    pub fn plan(&self) -> &UniformPlan {
        self.composer.plan()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Whether the FPS cap allows a frame at `now`.
    pub fn ready_for_frame(&self, now: Instant) -> bool {
        self.scheduler.ready_for_frame(now)
    }

    /// Earliest instant the next frame may render, when capped.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Runs one engine step: clock the frame, compose the bundle for the
    /// active program, then settle pointer velocity as consumed.
    ///
    /// The caller draws with the returned program handle and uniforms, then
    /// calls [`mark_rendered`](Self::mark_rendered) and schedules the next
    /// iteration.
    pub fn frame(
        &mut self,
        now: Instant,
        resolution: (u32, u32),
    ) -> Result<FrameOutput<'_, H>, ComposeError> {
        let clock = self.scheduler.begin_frame(now);
        let primary = self.tracker.primary();
        let inputs = FrameInputs {
            seconds: clock.seconds,
            resolution: [resolution.0 as f32, resolution.1 as f32],
        };
        let composed = self
            .composer
            .compose(&self.registry, primary, &self.params, &inputs)?;
        self.tracker.settle();
        Ok(FrameOutput {
            clock,
            program: composed.descriptor,
            uniforms: composed.uniforms,
        })
    }

    /// Records a presented frame for FPS-cap bookkeeping.
    pub fn mark_rendered(&mut self, now: Instant) {
        self.scheduler.mark_rendered(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct NullCompiler;

    impl ProgramCompiler for NullCompiler {
        type Handle = &'static str;

        fn compile(
            &mut self,
            _vertex: &str,
            _fragment: &str,
            _schema: &UniformSchema,
        ) -> Result<&'static str, CompileError> {
            Ok("handle")
        }
    }

    fn gallery() -> Gallery<&'static str> {
        let mut compiler = NullCompiler;
        let mut registry = ProgramRegistry::new("a");
        for name in ["a", "b"] {
            registry
                .register(
                    &mut compiler,
                    name,
                    "vert",
                    "frag",
                    UniformSchema::new()
                        .field("time", UniformType::Float)
                        .field("fogDist", UniformType::Float),
                )
                .unwrap();
        }
        let params = ParameterStore::builder()
            .slider("fogDist", 50.0, 15.0, 200.0)
            .build();
        let plan = UniformPlan::new().param("fogDist", "fogDist");
        Gallery::new(registry, params, plan, None)
    }

    #[test]
    fn end_to_end_frame_resolves_overridden_program() {
        let mut gallery = gallery();
        assert!(gallery.registry.apply_deep_link_override("b"));

        let output = gallery.frame(Instant::now(), (800, 600)).unwrap();
        assert_eq!(output.program.name, "b");
        assert_eq!(output.clock.frame_index, 0);
        for (field, _) in output.program.schema.fields() {
            assert!(output.uniforms.contains(field), "missing {field}");
        }
        assert!(output.uniforms.contains(RESOLUTION_UNIFORM));
        assert!(output.uniforms.contains(MOUSE_POSITION_UNIFORM));
        assert!(output.uniforms.contains(MOUSE_VELOCITY_UNIFORM));
    }

    #[test]
    fn moves_between_frames_land_in_the_next_frame_only() {
        let mut gallery = gallery();
        let start = Instant::now();
        gallery.tracker.pointer_start(1, 0.5, 0.5);

        let frame_n = gallery.frame(start, (100, 100)).unwrap();
        let velocity_n = *frame_n.uniforms.get(MOUSE_VELOCITY_UNIFORM).unwrap();
        assert_eq!(velocity_n, UniformValue::Vec2([0.0, 0.0]));

        // Input arriving between frame N and N+1.
        gallery.tracker.pointer_move(1, 0.6, 0.5);

        let frame_n1 = gallery
            .frame(start + Duration::from_millis(16), (100, 100))
            .unwrap();
        match frame_n1.uniforms.get(MOUSE_VELOCITY_UNIFORM).unwrap() {
            UniformValue::Vec2(v) => assert!((v[0] - 0.2).abs() < 1e-5),
            other => panic!("expected vec2, got {other:?}"),
        }

        // Consumed: the following frame reports zero again.
        let frame_n2 = gallery
            .frame(start + Duration::from_millis(32), (100, 100))
            .unwrap();
        assert_eq!(
            frame_n2.uniforms.get(MOUSE_VELOCITY_UNIFORM),
            Some(&UniformValue::Vec2([0.0, 0.0]))
        );
    }

    #[test]
    fn frame_clock_advances_monotonically() {
        let mut gallery = gallery();
        let start = Instant::now();
        let first = gallery.frame(start, (100, 100)).unwrap();
        assert_eq!(first.clock.seconds, 0.0);
        let second = gallery
            .frame(start + Duration::from_secs(2), (100, 100))
            .unwrap();
        assert!((second.clock.seconds - 2.0).abs() < 1e-3);
        assert_eq!(second.clock.frame_index, 1);
    }
}
