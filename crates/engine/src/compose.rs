//! Per-frame uniform composition.
//!
//! The composer turns three read-only inputs (the pointer snapshot, the
//! flattened parameter store, the active program descriptor) plus the frame
//! globals into one closed uniform bundle. The mapping from store paths to
//! uniform names is declarative: a [`UniformPlan`] lists every binding once,
//! and the same plan serves all programs because each program's schema is a
//! strict subset of the composed bundle.

use std::collections::BTreeMap;

use crate::error::{ComposeError, UnknownParameterError};
use crate::params::{ParameterStore, Value};
use crate::pointer::PointerState;
use crate::registry::{ProgramDescriptor, ProgramRegistry};

/// Uniform names every composed frame carries regardless of the plan.
pub const TIME_UNIFORM: &str = "time";
pub const RESOLUTION_UNIFORM: &str = "resolution";
pub const MOUSE_POSITION_UNIFORM: &str = "mousePosition";
pub const MOUSE_VELOCITY_UNIFORM: &str = "mouseVelocity";

/// A single value handed to the GPU program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

/// Transient, frame-scoped mapping from uniform name to value.
///
/// Discarded after the draw call; nothing here outlives the frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBundle {
    values: BTreeMap<String, UniformValue>,
}

impl UniformBundle {
    pub fn insert(&mut self, name: &str, value: UniformValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One declarative mapping from the parameter tree to a uniform.
#[derive(Debug, Clone)]
enum Binding {
    /// Direct conversion by stored type: numbers pass through, toggles become
    /// bools, 0-255 color channels rescale to 0-1, choices map to their index
    /// within the declared option order.
    Param { uniform: String, path: String },
    /// Gathers three numeric leaves into one vec3 (the rotationX/Y/Z idiom).
    Gather3 { uniform: String, paths: [String; 3] },
}

/// The full set of parameter-to-uniform bindings for a gallery.
#[derive(Debug, Clone, Default)]
pub struct UniformPlan {
    bindings: Vec<Binding>,
}

impl UniformPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds one leaf directly to a uniform.
    pub fn param(mut self, uniform: &str, path: &str) -> Self {
        self.bindings.push(Binding::Param {
            uniform: uniform.to_string(),
            path: path.to_string(),
        });
        self
    }

    /// Binds three numeric leaves to one vec3 uniform.
    pub fn gather3(mut self, uniform: &str, paths: [&str; 3]) -> Self {
        self.bindings.push(Binding::Gather3 {
            uniform: uniform.to_string(),
            paths: [
                paths[0].to_string(),
                paths[1].to_string(),
                paths[2].to_string(),
            ],
        });
        self
    }

    /// Every store path the plan reads, for configuration sanity checks.
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for binding in &self.bindings {
            match binding {
                Binding::Param { path, .. } => out.push(path.as_str()),
                Binding::Gather3 { paths, .. } => {
                    out.extend(paths.iter().map(|p| p.as_str()));
                }
            }
        }
        out
    }

    /// Every uniform name the plan can produce.
    pub fn uniforms(&self) -> Vec<&str> {
        self.bindings
            .iter()
            .map(|binding| match binding {
                Binding::Param { uniform, .. } | Binding::Gather3 { uniform, .. } => {
                    uniform.as_str()
                }
            })
            .collect()
    }
}

/// Frame globals supplied by the scheduler and the drawable surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    /// Elapsed time in seconds since the loop entered `Running`.
    pub seconds: f32,
    /// Current drawable resolution in device pixels.
    pub resolution: [f32; 2],
}

/// The composed result for one frame: the resolved program plus its bundle.
#[derive(Debug)]
pub struct ComposedFrame<'a, H> {
    pub descriptor: &'a ProgramDescriptor<H>,
    pub uniforms: UniformBundle,
}

/// Builds the exact uniform bundle for the active program each frame.
#[derive(Debug, Clone, Default)]
pub struct UniformComposer {
    plan: UniformPlan,
}

impl UniformComposer {
    pub fn new(plan: UniformPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &UniformPlan {
        &self.plan
    }

    /// Composes one frame's bundle for the registry's active program.
    ///
    /// The pointer position rescales from `[0,1]` to `[-1,1]` and the
    /// velocity doubles, matching the shaders' coordinate convention. The
    /// bundle is a superset of any individual schema; the GPU shell uploads
    /// only the schema-listed subset.
    pub fn compose<'a, H>(
        &self,
        registry: &'a ProgramRegistry<H>,
        primary: PointerState,
        store: &ParameterStore,
        frame: &FrameInputs,
    ) -> Result<ComposedFrame<'a, H>, ComposeError> {
        let descriptor = registry.active_descriptor()?;
        let flat = store.snapshot_flat();

        let mut uniforms = UniformBundle::default();
        uniforms.insert(TIME_UNIFORM, UniformValue::Float(frame.seconds));
        uniforms.insert(RESOLUTION_UNIFORM, UniformValue::Vec2(frame.resolution));
        uniforms.insert(
            MOUSE_POSITION_UNIFORM,
            UniformValue::Vec2([primary.x * 2.0 - 1.0, primary.y * 2.0 - 1.0]),
        );
        uniforms.insert(
            MOUSE_VELOCITY_UNIFORM,
            UniformValue::Vec2([primary.delta_x * 2.0, primary.delta_y * 2.0]),
        );

        for binding in &self.plan.bindings {
            match binding {
                Binding::Param { uniform, path } => {
                    let value = lookup(&flat, path)?;
                    uniforms.insert(uniform, convert(value, store, path)?);
                }
                Binding::Gather3 { uniform, paths } => {
                    let mut components = [0.0_f32; 3];
                    for (slot, path) in components.iter_mut().zip(paths.iter()) {
                        *slot = lookup(&flat, path)?.as_number().ok_or_else(|| {
                            ComposeError::NonNumericGather {
                                path: path.clone(),
                            }
                        })?;
                    }
                    uniforms.insert(uniform, UniformValue::Vec3(components));
                }
            }
        }

        Ok(ComposedFrame {
            descriptor,
            uniforms,
        })
    }
}

fn lookup<'a>(
    flat: &'a BTreeMap<String, Value>,
    path: &str,
) -> Result<&'a Value, UnknownParameterError> {
    flat.get(path)
        .ok_or_else(|| UnknownParameterError(path.to_string()))
}

fn convert(
    value: &Value,
    store: &ParameterStore,
    path: &str,
) -> Result<UniformValue, UnknownParameterError> {
    Ok(match value {
        Value::Number(number) => UniformValue::Float(*number),
        Value::Toggle(flag) => UniformValue::Bool(*flag),
        Value::Color(channels) => UniformValue::Vec3([
            channels[0] / 255.0,
            channels[1] / 255.0,
            channels[2] / 255.0,
        ]),
        Value::Choice(selected) => {
            // indexOf semantics: a selection outside the declared set maps
            // to -1 rather than failing the frame.
            let index = store
                .options(path)?
                .iter()
                .position(|option| option == selected)
                .map(|index| index as i32)
                .unwrap_or(-1);
            UniformValue::Int(index)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::registry::ProgramCompiler;
    use crate::schema::{UniformSchema, UniformType};

    struct NullCompiler;

    impl ProgramCompiler for NullCompiler {
        type Handle = ();

        fn compile(
            &mut self,
            _vertex: &str,
            _fragment: &str,
            _schema: &UniformSchema,
        ) -> Result<(), CompileError> {
            Ok(())
        }
    }

    const BASE_SHAPES: [&str; 6] = [
        "cube",
        "mengerSponge",
        "octahedral",
        "octahedralFull",
        "tetrahedron",
        "tetrahedronFull",
    ];

    fn store() -> ParameterStore {
        ParameterStore::builder()
            .slider("fogDist", 50.0, 15.0, 200.0)
            .toggle("floor", true)
            .color("shapeColor", [255.0, 0.0, 135.0])
            .slider("shapeRotationX", 35.0, 0.0, 360.0)
            .slider("shapeRotationY", 0.0, 0.0, 360.0)
            .slider("shapeRotationZ", 315.0, 0.0, 360.0)
            .group("recursiveShapes", |g| {
                g.select("baseShape", "tetrahedron", &BASE_SHAPES)
            })
            .build()
    }

    fn plan() -> UniformPlan {
        UniformPlan::new()
            .param("fogDist", "fogDist")
            .param("drawFloor", "floor")
            .param("shapeColor", "shapeColor")
            .param("rsBaseShape", "recursiveShapes.baseShape")
            .gather3(
                "shapeRotation",
                ["shapeRotationX", "shapeRotationY", "shapeRotationZ"],
            )
    }

    fn registry(names: &[&str]) -> ProgramRegistry<()> {
        let mut compiler = NullCompiler;
        let mut registry = ProgramRegistry::new(names[0]);
        for name in names {
            let schema = UniformSchema::new()
                .field("time", UniformType::Float)
                .field("fogDist", UniformType::Float);
            registry
                .register(&mut compiler, name, "vert", "frag", schema)
                .unwrap();
        }
        registry
    }

    fn frame() -> FrameInputs {
        FrameInputs {
            seconds: 2.5,
            resolution: [1920.0, 1080.0],
        }
    }

    fn centered_pointer() -> PointerState {
        PointerState {
            id: 0,
            x: 0.5,
            y: 0.5,
            delta_x: 0.0,
            delta_y: 0.0,
        }
    }

    #[test]
    fn colors_rescale_to_unit_range() {
        let registry = registry(&["a"]);
        let composed = UniformComposer::new(plan())
            .compose(&registry, centered_pointer(), &store(), &frame())
            .unwrap();
        match composed.uniforms.get("shapeColor").unwrap() {
            UniformValue::Vec3(channels) => {
                assert!((channels[0] - 1.0).abs() < 1e-6);
                assert_eq!(channels[1], 0.0);
                assert!((channels[2] - 135.0 / 255.0).abs() < 1e-3);
            }
            other => panic!("expected vec3, got {other:?}"),
        }
    }

    #[test]
    fn choices_map_to_declared_order_index() {
        let registry = registry(&["a"]);
        let composed = UniformComposer::new(plan())
            .compose(&registry, centered_pointer(), &store(), &frame())
            .unwrap();
        assert_eq!(
            composed.uniforms.get("rsBaseShape"),
            Some(&UniformValue::Int(4))
        );
    }

    #[test]
    fn unknown_choice_maps_to_minus_one() {
        let mut store = store();
        store
            .set(
                "recursiveShapes.baseShape",
                Value::Choice("dodecahedron".into()),
            )
            .unwrap();
        let registry = registry(&["a"]);
        let composed = UniformComposer::new(plan())
            .compose(&registry, centered_pointer(), &store, &frame())
            .unwrap();
        assert_eq!(
            composed.uniforms.get("rsBaseShape"),
            Some(&UniformValue::Int(-1))
        );
    }

    #[test]
    fn pointer_rescales_to_clip_convention() {
        let pointer = PointerState {
            id: 0,
            x: 0.75,
            y: 0.25,
            delta_x: 0.1,
            delta_y: -0.2,
        };
        let registry = registry(&["a"]);
        let composed = UniformComposer::new(plan())
            .compose(&registry, pointer, &store(), &frame())
            .unwrap();
        assert_eq!(
            composed.uniforms.get(MOUSE_POSITION_UNIFORM),
            Some(&UniformValue::Vec2([0.5, -0.5]))
        );
        match composed.uniforms.get(MOUSE_VELOCITY_UNIFORM).unwrap() {
            UniformValue::Vec2(v) => {
                assert!((v[0] - 0.2).abs() < 1e-6);
                assert!((v[1] + 0.4).abs() < 1e-6);
            }
            other => panic!("expected vec2, got {other:?}"),
        }
    }

    #[test]
    fn rotation_triples_gather_into_vec3() {
        let registry = registry(&["a"]);
        let composed = UniformComposer::new(plan())
            .compose(&registry, centered_pointer(), &store(), &frame())
            .unwrap();
        assert_eq!(
            composed.uniforms.get("shapeRotation"),
            Some(&UniformValue::Vec3([35.0, 0.0, 315.0]))
        );
    }

    #[test]
    fn frame_globals_are_always_present() {
        let registry = registry(&["a"]);
        let composed = UniformComposer::new(plan())
            .compose(&registry, centered_pointer(), &store(), &frame())
            .unwrap();
        assert_eq!(
            composed.uniforms.get(TIME_UNIFORM),
            Some(&UniformValue::Float(2.5))
        );
        assert_eq!(
            composed.uniforms.get(RESOLUTION_UNIFORM),
            Some(&UniformValue::Vec2([1920.0, 1080.0]))
        );
    }

    #[test]
    fn plan_with_unknown_path_fails() {
        let plan = UniformPlan::new().param("ghost", "not.a.path");
        let err = UniformComposer::new(plan)
            .compose(&registry(&["a"]), centered_pointer(), &store(), &frame())
            .unwrap_err();
        assert!(matches!(err, ComposeError::Parameter(_)));
    }

    #[test]
    fn gathering_a_non_numeric_leaf_fails_with_the_path() {
        let plan = UniformPlan::new().gather3(
            "shapeRotation",
            ["shapeRotationX", "floor", "shapeRotationZ"],
        );
        let registry = registry(&["a"]);
        let err = UniformComposer::new(plan)
            .compose(&registry, centered_pointer(), &store(), &frame())
            .unwrap_err();
        match err {
            ComposeError::NonNumericGather { path } => assert_eq!(path, "floor"),
            other => panic!("expected a non-numeric gather error, got {other:?}"),
        }
    }

    #[test]
    fn override_switches_which_schema_resolves() {
        let mut registry = registry(&["a", "b"]);
        assert!(registry.apply_deep_link_override("b"));
        let composed = UniformComposer::new(plan())
            .compose(&registry, centered_pointer(), &store(), &frame())
            .unwrap();
        assert_eq!(composed.descriptor.name, "b");
        // Bundle covers the schema plus the always-present globals.
        for (field, _) in composed.descriptor.schema.fields() {
            assert!(composed.uniforms.contains(field), "missing {field}");
        }
        assert!(composed.uniforms.contains(MOUSE_POSITION_UNIFORM));
        assert!(composed.uniforms.contains(MOUSE_VELOCITY_UNIFORM));
    }
}
