//! Declarative scene catalogue: the default parameter tree, the
//! parameter-to-uniform plan, and one [`SceneDef`] per bundled fragment
//! shader. Everything the engine needs to know about a scene lives here.

use engine::{ParameterStore, UniformPlan, UniformSchema, UniformType};
use renderer::SceneDef;

pub const DEFAULT_SCENE: &str = "mandelbulb";

/// Declared option order doubles as the integer the shaders receive.
pub const BASE_SHAPES: [&str; 6] = [
    "cube",
    "mengerSponge",
    "octahedral",
    "octahedralFull",
    "tetrahedron",
    "tetrahedronFull",
];

pub const VERTEX_SOURCE: &str = include_str!("../shaders/basic.vert");

/// The live parameter tree with the gallery's stock defaults.
///
/// Color channels stay in 0-255 like the panel presents them; the composer
/// rescales on the way to the GPU.
pub fn default_params() -> ParameterStore {
    ParameterStore::builder()
        .slider_stepped("quality", 1.0, 1.0, 4.0, 1.0)
        .toggle("floor", true)
        .slider_stepped("fogDist", 50.0, 15.0, 200.0, 1.0)
        .slider("shapeRotationX", 35.0, 0.0, 360.0)
        .slider("shapeRotationY", 0.0, 0.0, 360.0)
        .slider("shapeRotationZ", 315.0, 0.0, 360.0)
        .toggle("spin", true)
        // "solid" first so the declared index matches what the shaders
        // branch on (0 = solid, 1 = palette).
        .select("colorMode", "palette", &["solid", "palette"])
        .color("shapeColor", [255.0, 255.0, 255.0])
        .group("colorPalette", |g| {
            g.color("paletteColor1", [255.0, 0.0, 135.0])
                .color("paletteColor2", [0.0, 58.0, 107.0])
                .color("paletteColor3", [0.0, 197.0, 255.0])
        })
        .group("kleinian", |g| {
            g.slider("deOffset", 0.0, -1.0, 1.0)
                .color("lightColor", [255.0, 255.0, 178.5])
                .slider("lightDiffuse", 80.0, 20.0, 200.0)
                .slider("mengerOffsetX", 0.5, -1.0, 1.0)
                .slider("mengerOffsetY", 0.5, -1.0, 1.0)
                .slider("mengerOffsetZ", 0.5, -1.0, 1.0)
                .slider("mengerScale", 3.0, 2.0, 10.0)
                .slider("offsetX", 1.0, -1.0, 1.0)
                .slider("offsetY", 0.0, -1.0, 1.0)
                .slider("offsetZ", -1.0, -1.0, 1.0)
                .slider("rotationX", 0.0, 0.0, 360.0)
                .slider("rotationY", 0.0, 0.0, 360.0)
                .slider("rotationZ", 0.0, 0.0, 360.0)
        })
        .group("mandelbox", |g| {
            g.slider("rotationX", 0.0, 0.0, 360.0)
                .slider("rotationY", 0.0, 0.0, 360.0)
                .slider("rotationZ", 0.0, 0.0, 360.0)
        })
        .group("mandelbulb", |g| {
            g.toggle("animatePower", false)
                .slider("power", 8.0, 2.0, 20.0)
                .slider("rotationX", 0.0, 0.0, 360.0)
                .slider("rotationY", 0.0, 0.0, 360.0)
                .slider("rotationZ", 0.0, 0.0, 360.0)
        })
        .group("recursiveShapes", |g| {
            g.select("baseShape", "tetrahedron", &BASE_SHAPES)
                .slider("centerScaleX", 1.0, 0.1, 1.0)
                .slider("centerScaleY", 1.0, 0.1, 1.0)
                .slider("centerScaleZ", 1.0, 0.1, 1.0)
                .toggle("renderTrap", true)
                .slider("rotation1X", 0.0, 0.0, 360.0)
                .slider("rotation1Y", 0.0, 0.0, 360.0)
                .slider("rotation1Z", 0.0, 0.0, 360.0)
                .slider("rotation2X", 0.0, 0.0, 360.0)
                .slider("rotation2Y", 0.0, 0.0, 360.0)
                .slider("rotation2Z", 0.0, 0.0, 360.0)
        })
        .build()
}

/// One plan serves every scene; each schema picks the subset it consumes.
pub fn uniform_plan() -> UniformPlan {
    UniformPlan::new()
        .param("colorMode", "colorMode")
        .param("drawFloor", "floor")
        .param("fogDist", "fogDist")
        .param("knDeOffset", "kleinian.deOffset")
        .param("knLightColor", "kleinian.lightColor")
        .param("knLightDiffuse", "kleinian.lightDiffuse")
        .gather3(
            "knMengerOffset",
            [
                "kleinian.mengerOffsetX",
                "kleinian.mengerOffsetY",
                "kleinian.mengerOffsetZ",
            ],
        )
        .param("knMengerScale", "kleinian.mengerScale")
        .gather3(
            "knOffset",
            ["kleinian.offsetX", "kleinian.offsetY", "kleinian.offsetZ"],
        )
        .gather3(
            "knRotation",
            [
                "kleinian.rotationX",
                "kleinian.rotationY",
                "kleinian.rotationZ",
            ],
        )
        .gather3(
            "moRotation",
            [
                "mandelbox.rotationX",
                "mandelbox.rotationY",
                "mandelbox.rotationZ",
            ],
        )
        .param("muPower", "mandelbulb.power")
        .gather3(
            "muRotation",
            [
                "mandelbulb.rotationX",
                "mandelbulb.rotationY",
                "mandelbulb.rotationZ",
            ],
        )
        .param("paletteColor1", "colorPalette.paletteColor1")
        .param("paletteColor2", "colorPalette.paletteColor2")
        .param("paletteColor3", "colorPalette.paletteColor3")
        .param("quality", "quality")
        .param("rsBaseShape", "recursiveShapes.baseShape")
        .gather3(
            "rsCenterScale",
            [
                "recursiveShapes.centerScaleX",
                "recursiveShapes.centerScaleY",
                "recursiveShapes.centerScaleZ",
            ],
        )
        .param("rsRenderTrap", "recursiveShapes.renderTrap")
        .gather3(
            "rsRotation1",
            [
                "recursiveShapes.rotation1X",
                "recursiveShapes.rotation1Y",
                "recursiveShapes.rotation1Z",
            ],
        )
        .gather3(
            "rsRotation2",
            [
                "recursiveShapes.rotation2X",
                "recursiveShapes.rotation2Y",
                "recursiveShapes.rotation2Z",
            ],
        )
        .param("shapeColor", "shapeColor")
        .gather3(
            "shapeRotation",
            ["shapeRotationX", "shapeRotationY", "shapeRotationZ"],
        )
        .param("spin", "spin")
}

/// Frame globals plus the general/color folders every ray marcher reads.
fn shared_schema() -> UniformSchema {
    UniformSchema::new()
        .field(engine::TIME_UNIFORM, UniformType::Float)
        .field(engine::RESOLUTION_UNIFORM, UniformType::Vec2)
        .field(engine::MOUSE_POSITION_UNIFORM, UniformType::Vec2)
        .field(engine::MOUSE_VELOCITY_UNIFORM, UniformType::Vec2)
        .field("quality", UniformType::Int)
        .field("drawFloor", UniformType::Bool)
        .field("fogDist", UniformType::Float)
        .field("shapeRotation", UniformType::Vec3)
        .field("spin", UniformType::Bool)
        .field("colorMode", UniformType::Int)
        .field("shapeColor", UniformType::Vec3)
        .field("paletteColor1", UniformType::Vec3)
        .field("paletteColor2", UniformType::Vec3)
        .field("paletteColor3", UniformType::Vec3)
}

pub fn scene_defs() -> Vec<SceneDef> {
    vec![
        SceneDef {
            name: "basicCubes".into(),
            fragment: include_str!("../shaders/basicCubes.frag").into(),
            schema: shared_schema(),
        },
        SceneDef {
            name: "mandelbox".into(),
            fragment: include_str!("../shaders/mandelbox.frag").into(),
            schema: shared_schema().field("moRotation", UniformType::Vec3),
        },
        SceneDef {
            name: "mandelbulb".into(),
            fragment: include_str!("../shaders/mandelbulb.frag").into(),
            schema: shared_schema()
                .field("muPower", UniformType::Float)
                .field("muRotation", UniformType::Vec3),
        },
        SceneDef {
            name: "kleinian".into(),
            fragment: include_str!("../shaders/kleinian.frag").into(),
            schema: shared_schema()
                .field("knDeOffset", UniformType::Float)
                .field("knLightColor", UniformType::Vec3)
                .field("knLightDiffuse", UniformType::Float)
                .field("knMengerOffset", UniformType::Vec3)
                .field("knMengerScale", UniformType::Float)
                .field("knOffset", UniformType::Vec3)
                .field("knRotation", UniformType::Vec3),
        },
        SceneDef {
            name: "pseudoNoise".into(),
            fragment: include_str!("../shaders/pseudoNoise.frag").into(),
            schema: shared_schema(),
        },
        SceneDef {
            name: "recursiveShapes".into(),
            fragment: include_str!("../shaders/recursiveShapes.frag").into(),
            schema: shared_schema()
                .field("rsBaseShape", UniformType::Int)
                .field("rsCenterScale", UniformType::Vec3)
                .field("rsRenderTrap", UniformType::Bool)
                .field("rsRotation1", UniformType::Vec3)
                .field("rsRotation2", UniformType::Vec3),
        },
        SceneDef {
            name: "spotlight".into(),
            fragment: include_str!("../shaders/spotlight.frag").into(),
            schema: shared_schema(),
        },
    ]
}
