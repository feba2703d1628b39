//! Keyboard control surface: scene cycling and a handful of live parameter
//! tweaks, all expressed as plain `set` calls against the store.
//!
//! The key handling is generic over the gallery's program handle; the
//! [`ControlSurface`] impl just pins it to the renderer's pipeline type.

use engine::{Gallery, Value};
use renderer::{ControlSurface, SceneGallery};

const FOG_STEP: f32 = 5.0;
const FOG_MIN: f32 = 15.0;
const FOG_MAX: f32 = 200.0;

/// Writes through the store and registry contracts only; the gallery itself
/// carries all the state.
#[derive(Debug, Default)]
pub struct HotkeyPanel;

impl HotkeyPanel {
    pub fn new() -> Self {
        Self
    }
}

impl ControlSurface for HotkeyPanel {
    fn on_key(&mut self, key: &str, gallery: &mut SceneGallery) {
        handle_key(key, gallery);
    }

    fn tick(&mut self, gallery: &mut SceneGallery, seconds: f32) {
        animate(gallery, seconds);
    }
}

fn handle_key<H>(key: &str, gallery: &mut Gallery<H>) {
    match key {
        "ArrowRight" | "Tab" => {
            gallery.registry.select_next();
            tracing::info!(scene = gallery.registry.active(), "scene changed");
        }
        "ArrowLeft" => {
            gallery.registry.select_prev();
            tracing::info!(scene = gallery.registry.active(), "scene changed");
        }
        "f" => toggle(gallery, "floor"),
        "s" => toggle(gallery, "spin"),
        "p" => toggle(gallery, "mandelbulb.animatePower"),
        "1" | "2" | "3" | "4" => {
            // Keys are single ASCII digits, the parse cannot fail.
            if let Ok(quality) = key.parse::<f32>() {
                write(gallery, "quality", Value::Number(quality));
            }
        }
        "[" => nudge_fog(gallery, -FOG_STEP),
        "]" => nudge_fog(gallery, FOG_STEP),
        _ => {}
    }
}

fn animate<H>(gallery: &mut Gallery<H>, seconds: f32) {
    let on = matches!(
        gallery.params.get("mandelbulb.animatePower"),
        Ok(Value::Toggle(true))
    );
    if on {
        let power = 2.0 + ((seconds / 3.0).sin() + 1.0) * 9.0;
        write(gallery, "mandelbulb.power", Value::Number(power));
    }
}

fn toggle<H>(gallery: &mut Gallery<H>, path: &str) {
    if let Ok(&Value::Toggle(current)) = gallery.params.get(path) {
        write(gallery, path, Value::Toggle(!current));
    }
}

fn nudge_fog<H>(gallery: &mut Gallery<H>, step: f32) {
    if let Ok(&Value::Number(current)) = gallery.params.get("fogDist") {
        let next = (current + step).clamp(FOG_MIN, FOG_MAX);
        write(gallery, "fogDist", Value::Number(next));
    }
}

fn write<H>(gallery: &mut Gallery<H>, path: &str, value: Value) {
    if let Err(error) = gallery.params.set(path, value) {
        tracing::warn!(%error, "hotkey write rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{CompileError, ProgramCompiler, ProgramRegistry, UniformSchema};

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

    fn gallery() -> Gallery<()> {
        let mut compiler = NullCompiler;
        let mut registry = ProgramRegistry::new(crate::scenes::DEFAULT_SCENE);
        for scene in crate::scenes::scene_defs() {
            registry
                .register(&mut compiler, &scene.name, "vert", "frag", scene.schema)
                .unwrap();
        }
        Gallery::new(
            registry,
            crate::scenes::default_params(),
            crate::scenes::uniform_plan(),
            None,
        )
    }

    #[test]
    fn arrow_keys_cycle_scenes_both_ways() {
        let mut gallery = gallery();
        let start = gallery.registry.active().to_string();
        handle_key("ArrowRight", &mut gallery);
        assert_ne!(gallery.registry.active(), start);
        handle_key("ArrowLeft", &mut gallery);
        assert_eq!(gallery.registry.active(), start);
    }

    #[test]
    fn digit_keys_set_quality() {
        let mut gallery = gallery();
        handle_key("3", &mut gallery);
        assert_eq!(
            gallery.params.get("quality").unwrap(),
            &Value::Number(3.0)
        );
    }

    #[test]
    fn floor_toggle_flips() {
        let mut gallery = gallery();
        handle_key("f", &mut gallery);
        assert_eq!(
            gallery.params.get("floor").unwrap(),
            &Value::Toggle(false)
        );
        handle_key("f", &mut gallery);
        assert_eq!(gallery.params.get("floor").unwrap(), &Value::Toggle(true));
    }

    #[test]
    fn fog_nudges_stay_in_range() {
        let mut gallery = gallery();
        for _ in 0..100 {
            handle_key("[", &mut gallery);
        }
        assert_eq!(
            gallery.params.get("fogDist").unwrap(),
            &Value::Number(FOG_MIN)
        );
    }

    #[test]
    fn animate_power_drives_the_power_slider() {
        let mut gallery = gallery();

        animate(&mut gallery, 1.0);
        assert_eq!(
            gallery.params.get("mandelbulb.power").unwrap(),
            &Value::Number(8.0),
            "power untouched while animation is off"
        );

        handle_key("p", &mut gallery);
        animate(&mut gallery, 0.0);
        match gallery.params.get("mandelbulb.power").unwrap() {
            Value::Number(power) => assert!((power - 11.0).abs() < 1e-5),
            other => panic!("expected number, got {other:?}"),
        }
    }
}
