mod cli;
mod panel;
mod preset;
mod scenes;

use anyhow::Result;
use engine::{ControlKind, Value};
use renderer::GalleryConfig;
use tracing_subscriber::EnvFilter;

use crate::panel::HotkeyPanel;

const DEFAULT_WINDOW_SIZE: (u32, u32) = (1280, 720);

fn main() -> Result<()> {
    let cli = cli::parse();
    initialise_tracing();

    if cli.list {
        return list_scenes();
    }
    if cli.list_params {
        return list_params();
    }

    let mut params = scenes::default_params();
    if let Some(path) = &cli.preset {
        preset::apply_preset(&mut params, path)?;
    }

    let target_fps = cli.fps.filter(|fps| *fps > 0.0);
    let config = GalleryConfig {
        title: "fractalview".to_string(),
        window_size: cli.size.unwrap_or(DEFAULT_WINDOW_SIZE),
        target_fps,
        default_scene: scenes::DEFAULT_SCENE.to_string(),
        deep_link: cli.scene,
        vertex_source: scenes::VERTEX_SOURCE.to_string(),
        scenes: scenes::scene_defs(),
    };

    tracing::info!(
        scenes = config.scenes.len(),
        fps = ?config.target_fps,
        "starting fractalview"
    );
    renderer::run(
        config,
        params,
        scenes::uniform_plan(),
        Box::new(HotkeyPanel::new()),
    )
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn list_scenes() -> Result<()> {
    println!("Bundled scenes:");
    for scene in scenes::scene_defs() {
        let marker = if scene.name == scenes::DEFAULT_SCENE {
            " (default)"
        } else {
            ""
        };
        println!("  {}{marker}", scene.name);
    }
    Ok(())
}

fn list_params() -> Result<()> {
    println!("Tunable parameters:");
    for (path, kind, value) in scenes::default_params().controls() {
        let kind_label = match &kind {
            ControlKind::Slider { min, max, .. } => format!("slider {min}..{max}"),
            ControlKind::Toggle => "toggle".to_string(),
            ControlKind::Color => "color".to_string(),
            ControlKind::Select { options } => format!("select [{}]", options.join(", ")),
        };
        let default_label = match &value {
            Value::Number(number) => format!("{number}"),
            Value::Toggle(flag) => format!("{flag}"),
            Value::Color(channels) => {
                format!("[{}, {}, {}]", channels[0], channels[1], channels[2])
            }
            Value::Choice(choice) => choice.clone(),
        };
        println!("  {path:<36} {kind_label:<28} default={default_label}");
    }
    Ok(())
}
