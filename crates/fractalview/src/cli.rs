use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fractalview",
    author,
    version,
    about = "Interactive fractal shader gallery",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Scene to open with (e.g. `kleinian`); falls back to the default when
    /// the name is unknown.
    #[arg(value_name = "SCENE")]
    pub scene: Option<String>,

    /// List the bundled scenes and exit.
    #[arg(long)]
    pub list: bool,

    /// List the tunable parameters with their defaults and exit.
    #[arg(long)]
    pub list_params: bool,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// TOML preset applied to the parameter tree at startup.
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (w, h) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}
