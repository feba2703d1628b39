//! TOML parameter presets: a flat `path = value` table applied to the store
//! at startup.
//!
//! ```toml
//! "fogDist" = 120
//! "mandelbulb.power" = 10.5
//! "colorMode" = "solid"
//! "colorPalette.paletteColor1" = [128, 0, 255]
//! "spin" = false
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use engine::{ParameterStore, Value};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
enum PresetValue {
    Toggle(bool),
    Number(f64),
    Text(String),
    Triple([f64; 3]),
}

impl From<PresetValue> for Value {
    fn from(raw: PresetValue) -> Self {
        match raw {
            PresetValue::Toggle(flag) => Value::Toggle(flag),
            PresetValue::Number(number) => Value::Number(number as f32),
            PresetValue::Text(choice) => Value::Choice(choice),
            PresetValue::Triple(channels) => Value::Color([
                channels[0] as f32,
                channels[1] as f32,
                channels[2] as f32,
            ]),
        }
    }
}

/// Reads the preset file and writes every entry through `set`.
///
/// Unknown paths abort with the store's own error; a preset that names a
/// parameter the tree does not have is a configuration mistake, not
/// something to paper over.
pub fn apply_preset(store: &mut ParameterStore, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read preset {}", path.display()))?;
    let entries: BTreeMap<String, PresetValue> = toml::from_str(&text)
        .with_context(|| format!("failed to parse preset {}", path.display()))?;

    let count = entries.len();
    for (param, raw) in entries {
        store
            .set(&param, raw.into())
            .with_context(|| format!("preset {} rejected", path.display()))?;
    }
    tracing::info!(preset = %path.display(), parameters = count, "preset applied");
    Ok(())
}
