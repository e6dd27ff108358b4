#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Deserializer, Serialize};

use crate::adt::AdtResult;

/// Authoring parameters for one texture, as stored in the config tables.
/// Field names match the original config files, so existing ones load as-is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextureInfo {
    /// Scale index, saturating at 15 (packed into 4 bits of the MTXP flags).
    #[serde(deserialize_with = "clamped_scale")]
    pub scale: u8,
    pub height_scale: f32,
    pub height_offset: f32,
    pub ground_effect: u32,
}

fn clamped_scale<'de, D>(d: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(u8::deserialize(d)?.min(15))
}

impl TextureInfo {
    pub fn new(scale: u8, height_scale: f32, height_offset: f32, ground_effect: u32) -> Self {
        TextureInfo {
            scale: scale.min(15),
            height_scale,
            height_offset,
            ground_effect,
        }
    }

    /// MTXP flags word: scale index in bits 4..8.
    pub fn flags(&self) -> u32 {
        u32::from(self.scale) << 4
    }
}

impl Default for TextureInfo {
    fn default() -> Self {
        TextureInfo::new(1, 0.0, 1.0, 0)
    }
}

/// Texture parameter tables: one global, plus per-tile overrides keyed by
/// lowercase tile name.
#[derive(Debug, Default)]
pub struct TextureConfig {
    pub global: HashMap<String, TextureInfo>,
    pub by_tile: HashMap<String, HashMap<String, TextureInfo>>,
}

impl TextureConfig {
    /// Override table for the tile first, then the global table.
    pub fn resolve(&self, tile: &str, texture: &str) -> Option<TextureInfo> {
        if let Some(overrides) = self.by_tile.get(tile) {
            if let Some(info) = overrides.get(texture) {
                return Some(*info);
            }
        }
        self.global.get(texture).copied()
    }
}

fn parse_table(json: &str) -> AdtResult<HashMap<String, TextureInfo>> {
    Ok(serde_json::from_str(json)?)
}

/// Load `global.cfg` plus any per-tile `<tile>.cfg` overrides from the config
/// directory. A missing global config is bootstrapped with a single example
/// entry first.
pub fn load_config(dir: &Path) -> AdtResult<TextureConfig> {
    let global_path = dir.join("global.cfg");
    if !global_path.exists() {
        write_default_config(dir)?;
    }

    let global = parse_table(&fs::read_to_string(&global_path)?)?;
    info!("loaded global texture config, {} entries", global.len());

    let mut by_tile = HashMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "cfg") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
            continue;
        };
        if stem == "global" {
            continue;
        }

        let table = parse_table(&fs::read_to_string(&path)?)?;
        info!("loaded texture overrides for tile {stem}");
        by_tile.insert(stem, table);
    }

    Ok(TextureConfig { global, by_tile })
}

fn write_default_config(dir: &Path) -> AdtResult<()> {
    let mut global = HashMap::new();
    global.insert(
        "tileset/expansion06/valsharah/7vs_rock_04.blp".to_string(),
        TextureInfo::new(2, 15.6, 0.93, 0),
    );

    fs::create_dir_all(dir)?;
    fs::write(dir.join("global.cfg"), serde_json::to_string_pretty(&global)?)?;
    Ok(())
}
