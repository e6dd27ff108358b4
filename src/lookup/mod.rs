#![forbid(unsafe_code)]

mod config;
mod listfile;

pub use config::{load_config, TextureConfig, TextureInfo};
pub use listfile::{load_listfile, Listfile};

use log::warn;

/// Strip the `_s` specular suffix so both diffuse and specular paths key the
/// same entry.
pub fn base_texture_name(texture: &str) -> String {
    match texture.strip_suffix("_s.blp") {
        Some(stem) => format!("{stem}.blp"),
        None => texture.to_string(),
    }
}

/// Read-only resolution tables, built once at startup and shared across
/// workers.
pub struct LookupContext {
    pub textures: TextureConfig,
    pub listfile: Listfile,
}

impl LookupContext {
    /// Two-level texture parameter lookup: per-tile override table first,
    /// then the global table, then defaults. A miss is logged, not fatal.
    pub fn texture_info(&self, tile: &str, texture: &str) -> TextureInfo {
        let key = base_texture_name(texture);
        if let Some(info) = self.textures.resolve(tile, &key) {
            return info;
        }
        warn!("no texture metadata for {texture}, using default values");
        TextureInfo::default()
    }

    /// Derive the height-texture file id for a diffuse texture by suffix
    /// substitution (`foo.blp` -> `foo_h.blp`) and reverse listfile lookup.
    /// A miss yields 0 and a warning.
    pub fn height_texture_id(&self, diffuse: &str) -> u32 {
        let base = base_texture_name(diffuse);
        let height_name = match base.strip_suffix(".blp") {
            Some(stem) => format!("{stem}_h.blp"),
            None => return 0,
        };
        match self.listfile.id(&height_name) {
            Some(id) => id,
            None => {
                warn!("no height texture for {diffuse}, returning 0");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> LookupContext {
        let mut textures = TextureConfig::default();
        textures.global.insert(
            "tileset/grass.blp".into(),
            TextureInfo::new(3, 2.5, 0.5, 9),
        );
        let mut listfile = Listfile::default();
        listfile.insert(100, "tileset/grass.blp");
        listfile.insert(101, "tileset/grass_h.blp");
        LookupContext { textures, listfile }
    }

    #[test]
    fn specular_suffix_is_normalized() {
        assert_eq!(base_texture_name("tileset/a_s.blp"), "tileset/a.blp");
        assert_eq!(base_texture_name("tileset/a.blp"), "tileset/a.blp");
    }

    #[test]
    fn lookup_falls_back_to_default() {
        let ctx = context();
        let info = ctx.texture_info("azeroth_30_30", "tileset/unknown.blp");
        assert_eq!(info.scale, 1);
        assert_eq!(info.height_scale, 0.0);
        assert_eq!(info.height_offset, 1.0);
        assert_eq!(info.ground_effect, 0);
    }

    #[test]
    fn lookup_resolves_specular_alias() {
        let ctx = context();
        let info = ctx.texture_info("azeroth_30_30", "tileset/grass_s.blp");
        assert_eq!(info.scale, 3);
        assert_eq!(info.ground_effect, 9);
    }

    #[test]
    fn height_id_derivation() {
        let ctx = context();
        assert_eq!(ctx.height_texture_id("tileset/grass.blp"), 101);
        assert_eq!(ctx.height_texture_id("tileset/grass_s.blp"), 101);
        assert_eq!(ctx.height_texture_id("tileset/dirt.blp"), 0);
    }
}
