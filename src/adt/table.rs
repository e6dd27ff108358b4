#![forbid(unsafe_code)]

use log::warn;

use crate::adt::chunk;
use crate::adt::error::{AdtError, AdtResult};
use crate::adt::io::Writer;
use crate::lookup::{LookupContext, TextureInfo};

/// The texture identity list of one tile: legacy files carry a
/// null-terminated name blob (MTEX), modern files a packed file-id array
/// (MDID). Exactly one form is populated per file.
pub enum Identities {
    None,
    Names(Vec<String>),
    FileIds(Vec<u32>),
}

/// Accumulates the identity list while the top-level chunks stream past,
/// then emits the derived MHID payload and the trailing MTXP chunk.
pub struct TextureTable {
    ids: Identities,
}

/// Split a null-terminated name blob. The final split segment is an
/// artifact of the trailing terminator and is discarded.
pub fn parse_name_blob(blob: &[u8]) -> Vec<String> {
    let mut names: Vec<String> = blob
        .split(|&b| b == 0)
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect();
    names.pop();
    names
}

impl TextureTable {
    pub fn new() -> Self {
        TextureTable {
            ids: Identities::None,
        }
    }

    pub fn set_names(&mut self, blob: &[u8]) {
        self.ids = Identities::Names(parse_name_blob(blob));
    }

    pub fn set_file_ids(&mut self, payload: &[u8]) {
        let ids = payload
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        self.ids = Identities::FileIds(ids);
    }

    pub fn len(&self) -> usize {
        match &self.ids {
            Identities::None => 0,
            Identities::Names(names) => names.len(),
            Identities::FileIds(ids) => ids.len(),
        }
    }

    /// Legacy-name tiles get their layer ground-effect ids rewritten in
    /// place; file-id tiles carry them in MTXP instead.
    pub fn is_legacy(&self) -> bool {
        matches!(self.ids, Identities::Names(_))
    }

    pub fn check_index(&self, index: u32) -> AdtResult<()> {
        if (index as usize) < self.len() {
            Ok(())
        } else {
            Err(AdtError::LayerIndex {
                index,
                count: self.len(),
            })
        }
    }

    /// Resolved ground-effect id for the texture a layer references.
    pub fn ground_effect_for(
        &self,
        index: u32,
        tile: &str,
        lookup: &LookupContext,
    ) -> AdtResult<u32> {
        self.check_index(index)?;
        Ok(self.info_for(index as usize, tile, lookup).ground_effect)
    }

    fn info_for(&self, index: usize, tile: &str, lookup: &LookupContext) -> TextureInfo {
        match &self.ids {
            Identities::None => TextureInfo::default(),
            Identities::Names(names) => lookup.texture_info(tile, &names[index]),
            Identities::FileIds(ids) => match lookup.listfile.name(ids[index]) {
                Some(name) => lookup.texture_info(tile, name),
                None => {
                    warn!("no listfile entry for texture file id {}, using default values", ids[index]);
                    TextureInfo::default()
                }
            },
        }
    }

    fn height_id_for(&self, index: usize, lookup: &LookupContext) -> u32 {
        match &self.ids {
            Identities::None => 0,
            Identities::Names(names) => lookup.height_texture_id(&names[index]),
            Identities::FileIds(ids) => match lookup.listfile.name(ids[index]) {
                Some(name) => lookup.height_texture_id(name),
                None => {
                    warn!("no listfile entry for texture file id {}, writing 0", ids[index]);
                    0
                }
            },
        }
    }

    /// Resolved height-texture id array, one entry per identity, replacing
    /// the placeholder MHID payload.
    pub fn write_mhid_payload(&self, w: &mut Writer, lookup: &LookupContext) {
        for i in 0..self.len() {
            w.write_u32(self.height_id_for(i, lookup));
        }
    }

    /// The trailing MTXP chunk: one 16-byte parameter record per identity,
    /// in ordinal order, length back-patched once all records are written.
    pub fn write_mtxp(&self, w: &mut Writer, tile: &str, lookup: &LookupContext) {
        w.write_tag(chunk::MTXP);
        let len_pos = w.reserve_u32();

        for i in 0..self.len() {
            let info = self.info_for(i, tile, lookup);
            w.write_u32(info.flags());
            w.write_f32(info.height_scale);
            w.write_f32(info.height_offset);
            w.write_u32(0);
        }

        w.patch_chunk_len(len_pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{Listfile, TextureConfig};

    fn empty_context() -> LookupContext {
        LookupContext {
            textures: TextureConfig::default(),
            listfile: Listfile::default(),
        }
    }

    #[test]
    fn name_blob_drops_trailing_terminator_artifact() {
        assert_eq!(parse_name_blob(b"a\0b\0c\0"), vec!["a", "b", "c"]);
        assert_eq!(parse_name_blob(b""), Vec::<String>::new());
    }

    #[test]
    fn layer_index_is_validated() {
        let mut table = TextureTable::new();
        table.set_names(b"tileset/a.blp\0");
        assert!(table.check_index(0).is_ok());
        let err = table.check_index(1).unwrap_err();
        assert!(matches!(err, AdtError::LayerIndex { index: 1, count: 1 }));
    }

    #[test]
    fn mtxp_record_count_matches_identity_count_on_misses() {
        let mut table = TextureTable::new();
        table.set_file_ids(&[1u32.to_le_bytes(), 2u32.to_le_bytes()].concat());

        let mut w = Writer::new();
        table.write_mtxp(&mut w, "sometile", &empty_context());
        let out = w.into_vec();

        // Tag + length + 2 records of default values.
        assert_eq!(out.len(), 8 + 2 * 16);
        assert_eq!(u32::from_le_bytes([out[4], out[5], out[6], out[7]]), 32);
        // Default: flags = 1 << 4, height_scale = 0.0, height_offset = 1.0.
        assert_eq!(u32::from_le_bytes([out[8], out[9], out[10], out[11]]), 0x10);
        assert_eq!(f32::from_le_bytes([out[16], out[17], out[18], out[19]]), 1.0);
        assert_eq!(u32::from_le_bytes([out[20], out[21], out[22], out[23]]), 0);
    }

    #[test]
    fn mhid_resolves_per_identity() {
        let mut listfile = Listfile::default();
        listfile.insert(100, "tileset/grass.blp");
        listfile.insert(101, "tileset/grass_h.blp");
        let ctx = LookupContext {
            textures: TextureConfig::default(),
            listfile,
        };

        let mut table = TextureTable::new();
        table.set_file_ids(&[100u32.to_le_bytes(), 999u32.to_le_bytes()].concat());

        let mut w = Writer::new();
        table.write_mhid_payload(&mut w, &ctx);
        let out = w.into_vec();
        assert_eq!(out.len(), 8);
        assert_eq!(u32::from_le_bytes([out[0], out[1], out[2], out[3]]), 101);
        assert_eq!(u32::from_le_bytes([out[4], out[5], out[6], out[7]]), 0);
    }
}
