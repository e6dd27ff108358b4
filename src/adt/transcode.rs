#![forbid(unsafe_code)]

use log::{debug, warn};

use crate::adt::chunk::{self, LayerRecord};
use crate::adt::error::AdtResult;
use crate::adt::groundfx::{GroundEffectClassifier, ALPHA_BLOCK_LEN, GROUND_EFFECT_MAP_LEN};
use crate::adt::io::{Reader, Writer};
use crate::adt::table::TextureTable;
use crate::lookup::LookupContext;

/// Result of one tex-file pass: the rewritten chunk stream plus one
/// ground-effect map per MCNK, in occurrence order, for the companion
/// rewrite.
#[derive(Debug)]
pub struct Transcoded {
    pub bytes: Vec<u8>,
    pub ground_effect_maps: Vec<[u8; GROUND_EFFECT_MAP_LEN]>,
}

/// Walk the top-level chunk stream of a tex file. Chunks with no special
/// handling are copied byte-for-byte; MTEX/MDID populate the texture table,
/// MHID is rewritten from the listfile, MCNK containers get a nested walk
/// with a recomputed length, and the MTXP chunk is appended once the input
/// is exhausted.
pub fn transcode_tex(
    input: &[u8],
    tile: &str,
    lookup: &LookupContext,
    cutoff: u32,
) -> AdtResult<Transcoded> {
    let mut r = Reader::new(input);
    let mut w = Writer::new();
    let mut table = TextureTable::new();
    let mut maps = Vec::new();

    while !r.at_end() {
        let tag = r.read_tag()?;
        let size = r.read_u32()? as usize;

        match tag {
            chunk::MTEX => {
                warn!("{tile}: legacy MTEX chunk found, convert to MDID and rerun");
                let blob = r.read_bytes(size)?;
                table.set_names(blob);
                w.write_tag(tag);
                w.write_u32(size as u32);
                w.write_bytes(blob);
            }
            chunk::MDID => {
                let payload = r.read_bytes(size)?;
                table.set_file_ids(payload);
                w.write_tag(tag);
                w.write_u32(size as u32);
                w.write_bytes(payload);
            }
            chunk::MHID => {
                // Placeholder payload is dropped; the real ids are derived
                // from the identity list.
                r.skip(size)?;
                w.write_tag(tag);
                let len_pos = w.reserve_u32();
                table.write_mhid_payload(&mut w, lookup);
                w.patch_chunk_len(len_pos);
            }
            chunk::MCNK => {
                w.write_tag(tag);
                let len_pos = w.reserve_u32();
                let mut sub = Reader::new(r.read_bytes(size)?);
                let map = walk_mcnk(&mut sub, &mut w, &table, tile, lookup, cutoff)?;
                w.patch_chunk_len(len_pos);
                maps.push(map);
            }
            _ => {
                debug!("{tile}: copying existing {} chunk", chunk::tag_name(tag));
                let payload = r.read_bytes(size)?;
                w.write_tag(tag);
                w.write_u32(size as u32);
                w.write_bytes(payload);
            }
        }
    }

    table.write_mtxp(&mut w, tile, lookup);

    Ok(Transcoded {
        bytes: w.into_vec(),
        ground_effect_maps: maps,
    })
}

/// Nested walk over one MCNK's sub-chunks. Layer records are rewritten,
/// alpha payloads are copied and classified, and any other sub-chunk is
/// dropped from the output, so the caller must back-patch the container
/// length.
fn walk_mcnk(
    r: &mut Reader<'_>,
    w: &mut Writer,
    table: &TextureTable,
    tile: &str,
    lookup: &LookupContext,
    cutoff: u32,
) -> AdtResult<[u8; GROUND_EFFECT_MAP_LEN]> {
    let mut classifier = GroundEffectClassifier::new(cutoff);

    while !r.at_end() {
        let sub_tag = r.read_tag()?;
        let sub_size = r.read_u32()? as usize;

        match sub_tag {
            chunk::MCLY => {
                w.write_tag(sub_tag);
                w.write_u32(sub_size as u32);

                let mut records = Reader::new(r.read_bytes(sub_size)?);
                while !records.at_end() {
                    let mut rec = LayerRecord::read(&mut records)?;
                    table.check_index(rec.texture_index)?;
                    if table.is_legacy() {
                        rec.ground_effect =
                            table.ground_effect_for(rec.texture_index, tile, lookup)?;
                    }
                    rec.write(w);
                }
            }
            chunk::MCAL => {
                let payload = r.read_bytes(sub_size)?;
                w.write_tag(sub_tag);
                w.write_u32(sub_size as u32);
                w.write_bytes(payload);

                for block in payload.chunks_exact(ALPHA_BLOCK_LEN) {
                    classifier.add_block(block);
                }
            }
            _ => {
                // Sub-chunks the tool does not rebuild are dropped on
                // purpose; the recomputed MCNK length accounts for it.
                r.skip(sub_size)?;
            }
        }
    }

    Ok(classifier.finish())
}
