#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::adt::chunk;
use crate::adt::error::{AdtError, AdtResult};
use crate::adt::groundfx::GROUND_EFFECT_MAP_LEN;
use crate::adt::io::{Reader, Writer};

/// Leading MVER chunk of a root tile, copied verbatim.
const LEAD_LEN: usize = 12;

/// Offset of the low-resolution texturing map inside a root MCNK payload
/// (the header fields up to and including `unknown_but_used`).
const MAP_OFFSET: usize = 0x40;

/// Root tile sharing the tex file's tile identity: same path with the
/// `_tex0` suffix removed.
pub fn companion_path(tex_path: &Path) -> Option<PathBuf> {
    let name = tex_path.file_name()?.to_str()?;
    let base = name.strip_suffix("_tex0.adt")?;
    Some(tex_path.with_file_name(format!("{base}.adt")))
}

/// Substitute the precomputed ground-effect maps into a root tile's MCNK
/// headers, by MCNK occurrence order. Everything else is copied verbatim.
pub fn rewrite_companion(
    input: &[u8],
    maps: &[[u8; GROUND_EFFECT_MAP_LEN]],
) -> AdtResult<Vec<u8>> {
    let mut r = Reader::new(input);
    let mut w = Writer::new();

    w.write_bytes(r.read_bytes(LEAD_LEN)?);

    let mut index = 0usize;
    while !r.at_end() {
        let tag = r.read_tag()?;
        let size = r.read_u32()? as usize;

        if tag == chunk::MCNK {
            if size < MAP_OFFSET + GROUND_EFFECT_MAP_LEN {
                return Err(AdtError::Malformed(format!(
                    "companion MCNK #{index} too small for header map ({size} bytes)"
                )));
            }
            let map = maps.get(index).ok_or_else(|| {
                AdtError::Malformed(format!(
                    "companion has more MCNK chunks than computed maps ({})",
                    maps.len()
                ))
            })?;

            w.write_tag(tag);
            w.write_u32(size as u32);
            w.write_bytes(r.read_bytes(MAP_OFFSET)?);
            r.skip(GROUND_EFFECT_MAP_LEN)?;
            w.write_bytes(map);
            w.write_bytes(r.read_bytes(size - MAP_OFFSET - GROUND_EFFECT_MAP_LEN)?);

            index += 1;
        } else {
            let payload = r.read_bytes(size)?;
            w.write_tag(tag);
            w.write_u32(size as u32);
            w.write_bytes(payload);
        }
    }

    Ok(w.into_vec())
}

/// Second pass over the sibling root tile. A companion that cannot be
/// opened is reported as `CompanionMissing` for the caller to catch and log.
pub fn rewrite_companion_file(
    tex_path: &Path,
    output_dir: &Path,
    maps: &[[u8; GROUND_EFFECT_MAP_LEN]],
) -> AdtResult<()> {
    let root = companion_path(tex_path).ok_or_else(|| {
        AdtError::Malformed(format!("not a tex file name: {}", tex_path.display()))
    })?;
    let Some(root_name) = root.file_name().map(|n| n.to_os_string()) else {
        return Err(AdtError::Malformed(format!(
            "unusable companion name: {}",
            root.display()
        )));
    };

    let input = fs::read(&root).map_err(|_| AdtError::CompanionMissing(root.clone()))?;
    let out = rewrite_companion(&input, maps)?;

    fs::write(output_dir.join(root_name), out)?;
    info!("{} patched", root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_chunk(tag: [u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn companion_name_strips_tex_suffix() {
        let p = companion_path(Path::new("Input/azeroth_30_30_tex0.adt")).unwrap();
        assert_eq!(p, Path::new("Input/azeroth_30_30.adt"));
        assert!(companion_path(Path::new("Input/azeroth_30_30.adt")).is_none());
    }

    #[test]
    fn substitutes_map_at_fixed_header_offset() {
        let mut mcnk_payload = vec![0xAB; MAP_OFFSET];
        mcnk_payload.extend_from_slice(&[0xFF; GROUND_EFFECT_MAP_LEN]);
        mcnk_payload.extend_from_slice(&[0xCD; 4]);

        let mut input = raw_chunk(*b"REVM", &18u32.to_le_bytes());
        input.extend_from_slice(&raw_chunk(*b"RDHM", &[0x11; 8]));
        input.extend_from_slice(&raw_chunk(chunk::MCNK, &mcnk_payload));

        let map = [0b0101_0101u8; GROUND_EFFECT_MAP_LEN];
        let out = rewrite_companion(&input, &[map]).unwrap();

        assert_eq!(out.len(), input.len());
        // Lead and pass-through chunk untouched.
        assert_eq!(&out[..12 + 16], &input[..12 + 16]);
        // MCNK header region untouched, map substituted, trailer untouched.
        let payload = &out[12 + 16 + 8..];
        assert_eq!(&payload[..MAP_OFFSET], &vec![0xAB; MAP_OFFSET][..]);
        assert_eq!(&payload[MAP_OFFSET..MAP_OFFSET + GROUND_EFFECT_MAP_LEN], &map);
        assert_eq!(&payload[MAP_OFFSET + GROUND_EFFECT_MAP_LEN..], &[0xCD; 4]);
    }

    #[test]
    fn more_mcnks_than_maps_is_structural() {
        let mcnk_payload = vec![0u8; MAP_OFFSET + GROUND_EFFECT_MAP_LEN];
        let mut input = raw_chunk(*b"REVM", &18u32.to_le_bytes());
        input.extend_from_slice(&raw_chunk(chunk::MCNK, &mcnk_payload));

        let err = rewrite_companion(&input, &[]).unwrap_err();
        assert!(matches!(err, AdtError::Malformed(_)));
    }
}
