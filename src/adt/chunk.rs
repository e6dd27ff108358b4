#![forbid(unsafe_code)]

use crate::adt::io::{Reader, Writer};
use crate::adt::error::AdtResult;

// Chunk tags as stored on disk (byte-reversed).
pub const MTEX: [u8; 4] = *b"XETM";
pub const MDID: [u8; 4] = *b"DIDM";
pub const MHID: [u8; 4] = *b"DIHM";
pub const MCNK: [u8; 4] = *b"KNCM";
pub const MCLY: [u8; 4] = *b"YLCM";
pub const MCAL: [u8; 4] = *b"LACM";
pub const MTXP: [u8; 4] = *b"PXTM";

/// Forward (human-readable) spelling of an on-disk tag.
pub fn tag_name(tag: [u8; 4]) -> String {
    let mut t = tag;
    t.reverse();
    String::from_utf8_lossy(&t).into_owned()
}

pub const LAYER_RECORD_LEN: usize = 16;

/// One MCLY texture layer record.
#[derive(Debug, Clone, Copy)]
pub struct LayerRecord {
    pub texture_index: u32,
    pub flags: u32,
    pub alpha_offset: u32,
    pub ground_effect: u32,
}

impl LayerRecord {
    pub fn read(r: &mut Reader<'_>) -> AdtResult<Self> {
        Ok(LayerRecord {
            texture_index: r.read_u32()?,
            flags: r.read_u32()?,
            alpha_offset: r.read_u32()?,
            ground_effect: r.read_u32()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u32(self.texture_index);
        w.write_u32(self.flags);
        w.write_u32(self.alpha_offset);
        w.write_u32(self.ground_effect);
    }
}
