#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdtError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("listfile: {0}")]
    Listfile(String),

    #[error("truncated chunk data: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("layer texture index {index} out of range (identity list has {count} entries)")]
    LayerIndex { index: u32, count: usize },

    #[error("malformed adt: {0}")]
    Malformed(String),

    #[error("companion file missing: {}", .0.display())]
    CompanionMissing(PathBuf),

    #[error("{failed} file(s) failed")]
    Batch { failed: usize },
}

pub type AdtResult<T> = Result<T, AdtError>;
