//! Error taxonomy of the descriptor codec.

use std::io;
use thiserror::Error;

/// Errors produced while sniffing a descriptor or coding its extra2 segment.
///
/// Only `Unreadable` is fatal to classification; everything else is recorded next to a
/// best-effort `TableKind` so that damaged descriptors stay droppable.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("descriptor unreadable: {0}")]
    Unreadable(#[from] io::Error),

    #[error("truncated: need {need} bytes at offset {offset}, have {have}")]
    Truncated {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("malformed extra2 segment: {0}")]
    Malformed(String),

    #[error("unknown important extra2 tag {0}")]
    Incompatible(u8),

    #[error("engine resolution failed for legacy id {0}")]
    EngineResolutionFailed(u8),

    #[error("extra2 segment too large: {size} bytes (max {max})")]
    SegmentTooLarge { size: usize, max: usize },

    #[error("output buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("descriptor image too large: {size} bytes (limit {limit})")]
    ImageTooLarge { size: u64, limit: u64 },
}

impl CodecError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CodecError::Malformed(msg.into())
    }

    /// True for the structural decode failures (Truncated/Malformed/Incompatible).
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            CodecError::Truncated { .. } | CodecError::Malformed(_) | CodecError::Incompatible(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
