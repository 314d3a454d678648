use thiserror::Error;

use crate::types::Coord;

/// Failures raised by the index, the transcript model and the evidence classifiers.
///
/// Only `InvalidRange` and `MalformedTranscript` are fatal; they can only occur while
/// annotations are loaded. The remaining variants are scoped to a single read or a
/// single junction and are absorbed (logged and counted) by the read driver.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid range: lower bound {lo} is above upper bound {hi}")]
    InvalidRange { lo: String, hi: String },

    #[error("malformed transcript {name}: {reason}")]
    MalformedTranscript { name: String, reason: String },

    #[error("read {read} has no usable base at junction {junction}")]
    UnresolvedJunction { read: String, junction: Coord },

    #[error("cannot anchor the read span of pair {read}")]
    InconsistentReadSpan { read: String },

    #[error("alignment unavailable: {0}")]
    AlignmentUnavailable(String),

    #[error("reference sequence unavailable for {chrom}:{start}-{end}")]
    ReferenceUnavailable { chrom: String, start: Coord, end: Coord },
}

pub type Result<T> = std::result::Result<T, Error>;
