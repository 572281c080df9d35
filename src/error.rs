use thiserror::Error;

/// Failure modes surfaced by the decoder and its supporting data structures.
///
/// No `Err` variant is ever returned alongside a partial error estimate: when
/// a call fails the caller receives no `e` at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    #[error("parity-check matrix shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid syndrome: {0}")]
    InvalidSyndrome(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}
