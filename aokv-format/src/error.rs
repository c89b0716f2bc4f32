//! Error types for the AOKV format

use thiserror::Error;

/// AOKV error types.
#[derive(Debug, Error)]
pub enum AokvError {
    /// The first block's magics didn't match the KVP identity for the
    /// configured `fileId` — fatal, raised only from `index()`.
    #[error("not an AOKV file (or wrong fileId)")]
    NotAokv,

    /// A value descriptor named an unrecognized type tag `t`.
    #[error("bad variant tag in value descriptor")]
    BadVariant,

    /// A typed-array descriptor named an unrecognized element type `a`.
    #[error("unrecognized typed array element kind: {0}")]
    BadTypedArray(String),

    /// A block's magic, size, or internal layout didn't parse.
    #[error("corrupt block")]
    CorruptBlock,

    /// A read ran out of bytes before a structurally-required field.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// `get` was called before `index()` completed.
    #[error("reader is not indexed yet")]
    NotIndexed,

    /// A configured limit (key size, body size, ...) was exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Underlying I/O failure from the byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode failure in the descriptor or index content.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal invariant violation that should not be reachable.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias used throughout the AOKV crates.
pub type Result<T> = std::result::Result<T, AokvError>;
