//! Error types shared by every layer built on top of the walker.
//!
//! The walker only ever fails in one of two ways: the input is not, and can
//! never become, a prefix of a valid JSON document (`Invalid`), or the input
//! is a valid prefix that simply stopped too soon (`Incomplete`). Every other
//! component in this crate (the extractor, the editor, the pretty-printer)
//! lifts one of these two variants unchanged rather than inventing its own
//! error vocabulary.

use thiserror::Error;

/// The two ways a walk over a byte buffer can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WalkError {
    /// The input contains a byte sequence that cannot be any prefix of a
    /// valid JSON document.
    #[error("malformed JSON input")]
    Invalid,
    /// The input is a valid prefix of a JSON document but ends mid-token or
    /// mid-container.
    #[error("input ended before a complete value was read")]
    Incomplete,
}

/// Convenience alias used throughout the crate.
pub type WalkResult<T> = Result<T, WalkError>;
