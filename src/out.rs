//! Extraction targets for [`crate::scanf`]: the receiving side of a
//! `%`-conversion, the mirror image of [`crate::Arg`].
//!
//! Every variant owns a mutable reference to a caller-provided slot rather
//! than borrowing from the source buffer — a `%T` capture copies its raw
//! span into a `Vec<u8>` rather than handing back a zero-copy [`Token`],
//! trading one allocation for a much simpler lifetime story than the
//! original pointer-writing `va_list` convention this replaces.
//!
//! [`Token`]: crate::Token

use crate::token::TokenKind;

/// One value to be filled in by a `%`-conversion in a [`crate::scanf`]
/// format string.
pub enum Out<'a> {
    /// `%d %i` — a signed integer.
    Int(&'a mut i64),
    /// `%u %o %x %X` — an unsigned integer.
    UInt(&'a mut u64),
    /// `%f %e %g %a` — a floating-point number.
    Float(&'a mut f64),
    /// `%B` — a boolean.
    Bool(&'a mut bool),
    /// `%s` — the matched token's raw text, unescaped for strings.
    Str(&'a mut String),
    /// `%Q` — a JSON string, quote-unescaped into an owned `String`. `None`
    /// is stored for a matched `null`.
    Quoted(&'a mut Option<String>),
    /// `%V` — a string token, base64-decoded.
    Base64Blob(&'a mut Vec<u8>),
    /// `%H` — a string token, hex-decoded.
    HexBlob(&'a mut Vec<u8>),
    /// `%T` — the matched token's kind and raw bytes, uninterpreted.
    Raw(&'a mut Option<(TokenKind, Vec<u8>)>),
    /// `%M` — a user callback invoked with the matched value's raw span.
    /// Mirrors the reference toolkit's convention of handing a nested
    /// extractor the same `(str, len)` pair it would give `json_scanf`,
    /// leaving further decomposition (e.g. via [`crate::scanf_array_elem`])
    /// to the callback itself.
    Callback(&'a mut dyn FnMut(&[u8])),
}
