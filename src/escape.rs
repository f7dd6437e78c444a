//! JSON string escaping, base64, and hex codecs.
//!
//! These are the leaf-level byte transforms the printer, extractor, and
//! editor all build on: turning arbitrary bytes into a JSON string body
//! (`escape`/`escape_quoted`), recovering bytes from one (`unescape`), and the
//! two binary encodings the `%V`/`%H` printer conversions expose.

use crate::error::{WalkError, WalkResult};

/// Appends the JSON-escaped body of `src` (no surrounding quotes) to `out`.
///
/// Control bytes below `0x20` are emitted as `\uNNNN`. The recognized short
/// escapes (`\" \\ \x08 \x0C \n \r \t`) are used where applicable. Every other
/// byte, including multi-byte UTF-8 sequences, passes through unchanged.
pub fn escape_into(src: &[u8], out: &mut String) {
    out.reserve(src.len());
    let mut i = 0;
    while i < src.len() {
        let b = src[i];
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x08 => out.push_str("\\b"),
            0x0C => out.push_str("\\f"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b < 0x20 => {
                out.push_str(&format!("\\u{b:04x}"));
            }
            _ => {
                // Copy the full UTF-8 sequence starting at this byte verbatim.
                let start = i;
                let width = utf8_width(b);
                i += width;
                // Safety net: if the input isn't valid UTF-8 at this point, fall
                // back to copying one byte at a time rather than panicking.
                let end = (start + width).min(src.len());
                match core::str::from_utf8(&src[start..end]) {
                    Ok(s) => out.push_str(s),
                    Err(_) => {
                        for &byte in &src[start..end] {
                            out.push(byte as char);
                        }
                    }
                }
                continue;
            }
        }
        i += 1;
    }
}

fn utf8_width(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else if first_byte & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

/// Returns the JSON-escaped body of `src` (no surrounding quotes).
#[must_use]
pub fn escape(src: &[u8]) -> String {
    let mut out = String::with_capacity(src.len());
    escape_into(src, &mut out);
    out
}

/// Returns `src` escaped and wrapped in a JSON string literal, quotes
/// included.
#[must_use]
pub fn escape_quoted(src: &[u8]) -> String {
    let mut out = String::with_capacity(src.len() + 2);
    out.push('"');
    escape_into(src, &mut out);
    out.push('"');
    out
}

/// Decodes the body of a JSON string literal (no surrounding quotes) into
/// raw bytes.
///
/// # Errors
///
/// Returns `WalkError::Incomplete` if `src` ends in the middle of an escape
/// sequence, or `WalkError::Invalid` on an unrecognized escape or an
/// unpaired UTF-16 surrogate half in a `\uXXXX` sequence (this crate does not
/// attempt to combine surrogate pairs; see the design notes on this open
/// question).
pub fn unescape(src: &[u8]) -> WalkResult<Vec<u8>> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let b = src[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        i += 1;
        let Some(&esc) = src.get(i) else {
            return Err(WalkError::Incomplete);
        };
        match esc {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let available = &src[i + 1..];
                if available.len() < 4 {
                    return if available.iter().all(u8::is_ascii_hexdigit) {
                        Err(WalkError::Incomplete)
                    } else {
                        Err(WalkError::Invalid)
                    };
                }
                let digits = &available[..4];
                if !digits.iter().all(u8::is_ascii_hexdigit) {
                    return Err(WalkError::Invalid);
                }
                let hex = core::str::from_utf8(digits).map_err(|_| WalkError::Invalid)?;
                let code = u32::from_str_radix(hex, 16).map_err(|_| WalkError::Invalid)?;
                if (0xD800..=0xDFFF).contains(&code) {
                    // Lone or unpaired surrogate half: rejected rather than combined.
                    return Err(WalkError::Invalid);
                }
                let ch = char::from_u32(code).ok_or(WalkError::Invalid)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                i += 5;
                continue;
            }
            _ => return Err(WalkError::Invalid),
        }
        i += 2;
    }
    Ok(out)
}

/// Base64-encodes `src` using the standard alphabet with `=` padding.
#[must_use]
pub fn base64_encode(src: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(src)
}

/// Decodes a standard-alphabet, `=`-padded base64 string.
///
/// # Errors
///
/// Returns `WalkError::Invalid` if `src` is not valid base64.
pub fn base64_decode(src: &str) -> WalkResult<Vec<u8>> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(src)
        .map_err(|_| WalkError::Invalid)
}

/// Hex-encodes `src` as lowercase two-digit bytes.
#[must_use]
pub fn hex_encode(src: &[u8]) -> String {
    hex::encode(src)
}

/// Decodes a lowercase (or uppercase) two-digit hex string.
///
/// # Errors
///
/// Returns `WalkError::Invalid` if `src` has odd length or contains a
/// non-hex-digit byte.
pub fn hex_decode(src: &str) -> WalkResult<Vec<u8>> {
    hex::decode(src).map_err(|_| WalkError::Invalid)
}
