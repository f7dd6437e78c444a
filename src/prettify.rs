//! The pretty-printer: re-emits a JSON document with two-space indentation
//! and one member/element per line.
//!
//! Built the same way the extractor and editor are: a single
//! [`crate::walk`] pass, driven off the same [`VisitorEvent`] stream, with
//! no separate tree representation in between.

use crate::error::WalkResult;
use crate::options::WalkerOptions;
use crate::sink::{write_str, Sink};
use crate::token::TokenKind;
use crate::walker::{walk, VisitorEvent};

const INDENT: &str = "  ";

/// Pretty-prints `source` into `sink` with two-space indentation, returning
/// the number of bytes written.
///
/// # Errors
///
/// Propagates [`crate::WalkError`] if `source` is not valid JSON.
pub fn prettify(source: &[u8], sink: &mut dyn Sink) -> WalkResult<usize> {
    let mut depth = 0usize;
    let mut child_seen: Vec<bool> = Vec::new();
    // Tracks, for each currently-open container, whether it's an array: an
    // array element's `name` is its decimal index, not a key, and must never
    // be printed as one.
    let mut in_array: Vec<bool> = Vec::new();

    {
        let mut visitor = |e: VisitorEvent<'_>| {
            let is_start = matches!(e.token.kind(), TokenKind::ObjectStart | TokenKind::ArrayStart);
            let is_end = matches!(e.token.kind(), TokenKind::ObjectEnd | TokenKind::ArrayEnd);

            if is_end {
                depth -= 1;
                let had_children = child_seen.pop().unwrap_or(false);
                in_array.pop();
                if had_children {
                    write_str(sink, "\n");
                    for _ in 0..depth {
                        write_str(sink, INDENT);
                    }
                }
                write_str(sink, if e.token.kind() == TokenKind::ObjectEnd { "}" } else { "]" });
                return;
            }

            if depth > 0 {
                if let Some(seen) = child_seen.last_mut() {
                    if *seen {
                        write_str(sink, ",");
                    }
                    *seen = true;
                }
                write_str(sink, "\n");
                for _ in 0..depth {
                    write_str(sink, INDENT);
                }
                let parent_is_object = in_array.last() == Some(&false);
                if parent_is_object {
                    if let Some(name) = e.name {
                        write_str(sink, "\"");
                        write_str(sink, name);
                        write_str(sink, "\"");
                        write_str(sink, ": ");
                    }
                }
            }

            if is_start {
                write_str(sink, if e.token.kind() == TokenKind::ObjectStart { "{" } else { "[" });
                depth += 1;
                child_seen.push(false);
                in_array.push(e.token.kind() == TokenKind::ArrayStart);
                return;
            }

            match e.token.kind() {
                TokenKind::String => {
                    write_str(sink, "\"");
                    write_str(sink, e.token.text());
                    write_str(sink, "\"");
                }
                _ => write_str(sink, e.token.text()),
            };
        };
        walk(source, WalkerOptions::default(), Some(&mut visitor))?;
    }
    Ok(sink.written())
}
