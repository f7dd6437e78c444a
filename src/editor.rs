//! The structural editor: rewrites a single value in a JSON buffer while
//! preserving every other byte — comments, odd whitespace, key order — in
//! the rest of the document.
//!
//! [`setf`] locates the target by path, the same dotted/indexed string
//! [`crate::walk`] produces. Three cases:
//!
//! - The path already names a value: [`Edit::Replace`] splices in newly
//!   rendered text (via [`crate::printf`]) over exactly that value's span;
//!   [`Edit::Delete`] removes the key (or element) and cleans up the
//!   surrounding comma.
//! - The path names a key that doesn't exist yet, but its parent object
//!   does: the missing key (and any missing intermediate objects the path
//!   implies) is inserted before the parent's closing brace.
//! - The path ends in an empty pair of brackets (`path[]`): the rendered
//!   value is appended as a new last element of the array at `path`.

use std::collections::HashMap;
use std::ops::Range;

use crate::arg::Arg;
use crate::escape::escape_quoted;
use crate::options::WalkerOptions;
use crate::path::PathBuf;
use crate::printer::printf;
use crate::sink::{write_str, GrowableBuffer, Sink};
use crate::token::{Token, TokenKind};
use crate::walker::{walk, VisitorEvent};

/// What to do to the value found at a [`setf`] path.
pub enum Edit<'a> {
    /// Replace (or insert) the value, rendered as `printf(fmt, args)`
    /// would render it.
    Replace(&'a str, &'a [Arg<'a>]),
    /// Remove the key/element entirely, along with the comma that
    /// separated it from its neighbors.
    Delete,
}

#[derive(Debug, Clone, Copy)]
enum PathSeg<'a> {
    Key(&'a str),
    Index(usize),
    Push,
}

fn parse_path(path: &str) -> Option<Vec<PathSeg<'_>>> {
    let bytes = path.as_bytes();
    let mut i = 0;
    let mut segs = Vec::new();
    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                i += 1;
                let start = i;
                while i < bytes.len() && bytes[i] != b'.' && bytes[i] != b'[' {
                    i += 1;
                }
                if i == start {
                    return None;
                }
                segs.push(PathSeg::Key(&path[start..i]));
            }
            b'[' => {
                i += 1;
                let start = i;
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return None;
                }
                let inside = &path[start..i];
                i += 1;
                if inside.is_empty() {
                    segs.push(PathSeg::Push);
                } else {
                    segs.push(PathSeg::Index(inside.parse().ok()?));
                }
            }
            _ => {
                let start = i;
                while i < bytes.len() && bytes[i] != b'.' && bytes[i] != b'[' {
                    i += 1;
                }
                segs.push(PathSeg::Key(&path[start..i]));
            }
        }
    }
    Some(segs)
}

fn render_path(segs: &[PathSeg<'_>]) -> String {
    let mut p = PathBuf::new();
    for seg in segs {
        match *seg {
            PathSeg::Key(k) => p.push_key(k),
            PathSeg::Index(i) => p.push_index(i),
            PathSeg::Push => {}
        }
    }
    p.as_str().to_owned()
}

struct NodeInfo {
    span: Range<usize>,
    is_array: bool,
    is_container: bool,
}

fn offset_of(source: &[u8], sub: &[u8]) -> usize {
    (sub.as_ptr() as usize).wrapping_sub(source.as_ptr() as usize)
}

fn value_span(source: &[u8], token: &Token<'_>) -> Range<usize> {
    let raw = token.raw();
    let offset = offset_of(source, raw);
    match token.kind() {
        TokenKind::String => offset - 1..offset + raw.len() + 1,
        _ => offset..offset + raw.len(),
    }
}

fn skip_ws_backward(src: &[u8], mut pos: usize) -> usize {
    while pos > 0 && matches!(src[pos - 1], b' ' | b'\n' | b'\r' | b'\t') {
        pos -= 1;
    }
    pos
}

fn skip_ws_forward(src: &[u8], mut pos: usize) -> usize {
    while pos < src.len() && matches!(src[pos], b' ' | b'\n' | b'\r' | b'\t') {
        pos += 1;
    }
    pos
}

/// Widens a value's span to also remove a neighboring comma: a leading one
/// if present, else a trailing one, else neither (the value was the sole
/// member).
fn widen_for_delete(source: &[u8], inner: Range<usize>) -> Range<usize> {
    let before = skip_ws_backward(source, inner.start);
    if before > 0 && source[before - 1] == b',' {
        return before - 1..inner.end;
    }
    let after = skip_ws_forward(source, inner.end);
    if after < source.len() && source[after] == b',' {
        return inner.start..after + 1;
    }
    inner
}

/// Walks backward from an object member's value span to find where the
/// member (key, colon, and value) begins.
fn object_member_start(source: &[u8], value_start: usize) -> usize {
    let mut p = skip_ws_backward(source, value_start);
    if p > 0 && source[p - 1] == b':' {
        p -= 1;
    }
    p = skip_ws_backward(source, p);
    if p > 0 && source[p - 1] == b'"' {
        p -= 1;
        while p > 0 && source[p - 1] != b'"' {
            p -= 1;
        }
        if p > 0 {
            p -= 1;
        }
    } else {
        while p > 0
            && (source[p - 1].is_ascii_alphanumeric() || source[p - 1] == b'_' || source[p - 1] == b'-')
        {
            p -= 1;
        }
    }
    p
}

fn quoted_key(k: &str) -> String {
    escape_quoted(k.as_bytes())
}

fn build_value_text(remaining: &[PathSeg<'_>], value_text: &str) -> String {
    match remaining.split_first() {
        None => value_text.to_owned(),
        Some((PathSeg::Key(k), rest)) => {
            format!("{{{}:{}}}", quoted_key(k), build_value_text(rest, value_text))
        }
        Some((PathSeg::Index(_) | PathSeg::Push, rest)) => {
            format!("[{}]", build_value_text(rest, value_text))
        }
    }
}

fn splice(source: &[u8], sink: &mut dyn Sink, remove: Range<usize>, insert: &str) -> usize {
    let mut written = sink.write(&source[..remove.start]);
    written += write_str(sink, insert);
    written += sink.write(&source[remove.end..]);
    written
}

fn render_value(fmt: &str, args: &[Arg<'_>]) -> String {
    let mut buf = GrowableBuffer::new();
    printf(&mut buf, fmt, args);
    buf.into_string().unwrap_or_default()
}

/// Rewrites the value at `path` in `source`, writing the result to `sink`.
///
/// Returns `1` if `path` named an existing value that was replaced or
/// deleted, `0` otherwise (the path was missing and a key/element was
/// inserted instead, a delete target didn't exist, or `path`/the edit
/// couldn't be applied at all) — the full rewritten document is written to
/// `sink` either way; `source` is copied through unchanged whenever no edit
/// could be applied. Use `sink.written()` for the byte count.
pub fn setf(source: &[u8], sink: &mut dyn Sink, path: &str, edit: Edit<'_>) -> usize {
    let Some(segs) = parse_path(path) else {
        sink.write(source);
        return 0;
    };

    let mut nodes: HashMap<String, NodeInfo> = HashMap::new();
    {
        let mut visitor = |e: VisitorEvent<'_>| {
            if matches!(e.token.kind(), TokenKind::ObjectStart | TokenKind::ArrayStart) {
                return;
            }
            nodes.insert(
                e.path.to_owned(),
                NodeInfo {
                    span: value_span(source, &e.token),
                    is_array: e.token.kind() == TokenKind::ArrayEnd,
                    is_container: matches!(e.token.kind(), TokenKind::ObjectEnd | TokenKind::ArrayEnd),
                },
            );
        };
        if walk(source, WalkerOptions::default(), Some(&mut visitor)).is_err() {
            sink.write(source);
            return 0;
        }
    }

    let is_push = matches!(segs.last(), Some(PathSeg::Push));
    let lookup_len = if is_push { segs.len() - 1 } else { segs.len() };
    let full_path = render_path(&segs[..lookup_len]);

    if is_push {
        let Edit::Replace(fmt, args) = edit else {
            sink.write(source);
            return 0;
        };
        let Some(array) = nodes.get(&full_path).filter(|n| n.is_array) else {
            sink.write(source);
            return 0;
        };
        let value_text = render_value(fmt, args);
        let inner = &source[array.span.start + 1..array.span.end - 1];
        let needs_comma = !inner.iter().all(u8::is_ascii_whitespace);
        let insert_at = array.span.end - 1;
        let insert_text = if needs_comma {
            format!(",{value_text}")
        } else {
            value_text
        };
        splice(source, sink, insert_at..insert_at, &insert_text);
        return 0;
    }

    if let Some(node) = nodes.get(&full_path) {
        match edit {
            Edit::Replace(fmt, args) => {
                splice(source, sink, node.span.clone(), &render_value(fmt, args));
            }
            Edit::Delete => {
                let remove = if let Some(PathSeg::Key(_)) = segs.last() {
                    widen_for_delete(
                        source,
                        object_member_start(source, node.span.start)..node.span.end,
                    )
                } else {
                    widen_for_delete(source, node.span.clone())
                };
                splice(source, sink, remove, "");
            }
        }
        return 1;
    }

    // Not found as-is: find the longest existing container prefix and
    // insert the remaining path under it.
    for n in (0..segs.len()).rev() {
        let prefix_path = render_path(&segs[..n]);
        let Some(parent) = nodes.get(&prefix_path) else {
            continue;
        };
        if !parent.is_container {
            continue;
        }
        let remaining = &segs[n..];
        let matches_parent_kind = match remaining.first() {
            Some(PathSeg::Key(_)) => !parent.is_array,
            Some(PathSeg::Index(_) | PathSeg::Push) => parent.is_array,
            None => false,
        };
        if !matches_parent_kind {
            continue;
        }
        let Edit::Replace(fmt, args) = edit else {
            // Deleting something that doesn't exist is a no-op.
            sink.write(source);
            return 0;
        };
        let value_text = render_value(fmt, args);
        let member_text = match remaining.first() {
            Some(PathSeg::Key(k)) => format!("{}:{}", quoted_key(k), build_value_text(&remaining[1..], &value_text)),
            Some(PathSeg::Index(_) | PathSeg::Push) => build_value_text(&remaining[1..], &value_text),
            None => unreachable!(),
        };
        let inner = &source[parent.span.start + 1..parent.span.end - 1];
        let needs_comma = !inner.iter().all(u8::is_ascii_whitespace);
        let insert_at = parent.span.end - 1;
        let insert_text = if needs_comma {
            format!(",{member_text}")
        } else {
            member_text
        };
        splice(source, sink, insert_at..insert_at, &insert_text);
        return 0;
    }

    sink.write(source);
    0
}
