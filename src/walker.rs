//! The recursive-descent scanner that drives every other component.
//!
//! [`walk`] is the one place that actually understands JSON grammar. Every
//! other entry point — the printer's pretty-printer, the extractor, the
//! editor — either calls `walk` directly or leans on the same two-error
//! model (`WalkError::Invalid` vs `WalkError::Incomplete`) it establishes
//! here: a buffer is invalid if no amount of appended bytes could ever make
//! it valid, and incomplete if it is a valid prefix of some longer valid
//! document.

use crate::error::{WalkError, WalkResult};
use crate::options::WalkerOptions;
use crate::path::PathBuf;
use crate::token::{Token, TokenKind};

/// One step of a path: how the value currently being parsed is named by its
/// parent.
#[derive(Debug, Clone, Copy)]
enum Seg<'src> {
    /// The document root: no name, empty path.
    Root,
    /// An object member, named by its (raw, not-yet-unescaped) key text.
    Key(&'src str),
    /// An array element, named by its zero-based index.
    Index(usize),
}

/// A single step of the walk, handed to the visitor callback.
///
/// `name` and `path` are only valid for the duration of the callback
/// invocation — copy out anything you need to keep.
#[derive(Debug, Clone, Copy)]
pub struct VisitorEvent<'a> {
    /// The key (for an object member) or decimal index (for an array
    /// element) this value is named by, or `None` for the document root and
    /// for container-end events.
    pub name: Option<&'a str>,
    /// The dotted/indexed path to this value, e.g. `.c[2].a`.
    pub path: &'a str,
    /// The token itself.
    pub token: Token<'a>,
}

/// Walks `source`, validating it as JSON (subject to `options`) and, if
/// `visitor` is supplied, reporting one event per token.
///
/// Returns the number of bytes of `source` that made up the single root
/// value (trailing bytes after a complete root value are never examined).
///
/// # Errors
///
/// Returns `WalkError::Invalid` if `source` can never become valid JSON no
/// matter what bytes follow it, or `WalkError::Incomplete` if `source` is a
/// valid prefix of some longer document — including the empty slice, which
/// is always `Incomplete` (there is no way to distinguish "wait for more
/// bytes" from "this was deliberately empty" once `source` is a Rust slice
/// rather than a possibly-null pointer; see `DESIGN.md`).
pub fn walk(
    source: &[u8],
    options: WalkerOptions,
    visitor: Option<&mut dyn FnMut(VisitorEvent<'_>)>,
) -> WalkResult<usize> {
    let mut w = Walker {
        src: source,
        pos: 0,
        options,
        path: PathBuf::new(),
        index_scratch: String::new(),
        visitor,
    };
    w.skip_ws();
    if w.peek().is_none() {
        return Err(WalkError::Incomplete);
    }
    w.parse_value(Seg::Root)?;
    Ok(w.pos)
}

/// Validates `source` without reporting any events; equivalent to calling
/// [`walk`] with `visitor: None`.
///
/// # Errors
///
/// See [`walk`].
pub fn validate(source: &[u8], options: WalkerOptions) -> WalkResult<usize> {
    walk(source, options, None)
}

struct Walker<'src, 'v> {
    src: &'src [u8],
    pos: usize,
    options: WalkerOptions,
    path: PathBuf,
    /// Scratch buffer reused across array-index events so that reporting an
    /// element's name doesn't allocate a fresh `String` per element.
    index_scratch: String,
    visitor: Option<&'v mut dyn FnMut(VisitorEvent<'_>)>,
}

impl<'src> Walker<'src, '_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        core::str::from_utf8(&self.src[self.pos..])
            .ok()
            .and_then(|s| s.chars().next())
    }

    fn skip_ws(&mut self) {
        if self.options.allow_unicode_whitespace {
            while let Some(c) = self.peek_char() {
                if c.is_whitespace() {
                    self.pos += c.len_utf8();
                } else {
                    break;
                }
            }
        } else {
            while matches!(self.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
                self.pos += 1;
            }
        }
    }

    fn emit(&mut self, seg: Seg<'src>, kind: TokenKind, raw: &'src [u8]) {
        if self.visitor.is_none() {
            return;
        }
        let name: Option<&str> = match seg {
            Seg::Root => None,
            Seg::Key(k) => Some(k),
            Seg::Index(i) => {
                use std::fmt::Write as _;
                self.index_scratch.clear();
                let _ = write!(self.index_scratch, "{i}");
                Some(self.index_scratch.as_str())
            }
        };
        let path = self.path.as_str();
        let event = VisitorEvent {
            name,
            path,
            token: Token::new(kind, raw),
        };
        if let Some(cb) = self.visitor.as_deref_mut() {
            cb(event);
        }
    }

    fn parse_value(&mut self, seg: Seg<'src>) -> WalkResult<()> {
        let mark = self.path.len();
        match seg {
            Seg::Root => {}
            Seg::Key(k) => self.path.push_key(k),
            Seg::Index(i) => self.path.push_index(i),
        }
        let result = match self.peek() {
            Some(b'{') => self.parse_object(seg),
            Some(b'[') => self.parse_array(seg),
            Some(b'"') => self.parse_string(seg),
            Some(b't') => self.parse_literal(b"true", TokenKind::True, seg),
            Some(b'f') => self.parse_literal(b"false", TokenKind::False, seg),
            Some(b'n') => self.parse_literal(b"null", TokenKind::Null, seg),
            Some(b'-' | b'0'..=b'9') => self.parse_number(seg),
            Some(_) => Err(WalkError::Invalid),
            None => Err(WalkError::Incomplete),
        };
        self.path.truncate(mark);
        result
    }

    fn parse_object(&mut self, seg: Seg<'src>) -> WalkResult<()> {
        self.emit(seg, TokenKind::ObjectStart, &[]);
        let start = self.pos;
        self.pos += 1; // '{'
        self.skip_ws();
        match self.peek() {
            Some(b'}') => {
                self.pos += 1;
            }
            None => return Err(WalkError::Incomplete),
            Some(_) => loop {
                self.skip_ws();
                let key = self.parse_key()?;
                self.skip_ws();
                self.expect_byte(b':')?;
                self.skip_ws();
                self.parse_value(Seg::Key(key))?;
                self.skip_ws();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                    }
                    Some(b'}') => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => return Err(WalkError::Invalid),
                    None => return Err(WalkError::Incomplete),
                }
            },
        }
        let end = self.pos;
        self.emit(Seg::Root, TokenKind::ObjectEnd, &self.src[start..end]);
        Ok(())
    }

    fn parse_array(&mut self, seg: Seg<'src>) -> WalkResult<()> {
        self.emit(seg, TokenKind::ArrayStart, &[]);
        let start = self.pos;
        self.pos += 1; // '['
        self.skip_ws();
        match self.peek() {
            Some(b']') => {
                self.pos += 1;
            }
            None => return Err(WalkError::Incomplete),
            Some(_) => {
                let mut index = 0usize;
                loop {
                    self.skip_ws();
                    self.parse_value(Seg::Index(index))?;
                    index += 1;
                    self.skip_ws();
                    match self.peek() {
                        Some(b',') => {
                            self.pos += 1;
                        }
                        Some(b']') => {
                            self.pos += 1;
                            break;
                        }
                        Some(_) => return Err(WalkError::Invalid),
                        None => return Err(WalkError::Incomplete),
                    }
                }
            }
        }
        let end = self.pos;
        self.emit(Seg::Root, TokenKind::ArrayEnd, &self.src[start..end]);
        Ok(())
    }

    fn expect_byte(&mut self, expected: u8) -> WalkResult<()> {
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(WalkError::Invalid),
            None => Err(WalkError::Incomplete),
        }
    }

    /// Parses an object key: a quoted string or, if
    /// `options.allow_bareword_keys`, a bareword identifier. Returns the raw
    /// key text (escapes intact for quoted keys, verbatim for barewords).
    fn parse_key(&mut self) -> WalkResult<&'src str> {
        match self.peek() {
            Some(b'"') => {
                self.pos += 1;
                let range = self.scan_string_body()?;
                str_slice(self.src, range)
            }
            Some(b) if self.options.allow_bareword_keys && is_bareword_start(b) => {
                let start = self.pos;
                self.pos += 1;
                while matches!(self.peek(), Some(b) if is_bareword_continue(b)) {
                    self.pos += 1;
                }
                str_slice(self.src, start..self.pos)
            }
            Some(_) => Err(WalkError::Invalid),
            None => Err(WalkError::Incomplete),
        }
    }

    fn parse_string(&mut self, seg: Seg<'src>) -> WalkResult<()> {
        self.pos += 1; // opening quote
        let range = self.scan_string_body()?;
        self.emit(seg, TokenKind::String, &self.src[range]);
        Ok(())
    }

    /// Scans from just past an opening quote to just past the matching
    /// closing quote, validating escape structure. Returns the byte range of
    /// the body (escapes left intact).
    fn scan_string_body(&mut self) -> WalkResult<core::ops::Range<usize>> {
        let start = self.pos;
        loop {
            match self.src.get(self.pos) {
                None => return Err(WalkError::Incomplete),
                Some(b'"') => {
                    let end = self.pos;
                    self.pos += 1;
                    return Ok(start..end);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.src.get(self.pos) {
                        None => return Err(WalkError::Incomplete),
                        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                            self.pos += 1;
                        }
                        Some(b'u') => {
                            self.pos += 1;
                            for _ in 0..4 {
                                match self.src.get(self.pos) {
                                    None => return Err(WalkError::Incomplete),
                                    Some(h) if h.is_ascii_hexdigit() => self.pos += 1,
                                    Some(_) => return Err(WalkError::Invalid),
                                }
                            }
                        }
                        Some(_) => return Err(WalkError::Invalid),
                    }
                }
                Some(b) if *b < 0x20 => return Err(WalkError::Invalid),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_literal(
        &mut self,
        word: &'static [u8],
        kind: TokenKind,
        seg: Seg<'src>,
    ) -> WalkResult<()> {
        let start = self.pos;
        for &expected in word {
            match self.src.get(self.pos) {
                Some(&b) if b == expected => self.pos += 1,
                Some(_) => return Err(WalkError::Invalid),
                None => return Err(WalkError::Incomplete),
            }
        }
        self.emit(seg, kind, &self.src[start..self.pos]);
        Ok(())
    }

    fn parse_number(&mut self, seg: Seg<'src>) -> WalkResult<()> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(WalkError::Invalid);
                }
            }
            Some(b'1'..=b'9') => {
                self.pos += 1;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
            Some(_) => return Err(WalkError::Invalid),
            None => return Err(WalkError::Incomplete),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            match self.peek() {
                Some(b'0'..=b'9') => {
                    self.pos += 1;
                    while matches!(self.peek(), Some(b'0'..=b'9')) {
                        self.pos += 1;
                    }
                }
                Some(_) => return Err(WalkError::Invalid),
                None => return Err(WalkError::Incomplete),
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            match self.peek() {
                Some(b'0'..=b'9') => {
                    self.pos += 1;
                    while matches!(self.peek(), Some(b'0'..=b'9')) {
                        self.pos += 1;
                    }
                }
                Some(_) => return Err(WalkError::Invalid),
                None => return Err(WalkError::Incomplete),
            }
        }
        self.emit(seg, TokenKind::Number, &self.src[start..self.pos]);
        Ok(())
    }
}

fn is_bareword_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_bareword_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn str_slice(src: &[u8], range: core::ops::Range<usize>) -> WalkResult<&str> {
    core::str::from_utf8(&src[range]).map_err(|_| WalkError::Invalid)
}
