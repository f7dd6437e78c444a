//! The scanf-like path extractor: pulls values out of a JSON buffer at the
//! locations named by a template format string.
//!
//! Unlike the printf-style emitter, the template here describes a *shape* to
//! match against the source document — literal object/array structure with
//! `%`-conversions standing in for the leaves — rather than literal text to
//! copy. [`scanf`] walks the template once to turn it into a list of
//! `(path, conversion)` pairs, then does a single [`crate::walk`] over the
//! source, filling in whichever of those paths it actually finds. This
//! means keys may appear in any order in the source: extraction is by path,
//! not by position, unlike a literal C `sscanf`.

use std::collections::HashMap;

use crate::escape::{base64_decode, hex_decode, unescape};
use crate::options::WalkerOptions;
use crate::out::Out;
use crate::path::PathBuf;
use crate::token::{Token, TokenKind};
use crate::walker::{walk, VisitorEvent};

struct TemplateParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    path: PathBuf,
    specs: Vec<(String, u8)>,
}

impl<'a> TemplateParser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Option<()> {
        self.skip_ws();
        match self.peek()? {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'%' => self.parse_conv(),
            _ => None,
        }
    }

    fn parse_object(&mut self) -> Option<()> {
        self.pos += 1;
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Some(());
        }
        loop {
            self.skip_ws();
            let key = self.parse_key()?;
            let mark = self.path.len();
            self.path.push_key(&key);
            self.skip_ws();
            if self.peek() != Some(b':') {
                return None;
            }
            self.pos += 1;
            self.parse_value()?;
            self.path.truncate(mark);
            self.skip_ws();
            match self.peek()? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    break;
                }
                _ => return None,
            }
        }
        Some(())
    }

    fn parse_array(&mut self) -> Option<()> {
        self.pos += 1;
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Some(());
        }
        // `[%M]` is a special shape: a callback bound to the whole array at
        // its own path, the template equivalent of the original toolkit's
        // "the array itself is the %M argument" convention, rather than a
        // single-element array matched at index 0.
        if self.peek() == Some(b'%') && self.bytes.get(self.pos + 1) == Some(&b'M') {
            let save = self.pos;
            self.pos += 2;
            self.skip_ws();
            if self.peek() == Some(b']') {
                self.pos += 1;
                self.specs.push((self.path.as_str().to_owned(), b'M'));
                return Some(());
            }
            self.pos = save;
        }
        let mut index = 0usize;
        loop {
            self.skip_ws();
            let mark = self.path.len();
            self.path.push_index(index);
            self.parse_value()?;
            self.path.truncate(mark);
            index += 1;
            self.skip_ws();
            match self.peek()? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    break;
                }
                _ => return None,
            }
        }
        Some(())
    }

    fn parse_key(&mut self) -> Option<String> {
        match self.peek()? {
            b'"' => {
                self.pos += 1;
                let start = self.pos;
                while self.peek()? != b'"' {
                    self.pos += 1;
                }
                let s = core::str::from_utf8(&self.bytes[start..self.pos]).ok()?.to_owned();
                self.pos += 1;
                Some(s)
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = self.pos;
                self.pos += 1;
                while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
                {
                    self.pos += 1;
                }
                Some(core::str::from_utf8(&self.bytes[start..self.pos]).ok()?.to_owned())
            }
            _ => None,
        }
    }

    fn parse_conv(&mut self) -> Option<()> {
        self.pos += 1; // '%'
        let conv = self.peek()?;
        self.pos += 1;
        self.specs.push((self.path.as_str().to_owned(), conv));
        Some(())
    }
}

fn parse_template(fmt: &str) -> Option<Vec<(String, u8)>> {
    let mut p = TemplateParser {
        bytes: fmt.as_bytes(),
        pos: 0,
        path: PathBuf::new(),
        specs: Vec::new(),
    };
    p.parse_value()?;
    Some(p.specs)
}

fn store_conversion(conv: u8, token: &Token<'_>, out: &mut Out<'_>) -> bool {
    match (conv, out) {
        (b'd' | b'i', Out::Int(slot)) => {
            token.kind() == TokenKind::Number
                && token.text().parse::<i64>().map(|v| **slot = v).is_ok()
        }
        (b'u', Out::UInt(slot)) => {
            token.kind() == TokenKind::Number
                && token.text().parse::<u64>().map(|v| **slot = v).is_ok()
        }
        (b'f' | b'e' | b'g', Out::Float(slot)) => {
            token.kind() == TokenKind::Number
                && token.text().parse::<f64>().map(|v| **slot = v).is_ok()
        }
        (b'B', Out::Bool(slot)) => match token.kind() {
            TokenKind::True => {
                **slot = true;
                true
            }
            TokenKind::False => {
                **slot = false;
                true
            }
            _ => false,
        },
        (b's', Out::Str(slot)) => {
            **slot = token.text().to_owned();
            true
        }
        (b'Q', Out::Quoted(slot)) => match token.kind() {
            TokenKind::Null => {
                // A `null` match sets the slot but, per spec, does not count
                // as a successfully converted field.
                **slot = None;
                false
            }
            TokenKind::String => unescape(token.raw())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .map(|s| **slot = Some(s))
                .is_some(),
            _ => false,
        },
        (b'V', Out::Base64Blob(slot)) => {
            token.kind() == TokenKind::String
                && base64_decode(token.text()).map(|v| **slot = v).is_ok()
        }
        (b'H', Out::HexBlob(slot)) => {
            token.kind() == TokenKind::String && hex_decode(token.text()).map(|v| **slot = v).is_ok()
        }
        (b'T', Out::Raw(slot)) => {
            **slot = Some((token.kind(), token.raw().to_vec()));
            true
        }
        (b'M', Out::Callback(cb)) => {
            cb(token.raw());
            true
        }
        _ => false,
    }
}

/// Extracts values from `source` at the paths named by `fmt`, filling
/// `args` in the order their `%`-conversions appear in the template.
///
/// Returns the number of conversions actually matched and stored, which may
/// be less than `args.len()` if `source` lacks some of the named paths, or
/// a value at a path has a type that doesn't match its conversion (e.g. a
/// string where `%d` expected a number). A `%Q` conversion matched against a
/// JSON `null` sets its target to `None` but is not counted, since no string
/// was actually captured.
///
/// A malformed `fmt` (not valid template shape) matches nothing and returns
/// `0`.
pub fn scanf(source: &[u8], fmt: &str, args: &mut [Out<'_>]) -> usize {
    let Some(specs) = parse_template(fmt) else {
        return 0;
    };
    let mut want: HashMap<&str, (u8, usize)> = HashMap::new();
    for (idx, (path, conv)) in specs.iter().enumerate() {
        if idx >= args.len() {
            break;
        }
        want.insert(path.as_str(), (*conv, idx));
    }

    let mut matched = 0usize;
    {
        let mut visitor = |e: VisitorEvent<'_>| {
            // Container-enter events share their path with the matching
            // container-exit event but carry no content (an empty span);
            // only the exit event (or a plain scalar event) is a candidate
            // match, so a `%M`/`%T` bound to a container's own path isn't
            // matched twice — once against an empty start span, once
            // against the real one.
            if matches!(e.token.kind(), TokenKind::ObjectStart | TokenKind::ArrayStart) {
                return;
            }
            if let Some(&(conv, idx)) = want.get(e.path) {
                if store_conversion(conv, &e.token, &mut args[idx]) {
                    matched += 1;
                }
            }
        };
        let _ = walk(source, WalkerOptions::default(), Some(&mut visitor));
    }
    matched
}

/// Extracts the `index`-th element of the array at `array_path`, matching
/// it against `fmt` the way [`scanf`] matches a whole document (paths in
/// `fmt` are relative to the element itself).
///
/// Returns `-1` if `array_path[index]` does not exist in `source`,
/// otherwise the number of conversions matched (as in [`scanf`]), cast to
/// `i64`.
pub fn scanf_array_elem(
    source: &[u8],
    array_path: &str,
    index: i64,
    fmt: &str,
    args: &mut [Out<'_>],
) -> i64 {
    if index < 0 {
        return -1;
    }
    let target = format!("{array_path}[{index}]");
    let mut found: Option<(TokenKind, Vec<u8>)> = None;
    {
        let mut visitor = |e: VisitorEvent<'_>| {
            if found.is_none()
                && e.path == target
                && !matches!(e.token.kind(), TokenKind::ObjectStart | TokenKind::ArrayStart)
            {
                found = Some((e.token.kind(), e.token.raw().to_vec()));
            }
        };
        let _ = walk(source, WalkerOptions::default(), Some(&mut visitor));
    }
    let Some((kind, raw)) = found else {
        return -1;
    };
    let doc: Vec<u8> = if kind == TokenKind::String {
        let mut d = Vec::with_capacity(raw.len() + 2);
        d.push(b'"');
        d.extend_from_slice(&raw);
        d.push(b'"');
        d
    } else {
        raw
    };
    scanf(&doc, fmt, args) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_scalars_by_path_regardless_of_key_order() {
        let mut a = 0i64;
        let mut b: Option<String> = None;
        let mut args = [Out::Int(&mut a), Out::Quoted(&mut b)];
        let matched = scanf(br#"{"b":"hi","a":7}"#, "{a:%d,b:%Q}", &mut args);
        assert_eq!(matched, 2);
        assert_eq!(a, 7);
        assert_eq!(b.as_deref(), Some("hi"));
    }

    #[test]
    fn quoted_conversion_against_null_sets_none_but_does_not_count_as_matched() {
        let mut a: Option<String> = Some("stale".to_owned());
        let mut args = [Out::Quoted(&mut a)];
        assert_eq!(scanf(b"{a : null }", "{a: %Q}", &mut args), 0);
        assert_eq!(a, None);
    }

    #[test]
    fn missing_path_is_simply_not_matched() {
        let mut a = 0i64;
        let mut args = [Out::Int(&mut a)];
        assert_eq!(scanf(br#"{"other":1}"#, "{a:%d}", &mut args), 0);
        assert_eq!(a, 0);
    }

    #[test]
    fn nested_path_extraction() {
        // Only the first argument slot is provided: the template's other two
        // `%d` conversions are simply never bound.
        let mut a = 0i64;
        let mut args = [Out::Int(&mut a)];
        assert_eq!(
            scanf(br#"{"c":[1,2,{"a":3}]}"#, "{c:[%d,%d,{a:%d}]}", &mut args),
            1
        );
        assert_eq!(a, 1);

        let mut x = 0i64;
        let mut y = 0i64;
        let mut z = 0i64;
        let mut args = [Out::Int(&mut x), Out::Int(&mut y), Out::Int(&mut z)];
        assert_eq!(
            scanf(br#"{"c":[1,2,{"a":3}]}"#, "{c:[%d,%d,{a:%d}]}", &mut args),
            3
        );
        assert_eq!((x, y, z), (1, 2, 3));
    }

    #[test]
    fn array_elem_helper_extracts_one_element_by_index() {
        let mut v = 0i64;
        let mut args = [Out::Int(&mut v)];
        let matched = scanf_array_elem(br#"{"c":[10,20,30]}"#, ".c", 1, "%d", &mut args);
        assert_eq!(matched, 1);
        assert_eq!(v, 20);
    }

    #[test]
    fn array_elem_helper_returns_negative_one_out_of_range() {
        let mut v = 0i64;
        let mut args = [Out::Int(&mut v)];
        assert_eq!(
            scanf_array_elem(br#"{"c":[10]}"#, ".c", 5, "%d", &mut args),
            -1
        );
    }

    #[test]
    fn callback_conversion_receives_the_matched_raw_span_and_can_rescan_it() {
        let str = br#"{ a: 1234, b : true, "c": {x: [17, 78, -20]}, d: "hi%20there" }"#;
        let mut a = 0i64;
        let mut b = false;
        let mut d: Option<String> = None;
        let mut trace = String::new();
        let mut on_c = |raw: &[u8]| {
            for i in 0.. {
                let mut elem = 0i64;
                let mut elem_args = [Out::Int(&mut elem)];
                if scanf_array_elem(raw, ".x", i, "%d", &mut elem_args) <= 0 {
                    break;
                }
                trace.push_str(&format!("{i}[{elem}] "));
            }
        };
        let mut args = [
            Out::Int(&mut a),
            Out::Bool(&mut b),
            Out::Callback(&mut on_c),
            Out::Quoted(&mut d),
        ];
        let matched = scanf(str, "{a: %d, b: %B, c: [%M], d: %Q}", &mut args);
        assert_eq!(matched, 4);
        assert_eq!(a, 1234);
        assert!(b);
        assert_eq!(trace, "0[17] 1[78] 2[-20] ");
        assert_eq!(d.as_deref(), Some("hi%20there"));
    }
}
