//! The printf-like formatted emitter: renders a format string plus a slice
//! of [`Arg`] values into a [`Sink`].
//!
//! Two things distinguish this from a bare C `printf` clone:
//!
//! - **Implicit key quoting.** A bareword identifier in the literal part of
//!   the format string, immediately followed by `:`, is auto-quoted as a
//!   JSON object key. This lets callers write `printf(sink, "{a:%d}",
//!   &jfmt![1])` instead of `"{\"a\":%d}"`.
//! - **JSON conversions.** Beyond the standard `%d %i %u %o %x %X %f %e %g
//!   %a %s %c %p %n %%`, five extensions cover the JSON-specific argument
//!   kinds: `%Q` (quoted/escaped string, or `null`), `%B` (bool), `%V`
//!   (base64 blob), `%H` (hex blob), and `%M` (a nested callback that
//!   writes its own sub-document, consuming further arguments itself via
//!   the [`ArgCursor`] it's handed).
//!
//! `%n` is parsed for compatibility but writes nothing: this toolkit's
//! [`Arg`] is read-only, so there is no address for it to store a count
//! into. `%T` (raw token capture) is extractor/editor-only; like any other
//! unrecognized or malformed conversion, the printer treats it as a raw
//! passthrough of the `%` and the character after it, and keeps going.

use crate::arg::{Arg, ArgCursor};
use crate::escape::{base64_encode, escape_quoted, hex_encode};
use crate::sink::{write_str, Sink};

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    minus: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alt: bool,
}

/// Renders `fmt` against `args`, writing the result to `sink`.
///
/// Returns the total number of bytes written (following the sink's own
/// `written()` convention: always the full logical length, even if a
/// bounded sink truncated some of it).
#[allow(clippy::too_many_lines)]
pub fn printf(sink: &mut dyn Sink, fmt: &str, args: &[Arg<'_>]) -> usize {
    let bytes = fmt.as_bytes();
    let mut i = 0;
    let mut cursor = ArgCursor::new(args);
    let mut written = 0usize;
    // Tracks whether `i` is inside a literal `"..."` run of the format
    // string itself, so that a bareword run quoted by the caller (e.g.
    // `"{\"t:\": %d}"`) isn't re-quoted by the implicit-key-quoting scan
    // below.
    let mut in_quotes = false;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            i += 1;
            if i >= bytes.len() {
                break;
            }
            if bytes[i] == b'%' {
                written += sink.write(b"%");
                i += 1;
                continue;
            }
            if let Some((consumed, out)) = render_conversion(&bytes[i..], &mut cursor, sink) {
                i += consumed;
                written += out;
            } else {
                // Unrecognized or malformed conversion: pass the `%` and the
                // following character through as literal text.
                written += sink.write(b"%");
                if i < bytes.len() {
                    written += sink.write(&bytes[i..=i]);
                    i += 1;
                }
            }
            continue;
        }

        if b == b'"' {
            in_quotes = !in_quotes;
            written += sink.write(b"\"");
            i += 1;
            continue;
        }

        // Implicit key quoting: a bareword run immediately followed by `:`.
        // Suppressed inside a literal double-quoted run, which already
        // passes through unchanged.
        if !in_quotes && is_bareword_start(b) {
            let start = i;
            i += 1;
            while i < bytes.len() && is_bareword_continue(bytes[i]) {
                i += 1;
            }
            let word = core::str::from_utf8(&bytes[start..i]).unwrap_or_default();
            if bytes.get(i) == Some(&b':') {
                written += write_str(sink, &escape_quoted(word.as_bytes()));
            } else {
                written += write_str(sink, word);
            }
            continue;
        }

        // Copy a run of plain bytes up to the next `%`, `"`, or (outside a
        // quoted run) bareword start.
        let start = i;
        while i < bytes.len()
            && bytes[i] != b'%'
            && bytes[i] != b'"'
            && (in_quotes || !is_bareword_start(bytes[i]))
        {
            i += 1;
        }
        written += sink.write(&bytes[start..i]);
    }

    written
}

/// Caps `s` to at most `max_bytes` bytes, backing off to the nearest
/// preceding UTF-8 character boundary rather than splitting a multi-byte
/// sequence.
fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut cut = max_bytes;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    &s[..cut]
}

fn is_bareword_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_bareword_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Parses and renders one `%`-conversion (the `%` itself already consumed).
/// Returns `(bytes of the conversion spec consumed, bytes written)`, or
/// `None` if the spec is malformed or unrecognized.
fn render_conversion(
    rest: &[u8],
    cursor: &mut ArgCursor<'_>,
    sink: &mut dyn Sink,
) -> Option<(usize, usize)> {
    let mut i = 0;
    let mut flags = Flags::default();
    loop {
        match rest.get(i) {
            Some(b'-') => flags.minus = true,
            Some(b'0') => flags.zero = true,
            Some(b'+') => flags.plus = true,
            Some(b' ') => flags.space = true,
            Some(b'#') => flags.alt = true,
            _ => break,
        }
        i += 1;
    }

    let width = parse_count(rest, &mut i, cursor)?;
    let precision = if rest.get(i) == Some(&b'.') {
        i += 1;
        Some(parse_count(rest, &mut i, cursor)?)
    } else {
        None
    };

    // Length modifiers are accepted and ignored: the argument's actual type
    // is already fixed by its `Arg` variant.
    while matches!(rest.get(i), Some(b'h' | b'l' | b'L' | b'z' | b'j' | b't')) {
        i += 1;
    }

    let conv = *rest.get(i)?;
    i += 1;

    let written = match conv {
        b'd' | b'i' => {
            let v = as_int(cursor.next()?)?;
            write_str(sink, &format_signed(v, flags, width))
        }
        b'u' => {
            let v = as_uint(cursor.next()?)?;
            write_str(sink, &format_unsigned(v, 10, false, flags, width))
        }
        b'o' => {
            let v = as_uint(cursor.next()?)?;
            write_str(sink, &format_unsigned(v, 8, false, flags, width))
        }
        b'x' => {
            let v = as_uint(cursor.next()?)?;
            write_str(sink, &format_unsigned(v, 16, false, flags, width))
        }
        b'X' => {
            let v = as_uint(cursor.next()?)?;
            write_str(sink, &format_unsigned(v, 16, true, flags, width))
        }
        b'f' => {
            let v = as_float(cursor.next()?)?;
            let prec = precision.unwrap_or(6);
            write_str(sink, &pad_str(&format!("{v:.prec$}"), flags, width))
        }
        b'e' => {
            let v = as_float(cursor.next()?)?;
            let prec = precision.unwrap_or(6);
            write_str(sink, &pad_str(&format!("{v:.prec$e}"), flags, width))
        }
        b'g' => {
            let v = as_float(cursor.next()?)?;
            write_str(sink, &pad_str(&format_general(v, precision), flags, width))
        }
        b'a' => {
            let v = as_float(cursor.next()?)?;
            write_str(sink, &pad_str(&format_hex_float(v), flags, width))
        }
        b's' => {
            let s = as_str(cursor.next()?)?;
            let s = precision.map_or(s, |p| truncate_on_char_boundary(s, p));
            write_str(sink, &pad_str(s, flags, width))
        }
        b'c' => {
            let byte = match cursor.next()? {
                Arg::Byte(b) => *b,
                Arg::Int(v) => u8::try_from(*v).ok()?,
                Arg::UInt(v) => u8::try_from(*v).ok()?,
                _ => return None,
            };
            sink.write(&[byte])
        }
        b'p' => {
            let v = as_uint(cursor.next()?)?;
            write_str(sink, &format!("0x{v:x}"))
        }
        b'n' => 0,
        b'Q' => {
            let text = match cursor.next()? {
                Arg::Quoted(s) => *s,
                _ => return None,
            };
            match text {
                Some(s) => {
                    let capped = precision.map_or(s, |p| truncate_on_char_boundary(s, p));
                    write_str(sink, &escape_quoted(capped.as_bytes()))
                }
                None => write_str(sink, "null"),
            }
        }
        b'B' => {
            let v = match cursor.next()? {
                Arg::Bool(v) => *v,
                _ => return None,
            };
            write_str(sink, if v { "true" } else { "false" })
        }
        b'V' => {
            let blob = match cursor.next()? {
                Arg::Base64Blob(b) => *b,
                _ => return None,
            };
            write_str(sink, &format!("\"{}\"", base64_encode(blob)))
        }
        b'H' => {
            let blob = match cursor.next()? {
                Arg::HexBlob(b) => *b,
                _ => return None,
            };
            write_str(sink, &format!("\"{}\"", hex_encode(blob)))
        }
        b'M' => match cursor.next()? {
            Arg::Callback(cb) => cb(sink, cursor),
            _ => return None,
        },
        _ => return None,
    };

    Some((i, written))
}

/// Parses a width/precision count: either a literal decimal integer or `*`
/// (consume the next argument as the count).
fn parse_count(rest: &[u8], i: &mut usize, cursor: &mut ArgCursor<'_>) -> Option<usize> {
    if rest.get(*i) == Some(&b'*') {
        *i += 1;
        let v = as_uint(cursor.next()?)?;
        return Some(v as usize);
    }
    let start = *i;
    while matches!(rest.get(*i), Some(b'0'..=b'9')) {
        *i += 1;
    }
    if *i == start {
        return Some(0);
    }
    core::str::from_utf8(&rest[start..*i]).ok()?.parse().ok()
}

fn as_int(arg: &Arg<'_>) -> Option<i64> {
    match arg {
        Arg::Int(v) => Some(*v),
        Arg::UInt(v) => i64::try_from(*v).ok(),
        _ => None,
    }
}

fn as_uint(arg: &Arg<'_>) -> Option<u64> {
    match arg {
        Arg::UInt(v) => Some(*v),
        Arg::Int(v) => u64::try_from(*v).ok(),
        _ => None,
    }
}

fn as_float(arg: &Arg<'_>) -> Option<f64> {
    match arg {
        Arg::Float(v) => Some(*v),
        Arg::Int(v) => Some(*v as f64),
        Arg::UInt(v) => Some(*v as f64),
        _ => None,
    }
}

fn as_str<'a>(arg: &Arg<'a>) -> Option<&'a str> {
    match arg {
        Arg::Str(s) => Some(s),
        Arg::Quoted(Some(s)) => Some(s),
        _ => None,
    }
}

fn format_signed(v: i64, flags: Flags, width: usize) -> String {
    let negative = v < 0;
    let digits = v.unsigned_abs().to_string();
    pad_numeric(&digits, negative, flags, width)
}

fn format_unsigned(v: u64, radix: u32, upper: bool, flags: Flags, width: usize) -> String {
    let digits = match radix {
        8 => format!("{v:o}"),
        16 if upper => format!("{v:X}"),
        16 => format!("{v:x}"),
        _ => v.to_string(),
    };
    let digits = if flags.alt && radix == 16 {
        format!("{}{digits}", if upper { "0X" } else { "0x" })
    } else {
        digits
    };
    pad_numeric(&digits, false, flags, width)
}

fn pad_numeric(digits: &str, negative: bool, flags: Flags, width: usize) -> String {
    let sign = if negative {
        "-"
    } else if flags.plus {
        "+"
    } else if flags.space {
        " "
    } else {
        ""
    };
    let body_len = sign.len() + digits.len();
    if body_len >= width {
        return format!("{sign}{digits}");
    }
    let pad_len = width - body_len;
    if flags.minus {
        format!("{sign}{digits}{}", " ".repeat(pad_len))
    } else if flags.zero {
        format!("{sign}{}{digits}", "0".repeat(pad_len))
    } else {
        format!("{}{sign}{digits}", " ".repeat(pad_len))
    }
}

fn pad_str(s: &str, flags: Flags, width: usize) -> String {
    if s.len() >= width {
        return s.to_owned();
    }
    let pad_len = width - s.len();
    if flags.minus {
        format!("{s}{}", " ".repeat(pad_len))
    } else {
        format!("{}{s}", " ".repeat(pad_len))
    }
}

/// A simplified `%g`: uses fixed notation unless the magnitude would print
/// with more than a handful of leading/trailing zeros, in which case it
/// falls back to scientific notation — the same tradeoff `%g` makes in C,
/// without replicating its precision-trimming rules exactly.
fn format_general(v: f64, precision: Option<usize>) -> String {
    let prec = precision.unwrap_or(6).max(1);
    let magnitude = v.abs();
    if magnitude != 0.0 && (magnitude < 1e-4 || magnitude >= 10f64.powi(prec as i32)) {
        format!("{v:.*e}", prec.saturating_sub(1))
    } else {
        let s = format!("{v:.*}", prec);
        trim_trailing_zeros(&s)
    }
}

fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_owned();
    }
    let trimmed = s.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_owned()
}

/// A minimal `%a` (hex float) for finite values: `[-]0xH.HHHHp±E`.
fn format_hex_float(v: f64) -> String {
    if v == 0.0 {
        return if v.is_sign_negative() {
            "-0x0p+0".to_owned()
        } else {
            "0x0p+0".to_owned()
        };
    }
    let bits = v.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let exponent = ((bits >> 52) & 0x7ff) as i64 - 1023;
    let mantissa = bits & 0x000f_ffff_ffff_ffff;
    format!("{sign}0x1.{mantissa:013x}p{exponent:+}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::Arg;
    use crate::jfmt;
    use crate::sink::GrowableBuffer;

    fn render(fmt: &str, args: &[Arg<'_>]) -> String {
        let mut sink = GrowableBuffer::new();
        printf(&mut sink, fmt, args);
        sink.into_string().unwrap()
    }

    #[test]
    fn implicit_key_quoting_wraps_barewords_before_colons() {
        assert_eq!(render("{a:%d,b:%Q}", &jfmt![1, "two"]), r#"{"a":1,"b":"two"}"#);
    }

    #[test]
    fn bareword_not_followed_by_colon_is_left_alone() {
        assert_eq!(render("[true,%d]", &jfmt![1]), "[true,1]");
    }

    #[test]
    fn literal_text_inside_a_quoted_run_is_not_mistaken_for_a_bareword_key() {
        assert_eq!(render("{\"t:\": %d}", &jfmt![1]), "{\"t:\": 1}");
    }

    #[test]
    fn width_and_zero_padding() {
        assert_eq!(render("%05d", &jfmt![42]), "00042");
        assert_eq!(render("%-5d|", &jfmt![42]), "42   |");
    }

    #[test]
    fn precision_on_float() {
        assert_eq!(render("%.2f", &jfmt![3.14159]), "3.14");
    }

    #[test]
    fn hex_and_octal() {
        assert_eq!(render("%x %X %o", &jfmt![255, 255, 8]), "ff FF 10");
    }

    #[test]
    fn quoted_null_argument() {
        assert_eq!(render("%Q", &jfmt![Option::<&str>::None]), "null");
    }

    #[test]
    fn precision_caps_the_source_length_consumed_by_q() {
        assert_eq!(render("%.3Q", &jfmt!["hello"]), "\"hel\"");
    }

    #[test]
    fn precision_caps_the_source_length_consumed_by_s() {
        assert_eq!(render("%.3s", &jfmt!["hello"]), "hel");
    }

    #[test]
    fn precision_backs_off_to_a_char_boundary_instead_of_splitting_a_codepoint() {
        assert_eq!(render("%.2s", &jfmt!["é€"]), "é");
    }

    #[test]
    fn bool_and_blobs() {
        assert_eq!(render("%B", &jfmt![true]), "true");
        assert_eq!(render("%V", &[Arg::Base64Blob(b"abc")]), "\"YWJj\"");
        assert_eq!(render("%H", &[Arg::HexBlob(b"abc")]), "\"616263\"");
    }

    #[test]
    fn star_width_consumes_an_argument() {
        assert_eq!(render("%*d", &jfmt![6, 7]), "     7");
    }

    #[test]
    fn nested_callback_writes_its_own_subdocument() {
        let inner = |sink: &mut dyn Sink, cur: &mut ArgCursor<'_>| {
            let Some(Arg::Int(v)) = cur.next() else {
                return 0;
            };
            printf(sink, "[%d]", &[Arg::Int(*v)])
        };
        let cb = Arg::Callback(&inner);
        assert_eq!(render("{nested:%M}", &[cb, Arg::Int(9)]), "{\"nested\":[9]}");
    }
}
