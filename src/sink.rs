//! Output sinks: the sole mechanism by which the printer and editor produce
//! bytes.
//!
//! Every [`Sink`] tracks `written`, the number of bytes it was *asked* to
//! write, independent of how many it actually retained. This lets a
//! [`FixedBuffer`] silently truncate overflow while still reporting the true
//! length a caller would need to allocate to avoid truncation — mirroring
//! `snprintf`'s return value.

use std::fs::File;
use std::io::{self, Write as _};

/// An append-only destination for the bytes the printer and editor produce.
pub trait Sink {
    /// Appends `bytes` to the sink. Returns the number of bytes physically
    /// retained, which may be less than `bytes.len()` for a bounded sink.
    ///
    /// Implementations must still advance their `written` counter by
    /// `bytes.len()` regardless of how much was retained.
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// The total number of bytes this sink has been asked to write since
    /// construction.
    fn written(&self) -> usize;
}

/// A sink over a caller-owned, fixed-capacity byte buffer.
///
/// Bytes beyond the buffer's capacity are dropped, but `written` still
/// advances by the full amount requested — callers can compare `written()`
/// against the buffer length to detect truncation, the same way they would
/// check `snprintf`'s return value.
pub struct FixedBuffer<'buf> {
    buf: &'buf mut [u8],
    written: usize,
}

impl<'buf> FixedBuffer<'buf> {
    /// Wraps `buf` as a sink. Writing never panics; excess bytes are simply
    /// not stored.
    pub fn new(buf: &'buf mut [u8]) -> Self {
        Self { buf, written: 0 }
    }

    /// The prefix of the buffer that was actually written so far.
    #[must_use]
    pub fn filled(&self) -> &[u8] {
        let len = self.written.min(self.buf.len());
        &self.buf[..len]
    }
}

impl Sink for FixedBuffer<'_> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        let space = self.buf.len().saturating_sub(self.written);
        let take = bytes.len().min(space);
        if take > 0 {
            self.buf[self.written..self.written + take].copy_from_slice(&bytes[..take]);
        }
        self.written += bytes.len();
        take
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// A sink that owns a growable `Vec<u8>`, reallocating as needed.
///
/// This is the usual choice when the final size isn't known up front; unlike
/// [`FixedBuffer`] it never truncates.
#[derive(Debug, Default, Clone)]
pub struct GrowableBuffer {
    buf: Vec<u8>,
}

impl GrowableBuffer {
    /// Creates an empty, growable sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the sink, returning the accumulated bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Borrows the accumulated bytes without consuming the sink.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the sink, returning the accumulated bytes as a `String`.
    ///
    /// # Errors
    ///
    /// Returns the original bytes back if they are not valid UTF-8. A
    /// well-formed printer or editor output is always valid UTF-8, so this
    /// only fails if a `%M` callback wrote raw non-UTF-8 bytes.
    pub fn into_string(self) -> Result<String, Vec<u8>> {
        String::from_utf8(self.buf).map_err(|e| e.into_bytes())
    }
}

impl Sink for GrowableBuffer {
    fn write(&mut self, bytes: &[u8]) -> usize {
        self.buf.extend_from_slice(bytes);
        bytes.len()
    }

    fn written(&self) -> usize {
        self.buf.len()
    }
}

/// A sink that writes synchronously to an open file.
pub struct FileSink {
    file: File,
    written: usize,
}

impl FileSink {
    /// Wraps an already-open file as a sink.
    #[must_use]
    pub fn new(file: File) -> Self {
        Self { file, written: 0 }
    }
}

impl Sink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> usize {
        // A synchronous write failure has nowhere safe to go through the
        // infallible `Sink` contract; we count the bytes as written and swallow
        // the error the same way the reference toolkit ignores `fwrite`'s
        // return value. Callers who need to observe I/O errors should use
        // `printf_to_file`, which checks `File::write_all` directly.
        let _ = self.file.write_all(bytes);
        self.written += bytes.len();
        bytes.len()
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// Blanket sink over any `FnMut(&[u8])` user callback.
///
/// Wraps a closure so it can be used anywhere a `&mut dyn Sink` is expected.
pub struct CallbackSink<F: FnMut(&[u8])> {
    callback: F,
    written: usize,
}

impl<F: FnMut(&[u8])> CallbackSink<F> {
    /// Wraps `callback` as a sink; it is invoked once per `write` call (the
    /// printer may call `write` multiple times per conversion).
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            written: 0,
        }
    }
}

impl<F: FnMut(&[u8])> Sink for CallbackSink<F> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        (self.callback)(bytes);
        self.written += bytes.len();
        bytes.len()
    }

    fn written(&self) -> usize {
        self.written
    }
}

impl Sink for &mut dyn Sink {
    fn write(&mut self, bytes: &[u8]) -> usize {
        (**self).write(bytes)
    }

    fn written(&self) -> usize {
        (**self).written()
    }
}

pub(crate) fn write_str(sink: &mut dyn Sink, s: &str) -> usize {
    sink.write(s.as_bytes())
}

/// Convenience: writes `path`'s whole-file contents via [`FileSink`], opening
/// the file for writing (truncating any existing content), returning the
/// number of bytes written.
///
/// # Errors
///
/// Propagates any `std::io::Error` from opening or writing the file.
pub fn file_sink_for_write(path: &std::path::Path) -> io::Result<FileSink> {
    Ok(FileSink::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_buffer_truncates_but_reports_full_length() {
        let mut storage = [0u8; 3];
        let mut sink = FixedBuffer::new(&mut storage);
        assert_eq!(sink.write(b"{\"a\":1}"), 3);
        assert_eq!(sink.written(), 7);
        assert_eq!(sink.filled(), b"{\"a");
    }

    #[test]
    fn growable_buffer_never_truncates() {
        let mut sink = GrowableBuffer::new();
        sink.write(b"hello ");
        sink.write(b"world");
        assert_eq!(sink.written(), 11);
        assert_eq!(sink.into_string().unwrap(), "hello world");
    }

    #[test]
    fn callback_sink_forwards_every_write() {
        let mut seen = Vec::new();
        {
            let mut sink = CallbackSink::new(|b: &[u8]| seen.push(b.to_vec()));
            sink.write(b"a");
            sink.write(b"bc");
        }
        assert_eq!(seen, vec![b"a".to_vec(), b"bc".to_vec()]);
    }
}
