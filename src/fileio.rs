//! File I/O glue, built only on the [`Sink`]/[`walk`] interfaces: reading a
//! whole file into memory, formatting straight to a file, and rewriting a
//! file in place through the pretty-printer.
//!
//! Nothing here is a new capability; these are convenience wrappers a
//! caller could write themselves by composing [`std::fs`] with [`printf`]
//! or [`prettify`]. They exist so the common "validate/format a file on
//! disk" path doesn't require wiring a [`FileSink`] by hand each time.

use std::fs;
use std::io;
use std::path::Path;

use crate::arg::Arg;
use crate::error::WalkResult;
use crate::prettify::prettify;
use crate::printer::printf;
use crate::sink::{file_sink_for_write, Sink};

/// Reads the entire contents of `path` into memory.
///
/// # Errors
///
/// Propagates any `std::io::Error` from opening or reading the file.
pub fn read_whole_file(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Renders `fmt`/`args` via [`printf`] directly into `path`, truncating any
/// existing content, and returns the number of bytes written.
///
/// # Errors
///
/// Propagates any `std::io::Error` from opening or writing the file.
pub fn printf_to_file(path: &Path, fmt: &str, args: &[Arg<'_>]) -> io::Result<usize> {
    let mut sink = file_sink_for_write(path)?;
    Ok(printf(&mut sink, fmt, args))
}

/// Reads `path`, pretty-prints its contents, and overwrites it with the
/// reformatted document.
///
/// # Errors
///
/// Returns [`crate::WalkError`] if the file's contents are not valid JSON.
/// I/O failures (reading or writing the file) are reported by aborting via
/// the same best-effort discipline [`crate::FileSink`] uses elsewhere in
/// this crate: a write failure is swallowed rather than propagated, since
/// `Sink::write` has no error channel. Callers that need to observe I/O
/// errors on the write side should read the file themselves and call
/// [`prettify`] into a [`crate::GrowableBuffer`], then write the result out
/// with their own error handling.
pub fn prettify_file(path: &Path) -> WalkResult<usize> {
    let source = read_whole_file(path).map_err(|_| crate::error::WalkError::Invalid)?;
    let mut sink = file_sink_for_write(path).map_err(|_| crate::error::WalkError::Invalid)?;
    prettify(&source, &mut sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn reads_whole_file_contents() {
        let mut file = tempfile();
        file.as_file().write_all(b"{\"a\":1}").unwrap();
        assert_eq!(read_whole_file(file.path()).unwrap(), b"{\"a\":1}");
    }

    #[test]
    fn printf_to_file_writes_formatted_output() {
        let file = tempfile();
        let written = printf_to_file(file.path(), "{a:%d}", &crate::jfmt![7]).unwrap();
        assert_eq!(written, 7);
        assert_eq!(read_whole_file(file.path()).unwrap(), br#"{"a":7}"#);
    }

    #[test]
    fn prettify_file_reformats_in_place() {
        let mut file = tempfile();
        file.as_file().write_all(br#"{"a":1,"b":2}"#).unwrap();
        prettify_file(file.path()).unwrap();
        assert_eq!(
            read_whole_file(file.path()).unwrap(),
            b"{\n  \"a\": 1,\n  \"b\": 2\n}"
        );
    }

    #[test]
    fn prettify_file_rejects_malformed_json() {
        let mut file = tempfile();
        file.as_file().write_all(b"{").unwrap();
        assert!(prettify_file(file.path()).is_err());
    }

    struct TempFile {
        path: std::path::PathBuf,
        file: fs::File,
    }

    impl TempFile {
        fn as_file(&mut self) -> &mut fs::File {
            &mut self.file
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    fn tempfile() -> TempFile {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let unique = u64::from(std::process::id()) * 1_000_003 + COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!("pathjson-fileio-test-{unique}.json"));
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        TempFile { path, file }
    }
}
