//! A compact, embeddable JSON toolkit operating on in-memory byte buffers:
//! a streaming validator/walker, a scanf-like path extractor, a printf-like
//! formatted emitter, a structural editor, and a member/element iterator.
//!
//! [`walk`] is the foundation every other entry point builds on. Start
//! there, or at [`WalkerOptions`] if you need to tolerate bareword keys or
//! relax RFC 8259 whitespace rules.

mod arg;
mod editor;
mod error;
mod escape;
mod extractor;
mod fileio;
mod iter;
mod options;
mod out;
mod path;
mod prettify;
mod printer;
mod sink;
mod token;
mod walker;

pub use arg::{Arg, ArgCursor};
pub use editor::{setf, Edit};
pub use error::{WalkError, WalkResult};
pub use escape::{base64_decode, base64_encode, escape, escape_quoted, hex_decode, hex_encode, unescape};
pub use extractor::{scanf, scanf_array_elem};
pub use fileio::{printf_to_file, prettify_file, read_whole_file};
pub use iter::{next_elem, next_key, ElementIter, MemberIter};
pub use options::WalkerOptions;
pub use out::Out;
pub use prettify::prettify;
pub use printer::printf;
pub use sink::{file_sink_for_write, CallbackSink, FileSink, FixedBuffer, GrowableBuffer, Sink};
pub use token::{Token, TokenKind};
pub use walker::{validate, walk, VisitorEvent};

/// Builds a `&[Arg<'_>]` literal argument list for [`printf`] from a
/// heterogeneous list of values.
///
/// ```rust
/// use pathjson::{jfmt, printf, GrowableBuffer};
///
/// let mut sink = GrowableBuffer::new();
/// printf(&mut sink, "{a:%d,b:%Q}", &jfmt![1, "two"]);
/// assert_eq!(sink.into_string().unwrap(), r#"{"a":1,"b":"two"}"#);
/// ```
#[macro_export]
macro_rules! jfmt {
    ( $( $elem:expr ),* $(,)? ) => {
        [ $( $crate::Arg::from($elem) ),* ]
    };
}
