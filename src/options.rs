/// Configuration options for the [`walk`](crate::walk) entry point.
///
/// These options control which permissive, non-RFC-8259 deviations the
/// walker accepts. Every option defaults to `true`: the toolkit is meant as a
/// drop-in replacement for hand-authored JSON-ish configuration and log
/// formats, where barewords and loose whitespace are the common case. Callers
/// that want strict RFC 8259 validation should construct
/// `WalkerOptions::strict()`.
///
/// # Examples
///
/// ```rust
/// use pathjson::WalkerOptions;
///
/// let strict = WalkerOptions::strict();
/// assert!(!strict.allow_bareword_keys);
/// assert!(!strict.allow_unicode_whitespace);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerOptions {
    /// Whether object keys may be unquoted identifiers (`[A-Za-z_][A-Za-z0-9_-]*`)
    /// in addition to quoted strings.
    pub allow_bareword_keys: bool,
    /// Whether any Unicode whitespace is tolerated between tokens.
    ///
    /// When `false`, only the four whitespace characters from RFC 8259 are
    /// recognized: space, line feed, carriage return, and horizontal tab.
    pub allow_unicode_whitespace: bool,
}

impl Default for WalkerOptions {
    fn default() -> Self {
        Self {
            allow_bareword_keys: true,
            allow_unicode_whitespace: false,
        }
    }
}

impl WalkerOptions {
    /// Strict RFC 8259 behavior: quoted keys only, no whitespace beyond the
    /// four characters the spec defines.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            allow_bareword_keys: false,
            allow_unicode_whitespace: false,
        }
    }
}
