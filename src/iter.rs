//! Member/element iteration, the Rust-`Iterator` replacement for the
//! original toolkit's resumable opaque-handle API.
//!
//! Because this crate already requires the whole document in memory (there
//! is no streaming parser here, unlike the incremental handle the original
//! API resumed across callbacks), [`MemberIter`] and [`ElementIter`] simply
//! do one [`crate::walk`] up front — locating the container named by a path,
//! exactly as the reference toolkit's `next_key`/`next_elem` do — and hand
//! back the direct children they collected. This trades the original's
//! re-entrant parsing for a plain, safe `Iterator` impl. [`next_key`] and
//! [`next_elem`] are thin legacy-shaped wrappers for callers migrating from
//! a step-at-a-time API.

use crate::error::WalkResult;
use crate::options::WalkerOptions;
use crate::token::{Token, TokenKind};
use crate::walker::{walk, VisitorEvent};

/// Locates the container at `path` (the empty string names the document
/// root) and collects its direct children, keyed the same way a visitor
/// event names them: object members by key, array elements by decimal
/// index.
///
/// A `path` that names a scalar, or that doesn't exist in `source` at all,
/// simply yields no children — mirroring the reference toolkit's handle
/// API, where iterating a path with no matching container produces an
/// immediate end-of-container rather than an error.
///
/// Container-end events carry no name of their own (see [`VisitorEvent`]),
/// so a container child's key/index is captured from its *start* event and
/// paired with the full-span token its *end* event reports.
fn collect_children_at<'src>(
    source: &'src [u8],
    path: &str,
    want_array: bool,
) -> WalkResult<Vec<(Option<&'src str>, Token<'src>)>> {
    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut target_depth: Option<i32> = None;
    let mut target_kind: Option<TokenKind> = None;
    let mut pending_names: Vec<Option<&'src str>> = Vec::new();
    let mut done = false;
    {
        let mut visitor = |e: VisitorEvent<'src>| {
            if done {
                return;
            }
            let is_start = matches!(e.token.kind(), TokenKind::ObjectStart | TokenKind::ArrayStart);
            let is_end = matches!(e.token.kind(), TokenKind::ObjectEnd | TokenKind::ArrayEnd);

            if is_start {
                if target_depth.is_none() && e.path == path {
                    target_depth = Some(depth);
                    target_kind = Some(e.token.kind());
                }
                pending_names.push(e.name);
                depth += 1;
                return;
            }
            if is_end {
                depth -= 1;
                let name = pending_names.pop().unwrap_or(None);
                if target_depth == Some(depth) {
                    // The matching end of the target container itself.
                    done = true;
                } else if Some(depth) == target_depth.map(|d| d + 1) {
                    items.push((name, e.token));
                }
                return;
            }
            if Some(depth) == target_depth.map(|d| d + 1) {
                items.push((e.name, e.token));
            }
        };
        walk(source, WalkerOptions::default(), Some(&mut visitor))?;
    }
    match target_kind {
        Some(TokenKind::ArrayStart) if want_array => Ok(items),
        Some(TokenKind::ObjectStart) if !want_array => Ok(items),
        _ => Ok(Vec::new()),
    }
}

/// Iterates the direct members of the JSON object located at `path`.
pub struct MemberIter<'src> {
    items: std::vec::IntoIter<(Option<&'src str>, Token<'src>)>,
}

impl<'src> MemberIter<'src> {
    /// Builds an iterator over the object members at `path` in `source`
    /// (`""` names the document root).
    ///
    /// # Errors
    ///
    /// Propagates [`crate::WalkError`] if `source` is not valid JSON. If
    /// `path` names a scalar, an array, or a location that doesn't exist,
    /// the iterator is simply empty.
    pub fn new(source: &'src [u8], path: &str) -> WalkResult<Self> {
        let items = collect_children_at(source, path, false)?;
        Ok(Self {
            items: items.into_iter(),
        })
    }
}

impl<'src> Iterator for MemberIter<'src> {
    type Item = (&'src str, Token<'src>);

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(name, token)| (name.unwrap_or(""), token))
    }
}

/// Iterates the direct elements of the JSON array located at `path`.
pub struct ElementIter<'src> {
    items: std::vec::IntoIter<(Option<&'src str>, Token<'src>)>,
}

impl<'src> ElementIter<'src> {
    /// Builds an iterator over the array elements at `path` in `source`
    /// (`""` names the document root).
    ///
    /// # Errors
    ///
    /// Propagates [`crate::WalkError`] if `source` is not valid JSON. If
    /// `path` names a scalar, an object, or a location that doesn't exist,
    /// the iterator is simply empty.
    pub fn new(source: &'src [u8], path: &str) -> WalkResult<Self> {
        let items = collect_children_at(source, path, true)?;
        Ok(Self {
            items: items.into_iter(),
        })
    }
}

impl<'src> Iterator for ElementIter<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, token)| token)
    }
}

/// Legacy-shaped step function: returns the next object member as
/// `(key, token)`, advancing `iter`.
///
/// A thin wrapper around [`MemberIter::next`] for callers porting
/// step-at-a-time code.
pub fn next_key<'src>(iter: &mut MemberIter<'src>) -> Option<(&'src str, Token<'src>)> {
    iter.next()
}

/// Legacy-shaped step function: returns the next array element token,
/// advancing `iter`.
pub fn next_elem<'src>(iter: &mut ElementIter<'src>) -> Option<Token<'src>> {
    iter.next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_direct_object_members_only() {
        let mut it = MemberIter::new(br#"{"a":1,"b":{"nested":2},"c":[1,2]}"#, "").unwrap();
        let collected: Vec<_> = (&mut it).map(|(k, t)| (k.to_owned(), t.kind())).collect();
        assert_eq!(
            collected,
            vec![
                ("a".to_owned(), TokenKind::Number),
                ("b".to_owned(), TokenKind::ObjectEnd),
                ("c".to_owned(), TokenKind::ArrayEnd),
            ]
        );
    }

    #[test]
    fn iterates_direct_array_elements_only() {
        let mut it = ElementIter::new(b"[1,[2,3],4]", "").unwrap();
        let kinds: Vec<_> = (&mut it).map(Token::kind).collect();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::ArrayEnd, TokenKind::Number]);
    }

    #[test]
    fn member_iter_over_an_array_is_empty() {
        let mut it = MemberIter::new(b"[1,2,3]", "").unwrap();
        assert!(next_key(&mut it).is_none());
    }

    #[test]
    fn next_key_matches_iterator_next() {
        let mut it = MemberIter::new(br#"{"x":1}"#, "").unwrap();
        let (k, t) = next_key(&mut it).unwrap();
        assert_eq!(k, "x");
        assert_eq!(t.text(), "1");
        assert!(next_key(&mut it).is_none());
    }

    #[test]
    fn iterates_members_of_a_nested_object_located_by_path() {
        let mut it = MemberIter::new(br#"{"a":1,"b":{"x":10,"y":20}}"#, ".b").unwrap();
        let collected: Vec<_> = (&mut it).map(|(k, t)| (k.to_owned(), t.text().to_owned())).collect();
        assert_eq!(collected, vec![("x".to_owned(), "10".to_owned()), ("y".to_owned(), "20".to_owned())]);
    }

    #[test]
    fn iterates_elements_of_a_nested_array_located_by_path() {
        let mut it = ElementIter::new(br#"{"c":[7,8,9]}"#, ".c").unwrap();
        let texts: Vec<_> = (&mut it).map(|t| t.text().to_owned()).collect();
        assert_eq!(texts, vec!["7", "8", "9"]);
    }

    #[test]
    fn missing_path_yields_an_empty_iterator() {
        let mut it = MemberIter::new(br#"{"a":1}"#, ".nope").unwrap();
        assert!(next_key(&mut it).is_none());
    }

    #[test]
    fn path_naming_a_scalar_yields_an_empty_iterator() {
        let mut it = MemberIter::new(br#"{"a":1}"#, ".a").unwrap();
        assert!(next_key(&mut it).is_none());
    }

    #[test]
    fn deeply_nested_array_elements_are_located_by_path() {
        let mut it = ElementIter::new(br#"{"a":{"b":[1,2,3]}}"#, ".a.b").unwrap();
        let texts: Vec<_> = (&mut it).map(|t| t.text().to_owned()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }
}
