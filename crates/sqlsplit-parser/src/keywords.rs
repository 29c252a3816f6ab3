//! Case-insensitive keyword lookup over sorted tables.
//!
//! Keyword sets are kept as sorted uppercase spellings so that membership
//! checks are a binary search instead of a hash or a linear scan.

use std::cmp::Ordering;

/// Compares an uppercase keyword with a raw token without allocating an
/// uppercase copy of the token.
///
/// PRE-CONDITION: `kw` is uppercase.
pub(crate) fn cmp_keyword_ignore_ascii_case(kw: &str, token: &str) -> Ordering {
    let mut a = kw.as_bytes();
    let mut b = token.as_bytes();
    while let ([first_a, rest_a @ ..], [first_b, rest_b @ ..]) = (a, b) {
        match first_a.cmp(&first_b.to_ascii_uppercase()) {
            Ordering::Less => return Ordering::Less,
            Ordering::Greater => return Ordering::Greater,
            Ordering::Equal => {
                a = rest_a;
                b = rest_b;
            }
        }
    }
    a.len().cmp(&b.len())
}

/// Looks up `token` in a sorted table of uppercase keywords, returning the
/// canonical (uppercase) spelling on a hit.
pub(crate) fn lookup_ignore_ascii_case<'t>(sorted: &'t [String], token: &str) -> Option<&'t str> {
    sorted
        .binary_search_by(|kw| cmp_keyword_ignore_ascii_case(kw, token))
        .ok()
        .map(|idx| sorted[idx].as_str())
}

pub(crate) fn contains_ignore_ascii_case(sorted: &[String], token: &str) -> bool {
    lookup_ignore_ascii_case(sorted, token).is_some()
}
