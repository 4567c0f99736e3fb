//! Absolute path handling for namespace nodes
//!
//! Paths are `/`-delimited and carry raw (still percent-encoded) segment
//! names. Decoding only ever happens for display.

use std::borrow::Cow;

/// The root path
pub const ROOT: &str = "/";

/// Percent-decode a raw segment name for display.
///
/// A malformed escape or a decoded byte sequence that is not valid UTF-8
/// leaves the input unchanged.
pub fn decode_segment(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }
    if !has_well_formed_escapes(raw) {
        return Cow::Borrowed(raw);
    }
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

/// Join a parent path and a raw segment name.
///
/// Any doubled `/` produced by the join collapses into one. An empty parent
/// means "not yet rooted" and joins as if it were `/`.
pub fn join_path(parent: &str, segment: &str) -> String {
    let parent = if parent.is_empty() { ROOT } else { parent };
    let joined = format!("{}/{}", parent, segment);
    collapse_slashes(&joined)
}

/// Get the parent path of an absolute path (`/` is its own parent)
pub fn parent_path(path: &str) -> &str {
    if path == ROOT || path.is_empty() {
        return ROOT;
    }

    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(0) | None => ROOT,
        Some(pos) => &trimmed[..pos],
    }
}

/// Split an absolute path into its raw segments, skipping empty ones
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    out
}

fn has_well_formed_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
