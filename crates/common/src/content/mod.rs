//! Content detection and conversion for node names and values
//!
//! Everything here is pure and total: any input text yields a display
//! string, and the only failure (unparseable JSON) is reported through the
//! [`ILLEGAL_JSON`] sentinel instead of an error.
//!
//! # Detection
//!
//! - **[`ContentKind::Json`]**: the undecoded text starts with `{` or `[`
//! - **[`ContentKind::UrlQuery`]**: the percent-decoded text contains `?`
//! - **[`ContentKind::Raw`]**: anything else
//!
//! The JSON check runs first and on the raw text, so a JSON document that
//! contains a literal `?` is still JSON.

mod json;
mod query;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel rendered when text forced to JSON does not parse
pub const ILLEGAL_JSON: &str = "<ILLEGAL JSON>";

/// Sentinel rendered in place of an empty raw value
pub const EMPTY: &str = "<EMPTY>";

/// The detected shape of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Json,
    UrlQuery,
    Raw,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Json => write!(f, "JSON"),
            ContentKind::UrlQuery => write!(f, "URL"),
            ContentKind::Raw => write!(f, "Raw"),
        }
    }
}

/// How a pane should render its text: detect automatically or force a kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    #[default]
    Auto,
    Raw,
    Json,
    Url,
}

impl ContentMode {
    /// Resolve the mode to a concrete kind for `text`
    pub fn resolve(self, text: &str) -> ContentKind {
        match self {
            ContentMode::Auto => detect(text),
            ContentMode::Raw => ContentKind::Raw,
            ContentMode::Json => ContentKind::Json,
            ContentMode::Url => ContentKind::UrlQuery,
        }
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentMode::Auto => write!(f, "auto"),
            ContentMode::Raw => write!(f, "raw"),
            ContentMode::Json => write!(f, "json"),
            ContentMode::Url => write!(f, "url"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content mode: {0} (expected auto, raw, json or url)")]
pub struct UnknownModeError(pub String);

impl FromStr for ContentMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ContentMode::Auto),
            "raw" => Ok(ContentMode::Raw),
            "json" => Ok(ContentMode::Json),
            "url" | "query" => Ok(ContentMode::Url),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

/// Detect the shape of `text`
pub fn detect(text: &str) -> ContentKind {
    if text.starts_with('{') || text.starts_with('[') {
        return ContentKind::Json;
    }
    if percent_decode(text).contains('?') {
        return ContentKind::UrlQuery;
    }
    ContentKind::Raw
}

/// Convert `raw` for display as `kind`
pub fn convert(raw: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Raw => raw.to_string(),
        ContentKind::Json => json::pretty(raw).unwrap_or_else(|| ILLEGAL_JSON.to_string()),
        ContentKind::UrlQuery => query::render(&percent_decode(raw)),
    }
}

/// Resolve `mode` against `raw` and convert
pub fn render(raw: &str, mode: ContentMode) -> String {
    convert(raw, mode.resolve(raw))
}

/// Render a node value, substituting [`EMPTY`] when the raw value is empty
pub fn render_value(raw: &[u8], mode: ContentMode) -> String {
    if raw.is_empty() {
        return EMPTY.to_string();
    }
    render(&String::from_utf8_lossy(raw), mode)
}

/// Percent-decode a whole text.
///
/// Malformed escapes stay literal and invalid UTF-8 is replaced, so this
/// never fails.
pub(crate) fn percent_decode(text: &str) -> Cow<'_, str> {
    if !text.contains('%') {
        return Cow::Borrowed(text);
    }
    let bytes = urlencoding::decode_binary(text.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}
