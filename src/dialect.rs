use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::encoding::Charset;
use crate::error::Result;
use crate::newline::Newline;

/// Default cap on the size of a single quoted value, in bytes.
pub const DEFAULT_MAX_QUOTED_SIZE_LIMIT: usize = 131_072;

/// A fully resolved CSV dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    /// Field delimiter character.
    pub delimiter: char,
    /// Quote character, `None` disables quoting.
    pub quote: Option<char>,
    /// Escape character used inside quoted values, `None` disables escaping.
    pub escape: Option<char>,
    /// Unquoted literal that stands for a null value.
    pub null_string: Option<String>,
    /// Prefix marking lines to ignore.
    pub comment_line_marker: Option<String>,
    /// Trim leading and trailing spaces around unquoted values.
    pub trim_if_not_quoted: bool,
    /// Number of leading lines (preamble) before the table starts.
    pub skip_header_lines: usize,
    /// Whether the first line of the table holds column names.
    pub has_header_line: bool,
    /// Text encoding of the input.
    pub charset: Charset,
    /// Newline used between records and inside multi-line quoted values.
    pub newline: Newline,
    /// Maximum size of one quoted value, in bytes.
    pub max_quoted_size_limit: usize,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: Some('"'),
            escape: Some('"'),
            null_string: None,
            comment_line_marker: None,
            trim_if_not_quoted: false,
            skip_header_lines: 0,
            has_header_line: false,
            charset: Charset::utf8(),
            newline: Newline::LF,
            max_quoted_size_limit: DEFAULT_MAX_QUOTED_SIZE_LIMIT,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delimiter={:?} quote={} escape={} newline={} charset={}",
            self.delimiter,
            display_char(self.quote),
            display_char(self.escape),
            self.newline,
            self.charset
        )
    }
}

fn display_char(c: Option<char>) -> String {
    match c {
        Some(c) => format!("{c:?}"),
        None => "none".to_string(),
    }
}

/// A partially specified dialect as provided by the caller.
///
/// `None` means "guess this field". `Some(value)` is authoritative and is never
/// overwritten. Fields whose value is itself optional use `Option<Option<T>>`:
/// `Some(None)` explicitly disables the feature (e.g. no quoting at all).
///
/// In JSON, an absent key means "guess" and `null` means "disabled":
///
/// ```
/// use csv_guess::DialectConfig;
///
/// let config = DialectConfig::from_json(r#"{"delimiter": ";", "quote": null}"#).unwrap();
/// assert_eq!(config.delimiter, Some(';'));
/// assert_eq!(config.quote, Some(None));
/// assert_eq!(config.escape, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(
        deserialize_with = "explicit_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub quote: Option<Option<char>>,
    #[serde(
        deserialize_with = "explicit_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub escape: Option<Option<char>>,
    #[serde(
        deserialize_with = "explicit_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub null_string: Option<Option<String>>,
    #[serde(
        deserialize_with = "explicit_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub comment_line_marker: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim_if_not_quoted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_header_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_header_line: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<Charset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newline: Option<Newline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quoted_size_limit: Option<usize>,
}

/// The guessed part of a dialect: only fields the caller left unset.
pub type DialectDiff = DialectConfig;

/// Maps a present JSON value (including `null`) to `Some`, so that an absent
/// key and an explicit `null` stay distinguishable.
fn explicit_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl DialectConfig {
    /// Parse a JSON dialect configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build the starting dialect: defaults overridden by every explicit field.
    pub fn explicit_dialect(&self) -> Dialect {
        let defaults = Dialect::default();
        Dialect {
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            quote: self.quote.unwrap_or(defaults.quote),
            escape: self.escape.unwrap_or(defaults.escape),
            null_string: self.null_string.clone().unwrap_or(defaults.null_string),
            comment_line_marker: self
                .comment_line_marker
                .clone()
                .unwrap_or(defaults.comment_line_marker),
            trim_if_not_quoted: self.trim_if_not_quoted.unwrap_or(defaults.trim_if_not_quoted),
            skip_header_lines: self.skip_header_lines.unwrap_or(defaults.skip_header_lines),
            has_header_line: self.has_header_line.unwrap_or(defaults.has_header_line),
            charset: self.charset.clone().unwrap_or(defaults.charset),
            newline: self.newline.unwrap_or(defaults.newline),
            max_quoted_size_limit: self
                .max_quoted_size_limit
                .unwrap_or(defaults.max_quoted_size_limit),
        }
    }

    /// Collect the fields of `resolved` that this config left to be guessed.
    ///
    /// A guessed-absent null string or comment marker is left out since absence
    /// is already the default. `max_quoted_size_limit` is never guessed.
    pub fn diff(&self, resolved: &Dialect) -> DialectDiff {
        fn unset<T: Clone>(explicit: &Option<T>, value: &T) -> Option<T> {
            explicit.is_none().then(|| value.clone())
        }

        DialectDiff {
            delimiter: unset(&self.delimiter, &resolved.delimiter),
            quote: unset(&self.quote, &resolved.quote),
            escape: unset(&self.escape, &resolved.escape),
            null_string: unset(&self.null_string, &resolved.null_string)
                .filter(|v| v.is_some()),
            comment_line_marker: unset(&self.comment_line_marker, &resolved.comment_line_marker)
                .filter(|v| v.is_some()),
            trim_if_not_quoted: unset(&self.trim_if_not_quoted, &resolved.trim_if_not_quoted),
            skip_header_lines: unset(&self.skip_header_lines, &resolved.skip_header_lines),
            has_header_line: unset(&self.has_header_line, &resolved.has_header_line),
            charset: unset(&self.charset, &resolved.charset),
            newline: unset(&self.newline, &resolved.newline),
            max_quoted_size_limit: None,
        }
    }

    /// Fill every unset field from `dialect`, making the config fully explicit.
    pub fn complete_from(&self, dialect: &Dialect) -> DialectConfig {
        let diff = self.diff(dialect);
        DialectConfig {
            delimiter: self.delimiter.or(diff.delimiter),
            quote: self.quote.or(diff.quote),
            escape: self.escape.or(diff.escape),
            null_string: self
                .null_string
                .clone()
                .or(Some(dialect.null_string.clone())),
            comment_line_marker: self
                .comment_line_marker
                .clone()
                .or(Some(dialect.comment_line_marker.clone())),
            trim_if_not_quoted: self.trim_if_not_quoted.or(diff.trim_if_not_quoted),
            skip_header_lines: self.skip_header_lines.or(diff.skip_header_lines),
            has_header_line: self.has_header_line.or(diff.has_header_line),
            charset: self.charset.clone().or(diff.charset),
            newline: self.newline.or(diff.newline),
            max_quoted_size_limit: self
                .max_quoted_size_limit
                .or(Some(dialect.max_quoted_size_limit)),
        }
    }
}
