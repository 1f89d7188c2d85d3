//! Newline detection and the decoded line source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::encoding::{Charset, decode};

/// Newline convention of a text stream.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Newline {
    /// Windows-style line ending (\r\n).
    CRLF,
    /// Unix-style line ending (\n).
    #[default]
    LF,
    /// Old Mac-style line ending (\r).
    CR,
}

impl Newline {
    /// Returns the character sequence for this newline.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Newline::CRLF => "\r\n",
            Newline::LF => "\n",
            Newline::CR => "\r",
        }
    }

    /// Returns the configuration name of this newline.
    pub const fn name(&self) -> &'static str {
        match self {
            Newline::CRLF => "CRLF",
            Newline::LF => "LF",
            Newline::CR => "CR",
        }
    }
}

impl fmt::Display for Newline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Newline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CRLF" => Ok(Newline::CRLF),
            "LF" => Ok(Newline::LF),
            "CR" => Ok(Newline::CR),
            _ => Err(format!("unknown newline '{s}', expected CRLF, LF or CR")),
        }
    }
}

/// Occurrence counts of the three newline sequences in a sample.
///
/// A `\r\n` pair counts only towards `crlf`, never towards `cr` or `lf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewlineCounts {
    pub crlf: usize,
    pub cr: usize,
    pub lf: usize,
}

impl NewlineCounts {
    pub fn new(data: &[u8]) -> Self {
        let crlf = data.windows(2).filter(|w| w == b"\r\n").count();
        Self {
            crlf,
            cr: bytecount::count(data, b'\r') - crlf,
            lf: bytecount::count(data, b'\n') - crlf,
        }
    }
}

/// Detect the dominant newline convention of a raw byte sample.
///
/// Falls back to LF when there is no signal at all.
pub fn detect_newline(data: &[u8]) -> Newline {
    let NewlineCounts { crlf, cr, lf } = NewlineCounts::new(data);

    if crlf > cr / 2 && crlf > lf / 2 {
        Newline::CRLF
    } else if cr > lf / 2 {
        Newline::CR
    } else {
        Newline::LF
    }
}

/// Line source over decoded text.
///
/// Physical lines are split on `\r\n`, `\r` or `\n`; the terminators are not
/// part of the yielded lines.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    text: String,
    pos: usize,
}

impl LineDecoder {
    /// Decode `data` with `charset` and iterate over its lines.
    pub fn new(data: &[u8], charset: &Charset) -> Self {
        Self::from_text(decode(data, charset))
    }

    /// Iterate over the lines of already decoded text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: 0,
        }
    }
}

impl Iterator for LineDecoder {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.pos >= self.text.len() {
            return None;
        }

        let rest = &self.text[self.pos..];
        match rest.find(['\r', '\n']) {
            Some(idx) => {
                let line = rest[..idx].to_string();
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                self.pos += idx + terminator;
                Some(line)
            }
            None => {
                self.pos = self.text.len();
                Some(rest.to_string())
            }
        }
    }
}

/// Decode a sample into its physical lines.
///
/// When `truncated` is set the sample was cut at an arbitrary byte, so an
/// unterminated last line is dropped as long as another line remains.
pub fn decode_lines(data: &[u8], charset: &Charset, truncated: bool) -> Vec<String> {
    let text = decode(data, charset);
    let partial_tail = !text.ends_with(['\r', '\n']);
    let mut lines: Vec<String> = LineDecoder::from_text(text).collect();

    if truncated && partial_tail && lines.len() > 1 {
        lines.pop();
    }

    lines
}
