//! Streaming CSV tokenizer.
//!
//! The tokenizer walks decoded physical lines one character at a time. A
//! logical record normally maps to one physical line, except when a quoted
//! value spans line breaks: then the dialect newline is appended to the value
//! and scanning continues on the following line.
//!
//! ```
//! use csv_guess::{Dialect, Tokenizer};
//!
//! let lines = vec!["a,\"b,c\"".to_string(), "d,".to_string()];
//! let mut tokenizer = Tokenizer::new(lines.into_iter(), &Dialect::default());
//!
//! assert!(tokenizer.next_record().unwrap());
//! assert_eq!(tokenizer.next_value().unwrap().as_deref(), Some("a"));
//! assert_eq!(tokenizer.next_value().unwrap().as_deref(), Some("b,c"));
//! assert!(tokenizer.next_record().unwrap());
//! assert_eq!(tokenizer.next_value().unwrap().as_deref(), Some("d"));
//! assert_eq!(tokenizer.next_value().unwrap(), None);
//! assert!(!tokenizer.next_record().unwrap());
//! ```

use std::collections::VecDeque;

use crate::dialect::Dialect;
use crate::error::TokenizeError;

/// One logical row of nullable values.
pub type Record = Vec<Option<String>>;

/// One raw column as read by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column text with quoting and escaping removed.
    pub text: String,
    /// Whether the column was enclosed in quotes.
    pub quoted: bool,
}

impl Column {
    /// Map the raw column to a nullable value.
    ///
    /// Quoted columns are never null, so `""` stays an empty string. An
    /// unquoted column is null when empty or when it equals `null_string`.
    pub fn into_value(self, null_string: Option<&str>) -> Option<String> {
        if self.quoted {
            return Some(self.text);
        }
        if self.text.is_empty() || null_string == Some(self.text.as_str()) {
            None
        } else {
            Some(self.text)
        }
    }
}

/// Returns true if `line` is a comment line under `marker`.
///
/// Lines opening with the quote character, or whose first column is the null
/// string, are data even when they start with the marker.
pub(crate) fn is_comment_line(
    line: &str,
    marker: &str,
    delimiter: char,
    quote: Option<char>,
    null_string: Option<&str>,
) -> bool {
    !marker.is_empty()
        && line.starts_with(marker)
        && !quote.is_some_and(|q| line.starts_with(q))
        && !null_string.is_some_and(|null| {
            line.strip_prefix(null)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(delimiter))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    NotEnd,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnState {
    Begin,
    FirstTrim,
    Value,
    LastTrimOrValue,
    QuotedValue,
    AfterQuotedValue,
}

/// Character-level state machine turning lines into records and columns.
///
/// The protocol is:
///
/// 1. [`next_record`](Self::next_record) moves to the next logical record.
/// 2. [`next_column`](Self::next_column) or [`next_value`](Self::next_value)
///    reads columns until [`has_next_column`](Self::has_next_column) is false.
/// 3. On any [`TokenizeError`], [`skip_current_record`](Self::skip_current_record)
///    drops the offending record and tokenizing resumes with the next one.
#[derive(Debug)]
pub struct Tokenizer<I> {
    lines: I,
    /// Lines pushed back by a skip, read before `lines`.
    unread: VecDeque<String>,
    line: String,
    /// Whether `line` holds a line that was read (false before the first read
    /// and after the input ran out).
    line_valid: bool,
    /// Byte offset of the next character in `line`.
    pos: usize,
    line_number: u64,
    record_state: RecordState,
    /// Earlier physical lines of a quoted value still being read.
    quoted_value_lines: Vec<String>,

    delimiter: char,
    quote: Option<char>,
    escape: Option<char>,
    newline: &'static str,
    trim_if_not_quoted: bool,
    null_string: Option<String>,
    comment_line_marker: Option<String>,
    max_quoted_size_limit: usize,
}

impl<I> Tokenizer<I>
where
    I: Iterator<Item = String>,
{
    /// Create a tokenizer over `lines` using a resolved dialect.
    ///
    /// `skip_header_lines` and `has_header_line` are not applied here; see
    /// [`skip_header_lines`](Self::skip_header_lines).
    pub fn new(lines: I, dialect: &Dialect) -> Self {
        Self {
            lines,
            unread: VecDeque::new(),
            line: String::new(),
            line_valid: false,
            pos: 0,
            line_number: 0,
            record_state: RecordState::End,
            quoted_value_lines: Vec::new(),
            delimiter: dialect.delimiter,
            quote: dialect.quote,
            escape: dialect.escape,
            newline: dialect.newline.as_str(),
            trim_if_not_quoted: dialect.trim_if_not_quoted,
            null_string: dialect.null_string.clone(),
            comment_line_marker: dialect
                .comment_line_marker
                .clone()
                .filter(|marker| !marker.is_empty()),
            max_quoted_size_limit: dialect.max_quoted_size_limit,
        }
    }

    /// Physical line number of the current line (1-based, 0 before any read).
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Discard up to `count` physical lines without tokenizing them.
    ///
    /// Returns the number of lines actually skipped.
    pub fn skip_header_lines(&mut self, count: usize) -> usize {
        let mut skipped = 0;
        while skipped < count && self.read_line().is_some() {
            self.line_number += 1;
            skipped += 1;
        }
        skipped
    }

    /// Move to the next record, skipping empty and comment lines.
    pub fn next_record(&mut self) -> Result<bool, TokenizeError> {
        self.next_record_with(true)
    }

    /// Move to the next record.
    ///
    /// Fails with [`TokenizeError::TooManyColumns`] when the current record
    /// still has unread columns.
    pub fn next_record_with(&mut self, skip_empty_lines: bool) -> Result<bool, TokenizeError> {
        if self.record_state != RecordState::End {
            return Err(TokenizeError::TooManyColumns {
                line: self.line_number,
            });
        }

        if self.next_line(skip_empty_lines) {
            self.record_state = RecordState::NotEnd;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Returns true if the current record has more columns to read.
    pub fn has_next_column(&self) -> bool {
        self.record_state == RecordState::NotEnd
    }

    /// Read the next column and map it to a nullable value.
    pub fn next_value(&mut self) -> Result<Option<String>, TokenizeError> {
        let column = self.next_column()?;
        Ok(column.into_value(self.null_string.as_deref()))
    }

    /// Read the next raw column of the current record.
    pub fn next_column(&mut self) -> Result<Column, TokenizeError> {
        if self.record_state == RecordState::End {
            return Err(TokenizeError::TooFewColumns {
                line: self.line_number,
            });
        }

        self.quoted_value_lines.clear();

        let mut value = String::new();
        let mut quoted = false;
        // length of `value` before a run of possibly trailing spaces
        let mut trim_mark = 0;
        let mut state = ColumnState::Begin;

        loop {
            let c = self.next_char();

            match state {
                ColumnState::Begin => match c {
                    None => return Ok(self.end_record(value, quoted)),
                    Some(c) if c == self.delimiter => return Ok(Column { text: value, quoted }),
                    Some(' ') if self.trim_if_not_quoted => state = ColumnState::FirstTrim,
                    Some(c) if self.is_quote(c) => {
                        quoted = true;
                        state = ColumnState::QuotedValue;
                    }
                    Some(c) => {
                        value.push(c);
                        state = ColumnState::Value;
                    }
                },
                ColumnState::FirstTrim => match c {
                    None => return Ok(self.end_record(value, quoted)),
                    Some(c) if c == self.delimiter => return Ok(Column { text: value, quoted }),
                    Some(c) if self.is_quote(c) => {
                        quoted = true;
                        state = ColumnState::QuotedValue;
                    }
                    Some(' ') => {}
                    Some(c) => {
                        value.push(c);
                        state = ColumnState::Value;
                    }
                },
                ColumnState::Value => match c {
                    None => return Ok(self.end_record(value, quoted)),
                    Some(c) if c == self.delimiter => return Ok(Column { text: value, quoted }),
                    Some(' ') if self.trim_if_not_quoted => {
                        trim_mark = value.len();
                        value.push(' ');
                        state = ColumnState::LastTrimOrValue;
                    }
                    Some(c) => value.push(c),
                },
                ColumnState::LastTrimOrValue => match c {
                    None => {
                        value.truncate(trim_mark);
                        return Ok(self.end_record(value, quoted));
                    }
                    Some(c) if c == self.delimiter => {
                        value.truncate(trim_mark);
                        return Ok(Column { text: value, quoted });
                    }
                    Some(' ') => value.push(' '),
                    Some(c) => {
                        value.push(c);
                        state = ColumnState::Value;
                    }
                },
                ColumnState::QuotedValue => match c {
                    None => {
                        value.push_str(self.newline);
                        self.check_quoted_size(&value)?;
                        if !self.next_line_in_quoted_value() {
                            return Err(TokenizeError::InvalidValue {
                                line: self.line_number,
                                message: "unexpected end of input while reading a quoted value"
                                    .to_string(),
                            });
                        }
                    }
                    Some(c) if self.is_quote(c) => match self.peek_char() {
                        Some(next) if self.is_quote(next) => {
                            self.pos += next.len_utf8();
                            value.push(next);
                            self.check_quoted_size(&value)?;
                        }
                        _ => state = ColumnState::AfterQuotedValue,
                    },
                    Some(c) if self.is_escape(c) => {
                        match self.peek_char() {
                            Some(next)
                                if self.is_quote(next)
                                    || self.is_escape(next)
                                    || next == self.delimiter =>
                            {
                                self.pos += next.len_utf8();
                                value.push(next);
                            }
                            // a lone escape character is literal
                            _ => value.push(c),
                        }
                        self.check_quoted_size(&value)?;
                    }
                    Some(c) => {
                        value.push(c);
                        self.check_quoted_size(&value)?;
                    }
                },
                ColumnState::AfterQuotedValue => match c {
                    None => return Ok(self.end_record(value, quoted)),
                    Some(c) if c == self.delimiter => {
                        self.quoted_value_lines.clear();
                        return Ok(Column { text: value, quoted });
                    }
                    Some(' ') => {}
                    Some(c) => {
                        return Err(TokenizeError::InvalidValue {
                            line: self.line_number,
                            message: format!(
                                "unexpected extra character '{c}' after a value quoted by '{}'",
                                self.quote.unwrap_or('"')
                            ),
                        });
                    }
                },
            }
        }
    }

    /// Abandon the current record after a tokenizing fault.
    ///
    /// Returns the raw text of the physical line the record started on. Lines
    /// that were consumed by an unfinished multi-line quoted value are pushed
    /// back and tokenized again, so a stray quote only costs one line.
    pub fn skip_current_record(&mut self) -> String {
        let skipped = if self.quoted_value_lines.is_empty() {
            std::mem::take(&mut self.line)
        } else {
            let mut consumed = std::mem::take(&mut self.quoted_value_lines).into_iter();
            let first = consumed.next().unwrap_or_default();
            let mut pushed_back: Vec<String> = consumed.collect();
            if self.line_valid {
                pushed_back.push(std::mem::take(&mut self.line));
            }
            self.line_number -= pushed_back.len() as u64;
            for line in pushed_back.into_iter().rev() {
                self.unread.push_front(line);
            }
            first
        };

        self.line_valid = false;
        self.pos = 0;
        self.record_state = RecordState::End;
        skipped
    }

    fn end_record(&mut self, text: String, quoted: bool) -> Column {
        self.record_state = RecordState::End;
        self.quoted_value_lines.clear();
        Column { text, quoted }
    }

    fn check_quoted_size(&self, value: &str) -> Result<(), TokenizeError> {
        if value.len() > self.max_quoted_size_limit {
            return Err(TokenizeError::QuotedSizeLimitExceeded {
                line: self.line_number,
                limit: self.max_quoted_size_limit,
            });
        }
        Ok(())
    }

    fn is_quote(&self, c: char) -> bool {
        self.quote == Some(c)
    }

    fn is_escape(&self, c: char) -> bool {
        self.escape == Some(c)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.line[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn peek_char(&self) -> Option<char> {
        self.line[self.pos..].chars().next()
    }

    fn read_line(&mut self) -> Option<String> {
        self.unread.pop_front().or_else(|| self.lines.next())
    }

    fn next_line(&mut self, skip_empty_lines: bool) -> bool {
        loop {
            let Some(line) = self.read_line() else {
                self.line.clear();
                self.line_valid = false;
                self.pos = 0;
                return false;
            };

            self.line = line;
            self.line_valid = true;
            self.pos = 0;
            self.line_number += 1;

            let skip = skip_empty_lines
                && (self.line.is_empty()
                    || self.comment_line_marker.as_deref().is_some_and(|marker| {
                        is_comment_line(
                            &self.line,
                            marker,
                            self.delimiter,
                            self.quote,
                            self.null_string.as_deref(),
                        )
                    }));
            if !skip {
                return true;
            }
        }
    }

    fn next_line_in_quoted_value(&mut self) -> bool {
        let previous = std::mem::take(&mut self.line);
        self.quoted_value_lines.push(previous);
        self.next_line(false)
    }
}
