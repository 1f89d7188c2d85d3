//! Dialect guessing.
//!
//! Each heuristic is a pure scoring function over decoded sample lines that
//! yields `(candidate, score)` pairs; the best pair wins, with the earlier
//! candidate kept on ties. Stages run in a fixed order and every stage sees
//! the dialect refined by the stages before it:
//!
//! 1. delimiter
//! 2. quote (with the force-no-quote fallback)
//! 3. escape
//! 4. null string
//! 5. comment line marker (matching lines are dropped from the sample)
//! 6. skip header lines (the preamble is dropped from the sample)
//!
//! A stage whose field was set explicitly by the caller is skipped.

pub mod comment;
pub mod delimiter;
pub mod header_lines;
pub mod null_string;
pub mod quote;
pub mod regexes;

use crate::dialect::{Dialect, DialectConfig};
use crate::tokenizer::{Record, Tokenizer};

/// Pick the highest scoring candidate. The first candidate wins ties.
pub(crate) fn best_candidate<T>(scores: impl IntoIterator<Item = (T, f64)>) -> Option<(T, f64)> {
    let mut best: Option<(T, f64)> = None;
    for (candidate, score) in scores {
        if best.as_ref().is_none_or(|(_, top)| score > *top) {
            best = Some((candidate, score));
        }
    }
    best
}

/// Tokenize sample lines into records.
///
/// Records the tokenizer rejects are kept as `None` so that positions still
/// line up with the sample.
pub fn split_records(lines: &[String], dialect: &Dialect, skip_empty_lines: bool) -> Vec<Option<Record>> {
    let mut tokenizer = Tokenizer::new(lines.iter().cloned(), dialect);
    let mut records = Vec::new();

    loop {
        match tokenizer.next_record_with(skip_empty_lines) {
            Ok(true) => {}
            Ok(false) => break,
            Err(_) => {
                tokenizer.skip_current_record();
                continue;
            }
        }

        let mut record = Vec::new();
        let mut valid = true;
        while tokenizer.has_next_column() {
            match tokenizer.next_value() {
                Ok(value) => record.push(value),
                Err(err) => {
                    tracing::trace!(line = err.line(), %err, "sample record rejected");
                    tokenizer.skip_current_record();
                    valid = false;
                    break;
                }
            }
        }
        records.push(valid.then_some(record));
    }

    records
}

/// Run every dialect stage not fixed by `config`, refining `dialect` in place.
///
/// Returns the table part of the sample: comment lines and the preamble
/// removed, the optional header line first.
pub fn guess_dialect(mut lines: Vec<String>, config: &DialectConfig, dialect: &mut Dialect) -> Vec<String> {
    if config.delimiter.is_none() {
        dialect.delimiter = delimiter::guess_delimiter(&lines);
    }

    if config.quote.is_none() {
        dialect.quote = quote::guess_quote(&lines, dialect.delimiter);
    }

    if config.escape.is_none() {
        dialect.escape = match dialect.quote {
            Some(q) => quote::guess_escape(&lines, dialect.delimiter, q),
            None => None,
        };
    }

    if config.null_string.is_none() {
        dialect.null_string = null_string::guess_null_string(&lines, dialect.delimiter);
    }

    if config.comment_line_marker.is_none() {
        dialect.comment_line_marker = comment::guess_comment_line_marker(&lines, dialect);
    }
    if let Some(marker) = dialect.comment_line_marker.clone() {
        comment::strip_comment_lines(&mut lines, &marker, dialect);
    }

    if config.skip_header_lines.is_none() {
        let counts = header_lines::column_counts(&lines, dialect);
        dialect.skip_header_lines = header_lines::guess_skip_header_lines(&counts);
    }
    lines.drain(..dialect.skip_header_lines.min(lines.len()));

    lines
}
