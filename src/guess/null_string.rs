//! Null string detection.

use super::best_candidate;
use super::regexes::{count_column_matches, whole_column};

/// Null tokens tried, in tie-break order.
pub const NULL_STRING_CANDIDATES: [&str; 4] = ["null", "NULL", "#N/A", "\\N"];

/// Count whole-column occurrences of every null token.
pub fn null_string_scores(lines: &[String], delimiter: char) -> Vec<(&'static str, f64)> {
    NULL_STRING_CANDIDATES
        .iter()
        .map(|&token| {
            let count = whole_column(token, delimiter).map_or(0, |re| {
                lines
                    .iter()
                    .map(|line| count_column_matches(&re, line, delimiter))
                    .sum::<usize>()
            });
            (token, count as f64)
        })
        .collect()
}

/// Guess the null string, if any token appears as a whole column.
pub fn guess_null_string(lines: &[String], delimiter: char) -> Option<String> {
    let (token, count) =
        best_candidate(null_string_scores(lines, delimiter)).filter(|(_, count)| *count > 0.0)?;
    tracing::debug!(token, count, "guessed null string");
    Some(token.to_string())
}
