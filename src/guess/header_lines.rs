//! Detection of preamble lines before the table.

use super::split_records;
use crate::dialect::Dialect;

/// Most lines that may be skipped.
pub const MAX_SKIP_HEADER_LINES: usize = 10;

/// Lines after a candidate start that must not be wider than it.
pub const NO_SKIP_DETECT_LINES: usize = 10;

/// Column count of every record, blank lines included. Rejected records
/// count as zero columns.
pub fn column_counts(lines: &[String], dialect: &Dialect) -> Vec<usize> {
    split_records(lines, dialect, false)
        .iter()
        .map(|record| record.as_ref().map_or(0, Vec::len))
        .collect()
}

/// Find how many leading lines to skip.
///
/// Line `i - 1` starts the table when none of the following
/// [`NO_SKIP_DETECT_LINES`] lines has more columns than it.
pub fn guess_skip_header_lines(counts: &[usize]) -> usize {
    let last = MAX_SKIP_HEADER_LINES.min(counts.len().saturating_sub(1));

    for i in 1..=last {
        let window = &counts[i..counts.len().min(i + NO_SKIP_DETECT_LINES)];
        if window.iter().all(|&count| count <= counts[i - 1]) {
            if i > 1 {
                tracing::debug!(skip = i - 1, "guessed skip header lines");
            }
            return i - 1;
        }
    }

    0
}
