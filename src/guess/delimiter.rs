//! Delimiter detection by per-line count consistency.

use super::best_candidate;

/// Delimiters tried, in tie-break order.
pub const DELIMITER_CANDIDATES: [char; 4] = [',', '\t', '|', ';'];

/// A delimiter is only accepted above this weight.
pub const MIN_DELIMITER_WEIGHT: f64 = 1.0;

const MIN_STDDEV: f64 = 1e-9;

/// Score every candidate: total occurrences over the population standard
/// deviation of the per-line counts. Blank lines are ignored.
pub fn delimiter_scores(lines: &[String]) -> Vec<(char, f64)> {
    DELIMITER_CANDIDATES
        .iter()
        .map(|&delimiter| (delimiter, delimiter_weight(lines, delimiter)))
        .collect()
}

fn delimiter_weight(lines: &[String], delimiter: char) -> f64 {
    let counts: Vec<f64> = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.matches(delimiter).count() as f64)
        .collect();

    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return 0.0;
    }

    let n = counts.len() as f64;
    let mean = total / n;
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;

    total / variance.sqrt().max(MIN_STDDEV)
}

/// Guess the delimiter, falling back to `,`.
pub fn guess_delimiter(lines: &[String]) -> char {
    match best_candidate(delimiter_scores(lines)) {
        Some((delimiter, weight)) if weight > MIN_DELIMITER_WEIGHT => {
            tracing::debug!(?delimiter, weight, "guessed delimiter");
            delimiter
        }
        _ => {
            tracing::debug!("no delimiter stands out, using ','");
            ','
        }
    }
}
