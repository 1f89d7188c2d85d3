//! Header line detection and column naming.

use super::guessed_type::GuessedType;
use crate::tokenizer::Record;

/// Upper bound on the population variance of value lengths below the first
/// row for the length rule to apply.
pub const HEADER_LENGTH_VARIANCE_MAX: f64 = 0.2;

/// Relative distance between the first row's value length and the mean
/// length below it that marks the first row as a header.
pub const HEADER_LENGTH_DEVIATION_MIN: f64 = 0.7;

fn kinds(types: &[Option<GuessedType>]) -> Vec<Option<&'static str>> {
    types.iter().map(|t| t.as_ref().map(GuessedType::name)).collect()
}

fn value_len(value: &str) -> f64 {
    value.chars().count() as f64
}

/// Returns true if some column has near-constant value lengths below the
/// first row while the first row's value is far from that length.
///
/// Only non-null values are measured.
fn length_outlier(first: &Record, rest: &[Record]) -> bool {
    first.iter().enumerate().any(|(i, head)| {
        let Some(head) = head.as_deref() else {
            return false;
        };
        let lens: Vec<f64> = rest
            .iter()
            .filter_map(|row| row.get(i)?.as_deref())
            .map(value_len)
            .collect();
        if lens.is_empty() {
            return false;
        }

        let n = lens.len() as f64;
        let mean = lens.iter().sum::<f64>() / n;
        let variance = lens.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
        let first_len = value_len(head);

        if variance > HEADER_LENGTH_VARIANCE_MAX {
            false
        } else if mean == 0.0 {
            first_len > 1.0
        } else {
            (mean - first_len).abs() / mean > HEADER_LENGTH_DEVIATION_MIN
        }
    })
}

/// Decide whether the first row is a header.
///
/// It is when its types differ from the rest and it only holds text or
/// booleans, or when one of its values is a length outlier.
pub fn is_header(
    first: &Record,
    first_types: &[Option<GuessedType>],
    rest: &[Record],
    rest_types: &[Option<GuessedType>],
) -> bool {
    if rest.is_empty() {
        return false;
    }

    let textual = first_types
        .iter()
        .all(|t| matches!(t, None | Some(GuessedType::String | GuessedType::Boolean)));
    if textual && kinds(first_types) != kinds(rest_types) {
        return true;
    }

    length_outlier(first, rest)
}

/// Column names from a header row, or `c0, c1, ...` without one.
///
/// Header values are trimmed; missing or empty names are synthesized.
pub fn column_names(header: Option<&Record>, width: usize) -> Vec<String> {
    (0..width)
        .map(|i| {
            header
                .and_then(|row| row.get(i))
                .and_then(|value| value.as_deref())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map_or_else(|| format!("c{i}"), str::to_string)
        })
        .collect()
}
