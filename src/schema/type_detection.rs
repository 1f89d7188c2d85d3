//! Type detection for sample values and columns.

use std::sync::LazyLock;

use regex::Regex;

use super::guessed_type::GuessedType;
use super::time_format::{guess_time_format, match_time};
use crate::tokenizer::Record;

/// Strict double syntax: no leading zeros, no bare dots, optional exponent.
static DOUBLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:NaN|Infinity|(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)$")
        .expect("Invalid double pattern")
});

const TRUE_STRINGS: [&str; 13] = [
    "true", "True", "TRUE", "yes", "Yes", "YES", "t", "T", "y", "Y", "on", "On", "ON",
];

const FALSE_STRINGS: [&str; 13] = [
    "false", "False", "FALSE", "no", "No", "NO", "f", "F", "n", "N", "off", "Off", "OFF",
];

#[inline]
fn is_boolean(value: &str) -> bool {
    TRUE_STRINGS.contains(&value) || FALSE_STRINGS.contains(&value)
}

/// Exact i64 round trip, so `+1` and `007` are not longs.
#[inline]
fn is_long(value: &str) -> bool {
    value
        .parse::<i64>()
        .is_ok_and(|n| n.to_string() == value)
}

#[inline]
fn is_json_container(value: &str) -> bool {
    value.starts_with(['{', '['])
        && serde_json::from_str::<serde_json::Value>(value)
            .is_ok_and(|json| json.is_object() || json.is_array())
}

/// Classify one value. `None` stands for null.
pub fn classify(value: Option<&str>) -> Option<GuessedType> {
    let value = value?;
    if value.is_empty() {
        return None;
    }

    if is_boolean(value) {
        return Some(GuessedType::Boolean);
    }

    if let Some(found) = match_time(value) {
        return Some(GuessedType::Timestamp(found.format()));
    }

    if is_long(value) {
        return Some(GuessedType::Long);
    }

    if DOUBLE_PATTERN.is_match(value) {
        return Some(GuessedType::Double);
    }

    if is_json_container(value) {
        return Some(GuessedType::Json);
    }

    Some(GuessedType::String)
}

/// Merged type of one column across rows.
#[derive(Debug, Clone, Default)]
struct ColumnAccumulator<'a> {
    merged: Option<GuessedType>,
    timestamps: Vec<&'a str>,
}

impl<'a> ColumnAccumulator<'a> {
    fn add(&mut self, value: Option<&'a str>) {
        let guessed = classify(value);
        if let (Some(GuessedType::Timestamp(_)), Some(text)) = (&guessed, value) {
            self.timestamps.push(text);
        }
        self.merged = GuessedType::merge_nullable(self.merged.take(), guessed);
    }

    fn finish(self) -> Option<GuessedType> {
        match self.merged {
            Some(GuessedType::Timestamp(format)) => Some(GuessedType::Timestamp(
                guess_time_format(self.timestamps).unwrap_or(format),
            )),
            other => other,
        }
    }
}

/// Guess the type of every column over `rows`.
///
/// Rows may be ragged; the result has as many entries as the widest row.
/// A column with only nulls stays `None`. Timestamp columns get one format
/// consolidated over all of their values.
pub fn guess_column_types<'a>(rows: impl IntoIterator<Item = &'a Record>) -> Vec<Option<GuessedType>> {
    let mut columns: Vec<ColumnAccumulator<'a>> = Vec::new();

    for row in rows {
        if columns.len() < row.len() {
            columns.resize_with(row.len(), ColumnAccumulator::default);
        }
        for (column, value) in columns.iter_mut().zip(row) {
            column.add(value.as_deref());
        }
    }

    columns.into_iter().map(ColumnAccumulator::finish).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Record {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(None), None);
        assert_eq!(classify(Some("")), None);
        assert_eq!(classify(Some("true")), Some(GuessedType::Boolean));
        assert_eq!(classify(Some("OFF")), Some(GuessedType::Boolean));
        assert_eq!(classify(Some("42")), Some(GuessedType::Long));
        assert_eq!(classify(Some("-7")), Some(GuessedType::Long));
        assert_eq!(classify(Some("3.14")), Some(GuessedType::Double));
        assert_eq!(classify(Some("1e10")), Some(GuessedType::Double));
        assert_eq!(classify(Some("-Infinity")), Some(GuessedType::Double));
        assert_eq!(classify(Some(r#"{"a":1}"#)), Some(GuessedType::Json));
        assert_eq!(classify(Some("[1,2]")), Some(GuessedType::Json));
        assert_eq!(
            classify(Some("2024-01-15")),
            Some(GuessedType::Timestamp("%Y-%m-%d".to_string()))
        );
        assert_eq!(classify(Some("hello")), Some(GuessedType::String));
    }

    #[test]
    fn test_strict_numbers() {
        assert_eq!(classify(Some("007")), Some(GuessedType::String));
        assert_eq!(classify(Some("+1")), Some(GuessedType::Double));
        assert_eq!(classify(Some(".5")), Some(GuessedType::String));
        assert_eq!(classify(Some("1.")), Some(GuessedType::String));
        assert_eq!(classify(Some("1,5")), Some(GuessedType::String));
        assert_eq!(classify(Some("99999999999999999999")), Some(GuessedType::Double));
        assert_eq!(classify(Some("1")), Some(GuessedType::Long));
    }

    #[test]
    fn test_column_widening() {
        let rows = vec![row(&["1", "a"]), row(&["2", "b"])];
        assert_eq!(
            guess_column_types(&rows),
            vec![Some(GuessedType::Long), Some(GuessedType::String)]
        );

        let rows = vec![row(&["1", "a"]), row(&["2", "b"]), row(&["3.14", "c"])];
        assert_eq!(
            guess_column_types(&rows),
            vec![Some(GuessedType::Double), Some(GuessedType::String)]
        );
    }

    #[test]
    fn test_nulls_and_ragged_rows() {
        let rows = vec![row(&["", "x"]), row(&["5"]), row(&["", "", "true"])];
        assert_eq!(
            guess_column_types(&rows),
            vec![
                Some(GuessedType::Long),
                Some(GuessedType::String),
                Some(GuessedType::Boolean)
            ]
        );

        let rows = vec![row(&["", "1"]), row(&["", "2"])];
        assert_eq!(guess_column_types(&rows), vec![None, Some(GuessedType::Long)]);
    }

    #[test]
    fn test_timestamp_format_consolidated() {
        let rows = vec![
            row(&["2024-01-15 10:00:00"]),
            row(&["2024-01-16 10:00:00.5"]),
        ];
        assert_eq!(
            guess_column_types(&rows),
            vec![Some(GuessedType::Timestamp("%Y-%m-%d %H:%M:%S.%N".to_string()))]
        );
    }
}
