//! Comment line marker detection.

use super::best_candidate;
use crate::dialect::Dialect;
use crate::tokenizer::is_comment_line;

/// Comment markers tried, in tie-break order.
pub const COMMENT_LINE_MARKER_CANDIDATES: [&str; 2] = ["#", "//"];

fn is_comment(line: &str, marker: &str, dialect: &Dialect) -> bool {
    is_comment_line(
        line,
        marker,
        dialect.delimiter,
        dialect.quote,
        dialect.null_string.as_deref(),
    )
}

/// Count the lines starting with each marker.
///
/// Lines starting with the quote character, or whose first column is the null
/// string, are never comments.
pub fn comment_scores(lines: &[String], dialect: &Dialect) -> Vec<(&'static str, f64)> {
    COMMENT_LINE_MARKER_CANDIDATES
        .iter()
        .map(|&marker| {
            let count = lines
                .iter()
                .filter(|line| is_comment(line, marker, dialect))
                .count();
            (marker, count as f64)
        })
        .collect()
}

/// Guess the comment line marker.
pub fn guess_comment_line_marker(lines: &[String], dialect: &Dialect) -> Option<String> {
    let (marker, count) =
        best_candidate(comment_scores(lines, dialect)).filter(|(_, count)| *count > 0.0)?;
    tracing::debug!(marker, count, "guessed comment line marker");
    Some(marker.to_string())
}

/// Drop the lines the tokenizer would skip as comments under `marker`.
pub fn strip_comment_lines(lines: &mut Vec<String>, marker: &str, dialect: &Dialect) {
    lines.retain(|line| !is_comment(line, marker, dialect));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_hash_and_slash_markers() {
        let sample = lines("# one\na,b\n# two\n1,2");
        assert_eq!(
            guess_comment_line_marker(&sample, &Dialect::default()).as_deref(),
            Some("#")
        );

        let sample = lines("// header\na,b\n1,2");
        assert_eq!(
            guess_comment_line_marker(&sample, &Dialect::default()).as_deref(),
            Some("//")
        );
    }

    #[test]
    fn test_null_string_lines_are_not_comments() {
        let dialect = Dialect {
            null_string: Some("#N/A".to_string()),
            ..Dialect::default()
        };
        let sample = lines("a,b\n#N/A,1\n#N/A,2");
        assert_eq!(guess_comment_line_marker(&sample, &dialect), None);
    }

    #[test]
    fn test_quoted_lines_are_not_comments() {
        let dialect = Dialect {
            quote: Some('#'),
            ..Dialect::default()
        };
        let sample = lines("#a#,b\n#c#,d");
        assert_eq!(guess_comment_line_marker(&sample, &dialect), None);
    }

    #[test]
    fn test_strip_comment_lines() {
        let mut sample = lines("# one\na,b\n# two\n1,2");
        strip_comment_lines(&mut sample, "#", &Dialect::default());
        assert_eq!(sample, vec!["a,b", "1,2"]);
    }

    #[test]
    fn test_strip_keeps_null_string_lines() {
        let dialect = Dialect {
            null_string: Some("#N/A".to_string()),
            ..Dialect::default()
        };
        let mut sample = lines("# note\na,b\n#N/A,1\n2,#N/A");
        strip_comment_lines(&mut sample, "#", &dialect);
        assert_eq!(sample, vec!["a,b", "#N/A,1", "2,#N/A"]);
    }
}
