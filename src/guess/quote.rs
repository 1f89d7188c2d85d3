//! Quote and escape character detection.

use super::best_candidate;
use super::regexes::{
    count_column_matches, escape_sequence, quote_inside_unquoted, quoted_without_inner_delimiter,
    quoted_without_inner_quote,
};

/// Quote characters tried, in tie-break order.
pub const QUOTE_CANDIDATES: [char; 2] = ['"', '\''];

/// Escape characters tried, in tie-break order.
pub const ESCAPE_CANDIDATES: [char; 2] = ['\\', '"'];

/// Average per-line weight a quote needs to be accepted.
pub const MIN_QUOTE_WEIGHT: f64 = 10.0;

const NO_INNER_QUOTE_WEIGHT: usize = 20;
const NO_INNER_DELIMITER_WEIGHT: usize = 40;

/// Score every quote candidate.
///
/// Each line containing the quote scores its occurrence count plus bonuses
/// for whole columns that are cleanly quoted. The score is the average over
/// those lines.
pub fn quote_scores(lines: &[String], delimiter: char) -> Vec<(char, f64)> {
    QUOTE_CANDIDATES
        .iter()
        .map(|&quote| (quote, quote_weight(lines, delimiter, quote)))
        .collect()
}

fn quote_weight(lines: &[String], delimiter: char, quote: char) -> f64 {
    let (Some(no_inner_quote), Some(no_inner_delimiter)) = (
        quoted_without_inner_quote(delimiter, quote),
        quoted_without_inner_delimiter(delimiter, quote),
    ) else {
        return 0.0;
    };

    let weights: Vec<usize> = lines
        .iter()
        .filter_map(|line| {
            let count = line.matches(quote).count();
            if count == 0 {
                return None;
            }
            Some(
                count
                    + NO_INNER_QUOTE_WEIGHT * count_column_matches(&no_inner_quote, line, delimiter)
                    + NO_INNER_DELIMITER_WEIGHT
                        * count_column_matches(&no_inner_delimiter, line, delimiter),
            )
        })
        .collect();

    if weights.is_empty() {
        0.0
    } else {
        weights.iter().sum::<usize>() as f64 / weights.len() as f64
    }
}

/// Returns true if `quote` shows up inside an unquoted value on any line,
/// meaning the data cannot be read with that quote enabled.
pub fn force_no_quote(lines: &[String], delimiter: char, quote: char) -> bool {
    quote_inside_unquoted(delimiter, quote).is_some_and(|re| lines.iter().any(|line| re.is_match(line)))
}

/// Guess the quote character.
///
/// Without a convincing candidate quoting stays at `"`, unless a stray `"`
/// inside an unquoted value forces quoting off.
pub fn guess_quote(lines: &[String], delimiter: char) -> Option<char> {
    if let Some((quote, weight)) = best_candidate(quote_scores(lines, delimiter))
        .filter(|(_, weight)| *weight >= MIN_QUOTE_WEIGHT)
    {
        tracing::debug!(?quote, weight, "guessed quote");
        return Some(quote);
    }

    if force_no_quote(lines, delimiter, '"') {
        tracing::debug!("'\"' appears inside unquoted values, disabling quoting");
        None
    } else {
        Some('"')
    }
}

/// Count escape sequences for every escape candidate.
pub fn escape_scores(lines: &[String], delimiter: char, quote: char) -> Vec<(char, f64)> {
    ESCAPE_CANDIDATES
        .iter()
        .map(|&escape| {
            let count = escape_sequence(escape.encode_utf8(&mut [0; 4]), delimiter, quote)
                .map_or(0, |re| {
                    lines
                        .iter()
                        .map(|line| re.find_iter(line).count())
                        .sum::<usize>()
                });
            (escape, count as f64)
        })
        .collect()
}

/// Guess the escape character for an enabled quote.
///
/// Falls back to `"` when the quote is `"` (doubled quotes), otherwise to no
/// escaping.
pub fn guess_escape(lines: &[String], delimiter: char, quote: char) -> Option<char> {
    match best_candidate(escape_scores(lines, delimiter, quote)).filter(|(_, count)| *count > 0.0) {
        Some((escape, count)) => {
            tracing::debug!(?escape, count, "guessed escape");
            Some(escape)
        }
        None if quote == '"' => Some('"'),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_double_quote() {
        let sample = lines("\"id\",\"name\"\n1,\"a, b\"\n2,\"c\"");
        assert_eq!(guess_quote(&sample, ','), Some('"'));
    }

    #[test]
    fn test_single_quote() {
        let sample = lines("id,name\n1,'a, b'\n2,'c'");
        assert_eq!(guess_quote(&sample, ','), Some('\''));
    }

    #[test]
    fn test_apostrophes_are_not_quotes() {
        let sample = lines("id,text\n1,it's fine\n2,don't");
        let scores = quote_scores(&sample, ',');
        assert!(scores[1].1 < MIN_QUOTE_WEIGHT);
        assert_eq!(guess_quote(&sample, ','), Some('"'));
    }

    #[test]
    fn test_force_no_quote() {
        let sample = lines("name,height\nbob,5'10\"\nann,5'2\"");
        assert_eq!(guess_quote(&sample, ','), None);
    }

    #[test]
    fn test_escape_backslash() {
        let sample = lines("1,\"say \\\"hi\\\"\"\n2,\"a \\\"b\\\" c\"");
        assert_eq!(guess_escape(&sample, ',', '"'), Some('\\'));
    }

    #[test]
    fn test_escape_fallbacks() {
        assert_eq!(guess_escape(&lines("a,b\n1,2"), ',', '"'), Some('"'));
        assert_eq!(guess_escape(&lines("a,b\n1,2"), ',', '\''), None);
    }
}
