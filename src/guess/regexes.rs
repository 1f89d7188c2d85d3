//! Regex patterns for the dialect heuristics.
//!
//! Every pattern depends on the delimiter or quote under test, so they are
//! compiled per call. Candidate characters are escaped, which keeps the
//! patterns valid for any input; a failed compile just scores zero.

use regex::Regex;

fn esc(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

/// Quoted value spanning a whole column with no quote character inside.
pub fn quoted_without_inner_quote(delimiter: char, quote: char) -> Option<Regex> {
    let (d, q) = (esc(delimiter), esc(quote));
    Regex::new(&format!(r"(?:^|{d})\s*{q}[^{q}]*{q}\s*(?:$|{d})")).ok()
}

/// Quoted value spanning a whole column with no delimiter inside.
pub fn quoted_without_inner_delimiter(delimiter: char, quote: char) -> Option<Regex> {
    let (d, q) = (esc(delimiter), esc(quote));
    Regex::new(&format!(r"(?:^|{d})\s*{q}[^{d}]*{q}\s*(?:$|{d})")).ok()
}

/// A quote character appearing inside an unquoted value.
pub fn quote_inside_unquoted(delimiter: char, quote: char) -> Option<Regex> {
    let (d, q) = (esc(delimiter), esc(quote));
    Regex::new(&format!(r"(?:^|{d})\s*[^{q}{d}]+{q}")).ok()
}

/// An escape candidate followed by the delimiter or the quote.
pub fn escape_sequence(escape: &str, delimiter: char, quote: char) -> Option<Regex> {
    let e = regex::escape(escape);
    let (d, q) = (esc(delimiter), esc(quote));
    Regex::new(&format!(r"{e}(?:{d}|{q})")).ok()
}

/// A whole unquoted column equal to `token`.
pub fn whole_column(token: &str, delimiter: char) -> Option<Regex> {
    let t = regex::escape(token);
    let d = esc(delimiter);
    Regex::new(&format!(r"(?:^|{d}){t}(?:$|{d})")).ok()
}

/// Count matches of a column-bounded pattern in `line`.
///
/// Adjacent columns share the delimiter between them, so when a match ends
/// on the delimiter the next search starts at that delimiter again.
pub fn count_column_matches(re: &Regex, line: &str, delimiter: char) -> usize {
    let mut count = 0;
    let mut start = 0;

    while start <= line.len() {
        let Some(m) = re.find_at(line, start) else {
            break;
        };
        if m.is_empty() {
            break;
        }
        count += 1;

        let next = if line[..m.end()].ends_with(delimiter) {
            m.end() - delimiter.len_utf8()
        } else {
            m.end()
        };
        start = if next > m.start() { next } else { m.end() };
    }

    count
}
