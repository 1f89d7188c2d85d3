//! Timestamp format detection.
//!
//! Each text is matched against an ordered list of layouts. A match carries
//! the strftime-style format plus a group key; matches in the same group
//! differ only in fraction or zone and can be merged into one format.

use std::sync::LazyLock;

use foldhash::{HashMap, HashMapExt};
use regex::{Captures, Regex};

const MONTHS: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec";
const WEEKDAYS: &str = "Mon|Tue|Wed|Thu|Fri|Sat|Sun";

/// `2024-01-15`, `2024/01/15 10:30`, `2024.01.15T10:30:00.123+09:00`, ...
static ISO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<y>\d{4})(?P<s1>[-/.])(?P<m>\d{1,2})(?P<s2>[-/.])(?P<d>\d{1,2})(?:(?P<dt>[T ])(?P<h>\d{1,2}):(?P<mi>\d{2})(?::(?P<s>\d{2})(?:\.(?P<frac>\d{1,9}))?)?(?P<zone>\s*(?:Z|[+-]\d{2}:\d{2}|[+-]\d{4}|[A-Z]{3,4}))?)?$",
    )
    .expect("Invalid ISO timestamp pattern")
});

/// `12/31/2024` and `31/12/2024`, with an optional time.
static SLASH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<a>\d{1,2})/(?P<b>\d{1,2})/(?P<y>\d{4})(?: (?P<h>\d{1,2}):(?P<mi>\d{2})(?::(?P<s>\d{2}))?)?$",
    )
    .expect("Invalid slash date pattern")
});

/// `Tue, 15 Nov 1994 08:12:31 GMT`
static RFC2822_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:(?P<wd>{WEEKDAYS}), )?(?P<d>\d{{1,2}}) (?:{MONTHS}) \d{{4}} (?P<h>\d{{2}}):(?P<mi>\d{{2}})(?::(?P<s>\d{{2}}))?(?P<zone> (?:[+-]\d{{4}}|[A-Z]{{2,4}}))$"
    ))
    .expect("Invalid RFC 2822 pattern")
});

/// `10/Oct/2000:13:55:36 -0700`
static APACHE_CLF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\d{{2}}/(?:{MONTHS})/\d{{4}}:\d{{2}}:\d{{2}}:\d{{2}}(?P<zone> [+-]\d{{4}})$"
    ))
    .expect("Invalid Apache CLF pattern")
});

/// `Sun Nov  6 08:49:37 1994`
static ASCTIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:{WEEKDAYS}) (?:{MONTHS}) [ \d]\d \d{{2}}:\d{{2}}:\d{{2}} \d{{4}}$"
    ))
    .expect("Invalid asctime pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ZoneStyle {
    /// `Z`, `+0900`
    Offset,
    /// `+09:00`
    ColonOffset,
    /// `UTC`, `JST`
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Zone {
    spaced: bool,
    style: ZoneStyle,
}

impl Zone {
    fn parse(text: &str) -> Self {
        let spaced = text.starts_with(char::is_whitespace);
        let zone = text.trim_start();
        let style = if zone == "Z" || (zone.len() == 5 && zone.starts_with(['+', '-'])) {
            ZoneStyle::Offset
        } else if zone.starts_with(['+', '-']) {
            ZoneStyle::ColonOffset
        } else {
            ZoneStyle::Name
        };
        Self { spaced, style }
    }

    fn format(&self) -> String {
        let space = if self.spaced { " " } else { "" };
        let directive = match self.style {
            ZoneStyle::Offset => "%z",
            ZoneStyle::ColonOffset => "%:z",
            ZoneStyle::Name => "%Z",
        };
        format!("{space}{directive}")
    }
}

/// One text matched against a timestamp layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
    /// Format up to and including the seconds.
    head: String,
    /// Whether the text had fractional seconds.
    fraction: bool,
    zone: Option<Zone>,
    /// Format after the zone.
    tail: String,
}

impl TimeMatch {
    fn new(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            fraction: false,
            zone: None,
            tail: String::new(),
        }
    }

    fn with_zone(mut self, caps: &Captures<'_>) -> Self {
        self.zone = caps.name("zone").map(|z| Zone::parse(z.as_str()));
        self
    }

    /// Matches in the same group only differ in fraction or zone.
    pub fn group(&self) -> String {
        format!("{}|{}", self.head, self.tail)
    }

    /// Full format of this match.
    pub fn format(&self) -> String {
        let mut format = self.head.clone();
        if self.fraction {
            format.push_str(".%N");
        }
        if let Some(zone) = self.zone {
            format.push_str(&zone.format());
        }
        format.push_str(&self.tail);
        format
    }

    /// Merge matches of one group into a single match.
    fn merge(group: &[&TimeMatch]) -> Option<TimeMatch> {
        let first = group.first()?;
        let mut merged = (*first).clone();
        merged.fraction = group.iter().any(|m| m.fraction);

        if group.iter().any(|m| m.zone != first.zone) {
            let spaced = group
                .iter()
                .find_map(|m| m.zone)
                .is_some_and(|zone| zone.spaced);
            merged.zone = Some(Zone {
                spaced,
                style: ZoneStyle::Offset,
            });
        }

        Some(merged)
    }
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().trim().parse().ok()
}

fn valid_time(caps: &Captures<'_>) -> bool {
    let hour_ok = number(caps, "h").is_none_or(|h| h <= 23);
    let minute_ok = number(caps, "mi").is_none_or(|m| m <= 59);
    let second_ok = number(caps, "s").is_none_or(|s| s <= 60);
    hour_ok && minute_ok && second_ok
}

fn time_head(caps: &Captures<'_>, separator: &str) -> String {
    match (caps.name("h"), caps.name("s")) {
        (Some(_), Some(_)) => format!("{separator}%H:%M:%S"),
        (Some(_), None) => format!("{separator}%H:%M"),
        _ => String::new(),
    }
}

fn match_iso(text: &str) -> Option<TimeMatch> {
    let caps = ISO_PATTERN.captures(text)?;
    let separator = caps.name("s1")?.as_str();
    if separator != caps.name("s2")?.as_str() {
        return None;
    }
    let month = number(&caps, "m")?;
    let day = number(&caps, "d")?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || !valid_time(&caps) {
        return None;
    }

    let date_time = caps.name("dt").map_or("", |m| m.as_str());
    let head = format!(
        "%Y{separator}%m{separator}%d{}",
        time_head(&caps, date_time)
    );
    let mut found = TimeMatch::new(head).with_zone(&caps);
    found.fraction = caps.name("frac").is_some();
    Some(found)
}

fn match_slash(text: &str) -> Option<TimeMatch> {
    let caps = SLASH_PATTERN.captures(text)?;
    let first = number(&caps, "a")?;
    let second = number(&caps, "b")?;
    if first == 0 || second == 0 || !valid_time(&caps) {
        return None;
    }

    let date = if first <= 12 && second <= 31 {
        "%m/%d/%Y"
    } else if first <= 31 && second <= 12 {
        "%d/%m/%Y"
    } else {
        return None;
    };
    Some(TimeMatch::new(format!("{date}{}", time_head(&caps, " "))))
}

fn match_rfc2822(text: &str) -> Option<TimeMatch> {
    let caps = RFC2822_PATTERN.captures(text)?;
    if !number(&caps, "d").is_some_and(|d| (1..=31).contains(&d)) || !valid_time(&caps) {
        return None;
    }

    let weekday = if caps.name("wd").is_some() { "%a, " } else { "" };
    let head = format!("{weekday}%d %b %Y{}", time_head(&caps, " "));
    Some(TimeMatch::new(head).with_zone(&caps))
}

fn match_apache_clf(text: &str) -> Option<TimeMatch> {
    let caps = APACHE_CLF_PATTERN.captures(text)?;
    Some(TimeMatch::new("%d/%b/%Y:%H:%M:%S").with_zone(&caps))
}

fn match_asctime(text: &str) -> Option<TimeMatch> {
    ASCTIME_PATTERN.is_match(text).then(|| {
        let mut found = TimeMatch::new("%a %b %e %H:%M:%S");
        found.tail = " %Y".to_string();
        found
    })
}

/// Match `text` against the known layouts, first match wins.
///
/// The whole text must match; surrounding spaces are not skipped.
pub fn match_time(text: &str) -> Option<TimeMatch> {
    match_iso(text)
        .or_else(|| match_slash(text))
        .or_else(|| match_rfc2822(text))
        .or_else(|| match_apache_clf(text))
        .or_else(|| match_asctime(text))
}

/// Guess one format for a set of timestamp texts.
///
/// Texts are grouped by layout; the largest group wins (the group seen first
/// on a tie) and its matches are merged into the returned format.
pub fn guess_time_format<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let matches: Vec<TimeMatch> = texts.into_iter().filter_map(match_time).collect();

    match matches.as_slice() {
        [] => return None,
        [only] => return Some(only.format()),
        _ => {}
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<&TimeMatch>> = Vec::new();
    for found in &matches {
        let slot = *index.entry(found.group()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(found);
    }

    let mut best: Option<&Vec<&TimeMatch>> = None;
    for group in &groups {
        if best.is_none_or(|b| group.len() > b.len()) {
            best = Some(group);
        }
    }

    best.and_then(|group| TimeMatch::merge(group)).map(|m| m.format())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_of(text: &str) -> Option<String> {
        match_time(text).map(|m| m.format())
    }

    #[test]
    fn test_iso_variants() {
        assert_eq!(format_of("2024-01-15").as_deref(), Some("%Y-%m-%d"));
        assert_eq!(format_of("2024/01/15").as_deref(), Some("%Y/%m/%d"));
        assert_eq!(format_of("2024.1.5").as_deref(), Some("%Y.%m.%d"));
        assert_eq!(
            format_of("2024-01-15 10:30").as_deref(),
            Some("%Y-%m-%d %H:%M")
        );
        assert_eq!(
            format_of("2024-01-15T10:30:00Z").as_deref(),
            Some("%Y-%m-%dT%H:%M:%S%z")
        );
        assert_eq!(
            format_of("2024-01-15T10:30:00.123+09:00").as_deref(),
            Some("%Y-%m-%dT%H:%M:%S.%N%:z")
        );
        assert_eq!(
            format_of("2024-01-15 10:30:00 UTC").as_deref(),
            Some("%Y-%m-%d %H:%M:%S %Z")
        );
        assert_eq!(
            format_of("2024-01-15 10:30:00 +0900").as_deref(),
            Some("%Y-%m-%d %H:%M:%S %z")
        );
    }

    #[test]
    fn test_rejects_invalid_dates() {
        assert_eq!(format_of("2024-13-01"), None);
        assert_eq!(format_of("2024-01/15"), None);
        assert_eq!(format_of("2024-01-15 25:00"), None);
        assert_eq!(format_of("20240115"), None);
        assert_eq!(format_of("hello"), None);
    }

    #[test]
    fn test_padded_text_does_not_match() {
        assert_eq!(format_of(" 2024-01-15"), None);
        assert_eq!(format_of("2024-01-15 "), None);
        assert_eq!(format_of(" 12/31/2024"), None);
    }

    #[test]
    fn test_slash_dates() {
        assert_eq!(format_of("12/31/2024").as_deref(), Some("%m/%d/%Y"));
        assert_eq!(format_of("31/12/2024").as_deref(), Some("%d/%m/%Y"));
        assert_eq!(
            format_of("1/2/2024 08:15:00").as_deref(),
            Some("%m/%d/%Y %H:%M:%S")
        );
        assert_eq!(format_of("31/31/2024"), None);
    }

    #[test]
    fn test_other_layouts() {
        assert_eq!(
            format_of("Tue, 15 Nov 1994 08:12:31 GMT").as_deref(),
            Some("%a, %d %b %Y %H:%M:%S %Z")
        );
        assert_eq!(
            format_of("15 Nov 1994 08:12:31 +0000").as_deref(),
            Some("%d %b %Y %H:%M:%S %z")
        );
        assert_eq!(
            format_of("10/Oct/2000:13:55:36 -0700").as_deref(),
            Some("%d/%b/%Y:%H:%M:%S %z")
        );
        assert_eq!(
            format_of("Sun Nov  6 08:49:37 1994").as_deref(),
            Some("%a %b %e %H:%M:%S %Y")
        );
    }

    #[test]
    fn test_merge_fraction_and_zone() {
        let texts = [
            "2024-01-15 10:30:00",
            "2024-01-16 11:00:00.250",
            "2024-01-17 12:00:00",
        ];
        assert_eq!(
            guess_time_format(texts).as_deref(),
            Some("%Y-%m-%d %H:%M:%S.%N")
        );

        let texts = ["2024-01-15T10:30:00Z", "2024-01-15T10:30:00+09:00"];
        assert_eq!(
            guess_time_format(texts).as_deref(),
            Some("%Y-%m-%dT%H:%M:%S%z")
        );
    }

    #[test]
    fn test_largest_group_wins() {
        let texts = ["2024-01-15", "2024/01/16", "2024/01/17", "nope"];
        assert_eq!(guess_time_format(texts).as_deref(), Some("%Y/%m/%d"));

        let texts = ["2024-01-15", "2024/01/16"];
        assert_eq!(guess_time_format(texts).as_deref(), Some("%Y-%m-%d"));

        assert_eq!(guess_time_format(["x", "y"]), None);
    }
}
