//! Charset detection and decoding using chardetng and `encoding_rs`.

use std::fmt;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use simdutf8::basic::from_utf8;

/// Minimum detector confidence (in percent) needed to trust its answer.
pub const MIN_CHARSET_CONFIDENCE: u8 = 50;

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Check if the data starts with a UTF-8 BOM (Byte Order Mark).
///
/// The UTF-8 BOM is the byte sequence: EF BB BF
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.starts_with(&[0xEF, 0xBB, 0xBF])
}

/// Skip the UTF-8 BOM if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    if has_utf8_bom(data) { &data[3..] } else { data }
}

/// A named text encoding, as it appears in a dialect configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Charset(String);

impl Charset {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn utf8() -> Self {
        Self::new("UTF-8")
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The decoder for this charset. Unknown labels decode as UTF-8.
    pub fn encoding(&self) -> &'static Encoding {
        Encoding::for_label(self.0.as_bytes()).unwrap_or(encoding_rs::UTF_8)
    }

    /// Returns true if `encoding_rs` knows this label.
    pub fn is_known(&self) -> bool {
        Encoding::for_label(self.0.as_bytes()).is_some()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best match reported by a [`CharsetDetector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharsetMatch {
    /// Encoding name as reported by the detector.
    pub name: String,
    /// Confidence in percent (0..=100).
    pub confidence: u8,
}

/// Confidence-scored charset detection capability.
///
/// Implementations only look at bytes; normalization of the reported name is
/// done by [`guess_charset`].
pub trait CharsetDetector: Send + Sync + fmt::Debug {
    fn detect(&self, sample: &[u8]) -> Option<CharsetMatch>;
}

/// Default detector backed by chardetng.
///
/// chardetng only reports a guess, so confidence is derived from how cleanly the
/// sample decodes under that guess: the share of non-ASCII characters that did
/// not turn into replacement characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChardetngDetector;

impl CharsetDetector for ChardetngDetector {
    fn detect(&self, sample: &[u8]) -> Option<CharsetMatch> {
        if sample.is_empty() {
            return None;
        }

        if is_utf8(sample) {
            return Some(CharsetMatch {
                name: "UTF-8".to_string(),
                confidence: 100,
            });
        }

        let mut detector = EncodingDetector::new();
        detector.feed(sample, true);
        let encoding = detector.guess(None, true);

        let (decoded, _) = encoding.decode_without_bom_handling(sample);
        let (non_ascii, replaced) = decoded
            .chars()
            .filter(|c| !c.is_ascii())
            .fold((0usize, 0usize), |(all, bad), c| {
                (all + 1, bad + usize::from(c == char::REPLACEMENT_CHARACTER))
            });
        let confidence = if non_ascii == 0 {
            100
        } else {
            100 - (replaced * 100 / non_ascii)
        };

        Some(CharsetMatch {
            name: encoding.name().to_string(),
            confidence: confidence as u8,
        })
    }
}

/// Guess the charset of a sample.
///
/// Low-confidence results fall back to UTF-8. Latin-1 family answers are
/// reported as UTF-8 since small samples rarely contain enough non-ASCII text
/// to tell them apart, and Shift_JIS is widened to its MS932 superset.
pub fn guess_charset(detector: &dyn CharsetDetector, sample: &[u8]) -> Charset {
    let sample = skip_bom(sample);

    let Some(found) = detector.detect(sample) else {
        return Charset::utf8();
    };

    if found.confidence < MIN_CHARSET_CONFIDENCE {
        tracing::debug!(
            name = %found.name,
            confidence = found.confidence,
            "charset confidence too low, using UTF-8"
        );
        return Charset::utf8();
    }

    let name = match found.name.to_ascii_uppercase().as_str() {
        "ISO-8859-1" | "WINDOWS-1252" | "US-ASCII" => "UTF-8".to_string(),
        "SHIFT_JIS" => "MS932".to_string(),
        _ => found.name,
    };

    Charset::new(name)
}

/// Decode a sample into text.
///
/// A BOM, when present, overrides `charset`. Undecodable bytes become U+FFFD.
pub fn decode(data: &[u8], charset: &Charset) -> String {
    let (decoded, _, _) = charset.encoding().decode(data);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FixedDetector(&'static str, u8);

    impl CharsetDetector for FixedDetector {
        fn detect(&self, _sample: &[u8]) -> Option<CharsetMatch> {
            Some(CharsetMatch {
                name: self.0.to_string(),
                confidence: self.1,
            })
        }
    }

    #[test]
    fn test_is_utf8() {
        assert!(is_utf8(b"Hello, World!"));
        assert!(is_utf8("こんにちは".as_bytes()));
        assert!(is_utf8(b""));
        assert!(!is_utf8(&[0xFF, 0xFE]));
    }

    #[test]
    fn test_utf8_bom() {
        let with_bom = [0xEF, 0xBB, 0xBF, b'a', b'b', b'c'];
        assert!(has_utf8_bom(&with_bom));
        assert!(!has_utf8_bom(b"abc"));
        assert_eq!(skip_bom(&with_bom), b"abc");
        assert_eq!(skip_bom(b"abc"), b"abc");
    }

    #[test]
    fn test_low_confidence_falls_back_to_utf8() {
        let detector = FixedDetector("EUC-KR", 49);
        assert_eq!(guess_charset(&detector, b"x"), Charset::utf8());
        let detector = FixedDetector("EUC-KR", 50);
        assert_eq!(guess_charset(&detector, b"x"), Charset::new("EUC-KR"));
    }

    #[test]
    fn test_alias_normalization() {
        assert_eq!(
            guess_charset(&FixedDetector("ISO-8859-1", 90), b"x"),
            Charset::utf8()
        );
        assert_eq!(
            guess_charset(&FixedDetector("windows-1252", 90), b"x"),
            Charset::utf8()
        );
        assert_eq!(
            guess_charset(&FixedDetector("Shift_JIS", 90), b"x"),
            Charset::new("MS932")
        );
        assert_eq!(Charset::new("MS932").encoding(), encoding_rs::SHIFT_JIS);
    }

    #[test]
    fn test_chardetng_utf8_and_ascii() {
        let detector = ChardetngDetector;
        assert_eq!(
            guess_charset(&detector, "name,city\nAlice,東京\n".as_bytes()),
            Charset::utf8()
        );
        assert_eq!(guess_charset(&detector, b"a,b\n1,2\n"), Charset::utf8());
        assert_eq!(guess_charset(&detector, b""), Charset::utf8());
    }

    #[test]
    fn test_chardetng_windows1251() {
        // "Привет, мир" in Windows-1251
        let data: &[u8] = &[
            0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2, 0x2C, 0x20, 0xEC, 0xE8, 0xF0, 0x0A,
        ];
        let found = ChardetngDetector.detect(data).unwrap();
        assert_ne!(found.name, "UTF-8");
        let charset = guess_charset(&ChardetngDetector, data);
        assert!(is_utf8(decode(data, &charset).as_bytes()));
    }

    #[test]
    fn test_decode_strips_bom() {
        let data = [0xEF, 0xBB, 0xBF, b'a', b',', b'b'];
        assert_eq!(decode(&data, &Charset::utf8()), "a,b");
    }
}
