//! Main Guesser builder and guess methods.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::dialect::{Dialect, DialectConfig, DialectDiff};
use crate::encoding::{ChardetngDetector, Charset, CharsetDetector, guess_charset};
use crate::error::{GuessError, Result};
use crate::guess::guess_dialect;
use crate::newline::{Newline, decode_lines, detect_newline};
use crate::sample::SampleSize;
use crate::schema::{SchemaColumn, guess_schema};

/// Outcome of one guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessResult {
    /// Fully resolved dialect: explicit fields plus guessed ones.
    pub dialect: Dialect,
    /// Only the fields that were guessed.
    pub diff: DialectDiff,
    /// Column schema, when schema guessing ran and data rows were found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<SchemaColumn>>,
    /// Number of columns of the table.
    pub num_fields: usize,
    /// Average length of a sampled line in bytes.
    pub avg_record_len: usize,
}

/// CSV dialect and schema guesser.
///
/// Fields set through the builder are authoritative and never guessed.
///
/// # Example
///
/// ```no_run
/// use csv_guess::{Guesser, SampleSize};
///
/// let mut guesser = Guesser::new();
/// guesser.sample_size(SampleSize::Records(100)).has_header_line(true);
///
/// let result = guesser.guess_path("data.csv").unwrap();
/// println!("Delimiter: {:?}", result.dialect.delimiter);
/// println!("Guessed: {}", serde_json::to_string(&result.diff).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Guesser {
    /// Sample size for guessing.
    sample_size: SampleSize,
    /// Caller supplied dialect fields.
    config: DialectConfig,
    /// Whether to report the column schema.
    guess_schema: bool,
    charset_detector: Arc<dyn CharsetDetector>,
}

impl Default for Guesser {
    fn default() -> Self {
        Self::new()
    }
}

impl Guesser {
    /// Create a new Guesser with default settings.
    pub fn new() -> Self {
        Self {
            sample_size: SampleSize::default(),
            config: DialectConfig::default(),
            guess_schema: true,
            charset_detector: Arc::new(ChardetngDetector),
        }
    }

    /// Set the sample size for guessing.
    pub fn sample_size(&mut self, sample_size: SampleSize) -> &mut Self {
        self.sample_size = sample_size;
        self
    }

    /// Replace the whole caller configuration.
    pub fn config(&mut self, config: DialectConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Force a specific delimiter.
    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.config.delimiter = Some(delimiter);
        self
    }

    /// Force a quote character, `None` disables quoting.
    pub fn quote(&mut self, quote: Option<char>) -> &mut Self {
        self.config.quote = Some(quote);
        self
    }

    /// Force an escape character, `None` disables escaping.
    pub fn escape(&mut self, escape: Option<char>) -> &mut Self {
        self.config.escape = Some(escape);
        self
    }

    /// Force the null string, `None` means no null string.
    pub fn null_string(&mut self, null_string: Option<&str>) -> &mut Self {
        self.config.null_string = Some(null_string.map(str::to_string));
        self
    }

    /// Force the comment line marker, `None` means no comments.
    pub fn comment_line_marker(&mut self, marker: Option<&str>) -> &mut Self {
        self.config.comment_line_marker = Some(marker.map(str::to_string));
        self
    }

    pub fn trim_if_not_quoted(&mut self, trim: bool) -> &mut Self {
        self.config.trim_if_not_quoted = Some(trim);
        self
    }

    pub fn skip_header_lines(&mut self, lines: usize) -> &mut Self {
        self.config.skip_header_lines = Some(lines);
        self
    }

    pub fn has_header_line(&mut self, has_header_line: bool) -> &mut Self {
        self.config.has_header_line = Some(has_header_line);
        self
    }

    pub fn charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.config.charset = Some(Charset::new(charset));
        self
    }

    pub fn newline(&mut self, newline: Newline) -> &mut Self {
        self.config.newline = Some(newline);
        self
    }

    /// Set the cap on a single quoted value, in bytes.
    pub fn max_quoted_size_limit(&mut self, limit: usize) -> &mut Self {
        self.config.max_quoted_size_limit = Some(limit);
        self
    }

    /// Enable or disable column schema guessing.
    pub fn guess_schema(&mut self, guess_schema: bool) -> &mut Self {
        self.guess_schema = guess_schema;
        self
    }

    /// Replace the charset detector.
    pub fn charset_detector(&mut self, detector: Arc<dyn CharsetDetector>) -> &mut Self {
        self.charset_detector = detector;
        self
    }

    /// Guess the dialect of the file at the given path.
    pub fn guess_path<P: AsRef<Path>>(&self, path: P) -> Result<GuessResult> {
        let file = File::open(path.as_ref())?;
        self.guess_reader(BufReader::new(file))
    }

    /// Guess the dialect of data read from a reader.
    pub fn guess_reader<R: Read>(&self, reader: R) -> Result<GuessResult> {
        let (data, truncated) = self.read_sample(reader)?;
        self.guess_sample(&data, truncated)
    }

    /// Guess the dialect of in-memory data.
    pub fn guess_bytes(&self, data: &[u8]) -> Result<GuessResult> {
        match self.sample_size.bytes() {
            Some(limit) if data.len() > limit => self.guess_sample(&data[..limit], true),
            _ => self.guess_sample(data, false),
        }
    }

    /// Read a sample of data from the reader based on sample_size settings.
    fn read_sample<R: Read>(&self, mut reader: R) -> Result<(Vec<u8>, bool)> {
        let mut buffer = Vec::new();

        match self.sample_size.byte_limit() {
            Some(limit) => {
                reader
                    .by_ref()
                    .take(limit as u64 + 1)
                    .read_to_end(&mut buffer)?;
                let truncated = buffer.len() > limit;
                buffer.truncate(limit);
                Ok((buffer, truncated))
            }
            None => {
                reader.read_to_end(&mut buffer)?;
                Ok((buffer, false))
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(charset) = &self.config.charset {
            if !charset.is_known() {
                return Err(GuessError::InvalidConfig(format!(
                    "unknown charset '{charset}'"
                )));
            }
        }
        if self.config.max_quoted_size_limit == Some(0) {
            return Err(GuessError::InvalidConfig(
                "max_quoted_size_limit must be positive".to_string(),
            ));
        }
        if self.config.comment_line_marker == Some(Some(String::new())) {
            return Err(GuessError::InvalidConfig(
                "comment_line_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn guess_sample(&self, data: &[u8], truncated: bool) -> Result<GuessResult> {
        self.validate()?;

        let mut dialect = self.config.explicit_dialect();

        if self.config.charset.is_none() {
            dialect.charset = guess_charset(self.charset_detector.as_ref(), data);
            tracing::debug!(charset = %dialect.charset, "guessed charset");
        }
        if self.config.newline.is_none() {
            dialect.newline = detect_newline(data);
            tracing::debug!(newline = %dialect.newline, "guessed newline");
        }

        let mut lines = decode_lines(data, &dialect.charset, truncated);
        if let Some(limit) = self.sample_size.records() {
            lines.truncate(limit);
        }
        let sampled_lines = lines.len();

        let table = guess_dialect(lines, &self.config, &mut dialect);
        let columns = guess_schema(&table, &self.config, &mut dialect);
        let num_fields = columns.as_ref().map_or(0, Vec::len);

        let diff = self.config.diff(&dialect);
        tracing::debug!(%dialect, "guess complete");

        Ok(GuessResult {
            diff,
            columns: columns.filter(|_| self.guess_schema),
            num_fields,
            avg_record_len: calculate_avg_record_len(data, sampled_lines),
            dialect,
        })
    }
}

/// Calculate average record length.
fn calculate_avg_record_len(data: &[u8], num_rows: usize) -> usize {
    if num_rows == 0 {
        return 0;
    }
    data.len() / num_rows
}
