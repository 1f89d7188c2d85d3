//! Record reader over a full stream with a resolved dialect.

use crate::dialect::Dialect;
use crate::error::{ReadError, TokenizeError};
use crate::newline::LineDecoder;
use crate::tokenizer::{Record, Tokenizer};

/// Policies for records that do not fit the expected column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReaderOptions {
    /// Pad records with too few columns with nulls instead of rejecting them.
    pub allow_optional_columns: bool,
    /// Drop surplus columns instead of rejecting the record.
    pub allow_extra_columns: bool,
    /// Yield an error and stop at the first invalid record instead of
    /// skipping it.
    pub stop_on_invalid_record: bool,
}

/// Iterator of fixed-width records.
///
/// The preamble (`skip_header_lines`) and, when `has_header_line` is set, the
/// header record are skipped before the first record is returned. Invalid
/// records are logged and skipped unless
/// [`stop_on_invalid_record`](ReaderOptions::stop_on_invalid_record) is set.
///
/// ```
/// use csv_guess::{CsvReader, Dialect, ReaderOptions};
///
/// let dialect = Dialect { has_header_line: true, ..Dialect::default() };
/// let data = b"id,name\n1,alice\n2,\n";
/// let records: Vec<_> = CsvReader::from_bytes(data, &dialect, 2, ReaderOptions::default())
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(records, vec![
///     vec![Some("1".to_string()), Some("alice".to_string())],
///     vec![Some("2".to_string()), None],
/// ]);
/// ```
#[derive(Debug)]
pub struct CsvReader<I> {
    tokenizer: Tokenizer<I>,
    num_columns: usize,
    options: ReaderOptions,
    header_pending: bool,
    invalid_records: usize,
    done: bool,
}

impl CsvReader<LineDecoder> {
    /// Read records from raw bytes decoded with the dialect charset.
    pub fn from_bytes(data: &[u8], dialect: &Dialect, num_columns: usize, options: ReaderOptions) -> Self {
        Self::new(LineDecoder::new(data, &dialect.charset), dialect, num_columns, options)
    }
}

impl<I> CsvReader<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I, dialect: &Dialect, num_columns: usize, options: ReaderOptions) -> Self {
        let mut tokenizer = Tokenizer::new(lines, dialect);
        tokenizer.skip_header_lines(dialect.skip_header_lines);

        Self {
            tokenizer,
            num_columns,
            options,
            header_pending: dialect.has_header_line,
            invalid_records: 0,
            done: false,
        }
    }

    /// Number of records rejected so far.
    pub fn invalid_records(&self) -> usize {
        self.invalid_records
    }

    /// Current physical line number.
    pub fn line_number(&self) -> u64 {
        self.tokenizer.line_number()
    }

    /// Skip the current invalid record. Returns the error to yield when
    /// stopping on invalid records.
    fn reject(&mut self, source: TokenizeError) -> Option<ReadError> {
        let line = source.line();
        let skipped = self.tokenizer.skip_current_record();
        self.invalid_records += 1;

        if self.options.stop_on_invalid_record {
            self.done = true;
            return Some(ReadError {
                line,
                skipped,
                source,
            });
        }

        tracing::warn!(line, %source, %skipped, "skipping invalid record");
        None
    }

    fn skip_header_record(&mut self) -> Result<(), TokenizeError> {
        if self.tokenizer.next_record()? {
            while self.tokenizer.has_next_column() {
                self.tokenizer.next_column()?;
            }
        }
        Ok(())
    }

    fn read_record(&mut self) -> Result<Option<Record>, TokenizeError> {
        if !self.tokenizer.next_record()? {
            return Ok(None);
        }

        let mut record = Vec::with_capacity(self.num_columns);
        while record.len() < self.num_columns {
            match self.tokenizer.next_value() {
                Ok(value) => record.push(value),
                Err(TokenizeError::TooFewColumns { .. }) if self.options.allow_optional_columns => {
                    record.resize(self.num_columns, None);
                }
                Err(err) => return Err(err),
            }
        }

        if self.tokenizer.has_next_column() {
            if !self.options.allow_extra_columns {
                return Err(TokenizeError::TooManyColumns {
                    line: self.tokenizer.line_number(),
                });
            }
            self.tokenizer.skip_current_record();
        }

        Ok(Some(record))
    }
}

impl<I> Iterator for CsvReader<I>
where
    I: Iterator<Item = String>,
{
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.header_pending {
                self.header_pending = false;
                if let Err(source) = self.skip_header_record() {
                    if let Some(err) = self.reject(source) {
                        return Some(Err(err));
                    }
                }
                continue;
            }

            match self.read_record() {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => self.done = true,
                Err(source) => {
                    if let Some(err) = self.reject(source) {
                        return Some(Err(err));
                    }
                }
            }
        }
        None
    }
}
