//! csv-guess: CSV dialect and schema guessing with a streaming tokenizer
//!
//! Given a byte sample of a delimited text file, the crate infers how to read
//! it (charset, newline, delimiter, quote, escape, null string, comment
//! marker, preamble lines, header line) and the type of every column. The
//! same [`Tokenizer`] used for guessing then reads the full stream through
//! [`CsvReader`].
//!
//! # Quick Start
//!
//! ```no_run
//! use csv_guess::{Guesser, SampleSize};
//!
//! // Create a guesser with default settings
//! let mut guesser = Guesser::new();
//!
//! // Optionally configure sampling
//! guesser.sample_size(SampleSize::Bytes(64 * 1024));
//!
//! // Guess a file
//! let result = guesser.guess_path("data.csv").unwrap();
//!
//! println!("Delimiter: {:?}", result.dialect.delimiter);
//! println!("Has header: {}", result.dialect.has_header_line);
//! for column in result.columns.unwrap_or_default() {
//!     println!("{}: {}", column.name, column.column_type);
//! }
//! ```
//!
//! # Explicit fields
//!
//! Anything the caller already knows is passed as a [`DialectConfig`], either
//! through the builder or as JSON. Explicit fields are never guessed, and the
//! [`GuessResult::diff`] only holds what was guessed:
//!
//! ```
//! use csv_guess::{DialectConfig, Guesser};
//!
//! let config = DialectConfig::from_json(r#"{"delimiter": ";", "quote": null}"#).unwrap();
//! let result = Guesser::new()
//!     .config(config)
//!     .guess_bytes(b"a;b\n1;2\n")
//!     .unwrap();
//!
//! assert_eq!(result.dialect.delimiter, ';');
//! assert_eq!(result.dialect.quote, None);
//! assert_eq!(result.diff.delimiter, None);
//! ```
//!
//! # How guessing works
//!
//! 1. Charset (chardetng, with a confidence floor) and newline (CR/LF/CRLF counts)
//! 2. Delimiter, quote, escape, null string and comment marker, each scored over
//!    the decoded sample lines
//! 3. Preamble lines, from how column counts settle
//! 4. Header line, trimming and column types, by comparing the first row with
//!    the rows below it

mod dialect;
mod encoding;
mod error;
pub mod guess;
mod guesser;
mod newline;
mod reader;
mod sample;
pub mod schema;
mod tokenizer;

pub use dialect::{DEFAULT_MAX_QUOTED_SIZE_LIMIT, Dialect, DialectConfig, DialectDiff};
pub use encoding::{
    Charset, CharsetDetector, CharsetMatch, ChardetngDetector, MIN_CHARSET_CONFIDENCE,
    guess_charset, is_utf8,
};
pub use error::{GuessError, ReadError, Result, TokenizeError};
pub use guesser::{GuessResult, Guesser};
pub use newline::{LineDecoder, Newline, detect_newline};
pub use reader::{CsvReader, ReaderOptions};
pub use sample::SampleSize;
pub use schema::{GuessedType, SchemaColumn};
pub use tokenizer::{Column, Record, Tokenizer};
