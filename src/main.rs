//! csv-guess CLI - CSV dialect and schema guesser

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use csv_guess::{
    CsvReader, DialectConfig, GuessResult, Guesser, Newline, ReaderOptions, Record, SampleSize,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// CSV dialect and schema guesser.
///
/// Guesses charset, newline, delimiter, quoting, escaping, null string,
/// comment marker, preamble and header lines, and the type of every column.
/// Only the guessed fields are reported; fields given on the command line or
/// in --config are taken as they are.
#[derive(Parser, Debug)]
#[command(name = "csv-guess")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file(s) to guess
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of lines to sample
    #[arg(short = 'n', long)]
    sample_records: Option<usize>,

    /// Number of bytes to sample (default: 32768)
    #[arg(short = 'b', long, conflicts_with = "sample_records")]
    sample_bytes: Option<usize>,

    /// Read entire file instead of sampling
    #[arg(short = 'a', long)]
    all: bool,

    /// JSON file with known dialect fields
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Force specific delimiter (single character)
    #[arg(short = 'd', long)]
    delimiter: Option<char>,

    /// Force specific quote character (single character, or 'none')
    #[arg(short = 'q', long)]
    quote: Option<String>,

    /// Force specific escape character (single character, or 'none')
    #[arg(short = 'e', long)]
    escape: Option<String>,

    /// Force the null string ('none' for no null string)
    #[arg(long)]
    null_string: Option<String>,

    /// Force the comment line marker ('none' for no comments)
    #[arg(long)]
    comment: Option<String>,

    /// Force header line presence
    #[arg(long)]
    has_header: Option<bool>,

    /// Force the number of preamble lines
    #[arg(long)]
    skip_header_lines: Option<usize>,

    /// Force the charset
    #[arg(long)]
    charset: Option<String>,

    /// Force the newline (CRLF, LF or CR)
    #[arg(long)]
    newline: Option<Newline>,

    /// Do not guess column types
    #[arg(long)]
    no_schema: bool,

    /// Print the first N records parsed with the guessed dialect
    #[arg(short = 'p', long)]
    preview: Option<usize>,

    /// Output format: text (default), json, or csv
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Only output the detected delimiter character
    #[arg(long)]
    delimiter_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    #[serde(flatten)]
    result: &'a GuessResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<Vec<Record>>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    let guesser = match build_guesser(&args) {
        Ok(guesser) => guesser,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // guess in parallel, report in input order
    let results: Vec<_> = args
        .files
        .par_iter()
        .map(|file| guess_file(&guesser, file, args.preview))
        .collect();

    let mut exit_code = ExitCode::SUCCESS;
    let mut csv_writer = (args.format == OutputFormat::Csv && !args.delimiter_only)
        .then(|| csv::Writer::from_writer(std::io::stdout()));
    if let Some(writer) = csv_writer.as_mut() {
        if let Err(e) = write_csv_header(writer) {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    }

    for (file, outcome) in args.files.iter().zip(results) {
        let printed = outcome.and_then(|(result, preview)| {
            if args.delimiter_only {
                println!("{}", result.dialect.delimiter);
                return Ok(());
            }
            match csv_writer.as_mut() {
                Some(writer) => write_csv_row(writer, file, &result),
                None if args.format == OutputFormat::Json => print_json_output(file, &result, preview),
                None => {
                    print_text_output(file, &result, preview.as_deref());
                    Ok(())
                }
            }
        });

        if let Err(e) = printed {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }

    if let Some(mut writer) = csv_writer {
        if let Err(e) = writer.flush() {
            eprintln!("Error: {e}");
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn setup_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {e}");
    }
}

/// Parses a character option where "none" disables the feature.
fn optional_char(name: &str, value: &str) -> Result<Option<char>, String> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Some(c)),
        _ => Err(format!("--{name} must be a single character or 'none'")),
    }
}

fn optional_string(value: &str) -> Option<String> {
    (!value.eq_ignore_ascii_case("none")).then(|| value.to_string())
}

fn build_guesser(args: &Args) -> Result<Guesser, Box<dyn std::error::Error>> {
    let mut guesser = Guesser::new();

    if let Some(path) = &args.config {
        let json = std::fs::read_to_string(path)?;
        guesser.config(DialectConfig::from_json(&json)?);
    }

    // Configure sample size
    if args.all {
        guesser.sample_size(SampleSize::All);
    } else if let Some(bytes) = args.sample_bytes {
        guesser.sample_size(SampleSize::Bytes(bytes));
    } else if let Some(records) = args.sample_records {
        guesser.sample_size(SampleSize::Records(records));
    }

    if let Some(delimiter) = args.delimiter {
        guesser.delimiter(delimiter);
    }
    if let Some(quote) = &args.quote {
        guesser.quote(optional_char("quote", quote)?);
    }
    if let Some(escape) = &args.escape {
        guesser.escape(optional_char("escape", escape)?);
    }
    if let Some(null_string) = &args.null_string {
        guesser.null_string(optional_string(null_string).as_deref());
    }
    if let Some(comment) = &args.comment {
        guesser.comment_line_marker(optional_string(comment).as_deref());
    }
    if let Some(has_header) = args.has_header {
        guesser.has_header_line(has_header);
    }
    if let Some(lines) = args.skip_header_lines {
        guesser.skip_header_lines(lines);
    }
    if let Some(charset) = &args.charset {
        guesser.charset(charset.as_str());
    }
    if let Some(newline) = args.newline {
        guesser.newline(newline);
    }
    guesser.guess_schema(!args.no_schema);

    Ok(guesser)
}

type FileOutcome = Result<(GuessResult, Option<Vec<Record>>), Box<dyn std::error::Error + Send + Sync>>;

fn guess_file(guesser: &Guesser, path: &Path, preview: Option<usize>) -> FileOutcome {
    let result = guesser.guess_path(path)?;

    let preview = match preview {
        Some(limit) => {
            let data = std::fs::read(path)?;
            let reader = CsvReader::from_bytes(
                &data,
                &result.dialect,
                result.num_fields,
                ReaderOptions {
                    allow_optional_columns: true,
                    allow_extra_columns: true,
                    stop_on_invalid_record: false,
                },
            );
            Some(reader.take(limit).collect::<Result<Vec<_>, _>>()?)
        }
        None => None,
    };

    Ok((result, preview))
}

fn display_option<T: std::fmt::Debug>(value: &Option<T>) -> String {
    match value {
        Some(value) => format!("{value:?}"),
        None => "none".to_string(),
    }
}

fn print_text_output(path: &Path, result: &GuessResult, preview: Option<&[Record]>) {
    let dialect = &result.dialect;

    println!("File: {}", path.display());
    println!("  Charset: {}", dialect.charset);
    println!("  Newline: {}", dialect.newline);
    println!("  Delimiter: {:?}", dialect.delimiter);
    println!("  Quote: {}", display_option(&dialect.quote));
    println!("  Escape: {}", display_option(&dialect.escape));
    println!("  Null string: {}", display_option(&dialect.null_string));
    println!("  Comment marker: {}", display_option(&dialect.comment_line_marker));
    println!("  Trim unquoted: {}", dialect.trim_if_not_quoted);
    println!("  Preamble lines: {}", dialect.skip_header_lines);
    println!("  Has header: {}", dialect.has_header_line);
    println!("  Fields: {}", result.num_fields);
    println!("  Avg record length: {} bytes", result.avg_record_len);

    if let Some(columns) = &result.columns {
        println!("  Columns:");
        for (i, column) in columns.iter().enumerate() {
            println!("    {}: {} ({})", i + 1, column.name, column.column_type);
        }
    }

    if let Some(records) = preview {
        println!("  Preview:");
        for record in records {
            let values: Vec<&str> = record
                .iter()
                .map(|value| value.as_deref().unwrap_or("<null>"))
                .collect();
            println!("    {}", values.join(" | "));
        }
    }

    println!();
}

fn print_json_output(
    path: &Path,
    result: &GuessResult,
    preview: Option<Vec<Record>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let report = FileReport {
        file: path.display().to_string(),
        result,
        preview,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn write_csv_header<W: std::io::Write>(writer: &mut csv::Writer<W>) -> csv::Result<()> {
    writer.write_record([
        "file",
        "charset",
        "newline",
        "delimiter",
        "quote",
        "escape",
        "null_string",
        "comment_line_marker",
        "trim_if_not_quoted",
        "skip_header_lines",
        "has_header_line",
        "num_fields",
        "avg_record_len",
    ])
}

fn write_csv_row<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    path: &Path,
    result: &GuessResult,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let dialect = &result.dialect;
    let char_field = |c: Option<char>| c.map(String::from).unwrap_or_default();

    writer.write_record([
        path.display().to_string(),
        dialect.charset.to_string(),
        dialect.newline.to_string(),
        dialect.delimiter.to_string(),
        char_field(dialect.quote),
        char_field(dialect.escape),
        dialect.null_string.clone().unwrap_or_default(),
        dialect.comment_line_marker.clone().unwrap_or_default(),
        dialect.trim_if_not_quoted.to_string(),
        dialect.skip_header_lines.to_string(),
        dialect.has_header_line.to_string(),
        result.num_fields.to_string(),
        result.avg_record_len.to_string(),
    ])?;
    Ok(())
}
