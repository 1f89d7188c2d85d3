//! Column schema guessing.
//!
//! The table part of the sample is tokenized with the guessed dialect. The
//! first row is compared against the rest to decide whether it is a header
//! and whether unquoted values should be trimmed, then every column gets one
//! merged [`GuessedType`].

pub mod guessed_type;
pub mod header;
pub mod time_format;
pub mod type_detection;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::dialect::{Dialect, DialectConfig};
use crate::guess::split_records;
use crate::tokenizer::Record;

pub use guessed_type::GuessedType;
pub use time_format::guess_time_format;
pub use type_detection::{classify, guess_column_types};

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    pub column_type: GuessedType,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, column_type: GuessedType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Serialized as `{"name": ..., "type": ..., "format": ...}`, the format only
/// for timestamps.
impl Serialize for SchemaColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let format = self.column_type.format();
        let len = if format.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("SchemaColumn", len)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", self.column_type.name())?;
        if let Some(format) = format {
            state.serialize_field("format", format)?;
        } else {
            state.skip_field("format")?;
        }
        state.end()
    }
}

fn valid_records(lines: &[String], dialect: &Dialect) -> Vec<Record> {
    split_records(lines, dialect, true).into_iter().flatten().collect()
}

/// Guess header presence, trimming, and the column schema.
///
/// `has_header_line` and `trim_if_not_quoted` are updated on `dialect`
/// unless `config` fixes them. Returns `None` when no data row is left.
pub fn guess_schema(
    lines: &[String],
    config: &DialectConfig,
    dialect: &mut Dialect,
) -> Option<Vec<SchemaColumn>> {
    let mut records = valid_records(lines, dialect);
    if records.is_empty() {
        return None;
    }

    if records.len() > 1 {
        if config.trim_if_not_quoted.is_none() && !dialect.trim_if_not_quoted {
            let trimmed_dialect = Dialect {
                trim_if_not_quoted: true,
                ..dialect.clone()
            };
            let trimmed = valid_records(lines, &trimmed_dialect);

            let plain_types = guess_column_types(&records[1..]);
            let trimmed_types = guess_column_types(trimmed.get(1..).unwrap_or_default());
            if plain_types != trimmed_types {
                tracing::debug!("values change type when trimmed, enabling trim_if_not_quoted");
                dialect.trim_if_not_quoted = true;
                records = trimmed;
            }
        }

        if config.has_header_line.is_none() {
            let (first, rest) = records.split_at(1);
            dialect.has_header_line = header::is_header(
                &first[0],
                &guess_column_types(first),
                rest,
                &guess_column_types(rest),
            );
            tracing::debug!(has_header_line = dialect.has_header_line, "guessed header line");
        }
    } else if config.has_header_line.is_none() {
        dialect.has_header_line = false;
    }

    let (header, data) = if dialect.has_header_line {
        (records.first(), &records[1..])
    } else {
        (None, &records[..])
    };
    if data.is_empty() {
        return None;
    }

    let types = guess_column_types(data);
    let width = types.len().max(header.map_or(0, Vec::len));
    let names = header::column_names(header, width);

    Some(
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let column_type = types.get(i).cloned().flatten().unwrap_or(GuessedType::String);
                SchemaColumn::new(name, column_type)
            })
            .collect(),
    )
}
