use std::cmp::Ordering;
use std::fmt;

/// Value type guessed for a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GuessedType {
    /// Boolean value (true/false, yes/no, on/off, t/f, y/n).
    Boolean,
    /// 64-bit signed integer.
    Long,
    /// Floating point number.
    Double,
    /// Text value (fallback type).
    String,
    /// JSON object or array.
    Json,
    /// Timestamp with its strftime-style format.
    Timestamp(String),
}

impl fmt::Display for GuessedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessedType::Timestamp(format) => write!(f, "timestamp({format})"),
            other => f.write_str(other.name()),
        }
    }
}

impl GuessedType {
    /// Schema name of this type.
    pub const fn name(&self) -> &'static str {
        match self {
            GuessedType::Boolean => "boolean",
            GuessedType::Long => "long",
            GuessedType::Double => "double",
            GuessedType::String => "string",
            GuessedType::Json => "json",
            GuessedType::Timestamp(_) => "timestamp",
        }
    }

    /// Timestamp format, if this is a timestamp.
    pub fn format(&self) -> Option<&str> {
        match self {
            GuessedType::Timestamp(format) => Some(format),
            _ => None,
        }
    }

    /// Returns true if both are the same variant, ignoring any format.
    pub fn same_kind(&self, other: &GuessedType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Merge two types into one that can hold values of both.
    ///
    /// Same kinds keep `self`. Otherwise longs widen to doubles, booleans and
    /// timestamps narrow into longs, and everything else becomes a string.
    pub fn merge(self, other: GuessedType) -> GuessedType {
        if self.same_kind(&other) {
            return self;
        }

        let (low, high) = if self <= other { (self, other) } else { (other, self) };
        match (low, high) {
            (GuessedType::Double, GuessedType::Long) => GuessedType::Double,
            (GuessedType::Boolean, GuessedType::Long) => GuessedType::Long,
            (GuessedType::Long, GuessedType::Timestamp(_)) => GuessedType::Long,
            _ => GuessedType::String,
        }
    }

    /// Merge nullable types; a null takes the other side.
    pub fn merge_nullable(a: Option<GuessedType>, b: Option<GuessedType>) -> Option<GuessedType> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

impl PartialOrd for GuessedType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered by schema name, then by timestamp format.
impl Ord for GuessedType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.format().cmp(&other.format()))
    }
}
