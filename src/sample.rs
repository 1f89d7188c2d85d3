/// Default byte sample size.
pub const DEFAULT_SAMPLE_BYTES: usize = 32 * 1024;

/// Sample size configuration for guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Sample a specific number of lines.
    Records(usize),
    /// Sample a specific number of bytes.
    Bytes(usize),
    /// Read the entire input.
    ///
    /// # Warning
    ///
    /// This loads the entire file into memory. For large files (e.g., >100 MB), prefer
    /// [`SampleSize::Bytes`] with a reasonable limit to avoid excessive memory usage.
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Bytes(DEFAULT_SAMPLE_BYTES)
    }
}

impl SampleSize {
    /// Returns the number of records to sample, or None for other modes.
    pub fn records(&self) -> Option<usize> {
        match self {
            SampleSize::Records(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number of bytes to sample, or None for other modes.
    pub fn bytes(&self) -> Option<usize> {
        match self {
            SampleSize::Bytes(n) => Some(*n),
            _ => None,
        }
    }

    /// Upper bound on the bytes to read for this sample.
    ///
    /// Record samples assume about 1 KiB per record, with an 8 KiB floor.
    pub fn byte_limit(&self) -> Option<usize> {
        match self {
            SampleSize::Records(n) => Some(n.saturating_mul(1024).max(8192)),
            SampleSize::Bytes(n) => Some(*n),
            SampleSize::All => None,
        }
    }
}
