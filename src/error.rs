use std::fmt;
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The ways the data pipeline can fail to produce a report.
///
/// Cell-level problems never surface here: an unparseable amount resolves to zero and an
/// unresolved column resolves to empty values, so the only failures the pipeline reports
/// are "the sheet had no rows" and "nothing usable survived normalization". The HTTP
/// boundary maps both to a not-found response, distinct from transport failures.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DataError {
    /// The CSV text had no data rows (fewer than two lines, or only blank lines).
    EmptyInput,
    /// Tokenizing succeeded but normalization discarded every row.
    NoValidRecords,
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataError::EmptyInput => write!(f, "the sheet contained no data rows"),
            DataError::NoValidRecords => {
                write!(f, "no usable records were produced from the sheet")
            }
        }
    }
}

impl std::error::Error for DataError {}
