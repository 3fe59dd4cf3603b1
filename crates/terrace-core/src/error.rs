//! Error type for survey file loading.

use std::io;
use std::path::PathBuf;

/// Errors raised while reading survey CSV files.
///
/// Every variant carries the path of the offending file so callers can
/// report which of the per-prefix inputs failed.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    /// The file could not be opened.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file opened but a record did not match the expected schema.
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
