//! Source error types

use std::path::PathBuf;

use thiserror::Error;

/// Fatal source-side failures.
///
/// Row-level problems (malformed records, framing errors) are not errors at
/// this level; readers log and skip them.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input file could not be opened; fatal for the run
    #[error("can not open file: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
