//! Sink error types

use std::path::PathBuf;

use thiserror::Error;

/// Failures at the plugin boundary. All of them are fatal for the run.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Plugin library could not be loaded
    #[error("failed to load plugin {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// Plugin does not export a required symbol
    #[error("plugin {path} is missing symbol {symbol}")]
    Symbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// Login parameter contained an interior NUL byte
    #[error("login parameter is not a valid C string")]
    LoginParam(#[from] std::ffi::NulError),

    /// Plugin rejected the login
    #[error("plugin login failed with code {code}")]
    LoginFailed { code: i32 },

    /// Unit count outside the 8-bit unit-id space
    #[error("unit_number must be between 1 and 256, got {0}")]
    UnitCount(i64),
}
