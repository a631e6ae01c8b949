//! RTDB Writer - Sources
//!
//! Streams row-oriented CSV measurement files into timestamp-aligned
//! sections and hands them to the writers through bounded channels.
//!
//! # Architecture
//!
//! ```text
//! analog.csv  ──→ SectionReader ──→ mpsc(64) ─┐
//!                                             ├─→ pair ──→ mpsc(64) ──→ writer
//! digital.csv ──→ SectionReader ──→ mpsc(64) ─┘
//! ```
//!
//! # Key Design
//!
//! - **Blocking readers on `spawn_blocking`**: file + CSV decoding is
//!   synchronous work; `blocking_send` into the bounded channel provides
//!   backpressure against the writer.
//! - **EOF is channel close**: a reader signals end-of-stream by dropping
//!   its sender, never by an explicit message.
//! - **Cancellation at the row boundary**: the token is checked once per
//!   row; an unflushed partial section is discarded on cancel.
//! - **CR normalization first**: `\r` bytes are rewritten to `\n` before
//!   CSV framing, so `\r\r`-terminated source files parse cleanly.

mod coordinator;
mod cr_filter;
mod error;
mod section_reader;
mod static_loader;

pub use coordinator::{PairedReader, spawn_paired_reader};
pub use cr_filter::CrFilterReader;
pub use error::SourceError;
pub use section_reader::{read_sections_from, spawn_section_reader};
pub use static_loader::{read_static_analog, read_static_digital};

/// Capacity of every inter-stage section channel. Enough to hide reader-side
/// hiccups while keeping memory bounded and backpressure responsive.
pub const CACHE_SIZE: usize = 64;

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;
