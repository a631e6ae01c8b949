//! RTDB Writer - Protocol
//!
//! The data model shared by every stage of the harness and by the sink
//! plugin ABI: measurement records, timestamp-aligned sections, the packed
//! `GlobalId`, and row-level CSV decoding.
//!
//! # Architecture
//!
//! ```text
//! CSV row ──→ RowRecord::decode ──→ Analog / Digital / Static*   (repr(C))
//!                                        │
//!                                        ▼
//!                              Section<T> { timestamp, records }
//!                                        │
//!                                        ▼
//!                     GlobalId::encode stamped per unit before the
//!                     record crosses the plugin ABI
//! ```
//!
//! # Key Design
//!
//! - **repr(C) records**: the structs in this crate are passed by pointer
//!   across the plugin boundary; their layout is the wire contract.
//! - **Decode as data**: a malformed row is a [`DecodeError`] value, never a
//!   panic; callers log and skip.
//! - **One decoder shape**: the four CSV schemas implement [`RowRecord`], so
//!   one generic reader serves them all.

mod error;
mod global_id;
mod records;
mod row;
mod section;

pub use error::DecodeError;
pub use global_id::{GlobalId, POINT_NUMBER_MASK};
pub use records::{Analog, Digital, StaticAnalog, StaticDigital};
pub use row::{RowOutcome, RowRecord};
pub use section::{AnalogSection, DigitalSection, Section, SectionPair};

/// Result type for row decoding
pub type Result<T> = std::result::Result<T, DecodeError>;
