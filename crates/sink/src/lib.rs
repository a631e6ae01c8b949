//! RTDB Writer - Sink
//!
//! The boundary to the database under test. The sink is a dynamic library
//! loaded at runtime over a C ABI; this crate resolves its exports into a
//! typed vtable, hides them behind the [`Sink`] trait, and fans every
//! section out across the configured number of simulated units.
//!
//! # Architecture
//!
//! ```text
//!                      SinkDispatcher
//!                 (GlobalId stamp + value
//!                  randomization, per unit)
//!               ┌──────┬──────┬ ─ ─ ┬──────┐
//!               unit 0  unit 1       unit N-1     spawn_blocking + join
//!               └──────┴──────┴ ─ ─ ┴──────┘
//!                          │
//!                     dyn Sink
//!               ┌──────────┴───────────┐
//!          WritePlugin            RecordingSink
//!        (libloading vtable)     (tests, in `testing`)
//! ```
//!
//! # Key Design
//!
//! - **Trait seam**: writers and tests talk to [`Sink`]; only
//!   [`WritePlugin`] touches the FFI.
//! - **Per-unit copies**: GlobalId stamping and value randomization are
//!   per-unit mutations, so each unit task works on its own copy of the
//!   section; the base section is never mutated.
//! - **Fire and forget**: apart from `login`, plugin return values are not
//!   inspected. The harness measures, it does not retry.

mod abi;
mod dispatcher;
mod error;
mod plugin;
mod randomize;
mod sink;
pub mod testing;

pub use dispatcher::{LoginGuard, SinkDispatcher, StaticKind};
pub use error::SinkError;
pub use plugin::WritePlugin;
pub use randomize::{Randomize, UnitOffset};
pub use sink::Sink;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;
