//! The sink trait seam
//!
//! Writers and the dispatcher talk to this trait; [`crate::WritePlugin`]
//! implements it over the C ABI and [`crate::testing::RecordingSink`]
//! implements it in memory. Sections passed here are already stamped and
//! per-unit; implementations must not assume exclusive access across calls
//! because the dispatcher issues them concurrently for different units.

use rtdb_protocol::{AnalogSection, DigitalSection, StaticAnalog, StaticDigital};

/// One-unit view of the sink plugin.
///
/// All write calls are fire-and-forget: the plugin handles its own retries
/// and its return values (if any) are not part of this contract. Calls may
/// block arbitrarily long.
pub trait Sink: Send + Sync + 'static {
    /// Log into the database. Non-zero return means the run must abort.
    fn login(&self, param: Option<&str>) -> i32;

    /// Log out. Called exactly once on every exit path.
    fn logout(&self);

    fn write_rt_analog(&self, magic: u32, unit_id: u8, section: &AnalogSection, is_fast: bool);

    fn write_rt_digital(&self, magic: u32, unit_id: u8, section: &DigitalSection, is_fast: bool);

    /// Batched realtime analog write: up to 100 sections in one call.
    fn write_rt_analog_list(&self, magic: u32, unit_id: u8, sections: &[AnalogSection]);

    /// Batched realtime digital write: up to 100 sections in one call.
    fn write_rt_digital_list(&self, magic: u32, unit_id: u8, sections: &[DigitalSection]);

    fn write_his_analog(&self, magic: u32, unit_id: u8, section: &AnalogSection);

    fn write_his_digital(&self, magic: u32, unit_id: u8, section: &DigitalSection);

    fn write_static_analog(&self, magic: u32, unit_id: u8, records: &[StaticAnalog], kind: i32);

    fn write_static_digital(&self, magic: u32, unit_id: u8, records: &[StaticDigital], kind: i32);
}
