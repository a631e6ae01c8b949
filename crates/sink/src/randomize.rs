//! Value randomization strategy
//!
//! With randomization enabled, every unit writes a recognizably different
//! value for the same point, which lets the database under test be checked
//! for cross-unit bleed. The offset function is a strategy so alternative
//! distributions can be swapped in without touching the dispatcher.

/// Per-unit perturbation of analog values.
pub trait Randomize: Send + Sync + 'static {
    /// Offset added to every analog value written for `unit_id`.
    fn offset(&self, unit_id: u8) -> f64;
}

/// Default strategy: add the integer `unit_id` to the value, so unit 0
/// writes the source value unchanged and unit `u` writes `value + u`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitOffset;

impl Randomize for UnitOffset {
    #[inline]
    fn offset(&self, unit_id: u8) -> f64 {
        unit_id as f64
    }
}
