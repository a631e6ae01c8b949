//! Per-unit fan-out dispatcher
//!
//! One logical write becomes `unit_count` plugin calls, one per simulated
//! unit, issued in parallel and joined before the dispatcher returns. Each
//! unit call gets its own copy of the section with `global_id` stamped for
//! that unit and, when enabled, its analog values offset by the
//! randomization strategy. Plugin calls may block, so every unit call runs
//! on a blocking task.

use std::sync::Arc;

use rtdb_protocol::{
    Analog, AnalogSection, Digital, DigitalSection, GlobalId, Section, StaticAnalog, StaticDigital,
};
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::SinkError;
use crate::randomize::Randomize;
use crate::sink::Sink;

/// Target selector for static writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticKind {
    /// Fast realtime points (`--type 0`)
    FastRealtime = 0,
    /// Normal realtime points (`--type 1`)
    NormalRealtime = 1,
    /// Normal history points (`--type 2`)
    NormalHistory = 2,
}

impl StaticKind {
    /// (is_fast, is_realtime) bits stamped into the GlobalId
    fn flags(self) -> (bool, bool) {
        match self {
            StaticKind::FastRealtime => (true, true),
            StaticKind::NormalRealtime => (false, true),
            StaticKind::NormalHistory => (false, false),
        }
    }

    fn as_raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i64> for StaticKind {
    type Error = i64;

    fn try_from(value: i64) -> std::result::Result<Self, i64> {
        match value {
            0 => Ok(StaticKind::FastRealtime),
            1 => Ok(StaticKind::NormalRealtime),
            2 => Ok(StaticKind::NormalHistory),
            other => Err(other),
        }
    }
}

/// Logs out on drop, so logout runs on every exit path.
pub struct LoginGuard {
    sink: Arc<dyn Sink>,
}

impl std::fmt::Debug for LoginGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGuard").finish()
    }
}

impl Drop for LoginGuard {
    fn drop(&mut self) {
        self.sink.logout();
    }
}

/// Fan-out front of the sink. `magic` and `unit_count` are fixed for the
/// whole run; cloning is cheap and every clone talks to the same plugin.
#[derive(Clone)]
pub struct SinkDispatcher {
    sink: Arc<dyn Sink>,
    magic: u32,
    unit_count: u32,
    randomize: Option<Arc<dyn Randomize>>,
}

impl SinkDispatcher {
    /// Create a dispatcher over `sink`.
    ///
    /// `unit_count` must fit the 8-bit unit-id space (1..=256).
    pub fn new(
        sink: Arc<dyn Sink>,
        magic: u32,
        unit_count: i64,
        randomize: Option<Arc<dyn Randomize>>,
    ) -> crate::Result<Self> {
        if !(1..=256).contains(&unit_count) {
            return Err(SinkError::UnitCount(unit_count));
        }
        Ok(Self {
            sink,
            magic,
            unit_count: unit_count as u32,
            randomize,
        })
    }

    #[inline]
    pub fn unit_count(&self) -> i64 {
        self.unit_count as i64
    }

    /// Log into the plugin; non-zero status aborts the run. The returned
    /// guard logs out when dropped.
    pub fn login(&self, param: Option<&str>) -> crate::Result<LoginGuard> {
        if let Some(p) = param {
            // reject interior NUL here so the FFI layer never sees one
            std::ffi::CString::new(p)?;
        }
        let code = self.sink.login(param);
        if code != 0 {
            return Err(SinkError::LoginFailed { code });
        }
        Ok(LoginGuard {
            sink: Arc::clone(&self.sink),
        })
    }

    pub async fn write_rt_analog(&self, section: AnalogSection, is_fast: bool) {
        let base = Arc::new(section);
        let randomize = self.randomize.clone();
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped = stamp_analog(&base, magic, unit_id, is_fast, true, randomize.as_deref());
            sink.write_rt_analog(magic, unit_id, &stamped, is_fast);
        })
        .await;
    }

    pub async fn write_rt_digital(&self, section: DigitalSection, is_fast: bool) {
        let base = Arc::new(section);
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped = stamp_digital(&base, magic, unit_id, is_fast, true);
            sink.write_rt_digital(magic, unit_id, &stamped, is_fast);
        })
        .await;
    }

    pub async fn write_his_analog(&self, section: AnalogSection) {
        let base = Arc::new(section);
        let randomize = self.randomize.clone();
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped = stamp_analog(&base, magic, unit_id, false, false, randomize.as_deref());
            sink.write_his_analog(magic, unit_id, &stamped);
        })
        .await;
    }

    pub async fn write_his_digital(&self, section: DigitalSection) {
        let base = Arc::new(section);
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped = stamp_digital(&base, magic, unit_id, false, false);
            sink.write_his_digital(magic, unit_id, &stamped);
        })
        .await;
    }

    /// Batched realtime analog write; used by the fast-cache path, so the
    /// fast and realtime bits are always set.
    pub async fn write_rt_analog_list(&self, sections: Vec<AnalogSection>) {
        let base = Arc::new(sections);
        let randomize = self.randomize.clone();
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped: Vec<AnalogSection> = base
                .iter()
                .map(|s| stamp_analog(s, magic, unit_id, true, true, randomize.as_deref()))
                .collect();
            sink.write_rt_analog_list(magic, unit_id, &stamped);
        })
        .await;
    }

    /// Batched realtime digital write; fast-cache path.
    pub async fn write_rt_digital_list(&self, sections: Vec<DigitalSection>) {
        let base = Arc::new(sections);
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped: Vec<DigitalSection> = base
                .iter()
                .map(|s| stamp_digital(s, magic, unit_id, true, true))
                .collect();
            sink.write_rt_digital_list(magic, unit_id, &stamped);
        })
        .await;
    }

    pub async fn write_static_analog(&self, records: Vec<StaticAnalog>, kind: StaticKind) {
        let base = Arc::new(records);
        let (is_fast, is_realtime) = kind.flags();
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped: Vec<StaticAnalog> = base
                .iter()
                .map(|r| {
                    let mut r = *r;
                    r.global_id = global_id(magic, unit_id, true, is_fast, is_realtime, r.p_num);
                    r
                })
                .collect();
            sink.write_static_analog(magic, unit_id, &stamped, kind.as_raw());
        })
        .await;
    }

    pub async fn write_static_digital(&self, records: Vec<StaticDigital>, kind: StaticKind) {
        let base = Arc::new(records);
        let (is_fast, is_realtime) = kind.flags();
        self.for_each_unit(move |sink, magic, unit_id| {
            let stamped: Vec<StaticDigital> = base
                .iter()
                .map(|r| {
                    let mut r = *r;
                    r.global_id = global_id(magic, unit_id, false, is_fast, is_realtime, r.p_num);
                    r
                })
                .collect();
            sink.write_static_digital(magic, unit_id, &stamped, kind.as_raw());
        })
        .await;
    }

    /// Run `call` once per unit on blocking tasks and join them all.
    ///
    /// A single-unit run skips the task-group machinery but still goes
    /// through a blocking task, since plugin calls may stall indefinitely.
    async fn for_each_unit<F>(&self, call: F)
    where
        F: Fn(Arc<dyn Sink>, u32, u8) + Send + Sync + 'static,
    {
        let magic = self.magic;

        if self.unit_count == 1 {
            let sink = Arc::clone(&self.sink);
            let result = tokio::task::spawn_blocking(move || call(sink, magic, 0)).await;
            if let Err(e) = result {
                warn!(error = %e, "sink call task failed");
            }
            return;
        }

        let call = Arc::new(call);
        let mut units = JoinSet::new();
        for unit_id in 0..self.unit_count {
            let sink = Arc::clone(&self.sink);
            let call = Arc::clone(&call);
            units.spawn_blocking(move || call(sink, magic, unit_id as u8));
        }
        while let Some(result) = units.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "sink call task failed");
            }
        }
    }
}

#[inline]
fn global_id(
    magic: u32,
    unit_id: u8,
    is_analog: bool,
    is_fast: bool,
    is_realtime: bool,
    point_number: i32,
) -> i64 {
    GlobalId {
        magic,
        unit_id,
        is_analog,
        is_fast,
        is_realtime,
        point_number,
    }
    .encode()
}

/// Per-unit copy of an analog section: stamp identifiers, apply the value
/// offset. The base section is untouched.
fn stamp_analog(
    base: &AnalogSection,
    magic: u32,
    unit_id: u8,
    is_fast: bool,
    is_realtime: bool,
    randomize: Option<&dyn Randomize>,
) -> AnalogSection {
    let offset = randomize.map_or(0.0, |r| r.offset(unit_id));
    let records: Vec<Analog> = base
        .records
        .iter()
        .map(|r| {
            let mut r = *r;
            r.global_id = global_id(magic, unit_id, true, is_fast, is_realtime, r.p_num);
            r.av += offset;
            r
        })
        .collect();
    Section::new(base.timestamp, records)
}

/// Per-unit copy of a digital section. Digital values are never perturbed.
fn stamp_digital(
    base: &DigitalSection,
    magic: u32,
    unit_id: u8,
    is_fast: bool,
    is_realtime: bool,
) -> DigitalSection {
    let records: Vec<Digital> = base
        .records
        .iter()
        .map(|r| {
            let mut r = *r;
            r.global_id = global_id(magic, unit_id, false, is_fast, is_realtime, r.p_num);
            r
        })
        .collect();
    Section::new(base.timestamp, records)
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod dispatcher_test;
