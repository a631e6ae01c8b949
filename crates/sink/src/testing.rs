//! In-memory sink for tests
//!
//! Records every call with full argument copies so pipeline and dispatcher
//! tests can assert on exactly what crossed the plugin boundary.

use std::sync::Mutex;

use rtdb_protocol::{AnalogSection, DigitalSection, StaticAnalog, StaticDigital};

use crate::sink::Sink;

/// One captured plugin call.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Login {
        param: Option<String>,
    },
    Logout,
    RtAnalog {
        magic: u32,
        unit_id: u8,
        section: AnalogSection,
        is_fast: bool,
    },
    RtDigital {
        magic: u32,
        unit_id: u8,
        section: DigitalSection,
        is_fast: bool,
    },
    RtAnalogList {
        magic: u32,
        unit_id: u8,
        sections: Vec<AnalogSection>,
    },
    RtDigitalList {
        magic: u32,
        unit_id: u8,
        sections: Vec<DigitalSection>,
    },
    HisAnalog {
        magic: u32,
        unit_id: u8,
        section: AnalogSection,
    },
    HisDigital {
        magic: u32,
        unit_id: u8,
        section: DigitalSection,
    },
    StaticAnalog {
        magic: u32,
        unit_id: u8,
        records: Vec<StaticAnalog>,
        kind: i32,
    },
    StaticDigital {
        magic: u32,
        unit_id: u8,
        records: Vec<StaticDigital>,
        kind: i32,
    },
}

/// A [`Sink`] that captures calls instead of writing anywhere.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    /// Status code returned from `login`
    pub login_code: i32,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose login fails with `code`.
    pub fn failing_login(code: i32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            login_code: code,
        }
    }

    /// Snapshot of every call so far, in issue order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Sink for RecordingSink {
    fn login(&self, param: Option<&str>) -> i32 {
        self.record(SinkCall::Login {
            param: param.map(String::from),
        });
        self.login_code
    }

    fn logout(&self) {
        self.record(SinkCall::Logout);
    }

    fn write_rt_analog(&self, magic: u32, unit_id: u8, section: &AnalogSection, is_fast: bool) {
        self.record(SinkCall::RtAnalog {
            magic,
            unit_id,
            section: section.clone(),
            is_fast,
        });
    }

    fn write_rt_digital(&self, magic: u32, unit_id: u8, section: &DigitalSection, is_fast: bool) {
        self.record(SinkCall::RtDigital {
            magic,
            unit_id,
            section: section.clone(),
            is_fast,
        });
    }

    fn write_rt_analog_list(&self, magic: u32, unit_id: u8, sections: &[AnalogSection]) {
        self.record(SinkCall::RtAnalogList {
            magic,
            unit_id,
            sections: sections.to_vec(),
        });
    }

    fn write_rt_digital_list(&self, magic: u32, unit_id: u8, sections: &[DigitalSection]) {
        self.record(SinkCall::RtDigitalList {
            magic,
            unit_id,
            sections: sections.to_vec(),
        });
    }

    fn write_his_analog(&self, magic: u32, unit_id: u8, section: &AnalogSection) {
        self.record(SinkCall::HisAnalog {
            magic,
            unit_id,
            section: section.clone(),
        });
    }

    fn write_his_digital(&self, magic: u32, unit_id: u8, section: &DigitalSection) {
        self.record(SinkCall::HisDigital {
            magic,
            unit_id,
            section: section.clone(),
        });
    }

    fn write_static_analog(&self, magic: u32, unit_id: u8, records: &[StaticAnalog], kind: i32) {
        self.record(SinkCall::StaticAnalog {
            magic,
            unit_id,
            records: records.to_vec(),
            kind,
        });
    }

    fn write_static_digital(&self, magic: u32, unit_id: u8, records: &[StaticDigital], kind: i32) {
        self.record(SinkCall::StaticDigital {
            magic,
            unit_id,
            records: records.to_vec(),
            kind,
        });
    }
}
