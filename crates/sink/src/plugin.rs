//! Dynamic-library sink plugin
//!
//! Loads the sink at a path and resolves every exported function once into
//! a typed vtable. The `Library` is kept alive for as long as any symbol,
//! so the raw (unbounded-lifetime) symbol form is sound here.

use std::ffi::CString;
use std::path::Path;
use std::ptr;

use libloading::Library;
use rtdb_protocol::{AnalogSection, DigitalSection, StaticAnalog, StaticDigital};
use tracing::info;

use crate::abi::{
    LoginFn, LogoutFn, WriteHisAnalogFn, WriteHisDigitalFn, WriteRtAnalogFn, WriteRtAnalogListFn,
    WriteRtDigitalFn, WriteRtDigitalListFn, WriteStaticAnalogFn, WriteStaticDigitalFn,
};
use crate::error::SinkError;
use crate::sink::Sink;

#[cfg(unix)]
type RawSymbol<T> = libloading::os::unix::Symbol<T>;
#[cfg(windows)]
type RawSymbol<T> = libloading::os::windows::Symbol<T>;

struct Vtable {
    login: RawSymbol<LoginFn>,
    logout: RawSymbol<LogoutFn>,
    write_rt_analog: RawSymbol<WriteRtAnalogFn>,
    write_rt_digital: RawSymbol<WriteRtDigitalFn>,
    write_rt_analog_list: RawSymbol<WriteRtAnalogListFn>,
    write_rt_digital_list: RawSymbol<WriteRtDigitalListFn>,
    write_his_analog: RawSymbol<WriteHisAnalogFn>,
    write_his_digital: RawSymbol<WriteHisDigitalFn>,
    write_static_analog: RawSymbol<WriteStaticAnalogFn>,
    write_static_digital: RawSymbol<WriteStaticDigitalFn>,
}

/// The loaded sink plugin. Immutable after load; calls are issued
/// concurrently across units, thread safety inside the plugin is part of
/// its contract.
pub struct WritePlugin {
    vtable: Vtable,
    // Dropped after the vtable; symbols must not outlive the mapping.
    _lib: Library,
}

unsafe fn resolve<T>(
    lib: &Library,
    path: &Path,
    symbol: &'static str,
) -> crate::Result<RawSymbol<T>> {
    // SAFETY: the caller pairs each symbol name with its ABI type from `abi`.
    unsafe {
        lib.get::<T>(symbol.as_bytes())
            .map(|s| s.into_raw())
            .map_err(|source| SinkError::Symbol {
                path: path.to_path_buf(),
                symbol,
                source,
            })
    }
}

impl WritePlugin {
    /// Load the plugin and resolve all required exports.
    pub fn load(path: &Path) -> crate::Result<Self> {
        // SAFETY: loading runs the library's initializers; the plugin is
        // trusted code supplied by the operator.
        let lib = unsafe { Library::new(path) }.map_err(|source| SinkError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let vtable = unsafe {
            Vtable {
                login: resolve(&lib, path, "login")?,
                logout: resolve(&lib, path, "logout")?,
                write_rt_analog: resolve(&lib, path, "write_rt_analog")?,
                write_rt_digital: resolve(&lib, path, "write_rt_digital")?,
                write_rt_analog_list: resolve(&lib, path, "write_rt_analog_list")?,
                write_rt_digital_list: resolve(&lib, path, "write_rt_digital_list")?,
                write_his_analog: resolve(&lib, path, "write_his_analog")?,
                write_his_digital: resolve(&lib, path, "write_his_digital")?,
                write_static_analog: resolve(&lib, path, "write_static_analog")?,
                write_static_digital: resolve(&lib, path, "write_static_digital")?,
            }
        };

        info!(plugin = %path.display(), "sink plugin loaded");
        Ok(Self { vtable, _lib: lib })
    }
}

impl Sink for WritePlugin {
    fn login(&self, param: Option<&str>) -> i32 {
        let param = param.map(|p| CString::new(p).unwrap_or_default());
        let ptr = param.as_ref().map_or(ptr::null(), |p| p.as_ptr());
        // SAFETY: `param` outlives the call; a null pointer means no parameter.
        unsafe { (self.vtable.login)(ptr) }
    }

    fn logout(&self) {
        unsafe { (self.vtable.logout)() }
    }

    fn write_rt_analog(&self, magic: u32, unit_id: u8, section: &AnalogSection, is_fast: bool) {
        // SAFETY: the record buffer outlives the call; count matches its length.
        unsafe {
            (self.vtable.write_rt_analog)(
                magic,
                unit_id,
                section.timestamp,
                section.records.as_ptr(),
                section.records.len() as i64,
                is_fast,
            )
        }
    }

    fn write_rt_digital(&self, magic: u32, unit_id: u8, section: &DigitalSection, is_fast: bool) {
        unsafe {
            (self.vtable.write_rt_digital)(
                magic,
                unit_id,
                section.timestamp,
                section.records.as_ptr(),
                section.records.len() as i64,
                is_fast,
            )
        }
    }

    fn write_rt_analog_list(&self, magic: u32, unit_id: u8, sections: &[AnalogSection]) {
        let (times, data, counts) = marshal_list(sections, |s| (s.timestamp, &s.records));
        // SAFETY: all three arrays and every record buffer outlive the call;
        // the plugin must not retain the pointers.
        unsafe {
            (self.vtable.write_rt_analog_list)(
                magic,
                unit_id,
                times.as_ptr(),
                data.as_ptr(),
                counts.as_ptr(),
                sections.len() as i64,
            )
        }
    }

    fn write_rt_digital_list(&self, magic: u32, unit_id: u8, sections: &[DigitalSection]) {
        let (times, data, counts) = marshal_list(sections, |s| (s.timestamp, &s.records));
        unsafe {
            (self.vtable.write_rt_digital_list)(
                magic,
                unit_id,
                times.as_ptr(),
                data.as_ptr(),
                counts.as_ptr(),
                sections.len() as i64,
            )
        }
    }

    fn write_his_analog(&self, magic: u32, unit_id: u8, section: &AnalogSection) {
        unsafe {
            (self.vtable.write_his_analog)(
                magic,
                unit_id,
                section.timestamp,
                section.records.as_ptr(),
                section.records.len() as i64,
            )
        }
    }

    fn write_his_digital(&self, magic: u32, unit_id: u8, section: &DigitalSection) {
        unsafe {
            (self.vtable.write_his_digital)(
                magic,
                unit_id,
                section.timestamp,
                section.records.as_ptr(),
                section.records.len() as i64,
            )
        }
    }

    fn write_static_analog(&self, magic: u32, unit_id: u8, records: &[StaticAnalog], kind: i32) {
        unsafe {
            (self.vtable.write_static_analog)(
                magic,
                unit_id,
                records.as_ptr(),
                records.len() as i64,
                kind,
            )
        }
    }

    fn write_static_digital(&self, magic: u32, unit_id: u8, records: &[StaticDigital], kind: i32) {
        unsafe {
            (self.vtable.write_static_digital)(
                magic,
                unit_id,
                records.as_ptr(),
                records.len() as i64,
                kind,
            )
        }
    }
}

/// Build the parallel timestamp / pointer / count arrays for a list call.
fn marshal_list<'a, S, T: 'a>(
    sections: &'a [S],
    parts: impl Fn(&'a S) -> (i64, &'a Vec<T>),
) -> (Vec<i64>, Vec<*const T>, Vec<i64>) {
    let mut times = Vec::with_capacity(sections.len());
    let mut data = Vec::with_capacity(sections.len());
    let mut counts = Vec::with_capacity(sections.len());
    for section in sections {
        let (time, records) = parts(section);
        times.push(time);
        data.push(records.as_ptr());
        counts.push(records.len() as i64);
    }
    (times, data, counts)
}
