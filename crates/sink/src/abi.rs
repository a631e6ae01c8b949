//! C ABI of the sink plugin
//!
//! The plugin must export this family of functions. Record structs cross
//! the boundary by pointer with the layouts in `rtdb_protocol`; every
//! record carries a populated `global_id`. For the list forms, the pointer
//! arrays are valid only for the duration of the call and the plugin must
//! not retain them.
//!
//! ```c
//! int  login(const char *param);            // 0 = success
//! void logout(void);
//! void write_rt_analog(uint32_t magic, uint8_t unit_id, int64_t time,
//!                      const Analog *data, int64_t count, bool is_fast);
//! void write_rt_digital(uint32_t magic, uint8_t unit_id, int64_t time,
//!                       const Digital *data, int64_t count, bool is_fast);
//! void write_rt_analog_list(uint32_t magic, uint8_t unit_id,
//!                           const int64_t *time_list,
//!                           const Analog *const *data_list,
//!                           const int64_t *count_list, int64_t list_len);
//! void write_rt_digital_list(uint32_t magic, uint8_t unit_id,
//!                            const int64_t *time_list,
//!                            const Digital *const *data_list,
//!                            const int64_t *count_list, int64_t list_len);
//! void write_his_analog(uint32_t magic, uint8_t unit_id, int64_t time,
//!                       const Analog *data, int64_t count);
//! void write_his_digital(uint32_t magic, uint8_t unit_id, int64_t time,
//!                        const Digital *data, int64_t count);
//! void write_static_analog(uint32_t magic, uint8_t unit_id,
//!                          const StaticAnalog *data, int64_t count, int32_t type);
//! void write_static_digital(uint32_t magic, uint8_t unit_id,
//!                           const StaticDigital *data, int64_t count, int32_t type);
//! ```

use std::ffi::{c_char, c_int};

use rtdb_protocol::{Analog, Digital, StaticAnalog, StaticDigital};

pub(crate) type LoginFn = unsafe extern "C" fn(param: *const c_char) -> c_int;

pub(crate) type LogoutFn = unsafe extern "C" fn();

pub(crate) type WriteRtAnalogFn = unsafe extern "C" fn(
    magic: u32,
    unit_id: u8,
    time: i64,
    data: *const Analog,
    count: i64,
    is_fast: bool,
);

pub(crate) type WriteRtDigitalFn = unsafe extern "C" fn(
    magic: u32,
    unit_id: u8,
    time: i64,
    data: *const Digital,
    count: i64,
    is_fast: bool,
);

pub(crate) type WriteRtAnalogListFn = unsafe extern "C" fn(
    magic: u32,
    unit_id: u8,
    time_list: *const i64,
    data_list: *const *const Analog,
    count_list: *const i64,
    list_len: i64,
);

pub(crate) type WriteRtDigitalListFn = unsafe extern "C" fn(
    magic: u32,
    unit_id: u8,
    time_list: *const i64,
    data_list: *const *const Digital,
    count_list: *const i64,
    list_len: i64,
);

pub(crate) type WriteHisAnalogFn =
    unsafe extern "C" fn(magic: u32, unit_id: u8, time: i64, data: *const Analog, count: i64);

pub(crate) type WriteHisDigitalFn =
    unsafe extern "C" fn(magic: u32, unit_id: u8, time: i64, data: *const Digital, count: i64);

pub(crate) type WriteStaticAnalogFn = unsafe extern "C" fn(
    magic: u32,
    unit_id: u8,
    data: *const StaticAnalog,
    count: i64,
    kind: i32,
);

pub(crate) type WriteStaticDigitalFn = unsafe extern "C" fn(
    magic: u32,
    unit_id: u8,
    data: *const StaticDigital,
    count: i64,
    kind: i32,
);
