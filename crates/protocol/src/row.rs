//! Row-level CSV decoding
//!
//! One decoder shape for all four schemas. A row classifies as exactly one
//! of: header (first field is a literal column name), tail (column count
//! differs from the schema), a decoded record, or a [`DecodeError`].
//!
//! Header and tail detection by field-0 equality and column count is
//! fragile but matches the file format in the wild.

use std::str::FromStr;

use csv::StringRecord;

use crate::error::DecodeError;
use crate::records::{Analog, Digital, StaticAnalog, StaticDigital};

/// Classification of one CSV row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    /// A decoded body record. Static schemas carry no timestamp and use 0.
    Record { timestamp: i64, record: T },
    /// Column-name row; skipped silently
    Header,
    /// Row with an unexpected column count; skipped silently
    Tail,
}

/// A record type decodable from one CSV row.
pub trait RowRecord: Sized + Send + 'static {
    /// Expected column count for a body row
    const FIELD_COUNT: usize;

    /// Decode one row; errors carry the offending field text
    fn decode(row: &StringRecord) -> crate::Result<RowOutcome<Self>>;
}

/// Header/tail pre-classification shared by all schemas.
fn classify<T>(row: &StringRecord, expected: usize) -> Option<RowOutcome<T>> {
    match row.get(0) {
        Some("TIME") | Some("P_NUM") => return Some(RowOutcome::Header),
        _ => {}
    }
    if row.len() != expected {
        return Some(RowOutcome::Tail);
    }
    None
}

fn parse<T: FromStr>(row: &StringRecord, idx: usize, field: &'static str) -> crate::Result<T> {
    let text = row.get(idx).unwrap_or_default();
    text.parse().map_err(|_| DecodeError::field(field, text))
}

/// Boolean fields accept `1/0`, `t/f`, `T/F`, `true/false`, `True/False`,
/// `TRUE/FALSE`.
fn parse_bool(row: &StringRecord, idx: usize, field: &'static str) -> crate::Result<bool> {
    let text = row.get(idx).unwrap_or_default();
    match text {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Ok(false),
        _ => Err(DecodeError::field(field, text)),
    }
}

/// `TEW` must be exactly one byte.
fn parse_tew(row: &StringRecord, idx: usize) -> crate::Result<i8> {
    let text = row.get(idx).unwrap_or_default();
    match text.as_bytes() {
        [b] => Ok(*b as i8),
        _ => Err(DecodeError::TerminalEndWord {
            value: text.to_string(),
        }),
    }
}

/// Status words are parsed at 32-bit width and stored truncated to 16 bits.
fn parse_u16_truncating(
    row: &StringRecord,
    idx: usize,
    field: &'static str,
) -> crate::Result<u16> {
    Ok(parse::<i32>(row, idx, field)? as u16)
}

/// Byte-wise copy into a fixed-width field, up to capacity. No NUL
/// terminator, no UTF-8 validation.
fn copy_fixed<const N: usize>(src: &str) -> [i8; N] {
    let mut dst = [0i8; N];
    for (d, b) in dst.iter_mut().zip(src.bytes()) {
        *d = b as i8;
    }
    dst
}

impl RowRecord for Analog {
    // TIME,P_NUM,AV,AVR,Q,BF,FQ,FAI,MS,TEW,CST
    const FIELD_COUNT: usize = 11;

    fn decode(row: &StringRecord) -> crate::Result<RowOutcome<Self>> {
        if let Some(outcome) = classify(row, Self::FIELD_COUNT) {
            return Ok(outcome);
        }

        let timestamp = parse::<i64>(row, 0, "TIME")?;
        let record = Analog {
            global_id: 0,
            p_num: parse(row, 1, "P_NUM")?,
            av: parse(row, 2, "AV")?,
            avr: parse(row, 3, "AVR")?,
            q: parse_bool(row, 4, "Q")?,
            bf: parse_bool(row, 5, "BF")?,
            qf: parse_bool(row, 6, "FQ")?,
            fai: parse(row, 7, "FAI")?,
            ms: parse_bool(row, 8, "MS")?,
            tew: parse_tew(row, 9)?,
            cst: parse_u16_truncating(row, 10, "CST")?,
        };

        Ok(RowOutcome::Record { timestamp, record })
    }
}

impl RowRecord for Digital {
    // TIME,P_NUM,DV,DVR,Q,BF,BQ,FAI,MS,TEW,CST
    const FIELD_COUNT: usize = 11;

    fn decode(row: &StringRecord) -> crate::Result<RowOutcome<Self>> {
        if let Some(outcome) = classify(row, Self::FIELD_COUNT) {
            return Ok(outcome);
        }

        let timestamp = parse::<i64>(row, 0, "TIME")?;
        let record = Digital {
            global_id: 0,
            p_num: parse(row, 1, "P_NUM")?,
            dv: parse_bool(row, 2, "DV")?,
            dvr: parse_bool(row, 3, "DVR")?,
            q: parse_bool(row, 4, "Q")?,
            bf: parse_bool(row, 5, "BF")?,
            bq: parse_bool(row, 6, "BQ")?,
            fai: parse_bool(row, 7, "FAI")?,
            ms: parse_bool(row, 8, "MS")?,
            tew: parse_tew(row, 9)?,
            cst: parse_u16_truncating(row, 10, "CST")?,
        };

        Ok(RowOutcome::Record { timestamp, record })
    }
}

impl RowRecord for StaticAnalog {
    // P_NUM,TAGT,FACK,L4AR,L3AR,L2AR,L1AR,H4AR,H3AR,H2AR,H1AR,CHN,PN,DESC,UNIT,MU,MD
    const FIELD_COUNT: usize = 17;

    fn decode(row: &StringRecord) -> crate::Result<RowOutcome<Self>> {
        if let Some(outcome) = classify(row, Self::FIELD_COUNT) {
            return Ok(outcome);
        }

        let record = StaticAnalog {
            global_id: 0,
            p_num: parse(row, 0, "P_NUM")?,
            tagt: parse_u16_truncating(row, 1, "TAGT")?,
            fack: parse_u16_truncating(row, 2, "FACK")?,
            l4ar: parse_bool(row, 3, "L4AR")?,
            l3ar: parse_bool(row, 4, "L3AR")?,
            l2ar: parse_bool(row, 5, "L2AR")?,
            l1ar: parse_bool(row, 6, "L1AR")?,
            h4ar: parse_bool(row, 7, "H4AR")?,
            h3ar: parse_bool(row, 8, "H3AR")?,
            h2ar: parse_bool(row, 9, "H2AR")?,
            h1ar: parse_bool(row, 10, "H1AR")?,
            chn: copy_fixed(row.get(11).unwrap_or_default()),
            pn: copy_fixed(row.get(12).unwrap_or_default()),
            desc: copy_fixed(row.get(13).unwrap_or_default()),
            unit: copy_fixed(row.get(14).unwrap_or_default()),
            mu: parse(row, 15, "MU")?,
            md: parse(row, 16, "MD")?,
        };

        Ok(RowOutcome::Record {
            timestamp: 0,
            record,
        })
    }
}

impl RowRecord for StaticDigital {
    // P_NUM,FACK,CHN,PN,DESC,UNIT
    const FIELD_COUNT: usize = 6;

    fn decode(row: &StringRecord) -> crate::Result<RowOutcome<Self>> {
        if let Some(outcome) = classify(row, Self::FIELD_COUNT) {
            return Ok(outcome);
        }

        let record = StaticDigital {
            global_id: 0,
            p_num: parse(row, 0, "P_NUM")?,
            fack: parse_u16_truncating(row, 1, "FACK")?,
            chn: copy_fixed(row.get(2).unwrap_or_default()),
            pn: copy_fixed(row.get(3).unwrap_or_default()),
            desc: copy_fixed(row.get(4).unwrap_or_default()),
            unit: copy_fixed(row.get(5).unwrap_or_default()),
        };

        Ok(RowOutcome::Record {
            timestamp: 0,
            record,
        })
    }
}

#[cfg(test)]
#[path = "row_test.rs"]
mod row_test;
