//! Static descriptor loaders
//!
//! Static CSVs are small and written once per run, so they are read whole
//! rather than streamed. Same skip rules as the section readers.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::StringRecord;
use rtdb_protocol::{RowOutcome, RowRecord, StaticAnalog, StaticDigital};
use tracing::warn;

use crate::cr_filter::CrFilterReader;
use crate::error::SourceError;

/// Read a whole static analog descriptor file.
pub fn read_static_analog(path: &Path) -> crate::Result<Vec<StaticAnalog>> {
    read_static(path)
}

/// Read a whole static digital descriptor file.
pub fn read_static_digital(path: &Path) -> crate::Result<Vec<StaticDigital>> {
    read_static(path)
}

fn read_static<T: RowRecord>(path: &Path) -> crate::Result<Vec<T>> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(CrFilterReader::new(BufReader::new(file)));

    let label = path.display().to_string();
    let mut records = Vec::new();
    let mut row = StringRecord::new();

    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!(file = %label, error = %e, "error reading record");
                continue;
            }
        }

        match T::decode(&row) {
            Ok(RowOutcome::Record { record, .. }) => records.push(record),
            Ok(RowOutcome::Header) | Ok(RowOutcome::Tail) => {}
            Err(e) => warn!(file = %label, error = %e, "error parsing record"),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_static_digital_loads_body_rows() {
        let file = write_temp(
            "P_NUM,FACK,CHN,PN,DESC,UNIT\n\
             1,0,ch0,dp1,first point,state\n\
             2,1,ch0,dp2,second point,state\n\
             eof\n",
        );

        let records = read_static_digital(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].p_num, 1);
        assert_eq!(records[1].p_num, 2);
        assert_eq!(records[1].fack, 1);
    }

    #[test]
    fn test_static_analog_skips_malformed_rows() {
        let file = write_temp(
            "5,2,1,1,0,1,0,0,1,0,1,chn,pn,desc,unit,100.0,-100.0\n\
             bad,2,1,1,0,1,0,0,1,0,1,chn,pn,desc,unit,100.0,-100.0\n",
        );

        let records = read_static_analog(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].p_num, 5);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = read_static_analog(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("can not open file"));
    }
}
