//! Carriage-return normalization
//!
//! Some source files terminate lines with `\r\r` or a lone `\r`. Rewriting
//! every `\r` to `\n` before CSV framing turns those into ordinary (possibly
//! blank) lines, which the CSV reader skips. The rewrite is idempotent.

use std::io::{self, Read};

/// A `Read` adapter that replaces every `\r` byte with `\n`.
#[derive(Debug)]
pub struct CrFilterReader<R> {
    inner: R,
}

impl<R: Read> CrFilterReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for CrFilterReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for byte in &mut buf[..n] {
            if *byte == b'\r' {
                *byte = b'\n';
            }
        }
        Ok(n)
    }
}
