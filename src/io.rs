//! Single-byte transfers between the tape and external streams.
//!
//! Each call performs exactly one stream operation. Nothing is buffered
//! here; callers wanting buffering wrap their own streams.

use std::fmt;
use std::io::{self, Read, Write};

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoDirection {
    Read,
    Write,
}

impl fmt::Display for IoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoDirection::Read => f.write_str("read"),
            IoDirection::Write => f.write_str("write"),
        }
    }
}

/// A short or failed single-byte transfer.
///
/// `actual` is the number of bytes moved before the failure (0 when the
/// stream returned an error or ran dry).
#[derive(Debug, Error)]
#[error("{direction} failed: expected {expected} byte, transferred {actual}")]
pub struct IoError {
    pub direction: IoDirection,
    pub expected: usize,
    pub actual: usize,
    #[source]
    pub source: Option<io::Error>,
}

impl IoError {
    fn short(direction: IoDirection, actual: usize) -> Self {
        Self {
            direction,
            expected: 1,
            actual,
            source: None,
        }
    }

    fn failed(direction: IoDirection, source: io::Error) -> Self {
        Self {
            direction,
            expected: 1,
            actual: 0,
            source: Some(source),
        }
    }
}

/// Read exactly one byte. End-of-stream is an error.
pub fn read_byte<R: Read + ?Sized>(stream: &mut R) -> Result<u8, IoError> {
    let mut buf = [0u8; 1];
    loop {
        match stream.read(&mut buf) {
            Ok(1) => return Ok(buf[0]),
            Ok(n) => return Err(IoError::short(IoDirection::Read, n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(IoError::failed(IoDirection::Read, e)),
        }
    }
}

/// Write exactly one byte.
pub fn write_byte<W: Write + ?Sized>(stream: &mut W, value: u8) -> Result<(), IoError> {
    loop {
        match stream.write(&[value]) {
            Ok(1) => return Ok(()),
            Ok(n) => return Err(IoError::short(IoDirection::Write, n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(IoError::failed(IoDirection::Write, e)),
        }
    }
}
