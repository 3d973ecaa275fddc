use std::fmt;
use std::io;

use crate::record::ParseRecordError;

/// Everything that can go wrong while decoding into or encoding from an image.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Record {
        line_no: usize,
        error: ParseRecordError,
    },
    MissingEofRecord,
    AddressOutOfRange {
        address: u16,
        capacity: usize,
    },
    WriteConflict {
        address: u16,
        existing: u8,
        incoming: u8,
    },
    BufferOverflow {
        capacity: usize,
        needed: usize,
    },
    InvalidCapacity(usize),
}

/// The coarse classification callers report on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedRecord,
    UnknownRecordType,
    ChecksumMismatch,
    AddressOutOfRange,
    WriteConflict,
    BufferOverflow,
    IoError,
    InvalidConfig,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::IoError,
            Error::Record { error, .. } => match error {
                ParseRecordError::UnknownType(_) => ErrorKind::UnknownRecordType,
                ParseRecordError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
                ParseRecordError::ParseField { .. } | ParseRecordError::TrailingCharacters(_) => {
                    ErrorKind::MalformedRecord
                }
            },
            Error::MissingEofRecord => ErrorKind::MalformedRecord,
            Error::AddressOutOfRange { .. } => ErrorKind::AddressOutOfRange,
            Error::WriteConflict { .. } => ErrorKind::WriteConflict,
            Error::BufferOverflow { .. } => ErrorKind::BufferOverflow,
            Error::InvalidCapacity(_) => ErrorKind::InvalidConfig,
        }
    }
}

pub(crate) fn record_error(line_no: usize, error: ParseRecordError) -> Error {
    Error::Record { line_no, error }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;
        match self {
            Io(error) => write!(f, "{error}"),
            Record { line_no, error } => write!(f, "bad .HEX record on line {line_no}: {error}"),
            MissingEofRecord => write!(f, "bad .HEX file format: no end of file record"),
            AddressOutOfRange { address, capacity } => write!(
                f,
                "address 0x{address:04X} outside ROM of {capacity} bytes"
            ),
            WriteConflict {
                address,
                existing,
                incoming,
            } => write!(
                f,
                "conflict at address 0x{address:04X}: holds {existing:02X}, record has {incoming:02X}"
            ),
            BufferOverflow { capacity, needed } => write!(
                f,
                "{needed} bytes do not fit in an image of {capacity} bytes"
            ),
            InvalidCapacity(capacity) => {
                write!(f, "image size {capacity} must be between 1 and 65536 bytes")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            Error::Record { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
