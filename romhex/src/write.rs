use std::cmp::min;
use std::fmt;
use std::io::{self, Write};

use log::debug;

use crate::common::ADDRESS_SPACE;
use crate::record::{encode_data_record, EOF_RECORD, MAX_DATA_RECORD_LEN};

/// Terminator written after every record.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of at most [`MAX_DATA_RECORD_LEN`] bytes and the address it loads at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub addr: u16,
    pub data: &'a [u8],
}

/// Splits `data` into data-record sized chunks. The first byte of `data`
/// loads at `offset`; addresses wrap at 64K.
pub fn data_chunks(data: &[u8], offset: u16) -> DataChunks<'_> {
    DataChunks {
        remaining: data,
        position: 0,
        offset,
    }
}

pub struct DataChunks<'a> {
    remaining: &'a [u8],
    position: usize,
    offset: u16,
}

impl<'a> Iterator for DataChunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let size = min(self.remaining.len(), MAX_DATA_RECORD_LEN);
        let (data, rest) = self.remaining.split_at(size);
        let addr = ((self.position + self.offset as usize) % ADDRESS_SPACE) as u16;
        self.remaining = rest;
        self.position += size;
        Some(Chunk { addr, data })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.remaining.len().div_ceil(MAX_DATA_RECORD_LEN);
        (count, Some(count))
    }
}

impl ExactSizeIterator for DataChunks<'_> {}

/// Writes all of `data` as data records followed by the end-of-file record.
/// Fill bytes are written like any others. Returns the number of data records.
pub fn write_hex<W: Write>(
    mut out: W,
    data: &[u8],
    offset: u16,
    line_ending: LineEnding,
) -> io::Result<usize> {
    let mut records = 0;
    for chunk in data_chunks(data, offset) {
        write!(out, "{}{line_ending}", encode_data_record(chunk.addr, chunk.data))?;
        records += 1;
    }
    write!(out, "{EOF_RECORD}{line_ending}")?;
    out.flush()?;
    debug!("{} bytes in {records} data records from 0x{offset:04X}", data.len());
    Ok(records)
}
