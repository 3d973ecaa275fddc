use std::fmt;

/// One decoded record line. Only lives long enough to be applied to an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub addr: u16,
    pub kind: RecordKind,
    pub data: Vec<u8>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Data,
    EndOfFile,
}

impl RecordKind {
    pub fn from_int(kind: u8) -> Option<Self> {
        use RecordKind::*;
        match kind {
            0 => Some(Data),
            1 => Some(EndOfFile),
            _ => None,
        }
    }

    pub fn to_int(self) -> u8 {
        match self {
            RecordKind::Data => 0,
            RecordKind::EndOfFile => 1,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RecordKind::*;
        match self {
            Data => write!(f, "Data"),
            EndOfFile => write!(f, "EndOfFile"),
        }
    }
}

/// Size of the 16-bit address space every image lives in.
pub const ADDRESS_SPACE: usize = 0x1_0000;
