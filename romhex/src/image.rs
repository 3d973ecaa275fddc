use crate::common::ADDRESS_SPACE;
use crate::error::{Error, Result};

/// A ROM image covering up to the whole 16-bit address space.
///
/// Every location starts out holding the fill byte, which doubles as the
/// "not yet written" marker. HEX addresses map onto the image by
/// subtracting `offset` modulo 64K.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    bytes: Vec<u8>,
    offset: u16,
    fill: u8,
}

/// What happened to a byte handed to [`ImageBuffer::store`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Store {
    /// The location still held the fill byte and now holds the new value.
    Written,
    /// The location already held this value, or the value is the fill byte.
    Redundant,
}

impl ImageBuffer {
    pub fn new(capacity: usize, offset: u16, fill: u8) -> Result<Self> {
        if capacity == 0 || capacity > ADDRESS_SPACE {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(ImageBuffer {
            bytes: vec![fill; capacity],
            offset,
            fill,
        })
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Index into the image for a HEX address, whether or not it fits.
    pub fn logical_index(&self, address: u16) -> usize {
        address.wrapping_sub(self.offset) as usize
    }

    /// Stores a byte arriving at a HEX address, refusing to clobber data.
    ///
    /// A location holding the fill byte accepts anything. Otherwise the
    /// incoming byte must either match what is there or be the fill byte
    /// itself, which never conflicts and never overwrites.
    pub fn store(&mut self, address: u16, byte: u8) -> Result<Store> {
        let idx = self.logical_index(address);
        let fill = self.fill;
        let capacity = self.capacity();
        let slot = self
            .bytes
            .get_mut(idx)
            .ok_or(Error::AddressOutOfRange { address, capacity })?;

        if *slot == fill {
            *slot = byte;
            Ok(if byte == fill {
                Store::Redundant
            } else {
                Store::Written
            })
        } else if byte == *slot || byte == fill {
            Ok(Store::Redundant)
        } else {
            Err(Error::WriteConflict {
                address,
                existing: *slot,
                incoming: byte,
            })
        }
    }

    /// Places a byte at a logical index without any conflict checking.
    /// Returns `false` when the index is past the end of the image.
    pub fn put(&mut self, idx: usize, byte: u8) -> bool {
        match self.bytes.get_mut(idx) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }
}
