//! Optional header table - a chained list of self-describing records.
//!
//! ## Record layout
//! ```text
//! [0x00] Type          (u32)  1 = capability, 2 = individual seed, 3 = attribute
//! [0x04] Size          (u32)  whole record, including these 0x10 bytes
//! [0x08] Next          (u64)  nonzero = another record follows
//! [0x10] Payload              0x20 / 0x100 / 0x20 bytes by type
//! ```
//!
//! The metadata header declares the table's total size up front. Two
//! accounts are kept while reading: every record must consume exactly the
//! size it declares, and the records together must consume exactly the
//! declared table size. Reads never go past the declared table.

use std::io::Read;

use log::trace;

use super::drm::EncryptedCapability;
use crate::utils::{Counted, Endian, bytesa, end_u32, end_u64};
use crate::{Error, Result};

/// Size of the tag + size + next fields preceding every payload.
pub const RECORD_HEADER_SIZE: u64 = 0x10;

const TYPE_CAPABILITY: u32 = 1;
const TYPE_INDIVIDUAL_SEED: u32 = 2;
const TYPE_ATTRIBUTE: u32 = 3;

/// One decoded optional header. Size and chaining fields are wire-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionalHeader {
    Capability(EncryptedCapability),
    IndividualSeed(Box<[u8; 0x100]>),
    Attribute([u8; 0x20]),
}

impl OptionalHeader {
    /// Wire type tag of this entry.
    pub fn tag(&self) -> u32 {
        match self {
            OptionalHeader::Capability(_) => TYPE_CAPABILITY,
            OptionalHeader::IndividualSeed(_) => TYPE_INDIVIDUAL_SEED,
            OptionalHeader::Attribute(_) => TYPE_ATTRIBUTE,
        }
    }

    fn payload_size(tag: u32) -> Result<u64> {
        match tag {
            TYPE_CAPABILITY => Ok(EncryptedCapability::SIZE as u64),
            TYPE_INDIVIDUAL_SEED => Ok(0x100),
            TYPE_ATTRIBUTE => Ok(0x20),
            _ => Err(Error::InvalidEnum {
                kind: "optional_header_type",
                value: tag,
            }),
        }
    }

    fn read_payload<R: Read>(r: &mut R, tag: u32, e: Endian) -> Result<Self> {
        match tag {
            TYPE_CAPABILITY => Ok(Self::Capability(EncryptedCapability::parse(r, e)?)),
            TYPE_INDIVIDUAL_SEED => Ok(Self::IndividualSeed(Box::new(bytesa(r)?))),
            TYPE_ATTRIBUTE => Ok(Self::Attribute(bytesa(r)?)),
            _ => Err(Error::InvalidEnum {
                kind: "optional_header_type",
                value: tag,
            }),
        }
    }

    /// Read a whole table of `table_size` bytes.
    ///
    /// A zero-sized table yields no entries and reads nothing. Reading stops
    /// after a record whose `next` field is zero, or once the declared size
    /// is used up.
    pub fn read_table<R: Read>(r: &mut R, table_size: u32, e: Endian) -> Result<Vec<Self>> {
        let mut entries = Vec::new();
        if table_size == 0 {
            return Ok(entries);
        }

        let declared = u64::from(table_size);
        let mut remaining = declared;
        let mut consumed = 0u64;
        loop {
            if remaining < RECORD_HEADER_SIZE {
                return Err(overrun(table_size, consumed + RECORD_HEADER_SIZE));
            }
            let tag = end_u32(r, e)?;
            let record_size = end_u32(r, e)?;
            let more = end_u64(r, e)? != 0;

            let payload_len = Self::payload_size(tag)?;
            if RECORD_HEADER_SIZE + payload_len > remaining {
                return Err(overrun(table_size, consumed + RECORD_HEADER_SIZE + payload_len));
            }

            let mut counted = Counted::new(&mut *r);
            let entry = Self::read_payload(&mut counted, tag, e)?;
            let record_consumed = RECORD_HEADER_SIZE + counted.count();
            if record_consumed != u64::from(record_size) {
                return Err(Error::OptionalHeaderSizeMismatch {
                    declared: record_size,
                    consumed: record_consumed,
                });
            }

            trace!("optional header: type {tag} ({record_size:#x} bytes), next={more}");
            entries.push(entry);
            remaining -= record_consumed;
            consumed += record_consumed;

            if !more || remaining == 0 {
                break;
            }
        }

        if consumed != declared {
            return Err(overrun(table_size, consumed));
        }
        Ok(entries)
    }
}

fn overrun(declared: u32, consumed: u64) -> Error {
    Error::OptionalHeaderTableSizeMismatch { declared, consumed }
}
