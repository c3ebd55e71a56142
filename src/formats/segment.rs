//! Segment descriptors - where each payload region lives and how it is treated.
//!
//! ## Layout (0x30 bytes each, `cert_entry_num` entries)
//! ```text
//! [0x00] SegmentOffset         (u64)
//! [0x08] SegmentSize           (u64)
//! [0x10] SegmentType           (u32)
//! [0x14] SegmentId             (u32)
//! [0x18] SigningAlgorithm      (u32)
//! [0x1C] SigningIdx            (u32)
//! [0x20] EncryptionAlgorithm   (u32)
//! [0x24] KeyIdx                (u32)  0xFFFFFFFF = none
//! [0x28] IvIdx                 (u32)  0xFFFFFFFF = none
//! [0x2C] CompressionAlgorithm  (u32)
//! ```
//!
//! Descriptors only describe segments; the payload bytes are never read here.

use std::io::Read;

use log::trace;

use super::metadata::SignAlgorithm;
use crate::utils::{Endian, end_u32, end_u64};
use crate::{Error, Result};

/// Size of one descriptor on the wire.
pub const SEGMENT_DESCRIPTOR_SIZE: usize = 0x30;

/// Raw value of `key_idx` / `iv_idx` meaning "not applicable".
const NO_INDEX: u32 = 0xFFFF_FFFF;

/// Where the segment came from in the wrapped image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SegmentType {
    SectionHeader = 1,
    ProgramHeader = 2,
    SceVersion = 3,
}

impl TryFrom<u32> for SegmentType {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            1 => Ok(Self::SectionHeader),
            2 => Ok(Self::ProgramHeader),
            3 => Ok(Self::SceVersion),
            _ => Err(Error::InvalidEnum {
                kind: "segment_type",
                value: v,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EncryptionAlgorithm {
    None = 1,
    Aes128CbcCfb = 2,
    Aes128Ctr = 3,
}

impl TryFrom<u32> for EncryptionAlgorithm {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            1 => Ok(Self::None),
            2 => Ok(Self::Aes128CbcCfb),
            3 => Ok(Self::Aes128Ctr),
            _ => Err(Error::InvalidEnum {
                kind: "encryption_algorithm",
                value: v,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CompressionAlgorithm {
    Plain = 1,
    Zlib = 2,
}

impl TryFrom<u32> for CompressionAlgorithm {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            1 => Ok(Self::Plain),
            2 => Ok(Self::Zlib),
            _ => Err(Error::InvalidEnum {
                kind: "compression_algorithm",
                value: v,
            }),
        }
    }
}

/// One payload segment descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub segment_offset: u64,
    pub segment_size: u64,
    pub segment_type: SegmentType,
    pub segment_id: u32,
    pub signing_algorithm: SignAlgorithm,
    pub signing_idx: u32,
    pub encryption_algorithm: EncryptionAlgorithm,
    /// Index into the metadata key table, if the segment has a key.
    pub key_idx: Option<u32>,
    /// Index into the metadata key table, if the segment has an IV.
    pub iv_idx: Option<u32>,
    pub compression_algorithm: CompressionAlgorithm,
}

impl SegmentDescriptor {
    pub fn parse<R: Read>(r: &mut R, e: Endian) -> Result<Self> {
        let segment_offset = end_u64(r, e)?;
        let segment_size = end_u64(r, e)?;
        let segment_type = SegmentType::try_from(end_u32(r, e)?)?;
        let segment_id = end_u32(r, e)?;
        let signing_algorithm = SignAlgorithm::try_from(end_u32(r, e)?)?;
        let signing_idx = end_u32(r, e)?;
        let encryption_algorithm = EncryptionAlgorithm::try_from(end_u32(r, e)?)?;
        let key_idx = index(end_u32(r, e)?);
        let iv_idx = index(end_u32(r, e)?);
        let compression_algorithm = CompressionAlgorithm::try_from(end_u32(r, e)?)?;

        Ok(Self {
            segment_offset,
            segment_size,
            segment_type,
            segment_id,
            signing_algorithm,
            signing_idx,
            encryption_algorithm,
            key_idx,
            iv_idx,
            compression_algorithm,
        })
    }

    /// Read exactly `count` descriptors. Any bad entry fails the whole read.
    pub fn read_all<R: Read>(r: &mut R, count: u32, e: Endian) -> Result<Vec<Self>> {
        // `count` is untrusted input.
        let mut out = Vec::with_capacity(count.min(64) as usize);
        for i in 0..count {
            let seg = Self::parse(r, e)?;
            trace!(
                "segment {i}: {:?} id={} offset={:#x} size={:#x}",
                seg.segment_type, seg.segment_id, seg.segment_offset, seg.segment_size
            );
            out.push(seg);
        }
        Ok(out)
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption_algorithm != EncryptionAlgorithm::None
    }

    pub fn is_compressed(&self) -> bool {
        self.compression_algorithm == CompressionAlgorithm::Zlib
    }
}

fn index(raw: u32) -> Option<u32> {
    if raw == NO_INDEX { None } else { Some(raw) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn descriptor(e: Endian, key_idx: u32, iv_idx: u32, enc: u32) -> Vec<u8> {
        let u32b = |v: u32| match e {
            Endian::Big => v.to_be_bytes(),
            Endian::Little => v.to_le_bytes(),
        };
        let u64b = |v: u64| match e {
            Endian::Big => v.to_be_bytes(),
            Endian::Little => v.to_le_bytes(),
        };
        let mut b = Vec::new();
        b.extend_from_slice(&u64b(0x1000));
        b.extend_from_slice(&u64b(0x2345));
        b.extend_from_slice(&u32b(2));
        b.extend_from_slice(&u32b(4));
        b.extend_from_slice(&u32b(2));
        b.extend_from_slice(&u32b(0));
        b.extend_from_slice(&u32b(enc));
        b.extend_from_slice(&u32b(key_idx));
        b.extend_from_slice(&u32b(iv_idx));
        b.extend_from_slice(&u32b(2));
        b
    }

    #[test]
    fn parses_fields_and_indices() {
        let b = descriptor(Endian::Big, 6, 7, 3);
        assert_eq!(b.len(), SEGMENT_DESCRIPTOR_SIZE);
        let s = SegmentDescriptor::parse(&mut Cursor::new(&b), Endian::Big).unwrap();
        assert_eq!(s.segment_offset, 0x1000);
        assert_eq!(s.segment_size, 0x2345);
        assert_eq!(s.segment_type, SegmentType::ProgramHeader);
        assert_eq!(s.segment_id, 4);
        assert_eq!(s.signing_algorithm, SignAlgorithm::HmacSha1);
        assert_eq!(s.encryption_algorithm, EncryptionAlgorithm::Aes128Ctr);
        assert_eq!(s.key_idx, Some(6));
        assert_eq!(s.iv_idx, Some(7));
        assert!(s.is_encrypted());
        assert!(s.is_compressed());
    }

    #[test]
    fn sentinel_index_is_none() {
        let b = descriptor(Endian::Little, 0xFFFF_FFFF, 0xFFFF_FFFF, 1);
        let s = SegmentDescriptor::parse(&mut Cursor::new(&b), Endian::Little).unwrap();
        assert_eq!(s.key_idx, None);
        assert_eq!(s.iv_idx, None);
        assert!(!s.is_encrypted());

        // one below the sentinel is a real index
        let b = descriptor(Endian::Little, 0xFFFF_FFFE, 0, 1);
        let s = SegmentDescriptor::parse(&mut Cursor::new(&b), Endian::Little).unwrap();
        assert_eq!(s.key_idx, Some(0xFFFF_FFFE));
        assert_eq!(s.iv_idx, Some(0));
    }

    #[test]
    fn read_all_is_all_or_nothing() {
        let mut b = descriptor(Endian::Big, 0, 1, 3);
        b.extend(descriptor(Endian::Big, 2, 3, 9));
        let err = SegmentDescriptor::read_all(&mut Cursor::new(&b), 2, Endian::Big).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEnum {
                kind: "encryption_algorithm",
                value: 9
            }
        ));

        let mut b = descriptor(Endian::Big, 0, 1, 3);
        b.extend(descriptor(Endian::Big, 2, 3, 1));
        let all = SegmentDescriptor::read_all(&mut Cursor::new(&b), 2, Endian::Big).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].key_idx, Some(2));
    }

    /// Overwrite the big-endian u32 at `offset` in a descriptor.
    fn patch(b: &mut [u8], offset: usize, v: u32) {
        b[offset..offset + 4].copy_from_slice(&v.to_be_bytes());
    }

    #[test]
    fn rejects_unknown_segment_type() {
        let mut b = descriptor(Endian::Big, 0, 1, 1);
        patch(&mut b, 0x10, 9);
        assert!(matches!(
            SegmentDescriptor::parse(&mut Cursor::new(&b), Endian::Big),
            Err(Error::InvalidEnum {
                kind: "segment_type",
                value: 9
            })
        ));
    }

    #[test]
    fn rejects_unknown_signing_algorithm() {
        let mut b = descriptor(Endian::Big, 0, 1, 1);
        patch(&mut b, 0x18, 4);
        assert!(matches!(
            SegmentDescriptor::parse(&mut Cursor::new(&b), Endian::Big),
            Err(Error::InvalidEnum {
                kind: "sign_algorithm",
                value: 4
            })
        ));
    }

    #[test]
    fn rejects_unknown_compression_algorithm() {
        let mut b = descriptor(Endian::Big, 0, 1, 1);
        patch(&mut b, 0x2C, 7);
        assert!(matches!(
            SegmentDescriptor::parse(&mut Cursor::new(&b), Endian::Big),
            Err(Error::InvalidEnum {
                kind: "compression_algorithm",
                value: 7
            })
        ));
    }

    #[test]
    fn bad_later_record_fails_whole_table() {
        for (offset, kind, value) in [
            (0x10, "segment_type", 0),
            (0x18, "sign_algorithm", 4),
            (0x2C, "compression_algorithm", 3),
        ] {
            let mut second = descriptor(Endian::Big, 2, 3, 1);
            patch(&mut second, offset, value);
            let mut b = descriptor(Endian::Big, 0, 1, 1);
            b.extend(second);

            let err =
                SegmentDescriptor::read_all(&mut Cursor::new(&b), 2, Endian::Big).unwrap_err();
            assert!(
                matches!(err, Error::InvalidEnum { kind: k, value: v } if k == kind && v == value),
                "{err:?}"
            );
        }
    }

    #[test]
    fn read_all_truncated() {
        let b = descriptor(Endian::Big, 0, 1, 3);
        assert!(matches!(
            SegmentDescriptor::read_all(&mut Cursor::new(&b), 2, Endian::Big),
            Err(Error::Io(_))
        ));
    }
}
