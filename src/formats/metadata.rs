//! Metadata header - the first plaintext structure behind the encryption root.
//!
//! ## Layout (0x20 bytes, byte order of the outer header)
//! ```text
//! [0x00] SignOffset          (u64)  absolute offset of the signature trailer
//! [0x08] SignAlgorithm       (u32)
//! [0x0C] CertEntryNum        (u32)  number of segment descriptors
//! [0x10] AttrEntryNum        (u32)  number of optional header entries
//! [0x14] OptionalHeaderSize  (u32)  byte length of the optional header table
//! [0x18] Pad                 (u64)
//! ```
//!
//! The bytes must already be decrypted; see [`crate::crypto::stream`].

use std::io::Read;

use log::debug;

use crate::utils::{Endian, end_u32, end_u64};
use crate::{Error, Result};

/// Size of the metadata header on the wire.
pub const METADATA_HEADER_SIZE: usize = 0x20;

/// Algorithm signing the container, or a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SignAlgorithm {
    Ecdsa160 = 1,
    HmacSha1 = 2,
    Sha1 = 3,
    Rsa2048 = 5,
    HmacSha256 = 6,
}

impl TryFrom<u32> for SignAlgorithm {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            1 => Ok(Self::Ecdsa160),
            2 => Ok(Self::HmacSha1),
            3 => Ok(Self::Sha1),
            5 => Ok(Self::Rsa2048),
            6 => Ok(Self::HmacSha256),
            _ => Err(Error::InvalidEnum {
                kind: "sign_algorithm",
                value: v,
            }),
        }
    }
}

/// Parsed metadata header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataHeader {
    pub sign_offset: u64,
    pub sign_algorithm: SignAlgorithm,
    /// Number of segment descriptors that follow.
    pub cert_entry_num: u32,
    /// Informational count of optional header entries.
    pub attr_entry_num: u32,
    /// Exact byte length of the optional header table.
    pub optional_header_size: u32,
    pub pad: u64,
}

impl MetadataHeader {
    pub fn parse<R: Read>(r: &mut R, e: Endian) -> Result<Self> {
        let sign_offset = end_u64(r, e)?;
        let sign_algorithm = SignAlgorithm::try_from(end_u32(r, e)?)?;
        let cert_entry_num = end_u32(r, e)?;
        let attr_entry_num = end_u32(r, e)?;
        let optional_header_size = end_u32(r, e)?;
        let pad = end_u64(r, e)?;

        debug!(
            "metadata header: {sign_algorithm:?} at {sign_offset:#x}, {cert_entry_num} segments, \
             optional table {optional_header_size:#x} bytes"
        );

        Ok(Self {
            sign_offset,
            sign_algorithm,
            cert_entry_num,
            attr_entry_num,
            optional_header_size,
            pad,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_both_byte_orders() {
        let mut be = Vec::new();
        be.extend_from_slice(&0x1c0u64.to_be_bytes());
        be.extend_from_slice(&5u32.to_be_bytes());
        be.extend_from_slice(&3u32.to_be_bytes());
        be.extend_from_slice(&2u32.to_be_bytes());
        be.extend_from_slice(&0x60u32.to_be_bytes());
        be.extend_from_slice(&0u64.to_be_bytes());
        assert_eq!(be.len(), METADATA_HEADER_SIZE);

        let m = MetadataHeader::parse(&mut Cursor::new(&be), Endian::Big).unwrap();
        assert_eq!(m.sign_offset, 0x1c0);
        assert_eq!(m.sign_algorithm, SignAlgorithm::Rsa2048);
        assert_eq!(m.cert_entry_num, 3);
        assert_eq!(m.attr_entry_num, 2);
        assert_eq!(m.optional_header_size, 0x60);

        let mut le = Vec::new();
        le.extend_from_slice(&0x1c0u64.to_le_bytes());
        le.extend_from_slice(&1u32.to_le_bytes());
        le.extend_from_slice(&7u32.to_le_bytes());
        le.extend_from_slice(&0u32.to_le_bytes());
        le.extend_from_slice(&0u32.to_le_bytes());
        le.extend_from_slice(&0xdeadu64.to_le_bytes());
        let m = MetadataHeader::parse(&mut Cursor::new(&le), Endian::Little).unwrap();
        assert_eq!(m.sign_algorithm, SignAlgorithm::Ecdsa160);
        assert_eq!(m.cert_entry_num, 7);
        assert_eq!(m.pad, 0xdead);
    }

    #[test]
    fn rejects_unknown_sign_algorithm() {
        let mut b = vec![0u8; METADATA_HEADER_SIZE];
        b[8..12].copy_from_slice(&4u32.to_be_bytes());
        assert!(matches!(
            MetadataHeader::parse(&mut Cursor::new(&b), Endian::Big),
            Err(Error::InvalidEnum {
                kind: "sign_algorithm",
                value: 4
            })
        ));
    }
}
