//! Outer certified file header.
//!
//! ## Layout
//! ```text
//! [0x00] Magic                "SCE\0" (big-endian) / "\0ECS" (little-endian)
//! [0x04] Version              (u32)  2 = ps3, 3 = vita
//! [0x08] KeyRevision          (u16)
//! [0x0A] Category             (u16)
//! [0x0C] ExtendedHeaderSize   (u32)
//! [0x10] FileOffset           (u64)
//! [0x18] FileSize             (u64)
//! [0x20] CertifiedFileSize    (u64)  vita only
//! [0x28] Padding              (u64)  vita only, must be 0
//! ```
//!
//! The magic decides the byte order of every following field; the version
//! must name the platform that uses that byte order. A known version under
//! the other family's magic is a [`Error::VersionMismatch`].

use std::io::Read;

use log::debug;

use crate::utils::{Endian, bytesa, end_u16, end_u32, end_u64};
use crate::{Error, Result};

/// Magic of the big-endian (ps3) family.
pub const MAGIC_BE: [u8; 4] = *b"SCE\0";
/// Magic of the little-endian (vita) family.
pub const MAGIC_LE: [u8; 4] = *b"\0ECS";

/// Header size of the ps3 layout.
pub const PS3_HEADER_SIZE: usize = 0x20;
/// Header size of the vita layout.
pub const VITA_HEADER_SIZE: usize = 0x30;

/// Platform variant, with the fields only that variant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Ps3,
    Vita {
        /// Size of the whole certified file.
        certified_file_size: u64,
    },
}

impl Variant {
    /// Version discriminant as stored on the wire.
    pub fn version(self) -> u32 {
        match self {
            Variant::Ps3 => 2,
            Variant::Vita { .. } => 3,
        }
    }

    pub fn endian(self) -> Endian {
        match self {
            Variant::Ps3 => Endian::Big,
            Variant::Vita { .. } => Endian::Little,
        }
    }

    /// Byte size of the outer header for this variant.
    pub fn header_size(self) -> usize {
        match self {
            Variant::Ps3 => PS3_HEADER_SIZE,
            Variant::Vita { .. } => VITA_HEADER_SIZE,
        }
    }
}

/// What kind of payload the container wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Category {
    SignedElf = 1,
    SignedRevokeList = 2,
    SignedPackage = 3,
    SignedSecurityPolicyProfile = 4,
    SignedDiff = 5,
    SignedParamSfo = 6,
}

impl TryFrom<u16> for Category {
    type Error = Error;
    fn try_from(v: u16) -> Result<Self> {
        match v {
            1 => Ok(Self::SignedElf),
            2 => Ok(Self::SignedRevokeList),
            3 => Ok(Self::SignedPackage),
            4 => Ok(Self::SignedSecurityPolicyProfile),
            5 => Ok(Self::SignedDiff),
            6 => Ok(Self::SignedParamSfo),
            _ => Err(Error::InvalidEnum {
                kind: "category",
                value: v.into(),
            }),
        }
    }
}

/// Parsed outer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterHeader {
    pub variant: Variant,
    /// Selects the system key table entry.
    pub key_revision: u16,
    pub category: Category,
    /// Size of the extended header that follows; nonzero only for signed ELFs.
    pub extended_header_size: u32,
    pub file_offset: u64,
    pub file_size: u64,
}

impl OuterHeader {
    /// Parse the outer header from the start of a container.
    pub fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let magic = bytesa::<4>(r)?;
        let family = match magic {
            MAGIC_BE => Endian::Big,
            MAGIC_LE => Endian::Little,
            _ => return Err(Error::InvalidMagic(magic)),
        };

        let version = end_u32(r, family)?;
        let is_vita = match (version, family) {
            (2, Endian::Big) => false,
            (3, Endian::Little) => true,
            (2 | 3, _) => return Err(Error::VersionMismatch { magic, version }),
            _ => {
                return Err(Error::InvalidEnum {
                    kind: "version",
                    value: version,
                });
            }
        };

        let key_revision = end_u16(r, family)?;
        let category = Category::try_from(end_u16(r, family)?)?;
        let extended_header_size = end_u32(r, family)?;
        let file_offset = end_u64(r, family)?;
        let file_size = end_u64(r, family)?;

        let variant = if is_vita {
            let certified_file_size = end_u64(r, family)?;
            if end_u64(r, family)? != 0 {
                return Err(Error::NonZeroPadding);
            }
            Variant::Vita {
                certified_file_size,
            }
        } else {
            Variant::Ps3
        };

        debug!(
            "outer header: {variant:?} category={category:?} key_revision={key_revision:#x} \
             ext={extended_header_size:#x}"
        );

        Ok(Self {
            variant,
            key_revision,
            category,
            extended_header_size,
            file_offset,
            file_size,
        })
    }

    /// Byte order of every field after the magic.
    pub fn endian(&self) -> Endian {
        self.variant.endian()
    }

    /// Size of this header on the wire (0x20 or 0x30).
    pub fn header_size(&self) -> usize {
        self.variant.header_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ps3_bytes(category: u16) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(b"SCE\0");
        b.extend_from_slice(&2u32.to_be_bytes());
        b.extend_from_slice(&0x1cu16.to_be_bytes());
        b.extend_from_slice(&category.to_be_bytes());
        b.extend_from_slice(&0x70u32.to_be_bytes());
        b.extend_from_slice(&0x800u64.to_be_bytes());
        b.extend_from_slice(&0x1234u64.to_be_bytes());
        b
    }

    fn vita_bytes(padding: u64) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(b"\0ECS");
        b.extend_from_slice(&3u32.to_le_bytes());
        b.extend_from_slice(&0x0du16.to_le_bytes());
        b.extend_from_slice(&3u16.to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes());
        b.extend_from_slice(&0x400u64.to_le_bytes());
        b.extend_from_slice(&0x9000u64.to_le_bytes());
        b.extend_from_slice(&0x9400u64.to_le_bytes());
        b.extend_from_slice(&padding.to_le_bytes());
        b
    }

    #[test]
    fn parses_ps3_big_endian() {
        let bytes = ps3_bytes(1);
        let mut c = Cursor::new(&bytes);
        let h = OuterHeader::parse(&mut c).unwrap();
        assert_eq!(h.variant, Variant::Ps3);
        assert_eq!(h.variant.version(), 2);
        assert_eq!(h.endian(), Endian::Big);
        assert_eq!(h.header_size(), 0x20);
        assert_eq!(c.position(), 0x20);
        assert_eq!(h.key_revision, 0x1c);
        assert_eq!(h.category, Category::SignedElf);
        assert_eq!(h.extended_header_size, 0x70);
        assert_eq!(h.file_offset, 0x800);
        assert_eq!(h.file_size, 0x1234);
    }

    #[test]
    fn parses_vita_little_endian_with_trailer() {
        let bytes = vita_bytes(0);
        let mut c = Cursor::new(&bytes);
        let h = OuterHeader::parse(&mut c).unwrap();
        assert_eq!(
            h.variant,
            Variant::Vita {
                certified_file_size: 0x9400
            }
        );
        assert_eq!(h.endian(), Endian::Little);
        assert_eq!(h.header_size(), 0x30);
        assert_eq!(c.position(), 0x30);
        assert_eq!(h.category, Category::SignedPackage);
        assert_eq!(h.file_size, 0x9000);
    }

    #[test]
    fn rejects_vita_padding() {
        let bytes = vita_bytes(1);
        assert!(matches!(
            OuterHeader::parse(&mut Cursor::new(&bytes)),
            Err(Error::NonZeroPadding)
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = ps3_bytes(1);
        bytes[0] = b'X';
        assert!(matches!(
            OuterHeader::parse(&mut Cursor::new(&bytes)),
            Err(Error::InvalidMagic(m)) if m == *b"XCE\0"
        ));
    }

    #[test]
    fn rejects_version_from_other_family() {
        let mut bytes = ps3_bytes(1);
        bytes[4..8].copy_from_slice(&3u32.to_be_bytes());
        assert!(matches!(
            OuterHeader::parse(&mut Cursor::new(&bytes)),
            Err(Error::VersionMismatch {
                magic: MAGIC_BE,
                version: 3
            })
        ));

        let mut bytes = vita_bytes(0);
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            OuterHeader::parse(&mut Cursor::new(&bytes)),
            Err(Error::VersionMismatch {
                magic: MAGIC_LE,
                version: 2
            })
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = ps3_bytes(1);
        bytes[4..8].copy_from_slice(&4u32.to_be_bytes());
        assert!(matches!(
            OuterHeader::parse(&mut Cursor::new(&bytes)),
            Err(Error::InvalidEnum {
                kind: "version",
                value: 4
            })
        ));
    }

    #[test]
    fn rejects_unknown_category() {
        let bytes = ps3_bytes(7);
        assert!(matches!(
            OuterHeader::parse(&mut Cursor::new(&bytes)),
            Err(Error::InvalidEnum {
                kind: "category",
                value: 7
            })
        ));
    }

    #[test]
    fn truncated_header_is_io_error() {
        let bytes = ps3_bytes(1);
        assert!(matches!(
            OuterHeader::parse(&mut Cursor::new(&bytes[..0x1c])),
            Err(Error::Io(_))
        ));
    }
}
