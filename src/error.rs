//! Library-wide error and result types.

use std::io;

use thiserror::Error;

use crate::formats::metadata::SignAlgorithm;

/// Result alias used throughout certkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every decode stage fails fast: the first error aborts the pipeline and
/// nothing partially parsed is handed back.
#[derive(Debug, Error)]
pub enum Error {
    /// The first four bytes are neither `"SCE\0"` nor `"\0ECS"`.
    #[error("invalid magic: {0:02x?}")]
    InvalidMagic([u8; 4]),

    /// A discriminant field holds a value the format does not define.
    #[error("invalid {kind}: {value:#x}")]
    InvalidEnum { kind: &'static str, value: u32 },

    /// A known platform version paired with the other family's magic.
    #[error("version {version} does not belong to magic {magic:02x?}")]
    VersionMismatch { magic: [u8; 4], version: u32 },

    /// The vita header trailer carries nonzero padding.
    #[error("header padding is not zero")]
    NonZeroPadding,

    /// The unwrapped encryption root has nonzero pad fields (wrong key or
    /// corrupted input).
    #[error("encryption root padding check failed")]
    BadPadding,

    /// An optional header record did not consume the size it declared.
    /// Both sizes include the 16-byte record header.
    #[error("optional header size mismatch: declared {declared}, consumed {consumed}")]
    OptionalHeaderSizeMismatch { declared: u32, consumed: u64 },

    /// The optional header table did not consume exactly its declared size.
    #[error("optional header table size mismatch: declared {declared}, consumed {consumed}")]
    OptionalHeaderTableSizeMismatch { declared: u32, consumed: u64 },

    /// The signature algorithm is valid but its payload is not decodable here.
    #[error("unsupported signature type: {0:?}")]
    UnsupportedSignatureType(SignAlgorithm),

    /// The key store has no system key for this key revision.
    #[error("no system key for key revision {0:#06x}")]
    MissingKey(u16),

    /// The key store has no title key for this content id.
    #[error("no title key for content id {0}")]
    MissingTitleKey(String),

    /// An offset field points behind data that has already been consumed.
    #[error("invalid offset or size")]
    InvalidRange,

    /// An underlying I/O operation failed (including truncated input).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
