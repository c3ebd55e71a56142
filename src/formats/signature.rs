//! Signature trailer at `sign_offset`.
//!
//! Only the shapes of the public-key algorithms are decoded. The MAC-style
//! algorithms are valid in the metadata header but their payload does not
//! live in this trailer, so asking for one is an error and nothing is read.
//!
//! | Algorithm  | ps3            | vita           |
//! |------------|----------------|----------------|
//! | ecdsa160   | r, s: 20 bytes | r, s: 28 bytes |
//! | rsa2048    | 256 bytes      | 256 bytes      |

use std::io::Read;

use super::header::Variant;
use super::metadata::SignAlgorithm;
use crate::utils::bytesa;
use crate::{Error, Result};

/// Size of an RSA-2048 signature.
pub const RSA2048_SIZE: usize = 0x100;

/// Decoded signature bytes, tagged by algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// ps3 ECDSA pair.
    Ecdsa160 { r: [u8; 20], s: [u8; 20] },
    /// vita ECDSA pair (same algorithm tag, wider scalars).
    Ecdsa224 { r: [u8; 28], s: [u8; 28] },
    Rsa2048(Box<[u8; RSA2048_SIZE]>),
}

impl Signature {
    /// Trailer size for `algorithm` on `variant`.
    pub fn wire_size(algorithm: SignAlgorithm, variant: Variant) -> Result<usize> {
        match (algorithm, variant) {
            (SignAlgorithm::Ecdsa160, Variant::Ps3) => Ok(2 * 20),
            (SignAlgorithm::Ecdsa160, Variant::Vita { .. }) => Ok(2 * 28),
            (SignAlgorithm::Rsa2048, _) => Ok(RSA2048_SIZE),
            (
                a @ (SignAlgorithm::HmacSha1 | SignAlgorithm::Sha1 | SignAlgorithm::HmacSha256),
                _,
            ) => Err(Error::UnsupportedSignatureType(a)),
        }
    }

    pub fn read<R: Read>(r: &mut R, algorithm: SignAlgorithm, variant: Variant) -> Result<Self> {
        match (algorithm, variant) {
            (SignAlgorithm::Ecdsa160, Variant::Ps3) => Ok(Self::Ecdsa160 {
                r: bytesa(r)?,
                s: bytesa(r)?,
            }),
            (SignAlgorithm::Ecdsa160, Variant::Vita { .. }) => Ok(Self::Ecdsa224 {
                r: bytesa(r)?,
                s: bytesa(r)?,
            }),
            (SignAlgorithm::Rsa2048, _) => Ok(Self::Rsa2048(Box::new(bytesa(r)?))),
            (
                a @ (SignAlgorithm::HmacSha1 | SignAlgorithm::Sha1 | SignAlgorithm::HmacSha256),
                _,
            ) => Err(Error::UnsupportedSignatureType(a)),
        }
    }

    pub fn algorithm(&self) -> SignAlgorithm {
        match self {
            Signature::Ecdsa160 { .. } | Signature::Ecdsa224 { .. } => SignAlgorithm::Ecdsa160,
            Signature::Rsa2048(_) => SignAlgorithm::Rsa2048,
        }
    }
}
