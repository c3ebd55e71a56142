//! Encryption root unwrapping.
//!
//! The encryption root is a 64-byte AES-128-CBC ciphertext block. Once
//! decrypted it holds:
//!
//! ```text
//! [0x00] key      (16 bytes)
//! [0x10] key_pad  (16 bytes, zero)
//! [0x20] iv       (16 bytes)
//! [0x30] iv_pad   (16 bytes, zero)
//! ```
//!
//! There is no MAC over this block; the zero pads are the only signal that
//! the right key was used. A wrong key yields garbage pads and
//! [`Error::BadPadding`].
//!
//! Two unwrap paths exist:
//!
//! * **System** - one CBC pass under the system key and its reset IV.
//! * **Title-wrapped** - a CBC pass under the title key with a zero IV,
//!   then the system pass. Each pass covers the whole 64-byte block.

use std::fmt;

use aes::Aes128;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use log::trace;

use crate::keys::{SystemKey, TitleKey};
use crate::{Error, Result};

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Size of the encryption root ciphertext block.
pub const ENCRYPTION_ROOT_SIZE: usize = 0x40;

const ZERO_IV: [u8; 16] = [0u8; 16];

/// Content key and IV recovered from the encryption root.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionRoot {
    pub key: [u8; 16],
    pub iv: [u8; 16],
}

impl EncryptionRoot {
    /// Unwrap a root protected by the system layer only.
    pub fn resolve_system(block: &[u8; ENCRYPTION_ROOT_SIZE], system: &SystemKey) -> Result<Self> {
        unwrap(block, &[(&system.key, &system.iv)])
    }

    /// Unwrap a root protected by a title key layer on top of the system layer.
    pub fn resolve_title_wrapped(
        block: &[u8; ENCRYPTION_ROOT_SIZE],
        title: &TitleKey,
        system: &SystemKey,
    ) -> Result<Self> {
        unwrap(block, &[(&title.0, &ZERO_IV), (&system.key, &system.iv)])
    }
}

impl fmt::Debug for EncryptionRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionRoot").finish_non_exhaustive()
    }
}

#[cfg(feature = "zeroize")]
impl Drop for EncryptionRoot {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.key.zeroize();
        self.iv.zeroize();
    }
}

/// Apply the CBC `layers` in order, then split and check the pads.
fn unwrap(
    block: &[u8; ENCRYPTION_ROOT_SIZE],
    layers: &[(&[u8; 16], &[u8; 16])],
) -> Result<EncryptionRoot> {
    let mut plain = *block;
    for (key, iv) in layers {
        cbc_decrypt(key, iv, &mut plain);
    }
    trace!("encryption root: {} cbc pass(es)", layers.len());

    let root = split(&plain);

    #[cfg(feature = "zeroize")]
    zeroize::Zeroize::zeroize(&mut plain);

    root
}

fn split(plain: &[u8; ENCRYPTION_ROOT_SIZE]) -> Result<EncryptionRoot> {
    let (key, rest) = plain.split_at(16);
    let (key_pad, rest) = rest.split_at(16);
    let (iv, iv_pad) = rest.split_at(16);

    if key_pad.iter().chain(iv_pad).any(|&b| b != 0) {
        return Err(Error::BadPadding);
    }

    let mut root = EncryptionRoot {
        key: [0u8; 16],
        iv: [0u8; 16],
    };
    root.key.copy_from_slice(key);
    root.iv.copy_from_slice(iv);
    Ok(root)
}

/// Full AES-128-CBC decrypt of the block in place.
fn cbc_decrypt(key: &[u8; 16], iv: &[u8; 16], data: &mut [u8; ENCRYPTION_ROOT_SIZE]) {
    let mut dec = Aes128CbcDec::new(key.into(), iv.into());
    for block in data.chunks_exact_mut(16) {
        dec.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}
