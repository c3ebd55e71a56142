//! Auxiliary licensing records used by the wider trust chain.
//!
//! These are opaque fixed-size structures exchanged with key negotiation
//! code. Nothing here validates their content beyond the byte layout.

use std::io::Read;

use crate::utils::{Endian, bytesa, end_u32, words};
use crate::{Error, Result};

/// Licensing class of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DrmType {
    Unknown = 0,
    Network = 1,
    Local = 2,
    Free = 3,
    Psp = 4,
    FreePsp2Psm = 0xD,
    NetworkPspPsp2 = 0x100,
    GamecardPsp2 = 0x400,
    UnknownPs3 = 0x2000,
}

impl TryFrom<u32> for DrmType {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Network),
            2 => Ok(Self::Local),
            3 => Ok(Self::Free),
            4 => Ok(Self::Psp),
            0xD => Ok(Self::FreePsp2Psm),
            0x100 => Ok(Self::NetworkPspPsp2),
            0x400 => Ok(Self::GamecardPsp2),
            0x2000 => Ok(Self::UnknownPs3),
            _ => Err(Error::InvalidEnum {
                kind: "drm_type",
                value: v,
            }),
        }
    }
}

impl DrmType {
    pub fn parse<R: Read>(r: &mut R, e: Endian) -> Result<Self> {
        Self::try_from(end_u32(r, e)?)
    }
}

/// Secrets used during title key negotiation (0x40 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedSecret {
    pub shared_secret_0: [u8; 16],
    pub klicensee: [u8; 16],
    pub shared_secret_2: [u8; 16],
    pub shared_secret_3: [u32; 4],
}

impl SharedSecret {
    pub const SIZE: usize = 0x40;

    pub fn parse<R: Read>(r: &mut R, e: Endian) -> Result<Self> {
        Ok(Self {
            shared_secret_0: bytesa(r)?,
            klicensee: bytesa(r)?,
            shared_secret_2: bytesa(r)?,
            shared_secret_3: words(r, e)?,
        })
    }
}

/// Capability flags in their decrypted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaintextCapability {
    pub words: [u32; 8],
}

/// Capability flags as stored in the optional header table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncryptedCapability {
    pub words: [u32; 8],
}

impl PlaintextCapability {
    pub const SIZE: usize = 0x20;

    pub fn parse<R: Read>(r: &mut R, e: Endian) -> Result<Self> {
        Ok(Self { words: words(r, e)? })
    }
}

impl EncryptedCapability {
    pub const SIZE: usize = 0x20;

    pub fn parse<R: Read>(r: &mut R, e: Endian) -> Result<Self> {
        Ok(Self { words: words(r, e)? })
    }
}
