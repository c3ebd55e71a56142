//! Low-level I/O primitives shared by all readers.
//!
//! Each function reads exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity.

use std::io::{self, Read};

use crate::Result;

/// Byte order of the multi-byte fields in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Read a `u16` with caller-supplied endianness.
#[inline]
pub(crate) fn end_u16<R: Read>(r: &mut R, e: Endian) -> Result<u16> {
    let b = bytesa::<2>(r)?;
    Ok(match e {
        Endian::Big => u16::from_be_bytes(b),
        Endian::Little => u16::from_le_bytes(b),
    })
}

/// Read a `u32` with caller-supplied endianness.
#[inline]
pub(crate) fn end_u32<R: Read>(r: &mut R, e: Endian) -> Result<u32> {
    let b = bytesa::<4>(r)?;
    Ok(match e {
        Endian::Big => u32::from_be_bytes(b),
        Endian::Little => u32::from_le_bytes(b),
    })
}

/// Read a `u64` with caller-supplied endianness.
#[inline]
pub(crate) fn end_u64<R: Read>(r: &mut R, e: Endian) -> Result<u64> {
    let b = bytesa::<8>(r)?;
    Ok(match e {
        Endian::Big => u64::from_be_bytes(b),
        Endian::Little => u64::from_le_bytes(b),
    })
}

/// Read exactly `N` bytes into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize>(r: &mut impl Read) -> Result<[u8; N]> {
    let mut b = [0u8; N];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Read `N` little- or big-endian `u32` words.
pub(crate) fn words<R: Read, const N: usize>(r: &mut R, e: Endian) -> Result<[u32; N]> {
    let mut out = [0u32; N];
    for w in &mut out {
        *w = end_u32(r, e)?;
    }
    Ok(out)
}

/// Discard exactly `n` bytes from a sequential source.
pub(crate) fn skip<R: Read>(r: &mut R, n: u64) -> Result<()> {
    let copied = io::copy(&mut r.by_ref().take(n), &mut io::sink())?;
    if copied != n {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}

/// `Read` adaptor that counts the bytes that actually pass through it.
pub(crate) struct Counted<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Counted<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes read so far.
    pub(crate) fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
