//! AES-128-CTR decryption of the metadata region.
//!
//! Everything from the metadata header up to and including the signature
//! trailer is encrypted with the key/IV recovered from the encryption root,
//! using a big-endian 128-bit counter that starts at the IV. CTR is a
//! stream cipher, so decryption can run as the bytes are read and the
//! structure readers never see ciphertext.

use std::io::{self, Read};

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

use super::root::EncryptionRoot;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// `Read` adaptor that decrypts the metadata region on the fly.
pub struct MetadataStream<R> {
    inner: R,
    cipher: Aes128Ctr,
}

impl<R: Read> MetadataStream<R> {
    /// Start decrypting at the first byte of the metadata region.
    pub fn new(inner: R, root: &EncryptionRoot) -> Self {
        Self {
            inner,
            cipher: Aes128Ctr::new((&root.key).into(), (&root.iv).into()),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for MetadataStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.cipher.apply_keystream(&mut buf[..n]);
        Ok(n)
    }
}

impl EncryptionRoot {
    /// Wrap `inner`, positioned at the metadata header, in a decrypting reader.
    pub fn metadata_stream<R: Read>(&self, inner: R) -> MetadataStream<R> {
        MetadataStream::new(inner, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader handing out at most 5 bytes per call.
    struct Trickle<R>(R);

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(5);
            self.0.read(&mut buf[..n])
        }
    }

    #[test]
    fn decrypts_across_short_reads() {
        let root = EncryptionRoot {
            key: [7; 16],
            iv: [9; 16],
        };
        let plain: Vec<u8> = (0..100u8).collect();
        let mut cipher = plain.clone();
        Aes128Ctr::new((&root.key).into(), (&root.iv).into()).apply_keystream(&mut cipher);
        assert_ne!(cipher, plain);

        let mut stream = root.metadata_stream(Trickle(Cursor::new(cipher)));
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, plain);
    }
}
