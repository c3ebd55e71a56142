//! Key material for certified file decryption.
//!
//! Certified files protect their metadata with a layered scheme:
//!
//! * **System keys** are per-platform AES-128 key/IV pairs selected by the
//!   container's `key_revision`. They wrap the 64-byte encryption root.
//! * **Title keys** (npdrm) wrap the encryption root once more for titles
//!   bound to a licence; that layer is removed first.
//!
//! This module performs no cryptography; it is a
//! plain data container behind the [`KeyStore`] lookup trait. The decode
//! pipeline only ever sees a `&dyn KeyStore`, so tests and callers can
//! supply synthetic keys without any global table.
//!
//! ## Key file format
//! Simple `name = hex_value` text files, one entry per line, comments
//! prefixed with `;`.
//!
//! ```text
//! ; system keys, revision in hex
//! system_key_001c = 0123456789abcdef0123456789abcdef
//! system_iv_001c  = 00112233445566778899aabbccddeeff
//! ```

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

use crate::Result;

/// A system key/IV pair for one key revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemKey {
    /// AES-128 key.
    pub key: [u8; 16],
    /// Reset IV used for every CBC pass under this key.
    pub iv: [u8; 16],
}

/// A per-title (npdrm licence) AES-128 key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleKey(pub [u8; 16]);

/// Key material lookup used by the decode pipeline.
pub trait KeyStore {
    /// System key/IV pair for `key_revision`.
    fn system_key(&self, key_revision: u16) -> Option<SystemKey>;

    /// Title key for a content id, if this store knows it.
    fn title_key(&self, _content_id: &str) -> Option<TitleKey> {
        None
    }
}

/// In-memory key store loaded from key files.
#[derive(Debug, Default)]
pub struct KeySet {
    system_keys: HashMap<u16, [u8; 16]>,
    system_ivs: HashMap<u16, [u8; 16]>,
    title_keys: HashMap<String, [u8; 16]>,
}

impl KeySet {
    /// Create an empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system key/IV pair directly.
    pub fn insert_system_key(&mut self, key_revision: u16, key: SystemKey) {
        self.system_keys.insert(key_revision, key.key);
        self.system_ivs.insert(key_revision, key.iv);
    }

    /// Register a title key directly.
    pub fn insert_title_key(&mut self, content_id: impl Into<String>, key: TitleKey) {
        self.title_keys.insert(content_id.into(), key.0);
    }

    /// Load system keys from a reader.
    ///
    /// Lines beginning with `;` and blank lines are ignored. Recognised
    /// names are `system_key_XXXX` and `system_iv_XXXX` with the key
    /// revision in hex. Unknown names and malformed values are skipped so
    /// that one key file can serve several tools.
    pub fn load_system_keys<R: Read>(&mut self, reader: R) -> Result<()> {
        for (name, value) in entries(reader)? {
            if let Some(rev) = name.strip_prefix("system_key_")
                && let (Ok(rev), Some(key)) = (u16::from_str_radix(rev, 16), decode_key(&value))
            {
                self.system_keys.insert(rev, key);
            } else if let Some(rev) = name.strip_prefix("system_iv_")
                && let (Ok(rev), Some(iv)) = (u16::from_str_radix(rev, 16), decode_key(&value))
            {
                self.system_ivs.insert(rev, iv);
            }
        }
        Ok(())
    }

    /// Load title keys from a reader.
    ///
    /// Each line: `<content id> = <32-hex-char title key>`.
    pub fn load_title_keys<R: Read>(&mut self, reader: R) -> Result<()> {
        for (name, value) in entries(reader)? {
            if let Some(key) = decode_key(&value) {
                self.title_keys.insert(name, key);
            }
        }
        Ok(())
    }
}

impl KeyStore for KeySet {
    fn system_key(&self, key_revision: u16) -> Option<SystemKey> {
        let key = *self.system_keys.get(&key_revision)?;
        let iv = *self.system_ivs.get(&key_revision)?;
        Some(SystemKey { key, iv })
    }

    fn title_key(&self, content_id: &str) -> Option<TitleKey> {
        self.title_keys.get(content_id).copied().map(TitleKey)
    }
}

fn entries<R: Read>(reader: R) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        out.push((name.trim().to_owned(), value.trim().to_owned()));
    }
    Ok(out)
}

fn decode_key(s: &str) -> Option<[u8; 16]> {
    let mut out = [0u8; 16];
    hex::decode_to_slice(s, &mut out).ok()?;
    Some(out)
}
