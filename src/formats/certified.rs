//! Whole-container decode pipeline.
//!
//! ## Container layout
//! ```text
//! [0x00]            OuterHeader            0x20 (ps3) / 0x30 (vita)
//! [header_size]     Extended header        extended_header_size bytes, skipped
//! [..]              Encryption root        0x40 bytes, only for protected files
//! [..]              MetadataHeader         0x20     ┐
//! [..]              SegmentDescriptor[]    n × 0x30 │ AES-128-CTR under the
//! [..]              OptionalHeader table   size     │ root key/IV when the
//! [sign_offset]     Signature trailer               ┘ file is protected
//! ```
//!
//! The stages run strictly in order over one sequential reader. The first
//! failure aborts the decode; nothing partially parsed is returned.

use std::io::Read;

use log::debug;

use super::header::OuterHeader;
use super::metadata::MetadataHeader;
use super::optional::OptionalHeader;
use super::segment::SegmentDescriptor;
use super::signature::Signature;
use crate::crypto::root::{ENCRYPTION_ROOT_SIZE, EncryptionRoot};
use crate::keys::{KeyStore, SystemKey, TitleKey};
use crate::utils::{Counted, bytesa, skip};
use crate::{Error, Result};

/// How the metadata region of a container is protected.
#[derive(Clone, Copy)]
pub enum Protection<'a> {
    /// No encryption root; the metadata header follows the extended header.
    Plaintext,
    /// Encryption root wrapped by the system key for the file's key revision.
    System { keys: &'a dyn KeyStore },
    /// Encryption root wrapped by the title key for `content_id`, then the
    /// system key.
    TitleWrapped {
        keys: &'a dyn KeyStore,
        content_id: &'a str,
    },
}

/// A fully decoded certified file.
#[derive(Debug)]
pub struct CertifiedFile {
    pub header: OuterHeader,
    /// Content key/IV, present for protected files.
    pub root: Option<EncryptionRoot>,
    pub metadata: MetadataHeader,
    pub segments: Vec<SegmentDescriptor>,
    pub optional_headers: Vec<OptionalHeader>,
    pub signature: Signature,
}

impl CertifiedFile {
    /// Decode a container from `r`, positioned at its first byte.
    pub fn parse<R: Read>(r: R, protection: Protection<'_>) -> Result<Self> {
        let mut r = Counted::new(r);

        let header = OuterHeader::parse(&mut r)?;
        skip(&mut r, header.extended_header_size.into())?;

        let root = match protection {
            Protection::Plaintext => None,
            Protection::System { keys } => {
                let system = system_key(keys, &header)?;
                let block = bytesa::<ENCRYPTION_ROOT_SIZE>(&mut r)?;
                Some(EncryptionRoot::resolve_system(&block, &system)?)
            }
            Protection::TitleWrapped { keys, content_id } => {
                let title = title_key(keys, content_id)?;
                let system = system_key(keys, &header)?;
                let block = bytesa::<ENCRYPTION_ROOT_SIZE>(&mut r)?;
                Some(EncryptionRoot::resolve_title_wrapped(&block, &title, &system)?)
            }
        };

        let base = r.count();
        match root {
            Some(root) => {
                let stream = root.metadata_stream(r);
                Self::parse_body(stream, base, header, Some(root))
            }
            None => Self::parse_body(r, base, header, None),
        }
    }

    fn parse_body<M: Read>(
        m: M,
        base: u64,
        header: OuterHeader,
        root: Option<EncryptionRoot>,
    ) -> Result<Self> {
        let mut m = Counted::new(m);
        let e = header.endian();

        let metadata = MetadataHeader::parse(&mut m, e)?;
        let segments = SegmentDescriptor::read_all(&mut m, metadata.cert_entry_num, e)?;
        let optional_headers =
            OptionalHeader::read_table(&mut m, metadata.optional_header_size, e)?;

        // Rejects MAC-style algorithms before anything else is read.
        Signature::wire_size(metadata.sign_algorithm, header.variant)?;
        let position = base + m.count();
        let gap = metadata
            .sign_offset
            .checked_sub(position)
            .ok_or(Error::InvalidRange)?;
        skip(&mut m, gap)?;
        let signature = Signature::read(&mut m, metadata.sign_algorithm, header.variant)?;

        debug!(
            "certified file: {} segments, {} optional headers, {:?} signature",
            segments.len(),
            optional_headers.len(),
            signature.algorithm()
        );

        Ok(Self {
            header,
            root,
            metadata,
            segments,
            optional_headers,
            signature,
        })
    }
}

fn system_key(keys: &dyn KeyStore, header: &OuterHeader) -> Result<SystemKey> {
    keys.system_key(header.key_revision)
        .ok_or(Error::MissingKey(header.key_revision))
}

fn title_key(keys: &dyn KeyStore, content_id: &str) -> Result<TitleKey> {
    keys.title_key(content_id)
        .ok_or_else(|| Error::MissingTitleKey(content_id.to_owned()))
}
