//! **certkit** - a decoder for the PS3 / PS Vita certified file container.
//!
//! A certified file wraps signed, optionally encrypted executables,
//! packages, revocation lists and policy blobs. Decoding walks a fixed
//! pipeline:
//!
//! | Stage | Module |
//! |-------|--------|
//! | Outer header       | [`formats::header`] |
//! | Encryption root    | [`crypto::root`] |
//! | Metadata header    | [`formats::metadata`] |
//! | Segment descriptors| [`formats::segment`] |
//! | Optional headers   | [`formats::optional`] |
//! | Signature          | [`formats::signature`] |
//!
//! [`formats::certified::CertifiedFile`] runs all of them in order. Key
//! material comes from a [`keys::KeyStore`].

pub mod crypto;
pub mod error;
pub mod formats;
pub mod keys;
pub mod utils;

pub use error::{Error, Result};
