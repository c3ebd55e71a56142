//! Cryptographic operations for certified files.
//!
//! All functions accept already-loaded key material; key lookup and
//! key-file loading are handled by [`crate::keys`].
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`root`]   | AES-128-CBC unwrapping of the 64-byte encryption root |
//! | [`stream`] | AES-128-CTR decryption of the metadata region |
//!
//! ## Key hierarchy (brief)
//!
//! ```text
//! title key (npdrm, optional)
//!   └── AES-CBC, zero IV ─┐
//! system key/iv[key_revision]
//!   └── AES-CBC ──────────┴── encryption root → content key + iv
//!                                  └── AES-CTR decrypt metadata region
//! ```
//!
//! Enable the `zeroize` feature to wipe recovered key material on drop.

pub mod root;
pub mod stream;
