//! Readers for the certified file container.
//!
//! All readers follow the same conventions:
//!
//! * **Generic over** [`std::io::Read`] - the container is consumed as a
//!   sequential byte source; no reader seeks.
//! * **Byte order is a parameter** - only [`header`] discovers it; every
//!   later reader takes the [`crate::utils::Endian`] the header reports.
//! * **Plaintext in** - readers never decrypt. [`certified`] chains them and
//!   inserts [`crate::crypto::stream::MetadataStream`] where the container
//!   is protected.
//!
//! ## Module overview
//!
//! | Module        | Structure |
//! |---------------|-----------|
//! | [`header`]    | Outer header: magic, platform variant, category |
//! | [`metadata`]  | Metadata header: signature algorithm and table sizes |
//! | [`segment`]   | Segment descriptors |
//! | [`optional`]  | Chained optional header table |
//! | [`signature`] | Algorithm-tagged signature trailer |
//! | [`drm`]       | Licensing records used by key negotiation |
//! | [`certified`] | The whole pipeline |

pub mod certified;
pub mod drm;
pub mod header;
pub mod metadata;
pub mod optional;
pub mod segment;
pub mod signature;
