//! XML encoding/decoding for libvirt documents.
//!
//! Documents are parsed into an [`tree::Element`] tree and then walked by
//! the [`XmlDecode`] impls; encoding builds a tree and writes it back out.

pub mod document;
pub mod namespace;
pub mod scalar;
pub mod traits;
pub mod tree;
pub mod variant;

mod chardev;
mod common;
mod devices;
mod disk;
mod domain;
mod domcaps;
mod extension;
mod graphics;
mod hostdev;
mod hostiface;
mod interface;
mod netdev;
mod network;
mod nodedev;
mod nwfilter;
mod port;
mod snapshot;
mod storage;

pub use document::{decode_document, encode_document, DecodeOptions, Document, EncodeOptions};
pub use scalar::{format_uint, parse_uint, Radix, UintFormat};
pub use traits::{DecodeContext, XmlDecode, XmlEncode};
pub use tree::Element;
pub use variant::Discriminant;
