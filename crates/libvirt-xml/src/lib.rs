//! Typed encoding and decoding of libvirt XML documents.
//!
//! This crate maps libvirt's XML formats (domains, networks, storage, node
//! devices, filters, snapshots, capabilities and host interfaces) to plain
//! Rust records and back.
//!
//! # Overview
//!
//! - **Tagged variants**: every shape chosen by a discriminant attribute or
//!   element name is an enum, and each group's default is declared once in
//!   [`codec::variant`]
//! - **Strict by default**: unknown discriminants are errors carrying the
//!   element path; lenient decoding drops the enclosing element instead
//! - **Extension aware**: hypervisor namespaces decode into typed blocks,
//!   elements in other namespaces are kept and written back
//!
//! # Quick Start
//!
//! ```rust
//! use libvirt_xml::{Document, Domain, DomainDevices, Disk, DiskSource};
//!
//! let mut domain = Domain::new("kvm", "web01");
//! domain.devices = Some(DomainDevices {
//!     disks: vec![Disk {
//!         source: Some(DiskSource::block("/dev/sda")),
//!         ..Disk::default()
//!     }],
//!     ..DomainDevices::default()
//! });
//!
//! let xml = domain.encode().unwrap();
//! assert!(xml.contains(r#"<disk type="block">"#));
//! assert!(xml.contains(r#"<source dev="/dev/sda"/>"#));
//!
//! let decoded = Domain::decode(&xml).unwrap();
//! assert_eq!(decoded, domain);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Document records
//! - [`codec`]: Element tree, scalar codec, variant groups and document entry points
//! - [`error`]: Error types
//!
//! # Errors
//!
//! Decoding fails on the first problem found. Every error that refers to a
//! node carries its path from the root, e.g. `/domain/devices/hostdev[1]`:
//!
//! ```rust
//! use libvirt_xml::{DecodeError, DecodeOptions, Document, Domain};
//!
//! let xml = r#"<domain type="kvm"><devices><hostdev mode="subsystem" type="nosuchtype"/></devices></domain>"#;
//! let err = Domain::decode(xml).unwrap_err();
//! assert!(matches!(err, DecodeError::UnknownDiscriminant { .. }));
//! assert_eq!(err.path(), Some("/domain/devices/hostdev[1]"));
//!
//! let domain = Domain::decode_with_options(xml, &DecodeOptions::lenient()).unwrap();
//! assert!(domain.devices.unwrap().hostdevs.is_empty());
//! ```

pub mod codec;
pub mod error;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{DecodeOptions, Document, EncodeOptions, Radix, UintFormat};
pub use error::{DecodeError, EncodeError, ErrorCode};
pub use model::{
    DeviceAddress, Disk, DiskSource, DiskSourceKind, Domain, DomainCapabilities, DomainDevices, DomainSnapshot,
    HostInterface, Hostdev, HostdevMode, HostdevSubsystem, Interface, Network, NetworkPort, NodeDevice, NwFilter,
    PciAddress, ScaledValue, StoragePool, StorageVolume,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
