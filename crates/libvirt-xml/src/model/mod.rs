//! Typed records for libvirt documents.
//!
//! Each document has a top-level type:
//! - [`Domain`], [`DomainSnapshot`] and [`DomainCapabilities`]
//! - [`Network`] and [`NetworkPort`]
//! - [`StoragePool`] and [`StorageVolume`]
//! - [`NodeDevice`], [`NwFilter`] and [`HostInterface`]
//!
//! Records are plain data. Optional fields are `Option`, repeated ones are
//! `Vec`, and every variant group is an enum.

pub mod chardev;
pub mod common;
pub mod devices;
pub mod disk;
pub mod domain;
pub mod domcaps;
pub mod extension;
pub mod graphics;
pub mod hostdev;
pub mod hostiface;
pub mod interface;
pub mod netdev;
pub mod network;
pub mod nodedev;
pub mod nwfilter;
pub mod port;
pub mod snapshot;
pub mod storage;

pub use common::{DeviceAddress, PciAddress, ScaledValue};
pub use disk::{Disk, DiskSource, DiskSourceKind};
pub use domain::{Domain, DomainDevices};
pub use domcaps::DomainCapabilities;
pub use hostdev::{Hostdev, HostdevMode, HostdevSubsystem};
pub use hostiface::HostInterface;
pub use interface::Interface;
pub use network::Network;
pub use nodedev::NodeDevice;
pub use nwfilter::NwFilter;
pub use port::NetworkPort;
pub use snapshot::DomainSnapshot;
pub use storage::{StoragePool, StorageVolume};
