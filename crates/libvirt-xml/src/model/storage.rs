//! Storage pools (`<pool>`) and volumes (`<volume>`).

use crate::codec::tree::Element;
use crate::model::common::{PciAddress, Permissions, ScaledValue};
use crate::model::disk::DiskEncryption;
use crate::model::extension::{FsMountOptions, RbdConfigOptions};

// =============================================================================
// POOL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoragePool {
    /// Backend driver: `dir`, `fs`, `netfs`, `logical`, `iscsi`, `rbd`, ...
    pub pool_type: String,
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub allocation: Option<ScaledValue>,
    pub capacity: Option<ScaledValue>,
    pub available: Option<ScaledValue>,
    /// `<features><cow state=…/></features>`
    pub cow: Option<String>,
    pub source: Option<PoolSource>,
    pub target: Option<PoolTarget>,
    /// `<refresh><volume allocation=…/></refresh>`
    pub refresh_allocation: Option<String>,
    pub fs_mount_options: Option<FsMountOptions>,
    pub rbd_config_options: Option<RbdConfigOptions>,
    pub foreign: Vec<Element>,
}

impl StoragePool {
    pub fn new(pool_type: &str, name: &str) -> Self {
        Self {
            pool_type: pool_type.to_string(),
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extent {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolDevice {
    pub path: String,
    pub part_separator: Option<String>,
    pub free_extents: Vec<Extent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolHost {
    pub name: String,
    pub port: Option<u32>,
}

/// Secret lookup for pool authentication: by usage name or by UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolSecret {
    Usage(String),
    Uuid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAuthSecret {
    pub username: String,
    pub secret: PoolSecret,
}

/// Source authentication, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolAuth {
    Chap(PoolAuthSecret),
    Ceph(PoolAuthSecret),
}

impl PoolAuth {
    pub fn discriminant(&self) -> &'static str {
        match self {
            PoolAuth::Chap(_) => "chap",
            PoolAuth::Ceph(_) => "ceph",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdapterParentAddress {
    pub unique_id: Option<u32>,
    pub address: Option<PciAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScsiHostAdapter {
    pub name: Option<String>,
    pub parent_address: Option<AdapterParentAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FcHostAdapter {
    pub parent: Option<String>,
    pub parent_wwnn: Option<String>,
    pub parent_wwpn: Option<String>,
    pub parent_fabric_wwn: Option<String>,
    pub managed: Option<String>,
    pub wwnn: Option<String>,
    pub wwpn: Option<String>,
}

/// SCSI adapter of a pool source, selected by `type` (default `scsi_host`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolAdapter {
    ScsiHost(ScsiHostAdapter),
    FcHost(FcHostAdapter),
}

impl PoolAdapter {
    pub fn discriminant(&self) -> &'static str {
        match self {
            PoolAdapter::ScsiHost(_) => "scsi_host",
            PoolAdapter::FcHost(_) => "fc_host",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolSource {
    pub name: Option<String>,
    /// `<dir path=…/>`
    pub dir: Option<String>,
    pub devices: Vec<PoolDevice>,
    pub hosts: Vec<PoolHost>,
    pub auth: Option<PoolAuth>,
    /// `<vendor name=…/>`
    pub vendor: Option<String>,
    /// `<product name=…/>`
    pub product: Option<String>,
    /// `<format type=…/>`
    pub format: Option<String>,
    pub adapter: Option<PoolAdapter>,
    /// `<initiator><iqn name=…/></initiator>`
    pub initiator_iqn: Option<String>,
    /// `<protocol ver=…/>`
    pub protocol_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolTarget {
    pub path: Option<String>,
    pub permissions: Option<Permissions>,
}

// =============================================================================
// VOLUME
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageVolume {
    pub volume_type: Option<String>,
    pub name: String,
    pub key: Option<String>,
    pub source: Vec<VolumeDevice>,
    pub allocation: Option<ScaledValue>,
    pub capacity: Option<ScaledValue>,
    pub physical: Option<ScaledValue>,
    pub target: Option<VolumeTarget>,
    pub backing_store: Option<VolumeBackingStore>,
}

impl StorageVolume {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// A physical device backing part of a volume, with its extents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolumeDevice {
    pub path: String,
    pub extents: Vec<Extent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timestamps {
    pub atime: Option<String>,
    pub btime: Option<String>,
    pub ctime: Option<String>,
    pub mtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolumeTarget {
    pub path: Option<String>,
    /// `<format type=…/>`
    pub format: Option<String>,
    pub permissions: Option<Permissions>,
    pub timestamps: Option<Timestamps>,
    pub encryption: Option<DiskEncryption>,
    pub compat: Option<String>,
    pub cluster_size: Option<ScaledValue>,
    pub nocow: bool,
    /// `<features><lazy_refcounts/></features>`
    pub lazy_refcounts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolumeBackingStore {
    pub path: Option<String>,
    pub format: Option<String>,
    pub permissions: Option<Permissions>,
}
