//! Disks and their sources.
//!
//! A disk's `type` attribute names the source kind; the kind's fields live on
//! the nested `<source>` element together with fields shared by every kind
//! (startup policy, encryption, reservations and so on). The same source
//! shape is reused by backing stores, block-job mirrors, data stores and
//! snapshot disks.

use crate::model::chardev::ChardevSource;
use crate::model::common::{Alias, DeviceAcpi, DeviceAddress, DeviceBoot, DeviceSecLabel, PciAddress, SecretRef};

// =============================================================================
// SOURCE
// =============================================================================

/// A disk source: the kind-specific payload plus shared source fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSource {
    pub kind: DiskSourceKind,
    pub startup_policy: Option<String>,
    pub index: Option<u32>,
    pub encryption: Option<DiskEncryption>,
    pub reservations: Option<DiskReservations>,
    pub slices: Vec<DiskSlice>,
    pub ssl: Option<String>,
    pub cookies: Vec<DiskCookie>,
    pub readahead: Option<String>,
    pub timeout: Option<String>,
    pub data_store: Option<Box<DiskDataStore>>,
}

impl DiskSource {
    /// Creates a source of the given kind with no shared fields set.
    pub fn new(kind: DiskSourceKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Creates a block device source.
    pub fn block(dev: &str) -> Self {
        Self::new(DiskSourceKind::Block(DiskSourceBlock {
            dev: Some(dev.to_string()),
            seclabels: Vec::new(),
        }))
    }

    /// Creates a file source.
    pub fn file(path: &str) -> Self {
        Self::new(DiskSourceKind::File(DiskSourceFile {
            file: Some(path.to_string()),
            ..DiskSourceFile::default()
        }))
    }
}

/// Disk source kind, selected by the owner's `type` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskSourceKind {
    File(DiskSourceFile),
    Block(DiskSourceBlock),
    Dir(DiskSourceDir),
    Network(DiskSourceNetwork),
    Volume(DiskSourceVolume),
    Nvme(NvmeSource),
    VhostUser(ChardevSource),
    VhostVdpa(DiskSourceVhostVdpa),
}

impl Default for DiskSourceKind {
    fn default() -> Self {
        DiskSourceKind::File(DiskSourceFile::default())
    }
}

impl DiskSourceKind {
    /// Returns the `type` value for this kind.
    pub fn discriminant(&self) -> &'static str {
        match self {
            DiskSourceKind::File(_) => "file",
            DiskSourceKind::Block(_) => "block",
            DiskSourceKind::Dir(_) => "dir",
            DiskSourceKind::Network(_) => "network",
            DiskSourceKind::Volume(_) => "volume",
            DiskSourceKind::Nvme(_) => "nvme",
            DiskSourceKind::VhostUser(_) => "vhostuser",
            DiskSourceKind::VhostVdpa(_) => "vhostvdpa",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSourceFile {
    pub file: Option<String>,
    pub fdgroup: Option<String>,
    pub seclabels: Vec<DeviceSecLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSourceBlock {
    pub dev: Option<String>,
    pub seclabels: Vec<DeviceSecLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSourceDir {
    pub dir: Option<String>,
}

/// Network-backed source (`<source protocol="rbd" name=…>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSourceNetwork {
    pub protocol: Option<String>,
    pub name: Option<String>,
    pub query: Option<String>,
    pub tls: Option<String>,
    pub tls_hostname: Option<String>,
    pub hosts: Vec<DiskSourceHost>,
    pub identity: Option<DiskNetworkIdentity>,
    pub known_hosts: Option<String>,
    pub initiator_iqn: Option<String>,
    pub snapshot: Option<String>,
    pub config: Option<String>,
    pub reconnect_delay: Option<String>,
    pub auth: Option<DiskAuth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSourceHost {
    pub transport: Option<String>,
    pub name: Option<String>,
    pub port: Option<String>,
    pub socket: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskNetworkIdentity {
    pub user: Option<String>,
    pub group: Option<String>,
    pub username: Option<String>,
    pub keyfile: Option<String>,
    pub agentsock: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSourceVolume {
    pub pool: Option<String>,
    pub volume: Option<String>,
    pub mode: Option<String>,
    pub seclabels: Vec<DeviceSecLabel>,
}

/// NVMe source, selected by the `type` attribute of `<source>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NvmeSource {
    Pci(NvmePciSource),
}

impl Default for NvmeSource {
    fn default() -> Self {
        NvmeSource::Pci(NvmePciSource::default())
    }
}

impl NvmeSource {
    pub fn discriminant(&self) -> &'static str {
        match self {
            NvmeSource::Pci(_) => "pci",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NvmePciSource {
    pub managed: Option<String>,
    pub namespace: Option<u64>,
    pub address: Option<PciAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSourceVhostVdpa {
    pub dev: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskSlice {
    pub slice_type: String,
    pub offset: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskCookie {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskAuth {
    pub username: Option<String>,
    pub secret: Option<SecretRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskEncryption {
    pub format: Option<String>,
    pub engine: Option<String>,
    pub secrets: Vec<SecretRef>,
}

/// Persistent reservations. The helper socket defaults to `unix`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskReservations {
    pub enabled: Option<String>,
    pub managed: Option<String>,
    pub source: Option<ChardevSource>,
}

// =============================================================================
// CHAINS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskFormat {
    pub format_type: String,
    pub metadata_cache_max: Option<u64>,
    pub metadata_cache_unit: Option<String>,
}

/// One link of a backing chain.
///
/// `source` is `None` for the `<backingStore/>` chain terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskBackingStore {
    pub index: Option<u32>,
    pub format: Option<DiskFormat>,
    pub source: Option<DiskSource>,
    pub backing_store: Option<Box<DiskBackingStore>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskDataStore {
    pub format: Option<DiskFormat>,
    pub source: Option<DiskSource>,
}

/// Destination of an active block job.
///
/// For file mirrors the legacy `file` and `format` attributes are written
/// alongside the nested elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskMirror {
    pub job: Option<String>,
    pub ready: Option<String>,
    pub format: Option<DiskFormat>,
    pub source: Option<DiskSource>,
    pub backing_store: Option<DiskBackingStore>,
}

// =============================================================================
// DISK
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskDriver {
    pub name: Option<String>,
    pub driver_type: Option<String>,
    pub cache: Option<String>,
    pub error_policy: Option<String>,
    pub rerror_policy: Option<String>,
    pub io: Option<String>,
    pub ioeventfd: Option<String>,
    pub event_idx: Option<String>,
    pub copy_on_read: Option<String>,
    pub discard: Option<String>,
    pub iothread: Option<u32>,
    pub detect_zeroes: Option<String>,
    pub queues: Option<u32>,
    pub queue_size: Option<u32>,
    pub iommu: Option<String>,
    pub ats: Option<String>,
    pub packed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskTarget {
    pub dev: Option<String>,
    pub bus: Option<String>,
    pub tray: Option<String>,
    pub removable: Option<String>,
    pub rotation_rate: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskGeometry {
    pub cylinders: u32,
    pub heads: u32,
    pub sectors: u32,
    pub trans: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskBlockIo {
    pub logical_block_size: Option<u32>,
    pub physical_block_size: Option<u32>,
    pub discard_granularity: Option<u32>,
}

/// I/O throttling limits, each written as a child element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskIoTune {
    pub total_bytes_sec: Option<u64>,
    pub read_bytes_sec: Option<u64>,
    pub write_bytes_sec: Option<u64>,
    pub total_iops_sec: Option<u64>,
    pub read_iops_sec: Option<u64>,
    pub write_iops_sec: Option<u64>,
    pub total_bytes_sec_max: Option<u64>,
    pub total_iops_sec_max: Option<u64>,
    pub size_iops_sec: Option<u64>,
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiskTransient {
    pub share_backing: Option<String>,
}

/// A guest disk (`<disk>`).
///
/// `source` is `None` only for values built in code; decoding always yields
/// a source whose kind follows the disk's `type`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Disk {
    pub device: Option<String>,
    pub rawio: Option<String>,
    pub sgio: Option<String>,
    pub snapshot: Option<String>,
    pub model: Option<String>,
    pub driver: Option<DiskDriver>,
    pub auth: Option<DiskAuth>,
    pub source: Option<DiskSource>,
    pub backing_store: Option<DiskBackingStore>,
    pub backend_domain: Option<String>,
    pub geometry: Option<DiskGeometry>,
    pub blockio: Option<DiskBlockIo>,
    pub mirror: Option<DiskMirror>,
    pub target: Option<DiskTarget>,
    pub iotune: Option<DiskIoTune>,
    pub readonly: bool,
    pub shareable: bool,
    pub transient: Option<DiskTransient>,
    pub serial: Option<String>,
    pub wwn: Option<String>,
    pub vendor: Option<String>,
    pub product: Option<String>,
    pub encryption: Option<DiskEncryption>,
    pub boot: Option<DeviceBoot>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}
