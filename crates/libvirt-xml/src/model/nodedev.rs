//! Host node device reports (`<device>`).
//!
//! A node device carries exactly one top-level capability, selected by its
//! `type`. Several capabilities nest sub-capabilities under further
//! `<capability type=…>` children, each with its own closed vocabulary.

use crate::model::common::PciAddress;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeDevice {
    pub name: String,
    pub path: Option<String>,
    pub dev_nodes: Vec<DevNode>,
    pub parent: Option<String>,
    /// `<driver><name>…</name></driver>`
    pub driver: Option<String>,
    pub capability: Option<NodeCapability>,
}

impl NodeDevice {
    pub fn new(name: &str, capability: NodeCapability) -> Self {
        Self {
            name: name.to_string(),
            capability: Some(capability),
            ..Self::default()
        }
    }
}

/// `<devnode type=…>/dev/…</devnode>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DevNode {
    pub node_type: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeCapability {
    System(SystemCapability),
    Pci(PciCapability),
    UsbDevice(UsbDeviceCapability),
    Usb(UsbCapability),
    Net(NetCapability),
    ScsiHost(ScsiHostCapability),
    ScsiTarget(ScsiTargetCapability),
    Scsi(ScsiCapability),
    Storage(StorageCapability),
    Drm(DrmCapability),
    Ccw(CcwIds),
    Mdev(MdevCapability),
    Css(CssCapability),
    ApQueue(ApQueueCapability),
    ApCard(ApCardCapability),
    ApMatrix(ApMatrixCapability),
}

impl NodeCapability {
    pub fn discriminant(&self) -> &'static str {
        match self {
            NodeCapability::System(_) => "system",
            NodeCapability::Pci(_) => "pci",
            NodeCapability::UsbDevice(_) => "usb_device",
            NodeCapability::Usb(_) => "usb",
            NodeCapability::Net(_) => "net",
            NodeCapability::ScsiHost(_) => "scsi_host",
            NodeCapability::ScsiTarget(_) => "scsi_target",
            NodeCapability::Scsi(_) => "scsi",
            NodeCapability::Storage(_) => "storage",
            NodeCapability::Drm(_) => "drm",
            NodeCapability::Ccw(_) => "ccw",
            NodeCapability::Mdev(_) => "mdev",
            NodeCapability::Css(_) => "css",
            NodeCapability::ApQueue(_) => "ap_queue",
            NodeCapability::ApCard(_) => "ap_card",
            NodeCapability::ApMatrix(_) => "ap_matrix",
        }
    }
}

// =============================================================================
// SYSTEM
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemCapability {
    pub product: Option<String>,
    pub hardware: Option<SystemHardware>,
    pub firmware: Option<SystemFirmware>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemHardware {
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub serial: Option<String>,
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemFirmware {
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub release_date: Option<String>,
}

// =============================================================================
// PCI
// =============================================================================

/// A vendor or product: numeric `id` attribute plus an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdName {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IommuGroup {
    pub number: u32,
    pub addresses: Vec<PciAddress>,
}

/// One `<link>` of `<pci-express>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PciExpressLink {
    /// `cap` or `sta`.
    pub validity: Option<String>,
    /// GT/s, kept as written (`2.5`, `8`).
    pub speed: Option<String>,
    pub port: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PciCapability {
    pub class: Option<String>,
    pub domain: Option<u32>,
    pub bus: Option<u32>,
    pub slot: Option<u32>,
    pub function: Option<u32>,
    pub product: Option<IdName>,
    pub vendor: Option<IdName>,
    pub iommu_group: Option<IommuGroup>,
    /// `<numa node=…/>`
    pub numa_node: Option<i32>,
    /// `<pci-express>` links; `None` when the element is absent.
    pub pci_express: Option<Vec<PciExpressLink>>,
    pub capabilities: Vec<PciSubCapability>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PciSubCapability {
    VirtFunctions(VirtFunctions),
    PhysFunction(Option<PciAddress>),
    MdevTypes(Vec<MdevType>),
    Bridge,
    Vpd(PciVpd),
}

impl PciSubCapability {
    pub fn discriminant(&self) -> &'static str {
        match self {
            PciSubCapability::VirtFunctions(_) => "virt_functions",
            PciSubCapability::PhysFunction(_) => "phys_function",
            PciSubCapability::MdevTypes(_) => "mdev_types",
            PciSubCapability::Bridge => "pci-bridge",
            PciSubCapability::Vpd(_) => "vpd",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtFunctions {
    pub max_count: Option<u32>,
    pub addresses: Vec<PciAddress>,
}

/// A mediated device type offered by a parent device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MdevType {
    pub id: String,
    pub name: Option<String>,
    pub device_api: Option<String>,
    pub available_instances: Option<u32>,
}

/// `<vendor_field index=…>` or `<system_field index=…>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VpdCustomField {
    pub index: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VpdReadOnly {
    pub change_level: Option<String>,
    pub manufacture_id: Option<String>,
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    pub vendor_fields: Vec<VpdCustomField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VpdReadWrite {
    pub asset_tag: Option<String>,
    pub vendor_fields: Vec<VpdCustomField>,
    pub system_fields: Vec<VpdCustomField>,
}

/// Vital product data. The two field blocks are `<fields access=…>`
/// children, told apart by `access`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PciVpd {
    pub name: Option<String>,
    pub read_only: Option<VpdReadOnly>,
    pub read_write: Option<VpdReadWrite>,
}

// =============================================================================
// USB
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsbDeviceCapability {
    pub bus: u32,
    pub device: u32,
    pub product: Option<IdName>,
    pub vendor: Option<IdName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsbCapability {
    pub number: u32,
    pub class: u32,
    pub subclass: u32,
    pub protocol: u32,
    pub description: Option<String>,
}

// =============================================================================
// NET
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetLink {
    pub state: String,
    pub speed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetCapability {
    pub interface: String,
    pub address: Option<String>,
    pub link: Option<NetLink>,
    /// Offload feature names, `<feature name=…/>`.
    pub features: Vec<String>,
    pub capabilities: Vec<NetSubCapability>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetSubCapability {
    Wireless80211,
    Ethernet80203,
}

impl NetSubCapability {
    pub fn discriminant(&self) -> &'static str {
        match self {
            NetSubCapability::Wireless80211 => "80211",
            NetSubCapability::Ethernet80203 => "80203",
        }
    }
}

// =============================================================================
// SCSI
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScsiHostCapability {
    pub host: u32,
    pub unique_id: Option<u32>,
    pub capabilities: Vec<ScsiHostSubCapability>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScsiHostSubCapability {
    VportOps { vports: u32, max_vports: u32 },
    FcHost(FcHost),
}

impl ScsiHostSubCapability {
    pub fn discriminant(&self) -> &'static str {
        match self {
            ScsiHostSubCapability::VportOps { .. } => "vport_ops",
            ScsiHostSubCapability::FcHost(_) => "fc_host",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FcHost {
    pub wwnn: Option<String>,
    pub wwpn: Option<String>,
    pub fabric_wwn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScsiTargetCapability {
    pub target: String,
    pub capabilities: Vec<ScsiTargetSubCapability>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScsiTargetSubCapability {
    FcRemotePort { rport: String, wwpn: String },
}

impl ScsiTargetSubCapability {
    pub fn discriminant(&self) -> &'static str {
        match self {
            ScsiTargetSubCapability::FcRemotePort { .. } => "fc_remote_port",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScsiCapability {
    pub host: u32,
    pub bus: u32,
    pub target: u32,
    pub lun: u32,
    pub scsi_type: Option<String>,
}

// =============================================================================
// STORAGE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageCapability {
    pub block: Option<String>,
    pub bus: Option<String>,
    pub drive_type: Option<String>,
    pub model: Option<String>,
    pub vendor: Option<String>,
    pub serial: Option<String>,
    pub size: Option<u64>,
    pub logical_block_size: Option<u64>,
    pub num_blocks: Option<u64>,
    pub capabilities: Vec<StorageSubCapability>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSubCapability {
    Removable(RemovableMedia),
}

impl StorageSubCapability {
    pub fn discriminant(&self) -> &'static str {
        match self {
            StorageSubCapability::Removable(_) => "removable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemovableMedia {
    pub media_available: Option<u32>,
    pub media_size: Option<u64>,
    pub media_label: Option<String>,
    pub logical_block_size: Option<u64>,
    pub num_blocks: Option<u64>,
}

// =============================================================================
// DRM, CCW, MDEV, CSS, AP
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrmCapability {
    pub drm_type: Option<String>,
}

/// Channel subsystem identifiers, written as hex element text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CcwIds {
    pub cssid: Option<u32>,
    pub ssid: Option<u32>,
    pub devno: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MdevAttr {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MdevCapability {
    /// `<type id=…/>`
    pub mdev_type: Option<String>,
    pub iommu_group: Option<IommuGroup>,
    pub uuid: Option<String>,
    pub parent_addr: Option<String>,
    pub attrs: Vec<MdevAttr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CssCapability {
    pub ids: CcwIds,
    pub channel_dev_addr: Option<CcwIds>,
    /// One entry per `<capability type="mdev_types">`.
    pub mdev_types: Vec<Vec<MdevType>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApQueueCapability {
    pub ap_adapter: String,
    pub ap_domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApCardCapability {
    pub ap_adapter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApMatrixCapability {
    /// One entry per `<capability type="mdev_types">`.
    pub mdev_types: Vec<Vec<MdevType>>,
}
