//! Host device assignment (`<hostdev>`).
//!
//! A hostdev is selected by two attributes: `mode` picks the family and
//! `type` picks the device kind within it. Subsystem devices are passed
//! through by bus address; capability devices (containers only) by host
//! resource name.

use crate::model::common::{
    Alias, DeviceAcpi, DeviceAddress, DeviceBoot, DeviceRom, DriveAddress, MdevAddress, PciAddress, UsbAddress,
};
use crate::model::disk::{DiskAuth, DiskSourceHost};
use crate::model::netdev::{IpAddress, Route, Teaming};

/// The device behind a hostdev, selected by `mode` and `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostdevMode {
    Subsystem(HostdevSubsystem),
    Capabilities(HostdevCapabilities),
}

impl HostdevMode {
    /// Returns the `mode` value.
    pub fn discriminant(&self) -> &'static str {
        match self {
            HostdevMode::Subsystem(_) => "subsystem",
            HostdevMode::Capabilities(_) => "capabilities",
        }
    }

    /// Returns the `type` value within the mode.
    pub fn kind(&self) -> &'static str {
        match self {
            HostdevMode::Subsystem(subsystem) => subsystem.discriminant(),
            HostdevMode::Capabilities(caps) => caps.discriminant(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostdevSubsystem {
    Scsi(HostdevScsi),
    ScsiHost(HostdevScsiHost),
    Usb(HostdevUsb),
    Pci(HostdevPci),
    Mdev(HostdevMdev),
}

impl HostdevSubsystem {
    pub fn discriminant(&self) -> &'static str {
        match self {
            HostdevSubsystem::Scsi(_) => "scsi",
            HostdevSubsystem::ScsiHost(_) => "scsi_host",
            HostdevSubsystem::Usb(_) => "usb",
            HostdevSubsystem::Pci(_) => "pci",
            HostdevSubsystem::Mdev(_) => "mdev",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostdevCapabilities {
    Storage { block: String },
    Misc { char_dev: String },
    Net(HostdevCapsNet),
}

impl HostdevCapabilities {
    pub fn discriminant(&self) -> &'static str {
        match self {
            HostdevCapabilities::Storage { .. } => "storage",
            HostdevCapabilities::Misc { .. } => "misc",
            HostdevCapabilities::Net(_) => "net",
        }
    }
}

// =============================================================================
// SUBSYSTEM
// =============================================================================

/// SCSI source, selected by `protocol`. An absent protocol means a host
/// adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostdevScsiSource {
    Host(HostdevScsiHostSource),
    Iscsi(HostdevScsiIscsiSource),
}

impl Default for HostdevScsiSource {
    fn default() -> Self {
        HostdevScsiSource::Host(HostdevScsiHostSource::default())
    }
}

impl HostdevScsiSource {
    /// Returns the `protocol` value, `None` for a host adapter.
    pub fn discriminant(&self) -> Option<&'static str> {
        match self {
            HostdevScsiSource::Host(_) => None,
            HostdevScsiSource::Iscsi(_) => Some("iscsi"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevScsiHostSource {
    pub adapter: Option<String>,
    pub address: Option<DriveAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevScsiIscsiSource {
    pub name: String,
    pub hosts: Vec<DiskSourceHost>,
    pub auth: Option<DiskAuth>,
    pub initiator_iqn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevScsi {
    pub sgio: Option<String>,
    pub rawio: Option<String>,
    pub source: Option<HostdevScsiSource>,
    pub readonly: bool,
    pub shareable: bool,
}

/// vhost-scsi target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevScsiHost {
    pub model: Option<String>,
    pub protocol: Option<String>,
    pub wwpn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevUsb {
    pub guest_reset: Option<String>,
    pub address: Option<UsbAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevPciDriver {
    pub name: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevPci {
    pub display: Option<String>,
    pub ramfb: Option<String>,
    pub driver: Option<HostdevPciDriver>,
    pub write_filtering: Option<String>,
    pub address: Option<PciAddress>,
    pub teaming: Option<Teaming>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevMdev {
    pub model: Option<String>,
    pub display: Option<String>,
    pub ramfb: Option<String>,
    pub address: Option<MdevAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostdevCapsNet {
    pub interface: String,
    pub ips: Vec<IpAddress>,
    pub routes: Vec<Route>,
}

/// An assigned host device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostdev {
    pub managed: Option<String>,
    pub mode: HostdevMode,
    pub boot: Option<DeviceBoot>,
    pub rom: Option<DeviceRom>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

impl Hostdev {
    pub fn new(mode: HostdevMode) -> Self {
        Self {
            managed: None,
            mode,
            boot: None,
            rom: None,
            acpi: None,
            alias: None,
            address: None,
        }
    }

    /// Creates a managed PCI passthrough device.
    pub fn pci(address: PciAddress) -> Self {
        let mut hostdev = Self::new(HostdevMode::Subsystem(HostdevSubsystem::Pci(HostdevPci {
            address: Some(address),
            ..HostdevPci::default()
        })));
        hostdev.managed = Some("yes".to_string());
        hostdev
    }
}
