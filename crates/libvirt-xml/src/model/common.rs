//! Records shared by many devices and documents.

/// User-visible alias of a device (`<alias name=…/>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alias {
    pub name: String,
}

/// Per-device boot order (`<boot order=…/>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceBoot {
    pub order: u32,
    pub loadparm: Option<String>,
}

/// ACPI index of a device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceAcpi {
    pub index: Option<u32>,
}

/// Option ROM settings of a PCI device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceRom {
    pub bar: Option<String>,
    pub file: Option<String>,
    pub enabled: Option<String>,
}

/// A device address, selected by `type`.
///
/// An `<address>` without a `type` carries no information and decodes as
/// absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAddress {
    Pci(PciAddress),
    Drive(DriveAddress),
    VirtioSerial(VirtioSerialAddress),
    Ccid(CcidAddress),
    Usb(UsbAddress),
    SpaprVio(SpaprVioAddress),
    VirtioS390,
    Ccw(CcwAddress),
    VirtioMmio,
    Isa(IsaAddress),
    Dimm(DimmAddress),
    Unassigned,
}

impl DeviceAddress {
    /// Returns the `type` value for this address.
    pub fn discriminant(&self) -> &'static str {
        match self {
            DeviceAddress::Pci(_) => "pci",
            DeviceAddress::Drive(_) => "drive",
            DeviceAddress::VirtioSerial(_) => "virtio-serial",
            DeviceAddress::Ccid(_) => "ccid",
            DeviceAddress::Usb(_) => "usb",
            DeviceAddress::SpaprVio(_) => "spapr-vio",
            DeviceAddress::VirtioS390 => "virtio-s390",
            DeviceAddress::Ccw(_) => "ccw",
            DeviceAddress::VirtioMmio => "virtio-mmio",
            DeviceAddress::Isa(_) => "isa",
            DeviceAddress::Dimm(_) => "dimm",
            DeviceAddress::Unassigned => "unassigned",
        }
    }
}

/// A PCI address. Every part is optional and omitted when `None`.
///
/// Parts are written as hex: domain `0x%04x`, bus and slot `0x%02x`,
/// function `0x%x`. They are read with prefix auto-detection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PciAddress {
    pub domain: Option<u32>,
    pub bus: Option<u32>,
    pub slot: Option<u32>,
    pub function: Option<u32>,
    pub multifunction: Option<String>,
    pub zpci: Option<ZpciAddress>,
}

impl PciAddress {
    /// Creates a fully specified address.
    pub fn new(domain: u32, bus: u32, slot: u32, function: u32) -> Self {
        Self {
            domain: Some(domain),
            bus: Some(bus),
            slot: Some(slot),
            function: Some(function),
            ..Self::default()
        }
    }
}

/// s390 zPCI identifiers nested in a PCI address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZpciAddress {
    pub uid: Option<u32>,
    pub fid: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriveAddress {
    pub controller: Option<u32>,
    pub bus: Option<u32>,
    pub target: Option<u32>,
    pub unit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtioSerialAddress {
    pub controller: Option<u32>,
    pub bus: Option<u32>,
    pub port: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CcidAddress {
    pub controller: Option<u32>,
    pub slot: Option<u32>,
}

/// USB address. `port` is a dotted hub path such as `1.2`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsbAddress {
    pub bus: Option<u32>,
    pub port: Option<String>,
    pub device: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpaprVioAddress {
    pub reg: Option<u64>,
}

/// s390 channel I/O address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CcwAddress {
    pub cssid: Option<u32>,
    pub ssid: Option<u32>,
    pub devno: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IsaAddress {
    pub iobase: Option<u32>,
    pub irq: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimmAddress {
    pub slot: Option<u32>,
    pub base: Option<u64>,
}

/// Mediated device address (`<address uuid=…/>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MdevAddress {
    pub uuid: String,
}

/// Security label attached to a single device or source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceSecLabel {
    pub model: Option<String>,
    pub labelskip: Option<String>,
    pub relabel: Option<String>,
    pub label: Option<String>,
}

/// A value with an optional unit, written as `<name unit="…">value</name>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScaledValue {
    pub value: u64,
    pub unit: Option<String>,
}

impl ScaledValue {
    pub fn new(value: u64, unit: &str) -> Self {
        Self {
            value,
            unit: Some(unit.to_string()),
        }
    }
}

/// Reference to a libvirt secret, by usage or by UUID.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecretRef {
    pub secret_type: Option<String>,
    pub usage: Option<String>,
    pub uuid: Option<String>,
}

/// Owner and mode of a file, used by storage targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Permissions {
    pub owner: Option<String>,
    pub group: Option<String>,
    pub mode: Option<String>,
    pub label: Option<String>,
}
