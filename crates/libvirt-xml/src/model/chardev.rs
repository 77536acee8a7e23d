//! Character devices and their sources.
//!
//! The source kind is named by the `type` attribute of the owning device
//! (`<serial type="pty">`), while the payload sits on the nested
//! `<source>` element. Devices that own no `type` of their own (reservations,
//! vhost-user, external TPM) carry the `type` on `<source>` itself.

use crate::model::common::{Alias, DeviceAcpi, DeviceAddress, DeviceBoot, DeviceSecLabel};

/// A character device backend, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChardevSource {
    Null,
    Vc,
    Pty(ChardevPath),
    Dev(ChardevPath),
    File(ChardevFile),
    Pipe(ChardevPath),
    Stdio,
    Udp(ChardevUdp),
    Tcp(ChardevTcp),
    Unix(ChardevUnix),
    SpiceVmc,
    SpicePort(ChardevSpicePort),
    Nmdm(ChardevNmdm),
    QemuVdagent(ChardevQemuVdagent),
    Dbus(ChardevDbus),
}

impl Default for ChardevSource {
    fn default() -> Self {
        ChardevSource::Pty(ChardevPath::default())
    }
}

impl ChardevSource {
    /// Returns the `type` value for this source.
    pub fn discriminant(&self) -> &'static str {
        match self {
            ChardevSource::Null => "null",
            ChardevSource::Vc => "vc",
            ChardevSource::Pty(_) => "pty",
            ChardevSource::Dev(_) => "dev",
            ChardevSource::File(_) => "file",
            ChardevSource::Pipe(_) => "pipe",
            ChardevSource::Stdio => "stdio",
            ChardevSource::Udp(_) => "udp",
            ChardevSource::Tcp(_) => "tcp",
            ChardevSource::Unix(_) => "unix",
            ChardevSource::SpiceVmc => "spicevmc",
            ChardevSource::SpicePort(_) => "spiceport",
            ChardevSource::Nmdm(_) => "nmdm",
            ChardevSource::QemuVdagent(_) => "qemu-vdagent",
            ChardevSource::Dbus(_) => "dbus",
        }
    }

    /// Creates a UNIX socket source.
    pub fn unix(path: &str, mode: &str) -> Self {
        ChardevSource::Unix(ChardevUnix {
            mode: Some(mode.to_string()),
            path: Some(path.to_string()),
            ..ChardevUnix::default()
        })
    }
}

/// Path-only source used by pty, dev and pipe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevPath {
    pub path: Option<String>,
    pub seclabels: Vec<DeviceSecLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevFile {
    pub path: Option<String>,
    pub append: Option<String>,
    pub seclabels: Vec<DeviceSecLabel>,
}

/// UDP source, written as up to two `<source mode="bind|connect">` elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevUdp {
    pub bind_host: Option<String>,
    pub bind_service: Option<String>,
    pub connect_host: Option<String>,
    pub connect_service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevReconnect {
    pub enabled: String,
    pub timeout: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevTcp {
    pub mode: Option<String>,
    pub host: Option<String>,
    pub service: Option<String>,
    pub tls: Option<String>,
    pub reconnect: Option<ChardevReconnect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevUnix {
    pub mode: Option<String>,
    pub path: Option<String>,
    pub reconnect: Option<ChardevReconnect>,
    pub seclabels: Vec<DeviceSecLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevSpicePort {
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevNmdm {
    pub master: String,
    pub slave: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevQemuVdagent {
    pub mouse_mode: Option<String>,
    pub copypaste: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevDbus {
    pub channel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevProtocol {
    pub protocol_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChardevLog {
    pub file: String,
    pub append: Option<String>,
}

// =============================================================================
// DEVICES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerialTarget {
    pub target_type: Option<String>,
    pub port: Option<u32>,
    pub model: Option<String>,
}

/// Target of a console or parallel port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortTarget {
    pub target_type: Option<String>,
    pub port: Option<u32>,
}

/// Serial port (`<serial>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Serial {
    pub source: ChardevSource,
    pub protocol: Option<ChardevProtocol>,
    pub target: Option<SerialTarget>,
    pub log: Option<ChardevLog>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// Parallel port (`<parallel>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parallel {
    pub source: ChardevSource,
    pub protocol: Option<ChardevProtocol>,
    pub target: Option<PortTarget>,
    pub log: Option<ChardevLog>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// Console (`<console>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Console {
    pub tty: Option<String>,
    pub source: ChardevSource,
    pub protocol: Option<ChardevProtocol>,
    pub target: Option<PortTarget>,
    pub log: Option<ChardevLog>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// Target of a channel, selected by `target/@type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    Virtio { name: Option<String>, state: Option<String> },
    Xen { name: Option<String>, state: Option<String> },
    GuestFwd { address: Option<String>, port: Option<String> },
}

impl ChannelTarget {
    pub fn discriminant(&self) -> &'static str {
        match self {
            ChannelTarget::Virtio { .. } => "virtio",
            ChannelTarget::Xen { .. } => "xen",
            ChannelTarget::GuestFwd { .. } => "guestfwd",
        }
    }
}

/// Guest channel (`<channel>`). The target is required and selects the
/// channel's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub source: ChardevSource,
    pub protocol: Option<ChardevProtocol>,
    pub target: ChannelTarget,
    pub log: Option<ChardevLog>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// USB redirection device (`<redirdev>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirDev {
    pub bus: Option<String>,
    pub source: ChardevSource,
    pub protocol: Option<ChardevProtocol>,
    pub boot: Option<DeviceBoot>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// One `<usbdev>` rule of a redirection filter.
///
/// `None` in `class`, `vendor` or `product` matches any value and is written
/// as `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirFilterUsb {
    pub class: Option<u32>,
    pub vendor: Option<u32>,
    pub product: Option<u32>,
    pub version: Option<String>,
    pub allow: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirFilter {
    pub usb: Vec<RedirFilterUsb>,
}
