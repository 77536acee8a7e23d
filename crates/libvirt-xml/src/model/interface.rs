//! Guest network interfaces (`<interface>` under `<devices>`).
//!
//! The interface `type` is required and names the source variant. The
//! variant's fields live on the nested `<source>` element, except for
//! `ethernet`, whose addresses and routes sit on the interface itself.

use crate::model::chardev::ChardevSource;
use crate::model::common::{Alias, DeviceAcpi, DeviceAddress, DeviceBoot, DeviceRom, PciAddress, UsbAddress};
use crate::model::netdev::{Bandwidth, FilterRef, IpAddress, PortOptions, Route, Teaming, VirtualPort, Vlan};

/// Interface source, selected by the interface `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceSource {
    User(InterfaceSourceUser),
    Ethernet,
    VhostUser(ChardevSource),
    Server(InterfaceSourceSocket),
    Client(InterfaceSourceSocket),
    Mcast(InterfaceSourceSocket),
    Network(InterfaceSourceNetwork),
    Bridge(InterfaceSourceBridge),
    Internal(InterfaceSourceInternal),
    Direct(InterfaceSourceDirect),
    Hostdev(Option<InterfaceHostdevSource>),
    Udp(InterfaceSourceSocket),
    Vdpa(InterfaceSourceVdpa),
    Null,
    Vds(InterfaceSourceVds),
}

impl InterfaceSource {
    /// Returns the interface `type` value for this source.
    pub fn discriminant(&self) -> &'static str {
        match self {
            InterfaceSource::User(_) => "user",
            InterfaceSource::Ethernet => "ethernet",
            InterfaceSource::VhostUser(_) => "vhostuser",
            InterfaceSource::Server(_) => "server",
            InterfaceSource::Client(_) => "client",
            InterfaceSource::Mcast(_) => "mcast",
            InterfaceSource::Network(_) => "network",
            InterfaceSource::Bridge(_) => "bridge",
            InterfaceSource::Internal(_) => "internal",
            InterfaceSource::Direct(_) => "direct",
            InterfaceSource::Hostdev(_) => "hostdev",
            InterfaceSource::Udp(_) => "udp",
            InterfaceSource::Vdpa(_) => "vdpa",
            InterfaceSource::Null => "null",
            InterfaceSource::Vds(_) => "vds",
        }
    }

    /// Creates a source attached to a libvirt virtual network.
    pub fn network(name: &str) -> Self {
        InterfaceSource::Network(InterfaceSourceNetwork {
            network: Some(name.to_string()),
            ..InterfaceSourceNetwork::default()
        })
    }

    /// Creates a source attached to a host bridge.
    pub fn bridge(name: &str) -> Self {
        InterfaceSource::Bridge(InterfaceSourceBridge {
            bridge: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceUser {
    pub dev: Option<String>,
}

/// Socket endpoint used by the server, client, mcast and udp sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceSocket {
    pub address: Option<String>,
    pub port: Option<u32>,
    pub local: Option<InterfaceSourceLocal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceLocal {
    pub address: Option<String>,
    pub port: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceNetwork {
    pub network: Option<String>,
    pub portgroup: Option<String>,
    pub bridge: Option<String>,
    pub portid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceBridge {
    pub bridge: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceInternal {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceDirect {
    pub dev: Option<String>,
    pub mode: Option<String>,
}

/// Host device behind a `hostdev` interface.
///
/// There is no discriminant attribute on the source; the variant follows the
/// `type` of the nested `<address>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceHostdevSource {
    Pci(PciAddress),
    Usb(UsbAddress),
}

impl InterfaceHostdevSource {
    pub fn discriminant(&self) -> &'static str {
        match self {
            InterfaceHostdevSource::Pci(_) => "pci",
            InterfaceHostdevSource::Usb(_) => "usb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceVdpa {
    pub dev: Option<String>,
}

/// VMware distributed switch port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceSourceVds {
    pub switch_id: String,
    pub port_id: Option<i64>,
    pub portgroup_id: Option<String>,
    pub connection_id: Option<i64>,
}

// =============================================================================
// INTERFACE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceMac {
    pub address: String,
    pub mac_type: Option<String>,
    pub check: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortForwardRange {
    pub start: u32,
    pub end: Option<u32>,
    pub to: Option<u32>,
    pub exclude: Option<String>,
}

/// Passt port forwarding rule (`<portForward>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortForward {
    pub proto: String,
    pub address: Option<String>,
    pub dev: Option<String>,
    pub ranges: Vec<PortForwardRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceTarget {
    pub dev: String,
    pub managed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceGuest {
    pub dev: Option<String>,
    pub actual: Option<String>,
}

/// Offload toggles applied on the host side of a virtio NIC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceDriverHost {
    pub csum: Option<String>,
    pub gso: Option<String>,
    pub tso4: Option<String>,
    pub tso6: Option<String>,
    pub ecn: Option<String>,
    pub ufo: Option<String>,
    pub mrg_rxbuf: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceDriverGuest {
    pub csum: Option<String>,
    pub tso4: Option<String>,
    pub tso6: Option<String>,
    pub ecn: Option<String>,
    pub ufo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceDriver {
    pub name: Option<String>,
    pub txmode: Option<String>,
    pub ioeventfd: Option<String>,
    pub event_idx: Option<String>,
    pub queues: Option<u32>,
    pub rx_queue_size: Option<u32>,
    pub tx_queue_size: Option<u32>,
    pub iommu: Option<String>,
    pub ats: Option<String>,
    pub packed: Option<String>,
    pub page_per_vq: Option<String>,
    pub rss: Option<String>,
    pub rss_hash_report: Option<String>,
    pub host: Option<InterfaceDriverHost>,
    pub guest: Option<InterfaceDriverGuest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceBackend {
    pub backend_type: Option<String>,
    pub tap: Option<String>,
    pub vhost: Option<String>,
    pub log_file: Option<String>,
}

/// A guest network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub managed: Option<String>,
    pub trust_guest_rx_filters: Option<String>,
    pub mac: Option<InterfaceMac>,
    pub source: InterfaceSource,
    pub boot: Option<DeviceBoot>,
    pub vlan: Option<Vlan>,
    pub virtualport: Option<VirtualPort>,
    pub ips: Vec<IpAddress>,
    pub routes: Vec<Route>,
    pub port_forwards: Vec<PortForward>,
    pub script: Option<String>,
    pub downscript: Option<String>,
    pub backend_domain: Option<String>,
    pub target: Option<InterfaceTarget>,
    pub guest: Option<InterfaceGuest>,
    pub model: Option<String>,
    pub driver: Option<InterfaceDriver>,
    pub backend: Option<InterfaceBackend>,
    pub filterref: Option<FilterRef>,
    pub tune_sndbuf: Option<u64>,
    pub teaming: Option<Teaming>,
    pub link_state: Option<String>,
    pub mtu: Option<u32>,
    pub bandwidth: Option<Bandwidth>,
    pub port: Option<PortOptions>,
    pub coalesce_rx_frames_max: Option<u32>,
    pub rom: Option<DeviceRom>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

impl Interface {
    /// Creates an interface with the given source and nothing else set.
    pub fn new(source: InterfaceSource) -> Self {
        Self {
            managed: None,
            trust_guest_rx_filters: None,
            mac: None,
            source,
            boot: None,
            vlan: None,
            virtualport: None,
            ips: Vec::new(),
            routes: Vec::new(),
            port_forwards: Vec::new(),
            script: None,
            downscript: None,
            backend_domain: None,
            target: None,
            guest: None,
            model: None,
            driver: None,
            backend: None,
            filterref: None,
            tune_sndbuf: None,
            teaming: None,
            link_state: None,
            mtu: None,
            bandwidth: None,
            port: None,
            coalesce_rx_frames_max: None,
            rom: None,
            acpi: None,
            alias: None,
            address: None,
        }
    }
}
