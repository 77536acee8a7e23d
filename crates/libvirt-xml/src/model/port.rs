//! Network port reservations (`<networkport>`).

use crate::model::common::PciAddress;
use crate::model::netdev::{Bandwidth, PortOptions, VirtualPort, Vlan};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkPort {
    pub uuid: Option<String>,
    pub owner: Option<PortOwner>,
    pub group: Option<String>,
    /// `<mac address=…/>`
    pub mac: Option<String>,
    pub bandwidth: Option<Bandwidth>,
    pub vlan: Option<Vlan>,
    pub port_options: Option<PortOptions>,
    /// `<rxfilters trustGuest=…/>`
    pub trust_guest_rx_filters: Option<String>,
    pub virtual_port: Option<VirtualPort>,
    pub plug: Option<PortPlug>,
}

/// The domain that owns the port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortOwner {
    pub name: Option<String>,
    pub uuid: Option<String>,
}

/// How the port is attached on the host, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortPlug {
    Network(PlugBridge),
    Bridge(PlugBridge),
    Direct(PlugDirect),
    HostdevPci(PlugHostdevPci),
}

impl PortPlug {
    pub fn discriminant(&self) -> &'static str {
        match self {
            PortPlug::Network(_) => "network",
            PortPlug::Bridge(_) => "bridge",
            PortPlug::Direct(_) => "direct",
            PortPlug::HostdevPci(_) => "hostdev-pci",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlugBridge {
    pub bridge: String,
    pub mac_table_manager: Option<String>,
    pub mtu: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlugDirect {
    pub dev: String,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlugHostdevPci {
    pub managed: Option<String>,
    /// `<driver name=…/>`
    pub driver: Option<String>,
    pub address: Option<PciAddress>,
}
