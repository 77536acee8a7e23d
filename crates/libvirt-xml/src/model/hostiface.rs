//! Host network interfaces (`<interface>` documents of the interface driver).
//!
//! Not to be confused with a guest's `<interface>` device in
//! [`crate::model::interface`].

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInterface {
    pub name: Option<String>,
    /// `<start mode=…/>`: `onboot`, `hotplug` or `none`.
    pub start_mode: Option<String>,
    pub mac: Option<String>,
    pub link: Option<HostLink>,
    pub mtu: Option<u32>,
    pub protocols: Vec<HostProtocol>,
    pub kind: HostInterfaceKind,
}

impl HostInterface {
    pub fn new(name: &str, kind: HostInterfaceKind) -> Self {
        Self {
            name: Some(name.to_string()),
            start_mode: None,
            mac: None,
            link: None,
            mtu: None,
            protocols: Vec::new(),
            kind,
        }
    }

    pub fn ethernet(name: &str) -> Self {
        Self::new(name, HostInterfaceKind::Ethernet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostInterfaceKind {
    Ethernet,
    Bridge(HostBridge),
    Bond(HostBond),
    Vlan(HostVlan),
}

impl HostInterfaceKind {
    pub fn discriminant(&self) -> &'static str {
        match self {
            HostInterfaceKind::Ethernet => "ethernet",
            HostInterfaceKind::Bridge(_) => "bridge",
            HostInterfaceKind::Bond(_) => "bond",
            HostInterfaceKind::Vlan(_) => "vlan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostLink {
    pub speed: Option<u32>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostBridge {
    pub stp: Option<String>,
    /// Forward delay in seconds, kept as written.
    pub delay: Option<String>,
    pub interfaces: Vec<HostInterface>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostBond {
    pub mode: Option<String>,
    pub monitor: Option<BondMonitor>,
    pub interfaces: Vec<HostInterface>,
}

/// Link monitoring of a bond, selected by element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BondMonitor {
    Mii(MiiMonitor),
    Arp(ArpMonitor),
}

impl BondMonitor {
    pub fn discriminant(&self) -> &'static str {
        match self {
            BondMonitor::Mii(_) => "miimon",
            BondMonitor::Arp(_) => "arpmon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MiiMonitor {
    pub freq: Option<u32>,
    pub updelay: Option<u32>,
    pub downdelay: Option<u32>,
    pub carrier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArpMonitor {
    pub interval: Option<u32>,
    pub target: Option<String>,
    pub validate: Option<String>,
}

/// A VLAN on top of the interface named by `device`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostVlan {
    pub tag: u16,
    pub device: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostProtocol {
    /// `ipv4` or `ipv6`.
    pub family: String,
    pub autoconf: bool,
    pub dhcp: Option<HostDhcp>,
    pub addresses: Vec<HostIp>,
    pub gateway: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostDhcp {
    pub peerdns: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostIp {
    pub address: String,
    pub prefix: Option<u32>,
}
