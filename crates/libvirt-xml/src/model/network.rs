//! Virtual network definitions (`<network>`).

use crate::codec::tree::Element;
use crate::model::common::PciAddress;
use crate::model::domain::Metadata;
use crate::model::extension::DnsmasqOptions;
use crate::model::netdev::{Bandwidth, PortOptions, Route, VirtualPort, Vlan};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Network {
    pub ipv6: Option<String>,
    pub trust_guest_rx_filters: Option<String>,
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub metadata: Option<Metadata>,
    pub forward: Option<NetworkForward>,
    pub bridge: Option<NetworkBridge>,
    /// `<mtu size=…/>`
    pub mtu: Option<u32>,
    /// `<mac address=…/>`
    pub mac: Option<String>,
    pub domain: Option<NetworkDomain>,
    pub dns: Option<NetworkDns>,
    pub vlan: Option<Vlan>,
    pub bandwidth: Option<Bandwidth>,
    pub port_options: Option<PortOptions>,
    pub ips: Vec<NetworkIp>,
    pub routes: Vec<Route>,
    pub virtual_port: Option<VirtualPort>,
    pub port_groups: Vec<PortGroup>,
    pub dnsmasq_options: Option<DnsmasqOptions>,
    /// Namespaced elements no typed block claimed.
    pub foreign: Vec<Element>,
}

impl Network {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkBridge {
    pub name: Option<String>,
    pub stp: Option<String>,
    pub delay: Option<String>,
    pub mac_table_manager: Option<String>,
    pub zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkDomain {
    pub name: Option<String>,
    pub local_only: Option<String>,
}

// =============================================================================
// FORWARD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NatAddressRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NatPortRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForwardNat {
    pub ipv6: Option<String>,
    pub addresses: Vec<NatAddressRange>,
    pub ports: Vec<NatPortRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForwardDriver {
    pub name: Option<String>,
    pub model: Option<String>,
}

/// A device in the forward pool, selected by `type`.
///
/// An `<address>` without a `type` is skipped on decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardAddress {
    Pci(PciAddress),
}

impl ForwardAddress {
    pub fn discriminant(&self) -> &'static str {
        match self {
            ForwardAddress::Pci(_) => "pci",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkForward {
    pub mode: Option<String>,
    pub dev: Option<String>,
    pub managed: Option<String>,
    pub driver: Option<ForwardDriver>,
    /// Physical functions, by `dev`.
    pub pfs: Vec<String>,
    pub nat: Option<ForwardNat>,
    /// Pool interfaces, by `dev`.
    pub interfaces: Vec<String>,
    pub addresses: Vec<ForwardAddress>,
}

// =============================================================================
// ADDRESSING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DhcpLease {
    pub expiry: u32,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DhcpRange {
    pub start: Option<String>,
    pub end: Option<String>,
    pub lease: Option<DhcpLease>,
}

/// A static DHCP reservation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DhcpHost {
    pub id: Option<String>,
    pub mac: Option<String>,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub lease: Option<DhcpLease>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bootp {
    pub file: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkDhcp {
    pub ranges: Vec<DhcpRange>,
    pub hosts: Vec<DhcpHost>,
    pub bootp: Vec<Bootp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkIp {
    pub address: Option<String>,
    pub family: Option<String>,
    pub netmask: Option<String>,
    pub prefix: Option<u32>,
    pub local_ptr: Option<String>,
    pub dhcp: Option<NetworkDhcp>,
    /// `<tftp root=…/>`
    pub tftp_root: Option<String>,
}

// =============================================================================
// DNS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsForwarder {
    pub domain: Option<String>,
    pub addr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsTxt {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsHost {
    pub ip: String,
    pub hostnames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsSrv {
    pub service: Option<String>,
    pub protocol: Option<String>,
    pub target: Option<String>,
    pub port: Option<u32>,
    pub priority: Option<u32>,
    pub weight: Option<u32>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkDns {
    pub enable: Option<String>,
    pub forward_plain_names: Option<String>,
    pub forwarders: Vec<DnsForwarder>,
    pub txts: Vec<DnsTxt>,
    pub hosts: Vec<DnsHost>,
    pub srvs: Vec<DnsSrv>,
}

// =============================================================================
// PORTGROUPS
// =============================================================================

/// Named connection profile that guest interfaces can select.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortGroup {
    pub name: String,
    pub default: Option<String>,
    pub trust_guest_rx_filters: Option<String>,
    pub vlan: Option<Vlan>,
    pub virtual_port: Option<VirtualPort>,
    pub bandwidth: Option<Bandwidth>,
}
