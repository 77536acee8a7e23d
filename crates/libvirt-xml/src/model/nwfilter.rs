//! Network traffic filters (`<filter>`).
//!
//! A filter is an ordered list of entries. Each entry is a `<rule>` or a
//! `<filterref>` to another filter; a rule matches one protocol, chosen by
//! the tag of its single child element.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NwFilter {
    pub name: String,
    pub uuid: Option<String>,
    pub chain: Option<String>,
    pub priority: Option<i32>,
    pub entries: Vec<FilterEntry>,
}

impl NwFilter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEntry {
    Rule(FilterRule),
    Ref(FilterRef),
}

impl FilterEntry {
    /// Element name of the entry.
    pub fn discriminant(&self) -> &'static str {
        match self {
            FilterEntry::Rule(_) => "rule",
            FilterEntry::Ref(_) => "filterref",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterRef {
    pub filter: String,
    pub parameters: Vec<FilterParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterParameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterRule {
    pub action: Option<String>,
    pub direction: Option<String>,
    pub priority: Option<i32>,
    pub state_match: Option<String>,
    pub protocol: Option<RuleProtocol>,
}

/// A rule attribute value.
///
/// `$NAME` refers to a filter variable and `0x…` is a number; anything else
/// is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Variable(String),
    Uint(u64),
    Str(String),
}

impl FieldValue {
    pub fn str(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }

    pub fn var(name: &str) -> Self {
        FieldValue::Variable(name.to_string())
    }
}

/// The protocol element of a rule. `match` and `comment` are common to
/// every protocol and bracket the protocol's own attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleProtocol {
    /// `match="no"` inverts the rule.
    pub matching: Option<String>,
    pub body: ProtocolBody,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolBody {
    Mac(MacRule),
    Vlan(VlanRule),
    Stp(StpMatch),
    Arp(ArpMatch),
    Rarp(ArpMatch),
    Ip(IpHeader),
    Ipv6(Ipv6Header),
    Tcp(TcpMatch),
    Udp(PortedMatch),
    UdpLite(IpMatch),
    Esp(IpMatch),
    Ah(IpMatch),
    Sctp(PortedMatch),
    Icmp(IcmpMatch),
    Igmp(IpMatch),
    All(IpMatch),
    TcpIpv6(TcpMatch),
    UdpIpv6(PortedMatch),
    UdpLiteIpv6(IpMatch),
    EspIpv6(IpMatch),
    AhIpv6(IpMatch),
    SctpIpv6(PortedMatch),
    Icmpv6(IcmpMatch),
    AllIpv6(IpMatch),
}

impl ProtocolBody {
    /// Element name of the protocol.
    pub fn discriminant(&self) -> &'static str {
        match self {
            ProtocolBody::Mac(_) => "mac",
            ProtocolBody::Vlan(_) => "vlan",
            ProtocolBody::Stp(_) => "stp",
            ProtocolBody::Arp(_) => "arp",
            ProtocolBody::Rarp(_) => "rarp",
            ProtocolBody::Ip(_) => "ip",
            ProtocolBody::Ipv6(_) => "ipv6",
            ProtocolBody::Tcp(_) => "tcp",
            ProtocolBody::Udp(_) => "udp",
            ProtocolBody::UdpLite(_) => "udplite",
            ProtocolBody::Esp(_) => "esp",
            ProtocolBody::Ah(_) => "ah",
            ProtocolBody::Sctp(_) => "sctp",
            ProtocolBody::Icmp(_) => "icmp",
            ProtocolBody::Igmp(_) => "igmp",
            ProtocolBody::All(_) => "all",
            ProtocolBody::TcpIpv6(_) => "tcp-ipv6",
            ProtocolBody::UdpIpv6(_) => "udp-ipv6",
            ProtocolBody::UdpLiteIpv6(_) => "udplite-ipv6",
            ProtocolBody::EspIpv6(_) => "esp-ipv6",
            ProtocolBody::AhIpv6(_) => "ah-ipv6",
            ProtocolBody::SctpIpv6(_) => "sctp-ipv6",
            ProtocolBody::Icmpv6(_) => "icmpv6",
            ProtocolBody::AllIpv6(_) => "all-ipv6",
        }
    }
}

// =============================================================================
// FIELD SETS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacMatch {
    pub src_mac_addr: Option<FieldValue>,
    pub src_mac_mask: Option<FieldValue>,
    pub dst_mac_addr: Option<FieldValue>,
    pub dst_mac_mask: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacRule {
    pub mac: MacMatch,
    pub protocol_id: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VlanRule {
    pub mac: MacMatch,
    pub vlan_id: Option<FieldValue>,
    pub encap_protocol: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StpMatch {
    pub src_mac_addr: Option<FieldValue>,
    pub src_mac_mask: Option<FieldValue>,
    pub stp_type: Option<FieldValue>,
    pub flags: Option<FieldValue>,
    pub root_priority: Option<FieldValue>,
    pub root_priority_hi: Option<FieldValue>,
    pub root_address: Option<FieldValue>,
    pub root_address_mask: Option<FieldValue>,
    pub root_cost: Option<FieldValue>,
    pub root_cost_hi: Option<FieldValue>,
    pub sender_priority: Option<FieldValue>,
    pub sender_priority_hi: Option<FieldValue>,
    pub sender_address: Option<FieldValue>,
    pub sender_address_mask: Option<FieldValue>,
    pub port: Option<FieldValue>,
    pub port_hi: Option<FieldValue>,
    pub age: Option<FieldValue>,
    pub age_hi: Option<FieldValue>,
    pub max_age: Option<FieldValue>,
    pub max_age_hi: Option<FieldValue>,
    pub hello_time: Option<FieldValue>,
    pub hello_time_hi: Option<FieldValue>,
    pub forward_delay: Option<FieldValue>,
    pub forward_delay_hi: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArpMatch {
    pub mac: MacMatch,
    pub hw_type: Option<FieldValue>,
    pub protocol_type: Option<FieldValue>,
    pub opcode: Option<FieldValue>,
    pub arp_src_mac_addr: Option<FieldValue>,
    pub arp_dst_mac_addr: Option<FieldValue>,
    pub arp_src_ip_addr: Option<FieldValue>,
    pub arp_src_ip_mask: Option<FieldValue>,
    pub arp_dst_ip_addr: Option<FieldValue>,
    pub arp_dst_ip_mask: Option<FieldValue>,
    pub gratuitous: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortRange {
    pub src_port_start: Option<FieldValue>,
    pub src_port_end: Option<FieldValue>,
    pub dst_port_start: Option<FieldValue>,
    pub dst_port_end: Option<FieldValue>,
}

/// Address fields of the layer-3 `ip` and `ipv6` protocols.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct L3Match {
    pub src_ip_addr: Option<FieldValue>,
    pub src_ip_mask: Option<FieldValue>,
    pub dst_ip_addr: Option<FieldValue>,
    pub dst_ip_mask: Option<FieldValue>,
    pub protocol: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IpHeader {
    pub mac: MacMatch,
    pub l3: L3Match,
    pub ports: PortRange,
    pub dscp: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ipv6Header {
    pub mac: MacMatch,
    pub l3: L3Match,
    pub ports: PortRange,
    pub icmp_type: Option<FieldValue>,
    pub icmp_type_end: Option<FieldValue>,
    pub icmp_code: Option<FieldValue>,
    pub icmp_code_end: Option<FieldValue>,
}

/// Fields common to the layer-4 protocols.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IpMatch {
    pub src_mac_addr: Option<FieldValue>,
    pub src_ip_addr: Option<FieldValue>,
    pub src_ip_mask: Option<FieldValue>,
    pub dst_ip_addr: Option<FieldValue>,
    pub dst_ip_mask: Option<FieldValue>,
    pub src_ip_from: Option<FieldValue>,
    pub src_ip_to: Option<FieldValue>,
    pub dst_ip_from: Option<FieldValue>,
    pub dst_ip_to: Option<FieldValue>,
    pub dscp: Option<FieldValue>,
    pub conn_limit_above: Option<FieldValue>,
    pub state: Option<FieldValue>,
    pub ipset: Option<FieldValue>,
    pub ipset_flags: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortedMatch {
    pub ip: IpMatch,
    pub ports: PortRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TcpMatch {
    pub ip: IpMatch,
    pub ports: PortRange,
    pub option: Option<FieldValue>,
    pub flags: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IcmpMatch {
    pub ip: IpMatch,
    pub icmp_type: Option<FieldValue>,
    pub icmp_code: Option<FieldValue>,
}
