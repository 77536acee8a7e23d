//! Network plumbing records shared by domain interfaces, networks,
//! portgroups and network ports.

/// Virtual port profile (`<virtualport>`).
///
/// The `type` attribute selects the parameter set. A virtualport without a
/// `type` carries the union of all parameters and decodes as [`VirtualPort::Any`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualPort {
    Any(VirtualPortAny),
    Vepa8021Qbg(VirtualPortVepa),
    Vntag8021Qbh(VirtualPortVntag),
    OpenVSwitch(VirtualPortOpenVSwitch),
    MidoNet(VirtualPortMidoNet),
}

impl Default for VirtualPort {
    fn default() -> Self {
        VirtualPort::Any(VirtualPortAny::default())
    }
}

impl VirtualPort {
    /// Returns the `type` value, or `None` for the untyped form.
    pub fn discriminant(&self) -> Option<&'static str> {
        match self {
            VirtualPort::Any(_) => None,
            VirtualPort::Vepa8021Qbg(_) => Some("802.1Qbg"),
            VirtualPort::Vntag8021Qbh(_) => Some("802.1Qbh"),
            VirtualPort::OpenVSwitch(_) => Some("openvswitch"),
            VirtualPort::MidoNet(_) => Some("midonet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualPortAny {
    pub manager_id: Option<u32>,
    pub type_id: Option<u32>,
    pub type_id_version: Option<u32>,
    pub instance_id: Option<String>,
    pub profile_id: Option<String>,
    pub interface_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualPortVepa {
    pub manager_id: Option<u32>,
    pub type_id: Option<u32>,
    pub type_id_version: Option<u32>,
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualPortVntag {
    pub profile_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualPortOpenVSwitch {
    pub interface_id: Option<String>,
    pub profile_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualPortMidoNet {
    pub interface_id: Option<String>,
}

/// Rate limits for one direction, in kilobytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BandwidthParams {
    pub average: Option<u64>,
    pub peak: Option<u64>,
    pub burst: Option<u64>,
    pub floor: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bandwidth {
    pub class_id: Option<u32>,
    pub inbound: Option<BandwidthParams>,
    pub outbound: Option<BandwidthParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VlanTag {
    pub id: u32,
    pub native_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vlan {
    pub trunk: Option<String>,
    pub tags: Vec<VlanTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortOptions {
    pub isolated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterParam {
    pub name: String,
    pub value: String,
}

/// Reference to a network filter with its parameter bindings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterRef {
    pub filter: String,
    pub parameters: Vec<FilterParam>,
}

/// An IP address assigned to a guest or host interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IpAddress {
    pub address: String,
    pub family: Option<String>,
    pub prefix: Option<u32>,
    pub peer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub family: Option<String>,
    pub address: String,
    pub netmask: Option<String>,
    pub prefix: Option<u32>,
    pub gateway: String,
    pub metric: Option<u32>,
}

/// Failover teaming of a virtio interface with a hostdev.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Teaming {
    pub teaming_type: String,
    pub persistent: Option<String>,
}
