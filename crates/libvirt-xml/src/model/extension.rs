//! Hypervisor and driver extension blocks.
//!
//! Each block lives in its own XML namespace and is held as an optional field
//! on the document it extends.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvVar {
    pub name: String,
    pub value: Option<String>,
}

/// Extra arguments and environment passed to QEMU (`qemu:commandline`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QemuCommandline {
    pub args: Vec<String>,
    pub envs: Vec<EnvVar>,
}

/// QEMU capabilities forced on or off (`qemu:capabilities`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QemuCapabilities {
    pub add: Vec<String>,
    pub del: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QemuOverrideProperty {
    pub name: String,
    pub property_type: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QemuOverrideDevice {
    pub alias: String,
    pub properties: Vec<QemuOverrideProperty>,
}

/// Per-device frontend property overrides (`qemu:override`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QemuOverride {
    pub devices: Vec<QemuOverrideDevice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QemuDeprecation {
    pub behavior: Option<String>,
}

/// A host namespace shared with an LXC container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LxcNamespaceMap {
    pub map_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LxcNamespace {
    pub share_net: Option<LxcNamespaceMap>,
    pub share_ipc: Option<LxcNamespaceMap>,
    pub share_uts: Option<LxcNamespaceMap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BhyveCommandline {
    pub args: Vec<String>,
    pub envs: Vec<EnvVar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XenCommandline {
    pub args: Vec<String>,
}

/// vSphere datacenter path of an ESX guest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VmwareDataCenterPath {
    pub value: String,
}

/// Raw dnsmasq configuration lines (`dnsmasq:options`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsmasqOptions {
    pub options: Vec<String>,
}

/// Extra mount options for filesystem pools (`fs:mount_opts`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FsMountOptions {
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RbdOption {
    pub name: String,
    pub value: String,
}

/// Ceph configuration overrides for RBD pools (`rbd:config_opts`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RbdConfigOptions {
    pub options: Vec<RbdOption>,
}
