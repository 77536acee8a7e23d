//! Hypervisor capabilities for one emulator/machine/arch (`<domainCapabilities>`).
//!
//! Most of the report is `supported` flags over lists of allowed values,
//! modelled once as [`SupportedBlock`].

use crate::model::common::ScaledValue;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainCapabilities {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub machine: Option<String>,
    pub arch: Option<String>,
    /// `<vcpu max=…/>`
    pub vcpu_max: Option<u32>,
    /// `<iothreads supported=…/>`
    pub iothreads: Option<String>,
    pub os: Option<OsCaps>,
    /// Modes under `<cpu>`; an empty list omits the element.
    pub cpu_modes: Vec<CpuModeCaps>,
    pub memory_backing: Option<SupportedBlock>,
    pub devices: Option<DeviceCaps>,
    pub features: Option<FeatureCaps>,
}

/// `<enum name=…><value>…</value>…</enum>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapsEnum {
    pub name: String,
    pub values: Vec<String>,
}

impl CapsEnum {
    pub fn new(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            values: values.iter().map(|value| value.to_string()).collect(),
        }
    }
}

/// An element with a `supported` flag and its enums.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupportedBlock {
    pub supported: Option<String>,
    pub enums: Vec<CapsEnum>,
}

impl SupportedBlock {
    pub fn supported(flag: bool) -> Self {
        Self {
            supported: Some(if flag { "yes" } else { "no" }.to_string()),
            enums: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoaderCaps {
    pub supported: Option<String>,
    /// Known firmware image paths.
    pub values: Vec<String>,
    pub enums: Vec<CapsEnum>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OsCaps {
    pub supported: Option<String>,
    pub enums: Vec<CapsEnum>,
    pub loader: Option<LoaderCaps>,
}

// =============================================================================
// CPU
// =============================================================================

/// A CPU mode, selected by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuModeCaps {
    HostPassthrough(SupportedBlock),
    Maximum(SupportedBlock),
    HostModel(HostModelCaps),
    Custom(CustomModeCaps),
}

impl CpuModeCaps {
    pub fn discriminant(&self) -> &'static str {
        match self {
            CpuModeCaps::HostPassthrough(_) => "host-passthrough",
            CpuModeCaps::Maximum(_) => "maximum",
            CpuModeCaps::HostModel(_) => "host-model",
            CpuModeCaps::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostCpuModel {
    pub fallback: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaxPhysAddr {
    pub mode: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostCpuFeature {
    pub policy: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostModelCaps {
    pub supported: Option<String>,
    pub model: Option<HostCpuModel>,
    pub vendor: Option<String>,
    pub max_phys_addr: Option<MaxPhysAddr>,
    pub features: Vec<HostCpuFeature>,
}

/// A named CPU model and whether the host can run it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomCpuModel {
    pub usable: Option<String>,
    pub vendor: Option<String>,
    pub deprecated: Option<String>,
    pub canonical: Option<String>,
    pub name: String,
}

/// Features that keep `model` from being usable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuBlockers {
    pub model: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomModeCaps {
    pub supported: Option<String>,
    pub models: Vec<CustomCpuModel>,
    pub blockers: Vec<CpuBlockers>,
}

// =============================================================================
// DEVICES AND FEATURES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceCaps {
    pub disk: Option<SupportedBlock>,
    pub graphics: Option<SupportedBlock>,
    pub video: Option<SupportedBlock>,
    pub hostdev: Option<SupportedBlock>,
    pub rng: Option<SupportedBlock>,
    pub filesystem: Option<SupportedBlock>,
    pub tpm: Option<SupportedBlock>,
    pub redirdev: Option<SupportedBlock>,
    pub channel: Option<SupportedBlock>,
    pub crypto: Option<SupportedBlock>,
    pub interface: Option<SupportedBlock>,
    pub panic: Option<SupportedBlock>,
    pub console: Option<SupportedBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SevCaps {
    pub supported: Option<String>,
    pub cbitpos: Option<u32>,
    pub reduced_phys_bits: Option<u32>,
    pub max_guests: Option<u32>,
    pub max_es_guests: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SgxCaps {
    pub supported: Option<String>,
    pub flc: Option<String>,
    pub sgx1: Option<String>,
    pub sgx2: Option<String>,
    pub section_size: Option<ScaledValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureCaps {
    pub gic: Option<SupportedBlock>,
    pub vmcoreinfo: Option<SupportedBlock>,
    pub genid: Option<SupportedBlock>,
    pub backing_store_input: Option<SupportedBlock>,
    pub backup: Option<SupportedBlock>,
    pub async_teardown: Option<SupportedBlock>,
    pub s390_pv: Option<SupportedBlock>,
    pub ps2: Option<SupportedBlock>,
    pub sev: Option<SevCaps>,
    pub sgx: Option<SgxCaps>,
    pub hyperv: Option<SupportedBlock>,
}
