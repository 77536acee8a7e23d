//! The domain document: a virtual machine definition.

use crate::codec::tree::Element;
use crate::model::chardev::{Channel, Console, Parallel, RedirDev, RedirFilter, Serial};
use crate::model::common::ScaledValue;
use crate::model::devices::{
    Controller, Crypto, Filesystem, Hub, IdMap, Input, Iommu, Lease, MemBalloon, Memorydev, NvramDevice, Panic,
    Pstore, Rng, Shmem, Smartcard, Tpm, Vsock, Watchdog,
};
use crate::model::disk::Disk;
use crate::model::extension::{
    BhyveCommandline, LxcNamespace, QemuCapabilities, QemuCommandline, QemuDeprecation, QemuOverride,
    VmwareDataCenterPath, XenCommandline,
};
use crate::model::graphics::{Audio, Graphics, Sound, Video};
use crate::model::hostdev::Hostdev;
use crate::model::interface::Interface;

/// A domain definition.
///
/// `hypervisor` is the `type` attribute (`kvm`, `qemu`, `xen`, `lxc`, ...)
/// and must be non-empty to encode. Extension blocks are written after the
/// core elements in field order, followed by `foreign`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Domain {
    pub hypervisor: String,
    pub id: Option<i32>,
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub genid: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
    pub max_memory: Option<MaxMemory>,
    pub memory: Option<Memory>,
    pub current_memory: Option<ScaledValue>,
    pub blkiotune: Option<BlkioTune>,
    pub memtune: Option<MemTune>,
    pub memory_backing: Option<MemoryBacking>,
    pub vcpu: Option<Vcpu>,
    pub vcpus: Vec<VcpuState>,
    pub iothreads: Option<u32>,
    pub iothread_ids: Vec<IoThreadId>,
    pub default_iothread: Option<DefaultIoThread>,
    pub cputune: Option<CpuTune>,
    pub numatune: Option<NumaTune>,
    pub resource: Option<Resource>,
    pub sysinfo: Vec<SysInfo>,
    pub bootloader: Option<String>,
    pub bootloader_args: Option<String>,
    pub os: Option<DomainOs>,
    pub idmap: Option<IdMap>,
    pub features: Option<Features>,
    pub cpu: Option<Cpu>,
    pub clock: Option<Clock>,
    pub on_poweroff: Option<String>,
    pub on_reboot: Option<String>,
    pub on_crash: Option<String>,
    pub pm: Option<PowerManagement>,
    pub perf_events: Vec<PerfEvent>,
    pub devices: Option<DomainDevices>,
    pub seclabels: Vec<SecLabel>,
    pub keywrap: Vec<KeyWrapCipher>,
    pub launch_security: Option<LaunchSecurity>,

    pub qemu_commandline: Option<QemuCommandline>,
    pub qemu_capabilities: Option<QemuCapabilities>,
    pub qemu_override: Option<QemuOverride>,
    pub qemu_deprecation: Option<QemuDeprecation>,
    pub lxc_namespace: Option<LxcNamespace>,
    pub bhyve_commandline: Option<BhyveCommandline>,
    pub vmware_datacenter_path: Option<VmwareDataCenterPath>,
    pub xen_commandline: Option<XenCommandline>,
    /// Elements in unregistered namespaces, kept verbatim.
    pub foreign: Vec<Element>,
}

impl Domain {
    /// Creates a named domain for the given hypervisor.
    pub fn new(hypervisor: &str, name: &str) -> Self {
        Self {
            hypervisor: hypervisor.to_string(),
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

/// Application metadata, kept as opaque element trees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub elements: Vec<Element>,
}

// =============================================================================
// RESOURCES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Memory {
    pub value: u64,
    pub unit: Option<String>,
    pub dump_core: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaxMemory {
    pub value: u64,
    pub unit: Option<String>,
    pub slots: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vcpu {
    pub placement: Option<String>,
    pub cpuset: Option<String>,
    pub current: Option<u32>,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IoThreadId {
    pub id: u32,
    pub thread_pool_min: Option<u32>,
    pub thread_pool_max: Option<u32>,
}

/// Per-vCPU state inside `<vcpus>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VcpuState {
    pub id: Option<u32>,
    pub enabled: Option<String>,
    pub hotpluggable: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefaultIoThread {
    pub thread_pool_min: Option<u32>,
    pub thread_pool_max: Option<u32>,
}

// =============================================================================
// TUNING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlkioDevice {
    pub path: String,
    pub weight: Option<u32>,
    pub read_iops_sec: Option<u64>,
    pub write_iops_sec: Option<u64>,
    pub read_bytes_sec: Option<u64>,
    pub write_bytes_sec: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlkioTune {
    pub weight: Option<u32>,
    pub devices: Vec<BlkioDevice>,
}

/// Memory limits from `<memtune>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemTune {
    pub hard_limit: Option<ScaledValue>,
    pub soft_limit: Option<ScaledValue>,
    pub min_guarantee: Option<ScaledValue>,
    pub swap_hard_limit: Option<ScaledValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hugepage {
    pub size: u64,
    pub unit: Option<String>,
    pub nodeset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryAllocation {
    pub mode: Option<String>,
    pub threads: Option<u32>,
}

/// Guest memory backing from `<memoryBacking>`.
///
/// `hugepages` is `Some` for a present `<hugepages>` element even when it
/// lists no pages; an empty list asks for the default huge page size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryBacking {
    pub hugepages: Option<Vec<Hugepage>>,
    pub nosharepages: bool,
    pub locked: bool,
    pub source_type: Option<String>,
    pub access_mode: Option<String>,
    pub allocation: Option<MemoryAllocation>,
    pub discard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VcpuPin {
    pub vcpu: u32,
    pub cpuset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IoThreadPin {
    pub iothread: u32,
    pub cpuset: String,
}

/// A scheduler assignment. `threads` is the `vcpus` attribute of
/// `<vcpusched>` or the `iothreads` attribute of `<iothreadsched>`, and is
/// unused for `<emulatorsched>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreadSched {
    pub threads: Option<String>,
    pub scheduler: Option<String>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheAllocation {
    pub id: u32,
    pub level: u32,
    pub cache_type: String,
    pub size: u64,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TuneMonitor {
    pub level: Option<u32>,
    pub vcpus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheTune {
    pub vcpus: Option<String>,
    pub id: Option<String>,
    pub caches: Vec<CacheAllocation>,
    pub monitors: Vec<TuneMonitor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BandwidthNode {
    pub id: u32,
    pub bandwidth: u32,
}

/// Memory bandwidth allocation from a `<cputune><memorytune>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryBandwidthTune {
    pub vcpus: String,
    pub nodes: Vec<BandwidthNode>,
    pub monitors: Vec<TuneMonitor>,
}

/// CPU scheduling parameters from `<cputune>`. Periods are microseconds;
/// quotas may be negative to mean unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuTune {
    pub shares: Option<u64>,
    pub period: Option<u64>,
    pub quota: Option<i64>,
    pub global_period: Option<u64>,
    pub global_quota: Option<i64>,
    pub emulator_period: Option<u64>,
    pub emulator_quota: Option<i64>,
    pub iothread_period: Option<u64>,
    pub iothread_quota: Option<i64>,
    pub vcpupins: Vec<VcpuPin>,
    pub emulatorpin: Option<String>,
    pub iothreadpins: Vec<IoThreadPin>,
    pub vcpuscheds: Vec<ThreadSched>,
    pub emulatorsched: Option<ThreadSched>,
    pub iothreadscheds: Vec<ThreadSched>,
    pub cachetunes: Vec<CacheTune>,
    pub memorytunes: Vec<MemoryBandwidthTune>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumaMemory {
    pub mode: Option<String>,
    pub nodeset: Option<String>,
    pub placement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumaMemNode {
    pub cellid: u32,
    pub mode: Option<String>,
    pub nodeset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumaTune {
    pub memory: Option<NumaMemory>,
    pub memnodes: Vec<NumaMemNode>,
}

/// Resource partitioning from `<resource>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resource {
    pub partition: Option<String>,
    pub fibrechannel_appid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerfEvent {
    pub name: String,
    pub enabled: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyWrapCipher {
    pub name: String,
    pub state: String,
}

// =============================================================================
// SYSINFO
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SysInfoEntry {
    pub name: String,
    pub file: Option<String>,
    pub value: String,
}

/// One SMBIOS table (`<bios>`, `<system>`, ...) as a list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SysInfoBlock {
    pub entries: Vec<SysInfoEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmbiosInfo {
    pub bios: Option<SysInfoBlock>,
    pub system: Option<SysInfoBlock>,
    pub base_boards: Vec<SysInfoBlock>,
    pub chassis: Option<SysInfoBlock>,
    pub processors: Vec<SysInfoBlock>,
    pub memories: Vec<SysInfoBlock>,
    pub oem_strings: Vec<String>,
}

/// Guest-visible system information, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SysInfo {
    Smbios(SmbiosInfo),
    FwCfg(Vec<SysInfoEntry>),
}

impl SysInfo {
    pub fn discriminant(&self) -> &'static str {
        match self {
            SysInfo::Smbios(_) => "smbios",
            SysInfo::FwCfg(_) => "fwcfg",
        }
    }
}

// =============================================================================
// OS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OsType {
    pub arch: Option<String>,
    pub machine: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirmwareFeature {
    pub enabled: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Loader {
    pub path: String,
    pub readonly: Option<String>,
    pub secure: Option<String>,
    pub stateless: Option<String>,
    pub loader_type: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Nvram {
    pub path: Option<String>,
    pub template: Option<String>,
    pub template_format: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootMenu {
    pub enable: Option<String>,
    pub timeout: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainOs {
    pub firmware: Option<String>,
    pub os_type: Option<OsType>,
    pub firmware_features: Vec<FirmwareFeature>,
    pub init: Option<String>,
    pub init_args: Vec<String>,
    pub loader: Option<Loader>,
    pub nvram: Option<Nvram>,
    pub kernel: Option<String>,
    pub initrd: Option<String>,
    pub cmdline: Option<String>,
    pub dtb: Option<String>,
    /// `<boot dev=…/>` entries in priority order.
    pub boot_devices: Vec<String>,
    pub boot_menu: Option<BootMenu>,
    pub smbios_mode: Option<String>,
}

// =============================================================================
// FEATURES
// =============================================================================

/// A feature toggle written as `<name state="on|off"/>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureState {
    pub state: Option<String>,
}

impl FeatureState {
    pub fn on() -> Self {
        Self {
            state: Some("on".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HyperVSpinlocks {
    pub state: Option<String>,
    pub retries: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HyperVStimer {
    pub state: Option<String>,
    pub direct: Option<FeatureState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HyperVVendorId {
    pub state: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HyperVFeatures {
    pub mode: Option<String>,
    pub relaxed: Option<FeatureState>,
    pub vapic: Option<FeatureState>,
    pub spinlocks: Option<HyperVSpinlocks>,
    pub vpindex: Option<FeatureState>,
    pub runtime: Option<FeatureState>,
    pub synic: Option<FeatureState>,
    pub stimer: Option<HyperVStimer>,
    pub reset: Option<FeatureState>,
    pub vendor_id: Option<HyperVVendorId>,
    pub frequencies: Option<FeatureState>,
    pub reenlightenment: Option<FeatureState>,
    pub tlbflush: Option<FeatureState>,
    pub ipi: Option<FeatureState>,
    pub evmcs: Option<FeatureState>,
    pub avic: Option<FeatureState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KvmDirtyRing {
    pub state: Option<String>,
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KvmFeatures {
    pub hidden: Option<FeatureState>,
    pub hint_dedicated: Option<FeatureState>,
    pub poll_control: Option<FeatureState>,
    pub pv_ipi: Option<FeatureState>,
    pub dirty_ring: Option<KvmDirtyRing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Smm {
    pub state: Option<String>,
    pub tseg: Option<ScaledValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureApic {
    pub eoi: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureGic {
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureIoApic {
    pub driver: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureAsyncTeardown {
    pub enabled: Option<String>,
}

/// Hypervisor features. Marker features are plain flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Features {
    pub pae: bool,
    pub acpi: bool,
    pub apic: Option<FeatureApic>,
    pub hap: Option<FeatureState>,
    pub hyperv: Option<HyperVFeatures>,
    pub kvm: Option<KvmFeatures>,
    pub pvspinlock: Option<FeatureState>,
    pub pmu: Option<FeatureState>,
    pub vmport: Option<FeatureState>,
    pub gic: Option<FeatureGic>,
    pub smm: Option<Smm>,
    pub ioapic: Option<FeatureIoApic>,
    pub async_teardown: Option<FeatureAsyncTeardown>,
}

// =============================================================================
// CPU AND CLOCK
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuModel {
    pub fallback: Option<String>,
    pub vendor_id: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuTopology {
    pub sockets: Option<u32>,
    pub dies: Option<u32>,
    pub clusters: Option<u32>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuCache {
    pub level: Option<u32>,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuFeature {
    pub policy: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cpu {
    pub cpu_match: Option<String>,
    pub mode: Option<String>,
    pub check: Option<String>,
    pub migratable: Option<String>,
    pub model: Option<CpuModel>,
    pub vendor: Option<String>,
    pub topology: Option<CpuTopology>,
    pub cache: Option<CpuCache>,
    pub features: Vec<CpuFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimerCatchup {
    pub threshold: Option<u32>,
    pub slew: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timer {
    pub name: String,
    pub track: Option<String>,
    pub tickpolicy: Option<String>,
    pub catchup: Option<TimerCatchup>,
    pub frequency: Option<u64>,
    pub mode: Option<String>,
    pub present: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clock {
    pub offset: Option<String>,
    pub basis: Option<String>,
    pub adjustment: Option<String>,
    pub timezone: Option<String>,
    pub start: Option<u64>,
    pub timers: Vec<Timer>,
}

// =============================================================================
// LIFECYCLE AND SECURITY
// =============================================================================

/// Guest power-management capabilities (`<pm>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PowerManagement {
    pub suspend_to_mem: Option<String>,
    pub suspend_to_disk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecLabel {
    pub label_type: Option<String>,
    pub model: Option<String>,
    pub relabel: Option<String>,
    pub label: Option<String>,
    pub image_label: Option<String>,
    pub base_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SevLaunch {
    pub kernel_hashes: Option<String>,
    pub cbitpos: Option<u32>,
    pub reduced_phys_bits: Option<u32>,
    /// Written as `0x%04x`.
    pub policy: Option<u32>,
    pub dh_cert: Option<String>,
    pub session: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SevSnpLaunch {
    pub kernel_hashes: Option<String>,
    pub author_key: Option<String>,
    pub vcek: Option<String>,
    pub cbitpos: Option<u32>,
    pub reduced_phys_bits: Option<u32>,
    /// Written as `0x%08x`.
    pub policy: Option<u64>,
    pub guest_visible_workarounds: Option<String>,
    pub id_block: Option<String>,
    pub id_auth: Option<String>,
    pub host_data: Option<String>,
}

/// Confidential computing setup, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchSecurity {
    Sev(SevLaunch),
    SevSnp(SevSnpLaunch),
    S390Pv,
}

impl LaunchSecurity {
    pub fn discriminant(&self) -> &'static str {
        match self {
            LaunchSecurity::Sev(_) => "sev",
            LaunchSecurity::SevSnp(_) => "sev-snp",
            LaunchSecurity::S390Pv => "s390-pv",
        }
    }
}

// =============================================================================
// DEVICES
// =============================================================================

/// The `<devices>` list. Each kind is written as a group, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainDevices {
    pub emulator: Option<String>,
    pub disks: Vec<Disk>,
    pub controllers: Vec<Controller>,
    pub leases: Vec<Lease>,
    pub filesystems: Vec<Filesystem>,
    pub interfaces: Vec<Interface>,
    pub smartcards: Vec<Smartcard>,
    pub serials: Vec<Serial>,
    pub parallels: Vec<Parallel>,
    pub consoles: Vec<Console>,
    pub channels: Vec<Channel>,
    pub inputs: Vec<Input>,
    pub tpms: Vec<Tpm>,
    pub graphics: Vec<Graphics>,
    pub sounds: Vec<Sound>,
    pub audios: Vec<Audio>,
    pub videos: Vec<Video>,
    pub hostdevs: Vec<Hostdev>,
    pub redirdevs: Vec<RedirDev>,
    pub redirfilters: Vec<RedirFilter>,
    pub hubs: Vec<Hub>,
    pub watchdogs: Vec<Watchdog>,
    pub memballoon: Option<MemBalloon>,
    pub rngs: Vec<Rng>,
    pub nvram: Option<NvramDevice>,
    pub panics: Vec<Panic>,
    pub shmems: Vec<Shmem>,
    pub memorydevs: Vec<Memorydev>,
    pub iommu: Option<Iommu>,
    pub vsock: Option<Vsock>,
    pub cryptos: Vec<Crypto>,
    pub pstore: Option<Pstore>,
}
