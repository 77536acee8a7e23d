//! Remaining domain devices: controllers, filesystems, smartcards, input,
//! TPM, RNG, memory devices and the small single-purpose devices.

use crate::model::chardev::{ChardevProtocol, ChardevSource};
use crate::model::common::{Alias, DeviceAcpi, DeviceAddress, DeviceBoot, ScaledValue};

/// virtio transport options shared by several device drivers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtioDriver {
    pub iommu: Option<String>,
    pub ats: Option<String>,
    pub packed: Option<String>,
    pub page_per_vq: Option<String>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerDriver {
    pub queues: Option<u32>,
    pub cmd_per_lun: Option<u32>,
    pub max_sectors: Option<u32>,
    pub ioeventfd: Option<String>,
    pub iothread: Option<u32>,
    pub virtio: VirtioDriver,
}

/// Topology of a PCI controller. All numbers are decimal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerPciTarget {
    pub chassis_nr: Option<u32>,
    pub chassis: Option<u32>,
    pub port: Option<u32>,
    pub bus_nr: Option<u32>,
    pub index: Option<u32>,
    pub mem_reserve: Option<u64>,
    pub hotplug: Option<String>,
    pub numa_node: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerPci {
    pub model_name: Option<String>,
    pub target: Option<ControllerPciTarget>,
    pub hole64: Option<ScaledValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerUsb {
    pub ports: Option<u32>,
    pub master_startport: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerVirtioSerial {
    pub ports: Option<u32>,
    pub vectors: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerXenbus {
    pub max_grant_frames: Option<u32>,
    pub max_event_channels: Option<u32>,
}

/// A controller, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerKind {
    Ide,
    Fdc,
    Scsi,
    Sata,
    Ccid,
    Isa,
    Nvme { serial: Option<String> },
    Pci(ControllerPci),
    Usb(ControllerUsb),
    VirtioSerial(ControllerVirtioSerial),
    Xenbus(ControllerXenbus),
}

impl ControllerKind {
    pub fn discriminant(&self) -> &'static str {
        match self {
            ControllerKind::Ide => "ide",
            ControllerKind::Fdc => "fdc",
            ControllerKind::Scsi => "scsi",
            ControllerKind::Sata => "sata",
            ControllerKind::Ccid => "ccid",
            ControllerKind::Isa => "isa",
            ControllerKind::Nvme { .. } => "nvme",
            ControllerKind::Pci(_) => "pci",
            ControllerKind::Usb(_) => "usb",
            ControllerKind::VirtioSerial(_) => "virtio-serial",
            ControllerKind::Xenbus(_) => "xenbus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    pub kind: ControllerKind,
    pub index: Option<u32>,
    pub model: Option<String>,
    pub driver: Option<ControllerDriver>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

impl Controller {
    pub fn new(kind: ControllerKind, index: u32) -> Self {
        Self {
            kind,
            index: Some(index),
            model: None,
            driver: None,
            acpi: None,
            alias: None,
            address: None,
        }
    }
}

// =============================================================================
// LEASE AND FILESYSTEM
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaseTarget {
    pub path: String,
    pub offset: Option<u64>,
}

/// A lock manager lease.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lease {
    pub lockspace: String,
    pub key: String,
    pub target: Option<LeaseTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilesystemDriver {
    pub driver_type: Option<String>,
    pub format: Option<String>,
    pub name: Option<String>,
    pub wrpolicy: Option<String>,
    pub queue: Option<u32>,
    pub virtio: VirtioDriver,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilesystemBinaryLock {
    pub posix: Option<String>,
    pub flock: Option<String>,
}

/// virtiofsd settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilesystemBinary {
    pub path: Option<String>,
    pub xattr: Option<String>,
    pub cache_mode: Option<String>,
    pub sandbox_mode: Option<String>,
    pub lock: Option<FilesystemBinaryLock>,
    pub thread_pool_size: Option<u32>,
    pub openfiles_max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdMapEntry {
    pub start: u32,
    pub target: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdMap {
    pub uids: Vec<IdMapEntry>,
    pub gids: Vec<IdMapEntry>,
}

/// Host side of a filesystem, selected by the filesystem `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesystemSource {
    Mount { dir: Option<String>, socket: Option<String> },
    Block { dev: String },
    File { file: String },
    Template { name: String },
    Ram { usage: u64, units: Option<String> },
    Bind { dir: String },
    Volume { pool: String, volume: String },
}

impl Default for FilesystemSource {
    fn default() -> Self {
        FilesystemSource::Mount { dir: None, socket: None }
    }
}

impl FilesystemSource {
    pub fn discriminant(&self) -> &'static str {
        match self {
            FilesystemSource::Mount { .. } => "mount",
            FilesystemSource::Block { .. } => "block",
            FilesystemSource::File { .. } => "file",
            FilesystemSource::Template { .. } => "template",
            FilesystemSource::Ram { .. } => "ram",
            FilesystemSource::Bind { .. } => "bind",
            FilesystemSource::Volume { .. } => "volume",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filesystem {
    pub accessmode: Option<String>,
    pub model: Option<String>,
    pub multidevs: Option<String>,
    pub fmode: Option<String>,
    pub dmode: Option<String>,
    pub driver: Option<FilesystemDriver>,
    pub binary: Option<FilesystemBinary>,
    pub idmap: Option<IdMap>,
    pub source: FilesystemSource,
    pub target_dir: Option<String>,
    pub readonly: bool,
    pub space_hard_limit: Option<ScaledValue>,
    pub space_soft_limit: Option<ScaledValue>,
    pub boot: Option<DeviceBoot>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

// =============================================================================
// SMARTCARD AND INPUT
// =============================================================================

/// A smartcard, selected by `mode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmartcardMode {
    Host,
    HostCertificates {
        certificates: Vec<String>,
        database: Option<String>,
    },
    /// Forwarded over a character device named by the smartcard's own
    /// `type`, defaulting to pty.
    Passthrough {
        source: ChardevSource,
        protocol: Option<ChardevProtocol>,
    },
}

impl SmartcardMode {
    pub fn discriminant(&self) -> &'static str {
        match self {
            SmartcardMode::Host => "host",
            SmartcardMode::HostCertificates { .. } => "host-certificates",
            SmartcardMode::Passthrough { .. } => "passthrough",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smartcard {
    pub mode: SmartcardMode,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// Host side of a passthrough or evdev input device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputSource {
    pub evdev: Option<String>,
    pub dev: Option<String>,
    pub grab: Option<String>,
    pub grab_toggle: Option<String>,
    pub repeat: Option<String>,
}

/// An input device, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Tablet,
    Mouse,
    Keyboard,
    Passthrough,
    Evdev,
}

impl InputKind {
    pub fn discriminant(&self) -> &'static str {
        match self {
            InputKind::Tablet => "tablet",
            InputKind::Mouse => "mouse",
            InputKind::Keyboard => "keyboard",
            InputKind::Passthrough => "passthrough",
            InputKind::Evdev => "evdev",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub kind: InputKind,
    pub bus: Option<String>,
    pub model: Option<String>,
    pub driver: Option<VirtioDriver>,
    pub source: Option<InputSource>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

// =============================================================================
// TPM
// =============================================================================

/// Persistent state location of an emulated TPM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TpmStateSource {
    File { path: Option<String> },
    Dir { path: Option<String> },
}

impl TpmStateSource {
    pub fn discriminant(&self) -> &'static str {
        match self {
            TpmStateSource::File { .. } => "file",
            TpmStateSource::Dir { .. } => "dir",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TpmPcrBanks {
    pub sha1: bool,
    pub sha256: bool,
    pub sha384: bool,
    pub sha512: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TpmProfile {
    pub source: Option<String>,
    pub remove_disabled: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TpmEmulator {
    pub version: Option<String>,
    pub encryption_secret: Option<String>,
    pub persistent_state: Option<String>,
    pub debug: Option<u32>,
    pub active_pcr_banks: Option<TpmPcrBanks>,
    pub source: Option<TpmStateSource>,
    pub profile: Option<TpmProfile>,
}

/// A TPM backend, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TpmBackend {
    Passthrough { device_path: Option<String> },
    Emulator(TpmEmulator),
    /// External swtpm reached over a source that carries its own `type`,
    /// defaulting to unix.
    External { source: Option<ChardevSource> },
}

impl TpmBackend {
    pub fn discriminant(&self) -> &'static str {
        match self {
            TpmBackend::Passthrough { .. } => "passthrough",
            TpmBackend::Emulator(_) => "emulator",
            TpmBackend::External { .. } => "external",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tpm {
    pub model: Option<String>,
    pub backend: Option<TpmBackend>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

// =============================================================================
// RNG AND CRYPTO
// =============================================================================

/// An RNG backend, selected by `model`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RngBackend {
    /// Host device path, e.g. `/dev/urandom`.
    Random { device: Option<String> },
    Egd {
        source: ChardevSource,
        protocol: Option<ChardevProtocol>,
    },
    Builtin,
}

impl RngBackend {
    pub fn discriminant(&self) -> &'static str {
        match self {
            RngBackend::Random { .. } => "random",
            RngBackend::Egd { .. } => "egd",
            RngBackend::Builtin => "builtin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RngRate {
    pub bytes: u32,
    pub period: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    pub model: String,
    pub driver: Option<VirtioDriver>,
    pub rate: Option<RngRate>,
    pub backend: Option<RngBackend>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoBackendModel {
    Builtin,
    Lkcf,
}

impl CryptoBackendModel {
    pub fn discriminant(&self) -> &'static str {
        match self {
            CryptoBackendModel::Builtin => "builtin",
            CryptoBackendModel::Lkcf => "lkcf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoBackend {
    pub model: CryptoBackendModel,
    pub queues: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Crypto {
    pub model: Option<String>,
    pub crypto_type: Option<String>,
    pub backend: Option<CryptoBackend>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

// =============================================================================
// MEMORY DEVICES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemorydevSource {
    pub nodemask: Option<String>,
    pub pagesize: Option<ScaledValue>,
    pub path: Option<String>,
    pub alignsize: Option<ScaledValue>,
    pub pmem: bool,
}

/// Guest side of a memory device. `address_base` is written as `0x%08x`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemorydevTarget {
    pub dynamic_memslots: Option<String>,
    pub size: Option<ScaledValue>,
    pub node: Option<u32>,
    pub label_size: Option<ScaledValue>,
    pub block: Option<ScaledValue>,
    pub requested: Option<ScaledValue>,
    pub readonly: bool,
    pub address_base: Option<u64>,
}

/// A hot-pluggable memory module (`<memory model=…>` under devices).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Memorydev {
    pub model: String,
    pub access: Option<String>,
    pub discard: Option<String>,
    pub uuid: Option<String>,
    pub source: Option<MemorydevSource>,
    pub target: Option<MemorydevTarget>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

// =============================================================================
// SIMPLE DEVICES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Watchdog {
    pub model: String,
    pub action: Option<String>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemBalloon {
    pub model: String,
    pub autodeflate: Option<String>,
    pub free_page_reporting: Option<String>,
    pub driver: Option<VirtioDriver>,
    pub stats_period: Option<u32>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Panic {
    pub model: Option<String>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// The guest-visible NVRAM device of pSeries guests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NvramDevice {
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

/// Persistent storage for guest kernel logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pstore {
    pub backend: String,
    pub path: String,
    pub size: ScaledValue,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VsockCid {
    pub auto: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vsock {
    pub model: Option<String>,
    pub cid: Option<VsockCid>,
    pub driver: Option<VirtioDriver>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hub {
    pub hub_type: String,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IommuDriver {
    pub intremap: Option<String>,
    pub caching_mode: Option<String>,
    pub eim: Option<String>,
    pub iotlb: Option<String>,
    pub aw_bits: Option<u32>,
    pub dma_translation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Iommu {
    pub model: String,
    pub driver: Option<IommuDriver>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShmemMsi {
    pub enabled: Option<String>,
    pub vectors: Option<u32>,
    pub ioeventfd: Option<String>,
}

/// Inter-VM shared memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shmem {
    pub name: String,
    pub role: Option<String>,
    pub size: Option<ScaledValue>,
    pub model_type: Option<String>,
    pub server_path: Option<String>,
    pub msi: Option<ShmemMsi>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}
