//! Codecs for controllers, filesystems, smartcards, input, TPM, RNG, memory
//! devices and the small single-purpose devices.

use crate::codec::chardev::{device_source, push_device_source};
use crate::codec::common::device_address;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::common::{Alias, DeviceAcpi, DeviceAddress};
use crate::model::devices::*;

/// Appends `acpi`, `alias` and `address`, the tail shared by every device here.
fn push_tail(
    el: &mut Element,
    acpi: Option<&DeviceAcpi>,
    alias: Option<&Alias>,
    address: Option<&DeviceAddress>,
) -> Result<(), EncodeError> {
    el.push_opt("acpi", acpi)?;
    el.push_opt("alias", alias)?;
    el.push_opt("address", address)
}

fn virtio_attrs(el: &Element) -> VirtioDriver {
    VirtioDriver {
        iommu: el.attr_string("iommu"),
        ats: el.attr_string("ats"),
        packed: el.attr_string("packed"),
        page_per_vq: el.attr_string("page_per_vq"),
    }
}

fn set_virtio_attrs(el: &mut Element, driver: &VirtioDriver) {
    el.set_opt_attr("iommu", driver.iommu.as_deref());
    el.set_opt_attr("ats", driver.ats.as_deref());
    el.set_opt_attr("packed", driver.packed.as_deref());
    el.set_opt_attr("page_per_vq", driver.page_per_vq.as_deref());
}

impl XmlDecode for VirtioDriver {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(virtio_attrs(el))
    }
}

impl XmlEncode for VirtioDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        set_virtio_attrs(&mut el, self);
        Ok(el)
    }
}

/// Reads `attr` from the single child `name`, keeping the child in the path.
fn child_uint<T: TryFrom<u64>>(
    el: &Element,
    name: &str,
    attr: &str,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<T>, DecodeError> {
    match el.child(name) {
        Some(child) => ctx.scoped(name, |ctx| ctx.uint_attr(child, attr, Radix::Decimal)),
        None => Ok(None),
    }
}

fn push_uint_attr_child(el: &mut Element, name: &str, attr: &str, value: Option<u32>) {
    if value.is_some() {
        let mut child = Element::new(name);
        child.set_uint(attr, value, UintFormat::Decimal);
        el.push(child);
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

impl XmlDecode for ControllerDriver {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ControllerDriver {
            queues: ctx.uint_attr(el, "queues", Radix::Decimal)?,
            cmd_per_lun: ctx.uint_attr(el, "cmd_per_lun", Radix::Decimal)?,
            max_sectors: ctx.uint_attr(el, "max_sectors", Radix::Decimal)?,
            ioeventfd: el.attr_string("ioeventfd"),
            iothread: ctx.uint_attr(el, "iothread", Radix::Decimal)?,
            virtio: virtio_attrs(el),
        })
    }
}

impl XmlEncode for ControllerDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("queues", self.queues, UintFormat::Decimal);
        el.set_uint("cmd_per_lun", self.cmd_per_lun, UintFormat::Decimal);
        el.set_uint("max_sectors", self.max_sectors, UintFormat::Decimal);
        el.set_opt_attr("ioeventfd", self.ioeventfd.as_deref());
        el.set_uint("iothread", self.iothread, UintFormat::Decimal);
        set_virtio_attrs(&mut el, &self.virtio);
        Ok(el)
    }
}

impl XmlDecode for ControllerPciTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ControllerPciTarget {
            chassis_nr: ctx.uint_attr(el, "chassisNr", Radix::Decimal)?,
            chassis: ctx.uint_attr(el, "chassis", Radix::Decimal)?,
            port: ctx.uint_attr(el, "port", Radix::Auto)?,
            bus_nr: ctx.uint_attr(el, "busNr", Radix::Decimal)?,
            index: ctx.uint_attr(el, "index", Radix::Decimal)?,
            mem_reserve: ctx.uint_attr(el, "memReserve", Radix::Decimal)?,
            hotplug: el.attr_string("hotplug"),
            numa_node: ctx.uint_text(el, "node", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for ControllerPciTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("chassisNr", self.chassis_nr, UintFormat::Decimal);
        el.set_uint("chassis", self.chassis, UintFormat::Decimal);
        el.set_uint("port", self.port, UintFormat::Decimal);
        el.set_uint("busNr", self.bus_nr, UintFormat::Decimal);
        el.set_uint("index", self.index, UintFormat::Decimal);
        el.set_uint("memReserve", self.mem_reserve, UintFormat::Decimal);
        el.set_opt_attr("hotplug", self.hotplug.as_deref());
        el.push_uint_child("node", self.numa_node, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for Controller {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = match variant::CONTROLLER.select(el, ctx)? {
            "ide" => ControllerKind::Ide,
            "fdc" => ControllerKind::Fdc,
            "scsi" => ControllerKind::Scsi,
            "sata" => ControllerKind::Sata,
            "ccid" => ControllerKind::Ccid,
            "isa" => ControllerKind::Isa,
            "nvme" => ControllerKind::Nvme {
                serial: el.child_text("serial"),
            },
            "pci" => ControllerKind::Pci(ControllerPci {
                model_name: el.child_attr("model", "name"),
                target: ctx.child(el, "target")?,
                hole64: ctx.child(el, "pcihole64")?,
            }),
            "usb" => ControllerKind::Usb(ControllerUsb {
                ports: ctx.uint_attr(el, "ports", Radix::Decimal)?,
                master_startport: child_uint(el, "master", "startport", ctx)?,
            }),
            "virtio-serial" => ControllerKind::VirtioSerial(ControllerVirtioSerial {
                ports: ctx.uint_attr(el, "ports", Radix::Decimal)?,
                vectors: ctx.uint_attr(el, "vectors", Radix::Decimal)?,
            }),
            "xenbus" => ControllerKind::Xenbus(ControllerXenbus {
                max_grant_frames: ctx.uint_attr(el, "maxGrantFrames", Radix::Decimal)?,
                max_event_channels: ctx.uint_attr(el, "maxEventChannels", Radix::Decimal)?,
            }),
            other => return Err(ctx.unknown_discriminant(&variant::CONTROLLER, other)),
        };
        Ok(Controller {
            kind,
            index: ctx.uint_attr(el, "index", Radix::Decimal)?,
            model: el.attr_string("model"),
            driver: ctx.child(el, "driver")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Controller {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.kind.discriminant());
        el.set_uint("index", self.index, UintFormat::Decimal);
        el.set_opt_attr("model", self.model.as_deref());
        match &self.kind {
            ControllerKind::Nvme { serial } => el.push_text_child("serial", serial.as_deref()),
            ControllerKind::Pci(pci) => {
                el.push_attr_child("model", "name", pci.model_name.as_deref());
                el.push_opt("target", pci.target.as_ref())?;
                el.push_opt("pcihole64", pci.hole64.as_ref())?;
            }
            ControllerKind::Usb(usb) => {
                el.set_uint("ports", usb.ports, UintFormat::Decimal);
                push_uint_attr_child(&mut el, "master", "startport", usb.master_startport);
            }
            ControllerKind::VirtioSerial(serial) => {
                el.set_uint("ports", serial.ports, UintFormat::Decimal);
                el.set_uint("vectors", serial.vectors, UintFormat::Decimal);
            }
            ControllerKind::Xenbus(xenbus) => {
                el.set_uint("maxGrantFrames", xenbus.max_grant_frames, UintFormat::Decimal);
                el.set_uint("maxEventChannels", xenbus.max_event_channels, UintFormat::Decimal);
            }
            _ => {}
        }
        el.push_opt("driver", self.driver.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// LEASE AND FILESYSTEM
// =============================================================================

impl XmlDecode for LeaseTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(LeaseTarget {
            path: ctx.required_attr(el, "path")?,
            offset: ctx.uint_attr(el, "offset", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for LeaseTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("path", &self.path);
        el.set_uint("offset", self.offset, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for Lease {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Lease {
            lockspace: el.child_text("lockspace").unwrap_or_default(),
            key: ctx.required_child(el, "key")?,
            target: ctx.child(el, "target")?,
        })
    }
}

impl XmlEncode for Lease {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("lockspace", Some(&self.lockspace));
        el.push_text_child("key", Some(&self.key));
        el.push_opt("target", self.target.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for FilesystemDriver {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FilesystemDriver {
            driver_type: el.attr_string("type"),
            format: el.attr_string("format"),
            name: el.attr_string("name"),
            wrpolicy: el.attr_string("wrpolicy"),
            queue: ctx.uint_attr(el, "queue", Radix::Decimal)?,
            virtio: virtio_attrs(el),
        })
    }
}

impl XmlEncode for FilesystemDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.driver_type.as_deref());
        el.set_opt_attr("format", self.format.as_deref());
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("wrpolicy", self.wrpolicy.as_deref());
        set_virtio_attrs(&mut el, &self.virtio);
        el.set_uint("queue", self.queue, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for FilesystemBinaryLock {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FilesystemBinaryLock {
            posix: el.attr_string("posix"),
            flock: el.attr_string("flock"),
        })
    }
}

impl XmlEncode for FilesystemBinaryLock {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("posix", self.posix.as_deref());
        el.set_opt_attr("flock", self.flock.as_deref());
        Ok(el)
    }
}

impl XmlDecode for FilesystemBinary {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FilesystemBinary {
            path: el.attr_string("path"),
            xattr: el.attr_string("xattr"),
            cache_mode: el.child_attr("cache", "mode"),
            sandbox_mode: el.child_attr("sandbox", "mode"),
            lock: ctx.child(el, "lock")?,
            thread_pool_size: child_uint(el, "thread_pool", "size", ctx)?,
            openfiles_max: child_uint(el, "openfiles", "max", ctx)?,
        })
    }
}

impl XmlEncode for FilesystemBinary {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("path", self.path.as_deref());
        el.set_opt_attr("xattr", self.xattr.as_deref());
        el.push_attr_child("cache", "mode", self.cache_mode.as_deref());
        el.push_attr_child("sandbox", "mode", self.sandbox_mode.as_deref());
        el.push_opt("lock", self.lock.as_ref())?;
        push_uint_attr_child(&mut el, "thread_pool", "size", self.thread_pool_size);
        push_uint_attr_child(&mut el, "openfiles", "max", self.openfiles_max);
        Ok(el)
    }
}

impl XmlDecode for IdMapEntry {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IdMapEntry {
            start: ctx.required_uint_attr(el, "start", Radix::Decimal)?,
            target: ctx.required_uint_attr(el, "target", Radix::Decimal)?,
            count: ctx.required_uint_attr(el, "count", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for IdMapEntry {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("start", Some(self.start), UintFormat::Decimal);
        el.set_uint("target", Some(self.target), UintFormat::Decimal);
        el.set_uint("count", Some(self.count), UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for IdMap {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IdMap {
            uids: ctx.children(el, "uid")?,
            gids: ctx.children(el, "gid")?,
        })
    }
}

impl XmlEncode for IdMap {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_all("uid", &self.uids)?;
        el.push_all("gid", &self.gids)?;
        Ok(el)
    }
}

fn filesystem_source(kind: &str, el: &Element, ctx: &mut DecodeContext<'_>) -> Result<FilesystemSource, DecodeError> {
    let src = el.child("source");
    let attr = |name: &str| src.and_then(|src| src.attr_string(name));
    Ok(match kind {
        "mount" => FilesystemSource::Mount {
            dir: attr("dir"),
            socket: attr("socket"),
        },
        "block" => FilesystemSource::Block {
            dev: attr("dev").unwrap_or_default(),
        },
        "file" => FilesystemSource::File {
            file: attr("file").unwrap_or_default(),
        },
        "template" => FilesystemSource::Template {
            name: attr("name").unwrap_or_default(),
        },
        "ram" => FilesystemSource::Ram {
            usage: match src {
                Some(src) => ctx.scoped("source", |ctx| ctx.uint_attr(src, "usage", Radix::Decimal))?,
                None => None,
            }
            .unwrap_or_default(),
            units: attr("units"),
        },
        "bind" => FilesystemSource::Bind {
            dir: attr("dir").unwrap_or_default(),
        },
        "volume" => FilesystemSource::Volume {
            pool: attr("pool").unwrap_or_default(),
            volume: attr("volume").unwrap_or_default(),
        },
        other => return Err(ctx.unknown_discriminant(&variant::FILESYSTEM, other)),
    })
}

/// Builds `<source>`; a mount with neither dir nor socket has none.
fn filesystem_source_element(source: &FilesystemSource) -> Option<Element> {
    let mut el = Element::new("source");
    match source {
        FilesystemSource::Mount { dir, socket } => {
            el.set_opt_attr("dir", dir.as_deref());
            el.set_opt_attr("socket", socket.as_deref());
            if el.is_empty() {
                return None;
            }
        }
        FilesystemSource::Block { dev } => el.set_attr("dev", dev),
        FilesystemSource::File { file } => el.set_attr("file", file),
        FilesystemSource::Template { name } => el.set_attr("name", name),
        FilesystemSource::Ram { usage, units } => {
            el.set_uint("usage", Some(*usage), UintFormat::Decimal);
            el.set_opt_attr("units", units.as_deref());
        }
        FilesystemSource::Bind { dir } => el.set_attr("dir", dir),
        FilesystemSource::Volume { pool, volume } => {
            el.set_attr("pool", pool);
            el.set_attr("volume", volume);
        }
    }
    Some(el)
}

impl XmlDecode for Filesystem {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = variant::FILESYSTEM.select(el, ctx)?;
        Ok(Filesystem {
            accessmode: el.attr_string("accessmode"),
            model: el.attr_string("model"),
            multidevs: el.attr_string("multidevs"),
            fmode: el.attr_string("fmode"),
            dmode: el.attr_string("dmode"),
            driver: ctx.child(el, "driver")?,
            binary: ctx.child(el, "binary")?,
            idmap: ctx.child(el, "idmap")?,
            source: filesystem_source(kind, el, ctx)?,
            target_dir: el.child_attr("target", "dir"),
            readonly: el.has_child("readonly"),
            space_hard_limit: ctx.child(el, "space_hard_limit")?,
            space_soft_limit: ctx.child(el, "space_soft_limit")?,
            boot: ctx.child(el, "boot")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Filesystem {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.source.discriminant());
        el.set_opt_attr("accessmode", self.accessmode.as_deref());
        el.set_opt_attr("model", self.model.as_deref());
        el.set_opt_attr("multidevs", self.multidevs.as_deref());
        el.set_opt_attr("fmode", self.fmode.as_deref());
        el.set_opt_attr("dmode", self.dmode.as_deref());
        el.push_opt("driver", self.driver.as_ref())?;
        el.push_opt("binary", self.binary.as_ref())?;
        el.push_opt("idmap", self.idmap.as_ref())?;
        if let Some(source) = filesystem_source_element(&self.source) {
            el.push(source);
        }
        el.push_attr_child("target", "dir", self.target_dir.as_deref());
        el.push_flag("readonly", self.readonly);
        el.push_opt("space_hard_limit", self.space_hard_limit.as_ref())?;
        el.push_opt("space_soft_limit", self.space_soft_limit.as_ref())?;
        el.push_opt("boot", self.boot.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// SMARTCARD AND INPUT
// =============================================================================

impl XmlDecode for Smartcard {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let mode = match variant::SMARTCARD.select(el, ctx)? {
            "host" => SmartcardMode::Host,
            "host-certificates" => SmartcardMode::HostCertificates {
                certificates: ctx.children(el, "certificate")?,
                database: el.child_text("database"),
            },
            "passthrough" => SmartcardMode::Passthrough {
                source: device_source(el, ctx, &variant::CHARDEV_PTY)?,
                protocol: ctx.child(el, "protocol")?,
            },
            other => return Err(ctx.unknown_discriminant(&variant::SMARTCARD, other)),
        };
        Ok(Smartcard {
            mode,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Smartcard {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        match &self.mode {
            SmartcardMode::Host => {}
            SmartcardMode::HostCertificates { certificates, database } => {
                el.push_all("certificate", certificates)?;
                el.push_text_child("database", database.as_deref());
            }
            SmartcardMode::Passthrough { source, protocol } => {
                push_device_source(&mut el, source)?;
                el.push_opt("protocol", protocol.as_ref())?;
            }
        }
        el.set_discriminant("mode", self.mode.discriminant());
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for InputSource {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InputSource {
            evdev: el.attr_string("evdev"),
            dev: el.attr_string("dev"),
            grab: el.attr_string("grab"),
            grab_toggle: el.attr_string("grabToggle"),
            repeat: el.attr_string("repeat"),
        })
    }
}

impl XmlEncode for InputSource {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("evdev", self.evdev.as_deref());
        el.set_opt_attr("dev", self.dev.as_deref());
        el.set_opt_attr("grab", self.grab.as_deref());
        el.set_opt_attr("grabToggle", self.grab_toggle.as_deref());
        el.set_opt_attr("repeat", self.repeat.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Input {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = match variant::INPUT.select(el, ctx)? {
            "tablet" => InputKind::Tablet,
            "mouse" => InputKind::Mouse,
            "keyboard" => InputKind::Keyboard,
            "passthrough" => InputKind::Passthrough,
            "evdev" => InputKind::Evdev,
            other => return Err(ctx.unknown_discriminant(&variant::INPUT, other)),
        };
        Ok(Input {
            kind,
            bus: el.attr_string("bus"),
            model: el.attr_string("model"),
            driver: ctx.child(el, "driver")?,
            source: ctx.child(el, "source")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Input {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.kind.discriminant());
        el.set_opt_attr("bus", self.bus.as_deref());
        el.set_opt_attr("model", self.model.as_deref());
        el.push_opt("driver", self.driver.as_ref())?;
        el.push_opt("source", self.source.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// TPM
// =============================================================================

impl XmlDecode for TpmStateSource {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::TPM_SOURCE.select(el, ctx)? {
            "file" => TpmStateSource::File {
                path: el.attr_string("path"),
            },
            "dir" => TpmStateSource::Dir {
                path: el.attr_string("path"),
            },
            other => return Err(ctx.unknown_discriminant(&variant::TPM_SOURCE, other)),
        })
    }
}

impl XmlEncode for TpmStateSource {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            TpmStateSource::File { path } | TpmStateSource::Dir { path } => el.set_opt_attr("path", path.as_deref()),
        }
        Ok(el)
    }
}

impl XmlDecode for TpmPcrBanks {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(TpmPcrBanks {
            sha1: el.has_child("sha1"),
            sha256: el.has_child("sha256"),
            sha384: el.has_child("sha384"),
            sha512: el.has_child("sha512"),
        })
    }
}

impl XmlEncode for TpmPcrBanks {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_flag("sha1", self.sha1);
        el.push_flag("sha256", self.sha256);
        el.push_flag("sha384", self.sha384);
        el.push_flag("sha512", self.sha512);
        Ok(el)
    }
}

impl XmlDecode for TpmProfile {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(TpmProfile {
            source: el.attr_string("source"),
            remove_disabled: el.attr_string("removeDisabled"),
            name: el.attr_string("name"),
        })
    }
}

impl XmlEncode for TpmProfile {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("source", self.source.as_deref());
        el.set_opt_attr("removeDisabled", self.remove_disabled.as_deref());
        el.set_opt_attr("name", self.name.as_deref());
        Ok(el)
    }
}

impl XmlDecode for TpmBackend {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::TPM_BACKEND.select(el, ctx)? {
            "passthrough" => TpmBackend::Passthrough {
                device_path: el.child_attr("device", "path"),
            },
            "emulator" => TpmBackend::Emulator(TpmEmulator {
                version: el.attr_string("version"),
                encryption_secret: el.child_attr("encryption", "secret"),
                persistent_state: el.attr_string("persistent_state"),
                debug: ctx.uint_attr(el, "debug", Radix::Decimal)?,
                active_pcr_banks: ctx.child(el, "active_pcr_banks")?,
                source: ctx.child(el, "source")?,
                profile: ctx.child(el, "profile")?,
            }),
            "external" => TpmBackend::External {
                source: ctx.child(el, "source")?,
            },
            other => return Err(ctx.unknown_discriminant(&variant::TPM_BACKEND, other)),
        })
    }
}

impl XmlEncode for TpmBackend {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            TpmBackend::Passthrough { device_path } => el.push_attr_child("device", "path", device_path.as_deref()),
            TpmBackend::Emulator(emulator) => {
                el.set_opt_attr("version", emulator.version.as_deref());
                el.set_opt_attr("persistent_state", emulator.persistent_state.as_deref());
                el.set_uint("debug", emulator.debug, UintFormat::Decimal);
                el.push_attr_child("encryption", "secret", emulator.encryption_secret.as_deref());
                el.push_opt("active_pcr_banks", emulator.active_pcr_banks.as_ref())?;
                el.push_opt("source", emulator.source.as_ref())?;
                el.push_opt("profile", emulator.profile.as_ref())?;
            }
            TpmBackend::External { source } => el.push_opt("source", source.as_ref())?,
        }
        Ok(el)
    }
}

impl XmlDecode for Tpm {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Tpm {
            model: el.attr_string("model"),
            backend: ctx.child(el, "backend")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Tpm {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("model", self.model.as_deref());
        el.push_opt("backend", self.backend.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// RNG AND CRYPTO
// =============================================================================

impl XmlDecode for RngBackend {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::RNG_BACKEND.select(el, ctx)? {
            "random" => RngBackend::Random { device: el.text_opt() },
            "egd" => RngBackend::Egd {
                source: device_source(el, ctx, &variant::CHARDEV_PTY)?,
                protocol: ctx.child(el, "protocol")?,
            },
            "builtin" => RngBackend::Builtin,
            other => return Err(ctx.unknown_discriminant(&variant::RNG_BACKEND, other)),
        })
    }
}

impl XmlEncode for RngBackend {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        match self {
            RngBackend::Random { device } => {
                if let Some(device) = device {
                    el.push_text(device);
                }
            }
            RngBackend::Egd { source, protocol } => {
                push_device_source(&mut el, source)?;
                el.push_opt("protocol", protocol.as_ref())?;
            }
            RngBackend::Builtin => {}
        }
        el.set_discriminant("model", self.discriminant());
        Ok(el)
    }
}

impl XmlDecode for RngRate {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(RngRate {
            bytes: ctx.required_uint_attr(el, "bytes", Radix::Decimal)?,
            period: ctx.uint_attr(el, "period", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for RngRate {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("bytes", Some(self.bytes), UintFormat::Decimal);
        el.set_uint("period", self.period, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for Rng {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Rng {
            model: ctx.required_attr(el, "model")?,
            driver: ctx.child(el, "driver")?,
            rate: ctx.child(el, "rate")?,
            backend: ctx.child(el, "backend")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Rng {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", &self.model);
        el.push_opt("driver", self.driver.as_ref())?;
        el.push_opt("rate", self.rate.as_ref())?;
        el.push_opt("backend", self.backend.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for CryptoBackend {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let model = match variant::CRYPTO_BACKEND.select(el, ctx)? {
            "builtin" => CryptoBackendModel::Builtin,
            "lkcf" => CryptoBackendModel::Lkcf,
            other => return Err(ctx.unknown_discriminant(&variant::CRYPTO_BACKEND, other)),
        };
        Ok(CryptoBackend {
            model,
            queues: ctx.uint_attr(el, "queues", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for CryptoBackend {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", self.model.discriminant());
        el.set_uint("queues", self.queues, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for Crypto {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Crypto {
            model: el.attr_string("model"),
            crypto_type: el.attr_string("type"),
            backend: ctx.child(el, "backend")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Crypto {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("model", self.model.as_deref());
        el.set_opt_attr("type", self.crypto_type.as_deref());
        el.push_opt("backend", self.backend.as_ref())?;
        el.push_opt("alias", self.alias.as_ref())?;
        el.push_opt("address", self.address.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// MEMORY DEVICES
// =============================================================================

impl XmlDecode for MemorydevSource {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MemorydevSource {
            nodemask: el.child_text("nodemask"),
            pagesize: ctx.child(el, "pagesize")?,
            path: el.child_text("path"),
            alignsize: ctx.child(el, "alignsize")?,
            pmem: el.has_child("pmem"),
        })
    }
}

impl XmlEncode for MemorydevSource {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("nodemask", self.nodemask.as_deref());
        el.push_opt("pagesize", self.pagesize.as_ref())?;
        el.push_text_child("path", self.path.as_deref());
        el.push_opt("alignsize", self.alignsize.as_ref())?;
        el.push_flag("pmem", self.pmem);
        Ok(el)
    }
}

impl XmlDecode for MemorydevTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let label_size = match el.child("label") {
            Some(label) => ctx.scoped("label", |ctx| ctx.child(label, "size"))?,
            None => None,
        };
        let address_base = match el.child("address") {
            Some(address) => ctx.scoped("address", |ctx| ctx.uint_attr(address, "base", Radix::Auto))?,
            None => None,
        };
        Ok(MemorydevTarget {
            dynamic_memslots: el.attr_string("dynamicMemslots"),
            size: ctx.child(el, "size")?,
            node: ctx.uint_text(el, "node", Radix::Decimal)?,
            label_size,
            block: ctx.child(el, "block")?,
            requested: ctx.child(el, "requested")?,
            readonly: el.has_child("readonly"),
            address_base,
        })
    }
}

impl XmlEncode for MemorydevTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("dynamicMemslots", self.dynamic_memslots.as_deref());
        el.push_opt("size", self.size.as_ref())?;
        el.push_uint_child("node", self.node, UintFormat::Decimal);
        if let Some(size) = &self.label_size {
            let mut label = Element::new("label");
            label.push_child("size", size)?;
            el.push(label);
        }
        el.push_opt("block", self.block.as_ref())?;
        el.push_opt("requested", self.requested.as_ref())?;
        el.push_flag("readonly", self.readonly);
        if self.address_base.is_some() {
            let mut address = Element::new("address");
            address.set_uint("base", self.address_base, UintFormat::HEX8);
            el.push(address);
        }
        Ok(el)
    }
}

impl XmlDecode for Memorydev {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Memorydev {
            model: ctx.required_attr(el, "model")?,
            access: el.attr_string("access"),
            discard: el.attr_string("discard"),
            uuid: el.child_text("uuid"),
            source: ctx.child(el, "source")?,
            target: ctx.child(el, "target")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Memorydev {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", &self.model);
        el.set_opt_attr("access", self.access.as_deref());
        el.set_opt_attr("discard", self.discard.as_deref());
        el.push_text_child("uuid", self.uuid.as_deref());
        el.push_opt("source", self.source.as_ref())?;
        el.push_opt("target", self.target.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// SIMPLE DEVICES
// =============================================================================

impl XmlDecode for Watchdog {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Watchdog {
            model: ctx.required_attr(el, "model")?,
            action: el.attr_string("action"),
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Watchdog {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", &self.model);
        el.set_opt_attr("action", self.action.as_deref());
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for MemBalloon {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MemBalloon {
            model: ctx.required_attr(el, "model")?,
            autodeflate: el.attr_string("autodeflate"),
            free_page_reporting: el.attr_string("freePageReporting"),
            driver: ctx.child(el, "driver")?,
            stats_period: child_uint(el, "stats", "period", ctx)?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for MemBalloon {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", &self.model);
        el.set_opt_attr("autodeflate", self.autodeflate.as_deref());
        el.set_opt_attr("freePageReporting", self.free_page_reporting.as_deref());
        el.push_opt("driver", self.driver.as_ref())?;
        push_uint_attr_child(&mut el, "stats", "period", self.stats_period);
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Panic {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Panic {
            model: el.attr_string("model"),
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Panic {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("model", self.model.as_deref());
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for NvramDevice {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NvramDevice {
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for NvramDevice {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Pstore {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Pstore {
            backend: ctx.required_attr(el, "backend")?,
            path: ctx.required_text(el, "path")?,
            size: ctx.required_child(el, "size")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Pstore {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("backend", self.backend.as_str());
        el.push_text_child("path", Some(&self.path));
        el.push_child("size", &self.size)?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for VsockCid {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VsockCid {
            auto: el.attr_string("auto"),
            address: el.attr_string("address"),
        })
    }
}

impl XmlEncode for VsockCid {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("auto", self.auto.as_deref());
        el.set_opt_attr("address", self.address.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Vsock {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Vsock {
            model: el.attr_string("model"),
            cid: ctx.child(el, "cid")?,
            driver: ctx.child(el, "driver")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Vsock {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("model", self.model.as_deref());
        el.push_opt("cid", self.cid.as_ref())?;
        el.push_opt("driver", self.driver.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Hub {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Hub {
            hub_type: ctx.required_attr(el, "type")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Hub {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", &self.hub_type);
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for IommuDriver {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IommuDriver {
            intremap: el.attr_string("intremap"),
            caching_mode: el.attr_string("caching_mode"),
            eim: el.attr_string("eim"),
            iotlb: el.attr_string("iotlb"),
            aw_bits: ctx.uint_attr(el, "aw_bits", Radix::Decimal)?,
            dma_translation: el.attr_string("dma_translation"),
        })
    }
}

impl XmlEncode for IommuDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("intremap", self.intremap.as_deref());
        el.set_opt_attr("caching_mode", self.caching_mode.as_deref());
        el.set_opt_attr("eim", self.eim.as_deref());
        el.set_opt_attr("iotlb", self.iotlb.as_deref());
        el.set_uint("aw_bits", self.aw_bits, UintFormat::Decimal);
        el.set_opt_attr("dma_translation", self.dma_translation.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Iommu {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Iommu {
            model: ctx.required_attr(el, "model")?,
            driver: ctx.child(el, "driver")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Iommu {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", &self.model);
        el.push_opt("driver", self.driver.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for ShmemMsi {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ShmemMsi {
            enabled: el.attr_string("enabled"),
            vectors: ctx.uint_attr(el, "vectors", Radix::Decimal)?,
            ioeventfd: el.attr_string("ioeventfd"),
        })
    }
}

impl XmlEncode for ShmemMsi {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("enabled", self.enabled.as_deref());
        el.set_uint("vectors", self.vectors, UintFormat::Decimal);
        el.set_opt_attr("ioeventfd", self.ioeventfd.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Shmem {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Shmem {
            name: ctx.required_attr(el, "name")?,
            role: el.attr_string("role"),
            size: ctx.child(el, "size")?,
            model_type: el.child_attr("model", "type"),
            server_path: el.child_attr("server", "path"),
            msi: ctx.child(el, "msi")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Shmem {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_opt_attr("role", self.role.as_deref());
        el.push_opt("size", self.size.as_ref())?;
        el.push_attr_child("model", "type", self.model_type.as_deref());
        el.push_attr_child("server", "path", self.server_path.as_deref());
        el.push_opt("msi", self.msi.as_ref())?;
        push_tail(&mut el, self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::codec::tree::{parse, write};
    use crate::model::chardev::{ChardevProtocol, ChardevSource, ChardevUdp};
    use crate::model::common::PciAddress;

    fn decode<T: XmlDecode>(text: &str) -> Result<T, DecodeError> {
        let root = parse(text).unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        T::from_element(&root, &mut ctx)
    }

    fn encode<T: XmlEncode>(value: &T, name: &str) -> String {
        write(&value.to_element(name).unwrap(), &EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_pci_root_port() {
        let text = r#"<controller type="pci" index="1" model="pcie-root-port"><model name="pcie-root-port"/><target chassis="1" port="16"/><alias name="pci.1"/><address type="pci" domain="0x0000" bus="0x00" slot="0x02" function="0x0" multifunction="on"/></controller>"#;
        let controller: Controller = decode(text).unwrap();
        let ControllerKind::Pci(pci) = &controller.kind else {
            panic!("expected pci controller");
        };
        let target = pci.target.as_ref().unwrap();
        assert_eq!(target.chassis, Some(1));
        assert_eq!(target.port, Some(16));
        assert_eq!(encode(&controller, "controller"), text);
    }

    #[test]
    fn test_pci_target_port_accepts_hex() {
        let controller: Controller =
            decode(r#"<controller type="pci" index="2"><target port="0x10"><node>1</node></target></controller>"#).unwrap();
        let ControllerKind::Pci(pci) = &controller.kind else {
            panic!("expected pci controller");
        };
        let target = pci.target.as_ref().unwrap();
        assert_eq!(target.port, Some(16));
        assert_eq!(target.numa_node, Some(1));
    }

    #[test]
    fn test_usb_and_virtio_serial() {
        let mut usb = Controller::new(
            ControllerKind::Usb(ControllerUsb {
                ports: Some(8),
                master_startport: Some(0),
            }),
            0,
        );
        usb.model = Some("ich9-uhci1".to_string());
        usb.address = Some(DeviceAddress::Pci(PciAddress::new(0, 0, 0x1d, 0)));
        let text = encode(&usb, "controller");
        assert_eq!(
            text,
            r#"<controller type="usb" index="0" model="ich9-uhci1" ports="8"><master startport="0"/><address type="pci" domain="0x0000" bus="0x00" slot="0x1d" function="0x0"/></controller>"#
        );
        assert_eq!(decode::<Controller>(&text).unwrap(), usb);

        let text = r#"<controller type="virtio-serial" index="0" ports="16" vectors="4"/>"#;
        let serial: Controller = decode(text).unwrap();
        assert_eq!(encode(&serial, "controller"), text);
    }

    #[test]
    fn test_controller_type_required() {
        let err = decode::<Controller>(r#"<controller index="0"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "controller", .. }));

        let err = decode::<Controller>(r#"<controller type="floppy"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "controller", .. }));
    }

    #[test]
    fn test_filesystem_defaults_to_mount() {
        let fs: Filesystem =
            decode(r#"<filesystem accessmode="passthrough"><source dir="/export"/><target dir="share"/></filesystem>"#).unwrap();
        assert_eq!(
            fs.source,
            FilesystemSource::Mount {
                dir: Some("/export".to_string()),
                socket: None,
            }
        );
        assert_eq!(
            encode(&fs, "filesystem"),
            r#"<filesystem type="mount" accessmode="passthrough"><source dir="/export"/><target dir="share"/></filesystem>"#
        );
    }

    #[test]
    fn test_virtiofs_filesystem() {
        let text = r#"<filesystem type="mount" accessmode="passthrough"><driver type="virtiofs" queue="1024"/><binary path="/usr/libexec/virtiofsd" xattr="on"><cache mode="always"/><lock posix="on" flock="on"/><thread_pool size="16"/></binary><source dir="/path"/><target dir="mount_tag"/><readonly/></filesystem>"#;
        let fs: Filesystem = decode(text).unwrap();
        assert!(fs.readonly);
        assert_eq!(fs.binary.as_ref().and_then(|binary| binary.thread_pool_size), Some(16));
        assert_eq!(encode(&fs, "filesystem"), text);
    }

    #[test]
    fn test_ram_filesystem() {
        let text = r#"<filesystem type="ram"><source usage="1024" units="KiB"/><target dir="/mnt"/></filesystem>"#;
        let fs: Filesystem = decode(text).unwrap();
        assert_eq!(
            fs.source,
            FilesystemSource::Ram {
                usage: 1024,
                units: Some("KiB".to_string()),
            }
        );
        assert_eq!(encode(&fs, "filesystem"), text);
    }

    #[test]
    fn test_smartcard_modes() {
        let text = r#"<smartcard mode="host-certificates"><certificate>cert1</certificate><certificate>cert2</certificate><database>/etc/pki/nssdb</database></smartcard>"#;
        let card: Smartcard = decode(text).unwrap();
        assert_eq!(encode(&card, "smartcard"), text);

        let card: Smartcard = decode(r#"<smartcard mode="passthrough"><protocol type="raw"/></smartcard>"#).unwrap();
        assert_eq!(
            card.mode,
            SmartcardMode::Passthrough {
                source: ChardevSource::default(),
                protocol: Some(ChardevProtocol {
                    protocol_type: "raw".to_string()
                }),
            }
        );
        assert_eq!(
            encode(&card, "smartcard"),
            r#"<smartcard mode="passthrough" type="pty"><protocol type="raw"/></smartcard>"#
        );

        let err = decode::<Smartcard>(r#"<smartcard/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "smartcard", .. }));
    }

    #[test]
    fn test_input_evdev() {
        let text = r#"<input type="evdev"><source dev="/dev/input/event1" grab="all" grabToggle="ctrl-ctrl" repeat="on"/></input>"#;
        let input: Input = decode(text).unwrap();
        assert_eq!(input.kind, InputKind::Evdev);
        assert_eq!(encode(&input, "input"), text);

        let err = decode::<Input>(r#"<input type="joystick"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "input", .. }));
    }

    #[test]
    fn test_tpm_emulator() {
        let text = r#"<tpm model="tpm-crb"><backend type="emulator" version="2.0" persistent_state="yes"><encryption secret="6dd3e4a5-1d76-44ce-961f-f119f5aad935"/><active_pcr_banks><sha256/><sha384/></active_pcr_banks><source type="dir" path="/var/lib/swtpm"/></backend></tpm>"#;
        let tpm: Tpm = decode(text).unwrap();
        let Some(TpmBackend::Emulator(emulator)) = &tpm.backend else {
            panic!("expected emulator backend");
        };
        let banks = emulator.active_pcr_banks.as_ref().unwrap();
        assert!(banks.sha256 && banks.sha384 && !banks.sha1);
        assert_eq!(encode(&tpm, "tpm"), text);
    }

    #[test]
    fn test_tpm_external_defaults_to_unix() {
        let tpm: Tpm =
            decode(r#"<tpm model="tpm-tis"><backend type="external"><source mode="connect" path="/tmp/swtpm.sock"/></backend></tpm>"#)
                .unwrap();
        assert_eq!(
            tpm.backend,
            Some(TpmBackend::External {
                source: Some(ChardevSource::unix("/tmp/swtpm.sock", "connect")),
            })
        );

        let err = decode::<Tpm>(r#"<tpm><backend type="emulator"><source path="/x"/></backend></tpm>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "tpm source", .. }));
        assert_eq!(err.path(), Some("/backend/source"));
    }

    #[test]
    fn test_rng_backends() {
        let text = r#"<rng model="virtio"><rate bytes="1024" period="1000"/><backend model="random">/dev/urandom</backend></rng>"#;
        let rng: Rng = decode(text).unwrap();
        assert_eq!(
            rng.backend,
            Some(RngBackend::Random {
                device: Some("/dev/urandom".to_string())
            })
        );
        assert_eq!(encode(&rng, "rng"), text);

        let text = r#"<rng model="virtio"><backend model="egd" type="udp"><source mode="bind" service="1234"/><source mode="connect" host="1.2.3.4" service="1234"/></backend></rng>"#;
        let rng: Rng = decode(text).unwrap();
        let Some(RngBackend::Egd { source, .. }) = &rng.backend else {
            panic!("expected egd backend");
        };
        assert_eq!(
            source,
            &ChardevSource::Udp(ChardevUdp {
                bind_host: None,
                bind_service: Some("1234".to_string()),
                connect_host: Some("1.2.3.4".to_string()),
                connect_service: Some("1234".to_string()),
            })
        );
        assert_eq!(encode(&rng, "rng"), text);
    }

    #[test]
    fn test_crypto_backend_model_required() {
        let text = r#"<crypto model="virtio" type="qemu"><backend model="builtin" queues="1"/></crypto>"#;
        let crypto: Crypto = decode(text).unwrap();
        assert_eq!(encode(&crypto, "crypto"), text);

        let err = decode::<Crypto>(r#"<crypto model="virtio"><backend queues="1"/></crypto>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "crypto backend", .. }));
    }

    #[test]
    fn test_memorydev_address_base_is_hex() {
        let text = r#"<memory model="nvdimm" access="shared"><source><path>/tmp/nvdimm</path></source><target><size unit="KiB">523264</size><node>0</node><label><size unit="KiB">128</size></label><address base="0x100000000"/></target></memory>"#;
        let memory: Memorydev = decode(text).unwrap();
        let target = memory.target.as_ref().unwrap();
        assert_eq!(target.address_base, Some(0x1_0000_0000));
        assert_eq!(encode(&memory, "memory"), text);

        let memory = Memorydev {
            model: "dimm".to_string(),
            target: Some(MemorydevTarget {
                address_base: Some(0x1000),
                ..MemorydevTarget::default()
            }),
            ..Memorydev::default()
        };
        assert_eq!(
            encode(&memory, "memory"),
            r#"<memory model="dimm"><target><address base="0x00001000"/></target></memory>"#
        );
    }

    #[test]
    fn test_simple_devices() {
        let text = r#"<memballoon model="virtio" autodeflate="on"><stats period="10"/><alias name="balloon0"/></memballoon>"#;
        let balloon: MemBalloon = decode(text).unwrap();
        assert_eq!(balloon.stats_period, Some(10));
        assert_eq!(encode(&balloon, "memballoon"), text);

        let text = r#"<watchdog model="i6300esb" action="reset"/>"#;
        assert_eq!(encode(&decode::<Watchdog>(text).unwrap(), "watchdog"), text);

        let text = r#"<vsock model="virtio"><cid auto="no" address="3"/></vsock>"#;
        assert_eq!(encode(&decode::<Vsock>(text).unwrap(), "vsock"), text);

        let text = r#"<lease><lockspace>somearea</lockspace><key>thequickbrownfoxjumpsoverthelazydog</key><target path="/some/lease/path" offset="1024"/></lease>"#;
        assert_eq!(encode(&decode::<Lease>(text).unwrap(), "lease"), text);

        let err = decode::<Watchdog>(r#"<watchdog action="reset"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingAttribute { .. }));
    }
}
