//! Codec for the domain document root and its non-device sections.

use crate::codec::document::Document;
use crate::codec::namespace::{self, Extension};
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::domain::*;
use crate::model::extension::{
    BhyveCommandline, LxcNamespace, QemuCapabilities, QemuCommandline, QemuDeprecation, QemuOverride,
    VmwareDataCenterPath, XenCommandline,
};

/// Extension blocks of a domain, in emission order.
const EXTENSIONS: &[(&str, &str)] = &[
    (QemuCommandline::NAMESPACE, QemuCommandline::NAME),
    (QemuCapabilities::NAMESPACE, QemuCapabilities::NAME),
    (QemuOverride::NAMESPACE, QemuOverride::NAME),
    (QemuDeprecation::NAMESPACE, QemuDeprecation::NAME),
    (LxcNamespace::NAMESPACE, LxcNamespace::NAME),
    (BhyveCommandline::NAMESPACE, BhyveCommandline::NAME),
    (VmwareDataCenterPath::NAMESPACE, VmwareDataCenterPath::NAME),
    (XenCommandline::NAMESPACE, XenCommandline::NAME),
];

// =============================================================================
// ROOT
// =============================================================================

impl Document for Domain {
    const ROOT: &'static str = "domain";
}

impl XmlDecode for Domain {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Domain {
            hypervisor: ctx.required_attr(el, "type")?,
            id: ctx.int_attr(el, "id")?,
            name: el.child_text("name"),
            uuid: el.child_text("uuid"),
            genid: el.child_text("genid"),
            title: el.child_text("title"),
            description: el.child_text("description"),
            metadata: el.child("metadata").map(|metadata| Metadata {
                elements: metadata.elements().cloned().collect(),
            }),
            max_memory: ctx.child(el, "maxMemory")?,
            memory: ctx.child(el, "memory")?,
            current_memory: ctx.child(el, "currentMemory")?,
            blkiotune: ctx.child(el, "blkiotune")?,
            memtune: ctx.child(el, "memtune")?,
            memory_backing: ctx.child(el, "memoryBacking")?,
            vcpu: ctx.child(el, "vcpu")?,
            vcpus: ctx.wrapped_children(el, "vcpus", "vcpu")?,
            iothreads: ctx.uint_text(el, "iothreads", Radix::Decimal)?,
            iothread_ids: ctx.wrapped_children(el, "iothreadids", "iothread")?,
            default_iothread: ctx.child(el, "defaultiothread")?,
            cputune: ctx.child(el, "cputune")?,
            numatune: ctx.child(el, "numatune")?,
            resource: ctx.child(el, "resource")?,
            sysinfo: ctx.children(el, "sysinfo")?,
            bootloader: el.child_text("bootloader"),
            bootloader_args: el.child_text("bootloader_args"),
            os: ctx.child(el, "os")?,
            idmap: ctx.child(el, "idmap")?,
            features: ctx.child(el, "features")?,
            cpu: ctx.child(el, "cpu")?,
            clock: ctx.child(el, "clock")?,
            on_poweroff: el.child_text("on_poweroff"),
            on_reboot: el.child_text("on_reboot"),
            on_crash: el.child_text("on_crash"),
            pm: ctx.child(el, "pm")?,
            perf_events: ctx.wrapped_children(el, "perf", "event")?,
            devices: ctx.child(el, "devices")?,
            seclabels: ctx.children(el, "seclabel")?,
            keywrap: ctx.wrapped_children(el, "keywrap", "cipher")?,
            launch_security: ctx.child(el, "launchSecurity")?,
            qemu_commandline: namespace::decode(el, ctx)?,
            qemu_capabilities: namespace::decode(el, ctx)?,
            qemu_override: namespace::decode(el, ctx)?,
            qemu_deprecation: namespace::decode(el, ctx)?,
            lxc_namespace: namespace::decode(el, ctx)?,
            bhyve_commandline: namespace::decode(el, ctx)?,
            vmware_datacenter_path: namespace::decode(el, ctx)?,
            xen_commandline: namespace::decode(el, ctx)?,
            foreign: namespace::foreign(el, EXTENSIONS, ctx),
        })
    }
}

impl XmlEncode for Domain {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        if self.hypervisor.is_empty() {
            return Err(EncodeError::InvalidValue {
                field: "domain type",
                reason: "hypervisor type is empty".to_string(),
            });
        }
        let mut el = Element::new(name);
        el.set_attr("type", self.hypervisor.as_str());
        el.set_int("id", self.id);

        el.push_text_child("name", self.name.as_deref());
        el.push_text_child("uuid", self.uuid.as_deref());
        el.push_text_child("genid", self.genid.as_deref());
        el.push_text_child("title", self.title.as_deref());
        el.push_text_child("description", self.description.as_deref());
        if let Some(metadata) = &self.metadata {
            let mut inner = Element::new("metadata");
            for child in &metadata.elements {
                inner.push(child.clone());
            }
            el.push(inner);
        }
        el.push_opt("maxMemory", self.max_memory.as_ref())?;
        el.push_opt("memory", self.memory.as_ref())?;
        el.push_opt("currentMemory", self.current_memory.as_ref())?;
        el.push_opt("blkiotune", self.blkiotune.as_ref())?;
        el.push_opt("memtune", self.memtune.as_ref())?;
        el.push_opt("memoryBacking", self.memory_backing.as_ref())?;
        el.push_opt("vcpu", self.vcpu.as_ref())?;
        el.push_wrapped("vcpus", "vcpu", &self.vcpus)?;
        el.push_uint_child("iothreads", self.iothreads, UintFormat::Decimal);
        el.push_wrapped("iothreadids", "iothread", &self.iothread_ids)?;
        el.push_opt("defaultiothread", self.default_iothread.as_ref())?;
        el.push_opt("cputune", self.cputune.as_ref())?;
        el.push_opt("numatune", self.numatune.as_ref())?;
        el.push_opt("resource", self.resource.as_ref())?;
        el.push_all("sysinfo", &self.sysinfo)?;
        el.push_text_child("bootloader", self.bootloader.as_deref());
        el.push_text_child("bootloader_args", self.bootloader_args.as_deref());
        el.push_opt("os", self.os.as_ref())?;
        el.push_opt("idmap", self.idmap.as_ref())?;
        el.push_opt("features", self.features.as_ref())?;
        el.push_opt("cpu", self.cpu.as_ref())?;
        el.push_opt("clock", self.clock.as_ref())?;
        el.push_text_child("on_poweroff", self.on_poweroff.as_deref());
        el.push_text_child("on_reboot", self.on_reboot.as_deref());
        el.push_text_child("on_crash", self.on_crash.as_deref());
        el.push_opt("pm", self.pm.as_ref())?;
        el.push_wrapped("perf", "event", &self.perf_events)?;
        el.push_opt("devices", self.devices.as_ref())?;
        el.push_all("seclabel", &self.seclabels)?;
        el.push_wrapped("keywrap", "cipher", &self.keywrap)?;
        el.push_opt("launchSecurity", self.launch_security.as_ref())?;

        namespace::push(&mut el, self.qemu_commandline.as_ref())?;
        namespace::push(&mut el, self.qemu_capabilities.as_ref())?;
        namespace::push(&mut el, self.qemu_override.as_ref())?;
        namespace::push(&mut el, self.qemu_deprecation.as_ref())?;
        namespace::push(&mut el, self.lxc_namespace.as_ref())?;
        namespace::push(&mut el, self.bhyve_commandline.as_ref())?;
        namespace::push(&mut el, self.vmware_datacenter_path.as_ref())?;
        namespace::push(&mut el, self.xen_commandline.as_ref())?;
        namespace::finish_root(&mut el, &self.foreign);
        Ok(el)
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

impl XmlDecode for Memory {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Memory {
            value: ctx.uint_content(el, Radix::Decimal)?.unwrap_or_default(),
            unit: el.attr_string("unit"),
            dump_core: el.attr_string("dumpCore"),
        })
    }
}

impl XmlEncode for Memory {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("unit", self.unit.as_deref());
        el.set_opt_attr("dumpCore", self.dump_core.as_deref());
        el.push_text(&self.value.to_string());
        Ok(el)
    }
}

impl XmlDecode for MaxMemory {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MaxMemory {
            value: ctx.uint_content(el, Radix::Decimal)?.unwrap_or_default(),
            unit: el.attr_string("unit"),
            slots: ctx.uint_attr(el, "slots", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for MaxMemory {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("unit", self.unit.as_deref());
        el.set_uint("slots", self.slots, UintFormat::Decimal);
        el.push_text(&self.value.to_string());
        Ok(el)
    }
}

impl XmlDecode for Vcpu {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Vcpu {
            placement: el.attr_string("placement"),
            cpuset: el.attr_string("cpuset"),
            current: ctx.uint_attr(el, "current", Radix::Decimal)?,
            value: ctx.uint_content(el, Radix::Decimal)?.unwrap_or_default(),
        })
    }
}

impl XmlEncode for Vcpu {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("placement", self.placement.as_deref());
        el.set_opt_attr("cpuset", self.cpuset.as_deref());
        el.set_uint("current", self.current, UintFormat::Decimal);
        el.push_text(&self.value.to_string());
        Ok(el)
    }
}

impl XmlDecode for IoThreadId {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IoThreadId {
            id: ctx.required_uint_attr(el, "id", Radix::Decimal)?,
            thread_pool_min: ctx.uint_attr(el, "thread_pool_min", Radix::Decimal)?,
            thread_pool_max: ctx.uint_attr(el, "thread_pool_max", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for IoThreadId {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("id", Some(self.id), UintFormat::Decimal);
        el.set_uint("thread_pool_min", self.thread_pool_min, UintFormat::Decimal);
        el.set_uint("thread_pool_max", self.thread_pool_max, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for VcpuState {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VcpuState {
            id: ctx.uint_attr(el, "id", Radix::Decimal)?,
            enabled: el.attr_string("enabled"),
            hotpluggable: el.attr_string("hotpluggable"),
            order: ctx.uint_attr(el, "order", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for VcpuState {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("id", self.id, UintFormat::Decimal);
        el.set_opt_attr("enabled", self.enabled.as_deref());
        el.set_opt_attr("hotpluggable", self.hotpluggable.as_deref());
        el.set_uint("order", self.order, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for DefaultIoThread {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DefaultIoThread {
            thread_pool_min: ctx.uint_attr(el, "thread_pool_min", Radix::Decimal)?,
            thread_pool_max: ctx.uint_attr(el, "thread_pool_max", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for DefaultIoThread {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("thread_pool_min", self.thread_pool_min, UintFormat::Decimal);
        el.set_uint("thread_pool_max", self.thread_pool_max, UintFormat::Decimal);
        Ok(el)
    }
}

// =============================================================================
// TUNING
// =============================================================================

fn push_int_child(el: &mut Element, name: &str, value: Option<i64>) {
    el.push_text_child(name, value.map(|value| value.to_string()).as_deref());
}

impl XmlDecode for BlkioDevice {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(BlkioDevice {
            path: ctx.required_text(el, "path")?,
            weight: ctx.uint_text(el, "weight", Radix::Decimal)?,
            read_iops_sec: ctx.uint_text(el, "read_iops_sec", Radix::Decimal)?,
            write_iops_sec: ctx.uint_text(el, "write_iops_sec", Radix::Decimal)?,
            read_bytes_sec: ctx.uint_text(el, "read_bytes_sec", Radix::Decimal)?,
            write_bytes_sec: ctx.uint_text(el, "write_bytes_sec", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for BlkioDevice {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("path", Some(&self.path));
        el.push_uint_child("weight", self.weight, UintFormat::Decimal);
        el.push_uint_child("read_iops_sec", self.read_iops_sec, UintFormat::Decimal);
        el.push_uint_child("write_iops_sec", self.write_iops_sec, UintFormat::Decimal);
        el.push_uint_child("read_bytes_sec", self.read_bytes_sec, UintFormat::Decimal);
        el.push_uint_child("write_bytes_sec", self.write_bytes_sec, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for BlkioTune {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(BlkioTune {
            weight: ctx.uint_text(el, "weight", Radix::Decimal)?,
            devices: ctx.children(el, "device")?,
        })
    }
}

impl XmlEncode for BlkioTune {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_uint_child("weight", self.weight, UintFormat::Decimal);
        el.push_all("device", &self.devices)?;
        Ok(el)
    }
}

impl XmlDecode for MemTune {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MemTune {
            hard_limit: ctx.child(el, "hard_limit")?,
            soft_limit: ctx.child(el, "soft_limit")?,
            min_guarantee: ctx.child(el, "min_guarantee")?,
            swap_hard_limit: ctx.child(el, "swap_hard_limit")?,
        })
    }
}

impl XmlEncode for MemTune {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_opt("hard_limit", self.hard_limit.as_ref())?;
        el.push_opt("soft_limit", self.soft_limit.as_ref())?;
        el.push_opt("min_guarantee", self.min_guarantee.as_ref())?;
        el.push_opt("swap_hard_limit", self.swap_hard_limit.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Hugepage {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Hugepage {
            size: ctx.required_uint_attr(el, "size", Radix::Decimal)?,
            unit: el.attr_string("unit"),
            nodeset: el.attr_string("nodeset"),
        })
    }
}

impl XmlEncode for Hugepage {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("size", Some(self.size), UintFormat::Decimal);
        el.set_opt_attr("unit", self.unit.as_deref());
        el.set_opt_attr("nodeset", self.nodeset.as_deref());
        Ok(el)
    }
}

impl XmlDecode for MemoryAllocation {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MemoryAllocation {
            mode: el.attr_string("mode"),
            threads: ctx.uint_attr(el, "threads", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for MemoryAllocation {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("mode", self.mode.as_deref());
        el.set_uint("threads", self.threads, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for MemoryBacking {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let hugepages = match el.child("hugepages") {
            Some(pages) => Some(ctx.scoped("hugepages", |ctx| ctx.children(pages, "page"))?),
            None => None,
        };
        Ok(MemoryBacking {
            hugepages,
            nosharepages: el.has_child("nosharepages"),
            locked: el.has_child("locked"),
            source_type: el.child_attr("source", "type"),
            access_mode: el.child_attr("access", "mode"),
            allocation: ctx.child(el, "allocation")?,
            discard: el.has_child("discard"),
        })
    }
}

impl XmlEncode for MemoryBacking {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        if let Some(pages) = &self.hugepages {
            let mut inner = Element::new("hugepages");
            inner.push_all("page", pages)?;
            el.push(inner);
        }
        el.push_flag("nosharepages", self.nosharepages);
        el.push_flag("locked", self.locked);
        el.push_attr_child("source", "type", self.source_type.as_deref());
        el.push_attr_child("access", "mode", self.access_mode.as_deref());
        el.push_opt("allocation", self.allocation.as_ref())?;
        el.push_flag("discard", self.discard);
        Ok(el)
    }
}

impl XmlDecode for VcpuPin {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VcpuPin {
            vcpu: ctx.required_uint_attr(el, "vcpu", Radix::Decimal)?,
            cpuset: ctx.required_attr(el, "cpuset")?,
        })
    }
}

impl XmlEncode for VcpuPin {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("vcpu", Some(self.vcpu), UintFormat::Decimal);
        el.set_attr("cpuset", self.cpuset.as_str());
        Ok(el)
    }
}

impl XmlDecode for IoThreadPin {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IoThreadPin {
            iothread: ctx.required_uint_attr(el, "iothread", Radix::Decimal)?,
            cpuset: ctx.required_attr(el, "cpuset")?,
        })
    }
}

impl XmlEncode for IoThreadPin {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("iothread", Some(self.iothread), UintFormat::Decimal);
        el.set_attr("cpuset", self.cpuset.as_str());
        Ok(el)
    }
}

/// The thread-list attribute carried by a scheduler element.
fn sched_threads_attr(name: &str) -> Option<&'static str> {
    match name {
        "vcpusched" => Some("vcpus"),
        "iothreadsched" => Some("iothreads"),
        _ => None,
    }
}

impl XmlDecode for ThreadSched {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ThreadSched {
            threads: sched_threads_attr(&el.name).and_then(|attr| el.attr_string(attr)),
            scheduler: el.attr_string("scheduler"),
            priority: ctx.int_attr(el, "priority")?,
        })
    }
}

impl XmlEncode for ThreadSched {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        if let Some(attr) = sched_threads_attr(name) {
            el.set_opt_attr(attr, self.threads.as_deref());
        }
        el.set_opt_attr("scheduler", self.scheduler.as_deref());
        el.set_int("priority", self.priority);
        Ok(el)
    }
}

impl XmlDecode for CacheAllocation {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CacheAllocation {
            id: ctx.required_uint_attr(el, "id", Radix::Decimal)?,
            level: ctx.required_uint_attr(el, "level", Radix::Decimal)?,
            cache_type: ctx.required_attr(el, "type")?,
            size: ctx.required_uint_attr(el, "size", Radix::Decimal)?,
            unit: el.attr_string("unit"),
        })
    }
}

impl XmlEncode for CacheAllocation {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("id", Some(self.id), UintFormat::Decimal);
        el.set_uint("level", Some(self.level), UintFormat::Decimal);
        el.set_attr("type", self.cache_type.as_str());
        el.set_uint("size", Some(self.size), UintFormat::Decimal);
        el.set_opt_attr("unit", self.unit.as_deref());
        Ok(el)
    }
}

impl XmlDecode for TuneMonitor {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(TuneMonitor {
            level: ctx.uint_attr(el, "level", Radix::Decimal)?,
            vcpus: el.attr_string("vcpus"),
        })
    }
}

impl XmlEncode for TuneMonitor {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("level", self.level, UintFormat::Decimal);
        el.set_opt_attr("vcpus", self.vcpus.as_deref());
        Ok(el)
    }
}

impl XmlDecode for CacheTune {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CacheTune {
            vcpus: el.attr_string("vcpus"),
            id: el.attr_string("id"),
            caches: ctx.children(el, "cache")?,
            monitors: ctx.children(el, "monitor")?,
        })
    }
}

impl XmlEncode for CacheTune {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("vcpus", self.vcpus.as_deref());
        el.set_opt_attr("id", self.id.as_deref());
        el.push_all("cache", &self.caches)?;
        el.push_all("monitor", &self.monitors)?;
        Ok(el)
    }
}

impl XmlDecode for BandwidthNode {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(BandwidthNode {
            id: ctx.required_uint_attr(el, "id", Radix::Decimal)?,
            bandwidth: ctx.required_uint_attr(el, "bandwidth", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for BandwidthNode {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("id", Some(self.id), UintFormat::Decimal);
        el.set_uint("bandwidth", Some(self.bandwidth), UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for MemoryBandwidthTune {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MemoryBandwidthTune {
            vcpus: ctx.required_attr(el, "vcpus")?,
            nodes: ctx.children(el, "node")?,
            monitors: ctx.children(el, "monitor")?,
        })
    }
}

impl XmlEncode for MemoryBandwidthTune {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("vcpus", self.vcpus.as_str());
        el.push_all("node", &self.nodes)?;
        el.push_all("monitor", &self.monitors)?;
        Ok(el)
    }
}

impl XmlDecode for CpuTune {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CpuTune {
            shares: ctx.uint_text(el, "shares", Radix::Decimal)?,
            period: ctx.uint_text(el, "period", Radix::Decimal)?,
            quota: ctx.int_text(el, "quota")?,
            global_period: ctx.uint_text(el, "global_period", Radix::Decimal)?,
            global_quota: ctx.int_text(el, "global_quota")?,
            emulator_period: ctx.uint_text(el, "emulator_period", Radix::Decimal)?,
            emulator_quota: ctx.int_text(el, "emulator_quota")?,
            iothread_period: ctx.uint_text(el, "iothread_period", Radix::Decimal)?,
            iothread_quota: ctx.int_text(el, "iothread_quota")?,
            vcpupins: ctx.children(el, "vcpupin")?,
            emulatorpin: el.child_attr("emulatorpin", "cpuset"),
            iothreadpins: ctx.children(el, "iothreadpin")?,
            vcpuscheds: ctx.children(el, "vcpusched")?,
            emulatorsched: ctx.child(el, "emulatorsched")?,
            iothreadscheds: ctx.children(el, "iothreadsched")?,
            cachetunes: ctx.children(el, "cachetune")?,
            memorytunes: ctx.children(el, "memorytune")?,
        })
    }
}

impl XmlEncode for CpuTune {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_uint_child("shares", self.shares, UintFormat::Decimal);
        el.push_uint_child("period", self.period, UintFormat::Decimal);
        push_int_child(&mut el, "quota", self.quota);
        el.push_uint_child("global_period", self.global_period, UintFormat::Decimal);
        push_int_child(&mut el, "global_quota", self.global_quota);
        el.push_uint_child("emulator_period", self.emulator_period, UintFormat::Decimal);
        push_int_child(&mut el, "emulator_quota", self.emulator_quota);
        el.push_uint_child("iothread_period", self.iothread_period, UintFormat::Decimal);
        push_int_child(&mut el, "iothread_quota", self.iothread_quota);
        el.push_all("vcpupin", &self.vcpupins)?;
        el.push_attr_child("emulatorpin", "cpuset", self.emulatorpin.as_deref());
        el.push_all("iothreadpin", &self.iothreadpins)?;
        el.push_all("vcpusched", &self.vcpuscheds)?;
        el.push_opt("emulatorsched", self.emulatorsched.as_ref())?;
        el.push_all("iothreadsched", &self.iothreadscheds)?;
        el.push_all("cachetune", &self.cachetunes)?;
        el.push_all("memorytune", &self.memorytunes)?;
        Ok(el)
    }
}

impl XmlDecode for NumaMemory {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NumaMemory {
            mode: el.attr_string("mode"),
            nodeset: el.attr_string("nodeset"),
            placement: el.attr_string("placement"),
        })
    }
}

impl XmlEncode for NumaMemory {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("mode", self.mode.as_deref());
        el.set_opt_attr("nodeset", self.nodeset.as_deref());
        el.set_opt_attr("placement", self.placement.as_deref());
        Ok(el)
    }
}

impl XmlDecode for NumaMemNode {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NumaMemNode {
            cellid: ctx.required_uint_attr(el, "cellid", Radix::Decimal)?,
            mode: el.attr_string("mode"),
            nodeset: el.attr_string("nodeset"),
        })
    }
}

impl XmlEncode for NumaMemNode {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("cellid", Some(self.cellid), UintFormat::Decimal);
        el.set_opt_attr("mode", self.mode.as_deref());
        el.set_opt_attr("nodeset", self.nodeset.as_deref());
        Ok(el)
    }
}

impl XmlDecode for NumaTune {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NumaTune {
            memory: ctx.child(el, "memory")?,
            memnodes: ctx.children(el, "memnode")?,
        })
    }
}

impl XmlEncode for NumaTune {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_opt("memory", self.memory.as_ref())?;
        el.push_all("memnode", &self.memnodes)?;
        Ok(el)
    }
}

impl XmlDecode for Resource {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Resource {
            partition: el.child_text("partition"),
            fibrechannel_appid: el.child_attr("fibrechannel", "appid"),
        })
    }
}

impl XmlEncode for Resource {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("partition", self.partition.as_deref());
        el.push_attr_child("fibrechannel", "appid", self.fibrechannel_appid.as_deref());
        Ok(el)
    }
}

impl XmlDecode for PerfEvent {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PerfEvent {
            name: ctx.required_attr(el, "name")?,
            enabled: ctx.required_attr(el, "enabled")?,
        })
    }
}

impl XmlEncode for PerfEvent {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", self.name.as_str());
        el.set_attr("enabled", self.enabled.as_str());
        Ok(el)
    }
}

impl XmlDecode for KeyWrapCipher {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(KeyWrapCipher {
            name: ctx.required_attr(el, "name")?,
            state: ctx.required_attr(el, "state")?,
        })
    }
}

impl XmlEncode for KeyWrapCipher {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", self.name.as_str());
        el.set_attr("state", self.state.as_str());
        Ok(el)
    }
}

// =============================================================================
// SYSINFO
// =============================================================================

impl XmlDecode for SysInfoEntry {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SysInfoEntry {
            name: ctx.required_attr(el, "name")?,
            file: el.attr_string("file"),
            value: el.text(),
        })
    }
}

impl XmlEncode for SysInfoEntry {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", self.name.as_str());
        el.set_opt_attr("file", self.file.as_deref());
        el.push_text(&self.value);
        Ok(el)
    }
}

impl XmlDecode for SysInfoBlock {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SysInfoBlock {
            entries: ctx.children(el, "entry")?,
        })
    }
}

impl XmlEncode for SysInfoBlock {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_all("entry", &self.entries)?;
        Ok(el)
    }
}

impl XmlDecode for SysInfo {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        match variant::SYSINFO.select(el, ctx)? {
            "smbios" => Ok(SysInfo::Smbios(SmbiosInfo {
                bios: ctx.child(el, "bios")?,
                system: ctx.child(el, "system")?,
                base_boards: ctx.children(el, "baseBoard")?,
                chassis: ctx.child(el, "chassis")?,
                processors: ctx.children(el, "processor")?,
                memories: ctx.children(el, "memory")?,
                oem_strings: el
                    .child("oemStrings")
                    .map(|oem| oem.children_named("entry").map(Element::text).collect())
                    .unwrap_or_default(),
            })),
            "fwcfg" => Ok(SysInfo::FwCfg(ctx.children(el, "entry")?)),
            other => Err(ctx.unknown_discriminant(&variant::SYSINFO, other)),
        }
    }
}

impl XmlEncode for SysInfo {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            SysInfo::Smbios(smbios) => {
                el.push_opt("bios", smbios.bios.as_ref())?;
                el.push_opt("system", smbios.system.as_ref())?;
                el.push_all("baseBoard", &smbios.base_boards)?;
                el.push_opt("chassis", smbios.chassis.as_ref())?;
                el.push_all("processor", &smbios.processors)?;
                el.push_all("memory", &smbios.memories)?;
                if !smbios.oem_strings.is_empty() {
                    let mut oem = Element::new("oemStrings");
                    for entry in &smbios.oem_strings {
                        oem.push_text_child("entry", Some(entry));
                    }
                    el.push(oem);
                }
            }
            SysInfo::FwCfg(entries) => el.push_all("entry", entries)?,
        }
        Ok(el)
    }
}

// =============================================================================
// OS
// =============================================================================

impl XmlDecode for OsType {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(OsType {
            arch: el.attr_string("arch"),
            machine: el.attr_string("machine"),
            value: el.text(),
        })
    }
}

impl XmlEncode for OsType {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("arch", self.arch.as_deref());
        el.set_opt_attr("machine", self.machine.as_deref());
        el.push_text(&self.value);
        Ok(el)
    }
}

impl XmlDecode for FirmwareFeature {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FirmwareFeature {
            enabled: ctx.required_attr(el, "enabled")?,
            name: ctx.required_attr(el, "name")?,
        })
    }
}

impl XmlEncode for FirmwareFeature {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("enabled", self.enabled.as_str());
        el.set_attr("name", self.name.as_str());
        Ok(el)
    }
}

impl XmlDecode for Loader {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Loader {
            path: el.text(),
            readonly: el.attr_string("readonly"),
            secure: el.attr_string("secure"),
            stateless: el.attr_string("stateless"),
            loader_type: el.attr_string("type"),
            format: el.attr_string("format"),
        })
    }
}

impl XmlEncode for Loader {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("readonly", self.readonly.as_deref());
        el.set_opt_attr("secure", self.secure.as_deref());
        el.set_opt_attr("stateless", self.stateless.as_deref());
        el.set_opt_attr("type", self.loader_type.as_deref());
        el.set_opt_attr("format", self.format.as_deref());
        el.push_text(&self.path);
        Ok(el)
    }
}

impl XmlDecode for Nvram {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Nvram {
            path: el.text_opt(),
            template: el.attr_string("template"),
            template_format: el.attr_string("templateFormat"),
            format: el.attr_string("format"),
        })
    }
}

impl XmlEncode for Nvram {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("template", self.template.as_deref());
        el.set_opt_attr("templateFormat", self.template_format.as_deref());
        el.set_opt_attr("format", self.format.as_deref());
        if let Some(path) = &self.path {
            el.push_text(path);
        }
        Ok(el)
    }
}

impl XmlDecode for BootMenu {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(BootMenu {
            enable: el.attr_string("enable"),
            timeout: ctx.uint_attr(el, "timeout", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for BootMenu {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("enable", self.enable.as_deref());
        el.set_uint("timeout", self.timeout, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for DomainOs {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DomainOs {
            firmware: el.attr_string("firmware"),
            os_type: ctx.child(el, "type")?,
            firmware_features: ctx.wrapped_children(el, "firmware", "feature")?,
            init: el.child_text("init"),
            init_args: el.children_named("initarg").map(Element::text).collect(),
            loader: ctx.child(el, "loader")?,
            nvram: ctx.child(el, "nvram")?,
            kernel: el.child_text("kernel"),
            initrd: el.child_text("initrd"),
            cmdline: el.child_text("cmdline"),
            dtb: el.child_text("dtb"),
            boot_devices: ctx.attr_list(el, "boot", "dev")?,
            boot_menu: ctx.child(el, "bootmenu")?,
            smbios_mode: el.child_attr("smbios", "mode"),
        })
    }
}

impl XmlEncode for DomainOs {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("firmware", self.firmware.as_deref());
        el.push_opt("type", self.os_type.as_ref())?;
        el.push_wrapped("firmware", "feature", &self.firmware_features)?;
        el.push_text_child("init", self.init.as_deref());
        for arg in &self.init_args {
            el.push_text_child("initarg", Some(arg));
        }
        el.push_opt("loader", self.loader.as_ref())?;
        el.push_opt("nvram", self.nvram.as_ref())?;
        el.push_text_child("kernel", self.kernel.as_deref());
        el.push_text_child("initrd", self.initrd.as_deref());
        el.push_text_child("cmdline", self.cmdline.as_deref());
        el.push_text_child("dtb", self.dtb.as_deref());
        for dev in &self.boot_devices {
            el.push_attr_child("boot", "dev", Some(dev));
        }
        el.push_opt("bootmenu", self.boot_menu.as_ref())?;
        el.push_attr_child("smbios", "mode", self.smbios_mode.as_deref());
        Ok(el)
    }
}

// =============================================================================
// FEATURES
// =============================================================================

impl XmlDecode for FeatureState {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FeatureState {
            state: el.attr_string("state"),
        })
    }
}

impl XmlEncode for FeatureState {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("state", self.state.as_deref());
        Ok(el)
    }
}

impl XmlDecode for HyperVSpinlocks {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HyperVSpinlocks {
            state: el.attr_string("state"),
            retries: ctx.uint_attr(el, "retries", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for HyperVSpinlocks {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("state", self.state.as_deref());
        el.set_uint("retries", self.retries, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for HyperVStimer {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HyperVStimer {
            state: el.attr_string("state"),
            direct: ctx.child(el, "direct")?,
        })
    }
}

impl XmlEncode for HyperVStimer {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("state", self.state.as_deref());
        el.push_opt("direct", self.direct.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for HyperVVendorId {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HyperVVendorId {
            state: el.attr_string("state"),
            value: el.attr_string("value"),
        })
    }
}

impl XmlEncode for HyperVVendorId {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("state", self.state.as_deref());
        el.set_opt_attr("value", self.value.as_deref());
        Ok(el)
    }
}

impl XmlDecode for HyperVFeatures {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HyperVFeatures {
            mode: el.attr_string("mode"),
            relaxed: ctx.child(el, "relaxed")?,
            vapic: ctx.child(el, "vapic")?,
            spinlocks: ctx.child(el, "spinlocks")?,
            vpindex: ctx.child(el, "vpindex")?,
            runtime: ctx.child(el, "runtime")?,
            synic: ctx.child(el, "synic")?,
            stimer: ctx.child(el, "stimer")?,
            reset: ctx.child(el, "reset")?,
            vendor_id: ctx.child(el, "vendor_id")?,
            frequencies: ctx.child(el, "frequencies")?,
            reenlightenment: ctx.child(el, "reenlightenment")?,
            tlbflush: ctx.child(el, "tlbflush")?,
            ipi: ctx.child(el, "ipi")?,
            evmcs: ctx.child(el, "evmcs")?,
            avic: ctx.child(el, "avic")?,
        })
    }
}

impl XmlEncode for HyperVFeatures {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("mode", self.mode.as_deref());
        el.push_opt("relaxed", self.relaxed.as_ref())?;
        el.push_opt("vapic", self.vapic.as_ref())?;
        el.push_opt("spinlocks", self.spinlocks.as_ref())?;
        el.push_opt("vpindex", self.vpindex.as_ref())?;
        el.push_opt("runtime", self.runtime.as_ref())?;
        el.push_opt("synic", self.synic.as_ref())?;
        el.push_opt("stimer", self.stimer.as_ref())?;
        el.push_opt("reset", self.reset.as_ref())?;
        el.push_opt("vendor_id", self.vendor_id.as_ref())?;
        el.push_opt("frequencies", self.frequencies.as_ref())?;
        el.push_opt("reenlightenment", self.reenlightenment.as_ref())?;
        el.push_opt("tlbflush", self.tlbflush.as_ref())?;
        el.push_opt("ipi", self.ipi.as_ref())?;
        el.push_opt("evmcs", self.evmcs.as_ref())?;
        el.push_opt("avic", self.avic.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for KvmDirtyRing {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(KvmDirtyRing {
            state: el.attr_string("state"),
            size: ctx.uint_attr(el, "size", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for KvmDirtyRing {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("state", self.state.as_deref());
        el.set_uint("size", self.size, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for KvmFeatures {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(KvmFeatures {
            hidden: ctx.child(el, "hidden")?,
            hint_dedicated: ctx.child(el, "hint-dedicated")?,
            poll_control: ctx.child(el, "poll-control")?,
            pv_ipi: ctx.child(el, "pv-ipi")?,
            dirty_ring: ctx.child(el, "dirty-ring")?,
        })
    }
}

impl XmlEncode for KvmFeatures {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_opt("hidden", self.hidden.as_ref())?;
        el.push_opt("hint-dedicated", self.hint_dedicated.as_ref())?;
        el.push_opt("poll-control", self.poll_control.as_ref())?;
        el.push_opt("pv-ipi", self.pv_ipi.as_ref())?;
        el.push_opt("dirty-ring", self.dirty_ring.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Smm {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Smm {
            state: el.attr_string("state"),
            tseg: ctx.child(el, "tseg")?,
        })
    }
}

impl XmlEncode for Smm {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("state", self.state.as_deref());
        el.push_opt("tseg", self.tseg.as_ref())?;
        Ok(el)
    }
}

/// Single-attribute feature records.
macro_rules! attr_feature {
    ($ty:ident, $field:ident, $attr:literal) => {
        impl XmlDecode for $ty {
            fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
                Ok($ty {
                    $field: el.attr_string($attr),
                })
            }
        }

        impl XmlEncode for $ty {
            fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
                let mut el = Element::new(name);
                el.set_opt_attr($attr, self.$field.as_deref());
                Ok(el)
            }
        }
    };
}

attr_feature!(FeatureApic, eoi, "eoi");
attr_feature!(FeatureGic, version, "version");
attr_feature!(FeatureIoApic, driver, "driver");
attr_feature!(FeatureAsyncTeardown, enabled, "enabled");

impl XmlDecode for Features {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Features {
            pae: el.has_child("pae"),
            acpi: el.has_child("acpi"),
            apic: ctx.child(el, "apic")?,
            hap: ctx.child(el, "hap")?,
            hyperv: ctx.child(el, "hyperv")?,
            kvm: ctx.child(el, "kvm")?,
            pvspinlock: ctx.child(el, "pvspinlock")?,
            pmu: ctx.child(el, "pmu")?,
            vmport: ctx.child(el, "vmport")?,
            gic: ctx.child(el, "gic")?,
            smm: ctx.child(el, "smm")?,
            ioapic: ctx.child(el, "ioapic")?,
            async_teardown: ctx.child(el, "async-teardown")?,
        })
    }
}

impl XmlEncode for Features {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_flag("pae", self.pae);
        el.push_flag("acpi", self.acpi);
        el.push_opt("apic", self.apic.as_ref())?;
        el.push_opt("hap", self.hap.as_ref())?;
        el.push_opt("hyperv", self.hyperv.as_ref())?;
        el.push_opt("kvm", self.kvm.as_ref())?;
        el.push_opt("pvspinlock", self.pvspinlock.as_ref())?;
        el.push_opt("pmu", self.pmu.as_ref())?;
        el.push_opt("vmport", self.vmport.as_ref())?;
        el.push_opt("gic", self.gic.as_ref())?;
        el.push_opt("smm", self.smm.as_ref())?;
        el.push_opt("ioapic", self.ioapic.as_ref())?;
        el.push_opt("async-teardown", self.async_teardown.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// CPU AND CLOCK
// =============================================================================

impl XmlDecode for CpuModel {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CpuModel {
            fallback: el.attr_string("fallback"),
            vendor_id: el.attr_string("vendor_id"),
            value: el.text(),
        })
    }
}

impl XmlEncode for CpuModel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("fallback", self.fallback.as_deref());
        el.set_opt_attr("vendor_id", self.vendor_id.as_deref());
        el.push_text(&self.value);
        Ok(el)
    }
}

impl XmlDecode for CpuTopology {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CpuTopology {
            sockets: ctx.uint_attr(el, "sockets", Radix::Decimal)?,
            dies: ctx.uint_attr(el, "dies", Radix::Decimal)?,
            clusters: ctx.uint_attr(el, "clusters", Radix::Decimal)?,
            cores: ctx.uint_attr(el, "cores", Radix::Decimal)?,
            threads: ctx.uint_attr(el, "threads", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for CpuTopology {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("sockets", self.sockets, UintFormat::Decimal);
        el.set_uint("dies", self.dies, UintFormat::Decimal);
        el.set_uint("clusters", self.clusters, UintFormat::Decimal);
        el.set_uint("cores", self.cores, UintFormat::Decimal);
        el.set_uint("threads", self.threads, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for CpuCache {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CpuCache {
            level: ctx.uint_attr(el, "level", Radix::Decimal)?,
            mode: ctx.required_attr(el, "mode")?,
        })
    }
}

impl XmlEncode for CpuCache {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("level", self.level, UintFormat::Decimal);
        el.set_attr("mode", self.mode.as_str());
        Ok(el)
    }
}

impl XmlDecode for CpuFeature {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CpuFeature {
            policy: el.attr_string("policy"),
            name: ctx.required_attr(el, "name")?,
        })
    }
}

impl XmlEncode for CpuFeature {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("policy", self.policy.as_deref());
        el.set_attr("name", self.name.as_str());
        Ok(el)
    }
}

impl XmlDecode for Cpu {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Cpu {
            cpu_match: el.attr_string("match"),
            mode: el.attr_string("mode"),
            check: el.attr_string("check"),
            migratable: el.attr_string("migratable"),
            model: ctx.child(el, "model")?,
            vendor: el.child_text("vendor"),
            topology: ctx.child(el, "topology")?,
            cache: ctx.child(el, "cache")?,
            features: ctx.children(el, "feature")?,
        })
    }
}

impl XmlEncode for Cpu {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("match", self.cpu_match.as_deref());
        el.set_opt_attr("mode", self.mode.as_deref());
        el.set_opt_attr("check", self.check.as_deref());
        el.set_opt_attr("migratable", self.migratable.as_deref());
        el.push_opt("model", self.model.as_ref())?;
        el.push_text_child("vendor", self.vendor.as_deref());
        el.push_opt("topology", self.topology.as_ref())?;
        el.push_opt("cache", self.cache.as_ref())?;
        el.push_all("feature", &self.features)?;
        Ok(el)
    }
}

impl XmlDecode for TimerCatchup {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(TimerCatchup {
            threshold: ctx.uint_attr(el, "threshold", Radix::Decimal)?,
            slew: ctx.uint_attr(el, "slew", Radix::Decimal)?,
            limit: ctx.uint_attr(el, "limit", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for TimerCatchup {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("threshold", self.threshold, UintFormat::Decimal);
        el.set_uint("slew", self.slew, UintFormat::Decimal);
        el.set_uint("limit", self.limit, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for Timer {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Timer {
            name: ctx.required_attr(el, "name")?,
            track: el.attr_string("track"),
            tickpolicy: el.attr_string("tickpolicy"),
            catchup: ctx.child(el, "catchup")?,
            frequency: ctx.uint_attr(el, "frequency", Radix::Decimal)?,
            mode: el.attr_string("mode"),
            present: el.attr_string("present"),
        })
    }
}

impl XmlEncode for Timer {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", self.name.as_str());
        el.set_opt_attr("track", self.track.as_deref());
        el.set_opt_attr("tickpolicy", self.tickpolicy.as_deref());
        el.set_uint("frequency", self.frequency, UintFormat::Decimal);
        el.set_opt_attr("mode", self.mode.as_deref());
        el.set_opt_attr("present", self.present.as_deref());
        el.push_opt("catchup", self.catchup.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Clock {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Clock {
            offset: el.attr_string("offset"),
            basis: el.attr_string("basis"),
            adjustment: el.attr_string("adjustment"),
            timezone: el.attr_string("timezone"),
            start: ctx.uint_attr(el, "start", Radix::Decimal)?,
            timers: ctx.children(el, "timer")?,
        })
    }
}

impl XmlEncode for Clock {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("offset", self.offset.as_deref());
        el.set_opt_attr("basis", self.basis.as_deref());
        el.set_opt_attr("adjustment", self.adjustment.as_deref());
        el.set_opt_attr("timezone", self.timezone.as_deref());
        el.set_uint("start", self.start, UintFormat::Decimal);
        el.push_all("timer", &self.timers)?;
        Ok(el)
    }
}

// =============================================================================
// LIFECYCLE AND SECURITY
// =============================================================================

impl XmlDecode for PowerManagement {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PowerManagement {
            suspend_to_mem: el.child_attr("suspend-to-mem", "enabled"),
            suspend_to_disk: el.child_attr("suspend-to-disk", "enabled"),
        })
    }
}

impl XmlEncode for PowerManagement {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_attr_child("suspend-to-mem", "enabled", self.suspend_to_mem.as_deref());
        el.push_attr_child("suspend-to-disk", "enabled", self.suspend_to_disk.as_deref());
        Ok(el)
    }
}

impl XmlDecode for SecLabel {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SecLabel {
            label_type: el.attr_string("type"),
            model: el.attr_string("model"),
            relabel: el.attr_string("relabel"),
            label: el.child_text("label"),
            image_label: el.child_text("imagelabel"),
            base_label: el.child_text("baselabel"),
        })
    }
}

impl XmlEncode for SecLabel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.label_type.as_deref());
        el.set_opt_attr("model", self.model.as_deref());
        el.set_opt_attr("relabel", self.relabel.as_deref());
        el.push_text_child("label", self.label.as_deref());
        el.push_text_child("imagelabel", self.image_label.as_deref());
        el.push_text_child("baselabel", self.base_label.as_deref());
        Ok(el)
    }
}

impl XmlDecode for LaunchSecurity {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        match variant::LAUNCH_SECURITY.select(el, ctx)? {
            "sev" => Ok(LaunchSecurity::Sev(SevLaunch {
                kernel_hashes: el.attr_string("kernelHashes"),
                cbitpos: ctx.uint_text(el, "cbitpos", Radix::Decimal)?,
                reduced_phys_bits: ctx.uint_text(el, "reducedPhysBits", Radix::Decimal)?,
                policy: ctx.uint_text(el, "policy", Radix::Auto)?,
                dh_cert: el.child_text("dhCert"),
                session: el.child_text("session"),
            })),
            "sev-snp" => Ok(LaunchSecurity::SevSnp(SevSnpLaunch {
                kernel_hashes: el.attr_string("kernelHashes"),
                author_key: el.attr_string("authorKey"),
                vcek: el.attr_string("vcek"),
                cbitpos: ctx.uint_text(el, "cbitpos", Radix::Decimal)?,
                reduced_phys_bits: ctx.uint_text(el, "reducedPhysBits", Radix::Decimal)?,
                policy: ctx.uint_text(el, "policy", Radix::Auto)?,
                guest_visible_workarounds: el.child_text("guestVisibleWorkarounds"),
                id_block: el.child_text("idBlock"),
                id_auth: el.child_text("idAuth"),
                host_data: el.child_text("hostData"),
            })),
            "s390-pv" => Ok(LaunchSecurity::S390Pv),
            other => Err(ctx.unknown_discriminant(&variant::LAUNCH_SECURITY, other)),
        }
    }
}

impl XmlEncode for LaunchSecurity {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            LaunchSecurity::Sev(sev) => {
                el.set_opt_attr("kernelHashes", sev.kernel_hashes.as_deref());
                el.push_uint_child("cbitpos", sev.cbitpos, UintFormat::Decimal);
                el.push_uint_child("reducedPhysBits", sev.reduced_phys_bits, UintFormat::Decimal);
                el.push_uint_child("policy", sev.policy, UintFormat::HEX4);
                el.push_text_child("dhCert", sev.dh_cert.as_deref());
                el.push_text_child("session", sev.session.as_deref());
            }
            LaunchSecurity::SevSnp(snp) => {
                el.set_opt_attr("kernelHashes", snp.kernel_hashes.as_deref());
                el.set_opt_attr("authorKey", snp.author_key.as_deref());
                el.set_opt_attr("vcek", snp.vcek.as_deref());
                el.push_uint_child("cbitpos", snp.cbitpos, UintFormat::Decimal);
                el.push_uint_child("reducedPhysBits", snp.reduced_phys_bits, UintFormat::Decimal);
                el.push_uint_child("policy", snp.policy, UintFormat::HEX8);
                el.push_text_child("guestVisibleWorkarounds", snp.guest_visible_workarounds.as_deref());
                el.push_text_child("idBlock", snp.id_block.as_deref());
                el.push_text_child("idAuth", snp.id_auth.as_deref());
                el.push_text_child("hostData", snp.host_data.as_deref());
            }
            LaunchSecurity::S390Pv => {}
        }
        Ok(el)
    }
}

// =============================================================================
// DEVICES
// =============================================================================

impl XmlDecode for DomainDevices {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DomainDevices {
            emulator: el.child_text("emulator"),
            disks: ctx.children(el, "disk")?,
            controllers: ctx.children(el, "controller")?,
            leases: ctx.children(el, "lease")?,
            filesystems: ctx.children(el, "filesystem")?,
            interfaces: ctx.children(el, "interface")?,
            smartcards: ctx.children(el, "smartcard")?,
            serials: ctx.children(el, "serial")?,
            parallels: ctx.children(el, "parallel")?,
            consoles: ctx.children(el, "console")?,
            channels: ctx.children(el, "channel")?,
            inputs: ctx.children(el, "input")?,
            tpms: ctx.children(el, "tpm")?,
            graphics: ctx.children(el, "graphics")?,
            sounds: ctx.children(el, "sound")?,
            audios: ctx.children(el, "audio")?,
            videos: ctx.children(el, "video")?,
            hostdevs: ctx.children(el, "hostdev")?,
            redirdevs: ctx.children(el, "redirdev")?,
            redirfilters: ctx.children(el, "redirfilter")?,
            hubs: ctx.children(el, "hub")?,
            watchdogs: ctx.children(el, "watchdog")?,
            memballoon: ctx.child(el, "memballoon")?,
            rngs: ctx.children(el, "rng")?,
            nvram: ctx.child(el, "nvram")?,
            panics: ctx.children(el, "panic")?,
            shmems: ctx.children(el, "shmem")?,
            memorydevs: ctx.children(el, "memory")?,
            iommu: ctx.child(el, "iommu")?,
            vsock: ctx.child(el, "vsock")?,
            cryptos: ctx.children(el, "crypto")?,
            pstore: ctx.child(el, "pstore")?,
        })
    }
}

impl XmlEncode for DomainDevices {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("emulator", self.emulator.as_deref());
        el.push_all("disk", &self.disks)?;
        el.push_all("controller", &self.controllers)?;
        el.push_all("lease", &self.leases)?;
        el.push_all("filesystem", &self.filesystems)?;
        el.push_all("interface", &self.interfaces)?;
        el.push_all("smartcard", &self.smartcards)?;
        el.push_all("serial", &self.serials)?;
        el.push_all("parallel", &self.parallels)?;
        el.push_all("console", &self.consoles)?;
        el.push_all("channel", &self.channels)?;
        el.push_all("input", &self.inputs)?;
        el.push_all("tpm", &self.tpms)?;
        el.push_all("graphics", &self.graphics)?;
        el.push_all("sound", &self.sounds)?;
        el.push_all("audio", &self.audios)?;
        el.push_all("video", &self.videos)?;
        el.push_all("hostdev", &self.hostdevs)?;
        el.push_all("redirdev", &self.redirdevs)?;
        el.push_all("redirfilter", &self.redirfilters)?;
        el.push_all("hub", &self.hubs)?;
        el.push_all("watchdog", &self.watchdogs)?;
        el.push_opt("memballoon", self.memballoon.as_ref())?;
        el.push_all("rng", &self.rngs)?;
        el.push_opt("nvram", self.nvram.as_ref())?;
        el.push_all("panic", &self.panics)?;
        el.push_all("shmem", &self.shmems)?;
        el.push_all("memory", &self.memorydevs)?;
        el.push_opt("iommu", self.iommu.as_ref())?;
        el.push_opt("vsock", self.vsock.as_ref())?;
        el.push_all("crypto", &self.cryptos)?;
        el.push_opt("pstore", self.pstore.as_ref())?;
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::codec::tree::{parse, write};

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
    fn test_memory_and_vcpu() {
        let memory: Memory = decode(r#"<memory unit="KiB" dumpCore="off">1048576</memory>"#).unwrap();
        assert_eq!(memory.value, 1048576);
        assert_eq!(encode(&memory, "memory"), r#"<memory unit="KiB" dumpCore="off">1048576</memory>"#);

        let vcpu: Vcpu = decode(r#"<vcpu placement="static" current="2">4</vcpu>"#).unwrap();
        assert_eq!((vcpu.current, vcpu.value), (Some(2), 4));
        assert!(decode::<Vcpu>("<vcpu>four</vcpu>").is_err());
    }

    #[test]
    fn test_memory_backing() {
        let text = r#"<memoryBacking><hugepages><page size="1" unit="G" nodeset="0-3"/><page size="2048" unit="KiB"/></hugepages><locked/><source type="memfd"/><access mode="shared"/><allocation mode="immediate" threads="8"/><discard/></memoryBacking>"#;
        let backing: MemoryBacking = decode(text).unwrap();
        assert_eq!(backing.hugepages.as_ref().map(Vec::len), Some(2));
        assert!(backing.locked && backing.discard && !backing.nosharepages);
        assert_eq!(backing.allocation.as_ref().unwrap().threads, Some(8));
        assert_eq!(encode(&backing, "memoryBacking"), text);

        let default_pages: MemoryBacking = decode("<memoryBacking><hugepages/></memoryBacking>").unwrap();
        assert_eq!(default_pages.hugepages, Some(Vec::new()));
        assert_eq!(encode(&default_pages, "memoryBacking"), "<memoryBacking><hugepages/></memoryBacking>");
    }

    #[test]
    fn test_cputune() {
        let text = r#"<cputune><shares>2048</shares><period>1000000</period><quota>-1</quota><emulator_quota>-1</emulator_quota><vcpupin vcpu="0" cpuset="1-4,^2"/><vcpupin vcpu="1" cpuset="0,1"/><emulatorpin cpuset="1-3"/><iothreadpin iothread="1" cpuset="5,6"/><vcpusched vcpus="0-1" scheduler="fifo" priority="1"/><emulatorsched scheduler="idle"/><iothreadsched iothreads="2" scheduler="batch"/><cachetune vcpus="0-3"><cache id="0" level="3" type="both" size="3" unit="MiB"/><monitor level="3" vcpus="1"/></cachetune><memorytune vcpus="0-3"><node id="0" bandwidth="60"/></memorytune></cputune>"#;
        let tune: CpuTune = decode(text).unwrap();
        assert_eq!(tune.quota, Some(-1));
        assert_eq!(tune.vcpupins[0].cpuset, "1-4,^2");
        assert_eq!(tune.vcpuscheds[0].threads.as_deref(), Some("0-1"));
        assert_eq!(tune.iothreadscheds[0].threads.as_deref(), Some("2"));
        assert_eq!(tune.emulatorsched.as_ref().unwrap().threads, None);
        assert_eq!(tune.cachetunes[0].caches[0].cache_type, "both");
        assert_eq!(encode(&tune, "cputune"), text);

        let err = decode::<CpuTune>(r#"<cputune><vcpupin cpuset="1"/></cputune>"#).unwrap_err();
        assert_eq!(err.path(), Some("/vcpupin[1]"));
    }

    #[test]
    fn test_numatune_and_resource() {
        let text = r#"<numatune><memory mode="strict" nodeset="1-4,^3"/><memnode cellid="0" mode="preferred" nodeset="2"/></numatune>"#;
        let tune: NumaTune = decode(text).unwrap();
        assert_eq!(tune.memnodes[0].cellid, 0);
        assert_eq!(encode(&tune, "numatune"), text);

        let text = r#"<resource><partition>/virtualmachines/production</partition><fibrechannel appid="userId-vm01"/></resource>"#;
        let resource: Resource = decode(text).unwrap();
        assert_eq!(resource.partition.as_deref(), Some("/virtualmachines/production"));
        assert_eq!(encode(&resource, "resource"), text);
    }

    #[test]
    fn test_os_roundtrip() {
        let text = r#"<os firmware="efi"><type arch="x86_64" machine="q35">hvm</type><firmware><feature enabled="yes" name="secure-boot"/></firmware><loader readonly="yes" secure="yes" type="pflash">/usr/share/OVMF/OVMF_CODE.fd</loader><nvram template="/usr/share/OVMF/OVMF_VARS.fd"/><boot dev="hd"/><boot dev="network"/><bootmenu enable="yes" timeout="3000"/><smbios mode="sysinfo"/></os>"#;
        let os: DomainOs = decode(text).unwrap();
        assert_eq!(os.boot_devices, ["hd", "network"]);
        assert_eq!(os.nvram.as_ref().unwrap().path, None);
        assert_eq!(os.firmware_features[0].name, "secure-boot");
        assert_eq!(encode(&os, "os"), text);
    }

    #[test]
    fn test_boot_without_dev_is_error() {
        let err = decode::<DomainOs>("<os><boot/></os>").unwrap_err();
        assert_eq!(err.path(), Some("/boot[1]"));
    }

    #[test]
    fn test_features() {
        let text = r#"<features><pae/><acpi/><apic eoi="on"/><hyperv mode="custom"><relaxed state="on"/><spinlocks state="on" retries="8191"/><stimer state="on"><direct state="on"/></stimer><vendor_id state="on" value="KVM Hv"/></hyperv><kvm><hidden state="on"/><dirty-ring state="on" size="4096"/></kvm><vmport state="off"/><smm state="on"><tseg unit="MiB">48</tseg></smm><ioapic driver="kvm"/><async-teardown enabled="yes"/></features>"#;
        let features: Features = decode(text).unwrap();
        assert!(features.pae && features.acpi);
        let hyperv = features.hyperv.as_ref().unwrap();
        assert_eq!(hyperv.spinlocks.as_ref().unwrap().retries, Some(8191));
        assert_eq!(features.kvm.as_ref().unwrap().hidden, Some(FeatureState::on()));
        assert_eq!(encode(&features, "features"), text);
    }

    #[test]
    fn test_cpu_and_clock() {
        let cpu_text = r#"<cpu match="exact" mode="custom" check="partial"><model fallback="allow">Skylake-Client</model><vendor>Intel</vendor><topology sockets="1" dies="1" cores="2" threads="2"/><feature policy="require" name="vmx"/><feature policy="disable" name="hle"/></cpu>"#;
        let cpu: Cpu = decode(cpu_text).unwrap();
        assert_eq!(cpu.features.len(), 2);
        assert_eq!(cpu.topology.as_ref().unwrap().clusters, None);
        assert_eq!(encode(&cpu, "cpu"), cpu_text);

        let clock_text = r#"<clock offset="utc"><timer name="rtc" tickpolicy="catchup"><catchup threshold="123" slew="120" limit="10000"/></timer><timer name="hpet" present="no"/></clock>"#;
        let clock: Clock = decode(clock_text).unwrap();
        assert_eq!(clock.timers[1].present.as_deref(), Some("no"));
        assert_eq!(encode(&clock, "clock"), clock_text);
    }

    #[test]
    fn test_sev_policy_hex() {
        let sev = LaunchSecurity::Sev(SevLaunch {
            kernel_hashes: Some("yes".to_string()),
            cbitpos: Some(47),
            reduced_phys_bits: Some(1),
            policy: Some(3),
            ..SevLaunch::default()
        });
        let text = encode(&sev, "launchSecurity");
        assert_eq!(
            text,
            r#"<launchSecurity type="sev" kernelHashes="yes"><cbitpos>47</cbitpos><reducedPhysBits>1</reducedPhysBits><policy>0x0003</policy></launchSecurity>"#
        );
        assert_eq!(decode::<LaunchSecurity>(&text).unwrap(), sev);
    }

    #[test]
    fn test_sev_snp_policy_hex() {
        let snp = LaunchSecurity::SevSnp(SevSnpLaunch {
            policy: Some(0x30000),
            ..SevSnpLaunch::default()
        });
        let text = encode(&snp, "launchSecurity");
        assert_eq!(text, r#"<launchSecurity type="sev-snp"><policy>0x00030000</policy></launchSecurity>"#);
        assert_eq!(decode::<LaunchSecurity>(&text).unwrap(), snp);
    }

    #[test]
    fn test_launch_security_vocabulary() {
        let pv: LaunchSecurity = decode(r#"<launchSecurity type="s390-pv"/>"#).unwrap();
        assert_eq!(pv, LaunchSecurity::S390Pv);
        let err = decode::<LaunchSecurity>(r#"<launchSecurity type="tdx"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "launchSecurity", .. }));
        let err = decode::<LaunchSecurity>("<launchSecurity/>").unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { .. }));
    }

    #[test]
    fn test_sysinfo() {
        let text = r#"<sysinfo type="smbios"><bios><entry name="vendor">LENOVO</entry></bios><system><entry name="manufacturer">Fedora</entry></system><baseBoard><entry name="product">20BE0061MC</entry></baseBoard><oemStrings><entry>myappname:some arbitrary data</entry></oemStrings></sysinfo>"#;
        let sysinfo: SysInfo = decode(text).unwrap();
        match &sysinfo {
            SysInfo::Smbios(smbios) => {
                assert_eq!(smbios.base_boards.len(), 1);
                assert_eq!(smbios.oem_strings.len(), 1);
            }
            other => panic!("unexpected variant {:?}", other),
        }
        assert_eq!(encode(&sysinfo, "sysinfo"), text);

        let fwcfg = r#"<sysinfo type="fwcfg"><entry name="opt/com.example/name">example value</entry><entry name="opt/com.example/config" file="/tmp/provision.ign"/></sysinfo>"#;
        let sysinfo: SysInfo = decode(fwcfg).unwrap();
        assert_eq!(encode(&sysinfo, "sysinfo"), fwcfg);
    }

    #[test]
    fn test_empty_hypervisor_type_rejected() {
        let err = Domain::default().to_element("domain").unwrap_err();
        assert!(matches!(err, EncodeError::InvalidValue { field: "domain type", .. }));
    }

    #[test]
    fn test_missing_hypervisor_type() {
        let err = decode::<Domain>("<domain><name>x</name></domain>").unwrap_err();
        assert!(matches!(err, DecodeError::MissingAttribute { .. }));
    }
}
