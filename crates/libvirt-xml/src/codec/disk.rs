//! Disk codecs.
//!
//! The source kind is read from the owner's `type` attribute before the
//! `<source>` element is looked at, so a disk without a source still decodes
//! to the kind its `type` names. On encode, file, block, dir and volume
//! sources that carry nothing are left out.

use crate::codec::chardev::typed_source;
use crate::codec::common::device_address;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant::{self, Discriminant};
use crate::error::{DecodeError, EncodeError};
use crate::model::chardev::ChardevSource;
use crate::model::disk::*;

// =============================================================================
// SOURCE
// =============================================================================

/// Decodes the `<source>` child of `owner` as a source of kind `kind`.
pub(crate) fn disk_source(
    owner: &Element,
    kind: &str,
    group: &Discriminant,
    ctx: &mut DecodeContext<'_>,
) -> Result<DiskSource, DecodeError> {
    if !is_known_kind(kind) {
        return Err(ctx.unknown_discriminant(group, kind));
    }
    match owner.child("source") {
        Some(src) => ctx.scoped("source", |ctx| decode_source(kind, src, ctx)),
        None => Ok(DiskSource::new(empty_kind(kind))),
    }
}

fn is_known_kind(kind: &str) -> bool {
    matches!(
        kind,
        "file" | "block" | "dir" | "network" | "volume" | "nvme" | "vhostuser" | "vhostvdpa"
    )
}

fn empty_kind(kind: &str) -> DiskSourceKind {
    match kind {
        "block" => DiskSourceKind::Block(DiskSourceBlock::default()),
        "dir" => DiskSourceKind::Dir(DiskSourceDir::default()),
        "network" => DiskSourceKind::Network(DiskSourceNetwork::default()),
        "volume" => DiskSourceKind::Volume(DiskSourceVolume::default()),
        "nvme" => DiskSourceKind::Nvme(NvmeSource::default()),
        "vhostuser" => DiskSourceKind::VhostUser(ChardevSource::Unix(Default::default())),
        "vhostvdpa" => DiskSourceKind::VhostVdpa(DiskSourceVhostVdpa::default()),
        _ => DiskSourceKind::File(DiskSourceFile::default()),
    }
}

fn decode_source(kind: &str, src: &Element, ctx: &mut DecodeContext<'_>) -> Result<DiskSource, DecodeError> {
    let kind = match kind {
        "file" => DiskSourceKind::File(DiskSourceFile {
            file: src.attr_string("file"),
            fdgroup: src.attr_string("fdgroup"),
            seclabels: ctx.children(src, "seclabel")?,
        }),
        "block" => DiskSourceKind::Block(DiskSourceBlock {
            dev: src.attr_string("dev"),
            seclabels: ctx.children(src, "seclabel")?,
        }),
        "dir" => DiskSourceKind::Dir(DiskSourceDir {
            dir: src.attr_string("dir"),
        }),
        "network" => DiskSourceKind::Network(DiskSourceNetwork::from_element(src, ctx)?),
        "volume" => DiskSourceKind::Volume(DiskSourceVolume {
            pool: src.attr_string("pool"),
            volume: src.attr_string("volume"),
            mode: src.attr_string("mode"),
            seclabels: ctx.children(src, "seclabel")?,
        }),
        "nvme" => DiskSourceKind::Nvme(NvmeSource::from_element(src, ctx)?),
        "vhostuser" => DiskSourceKind::VhostUser(typed_source(src, ctx, &variant::CHARDEV_UNIX)?),
        _ => DiskSourceKind::VhostVdpa(DiskSourceVhostVdpa {
            dev: src.attr_string("dev").unwrap_or_default(),
        }),
    };
    Ok(DiskSource {
        kind,
        startup_policy: src.attr_string("startupPolicy"),
        index: ctx.uint_attr(src, "index", Radix::Decimal)?,
        encryption: ctx.child(src, "encryption")?,
        reservations: ctx.child(src, "reservations")?,
        slices: match src.child("slices") {
            Some(slices) => ctx.scoped("slices", |ctx| ctx.children(slices, "slice"))?,
            None => Vec::new(),
        },
        ssl: src.child_attr("ssl", "verify"),
        cookies: match src.child("cookies") {
            Some(cookies) => ctx.scoped("cookies", |ctx| ctx.children(cookies, "cookie"))?,
            None => Vec::new(),
        },
        readahead: src.child_attr("readahead", "size"),
        timeout: src.child_attr("timeout", "seconds"),
        data_store: ctx.child::<DiskDataStore>(src, "dataStore")?.map(Box::new),
    })
}

/// Returns true when the source carries nothing and is left out on encode.
fn is_elided(source: &DiskSource) -> bool {
    let kind_empty = match &source.kind {
        DiskSourceKind::File(file) => file.file.is_none() && file.fdgroup.is_none() && file.seclabels.is_empty(),
        DiskSourceKind::Block(block) => block.dev.is_none() && block.seclabels.is_empty(),
        DiskSourceKind::Dir(dir) => dir.dir.is_none(),
        DiskSourceKind::Volume(volume) => {
            volume.pool.is_none() && volume.volume.is_none() && volume.mode.is_none() && volume.seclabels.is_empty()
        }
        _ => false,
    };
    kind_empty
        && source.startup_policy.is_none()
        && source.index.is_none()
        && source.encryption.is_none()
        && source.reservations.is_none()
        && source.slices.is_empty()
        && source.ssl.is_none()
        && source.cookies.is_empty()
        && source.readahead.is_none()
        && source.timeout.is_none()
        && source.data_store.is_none()
}

/// Builds the `<source>` element, or `None` when it is elided.
pub(crate) fn disk_source_element(source: &DiskSource, name: &str) -> Result<Option<Element>, EncodeError> {
    if is_elided(source) {
        return Ok(None);
    }
    let mut el = match &source.kind {
        DiskSourceKind::File(file) => {
            let mut el = Element::new(name);
            el.set_opt_attr("file", file.file.as_deref());
            el.set_opt_attr("fdgroup", file.fdgroup.as_deref());
            el.push_all("seclabel", &file.seclabels)?;
            el
        }
        DiskSourceKind::Block(block) => {
            let mut el = Element::new(name);
            el.set_opt_attr("dev", block.dev.as_deref());
            el.push_all("seclabel", &block.seclabels)?;
            el
        }
        DiskSourceKind::Dir(dir) => {
            let mut el = Element::new(name);
            el.set_opt_attr("dir", dir.dir.as_deref());
            el
        }
        DiskSourceKind::Network(network) => network.to_element(name)?,
        DiskSourceKind::Volume(volume) => {
            let mut el = Element::new(name);
            el.set_opt_attr("pool", volume.pool.as_deref());
            el.set_opt_attr("volume", volume.volume.as_deref());
            el.set_opt_attr("mode", volume.mode.as_deref());
            el.push_all("seclabel", &volume.seclabels)?;
            el
        }
        DiskSourceKind::Nvme(nvme) => nvme.to_element(name)?,
        DiskSourceKind::VhostUser(chardev) => chardev.to_element(name)?,
        DiskSourceKind::VhostVdpa(vdpa) => {
            let mut el = Element::new(name);
            el.set_attr("dev", &vdpa.dev);
            el
        }
    };
    el.set_opt_attr("startupPolicy", source.startup_policy.as_deref());
    el.set_uint("index", source.index, UintFormat::Decimal);
    el.push_opt("encryption", source.encryption.as_ref())?;
    el.push_opt("reservations", source.reservations.as_ref())?;
    if !source.slices.is_empty() {
        let mut slices = Element::new("slices");
        slices.push_all("slice", &source.slices)?;
        el.push(slices);
    }
    el.push_attr_child("ssl", "verify", source.ssl.as_deref());
    if !source.cookies.is_empty() {
        let mut cookies = Element::new("cookies");
        cookies.push_all("cookie", &source.cookies)?;
        el.push(cookies);
    }
    el.push_attr_child("readahead", "size", source.readahead.as_deref());
    el.push_attr_child("timeout", "seconds", source.timeout.as_deref());
    el.push_opt("dataStore", source.data_store.as_deref())?;
    Ok(Some(el))
}

pub(crate) fn push_disk_source(el: &mut Element, source: Option<&DiskSource>) -> Result<(), EncodeError> {
    if let Some(source) = source {
        if let Some(child) = disk_source_element(source, "source")? {
            el.push(child);
        }
    }
    Ok(())
}

impl XmlDecode for DiskSourceNetwork {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskSourceNetwork {
            protocol: el.attr_string("protocol"),
            name: el.attr_string("name"),
            query: el.attr_string("query"),
            tls: el.attr_string("tls"),
            tls_hostname: el.attr_string("tlsHostname"),
            hosts: ctx.children(el, "host")?,
            identity: ctx.child(el, "identity")?,
            known_hosts: el.child_attr("knownHosts", "path"),
            initiator_iqn: el
                .child("initiator")
                .and_then(|initiator| initiator.child_attr("iqn", "name")),
            snapshot: el.child_attr("snapshot", "name"),
            config: el.child_attr("config", "file"),
            reconnect_delay: el.child_attr("reconnect", "delay"),
            auth: ctx.child(el, "auth")?,
        })
    }
}

impl XmlEncode for DiskSourceNetwork {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("protocol", self.protocol.as_deref());
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("query", self.query.as_deref());
        el.set_opt_attr("tls", self.tls.as_deref());
        el.set_opt_attr("tlsHostname", self.tls_hostname.as_deref());
        el.push_all("host", &self.hosts)?;
        el.push_opt("identity", self.identity.as_ref())?;
        el.push_attr_child("knownHosts", "path", self.known_hosts.as_deref());
        if let Some(iqn) = &self.initiator_iqn {
            let mut initiator = Element::new("initiator");
            initiator.push_attr_child("iqn", "name", Some(iqn));
            el.push(initiator);
        }
        el.push_attr_child("snapshot", "name", self.snapshot.as_deref());
        el.push_attr_child("config", "file", self.config.as_deref());
        el.push_attr_child("reconnect", "delay", self.reconnect_delay.as_deref());
        el.push_opt("auth", self.auth.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for DiskSourceHost {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskSourceHost {
            transport: el.attr_string("transport"),
            name: el.attr_string("name"),
            port: el.attr_string("port"),
            socket: el.attr_string("socket"),
        })
    }
}

impl XmlEncode for DiskSourceHost {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("transport", self.transport.as_deref());
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("port", self.port.as_deref());
        el.set_opt_attr("socket", self.socket.as_deref());
        Ok(el)
    }
}

impl XmlDecode for DiskNetworkIdentity {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskNetworkIdentity {
            user: el.attr_string("user"),
            group: el.attr_string("group"),
            username: el.attr_string("username"),
            keyfile: el.attr_string("keyfile"),
            agentsock: el.attr_string("agentsock"),
        })
    }
}

impl XmlEncode for DiskNetworkIdentity {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("user", self.user.as_deref());
        el.set_opt_attr("group", self.group.as_deref());
        el.set_opt_attr("username", self.username.as_deref());
        el.set_opt_attr("keyfile", self.keyfile.as_deref());
        el.set_opt_attr("agentsock", self.agentsock.as_deref());
        Ok(el)
    }
}

impl XmlDecode for NvmeSource {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        match variant::NVME_SOURCE.select(el, ctx)? {
            "pci" => Ok(NvmeSource::Pci(NvmePciSource {
                managed: el.attr_string("managed"),
                namespace: ctx.uint_attr(el, "namespace", Radix::Decimal)?,
                address: ctx.child(el, "address")?,
            })),
            other => Err(ctx.unknown_discriminant(&variant::NVME_SOURCE, other)),
        }
    }
}

impl XmlEncode for NvmeSource {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            NvmeSource::Pci(pci) => {
                el.set_opt_attr("managed", pci.managed.as_deref());
                el.set_uint("namespace", pci.namespace, UintFormat::Decimal);
                el.push_opt("address", pci.address.as_ref())?;
            }
        }
        Ok(el)
    }
}

impl XmlDecode for DiskSlice {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskSlice {
            slice_type: ctx.required_attr(el, "type")?,
            offset: ctx.uint_attr(el, "offset", Radix::Decimal)?.unwrap_or_default(),
            size: ctx.uint_attr(el, "size", Radix::Decimal)?.unwrap_or_default(),
        })
    }
}

impl XmlEncode for DiskSlice {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", &self.slice_type);
        el.set_uint("offset", Some(self.offset), UintFormat::Decimal);
        el.set_uint("size", Some(self.size), UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for DiskCookie {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskCookie {
            name: ctx.required_attr(el, "name")?,
            value: el.text(),
        })
    }
}

impl XmlEncode for DiskCookie {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.push_text(&self.value);
        Ok(el)
    }
}

impl XmlDecode for DiskAuth {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskAuth {
            username: el.attr_string("username"),
            secret: ctx.child(el, "secret")?,
        })
    }
}

impl XmlEncode for DiskAuth {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("username", self.username.as_deref());
        el.push_opt("secret", self.secret.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for DiskEncryption {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskEncryption {
            format: el.attr_string("format"),
            engine: el.attr_string("engine"),
            secrets: ctx.children(el, "secret")?,
        })
    }
}

impl XmlEncode for DiskEncryption {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("format", self.format.as_deref());
        el.set_opt_attr("engine", self.engine.as_deref());
        el.push_all("secret", &self.secrets)?;
        Ok(el)
    }
}

impl XmlDecode for DiskReservations {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskReservations {
            enabled: el.attr_string("enabled"),
            managed: el.attr_string("managed"),
            source: ctx.child(el, "source")?,
        })
    }
}

impl XmlEncode for DiskReservations {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("enabled", self.enabled.as_deref());
        el.set_opt_attr("managed", self.managed.as_deref());
        el.push_opt("source", self.source.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// CHAINS
// =============================================================================

impl XmlDecode for DiskFormat {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let max_size = el.child("metadata_cache").and_then(|cache| cache.child("max_size"));
        Ok(DiskFormat {
            format_type: ctx.required_attr(el, "type")?,
            metadata_cache_max: match max_size {
                Some(max) => ctx.uint_content(max, Radix::Decimal)?,
                None => None,
            },
            metadata_cache_unit: max_size.and_then(|max| max.attr_string("unit")),
        })
    }
}

impl XmlEncode for DiskFormat {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", &self.format_type);
        if let Some(max) = self.metadata_cache_max {
            let mut size = Element::new("max_size");
            size.set_opt_attr("unit", self.metadata_cache_unit.as_deref());
            size.push_text(&max.to_string());
            let mut cache = Element::new("metadata_cache");
            cache.push(size);
            el.push(cache);
        }
        Ok(el)
    }
}

/// Reads a chain link's source. Without a `type` or a `<source>` the link
/// has no source.
pub(crate) fn chain_source(el: &Element, group: &Discriminant, ctx: &mut DecodeContext<'_>) -> Result<Option<DiskSource>, DecodeError> {
    if el.attr("type").is_none() && !el.has_child("source") {
        return Ok(None);
    }
    let kind = group.select(el, ctx)?;
    disk_source(el, kind, group, ctx).map(Some)
}

impl XmlDecode for DiskBackingStore {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskBackingStore {
            index: ctx.uint_attr(el, "index", Radix::Decimal)?,
            format: ctx.child(el, "format")?,
            source: chain_source(el, &variant::BACKING_STORE, ctx)?,
            backing_store: ctx.child::<DiskBackingStore>(el, "backingStore")?.map(Box::new),
        })
    }
}

impl XmlEncode for DiskBackingStore {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        if let Some(source) = &self.source {
            el.set_attr("type", source.kind.discriminant());
        }
        el.set_uint("index", self.index, UintFormat::Decimal);
        el.push_opt("format", self.format.as_ref())?;
        push_disk_source(&mut el, self.source.as_ref())?;
        el.push_opt("backingStore", self.backing_store.as_deref())?;
        Ok(el)
    }
}

impl XmlDecode for DiskDataStore {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskDataStore {
            format: ctx.child(el, "format")?,
            source: chain_source(el, &variant::BACKING_STORE, ctx)?,
        })
    }
}

impl XmlEncode for DiskDataStore {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        if let Some(source) = &self.source {
            el.set_attr("type", source.kind.discriminant());
        }
        el.push_opt("format", self.format.as_ref())?;
        push_disk_source(&mut el, self.source.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for DiskMirror {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let legacy = el.attr("type").is_none();
        let mut source = chain_source(el, &variant::DISK_MIRROR, ctx)?;
        let mut format: Option<DiskFormat> = ctx.child(el, "format")?;
        if legacy {
            // Older block jobs put the destination in attributes.
            if let Some(file) = el.attr_string("file") {
                match &mut source {
                    Some(DiskSource {
                        kind: DiskSourceKind::File(existing),
                        ..
                    }) if existing.file.is_none() => existing.file = Some(file),
                    Some(_) => {}
                    None => source = Some(DiskSource::file(&file)),
                }
            }
            if format.is_none() {
                format = el.attr_string("format").map(|format_type| DiskFormat {
                    format_type,
                    ..DiskFormat::default()
                });
            }
        }
        Ok(DiskMirror {
            job: el.attr_string("job"),
            ready: el.attr_string("ready"),
            format,
            source,
            backing_store: ctx.child(el, "backingStore")?,
        })
    }
}

impl XmlEncode for DiskMirror {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        if let Some(source) = &self.source {
            el.set_attr("type", source.kind.discriminant());
            if let DiskSourceKind::File(file) = &source.kind {
                el.set_opt_attr("file", file.file.as_deref());
                if let Some(format) = self.format.as_ref().filter(|format| !format.format_type.is_empty()) {
                    el.set_attr("format", &format.format_type);
                }
            }
        }
        el.set_opt_attr("job", self.job.as_deref());
        el.set_opt_attr("ready", self.ready.as_deref());
        el.push_opt("format", self.format.as_ref())?;
        push_disk_source(&mut el, self.source.as_ref())?;
        el.push_opt("backingStore", self.backing_store.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// DISK
// =============================================================================

impl XmlDecode for DiskDriver {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskDriver {
            name: el.attr_string("name"),
            driver_type: el.attr_string("type"),
            cache: el.attr_string("cache"),
            error_policy: el.attr_string("error_policy"),
            rerror_policy: el.attr_string("rerror_policy"),
            io: el.attr_string("io"),
            ioeventfd: el.attr_string("ioeventfd"),
            event_idx: el.attr_string("event_idx"),
            copy_on_read: el.attr_string("copy_on_read"),
            discard: el.attr_string("discard"),
            iothread: ctx.uint_attr(el, "iothread", Radix::Decimal)?,
            detect_zeroes: el.attr_string("detect_zeroes"),
            queues: ctx.uint_attr(el, "queues", Radix::Decimal)?,
            queue_size: ctx.uint_attr(el, "queue_size", Radix::Decimal)?,
            iommu: el.attr_string("iommu"),
            ats: el.attr_string("ats"),
            packed: el.attr_string("packed"),
        })
    }
}

impl XmlEncode for DiskDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("type", self.driver_type.as_deref());
        el.set_opt_attr("cache", self.cache.as_deref());
        el.set_opt_attr("error_policy", self.error_policy.as_deref());
        el.set_opt_attr("rerror_policy", self.rerror_policy.as_deref());
        el.set_opt_attr("io", self.io.as_deref());
        el.set_opt_attr("ioeventfd", self.ioeventfd.as_deref());
        el.set_opt_attr("event_idx", self.event_idx.as_deref());
        el.set_opt_attr("copy_on_read", self.copy_on_read.as_deref());
        el.set_opt_attr("discard", self.discard.as_deref());
        el.set_uint("iothread", self.iothread, UintFormat::Decimal);
        el.set_opt_attr("detect_zeroes", self.detect_zeroes.as_deref());
        el.set_uint("queues", self.queues, UintFormat::Decimal);
        el.set_uint("queue_size", self.queue_size, UintFormat::Decimal);
        el.set_opt_attr("iommu", self.iommu.as_deref());
        el.set_opt_attr("ats", self.ats.as_deref());
        el.set_opt_attr("packed", self.packed.as_deref());
        Ok(el)
    }
}

impl XmlDecode for DiskTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskTarget {
            dev: el.attr_string("dev"),
            bus: el.attr_string("bus"),
            tray: el.attr_string("tray"),
            removable: el.attr_string("removable"),
            rotation_rate: ctx.uint_attr(el, "rotation_rate", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for DiskTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("dev", self.dev.as_deref());
        el.set_opt_attr("bus", self.bus.as_deref());
        el.set_opt_attr("tray", self.tray.as_deref());
        el.set_opt_attr("removable", self.removable.as_deref());
        el.set_uint("rotation_rate", self.rotation_rate, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for DiskGeometry {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskGeometry {
            cylinders: ctx.uint_attr(el, "cyls", Radix::Decimal)?.unwrap_or_default(),
            heads: ctx.uint_attr(el, "heads", Radix::Decimal)?.unwrap_or_default(),
            sectors: ctx.uint_attr(el, "secs", Radix::Decimal)?.unwrap_or_default(),
            trans: el.attr_string("trans"),
        })
    }
}

impl XmlEncode for DiskGeometry {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("cyls", Some(self.cylinders), UintFormat::Decimal);
        el.set_uint("heads", Some(self.heads), UintFormat::Decimal);
        el.set_uint("secs", Some(self.sectors), UintFormat::Decimal);
        el.set_opt_attr("trans", self.trans.as_deref());
        Ok(el)
    }
}

impl XmlDecode for DiskBlockIo {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskBlockIo {
            logical_block_size: ctx.uint_attr(el, "logical_block_size", Radix::Decimal)?,
            physical_block_size: ctx.uint_attr(el, "physical_block_size", Radix::Decimal)?,
            discard_granularity: ctx.uint_attr(el, "discard_granularity", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for DiskBlockIo {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("logical_block_size", self.logical_block_size, UintFormat::Decimal);
        el.set_uint("physical_block_size", self.physical_block_size, UintFormat::Decimal);
        el.set_uint("discard_granularity", self.discard_granularity, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for DiskIoTune {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DiskIoTune {
            total_bytes_sec: ctx.uint_text(el, "total_bytes_sec", Radix::Decimal)?,
            read_bytes_sec: ctx.uint_text(el, "read_bytes_sec", Radix::Decimal)?,
            write_bytes_sec: ctx.uint_text(el, "write_bytes_sec", Radix::Decimal)?,
            total_iops_sec: ctx.uint_text(el, "total_iops_sec", Radix::Decimal)?,
            read_iops_sec: ctx.uint_text(el, "read_iops_sec", Radix::Decimal)?,
            write_iops_sec: ctx.uint_text(el, "write_iops_sec", Radix::Decimal)?,
            total_bytes_sec_max: ctx.uint_text(el, "total_bytes_sec_max", Radix::Decimal)?,
            total_iops_sec_max: ctx.uint_text(el, "total_iops_sec_max", Radix::Decimal)?,
            size_iops_sec: ctx.uint_text(el, "size_iops_sec", Radix::Decimal)?,
            group_name: el.child_text("group_name"),
        })
    }
}

impl XmlEncode for DiskIoTune {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_uint_child("total_bytes_sec", self.total_bytes_sec, UintFormat::Decimal);
        el.push_uint_child("read_bytes_sec", self.read_bytes_sec, UintFormat::Decimal);
        el.push_uint_child("write_bytes_sec", self.write_bytes_sec, UintFormat::Decimal);
        el.push_uint_child("total_iops_sec", self.total_iops_sec, UintFormat::Decimal);
        el.push_uint_child("read_iops_sec", self.read_iops_sec, UintFormat::Decimal);
        el.push_uint_child("write_iops_sec", self.write_iops_sec, UintFormat::Decimal);
        el.push_uint_child("total_bytes_sec_max", self.total_bytes_sec_max, UintFormat::Decimal);
        el.push_uint_child("total_iops_sec_max", self.total_iops_sec_max, UintFormat::Decimal);
        el.push_uint_child("size_iops_sec", self.size_iops_sec, UintFormat::Decimal);
        el.push_text_child("group_name", self.group_name.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Disk {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = variant::DISK_SOURCE.select(el, ctx)?;
        let source = disk_source(el, kind, &variant::DISK_SOURCE, ctx)?;
        Ok(Disk {
            device: el.attr_string("device"),
            rawio: el.attr_string("rawio"),
            sgio: el.attr_string("sgio"),
            snapshot: el.attr_string("snapshot"),
            model: el.attr_string("model"),
            driver: ctx.child(el, "driver")?,
            auth: ctx.child(el, "auth")?,
            source: Some(source),
            backing_store: ctx.child(el, "backingStore")?,
            backend_domain: el.child_attr("backenddomain", "name"),
            geometry: ctx.child(el, "geometry")?,
            blockio: ctx.child(el, "blockio")?,
            mirror: ctx.child(el, "mirror")?,
            target: ctx.child(el, "target")?,
            iotune: ctx.child(el, "iotune")?,
            readonly: el.has_child("readonly"),
            shareable: el.has_child("shareable"),
            transient: el.child("transient").map(|transient| DiskTransient {
                share_backing: transient.attr_string("shareBacking"),
            }),
            serial: el.child_text("serial"),
            wwn: el.child_text("wwn"),
            vendor: el.child_text("vendor"),
            product: el.child_text("product"),
            encryption: ctx.child(el, "encryption")?,
            boot: ctx.child(el, "boot")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Disk {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        if let Some(source) = &self.source {
            el.set_attr("type", source.kind.discriminant());
        }
        el.set_opt_attr("device", self.device.as_deref());
        el.set_opt_attr("rawio", self.rawio.as_deref());
        el.set_opt_attr("sgio", self.sgio.as_deref());
        el.set_opt_attr("snapshot", self.snapshot.as_deref());
        el.set_opt_attr("model", self.model.as_deref());
        el.push_opt("driver", self.driver.as_ref())?;
        el.push_opt("auth", self.auth.as_ref())?;
        push_disk_source(&mut el, self.source.as_ref())?;
        el.push_opt("backingStore", self.backing_store.as_ref())?;
        el.push_attr_child("backenddomain", "name", self.backend_domain.as_deref());
        el.push_opt("geometry", self.geometry.as_ref())?;
        el.push_opt("blockio", self.blockio.as_ref())?;
        el.push_opt("mirror", self.mirror.as_ref())?;
        el.push_opt("target", self.target.as_ref())?;
        el.push_opt("iotune", self.iotune.as_ref())?;
        el.push_flag("readonly", self.readonly);
        el.push_flag("shareable", self.shareable);
        if let Some(transient) = &self.transient {
            let mut child = Element::new("transient");
            child.set_opt_attr("shareBacking", transient.share_backing.as_deref());
            el.push(child);
        }
        el.push_text_child("serial", self.serial.as_deref());
        el.push_text_child("wwn", self.wwn.as_deref());
        el.push_text_child("vendor", self.vendor.as_deref());
        el.push_text_child("product", self.product.as_deref());
        el.push_opt("encryption", self.encryption.as_ref())?;
        el.push_opt("boot", self.boot.as_ref())?;
        el.push_opt("acpi", self.acpi.as_ref())?;
        el.push_opt("alias", self.alias.as_ref())?;
        el.push_opt("address", self.address.as_ref())?;
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::codec::tree::{parse, write};

    fn decode(text: &str) -> Result<Disk, DecodeError> {
        let root = parse(text).unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        ctx.decode_at(&root, "disk")
    }

    fn encode(disk: &Disk) -> String {
        write(&disk.to_element("disk").unwrap(), &EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_block_disk() {
        let disk = Disk {
            source: Some(DiskSource::block("/dev/sda")),
            ..Disk::default()
        };
        let text = encode(&disk);
        assert_eq!(text, r#"<disk type="block"><source dev="/dev/sda"/></disk>"#);

        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, disk);
        let source = decoded.source.unwrap();
        assert!(source.encryption.is_none());
        assert!(source.reservations.is_none());
    }

    #[test]
    fn test_missing_source_follows_type() {
        let disk = decode(r#"<disk type="volume" device="cdrom"><target dev="hdc" bus="ide"/><readonly/></disk>"#).unwrap();
        assert_eq!(
            disk.source,
            Some(DiskSource::new(DiskSourceKind::Volume(DiskSourceVolume::default())))
        );
        assert!(disk.readonly);
        assert_eq!(
            encode(&disk),
            r#"<disk type="volume" device="cdrom"><target dev="hdc" bus="ide"/><readonly/></disk>"#
        );
    }

    #[test]
    fn test_default_type_is_file() {
        let disk = decode(r#"<disk device="disk"><source file="/var/lib/images/a.qcow2"/></disk>"#).unwrap();
        assert_eq!(disk.source, Some(DiskSource::file("/var/lib/images/a.qcow2")));
    }

    #[test]
    fn test_startup_policy_keeps_source() {
        let mut source = DiskSource::new(DiskSourceKind::File(DiskSourceFile::default()));
        source.startup_policy = Some("optional".to_string());
        let disk = Disk {
            source: Some(source),
            ..Disk::default()
        };
        assert_eq!(encode(&disk), r#"<disk type="file"><source startupPolicy="optional"/></disk>"#);
    }

    #[test]
    fn test_network_source() {
        let text = r#"<disk type="network" device="disk"><driver name="qemu" type="raw"/><source protocol="rbd" name="pool/image"><host name="mon1" port="6789"/><host name="mon2" port="6789"/><auth username="admin"><secret type="ceph" usage="client.admin"/></auth></source><target dev="vda" bus="virtio"/></disk>"#;
        let disk = decode(text).unwrap();
        match &disk.source.as_ref().unwrap().kind {
            DiskSourceKind::Network(network) => {
                assert_eq!(network.protocol.as_deref(), Some("rbd"));
                assert_eq!(network.hosts.len(), 2);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(encode(&disk), text);
    }

    #[test]
    fn test_nvme_source() {
        let text = r#"<disk type="nvme" device="disk"><source type="pci" managed="yes" namespace="1"><address domain="0x0000" bus="0x01" slot="0x00" function="0x0"/></source></disk>"#;
        let disk = decode(text).unwrap();
        assert_eq!(encode(&disk), text);

        let err = decode(r#"<disk type="nvme"><source type="rdma"/></disk>"#).unwrap_err();
        assert_eq!(err.path(), Some("/disk/source"));
    }

    #[test]
    fn test_vhostuser_defaults_to_unix() {
        let disk = decode(r#"<disk type="vhostuser" device="disk"><source path="/tmp/vhost-blk.sock"/></disk>"#).unwrap();
        assert_eq!(
            disk.source.unwrap().kind,
            DiskSourceKind::VhostUser(ChardevSource::Unix(crate::model::chardev::ChardevUnix {
                path: Some("/tmp/vhost-blk.sock".to_string()),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn test_backing_chain() {
        let text = r#"<disk type="file"><source file="/img/top.qcow2"/><backingStore type="file" index="1"><format type="qcow2"/><source file="/img/base.qcow2"/><backingStore/></backingStore></disk>"#;
        let disk = decode(text).unwrap();
        let backing = disk.backing_store.as_ref().unwrap();
        assert_eq!(backing.index, Some(1));
        assert_eq!(backing.source, Some(DiskSource::file("/img/base.qcow2")));
        let terminator = backing.backing_store.as_ref().unwrap();
        assert!(terminator.source.is_none());
        assert_eq!(encode(&disk), text);
    }

    #[test]
    fn test_mirror_legacy_attributes() {
        let disk = decode(r#"<disk type="file"><mirror file="/img/copy.raw" format="raw" job="copy"/></disk>"#).unwrap();
        let mirror = disk.mirror.unwrap();
        assert_eq!(mirror.source, Some(DiskSource::file("/img/copy.raw")));
        assert_eq!(mirror.format.unwrap().format_type, "raw");
        assert_eq!(mirror.job.as_deref(), Some("copy"));
    }

    #[test]
    fn test_unknown_disk_type() {
        let err = decode(r#"<disk type="floppy"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "disk", .. }));
        assert_eq!(err.path(), Some("/disk"));
    }

    #[test]
    fn test_reservations_source_is_typed() {
        let text = r#"<disk type="block"><source dev="/dev/mapper/lun"><reservations managed="no"><source type="unix" mode="client" path="/run/pr.sock"/></reservations></source></disk>"#;
        let disk = decode(text).unwrap();
        let reservations = disk.source.as_ref().unwrap().reservations.as_ref().unwrap();
        assert_eq!(
            reservations.source,
            Some(ChardevSource::unix("/run/pr.sock", "client"))
        );
        assert_eq!(encode(&disk), text);
    }
}
