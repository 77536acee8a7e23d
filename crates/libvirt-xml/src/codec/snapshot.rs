//! Codec for domain snapshots.

use crate::codec::disk::{chain_source, push_disk_source};
use crate::codec::document::Document;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::domain::Domain;
use crate::model::snapshot::*;

impl Document for DomainSnapshot {
    const ROOT: &'static str = "domainsnapshot";
}

impl XmlDecode for DomainSnapshot {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DomainSnapshot {
            name: el.child_text("name"),
            description: el.child_text("description"),
            state: el.child_text("state"),
            creation_time: ctx.uint_text(el, "creationTime", Radix::Decimal)?,
            parent: el.child("parent").and_then(|parent| parent.child_text("name")),
            memory: ctx.child(el, "memory")?,
            disks: ctx.wrapped_children(el, "disks", "disk")?,
            domain: ctx.child::<Domain>(el, "domain")?.map(Box::new),
            inactive_domain: ctx.child::<Domain>(el, "inactiveDomain")?.map(Box::new),
            active: ctx.uint_text(el, "active", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for DomainSnapshot {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("name", self.name.as_deref());
        el.push_text_child("description", self.description.as_deref());
        el.push_text_child("state", self.state.as_deref());
        el.push_uint_child("creationTime", self.creation_time, UintFormat::Decimal);
        if let Some(parent) = &self.parent {
            let mut inner = Element::new("parent");
            inner.push_text_child("name", Some(parent));
            el.push(inner);
        }
        el.push_opt("memory", self.memory.as_ref())?;
        el.push_wrapped("disks", "disk", &self.disks)?;
        el.push_opt("domain", self.domain.as_deref())?;
        el.push_opt("inactiveDomain", self.inactive_domain.as_deref())?;
        el.push_uint_child("active", self.active, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for SnapshotMemory {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SnapshotMemory {
            snapshot: el.attr_string("snapshot"),
            file: el.attr_string("file"),
        })
    }
}

impl XmlEncode for SnapshotMemory {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("snapshot", self.snapshot.as_deref());
        el.set_opt_attr("file", self.file.as_deref());
        Ok(el)
    }
}

impl XmlDecode for SnapshotDisk {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SnapshotDisk {
            name: ctx.required_attr(el, "name")?,
            snapshot: el.attr_string("snapshot"),
            driver_type: el.child_attr("driver", "type"),
            source: chain_source(el, &variant::SNAPSHOT_DISK, ctx)?,
        })
    }
}

impl XmlEncode for SnapshotDisk {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_opt_attr("snapshot", self.snapshot.as_deref());
        if let Some(source) = &self.source {
            el.set_attr("type", source.kind.discriminant());
        }
        el.push_attr_child("driver", "type", self.driver_type.as_deref());
        push_disk_source(&mut el, self.source.as_ref())?;
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::model::disk::{DiskSource, DiskSourceKind};

    fn compact(snapshot: &DomainSnapshot) -> String {
        snapshot.encode_with_options(&EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_external_snapshot_roundtrip() {
        let text = concat!(
            r#"<domainsnapshot><name>before-upgrade</name><description>pre 6.2</description><state>running</state>"#,
            r#"<creationTime>1697712000</creationTime><parent><name>base</name></parent>"#,
            r#"<memory snapshot="external" file="/var/lib/libvirt/qemu/snap/mem.save"/>"#,
            r#"<disks><disk name="vda" snapshot="external" type="file"><driver type="qcow2"/><source file="/var/lib/libvirt/images/vda.snap"/></disk>"#,
            r#"<disk name="vdb" snapshot="no"/></disks>"#,
            r#"<domain type="kvm"><name>web01</name></domain><active>1</active></domainsnapshot>"#
        );
        let snapshot = DomainSnapshot::decode(text).unwrap();
        assert_eq!(snapshot.creation_time, Some(1697712000));
        assert_eq!(snapshot.parent.as_deref(), Some("base"));
        assert_eq!(snapshot.disks[0].source, Some(DiskSource::file("/var/lib/libvirt/images/vda.snap")));
        assert_eq!(snapshot.disks[1].source, None);
        assert_eq!(snapshot.domain.as_ref().unwrap().name.as_deref(), Some("web01"));
        assert_eq!(compact(&snapshot), text);
    }

    #[test]
    fn test_disk_source_kind_from_type() {
        let text = r#"<domainsnapshot><disks><disk name="sda" snapshot="external" type="block"><source dev="/dev/vg0/snap"/></disk></disks></domainsnapshot>"#;
        let snapshot = DomainSnapshot::decode(text).unwrap();
        assert_eq!(snapshot.disks[0].source, Some(DiskSource::block("/dev/vg0/snap")));
        assert_eq!(compact(&snapshot), text);

        let untyped = r#"<domainsnapshot><disks><disk name="vda"><source file="/a.qcow2"/></disk></disks></domainsnapshot>"#;
        let snapshot = DomainSnapshot::decode(untyped).unwrap();
        assert!(matches!(
            snapshot.disks[0].source.as_ref().map(|s| &s.kind),
            Some(DiskSourceKind::File(_))
        ));
    }

    #[test]
    fn test_unknown_disk_type() {
        let text = r#"<domainsnapshot><name>s</name><disks><disk name="vda" type="tape"/><disk name="vdb" snapshot="no"/></disks></domainsnapshot>"#;
        let err = DomainSnapshot::decode(text).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "snapshot disk", .. }));
        assert_eq!(err.path(), Some("/domainsnapshot/disks/disk[1]"));

        let snapshot = DomainSnapshot::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        assert_eq!(snapshot.disks.len(), 1);
        assert_eq!(snapshot.disks[0].name, "vdb");
    }

    #[test]
    fn test_embedded_domain_errors_carry_path() {
        let text = r#"<domainsnapshot><domain><name>x</name></domain></domainsnapshot>"#;
        let err = DomainSnapshot::decode(text).unwrap_err();
        assert_eq!(err.path(), Some("/domainsnapshot/domain"));
    }
}
