//! Codecs for storage pools and volumes.

use crate::codec::document::Document;
use crate::codec::namespace::{self, Extension};
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::extension::{FsMountOptions, RbdConfigOptions};
use crate::model::storage::*;

const POOL_EXTENSIONS: &[(&str, &str)] = &[
    (FsMountOptions::NAMESPACE, FsMountOptions::NAME),
    (RbdConfigOptions::NAMESPACE, RbdConfigOptions::NAME),
];

// =============================================================================
// POOL
// =============================================================================

impl Document for StoragePool {
    const ROOT: &'static str = "pool";
}

impl XmlDecode for StoragePool {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(StoragePool {
            pool_type: ctx.required_attr(el, "type")?,
            name: el.child_text("name"),
            uuid: el.child_text("uuid"),
            allocation: ctx.child(el, "allocation")?,
            capacity: ctx.child(el, "capacity")?,
            available: ctx.child(el, "available")?,
            cow: el.child("features").and_then(|features| features.child_attr("cow", "state")),
            source: ctx.child(el, "source")?,
            target: ctx.child(el, "target")?,
            refresh_allocation: el.child("refresh").and_then(|refresh| refresh.child_attr("volume", "allocation")),
            fs_mount_options: namespace::decode(el, ctx)?,
            rbd_config_options: namespace::decode(el, ctx)?,
            foreign: namespace::foreign(el, POOL_EXTENSIONS, ctx),
        })
    }
}

impl XmlEncode for StoragePool {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        if self.pool_type.is_empty() {
            return Err(EncodeError::InvalidValue {
                field: "pool type",
                reason: "pool type is empty".to_string(),
            });
        }
        let mut el = Element::new(name);
        el.set_attr("type", &self.pool_type);
        el.push_text_child("name", self.name.as_deref());
        el.push_text_child("uuid", self.uuid.as_deref());
        el.push_opt("allocation", self.allocation.as_ref())?;
        el.push_opt("capacity", self.capacity.as_ref())?;
        el.push_opt("available", self.available.as_ref())?;
        if let Some(state) = &self.cow {
            let mut features = Element::new("features");
            features.push_attr_child("cow", "state", Some(state));
            el.push(features);
        }
        el.push_opt("source", self.source.as_ref())?;
        el.push_opt("target", self.target.as_ref())?;
        if let Some(allocation) = &self.refresh_allocation {
            let mut refresh = Element::new("refresh");
            refresh.push_attr_child("volume", "allocation", Some(allocation));
            el.push(refresh);
        }
        namespace::push(&mut el, self.fs_mount_options.as_ref())?;
        namespace::push(&mut el, self.rbd_config_options.as_ref())?;
        namespace::finish_root(&mut el, &self.foreign);
        Ok(el)
    }
}

impl XmlDecode for Extent {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Extent {
            start: ctx.required_uint_attr(el, "start", Radix::Decimal)?,
            end: ctx.required_uint_attr(el, "end", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for Extent {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("start", Some(self.start), UintFormat::Decimal);
        el.set_uint("end", Some(self.end), UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for PoolDevice {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PoolDevice {
            path: ctx.required_attr(el, "path")?,
            part_separator: el.attr_string("part_separator"),
            free_extents: ctx.children(el, "freeExtent")?,
        })
    }
}

impl XmlEncode for PoolDevice {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("path", &self.path);
        el.set_opt_attr("part_separator", self.part_separator.as_deref());
        el.push_all("freeExtent", &self.free_extents)?;
        Ok(el)
    }
}

impl XmlDecode for PoolHost {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PoolHost {
            name: ctx.required_attr(el, "name")?,
            port: ctx.uint_attr(el, "port", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for PoolHost {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_uint("port", self.port, UintFormat::Decimal);
        Ok(el)
    }
}

fn auth_secret(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<PoolAuthSecret, DecodeError> {
    let username = ctx.required_attr(el, "username")?;
    let secret = ctx.scoped("secret", |ctx| {
        let secret = el.child("secret").ok_or_else(|| ctx.missing_element("secret"))?;
        match (secret.attr_string("usage"), secret.attr_string("uuid")) {
            (Some(usage), _) => Ok(PoolSecret::Usage(usage)),
            (None, Some(uuid)) => Ok(PoolSecret::Uuid(uuid)),
            (None, None) => Err(ctx.unexpected("secret has neither usage nor uuid")),
        }
    })?;
    Ok(PoolAuthSecret { username, secret })
}

impl XmlDecode for PoolAuth {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::POOL_AUTH.select(el, ctx)? {
            "chap" => PoolAuth::Chap(auth_secret(el, ctx)?),
            "ceph" => PoolAuth::Ceph(auth_secret(el, ctx)?),
            other => return Err(ctx.unknown_discriminant(&variant::POOL_AUTH, other)),
        })
    }
}

impl XmlEncode for PoolAuth {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let (PoolAuth::Chap(auth) | PoolAuth::Ceph(auth)) = self;
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        el.set_attr("username", &auth.username);
        let mut secret = Element::new("secret");
        match &auth.secret {
            PoolSecret::Usage(usage) => secret.set_attr("usage", usage),
            PoolSecret::Uuid(uuid) => secret.set_attr("uuid", uuid),
        }
        el.push(secret);
        Ok(el)
    }
}

impl XmlDecode for AdapterParentAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(AdapterParentAddress {
            unique_id: ctx.uint_attr(el, "unique_id", Radix::Decimal)?,
            address: ctx.child(el, "address")?,
        })
    }
}

impl XmlEncode for AdapterParentAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("unique_id", self.unique_id, UintFormat::Decimal);
        el.push_opt("address", self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for PoolAdapter {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::POOL_ADAPTER.select(el, ctx)? {
            "scsi_host" => PoolAdapter::ScsiHost(ScsiHostAdapter {
                name: el.attr_string("name"),
                parent_address: ctx.child(el, "parentaddr")?,
            }),
            "fc_host" => PoolAdapter::FcHost(FcHostAdapter {
                parent: el.attr_string("parent"),
                parent_wwnn: el.attr_string("parent_wwnn"),
                parent_wwpn: el.attr_string("parent_wwpn"),
                parent_fabric_wwn: el.attr_string("parent_fabric_wwn"),
                managed: el.attr_string("managed"),
                wwnn: el.attr_string("wwnn"),
                wwpn: el.attr_string("wwpn"),
            }),
            other => return Err(ctx.unknown_discriminant(&variant::POOL_ADAPTER, other)),
        })
    }
}

impl XmlEncode for PoolAdapter {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            PoolAdapter::ScsiHost(scsi) => {
                el.set_opt_attr("name", scsi.name.as_deref());
                el.push_opt("parentaddr", scsi.parent_address.as_ref())?;
            }
            PoolAdapter::FcHost(fc) => {
                el.set_opt_attr("parent", fc.parent.as_deref());
                el.set_opt_attr("parent_wwnn", fc.parent_wwnn.as_deref());
                el.set_opt_attr("parent_wwpn", fc.parent_wwpn.as_deref());
                el.set_opt_attr("parent_fabric_wwn", fc.parent_fabric_wwn.as_deref());
                el.set_opt_attr("managed", fc.managed.as_deref());
                el.set_opt_attr("wwnn", fc.wwnn.as_deref());
                el.set_opt_attr("wwpn", fc.wwpn.as_deref());
            }
        }
        Ok(el)
    }
}

impl XmlDecode for PoolSource {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PoolSource {
            name: el.child_text("name"),
            dir: el.child_attr("dir", "path"),
            devices: ctx.children(el, "device")?,
            hosts: ctx.children(el, "host")?,
            auth: ctx.child(el, "auth")?,
            vendor: el.child_attr("vendor", "name"),
            product: el.child_attr("product", "name"),
            format: el.child_attr("format", "type"),
            adapter: ctx.child(el, "adapter")?,
            initiator_iqn: el.child("initiator").and_then(|initiator| initiator.child_attr("iqn", "name")),
            protocol_version: el.child_attr("protocol", "ver"),
        })
    }
}

impl XmlEncode for PoolSource {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_all("host", &self.hosts)?;
        el.push_all("device", &self.devices)?;
        el.push_attr_child("dir", "path", self.dir.as_deref());
        el.push_text_child("name", self.name.as_deref());
        el.push_opt("auth", self.auth.as_ref())?;
        el.push_attr_child("vendor", "name", self.vendor.as_deref());
        el.push_attr_child("product", "name", self.product.as_deref());
        el.push_attr_child("format", "type", self.format.as_deref());
        el.push_opt("adapter", self.adapter.as_ref())?;
        if let Some(iqn) = &self.initiator_iqn {
            let mut initiator = Element::new("initiator");
            initiator.push_attr_child("iqn", "name", Some(iqn));
            el.push(initiator);
        }
        el.push_attr_child("protocol", "ver", self.protocol_version.as_deref());
        Ok(el)
    }
}

impl XmlDecode for PoolTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PoolTarget {
            path: el.child_text("path"),
            permissions: ctx.child(el, "permissions")?,
        })
    }
}

impl XmlEncode for PoolTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("path", self.path.as_deref());
        el.push_opt("permissions", self.permissions.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// VOLUME
// =============================================================================

impl Document for StorageVolume {
    const ROOT: &'static str = "volume";
}

impl XmlDecode for StorageVolume {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(StorageVolume {
            volume_type: el.attr_string("type"),
            name: el.child_text("name").ok_or_else(|| ctx.missing_element("name"))?,
            key: el.child_text("key"),
            source: ctx.wrapped_children(el, "source", "device")?,
            allocation: ctx.child(el, "allocation")?,
            capacity: ctx.child(el, "capacity")?,
            physical: ctx.child(el, "physical")?,
            target: ctx.child(el, "target")?,
            backing_store: ctx.child(el, "backingStore")?,
        })
    }
}

impl XmlEncode for StorageVolume {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.volume_type.as_deref());
        el.push_text_child("name", Some(&self.name));
        el.push_text_child("key", self.key.as_deref());
        el.push_wrapped("source", "device", &self.source)?;
        el.push_opt("allocation", self.allocation.as_ref())?;
        el.push_opt("capacity", self.capacity.as_ref())?;
        el.push_opt("physical", self.physical.as_ref())?;
        el.push_opt("target", self.target.as_ref())?;
        el.push_opt("backingStore", self.backing_store.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for VolumeDevice {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VolumeDevice {
            path: ctx.required_attr(el, "path")?,
            extents: ctx.children(el, "extent")?,
        })
    }
}

impl XmlEncode for VolumeDevice {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("path", &self.path);
        el.push_all("extent", &self.extents)?;
        Ok(el)
    }
}

impl XmlDecode for Timestamps {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Timestamps {
            atime: el.child_text("atime"),
            btime: el.child_text("btime"),
            ctime: el.child_text("ctime"),
            mtime: el.child_text("mtime"),
        })
    }
}

impl XmlEncode for Timestamps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("atime", self.atime.as_deref());
        el.push_text_child("btime", self.btime.as_deref());
        el.push_text_child("ctime", self.ctime.as_deref());
        el.push_text_child("mtime", self.mtime.as_deref());
        Ok(el)
    }
}

impl XmlDecode for VolumeTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VolumeTarget {
            path: el.child_text("path"),
            format: el.child_attr("format", "type"),
            permissions: ctx.child(el, "permissions")?,
            timestamps: ctx.child(el, "timestamps")?,
            encryption: ctx.child(el, "encryption")?,
            compat: el.child_text("compat"),
            cluster_size: ctx.child(el, "clusterSize")?,
            nocow: el.has_child("nocow"),
            lazy_refcounts: el.child("features").is_some_and(|features| features.has_child("lazy_refcounts")),
        })
    }
}

impl XmlEncode for VolumeTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("path", self.path.as_deref());
        el.push_attr_child("format", "type", self.format.as_deref());
        el.push_opt("permissions", self.permissions.as_ref())?;
        el.push_opt("timestamps", self.timestamps.as_ref())?;
        el.push_opt("encryption", self.encryption.as_ref())?;
        el.push_text_child("compat", self.compat.as_deref());
        el.push_opt("clusterSize", self.cluster_size.as_ref())?;
        el.push_flag("nocow", self.nocow);
        if self.lazy_refcounts {
            let mut features = Element::new("features");
            features.push_flag("lazy_refcounts", true);
            el.push(features);
        }
        Ok(el)
    }
}

impl XmlDecode for VolumeBackingStore {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VolumeBackingStore {
            path: el.child_text("path"),
            format: el.child_attr("format", "type"),
            permissions: ctx.child(el, "permissions")?,
        })
    }
}

impl XmlEncode for VolumeBackingStore {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("path", self.path.as_deref());
        el.push_attr_child("format", "type", self.format.as_deref());
        el.push_opt("permissions", self.permissions.as_ref())?;
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::EncodeOptions;
    use crate::model::common::{PciAddress, ScaledValue};

    fn compact<D: Document>(doc: &D) -> String {
        doc.encode_with_options(&EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_adapter_defaults_to_scsi_host() {
        let pool = StoragePool::decode(r#"<pool type="scsi"><name>vhbas</name><source><adapter name="host0"/></source></pool>"#).unwrap();
        let adapter = pool.source.as_ref().unwrap().adapter.as_ref().unwrap();
        assert_eq!(
            adapter,
            &PoolAdapter::ScsiHost(ScsiHostAdapter {
                name: Some("host0".to_string()),
                parent_address: None,
            })
        );
        assert!(compact(&pool).contains(r#"<adapter type="scsi_host" name="host0"/>"#));
    }

    #[test]
    fn test_adapter_parent_address_is_hex() {
        let mut pool = StoragePool::new("scsi", "pool");
        pool.source = Some(PoolSource {
            adapter: Some(PoolAdapter::ScsiHost(ScsiHostAdapter {
                name: None,
                parent_address: Some(AdapterParentAddress {
                    unique_id: Some(1),
                    address: Some(PciAddress::new(0, 0, 0x1f, 2)),
                }),
            })),
            ..PoolSource::default()
        });
        let text = compact(&pool);
        assert!(text.contains(
            r#"<parentaddr unique_id="1"><address domain="0x0000" bus="0x00" slot="0x1f" function="0x2"/></parentaddr>"#
        ));
        assert_eq!(StoragePool::decode(&text).unwrap(), pool);
    }

    #[test]
    fn test_auth_secret_lookup() {
        let text = r#"<pool type="rbd"><name>ceph</name><source><host name="mon1" port="6789"/><name>rbd</name><auth type="ceph" username="admin"><secret uuid="2ec115d7-3a88-3ceb-bc12-0ac909a6fd87"/></auth></source></pool>"#;
        let pool = StoragePool::decode(text).unwrap();
        match pool.source.as_ref().unwrap().auth.as_ref().unwrap() {
            PoolAuth::Ceph(auth) => {
                assert_eq!(auth.secret, PoolSecret::Uuid("2ec115d7-3a88-3ceb-bc12-0ac909a6fd87".to_string()))
            }
            other => panic!("unexpected auth {:?}", other),
        }
        assert_eq!(compact(&pool), text);

        let bad = r#"<pool type="iscsi"><source><auth type="chap" username="u"><secret/></auth></source></pool>"#;
        let err = StoragePool::decode(bad).unwrap_err();
        assert_eq!(err.path(), Some("/pool/source/auth/secret"));
    }

    #[test]
    fn test_pool_extensions_and_units() {
        let text = r#"<pool xmlns:fs="http://libvirt.org/schemas/storagepool/fs/1.0" type="netfs"><name>nfs</name><capacity unit="bytes">10737418240</capacity><source><host name="nfs.example.com"/><dir path="/export"/><format type="nfs"/><protocol ver="3"/></source><target><path>/mnt/nfs</path><permissions><mode>0755</mode></permissions></target><fs:mount_opts><fs:option name="sync"/></fs:mount_opts></pool>"#;
        let pool = StoragePool::decode(text).unwrap();
        assert_eq!(pool.capacity, Some(ScaledValue::new(10737418240, "bytes")));
        assert_eq!(pool.fs_mount_options.as_ref().unwrap().options, ["sync"]);
        assert_eq!(compact(&pool), text);
    }

    #[test]
    fn test_empty_pool_type_rejected() {
        let err = StoragePool::default().encode().unwrap_err();
        assert!(matches!(err, EncodeError::InvalidValue { field: "pool type", .. }));
    }

    #[test]
    fn test_volume_roundtrip() {
        let text = r#"<volume type="file"><name>disk.qcow2</name><key>/var/lib/libvirt/images/disk.qcow2</key><source><device path="/dev/sda"><extent start="0" end="4096"/></device></source><allocation unit="bytes">196608</allocation><capacity unit="G">20</capacity><target><path>/var/lib/libvirt/images/disk.qcow2</path><format type="qcow2"/><permissions><mode>0600</mode><owner>107</owner><group>107</group></permissions><timestamps><atime>1341933637.273190990</atime><mtime>1341930622.047245868</mtime></timestamps><encryption format="luks"><secret type="passphrase" uuid="f52a81b2-424e-490c-823d-6bd4235bc572"/></encryption><compat>1.1</compat><clusterSize unit="KiB">64</clusterSize><nocow/><features><lazy_refcounts/></features></target><backingStore><path>/var/lib/libvirt/images/base.qcow2</path><format type="raw"/></backingStore></volume>"#;
        let volume = StorageVolume::decode(text).unwrap();
        let target = volume.target.as_ref().unwrap();
        assert!(target.nocow && target.lazy_refcounts);
        assert_eq!(volume.source[0].extents[0].end, 4096);
        assert_eq!(compact(&volume), text);
    }

    #[test]
    fn test_volume_requires_name() {
        let err = StorageVolume::decode("<volume><key>k</key></volume>").unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement { ref element, .. } if element == "name"));
    }
}
