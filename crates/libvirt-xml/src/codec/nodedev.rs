//! Codec for host node device reports.

use crate::codec::document::Document;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::nodedev::*;

impl Document for NodeDevice {
    const ROOT: &'static str = "device";
}

impl XmlDecode for NodeDevice {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        if !el.has_child("capability") {
            return Err(ctx.missing_element("capability"));
        }
        Ok(NodeDevice {
            name: ctx.required_text(el, "name")?,
            path: el.child_text("path"),
            dev_nodes: ctx.children(el, "devnode")?,
            parent: el.child_text("parent"),
            driver: el.child("driver").and_then(|driver| driver.child_text("name")),
            capability: ctx.child(el, "capability")?,
        })
    }
}

impl XmlEncode for NodeDevice {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("name", Some(&self.name));
        el.push_text_child("path", self.path.as_deref());
        el.push_all("devnode", &self.dev_nodes)?;
        el.push_text_child("parent", self.parent.as_deref());
        if let Some(driver) = &self.driver {
            let mut inner = Element::new("driver");
            inner.push_text_child("name", Some(driver));
            el.push(inner);
        }
        el.push_opt("capability", self.capability.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for DevNode {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DevNode {
            node_type: el.attr_string("type"),
            path: el.text(),
        })
    }
}

impl XmlEncode for DevNode {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.node_type.as_deref());
        el.push_text(&self.path);
        Ok(el)
    }
}

// =============================================================================
// TOP-LEVEL CAPABILITY
// =============================================================================

impl XmlDecode for NodeCapability {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::NODE_CAPABILITY.select(el, ctx)? {
            "system" => NodeCapability::System(SystemCapability {
                product: el.child_text("product"),
                hardware: el.child("hardware").map(|hw| SystemHardware {
                    vendor: hw.child_text("vendor"),
                    version: hw.child_text("version"),
                    serial: hw.child_text("serial"),
                    uuid: hw.child_text("uuid"),
                }),
                firmware: el.child("firmware").map(|fw| SystemFirmware {
                    vendor: fw.child_text("vendor"),
                    version: fw.child_text("version"),
                    release_date: fw.child_text("release_date"),
                }),
            }),
            "pci" => NodeCapability::Pci(pci_capability(el, ctx)?),
            "usb_device" => NodeCapability::UsbDevice(UsbDeviceCapability {
                bus: ctx.required_uint_text(el, "bus", Radix::Decimal)?,
                device: ctx.required_uint_text(el, "device", Radix::Decimal)?,
                product: ctx.child(el, "product")?,
                vendor: ctx.child(el, "vendor")?,
            }),
            "usb" => NodeCapability::Usb(UsbCapability {
                number: ctx.required_uint_text(el, "number", Radix::Decimal)?,
                class: ctx.required_uint_text(el, "class", Radix::Decimal)?,
                subclass: ctx.required_uint_text(el, "subclass", Radix::Decimal)?,
                protocol: ctx.required_uint_text(el, "protocol", Radix::Decimal)?,
                description: el.child_text("description"),
            }),
            "net" => NodeCapability::Net(NetCapability {
                interface: ctx.required_text(el, "interface")?,
                address: el.child_text("address"),
                link: match el.child("link") {
                    Some(link) => Some(ctx.scoped("link", |ctx| {
                        Ok(NetLink {
                            state: ctx.required_attr(link, "state")?,
                            speed: link.attr_string("speed"),
                        })
                    })?),
                    None => None,
                },
                features: ctx.attr_list(el, "feature", "name")?,
                capabilities: ctx.children_with(el, "capability", net_sub_capability)?,
            }),
            "scsi_host" => NodeCapability::ScsiHost(ScsiHostCapability {
                host: ctx.required_uint_text(el, "host", Radix::Decimal)?,
                unique_id: ctx.uint_text(el, "unique_id", Radix::Decimal)?,
                capabilities: ctx.children_with(el, "capability", scsi_host_sub_capability)?,
            }),
            "scsi_target" => NodeCapability::ScsiTarget(ScsiTargetCapability {
                target: ctx.required_text(el, "target")?,
                capabilities: ctx.children_with(el, "capability", scsi_target_sub_capability)?,
            }),
            "scsi" => NodeCapability::Scsi(ScsiCapability {
                host: ctx.required_uint_text(el, "host", Radix::Decimal)?,
                bus: ctx.required_uint_text(el, "bus", Radix::Decimal)?,
                target: ctx.required_uint_text(el, "target", Radix::Decimal)?,
                lun: ctx.required_uint_text(el, "lun", Radix::Decimal)?,
                scsi_type: el.child_text("type"),
            }),
            "storage" => NodeCapability::Storage(StorageCapability {
                block: el.child_text("block"),
                bus: el.child_text("bus"),
                drive_type: el.child_text("drive_type"),
                model: el.child_text("model"),
                vendor: el.child_text("vendor"),
                serial: el.child_text("serial"),
                size: ctx.uint_text(el, "size", Radix::Decimal)?,
                logical_block_size: ctx.uint_text(el, "logical_block_size", Radix::Decimal)?,
                num_blocks: ctx.uint_text(el, "num_blocks", Radix::Decimal)?,
                capabilities: ctx.children_with(el, "capability", storage_sub_capability)?,
            }),
            "drm" => NodeCapability::Drm(DrmCapability {
                drm_type: el.child_text("type"),
            }),
            "ccw" => NodeCapability::Ccw(CcwIds::from_element(el, ctx)?),
            "mdev" => NodeCapability::Mdev(MdevCapability {
                mdev_type: el.child_attr("type", "id"),
                iommu_group: ctx.child(el, "iommuGroup")?,
                uuid: el.child_text("uuid"),
                parent_addr: el.child_text("parent_addr"),
                attrs: ctx.children(el, "attr")?,
            }),
            "css" => NodeCapability::Css(CssCapability {
                ids: CcwIds::from_element(el, ctx)?,
                channel_dev_addr: ctx.child(el, "channel_dev_addr")?,
                mdev_types: ctx.children_with(el, "capability", mdev_types_capability)?,
            }),
            "ap_queue" => NodeCapability::ApQueue(ApQueueCapability {
                ap_adapter: ctx.required_text(el, "ap-adapter")?,
                ap_domain: ctx.required_text(el, "ap-domain")?,
            }),
            "ap_card" => NodeCapability::ApCard(ApCardCapability {
                ap_adapter: ctx.required_text(el, "ap-adapter")?,
            }),
            "ap_matrix" => NodeCapability::ApMatrix(ApMatrixCapability {
                mdev_types: ctx.children_with(el, "capability", mdev_types_capability)?,
            }),
            other => return Err(ctx.unknown_discriminant(&variant::NODE_CAPABILITY, other)),
        })
    }
}

impl XmlEncode for NodeCapability {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = match self {
            NodeCapability::System(cap) => {
                let mut el = Element::new(name);
                el.push_text_child("product", cap.product.as_deref());
                if let Some(hw) = &cap.hardware {
                    let mut inner = Element::new("hardware");
                    inner.push_text_child("vendor", hw.vendor.as_deref());
                    inner.push_text_child("version", hw.version.as_deref());
                    inner.push_text_child("serial", hw.serial.as_deref());
                    inner.push_text_child("uuid", hw.uuid.as_deref());
                    el.push(inner);
                }
                if let Some(fw) = &cap.firmware {
                    let mut inner = Element::new("firmware");
                    inner.push_text_child("vendor", fw.vendor.as_deref());
                    inner.push_text_child("version", fw.version.as_deref());
                    inner.push_text_child("release_date", fw.release_date.as_deref());
                    el.push(inner);
                }
                el
            }
            NodeCapability::Pci(cap) => cap.to_element(name)?,
            NodeCapability::UsbDevice(cap) => {
                let mut el = Element::new(name);
                el.push_uint_child("bus", Some(cap.bus), UintFormat::Decimal);
                el.push_uint_child("device", Some(cap.device), UintFormat::Decimal);
                el.push_opt("product", cap.product.as_ref())?;
                el.push_opt("vendor", cap.vendor.as_ref())?;
                el
            }
            NodeCapability::Usb(cap) => {
                let mut el = Element::new(name);
                el.push_uint_child("number", Some(cap.number), UintFormat::Decimal);
                el.push_uint_child("class", Some(cap.class), UintFormat::Decimal);
                el.push_uint_child("subclass", Some(cap.subclass), UintFormat::Decimal);
                el.push_uint_child("protocol", Some(cap.protocol), UintFormat::Decimal);
                el.push_text_child("description", cap.description.as_deref());
                el
            }
            NodeCapability::Net(cap) => {
                let mut el = Element::new(name);
                el.push_text_child("interface", Some(&cap.interface));
                el.push_text_child("address", cap.address.as_deref());
                if let Some(link) = &cap.link {
                    let mut inner = Element::new("link");
                    inner.set_attr("state", &link.state);
                    inner.set_opt_attr("speed", link.speed.as_deref());
                    el.push(inner);
                }
                for feature in &cap.features {
                    el.push_attr_child("feature", "name", Some(feature));
                }
                for sub in &cap.capabilities {
                    let mut inner = Element::new("capability");
                    inner.set_attr("type", sub.discriminant());
                    el.push(inner);
                }
                el
            }
            NodeCapability::ScsiHost(cap) => {
                let mut el = Element::new(name);
                el.push_uint_child("host", Some(cap.host), UintFormat::Decimal);
                el.push_uint_child("unique_id", cap.unique_id, UintFormat::Decimal);
                el.push_all("capability", &cap.capabilities)?;
                el
            }
            NodeCapability::ScsiTarget(cap) => {
                let mut el = Element::new(name);
                el.push_text_child("target", Some(&cap.target));
                el.push_all("capability", &cap.capabilities)?;
                el
            }
            NodeCapability::Scsi(cap) => {
                let mut el = Element::new(name);
                el.push_uint_child("host", Some(cap.host), UintFormat::Decimal);
                el.push_uint_child("bus", Some(cap.bus), UintFormat::Decimal);
                el.push_uint_child("target", Some(cap.target), UintFormat::Decimal);
                el.push_uint_child("lun", Some(cap.lun), UintFormat::Decimal);
                el.push_text_child("type", cap.scsi_type.as_deref());
                el
            }
            NodeCapability::Storage(cap) => {
                let mut el = Element::new(name);
                el.push_text_child("block", cap.block.as_deref());
                el.push_text_child("bus", cap.bus.as_deref());
                el.push_text_child("drive_type", cap.drive_type.as_deref());
                el.push_text_child("model", cap.model.as_deref());
                el.push_text_child("vendor", cap.vendor.as_deref());
                el.push_text_child("serial", cap.serial.as_deref());
                el.push_uint_child("size", cap.size, UintFormat::Decimal);
                el.push_uint_child("logical_block_size", cap.logical_block_size, UintFormat::Decimal);
                el.push_uint_child("num_blocks", cap.num_blocks, UintFormat::Decimal);
                el.push_all("capability", &cap.capabilities)?;
                el
            }
            NodeCapability::Drm(cap) => {
                let mut el = Element::new(name);
                el.push_text_child("type", cap.drm_type.as_deref());
                el
            }
            NodeCapability::Ccw(ids) => ids.to_element(name)?,
            NodeCapability::Mdev(cap) => {
                let mut el = Element::new(name);
                el.push_attr_child("type", "id", cap.mdev_type.as_deref());
                el.push_opt("iommuGroup", cap.iommu_group.as_ref())?;
                el.push_text_child("uuid", cap.uuid.as_deref());
                el.push_text_child("parent_addr", cap.parent_addr.as_deref());
                el.push_all("attr", &cap.attrs)?;
                el
            }
            NodeCapability::Css(cap) => {
                let mut el = cap.ids.to_element(name)?;
                el.push_opt("channel_dev_addr", cap.channel_dev_addr.as_ref())?;
                push_mdev_types_capabilities(&mut el, &cap.mdev_types)?;
                el
            }
            NodeCapability::ApQueue(cap) => {
                let mut el = Element::new(name);
                el.push_text_child("ap-adapter", Some(&cap.ap_adapter));
                el.push_text_child("ap-domain", Some(&cap.ap_domain));
                el
            }
            NodeCapability::ApCard(cap) => {
                let mut el = Element::new(name);
                el.push_text_child("ap-adapter", Some(&cap.ap_adapter));
                el
            }
            NodeCapability::ApMatrix(cap) => {
                let mut el = Element::new(name);
                push_mdev_types_capabilities(&mut el, &cap.mdev_types)?;
                el
            }
        };
        el.set_discriminant("type", self.discriminant());
        Ok(el)
    }
}

// =============================================================================
// PCI
// =============================================================================

fn pci_capability(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<PciCapability, DecodeError> {
    Ok(PciCapability {
        class: el.child_text("class"),
        domain: ctx.uint_text(el, "domain", Radix::Decimal)?,
        bus: ctx.uint_text(el, "bus", Radix::Decimal)?,
        slot: ctx.uint_text(el, "slot", Radix::Decimal)?,
        function: ctx.uint_text(el, "function", Radix::Decimal)?,
        product: ctx.child(el, "product")?,
        vendor: ctx.child(el, "vendor")?,
        iommu_group: ctx.child(el, "iommuGroup")?,
        numa_node: match el.child("numa") {
            Some(numa) => ctx.scoped("numa", |ctx| ctx.int_attr(numa, "node"))?,
            None => None,
        },
        pci_express: match el.child("pci-express") {
            Some(express) => Some(ctx.scoped("pci-express", |ctx| ctx.children(express, "link"))?),
            None => None,
        },
        capabilities: ctx.children_with(el, "capability", pci_sub_capability)?,
    })
}

impl XmlEncode for PciCapability {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("class", self.class.as_deref());
        el.push_uint_child("domain", self.domain, UintFormat::Decimal);
        el.push_uint_child("bus", self.bus, UintFormat::Decimal);
        el.push_uint_child("slot", self.slot, UintFormat::Decimal);
        el.push_uint_child("function", self.function, UintFormat::Decimal);
        el.push_opt("product", self.product.as_ref())?;
        el.push_opt("vendor", self.vendor.as_ref())?;
        el.push_all("capability", &self.capabilities)?;
        el.push_opt("iommuGroup", self.iommu_group.as_ref())?;
        if let Some(node) = self.numa_node {
            let mut numa = Element::new("numa");
            numa.set_int("node", Some(node));
            el.push(numa);
        }
        if let Some(links) = &self.pci_express {
            let mut express = Element::new("pci-express");
            express.push_all("link", links)?;
            el.push(express);
        }
        Ok(el)
    }
}

fn pci_sub_capability(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<PciSubCapability>, DecodeError> {
    Ok(Some(match variant::PCI_CAPABILITY.select(el, ctx)? {
        "virt_functions" => PciSubCapability::VirtFunctions(VirtFunctions {
            max_count: ctx.uint_attr(el, "maxCount", Radix::Decimal)?,
            addresses: ctx.children(el, "address")?,
        }),
        "phys_function" => PciSubCapability::PhysFunction(ctx.child(el, "address")?),
        "mdev_types" => PciSubCapability::MdevTypes(ctx.children(el, "type")?),
        "pci-bridge" => PciSubCapability::Bridge,
        "vpd" => PciSubCapability::Vpd(pci_vpd(el, ctx)?),
        other => return Err(ctx.unknown_discriminant(&variant::PCI_CAPABILITY, other)),
    }))
}

impl XmlEncode for PciSubCapability {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            PciSubCapability::VirtFunctions(vfs) => {
                el.set_uint("maxCount", vfs.max_count, UintFormat::Decimal);
                el.push_all("address", &vfs.addresses)?;
            }
            PciSubCapability::PhysFunction(address) => el.push_opt("address", address.as_ref())?,
            PciSubCapability::MdevTypes(types) => el.push_all("type", types)?,
            PciSubCapability::Bridge => {}
            PciSubCapability::Vpd(vpd) => {
                el.push_text_child("name", vpd.name.as_deref());
                if let Some(ro) = &vpd.read_only {
                    let mut fields = Element::new("fields");
                    fields.set_attr("access", "readonly");
                    fields.push_text_child("change_level", ro.change_level.as_deref());
                    fields.push_text_child("manufacture_id", ro.manufacture_id.as_deref());
                    fields.push_text_child("part_number", ro.part_number.as_deref());
                    fields.push_text_child("serial_number", ro.serial_number.as_deref());
                    fields.push_all("vendor_field", &ro.vendor_fields)?;
                    el.push(fields);
                }
                if let Some(rw) = &vpd.read_write {
                    let mut fields = Element::new("fields");
                    fields.set_attr("access", "readwrite");
                    fields.push_text_child("asset_tag", rw.asset_tag.as_deref());
                    fields.push_all("vendor_field", &rw.vendor_fields)?;
                    fields.push_all("system_field", &rw.system_fields)?;
                    el.push(fields);
                }
            }
        }
        Ok(el)
    }
}

/// Reads the VPD name and its access-tagged field blocks. A repeated block
/// replaces the earlier one.
fn pci_vpd(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<PciVpd, DecodeError> {
    let mut vpd = PciVpd {
        name: el.child_text("name"),
        ..PciVpd::default()
    };
    for (index, fields) in el.children_named("fields").enumerate() {
        ctx.scoped(format!("fields[{}]", index + 1), |ctx| {
            match variant::VPD_FIELDS.select(fields, ctx)? {
                "readonly" => {
                    vpd.read_only = Some(VpdReadOnly {
                        change_level: fields.child_text("change_level"),
                        manufacture_id: fields.child_text("manufacture_id"),
                        part_number: fields.child_text("part_number"),
                        serial_number: fields.child_text("serial_number"),
                        vendor_fields: ctx.children(fields, "vendor_field")?,
                    })
                }
                "readwrite" => {
                    vpd.read_write = Some(VpdReadWrite {
                        asset_tag: fields.child_text("asset_tag"),
                        vendor_fields: ctx.children(fields, "vendor_field")?,
                        system_fields: ctx.children(fields, "system_field")?,
                    })
                }
                other => return Err(ctx.unknown_discriminant(&variant::VPD_FIELDS, other)),
            }
            Ok(())
        })?;
    }
    Ok(vpd)
}

impl XmlDecode for VpdCustomField {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VpdCustomField {
            index: ctx.required_attr(el, "index")?,
            value: el.text(),
        })
    }
}

impl XmlEncode for VpdCustomField {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("index", &self.index);
        el.push_text(&self.value);
        Ok(el)
    }
}

impl XmlDecode for IdName {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IdName {
            id: ctx.required_attr(el, "id")?,
            name: el.text_opt(),
        })
    }
}

impl XmlEncode for IdName {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("id", &self.id);
        if let Some(text) = &self.name {
            el.push_text(text);
        }
        Ok(el)
    }
}

impl XmlDecode for IommuGroup {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IommuGroup {
            number: ctx.required_uint_attr(el, "number", Radix::Decimal)?,
            addresses: ctx.children(el, "address")?,
        })
    }
}

impl XmlEncode for IommuGroup {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("number", Some(self.number), UintFormat::Decimal);
        el.push_all("address", &self.addresses)?;
        Ok(el)
    }
}

impl XmlDecode for PciExpressLink {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        // Checked as a number, stored as written.
        ctx.float_attr(el, "speed")?;
        Ok(PciExpressLink {
            validity: el.attr_string("validity"),
            speed: el.attr_string("speed"),
            port: ctx.uint_attr(el, "port", Radix::Decimal)?,
            width: ctx.uint_attr(el, "width", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for PciExpressLink {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("validity", self.validity.as_deref());
        el.set_uint("port", self.port, UintFormat::Decimal);
        el.set_opt_attr("speed", self.speed.as_deref());
        el.set_uint("width", self.width, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for MdevType {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MdevType {
            id: ctx.required_attr(el, "id")?,
            name: el.child_text("name"),
            device_api: el.child_text("deviceAPI"),
            available_instances: ctx.uint_text(el, "availableInstances", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for MdevType {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("id", &self.id);
        el.push_text_child("name", self.name.as_deref());
        el.push_text_child("deviceAPI", self.device_api.as_deref());
        el.push_uint_child("availableInstances", self.available_instances, UintFormat::Decimal);
        Ok(el)
    }
}

fn mdev_types_capability(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<Vec<MdevType>>, DecodeError> {
    match variant::MDEV_TYPES_CAPABILITY.select(el, ctx)? {
        "mdev_types" => Ok(Some(ctx.children(el, "type")?)),
        other => Err(ctx.unknown_discriminant(&variant::MDEV_TYPES_CAPABILITY, other)),
    }
}

fn push_mdev_types_capabilities(el: &mut Element, blocks: &[Vec<MdevType>]) -> Result<(), EncodeError> {
    for types in blocks {
        let mut inner = Element::new("capability");
        inner.set_attr("type", "mdev_types");
        inner.push_all("type", types)?;
        el.push(inner);
    }
    Ok(())
}

// =============================================================================
// NET, SCSI, STORAGE SUB-CAPABILITIES
// =============================================================================

fn net_sub_capability(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<NetSubCapability>, DecodeError> {
    Ok(Some(match variant::NET_CAPABILITY.select(el, ctx)? {
        "80211" => NetSubCapability::Wireless80211,
        "80203" => NetSubCapability::Ethernet80203,
        other => return Err(ctx.unknown_discriminant(&variant::NET_CAPABILITY, other)),
    }))
}

fn scsi_host_sub_capability(
    el: &Element,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<ScsiHostSubCapability>, DecodeError> {
    Ok(Some(match variant::SCSI_HOST_CAPABILITY.select(el, ctx)? {
        "vport_ops" => ScsiHostSubCapability::VportOps {
            vports: ctx.required_uint_text(el, "vports", Radix::Decimal)?,
            max_vports: ctx.required_uint_text(el, "max_vports", Radix::Decimal)?,
        },
        "fc_host" => ScsiHostSubCapability::FcHost(FcHost {
            wwnn: el.child_text("wwnn"),
            wwpn: el.child_text("wwpn"),
            fabric_wwn: el.child_text("fabric_wwn"),
        }),
        other => return Err(ctx.unknown_discriminant(&variant::SCSI_HOST_CAPABILITY, other)),
    }))
}

impl XmlEncode for ScsiHostSubCapability {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            ScsiHostSubCapability::VportOps { vports, max_vports } => {
                el.push_uint_child("vports", Some(*vports), UintFormat::Decimal);
                el.push_uint_child("max_vports", Some(*max_vports), UintFormat::Decimal);
            }
            ScsiHostSubCapability::FcHost(fc) => {
                el.push_text_child("wwnn", fc.wwnn.as_deref());
                el.push_text_child("wwpn", fc.wwpn.as_deref());
                el.push_text_child("fabric_wwn", fc.fabric_wwn.as_deref());
            }
        }
        Ok(el)
    }
}

fn scsi_target_sub_capability(
    el: &Element,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<ScsiTargetSubCapability>, DecodeError> {
    match variant::SCSI_TARGET_CAPABILITY.select(el, ctx)? {
        "fc_remote_port" => Ok(Some(ScsiTargetSubCapability::FcRemotePort {
            rport: ctx.required_text(el, "rport")?,
            wwpn: ctx.required_text(el, "wwpn")?,
        })),
        other => Err(ctx.unknown_discriminant(&variant::SCSI_TARGET_CAPABILITY, other)),
    }
}

impl XmlEncode for ScsiTargetSubCapability {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            ScsiTargetSubCapability::FcRemotePort { rport, wwpn } => {
                el.push_text_child("rport", Some(rport));
                el.push_text_child("wwpn", Some(wwpn));
            }
        }
        Ok(el)
    }
}

fn storage_sub_capability(
    el: &Element,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<StorageSubCapability>, DecodeError> {
    match variant::STORAGE_CAPABILITY.select(el, ctx)? {
        "removable" => Ok(Some(StorageSubCapability::Removable(RemovableMedia {
            media_available: ctx.uint_text(el, "media_available", Radix::Decimal)?,
            media_size: ctx.uint_text(el, "media_size", Radix::Decimal)?,
            media_label: el.child_text("media_label"),
            logical_block_size: ctx.uint_text(el, "logical_block_size", Radix::Decimal)?,
            num_blocks: ctx.uint_text(el, "num_blocks", Radix::Decimal)?,
        }))),
        other => Err(ctx.unknown_discriminant(&variant::STORAGE_CAPABILITY, other)),
    }
}

impl XmlEncode for StorageSubCapability {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            StorageSubCapability::Removable(media) => {
                el.push_uint_child("media_available", media.media_available, UintFormat::Decimal);
                el.push_uint_child("media_size", media.media_size, UintFormat::Decimal);
                el.push_text_child("media_label", media.media_label.as_deref());
                el.push_uint_child("logical_block_size", media.logical_block_size, UintFormat::Decimal);
                el.push_uint_child("num_blocks", media.num_blocks, UintFormat::Decimal);
            }
        }
        Ok(el)
    }
}

// =============================================================================
// CCW, MDEV
// =============================================================================

/// Reads `cssid`, `ssid` and `devno` children as hex text, with or without
/// the `0x` prefix.
impl XmlDecode for CcwIds {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CcwIds {
            cssid: ctx.uint_text(el, "cssid", Radix::Hex)?,
            ssid: ctx.uint_text(el, "ssid", Radix::Hex)?,
            devno: ctx.uint_text(el, "devno", Radix::Hex)?,
        })
    }
}

impl XmlEncode for CcwIds {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_uint_child("cssid", self.cssid, UintFormat::HEX);
        el.push_uint_child("ssid", self.ssid, UintFormat::HEX);
        el.push_uint_child("devno", self.devno, UintFormat::HEX4);
        Ok(el)
    }
}

impl XmlDecode for MdevAttr {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MdevAttr {
            name: ctx.required_attr(el, "name")?,
            value: ctx.required_attr(el, "value")?,
        })
    }
}

impl XmlEncode for MdevAttr {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_attr("value", &self.value);
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::model::common::PciAddress;

    fn compact(device: &NodeDevice) -> String {
        device.encode_with_options(&EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_pci_device_roundtrip() {
        let text = concat!(
            r#"<device><name>pci_0000_03_00_0</name><path>/sys/devices/pci0000:00/0000:00:01.0/0000:03:00.0</path>"#,
            r#"<parent>pci_0000_00_01_0</parent><driver><name>igb</name></driver>"#,
            r#"<capability type="pci"><class>0x020000</class><domain>0</domain><bus>3</bus><slot>0</slot><function>0</function>"#,
            r#"<product id="0x1521">I350 Gigabit Network Connection</product><vendor id="0x8086">Intel Corporation</vendor>"#,
            r#"<capability type="virt_functions" maxCount="7"><address domain="0x0000" bus="0x03" slot="0x10" function="0x0"/></capability>"#,
            r#"<iommuGroup number="15"><address domain="0x0000" bus="0x03" slot="0x00" function="0x0"/></iommuGroup>"#,
            r#"<numa node="0"/><pci-express><link validity="cap" port="0" speed="5" width="4"/><link validity="sta" speed="2.5" width="4"/></pci-express>"#,
            r#"</capability></device>"#
        );
        let device = NodeDevice::decode(text).unwrap();
        assert_eq!(device.driver.as_deref(), Some("igb"));
        match device.capability.as_ref().unwrap() {
            NodeCapability::Pci(pci) => {
                assert_eq!(pci.bus, Some(3));
                assert_eq!(pci.numa_node, Some(0));
                assert_eq!(pci.iommu_group.as_ref().unwrap().addresses, vec![PciAddress::new(0, 3, 0, 0)]);
                match &pci.capabilities[0] {
                    PciSubCapability::VirtFunctions(vfs) => {
                        assert_eq!(vfs.max_count, Some(7));
                        assert_eq!(vfs.addresses[0].slot, Some(0x10));
                    }
                    other => panic!("unexpected sub-capability {:?}", other),
                }
                let links = pci.pci_express.as_ref().unwrap();
                assert_eq!(links[1].speed.as_deref(), Some("2.5"));
            }
            other => panic!("unexpected capability {:?}", other),
        }
        assert_eq!(compact(&device), text);
    }

    #[test]
    fn test_vpd_fields() {
        let text = concat!(
            r#"<device><name>pci_0000_82_00_0</name><capability type="pci">"#,
            r#"<capability type="vpd"><name>Mellanox ConnectX-6</name>"#,
            r#"<fields access="readonly"><part_number>MCX6</part_number><serial_number>MT2000</serial_number><vendor_field index="0">PCIeGen4</vendor_field></fields>"#,
            r#"<fields access="readwrite"><asset_tag>fleet-7</asset_tag><system_field index="A">x</system_field></fields>"#,
            r#"</capability></capability></device>"#
        );
        let device = NodeDevice::decode(text).unwrap();
        let Some(NodeCapability::Pci(pci)) = &device.capability else {
            panic!("expected pci capability");
        };
        let PciSubCapability::Vpd(vpd) = &pci.capabilities[0] else {
            panic!("expected vpd");
        };
        assert_eq!(vpd.read_only.as_ref().unwrap().serial_number.as_deref(), Some("MT2000"));
        assert_eq!(vpd.read_write.as_ref().unwrap().asset_tag.as_deref(), Some("fleet-7"));
        assert_eq!(compact(&device), text);

        let bad = r#"<device><name>x</name><capability type="pci"><capability type="vpd"><fields access="hidden"/></capability></capability></device>"#;
        let err = NodeDevice::decode(bad).unwrap_err();
        assert_eq!(err.path(), Some("/device/capability/capability[1]/fields[1]"));
    }

    #[test]
    fn test_net_capability() {
        let text = concat!(
            r#"<device><name>net_eth0_52_54_00_a1_b2_c3</name><capability type="net"><interface>eth0</interface>"#,
            r#"<address>52:54:00:a1:b2:c3</address><link state="up" speed="1000"/>"#,
            r#"<feature name="rx"/><feature name="tx"/><capability type="80203"/></capability></device>"#
        );
        let device = NodeDevice::decode(text).unwrap();
        let Some(NodeCapability::Net(net)) = &device.capability else {
            panic!("expected net capability");
        };
        assert_eq!(net.features, vec!["rx".to_string(), "tx".to_string()]);
        assert_eq!(net.capabilities, vec![NetSubCapability::Ethernet80203]);
        assert_eq!(compact(&device), text);
    }

    #[test]
    fn test_ccw_hex_children() {
        let device = NodeDevice::new(
            "ccw_0_0_ffff",
            NodeCapability::Ccw(CcwIds {
                cssid: Some(0xfe),
                ssid: Some(0),
                devno: Some(0x1f),
            }),
        );
        let text = compact(&device);
        assert_eq!(
            text,
            r#"<device><name>ccw_0_0_ffff</name><capability type="ccw"><cssid>0xfe</cssid><ssid>0x0</ssid><devno>0x001f</devno></capability></device>"#
        );
        assert_eq!(NodeDevice::decode(&text).unwrap(), device);

        let bare = r#"<device><name>x</name><capability type="ccw"><cssid>fe</cssid><devno>ffff</devno></capability></device>"#;
        let Some(NodeCapability::Ccw(ids)) = NodeDevice::decode(bare).unwrap().capability else {
            panic!("expected ccw capability");
        };
        assert_eq!(ids.cssid, Some(0xfe));
        assert_eq!(ids.devno, Some(0xffff));
    }

    #[test]
    fn test_css_with_mdev_types() {
        let text = concat!(
            r#"<device><name>css_0_0_0052</name><capability type="css"><cssid>0x0</cssid><ssid>0x0</ssid><devno>0x0052</devno>"#,
            r#"<channel_dev_addr><cssid>0xfe</cssid><ssid>0x0</ssid><devno>0x0001</devno></channel_dev_addr>"#,
            r#"<capability type="mdev_types"><type id="vfio_ccw-io"><name>I/O subchannel (Non-QDIO)</name><deviceAPI>vfio-ccw</deviceAPI><availableInstances>1</availableInstances></type></capability>"#,
            r#"</capability></device>"#
        );
        let device = NodeDevice::decode(text).unwrap();
        let Some(NodeCapability::Css(css)) = &device.capability else {
            panic!("expected css capability");
        };
        assert_eq!(css.ids.devno, Some(0x52));
        assert_eq!(css.mdev_types[0][0].id, "vfio_ccw-io");
        assert_eq!(compact(&device), text);
    }

    #[test]
    fn test_scsi_host_and_storage() {
        let text = concat!(
            r#"<device><name>scsi_host5</name><capability type="scsi_host"><host>5</host><unique_id>2</unique_id>"#,
            r#"<capability type="fc_host"><wwnn>20000000c9831b4b</wwnn><wwpn>10000000c9831b4b</wwpn></capability>"#,
            r#"<capability type="vport_ops"><vports>0</vports><max_vports>127</max_vports></capability>"#,
            r#"</capability></device>"#
        );
        let device = NodeDevice::decode(text).unwrap();
        assert_eq!(compact(&device), text);

        let storage = concat!(
            r#"<device><name>block_sr0</name><capability type="storage"><block>/dev/sr0</block><bus>ata</bus><drive_type>cdrom</drive_type>"#,
            r#"<capability type="removable"><media_available>1</media_available><media_size>3654957056</media_size><media_label>Fedora</media_label></capability>"#,
            r#"</capability></device>"#
        );
        let device = NodeDevice::decode(storage).unwrap();
        let Some(NodeCapability::Storage(cap)) = &device.capability else {
            panic!("expected storage capability");
        };
        let StorageSubCapability::Removable(media) = &cap.capabilities[0];
        assert_eq!(media.media_size, Some(3654957056));
        assert_eq!(compact(&device), storage);
    }

    #[test]
    fn test_unknown_capability() {
        let text = r#"<device><name>x</name><capability type="vdpa"/></device>"#;
        let err = NodeDevice::decode(text).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownDiscriminant { group: "capability", ref value, .. } if value == "vdpa"
        ));
        assert_eq!(err.path(), Some("/device/capability"));

        let device = NodeDevice::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        assert_eq!(device.name, "x");
        assert!(device.capability.is_none());
    }

    #[test]
    fn test_unknown_sub_capability_dropped_leniently() {
        let text = r#"<device><name>n</name><capability type="net"><interface>wlan0</interface><capability type="80215"/><capability type="80211"/></capability></device>"#;
        assert!(NodeDevice::decode(text).is_err());
        let device = NodeDevice::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        let Some(NodeCapability::Net(net)) = device.capability else {
            panic!("expected net capability");
        };
        assert_eq!(net.capabilities, vec![NetSubCapability::Wireless80211]);
    }

    #[test]
    fn test_required_fields() {
        let err = NodeDevice::decode(r#"<device><capability type="drm"/></device>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement { ref element, .. } if element == "name"));

        let err = NodeDevice::decode(r#"<device><name>x</name></device>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement { ref element, .. } if element == "capability"));

        let err = NodeDevice::decode(r#"<device><name>x</name><capability type="usb"><number>1</number></capability></device>"#)
            .unwrap_err();
        assert_eq!(err.path(), Some("/device/capability"));
    }
}
