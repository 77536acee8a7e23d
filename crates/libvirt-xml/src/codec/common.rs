//! Codecs for shared records: addresses, aliases, labels, scaled values.

use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::common::*;

// =============================================================================
// DEVICE INFO
// =============================================================================

impl XmlDecode for Alias {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Alias {
            name: ctx.required_attr(el, "name")?,
        })
    }
}

impl XmlEncode for Alias {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        Ok(el)
    }
}

impl XmlDecode for DeviceBoot {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DeviceBoot {
            order: ctx.uint_attr(el, "order", Radix::Decimal)?.unwrap_or_default(),
            loadparm: el.attr_string("loadparm"),
        })
    }
}

impl XmlEncode for DeviceBoot {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("order", Some(self.order), UintFormat::Decimal);
        el.set_opt_attr("loadparm", self.loadparm.as_deref());
        Ok(el)
    }
}

impl XmlDecode for DeviceAcpi {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DeviceAcpi {
            index: ctx.uint_attr(el, "index", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for DeviceAcpi {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("index", self.index, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for DeviceRom {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DeviceRom {
            bar: el.attr_string("bar"),
            file: el.attr_string("file"),
            enabled: el.attr_string("enabled"),
        })
    }
}

impl XmlEncode for DeviceRom {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("bar", self.bar.as_deref());
        el.set_opt_attr("file", self.file.as_deref());
        el.set_opt_attr("enabled", self.enabled.as_deref());
        Ok(el)
    }
}

// =============================================================================
// ADDRESSES
// =============================================================================

/// Decodes the `<address>` child of a device.
///
/// An address element without a `type` yields `None`.
pub(crate) fn device_address(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<DeviceAddress>, DecodeError> {
    ctx.child_with(el, "address", |child, ctx| match child.attr("type") {
        Some(_) => DeviceAddress::from_element(child, ctx).map(Some),
        None => Ok(None),
    })
}

impl XmlDecode for DeviceAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = variant::ADDRESS.select(el, ctx)?;
        Ok(match kind {
            "pci" => DeviceAddress::Pci(PciAddress::from_element(el, ctx)?),
            "drive" => DeviceAddress::Drive(DriveAddress::from_element(el, ctx)?),
            "virtio-serial" => DeviceAddress::VirtioSerial(VirtioSerialAddress::from_element(el, ctx)?),
            "ccid" => DeviceAddress::Ccid(CcidAddress::from_element(el, ctx)?),
            "usb" => DeviceAddress::Usb(UsbAddress::from_element(el, ctx)?),
            "spapr-vio" => DeviceAddress::SpaprVio(SpaprVioAddress {
                reg: ctx.uint_attr(el, "reg", Radix::Hex)?,
            }),
            "virtio-s390" => DeviceAddress::VirtioS390,
            "ccw" => DeviceAddress::Ccw(CcwAddress::from_element(el, ctx)?),
            "virtio-mmio" => DeviceAddress::VirtioMmio,
            "isa" => DeviceAddress::Isa(IsaAddress {
                iobase: ctx.uint_attr(el, "iobase", Radix::Hex)?,
                irq: ctx.uint_attr(el, "irq", Radix::Hex)?,
            }),
            "dimm" => DeviceAddress::Dimm(DimmAddress {
                slot: ctx.uint_attr(el, "slot", Radix::Decimal)?,
                base: ctx.uint_attr(el, "base", Radix::Hex)?,
            }),
            "unassigned" => DeviceAddress::Unassigned,
            other => return Err(ctx.unknown_discriminant(&variant::ADDRESS, other)),
        })
    }
}

impl XmlEncode for DeviceAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = match self {
            DeviceAddress::Pci(addr) => addr.to_element(name)?,
            DeviceAddress::Drive(addr) => addr.to_element(name)?,
            DeviceAddress::VirtioSerial(addr) => addr.to_element(name)?,
            DeviceAddress::Ccid(addr) => addr.to_element(name)?,
            DeviceAddress::Usb(addr) => addr.to_element(name)?,
            DeviceAddress::SpaprVio(addr) => {
                let mut el = Element::new(name);
                el.set_uint("reg", addr.reg, UintFormat::HEX);
                el
            }
            DeviceAddress::Ccw(addr) => addr.to_element(name)?,
            DeviceAddress::Isa(addr) => {
                let mut el = Element::new(name);
                el.set_uint("iobase", addr.iobase, UintFormat::HEX);
                el.set_uint("irq", addr.irq, UintFormat::HEX);
                el
            }
            DeviceAddress::Dimm(addr) => {
                let mut el = Element::new(name);
                el.set_uint("slot", addr.slot, UintFormat::Decimal);
                el.set_uint("base", addr.base, UintFormat::HEX);
                el
            }
            DeviceAddress::VirtioS390 | DeviceAddress::VirtioMmio | DeviceAddress::Unassigned => Element::new(name),
        };
        el.set_discriminant("type", self.discriminant());
        Ok(el)
    }
}

impl XmlDecode for PciAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PciAddress {
            domain: ctx.uint_attr(el, "domain", Radix::Auto)?,
            bus: ctx.uint_attr(el, "bus", Radix::Auto)?,
            slot: ctx.uint_attr(el, "slot", Radix::Auto)?,
            function: ctx.uint_attr(el, "function", Radix::Auto)?,
            multifunction: el.attr_string("multifunction"),
            zpci: ctx.child(el, "zpci")?,
        })
    }
}

impl XmlEncode for PciAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("domain", self.domain, UintFormat::HEX4);
        el.set_uint("bus", self.bus, UintFormat::HEX2);
        el.set_uint("slot", self.slot, UintFormat::HEX2);
        el.set_uint("function", self.function, UintFormat::HEX);
        el.set_opt_attr("multifunction", self.multifunction.as_deref());
        el.push_opt("zpci", self.zpci.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for ZpciAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ZpciAddress {
            uid: ctx.uint_attr(el, "uid", Radix::Auto)?,
            fid: ctx.uint_attr(el, "fid", Radix::Auto)?,
        })
    }
}

impl XmlEncode for ZpciAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("uid", self.uid, UintFormat::HEX4);
        el.set_uint("fid", self.fid, UintFormat::HEX4);
        Ok(el)
    }
}

impl XmlDecode for DriveAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DriveAddress {
            controller: ctx.uint_attr(el, "controller", Radix::Decimal)?,
            bus: ctx.uint_attr(el, "bus", Radix::Decimal)?,
            target: ctx.uint_attr(el, "target", Radix::Decimal)?,
            unit: ctx.uint_attr(el, "unit", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for DriveAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("controller", self.controller, UintFormat::Decimal);
        el.set_uint("bus", self.bus, UintFormat::Decimal);
        el.set_uint("target", self.target, UintFormat::Decimal);
        el.set_uint("unit", self.unit, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for VirtioSerialAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VirtioSerialAddress {
            controller: ctx.uint_attr(el, "controller", Radix::Decimal)?,
            bus: ctx.uint_attr(el, "bus", Radix::Decimal)?,
            port: ctx.uint_attr(el, "port", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for VirtioSerialAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("controller", self.controller, UintFormat::Decimal);
        el.set_uint("bus", self.bus, UintFormat::Decimal);
        el.set_uint("port", self.port, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for CcidAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CcidAddress {
            controller: ctx.uint_attr(el, "controller", Radix::Decimal)?,
            slot: ctx.uint_attr(el, "slot", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for CcidAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("controller", self.controller, UintFormat::Decimal);
        el.set_uint("slot", self.slot, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for UsbAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(UsbAddress {
            bus: ctx.uint_attr(el, "bus", Radix::Decimal)?,
            port: el.attr_string("port"),
            device: ctx.uint_attr(el, "device", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for UsbAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("bus", self.bus, UintFormat::Decimal);
        el.set_opt_attr("port", self.port.as_deref());
        el.set_uint("device", self.device, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for CcwAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CcwAddress {
            cssid: ctx.uint_attr(el, "cssid", Radix::Auto)?,
            ssid: ctx.uint_attr(el, "ssid", Radix::Auto)?,
            devno: ctx.uint_attr(el, "devno", Radix::Auto)?,
        })
    }
}

impl XmlEncode for CcwAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("cssid", self.cssid, UintFormat::HEX);
        el.set_uint("ssid", self.ssid, UintFormat::HEX);
        el.set_uint("devno", self.devno, UintFormat::HEX4);
        Ok(el)
    }
}

impl XmlDecode for MdevAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MdevAddress {
            uuid: ctx.required_attr(el, "uuid")?,
        })
    }
}

impl XmlEncode for MdevAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("uuid", &self.uuid);
        Ok(el)
    }
}

// =============================================================================
// LABELS, SECRETS, VALUES
// =============================================================================

impl XmlDecode for DeviceSecLabel {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DeviceSecLabel {
            model: el.attr_string("model"),
            labelskip: el.attr_string("labelskip"),
            relabel: el.attr_string("relabel"),
            label: el.child_text("label"),
        })
    }
}

impl XmlEncode for DeviceSecLabel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("model", self.model.as_deref());
        el.set_opt_attr("labelskip", self.labelskip.as_deref());
        el.set_opt_attr("relabel", self.relabel.as_deref());
        el.push_text_child("label", self.label.as_deref());
        Ok(el)
    }
}

impl XmlDecode for ScaledValue {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ScaledValue {
            value: ctx.uint_content(el, Radix::Decimal)?.unwrap_or_default(),
            unit: el.attr_string("unit"),
        })
    }
}

impl XmlEncode for ScaledValue {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("unit", self.unit.as_deref());
        el.push_text(&self.value.to_string());
        Ok(el)
    }
}

impl XmlDecode for SecretRef {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SecretRef {
            secret_type: el.attr_string("type"),
            usage: el.attr_string("usage"),
            uuid: el.attr_string("uuid"),
        })
    }
}

impl XmlEncode for SecretRef {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.secret_type.as_deref());
        el.set_opt_attr("usage", self.usage.as_deref());
        el.set_opt_attr("uuid", self.uuid.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Permissions {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Permissions {
            mode: el.child_text("mode"),
            owner: el.child_text("owner"),
            group: el.child_text("group"),
            label: el.child_text("label"),
        })
    }
}

impl XmlEncode for Permissions {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("mode", self.mode.as_deref());
        el.push_text_child("owner", self.owner.as_deref());
        el.push_text_child("group", self.group.as_deref());
        el.push_text_child("label", self.label.as_deref());
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::codec::tree::{parse, write};
    use proptest::prelude::*;

    fn decode_address(text: &str) -> Result<Option<DeviceAddress>, DecodeError> {
        let root = parse(&format!("<disk>{}</disk>", text)).unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        device_address(&root, &mut ctx)
    }

    fn encode(address: &DeviceAddress) -> String {
        write(&address.to_element("address").unwrap(), &EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_pci_address_padding() {
        let address = DeviceAddress::Pci(PciAddress::new(0, 1, 2, 0));
        assert_eq!(
            encode(&address),
            r#"<address type="pci" domain="0x0000" bus="0x01" slot="0x02" function="0x0"/>"#
        );
        let decoded = decode_address(&encode(&address)).unwrap();
        assert_eq!(decoded, Some(address));
    }

    #[test]
    fn test_pci_address_partial() {
        let address = DeviceAddress::Pci(PciAddress {
            slot: Some(0),
            ..PciAddress::default()
        });
        assert_eq!(encode(&address), r#"<address type="pci" slot="0x00"/>"#);
    }

    #[test]
    fn test_untyped_address_is_absent() {
        assert_eq!(decode_address(r#"<address bus="1"/>"#).unwrap(), None);
        assert_eq!(decode_address("").unwrap(), None);
    }

    #[test]
    fn test_unknown_address_type() {
        let err = decode_address(r#"<address type="warp"/>"#).unwrap_err();
        assert_eq!(err.path(), Some("/address"));
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "address", .. }));
    }

    #[test]
    fn test_hex_addresses() {
        let decoded = decode_address(r#"<address type="ccw" cssid="0xfe" ssid="0x0" devno="0x0001"/>"#).unwrap();
        let expected = DeviceAddress::Ccw(CcwAddress {
            cssid: Some(0xfe),
            ssid: Some(0),
            devno: Some(1),
        });
        assert_eq!(decoded, Some(expected.clone()));
        assert_eq!(
            encode(&expected),
            r#"<address type="ccw" cssid="0xfe" ssid="0x0" devno="0x0001"/>"#
        );

        let decoded = decode_address(r#"<address type="isa" iobase="0x505" irq="4"/>"#).unwrap();
        assert_eq!(
            decoded,
            Some(DeviceAddress::Isa(IsaAddress {
                iobase: Some(0x505),
                irq: Some(4),
            }))
        );
    }

    #[test]
    fn test_malformed_pci_bus() {
        let err = decode_address(r#"<address type="pci" bus="0xzz"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedScalar { .. }));
    }

    proptest! {
        #[test]
        fn prop_pci_roundtrip(
            domain in proptest::option::of(0u32..0x10000),
            bus in proptest::option::of(0u32..0x100),
            slot in proptest::option::of(0u32..0x20),
            function in proptest::option::of(0u32..8),
        ) {
            let address = DeviceAddress::Pci(PciAddress { domain, bus, slot, function, ..PciAddress::default() });
            let text = encode(&address);
            prop_assert_eq!(text.contains("domain="), domain.is_some());
            prop_assert_eq!(text.contains("function="), function.is_some());
            prop_assert_eq!(decode_address(&text).unwrap(), Some(address));
        }
    }
}
