//! Codec for network port reservations.

use crate::codec::document::Document;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::port::*;

impl Document for NetworkPort {
    const ROOT: &'static str = "networkport";
}

impl XmlDecode for NetworkPort {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NetworkPort {
            uuid: el.child_text("uuid"),
            owner: ctx.child(el, "owner")?,
            group: el.child_text("group"),
            mac: el.child_attr("mac", "address"),
            bandwidth: ctx.child(el, "bandwidth")?,
            vlan: ctx.child(el, "vlan")?,
            port_options: ctx.child(el, "port")?,
            trust_guest_rx_filters: el.child_attr("rxfilters", "trustGuest"),
            virtual_port: ctx.child(el, "virtualport")?,
            plug: ctx.child(el, "plug")?,
        })
    }
}

impl XmlEncode for NetworkPort {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("uuid", self.uuid.as_deref());
        el.push_opt("owner", self.owner.as_ref())?;
        el.push_text_child("group", self.group.as_deref());
        el.push_attr_child("mac", "address", self.mac.as_deref());
        el.push_opt("bandwidth", self.bandwidth.as_ref())?;
        el.push_opt("vlan", self.vlan.as_ref())?;
        el.push_opt("port", self.port_options.as_ref())?;
        el.push_attr_child("rxfilters", "trustGuest", self.trust_guest_rx_filters.as_deref());
        el.push_opt("virtualport", self.virtual_port.as_ref())?;
        el.push_opt("plug", self.plug.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for PortOwner {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PortOwner {
            name: el.child_text("name"),
            uuid: el.child_text("uuid"),
        })
    }
}

impl XmlEncode for PortOwner {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("name", self.name.as_deref());
        el.push_text_child("uuid", self.uuid.as_deref());
        Ok(el)
    }
}

fn plug_bridge(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<PlugBridge, DecodeError> {
    Ok(PlugBridge {
        bridge: ctx.required_attr(el, "bridge")?,
        mac_table_manager: el.attr_string("macTableManager"),
        mtu: ctx.uint_attr(el, "mtu", Radix::Decimal)?,
    })
}

impl XmlDecode for PortPlug {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::PORT_PLUG.select(el, ctx)? {
            "network" => PortPlug::Network(plug_bridge(el, ctx)?),
            "bridge" => PortPlug::Bridge(plug_bridge(el, ctx)?),
            "direct" => PortPlug::Direct(PlugDirect {
                dev: ctx.required_attr(el, "dev")?,
                mode: el.attr_string("mode"),
            }),
            "hostdev-pci" => PortPlug::HostdevPci(PlugHostdevPci {
                managed: el.attr_string("managed"),
                driver: el.child_attr("driver", "name"),
                address: ctx.child(el, "address")?,
            }),
            other => return Err(ctx.unknown_discriminant(&variant::PORT_PLUG, other)),
        })
    }
}

impl XmlEncode for PortPlug {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            PortPlug::Network(plug) | PortPlug::Bridge(plug) => {
                el.set_attr("bridge", &plug.bridge);
                el.set_opt_attr("macTableManager", plug.mac_table_manager.as_deref());
                el.set_uint("mtu", plug.mtu, UintFormat::Decimal);
            }
            PortPlug::Direct(plug) => {
                el.set_attr("dev", &plug.dev);
                el.set_opt_attr("mode", plug.mode.as_deref());
            }
            PortPlug::HostdevPci(plug) => {
                el.set_opt_attr("managed", plug.managed.as_deref());
                el.push_attr_child("driver", "name", plug.driver.as_deref());
                el.push_opt("address", plug.address.as_ref())?;
            }
        }
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::model::common::PciAddress;

    #[test]
    fn test_bridge_plug_roundtrip() {
        let text = r#"<networkport><uuid>5d744f21-ba4a-4d6e-bdb2-30a35ff3207d</uuid><owner><name>myguest</name><uuid>c7a5fdbd-edaf-9455-926a-d65c16db1809</uuid></owner><group>default</group><mac address="52:54:00:7b:35:93"/><rxfilters trustGuest="yes"/><plug type="network" bridge="virbr0" macTableManager="libvirt" mtu="1500"/></networkport>"#;
        let port = NetworkPort::decode(text).unwrap();
        match port.plug.as_ref().unwrap() {
            PortPlug::Network(plug) => assert_eq!(plug.mtu, Some(1500)),
            other => panic!("unexpected plug {:?}", other),
        }
        assert_eq!(port.encode_with_options(&EncodeOptions::compact()).unwrap(), text);
    }

    #[test]
    fn test_hostdev_pci_plug() {
        let port = NetworkPort {
            plug: Some(PortPlug::HostdevPci(PlugHostdevPci {
                managed: Some("yes".to_string()),
                driver: Some("vfio".to_string()),
                address: Some(PciAddress::new(0, 3, 0, 1)),
            })),
            ..NetworkPort::default()
        };
        let text = port.encode_with_options(&EncodeOptions::compact()).unwrap();
        assert_eq!(
            text,
            r#"<networkport><plug type="hostdev-pci" managed="yes"><driver name="vfio"/><address domain="0x0000" bus="0x03" slot="0x00" function="0x1"/></plug></networkport>"#
        );
        assert_eq!(NetworkPort::decode(&text).unwrap(), port);
    }

    #[test]
    fn test_plug_vocabulary() {
        let err = NetworkPort::decode(r#"<networkport><plug bridge="br0"/></networkport>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "plug", .. }));

        let text = r#"<networkport><uuid>x</uuid><plug type="vds"/></networkport>"#;
        let err = NetworkPort::decode(text).unwrap_err();
        assert_eq!(err.path(), Some("/networkport/plug"));
        let port = NetworkPort::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        assert!(port.plug.is_none());
        assert_eq!(port.uuid.as_deref(), Some("x"));
    }
}
