//! Codec for host interfaces.
//!
//! Bridge and bond members are full interfaces and nest recursively. A VLAN
//! only names its parent device.

use crate::codec::document::Document;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::hostiface::*;

impl Document for HostInterface {
    const ROOT: &'static str = "interface";
}

impl XmlDecode for HostInterface {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = match variant::HOST_INTERFACE.select(el, ctx)? {
            "ethernet" => HostInterfaceKind::Ethernet,
            "bridge" => HostInterfaceKind::Bridge(match el.child("bridge") {
                Some(bridge) => ctx.decode_at(bridge, "bridge")?,
                None => HostBridge::default(),
            }),
            "bond" => HostInterfaceKind::Bond(match el.child("bond") {
                Some(bond) => ctx.decode_at(bond, "bond")?,
                None => HostBond::default(),
            }),
            "vlan" => HostInterfaceKind::Vlan(ctx.required_child(el, "vlan")?),
            other => return Err(ctx.unknown_discriminant(&variant::HOST_INTERFACE, other)),
        };
        let mtu = match el.child("mtu") {
            Some(mtu) => ctx.scoped("mtu", |ctx| ctx.uint_attr(mtu, "size", Radix::Decimal))?,
            None => None,
        };
        Ok(HostInterface {
            name: el.attr_string("name"),
            start_mode: el.child_attr("start", "mode"),
            mac: el.child_attr("mac", "address"),
            link: ctx.child(el, "link")?,
            mtu,
            protocols: ctx.children(el, "protocol")?,
            kind,
        })
    }
}

impl XmlEncode for HostInterface {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.kind.discriminant());
        el.set_opt_attr("name", self.name.as_deref());
        el.push_attr_child("start", "mode", self.start_mode.as_deref());
        el.push_attr_child("mac", "address", self.mac.as_deref());
        el.push_opt("link", self.link.as_ref())?;
        if let Some(size) = self.mtu {
            let mut mtu = Element::new("mtu");
            mtu.set_uint("size", Some(size), UintFormat::Decimal);
            el.push(mtu);
        }
        el.push_all("protocol", &self.protocols)?;
        match &self.kind {
            HostInterfaceKind::Ethernet => {}
            HostInterfaceKind::Bridge(bridge) => el.push_child("bridge", bridge)?,
            HostInterfaceKind::Bond(bond) => el.push_child("bond", bond)?,
            HostInterfaceKind::Vlan(vlan) => el.push_child("vlan", vlan)?,
        }
        Ok(el)
    }
}

impl XmlDecode for HostLink {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HostLink {
            speed: ctx.uint_attr(el, "speed", Radix::Decimal)?,
            state: el.attr_string("state"),
        })
    }
}

impl XmlEncode for HostLink {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("speed", self.speed, UintFormat::Decimal);
        el.set_opt_attr("state", self.state.as_deref());
        Ok(el)
    }
}

impl XmlDecode for HostBridge {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        // Checked as a number, stored as written.
        ctx.float_attr(el, "delay")?;
        Ok(HostBridge {
            stp: el.attr_string("stp"),
            delay: el.attr_string("delay"),
            interfaces: ctx.children(el, "interface")?,
        })
    }
}

impl XmlEncode for HostBridge {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("stp", self.stp.as_deref());
        el.set_opt_attr("delay", self.delay.as_deref());
        el.push_all("interface", &self.interfaces)?;
        Ok(el)
    }
}

// =============================================================================
// BOND
// =============================================================================

fn bond_monitor(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<BondMonitor>, DecodeError> {
    if el.prefix.is_some() {
        return Ok(None);
    }
    Ok(Some(match el.name.as_str() {
        "interface" => return Ok(None),
        "miimon" => BondMonitor::Mii(MiiMonitor {
            freq: ctx.uint_attr(el, "freq", Radix::Decimal)?,
            updelay: ctx.uint_attr(el, "updelay", Radix::Decimal)?,
            downdelay: ctx.uint_attr(el, "downdelay", Radix::Decimal)?,
            carrier: el.attr_string("carrier"),
        }),
        "arpmon" => BondMonitor::Arp(ArpMonitor {
            interval: ctx.uint_attr(el, "interval", Radix::Decimal)?,
            target: el.attr_string("target"),
            validate: el.attr_string("validate"),
        }),
        other => return Err(ctx.unknown_discriminant(&variant::BOND_MONITOR, other)),
    }))
}

impl XmlDecode for HostBond {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let mut monitors = ctx.elements_with(el, bond_monitor)?;
        if monitors.len() > 1 {
            return Err(ctx.unexpected("more than one bond monitor"));
        }
        Ok(HostBond {
            mode: el.attr_string("mode"),
            monitor: monitors.pop(),
            interfaces: ctx.children(el, "interface")?,
        })
    }
}

impl XmlEncode for HostBond {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("mode", self.mode.as_deref());
        if let Some(monitor) = &self.monitor {
            el.push_child(monitor.discriminant(), monitor)?;
        }
        el.push_all("interface", &self.interfaces)?;
        Ok(el)
    }
}

impl XmlEncode for BondMonitor {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        match self {
            BondMonitor::Mii(mii) => {
                el.set_uint("freq", mii.freq, UintFormat::Decimal);
                el.set_uint("updelay", mii.updelay, UintFormat::Decimal);
                el.set_uint("downdelay", mii.downdelay, UintFormat::Decimal);
                el.set_opt_attr("carrier", mii.carrier.as_deref());
            }
            BondMonitor::Arp(arp) => {
                el.set_uint("interval", arp.interval, UintFormat::Decimal);
                el.set_opt_attr("target", arp.target.as_deref());
                el.set_opt_attr("validate", arp.validate.as_deref());
            }
        }
        Ok(el)
    }
}

impl XmlDecode for HostVlan {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HostVlan {
            tag: ctx.required_uint_attr(el, "tag", Radix::Decimal)?,
            device: el.child_attr("interface", "name"),
        })
    }
}

impl XmlEncode for HostVlan {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("tag", Some(self.tag), UintFormat::Decimal);
        el.push_attr_child("interface", "name", self.device.as_deref());
        Ok(el)
    }
}

// =============================================================================
// PROTOCOLS
// =============================================================================

impl XmlDecode for HostProtocol {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HostProtocol {
            family: ctx.required_attr(el, "family")?,
            autoconf: el.has_child("autoconf"),
            dhcp: el.child("dhcp").map(|dhcp| HostDhcp {
                peerdns: dhcp.attr_string("peerdns"),
            }),
            addresses: ctx.children(el, "ip")?,
            gateway: el.child_attr("route", "gateway"),
        })
    }
}

impl XmlEncode for HostProtocol {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("family", &self.family);
        el.push_flag("autoconf", self.autoconf);
        if let Some(dhcp) = &self.dhcp {
            let mut inner = Element::new("dhcp");
            inner.set_opt_attr("peerdns", dhcp.peerdns.as_deref());
            el.push(inner);
        }
        el.push_all("ip", &self.addresses)?;
        el.push_attr_child("route", "gateway", self.gateway.as_deref());
        Ok(el)
    }
}

impl XmlDecode for HostIp {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HostIp {
            address: ctx.required_attr(el, "address")?,
            prefix: ctx.uint_attr(el, "prefix", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for HostIp {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("address", &self.address);
        el.set_uint("prefix", self.prefix, UintFormat::Decimal);
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};

    fn compact(iface: &HostInterface) -> String {
        iface.encode_with_options(&EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_ethernet_roundtrip() {
        let text = concat!(
            r#"<interface type="ethernet" name="eth0"><start mode="onboot"/><mac address="52:54:00:aa:bb:cc"/>"#,
            r#"<link speed="1000" state="up"/><mtu size="9000"/>"#,
            r#"<protocol family="ipv4"><dhcp peerdns="yes"/><ip address="192.168.0.5" prefix="24"/><route gateway="192.168.0.1"/></protocol>"#,
            r#"<protocol family="ipv6"><autoconf/><ip address="3ffe:ffff:0:5::1" prefix="128"/></protocol>"#,
            r#"</interface>"#
        );
        let iface = HostInterface::decode(text).unwrap();
        assert_eq!(iface.kind, HostInterfaceKind::Ethernet);
        assert_eq!(iface.mtu, Some(9000));
        assert_eq!(iface.link.as_ref().unwrap().speed, Some(1000));
        assert!(iface.protocols[1].autoconf);
        assert_eq!(iface.protocols[0].gateway.as_deref(), Some("192.168.0.1"));
        assert_eq!(compact(&iface), text);
    }

    #[test]
    fn test_bridge_with_nested_bond() {
        let text = concat!(
            r#"<interface type="bridge" name="br0"><start mode="onboot"/><bridge stp="off" delay="0.01">"#,
            r#"<interface type="bond" name="bond0"><bond mode="active-backup"><miimon freq="100" updelay="10" carrier="ioctl"/>"#,
            r#"<interface type="ethernet" name="eth0"/><interface type="ethernet" name="eth1"/></bond></interface>"#,
            r#"</bridge></interface>"#
        );
        let iface = HostInterface::decode(text).unwrap();
        let HostInterfaceKind::Bridge(bridge) = &iface.kind else {
            panic!("expected bridge, got {:?}", iface.kind);
        };
        assert_eq!(bridge.delay.as_deref(), Some("0.01"));
        let HostInterfaceKind::Bond(bond) = &bridge.interfaces[0].kind else {
            panic!("expected bond");
        };
        assert_eq!(
            bond.monitor,
            Some(BondMonitor::Mii(MiiMonitor {
                freq: Some(100),
                updelay: Some(10),
                downdelay: None,
                carrier: Some("ioctl".to_string()),
            }))
        );
        assert_eq!(bond.interfaces[1], HostInterface::ethernet("eth1"));
        assert_eq!(compact(&iface), text);
    }

    #[test]
    fn test_vlan() {
        let text = r#"<interface type="vlan" name="eth0.42"><start mode="onboot"/><vlan tag="42"><interface name="eth0"/></vlan></interface>"#;
        let iface = HostInterface::decode(text).unwrap();
        assert_eq!(
            iface.kind,
            HostInterfaceKind::Vlan(HostVlan {
                tag: 42,
                device: Some("eth0".to_string()),
            })
        );
        assert_eq!(compact(&iface), text);

        let err = HostInterface::decode(r#"<interface type="vlan" name="v"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement { .. }));
        let err = HostInterface::decode(r#"<interface type="vlan"><vlan tag="5000000"/></interface>"#).unwrap_err();
        assert_eq!(err.path(), Some("/interface/vlan"));
    }

    #[test]
    fn test_arp_monitor() {
        let text = r#"<interface type="bond" name="bond1"><bond mode="balance-rr"><arpmon interval="100" target="192.168.50.1" validate="active"/></bond></interface>"#;
        let iface = HostInterface::decode(text).unwrap();
        let HostInterfaceKind::Bond(bond) = &iface.kind else {
            panic!("expected bond");
        };
        assert_eq!(bond.monitor.as_ref().map(BondMonitor::discriminant), Some("arpmon"));
        assert_eq!(compact(&iface), text);
    }

    #[test]
    fn test_unknown_bond_monitor() {
        let text = r#"<interface type="bond" name="bond0"><bond><ethmon/><interface type="ethernet" name="eth0"/></bond></interface>"#;
        let err = HostInterface::decode(text).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "bond monitor", .. }));
        assert_eq!(err.path(), Some("/interface/bond/ethmon[1]"));

        let iface = HostInterface::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        let HostInterfaceKind::Bond(bond) = &iface.kind else {
            panic!("expected bond");
        };
        assert_eq!(bond.monitor, None);
        assert_eq!(bond.interfaces.len(), 1);
    }

    #[test]
    fn test_interface_type_is_required() {
        let err = HostInterface::decode(r#"<interface name="eth0"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "host interface", .. }));

        let text = r#"<interface type="bridge" name="br0"><bridge><interface type="infiniband" name="ib0"/><interface type="ethernet" name="eth0"/></bridge></interface>"#;
        let err = HostInterface::decode(text).unwrap_err();
        assert_eq!(err.path(), Some("/interface/bridge/interface[1]"));
        let iface = HostInterface::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        let HostInterfaceKind::Bridge(bridge) = &iface.kind else {
            panic!("expected bridge");
        };
        assert_eq!(bridge.interfaces, vec![HostInterface::ethernet("eth0")]);
    }
}
