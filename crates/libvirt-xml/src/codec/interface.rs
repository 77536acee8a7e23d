//! Guest interface codecs.

use crate::codec::common::device_address;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::chardev::{ChardevSource, ChardevUnix};
use crate::model::common::{PciAddress, UsbAddress};
use crate::model::interface::*;

// =============================================================================
// SOURCE
// =============================================================================

fn decode_source(kind: &str, el: &Element, ctx: &mut DecodeContext<'_>) -> Result<InterfaceSource, DecodeError> {
    let src = el.child("source");
    let attr = |name: &str| src.and_then(|src| src.attr_string(name));
    Ok(match kind {
        "user" => InterfaceSource::User(InterfaceSourceUser { dev: attr("dev") }),
        "ethernet" => InterfaceSource::Ethernet,
        "vhostuser" => InterfaceSource::VhostUser(match src {
            Some(src) => ctx.decode_at(src, "source")?,
            None => ChardevSource::Unix(ChardevUnix::default()),
        }),
        "server" => InterfaceSource::Server(socket_source(src, ctx)?),
        "client" => InterfaceSource::Client(socket_source(src, ctx)?),
        "mcast" => InterfaceSource::Mcast(socket_source(src, ctx)?),
        "udp" => InterfaceSource::Udp(socket_source(src, ctx)?),
        "network" => InterfaceSource::Network(InterfaceSourceNetwork {
            network: attr("network"),
            portgroup: attr("portgroup"),
            bridge: attr("bridge"),
            portid: attr("portid"),
        }),
        "bridge" => InterfaceSource::Bridge(InterfaceSourceBridge {
            bridge: attr("bridge").unwrap_or_default(),
        }),
        "internal" => InterfaceSource::Internal(InterfaceSourceInternal { name: attr("name") }),
        "direct" => InterfaceSource::Direct(InterfaceSourceDirect {
            dev: attr("dev"),
            mode: attr("mode"),
        }),
        "hostdev" => InterfaceSource::Hostdev(match src {
            Some(src) => ctx.scoped("source", |ctx| hostdev_source(src, ctx))?,
            None => None,
        }),
        "vdpa" => InterfaceSource::Vdpa(InterfaceSourceVdpa { dev: attr("dev") }),
        "null" => InterfaceSource::Null,
        "vds" => InterfaceSource::Vds(match src {
            Some(src) => ctx.scoped("source", |ctx| {
                Ok(InterfaceSourceVds {
                    switch_id: ctx.required_attr(src, "switchid")?,
                    port_id: ctx.int_attr(src, "portid")?,
                    portgroup_id: src.attr_string("portgroupid"),
                    connection_id: ctx.int_attr(src, "connectionid")?,
                })
            })?,
            None => InterfaceSourceVds::default(),
        }),
        other => return Err(ctx.unknown_discriminant(&variant::INTERFACE, other)),
    })
}

fn socket_source(src: Option<&Element>, ctx: &mut DecodeContext<'_>) -> Result<InterfaceSourceSocket, DecodeError> {
    let Some(src) = src else {
        return Ok(InterfaceSourceSocket::default());
    };
    ctx.scoped("source", |ctx| {
        Ok(InterfaceSourceSocket {
            address: src.attr_string("address"),
            port: ctx.uint_attr(src, "port", Radix::Decimal)?,
            local: ctx.child(src, "local")?,
        })
    })
}

/// Peeks at the nested `<address type=…>` to pick the hostdev variant.
fn hostdev_source(src: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<InterfaceHostdevSource>, DecodeError> {
    let Some(address) = src.child("address") else {
        return Ok(None);
    };
    ctx.scoped("address", |ctx| {
        let source = match variant::INTERFACE_HOSTDEV_ADDRESS.select(address, ctx)? {
            "pci" => InterfaceHostdevSource::Pci(PciAddress::from_element(address, ctx)?),
            "usb" => InterfaceHostdevSource::Usb(UsbAddress::from_element(address, ctx)?),
            other => return Err(ctx.unknown_discriminant(&variant::INTERFACE_HOSTDEV_ADDRESS, other)),
        };
        Ok(Some(source))
    })
}

/// Builds the `<source>` element. User without a device, ethernet, null and
/// an empty hostdev have none.
fn source_element(source: &InterfaceSource) -> Result<Option<Element>, EncodeError> {
    let mut el = Element::new("source");
    match source {
        InterfaceSource::User(user) => match &user.dev {
            Some(dev) => el.set_attr("dev", dev),
            None => return Ok(None),
        },
        InterfaceSource::Ethernet | InterfaceSource::Null | InterfaceSource::Hostdev(None) => return Ok(None),
        InterfaceSource::VhostUser(chardev) => return chardev.to_element("source").map(Some),
        InterfaceSource::Server(socket)
        | InterfaceSource::Client(socket)
        | InterfaceSource::Mcast(socket)
        | InterfaceSource::Udp(socket) => {
            el.set_opt_attr("address", socket.address.as_deref());
            el.set_uint("port", socket.port, UintFormat::Decimal);
            el.push_opt("local", socket.local.as_ref())?;
        }
        InterfaceSource::Network(network) => {
            el.set_opt_attr("network", network.network.as_deref());
            el.set_opt_attr("portgroup", network.portgroup.as_deref());
            el.set_opt_attr("bridge", network.bridge.as_deref());
            el.set_opt_attr("portid", network.portid.as_deref());
        }
        InterfaceSource::Bridge(bridge) => el.set_attr("bridge", &bridge.bridge),
        InterfaceSource::Internal(internal) => el.set_opt_attr("name", internal.name.as_deref()),
        InterfaceSource::Direct(direct) => {
            el.set_opt_attr("dev", direct.dev.as_deref());
            el.set_opt_attr("mode", direct.mode.as_deref());
        }
        InterfaceSource::Hostdev(Some(hostdev)) => {
            let mut address = match hostdev {
                InterfaceHostdevSource::Pci(pci) => pci.to_element("address")?,
                InterfaceHostdevSource::Usb(usb) => usb.to_element("address")?,
            };
            address.set_discriminant("type", hostdev.discriminant());
            el.push(address);
        }
        InterfaceSource::Vdpa(vdpa) => el.set_opt_attr("dev", vdpa.dev.as_deref()),
        InterfaceSource::Vds(vds) => {
            el.set_attr("switchid", &vds.switch_id);
            el.set_int("portid", vds.port_id);
            el.set_opt_attr("portgroupid", vds.portgroup_id.as_deref());
            el.set_int("connectionid", vds.connection_id);
        }
    }
    Ok(Some(el))
}

impl XmlDecode for InterfaceSourceLocal {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceSourceLocal {
            address: el.attr_string("address"),
            port: ctx.uint_attr(el, "port", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for InterfaceSourceLocal {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("address", self.address.as_deref());
        el.set_uint("port", self.port, UintFormat::Decimal);
        Ok(el)
    }
}

// =============================================================================
// INTERFACE
// =============================================================================

impl XmlDecode for InterfaceMac {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceMac {
            address: ctx.required_attr(el, "address")?,
            mac_type: el.attr_string("type"),
            check: el.attr_string("check"),
        })
    }
}

impl XmlEncode for InterfaceMac {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("address", &self.address);
        el.set_opt_attr("type", self.mac_type.as_deref());
        el.set_opt_attr("check", self.check.as_deref());
        Ok(el)
    }
}

impl XmlDecode for PortForwardRange {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PortForwardRange {
            start: ctx.required_uint_attr(el, "start", Radix::Decimal)?,
            end: ctx.uint_attr(el, "end", Radix::Decimal)?,
            to: ctx.uint_attr(el, "to", Radix::Decimal)?,
            exclude: el.attr_string("exclude"),
        })
    }
}

impl XmlEncode for PortForwardRange {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("start", Some(self.start), UintFormat::Decimal);
        el.set_uint("end", self.end, UintFormat::Decimal);
        el.set_uint("to", self.to, UintFormat::Decimal);
        el.set_opt_attr("exclude", self.exclude.as_deref());
        Ok(el)
    }
}

impl XmlDecode for PortForward {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PortForward {
            proto: ctx.required_attr(el, "proto")?,
            address: el.attr_string("address"),
            dev: el.attr_string("dev"),
            ranges: ctx.children(el, "range")?,
        })
    }
}

impl XmlEncode for PortForward {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("proto", &self.proto);
        el.set_opt_attr("address", self.address.as_deref());
        el.set_opt_attr("dev", self.dev.as_deref());
        el.push_all("range", &self.ranges)?;
        Ok(el)
    }
}

impl XmlDecode for InterfaceTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceTarget {
            dev: ctx.required_attr(el, "dev")?,
            managed: el.attr_string("managed"),
        })
    }
}

impl XmlEncode for InterfaceTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("dev", &self.dev);
        el.set_opt_attr("managed", self.managed.as_deref());
        Ok(el)
    }
}

impl XmlDecode for InterfaceGuest {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceGuest {
            dev: el.attr_string("dev"),
            actual: el.attr_string("actual"),
        })
    }
}

impl XmlEncode for InterfaceGuest {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("dev", self.dev.as_deref());
        el.set_opt_attr("actual", self.actual.as_deref());
        Ok(el)
    }
}

impl XmlDecode for InterfaceDriverHost {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceDriverHost {
            csum: el.attr_string("csum"),
            gso: el.attr_string("gso"),
            tso4: el.attr_string("tso4"),
            tso6: el.attr_string("tso6"),
            ecn: el.attr_string("ecn"),
            ufo: el.attr_string("ufo"),
            mrg_rxbuf: el.attr_string("mrg_rxbuf"),
        })
    }
}

impl XmlEncode for InterfaceDriverHost {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("csum", self.csum.as_deref());
        el.set_opt_attr("gso", self.gso.as_deref());
        el.set_opt_attr("tso4", self.tso4.as_deref());
        el.set_opt_attr("tso6", self.tso6.as_deref());
        el.set_opt_attr("ecn", self.ecn.as_deref());
        el.set_opt_attr("ufo", self.ufo.as_deref());
        el.set_opt_attr("mrg_rxbuf", self.mrg_rxbuf.as_deref());
        Ok(el)
    }
}

impl XmlDecode for InterfaceDriverGuest {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceDriverGuest {
            csum: el.attr_string("csum"),
            tso4: el.attr_string("tso4"),
            tso6: el.attr_string("tso6"),
            ecn: el.attr_string("ecn"),
            ufo: el.attr_string("ufo"),
        })
    }
}

impl XmlEncode for InterfaceDriverGuest {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("csum", self.csum.as_deref());
        el.set_opt_attr("tso4", self.tso4.as_deref());
        el.set_opt_attr("tso6", self.tso6.as_deref());
        el.set_opt_attr("ecn", self.ecn.as_deref());
        el.set_opt_attr("ufo", self.ufo.as_deref());
        Ok(el)
    }
}

impl XmlDecode for InterfaceDriver {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceDriver {
            name: el.attr_string("name"),
            txmode: el.attr_string("txmode"),
            ioeventfd: el.attr_string("ioeventfd"),
            event_idx: el.attr_string("event_idx"),
            queues: ctx.uint_attr(el, "queues", Radix::Decimal)?,
            rx_queue_size: ctx.uint_attr(el, "rx_queue_size", Radix::Decimal)?,
            tx_queue_size: ctx.uint_attr(el, "tx_queue_size", Radix::Decimal)?,
            iommu: el.attr_string("iommu"),
            ats: el.attr_string("ats"),
            packed: el.attr_string("packed"),
            page_per_vq: el.attr_string("page_per_vq"),
            rss: el.attr_string("rss"),
            rss_hash_report: el.attr_string("rss_hash_report"),
            host: ctx.child(el, "host")?,
            guest: ctx.child(el, "guest")?,
        })
    }
}

impl XmlEncode for InterfaceDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("txmode", self.txmode.as_deref());
        el.set_opt_attr("ioeventfd", self.ioeventfd.as_deref());
        el.set_opt_attr("event_idx", self.event_idx.as_deref());
        el.set_uint("queues", self.queues, UintFormat::Decimal);
        el.set_uint("rx_queue_size", self.rx_queue_size, UintFormat::Decimal);
        el.set_uint("tx_queue_size", self.tx_queue_size, UintFormat::Decimal);
        el.set_opt_attr("iommu", self.iommu.as_deref());
        el.set_opt_attr("ats", self.ats.as_deref());
        el.set_opt_attr("packed", self.packed.as_deref());
        el.set_opt_attr("page_per_vq", self.page_per_vq.as_deref());
        el.set_opt_attr("rss", self.rss.as_deref());
        el.set_opt_attr("rss_hash_report", self.rss_hash_report.as_deref());
        el.push_opt("host", self.host.as_ref())?;
        el.push_opt("guest", self.guest.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for InterfaceBackend {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(InterfaceBackend {
            backend_type: el.attr_string("type"),
            tap: el.attr_string("tap"),
            vhost: el.attr_string("vhost"),
            log_file: el.attr_string("logFile"),
        })
    }
}

impl XmlEncode for InterfaceBackend {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.backend_type.as_deref());
        el.set_opt_attr("tap", self.tap.as_deref());
        el.set_opt_attr("vhost", self.vhost.as_deref());
        el.set_opt_attr("logFile", self.log_file.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Interface {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = variant::INTERFACE.select(el, ctx)?;
        let source = decode_source(kind, el, ctx)?;
        let frames = el
            .child("coalesce")
            .and_then(|coalesce| coalesce.child("rx"))
            .and_then(|rx| rx.child("frames"));
        Ok(Interface {
            managed: el.attr_string("managed"),
            trust_guest_rx_filters: el.attr_string("trustGuestRxFilters"),
            mac: ctx.child(el, "mac")?,
            source,
            boot: ctx.child(el, "boot")?,
            vlan: ctx.child(el, "vlan")?,
            virtualport: ctx.child(el, "virtualport")?,
            ips: ctx.children(el, "ip")?,
            routes: ctx.children(el, "route")?,
            port_forwards: ctx.children(el, "portForward")?,
            script: el.child_attr("script", "path"),
            downscript: el.child_attr("downscript", "path"),
            backend_domain: el.child_attr("backenddomain", "name"),
            target: ctx.child(el, "target")?,
            guest: ctx.child(el, "guest")?,
            model: el.child_attr("model", "type"),
            driver: ctx.child(el, "driver")?,
            backend: ctx.child(el, "backend")?,
            filterref: ctx.child(el, "filterref")?,
            tune_sndbuf: match el.child("tune") {
                Some(tune) => ctx.scoped("tune", |ctx| ctx.uint_text(tune, "sndbuf", Radix::Decimal))?,
                None => None,
            },
            teaming: ctx.child(el, "teaming")?,
            link_state: el.child_attr("link", "state"),
            mtu: match el.child("mtu") {
                Some(mtu) => ctx.scoped("mtu", |ctx| ctx.uint_attr(mtu, "size", Radix::Decimal))?,
                None => None,
            },
            bandwidth: ctx.child(el, "bandwidth")?,
            port: ctx.child(el, "port")?,
            coalesce_rx_frames_max: match frames {
                Some(frames) => ctx.uint_attr(frames, "max", Radix::Decimal)?,
                None => None,
            },
            rom: ctx.child(el, "rom")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Interface {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.source.discriminant());
        el.set_opt_attr("managed", self.managed.as_deref());
        el.set_opt_attr("trustGuestRxFilters", self.trust_guest_rx_filters.as_deref());
        el.push_opt("mac", self.mac.as_ref())?;
        if let Some(source) = source_element(&self.source)? {
            el.push(source);
        }
        el.push_opt("boot", self.boot.as_ref())?;
        el.push_opt("vlan", self.vlan.as_ref())?;
        el.push_opt("virtualport", self.virtualport.as_ref())?;
        el.push_all("ip", &self.ips)?;
        el.push_all("route", &self.routes)?;
        el.push_all("portForward", &self.port_forwards)?;
        el.push_attr_child("script", "path", self.script.as_deref());
        el.push_attr_child("downscript", "path", self.downscript.as_deref());
        el.push_attr_child("backenddomain", "name", self.backend_domain.as_deref());
        el.push_opt("target", self.target.as_ref())?;
        el.push_opt("guest", self.guest.as_ref())?;
        el.push_attr_child("model", "type", self.model.as_deref());
        el.push_opt("driver", self.driver.as_ref())?;
        el.push_opt("backend", self.backend.as_ref())?;
        el.push_opt("filterref", self.filterref.as_ref())?;
        if self.tune_sndbuf.is_some() {
            let mut tune = Element::new("tune");
            tune.push_uint_child("sndbuf", self.tune_sndbuf, UintFormat::Decimal);
            el.push(tune);
        }
        el.push_opt("teaming", self.teaming.as_ref())?;
        el.push_attr_child("link", "state", self.link_state.as_deref());
        if self.mtu.is_some() {
            let mut mtu = Element::new("mtu");
            mtu.set_uint("size", self.mtu, UintFormat::Decimal);
            el.push(mtu);
        }
        el.push_opt("bandwidth", self.bandwidth.as_ref())?;
        el.push_opt("port", self.port.as_ref())?;
        if self.coalesce_rx_frames_max.is_some() {
            let mut frames = Element::new("frames");
            frames.set_uint("max", self.coalesce_rx_frames_max, UintFormat::Decimal);
            let mut rx = Element::new("rx");
            rx.push(frames);
            let mut coalesce = Element::new("coalesce");
            coalesce.push(rx);
            el.push(coalesce);
        }
        el.push_opt("rom", self.rom.as_ref())?;
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
    use crate::model::netdev::{IpAddress, VirtualPort};

    fn decode(text: &str) -> Result<Interface, DecodeError> {
        let root = parse(text).unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        ctx.decode_at(&root, "interface")
    }

    fn encode(iface: &Interface) -> String {
        write(&iface.to_element("interface").unwrap(), &EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_network_interface() {
        let text = r#"<interface type="network"><mac address="52:54:00:6d:90:02"/><source network="default" portgroup="engineering"/><virtualport type="openvswitch"><parameters interfaceid="09b11c53-8b5c-4eeb-8f00-d84eaa0aaa4f"/></virtualport><target dev="vnet0"/><model type="virtio"/><alias name="net0"/><address type="pci" domain="0x0000" bus="0x01" slot="0x00" function="0x0"/></interface>"#;
        let iface = decode(text).unwrap();
        assert_eq!(
            iface.source,
            InterfaceSource::Network(InterfaceSourceNetwork {
                network: Some("default".to_string()),
                portgroup: Some("engineering".to_string()),
                ..Default::default()
            })
        );
        assert!(matches!(iface.virtualport, Some(VirtualPort::OpenVSwitch(_))));
        assert_eq!(encode(&iface), text);
    }

    #[test]
    fn test_hostdev_source_peeks_address_type() {
        let text = r#"<interface type="hostdev" managed="yes"><source><address type="pci" domain="0x0000" bus="0x00" slot="0x07" function="0x0"/></source></interface>"#;
        let iface = decode(text).unwrap();
        assert_eq!(
            iface.source,
            InterfaceSource::Hostdev(Some(InterfaceHostdevSource::Pci(PciAddress::new(0, 0, 7, 0))))
        );
        assert_eq!(encode(&iface), text);

        let usb = decode(r#"<interface type="hostdev"><source><address type="usb" bus="0" device="4"/></source></interface>"#).unwrap();
        assert!(matches!(usb.source, InterfaceSource::Hostdev(Some(InterfaceHostdevSource::Usb(_)))));

        let err = decode(r#"<interface type="hostdev"><source><address bus="0"/></source></interface>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { .. }));
        assert_eq!(err.path(), Some("/interface/source/address"));
    }

    #[test]
    fn test_type_is_required() {
        let err = decode(r#"<interface><source network="default"/></interface>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "interface", .. }));

        let err = decode(r#"<interface type="wireless"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "interface", .. }));
    }

    #[test]
    fn test_user_without_dev_has_no_source() {
        let iface = decode(r#"<interface type="user"><source/><model type="e1000"/></interface>"#).unwrap();
        assert_eq!(iface.source, InterfaceSource::User(InterfaceSourceUser::default()));
        assert_eq!(encode(&iface), r#"<interface type="user"><model type="e1000"/></interface>"#);
    }

    #[test]
    fn test_ethernet_addresses_on_interface() {
        let mut iface = Interface::new(InterfaceSource::Ethernet);
        iface.ips.push(IpAddress {
            address: "192.168.122.5".to_string(),
            prefix: Some(24),
            ..Default::default()
        });
        let text = encode(&iface);
        assert_eq!(text, r#"<interface type="ethernet"><ip address="192.168.122.5" prefix="24"/></interface>"#);
        assert_eq!(decode(&text).unwrap(), iface);
    }

    #[test]
    fn test_vhostuser_typed_source() {
        let text = r#"<interface type="vhostuser"><source type="unix" mode="server" path="/tmp/vhost1.sock"/><model type="virtio"/></interface>"#;
        let iface = decode(text).unwrap();
        assert_eq!(
            iface.source,
            InterfaceSource::VhostUser(ChardevSource::unix("/tmp/vhost1.sock", "server"))
        );
        assert_eq!(encode(&iface), text);
    }

    #[test]
    fn test_socket_source_with_local() {
        let text = r#"<interface type="udp"><source address="192.168.10.1" port="5555"><local address="127.0.0.1" port="6666"/></source></interface>"#;
        let iface = decode(text).unwrap();
        assert_eq!(encode(&iface), text);
    }

    #[test]
    fn test_tuning_children() {
        let text = r#"<interface type="bridge"><source bridge="br0"/><tune><sndbuf>1600</sndbuf></tune><link state="down"/><mtu size="9000"/><coalesce><rx><frames max="7"/></rx></coalesce></interface>"#;
        let iface = decode(text).unwrap();
        assert_eq!(iface.tune_sndbuf, Some(1600));
        assert_eq!(iface.mtu, Some(9000));
        assert_eq!(iface.coalesce_rx_frames_max, Some(7));
        assert_eq!(encode(&iface), text);
    }
}
