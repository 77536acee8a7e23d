//! Codec for virtual network definitions.

use tracing::debug;

use crate::codec::document::Document;
use crate::codec::namespace::{self, Extension};
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::common::PciAddress;
use crate::model::domain::Metadata;
use crate::model::extension::DnsmasqOptions;
use crate::model::network::*;

const EXTENSIONS: &[(&str, &str)] = &[(DnsmasqOptions::NAMESPACE, DnsmasqOptions::NAME)];

impl Document for Network {
    const ROOT: &'static str = "network";
}

impl XmlDecode for Network {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Network {
            ipv6: el.attr_string("ipv6"),
            trust_guest_rx_filters: el.attr_string("trustGuestRxFilters"),
            name: el.child_text("name"),
            uuid: el.child_text("uuid"),
            metadata: el.child("metadata").map(|metadata| Metadata {
                elements: metadata.elements().cloned().collect(),
            }),
            forward: ctx.child(el, "forward")?,
            bridge: ctx.child(el, "bridge")?,
            mtu: match el.child("mtu") {
                Some(mtu) => ctx.scoped("mtu", |ctx| ctx.required_uint_attr(mtu, "size", Radix::Decimal))
                    .map(Some)?,
                None => None,
            },
            mac: el.child_attr("mac", "address"),
            domain: ctx.child(el, "domain")?,
            dns: ctx.child(el, "dns")?,
            vlan: ctx.child(el, "vlan")?,
            bandwidth: ctx.child(el, "bandwidth")?,
            port_options: ctx.child(el, "port")?,
            ips: ctx.children(el, "ip")?,
            routes: ctx.children(el, "route")?,
            virtual_port: ctx.child(el, "virtualport")?,
            port_groups: ctx.children(el, "portgroup")?,
            dnsmasq_options: namespace::decode(el, ctx)?,
            foreign: namespace::foreign(el, EXTENSIONS, ctx),
        })
    }
}

impl XmlEncode for Network {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("ipv6", self.ipv6.as_deref());
        el.set_opt_attr("trustGuestRxFilters", self.trust_guest_rx_filters.as_deref());
        el.push_text_child("name", self.name.as_deref());
        el.push_text_child("uuid", self.uuid.as_deref());
        if let Some(metadata) = &self.metadata {
            let mut inner = Element::new("metadata");
            for child in &metadata.elements {
                inner.push(child.clone());
            }
            el.push(inner);
        }
        el.push_opt("forward", self.forward.as_ref())?;
        el.push_opt("bridge", self.bridge.as_ref())?;
        if let Some(size) = self.mtu {
            let mut mtu = Element::new("mtu");
            mtu.set_uint("size", Some(size), UintFormat::Decimal);
            el.push(mtu);
        }
        el.push_attr_child("mac", "address", self.mac.as_deref());
        el.push_opt("domain", self.domain.as_ref())?;
        el.push_opt("dns", self.dns.as_ref())?;
        el.push_opt("vlan", self.vlan.as_ref())?;
        el.push_opt("bandwidth", self.bandwidth.as_ref())?;
        el.push_opt("port", self.port_options.as_ref())?;
        el.push_all("ip", &self.ips)?;
        el.push_all("route", &self.routes)?;
        el.push_opt("virtualport", self.virtual_port.as_ref())?;
        el.push_all("portgroup", &self.port_groups)?;
        namespace::push(&mut el, self.dnsmasq_options.as_ref())?;
        namespace::finish_root(&mut el, &self.foreign);
        Ok(el)
    }
}

impl XmlDecode for NetworkBridge {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NetworkBridge {
            name: el.attr_string("name"),
            stp: el.attr_string("stp"),
            delay: el.attr_string("delay"),
            mac_table_manager: el.attr_string("macTableManager"),
            zone: el.attr_string("zone"),
        })
    }
}

impl XmlEncode for NetworkBridge {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("stp", self.stp.as_deref());
        el.set_opt_attr("delay", self.delay.as_deref());
        el.set_opt_attr("macTableManager", self.mac_table_manager.as_deref());
        el.set_opt_attr("zone", self.zone.as_deref());
        Ok(el)
    }
}

impl XmlDecode for NetworkDomain {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NetworkDomain {
            name: el.attr_string("name"),
            local_only: el.attr_string("localOnly"),
        })
    }
}

impl XmlEncode for NetworkDomain {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("localOnly", self.local_only.as_deref());
        Ok(el)
    }
}

// =============================================================================
// FORWARD
// =============================================================================

impl XmlDecode for NatAddressRange {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NatAddressRange {
            start: ctx.required_attr(el, "start")?,
            end: ctx.required_attr(el, "end")?,
        })
    }
}

impl XmlEncode for NatAddressRange {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("start", &self.start);
        el.set_attr("end", &self.end);
        Ok(el)
    }
}

impl XmlDecode for NatPortRange {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NatPortRange {
            start: ctx.required_uint_attr(el, "start", Radix::Decimal)?,
            end: ctx.required_uint_attr(el, "end", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for NatPortRange {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("start", Some(self.start), UintFormat::Decimal);
        el.set_uint("end", Some(self.end), UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for ForwardNat {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ForwardNat {
            ipv6: el.attr_string("ipv6"),
            addresses: ctx.children(el, "address")?,
            ports: ctx.children(el, "port")?,
        })
    }
}

impl XmlEncode for ForwardNat {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("ipv6", self.ipv6.as_deref());
        el.push_all("address", &self.addresses)?;
        el.push_all("port", &self.ports)?;
        Ok(el)
    }
}

impl XmlDecode for ForwardDriver {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ForwardDriver {
            name: el.attr_string("name"),
            model: el.attr_string("model"),
        })
    }
}

impl XmlEncode for ForwardDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("model", self.model.as_deref());
        Ok(el)
    }
}

/// Decodes a forward pool `<address>`, skipping one without a `type`.
fn forward_address(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<ForwardAddress>, DecodeError> {
    match variant::FORWARD_ADDRESS.select_opt(el) {
        None => {
            debug!(path = %ctx.path(), "skipping forward address without type");
            Ok(None)
        }
        Some("pci") => Ok(Some(ForwardAddress::Pci(PciAddress::from_element(el, ctx)?))),
        Some(other) => Err(ctx.unknown_discriminant(&variant::FORWARD_ADDRESS, other)),
    }
}

impl XmlEncode for ForwardAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = match self {
            ForwardAddress::Pci(addr) => addr.to_element(name)?,
        };
        el.set_discriminant("type", self.discriminant());
        Ok(el)
    }
}

impl XmlDecode for NetworkForward {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NetworkForward {
            mode: el.attr_string("mode"),
            dev: el.attr_string("dev"),
            managed: el.attr_string("managed"),
            driver: ctx.child(el, "driver")?,
            pfs: ctx.attr_list(el, "pf", "dev")?,
            nat: ctx.child(el, "nat")?,
            interfaces: ctx.attr_list(el, "interface", "dev")?,
            addresses: ctx.children_with(el, "address", forward_address)?,
        })
    }
}

impl XmlEncode for NetworkForward {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("mode", self.mode.as_deref());
        el.set_opt_attr("dev", self.dev.as_deref());
        el.set_opt_attr("managed", self.managed.as_deref());
        el.push_opt("driver", self.driver.as_ref())?;
        for pf in &self.pfs {
            el.push_attr_child("pf", "dev", Some(pf));
        }
        el.push_opt("nat", self.nat.as_ref())?;
        for dev in &self.interfaces {
            el.push_attr_child("interface", "dev", Some(dev));
        }
        el.push_all("address", &self.addresses)?;
        Ok(el)
    }
}

// =============================================================================
// ADDRESSING
// =============================================================================

impl XmlDecode for DhcpLease {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DhcpLease {
            expiry: ctx.required_uint_attr(el, "expiry", Radix::Decimal)?,
            unit: el.attr_string("unit"),
        })
    }
}

impl XmlEncode for DhcpLease {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("expiry", Some(self.expiry), UintFormat::Decimal);
        el.set_opt_attr("unit", self.unit.as_deref());
        Ok(el)
    }
}

impl XmlDecode for DhcpRange {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DhcpRange {
            start: el.attr_string("start"),
            end: el.attr_string("end"),
            lease: ctx.child(el, "lease")?,
        })
    }
}

impl XmlEncode for DhcpRange {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("start", self.start.as_deref());
        el.set_opt_attr("end", self.end.as_deref());
        el.push_opt("lease", self.lease.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for DhcpHost {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DhcpHost {
            id: el.attr_string("id"),
            mac: el.attr_string("mac"),
            name: el.attr_string("name"),
            ip: el.attr_string("ip"),
            lease: ctx.child(el, "lease")?,
        })
    }
}

impl XmlEncode for DhcpHost {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("id", self.id.as_deref());
        el.set_opt_attr("mac", self.mac.as_deref());
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("ip", self.ip.as_deref());
        el.push_opt("lease", self.lease.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Bootp {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Bootp {
            file: el.attr_string("file"),
            server: el.attr_string("server"),
        })
    }
}

impl XmlEncode for Bootp {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("file", self.file.as_deref());
        el.set_opt_attr("server", self.server.as_deref());
        Ok(el)
    }
}

impl XmlDecode for NetworkDhcp {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NetworkDhcp {
            ranges: ctx.children(el, "range")?,
            hosts: ctx.children(el, "host")?,
            bootp: ctx.children(el, "bootp")?,
        })
    }
}

impl XmlEncode for NetworkDhcp {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_all("range", &self.ranges)?;
        el.push_all("host", &self.hosts)?;
        el.push_all("bootp", &self.bootp)?;
        Ok(el)
    }
}

impl XmlDecode for NetworkIp {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NetworkIp {
            address: el.attr_string("address"),
            family: el.attr_string("family"),
            netmask: el.attr_string("netmask"),
            prefix: ctx.uint_attr(el, "prefix", Radix::Decimal)?,
            local_ptr: el.attr_string("localPtr"),
            dhcp: ctx.child(el, "dhcp")?,
            tftp_root: el.child_attr("tftp", "root"),
        })
    }
}

impl XmlEncode for NetworkIp {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("address", self.address.as_deref());
        el.set_opt_attr("family", self.family.as_deref());
        el.set_opt_attr("netmask", self.netmask.as_deref());
        el.set_uint("prefix", self.prefix, UintFormat::Decimal);
        el.set_opt_attr("localPtr", self.local_ptr.as_deref());
        el.push_opt("dhcp", self.dhcp.as_ref())?;
        el.push_attr_child("tftp", "root", self.tftp_root.as_deref());
        Ok(el)
    }
}

// =============================================================================
// DNS
// =============================================================================

impl XmlDecode for DnsForwarder {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DnsForwarder {
            domain: el.attr_string("domain"),
            addr: el.attr_string("addr"),
        })
    }
}

impl XmlEncode for DnsForwarder {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("domain", self.domain.as_deref());
        el.set_opt_attr("addr", self.addr.as_deref());
        Ok(el)
    }
}

impl XmlDecode for DnsTxt {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DnsTxt {
            name: ctx.required_attr(el, "name")?,
            value: el.attr_string("value").unwrap_or_default(),
        })
    }
}

impl XmlEncode for DnsTxt {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_attr("value", &self.value);
        Ok(el)
    }
}

impl XmlDecode for DnsHost {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DnsHost {
            ip: ctx.required_attr(el, "ip")?,
            hostnames: el.children_named("hostname").map(Element::text).collect(),
        })
    }
}

impl XmlEncode for DnsHost {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("ip", &self.ip);
        for hostname in &self.hostnames {
            el.push_text_child("hostname", Some(hostname));
        }
        Ok(el)
    }
}

impl XmlDecode for DnsSrv {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DnsSrv {
            service: el.attr_string("service"),
            protocol: el.attr_string("protocol"),
            target: el.attr_string("target"),
            port: ctx.uint_attr(el, "port", Radix::Decimal)?,
            priority: ctx.uint_attr(el, "priority", Radix::Decimal)?,
            weight: ctx.uint_attr(el, "weight", Radix::Decimal)?,
            domain: el.attr_string("domain"),
        })
    }
}

impl XmlEncode for DnsSrv {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("service", self.service.as_deref());
        el.set_opt_attr("protocol", self.protocol.as_deref());
        el.set_opt_attr("target", self.target.as_deref());
        el.set_uint("port", self.port, UintFormat::Decimal);
        el.set_uint("priority", self.priority, UintFormat::Decimal);
        el.set_uint("weight", self.weight, UintFormat::Decimal);
        el.set_opt_attr("domain", self.domain.as_deref());
        Ok(el)
    }
}

impl XmlDecode for NetworkDns {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NetworkDns {
            enable: el.attr_string("enable"),
            forward_plain_names: el.attr_string("forwardPlainNames"),
            forwarders: ctx.children(el, "forwarder")?,
            txts: ctx.children(el, "txt")?,
            hosts: ctx.children(el, "host")?,
            srvs: ctx.children(el, "srv")?,
        })
    }
}

impl XmlEncode for NetworkDns {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("enable", self.enable.as_deref());
        el.set_opt_attr("forwardPlainNames", self.forward_plain_names.as_deref());
        el.push_all("forwarder", &self.forwarders)?;
        el.push_all("txt", &self.txts)?;
        el.push_all("host", &self.hosts)?;
        el.push_all("srv", &self.srvs)?;
        Ok(el)
    }
}

// =============================================================================
// PORTGROUPS
// =============================================================================

impl XmlDecode for PortGroup {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PortGroup {
            name: ctx.required_attr(el, "name")?,
            default: el.attr_string("default"),
            trust_guest_rx_filters: el.attr_string("trustGuestRxFilters"),
            vlan: ctx.child(el, "vlan")?,
            virtual_port: ctx.child(el, "virtualport")?,
            bandwidth: ctx.child(el, "bandwidth")?,
        })
    }
}

impl XmlEncode for PortGroup {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_opt_attr("default", self.default.as_deref());
        el.set_opt_attr("trustGuestRxFilters", self.trust_guest_rx_filters.as_deref());
        el.push_opt("vlan", self.vlan.as_ref())?;
        el.push_opt("virtualport", self.virtual_port.as_ref())?;
        el.push_opt("bandwidth", self.bandwidth.as_ref())?;
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
    fn test_forward_pool_addresses() {
        let text = r#"<forward mode="hostdev" managed="yes"><driver name="vfio"/><address type="pci" domain="0x0000" bus="0x02" slot="0x00" function="0x1"/><address type="pci" domain="0x0000" bus="0x02" slot="0x00" function="0x2"/></forward>"#;
        let forward: NetworkForward = decode(text).unwrap();
        assert_eq!(forward.addresses.len(), 2);
        match &forward.addresses[1] {
            ForwardAddress::Pci(pci) => assert_eq!(pci.function, Some(2)),
        }
        assert_eq!(encode(&forward, "forward"), text);
    }

    #[test]
    fn test_forward_address_without_type_is_skipped() {
        let forward: NetworkForward = decode(r#"<forward mode="hostdev"><address bus="0x02"/></forward>"#).unwrap();
        assert!(forward.addresses.is_empty());
    }

    #[test]
    fn test_forward_address_unknown_type() {
        let err = decode::<NetworkForward>(r#"<forward><address type="usb"/></forward>"#).unwrap_err();
        assert_eq!(err.path(), Some("/address[1]"));

        let root = parse(r#"<forward><address type="usb"/></forward>"#).unwrap();
        let options = DecodeOptions::lenient();
        let mut ctx = DecodeContext::new(&options);
        let forward = NetworkForward::from_element(&root, &mut ctx).unwrap();
        assert!(forward.addresses.is_empty());
    }

    #[test]
    fn test_nat_and_interfaces() {
        let text = r#"<forward mode="nat" dev="eth0"><pf dev="eth2"/><nat ipv6="yes"><address start="1.2.3.4" end="1.2.3.10"/><port start="500" end="1000"/></nat><interface dev="eth3"/><interface dev="eth4"/></forward>"#;
        let forward: NetworkForward = decode(text).unwrap();
        assert_eq!(forward.interfaces, ["eth3", "eth4"]);
        assert_eq!(forward.pfs, ["eth2"]);
        assert_eq!(forward.nat.as_ref().unwrap().ports[0], NatPortRange { start: 500, end: 1000 });
        assert_eq!(encode(&forward, "forward"), text);
    }

    #[test]
    fn test_ip_with_dhcp() {
        let text = r#"<ip address="192.168.122.1" netmask="255.255.255.0" localPtr="yes"><dhcp><range start="192.168.122.2" end="192.168.122.254"><lease expiry="1" unit="hours"/></range><host mac="00:16:3e:77:e2:ed" name="foo.example.com" ip="192.168.122.10"/><bootp file="pxelinux.0" server="192.168.122.1"/></dhcp><tftp root="/var/lib/tftp"/></ip>"#;
        let ip: NetworkIp = decode(text).unwrap();
        let dhcp = ip.dhcp.as_ref().unwrap();
        assert_eq!(dhcp.ranges[0].lease.as_ref().unwrap().expiry, 1);
        assert_eq!(ip.tftp_root.as_deref(), Some("/var/lib/tftp"));
        assert_eq!(encode(&ip, "ip"), text);
    }

    #[test]
    fn test_dns() {
        let text = r#"<dns enable="yes" forwardPlainNames="no"><forwarder domain="example.com" addr="8.8.4.4"/><txt name="example" value="example value"/><host ip="192.168.122.2"><hostname>myhost</hostname><hostname>myhostalias</hostname></host><srv service="name" protocol="tcp" target="." port="1024" priority="10" weight="10" domain="domain.example"/></dns>"#;
        let dns: NetworkDns = decode(text).unwrap();
        assert_eq!(dns.hosts[0].hostnames.len(), 2);
        assert_eq!(dns.srvs[0].port, Some(1024));
        assert_eq!(encode(&dns, "dns"), text);
    }

    #[test]
    fn test_mtu_requires_size() {
        let err = decode::<Network>("<network><mtu/></network>").unwrap_err();
        assert!(matches!(err, DecodeError::MissingAttribute { .. }));
        assert_eq!(err.path(), Some("/mtu"));
    }
}
