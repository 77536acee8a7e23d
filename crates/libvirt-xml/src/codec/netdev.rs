//! Codecs for shared network plumbing records.

use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::netdev::*;

impl XmlDecode for VirtualPort {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = variant::VIRTUALPORT.select_opt(el);
        let params = el.child("parameters");
        let attr = |name: &str| params.and_then(|p| p.attr_string(name));
        let uint = |ctx: &mut DecodeContext<'_>, name: &str| -> Result<Option<u32>, DecodeError> {
            match params {
                Some(p) => ctx.scoped("parameters", |ctx| ctx.uint_attr(p, name, Radix::Decimal)),
                None => Ok(None),
            }
        };
        Ok(match kind {
            None => VirtualPort::Any(VirtualPortAny {
                manager_id: uint(ctx, "managerid")?,
                type_id: uint(ctx, "typeid")?,
                type_id_version: uint(ctx, "typeidversion")?,
                instance_id: attr("instanceid"),
                profile_id: attr("profileid"),
                interface_id: attr("interfaceid"),
            }),
            Some("802.1Qbg") => VirtualPort::Vepa8021Qbg(VirtualPortVepa {
                manager_id: uint(ctx, "managerid")?,
                type_id: uint(ctx, "typeid")?,
                type_id_version: uint(ctx, "typeidversion")?,
                instance_id: attr("instanceid"),
            }),
            Some("802.1Qbh") => VirtualPort::Vntag8021Qbh(VirtualPortVntag {
                profile_id: attr("profileid"),
            }),
            Some("openvswitch") => VirtualPort::OpenVSwitch(VirtualPortOpenVSwitch {
                interface_id: attr("interfaceid"),
                profile_id: attr("profileid"),
            }),
            Some("midonet") => VirtualPort::MidoNet(VirtualPortMidoNet {
                interface_id: attr("interfaceid"),
            }),
            Some(other) => return Err(ctx.unknown_discriminant(&variant::VIRTUALPORT, other)),
        })
    }
}

impl XmlEncode for VirtualPort {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        if let Some(kind) = self.discriminant() {
            el.set_attr("type", kind);
        }
        let mut params = Element::new("parameters");
        match self {
            VirtualPort::Any(any) => {
                params.set_uint("managerid", any.manager_id, UintFormat::Decimal);
                params.set_uint("typeid", any.type_id, UintFormat::Decimal);
                params.set_uint("typeidversion", any.type_id_version, UintFormat::Decimal);
                params.set_opt_attr("instanceid", any.instance_id.as_deref());
                params.set_opt_attr("profileid", any.profile_id.as_deref());
                params.set_opt_attr("interfaceid", any.interface_id.as_deref());
            }
            VirtualPort::Vepa8021Qbg(vepa) => {
                params.set_uint("managerid", vepa.manager_id, UintFormat::Decimal);
                params.set_uint("typeid", vepa.type_id, UintFormat::Decimal);
                params.set_uint("typeidversion", vepa.type_id_version, UintFormat::Decimal);
                params.set_opt_attr("instanceid", vepa.instance_id.as_deref());
            }
            VirtualPort::Vntag8021Qbh(vntag) => {
                params.set_opt_attr("profileid", vntag.profile_id.as_deref());
            }
            VirtualPort::OpenVSwitch(ovs) => {
                params.set_opt_attr("interfaceid", ovs.interface_id.as_deref());
                params.set_opt_attr("profileid", ovs.profile_id.as_deref());
            }
            VirtualPort::MidoNet(midonet) => {
                params.set_opt_attr("interfaceid", midonet.interface_id.as_deref());
            }
        }
        if !params.is_empty() {
            el.push(params);
        }
        Ok(el)
    }
}

impl XmlDecode for BandwidthParams {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(BandwidthParams {
            average: ctx.uint_attr(el, "average", Radix::Decimal)?,
            peak: ctx.uint_attr(el, "peak", Radix::Decimal)?,
            burst: ctx.uint_attr(el, "burst", Radix::Decimal)?,
            floor: ctx.uint_attr(el, "floor", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for BandwidthParams {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("average", self.average, UintFormat::Decimal);
        el.set_uint("peak", self.peak, UintFormat::Decimal);
        el.set_uint("burst", self.burst, UintFormat::Decimal);
        el.set_uint("floor", self.floor, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for Bandwidth {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Bandwidth {
            class_id: ctx.uint_attr(el, "classID", Radix::Decimal)?,
            inbound: ctx.child(el, "inbound")?,
            outbound: ctx.child(el, "outbound")?,
        })
    }
}

impl XmlEncode for Bandwidth {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("classID", self.class_id, UintFormat::Decimal);
        el.push_opt("inbound", self.inbound.as_ref())?;
        el.push_opt("outbound", self.outbound.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for VlanTag {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VlanTag {
            id: ctx.required_uint_attr(el, "id", Radix::Decimal)?,
            native_mode: el.attr_string("nativeMode"),
        })
    }
}

impl XmlEncode for VlanTag {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("id", Some(self.id), UintFormat::Decimal);
        el.set_opt_attr("nativeMode", self.native_mode.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Vlan {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Vlan {
            trunk: el.attr_string("trunk"),
            tags: ctx.children(el, "tag")?,
        })
    }
}

impl XmlEncode for Vlan {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("trunk", self.trunk.as_deref());
        el.push_all("tag", &self.tags)?;
        Ok(el)
    }
}

impl XmlDecode for PortOptions {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PortOptions {
            isolated: el.attr_string("isolated"),
        })
    }
}

impl XmlEncode for PortOptions {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("isolated", self.isolated.as_deref());
        Ok(el)
    }
}

impl XmlDecode for FilterParam {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FilterParam {
            name: ctx.required_attr(el, "name")?,
            value: el.attr_string("value").unwrap_or_default(),
        })
    }
}

impl XmlEncode for FilterParam {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_attr("value", &self.value);
        Ok(el)
    }
}

impl XmlDecode for FilterRef {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FilterRef {
            filter: ctx.required_attr(el, "filter")?,
            parameters: ctx.children(el, "parameter")?,
        })
    }
}

impl XmlEncode for FilterRef {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("filter", &self.filter);
        el.push_all("parameter", &self.parameters)?;
        Ok(el)
    }
}

impl XmlDecode for IpAddress {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(IpAddress {
            address: el.attr_string("address").unwrap_or_default(),
            family: el.attr_string("family"),
            prefix: ctx.uint_attr(el, "prefix", Radix::Decimal)?,
            peer: el.attr_string("peer"),
        })
    }
}

impl XmlEncode for IpAddress {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("address", &self.address);
        el.set_opt_attr("family", self.family.as_deref());
        el.set_uint("prefix", self.prefix, UintFormat::Decimal);
        el.set_opt_attr("peer", self.peer.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Route {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Route {
            family: el.attr_string("family"),
            address: el.attr_string("address").unwrap_or_default(),
            netmask: el.attr_string("netmask"),
            prefix: ctx.uint_attr(el, "prefix", Radix::Decimal)?,
            gateway: el.attr_string("gateway").unwrap_or_default(),
            metric: ctx.uint_attr(el, "metric", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for Route {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("family", self.family.as_deref());
        el.set_attr("address", &self.address);
        el.set_opt_attr("netmask", self.netmask.as_deref());
        el.set_uint("prefix", self.prefix, UintFormat::Decimal);
        el.set_attr("gateway", &self.gateway);
        el.set_uint("metric", self.metric, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for Teaming {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Teaming {
            teaming_type: ctx.required_attr(el, "type")?,
            persistent: el.attr_string("persistent"),
        })
    }
}

impl XmlEncode for Teaming {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", &self.teaming_type);
        el.set_opt_attr("persistent", self.persistent.as_deref());
        Ok(el)
    }
}
