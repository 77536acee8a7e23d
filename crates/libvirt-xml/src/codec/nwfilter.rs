//! Codec for network traffic filters.

use crate::codec::document::Document;
use crate::codec::scalar::{format_uint, Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::nwfilter::*;

impl Document for NwFilter {
    const ROOT: &'static str = "filter";
}

impl XmlDecode for NwFilter {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(NwFilter {
            name: ctx.required_attr(el, "name")?,
            uuid: el.child_text("uuid"),
            chain: el.attr_string("chain"),
            priority: ctx.int_attr(el, "priority")?,
            entries: ctx.elements_with(el, filter_entry)?,
        })
    }
}

impl XmlEncode for NwFilter {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_opt_attr("chain", self.chain.as_deref());
        el.set_int("priority", self.priority);
        el.push_text_child("uuid", self.uuid.as_deref());
        for entry in &self.entries {
            match entry {
                FilterEntry::Rule(rule) => el.push_child(entry.discriminant(), rule)?,
                FilterEntry::Ref(filter_ref) => el.push_child(entry.discriminant(), filter_ref)?,
            }
        }
        Ok(el)
    }
}

/// Entries are told apart by tag; `uuid` is the only other child.
fn filter_entry(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<FilterEntry>, DecodeError> {
    if el.prefix.is_some() {
        return Ok(None);
    }
    Ok(Some(match el.name.as_str() {
        "uuid" => return Ok(None),
        "rule" => FilterEntry::Rule(FilterRule::from_element(el, ctx)?),
        "filterref" => FilterEntry::Ref(FilterRef::from_element(el, ctx)?),
        other => return Err(ctx.unknown_discriminant(&variant::NWFILTER_ENTRY, other)),
    }))
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

impl XmlDecode for FilterParameter {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FilterParameter {
            name: ctx.required_attr(el, "name")?,
            value: ctx.required_attr(el, "value")?,
        })
    }
}

impl XmlEncode for FilterParameter {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_attr("value", &self.value);
        Ok(el)
    }
}

/// A rule's protocol is its first element child. An unknown protocol fails
/// the whole rule, so lenient decoding drops the rule rather than widening
/// it to match everything.
impl XmlDecode for FilterRule {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let protocol = match el.elements().next() {
            Some(child) => Some(ctx.scoped(child.qualified_name(), |ctx| rule_protocol(child, ctx))?),
            None => None,
        };
        Ok(FilterRule {
            action: el.attr_string("action"),
            direction: el.attr_string("direction"),
            priority: ctx.int_attr(el, "priority")?,
            state_match: el.attr_string("statematch"),
            protocol,
        })
    }
}

impl XmlEncode for FilterRule {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("action", self.action.as_deref());
        el.set_opt_attr("direction", self.direction.as_deref());
        el.set_int("priority", self.priority);
        el.set_opt_attr("statematch", self.state_match.as_deref());
        if let Some(protocol) = &self.protocol {
            el.push(protocol.to_element(protocol.body.discriminant())?);
        }
        Ok(el)
    }
}

// =============================================================================
// FIELD VALUES
// =============================================================================

fn field(el: &Element, name: &str, ctx: &DecodeContext<'_>) -> Result<Option<FieldValue>, DecodeError> {
    let Some(text) = el.attr(name) else {
        return Ok(None);
    };
    if text.is_empty() {
        return Ok(None);
    }
    if let Some(variable) = text.strip_prefix('$') {
        return Ok(Some(FieldValue::Variable(variable.to_string())));
    }
    if text.starts_with("0x") {
        return ctx.parse_uint_value(name, text, Radix::Hex).map(|value| Some(FieldValue::Uint(value)));
    }
    Ok(Some(FieldValue::Str(text.to_string())))
}

fn set_field(el: &mut Element, name: &str, value: &Option<FieldValue>) {
    match value {
        Some(FieldValue::Variable(variable)) => el.set_attr(name, format!("${}", variable)),
        Some(FieldValue::Uint(value)) => el.set_attr(name, format_uint(*value, UintFormat::HEX)),
        Some(FieldValue::Str(text)) => el.set_attr(name, text.as_str()),
        None => {}
    }
}

/// A group of rule attributes read and written as a unit.
trait FieldSet: Sized {
    fn read(el: &Element, ctx: &DecodeContext<'_>) -> Result<Self, DecodeError>;
    fn write(&self, el: &mut Element);
}

/// Implements [`FieldSet`] for a struct: flat fields map to attributes in
/// the listed order, nested field sets are spliced in place.
macro_rules! field_set {
    ($ty:ident { $($member:ident $(: $attr:literal)?),* $(,)? }) => {
        impl FieldSet for $ty {
            fn read(el: &Element, ctx: &DecodeContext<'_>) -> Result<Self, DecodeError> {
                Ok($ty {
                    $($member: field_set!(@read el, ctx, $member $(, $attr)?),)*
                })
            }

            fn write(&self, el: &mut Element) {
                $(field_set!(@write el, self.$member $(, $attr)?);)*
            }
        }
    };
    (@read $el:ident, $ctx:ident, $member:ident, $attr:literal) => {
        field($el, $attr, $ctx)?
    };
    (@read $el:ident, $ctx:ident, $member:ident) => {
        FieldSet::read($el, $ctx)?
    };
    (@write $el:ident, $value:expr, $attr:literal) => {
        set_field($el, $attr, &$value)
    };
    (@write $el:ident, $value:expr) => {
        $value.write($el)
    };
}

field_set!(MacMatch {
    src_mac_addr: "srcmacaddr",
    src_mac_mask: "srcmacmask",
    dst_mac_addr: "dstmacaddr",
    dst_mac_mask: "dstmacmask",
});

field_set!(MacRule {
    mac,
    protocol_id: "protocolid",
});

field_set!(VlanRule {
    mac,
    vlan_id: "vlanid",
    encap_protocol: "encap-protocol",
});

field_set!(StpMatch {
    src_mac_addr: "srcmacaddr",
    src_mac_mask: "srcmacmask",
    stp_type: "type",
    flags: "flags",
    root_priority: "root-priority",
    root_priority_hi: "root-priority-hi",
    root_address: "root-address",
    root_address_mask: "root-address-mask",
    root_cost: "root-cost",
    root_cost_hi: "root-cost-hi",
    sender_priority: "sender-priority",
    sender_priority_hi: "sender-priority-hi",
    sender_address: "sender-address",
    sender_address_mask: "sender-address-mask",
    port: "port",
    port_hi: "port-hi",
    age: "age",
    age_hi: "age-hi",
    max_age: "max-age",
    max_age_hi: "max-age-hi",
    hello_time: "hello-time",
    hello_time_hi: "hello-time-hi",
    forward_delay: "forward-delay",
    forward_delay_hi: "forward-delay-hi",
});

field_set!(ArpMatch {
    mac,
    hw_type: "hwtype",
    protocol_type: "protocoltype",
    opcode: "opcode",
    arp_src_mac_addr: "arpsrcmacaddr",
    arp_dst_mac_addr: "arpdstmacaddr",
    arp_src_ip_addr: "arpsrcipaddr",
    arp_src_ip_mask: "arpsrcipmask",
    arp_dst_ip_addr: "arpdstipaddr",
    arp_dst_ip_mask: "arpdstipmask",
    gratuitous: "gratuitous",
});

field_set!(PortRange {
    src_port_start: "srcportstart",
    src_port_end: "srcportend",
    dst_port_start: "dstportstart",
    dst_port_end: "dstportend",
});

field_set!(L3Match {
    src_ip_addr: "srcipaddr",
    src_ip_mask: "srcipmask",
    dst_ip_addr: "dstipaddr",
    dst_ip_mask: "dstipmask",
    protocol: "protocol",
});

field_set!(IpHeader {
    mac,
    l3,
    ports,
    dscp: "dscp",
});

field_set!(Ipv6Header {
    mac,
    l3,
    ports,
    icmp_type: "type",
    icmp_type_end: "typeend",
    icmp_code: "code",
    icmp_code_end: "codeend",
});

field_set!(IpMatch {
    src_mac_addr: "srcmacaddr",
    src_ip_addr: "srcipaddr",
    src_ip_mask: "srcipmask",
    dst_ip_addr: "dstipaddr",
    dst_ip_mask: "dstipmask",
    src_ip_from: "srcipfrom",
    src_ip_to: "srcipto",
    dst_ip_from: "dstipfrom",
    dst_ip_to: "dstipto",
    dscp: "dscp",
    conn_limit_above: "connlimit-above",
    state: "state",
    ipset: "ipset",
    ipset_flags: "ipsetflags",
});

field_set!(PortedMatch { ip, ports });

field_set!(TcpMatch {
    ip,
    ports,
    option: "option",
    flags: "flags",
});

field_set!(IcmpMatch {
    ip,
    icmp_type: "type",
    icmp_code: "code",
});

// =============================================================================
// PROTOCOLS
// =============================================================================

fn rule_protocol(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<RuleProtocol, DecodeError> {
    let body = match el.qualified_name().as_ref() {
        "mac" => ProtocolBody::Mac(FieldSet::read(el, ctx)?),
        "vlan" => ProtocolBody::Vlan(FieldSet::read(el, ctx)?),
        "stp" => ProtocolBody::Stp(FieldSet::read(el, ctx)?),
        "arp" => ProtocolBody::Arp(FieldSet::read(el, ctx)?),
        "rarp" => ProtocolBody::Rarp(FieldSet::read(el, ctx)?),
        "ip" => ProtocolBody::Ip(FieldSet::read(el, ctx)?),
        "ipv6" => ProtocolBody::Ipv6(FieldSet::read(el, ctx)?),
        "tcp" => ProtocolBody::Tcp(FieldSet::read(el, ctx)?),
        "udp" => ProtocolBody::Udp(FieldSet::read(el, ctx)?),
        "udplite" => ProtocolBody::UdpLite(FieldSet::read(el, ctx)?),
        "esp" => ProtocolBody::Esp(FieldSet::read(el, ctx)?),
        "ah" => ProtocolBody::Ah(FieldSet::read(el, ctx)?),
        "sctp" => ProtocolBody::Sctp(FieldSet::read(el, ctx)?),
        "icmp" => ProtocolBody::Icmp(FieldSet::read(el, ctx)?),
        "igmp" => ProtocolBody::Igmp(FieldSet::read(el, ctx)?),
        "all" => ProtocolBody::All(FieldSet::read(el, ctx)?),
        "tcp-ipv6" => ProtocolBody::TcpIpv6(FieldSet::read(el, ctx)?),
        "udp-ipv6" => ProtocolBody::UdpIpv6(FieldSet::read(el, ctx)?),
        "udplite-ipv6" => ProtocolBody::UdpLiteIpv6(FieldSet::read(el, ctx)?),
        "esp-ipv6" => ProtocolBody::EspIpv6(FieldSet::read(el, ctx)?),
        "ah-ipv6" => ProtocolBody::AhIpv6(FieldSet::read(el, ctx)?),
        "sctp-ipv6" => ProtocolBody::SctpIpv6(FieldSet::read(el, ctx)?),
        "icmpv6" => ProtocolBody::Icmpv6(FieldSet::read(el, ctx)?),
        "all-ipv6" => ProtocolBody::AllIpv6(FieldSet::read(el, ctx)?),
        other => return Err(ctx.unknown_discriminant(&variant::NWFILTER_PROTOCOL, other)),
    };
    Ok(RuleProtocol {
        matching: el.attr_string("match"),
        body,
        comment: el.attr_string("comment"),
    })
}

impl XmlEncode for RuleProtocol {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("match", self.matching.as_deref());
        match &self.body {
            ProtocolBody::Mac(body) => body.write(&mut el),
            ProtocolBody::Vlan(body) => body.write(&mut el),
            ProtocolBody::Stp(body) => body.write(&mut el),
            ProtocolBody::Arp(body) | ProtocolBody::Rarp(body) => body.write(&mut el),
            ProtocolBody::Ip(body) => body.write(&mut el),
            ProtocolBody::Ipv6(body) => body.write(&mut el),
            ProtocolBody::Tcp(body) | ProtocolBody::TcpIpv6(body) => body.write(&mut el),
            ProtocolBody::Udp(body)
            | ProtocolBody::Sctp(body)
            | ProtocolBody::UdpIpv6(body)
            | ProtocolBody::SctpIpv6(body) => body.write(&mut el),
            ProtocolBody::Icmp(body) | ProtocolBody::Icmpv6(body) => body.write(&mut el),
            ProtocolBody::UdpLite(body)
            | ProtocolBody::Esp(body)
            | ProtocolBody::Ah(body)
            | ProtocolBody::Igmp(body)
            | ProtocolBody::All(body)
            | ProtocolBody::UdpLiteIpv6(body)
            | ProtocolBody::EspIpv6(body)
            | ProtocolBody::AhIpv6(body)
            | ProtocolBody::AllIpv6(body) => body.write(&mut el),
        }
        el.set_opt_attr("comment", self.comment.as_deref());
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};

    fn compact(filter: &NwFilter) -> String {
        filter.encode_with_options(&EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_clean_traffic_roundtrip() {
        let text = concat!(
            r#"<filter name="clean-traffic" chain="root" priority="-500"><uuid>6ef53069-ba34-94a0-d33d-17751b9b8cb1</uuid>"#,
            r#"<filterref filter="no-mac-spoofing"/><filterref filter="allow-incoming-ipv4"><parameter name="IP" value="10.0.0.1"/></filterref>"#,
            r#"<rule action="accept" direction="out" priority="-650"><mac protocolid="ipv4"/></rule>"#,
            r#"<rule action="drop" direction="inout" priority="1000"><all/></rule>"#,
            r#"</filter>"#
        );
        let filter = NwFilter::decode(text).unwrap();
        assert_eq!(filter.priority, Some(-500));
        assert_eq!(filter.entries.len(), 4);
        match &filter.entries[2] {
            FilterEntry::Rule(rule) => {
                let protocol = rule.protocol.as_ref().unwrap();
                assert_eq!(
                    protocol.body,
                    ProtocolBody::Mac(MacRule {
                        protocol_id: Some(FieldValue::str("ipv4")),
                        ..MacRule::default()
                    })
                );
            }
            other => panic!("unexpected entry {:?}", other),
        }
        assert_eq!(compact(&filter), text);
    }

    #[test]
    fn test_field_values() {
        let text = concat!(
            r#"<filter name="f"><rule action="accept" direction="in">"#,
            r#"<tcp match="no" srcmacaddr="$MAC" srcipaddr="$IP[@1]" dscp="0x2e" state="NEW,ESTABLISHED" dstportstart="22" comment="ssh"/>"#,
            r#"</rule></filter>"#
        );
        let filter = NwFilter::decode(text).unwrap();
        let FilterEntry::Rule(rule) = &filter.entries[0] else {
            panic!("expected rule");
        };
        let protocol = rule.protocol.as_ref().unwrap();
        assert_eq!(protocol.matching.as_deref(), Some("no"));
        assert_eq!(protocol.comment.as_deref(), Some("ssh"));
        let ProtocolBody::Tcp(tcp) = &protocol.body else {
            panic!("expected tcp");
        };
        assert_eq!(tcp.ip.src_mac_addr, Some(FieldValue::var("MAC")));
        assert_eq!(tcp.ip.src_ip_addr, Some(FieldValue::var("IP[@1]")));
        assert_eq!(tcp.ip.dscp, Some(FieldValue::Uint(0x2e)));
        assert_eq!(tcp.ports.dst_port_start, Some(FieldValue::str("22")));
        assert_eq!(compact(&filter), text);
    }

    #[test]
    fn test_variable_encodes_with_dollar() {
        let mut filter = NwFilter::new("v");
        filter.entries.push(FilterEntry::Rule(FilterRule {
            action: Some("accept".to_string()),
            direction: Some("out".to_string()),
            protocol: Some(RuleProtocol {
                matching: None,
                body: ProtocolBody::Arp(ArpMatch {
                    arp_src_ip_addr: Some(FieldValue::var("IP")),
                    opcode: Some(FieldValue::Uint(1)),
                    ..ArpMatch::default()
                }),
                comment: None,
            }),
            ..FilterRule::default()
        }));
        let text = compact(&filter);
        assert_eq!(
            text,
            r#"<filter name="v"><rule action="accept" direction="out"><arp opcode="0x1" arpsrcipaddr="$IP"/></rule></filter>"#
        );
        assert_eq!(NwFilter::decode(&text).unwrap(), filter);
    }

    #[test]
    fn test_ipv6_and_stp_fields() {
        let text = concat!(
            r#"<filter name="f"><rule action="drop" direction="in"><ipv6 srcipaddr="fe80::" srcipmask="10" protocol="icmpv6" type="133" typeend="136"/></rule>"#,
            r#"<rule action="drop" direction="in"><stp type="0x80" root-priority="0x1000" forward-delay-hi="$DELAY"/></rule></filter>"#
        );
        let filter = NwFilter::decode(text).unwrap();
        let FilterEntry::Rule(rule) = &filter.entries[1] else {
            panic!("expected rule");
        };
        let ProtocolBody::Stp(stp) = &rule.protocol.as_ref().unwrap().body else {
            panic!("expected stp");
        };
        assert_eq!(stp.stp_type, Some(FieldValue::Uint(0x80)));
        assert_eq!(stp.forward_delay_hi, Some(FieldValue::var("DELAY")));
        assert_eq!(compact(&filter), text);
    }

    #[test]
    fn test_malformed_hex_field() {
        let text = r#"<filter name="f"><rule action="drop"><ip dscp="0xzz"/></rule></filter>"#;
        let err = NwFilter::decode(text).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedScalar { ref field, .. } if field == "dscp"));
        assert_eq!(err.path(), Some("/filter/rule[1]/ip"));
    }

    #[test]
    fn test_unknown_protocol_drops_rule_leniently() {
        let text = concat!(
            r#"<filter name="f"><rule action="drop"><gre/></rule>"#,
            r#"<rule action="accept"><udp dstportstart="53"/></rule></filter>"#
        );
        let err = NwFilter::decode(text).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "rule protocol", .. }));
        assert_eq!(err.path(), Some("/filter/rule[1]/gre"));

        let filter = NwFilter::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        assert_eq!(filter.entries.len(), 1);
        let FilterEntry::Rule(rule) = &filter.entries[0] else {
            panic!("expected rule");
        };
        assert_eq!(rule.action.as_deref(), Some("accept"));
    }

    #[test]
    fn test_unknown_entry_and_missing_name() {
        let err = NwFilter::decode(r#"<filter name="f"><chain/></filter>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "filter entry", .. }));
        assert_eq!(err.path(), Some("/filter/chain[1]"));

        let err = NwFilter::decode(r#"<filter><uuid>x</uuid></filter>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingAttribute { ref attr, .. } if attr == "name"));
    }
}
