//! Host device codec: two-level dispatch on `mode` then `type`.

use tracing::debug;

use crate::codec::common::device_address;
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::hostdev::*;

fn decode_subsystem(kind: &str, el: &Element, ctx: &mut DecodeContext<'_>) -> Result<HostdevSubsystem, DecodeError> {
    let src = el.child("source");
    Ok(match kind {
        "scsi" => HostdevSubsystem::Scsi(HostdevScsi {
            sgio: el.attr_string("sgio"),
            rawio: el.attr_string("rawio"),
            source: ctx.child_with(el, "source", |src, ctx| scsi_source(src, ctx).map(Some))?,
            readonly: el.has_child("readonly"),
            shareable: el.has_child("shareable"),
        }),
        "scsi_host" => HostdevSubsystem::ScsiHost(HostdevScsiHost {
            model: el.attr_string("model"),
            protocol: src.and_then(|src| src.attr_string("protocol")),
            wwpn: src.and_then(|src| src.attr_string("wwpn")),
        }),
        "usb" => HostdevSubsystem::Usb(HostdevUsb {
            guest_reset: src.and_then(|src| src.attr_string("guestReset")),
            address: match src {
                Some(src) => ctx.scoped("source", |ctx| ctx.child(src, "address"))?,
                None => None,
            },
        }),
        "pci" => HostdevSubsystem::Pci(HostdevPci {
            display: el.attr_string("display"),
            ramfb: el.attr_string("ramfb"),
            driver: ctx.child(el, "driver")?,
            write_filtering: src.and_then(|src| src.attr_string("writeFiltering")),
            address: match src {
                Some(src) => ctx.scoped("source", |ctx| ctx.child(src, "address"))?,
                None => None,
            },
            teaming: ctx.child(el, "teaming")?,
        }),
        "mdev" => HostdevSubsystem::Mdev(HostdevMdev {
            model: el.attr_string("model"),
            display: el.attr_string("display"),
            ramfb: el.attr_string("ramfb"),
            address: match src {
                Some(src) => ctx.scoped("source", |ctx| ctx.child(src, "address"))?,
                None => None,
            },
        }),
        other => return Err(ctx.unknown_discriminant(&variant::HOSTDEV_SUBSYSTEM, other)),
    })
}

fn decode_capabilities(
    kind: &str,
    el: &Element,
    ctx: &mut DecodeContext<'_>,
) -> Result<HostdevCapabilities, DecodeError> {
    let src = el.child("source");
    let text = |name: &str| src.and_then(|src| src.child_text(name)).unwrap_or_default();
    Ok(match kind {
        "storage" => HostdevCapabilities::Storage { block: text("block") },
        "misc" => HostdevCapabilities::Misc { char_dev: text("char") },
        "net" => HostdevCapabilities::Net(HostdevCapsNet {
            interface: text("interface"),
            ips: ctx.children(el, "ip")?,
            routes: ctx.children(el, "route")?,
        }),
        other => return Err(ctx.unknown_discriminant(&variant::HOSTDEV_CAPABILITIES, other)),
    })
}

fn scsi_source(src: &Element, ctx: &mut DecodeContext<'_>) -> Result<HostdevScsiSource, DecodeError> {
    Ok(match variant::HOSTDEV_SCSI_SOURCE.select(src, ctx)? {
        "host" => HostdevScsiSource::Host(HostdevScsiHostSource {
            adapter: src.child_attr("adapter", "name"),
            address: ctx.child(src, "address")?,
        }),
        "iscsi" => HostdevScsiSource::Iscsi(HostdevScsiIscsiSource {
            name: ctx.required_attr(src, "name")?,
            hosts: ctx.children(src, "host")?,
            auth: ctx.child(src, "auth")?,
            initiator_iqn: src
                .child("initiator")
                .and_then(|initiator| initiator.child_attr("iqn", "name")),
        }),
        other => return Err(ctx.unknown_discriminant(&variant::HOSTDEV_SCSI_SOURCE, other)),
    })
}

fn scsi_source_element(source: &HostdevScsiSource) -> Result<Element, EncodeError> {
    let mut el = Element::new("source");
    if let Some(protocol) = source.discriminant() {
        el.set_attr("protocol", protocol);
    }
    match source {
        HostdevScsiSource::Host(host) => {
            el.push_attr_child("adapter", "name", host.adapter.as_deref());
            el.push_opt("address", host.address.as_ref())?;
        }
        HostdevScsiSource::Iscsi(iscsi) => {
            el.set_attr("name", &iscsi.name);
            el.push_all("host", &iscsi.hosts)?;
            el.push_opt("auth", iscsi.auth.as_ref())?;
            if let Some(iqn) = &iscsi.initiator_iqn {
                let mut initiator = Element::new("initiator");
                initiator.push_attr_child("iqn", "name", Some(iqn));
                el.push(initiator);
            }
        }
    }
    Ok(el)
}

/// Writes `<source>` holding a single `<address>`, omitting both when the
/// source has nothing to say.
fn push_address_source<T: XmlEncode>(
    el: &mut Element,
    attr: Option<(&str, &str)>,
    address: Option<&T>,
) -> Result<(), EncodeError> {
    let mut src = Element::new("source");
    if let Some((name, value)) = attr {
        src.set_attr(name, value);
    }
    src.push_opt("address", address)?;
    if !src.is_empty() {
        el.push(src);
    }
    Ok(())
}

fn encode_subsystem(el: &mut Element, subsystem: &HostdevSubsystem) -> Result<(), EncodeError> {
    match subsystem {
        HostdevSubsystem::Scsi(scsi) => {
            el.set_opt_attr("sgio", scsi.sgio.as_deref());
            el.set_opt_attr("rawio", scsi.rawio.as_deref());
            if let Some(source) = &scsi.source {
                el.push(scsi_source_element(source)?);
            }
            el.push_flag("readonly", scsi.readonly);
            el.push_flag("shareable", scsi.shareable);
        }
        HostdevSubsystem::ScsiHost(host) => {
            el.set_opt_attr("model", host.model.as_deref());
            let mut src = Element::new("source");
            src.set_opt_attr("protocol", host.protocol.as_deref());
            src.set_opt_attr("wwpn", host.wwpn.as_deref());
            if !src.is_empty() {
                el.push(src);
            }
        }
        HostdevSubsystem::Usb(usb) => {
            let guest_reset = usb.guest_reset.as_deref().map(|value| ("guestReset", value));
            push_address_source(el, guest_reset, usb.address.as_ref())?;
        }
        HostdevSubsystem::Pci(pci) => {
            el.set_opt_attr("display", pci.display.as_deref());
            el.set_opt_attr("ramfb", pci.ramfb.as_deref());
            el.push_opt("driver", pci.driver.as_ref())?;
            let filtering = pci.write_filtering.as_deref().map(|value| ("writeFiltering", value));
            push_address_source(el, filtering, pci.address.as_ref())?;
            el.push_opt("teaming", pci.teaming.as_ref())?;
        }
        HostdevSubsystem::Mdev(mdev) => {
            el.set_opt_attr("model", mdev.model.as_deref());
            el.set_opt_attr("display", mdev.display.as_deref());
            el.set_opt_attr("ramfb", mdev.ramfb.as_deref());
            push_address_source(el, None, mdev.address.as_ref())?;
        }
    }
    Ok(())
}

fn encode_capabilities(el: &mut Element, caps: &HostdevCapabilities) -> Result<(), EncodeError> {
    let mut src = Element::new("source");
    match caps {
        HostdevCapabilities::Storage { block } => src.push_text_child("block", Some(block)),
        HostdevCapabilities::Misc { char_dev } => src.push_text_child("char", Some(char_dev)),
        HostdevCapabilities::Net(net) => src.push_text_child("interface", Some(&net.interface)),
    }
    el.push(src);
    if let HostdevCapabilities::Net(net) = caps {
        el.push_all("ip", &net.ips)?;
        el.push_all("route", &net.routes)?;
    }
    Ok(())
}

impl XmlDecode for HostdevPciDriver {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HostdevPciDriver {
            name: el.attr_string("name"),
            model: el.attr_string("model"),
        })
    }
}

impl XmlEncode for HostdevPciDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("model", self.model.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Hostdev {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let mode = variant::HOSTDEV_MODE.select(el, ctx)?;
        let mode = match mode {
            "subsystem" => {
                let kind = variant::HOSTDEV_SUBSYSTEM.select(el, ctx)?;
                HostdevMode::Subsystem(decode_subsystem(kind, el, ctx)?)
            }
            "capabilities" => {
                let kind = variant::HOSTDEV_CAPABILITIES.select(el, ctx)?;
                HostdevMode::Capabilities(decode_capabilities(kind, el, ctx)?)
            }
            other => return Err(ctx.unknown_discriminant(&variant::HOSTDEV_MODE, other)),
        };
        debug!(mode = mode.discriminant(), kind = mode.kind(), path = %ctx.path(), "selected hostdev variant");
        Ok(Hostdev {
            managed: el.attr_string("managed"),
            mode,
            boot: ctx.child(el, "boot")?,
            rom: ctx.child(el, "rom")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Hostdev {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("mode", self.mode.discriminant());
        el.set_attr("type", self.mode.kind());
        el.set_opt_attr("managed", self.managed.as_deref());
        match &self.mode {
            HostdevMode::Subsystem(subsystem) => encode_subsystem(&mut el, subsystem)?,
            HostdevMode::Capabilities(caps) => encode_capabilities(&mut el, caps)?,
        }
        el.push_opt("boot", self.boot.as_ref())?;
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
    use crate::model::common::{DriveAddress, MdevAddress, PciAddress};
    use crate::model::netdev::IpAddress;

    fn decode_with(text: &str, options: &DecodeOptions) -> Result<Hostdev, DecodeError> {
        let root = parse(text).unwrap();
        let mut ctx = DecodeContext::new(options);
        ctx.decode_at(&root, "hostdev")
    }

    fn decode(text: &str) -> Result<Hostdev, DecodeError> {
        decode_with(text, &DecodeOptions::default())
    }

    fn encode(hostdev: &Hostdev) -> String {
        write(&hostdev.to_element("hostdev").unwrap(), &EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_pci_passthrough() {
        let text = r#"<hostdev mode="subsystem" type="pci" managed="yes"><driver name="vfio"/><source><address domain="0x0000" bus="0x06" slot="0x12" function="0x5"/></source><boot order="1"/></hostdev>"#;
        let hostdev = decode(text).unwrap();
        match &hostdev.mode {
            HostdevMode::Subsystem(HostdevSubsystem::Pci(pci)) => {
                assert_eq!(pci.address, Some(PciAddress::new(0, 6, 0x12, 5)));
                assert_eq!(pci.driver.as_ref().and_then(|d| d.name.as_deref()), Some("vfio"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
        assert_eq!(encode(&hostdev), text);
    }

    #[test]
    fn test_pci_constructor() {
        let hostdev = Hostdev::pci(PciAddress::new(0, 1, 2, 0));
        assert_eq!(
            encode(&hostdev),
            r#"<hostdev mode="subsystem" type="pci" managed="yes"><source><address domain="0x0000" bus="0x01" slot="0x02" function="0x0"/></source></hostdev>"#
        );
    }

    #[test]
    fn test_unknown_subsystem_type() {
        let err = decode(r#"<hostdev mode="subsystem" type="nosuchtype"/>"#).unwrap_err();
        match &err {
            DecodeError::UnknownDiscriminant { group, attr, value, path } => {
                assert_eq!(*group, "hostdev subsystem");
                assert_eq!(*attr, "type");
                assert_eq!(value, "nosuchtype");
                assert_eq!(path, "/hostdev");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_type_belongs_to_mode() {
        let err = decode(r#"<hostdev mode="capabilities" type="pci"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "hostdev capabilities", .. }));

        let err = decode(r#"<hostdev mode="passthrough" type="pci"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "hostdev", attr: "mode", .. }));

        let err = decode(r#"<hostdev mode="subsystem"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "hostdev subsystem", .. }));
    }

    #[test]
    fn test_lenient_children_drop_unknown() {
        let root = parse(
            r#"<devices><hostdev mode="subsystem" type="nosuchtype"/><hostdev mode="subsystem" type="usb"><source><address bus="1" device="3"/></source></hostdev></devices>"#,
        )
        .unwrap();
        let options = DecodeOptions::lenient();
        let mut ctx = DecodeContext::new(&options);
        let hostdevs: Vec<Hostdev> = ctx.children(&root, "hostdev").unwrap();
        assert_eq!(hostdevs.len(), 1);
        assert_eq!(hostdevs[0].mode.kind(), "usb");

        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        let err = ctx
            .scoped("devices", |ctx| ctx.children::<Hostdev>(&root, "hostdev"))
            .unwrap_err();
        assert_eq!(err.path(), Some("/devices/hostdev[1]"));
    }

    #[test]
    fn test_scsi_host_source() {
        let text = r#"<hostdev mode="subsystem" type="scsi" sgio="unfiltered"><source><adapter name="scsi_host0"/><address bus="0" target="0" unit="0"/></source><readonly/></hostdev>"#;
        let hostdev = decode(text).unwrap();
        let HostdevMode::Subsystem(HostdevSubsystem::Scsi(scsi)) = &hostdev.mode else {
            panic!("expected scsi hostdev");
        };
        assert_eq!(
            scsi.source,
            Some(HostdevScsiSource::Host(HostdevScsiHostSource {
                adapter: Some("scsi_host0".to_string()),
                address: Some(DriveAddress {
                    bus: Some(0),
                    target: Some(0),
                    unit: Some(0),
                    ..DriveAddress::default()
                }),
            }))
        );
        assert!(scsi.readonly);
        assert!(!scsi.shareable);
        assert_eq!(encode(&hostdev), text);
    }

    #[test]
    fn test_scsi_iscsi_source() {
        let text = r#"<hostdev mode="subsystem" type="scsi"><source protocol="iscsi" name="iqn.2014-08.com.example:iscsi-nopool/1"><host name="example.com" port="3260"/><initiator><iqn name="iqn.2020-07.com.example:test"/></initiator></source></hostdev>"#;
        let hostdev = decode(text).unwrap();
        let HostdevMode::Subsystem(HostdevSubsystem::Scsi(scsi)) = &hostdev.mode else {
            panic!("expected scsi hostdev");
        };
        let Some(HostdevScsiSource::Iscsi(iscsi)) = &scsi.source else {
            panic!("expected iscsi source");
        };
        assert_eq!(iscsi.hosts.len(), 1);
        assert_eq!(iscsi.initiator_iqn.as_deref(), Some("iqn.2020-07.com.example:test"));
        assert_eq!(encode(&hostdev), text);

        let err = decode(r#"<hostdev mode="subsystem" type="scsi"><source protocol="nbd"/></hostdev>"#).unwrap_err();
        assert_eq!(err.path(), Some("/hostdev/source"));
    }

    #[test]
    fn test_mdev_source() {
        let mut hostdev = Hostdev::new(HostdevMode::Subsystem(HostdevSubsystem::Mdev(HostdevMdev {
            model: Some("vfio-pci".to_string()),
            display: Some("on".to_string()),
            address: Some(MdevAddress {
                uuid: "c2177883-f1bb-47f0-914d-32a22e3a8804".to_string(),
            }),
            ..HostdevMdev::default()
        })));
        hostdev.managed = Some("no".to_string());
        let text = encode(&hostdev);
        assert_eq!(
            text,
            r#"<hostdev mode="subsystem" type="mdev" managed="no" model="vfio-pci" display="on"><source><address uuid="c2177883-f1bb-47f0-914d-32a22e3a8804"/></source></hostdev>"#
        );
        assert_eq!(decode(&text).unwrap(), hostdev);
    }

    #[test]
    fn test_capabilities_net() {
        let hostdev = Hostdev::new(HostdevMode::Capabilities(HostdevCapabilities::Net(HostdevCapsNet {
            interface: "eth0".to_string(),
            ips: vec![IpAddress {
                address: "192.168.122.2".to_string(),
                family: Some("ipv4".to_string()),
                ..IpAddress::default()
            }],
            routes: Vec::new(),
        })));
        let text = encode(&hostdev);
        assert_eq!(
            text,
            r#"<hostdev mode="capabilities" type="net"><source><interface>eth0</interface></source><ip address="192.168.122.2" family="ipv4"/></hostdev>"#
        );
        assert_eq!(decode(&text).unwrap(), hostdev);
    }

    #[test]
    fn test_capabilities_storage() {
        let text = r#"<hostdev mode="capabilities" type="storage"><source><block>/dev/sdf1</block></source></hostdev>"#;
        let hostdev = decode(text).unwrap();
        assert_eq!(
            hostdev.mode,
            HostdevMode::Capabilities(HostdevCapabilities::Storage {
                block: "/dev/sdf1".to_string()
            })
        );
        assert_eq!(encode(&hostdev), text);
    }
}
