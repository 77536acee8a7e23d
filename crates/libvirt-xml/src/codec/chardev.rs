//! Character device codecs.

use crate::codec::common::device_address;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant::{self, Discriminant};
use crate::error::{DecodeError, EncodeError};
use crate::model::chardev::*;
use crate::model::common::{Alias, DeviceAcpi, DeviceAddress};

// =============================================================================
// SOURCES
// =============================================================================

/// Reads the source of a device whose own `type` attribute names the kind.
///
/// The `<source>` element is optional; when it is missing the variant named
/// by `type` (or the group default) is returned with empty fields.
pub(crate) fn device_source(
    el: &Element,
    ctx: &mut DecodeContext<'_>,
    group: &Discriminant,
) -> Result<ChardevSource, DecodeError> {
    let kind = group.select(el, ctx)?;
    let sources: Vec<&Element> = el.children_named("source").collect();
    ctx.scoped("source", |ctx| decode_payload(kind, &sources, ctx))?
        .ok_or_else(|| ctx.unknown_discriminant(group, kind))
}

/// Sets the device `type` attribute and appends the `<source>` elements.
pub(crate) fn push_device_source(el: &mut Element, source: &ChardevSource) -> Result<(), EncodeError> {
    el.set_discriminant("type", source.discriminant());
    for child in source_elements(source, "source")? {
        el.push(child);
    }
    Ok(())
}

/// Reads a source that carries its own `type`, e.g. `<source type="unix" path=…/>`.
pub(crate) fn typed_source(
    el: &Element,
    ctx: &mut DecodeContext<'_>,
    group: &Discriminant,
) -> Result<ChardevSource, DecodeError> {
    let kind = group.select(el, ctx)?;
    decode_payload(kind, &[el], ctx)?.ok_or_else(|| ctx.unknown_discriminant(group, kind))
}

/// Typed form defaulting to `unix`.
impl XmlDecode for ChardevSource {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        typed_source(el, ctx, &variant::CHARDEV_UNIX)
    }
}

impl XmlEncode for ChardevSource {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = source_elements(self, name)?
            .into_iter()
            .next()
            .unwrap_or_else(|| Element::new(name));
        el.set_discriminant("type", self.discriminant());
        Ok(el)
    }
}

/// Decodes the fields of source kind `kind`; `None` if the kind is unknown.
fn decode_payload(
    kind: &str,
    sources: &[&Element],
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<ChardevSource>, DecodeError> {
    let first = sources.first().copied();
    Ok(Some(match kind {
        "null" => ChardevSource::Null,
        "vc" => ChardevSource::Vc,
        "stdio" => ChardevSource::Stdio,
        "spicevmc" => ChardevSource::SpiceVmc,
        "pty" => ChardevSource::Pty(path_source(first, ctx)?),
        "dev" => ChardevSource::Dev(path_source(first, ctx)?),
        "pipe" => ChardevSource::Pipe(path_source(first, ctx)?),
        "file" => ChardevSource::File(match first {
            Some(src) => ChardevFile {
                path: src.attr_string("path"),
                append: src.attr_string("append"),
                seclabels: ctx.children(src, "seclabel")?,
            },
            None => ChardevFile::default(),
        }),
        "udp" => {
            let mut udp = ChardevUdp::default();
            for src in sources {
                if src.attr("mode") == Some("connect") {
                    udp.connect_host = src.attr_string("host");
                    udp.connect_service = src.attr_string("service");
                } else {
                    udp.bind_host = src.attr_string("host");
                    udp.bind_service = src.attr_string("service");
                }
            }
            ChardevSource::Udp(udp)
        }
        "tcp" => ChardevSource::Tcp(match first {
            Some(src) => ChardevTcp {
                mode: src.attr_string("mode"),
                host: src.attr_string("host"),
                service: src.attr_string("service"),
                tls: src.attr_string("tls"),
                reconnect: ctx.child(src, "reconnect")?,
            },
            None => ChardevTcp::default(),
        }),
        "unix" => ChardevSource::Unix(match first {
            Some(src) => ChardevUnix {
                mode: src.attr_string("mode"),
                path: src.attr_string("path"),
                reconnect: ctx.child(src, "reconnect")?,
                seclabels: ctx.children(src, "seclabel")?,
            },
            None => ChardevUnix::default(),
        }),
        "spiceport" => ChardevSource::SpicePort(ChardevSpicePort {
            channel: first.and_then(|src| src.attr_string("channel")).unwrap_or_default(),
        }),
        "nmdm" => ChardevSource::Nmdm(ChardevNmdm {
            master: first.and_then(|src| src.attr_string("master")).unwrap_or_default(),
            slave: first.and_then(|src| src.attr_string("slave")).unwrap_or_default(),
        }),
        "qemu-vdagent" => ChardevSource::QemuVdagent(ChardevQemuVdagent {
            mouse_mode: first
                .and_then(|src| src.child("mouse"))
                .and_then(|mouse| mouse.attr_string("mode")),
            copypaste: first
                .and_then(|src| src.child("clipboard"))
                .and_then(|clipboard| clipboard.attr_string("copypaste")),
        }),
        "dbus" => ChardevSource::Dbus(ChardevDbus {
            channel: first.and_then(|src| src.attr_string("channel")),
        }),
        _ => return Ok(None),
    }))
}

fn path_source(src: Option<&Element>, ctx: &mut DecodeContext<'_>) -> Result<ChardevPath, DecodeError> {
    match src {
        Some(src) => Ok(ChardevPath {
            path: src.attr_string("path"),
            seclabels: ctx.children(src, "seclabel")?,
        }),
        None => Ok(ChardevPath::default()),
    }
}

/// Builds the source elements for a chardev, applying the elision rules:
/// null, vc, stdio and spicevmc have none, pty only with a path, unix only
/// with a path or mode, udp one element per populated direction.
fn source_elements(source: &ChardevSource, name: &str) -> Result<Vec<Element>, EncodeError> {
    let mut out = Vec::new();
    match source {
        ChardevSource::Null | ChardevSource::Vc | ChardevSource::Stdio | ChardevSource::SpiceVmc => {}
        ChardevSource::Pty(pty) => {
            if pty.path.is_some() {
                out.push(path_element(name, pty)?);
            }
        }
        ChardevSource::Dev(dev) | ChardevSource::Pipe(dev) => out.push(path_element(name, dev)?),
        ChardevSource::File(file) => {
            let mut el = Element::new(name);
            el.set_opt_attr("path", file.path.as_deref());
            el.set_opt_attr("append", file.append.as_deref());
            el.push_all("seclabel", &file.seclabels)?;
            out.push(el);
        }
        ChardevSource::Udp(udp) => {
            for (mode, host, service) in [
                ("bind", &udp.bind_host, &udp.bind_service),
                ("connect", &udp.connect_host, &udp.connect_service),
            ] {
                if host.is_some() || service.is_some() {
                    let mut el = Element::new(name);
                    el.set_attr("mode", mode);
                    el.set_opt_attr("host", host.as_deref());
                    el.set_opt_attr("service", service.as_deref());
                    out.push(el);
                }
            }
        }
        ChardevSource::Tcp(tcp) => {
            let mut el = Element::new(name);
            el.set_opt_attr("mode", tcp.mode.as_deref());
            el.set_opt_attr("host", tcp.host.as_deref());
            el.set_opt_attr("service", tcp.service.as_deref());
            el.set_opt_attr("tls", tcp.tls.as_deref());
            el.push_opt("reconnect", tcp.reconnect.as_ref())?;
            out.push(el);
        }
        ChardevSource::Unix(unix) => {
            if unix.path.is_some() || unix.mode.is_some() {
                let mut el = Element::new(name);
                el.set_opt_attr("mode", unix.mode.as_deref());
                el.set_opt_attr("path", unix.path.as_deref());
                el.push_opt("reconnect", unix.reconnect.as_ref())?;
                el.push_all("seclabel", &unix.seclabels)?;
                out.push(el);
            }
        }
        ChardevSource::SpicePort(port) => {
            let mut el = Element::new(name);
            el.set_attr("channel", &port.channel);
            out.push(el);
        }
        ChardevSource::Nmdm(nmdm) => {
            let mut el = Element::new(name);
            el.set_attr("master", &nmdm.master);
            el.set_attr("slave", &nmdm.slave);
            out.push(el);
        }
        ChardevSource::QemuVdagent(agent) => {
            let mut el = Element::new(name);
            if let Some(mode) = &agent.mouse_mode {
                let mut mouse = Element::new("mouse");
                mouse.set_attr("mode", mode);
                el.push(mouse);
            }
            if let Some(copypaste) = &agent.copypaste {
                let mut clipboard = Element::new("clipboard");
                clipboard.set_attr("copypaste", copypaste);
                el.push(clipboard);
            }
            out.push(el);
        }
        ChardevSource::Dbus(dbus) => {
            let mut el = Element::new(name);
            el.set_opt_attr("channel", dbus.channel.as_deref());
            out.push(el);
        }
    }
    Ok(out)
}

fn path_element(name: &str, source: &ChardevPath) -> Result<Element, EncodeError> {
    let mut el = Element::new(name);
    el.set_opt_attr("path", source.path.as_deref());
    el.push_all("seclabel", &source.seclabels)?;
    Ok(el)
}

impl XmlDecode for ChardevReconnect {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ChardevReconnect {
            enabled: el.attr_string("enabled").unwrap_or_default(),
            timeout: ctx.uint_attr(el, "timeout", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for ChardevReconnect {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("enabled", &self.enabled);
        el.set_uint("timeout", self.timeout, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for ChardevProtocol {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ChardevProtocol {
            protocol_type: ctx.required_attr(el, "type")?,
        })
    }
}

impl XmlEncode for ChardevProtocol {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", &self.protocol_type);
        Ok(el)
    }
}

impl XmlDecode for ChardevLog {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(ChardevLog {
            file: ctx.required_attr(el, "file")?,
            append: el.attr_string("append"),
        })
    }
}

impl XmlEncode for ChardevLog {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("file", &self.file);
        el.set_opt_attr("append", self.append.as_deref());
        Ok(el)
    }
}

// =============================================================================
// TARGETS
// =============================================================================

impl XmlDecode for SerialTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SerialTarget {
            target_type: el.attr_string("type"),
            port: ctx.uint_attr(el, "port", Radix::Decimal)?,
            model: el.child("model").and_then(|model| model.attr_string("name")),
        })
    }
}

impl XmlEncode for SerialTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.target_type.as_deref());
        el.set_uint("port", self.port, UintFormat::Decimal);
        if let Some(model) = &self.model {
            let mut child = Element::new("model");
            child.set_attr("name", model);
            el.push(child);
        }
        Ok(el)
    }
}

impl XmlDecode for PortTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(PortTarget {
            target_type: el.attr_string("type"),
            port: ctx.uint_attr(el, "port", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for PortTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("type", self.target_type.as_deref());
        el.set_uint("port", self.port, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for ChannelTarget {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = variant::CHANNEL_TARGET.select(el, ctx)?;
        Ok(match kind {
            "virtio" => ChannelTarget::Virtio {
                name: el.attr_string("name"),
                state: el.attr_string("state"),
            },
            "xen" => ChannelTarget::Xen {
                name: el.attr_string("name"),
                state: el.attr_string("state"),
            },
            "guestfwd" => ChannelTarget::GuestFwd {
                address: el.attr_string("address"),
                port: el.attr_string("port"),
            },
            other => return Err(ctx.unknown_discriminant(&variant::CHANNEL_TARGET, other)),
        })
    }
}

impl XmlEncode for ChannelTarget {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            ChannelTarget::Virtio { name, state } | ChannelTarget::Xen { name, state } => {
                el.set_opt_attr("name", name.as_deref());
                el.set_opt_attr("state", state.as_deref());
            }
            ChannelTarget::GuestFwd { address, port } => {
                el.set_opt_attr("address", address.as_deref());
                el.set_opt_attr("port", port.as_deref());
            }
        }
        Ok(el)
    }
}

// =============================================================================
// DEVICES
// =============================================================================

/// Appends `log`, `acpi`, `alias` and `address`, the tail shared by all
/// character devices.
fn push_tail(
    el: &mut Element,
    log: Option<&ChardevLog>,
    acpi: Option<&DeviceAcpi>,
    alias: Option<&Alias>,
    address: Option<&DeviceAddress>,
) -> Result<(), EncodeError> {
    el.push_opt("log", log)?;
    el.push_opt("acpi", acpi)?;
    el.push_opt("alias", alias)?;
    el.push_opt("address", address)
}

impl XmlDecode for Serial {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Serial {
            source: device_source(el, ctx, &variant::CHARDEV_PTY)?,
            protocol: ctx.child(el, "protocol")?,
            target: ctx.child(el, "target")?,
            log: ctx.child(el, "log")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Serial {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        push_device_source(&mut el, &self.source)?;
        el.push_opt("protocol", self.protocol.as_ref())?;
        el.push_opt("target", self.target.as_ref())?;
        push_tail(&mut el, self.log.as_ref(), self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Parallel {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Parallel {
            source: device_source(el, ctx, &variant::CHARDEV_PTY)?,
            protocol: ctx.child(el, "protocol")?,
            target: ctx.child(el, "target")?,
            log: ctx.child(el, "log")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Parallel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        push_device_source(&mut el, &self.source)?;
        el.push_opt("protocol", self.protocol.as_ref())?;
        el.push_opt("target", self.target.as_ref())?;
        push_tail(&mut el, self.log.as_ref(), self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Console {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Console {
            tty: el.attr_string("tty"),
            source: device_source(el, ctx, &variant::CHARDEV_PTY)?,
            protocol: ctx.child(el, "protocol")?,
            target: ctx.child(el, "target")?,
            log: ctx.child(el, "log")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Console {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        push_device_source(&mut el, &self.source)?;
        el.set_opt_attr("tty", self.tty.as_deref());
        el.push_opt("protocol", self.protocol.as_ref())?;
        el.push_opt("target", self.target.as_ref())?;
        push_tail(&mut el, self.log.as_ref(), self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Channel {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        // The target decides the channel's shape, so it is read first.
        let target = match el.child("target") {
            Some(target) => ctx.decode_at(target, "target")?,
            None => return Err(ctx.missing_discriminant(&variant::CHANNEL_TARGET)),
        };
        Ok(Channel {
            source: device_source(el, ctx, &variant::CHARDEV_PTY)?,
            protocol: ctx.child(el, "protocol")?,
            target,
            log: ctx.child(el, "log")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Channel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        push_device_source(&mut el, &self.source)?;
        el.push_opt("protocol", self.protocol.as_ref())?;
        el.push_child("target", &self.target)?;
        push_tail(&mut el, self.log.as_ref(), self.acpi.as_ref(), self.alias.as_ref(), self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for RedirDev {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(RedirDev {
            bus: el.attr_string("bus"),
            source: device_source(el, ctx, &variant::CHARDEV_PTY)?,
            protocol: ctx.child(el, "protocol")?,
            boot: ctx.child(el, "boot")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for RedirDev {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        push_device_source(&mut el, &self.source)?;
        el.set_opt_attr("bus", self.bus.as_deref());
        el.push_opt("protocol", self.protocol.as_ref())?;
        el.push_opt("boot", self.boot.as_ref())?;
        el.push_opt("acpi", self.acpi.as_ref())?;
        el.push_opt("alias", self.alias.as_ref())?;
        el.push_opt("address", self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for RedirFilter {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(RedirFilter {
            usb: ctx.children(el, "usbdev")?,
        })
    }
}

impl XmlEncode for RedirFilter {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_all("usbdev", &self.usb)?;
        Ok(el)
    }
}

/// Any-value marker for redirection filter rules.
const ANY: &str = "-1";

fn any_or_uint(el: &Element, name: &str, ctx: &DecodeContext<'_>) -> Result<Option<u32>, DecodeError> {
    match el.attr(name) {
        Some(ANY) | None => Ok(None),
        Some(text) => ctx.parse_uint_value(name, text, Radix::Auto).map(Some),
    }
}

fn set_any_or_uint(el: &mut Element, name: &str, value: Option<u32>, format: UintFormat) {
    match value {
        Some(_) => el.set_uint(name, value, format),
        None => el.set_attr(name, ANY),
    }
}

impl XmlDecode for RedirFilterUsb {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(RedirFilterUsb {
            class: any_or_uint(el, "class", ctx)?,
            vendor: any_or_uint(el, "vendor", ctx)?,
            product: any_or_uint(el, "product", ctx)?,
            version: el.attr_string("version"),
            allow: el.attr_string("allow").unwrap_or_default(),
        })
    }
}

impl XmlEncode for RedirFilterUsb {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        set_any_or_uint(&mut el, "class", self.class, UintFormat::HEX2);
        set_any_or_uint(&mut el, "vendor", self.vendor, UintFormat::HEX4);
        set_any_or_uint(&mut el, "product", self.product, UintFormat::HEX4);
        el.set_opt_attr("version", self.version.as_deref());
        el.set_attr("allow", &self.allow);
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
    fn test_serial_defaults_to_pty() {
        let serial: Serial = decode(r#"<serial><target port="0"/></serial>"#).unwrap();
        assert_eq!(serial.source, ChardevSource::Pty(ChardevPath::default()));
        assert_eq!(
            encode(&serial, "serial"),
            r#"<serial type="pty"><target port="0"/></serial>"#
        );
    }

    #[test]
    fn test_pty_with_path_keeps_source() {
        let text = r#"<console type="pty" tty="/dev/pts/3"><source path="/dev/pts/3"/><target type="serial" port="0"/></console>"#;
        let console: Console = decode(text).unwrap();
        assert_eq!(encode(&console, "console"), text);
    }

    #[test]
    fn test_udp_bind_and_connect() {
        let text = r#"<serial type="udp"><source mode="bind" host="0.0.0.0" service="2445"/><source mode="connect" host="0.0.0.0" service="2444"/></serial>"#;
        let serial: Serial = decode(text).unwrap();
        match &serial.source {
            ChardevSource::Udp(udp) => {
                assert_eq!(udp.bind_service.as_deref(), Some("2445"));
                assert_eq!(udp.connect_service.as_deref(), Some("2444"));
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(encode(&serial, "serial"), text);
    }

    #[test]
    fn test_empty_unix_source_elided() {
        let serial = Serial {
            source: ChardevSource::Unix(ChardevUnix::default()),
            ..Serial::default()
        };
        assert_eq!(encode(&serial, "serial"), r#"<serial type="unix"/>"#);
    }

    #[test]
    fn test_channel_target_dispatch() {
        let text = r#"<channel type="unix"><source mode="bind" path="/var/lib/qemu/agent.sock"/><target type="virtio" name="org.qemu.guest_agent.0"/></channel>"#;
        let channel: Channel = decode(text).unwrap();
        assert_eq!(
            channel.target,
            ChannelTarget::Virtio {
                name: Some("org.qemu.guest_agent.0".to_string()),
                state: None,
            }
        );
        assert_eq!(encode(&channel, "channel"), text);
    }

    #[test]
    fn test_channel_target_required() {
        let err = decode::<Channel>(r#"<channel type="pty"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "channel target", .. }));

        let err = decode::<Channel>(r#"<channel type="pty"><target type="spice"/></channel>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "channel target", .. }));
    }

    #[test]
    fn test_unknown_chardev_type() {
        let err = decode::<Serial>(r#"<serial type="teletype"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "chardev", .. }));
        assert_eq!(err.path(), Some("/"));

        let err = decode::<Serial>(r#"<serial type="teletype"><source path="/dev/ttyS0"/></serial>"#).unwrap_err();
        assert_eq!(err.path(), Some("/"));

        let err = decode::<ChardevSource>(r#"<source type="teletype"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "chardev source", .. }));
    }

    #[test]
    fn test_typed_source_defaults_to_unix() {
        let source: ChardevSource = decode(r#"<source path="/run/pr-helper.sock" mode="client"/>"#).unwrap();
        assert_eq!(source, ChardevSource::unix("/run/pr-helper.sock", "client"));
        assert_eq!(
            encode(&source, "source"),
            r#"<source type="unix" mode="client" path="/run/pr-helper.sock"/>"#
        );
    }

    #[test]
    fn test_redirfilter_any() {
        let text = r#"<usbdev class="0x08" vendor="-1" product="0x2007" version="1.10" allow="yes"/>"#;
        let rule: RedirFilterUsb = decode(text).unwrap();
        assert_eq!(rule.class, Some(8));
        assert_eq!(rule.vendor, None);
        assert_eq!(rule.product, Some(0x2007));
        assert_eq!(encode(&rule, "usbdev"), text);
    }
}
