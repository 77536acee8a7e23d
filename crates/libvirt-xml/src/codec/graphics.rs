//! Graphics, audio, video and sound codecs.

use crate::codec::common::device_address;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::graphics::*;

// =============================================================================
// GRAPHICS
// =============================================================================

impl XmlDecode for GraphicsListen {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(match variant::GRAPHICS_LISTEN.select(el, ctx)? {
            "address" => GraphicsListen::Address {
                address: el.attr_string("address"),
            },
            "network" => GraphicsListen::Network {
                address: el.attr_string("address"),
                network: el.attr_string("network"),
            },
            "socket" => GraphicsListen::Socket {
                socket: el.attr_string("socket"),
            },
            "none" => GraphicsListen::None,
            other => return Err(ctx.unknown_discriminant(&variant::GRAPHICS_LISTEN, other)),
        })
    }
}

impl XmlEncode for GraphicsListen {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.discriminant());
        match self {
            GraphicsListen::Address { address } => el.set_opt_attr("address", address.as_deref()),
            GraphicsListen::Network { address, network } => {
                el.set_opt_attr("address", address.as_deref());
                el.set_opt_attr("network", network.as_deref());
            }
            GraphicsListen::Socket { socket } => el.set_opt_attr("socket", socket.as_deref()),
            GraphicsListen::None => {}
        }
        Ok(el)
    }
}

impl XmlDecode for GraphicsGl {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(GraphicsGl {
            enable: el.attr_string("enable"),
            rendernode: el.attr_string("rendernode"),
        })
    }
}

impl XmlEncode for GraphicsGl {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("enable", self.enable.as_deref());
        el.set_opt_attr("rendernode", self.rendernode.as_deref());
        Ok(el)
    }
}

impl XmlDecode for SpiceChannel {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SpiceChannel {
            name: ctx.required_attr(el, "name")?,
            mode: ctx.required_attr(el, "mode")?,
        })
    }
}

impl XmlEncode for SpiceChannel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        el.set_attr("mode", &self.mode);
        Ok(el)
    }
}

fn decode_kind(kind: &str, el: &Element, ctx: &mut DecodeContext<'_>) -> Result<GraphicsKind, DecodeError> {
    let attr = |name: &str| el.attr_string(name);
    Ok(match kind {
        "sdl" => GraphicsKind::Sdl(GraphicsSdl {
            display: attr("display"),
            xauth: attr("xauth"),
            fullscreen: attr("fullscreen"),
            gl_enable: el.child_attr("gl", "enable"),
        }),
        "vnc" => GraphicsKind::Vnc(GraphicsVnc {
            socket: attr("socket"),
            port: ctx.int_attr(el, "port")?,
            autoport: attr("autoport"),
            websocket: ctx.int_attr(el, "websocket")?,
            keymap: attr("keymap"),
            share_policy: attr("sharePolicy"),
            passwd: attr("passwd"),
            passwd_valid_to: attr("passwdValidTo"),
            connected: attr("connected"),
            power_control: attr("powerControl"),
            listen: attr("listen"),
            listeners: ctx.children(el, "listen")?,
        }),
        "rdp" => GraphicsKind::Rdp(GraphicsRdp {
            port: ctx.int_attr(el, "port")?,
            autoport: attr("autoport"),
            replace_user: attr("replaceUser"),
            multi_user: attr("multiUser"),
            listen: attr("listen"),
            listeners: ctx.children(el, "listen")?,
        }),
        "desktop" => GraphicsKind::Desktop(GraphicsDesktop {
            display: attr("display"),
            fullscreen: attr("fullscreen"),
        }),
        "spice" => GraphicsKind::Spice(GraphicsSpice {
            port: ctx.int_attr(el, "port")?,
            tls_port: ctx.int_attr(el, "tlsPort")?,
            autoport: attr("autoport"),
            listen: attr("listen"),
            keymap: attr("keymap"),
            default_mode: attr("defaultMode"),
            passwd: attr("passwd"),
            passwd_valid_to: attr("passwdValidTo"),
            connected: attr("connected"),
            listeners: ctx.children(el, "listen")?,
            channels: ctx.children(el, "channel")?,
            image_compression: el.child_attr("image", "compression"),
            jpeg_compression: el.child_attr("jpeg", "compression"),
            zlib_compression: el.child_attr("zlib", "compression"),
            playback_compression: el.child_attr("playback", "compression"),
            streaming_mode: el.child_attr("streaming", "mode"),
            mouse_mode: el.child_attr("mouse", "mode"),
            clipboard_copypaste: el.child_attr("clipboard", "copypaste"),
            filetransfer_enable: el.child_attr("filetransfer", "enable"),
            gl: ctx.child(el, "gl")?,
        }),
        "egl-headless" => GraphicsKind::EglHeadless {
            gl: ctx.child(el, "gl")?,
        },
        "dbus" => GraphicsKind::Dbus(GraphicsDbus {
            address: attr("address"),
            p2p: attr("p2p"),
            gl: ctx.child(el, "gl")?,
        }),
        other => return Err(ctx.unknown_discriminant(&variant::GRAPHICS, other)),
    })
}

fn encode_kind(el: &mut Element, kind: &GraphicsKind) -> Result<(), EncodeError> {
    match kind {
        GraphicsKind::Sdl(sdl) => {
            el.set_opt_attr("display", sdl.display.as_deref());
            el.set_opt_attr("xauth", sdl.xauth.as_deref());
            el.set_opt_attr("fullscreen", sdl.fullscreen.as_deref());
            el.push_attr_child("gl", "enable", sdl.gl_enable.as_deref());
        }
        GraphicsKind::Vnc(vnc) => {
            el.set_opt_attr("socket", vnc.socket.as_deref());
            el.set_int("port", vnc.port);
            el.set_opt_attr("autoport", vnc.autoport.as_deref());
            el.set_int("websocket", vnc.websocket);
            el.set_opt_attr("keymap", vnc.keymap.as_deref());
            el.set_opt_attr("sharePolicy", vnc.share_policy.as_deref());
            el.set_opt_attr("passwd", vnc.passwd.as_deref());
            el.set_opt_attr("passwdValidTo", vnc.passwd_valid_to.as_deref());
            el.set_opt_attr("connected", vnc.connected.as_deref());
            el.set_opt_attr("powerControl", vnc.power_control.as_deref());
            el.set_opt_attr("listen", vnc.listen.as_deref());
            el.push_all("listen", &vnc.listeners)?;
        }
        GraphicsKind::Rdp(rdp) => {
            el.set_int("port", rdp.port);
            el.set_opt_attr("autoport", rdp.autoport.as_deref());
            el.set_opt_attr("replaceUser", rdp.replace_user.as_deref());
            el.set_opt_attr("multiUser", rdp.multi_user.as_deref());
            el.set_opt_attr("listen", rdp.listen.as_deref());
            el.push_all("listen", &rdp.listeners)?;
        }
        GraphicsKind::Desktop(desktop) => {
            el.set_opt_attr("display", desktop.display.as_deref());
            el.set_opt_attr("fullscreen", desktop.fullscreen.as_deref());
        }
        GraphicsKind::Spice(spice) => {
            el.set_int("port", spice.port);
            el.set_int("tlsPort", spice.tls_port);
            el.set_opt_attr("autoport", spice.autoport.as_deref());
            el.set_opt_attr("listen", spice.listen.as_deref());
            el.set_opt_attr("keymap", spice.keymap.as_deref());
            el.set_opt_attr("defaultMode", spice.default_mode.as_deref());
            el.set_opt_attr("passwd", spice.passwd.as_deref());
            el.set_opt_attr("passwdValidTo", spice.passwd_valid_to.as_deref());
            el.set_opt_attr("connected", spice.connected.as_deref());
            el.push_all("listen", &spice.listeners)?;
            el.push_all("channel", &spice.channels)?;
            el.push_attr_child("image", "compression", spice.image_compression.as_deref());
            el.push_attr_child("jpeg", "compression", spice.jpeg_compression.as_deref());
            el.push_attr_child("zlib", "compression", spice.zlib_compression.as_deref());
            el.push_attr_child("playback", "compression", spice.playback_compression.as_deref());
            el.push_attr_child("streaming", "mode", spice.streaming_mode.as_deref());
            el.push_attr_child("mouse", "mode", spice.mouse_mode.as_deref());
            el.push_attr_child("clipboard", "copypaste", spice.clipboard_copypaste.as_deref());
            el.push_attr_child("filetransfer", "enable", spice.filetransfer_enable.as_deref());
            el.push_opt("gl", spice.gl.as_ref())?;
        }
        GraphicsKind::EglHeadless { gl } => el.push_opt("gl", gl.as_ref())?,
        GraphicsKind::Dbus(dbus) => {
            el.set_opt_attr("address", dbus.address.as_deref());
            el.set_opt_attr("p2p", dbus.p2p.as_deref());
            el.push_opt("gl", dbus.gl.as_ref())?;
        }
    }
    Ok(())
}

impl XmlDecode for Graphics {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let kind = variant::GRAPHICS.select(el, ctx)?;
        let kind = decode_kind(kind, el, ctx)?;
        let audio_id = match el.child("audio") {
            Some(audio) => ctx.scoped("audio", |ctx| ctx.uint_attr(audio, "id", Radix::Decimal))?,
            None => None,
        };
        Ok(Graphics { kind, audio_id })
    }
}

impl XmlEncode for Graphics {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", self.kind.discriminant());
        encode_kind(&mut el, &self.kind)?;
        if self.audio_id.is_some() {
            let mut audio = Element::new("audio");
            audio.set_uint("id", self.audio_id, UintFormat::Decimal);
            el.push(audio);
        }
        Ok(el)
    }
}

// =============================================================================
// AUDIO
// =============================================================================

impl XmlDecode for AudioSettings {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(AudioSettings {
            frequency: ctx.uint_attr(el, "frequency", Radix::Decimal)?,
            channels: ctx.uint_attr(el, "channels", Radix::Decimal)?,
            format: el.attr_string("format"),
        })
    }
}

impl XmlEncode for AudioSettings {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("frequency", self.frequency, UintFormat::Decimal);
        el.set_uint("channels", self.channels, UintFormat::Decimal);
        el.set_opt_attr("format", self.format.as_deref());
        Ok(el)
    }
}

impl XmlDecode for AudioChannel {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(AudioChannel {
            mixing_engine: el.attr_string("mixingEngine"),
            fixed_settings: el.attr_string("fixedSettings"),
            voices: ctx.uint_attr(el, "voices", Radix::Decimal)?,
            buffer_length: ctx.uint_attr(el, "bufferLength", Radix::Decimal)?,
            settings: ctx.child(el, "settings")?,
            dev: el.attr_string("dev"),
            buffer_count: ctx.uint_attr(el, "bufferCount", Radix::Decimal)?,
            try_poll: el.attr_string("tryPoll"),
            server_name: el.attr_string("serverName"),
            client_name: el.attr_string("clientName"),
            connect_ports: el.attr_string("connectPorts"),
            exact_name: el.attr_string("exactName"),
            name: el.attr_string("name"),
            stream_name: el.attr_string("streamName"),
            latency: ctx.uint_attr(el, "latency", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for AudioChannel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("mixingEngine", self.mixing_engine.as_deref());
        el.set_opt_attr("fixedSettings", self.fixed_settings.as_deref());
        el.set_uint("voices", self.voices, UintFormat::Decimal);
        el.set_uint("bufferLength", self.buffer_length, UintFormat::Decimal);
        el.set_opt_attr("dev", self.dev.as_deref());
        el.set_uint("bufferCount", self.buffer_count, UintFormat::Decimal);
        el.set_opt_attr("tryPoll", self.try_poll.as_deref());
        el.set_opt_attr("serverName", self.server_name.as_deref());
        el.set_opt_attr("clientName", self.client_name.as_deref());
        el.set_opt_attr("connectPorts", self.connect_ports.as_deref());
        el.set_opt_attr("exactName", self.exact_name.as_deref());
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("streamName", self.stream_name.as_deref());
        el.set_uint("latency", self.latency, UintFormat::Decimal);
        el.push_opt("settings", self.settings.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Audio {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let attr = |name: &str| el.attr_string(name);
        let backend = match variant::AUDIO.select(el, ctx)? {
            "none" => AudioBackend::None,
            "alsa" => AudioBackend::Alsa,
            "coreaudio" => AudioBackend::CoreAudio,
            "jack" => AudioBackend::Jack,
            "oss" => AudioBackend::Oss {
                try_mmap: attr("tryMMap"),
                exclusive: attr("exclusive"),
                dsp_policy: ctx.int_attr(el, "dspPolicy")?,
            },
            "pulseaudio" => AudioBackend::PulseAudio {
                server_name: attr("serverName"),
            },
            "sdl" => AudioBackend::Sdl { driver: attr("driver") },
            "spice" => AudioBackend::Spice,
            "file" => AudioBackend::File { path: attr("path") },
            "dbus" => AudioBackend::Dbus,
            "pipewire" => AudioBackend::PipeWire {
                runtime_dir: attr("runtimeDir"),
            },
            other => return Err(ctx.unknown_discriminant(&variant::AUDIO, other)),
        };
        Ok(Audio {
            id: ctx.required_uint_attr(el, "id", Radix::Decimal)?,
            timer_period: ctx.uint_attr(el, "timerPeriod", Radix::Decimal)?,
            backend,
            input: ctx.child(el, "input")?,
            output: ctx.child(el, "output")?,
        })
    }
}

impl XmlEncode for Audio {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("id", Some(self.id), UintFormat::Decimal);
        el.set_attr("type", self.backend.discriminant());
        el.set_uint("timerPeriod", self.timer_period, UintFormat::Decimal);
        match &self.backend {
            AudioBackend::Oss {
                try_mmap,
                exclusive,
                dsp_policy,
            } => {
                el.set_opt_attr("tryMMap", try_mmap.as_deref());
                el.set_opt_attr("exclusive", exclusive.as_deref());
                el.set_int("dspPolicy", *dsp_policy);
            }
            AudioBackend::PulseAudio { server_name } => el.set_opt_attr("serverName", server_name.as_deref()),
            AudioBackend::Sdl { driver } => el.set_opt_attr("driver", driver.as_deref()),
            AudioBackend::File { path } => el.set_opt_attr("path", path.as_deref()),
            AudioBackend::PipeWire { runtime_dir } => el.set_opt_attr("runtimeDir", runtime_dir.as_deref()),
            _ => {}
        }
        el.push_opt("input", self.input.as_ref())?;
        el.push_opt("output", self.output.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// VIDEO AND SOUND
// =============================================================================

impl XmlDecode for VideoAcceleration {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VideoAcceleration {
            accel3d: el.attr_string("accel3d"),
            accel2d: el.attr_string("accel2d"),
            rendernode: el.attr_string("rendernode"),
        })
    }
}

impl XmlEncode for VideoAcceleration {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("accel3d", self.accel3d.as_deref());
        el.set_opt_attr("accel2d", self.accel2d.as_deref());
        el.set_opt_attr("rendernode", self.rendernode.as_deref());
        Ok(el)
    }
}

impl XmlDecode for VideoResolution {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VideoResolution {
            x: ctx.required_uint_attr(el, "x", Radix::Decimal)?,
            y: ctx.required_uint_attr(el, "y", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for VideoResolution {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_uint("x", Some(self.x), UintFormat::Decimal);
        el.set_uint("y", Some(self.y), UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for VideoModel {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VideoModel {
            model_type: ctx.required_attr(el, "type")?,
            heads: ctx.uint_attr(el, "heads", Radix::Decimal)?,
            ram: ctx.uint_attr(el, "ram", Radix::Decimal)?,
            vram: ctx.uint_attr(el, "vram", Radix::Decimal)?,
            vram64: ctx.uint_attr(el, "vram64", Radix::Decimal)?,
            vgamem: ctx.uint_attr(el, "vgamem", Radix::Decimal)?,
            primary: el.attr_string("primary"),
            blob: el.attr_string("blob"),
            acceleration: ctx.child(el, "acceleration")?,
            resolution: ctx.child(el, "resolution")?,
        })
    }
}

impl XmlEncode for VideoModel {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("type", &self.model_type);
        el.set_uint("heads", self.heads, UintFormat::Decimal);
        el.set_uint("ram", self.ram, UintFormat::Decimal);
        el.set_uint("vram", self.vram, UintFormat::Decimal);
        el.set_uint("vram64", self.vram64, UintFormat::Decimal);
        el.set_uint("vgamem", self.vgamem, UintFormat::Decimal);
        el.set_opt_attr("primary", self.primary.as_deref());
        el.set_opt_attr("blob", self.blob.as_deref());
        el.push_opt("acceleration", self.acceleration.as_ref())?;
        el.push_opt("resolution", self.resolution.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for VideoDriver {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VideoDriver {
            name: el.attr_string("name"),
            vgaconf: el.attr_string("vgaconf"),
            iommu: el.attr_string("iommu"),
            ats: el.attr_string("ats"),
            packed: el.attr_string("packed"),
            page_per_vq: el.attr_string("page_per_vq"),
        })
    }
}

impl XmlEncode for VideoDriver {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("name", self.name.as_deref());
        el.set_opt_attr("vgaconf", self.vgaconf.as_deref());
        el.set_opt_attr("iommu", self.iommu.as_deref());
        el.set_opt_attr("ats", self.ats.as_deref());
        el.set_opt_attr("packed", self.packed.as_deref());
        el.set_opt_attr("page_per_vq", self.page_per_vq.as_deref());
        Ok(el)
    }
}

impl XmlDecode for Video {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(Video {
            model: ctx.required_child(el, "model")?,
            driver: ctx.child(el, "driver")?,
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Video {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_child("model", &self.model)?;
        el.push_opt("driver", self.driver.as_ref())?;
        el.push_opt("acpi", self.acpi.as_ref())?;
        el.push_opt("alias", self.alias.as_ref())?;
        el.push_opt("address", self.address.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for Sound {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let mut codecs = Vec::new();
        for (index, codec) in el.children_named("codec").enumerate() {
            let codec_type = ctx.scoped(format!("codec[{}]", index + 1), |ctx| ctx.required_attr(codec, "type"))?;
            codecs.push(codec_type);
        }
        Ok(Sound {
            model: ctx.required_attr(el, "model")?,
            multichannel: el.attr_string("multichannel"),
            streams: ctx.uint_attr(el, "streams", Radix::Decimal)?,
            codecs,
            audio_id: match el.child("audio") {
                Some(audio) => Some(ctx.scoped("audio", |ctx| ctx.required_uint_attr(audio, "id", Radix::Decimal))?),
                None => None,
            },
            acpi: ctx.child(el, "acpi")?,
            alias: ctx.child(el, "alias")?,
            address: device_address(el, ctx)?,
        })
    }
}

impl XmlEncode for Sound {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", &self.model);
        el.set_opt_attr("multichannel", self.multichannel.as_deref());
        el.set_uint("streams", self.streams, UintFormat::Decimal);
        for codec in &self.codecs {
            el.push_attr_child("codec", "type", Some(codec));
        }
        if self.audio_id.is_some() {
            let mut audio = Element::new("audio");
            audio.set_uint("id", self.audio_id, UintFormat::Decimal);
            el.push(audio);
        }
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

    fn decode<T: XmlDecode>(text: &str, name: &str) -> Result<T, DecodeError> {
        let root = parse(text).unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        ctx.decode_at(&root, name)
    }

    fn encode<T: XmlEncode>(value: &T, name: &str) -> String {
        write(&value.to_element(name).unwrap(), &EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_vnc_autoport() {
        let graphics = Graphics::vnc_autoport();
        let text = encode(&graphics, "graphics");
        assert_eq!(text, r#"<graphics type="vnc" port="-1" autoport="yes"/>"#);
        assert_eq!(decode::<Graphics>(&text, "graphics").unwrap(), graphics);
    }

    #[test]
    fn test_spice_with_listeners() {
        let text = r#"<graphics type="spice" port="5900" tlsPort="5901" autoport="no"><listen type="address" address="0.0.0.0"/><listen type="network" network="default"/><channel name="main" mode="secure"/><image compression="auto_glz"/><gl enable="yes" rendernode="/dev/dri/renderD128"/><audio id="1"/></graphics>"#;
        let graphics: Graphics = decode(text, "graphics").unwrap();
        let GraphicsKind::Spice(spice) = &graphics.kind else {
            panic!("expected spice graphics");
        };
        assert_eq!(spice.listeners.len(), 2);
        assert_eq!(spice.listeners[1].discriminant(), "network");
        assert_eq!(graphics.audio_id, Some(1));
        assert_eq!(encode(&graphics, "graphics"), text);
    }

    #[test]
    fn test_listen_type_required() {
        let err = decode::<Graphics>(r#"<graphics type="vnc"><listen address="::"/></graphics>"#, "graphics").unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "graphics listen", .. }));
        assert_eq!(err.path(), Some("/graphics/listen[1]"));
    }

    #[test]
    fn test_unknown_graphics() {
        let err = decode::<Graphics>(r#"<graphics type="x11"/>"#, "graphics").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "graphics", .. }));
    }

    #[test]
    fn test_audio_backend() {
        let text = r#"<audio id="1" type="pulseaudio" serverName="/run/user/1000/pulse/native"><input name="client" latency="100"/><output streamName="guest"><settings frequency="44100" channels="2"/></output></audio>"#;
        let audio: Audio = decode(text, "audio").unwrap();
        assert_eq!(
            audio.backend,
            AudioBackend::PulseAudio {
                server_name: Some("/run/user/1000/pulse/native".to_string())
            }
        );
        assert_eq!(audio.input.as_ref().and_then(|input| input.latency), Some(100));
        assert_eq!(encode(&audio, "audio"), text);

        let err = decode::<Audio>(r#"<audio type="none"/>"#, "audio").unwrap_err();
        assert!(matches!(err, DecodeError::MissingAttribute { .. }));
    }

    #[test]
    fn test_video_and_sound() {
        let text = r#"<video><model type="virtio" heads="1" primary="yes"><acceleration accel3d="yes"/><resolution x="1920" y="1080"/></model><alias name="video0"/></video>"#;
        let video: Video = decode(text, "video").unwrap();
        assert_eq!(video.model.resolution, Some(VideoResolution { x: 1920, y: 1080 }));
        assert_eq!(encode(&video, "video"), text);

        let text = r#"<sound model="ich9"><codec type="micro"/><audio id="1"/></sound>"#;
        let sound: Sound = decode(text, "sound").unwrap();
        assert_eq!(sound.codecs, vec!["micro".to_string()]);
        assert_eq!(encode(&sound, "sound"), text);
    }
}
