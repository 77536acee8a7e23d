//! Display and media devices: graphics, audio backends, video and sound.

use crate::model::common::{Alias, DeviceAcpi, DeviceAddress};

// =============================================================================
// GRAPHICS
// =============================================================================

/// Where a graphics server listens, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsListen {
    Address { address: Option<String> },
    Network { address: Option<String>, network: Option<String> },
    Socket { socket: Option<String> },
    None,
}

impl GraphicsListen {
    pub fn discriminant(&self) -> &'static str {
        match self {
            GraphicsListen::Address { .. } => "address",
            GraphicsListen::Network { .. } => "network",
            GraphicsListen::Socket { .. } => "socket",
            GraphicsListen::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsSdl {
    pub display: Option<String>,
    pub xauth: Option<String>,
    pub fullscreen: Option<String>,
    pub gl_enable: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsVnc {
    pub socket: Option<String>,
    pub port: Option<i32>,
    pub autoport: Option<String>,
    pub websocket: Option<i32>,
    pub keymap: Option<String>,
    pub share_policy: Option<String>,
    pub passwd: Option<String>,
    pub passwd_valid_to: Option<String>,
    pub connected: Option<String>,
    pub power_control: Option<String>,
    pub listen: Option<String>,
    pub listeners: Vec<GraphicsListen>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsRdp {
    pub port: Option<i32>,
    pub autoport: Option<String>,
    pub replace_user: Option<String>,
    pub multi_user: Option<String>,
    pub listen: Option<String>,
    pub listeners: Vec<GraphicsListen>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsDesktop {
    pub display: Option<String>,
    pub fullscreen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpiceChannel {
    pub name: String,
    pub mode: String,
}

/// SPICE server. The compression and behaviour children are single-attribute
/// elements and are kept as plain values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsSpice {
    pub port: Option<i32>,
    pub tls_port: Option<i32>,
    pub autoport: Option<String>,
    pub listen: Option<String>,
    pub keymap: Option<String>,
    pub default_mode: Option<String>,
    pub passwd: Option<String>,
    pub passwd_valid_to: Option<String>,
    pub connected: Option<String>,
    pub listeners: Vec<GraphicsListen>,
    pub channels: Vec<SpiceChannel>,
    pub image_compression: Option<String>,
    pub jpeg_compression: Option<String>,
    pub zlib_compression: Option<String>,
    pub playback_compression: Option<String>,
    pub streaming_mode: Option<String>,
    pub mouse_mode: Option<String>,
    pub clipboard_copypaste: Option<String>,
    pub filetransfer_enable: Option<String>,
    pub gl: Option<GraphicsGl>,
}

/// OpenGL settings shared by spice, egl-headless and dbus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsGl {
    pub enable: Option<String>,
    pub rendernode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsDbus {
    pub address: Option<String>,
    pub p2p: Option<String>,
    pub gl: Option<GraphicsGl>,
}

/// A graphics framebuffer, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsKind {
    Sdl(GraphicsSdl),
    Vnc(GraphicsVnc),
    Rdp(GraphicsRdp),
    Desktop(GraphicsDesktop),
    Spice(GraphicsSpice),
    EglHeadless { gl: Option<GraphicsGl> },
    Dbus(GraphicsDbus),
}

impl GraphicsKind {
    pub fn discriminant(&self) -> &'static str {
        match self {
            GraphicsKind::Sdl(_) => "sdl",
            GraphicsKind::Vnc(_) => "vnc",
            GraphicsKind::Rdp(_) => "rdp",
            GraphicsKind::Desktop(_) => "desktop",
            GraphicsKind::Spice(_) => "spice",
            GraphicsKind::EglHeadless { .. } => "egl-headless",
            GraphicsKind::Dbus(_) => "dbus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphics {
    pub kind: GraphicsKind,
    /// Id of the `<audio>` backend used by the display.
    pub audio_id: Option<u32>,
}

impl Graphics {
    /// Creates a VNC server with automatic port allocation.
    pub fn vnc_autoport() -> Self {
        Self {
            kind: GraphicsKind::Vnc(GraphicsVnc {
                port: Some(-1),
                autoport: Some("yes".to_string()),
                ..GraphicsVnc::default()
            }),
            audio_id: None,
        }
    }
}

// =============================================================================
// AUDIO
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioSettings {
    pub frequency: Option<u32>,
    pub channels: Option<u32>,
    pub format: Option<String>,
}

/// One direction of an audio backend.
///
/// The common fields apply to every backend; the remaining ones are only
/// meaningful for the backends that define them and are left unset otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioChannel {
    pub mixing_engine: Option<String>,
    pub fixed_settings: Option<String>,
    pub voices: Option<u32>,
    pub buffer_length: Option<u32>,
    pub settings: Option<AudioSettings>,
    pub dev: Option<String>,
    pub buffer_count: Option<u32>,
    pub try_poll: Option<String>,
    pub server_name: Option<String>,
    pub client_name: Option<String>,
    pub connect_ports: Option<String>,
    pub exact_name: Option<String>,
    pub name: Option<String>,
    pub stream_name: Option<String>,
    pub latency: Option<u32>,
}

/// An audio backend, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioBackend {
    None,
    Alsa,
    CoreAudio,
    Jack,
    Oss {
        try_mmap: Option<String>,
        exclusive: Option<String>,
        dsp_policy: Option<i32>,
    },
    PulseAudio { server_name: Option<String> },
    Sdl { driver: Option<String> },
    Spice,
    File { path: Option<String> },
    Dbus,
    PipeWire { runtime_dir: Option<String> },
}

impl AudioBackend {
    pub fn discriminant(&self) -> &'static str {
        match self {
            AudioBackend::None => "none",
            AudioBackend::Alsa => "alsa",
            AudioBackend::CoreAudio => "coreaudio",
            AudioBackend::Jack => "jack",
            AudioBackend::Oss { .. } => "oss",
            AudioBackend::PulseAudio { .. } => "pulseaudio",
            AudioBackend::Sdl { .. } => "sdl",
            AudioBackend::Spice => "spice",
            AudioBackend::File { .. } => "file",
            AudioBackend::Dbus => "dbus",
            AudioBackend::PipeWire { .. } => "pipewire",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    pub id: u32,
    pub timer_period: Option<u32>,
    pub backend: AudioBackend,
    pub input: Option<AudioChannel>,
    pub output: Option<AudioChannel>,
}

// =============================================================================
// VIDEO AND SOUND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoAcceleration {
    pub accel3d: Option<String>,
    pub accel2d: Option<String>,
    pub rendernode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoResolution {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoModel {
    pub model_type: String,
    pub heads: Option<u32>,
    pub ram: Option<u32>,
    pub vram: Option<u32>,
    pub vram64: Option<u32>,
    pub vgamem: Option<u32>,
    pub primary: Option<String>,
    pub blob: Option<String>,
    pub acceleration: Option<VideoAcceleration>,
    pub resolution: Option<VideoResolution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoDriver {
    pub name: Option<String>,
    pub vgaconf: Option<String>,
    pub iommu: Option<String>,
    pub ats: Option<String>,
    pub packed: Option<String>,
    pub page_per_vq: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Video {
    pub model: VideoModel,
    pub driver: Option<VideoDriver>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sound {
    pub model: String,
    pub multichannel: Option<String>,
    pub streams: Option<u32>,
    pub codecs: Vec<String>,
    pub audio_id: Option<u32>,
    pub acpi: Option<DeviceAcpi>,
    pub alias: Option<Alias>,
    pub address: Option<DeviceAddress>,
}
