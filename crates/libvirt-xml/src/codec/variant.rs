//! Variant group descriptors.
//!
//! A variant group is a set of mutually exclusive shapes selected by a
//! discriminant attribute. Each group is described once here, together with
//! the value assumed when the attribute is absent. The decoders read the
//! discriminant through [`Discriminant::select`] and `match` on the result;
//! the encoders take the string from the enum's `discriminant()` method.

use tracing::debug;

use crate::codec::traits::DecodeContext;
use crate::codec::tree::Element;
use crate::error::DecodeError;

/// Describes how one variant group is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discriminant {
    /// Group name used in error messages.
    pub group: &'static str,
    /// Attribute holding the discriminant. Groups selected by a child's tag
    /// name use `element`.
    pub attr: &'static str,
    /// Value assumed when the attribute is absent.
    pub default: Option<&'static str>,
}

impl Discriminant {
    /// A group whose discriminant is required.
    pub const fn new(group: &'static str, attr: &'static str) -> Self {
        Self {
            group,
            attr,
            default: None,
        }
    }

    /// A group that falls back to `default` when the attribute is absent.
    pub const fn with_default(group: &'static str, attr: &'static str, default: &'static str) -> Self {
        Self {
            group,
            attr,
            default: Some(default),
        }
    }

    /// Reads the discriminant of `el`.
    ///
    /// Falls back to the group default when the attribute is absent, and
    /// fails with `MissingDiscriminant` when the group has none.
    pub fn select<'e>(&self, el: &'e Element, ctx: &DecodeContext<'_>) -> Result<&'e str, DecodeError> {
        match el.attr(self.attr) {
            Some(value) => Ok(value),
            None => match self.default {
                Some(default) => {
                    debug!(group = self.group, default, path = %ctx.path(), "defaulted discriminant");
                    Ok(default)
                }
                None => Err(ctx.missing_discriminant(self)),
            },
        }
    }

    /// Reads the discriminant of `el`, returning `None` when it is absent
    /// and the group has no default.
    pub fn select_opt<'e>(&self, el: &'e Element) -> Option<&'e str> {
        el.attr(self.attr).or(self.default)
    }

    /// Reads the discriminant from an optional element, applying the default
    /// when the element itself is missing.
    pub fn select_in<'e>(&self, el: Option<&'e Element>, ctx: &DecodeContext<'_>) -> Result<&'e str, DecodeError> {
        match el {
            Some(el) => self.select(el, ctx),
            None => self.default.ok_or_else(|| ctx.missing_discriminant(self)),
        }
    }
}

// =============================================================================
// DOMAIN
// =============================================================================

pub const DISK_SOURCE: Discriminant = Discriminant::with_default("disk", "type", "file");
pub const BACKING_STORE: Discriminant = Discriminant::with_default("backingStore", "type", "file");
pub const DISK_MIRROR: Discriminant = Discriminant::with_default("mirror", "type", "file");
pub const NVME_SOURCE: Discriminant = Discriminant::new("nvme source", "type");
pub const CONTROLLER: Discriminant = Discriminant::new("controller", "type");
pub const FILESYSTEM: Discriminant = Discriminant::with_default("filesystem", "type", "mount");
pub const INTERFACE: Discriminant = Discriminant::new("interface", "type");
pub const INTERFACE_HOSTDEV_ADDRESS: Discriminant = Discriminant::new("interface hostdev address", "type");
pub const VIRTUALPORT: Discriminant = Discriminant::new("virtualport", "type");
pub const SMARTCARD: Discriminant = Discriminant::new("smartcard", "mode");
pub const CHARDEV_PTY: Discriminant = Discriminant::with_default("chardev", "type", "pty");
pub const CHARDEV_UNIX: Discriminant = Discriminant::with_default("chardev source", "type", "unix");
pub const CHANNEL_TARGET: Discriminant = Discriminant::new("channel target", "type");
pub const INPUT: Discriminant = Discriminant::new("input", "type");
pub const TPM_BACKEND: Discriminant = Discriminant::new("tpm backend", "type");
pub const TPM_SOURCE: Discriminant = Discriminant::new("tpm source", "type");
pub const RNG_BACKEND: Discriminant = Discriminant::new("rng backend", "model");
pub const CRYPTO_BACKEND: Discriminant = Discriminant::new("crypto backend", "model");
pub const HOSTDEV_MODE: Discriminant = Discriminant::new("hostdev", "mode");
pub const HOSTDEV_SUBSYSTEM: Discriminant = Discriminant::new("hostdev subsystem", "type");
pub const HOSTDEV_CAPABILITIES: Discriminant = Discriminant::new("hostdev capabilities", "type");
pub const HOSTDEV_SCSI_SOURCE: Discriminant = Discriminant::with_default("hostdev scsi source", "protocol", "host");
pub const GRAPHICS: Discriminant = Discriminant::new("graphics", "type");
pub const GRAPHICS_LISTEN: Discriminant = Discriminant::new("graphics listen", "type");
pub const AUDIO: Discriminant = Discriminant::new("audio", "type");
pub const ADDRESS: Discriminant = Discriminant::new("address", "type");
pub const LAUNCH_SECURITY: Discriminant = Discriminant::new("launchSecurity", "type");
pub const SYSINFO: Discriminant = Discriminant::new("sysinfo", "type");

// =============================================================================
// NETWORK, PORT, STORAGE, SNAPSHOT
// =============================================================================

pub const FORWARD_ADDRESS: Discriminant = Discriminant::new("forward address", "type");
pub const PORT_PLUG: Discriminant = Discriminant::new("plug", "type");
pub const POOL_ADAPTER: Discriminant = Discriminant::with_default("adapter", "type", "scsi_host");
pub const POOL_AUTH: Discriminant = Discriminant::new("auth", "type");
pub const SNAPSHOT_DISK: Discriminant = Discriminant::with_default("snapshot disk", "type", "file");

// =============================================================================
// NODE DEVICE
// =============================================================================

pub const NODE_CAPABILITY: Discriminant = Discriminant::new("capability", "type");
pub const PCI_CAPABILITY: Discriminant = Discriminant::new("pci capability", "type");
pub const VPD_FIELDS: Discriminant = Discriminant::new("vpd fields", "access");
pub const NET_CAPABILITY: Discriminant = Discriminant::new("net capability", "type");
pub const SCSI_HOST_CAPABILITY: Discriminant = Discriminant::new("scsi_host capability", "type");
pub const SCSI_TARGET_CAPABILITY: Discriminant = Discriminant::new("scsi_target capability", "type");
pub const STORAGE_CAPABILITY: Discriminant = Discriminant::new("storage capability", "type");
pub const MDEV_TYPES_CAPABILITY: Discriminant = Discriminant::new("mdev_types capability", "type");

// =============================================================================
// NWFILTER, HOST INTERFACE, CAPABILITIES
// =============================================================================

pub const NWFILTER_ENTRY: Discriminant = Discriminant::new("filter entry", "element");
pub const NWFILTER_PROTOCOL: Discriminant = Discriminant::new("rule protocol", "element");
pub const HOST_INTERFACE: Discriminant = Discriminant::new("host interface", "type");
pub const BOND_MONITOR: Discriminant = Discriminant::new("bond monitor", "element");
pub const CPU_MODE: Discriminant = Discriminant::new("cpu mode", "name");

/// Every group, for auditing the default table.
pub const DEFAULTS: &[Discriminant] = &[
    DISK_SOURCE,
    BACKING_STORE,
    DISK_MIRROR,
    NVME_SOURCE,
    CONTROLLER,
    FILESYSTEM,
    INTERFACE,
    INTERFACE_HOSTDEV_ADDRESS,
    VIRTUALPORT,
    SMARTCARD,
    CHARDEV_PTY,
    CHARDEV_UNIX,
    CHANNEL_TARGET,
    INPUT,
    TPM_BACKEND,
    TPM_SOURCE,
    RNG_BACKEND,
    CRYPTO_BACKEND,
    HOSTDEV_MODE,
    HOSTDEV_SUBSYSTEM,
    HOSTDEV_CAPABILITIES,
    HOSTDEV_SCSI_SOURCE,
    GRAPHICS,
    GRAPHICS_LISTEN,
    AUDIO,
    ADDRESS,
    LAUNCH_SECURITY,
    SYSINFO,
    FORWARD_ADDRESS,
    PORT_PLUG,
    POOL_ADAPTER,
    POOL_AUTH,
    SNAPSHOT_DISK,
    NODE_CAPABILITY,
    PCI_CAPABILITY,
    VPD_FIELDS,
    NET_CAPABILITY,
    SCSI_HOST_CAPABILITY,
    SCSI_TARGET_CAPABILITY,
    STORAGE_CAPABILITY,
    MDEV_TYPES_CAPABILITY,
    NWFILTER_ENTRY,
    NWFILTER_PROTOCOL,
    HOST_INTERFACE,
    BOND_MONITOR,
    CPU_MODE,
];

/// Returns the default for the named group, if it declares one.
pub fn default_for(group: &str) -> Option<&'static str> {
    DEFAULTS
        .iter()
        .find(|d| d.group == group)
        .and_then(|d| d.default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::DecodeOptions;
    use crate::codec::tree::parse;

    #[test]
    fn test_select_present() {
        let el = parse(r#"<disk type="block"/>"#).unwrap();
        let options = DecodeOptions::default();
        let ctx = DecodeContext::new(&options);
        assert_eq!(DISK_SOURCE.select(&el, &ctx).unwrap(), "block");
    }

    #[test]
    fn test_select_default() {
        let el = parse("<disk/>").unwrap();
        let options = DecodeOptions::default();
        let ctx = DecodeContext::new(&options);
        assert_eq!(DISK_SOURCE.select(&el, &ctx).unwrap(), "file");
        assert_eq!(CHARDEV_PTY.select(&el, &ctx).unwrap(), "pty");
        assert_eq!(CHARDEV_UNIX.select(&el, &ctx).unwrap(), "unix");
    }

    #[test]
    fn test_select_required() {
        let el = parse(r#"<hostdev type="pci"/>"#).unwrap();
        let options = DecodeOptions::default();
        let ctx = DecodeContext::new(&options);
        let err = HOSTDEV_MODE.select(&el, &ctx).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingDiscriminant { group: "hostdev", attr: "mode", .. }
        ));
        assert_eq!(HOSTDEV_SUBSYSTEM.select(&el, &ctx).unwrap(), "pci");
    }

    #[test]
    fn test_select_in_missing_element() {
        let options = DecodeOptions::default();
        let ctx = DecodeContext::new(&options);
        assert_eq!(POOL_ADAPTER.select_in(None, &ctx).unwrap(), "scsi_host");
        assert!(CHANNEL_TARGET.select_in(None, &ctx).is_err());
    }

    #[test]
    fn test_group_names_unique() {
        let mut seen = rustc_hash::FxHashSet::default();
        for group in DEFAULTS {
            assert!(seen.insert(group.group), "group {:?} declared twice", group.group);
        }
    }

    #[test]
    fn test_default_table() {
        assert_eq!(default_for("disk"), Some("file"));
        assert_eq!(default_for("filesystem"), Some("mount"));
        assert_eq!(default_for("adapter"), Some("scsi_host"));
        assert_eq!(default_for("hostdev scsi source"), Some("host"));
        assert_eq!(default_for("chardev"), Some("pty"));
        assert_eq!(default_for("chardev source"), Some("unix"));
        assert_eq!(default_for("hostdev"), None);
        assert_eq!(default_for("graphics"), None);
    }
}
