//! Namespace extension slots.
//!
//! Driver-specific blocks sit in their own namespaces after the core elements
//! of a document. Decoding routes a child by its (namespace URI, local name)
//! pair; encoding writes the populated blocks in the document's fixed order,
//! followed by any preserved foreign elements, and declares every prefix on
//! the root element.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::error::{DecodeError, EncodeError};

pub const QEMU_NAMESPACE: &str = "http://libvirt.org/schemas/domain/qemu/1.0";
pub const LXC_NAMESPACE: &str = "http://libvirt.org/schemas/domain/lxc/1.0";
pub const BHYVE_NAMESPACE: &str = "http://libvirt.org/schemas/domain/bhyve/1.0";
pub const VMWARE_NAMESPACE: &str = "http://libvirt.org/schemas/domain/vmware/1.0";
pub const XEN_NAMESPACE: &str = "http://libvirt.org/schemas/domain/xen/1.0";
pub const DNSMASQ_NAMESPACE: &str = "http://libvirt.org/schemas/network/dnsmasq/1.0";
pub const FS_NAMESPACE: &str = "http://libvirt.org/schemas/storagepool/fs/1.0";
pub const RBD_NAMESPACE: &str = "http://libvirt.org/schemas/storagepool/rbd/1.0";

lazy_static! {
    /// Conventional prefix of every registered namespace.
    static ref PREFIXES: FxHashMap<&'static str, &'static str> = {
        let mut map = FxHashMap::default();
        map.insert(QEMU_NAMESPACE, "qemu");
        map.insert(LXC_NAMESPACE, "lxc");
        map.insert(BHYVE_NAMESPACE, "bhyve");
        map.insert(VMWARE_NAMESPACE, "vmware");
        map.insert(XEN_NAMESPACE, "xen");
        map.insert(DNSMASQ_NAMESPACE, "dnsmasq");
        map.insert(FS_NAMESPACE, "fs");
        map.insert(RBD_NAMESPACE, "rbd");
        map
    };
}

/// Returns the conventional prefix for a registered namespace.
pub fn prefix_for(namespace: &str) -> Option<&'static str> {
    PREFIXES.get(namespace).copied()
}

/// Returns true if the namespace has a registered extension block.
pub fn is_registered(namespace: &str) -> bool {
    PREFIXES.contains_key(namespace)
}

/// A typed block bound to one (namespace, element) pair.
///
/// `to_element` receives [`Extension::NAME`] and must return an element
/// qualified with [`Extension::NAMESPACE`], typically built with [`element`].
pub trait Extension: XmlDecode + XmlEncode {
    const NAMESPACE: &'static str;
    const NAME: &'static str;
}

/// Creates `name` in `namespace`, written with the registered prefix.
pub fn element(namespace: &str, name: &str) -> Element {
    Element::qualified(prefix_for(namespace).unwrap_or("ext"), namespace, name)
}

/// Decodes block `T` from the first matching child of `el`.
pub fn decode<T: Extension>(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<T>, DecodeError> {
    match el.children_in(T::NAMESPACE, T::NAME).next() {
        Some(child) => {
            let segment = child.qualified_name().into_owned();
            ctx.decode_at(child, segment).map(Some)
        }
        None => Ok(None),
    }
}

/// Appends block `T` if present.
pub fn push<T: Extension>(el: &mut Element, value: Option<&T>) -> Result<(), EncodeError> {
    if let Some(value) = value {
        el.push(value.to_element(T::NAME)?);
    }
    Ok(())
}

/// Collects the namespaced children of `el` that no typed block claims.
///
/// `known` lists the (namespace, name) pairs decoded into typed blocks; only
/// the first occurrence of each is claimed. Everything else in a namespace,
/// registered or not, is kept unless `preserve_foreign` is off.
pub fn foreign(el: &Element, known: &[(&str, &str)], ctx: &DecodeContext<'_>) -> Vec<Element> {
    let mut claimed = vec![false; known.len()];
    let mut out = Vec::new();
    for child in el.elements() {
        let Some(namespace) = child.namespace.as_deref() else {
            continue;
        };
        let slot = known
            .iter()
            .position(|(ns, name)| *ns == namespace && *name == child.name);
        if let Some(index) = slot {
            if !claimed[index] {
                claimed[index] = true;
                continue;
            }
        }
        if ctx.options().preserve_foreign {
            warn!(namespace, element = %child.name, path = %ctx.path(), "preserving foreign extension element");
            out.push(child.clone());
        } else {
            debug!(namespace, element = %child.name, path = %ctx.path(), "dropping foreign extension element");
        }
    }
    out
}

/// Appends preserved foreign elements and declares every prefix used by the
/// root's namespaced children on the root itself.
pub fn finish_root(root: &mut Element, foreign: &[Element]) {
    for el in foreign {
        root.push(el.clone());
    }
    let bindings: Vec<(String, String)> = root
        .elements()
        .filter_map(|child| match (&child.prefix, &child.namespace) {
            (Some(prefix), Some(namespace)) => Some((prefix.clone(), namespace.clone())),
            _ => None,
        })
        .collect();
    for (prefix, namespace) in bindings {
        root.declare_namespace(Some(&prefix), &namespace);
    }
}

/// Decodes the required string attribute `attr` of every `name` child in
/// `namespace`.
pub(crate) fn attr_list(
    el: &Element,
    namespace: &str,
    name: &str,
    attr: &str,
    ctx: &mut DecodeContext<'_>,
) -> Result<Vec<String>, DecodeError> {
    let mut out = Vec::new();
    for (index, child) in el.children_in(namespace, name).enumerate() {
        let segment = format!("{}[{}]", child.qualified_name(), index + 1);
        out.push(ctx.scoped(segment, |ctx| ctx.required_attr(child, attr))?);
    }
    Ok(out)
}

/// Appends `<prefix:name attr="value"/>` for every value.
pub(crate) fn push_attr_list(el: &mut Element, namespace: &str, name: &str, attr: &str, values: &[String]) {
    for value in values {
        let mut child = element(namespace, name);
        child.set_attr(attr, value.as_str());
        el.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::codec::tree::{parse, write};

    #[test]
    fn test_registry() {
        assert_eq!(prefix_for(QEMU_NAMESPACE), Some("qemu"));
        assert_eq!(prefix_for(RBD_NAMESPACE), Some("rbd"));
        assert!(is_registered(DNSMASQ_NAMESPACE));
        assert!(!is_registered("urn:example"));
    }

    #[test]
    fn test_foreign_routing_uses_namespace() {
        let root = parse(
            r#"<domain xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0" xmlns:x="urn:x">
                 <commandline/>
                 <qemu:commandline/>
                 <qemu:unknown/>
                 <x:commandline/>
               </domain>"#,
        )
        .unwrap();
        let options = DecodeOptions::default();
        let ctx = DecodeContext::new(&options);
        let kept = foreign(&root, &[(QEMU_NAMESPACE, "commandline")], &ctx);
        let names: Vec<_> = kept.iter().map(|el| el.qualified_name().into_owned()).collect();
        assert_eq!(names, ["qemu:unknown", "x:commandline"]);
    }

    #[test]
    fn test_foreign_dropped_when_disabled() {
        let root = parse(r#"<network xmlns:x="urn:x"><x:opts/></network>"#).unwrap();
        let options = DecodeOptions {
            preserve_foreign: false,
            ..DecodeOptions::default()
        };
        let ctx = DecodeContext::new(&options);
        assert!(foreign(&root, &[], &ctx).is_empty());
    }

    #[test]
    fn test_finish_root_declares_on_root() {
        let mut root = Element::new("network");
        let mut opts = element(DNSMASQ_NAMESPACE, "options");
        let mut option = element(DNSMASQ_NAMESPACE, "option");
        option.set_attr("value", "cache-size=0");
        opts.push(option);
        root.push(opts);
        finish_root(&mut root, &[Element::qualified("x", "urn:x", "extra")]);

        let text = write(&root, &EncodeOptions::compact()).unwrap();
        assert_eq!(
            text,
            r#"<network xmlns:dnsmasq="http://libvirt.org/schemas/network/dnsmasq/1.0" xmlns:x="urn:x"><dnsmasq:options><dnsmasq:option value="cache-size=0"/></dnsmasq:options><x:extra/></network>"#
        );
    }
}
