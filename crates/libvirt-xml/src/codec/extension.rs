//! Codecs for the namespaced extension blocks.

use crate::codec::namespace::{
    attr_list, element, push_attr_list, Extension, BHYVE_NAMESPACE, DNSMASQ_NAMESPACE, FS_NAMESPACE,
    LXC_NAMESPACE, QEMU_NAMESPACE, RBD_NAMESPACE, VMWARE_NAMESPACE, XEN_NAMESPACE,
};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::error::{DecodeError, EncodeError};
use crate::model::extension::*;

fn env_list(el: &Element, namespace: &str, ctx: &mut DecodeContext<'_>) -> Result<Vec<EnvVar>, DecodeError> {
    let mut out = Vec::new();
    for (index, child) in el.children_in(namespace, "env").enumerate() {
        let segment = format!("{}[{}]", child.qualified_name(), index + 1);
        let name = ctx.scoped(segment, |ctx| ctx.required_attr(child, "name"))?;
        out.push(EnvVar {
            name,
            value: child.attr_string("value"),
        });
    }
    Ok(out)
}

fn push_env_list(el: &mut Element, namespace: &str, envs: &[EnvVar]) {
    for env in envs {
        let mut child = element(namespace, "env");
        child.set_attr("name", env.name.as_str());
        child.set_opt_attr("value", env.value.as_deref());
        el.push(child);
    }
}

// =============================================================================
// QEMU
// =============================================================================

impl Extension for QemuCommandline {
    const NAMESPACE: &'static str = QEMU_NAMESPACE;
    const NAME: &'static str = "commandline";
}

impl XmlDecode for QemuCommandline {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(QemuCommandline {
            args: attr_list(el, QEMU_NAMESPACE, "arg", "value", ctx)?,
            envs: env_list(el, QEMU_NAMESPACE, ctx)?,
        })
    }
}

impl XmlEncode for QemuCommandline {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(QEMU_NAMESPACE, name);
        push_attr_list(&mut el, QEMU_NAMESPACE, "arg", "value", &self.args);
        push_env_list(&mut el, QEMU_NAMESPACE, &self.envs);
        Ok(el)
    }
}

impl Extension for QemuCapabilities {
    const NAMESPACE: &'static str = QEMU_NAMESPACE;
    const NAME: &'static str = "capabilities";
}

impl XmlDecode for QemuCapabilities {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(QemuCapabilities {
            add: attr_list(el, QEMU_NAMESPACE, "add", "capability", ctx)?,
            del: attr_list(el, QEMU_NAMESPACE, "del", "capability", ctx)?,
        })
    }
}

impl XmlEncode for QemuCapabilities {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(QEMU_NAMESPACE, name);
        push_attr_list(&mut el, QEMU_NAMESPACE, "add", "capability", &self.add);
        push_attr_list(&mut el, QEMU_NAMESPACE, "del", "capability", &self.del);
        Ok(el)
    }
}

impl Extension for QemuOverride {
    const NAMESPACE: &'static str = QEMU_NAMESPACE;
    const NAME: &'static str = "override";
}

impl XmlDecode for QemuOverride {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let mut devices = Vec::new();
        for (index, device) in el.children_in(QEMU_NAMESPACE, "device").enumerate() {
            let segment = format!("{}[{}]", device.qualified_name(), index + 1);
            devices.push(ctx.scoped(segment, |ctx| {
                let alias = ctx.required_attr(device, "alias")?;
                let mut properties = Vec::new();
                let frontend = device.children_in(QEMU_NAMESPACE, "frontend").next();
                if let Some(frontend) = frontend {
                    for property in frontend.children_in(QEMU_NAMESPACE, "property") {
                        properties.push(QemuOverrideProperty {
                            name: ctx.required_attr(property, "name")?,
                            property_type: property.attr_string("type"),
                            value: property.attr_string("value"),
                        });
                    }
                }
                Ok(QemuOverrideDevice { alias, properties })
            })?);
        }
        Ok(QemuOverride { devices })
    }
}

impl XmlEncode for QemuOverride {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(QEMU_NAMESPACE, name);
        for device in &self.devices {
            let mut dev = element(QEMU_NAMESPACE, "device");
            dev.set_attr("alias", device.alias.as_str());
            let mut frontend = element(QEMU_NAMESPACE, "frontend");
            for property in &device.properties {
                let mut prop = element(QEMU_NAMESPACE, "property");
                prop.set_attr("name", property.name.as_str());
                prop.set_opt_attr("type", property.property_type.as_deref());
                prop.set_opt_attr("value", property.value.as_deref());
                frontend.push(prop);
            }
            dev.push(frontend);
            el.push(dev);
        }
        Ok(el)
    }
}

impl Extension for QemuDeprecation {
    const NAMESPACE: &'static str = QEMU_NAMESPACE;
    const NAME: &'static str = "deprecation";
}

impl XmlDecode for QemuDeprecation {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(QemuDeprecation {
            behavior: el.attr_string("behavior"),
        })
    }
}

impl XmlEncode for QemuDeprecation {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(QEMU_NAMESPACE, name);
        el.set_opt_attr("behavior", self.behavior.as_deref());
        Ok(el)
    }
}

// =============================================================================
// LXC, BHYVE, VMWARE, XEN
// =============================================================================

impl Extension for LxcNamespace {
    const NAMESPACE: &'static str = LXC_NAMESPACE;
    const NAME: &'static str = "namespace";
}

fn lxc_map(el: &Element, name: &str, ctx: &mut DecodeContext<'_>) -> Result<Option<LxcNamespaceMap>, DecodeError> {
    match el.children_in(LXC_NAMESPACE, name).next() {
        Some(child) => ctx.scoped(child.qualified_name().into_owned(), |ctx| {
            Ok(Some(LxcNamespaceMap {
                map_type: ctx.required_attr(child, "type")?,
                value: ctx.required_attr(child, "value")?,
            }))
        }),
        None => Ok(None),
    }
}

fn push_lxc_map(el: &mut Element, name: &str, map: Option<&LxcNamespaceMap>) {
    if let Some(map) = map {
        let mut child = element(LXC_NAMESPACE, name);
        child.set_attr("type", map.map_type.as_str());
        child.set_attr("value", map.value.as_str());
        el.push(child);
    }
}

impl XmlDecode for LxcNamespace {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(LxcNamespace {
            share_net: lxc_map(el, "sharenet", ctx)?,
            share_ipc: lxc_map(el, "shareipc", ctx)?,
            share_uts: lxc_map(el, "shareuts", ctx)?,
        })
    }
}

impl XmlEncode for LxcNamespace {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(LXC_NAMESPACE, name);
        push_lxc_map(&mut el, "sharenet", self.share_net.as_ref());
        push_lxc_map(&mut el, "shareipc", self.share_ipc.as_ref());
        push_lxc_map(&mut el, "shareuts", self.share_uts.as_ref());
        Ok(el)
    }
}

impl Extension for BhyveCommandline {
    const NAMESPACE: &'static str = BHYVE_NAMESPACE;
    const NAME: &'static str = "commandline";
}

impl XmlDecode for BhyveCommandline {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(BhyveCommandline {
            args: attr_list(el, BHYVE_NAMESPACE, "arg", "value", ctx)?,
            envs: env_list(el, BHYVE_NAMESPACE, ctx)?,
        })
    }
}

impl XmlEncode for BhyveCommandline {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(BHYVE_NAMESPACE, name);
        push_attr_list(&mut el, BHYVE_NAMESPACE, "arg", "value", &self.args);
        push_env_list(&mut el, BHYVE_NAMESPACE, &self.envs);
        Ok(el)
    }
}

impl Extension for VmwareDataCenterPath {
    const NAMESPACE: &'static str = VMWARE_NAMESPACE;
    const NAME: &'static str = "datacenterpath";
}

impl XmlDecode for VmwareDataCenterPath {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(VmwareDataCenterPath { value: el.text() })
    }
}

impl XmlEncode for VmwareDataCenterPath {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(VMWARE_NAMESPACE, name);
        el.push_text(&self.value);
        Ok(el)
    }
}

impl Extension for XenCommandline {
    const NAMESPACE: &'static str = XEN_NAMESPACE;
    const NAME: &'static str = "commandline";
}

impl XmlDecode for XenCommandline {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(XenCommandline {
            args: attr_list(el, XEN_NAMESPACE, "arg", "value", ctx)?,
        })
    }
}

impl XmlEncode for XenCommandline {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(XEN_NAMESPACE, name);
        push_attr_list(&mut el, XEN_NAMESPACE, "arg", "value", &self.args);
        Ok(el)
    }
}

// =============================================================================
// NETWORK AND STORAGE POOL
// =============================================================================

impl Extension for DnsmasqOptions {
    const NAMESPACE: &'static str = DNSMASQ_NAMESPACE;
    const NAME: &'static str = "options";
}

impl XmlDecode for DnsmasqOptions {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DnsmasqOptions {
            options: attr_list(el, DNSMASQ_NAMESPACE, "option", "value", ctx)?,
        })
    }
}

impl XmlEncode for DnsmasqOptions {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(DNSMASQ_NAMESPACE, name);
        push_attr_list(&mut el, DNSMASQ_NAMESPACE, "option", "value", &self.options);
        Ok(el)
    }
}

impl Extension for FsMountOptions {
    const NAMESPACE: &'static str = FS_NAMESPACE;
    const NAME: &'static str = "mount_opts";
}

impl XmlDecode for FsMountOptions {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FsMountOptions {
            options: attr_list(el, FS_NAMESPACE, "option", "name", ctx)?,
        })
    }
}

impl XmlEncode for FsMountOptions {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(FS_NAMESPACE, name);
        push_attr_list(&mut el, FS_NAMESPACE, "option", "name", &self.options);
        Ok(el)
    }
}

impl Extension for RbdConfigOptions {
    const NAMESPACE: &'static str = RBD_NAMESPACE;
    const NAME: &'static str = "config_opts";
}

impl XmlDecode for RbdConfigOptions {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let mut options = Vec::new();
        for (index, child) in el.children_in(RBD_NAMESPACE, "option").enumerate() {
            let segment = format!("{}[{}]", child.qualified_name(), index + 1);
            options.push(ctx.scoped(segment, |ctx| {
                Ok(RbdOption {
                    name: ctx.required_attr(child, "name")?,
                    value: ctx.required_attr(child, "value")?,
                })
            })?);
        }
        Ok(RbdConfigOptions { options })
    }
}

impl XmlEncode for RbdConfigOptions {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = element(RBD_NAMESPACE, name);
        for option in &self.options {
            let mut child = element(RBD_NAMESPACE, "option");
            child.set_attr("name", option.name.as_str());
            child.set_attr("value", option.value.as_str());
            el.push(child);
        }
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};
    use crate::codec::namespace;
    use crate::codec::tree::{parse, write};

    fn decode_block<T: Extension>(text: &str) -> Result<Option<T>, DecodeError> {
        let root = parse(text).unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        namespace::decode(&root, &mut ctx)
    }

    #[test]
    fn test_qemu_commandline() {
        let block: QemuCommandline = decode_block(
            r#"<domain xmlns:q="http://libvirt.org/schemas/domain/qemu/1.0">
                 <q:commandline>
                   <q:arg value="-newarg"/>
                   <q:env name="QEMU_ENV" value="1"/>
                 </q:commandline>
               </domain>"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(block.args, ["-newarg"]);
        assert_eq!(block.envs[0].name, "QEMU_ENV");

        // The conventional prefix is used on output, whatever the input used.
        let el = block.to_element(QemuCommandline::NAME).unwrap();
        let text = write(&el, &EncodeOptions::compact()).unwrap();
        assert_eq!(
            text,
            r#"<qemu:commandline xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0"><qemu:arg value="-newarg"/><qemu:env name="QEMU_ENV" value="1"/></qemu:commandline>"#
        );
    }

    #[test]
    fn test_unqualified_block_is_not_routed() {
        let block: Option<QemuCommandline> = decode_block("<domain><commandline/></domain>").unwrap();
        assert!(block.is_none());
    }

    #[test]
    fn test_missing_arg_value_has_qualified_path() {
        let root = parse(
            r#"<domain xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0"><qemu:commandline><qemu:arg/></qemu:commandline></domain>"#,
        )
        .unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        let err = ctx
            .scoped("domain", |ctx| namespace::decode::<QemuCommandline>(&root, ctx))
            .unwrap_err();
        assert_eq!(err.path(), Some("/domain/qemu:commandline/qemu:arg[1]"));
    }

    #[test]
    fn test_qemu_override() {
        let text = r#"<domain xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0"><qemu:override><qemu:device alias="ua-disk"><qemu:frontend><qemu:property name="serial" type="string" value="abc"/></qemu:frontend></qemu:device></qemu:override></domain>"#;
        let block: QemuOverride = decode_block(text).unwrap().unwrap();
        assert_eq!(block.devices[0].alias, "ua-disk");
        assert_eq!(block.devices[0].properties[0].value.as_deref(), Some("abc"));

        let mut root = Element::new("domain");
        namespace::push(&mut root, Some(&block)).unwrap();
        namespace::finish_root(&mut root, &[]);
        assert_eq!(write(&root, &EncodeOptions::compact()).unwrap(), text);
    }

    #[test]
    fn test_lxc_namespace() {
        let block: LxcNamespace = decode_block(
            r#"<domain xmlns:lxc="http://libvirt.org/schemas/domain/lxc/1.0"><lxc:namespace><lxc:sharenet type="netns" value="red"/></lxc:namespace></domain>"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(block.share_net.as_ref().map(|m| m.value.as_str()), Some("red"));
        assert!(block.share_ipc.is_none());
    }

    #[test]
    fn test_rbd_config_options() {
        let text = r#"<pool xmlns:rbd="http://libvirt.org/schemas/storagepool/rbd/1.0"><rbd:config_opts><rbd:option name="client_mount_timeout" value="45"/></rbd:config_opts></pool>"#;
        let block: RbdConfigOptions = decode_block(text).unwrap().unwrap();
        assert_eq!(block.options[0].name, "client_mount_timeout");

        let mut root = Element::new("pool");
        namespace::push(&mut root, Some(&block)).unwrap();
        namespace::finish_root(&mut root, &[]);
        assert_eq!(write(&root, &EncodeOptions::compact()).unwrap(), text);
    }
}
