//! Codec for domain capabilities.

use crate::codec::document::Document;
use crate::codec::scalar::{Radix, UintFormat};
use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::Element;
use crate::codec::variant;
use crate::error::{DecodeError, EncodeError};
use crate::model::domcaps::*;

impl Document for DomainCapabilities {
    const ROOT: &'static str = "domainCapabilities";
}

impl XmlDecode for DomainCapabilities {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        let cpu_modes = match el.child("cpu") {
            Some(cpu) => ctx.scoped("cpu", |ctx| ctx.children_with(cpu, "mode", cpu_mode))?,
            None => Vec::new(),
        };
        Ok(DomainCapabilities {
            path: el.child_text("path"),
            domain: el.child_text("domain"),
            machine: el.child_text("machine"),
            arch: el.child_text("arch"),
            vcpu_max: match el.child("vcpu") {
                Some(vcpu) => ctx.scoped("vcpu", |ctx| ctx.uint_attr(vcpu, "max", Radix::Decimal))?,
                None => None,
            },
            iothreads: el.child_attr("iothreads", "supported"),
            os: ctx.child(el, "os")?,
            cpu_modes,
            memory_backing: ctx.child(el, "memoryBacking")?,
            devices: ctx.child(el, "devices")?,
            features: ctx.child(el, "features")?,
        })
    }
}

impl XmlEncode for DomainCapabilities {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text_child("path", self.path.as_deref());
        el.push_text_child("domain", self.domain.as_deref());
        el.push_text_child("machine", self.machine.as_deref());
        el.push_text_child("arch", self.arch.as_deref());
        if let Some(max) = self.vcpu_max {
            let mut vcpu = Element::new("vcpu");
            vcpu.set_uint("max", Some(max), UintFormat::Decimal);
            el.push(vcpu);
        }
        el.push_attr_child("iothreads", "supported", self.iothreads.as_deref());
        el.push_opt("os", self.os.as_ref())?;
        if !self.cpu_modes.is_empty() {
            let mut cpu = Element::new("cpu");
            cpu.push_all("mode", &self.cpu_modes)?;
            el.push(cpu);
        }
        el.push_opt("memoryBacking", self.memory_backing.as_ref())?;
        el.push_opt("devices", self.devices.as_ref())?;
        el.push_opt("features", self.features.as_ref())?;
        Ok(el)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

impl XmlDecode for CapsEnum {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CapsEnum {
            name: ctx.required_attr(el, "name")?,
            values: el.children_named("value").map(Element::text).collect(),
        })
    }
}

impl XmlEncode for CapsEnum {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("name", &self.name);
        for value in &self.values {
            el.push_text_child("value", Some(value));
        }
        Ok(el)
    }
}

impl XmlDecode for SupportedBlock {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SupportedBlock {
            supported: el.attr_string("supported"),
            enums: ctx.children(el, "enum")?,
        })
    }
}

impl XmlEncode for SupportedBlock {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("supported", self.supported.as_deref());
        el.push_all("enum", &self.enums)?;
        Ok(el)
    }
}

impl XmlDecode for OsCaps {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(OsCaps {
            supported: el.attr_string("supported"),
            enums: ctx.children(el, "enum")?,
            loader: ctx.child(el, "loader")?,
        })
    }
}

impl XmlEncode for OsCaps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("supported", self.supported.as_deref());
        el.push_all("enum", &self.enums)?;
        el.push_opt("loader", self.loader.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for LoaderCaps {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(LoaderCaps {
            supported: el.attr_string("supported"),
            values: el.children_named("value").map(Element::text).collect(),
            enums: ctx.children(el, "enum")?,
        })
    }
}

impl XmlEncode for LoaderCaps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("supported", self.supported.as_deref());
        for value in &self.values {
            el.push_text_child("value", Some(value));
        }
        el.push_all("enum", &self.enums)?;
        Ok(el)
    }
}

// =============================================================================
// CPU
// =============================================================================

fn cpu_mode(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Option<CpuModeCaps>, DecodeError> {
    Ok(Some(match variant::CPU_MODE.select(el, ctx)? {
        "host-passthrough" => CpuModeCaps::HostPassthrough(SupportedBlock::from_element(el, ctx)?),
        "maximum" => CpuModeCaps::Maximum(SupportedBlock::from_element(el, ctx)?),
        "host-model" => CpuModeCaps::HostModel(HostModelCaps {
            supported: el.attr_string("supported"),
            model: el.child("model").map(|model| HostCpuModel {
                fallback: model.attr_string("fallback"),
                name: model.text(),
            }),
            vendor: el.child_text("vendor"),
            max_phys_addr: ctx.child(el, "maxphysaddr")?,
            features: ctx.children(el, "feature")?,
        }),
        "custom" => CpuModeCaps::Custom(CustomModeCaps {
            supported: el.attr_string("supported"),
            models: el
                .children_named("model")
                .map(|model| CustomCpuModel {
                    usable: model.attr_string("usable"),
                    vendor: model.attr_string("vendor"),
                    deprecated: model.attr_string("deprecated"),
                    canonical: model.attr_string("canonical"),
                    name: model.text(),
                })
                .collect(),
            blockers: ctx.children(el, "blockers")?,
        }),
        other => return Err(ctx.unknown_discriminant(&variant::CPU_MODE, other)),
    }))
}

impl XmlEncode for CpuModeCaps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = match self {
            CpuModeCaps::HostPassthrough(block) | CpuModeCaps::Maximum(block) => block.to_element(name)?,
            CpuModeCaps::HostModel(host) => {
                let mut el = Element::new(name);
                el.set_opt_attr("supported", host.supported.as_deref());
                if let Some(model) = &host.model {
                    let mut inner = Element::new("model");
                    inner.set_opt_attr("fallback", model.fallback.as_deref());
                    inner.push_text(&model.name);
                    el.push(inner);
                }
                el.push_text_child("vendor", host.vendor.as_deref());
                el.push_opt("maxphysaddr", host.max_phys_addr.as_ref())?;
                el.push_all("feature", &host.features)?;
                el
            }
            CpuModeCaps::Custom(custom) => {
                let mut el = Element::new(name);
                el.set_opt_attr("supported", custom.supported.as_deref());
                for model in &custom.models {
                    let mut inner = Element::new("model");
                    inner.set_opt_attr("usable", model.usable.as_deref());
                    inner.set_opt_attr("vendor", model.vendor.as_deref());
                    inner.set_opt_attr("deprecated", model.deprecated.as_deref());
                    inner.set_opt_attr("canonical", model.canonical.as_deref());
                    inner.push_text(&model.name);
                    el.push(inner);
                }
                el.push_all("blockers", &custom.blockers)?;
                el
            }
        };
        el.set_discriminant("name", self.discriminant());
        Ok(el)
    }
}

impl XmlDecode for MaxPhysAddr {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(MaxPhysAddr {
            mode: ctx.required_attr(el, "mode")?,
            limit: ctx.uint_attr(el, "limit", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for MaxPhysAddr {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("mode", &self.mode);
        el.set_uint("limit", self.limit, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for HostCpuFeature {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(HostCpuFeature {
            policy: el.attr_string("policy"),
            name: ctx.required_attr(el, "name")?,
        })
    }
}

impl XmlEncode for HostCpuFeature {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("policy", self.policy.as_deref());
        el.set_attr("name", &self.name);
        Ok(el)
    }
}

impl XmlDecode for CpuBlockers {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(CpuBlockers {
            model: ctx.required_attr(el, "model")?,
            features: ctx.attr_list(el, "feature", "name")?,
        })
    }
}

impl XmlEncode for CpuBlockers {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_attr("model", &self.model);
        for feature in &self.features {
            el.push_attr_child("feature", "name", Some(feature));
        }
        Ok(el)
    }
}

// =============================================================================
// DEVICES AND FEATURES
// =============================================================================

impl XmlDecode for DeviceCaps {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(DeviceCaps {
            disk: ctx.child(el, "disk")?,
            graphics: ctx.child(el, "graphics")?,
            video: ctx.child(el, "video")?,
            hostdev: ctx.child(el, "hostdev")?,
            rng: ctx.child(el, "rng")?,
            filesystem: ctx.child(el, "filesystem")?,
            tpm: ctx.child(el, "tpm")?,
            redirdev: ctx.child(el, "redirdev")?,
            channel: ctx.child(el, "channel")?,
            crypto: ctx.child(el, "crypto")?,
            interface: ctx.child(el, "interface")?,
            panic: ctx.child(el, "panic")?,
            console: ctx.child(el, "console")?,
        })
    }
}

impl XmlEncode for DeviceCaps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_opt("disk", self.disk.as_ref())?;
        el.push_opt("graphics", self.graphics.as_ref())?;
        el.push_opt("video", self.video.as_ref())?;
        el.push_opt("hostdev", self.hostdev.as_ref())?;
        el.push_opt("rng", self.rng.as_ref())?;
        el.push_opt("filesystem", self.filesystem.as_ref())?;
        el.push_opt("tpm", self.tpm.as_ref())?;
        el.push_opt("redirdev", self.redirdev.as_ref())?;
        el.push_opt("channel", self.channel.as_ref())?;
        el.push_opt("crypto", self.crypto.as_ref())?;
        el.push_opt("interface", self.interface.as_ref())?;
        el.push_opt("panic", self.panic.as_ref())?;
        el.push_opt("console", self.console.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for FeatureCaps {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(FeatureCaps {
            gic: ctx.child(el, "gic")?,
            vmcoreinfo: ctx.child(el, "vmcoreinfo")?,
            genid: ctx.child(el, "genid")?,
            backing_store_input: ctx.child(el, "backingStoreInput")?,
            backup: ctx.child(el, "backup")?,
            async_teardown: ctx.child(el, "async-teardown")?,
            s390_pv: ctx.child(el, "s390-pv")?,
            ps2: ctx.child(el, "ps2")?,
            sev: ctx.child(el, "sev")?,
            sgx: ctx.child(el, "sgx")?,
            hyperv: ctx.child(el, "hyperv")?,
        })
    }
}

impl XmlEncode for FeatureCaps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_opt("gic", self.gic.as_ref())?;
        el.push_opt("vmcoreinfo", self.vmcoreinfo.as_ref())?;
        el.push_opt("genid", self.genid.as_ref())?;
        el.push_opt("backingStoreInput", self.backing_store_input.as_ref())?;
        el.push_opt("backup", self.backup.as_ref())?;
        el.push_opt("async-teardown", self.async_teardown.as_ref())?;
        el.push_opt("s390-pv", self.s390_pv.as_ref())?;
        el.push_opt("ps2", self.ps2.as_ref())?;
        el.push_opt("sev", self.sev.as_ref())?;
        el.push_opt("sgx", self.sgx.as_ref())?;
        el.push_opt("hyperv", self.hyperv.as_ref())?;
        Ok(el)
    }
}

impl XmlDecode for SevCaps {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SevCaps {
            supported: el.attr_string("supported"),
            cbitpos: ctx.uint_text(el, "cbitpos", Radix::Decimal)?,
            reduced_phys_bits: ctx.uint_text(el, "reducedPhysBits", Radix::Decimal)?,
            max_guests: ctx.uint_text(el, "maxGuests", Radix::Decimal)?,
            max_es_guests: ctx.uint_text(el, "maxESGuests", Radix::Decimal)?,
        })
    }
}

impl XmlEncode for SevCaps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("supported", self.supported.as_deref());
        el.push_uint_child("cbitpos", self.cbitpos, UintFormat::Decimal);
        el.push_uint_child("reducedPhysBits", self.reduced_phys_bits, UintFormat::Decimal);
        el.push_uint_child("maxGuests", self.max_guests, UintFormat::Decimal);
        el.push_uint_child("maxESGuests", self.max_es_guests, UintFormat::Decimal);
        Ok(el)
    }
}

impl XmlDecode for SgxCaps {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(SgxCaps {
            supported: el.attr_string("supported"),
            flc: el.child_text("flc"),
            sgx1: el.child_text("sgx1"),
            sgx2: el.child_text("sgx2"),
            section_size: ctx.child(el, "section_size")?,
        })
    }
}

impl XmlEncode for SgxCaps {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.set_opt_attr("supported", self.supported.as_deref());
        el.push_text_child("flc", self.flc.as_deref());
        el.push_text_child("sgx1", self.sgx1.as_deref());
        el.push_text_child("sgx2", self.sgx2.as_deref());
        el.push_opt("section_size", self.section_size.as_ref())?;
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::document::{DecodeOptions, EncodeOptions};

    fn compact(caps: &DomainCapabilities) -> String {
        caps.encode_with_options(&EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn test_qemu_caps_roundtrip() {
        let text = concat!(
            r#"<domainCapabilities><path>/usr/bin/qemu-system-x86_64</path><domain>kvm</domain>"#,
            r#"<machine>pc-q35-8.2</machine><arch>x86_64</arch><vcpu max="4096"/><iothreads supported="yes"/>"#,
            r#"<os supported="yes"><enum name="firmware"><value>efi</value></enum>"#,
            r#"<loader supported="yes"><value>/usr/share/OVMF/OVMF_CODE.fd</value>"#,
            r#"<enum name="type"><value>rom</value><value>pflash</value></enum></loader></os>"#,
            r#"<cpu><mode name="host-passthrough" supported="yes"><enum name="hostPassthroughMigratable"><value>on</value><value>off</value></enum></mode>"#,
            r#"<mode name="host-model" supported="yes"><model fallback="forbid">Skylake-Client-IBRS</model><vendor>Intel</vendor>"#,
            r#"<maxphysaddr mode="passthrough" limit="39"/><feature policy="require" name="ss"/></mode>"#,
            r#"<mode name="custom" supported="yes"><model usable="yes" vendor="unknown">qemu64</model>"#,
            r#"<model usable="no" vendor="Intel">Cascadelake-Server</model>"#,
            r#"<blockers model="Cascadelake-Server"><feature name="avx512f"/><feature name="pku"/></blockers></mode></cpu>"#,
            r#"<memoryBacking supported="yes"><enum name="sourceType"><value>file</value><value>anonymous</value></enum></memoryBacking>"#,
            r#"<devices><disk supported="yes"><enum name="diskDevice"><value>disk</value><value>cdrom</value></enum></disk>"#,
            r#"<tpm supported="no"/></devices>"#,
            r#"<features><gic supported="no"/><vmcoreinfo supported="yes"/>"#,
            r#"<sev supported="yes"><cbitpos>47</cbitpos><reducedPhysBits>1</reducedPhysBits><maxGuests>15</maxGuests></sev>"#,
            r#"<sgx supported="yes"><flc>yes</flc><sgx1>yes</sgx1><sgx2>no</sgx2><section_size unit="KiB">524288</section_size></sgx>"#,
            r#"</features></domainCapabilities>"#
        );
        let caps = DomainCapabilities::decode(text).unwrap();
        assert_eq!(caps.vcpu_max, Some(4096));
        assert_eq!(caps.cpu_modes.len(), 3);
        match &caps.cpu_modes[2] {
            CpuModeCaps::Custom(custom) => {
                assert_eq!(custom.models[1].name, "Cascadelake-Server");
                assert_eq!(custom.blockers[0].features, vec!["avx512f", "pku"]);
            }
            other => panic!("expected custom mode, got {:?}", other),
        }
        let devices = caps.devices.as_ref().unwrap();
        assert_eq!(devices.disk.as_ref().unwrap().enums[0], CapsEnum::new("diskDevice", &["disk", "cdrom"]));
        assert_eq!(devices.tpm, Some(SupportedBlock::supported(false)));
        assert_eq!(caps.features.as_ref().unwrap().sev.as_ref().unwrap().cbitpos, Some(47));
        assert_eq!(compact(&caps), text);
    }

    #[test]
    fn test_unknown_cpu_mode() {
        let text = r#"<domainCapabilities><cpu><mode name="host-model" supported="no"/><mode name="turbo" supported="yes"/></cpu></domainCapabilities>"#;
        let err = DomainCapabilities::decode(text).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownDiscriminant { group: "cpu mode", .. }));
        assert_eq!(err.path(), Some("/domainCapabilities/cpu/mode[2]"));

        let caps = DomainCapabilities::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
        assert_eq!(caps.cpu_modes.len(), 1);
        assert_eq!(caps.cpu_modes[0].discriminant(), "host-model");
    }

    #[test]
    fn test_cpu_mode_requires_name() {
        let text = r#"<domainCapabilities><cpu><mode supported="yes"/></cpu></domainCapabilities>"#;
        let err = DomainCapabilities::decode(text).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { group: "cpu mode", .. }));
    }

    #[test]
    fn test_bad_vcpu_max() {
        let text = r#"<domainCapabilities><vcpu max="many"/></domainCapabilities>"#;
        let err = DomainCapabilities::decode(text).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedScalar { .. }));
        assert_eq!(err.path(), Some("/domainCapabilities/vcpu"));
    }

    #[test]
    fn test_empty_caps_elide_everything() {
        let caps = DomainCapabilities::default();
        assert_eq!(compact(&caps), "<domainCapabilities/>");
    }
}
