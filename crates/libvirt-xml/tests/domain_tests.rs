//! End-to-end tests for the domain document.

use libvirt_xml::codec::namespace::QEMU_NAMESPACE;
use libvirt_xml::model::extension::{LxcNamespace, LxcNamespaceMap, QemuCommandline};
use libvirt_xml::{
    DecodeError, DecodeOptions, Disk, DiskSource, DiskSourceKind, Document, Domain, DomainDevices, EncodeOptions,
    ErrorCode, Hostdev, HostdevMode, HostdevSubsystem, PciAddress, ScaledValue,
};

fn compact(domain: &Domain) -> String {
    domain.encode_with_options(&EncodeOptions::compact()).unwrap()
}

fn with_devices(devices: DomainDevices) -> Domain {
    let mut domain = Domain::new("kvm", "guest");
    domain.devices = Some(devices);
    domain
}

#[test]
fn test_block_disk_encoding() {
    let domain = with_devices(DomainDevices {
        disks: vec![Disk {
            source: Some(DiskSource::block("/dev/sda")),
            ..Disk::default()
        }],
        ..DomainDevices::default()
    });
    assert_eq!(
        compact(&domain),
        r#"<domain type="kvm"><name>guest</name><devices><disk type="block"><source dev="/dev/sda"/></disk></devices></domain>"#
    );
}

#[test]
fn test_disk_without_type_is_file() {
    let text = r#"<domain type="kvm"><devices><disk device="disk"><source file="/var/lib/a.img"/></disk></devices></domain>"#;
    let domain = Domain::decode(text).unwrap();
    let disk = &domain.devices.unwrap().disks[0];
    match &disk.source.as_ref().unwrap().kind {
        DiskSourceKind::File(file) => assert_eq!(file.file.as_deref(), Some("/var/lib/a.img")),
        other => panic!("expected file source, got {:?}", other),
    }
}

#[test]
fn test_pci_hostdev_address_format() {
    let domain = with_devices(DomainDevices {
        hostdevs: vec![Hostdev::pci(PciAddress::new(0, 1, 2, 0))],
        ..DomainDevices::default()
    });
    let text = compact(&domain);
    assert!(text.contains(r#"<address domain="0x0000" bus="0x01" slot="0x02" function="0x0"/>"#));
    assert_eq!(Domain::decode(&text).unwrap(), domain);
}

#[test]
fn test_unknown_hostdev_type_is_error() {
    let text = r#"<domain type="kvm"><name>g</name><devices><hostdev mode="subsystem" type="nosuchtype"/></devices></domain>"#;
    let err = Domain::decode(text).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownDiscriminant);
    match &err {
        DecodeError::UnknownDiscriminant { attr, value, path, .. } => {
            assert_eq!(*attr, "type");
            assert_eq!(value, "nosuchtype");
            assert_eq!(path, "/domain/devices/hostdev[1]");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unknown_hostdev_dropped_when_lenient() {
    let text = concat!(
        r#"<domain type="kvm"><name>g</name><devices>"#,
        r#"<hostdev mode="subsystem" type="nosuchtype"/>"#,
        r#"<hostdev mode="subsystem" type="pci"><source><address domain="0x0000" bus="0x03" slot="0x00" function="0x0"/></source></hostdev>"#,
        r#"</devices></domain>"#
    );
    let domain = Domain::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
    let hostdevs = domain.devices.unwrap().hostdevs;
    assert_eq!(hostdevs.len(), 1);
    assert!(matches!(
        &hostdevs[0].mode,
        HostdevMode::Subsystem(HostdevSubsystem::Pci(pci)) if pci.address == Some(PciAddress::new(0, 3, 0, 0))
    ));
}

#[test]
fn test_missing_hypervisor_type() {
    let err = Domain::decode("<domain><name>g</name></domain>").unwrap_err();
    assert_eq!(err.path(), Some("/domain"));
    assert!(matches!(err, DecodeError::MissingAttribute { .. }));
}

#[test]
fn test_wrong_root() {
    let err = Domain::decode(r#"<network><name>n</name></network>"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedRoot { expected: "domain", .. }));
}

#[test]
fn test_extension_blocks_follow_fixed_order() {
    let mut domain = Domain::new("lxc", "ct");
    domain.lxc_namespace = Some(LxcNamespace {
        share_net: Some(LxcNamespaceMap {
            map_type: "netns".to_string(),
            value: "red".to_string(),
        }),
        ..LxcNamespace::default()
    });
    domain.qemu_commandline = Some(QemuCommandline {
        args: vec!["-s".to_string()],
        envs: Vec::new(),
    });
    let text = compact(&domain);

    let qemu = text.find("<qemu:commandline").unwrap();
    let lxc = text.find("<lxc:namespace").unwrap();
    let name = text.find("<name>").unwrap();
    assert!(name < qemu && qemu < lxc, "{}", text);
    assert!(text.starts_with(&format!(r#"<domain xmlns:qemu="{}""#, QEMU_NAMESPACE)));

    assert_eq!(Domain::decode(&text).unwrap(), domain);
}

#[test]
fn test_extension_prefix_is_normalized() {
    let text = concat!(
        r#"<domain type="kvm" xmlns:q="http://libvirt.org/schemas/domain/qemu/1.0"><name>g</name>"#,
        r#"<q:commandline><q:arg value="-no-shutdown"/></q:commandline></domain>"#
    );
    let domain = Domain::decode(text).unwrap();
    assert_eq!(domain.qemu_commandline.as_ref().unwrap().args, ["-no-shutdown"]);
    assert_eq!(
        compact(&domain),
        concat!(
            r#"<domain xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0" type="kvm"><name>g</name>"#,
            r#"<qemu:commandline><qemu:arg value="-no-shutdown"/></qemu:commandline></domain>"#
        )
    );
}

#[test]
fn test_foreign_elements_preserved() {
    let text = r#"<domain type="kvm" xmlns:x="urn:example"><name>g</name><x:tag level="3">blue</x:tag></domain>"#;
    let domain = Domain::decode(text).unwrap();
    assert_eq!(domain.foreign.len(), 1);
    assert_eq!(domain.foreign[0].name, "tag");
    assert_eq!(
        compact(&domain),
        r#"<domain xmlns:x="urn:example" type="kvm"><name>g</name><x:tag level="3">blue</x:tag></domain>"#
    );

    let options = DecodeOptions {
        preserve_foreign: false,
        ..DecodeOptions::default()
    };
    let domain = Domain::decode_with_options(text, &options).unwrap();
    assert!(domain.foreign.is_empty());
}

#[test]
fn test_malformed_scalar_carries_path() {
    let text = r#"<domain type="kvm"><devices><disk type="file"><address type="pci" bus="0xzz"/></disk></devices></domain>"#;
    let err = Domain::decode(text).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedScalar { .. }));
    assert_eq!(err.path(), Some("/domain/devices/disk[1]/address"));
}

#[test]
fn test_indented_output_decodes() {
    let domain = with_devices(DomainDevices {
        emulator: Some("/usr/bin/qemu-system-x86_64".to_string()),
        disks: vec![Disk {
            source: Some(DiskSource::file("/var/lib/libvirt/images/g.qcow2")),
            ..Disk::default()
        }],
        ..DomainDevices::default()
    });
    let text = domain.encode().unwrap();
    assert!(text.contains('\n'));
    assert_eq!(Domain::decode(&text).unwrap(), domain);
}

#[test]
fn test_description_whitespace_survives() {
    let mut domain = Domain::new("kvm", "guest");
    domain.description = Some("  line one\n  line two  ".to_string());
    domain.title = Some(" padded title ".to_string());

    assert_eq!(Domain::decode(&domain.encode().unwrap()).unwrap(), domain);
    assert_eq!(Domain::decode(&compact(&domain)).unwrap(), domain);
}

#[test]
fn test_tuning_sections_roundtrip() {
    let text = concat!(
        r#"<domain type="kvm"><name>guest</name><memory unit="KiB">2097152</memory>"#,
        r#"<blkiotune><weight>800</weight><device><path>/dev/sda</path><weight>1000</weight><read_bytes_sec>10000</read_bytes_sec></device></blkiotune>"#,
        r#"<memtune><hard_limit unit="KiB">4194304</hard_limit><swap_hard_limit unit="KiB">8388608</swap_hard_limit></memtune>"#,
        r#"<memoryBacking><hugepages><page size="2048" unit="KiB"/></hugepages><nosharepages/></memoryBacking>"#,
        r#"<vcpu placement="static">2</vcpu>"#,
        r#"<vcpus><vcpu id="0" enabled="yes" hotpluggable="no" order="1"/><vcpu id="1" enabled="no" hotpluggable="yes"/></vcpus>"#,
        r#"<iothreads>1</iothreads><defaultiothread thread_pool_min="2" thread_pool_max="8"/>"#,
        r#"<cputune><vcpupin vcpu="0" cpuset="1"/><vcpupin vcpu="1" cpuset="2"/></cputune>"#,
        r#"<numatune><memory mode="strict" nodeset="0"/></numatune>"#,
        r#"<resource><partition>/machine</partition></resource>"#,
        r#"<idmap><uid start="0" target="1000" count="10"/><gid start="0" target="1000" count="10"/></idmap>"#,
        r#"<perf><event name="cmt" enabled="yes"/></perf>"#,
        r#"<devices><nvram/><panic model="pseries"/>"#,
        r#"<pstore backend="acpi-erst"><path>/var/lib/libvirt/qemu/nvram/guest.nvram</path><size unit="KiB">8</size></pstore></devices>"#,
        r#"<keywrap><cipher name="aes" state="on"/></keywrap></domain>"#
    );
    let domain = Domain::decode(text).unwrap();

    let backing = domain.memory_backing.as_ref().unwrap();
    assert_eq!(backing.hugepages.as_ref().unwrap()[0].size, 2048);
    assert!(backing.nosharepages);
    assert_eq!(domain.memtune.as_ref().unwrap().hard_limit, Some(ScaledValue::new(4194304, "KiB")));
    assert_eq!(domain.vcpus.len(), 2);
    assert_eq!(domain.vcpus[1].order, None);
    let cputune = domain.cputune.as_ref().unwrap();
    assert_eq!((cputune.vcpupins[0].vcpu, cputune.vcpupins[0].cpuset.as_str()), (0, "1"));
    let numa = domain.numatune.as_ref().unwrap().memory.as_ref().unwrap();
    assert_eq!(numa.nodeset.as_deref(), Some("0"));
    assert_eq!(domain.resource.as_ref().unwrap().partition.as_deref(), Some("/machine"));
    assert_eq!(domain.idmap.as_ref().unwrap().gids[0].target, 1000);
    assert_eq!(domain.perf_events[0].name, "cmt");
    assert_eq!(domain.keywrap[0].state, "on");

    let devices = domain.devices.as_ref().unwrap();
    assert!(devices.nvram.is_some());
    let pstore = devices.pstore.as_ref().unwrap();
    assert_eq!(pstore.backend, "acpi-erst");
    assert_eq!(pstore.size, ScaledValue::new(8, "KiB"));

    assert_eq!(compact(&domain), text);
    assert_eq!(Domain::decode(&domain.encode().unwrap()).unwrap(), domain);
}

#[test]
fn test_unknown_device_types() {
    let cases = [
        (
            r#"<devices><filesystem type="sshfs"><target dir="/mnt"/></filesystem></devices>"#,
            "filesystem",
            "sshfs",
            "/domain/devices/filesystem[1]",
        ),
        (r#"<devices><audio id="1" type="beep"/></devices>"#, "audio", "beep", "/domain/devices/audio[1]"),
        (
            r#"<devices><rng model="virtio"><backend model="hwrng"/></rng></devices>"#,
            "rng backend",
            "hwrng",
            "/domain/devices/rng[1]/backend",
        ),
        (
            r#"<devices><tpm model="tpm-crb"><backend type="swtpm"/></tpm></devices>"#,
            "tpm backend",
            "swtpm",
            "/domain/devices/tpm[1]/backend",
        ),
        (r#"<devices><serial type="teletype"/></devices>"#, "chardev", "teletype", "/domain/devices/serial[1]"),
        (
            r#"<devices><serial type="teletype"><source path="/dev/ttyS0"/></serial></devices>"#,
            "chardev",
            "teletype",
            "/domain/devices/serial[1]",
        ),
        (r#"<sysinfo type="acpi"/>"#, "sysinfo", "acpi", "/domain/sysinfo[1]"),
    ];
    for (body, expected_group, expected_value, expected_path) in cases {
        let text = format!(r#"<domain type="kvm"><name>g</name>{}</domain>"#, body);
        let err = Domain::decode(&text).unwrap_err();
        match &err {
            DecodeError::UnknownDiscriminant { group, value, .. } => {
                assert_eq!((*group, value.as_str()), (expected_group, expected_value), "{}", text);
            }
            other => panic!("expected unknown discriminant for {}, got {:?}", text, other),
        }
        assert_eq!(err.path(), Some(expected_path), "{}", text);
        assert!(Domain::decode_with_options(&text, &DecodeOptions::lenient()).is_ok(), "{}", text);
    }
}
