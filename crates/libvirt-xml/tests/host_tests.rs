//! End-to-end tests for host-side documents: node devices, filters,
//! snapshots, domain capabilities and host interfaces.

use libvirt_xml::model::domcaps::{CpuModeCaps, FeatureCaps, SevCaps, SupportedBlock};
use libvirt_xml::model::hostiface::{
    BondMonitor, HostBond, HostDhcp, HostInterfaceKind, HostIp, HostProtocol, HostVlan, MiiMonitor,
};
use libvirt_xml::model::nodedev::{NodeCapability, SystemCapability, SystemHardware};
use libvirt_xml::model::nwfilter::{FilterEntry, FilterParameter, FilterRef};
use libvirt_xml::model::snapshot::SnapshotDisk;
use libvirt_xml::{
    DecodeError, DecodeOptions, DiskSource, Document, DomainCapabilities, DomainSnapshot, EncodeOptions,
    HostInterface, NodeDevice, NwFilter,
};

fn compact<T: Document>(doc: &T) -> String {
    doc.encode_with_options(&EncodeOptions::compact()).unwrap()
}

// =============================================================================
// NODE DEVICES
// =============================================================================

#[test]
fn test_system_device() {
    let device = NodeDevice::new(
        "computer",
        NodeCapability::System(SystemCapability {
            product: Some("Standard PC (Q35 + ICH9, 2009)".to_string()),
            hardware: Some(SystemHardware {
                vendor: Some("QEMU".to_string()),
                uuid: Some("c7a5fdbd-edaf-9455-926a-d65c16db1809".to_string()),
                ..SystemHardware::default()
            }),
            firmware: None,
        }),
    );
    let text = compact(&device);
    assert_eq!(
        text,
        concat!(
            r#"<device><name>computer</name><capability type="system"><product>Standard PC (Q35 + ICH9, 2009)</product>"#,
            r#"<hardware><vendor>QEMU</vendor><uuid>c7a5fdbd-edaf-9455-926a-d65c16db1809</uuid></hardware>"#,
            r#"</capability></device>"#
        )
    );
    assert_eq!(NodeDevice::decode(&device.encode().unwrap()).unwrap(), device);
}

#[test]
fn test_usb_device() {
    let text = concat!(
        r#"<device><name>usb_1_1</name><parent>usb_usb1</parent><driver><name>usb</name></driver>"#,
        r#"<capability type="usb_device"><bus>1</bus><device>2</device>"#,
        r#"<product id="0x0001">Tablet</product><vendor id="0x0627">Adomax Technology Co., Ltd</vendor>"#,
        r#"</capability></device>"#
    );
    let device = NodeDevice::decode(text).unwrap();
    assert_eq!(device.parent.as_deref(), Some("usb_usb1"));
    let Some(NodeCapability::UsbDevice(usb)) = &device.capability else {
        panic!("expected usb_device capability");
    };
    assert_eq!((usb.bus, usb.device), (1, 2));
    assert_eq!(usb.vendor.as_ref().unwrap().id, "0x0627");
    assert_eq!(usb.product.as_ref().unwrap().name.as_deref(), Some("Tablet"));
    assert_eq!(NodeDevice::decode(&compact(&device)).unwrap(), device);
}

#[test]
fn test_node_device_needs_capability() {
    let err = NodeDevice::decode("<device><name>orphan</name></device>").unwrap_err();
    assert!(matches!(err, DecodeError::MissingElement { .. }));
    assert_eq!(err.path(), Some("/device"));
}

#[test]
fn test_unknown_sub_capability_types() {
    let cases = [
        (
            r#"<capability type="pci"><capability type="sriov"/></capability>"#,
            "pci capability",
            "sriov",
            "/device/capability/capability[1]",
        ),
        (
            r#"<capability type="pci"><capability type="vpd"><fields access="writeonly"/></capability></capability>"#,
            "vpd fields",
            "writeonly",
            "/device/capability/capability[1]/fields[1]",
        ),
        (
            r#"<capability type="net"><interface>eth0</interface><capability type="80215"/></capability>"#,
            "net capability",
            "80215",
            "/device/capability/capability[1]",
        ),
        (
            r#"<capability type="scsi_host"><host>0</host><capability type="iscsi"/></capability>"#,
            "scsi_host capability",
            "iscsi",
            "/device/capability/capability[1]",
        ),
        (
            r#"<capability type="scsi_target"><target>target0:0:0</target><capability type="sas_port"/></capability>"#,
            "scsi_target capability",
            "sas_port",
            "/device/capability/capability[1]",
        ),
        (
            r#"<capability type="storage"><block>/dev/sda</block><capability type="hotpluggable"/></capability>"#,
            "storage capability",
            "hotpluggable",
            "/device/capability/capability[1]",
        ),
        (
            r#"<capability type="ap_matrix"><capability type="vfio"/></capability>"#,
            "mdev_types capability",
            "vfio",
            "/device/capability/capability[1]",
        ),
    ];
    for (capability, expected_group, expected_value, expected_path) in cases {
        let text = format!("<device><name>dev</name>{}</device>", capability);
        let err = NodeDevice::decode(&text).unwrap_err();
        match &err {
            DecodeError::UnknownDiscriminant { group, value, .. } => {
                assert_eq!((*group, value.as_str()), (expected_group, expected_value), "{}", text);
            }
            other => panic!("expected unknown discriminant for {}, got {:?}", text, other),
        }
        assert_eq!(err.path(), Some(expected_path), "{}", text);
        assert!(NodeDevice::decode_with_options(&text, &DecodeOptions::lenient()).is_ok(), "{}", text);
    }
}

// =============================================================================
// FILTERS
// =============================================================================

#[test]
fn test_filter_references() {
    let mut filter = NwFilter::new("no-spoofing");
    filter.chain = Some("root".to_string());
    filter.entries = vec![
        FilterEntry::Ref(FilterRef {
            filter: "no-mac-spoofing".to_string(),
            parameters: Vec::new(),
        }),
        FilterEntry::Ref(FilterRef {
            filter: "no-ip-spoofing".to_string(),
            parameters: vec![FilterParameter {
                name: "IP".to_string(),
                value: "192.168.122.10".to_string(),
            }],
        }),
    ];
    let text = compact(&filter);
    assert_eq!(
        text,
        concat!(
            r#"<filter name="no-spoofing" chain="root"><filterref filter="no-mac-spoofing"/>"#,
            r#"<filterref filter="no-ip-spoofing"><parameter name="IP" value="192.168.122.10"/></filterref></filter>"#
        )
    );
    assert_eq!(NwFilter::decode(&text).unwrap(), filter);
}

#[test]
fn test_filter_entry_order_survives_indent() {
    let text = r#"
<filter name="mixed" chain="ipv4">
  <rule action="accept" direction="out"><ip protocol="udp" dstportstart="53"/></rule>
  <filterref filter="allow-arp"/>
  <rule action="drop" direction="inout"><all/></rule>
</filter>
"#;
    let filter = NwFilter::decode(text).unwrap();
    let kinds: Vec<_> = filter.entries.iter().map(FilterEntry::discriminant).collect();
    assert_eq!(kinds, ["rule", "filterref", "rule"]);
    assert_eq!(NwFilter::decode(&filter.encode().unwrap()).unwrap(), filter);
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

#[test]
fn test_snapshot_with_embedded_domain() {
    let mut snapshot = DomainSnapshot::new("nightly");
    snapshot.creation_time = Some(1_760_000_000);
    snapshot.disks = vec![
        SnapshotDisk {
            name: "vda".to_string(),
            snapshot: Some("external".to_string()),
            driver_type: Some("qcow2".to_string()),
            source: Some(DiskSource::file("/var/lib/libvirt/images/vda.nightly")),
        },
        SnapshotDisk {
            name: "vdb".to_string(),
            snapshot: Some("no".to_string()),
            ..SnapshotDisk::default()
        },
    ];
    snapshot.domain = Some(Box::new(libvirt_xml::Domain::new("kvm", "web01")));

    let text = snapshot.encode().unwrap();
    assert_eq!(DomainSnapshot::decode(&text).unwrap(), snapshot);
}

#[test]
fn test_snapshot_embedded_hostdev_path() {
    let text = concat!(
        r#"<domainsnapshot><name>s</name><domain type="kvm"><name>g</name><devices>"#,
        r#"<hostdev mode="subsystem" type="nosuchtype"/></devices></domain></domainsnapshot>"#
    );
    let err = DomainSnapshot::decode(text).unwrap_err();
    assert_eq!(err.path(), Some("/domainsnapshot/domain/devices/hostdev[1]"));

    let snapshot = DomainSnapshot::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
    let domain = snapshot.domain.unwrap();
    assert!(domain.devices.unwrap().hostdevs.is_empty());
}

// =============================================================================
// DOMAIN CAPABILITIES
// =============================================================================

#[test]
fn test_caps_features() {
    let caps = DomainCapabilities {
        domain: Some("kvm".to_string()),
        arch: Some("x86_64".to_string()),
        features: Some(FeatureCaps {
            backing_store_input: Some(SupportedBlock::supported(true)),
            async_teardown: Some(SupportedBlock::supported(true)),
            sev: Some(SevCaps {
                supported: Some("yes".to_string()),
                cbitpos: Some(51),
                reduced_phys_bits: Some(1),
                max_guests: Some(509),
                max_es_guests: Some(0),
            }),
            ..FeatureCaps::default()
        }),
        ..DomainCapabilities::default()
    };
    let text = compact(&caps);
    assert!(text.contains(r#"<backingStoreInput supported="yes"/>"#), "{}", text);
    assert!(text.contains(r#"<async-teardown supported="yes"/>"#), "{}", text);
    assert!(text.contains("<maxESGuests>0</maxESGuests>"), "{}", text);
    assert_eq!(DomainCapabilities::decode(&text).unwrap(), caps);
}

#[test]
fn test_caps_cpu_modes_in_order() {
    let text = concat!(
        r#"<domainCapabilities><cpu><mode name="maximum" supported="yes"/>"#,
        r#"<mode name="host-passthrough" supported="no"/></cpu></domainCapabilities>"#
    );
    let caps = DomainCapabilities::decode(text).unwrap();
    assert!(matches!(caps.cpu_modes[0], CpuModeCaps::Maximum(_)));
    assert!(matches!(&caps.cpu_modes[1], CpuModeCaps::HostPassthrough(block) if block.supported.as_deref() == Some("no")));
    assert_eq!(compact(&caps), text);
}

// =============================================================================
// HOST INTERFACES
// =============================================================================

#[test]
fn test_bond_with_static_address() {
    let mut iface = HostInterface::new(
        "bond0",
        HostInterfaceKind::Bond(HostBond {
            mode: Some("active-backup".to_string()),
            monitor: Some(BondMonitor::Mii(MiiMonitor {
                freq: Some(100),
                updelay: Some(10),
                carrier: Some("ioctl".to_string()),
                ..MiiMonitor::default()
            })),
            interfaces: vec![HostInterface::ethernet("eth0"), HostInterface::ethernet("eth1")],
        }),
    );
    iface.start_mode = Some("onboot".to_string());
    iface.protocols.push(HostProtocol {
        family: "ipv4".to_string(),
        addresses: vec![HostIp {
            address: "192.168.0.10".to_string(),
            prefix: Some(24),
        }],
        gateway: Some("192.168.0.1".to_string()),
        ..HostProtocol::default()
    });

    let text = compact(&iface);
    assert!(text.starts_with(r#"<interface type="bond" name="bond0"><start mode="onboot"/>"#), "{}", text);
    assert!(text.contains(r#"<ip address="192.168.0.10" prefix="24"/>"#), "{}", text);
    assert_eq!(HostInterface::decode(&text).unwrap(), iface);
}

#[test]
fn test_vlan_over_dhcp() {
    let text = r#"
<interface type="vlan" name="eth0.42">
  <start mode="onboot"/>
  <protocol family="ipv4">
    <dhcp peerdns="no"/>
  </protocol>
  <protocol family="ipv6">
    <autoconf/>
  </protocol>
  <vlan tag="42">
    <interface name="eth0"/>
  </vlan>
</interface>
"#;
    let iface = HostInterface::decode(text).unwrap();
    assert_eq!(
        iface.kind,
        HostInterfaceKind::Vlan(HostVlan {
            tag: 42,
            device: Some("eth0".to_string()),
        })
    );
    assert_eq!(
        iface.protocols[0].dhcp,
        Some(HostDhcp {
            peerdns: Some("no".to_string()),
        })
    );
    assert!(iface.protocols[1].autoconf);
    assert_eq!(HostInterface::decode(&iface.encode().unwrap()).unwrap(), iface);
}

#[test]
fn test_host_interface_is_not_a_guest_interface() {
    let err = HostInterface::decode(r#"<interface type="network"><source network="default"/></interface>"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownDiscriminant { ref value, .. } if value == "network"));
    assert_eq!(err.path(), Some("/interface"));
}
