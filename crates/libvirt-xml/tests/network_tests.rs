//! End-to-end tests for network, network port and storage documents.

use libvirt_xml::model::extension::DnsmasqOptions;
use libvirt_xml::model::network::{ForwardAddress, NetworkBridge};
use libvirt_xml::model::port::{PlugDirect, PortPlug};
use libvirt_xml::model::storage::PoolAdapter;
use libvirt_xml::{
    DecodeError, DecodeOptions, Document, EncodeError, EncodeOptions, Network, NetworkPort, PciAddress, ScaledValue,
    StoragePool, StorageVolume,
};

const DEFAULT_NETWORK: &str = r#"
<network xmlns:dnsmasq="http://libvirt.org/schemas/network/dnsmasq/1.0">
  <name>default</name>
  <uuid>9a05da11-e96b-47f3-8253-a3a482e445f5</uuid>
  <forward mode="nat">
    <nat>
      <port start="1024" end="65535"/>
    </nat>
  </forward>
  <bridge name="virbr0" stp="on" delay="0"/>
  <mac address="52:54:00:0a:cd:21"/>
  <ip address="192.168.122.1" netmask="255.255.255.0">
    <dhcp>
      <range start="192.168.122.2" end="192.168.122.254"/>
    </dhcp>
  </ip>
  <dnsmasq:options>
    <dnsmasq:option value="dhcp-authoritative"/>
  </dnsmasq:options>
</network>
"#;

#[test]
fn test_default_network() {
    let network = Network::decode(DEFAULT_NETWORK).unwrap();
    assert_eq!(network.name.as_deref(), Some("default"));
    assert_eq!(
        network.bridge,
        Some(NetworkBridge {
            name: Some("virbr0".to_string()),
            stp: Some("on".to_string()),
            delay: Some("0".to_string()),
            ..NetworkBridge::default()
        })
    );
    let forward = network.forward.as_ref().unwrap();
    assert_eq!(forward.mode.as_deref(), Some("nat"));
    assert_eq!(forward.nat.as_ref().unwrap().ports[0].end, 65535);
    assert_eq!(network.ips[0].netmask.as_deref(), Some("255.255.255.0"));
    assert_eq!(
        network.dnsmasq_options,
        Some(DnsmasqOptions {
            options: vec!["dhcp-authoritative".to_string()],
        })
    );
    assert!(network.foreign.is_empty());

    let text = network.encode().unwrap();
    assert_eq!(Network::decode(&text).unwrap(), network);
}

#[test]
fn test_hostdev_forward_pool() {
    let text = concat!(
        r#"<network><name>passthrough</name><forward mode="hostdev" managed="yes">"#,
        r#"<address type="pci" domain="0x0000" bus="0x04" slot="0x10" function="0x1"/>"#,
        r#"<address type="pci" domain="0x0000" bus="0x04" slot="0x10" function="0x3"/>"#,
        r#"</forward></network>"#
    );
    let network = Network::decode(text).unwrap();
    let addresses = &network.forward.as_ref().unwrap().addresses;
    assert_eq!(addresses, &[
        ForwardAddress::Pci(PciAddress::new(0, 4, 0x10, 1)),
        ForwardAddress::Pci(PciAddress::new(0, 4, 0x10, 3)),
    ]);
    assert_eq!(network.encode_with_options(&EncodeOptions::compact()).unwrap(), text);
}

#[test]
fn test_network_forward_address_path() {
    let text = r#"<network><name>n</name><forward mode="hostdev"><address type="pci" bus="0x04"/><address type="usb"/></forward></network>"#;
    let err = Network::decode(text).unwrap_err();
    assert_eq!(err.path(), Some("/network/forward/address[2]"));

    let network = Network::decode_with_options(text, &DecodeOptions::lenient()).unwrap();
    assert_eq!(network.forward.unwrap().addresses.len(), 1);
}

#[test]
fn test_network_foreign_namespace_kept() {
    let text = r#"<network xmlns:acme="urn:acme"><name>n</name><acme:policy tier="gold"/></network>"#;
    let network = Network::decode(text).unwrap();
    assert_eq!(network.foreign.len(), 1);
    assert_eq!(
        network.encode_with_options(&EncodeOptions::compact()).unwrap(),
        r#"<network xmlns:acme="urn:acme"><name>n</name><acme:policy tier="gold"/></network>"#
    );
}

#[test]
fn test_direct_port() {
    let port = NetworkPort {
        uuid: Some("f8ab1f48-2c1f-4e06-8fc0-7ab45df0e7a5".to_string()),
        plug: Some(PortPlug::Direct(PlugDirect {
            dev: "ens3".to_string(),
            mode: Some("vepa".to_string()),
        })),
        ..NetworkPort::default()
    };
    let text = port.encode_with_options(&EncodeOptions::compact()).unwrap();
    assert!(text.contains(r#"<plug type="direct" dev="ens3" mode="vepa"/>"#));
    assert_eq!(NetworkPort::decode(&text).unwrap(), port);
}

#[test]
fn test_unknown_plug_type() {
    let err = NetworkPort::decode(r#"<networkport><plug type="tunnel"/></networkport>"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownDiscriminant { value, .. } if value == "tunnel"));
}

// =============================================================================
// STORAGE
// =============================================================================

#[test]
fn test_scsi_pool_adapter_default() {
    let text = r#"<pool type="scsi"><name>vhbas</name><source><adapter name="host0"/></source><target><path>/dev/disk/by-path</path></target></pool>"#;
    let pool = StoragePool::decode(text).unwrap();
    let adapter = pool.source.as_ref().unwrap().adapter.as_ref().unwrap();
    assert!(matches!(adapter, PoolAdapter::ScsiHost(_)));
    assert_eq!(pool.target.as_ref().unwrap().path.as_deref(), Some("/dev/disk/by-path"));
    assert_eq!(StoragePool::decode(&pool.encode().unwrap()).unwrap(), pool);
}

#[test]
fn test_unknown_pool_source_types() {
    let cases = [
        (r#"<adapter type="iscsi_host" name="host0"/>"#, "adapter", "iscsi_host", "/pool/source/adapter"),
        (
            r#"<auth type="kerberos" username="admin"><secret usage="pool"/></auth>"#,
            "auth",
            "kerberos",
            "/pool/source/auth",
        ),
    ];
    for (source, expected_group, expected_value, expected_path) in cases {
        let text = format!(r#"<pool type="scsi"><name>p</name><source>{}</source></pool>"#, source);
        let err = StoragePool::decode(&text).unwrap_err();
        match &err {
            DecodeError::UnknownDiscriminant { group, value, .. } => {
                assert_eq!((*group, value.as_str()), (expected_group, expected_value), "{}", text);
            }
            other => panic!("expected unknown discriminant for {}, got {:?}", text, other),
        }
        assert_eq!(err.path(), Some(expected_path), "{}", text);
    }
}

#[test]
fn test_pool_source_element_order() {
    let text = concat!(
        r#"<pool type="logical"><name>vg</name><source><device path="/dev/sdb1"/><device path="/dev/sdc1"/>"#,
        r#"<name>vg0</name><format type="lvm2"/></source></pool>"#
    );
    let pool = StoragePool::decode(text).unwrap();
    assert_eq!(pool.encode_with_options(&EncodeOptions::compact()).unwrap(), text);

    let reordered = r#"<pool type="netfs"><name>n</name><source><dir path="/export"/><host name="nas"/></source></pool>"#;
    let pool = StoragePool::decode(reordered).unwrap();
    assert_eq!(
        pool.encode_with_options(&EncodeOptions::compact()).unwrap(),
        r#"<pool type="netfs"><name>n</name><source><host name="nas"/><dir path="/export"/></source></pool>"#
    );
}

#[test]
fn test_pool_sizes() {
    let text = r#"<pool type="dir"><name>images</name><capacity unit="bytes">107374182400</capacity><allocation unit="bytes">5368709120</allocation><target><path>/var/lib/libvirt/images</path></target></pool>"#;
    let pool = StoragePool::decode(text).unwrap();
    assert_eq!(pool.capacity, Some(ScaledValue::new(107374182400, "bytes")));
    assert_eq!(pool.allocation.as_ref().map(|a| a.value), Some(5368709120));
}

#[test]
fn test_pool_requires_type() {
    let err = StoragePool::decode("<pool><name>p</name></pool>").unwrap_err();
    assert_eq!(err.path(), Some("/pool"));

    let err = StoragePool::default().encode().unwrap_err();
    assert!(matches!(err, EncodeError::InvalidValue { .. }));
}

#[test]
fn test_volume_capacity_must_be_numeric() {
    let err = StorageVolume::decode(r#"<volume><name>v</name><capacity unit="G">ten</capacity></volume>"#).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedScalar { .. }));
    assert_eq!(err.path(), Some("/volume/capacity"));
}

#[test]
fn test_volume_roundtrip() {
    let mut volume = StorageVolume::new("guest.qcow2");
    volume.capacity = Some(ScaledValue::new(10, "G"));
    let text = volume.encode().unwrap();
    assert_eq!(StorageVolume::decode(&text).unwrap(), volume);
}
