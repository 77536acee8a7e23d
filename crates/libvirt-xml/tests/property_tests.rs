#![allow(clippy::unwrap_used)]

use libvirt_xml::codec::{format_uint, parse_uint};
use libvirt_xml::model::common::{DeviceAddress, UsbAddress};
use libvirt_xml::{
    Disk, DiskSource, Document, Domain, DomainDevices, EncodeOptions, Hostdev, PciAddress, Radix, ScaledValue,
    StorageVolume, UintFormat,
};
use proptest::collection::vec;
use proptest::prelude::*;

// Never whitespace-only; edge spaces are kept on decode
fn text_strategy() -> impl Strategy<Value = String> {
    " {0,2}[a-zA-Z0-9&<>\"'._/-]([a-zA-Z0-9&<>\"' ._/-]{0,30}[a-zA-Z0-9&<>\"'._/-])? {0,2}"
}

fn pci_strategy() -> impl Strategy<Value = PciAddress> {
    (0u32..=0xffff, 0u32..=0xff, 0u32..0x20, 0u32..8)
        .prop_map(|(domain, bus, slot, function)| PciAddress::new(domain, bus, slot, function))
}

fn domain_with(devices: DomainDevices, name: &str) -> Domain {
    let mut domain = Domain::new("kvm", name);
    domain.devices = Some(devices);
    domain
}

proptest! {
    #[test]
    fn test_fixed_width_reads_back(value in any::<u64>(), width in 0usize..24) {
        let text = format_uint(value, UintFormat::Fixed { width });
        prop_assert!(text.len() >= width);
        prop_assert_eq!(parse_uint(&text, Radix::Decimal), Ok(value));
    }

    #[test]
    fn test_absent_parts_are_not_written(
        domain in proptest::option::of(0u32..=0xffff),
        bus in proptest::option::of(0u32..=0xff),
        slot in proptest::option::of(0u32..0x20),
        function in 0u32..8,
    ) {
        let address = PciAddress {
            domain,
            bus,
            slot,
            function: Some(function),
            ..PciAddress::default()
        };
        let devices = DomainDevices {
            hostdevs: vec![Hostdev::pci(address)],
            ..DomainDevices::default()
        };
        let domain_doc = domain_with(devices, "guest");
        let text = domain_doc.encode_with_options(&EncodeOptions::compact()).unwrap();
        prop_assert_eq!(text.contains(" domain=\""), domain.is_some());
        prop_assert_eq!(text.contains(" bus=\""), bus.is_some());
        prop_assert_eq!(text.contains(" slot=\""), slot.is_some());
        prop_assert_eq!(Domain::decode(&text).unwrap(), domain_doc);
    }

    #[test]
    fn test_overflow_is_rejected(value in (u64::MAX as u128 + 1)..=u128::MAX) {
        prop_assert!(parse_uint(&value.to_string(), Radix::Decimal).is_err());
    }

    #[test]
    fn test_pci_hostdevs_roundtrip(addresses in vec(pci_strategy(), 0..6)) {
        let domain = domain_with(
            DomainDevices {
                hostdevs: addresses.into_iter().map(Hostdev::pci).collect(),
                ..DomainDevices::default()
            },
            "guest",
        );
        let text = domain.encode_with_options(&EncodeOptions::compact()).unwrap();
        prop_assert_eq!(Domain::decode(&text).unwrap(), domain);
    }

    #[test]
    fn test_disk_addresses_roundtrip(bus in 0u32..128, port in 1u32..16, path in text_strategy()) {
        let domain = domain_with(
            DomainDevices {
                disks: vec![Disk {
                    source: Some(DiskSource::block(&path)),
                    address: Some(DeviceAddress::Usb(UsbAddress {
                        bus: Some(bus),
                        port: Some(port.to_string()),
                        device: None,
                    })),
                    ..Disk::default()
                }],
                ..DomainDevices::default()
            },
            "guest",
        );
        let text = domain.encode().unwrap();
        prop_assert_eq!(Domain::decode(&text).unwrap(), domain);
    }

    #[test]
    fn test_names_with_markup_characters_roundtrip(name in text_strategy()) {
        let domain = Domain::new("kvm", &name);
        let text = domain.encode_with_options(&EncodeOptions::compact()).unwrap();
        prop_assert_eq!(Domain::decode(&text).unwrap().name, Some(name));
    }

    #[test]
    fn test_volume_capacity_roundtrip(capacity in any::<u64>(), allocation in any::<u64>()) {
        let mut volume = StorageVolume::new("disk.raw");
        volume.capacity = Some(ScaledValue::new(capacity, "bytes"));
        volume.allocation = Some(ScaledValue::new(allocation, "bytes"));
        let text = volume.encode().unwrap();
        prop_assert_eq!(StorageVolume::decode(&text).unwrap(), volume);
    }
}
