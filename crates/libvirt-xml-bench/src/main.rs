//! Benchmark for domain encoding and decoding using a synthetic fleet.
//!
//! Usage: `bench-domains [COUNT] [OUTPUT_DIR]`. With an output directory the
//! encoded documents are written there, one file per domain.

use std::fs;
use std::path::Path;
use std::time::Instant;

use libvirt_xml::model::devices::{Controller, ControllerKind};
use libvirt_xml::model::disk::DiskTarget;
use libvirt_xml::model::domain::{DomainOs, Memory, OsType, Vcpu};
use libvirt_xml::model::interface::{InterfaceMac, InterfaceSource, InterfaceSourceNetwork};
use libvirt_xml::{
    DecodeOptions, Disk, DiskSource, Document, Domain, DomainDevices, EncodeOptions, Hostdev, Interface, PciAddress,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const DEFAULT_COUNT: usize = 10_000;
const DECODE_ITERS: u32 = 5;

fn build_disk(index: usize, vm: usize) -> Disk {
    let source = if index % 2 == 0 {
        DiskSource::file(&format!("/var/lib/libvirt/images/vm{}-disk{}.qcow2", vm, index))
    } else {
        DiskSource::block(&format!("/dev/vg0/vm{}-{}", vm, index))
    };
    Disk {
        device: Some("disk".to_string()),
        source: Some(source),
        target: Some(DiskTarget {
            dev: Some(format!("vd{}", char::from(b'a' + index as u8))),
            bus: Some("virtio".to_string()),
            ..DiskTarget::default()
        }),
        ..Disk::default()
    }
}

fn build_interface(vm: usize) -> Interface {
    let mut iface = Interface::new(InterfaceSource::Network(InterfaceSourceNetwork {
        network: Some("default".to_string()),
        ..InterfaceSourceNetwork::default()
    }));
    iface.mac = Some(InterfaceMac {
        address: format!("52:54:00:{:02x}:{:02x}:{:02x}", (vm >> 16) & 0xff, (vm >> 8) & 0xff, vm & 0xff),
        ..InterfaceMac::default()
    });
    iface.model = Some("virtio".to_string());
    iface
}

/// Builds one guest. Every tenth guest gets a passed-through PCI device.
fn build_domain(vm: usize) -> Domain {
    let mut domain = Domain::new("kvm", &format!("vm{:05}", vm));
    domain.uuid = Some(Uuid::new_v4().to_string());
    domain.memory = Some(Memory {
        value: 4 * 1024 * 1024,
        unit: Some("KiB".to_string()),
        dump_core: None,
    });
    domain.vcpu = Some(Vcpu {
        placement: Some("static".to_string()),
        value: 2 + (vm % 7) as u32,
        ..Vcpu::default()
    });
    domain.os = Some(DomainOs {
        os_type: Some(OsType {
            arch: Some("x86_64".to_string()),
            machine: Some("pc-q35-8.2".to_string()),
            value: "hvm".to_string(),
        }),
        ..DomainOs::default()
    });

    let mut hostdevs = Vec::new();
    if vm % 10 == 0 {
        hostdevs.push(Hostdev::pci(PciAddress::new(0, (vm / 10 % 256) as u32, 0, 1)));
    }
    domain.devices = Some(DomainDevices {
        emulator: Some("/usr/bin/qemu-system-x86_64".to_string()),
        disks: (0..1 + vm % 3).map(|i| build_disk(i, vm)).collect(),
        controllers: vec![Controller::new(ControllerKind::Scsi, 0)],
        interfaces: vec![build_interface(vm)],
        hostdevs,
        ..DomainDevices::default()
    });
    domain
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let count = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<usize>().expect("COUNT must be a number"))
        .unwrap_or(DEFAULT_COUNT);
    let output_dir = std::env::args().nth(2);

    // Build the fleet
    let build_start = Instant::now();
    let fleet: Vec<Domain> = (0..count).map(build_domain).collect();
    info!(count, elapsed = ?build_start.elapsed(), "built synthetic fleet");

    // Benchmark encoding (indented)
    let encode_start = Instant::now();
    let documents: Vec<String> = fleet
        .iter()
        .map(|domain| domain.encode().expect("Failed to encode"))
        .collect();
    let encode_time = encode_start.elapsed();
    let total_bytes: usize = documents.iter().map(String::len).sum();

    println!("Encoded {} domains ({} bytes) in {:?}", count, total_bytes, encode_time);
    println!(
        "  Throughput: {:.2} MB/s",
        (total_bytes as f64 / 1_000_000.0) / encode_time.as_secs_f64()
    );

    // Benchmark encoding (compact)
    let compact_start = Instant::now();
    let compact: Vec<String> = fleet
        .iter()
        .map(|domain| domain.encode_with_options(&EncodeOptions::compact()).expect("Failed to encode"))
        .collect();
    let compact_time = compact_start.elapsed();
    let compact_bytes: usize = compact.iter().map(String::len).sum();

    println!("\nCompact: {} bytes in {:?}", compact_bytes, compact_time);
    println!(
        "  Size vs indented: {:.1}%",
        100.0 * compact_bytes as f64 / total_bytes as f64
    );

    // Warmup
    for doc in documents.iter().take(100) {
        let _ = Domain::decode(doc).expect("Failed to decode");
    }

    // Benchmark decoding (strict)
    let decode_start = Instant::now();
    let mut decoded = None;
    for _ in 0..DECODE_ITERS {
        decoded = Some(
            documents
                .iter()
                .map(|doc| Domain::decode(doc).expect("Failed to decode"))
                .collect::<Vec<_>>(),
        );
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;
    let decoded = decoded.unwrap_or_default();

    println!("\nDecode (strict): {:?} (avg of {} iterations)", decode_time, DECODE_ITERS);
    println!(
        "  Throughput: {:.2} MB/s",
        (total_bytes as f64 / 1_000_000.0) / decode_time.as_secs_f64()
    );
    assert_eq!(decoded.len(), fleet.len());

    // Benchmark decoding (lenient)
    let lenient = DecodeOptions::lenient();
    let lenient_start = Instant::now();
    for _ in 0..DECODE_ITERS {
        for doc in &compact {
            let domain = Domain::decode_with_options(doc, &lenient).expect("Failed to decode");
            debug!(name = ?domain.name, "decoded");
        }
    }
    let lenient_time = lenient_start.elapsed() / DECODE_ITERS;

    println!("\nDecode (lenient, compact): {:?} (avg of {} iterations)", lenient_time, DECODE_ITERS);

    // Roundtrip check
    let mismatches = fleet.iter().zip(&decoded).filter(|(a, b)| a != b).count();
    println!("\nRoundtrip mismatches: {}", mismatches);

    if let Some(dir) = output_dir {
        let dir = Path::new(&dir);
        fs::create_dir_all(dir).expect("Failed to create output directory");
        for (domain, doc) in fleet.iter().zip(&documents) {
            let name = domain.name.as_deref().unwrap_or("unnamed");
            fs::write(dir.join(format!("{}.xml", name)), doc).expect("Failed to write domain");
        }
        println!("\n=== Output Files ===");
        println!("Wrote {} documents to {}", documents.len(), dir.display());
    }

    // Summary
    println!("\n=== Summary ===");
    println!("Domains: {}", count);
    println!(
        "Average document: {} bytes indented, {} bytes compact",
        total_bytes / count.max(1),
        compact_bytes / count.max(1)
    );
}
