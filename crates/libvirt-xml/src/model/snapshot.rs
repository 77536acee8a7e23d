//! Domain snapshots (`<domainsnapshot>`).

use crate::model::disk::DiskSource;
use crate::model::domain::Domain;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainSnapshot {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    /// Seconds since the epoch.
    pub creation_time: Option<u64>,
    /// `<parent><name>…</name></parent>`
    pub parent: Option<String>,
    pub memory: Option<SnapshotMemory>,
    pub disks: Vec<SnapshotDisk>,
    pub domain: Option<Box<Domain>>,
    pub inactive_domain: Option<Box<Domain>>,
    /// `<active>0|1</active>`
    pub active: Option<u32>,
}

impl DomainSnapshot {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

/// `<memory snapshot=… file=…/>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotMemory {
    pub snapshot: Option<String>,
    pub file: Option<String>,
}

/// Per-disk snapshot settings, matched to a domain disk by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotDisk {
    pub name: String,
    /// `no`, `internal`, `external` or `manual`.
    pub snapshot: Option<String>,
    /// `<driver type=…/>`
    pub driver_type: Option<String>,
    /// Kind from the disk's `type`; `None` when neither `type` nor
    /// `<source>` is present.
    pub source: Option<DiskSource>,
}
