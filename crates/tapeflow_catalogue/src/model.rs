//! Catalogue and scheduler entities.
//!
//! All entities deserialize from sparse JSON: missing fields take their
//! defaults, so state files only spell out what a deployment actually has.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tapeflow_protocol::{DriveStatus, EntryLog, MountType, RepackStatus, TapeLog, TapeState};

// ============================================================================
// Drives
// ============================================================================

/// Live operational state of one tape drive, as reported by its daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapeDrive {
    pub drive_name: String,
    pub host: String,
    pub logical_library: String,
    pub logical_library_disabled: Option<bool>,
    pub physical_library_name: Option<String>,
    pub desired_up: bool,
    pub desired_force_down: bool,
    pub mount_type: MountType,
    pub drive_status: DriveStatus,
    pub session_id: Option<u64>,
    pub current_vid: Option<String>,
    pub current_tape_pool: Option<String>,
    pub current_vo: Option<String>,
    pub current_activity: Option<String>,
    pub current_priority: Option<u64>,
    pub files_transferred_in_session: Option<u64>,
    pub bytes_transferred_in_session: Option<u64>,
    pub session_elapsed_time: Option<u64>,
    pub next_mount_type: Option<MountType>,
    pub next_vid: Option<String>,
    pub next_tape_pool: Option<String>,
    pub reason_up_down: Option<String>,
    pub user_comment: Option<String>,
    pub software_version: Option<String>,
    pub dev_file_name: Option<String>,
    pub raw_library_slot: Option<String>,
    pub disk_system_name: Option<String>,
    pub reserved_bytes: Option<u64>,
    pub last_modification_log: Option<EntryLog>,

    // Start time of each status, epoch seconds
    pub probe_start_time: Option<i64>,
    pub down_or_up_start_time: Option<i64>,
    pub start_start_time: Option<i64>,
    pub mount_start_time: Option<i64>,
    pub transfer_start_time: Option<i64>,
    pub cleanup_start_time: Option<i64>,
    pub unload_start_time: Option<i64>,
    pub unmount_start_time: Option<i64>,
    pub draining_start_time: Option<i64>,
    pub shutdown_time: Option<i64>,
}

/// One key/value configuration entry attached to a drive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfigEntry {
    pub drive_name: String,
    pub category: String,
    pub key_name: String,
    pub value: String,
    pub source: String,
}

// ============================================================================
// Repacks
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepackDestination {
    pub vid: String,
    pub files: u64,
    pub bytes: u64,
}

/// Progress counters of one repack request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepackInfo {
    pub vid: String,
    pub repack_buffer_base_url: String,
    pub user_provided_files: u64,
    pub total_files_on_tape_at_start: u64,
    pub total_bytes_on_tape_at_start: u64,
    pub all_files_selected_at_start: bool,
    pub total_files_to_retrieve: u64,
    pub total_bytes_to_retrieve: u64,
    pub total_files_to_archive: u64,
    pub total_bytes_to_archive: u64,
    pub retrieved_files: u64,
    pub retrieved_bytes: u64,
    pub archived_files: u64,
    pub archived_bytes: u64,
    pub failed_files_to_retrieve: u64,
    pub failed_bytes_to_retrieve: u64,
    pub failed_files_to_archive: u64,
    pub failed_bytes_to_archive: u64,
    pub status: RepackStatus,
    pub repack_finished_time: Option<i64>,
    pub creation_log: EntryLog,
    /// Next fSeq to expand; 0 when expansion has not started.
    pub last_expanded_fseq: u64,
    pub destination_infos: Vec<RepackDestination>,
}

// ============================================================================
// Tapes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tape {
    pub vid: String,
    pub media_type: String,
    pub vendor: String,
    pub logical_library_name: String,
    pub physical_library_name: Option<String>,
    pub tape_pool_name: String,
    pub vo: String,
    pub encryption_key_name: Option<String>,
    pub capacity_in_bytes: u64,
    pub data_on_tape_in_bytes: u64,
    pub last_fseq: u64,
    pub full: bool,
    pub dirty: bool,
    pub is_from_castor: bool,
    pub read_mount_count: u64,
    pub write_mount_count: u64,
    pub nb_master_files: u64,
    pub master_data_in_bytes: u64,
    pub label_log: Option<TapeLog>,
    pub last_write_log: Option<TapeLog>,
    pub last_read_log: Option<TapeLog>,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
    pub state: TapeState,
    pub state_reason: Option<String>,
    pub state_update_time: i64,
    pub state_modified_by: String,
    pub purchase_order: Option<String>,
    pub verification_status: Option<String>,
}

/// Filter for tape listings. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapeSearchCriteria {
    pub vid: Option<String>,
    pub media_type: Option<String>,
    pub vendor: Option<String>,
    pub logical_library: Option<String>,
    pub tape_pool: Option<String>,
    pub vo: Option<String>,
    pub capacity_in_bytes: Option<u64>,
    pub full: Option<bool>,
    pub from_castor: Option<bool>,
    pub state: Option<TapeState>,
    pub vids: Option<Vec<String>>,
}

impl TapeSearchCriteria {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, tape: &Tape) -> bool {
        fn eq<T: PartialEq + ?Sized>(wanted: Option<&T>, actual: &T) -> bool {
            wanted.map_or(true, |w| w == actual)
        }

        eq(self.vid.as_deref(), tape.vid.as_str())
            && eq(self.media_type.as_deref(), tape.media_type.as_str())
            && eq(self.vendor.as_deref(), tape.vendor.as_str())
            && eq(self.logical_library.as_deref(), tape.logical_library_name.as_str())
            && eq(self.tape_pool.as_deref(), tape.tape_pool_name.as_str())
            && eq(self.vo.as_deref(), tape.vo.as_str())
            && eq(self.capacity_in_bytes.as_ref(), &tape.capacity_in_bytes)
            && eq(self.full.as_ref(), &tape.full)
            && eq(self.from_castor.as_ref(), &tape.is_from_castor)
            && eq(self.state.as_ref(), &tape.state)
            && self
                .vids
                .as_ref()
                .map_or(true, |vids| vids.iter().any(|v| v == &tape.vid))
    }
}

// ============================================================================
// Job queues
// ============================================================================

/// Which queue of a tape pool or VID a job sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobQueueType {
    #[default]
    JobsToTransfer,
    JobsToReport,
    FailedJobs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requester {
    pub name: String,
    pub group: String,
}

/// An archive or retrieve job in a scheduler queue.
///
/// Archive jobs are queued per tape pool, retrieve jobs per VID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueuedJob {
    pub object_id: String,
    pub queue_type: JobQueueType,
    pub copy_nb: u64,
    pub tape_pool: String,
    pub vid: String,
    pub archive_file_id: u64,
    pub requester: Requester,
    pub disk_instance: String,
    pub disk_file_id: String,
    pub disk_file_path: String,
    pub file_size: u64,
    pub total_retries: u32,
    pub total_report_retries: u32,
    pub failure_logs: Vec<String>,
    pub report_failure_logs: Vec<String>,
}

// ============================================================================
// Queue and mount summaries
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepForSpaceInfo {
    pub start_time: i64,
    pub disk_system_name: String,
}

/// Scheduler view of one queue (tape pool or VID) and its mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueAndMountSummary {
    pub mount_type: MountType,
    pub tape_pool: String,
    pub vo: String,
    pub logical_library: String,
    pub vid: String,
    pub files_queued: u64,
    pub bytes_queued: u64,
    pub oldest_job_age: u64,
    pub youngest_job_age: u64,
    pub mount_policy: MountPolicy,
    pub current_mounts: u64,
    pub current_files: u64,
    pub current_bytes: u64,
    pub tapes_capacity: u64,
    pub files_on_tapes: u64,
    pub data_on_tapes: u64,
    pub full_tapes: u64,
    pub writable_tapes: u64,
    pub read_max_drives: u64,
    pub write_max_drives: u64,
    pub sleep_for_space_info: Option<SleepForSpaceInfo>,
    pub mount_policies: Vec<String>,
    pub highest_priority_mount_policy: String,
    pub lowest_request_age_mount_policy: String,
}

// ============================================================================
// Configuration tables
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUser {
    pub name: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveRoute {
    pub storage_class_name: String,
    pub copy_nb: u64,
    /// `DEFAULT` or `REPACK`
    pub route_type: String,
    pub tape_pool_name: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

/// Requester and group mount rules share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountRule {
    pub disk_instance: String,
    pub name: String,
    pub mount_policy: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityMountRule {
    pub disk_instance: String,
    pub name: String,
    pub mount_policy: String,
    pub activity_regex: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalLibrary {
    pub name: String,
    pub is_disabled: bool,
    pub disabled_reason: Option<String>,
    pub physical_library_name: Option<String>,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalLibrary {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub library_type: Option<String>,
    pub gui_url: Option<String>,
    pub webcam_url: Option<String>,
    pub location: Option<String>,
    pub nb_physical_cartridge_slots: u64,
    pub nb_available_cartridge_slots: Option<u64>,
    pub nb_physical_drive_slots: u64,
    pub is_disabled: bool,
    pub disabled_reason: Option<String>,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaType {
    pub name: String,
    pub cartridge: String,
    pub capacity_in_bytes: u64,
    pub primary_density_code: Option<u32>,
    pub secondary_density_code: Option<u32>,
    pub nb_wraps: Option<u32>,
    pub min_lpos: Option<u64>,
    pub max_lpos: Option<u64>,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountPolicy {
    pub name: String,
    pub archive_priority: u64,
    pub archive_min_request_age: u64,
    pub retrieve_priority: u64,
    pub retrieve_min_request_age: u64,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageClass {
    pub name: String,
    pub nb_copies: u64,
    pub vo: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapePool {
    pub name: String,
    pub vo: String,
    pub nb_tapes: u64,
    pub nb_partial_tapes: u64,
    pub nb_physical_files: u64,
    pub capacity_bytes: u64,
    pub data_bytes: u64,
    pub encryption_key_name: Option<String>,
    pub supply_source_set: BTreeSet<String>,
    pub supply_destination_set: BTreeSet<String>,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskSystem {
    pub name: String,
    pub file_regexp: String,
    pub disk_instance: String,
    pub disk_instance_space: String,
    pub targeted_free_space: u64,
    pub sleep_time: u64,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskInstance {
    pub name: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskInstanceSpace {
    pub name: String,
    pub disk_instance: String,
    pub free_space_query_url: String,
    pub refresh_interval: u64,
    pub free_space: u64,
    pub last_refresh_time: i64,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualOrganization {
    pub name: String,
    pub read_max_drives: u64,
    pub write_max_drives: u64,
    pub max_file_size: u64,
    pub disk_instance_name: String,
    pub is_repack_vo: bool,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

/// Catalogue schema version and upgrade status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub next_major: Option<u32>,
    pub next_minor: Option<u32>,
    pub upgrading: bool,
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self {
            major: 1,
            minor: 0,
            next_major: None,
            next_minor: None,
            upgrading: false,
        }
    }
}

impl SchemaVersion {
    pub fn display(&self) -> String {
        match (self.upgrading, self.next_major, self.next_minor) {
            (true, Some(major), Some(minor)) => {
                format!("{}.{} (upgrading to {}.{})", self.major, self.minor, major, minor)
            }
            _ => format!("{}.{}", self.major, self.minor),
        }
    }
}

// ============================================================================
// Recycle bin
// ============================================================================

/// A tape file moved to the recycle log after deletion or repack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecycleTapeFile {
    pub vid: String,
    pub fseq: u64,
    pub block_id: u64,
    pub copy_nb: u64,
    pub tape_file_creation_time: i64,
    pub archive_file_id: u64,
    pub disk_instance_name: String,
    pub disk_file_id: String,
    pub disk_file_id_when_deleted: String,
    pub disk_file_uid: u64,
    pub disk_file_gid: u64,
    pub size_in_bytes: u64,
    pub storage_class: String,
    pub archive_file_creation_time: i64,
    pub reconciliation_time: i64,
    pub disk_file_path: Option<String>,
    pub reason_log: String,
    pub recycle_log_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecycleTapeFileSearchCriteria {
    pub vid: Option<String>,
    pub disk_file_ids: Option<Vec<String>>,
    pub archive_file_id: Option<u64>,
    pub copy_nb: Option<u64>,
    pub disk_instance: Option<String>,
}

impl RecycleTapeFileSearchCriteria {
    pub fn matches(&self, file: &RecycleTapeFile) -> bool {
        self.vid.as_ref().map_or(true, |v| v == &file.vid)
            && self
                .disk_file_ids
                .as_ref()
                .map_or(true, |ids| ids.iter().any(|id| id == &file.disk_file_id))
            && self.archive_file_id.map_or(true, |id| id == file.archive_file_id)
            && self.copy_nb.map_or(true, |nb| nb == file.copy_nb)
            && self
                .disk_instance
                .as_ref()
                .map_or(true, |di| di == &file.disk_instance_name)
    }
}
