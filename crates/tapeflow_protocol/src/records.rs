//! Streamed record types.
//!
//! Every admin listing produces a sequence of [`Record`]s: exactly one
//! [`Record::Header`] first, then one data variant per item. Items are flat
//! structs of primitive and derived fields, serialized as the JSON payload of
//! a Data frame.

use crate::types::{EntryLog, RequestType, TapeLog};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Record kinds and stream header
// ============================================================================

/// Kind of data record a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    AdminUser,
    ArchiveRoute,
    ActivityMountRule,
    Drive,
    FailedRequest,
    FailedRequestSummary,
    GroupMountRule,
    LogicalLibrary,
    PhysicalLibrary,
    MediaType,
    MountPolicy,
    Repack,
    RequesterMountRule,
    ShowQueues,
    StorageClass,
    Tape,
    TapePool,
    DiskSystem,
    DiskInstance,
    DiskInstanceSpace,
    VirtualOrganization,
    Version,
    RecycleTapeFile,
}

const LOG_COLUMNS: [&str; 7] = [
    "c.user", "c.host", "c.time", "m.user", "m.host", "m.time", "comment",
];

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::AdminUser => "admin_user",
            RecordKind::ArchiveRoute => "archive_route",
            RecordKind::ActivityMountRule => "activity_mount_rule",
            RecordKind::Drive => "drive",
            RecordKind::FailedRequest => "failed_request",
            RecordKind::FailedRequestSummary => "failed_request_summary",
            RecordKind::GroupMountRule => "group_mount_rule",
            RecordKind::LogicalLibrary => "logical_library",
            RecordKind::PhysicalLibrary => "physical_library",
            RecordKind::MediaType => "media_type",
            RecordKind::MountPolicy => "mount_policy",
            RecordKind::Repack => "repack",
            RecordKind::RequesterMountRule => "requester_mount_rule",
            RecordKind::ShowQueues => "show_queues",
            RecordKind::StorageClass => "storage_class",
            RecordKind::Tape => "tape",
            RecordKind::TapePool => "tape_pool",
            RecordKind::DiskSystem => "disk_system",
            RecordKind::DiskInstance => "disk_instance",
            RecordKind::DiskInstanceSpace => "disk_instance_space",
            RecordKind::VirtualOrganization => "virtual_organization",
            RecordKind::Version => "version",
            RecordKind::RecycleTapeFile => "recycle_tape_file",
        }
    }

    /// Display columns for this kind, in output order.
    pub fn columns(&self) -> Vec<&'static str> {
        let (leading, with_logs): (&[&'static str], bool) = match self {
            RecordKind::AdminUser => (&["user"], true),
            RecordKind::ArchiveRoute => (&["storage class", "copy number", "type", "tapepool"], true),
            RecordKind::ActivityMountRule => (&["instance", "username", "policy", "activity"], true),
            RecordKind::Drive => (
                &[
                    "library", "drive", "host", "desired", "request", "status", "since", "vid",
                    "tapepool", "vo", "files", "data", "MB/s", "session", "priority", "activity",
                    "age", "reason",
                ],
                false,
            ),
            RecordKind::FailedRequest => (
                &[
                    "object id", "request type", "copy no", "tapepool/vid", "requester", "group",
                    "path",
                ],
                false,
            ),
            RecordKind::FailedRequestSummary => (&["request type", "total files", "total size"], false),
            RecordKind::GroupMountRule => (&["instance", "group", "policy"], true),
            RecordKind::LogicalLibrary => (&["library", "disabled", "physical library"], true),
            RecordKind::PhysicalLibrary => (
                &[
                    "name", "manufacturer", "model", "type", "location", "cartridge slots",
                    "available slots", "drive slots", "disabled",
                ],
                true,
            ),
            RecordKind::MediaType => (
                &[
                    "media type", "cartridge", "capacity", "primary density code",
                    "secondary density code", "number of wraps", "min LPos", "max LPos",
                ],
                true,
            ),
            RecordKind::MountPolicy => (
                &["mount policy", "a.priority", "a.minAge", "r.priority", "r.minAge"],
                true,
            ),
            RecordKind::Repack => (
                &[
                    "c.time", "repackTime", "c.user", "vid", "tapepool", "providedFiles",
                    "totalFiles", "totalBytes", "filesToRetrieve", "filesToArchive", "failed",
                    "status",
                ],
                false,
            ),
            RecordKind::RequesterMountRule => (&["instance", "username", "policy"], true),
            RecordKind::ShowQueues => (
                &[
                    "type", "tapepool", "vo", "library", "vid", "files queued", "data queued",
                    "oldest", "youngest", "priority", "min age", "read max drives",
                    "write max drives", "cur. mounts", "cur. files", "cur. data", "tapes capacity",
                    "files on tapes", "data on tapes", "full tapes", "writable tapes",
                ],
                false,
            ),
            RecordKind::StorageClass => (&["storage class", "number of copies", "vo"], true),
            RecordKind::Tape => (
                &[
                    "vid", "media type", "vendor", "library", "tapepool", "vo",
                    "encryption key name", "capacity", "occupancy", "last fseq", "full",
                    "from castor", "state", "state reason", "label drive", "label time",
                    "last w drive", "last w time", "w mounts", "last r drive", "last r time",
                    "r mounts",
                ],
                true,
            ),
            RecordKind::TapePool => (
                &[
                    "name", "vo", "#tapes", "#partial", "#phys files", "size", "used", "avail",
                    "use%", "encrypt", "supply",
                ],
                true,
            ),
            RecordKind::DiskSystem => (
                &["name", "regexp", "instance", "instance space", "free space", "sleep"],
                true,
            ),
            RecordKind::DiskInstance => (&["name"], true),
            RecordKind::DiskInstanceSpace => (
                &["name", "instance", "url", "interval", "last refresh", "space"],
                true,
            ),
            RecordKind::VirtualOrganization => (
                &["name", "read max drives", "write max drives", "max file size"],
                true,
            ),
            RecordKind::Version => (
                &["server version", "catalogue version", "upgrading", "scheduler backend"],
                false,
            ),
            RecordKind::RecycleTapeFile => (
                &[
                    "archive id", "copy no", "vid", "fseq", "block id", "instance", "disk fxid",
                    "size", "storage class", "owner", "group", "deletion time",
                    "path when deleted", "reason",
                ],
                false,
            ),
        };

        let mut columns = leading.to_vec();
        if with_logs {
            columns.extend_from_slice(&LOG_COLUMNS);
        }
        columns
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First record of every stream: names the record kind and its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamHeader {
    pub kind: RecordKind,
    pub columns: Vec<String>,
}

impl StreamHeader {
    pub fn for_kind(kind: RecordKind) -> Self {
        Self {
            kind,
            columns: kind.columns().into_iter().map(String::from).collect(),
        }
    }
}

// ============================================================================
// Drive listing
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfigItem {
    pub category: String,
    pub key: String,
    pub value: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveLsItem {
    pub instance_name: String,
    pub scheduler_backend_name: String,
    pub logical_library: String,
    pub logical_library_disabled: bool,
    pub physical_library: String,
    pub drive_name: String,
    pub host: String,
    pub desired_up: bool,
    pub desired_force_down: bool,
    pub mount_type: String,
    pub drive_status: String,
    /// Seconds spent in the current status.
    pub drive_status_since: u64,
    pub vid: String,
    pub tapepool: String,
    pub vo: String,
    pub files_transferred_in_session: u64,
    pub bytes_transferred_in_session: u64,
    pub session_id: u64,
    pub session_elapsed_time: u64,
    pub time_since_last_update: u64,
    pub current_priority: u64,
    pub current_activity: String,
    pub next_mount_type: String,
    pub next_vid: String,
    pub next_tapepool: String,
    pub reason: String,
    pub comment: String,
    pub software_version: String,
    pub dev_file_name: String,
    pub raw_library_slot: String,
    pub disk_system_name: String,
    pub reserved_bytes: u64,
    pub drive_config: Vec<DriveConfigItem>,
}

// ============================================================================
// Repack listing
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepackDestinationItem {
    pub vid: String,
    pub files: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepackLsItem {
    pub instance_name: String,
    pub vid: String,
    pub tapepool: String,
    pub repack_buffer_url: String,
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
    pub files_left_to_retrieve: u64,
    pub files_left_to_archive: u64,
    pub failed_to_retrieve_files: u64,
    pub failed_to_retrieve_bytes: u64,
    pub failed_to_archive_files: u64,
    pub failed_to_archive_bytes: u64,
    pub total_failed_files: u64,
    pub status: String,
    pub repack_finished_time: i64,
    /// Seconds since the repack was created, or its total duration once finished.
    pub repack_time: u64,
    pub creation_log: EntryLog,
    pub last_expanded_fseq: u64,
    pub destination_infos: Vec<RepackDestinationItem>,
}

// ============================================================================
// Failed request listing
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterItem {
    pub username: String,
    pub groupname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRequestLsItem {
    pub object_id: String,
    pub request_type: RequestType,
    pub copy_nb: u64,
    /// Set for archive jobs.
    pub tapepool: String,
    /// Set for retrieve jobs.
    pub vid: String,
    pub requester: RequesterItem,
    pub archive_file_id: u64,
    pub disk_instance: String,
    pub disk_file_id: String,
    pub disk_file_path: String,
    pub size: u64,
    pub total_retries: u32,
    pub total_report_retries: u32,
    pub failure_logs: Vec<String>,
    pub report_failure_logs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRequestSummaryItem {
    pub request_type: RequestType,
    pub total_files: u64,
    pub total_size: u64,
}

// ============================================================================
// Tape listing
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeLsItem {
    pub instance_name: String,
    pub vid: String,
    pub media_type: String,
    pub vendor: String,
    pub logical_library: String,
    pub physical_library: String,
    pub tapepool: String,
    pub vo: String,
    pub encryption_key_name: String,
    pub capacity: u64,
    pub occupancy: u64,
    pub last_fseq: u64,
    pub full: bool,
    pub dirty: bool,
    pub from_castor: bool,
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
    pub state: String,
    pub state_reason: String,
    pub state_update_time: i64,
    pub state_modified_by: String,
    pub purchase_order: String,
    pub verification_status: String,
}

// ============================================================================
// Queue and mount summaries
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowQueuesItem {
    pub instance_name: String,
    pub scheduler_backend_name: String,
    pub mount_type: String,
    pub tapepool: String,
    pub vo: String,
    pub logical_library: String,
    pub vid: String,
    pub queued_files: u64,
    pub queued_bytes: u64,
    pub oldest_age: u64,
    pub youngest_age: u64,
    pub priority: u64,
    pub min_age: u64,
    pub read_max_drives: u64,
    pub write_max_drives: u64,
    pub cur_mounts: u64,
    pub cur_files: u64,
    pub cur_bytes: u64,
    pub tapes_capacity: u64,
    pub tapes_files: u64,
    pub tapes_bytes: u64,
    pub full_tapes: u64,
    pub writable_tapes: u64,
    pub sleeping_for_space: bool,
    pub sleep_start_time: i64,
    pub disk_system_slept_for: String,
    pub mount_policies: Vec<String>,
    pub highest_priority_mount_policy: String,
    pub lowest_request_age_mount_policy: String,
}

// ============================================================================
// Simple catalogue listings
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLsItem {
    pub instance_name: String,
    pub user: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRouteLsItem {
    pub instance_name: String,
    pub storage_class: String,
    pub copy_number: u64,
    pub archive_route_type: String,
    pub tapepool: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

/// Shared shape of group and requester mount rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRuleLsItem {
    pub instance_name: String,
    pub disk_instance: String,
    pub name: String,
    pub mount_policy: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMountRuleLsItem {
    pub instance_name: String,
    pub disk_instance: String,
    pub activity_mount_rule: String,
    pub mount_policy: String,
    pub activity_regex: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalLibraryLsItem {
    pub instance_name: String,
    pub name: String,
    pub is_disabled: bool,
    pub disabled_reason: String,
    pub physical_library: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalLibraryLsItem {
    pub instance_name: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub library_type: String,
    pub gui_url: String,
    pub webcam_url: String,
    pub location: String,
    pub nb_physical_cartridge_slots: u64,
    pub nb_available_cartridge_slots: u64,
    pub nb_physical_drive_slots: u64,
    pub is_disabled: bool,
    pub disabled_reason: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTypeLsItem {
    pub instance_name: String,
    pub name: String,
    pub cartridge: String,
    pub capacity: u64,
    pub primary_density_code: u32,
    pub secondary_density_code: u32,
    pub number_of_wraps: u32,
    pub min_lpos: u64,
    pub max_lpos: u64,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPolicyLsItem {
    pub instance_name: String,
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
pub struct StorageClassLsItem {
    pub instance_name: String,
    pub name: String,
    pub nb_copies: u64,
    pub vo: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TapePoolLsItem {
    pub instance_name: String,
    pub name: String,
    pub vo: String,
    pub num_tapes: u64,
    pub num_partial_tapes: u64,
    pub num_physical_files: u64,
    pub capacity_bytes: u64,
    pub data_bytes: u64,
    pub available_bytes: u64,
    pub use_percent: f64,
    pub encrypt: bool,
    pub encryption_key_name: String,
    pub supply_sources: Vec<String>,
    pub supply_destinations: Vec<String>,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSystemLsItem {
    pub instance_name: String,
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
pub struct DiskInstanceLsItem {
    pub instance_name: String,
    pub name: String,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskInstanceSpaceLsItem {
    pub instance_name: String,
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
pub struct VirtualOrganizationLsItem {
    pub instance_name: String,
    pub name: String,
    pub read_max_drives: u64,
    pub write_max_drives: u64,
    pub max_file_size: u64,
    pub disk_instance: String,
    pub is_repack_vo: bool,
    pub creation_log: EntryLog,
    pub last_modification_log: EntryLog,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionItem {
    pub server_version: String,
    pub catalogue_version: String,
    pub is_upgrading: bool,
    pub scheduler_backend_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecycleTapeFileLsItem {
    pub instance_name: String,
    pub vid: String,
    pub fseq: u64,
    pub block_id: u64,
    pub copy_nb: u64,
    pub tape_file_creation_time: i64,
    pub archive_file_id: u64,
    pub disk_instance: String,
    pub disk_file_id: String,
    pub disk_file_id_when_deleted: String,
    pub disk_file_uid: u64,
    pub disk_file_gid: u64,
    pub size_in_bytes: u64,
    pub storage_class: String,
    pub archive_file_creation_time: i64,
    pub reconciliation_time: i64,
    pub disk_file_path: String,
    pub reason_log: String,
    pub recycle_log_time: i64,
}

// ============================================================================
// Record
// ============================================================================

/// One streamed output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "item", rename_all = "snake_case")]
pub enum Record {
    Header(StreamHeader),
    AdminUser(AdminLsItem),
    ArchiveRoute(ArchiveRouteLsItem),
    ActivityMountRule(ActivityMountRuleLsItem),
    Drive(DriveLsItem),
    FailedRequest(FailedRequestLsItem),
    FailedRequestSummary(FailedRequestSummaryItem),
    GroupMountRule(MountRuleLsItem),
    LogicalLibrary(LogicalLibraryLsItem),
    PhysicalLibrary(PhysicalLibraryLsItem),
    MediaType(MediaTypeLsItem),
    MountPolicy(MountPolicyLsItem),
    Repack(RepackLsItem),
    RequesterMountRule(MountRuleLsItem),
    ShowQueues(ShowQueuesItem),
    StorageClass(StorageClassLsItem),
    Tape(TapeLsItem),
    TapePool(TapePoolLsItem),
    DiskSystem(DiskSystemLsItem),
    DiskInstance(DiskInstanceLsItem),
    DiskInstanceSpace(DiskInstanceSpaceLsItem),
    VirtualOrganization(VirtualOrganizationLsItem),
    Version(VersionItem),
    RecycleTapeFile(RecycleTapeFileLsItem),
}

impl Record {
    pub fn header(kind: RecordKind) -> Self {
        Record::Header(StreamHeader::for_kind(kind))
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Record::Header(_))
    }

    /// Kind of a data record; `None` for the header.
    pub fn kind(&self) -> Option<RecordKind> {
        let kind = match self {
            Record::Header(_) => return None,
            Record::AdminUser(_) => RecordKind::AdminUser,
            Record::ArchiveRoute(_) => RecordKind::ArchiveRoute,
            Record::ActivityMountRule(_) => RecordKind::ActivityMountRule,
            Record::Drive(_) => RecordKind::Drive,
            Record::FailedRequest(_) => RecordKind::FailedRequest,
            Record::FailedRequestSummary(_) => RecordKind::FailedRequestSummary,
            Record::GroupMountRule(_) => RecordKind::GroupMountRule,
            Record::LogicalLibrary(_) => RecordKind::LogicalLibrary,
            Record::PhysicalLibrary(_) => RecordKind::PhysicalLibrary,
            Record::MediaType(_) => RecordKind::MediaType,
            Record::MountPolicy(_) => RecordKind::MountPolicy,
            Record::Repack(_) => RecordKind::Repack,
            Record::RequesterMountRule(_) => RecordKind::RequesterMountRule,
            Record::ShowQueues(_) => RecordKind::ShowQueues,
            Record::StorageClass(_) => RecordKind::StorageClass,
            Record::Tape(_) => RecordKind::Tape,
            Record::TapePool(_) => RecordKind::TapePool,
            Record::DiskSystem(_) => RecordKind::DiskSystem,
            Record::DiskInstance(_) => RecordKind::DiskInstance,
            Record::DiskInstanceSpace(_) => RecordKind::DiskInstanceSpace,
            Record::VirtualOrganization(_) => RecordKind::VirtualOrganization,
            Record::Version(_) => RecordKind::Version,
            Record::RecycleTapeFile(_) => RecordKind::RecycleTapeFile,
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_columns_appended() {
        let columns = RecordKind::AdminUser.columns();
        assert_eq!(columns.first(), Some(&"user"));
        assert_eq!(columns.last(), Some(&"comment"));
        assert_eq!(columns.len(), 1 + LOG_COLUMNS.len());

        let drive = RecordKind::Drive.columns();
        assert!(!drive.contains(&"comment"));
        assert_eq!(drive[1], "drive");
    }

    #[test]
    fn test_record_kind_of_data_and_header() {
        assert_eq!(Record::header(RecordKind::Drive).kind(), None);
        assert!(Record::header(RecordKind::Drive).is_header());

        let record = Record::FailedRequestSummary(FailedRequestSummaryItem {
            request_type: RequestType::Archive,
            total_files: 3,
            total_size: 900,
        });
        assert_eq!(record.kind(), Some(RecordKind::FailedRequestSummary));
        assert!(!record.is_header());
    }

    #[test]
    fn test_record_json_is_tagged() {
        let record = Record::Version(VersionItem {
            server_version: "1.0".to_string(),
            ..Default::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "version");
        assert_eq!(json["item"]["server_version"], "1.0");

        let header = serde_json::to_value(Record::header(RecordKind::Repack)).unwrap();
        assert_eq!(header["type"], "header");
        assert_eq!(header["item"]["kind"], "repack");
    }
}
