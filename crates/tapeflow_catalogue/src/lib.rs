//! Tapeflow catalogue and scheduler read interfaces.
//!
//! The admin frontend only reads. Three seams are consumed:
//!
//! - [`Catalogue`]: configuration tables, tapes, drive config and the recycle log
//! - [`Scheduler`]: live drive states, queue summaries and repacks
//! - [`SchedulerDatabase`]: per-queue job cursors
//!
//! [`MemoryBackend`] implements all three over a JSON state file.

pub mod cursor;
pub mod error;
pub mod memory;
pub mod model;

pub use cursor::{Cursor, VecCursor};
pub use error::{CatalogueError, Result};
pub use memory::{CatalogueState, MemoryBackend};
pub use model::*;

use std::collections::{BTreeSet, HashMap};

/// Boxed cursor as returned across the trait seams.
pub type BoxCursor<T> = Box<dyn Cursor<T>>;

// ============================================================================
// Catalogue
// ============================================================================

pub trait Catalogue: Send + Sync {
    fn get_admin_users(&self) -> Result<Vec<AdminUser>>;
    fn get_archive_routes(&self) -> Result<Vec<ArchiveRoute>>;
    fn get_requester_group_mount_rules(&self) -> Result<Vec<MountRule>>;
    fn get_requester_mount_rules(&self) -> Result<Vec<MountRule>>;
    fn get_requester_activity_mount_rules(&self) -> Result<Vec<ActivityMountRule>>;
    fn get_logical_libraries(&self) -> Result<Vec<LogicalLibrary>>;
    fn get_physical_libraries(&self) -> Result<Vec<PhysicalLibrary>>;
    fn get_media_types(&self) -> Result<Vec<MediaType>>;
    fn get_mount_policies(&self) -> Result<Vec<MountPolicy>>;
    fn get_storage_classes(&self) -> Result<Vec<StorageClass>>;
    fn get_tape_pools(&self) -> Result<Vec<TapePool>>;
    fn get_disk_systems(&self) -> Result<Vec<DiskSystem>>;
    fn get_disk_instances(&self) -> Result<Vec<DiskInstance>>;
    fn get_disk_instance_spaces(&self) -> Result<Vec<DiskInstanceSpace>>;
    fn get_virtual_organizations(&self) -> Result<Vec<VirtualOrganization>>;
    fn get_schema_version(&self) -> Result<SchemaVersion>;

    /// Tapes matching every set field of `criteria`, ordered by VID.
    fn get_tapes(&self, criteria: &TapeSearchCriteria) -> Result<Vec<Tape>>;

    /// Batched lookup; VIDs without a tape are absent from the map.
    fn get_tapes_by_vids(&self, vids: &BTreeSet<String>) -> Result<HashMap<String, Tape>>;

    fn get_drive_config_entries(&self) -> Result<Vec<DriveConfigEntry>>;

    fn get_recycle_tape_files(
        &self,
        criteria: &RecycleTapeFileSearchCriteria,
    ) -> Result<BoxCursor<RecycleTapeFile>>;
}

// ============================================================================
// Scheduler
// ============================================================================

pub trait Scheduler: Send + Sync {
    fn get_drive_states(&self) -> Result<Vec<TapeDrive>>;
    fn get_queues_and_mount_summaries(&self) -> Result<Vec<QueueAndMountSummary>>;
    fn get_repacks(&self) -> Result<Vec<RepackInfo>>;
    fn get_repack(&self, vid: &str) -> Result<Option<RepackInfo>>;

    /// Name of the scheduler backend this scheduler runs against, if configured.
    fn get_scheduler_backend_name(&self) -> Option<String>;
}

// ============================================================================
// Scheduler database
// ============================================================================

pub trait SchedulerDatabase: Send + Sync {
    /// Archive jobs of `queue_type`, for one tape pool or all when `tape_pool` is empty.
    fn get_archive_job_queue_cursor(
        &self,
        tape_pool: &str,
        queue_type: JobQueueType,
    ) -> Result<BoxCursor<QueuedJob>>;

    /// Retrieve jobs of `queue_type`, for one VID or all when `vid` is empty.
    fn get_retrieve_job_queue_cursor(
        &self,
        vid: &str,
        queue_type: JobQueueType,
    ) -> Result<BoxCursor<QueuedJob>>;
}
