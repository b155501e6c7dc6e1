//! In-memory catalogue, scheduler and scheduler database.
//!
//! State is loaded once from a JSON file (or built directly in tests) and is
//! read-only afterwards.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cursor::VecCursor;
use crate::error::Result;
use crate::model::*;
use crate::{BoxCursor, Catalogue, Scheduler, SchedulerDatabase};

/// Everything the in-memory backend serves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueState {
    pub scheduler_backend_name: Option<String>,
    pub schema_version: SchemaVersion,

    pub admin_users: Vec<AdminUser>,
    pub archive_routes: Vec<ArchiveRoute>,
    pub group_mount_rules: Vec<MountRule>,
    pub requester_mount_rules: Vec<MountRule>,
    pub activity_mount_rules: Vec<ActivityMountRule>,
    pub logical_libraries: Vec<LogicalLibrary>,
    pub physical_libraries: Vec<PhysicalLibrary>,
    pub media_types: Vec<MediaType>,
    pub mount_policies: Vec<MountPolicy>,
    pub storage_classes: Vec<StorageClass>,
    pub tape_pools: Vec<TapePool>,
    pub disk_systems: Vec<DiskSystem>,
    pub disk_instances: Vec<DiskInstance>,
    pub disk_instance_spaces: Vec<DiskInstanceSpace>,
    pub virtual_organizations: Vec<VirtualOrganization>,
    pub tapes: Vec<Tape>,
    pub drive_config: Vec<DriveConfigEntry>,
    pub recycle_log: Vec<RecycleTapeFile>,

    pub drives: Vec<TapeDrive>,
    pub queue_summaries: Vec<QueueAndMountSummary>,
    pub repacks: Vec<RepackInfo>,
    pub archive_jobs: Vec<QueuedJob>,
    pub retrieve_jobs: Vec<QueuedJob>,
}

/// Read-only backend over a [`CatalogueState`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: CatalogueState,
    cursors_opened: AtomicUsize,
}

impl MemoryBackend {
    pub fn new(state: CatalogueState) -> Self {
        Self {
            state,
            cursors_opened: AtomicUsize::new(0),
        }
    }

    /// Load state from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let state: CatalogueState = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            tapes = state.tapes.len(),
            drives = state.drives.len(),
            repacks = state.repacks.len(),
            "Loaded catalogue state"
        );
        Ok(Self::new(state))
    }

    pub fn state(&self) -> &CatalogueState {
        &self.state
    }

    /// Number of job queue cursors opened so far.
    pub fn cursors_opened(&self) -> usize {
        self.cursors_opened.load(Ordering::Relaxed)
    }

    fn open_job_cursor<F>(&self, jobs: &[QueuedJob], queue_type: JobQueueType, keep: F) -> BoxCursor<QueuedJob>
    where
        F: Fn(&QueuedJob) -> bool,
    {
        self.cursors_opened.fetch_add(1, Ordering::Relaxed);
        let selected: Vec<QueuedJob> = jobs
            .iter()
            .filter(|job| job.queue_type == queue_type && keep(job))
            .cloned()
            .collect();
        debug!(jobs = selected.len(), ?queue_type, "Opened job queue cursor");
        Box::new(VecCursor::new(selected))
    }
}

impl Catalogue for MemoryBackend {
    fn get_admin_users(&self) -> Result<Vec<AdminUser>> {
        Ok(self.state.admin_users.clone())
    }

    fn get_archive_routes(&self) -> Result<Vec<ArchiveRoute>> {
        Ok(self.state.archive_routes.clone())
    }

    fn get_requester_group_mount_rules(&self) -> Result<Vec<MountRule>> {
        Ok(self.state.group_mount_rules.clone())
    }

    fn get_requester_mount_rules(&self) -> Result<Vec<MountRule>> {
        Ok(self.state.requester_mount_rules.clone())
    }

    fn get_requester_activity_mount_rules(&self) -> Result<Vec<ActivityMountRule>> {
        Ok(self.state.activity_mount_rules.clone())
    }

    fn get_logical_libraries(&self) -> Result<Vec<LogicalLibrary>> {
        Ok(self.state.logical_libraries.clone())
    }

    fn get_physical_libraries(&self) -> Result<Vec<PhysicalLibrary>> {
        Ok(self.state.physical_libraries.clone())
    }

    fn get_media_types(&self) -> Result<Vec<MediaType>> {
        Ok(self.state.media_types.clone())
    }

    fn get_mount_policies(&self) -> Result<Vec<MountPolicy>> {
        Ok(self.state.mount_policies.clone())
    }

    fn get_storage_classes(&self) -> Result<Vec<StorageClass>> {
        Ok(self.state.storage_classes.clone())
    }

    fn get_tape_pools(&self) -> Result<Vec<TapePool>> {
        Ok(self.state.tape_pools.clone())
    }

    fn get_disk_systems(&self) -> Result<Vec<DiskSystem>> {
        Ok(self.state.disk_systems.clone())
    }

    fn get_disk_instances(&self) -> Result<Vec<DiskInstance>> {
        Ok(self.state.disk_instances.clone())
    }

    fn get_disk_instance_spaces(&self) -> Result<Vec<DiskInstanceSpace>> {
        Ok(self.state.disk_instance_spaces.clone())
    }

    fn get_virtual_organizations(&self) -> Result<Vec<VirtualOrganization>> {
        Ok(self.state.virtual_organizations.clone())
    }

    fn get_schema_version(&self) -> Result<SchemaVersion> {
        Ok(self.state.schema_version.clone())
    }

    fn get_tapes(&self, criteria: &TapeSearchCriteria) -> Result<Vec<Tape>> {
        let mut tapes: Vec<Tape> = self
            .state
            .tapes
            .iter()
            .filter(|tape| criteria.matches(tape))
            .cloned()
            .collect();
        tapes.sort_by(|a, b| a.vid.cmp(&b.vid));
        Ok(tapes)
    }

    fn get_tapes_by_vids(&self, vids: &BTreeSet<String>) -> Result<HashMap<String, Tape>> {
        Ok(self
            .state
            .tapes
            .iter()
            .filter(|tape| vids.contains(&tape.vid))
            .map(|tape| (tape.vid.clone(), tape.clone()))
            .collect())
    }

    fn get_drive_config_entries(&self) -> Result<Vec<DriveConfigEntry>> {
        Ok(self.state.drive_config.clone())
    }

    fn get_recycle_tape_files(
        &self,
        criteria: &RecycleTapeFileSearchCriteria,
    ) -> Result<BoxCursor<RecycleTapeFile>> {
        let files: Vec<RecycleTapeFile> = self
            .state
            .recycle_log
            .iter()
            .filter(|file| criteria.matches(file))
            .cloned()
            .collect();
        Ok(Box::new(VecCursor::new(files)))
    }
}

impl Scheduler for MemoryBackend {
    fn get_drive_states(&self) -> Result<Vec<TapeDrive>> {
        Ok(self.state.drives.clone())
    }

    fn get_queues_and_mount_summaries(&self) -> Result<Vec<QueueAndMountSummary>> {
        Ok(self.state.queue_summaries.clone())
    }

    fn get_repacks(&self) -> Result<Vec<RepackInfo>> {
        Ok(self.state.repacks.clone())
    }

    fn get_repack(&self, vid: &str) -> Result<Option<RepackInfo>> {
        Ok(self.state.repacks.iter().find(|r| r.vid == vid).cloned())
    }

    fn get_scheduler_backend_name(&self) -> Option<String> {
        self.state.scheduler_backend_name.clone()
    }
}

impl SchedulerDatabase for MemoryBackend {
    fn get_archive_job_queue_cursor(
        &self,
        tape_pool: &str,
        queue_type: JobQueueType,
    ) -> Result<BoxCursor<QueuedJob>> {
        Ok(self.open_job_cursor(&self.state.archive_jobs, queue_type, |job| {
            tape_pool.is_empty() || job.tape_pool == tape_pool
        }))
    }

    fn get_retrieve_job_queue_cursor(
        &self,
        vid: &str,
        queue_type: JobQueueType,
    ) -> Result<BoxCursor<QueuedJob>> {
        Ok(self.open_job_cursor(&self.state.retrieve_jobs, queue_type, |job| {
            vid.is_empty() || job.vid == vid
        }))
    }
}
