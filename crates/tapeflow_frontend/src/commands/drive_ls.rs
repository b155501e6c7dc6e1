//! `drive ls`: live drive states joined with their config entries.
//!
//! Drives are filtered by the `--drive` regular expression first, then (unless
//! `--all`) by ownership: only drives whose `SchedulerBackendName` config value
//! equals this frontend's backend are listed.

use std::collections::HashMap;

use regex::Regex;
use tapeflow_catalogue::{DriveConfigEntry, TapeDrive};
use tapeflow_protocol::defaults::{SCHEDULER_BACKEND_CONFIG_KEY, UNKNOWN_SCHEDULER_BACKEND};
use tapeflow_protocol::records::{DriveConfigItem, DriveLsItem};
use tapeflow_protocol::{BoolOpt, DriveStatus, Record, RecordKind, StrOpt};
use tracing::{debug, error};

use crate::context::FrontendContext;
use crate::error::{FrontendError, Result};
use crate::query::Query;
use crate::stream::{CollectionSource, RecordSource};

pub fn open(ctx: &FrontendContext, query: &Query) -> Result<Box<dyn RecordSource>> {
    let pattern = query
        .get_str(StrOpt::Drive)
        .map(|raw| {
            Regex::new(raw).map_err(|err| {
                FrontendError::validation(format!("Invalid --drive regex '{}': {}", raw, err))
            })
        })
        .transpose()?;
    let all = query.has_flag(BoolOpt::All);

    let drives = ctx.scheduler.get_drive_states()?;
    let mut config_by_drive: HashMap<String, Vec<DriveConfigEntry>> = HashMap::new();
    for entry in ctx.catalogue.get_drive_config_entries()? {
        config_by_drive
            .entry(entry.drive_name.clone())
            .or_default()
            .push(entry);
    }

    let matched: Vec<TapeDrive> = match &pattern {
        Some(re) => drives
            .into_iter()
            .filter(|drive| re.is_match(&drive.drive_name))
            .collect(),
        None => drives,
    };
    if let (Some(re), true) = (&pattern, matched.is_empty()) {
        return Err(FrontendError::not_found(format!(
            "Drive {} not found",
            re.as_str()
        )));
    }

    let now = ctx.now();
    let no_config: Vec<DriveConfigEntry> = Vec::new();
    let mut items: Vec<DriveLsItem> = Vec::with_capacity(matched.len());
    for drive in matched {
        let config = config_by_drive.get(&drive.drive_name).unwrap_or(&no_config);
        let backend = backend_name(&drive.drive_name, config);
        if !all && backend != ctx.scheduler_backend_name {
            debug!(
                drive = %drive.drive_name,
                drive_backend = %backend,
                "Skipping drive owned by another scheduler backend"
            );
            continue;
        }
        items.push(to_item(ctx, &drive, backend, config, now));
    }
    items.sort_by(|a, b| {
        (a.logical_library.as_str(), a.drive_name.as_str())
            .cmp(&(b.logical_library.as_str(), b.drive_name.as_str()))
    });

    Ok(CollectionSource::mapped(RecordKind::Drive, items, Record::Drive).boxed())
}

/// The drive's `SchedulerBackendName`, or `"unknown"` when it has none.
fn backend_name(drive_name: &str, config: &[DriveConfigEntry]) -> String {
    match config
        .iter()
        .find(|entry| entry.key_name == SCHEDULER_BACKEND_CONFIG_KEY)
    {
        Some(entry) => entry.value.clone(),
        None => {
            error!(
                drive = %drive_name,
                "Drive has no {} config entry, reporting '{}'",
                SCHEDULER_BACKEND_CONFIG_KEY,
                UNKNOWN_SCHEDULER_BACKEND
            );
            UNKNOWN_SCHEDULER_BACKEND.to_string()
        }
    }
}

/// When the drive entered its current status.
pub fn status_start_time(drive: &TapeDrive) -> Option<i64> {
    match drive.drive_status {
        DriveStatus::Probing => drive.probe_start_time,
        DriveStatus::Up | DriveStatus::Down => drive.down_or_up_start_time,
        DriveStatus::Starting => drive.start_start_time,
        DriveStatus::Mounting => drive.mount_start_time,
        DriveStatus::Transferring => drive.transfer_start_time,
        DriveStatus::CleaningUp => drive.cleanup_start_time,
        DriveStatus::Unloading => drive.unload_start_time,
        DriveStatus::Unmounting => drive.unmount_start_time,
        DriveStatus::DrainingToDisk => drive.draining_start_time,
        DriveStatus::Shutdown => drive.shutdown_time,
        DriveStatus::Unknown => None,
    }
}

/// Seconds spent in the current status; zero when unknown.
pub fn seconds_in_status(drive: &TapeDrive, now: i64) -> u64 {
    status_start_time(drive)
        .map(|start| now.saturating_sub(start).max(0) as u64)
        .unwrap_or(0)
}

fn to_item(
    ctx: &FrontendContext,
    drive: &TapeDrive,
    backend: String,
    config: &[DriveConfigEntry],
    now: i64,
) -> DriveLsItem {
    let time_since_last_update = drive
        .last_modification_log
        .as_ref()
        .map(|log| now.saturating_sub(log.time).max(0) as u64)
        .unwrap_or(0);

    DriveLsItem {
        instance_name: ctx.instance_name.clone(),
        scheduler_backend_name: backend,
        logical_library: drive.logical_library.clone(),
        logical_library_disabled: drive.logical_library_disabled.unwrap_or(false),
        physical_library: drive.physical_library_name.clone().unwrap_or_default(),
        drive_name: drive.drive_name.clone(),
        host: drive.host.clone(),
        desired_up: drive.desired_up,
        desired_force_down: drive.desired_force_down,
        mount_type: drive.mount_type.to_string(),
        drive_status: drive.drive_status.to_string(),
        drive_status_since: seconds_in_status(drive, now),
        vid: drive.current_vid.clone().unwrap_or_default(),
        tapepool: drive.current_tape_pool.clone().unwrap_or_default(),
        vo: drive.current_vo.clone().unwrap_or_default(),
        files_transferred_in_session: drive.files_transferred_in_session.unwrap_or(0),
        bytes_transferred_in_session: drive.bytes_transferred_in_session.unwrap_or(0),
        session_id: drive.session_id.unwrap_or(0),
        session_elapsed_time: drive.session_elapsed_time.unwrap_or(0),
        time_since_last_update,
        current_priority: drive.current_priority.unwrap_or(0),
        current_activity: drive.current_activity.clone().unwrap_or_default(),
        next_mount_type: drive
            .next_mount_type
            .map(|m| m.to_string())
            .unwrap_or_default(),
        next_vid: drive.next_vid.clone().unwrap_or_default(),
        next_tapepool: drive.next_tape_pool.clone().unwrap_or_default(),
        reason: drive.reason_up_down.clone().unwrap_or_default(),
        comment: drive.user_comment.clone().unwrap_or_default(),
        software_version: drive.software_version.clone().unwrap_or_default(),
        dev_file_name: drive.dev_file_name.clone().unwrap_or_default(),
        raw_library_slot: drive.raw_library_slot.clone().unwrap_or_default(),
        disk_system_name: drive.disk_system_name.clone().unwrap_or_default(),
        reserved_bytes: drive.reserved_bytes.unwrap_or(0),
        drive_config: config
            .iter()
            .map(|entry| DriveConfigItem {
                category: entry.category.clone(),
                key: entry.key_name.clone(),
                value: entry.value.clone(),
                source: entry.source.clone(),
            })
            .collect(),
    }
}
