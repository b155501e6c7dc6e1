//! `showqueues`: scheduler queue and mount summaries.

use tapeflow_catalogue::QueueAndMountSummary;
use tapeflow_protocol::records::ShowQueuesItem;
use tapeflow_protocol::{MountType, Record, RecordKind};

use crate::context::FrontendContext;
use crate::error::Result;
use crate::query::Query;
use crate::stream::{CollectionSource, RecordSource};

pub fn open(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let summaries = ctx.scheduler.get_queues_and_mount_summaries()?;
    let instance_name = ctx.instance_name.clone();
    let backend_name = ctx.scheduler_backend_name.clone();

    Ok(
        CollectionSource::mapped(RecordKind::ShowQueues, summaries, move |summary| {
            Record::ShowQueues(to_item(&instance_name, &backend_name, summary))
        })
        .boxed(),
    )
}

/// Priority and minimum request age of the side of the policy this mount serves.
pub fn priority_and_min_age(summary: &QueueAndMountSummary) -> (u64, u64) {
    let policy = &summary.mount_policy;
    if summary.mount_type.is_archive() {
        (policy.archive_priority, policy.archive_min_request_age)
    } else if summary.mount_type == MountType::Retrieve {
        (policy.retrieve_priority, policy.retrieve_min_request_age)
    } else {
        (0, 0)
    }
}

fn to_item(instance_name: &str, backend_name: &str, summary: QueueAndMountSummary) -> ShowQueuesItem {
    let (priority, min_age) = priority_and_min_age(&summary);
    let (sleeping_for_space, sleep_start_time, disk_system_slept_for) =
        match summary.sleep_for_space_info {
            Some(info) => (true, info.start_time, info.disk_system_name),
            None => (false, 0, String::new()),
        };

    ShowQueuesItem {
        instance_name: instance_name.to_string(),
        scheduler_backend_name: backend_name.to_string(),
        mount_type: summary.mount_type.to_string(),
        tapepool: summary.tape_pool,
        vo: summary.vo,
        logical_library: summary.logical_library,
        vid: summary.vid,
        queued_files: summary.files_queued,
        queued_bytes: summary.bytes_queued,
        oldest_age: summary.oldest_job_age,
        youngest_age: summary.youngest_job_age,
        priority,
        min_age,
        read_max_drives: summary.read_max_drives,
        write_max_drives: summary.write_max_drives,
        cur_mounts: summary.current_mounts,
        cur_files: summary.current_files,
        cur_bytes: summary.current_bytes,
        tapes_capacity: summary.tapes_capacity,
        tapes_files: summary.files_on_tapes,
        tapes_bytes: summary.data_on_tapes,
        full_tapes: summary.full_tapes,
        writable_tapes: summary.writable_tapes,
        sleeping_for_space,
        sleep_start_time,
        disk_system_slept_for,
        mount_policies: summary.mount_policies,
        highest_priority_mount_policy: summary.highest_priority_mount_policy,
        lowest_request_age_mount_policy: summary.lowest_request_age_mount_policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapeflow_catalogue::{MountPolicy, SleepForSpaceInfo};

    fn summary(mount_type: MountType) -> QueueAndMountSummary {
        QueueAndMountSummary {
            mount_type,
            mount_policy: MountPolicy {
                archive_priority: 3,
                archive_min_request_age: 30,
                retrieve_priority: 7,
                retrieve_min_request_age: 70,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_policy_side_follows_mount_type() {
        assert_eq!(priority_and_min_age(&summary(MountType::ArchiveForUser)), (3, 30));
        assert_eq!(priority_and_min_age(&summary(MountType::ArchiveForRepack)), (3, 30));
        assert_eq!(priority_and_min_age(&summary(MountType::Retrieve)), (7, 70));
        assert_eq!(priority_and_min_age(&summary(MountType::Label)), (0, 0));
        assert_eq!(priority_and_min_age(&summary(MountType::NoMount)), (0, 0));
    }

    #[test]
    fn test_item_carries_identity_and_sleep_info() {
        let mut s = summary(MountType::Retrieve);
        s.sleep_for_space_info = Some(SleepForSpaceInfo {
            start_time: 1234,
            disk_system_name: "eos_default".to_string(),
        });
        let item = to_item("tapeflow", "ceph-a", s);
        assert_eq!(item.instance_name, "tapeflow");
        assert_eq!(item.scheduler_backend_name, "ceph-a");
        assert!(item.sleeping_for_space);
        assert_eq!(item.sleep_start_time, 1234);
        assert_eq!(item.disk_system_slept_for, "eos_default");
        assert_eq!(item.priority, 7);
    }
}
