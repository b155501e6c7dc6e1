//! `repack ls`: repack progress joined with the tape pool of each VID.

use std::collections::BTreeSet;

use tapeflow_catalogue::RepackInfo;
use tapeflow_protocol::records::{RepackDestinationItem, RepackLsItem};
use tapeflow_protocol::{Record, RecordKind, StrOpt};

use crate::context::FrontendContext;
use crate::error::{FrontendError, Result};
use crate::query::Query;
use crate::stream::{CollectionSource, RecordSource};

pub fn open(ctx: &FrontendContext, query: &Query) -> Result<Box<dyn RecordSource>> {
    let repacks = match query.get_str(StrOpt::Vid) {
        Some(vid) => {
            let repack = ctx
                .scheduler
                .get_repack(vid)?
                .ok_or_else(|| FrontendError::not_found(format!("No repack request for VID {}", vid)))?;
            vec![repack]
        }
        None => {
            let mut repacks = ctx.scheduler.get_repacks()?;
            repacks.sort_by_key(|r| r.creation_log.time);
            repacks
        }
    };

    let vids: BTreeSet<String> = repacks.iter().map(|r| r.vid.clone()).collect();
    let tapes = if vids.is_empty() {
        Default::default()
    } else {
        ctx.catalogue.get_tapes_by_vids(&vids)?
    };

    let now = ctx.now();
    let mut records = Vec::with_capacity(repacks.len());
    for repack in repacks {
        let tape = tapes.get(&repack.vid).ok_or_else(|| {
            FrontendError::inconsistent(format!("Repack VID {} has no tape in the catalogue", repack.vid))
        })?;
        let item = to_item(&ctx.instance_name, &repack, &tape.tape_pool_name, now);
        records.push(Record::Repack(item));
    }

    Ok(CollectionSource::new(RecordKind::Repack, records).boxed())
}

/// Seconds since creation, or the total duration once finished.
pub fn repack_time(repack: &RepackInfo, now: i64) -> u64 {
    let end = match repack.repack_finished_time {
        Some(finished) if finished != 0 => finished,
        _ => now,
    };
    end.saturating_sub(repack.creation_log.time).max(0) as u64
}

/// The stored value is the next fSeq to expand; show the last one expanded.
pub fn displayed_last_expanded_fseq(stored: u64) -> u64 {
    stored.saturating_sub(1)
}

pub fn to_item(instance_name: &str, repack: &RepackInfo, tape_pool: &str, now: i64) -> RepackLsItem {
    RepackLsItem {
        instance_name: instance_name.to_string(),
        vid: repack.vid.clone(),
        tapepool: tape_pool.to_string(),
        repack_buffer_url: repack.repack_buffer_base_url.clone(),
        user_provided_files: repack.user_provided_files,
        total_files_on_tape_at_start: repack.total_files_on_tape_at_start,
        total_bytes_on_tape_at_start: repack.total_bytes_on_tape_at_start,
        all_files_selected_at_start: repack.all_files_selected_at_start,
        total_files_to_retrieve: repack.total_files_to_retrieve,
        total_bytes_to_retrieve: repack.total_bytes_to_retrieve,
        total_files_to_archive: repack.total_files_to_archive,
        total_bytes_to_archive: repack.total_bytes_to_archive,
        retrieved_files: repack.retrieved_files,
        retrieved_bytes: repack.retrieved_bytes,
        archived_files: repack.archived_files,
        archived_bytes: repack.archived_bytes,
        files_left_to_retrieve: repack
            .total_files_to_retrieve
            .saturating_sub(repack.retrieved_files),
        files_left_to_archive: repack
            .total_files_to_archive
            .saturating_sub(repack.archived_files),
        failed_to_retrieve_files: repack.failed_files_to_retrieve,
        failed_to_retrieve_bytes: repack.failed_bytes_to_retrieve,
        failed_to_archive_files: repack.failed_files_to_archive,
        failed_to_archive_bytes: repack.failed_bytes_to_archive,
        total_failed_files: repack.failed_files_to_retrieve + repack.failed_files_to_archive,
        status: repack.status.to_string(),
        repack_finished_time: repack.repack_finished_time.unwrap_or(0),
        repack_time: repack_time(repack, now),
        creation_log: repack.creation_log.clone(),
        last_expanded_fseq: displayed_last_expanded_fseq(repack.last_expanded_fseq),
        destination_infos: repack
            .destination_infos
            .iter()
            .map(|dest| RepackDestinationItem {
                vid: dest.vid.clone(),
                files: dest.files,
                bytes: dest.bytes,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapeflow_protocol::EntryLog;

    fn repack_created_at(time: i64) -> RepackInfo {
        RepackInfo {
            vid: "V00001".to_string(),
            creation_log: EntryLog {
                time,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_files_left() {
        let repack = RepackInfo {
            total_files_to_archive: 100,
            archived_files: 40,
            total_files_to_retrieve: 100,
            retrieved_files: 100,
            ..repack_created_at(0)
        };
        let item = to_item("tapeflow", &repack, "pool_a", 0);
        assert_eq!(item.files_left_to_archive, 60);
        assert_eq!(item.files_left_to_retrieve, 0);
        assert_eq!(item.tapepool, "pool_a");
    }

    #[test]
    fn test_files_left_saturates() {
        let repack = RepackInfo {
            total_files_to_archive: 5,
            archived_files: 7,
            ..repack_created_at(0)
        };
        assert_eq!(to_item("i", &repack, "p", 0).files_left_to_archive, 0);
    }

    #[test]
    fn test_repack_time_running_vs_finished() {
        let running = repack_created_at(1000);
        assert_eq!(repack_time(&running, 1500), 500);
        assert_eq!(repack_time(&running, 1600), 600);

        let finished = RepackInfo {
            repack_finished_time: Some(1200),
            ..repack_created_at(1000)
        };
        assert_eq!(repack_time(&finished, 5000), 200);

        let zero_finish = RepackInfo {
            repack_finished_time: Some(0),
            ..repack_created_at(1000)
        };
        assert_eq!(repack_time(&zero_finish, 1100), 100);
    }

    #[test]
    fn test_last_expanded_fseq() {
        assert_eq!(displayed_last_expanded_fseq(5), 4);
        assert_eq!(displayed_last_expanded_fseq(1), 0);
        assert_eq!(displayed_last_expanded_fseq(0), 0);
    }

    #[test]
    fn test_total_failed_files() {
        let repack = RepackInfo {
            failed_files_to_retrieve: 2,
            failed_files_to_archive: 3,
            ..repack_created_at(0)
        };
        assert_eq!(to_item("i", &repack, "p", 0).total_failed_files, 5);
    }
}
