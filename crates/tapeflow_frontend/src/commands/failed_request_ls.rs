//! `failedrequest ls`: jobs in the failed archive and retrieve queues.
//!
//! Scope flags decide which queues are opened:
//!
//! - archive queue: unless `--justretrieve` or `--vid`; scoped to `--tapepool`
//! - retrieve queue: unless `--justarchive` or `--tapepool`; scoped to `--vid`
//!
//! With `--summary` both opened queues are counted at init and one record per
//! queue (plus a TOTAL when both are open) is streamed. Otherwise the archive
//! queue is streamed to the end before the retrieve queue.

use tapeflow_catalogue::{BoxCursor, JobQueueType, QueuedJob};
use tapeflow_protocol::records::{FailedRequestLsItem, FailedRequestSummaryItem, RequesterItem};
use tapeflow_protocol::{BoolOpt, Record, RecordKind, RequestType, StrOpt};
use tracing::debug;

use crate::context::FrontendContext;
use crate::error::{FrontendError, Result};
use crate::query::Query;
use crate::stream::{CollectionSource, RecordSource};

/// Which failed queues a query reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueScope {
    /// Tape pool to scope the archive queue to ("" = all), or `None` to skip it.
    pub archive: Option<String>,
    /// VID to scope the retrieve queue to ("" = all), or `None` to skip it.
    pub retrieve: Option<String>,
}

/// Check flag combinations. Runs before any queue is opened.
pub fn validate(query: &Query) -> Result<()> {
    if query.has_flag(BoolOpt::Summary) && query.has_flag(BoolOpt::ShowLogEntries) {
        return Err(FrontendError::validation(
            "--log and --summary are mutually exclusive",
        ));
    }

    if archive_only(query) && retrieve_only(query) {
        return Err(FrontendError::validation(
            "--justarchive/--tapepool and --justretrieve/--vid are mutually exclusive",
        ));
    }
    Ok(())
}

fn archive_only(query: &Query) -> bool {
    query.has_flag(BoolOpt::JustArchive) || query.get_str(StrOpt::TapePool).is_some()
}

fn retrieve_only(query: &Query) -> bool {
    query.has_flag(BoolOpt::JustRetrieve) || query.get_str(StrOpt::Vid).is_some()
}

pub fn scope(query: &Query) -> QueueScope {
    let tape_pool = query.get_str(StrOpt::TapePool);
    let vid = query.get_str(StrOpt::Vid);

    QueueScope {
        archive: (!retrieve_only(query)).then(|| tape_pool.unwrap_or_default().to_string()),
        retrieve: (!archive_only(query)).then(|| vid.unwrap_or_default().to_string()),
    }
}

pub fn open(ctx: &FrontendContext, query: &Query) -> Result<Box<dyn RecordSource>> {
    validate(query)?;
    let scope = scope(query);
    debug!(?scope, "Opening failed job queues");

    let archive = scope
        .archive
        .as_deref()
        .map(|pool| {
            ctx.scheduler_db
                .get_archive_job_queue_cursor(pool, JobQueueType::FailedJobs)
        })
        .transpose()?;
    let retrieve = scope
        .retrieve
        .as_deref()
        .map(|vid| {
            ctx.scheduler_db
                .get_retrieve_job_queue_cursor(vid, JobQueueType::FailedJobs)
        })
        .transpose()?;

    if query.has_flag(BoolOpt::Summary) {
        let records = summarize(archive, retrieve)?;
        return Ok(CollectionSource::new(RecordKind::FailedRequestSummary, records).boxed());
    }

    Ok(Box::new(FailedJobSource {
        archive,
        retrieve,
        show_logs: query.has_flag(BoolOpt::ShowLogEntries),
    }))
}

fn count(mut cursor: BoxCursor<QueuedJob>, request_type: RequestType) -> Result<FailedRequestSummaryItem> {
    let mut summary = FailedRequestSummaryItem {
        request_type,
        total_files: 0,
        total_size: 0,
    };
    while cursor.has_more() {
        let job = cursor.next_item()?;
        summary.total_files = summary.total_files.saturating_add(1);
        summary.total_size = summary.total_size.saturating_add(job.file_size);
    }
    Ok(summary)
}

fn summarize(
    archive: Option<BoxCursor<QueuedJob>>,
    retrieve: Option<BoxCursor<QueuedJob>>,
) -> Result<Vec<Record>> {
    let archive = archive
        .map(|cursor| count(cursor, RequestType::Archive))
        .transpose()?;
    let retrieve = retrieve
        .map(|cursor| count(cursor, RequestType::Retrieve))
        .transpose()?;

    let total = match (&archive, &retrieve) {
        (Some(a), Some(r)) => Some(FailedRequestSummaryItem {
            request_type: RequestType::Total,
            total_files: a.total_files.saturating_add(r.total_files),
            total_size: a.total_size.saturating_add(r.total_size),
        }),
        _ => None,
    };

    Ok([archive, retrieve, total]
        .into_iter()
        .flatten()
        .map(Record::FailedRequestSummary)
        .collect())
}

/// Archive queue first, then retrieve queue, one job per record.
struct FailedJobSource {
    archive: Option<BoxCursor<QueuedJob>>,
    retrieve: Option<BoxCursor<QueuedJob>>,
    show_logs: bool,
}

fn has_more(cursor: &Option<BoxCursor<QueuedJob>>) -> bool {
    cursor.as_ref().map_or(false, |c| c.has_more())
}

impl RecordSource for FailedJobSource {
    fn kind(&self) -> RecordKind {
        RecordKind::FailedRequest
    }

    fn is_exhausted(&self) -> bool {
        !has_more(&self.archive) && !has_more(&self.retrieve)
    }

    fn next_record(&mut self) -> Result<Record> {
        let (cursor, request_type) = if has_more(&self.archive) {
            (self.archive.as_mut(), RequestType::Archive)
        } else {
            (self.retrieve.as_mut(), RequestType::Retrieve)
        };
        let cursor = cursor
            .ok_or_else(|| FrontendError::inconsistent("failed job source advanced past its end"))?;
        let job = cursor.next_item()?;
        Ok(Record::FailedRequest(to_item(job, request_type, self.show_logs)))
    }
}

fn to_item(job: QueuedJob, request_type: RequestType, show_logs: bool) -> FailedRequestLsItem {
    let (tapepool, vid) = match request_type {
        RequestType::Archive => (job.tape_pool, String::new()),
        _ => (String::new(), job.vid),
    };
    let (failure_logs, report_failure_logs) = if show_logs {
        (job.failure_logs, job.report_failure_logs)
    } else {
        (Vec::new(), Vec::new())
    };

    FailedRequestLsItem {
        object_id: job.object_id,
        request_type,
        copy_nb: job.copy_nb,
        tapepool,
        vid,
        requester: RequesterItem {
            username: job.requester.name,
            groupname: job.requester.group,
        },
        archive_file_id: job.archive_file_id,
        disk_instance: job.disk_instance,
        disk_file_id: job.disk_file_id,
        disk_file_path: job.disk_file_path,
        size: job.file_size,
        total_retries: job.total_retries,
        total_report_retries: job.total_report_retries,
        failure_logs,
        report_failure_logs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapeflow_catalogue::VecCursor;
    use tapeflow_protocol::{AdminRequest, Command, SubCommand};

    fn query(req: AdminRequest) -> Query {
        Query::from_request(&req).unwrap()
    }

    fn fr() -> AdminRequest {
        AdminRequest::new(Command::FailedRequest, SubCommand::Ls)
    }

    #[test]
    fn test_summary_and_log_exclusive() {
        let q = query(
            fr().with_flag(BoolOpt::Summary, true)
                .with_flag(BoolOpt::ShowLogEntries, true),
        );
        assert!(matches!(validate(&q), Err(FrontendError::Validation(_))));
    }

    #[test]
    fn test_scope_flags_exclusive() {
        let q = query(
            fr().with_flag(BoolOpt::JustArchive, true)
                .with_str(StrOpt::Vid, "V1"),
        );
        assert!(validate(&q).is_err());

        let q = query(
            fr().with_str(StrOpt::TapePool, "pool_a")
                .with_str(StrOpt::Vid, "V1"),
        );
        assert!(matches!(validate(&q), Err(FrontendError::Validation(_))));

        let q = query(fr().with_flag(BoolOpt::JustArchive, false).with_str(StrOpt::Vid, "V1"));
        assert!(validate(&q).is_ok());
    }

    #[test]
    fn test_same_side_scope_flags_combine() {
        let q = query(
            fr().with_flag(BoolOpt::JustArchive, true)
                .with_str(StrOpt::TapePool, "pool_a")
                .with_flag(BoolOpt::Summary, true),
        );
        assert!(validate(&q).is_ok());
        assert_eq!(
            scope(&q),
            QueueScope {
                archive: Some("pool_a".to_string()),
                retrieve: None,
            }
        );

        let q = query(
            fr().with_flag(BoolOpt::JustRetrieve, true)
                .with_str(StrOpt::Vid, "V1"),
        );
        assert!(validate(&q).is_ok());
        assert_eq!(
            scope(&q),
            QueueScope {
                archive: None,
                retrieve: Some("V1".to_string()),
            }
        );
    }

    #[test]
    fn test_summary_counts_saturate() {
        let jobs = vec![
            QueuedJob {
                file_size: u64::MAX,
                ..Default::default()
            },
            QueuedJob {
                file_size: 10,
                ..Default::default()
            },
        ];
        let archive: BoxCursor<QueuedJob> = Box::new(VecCursor::new(jobs));
        let retrieve: BoxCursor<QueuedJob> = Box::new(VecCursor::new(vec![QueuedJob {
            file_size: 1,
            ..Default::default()
        }]));

        let records = summarize(Some(archive), Some(retrieve)).unwrap();
        match &records[2] {
            Record::FailedRequestSummary(total) => {
                assert_eq!(total.request_type, RequestType::Total);
                assert_eq!(total.total_files, 3);
                assert_eq!(total.total_size, u64::MAX);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_scope_resolution() {
        assert_eq!(
            scope(&query(fr())),
            QueueScope {
                archive: Some(String::new()),
                retrieve: Some(String::new()),
            }
        );
        assert_eq!(
            scope(&query(fr().with_str(StrOpt::TapePool, "pool_a"))),
            QueueScope {
                archive: Some("pool_a".to_string()),
                retrieve: None,
            }
        );
        assert_eq!(
            scope(&query(fr().with_flag(BoolOpt::JustRetrieve, true))),
            QueueScope {
                archive: None,
                retrieve: Some(String::new()),
            }
        );
        assert_eq!(
            scope(&query(fr().with_str(StrOpt::Vid, "V7"))),
            QueueScope {
                archive: None,
                retrieve: Some("V7".to_string()),
            }
        );
    }

    #[test]
    fn test_logs_only_with_flag() {
        let job = QueuedJob {
            vid: "V1".to_string(),
            tape_pool: "ignored".to_string(),
            failure_logs: vec!["read error".to_string()],
            ..Default::default()
        };
        let quiet = to_item(job.clone(), RequestType::Retrieve, false);
        assert!(quiet.failure_logs.is_empty());
        assert_eq!(quiet.vid, "V1");
        assert!(quiet.tapepool.is_empty());

        let loud = to_item(job, RequestType::Retrieve, true);
        assert_eq!(loud.failure_logs, vec!["read error"]);
    }
}
