//! End-to-end tests: request -> registry -> stream -> transport adapter.

use std::sync::{Arc, Mutex};

use tapeflow_catalogue::{
    CatalogueState, DriveConfigEntry, JobQueueType, MemoryBackend, QueuedJob, RepackInfo, Tape,
    TapeDrive,
};
use tapeflow_frontend::transport::FrameWriter;
use tapeflow_frontend::{
    CommandRegistry, FrontendContext, FrontendError, ManualClock, PullAdapter, PushAdapter,
    PushOutcome, PushStep, ResponseStream, TransportError,
};
use tapeflow_protocol::defaults::SCHEDULER_BACKEND_CONFIG_KEY;
use tapeflow_protocol::records::VersionItem;
use tapeflow_protocol::{
    AdminRequest, BoolOpt, Command, DriveStatus, EntryLog, Frame, FrameKind, Record, RecordKind,
    RequestType, StrOpt, SubCommand,
};

// ============================================================================
// Helpers
// ============================================================================

const T0: i64 = 1_700_000_000;

fn context(state: CatalogueState) -> (Arc<MemoryBackend>, FrontendContext) {
    let backend = Arc::new(MemoryBackend::new(state));
    let ctx = FrontendContext::from_backend(backend.clone());
    (backend, ctx)
}

fn open(ctx: &FrontendContext, request: &AdminRequest) -> Result<ResponseStream, FrontendError> {
    CommandRegistry::standard().open(ctx, request)
}

/// Drain a stream, header included.
fn drain(mut stream: ResponseStream) -> Vec<Record> {
    let mut records = Vec::new();
    while !stream.is_done() {
        records.push(stream.next().expect("stream record"));
    }
    records
}

fn data(records: &[Record]) -> &[Record] {
    assert!(records[0].is_header(), "first record must be the header");
    &records[1..]
}

fn drive(name: &str, status: DriveStatus) -> TapeDrive {
    TapeDrive {
        drive_name: name.to_string(),
        logical_library: "lib1".to_string(),
        drive_status: status,
        down_or_up_start_time: Some(T0),
        ..Default::default()
    }
}

fn backend_entry(drive: &str, backend: &str) -> DriveConfigEntry {
    DriveConfigEntry {
        drive_name: drive.to_string(),
        category: "taped".to_string(),
        key_name: SCHEDULER_BACKEND_CONFIG_KEY.to_string(),
        value: backend.to_string(),
        source: "/etc/tapeflow/taped.conf".to_string(),
    }
}

fn drive_names(records: &[Record]) -> Vec<String> {
    data(records)
        .iter()
        .map(|r| match r {
            Record::Drive(item) => item.drive_name.clone(),
            other => panic!("expected drive record, got {:?}", other),
        })
        .collect()
}

// ============================================================================
// Stream contract
// ============================================================================

#[test]
fn test_every_command_starts_with_header() {
    let (_, ctx) = context(CatalogueState::default());
    let registry = CommandRegistry::standard();

    for cmd in Command::ALL {
        let subcmd = match cmd {
            Command::ShowQueues | Command::Version => SubCommand::None,
            _ => SubCommand::Ls,
        };
        if !registry.contains(cmd, subcmd) {
            continue;
        }
        let mut request = AdminRequest::new(cmd, subcmd);
        if cmd == Command::Tape {
            request = request.with_flag(BoolOpt::All, true);
        }

        let mut stream = registry.open(&ctx, &request).unwrap();
        assert!(!stream.is_done(), "{} done before its header", cmd);
        match stream.next().unwrap() {
            Record::Header(header) => assert_eq!(header.kind, stream.kind(), "{}", cmd),
            other => panic!("{}: first record was {:?}", cmd, other),
        }
    }
}

#[test]
fn test_is_done_is_monotonic() {
    let (_, ctx) = context(CatalogueState::default());
    let mut stream = open(&ctx, &AdminRequest::new(Command::Version, SubCommand::None)).unwrap();
    let mut seen_done = false;
    for _ in 0..2 {
        if !stream.is_done() {
            stream.next().unwrap();
        }
    }
    for _ in 0..3 {
        seen_done |= stream.is_done();
        assert_eq!(stream.is_done(), seen_done);
    }
    assert!(seen_done);
}

#[test]
#[should_panic(expected = "finished response stream")]
fn test_next_after_done_panics() {
    let (_, ctx) = context(CatalogueState::default());
    let mut stream = open(&ctx, &AdminRequest::new(Command::Admin, SubCommand::Ls)).unwrap();
    stream.next().unwrap();
    assert!(stream.is_done());
    let _ = stream.next();
}

// ============================================================================
// DriveLs
// ============================================================================

fn two_backend_state() -> CatalogueState {
    CatalogueState {
        drives: vec![drive("D2", DriveStatus::Up), drive("D1", DriveStatus::Up)],
        drive_config: vec![backend_entry("D1", "A"), backend_entry("D2", "B")],
        ..Default::default()
    }
}

#[test]
fn test_drive_ls_filters_by_owning_backend() {
    let (_, ctx) = context(two_backend_state());
    let clock = Arc::new(ManualClock::new(T0 + 30));
    let ctx = ctx.with_backend_name("A").with_clock(clock);

    let records = drain(open(&ctx, &AdminRequest::new(Command::Drive, SubCommand::Ls)).unwrap());
    assert_eq!(drive_names(&records), vec!["D1"]);
    match &records[1] {
        Record::Drive(item) => {
            assert_eq!(item.drive_status_since, 30);
            assert_eq!(item.scheduler_backend_name, "A");
            assert_eq!(item.drive_config.len(), 1);
        }
        other => panic!("unexpected {:?}", other),
    }

    let all = AdminRequest::new(Command::Drive, SubCommand::Ls).with_flag(BoolOpt::All, true);
    let records = drain(open(&ctx, &all).unwrap());
    assert_eq!(drive_names(&records), vec!["D1", "D2"]);
}

#[test]
fn test_drive_ls_foreign_backend_only_is_empty_success() {
    let (_, ctx) = context(two_backend_state());
    let ctx = ctx.with_backend_name("C");
    let records = drain(open(&ctx, &AdminRequest::new(Command::Drive, SubCommand::Ls)).unwrap());
    assert!(data(&records).is_empty());
}

#[test]
fn test_drive_ls_missing_backend_config_reports_unknown() {
    let state = CatalogueState {
        drives: vec![drive("D9", DriveStatus::Down)],
        ..Default::default()
    };
    let (_, ctx) = context(state);
    let all = AdminRequest::new(Command::Drive, SubCommand::Ls).with_flag(BoolOpt::All, true);
    let records = drain(open(&ctx, &all).unwrap());
    match &records[1] {
        Record::Drive(item) => assert_eq!(item.scheduler_backend_name, "unknown"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_drive_regex_without_match_is_not_found() {
    let state = CatalogueState {
        drives: vec![drive("tape02", DriveStatus::Up), drive("tape03", DriveStatus::Up)],
        ..Default::default()
    };
    let request = AdminRequest::new(Command::Drive, SubCommand::Ls).with_str(StrOpt::Drive, "tape01");

    let (_, ctx) = context(state);
    assert!(matches!(open(&ctx, &request), Err(FrontendError::NotFound(_))));

    let (_, empty) = context(CatalogueState::default());
    assert!(matches!(open(&empty, &request), Err(FrontendError::NotFound(_))));
}

#[test]
fn test_drive_invalid_regex_is_validation_error() {
    let (_, ctx) = context(CatalogueState::default());
    let request = AdminRequest::new(Command::Drive, SubCommand::Ls).with_str(StrOpt::Drive, "tape(");
    assert!(matches!(open(&ctx, &request), Err(FrontendError::Validation(_))));
}

// ============================================================================
// RepackLs
// ============================================================================

fn repack_state() -> CatalogueState {
    CatalogueState {
        tapes: vec![
            Tape {
                vid: "V00001".to_string(),
                tape_pool_name: "pool_a".to_string(),
                ..Default::default()
            },
            Tape {
                vid: "V00002".to_string(),
                tape_pool_name: "pool_b".to_string(),
                ..Default::default()
            },
        ],
        repacks: vec![
            RepackInfo {
                vid: "V00002".to_string(),
                creation_log: EntryLog {
                    time: T0 + 10,
                    ..Default::default()
                },
                ..Default::default()
            },
            RepackInfo {
                vid: "V00001".to_string(),
                total_files_to_archive: 100,
                archived_files: 40,
                last_expanded_fseq: 5,
                repack_finished_time: Some(0),
                creation_log: EntryLog {
                    time: T0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

fn repack_items(ctx: &FrontendContext, request: &AdminRequest) -> Vec<tapeflow_protocol::records::RepackLsItem> {
    data(&drain(open(ctx, request).unwrap()))
        .iter()
        .map(|r| match r {
            Record::Repack(item) => item.clone(),
            other => panic!("expected repack record, got {:?}", other),
        })
        .collect()
}

#[test]
fn test_repack_ls_progress_and_order() {
    let (_, ctx) = context(repack_state());
    let clock = Arc::new(ManualClock::new(T0 + 100));
    let ctx = ctx.with_clock(clock.clone());
    let request = AdminRequest::new(Command::Repack, SubCommand::Ls);

    let items = repack_items(&ctx, &request);
    let vids: Vec<&str> = items.iter().map(|i| i.vid.as_str()).collect();
    assert_eq!(vids, vec!["V00001", "V00002"]);

    let first = &items[0];
    assert_eq!(first.files_left_to_archive, 60);
    assert_eq!(first.last_expanded_fseq, 4);
    assert_eq!(first.tapepool, "pool_a");
    assert_eq!(items[1].last_expanded_fseq, 0);
    assert_eq!(items[1].tapepool, "pool_b");

    let earlier = first.repack_time;
    clock.advance(60);
    let later = repack_items(&ctx, &request)[0].repack_time;
    assert!(later > earlier);
}

#[test]
fn test_repack_ls_single_vid() {
    let (_, ctx) = context(repack_state());
    let request = AdminRequest::new(Command::Repack, SubCommand::Ls).with_str(StrOpt::Vid, "V00002");
    let items = repack_items(&ctx, &request);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].vid, "V00002");

    let missing = AdminRequest::new(Command::Repack, SubCommand::Ls).with_str(StrOpt::Vid, "V99999");
    assert!(matches!(open(&ctx, &missing), Err(FrontendError::NotFound(_))));
}

#[test]
fn test_repack_without_tape_is_inconsistent() {
    let mut state = repack_state();
    state.tapes.clear();
    let (_, ctx) = context(state);
    let request = AdminRequest::new(Command::Repack, SubCommand::Ls);
    assert!(matches!(open(&ctx, &request), Err(FrontendError::Inconsistent(_))));
}

// ============================================================================
// FailedRequestLs
// ============================================================================

fn failed_job(id: &str, pool: &str, vid: &str, size: u64) -> QueuedJob {
    QueuedJob {
        object_id: id.to_string(),
        queue_type: JobQueueType::FailedJobs,
        tape_pool: pool.to_string(),
        vid: vid.to_string(),
        file_size: size,
        failure_logs: vec![format!("{} failed", id)],
        ..Default::default()
    }
}

fn failed_state() -> CatalogueState {
    CatalogueState {
        archive_jobs: vec![
            failed_job("a1", "pool_a", "", 300),
            failed_job("a2", "pool_a", "", 300),
            failed_job("a3", "pool_b", "", 300),
            QueuedJob {
                queue_type: JobQueueType::JobsToTransfer,
                file_size: 5000,
                ..failed_job("a4", "pool_a", "", 0)
            },
        ],
        retrieve_jobs: vec![failed_job("r1", "", "V00001", 50)],
        ..Default::default()
    }
}

fn failed_ls() -> AdminRequest {
    AdminRequest::new(Command::FailedRequest, SubCommand::Ls)
}

#[test]
fn test_failed_request_conflicts_fail_before_queues_open() {
    let (backend, ctx) = context(failed_state());
    let request = failed_ls()
        .with_flag(BoolOpt::Summary, true)
        .with_flag(BoolOpt::JustArchive, true)
        .with_flag(BoolOpt::JustRetrieve, true);
    assert!(matches!(open(&ctx, &request), Err(FrontendError::Validation(_))));
    assert_eq!(backend.cursors_opened(), 0);
}

#[test]
fn test_failed_request_archive_only_summary() {
    let (backend, ctx) = context(failed_state());
    let request = failed_ls()
        .with_flag(BoolOpt::Summary, true)
        .with_flag(BoolOpt::JustArchive, true);
    let records = drain(open(&ctx, &request).unwrap());

    assert_eq!(backend.cursors_opened(), 1);
    match data(&records) {
        [Record::FailedRequestSummary(summary)] => {
            assert_eq!(summary.request_type, RequestType::Archive);
            assert_eq!(summary.total_files, 3);
            assert_eq!(summary.total_size, 900);
        }
        other => panic!("expected one archive summary, got {:?}", other),
    }
}

#[test]
fn test_failed_request_same_side_scope_flags_combine() {
    let (backend, ctx) = context(failed_state());
    let request = failed_ls()
        .with_flag(BoolOpt::JustArchive, true)
        .with_str(StrOpt::TapePool, "pool_a")
        .with_flag(BoolOpt::Summary, true);
    let records = drain(open(&ctx, &request).unwrap());
    assert_eq!(backend.cursors_opened(), 1);
    match data(&records) {
        [Record::FailedRequestSummary(summary)] => {
            assert_eq!(summary.request_type, RequestType::Archive);
            assert_eq!(summary.total_files, 2);
            assert_eq!(summary.total_size, 600);
        }
        other => panic!("expected one archive summary, got {:?}", other),
    }

    let request = failed_ls()
        .with_flag(BoolOpt::JustRetrieve, true)
        .with_str(StrOpt::Vid, "V00001");
    let records = drain(open(&ctx, &request).unwrap());
    match data(&records) {
        [Record::FailedRequest(item)] => {
            assert_eq!(item.request_type, RequestType::Retrieve);
            assert_eq!(item.vid, "V00001");
        }
        other => panic!("expected one retrieve job, got {:?}", other),
    }
}

#[test]
fn test_failed_request_tapepool_and_vid_conflict() {
    let (backend, ctx) = context(failed_state());
    let request = failed_ls()
        .with_str(StrOpt::TapePool, "pool_a")
        .with_str(StrOpt::Vid, "V00001");
    assert!(matches!(open(&ctx, &request), Err(FrontendError::Validation(_))));
    assert_eq!(backend.cursors_opened(), 0);
}

#[test]
fn test_failed_request_summary_total_when_both_open() {
    let (_, ctx) = context(failed_state());
    let records = drain(open(&ctx, &failed_ls().with_flag(BoolOpt::Summary, true)).unwrap());
    let types: Vec<RequestType> = data(&records)
        .iter()
        .map(|r| match r {
            Record::FailedRequestSummary(s) => s.request_type,
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(
        types,
        vec![RequestType::Archive, RequestType::Retrieve, RequestType::Total]
    );
    match data(&records).last() {
        Some(Record::FailedRequestSummary(total)) => {
            assert_eq!(total.total_files, 4);
            assert_eq!(total.total_size, 950);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_failed_request_listing_archive_before_retrieve() {
    let (_, ctx) = context(failed_state());
    let records = drain(open(&ctx, &failed_ls()).unwrap());
    let rows: Vec<(RequestType, String, bool)> = data(&records)
        .iter()
        .map(|r| match r {
            Record::FailedRequest(item) => (
                item.request_type,
                item.object_id.clone(),
                item.failure_logs.is_empty(),
            ),
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            (RequestType::Archive, "a1".to_string(), true),
            (RequestType::Archive, "a2".to_string(), true),
            (RequestType::Archive, "a3".to_string(), true),
            (RequestType::Retrieve, "r1".to_string(), true),
        ]
    );

    let request = failed_ls()
        .with_str(StrOpt::Vid, "V00001")
        .with_flag(BoolOpt::ShowLogEntries, true);
    let with_logs = drain(open(&ctx, &request).unwrap());
    match data(&with_logs) {
        [Record::FailedRequest(item)] => {
            assert_eq!(item.vid, "V00001");
            assert_eq!(item.failure_logs, vec!["r1 failed"]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

// ============================================================================
// Transports
// ============================================================================

fn version_record(i: usize) -> Record {
    Record::Version(VersionItem {
        server_version: format!("{:06}", i),
        ..Default::default()
    })
}

fn uniform_stream(n: usize) -> ResponseStream {
    let records = (0..n).map(version_record).collect();
    ResponseStream::new(
        tapeflow_frontend::stream::CollectionSource::new(RecordKind::Version, records).boxed(),
    )
}

#[test]
fn test_pull_buffers_respect_hint_and_cap() {
    let record_size = Frame::record(1, &version_record(0)).unwrap().encoded_len();
    let header_size = Frame::record(1, &Record::header(RecordKind::Version))
        .unwrap()
        .encoded_len();
    let total = 25;

    for hint in [record_size, 3 * record_size + 7, 10 * record_size] {
        let mut pull = PullAdapter::new(uniform_stream(total), 1);
        let mut first = true;
        let mut data_frames = 0;

        loop {
            let chunk = pull.fill(hint).unwrap();
            let frames = Frame::decode_all(&chunk.data).unwrap();
            let counted = if first {
                assert_eq!(frames[0].kind(), FrameKind::Header);
                chunk.data.len() - header_size
            } else {
                chunk.data.len()
            };
            first = false;
            data_frames += frames.iter().filter(|f| f.kind() == FrameKind::Data).count();

            assert!(counted <= 2 * hint, "hint {}: {} bytes", hint, counted);
            if chunk.end_of_stream {
                break;
            }
            assert!(chunk.data.len() >= hint, "hint {}: short buffer mid-stream", hint);
        }
        assert_eq!(data_frames, total);
        assert!(matches!(pull.fill(hint), Err(TransportError::StreamFinished)));
    }
}

/// Labels every action the push adapter performs.
struct RecordingWriter {
    actions: Arc<Mutex<Vec<String>>>,
}

impl FrameWriter for RecordingWriter {
    fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let label = match frame.to_record()? {
            Record::Header(_) => "header".to_string(),
            Record::Version(item) => format!("record {}", item.server_version),
            other => format!("{:?}", other),
        };
        self.actions.lock().unwrap().push(label);
        Ok(())
    }

    fn finish(&mut self, frame: Frame) {
        let label = match frame.kind() {
            FrameKind::Success => "finish",
            _ => "failure",
        };
        self.actions.lock().unwrap().push(label.to_string());
    }
}

fn three_records() -> ResponseStream {
    let records = (1..=3)
        .map(|i| {
            Record::Version(VersionItem {
                server_version: i.to_string(),
                ..Default::default()
            })
        })
        .collect();
    ResponseStream::new(
        tapeflow_frontend::stream::CollectionSource::new(RecordKind::Version, records).boxed(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_adapter_five_actions_across_threads() {
    let actions = Arc::new(Mutex::new(Vec::new()));
    let writer = RecordingWriter {
        actions: actions.clone(),
    };

    let mut step = PushAdapter::start(three_records(), Box::new(writer), 1);
    let outcome = loop {
        match step {
            PushStep::Pending(adapter) => {
                // Each completion is delivered from whichever worker runs the task
                step = tokio::spawn(async move { adapter.on_write_done(Ok(())) })
                    .await
                    .unwrap();
            }
            PushStep::Finished(outcome) => break outcome,
        }
    };

    assert_eq!(outcome, PushOutcome::Success { records: 3 });
    assert_eq!(
        *actions.lock().unwrap(),
        vec!["header", "record 1", "record 2", "record 3", "finish"]
    );
}

#[test]
fn test_push_write_failure_stops_pulling() {
    let actions = Arc::new(Mutex::new(Vec::new()));
    let writer = RecordingWriter {
        actions: actions.clone(),
    };

    let step = PushAdapter::start(three_records(), Box::new(writer), 1);
    let step = match step {
        PushStep::Pending(adapter) => adapter.on_write_done(Ok(())),
        other => panic!("unexpected {:?}", other),
    };
    let outcome = match step {
        PushStep::Pending(adapter) => {
            adapter.on_write_done(Err(TransportError::write_failed("connection reset")))
        }
        other => panic!("unexpected {:?}", other),
    };

    assert!(matches!(outcome, PushStep::Finished(PushOutcome::Failed { records: 1, .. })));
    assert_eq!(*actions.lock().unwrap(), vec!["header", "record 1", "failure"]);
}

#[test]
fn test_drive_ls_from_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, serde_json::to_string(&two_backend_state()).unwrap()).unwrap();

    let backend = MemoryBackend::load(&path).unwrap();
    let ctx = FrontendContext::from_backend(Arc::new(backend)).with_backend_name("B");

    let records = drain(open(&ctx, &AdminRequest::new(Command::Drive, SubCommand::Ls)).unwrap());
    assert_eq!(drive_names(&records), vec!["D2"]);
}
