//! Push adapter: the adapter writes, the host reports completion.
//!
//! [`PushAdapter::start`] writes the header frame and hands the adapter back
//! to the host. Every completed write is reported through
//! [`PushAdapter::on_write_done`], which consumes the adapter and performs
//! exactly one action: write the next record, or finish the stream. A
//! finished adapter no longer exists, so nothing can follow the status frame.

use std::sync::mpsc;

use tapeflow_protocol::Frame;
use tracing::{debug, error};

use crate::error::TransportError;
use crate::metrics::METRICS;
use crate::stream::ResponseStream;

/// Sink the push adapter writes into.
pub trait FrameWriter: Send {
    /// Start writing one frame. Completion is reported back through
    /// [`PushAdapter::on_write_done`]; an `Err` here means the write never
    /// started.
    fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Write the terminal status frame. Nothing is written after it.
    fn finish(&mut self, frame: Frame);
}

/// How a push stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Success {
        records: u64,
    },
    Failed {
        records: u64,
        code: String,
        message: String,
    },
}

/// Result of one adapter action.
pub enum PushStep {
    /// A write is in flight; report its completion to the adapter.
    Pending(PushAdapter),
    Finished(PushOutcome),
}

impl std::fmt::Debug for PushStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushStep::Pending(adapter) => f
                .debug_tuple("Pending")
                .field(&adapter.records_sent)
                .finish(),
            PushStep::Finished(outcome) => f.debug_tuple("Finished").field(outcome).finish(),
        }
    }
}

pub struct PushAdapter {
    stream: ResponseStream,
    writer: Box<dyn FrameWriter>,
    stream_id: u64,
    header_sent: bool,
    records_sent: u64,
}

impl PushAdapter {
    /// Write the header frame immediately.
    pub fn start(stream: ResponseStream, writer: Box<dyn FrameWriter>, stream_id: u64) -> PushStep {
        let adapter = Self {
            stream,
            writer,
            stream_id,
            header_sent: false,
            records_sent: 0,
        };
        adapter.step()
    }

    pub fn stream_id(&self) -> u64 {
        self.stream_id
    }

    pub fn records_sent(&self) -> u64 {
        self.records_sent
    }

    /// The previous write completed. A failed write is terminal: no retry,
    /// no further records.
    pub fn on_write_done(self, result: Result<(), TransportError>) -> PushStep {
        match result {
            Ok(()) => self.step(),
            Err(err) => self.fail(err),
        }
    }

    fn step(mut self) -> PushStep {
        if self.header_sent && self.stream.is_done() {
            return self.succeed();
        }

        match self.write_next() {
            Ok(()) => PushStep::Pending(self),
            Err(err) => self.fail(err),
        }
    }

    fn write_next(&mut self) -> Result<(), TransportError> {
        let record = self.stream.next()?;
        let frame = Frame::record(self.stream_id, &record)?;
        self.writer.write_frame(frame)?;

        if record.is_header() {
            self.header_sent = true;
        } else {
            self.records_sent += 1;
            METRICS.inc_records_streamed();
        }
        Ok(())
    }

    fn succeed(mut self) -> PushStep {
        match Frame::success(self.stream_id, self.records_sent) {
            Ok(frame) => {
                self.writer.finish(frame);
                METRICS.inc_streams_completed();
                debug!(
                    stream_id = self.stream_id,
                    records = self.records_sent,
                    "Push stream complete"
                );
                PushStep::Finished(PushOutcome::Success {
                    records: self.records_sent,
                })
            }
            Err(err) => self.fail(err.into()),
        }
    }

    fn fail(mut self, err: TransportError) -> PushStep {
        METRICS.inc_streams_failed();
        error!(
            stream_id = self.stream_id,
            records = self.records_sent,
            code = err.code(),
            "Push stream failed: {}",
            err
        );

        let message = err.to_string();
        match Frame::failure(self.stream_id, err.code(), &message) {
            Ok(frame) => self.writer.finish(frame),
            Err(encode_err) => error!(
                stream_id = self.stream_id,
                "Could not encode failure frame: {}",
                encode_err
            ),
        }

        PushStep::Finished(PushOutcome::Failed {
            records: self.records_sent,
            code: err.code().to_string(),
            message,
        })
    }
}

// ============================================================================
// Channel writer
// ============================================================================

/// What a [`ChannelWriter`] hands to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Frame(Frame),
    Finish(Frame),
}

/// Forwards frames to a host thread over a channel.
pub struct ChannelWriter {
    tx: mpsc::Sender<HostEvent>,
}

impl ChannelWriter {
    pub fn new() -> (Self, mpsc::Receiver<HostEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl FrameWriter for ChannelWriter {
    fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.tx
            .send(HostEvent::Frame(frame))
            .map_err(|_| TransportError::write_failed("host channel closed"))
    }

    fn finish(&mut self, frame: Frame) {
        if self.tx.send(HostEvent::Finish(frame)).is_err() {
            debug!("Host channel closed before the status frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::CollectionSource;
    use tapeflow_protocol::records::VersionItem;
    use tapeflow_protocol::{FrameKind, Record, RecordKind};

    fn stream_of(n: usize) -> ResponseStream {
        let records = (0..n)
            .map(|i| {
                Record::Version(VersionItem {
                    server_version: i.to_string(),
                    ..Default::default()
                })
            })
            .collect();
        ResponseStream::new(CollectionSource::new(RecordKind::Version, records).boxed())
    }

    fn drain(rx: &mpsc::Receiver<HostEvent>) -> Vec<HostEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_start_writes_header() {
        let (writer, rx) = ChannelWriter::new();
        let step = PushAdapter::start(stream_of(2), Box::new(writer), 3);
        assert!(matches!(step, PushStep::Pending(_)));

        let events = drain(&rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            HostEvent::Frame(frame) => assert_eq!(frame.kind(), FrameKind::Header),
            other => panic!("expected header frame, got {:?}", other),
        }
    }

    #[test]
    fn test_one_action_per_completion() {
        let (writer, rx) = ChannelWriter::new();
        let mut step = PushAdapter::start(stream_of(2), Box::new(writer), 1);
        let mut per_completion = vec![drain(&rx).len()];

        let outcome = loop {
            match step {
                PushStep::Pending(adapter) => {
                    step = adapter.on_write_done(Ok(()));
                    per_completion.push(drain(&rx).len());
                }
                PushStep::Finished(outcome) => break outcome,
            }
        };

        assert_eq!(per_completion, vec![1, 1, 1, 1]);
        assert_eq!(outcome, PushOutcome::Success { records: 2 });
    }

    #[test]
    fn test_write_failure_is_terminal() {
        let (writer, rx) = ChannelWriter::new();
        let step = PushAdapter::start(stream_of(5), Box::new(writer), 1);
        let adapter = match step {
            PushStep::Pending(adapter) => adapter,
            other => panic!("expected pending, got {:?}", other),
        };
        drain(&rx);

        let step = adapter.on_write_done(Err(TransportError::write_failed("peer reset")));
        match step {
            PushStep::Finished(PushOutcome::Failed { records, code, .. }) => {
                assert_eq!(records, 0);
                assert_eq!(code, "E_WRITE_FAILED");
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let events = drain(&rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            HostEvent::Finish(frame) => assert_eq!(frame.kind(), FrameKind::Failure),
            other => panic!("expected failure frame, got {:?}", other),
        }
    }

    #[test]
    fn test_closed_host_fails_stream() {
        let (writer, rx) = ChannelWriter::new();
        drop(rx);
        let step = PushAdapter::start(stream_of(1), Box::new(writer), 1);
        assert!(matches!(
            step,
            PushStep::Finished(PushOutcome::Failed { .. })
        ));
    }
}
