//! Pull adapter: the host asks for a buffer, the adapter fills it.
//!
//! `hint` is a soft target. Records are appended until the buffer reaches it,
//! so one record may overshoot. The buffer must never exceed `2 * hint`; the
//! header frame of the first call is exempt from that cap. A zero hint only
//! makes progress on the first call, so later zero hints are rejected.

use tapeflow_protocol::Frame;
use tracing::{debug, error};

use crate::error::TransportError;
use crate::metrics::METRICS;
use crate::stream::ResponseStream;

/// One filled buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullChunk {
    /// Zero or more encoded frames.
    pub data: Vec<u8>,
    /// No data follows. Plays the role of the Success frame.
    pub end_of_stream: bool,
}

pub struct PullAdapter {
    stream: ResponseStream,
    stream_id: u64,
    header_emitted: bool,
    finished: bool,
    records_sent: u64,
}

impl PullAdapter {
    pub fn new(stream: ResponseStream, stream_id: u64) -> Self {
        Self {
            stream,
            stream_id,
            header_emitted: false,
            finished: false,
            records_sent: 0,
        }
    }

    pub fn stream_id(&self) -> u64 {
        self.stream_id
    }

    pub fn records_sent(&self) -> u64 {
        self.records_sent
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fill a buffer of roughly `hint` bytes.
    ///
    /// Any stream error is terminal: later calls report
    /// [`TransportError::StreamFinished`]. A rejected zero hint leaves the
    /// stream untouched.
    pub fn fill(&mut self, hint: usize) -> Result<PullChunk, TransportError> {
        if self.finished {
            return Err(TransportError::StreamFinished);
        }
        if hint == 0 && self.header_emitted {
            return Err(TransportError::ZeroHint);
        }

        match self.fill_inner(hint) {
            Ok(chunk) => {
                METRICS.add_bytes_pulled(chunk.data.len());
                if chunk.end_of_stream {
                    self.finished = true;
                    METRICS.inc_streams_completed();
                    debug!(
                        stream_id = self.stream_id,
                        records = self.records_sent,
                        "Pull stream complete"
                    );
                }
                Ok(chunk)
            }
            Err(err) => {
                self.finished = true;
                METRICS.inc_streams_failed();
                error!(
                    stream_id = self.stream_id,
                    records = self.records_sent,
                    code = err.code(),
                    "Pull stream failed: {}",
                    err
                );
                Err(err)
            }
        }
    }

    fn fill_inner(&mut self, hint: usize) -> Result<PullChunk, TransportError> {
        let cap = hint.saturating_mul(2);
        let mut data = Vec::with_capacity(hint);
        // Bytes of the header frame, not counted against the cap
        let mut exempt = 0;

        while !self.stream.is_done() && (data.len() < hint || !self.header_emitted) {
            let record = self.stream.next()?;
            let frame = Frame::record(self.stream_id, &record)?;
            frame.encode_into(&mut data)?;

            if record.is_header() {
                self.header_emitted = true;
                exempt = data.len();
            } else {
                self.records_sent += 1;
                METRICS.inc_records_streamed();
            }

            let counted = data.len() - exempt;
            if counted > cap {
                return Err(TransportError::BufferOverflow { size: counted, cap });
            }
        }

        Ok(PullChunk {
            data,
            end_of_stream: self.stream.is_done(),
        })
    }

    /// Status frame a host sends after the end-of-stream chunk.
    pub fn success_frame(&self) -> Result<Frame, TransportError> {
        Ok(Frame::success(self.stream_id, self.records_sent)?)
    }

    /// Status frame a host sends after `fill` failed.
    pub fn failure_frame(&self, err: &TransportError) -> Result<Frame, TransportError> {
        Ok(Frame::failure(self.stream_id, err.code(), &err.to_string())?)
    }
}
