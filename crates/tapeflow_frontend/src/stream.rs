//! Response streams.
//!
//! A [`ResponseStream`] wraps one command's [`RecordSource`] and enforces the
//! framing contract: the header comes first and exactly once, `is_done()` never
//! flips back, and `next()` past the end is a programming error.

use std::collections::VecDeque;

use tapeflow_catalogue::BoxCursor;
use tapeflow_protocol::{Record, RecordKind};

use crate::error::Result;

/// Domain data behind a stream, header excluded.
pub trait RecordSource: Send {
    fn kind(&self) -> RecordKind;

    fn is_exhausted(&self) -> bool;

    /// Produce the next data record. Only called while `!is_exhausted()`.
    fn next_record(&mut self) -> Result<Record>;
}

pub struct ResponseStream {
    source: Box<dyn RecordSource>,
    header_sent: bool,
    failed: bool,
    records_sent: u64,
}

impl ResponseStream {
    pub fn new(source: Box<dyn RecordSource>) -> Self {
        Self {
            source,
            header_sent: false,
            failed: false,
            records_sent: 0,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.source.kind()
    }

    /// Once true, stays true. A source failure also ends the stream.
    pub fn is_done(&self) -> bool {
        self.failed || (self.header_sent && self.source.is_exhausted())
    }

    /// Next record, header first.
    ///
    /// # Panics
    ///
    /// If called when [`is_done`](Self::is_done) is true.
    pub fn next(&mut self) -> Result<Record> {
        assert!(!self.is_done(), "next() called on a finished response stream");

        if !self.header_sent {
            self.header_sent = true;
            return Ok(Record::header(self.source.kind()));
        }

        match self.source.next_record() {
            Ok(record) => {
                self.records_sent += 1;
                Ok(record)
            }
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }

    /// Data records produced so far.
    pub fn records_sent(&self) -> u64 {
        self.records_sent
    }
}

impl std::fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("kind", &self.source.kind())
            .field("header_sent", &self.header_sent)
            .field("failed", &self.failed)
            .field("records_sent", &self.records_sent)
            .finish()
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Fully materialized records, computed at init.
pub struct CollectionSource {
    kind: RecordKind,
    records: VecDeque<Record>,
}

impl CollectionSource {
    pub fn new(kind: RecordKind, records: Vec<Record>) -> Self {
        Self {
            kind,
            records: records.into(),
        }
    }

    /// Fetch-all-and-map: apply a total `entity -> record` mapping.
    pub fn mapped<T, F>(kind: RecordKind, items: Vec<T>, map: F) -> Self
    where
        F: FnMut(T) -> Record,
    {
        Self::new(kind, items.into_iter().map(map).collect())
    }

    pub fn boxed(self) -> Box<dyn RecordSource> {
        Box::new(self)
    }
}

impl RecordSource for CollectionSource {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn is_exhausted(&self) -> bool {
        self.records.is_empty()
    }

    fn next_record(&mut self) -> Result<Record> {
        // Guarded by ResponseStream::next
        self.records.pop_front().ok_or_else(|| {
            crate::error::FrontendError::inconsistent("collection source advanced past its end")
        })
    }
}

/// Records produced lazily as a catalogue cursor advances.
pub struct CursorSource<T> {
    kind: RecordKind,
    cursor: BoxCursor<T>,
    map: Box<dyn FnMut(T) -> Record + Send>,
}

impl<T: 'static> CursorSource<T> {
    pub fn new<F>(kind: RecordKind, cursor: BoxCursor<T>, map: F) -> Self
    where
        F: FnMut(T) -> Record + Send + 'static,
    {
        Self {
            kind,
            cursor,
            map: Box::new(map),
        }
    }
}

impl<T: 'static> RecordSource for CursorSource<T> {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn is_exhausted(&self) -> bool {
        !self.cursor.has_more()
    }

    fn next_record(&mut self) -> Result<Record> {
        let item = self.cursor.next_item()?;
        Ok((self.map)(item))
    }
}
