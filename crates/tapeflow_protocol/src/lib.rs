//! Tapeflow Admin Stream Protocol
//!
//! Wire format for admin listing streams between the frontend and a client.
//! Transport-agnostic: the pull and push adapters both emit these frames.
//!
//! # Frame Format
//!
//! Header Format: !BBHQI (16 bytes, Network Byte Order / Big Endian)
//! ```text
//! [VER:1][KIND:1][RES:2][STREAM_ID:8][LEN:4]
//! ```
//!
//! - VER (u8): Protocol version (0x01)
//! - KIND (u8): Frame kind
//! - RES (u16): Reserved for future use
//! - STREAM_ID (u64): Identifies the request the frame belongs to
//! - LEN (u32): Payload length in bytes
//!
//! The payload is JSON. A stream is one Header frame, zero or more Data
//! frames (one [`Record`] each), then a Success or Failure frame.

pub mod admin;
pub mod defaults;
pub mod error;
pub mod records;
pub mod types;

pub use admin::{AdminRequest, BoolOpt, Command, RequestOptions, StrListOpt, StrOpt, SubCommand, U64Opt};
pub use records::{Record, RecordKind, StreamHeader};
pub use types::{DriveStatus, EntryLog, MountType, RepackStatus, RequestType, TapeLog, TapeState};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Protocol version
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Header size in bytes
pub const HEADER_SIZE: usize = 16;

/// Maximum payload size (4GB - 1, the max value of u32)
pub const MAX_PAYLOAD_SIZE: usize = u32::MAX as usize;

/// Frame kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    /// Stream header: record kind and column set. Always frame 1.
    Header = 1,
    /// One data record.
    Data = 2,
    /// Terminal: stream completed.
    Success = 3,
    /// Terminal: stream aborted.
    Failure = 4,
}

impl FrameKind {
    /// Convert u8 to FrameKind
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(FrameKind::Header),
            2 => Ok(FrameKind::Data),
            3 => Ok(FrameKind::Success),
            4 => Ok(FrameKind::Failure),
            _ => Err(ProtocolError::InvalidFrameKind(value)),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Header => "header",
            FrameKind::Data => "data",
            FrameKind::Success => "success",
            FrameKind::Failure => "failure",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FrameKind::Success | FrameKind::Failure)
    }
}

/// Frame header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub kind: FrameKind,
    pub reserved: u16,
    pub stream_id: u64,
    pub payload_len: u32,
}

impl FrameHeader {
    pub fn new(kind: FrameKind, stream_id: u64, payload_len: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            kind,
            reserved: 0,
            stream_id,
            payload_len,
        }
    }

    /// Pack header into 16-byte buffer
    pub fn pack(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut buf = [0u8; HEADER_SIZE];
        let mut cursor = Cursor::new(&mut buf[..]);

        cursor.write_u8(self.version)?;
        cursor.write_u8(self.kind.as_u8())?;
        cursor.write_u16::<BigEndian>(self.reserved)?;
        cursor.write_u64::<BigEndian>(self.stream_id)?;
        cursor.write_u32::<BigEndian>(self.payload_len)?;

        Ok(buf)
    }

    /// Unpack header from the first 16 bytes of `data`
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ProtocolError::HeaderTooShort {
                expected: HEADER_SIZE,
                got: data.len(),
            });
        }

        let mut cursor = Cursor::new(&data[..HEADER_SIZE]);

        let version = cursor.read_u8()?;
        let kind_raw = cursor.read_u8()?;
        let reserved = cursor.read_u16::<BigEndian>()?;
        let stream_id = cursor.read_u64::<BigEndian>()?;
        let payload_len = cursor.read_u32::<BigEndian>()?;

        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                got: version,
            });
        }

        let kind = FrameKind::from_u8(kind_raw)?;

        Ok(Self {
            version,
            kind,
            reserved,
            stream_id,
            payload_len,
        })
    }
}

/// Payload of a Success frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessPayload {
    /// Data records sent, header excluded.
    pub records: u64,
}

/// Payload of a Failure frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

/// One frame (header + JSON payload)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(kind: FrameKind, stream_id: u64, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let header = FrameHeader::new(kind, stream_id, payload.len() as u32);
        Ok(Self { header, payload })
    }

    /// Frame for a record: Header frame for [`Record::Header`], Data otherwise.
    pub fn record(stream_id: u64, record: &Record) -> Result<Self> {
        let kind = if record.is_header() {
            FrameKind::Header
        } else {
            FrameKind::Data
        };
        Self::new(kind, stream_id, serde_json::to_vec(record)?)
    }

    pub fn success(stream_id: u64, records: u64) -> Result<Self> {
        let payload = serde_json::to_vec(&SuccessPayload { records })?;
        Self::new(FrameKind::Success, stream_id, payload)
    }

    pub fn failure(stream_id: u64, code: &str, message: &str) -> Result<Self> {
        let payload = serde_json::to_vec(&ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
        })?;
        Self::new(FrameKind::Failure, stream_id, payload)
    }

    pub fn kind(&self) -> FrameKind {
        self.header.kind
    }

    /// Encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Append the encoded frame to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(&self.header.pack()?);
        buf.extend_from_slice(&self.payload);
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Decode one frame from the start of `data`, returning it and the bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let header = FrameHeader::unpack(data)?;
        let len = header.payload_len as usize;
        let available = data.len() - HEADER_SIZE;
        if available < len {
            return Err(ProtocolError::PayloadTruncated {
                expected: len,
                got: available,
            });
        }
        let payload = data[HEADER_SIZE..HEADER_SIZE + len].to_vec();
        Ok((Self { header, payload }, HEADER_SIZE + len))
    }

    /// Decode a buffer holding zero or more complete frames.
    pub fn decode_all(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut frames = Vec::new();
        while !data.is_empty() {
            let (frame, consumed) = Self::decode(data)?;
            frames.push(frame);
            data = &data[consumed..];
        }
        Ok(frames)
    }

    /// Parse the payload of a Header or Data frame.
    pub fn to_record(&self) -> Result<Record> {
        match self.kind() {
            FrameKind::Header | FrameKind::Data => Ok(serde_json::from_slice(&self.payload)?),
            other => Err(ProtocolError::UnexpectedFrame {
                expected: "header or data",
                got: other.as_str(),
            }),
        }
    }

    pub fn to_success(&self) -> Result<SuccessPayload> {
        match self.kind() {
            FrameKind::Success => Ok(serde_json::from_slice(&self.payload)?),
            other => Err(ProtocolError::UnexpectedFrame {
                expected: "success",
                got: other.as_str(),
            }),
        }
    }

    pub fn to_error(&self) -> Result<ErrorPayload> {
        match self.kind() {
            FrameKind::Failure => Ok(serde_json::from_slice(&self.payload)?),
            other => Err(ProtocolError::UnexpectedFrame {
                expected: "failure",
                got: other.as_str(),
            }),
        }
    }
}
