//! Frontend and transport error types.

use tapeflow_catalogue::CatalogueError;
use tapeflow_protocol::error::ProtocolError;
use tapeflow_protocol::{Command, SubCommand};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrontendError>;

/// Errors raised while building or draining a response stream.
#[derive(Error, Debug)]
pub enum FrontendError {
    /// Conflicting, missing or malformed options. Raised before any frame.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Command not implemented: {cmd} {subcmd}")]
    NotImplemented { cmd: Command, subcmd: SubCommand },

    /// Joined data disagrees with itself (e.g. a repack VID without a tape)
    #[error("Inconsistent state: {0}")]
    Inconsistent(String),

    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl FrontendError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::Inconsistent(msg.into())
    }

    /// Stable code carried by Failure frames.
    pub fn code(&self) -> &'static str {
        match self {
            FrontendError::Validation(_) => "E_VALIDATION",
            FrontendError::NotFound(_) => "E_NOT_FOUND",
            FrontendError::NotImplemented { .. } => "E_NOT_IMPLEMENTED",
            FrontendError::Inconsistent(_) => "E_INCONSISTENT",
            FrontendError::Catalogue(_) => "E_CATALOGUE",
            FrontendError::Protocol(_) => "E_PROTOCOL",
        }
    }
}

/// Errors raised by the pull and push adapters.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The stream failed mid-flight.
    #[error(transparent)]
    Stream(#[from] FrontendError),

    #[error("Frame encoding failed: {0}")]
    Encode(#[from] ProtocolError),

    #[error("Buffer overflow: {size} bytes exceeds hard cap of {cap}")]
    BufferOverflow { size: usize, cap: usize },

    #[error("Stream already finished")]
    StreamFinished,

    #[error("Fill hint must be non-zero once the header has been sent")]
    ZeroHint,

    #[error("Write failed: {0}")]
    WriteFailed(String),
}

impl TransportError {
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            TransportError::Stream(err) => err.code(),
            TransportError::Encode(_) => "E_ENCODE",
            TransportError::BufferOverflow { .. } => "E_BUFFER_OVERFLOW",
            TransportError::StreamFinished => "E_STREAM_FINISHED",
            TransportError::ZeroHint => "E_ZERO_HINT",
            TransportError::WriteFailed(_) => "E_WRITE_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through_transport() {
        let err = TransportError::from(FrontendError::not_found("no drive"));
        assert_eq!(err.code(), "E_NOT_FOUND");
        assert_eq!(err.to_string(), "Not found: no drive");
    }

    #[test]
    fn test_not_implemented_message() {
        let err = FrontendError::NotImplemented {
            cmd: Command::Tape,
            subcmd: SubCommand::Add,
        };
        assert_eq!(err.to_string(), "Command not implemented: tape add");
        assert_eq!(err.code(), "E_NOT_IMPLEMENTED");
    }
}
