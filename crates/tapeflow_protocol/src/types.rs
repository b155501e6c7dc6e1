//! Canonical enums and small value types shared by the catalogue and the frontend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Drive status
// ============================================================================

/// Operational status of a tape drive.
/// This is the CANONICAL definition - the catalogue and the frontend both use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DriveStatus {
    Probing,
    Up,
    Down,
    Starting,
    Mounting,
    Transferring,
    CleaningUp,
    Unloading,
    Unmounting,
    DrainingToDisk,
    Shutdown,
    #[default]
    Unknown,
}

impl DriveStatus {
    pub const ALL: [DriveStatus; 12] = [
        DriveStatus::Probing,
        DriveStatus::Up,
        DriveStatus::Down,
        DriveStatus::Starting,
        DriveStatus::Mounting,
        DriveStatus::Transferring,
        DriveStatus::CleaningUp,
        DriveStatus::Unloading,
        DriveStatus::Unmounting,
        DriveStatus::DrainingToDisk,
        DriveStatus::Shutdown,
        DriveStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriveStatus::Probing => "Probing",
            DriveStatus::Up => "Up",
            DriveStatus::Down => "Down",
            DriveStatus::Starting => "Starting",
            DriveStatus::Mounting => "Mounting",
            DriveStatus::Transferring => "Transferring",
            DriveStatus::CleaningUp => "CleaningUp",
            DriveStatus::Unloading => "Unloading",
            DriveStatus::Unmounting => "Unmounting",
            DriveStatus::DrainingToDisk => "DrainingToDisk",
            DriveStatus::Shutdown => "Shutdown",
            DriveStatus::Unknown => "Unknown",
        }
    }

    /// Whether a drive in this status holds a tape session.
    pub fn has_session(&self) -> bool {
        !matches!(self, DriveStatus::Up | DriveStatus::Down | DriveStatus::Unknown)
    }
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DriveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DriveStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid drive status: '{}'", s))
    }
}

// ============================================================================
// Mount type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MountType {
    #[default]
    NoMount,
    ArchiveForUser,
    ArchiveForRepack,
    ArchiveAllTypes,
    Retrieve,
    Label,
}

impl MountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountType::NoMount => "NO_MOUNT",
            MountType::ArchiveForUser => "ARCHIVE_FOR_USER",
            MountType::ArchiveForRepack => "ARCHIVE_FOR_REPACK",
            MountType::ArchiveAllTypes => "ARCHIVE_ALL_TYPES",
            MountType::Retrieve => "RETRIEVE",
            MountType::Label => "LABEL",
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(
            self,
            MountType::ArchiveForUser | MountType::ArchiveForRepack | MountType::ArchiveAllTypes
        )
    }
}

impl fmt::Display for MountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Tape state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TapeState {
    #[default]
    Active,
    Disabled,
    Broken,
    BrokenPending,
    Repacking,
    RepackingPending,
    RepackingDisabled,
    Exported,
    ExportedPending,
}

impl TapeState {
    pub const ALL: [TapeState; 9] = [
        TapeState::Active,
        TapeState::Disabled,
        TapeState::Broken,
        TapeState::BrokenPending,
        TapeState::Repacking,
        TapeState::RepackingPending,
        TapeState::RepackingDisabled,
        TapeState::Exported,
        TapeState::ExportedPending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TapeState::Active => "ACTIVE",
            TapeState::Disabled => "DISABLED",
            TapeState::Broken => "BROKEN",
            TapeState::BrokenPending => "BROKEN_PENDING",
            TapeState::Repacking => "REPACKING",
            TapeState::RepackingPending => "REPACKING_PENDING",
            TapeState::RepackingDisabled => "REPACKING_DISABLED",
            TapeState::Exported => "EXPORTED",
            TapeState::ExportedPending => "EXPORTED_PENDING",
        }
    }
}

impl fmt::Display for TapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TapeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        TapeState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == upper)
            .ok_or_else(|| {
                let valid: Vec<&str> = TapeState::ALL.iter().map(TapeState::as_str).collect();
                format!(
                    "Invalid tape state: '{}'. Expected one of: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

// ============================================================================
// Repack status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RepackStatus {
    #[default]
    Pending,
    ToExpand,
    Starting,
    Running,
    Complete,
    Failed,
    Aborting,
    Aborted,
}

impl RepackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepackStatus::Pending => "Pending",
            RepackStatus::ToExpand => "ToExpand",
            RepackStatus::Starting => "Starting",
            RepackStatus::Running => "Running",
            RepackStatus::Complete => "Complete",
            RepackStatus::Failed => "Failed",
            RepackStatus::Aborting => "Aborting",
            RepackStatus::Aborted => "Aborted",
        }
    }
}

impl fmt::Display for RepackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Request type (failed request listings)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    Archive,
    Retrieve,
    Total,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Archive => "archive",
            RequestType::Retrieve => "retrieve",
            RequestType::Total => "total",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Audit logs
// ============================================================================

/// Who created or last modified a catalogue entry, and when (epoch seconds).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryLog {
    pub username: String,
    pub host: String,
    pub time: i64,
}

/// Drive and time of a tape event (label, last read, last write).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapeLog {
    pub drive: String,
    pub time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_status_parse_roundtrip() {
        for status in DriveStatus::ALL {
            assert_eq!(status.as_str().parse::<DriveStatus>().unwrap(), status);
        }
        assert_eq!("transferring".parse::<DriveStatus>().unwrap(), DriveStatus::Transferring);
        assert!("Flying".parse::<DriveStatus>().is_err());
    }

    #[test]
    fn test_tape_state_error_lists_valid_states() {
        let err = "LOST".parse::<TapeState>().unwrap_err();
        assert!(err.contains("ACTIVE"));
        assert!(err.contains("EXPORTED_PENDING"));
        assert_eq!("broken".parse::<TapeState>().unwrap(), TapeState::Broken);
    }

    #[test]
    fn test_mount_type_serialization() {
        let json = serde_json::to_string(&MountType::ArchiveForRepack).unwrap();
        assert_eq!(json, "\"ARCHIVE_FOR_REPACK\"");
        assert!(MountType::ArchiveForUser.is_archive());
        assert!(!MountType::Retrieve.is_archive());
    }

    #[test]
    fn test_session_statuses() {
        assert!(!DriveStatus::Up.has_session());
        assert!(!DriveStatus::Unknown.has_session());
        assert!(DriveStatus::Transferring.has_session());
    }
}
