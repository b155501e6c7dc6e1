//! Admin request types.
//!
//! An [`AdminRequest`] names a `(Command, SubCommand)` pair plus typed options.
//! Options are keyed by enum per value type, mirroring the four option tables
//! the admin CLI builds (boolean, uint64, string, string list).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Admin command (the noun).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Admin,
    ArchiveRoute,
    Drive,
    FailedRequest,
    GroupMountRule,
    ActivityMountRule,
    LogicalLibrary,
    PhysicalLibrary,
    MediaType,
    MountPolicy,
    Repack,
    RequesterMountRule,
    ShowQueues,
    StorageClass,
    Tape,
    TapeFile,
    TapePool,
    DiskSystem,
    DiskInstance,
    DiskInstanceSpace,
    VirtualOrganization,
    Version,
    RecycleTapeFile,
}

impl Command {
    pub const ALL: [Command; 23] = [
        Command::Admin,
        Command::ArchiveRoute,
        Command::Drive,
        Command::FailedRequest,
        Command::GroupMountRule,
        Command::ActivityMountRule,
        Command::LogicalLibrary,
        Command::PhysicalLibrary,
        Command::MediaType,
        Command::MountPolicy,
        Command::Repack,
        Command::RequesterMountRule,
        Command::ShowQueues,
        Command::StorageClass,
        Command::Tape,
        Command::TapeFile,
        Command::TapePool,
        Command::DiskSystem,
        Command::DiskInstance,
        Command::DiskInstanceSpace,
        Command::VirtualOrganization,
        Command::Version,
        Command::RecycleTapeFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Admin => "admin",
            Command::ArchiveRoute => "archiveroute",
            Command::Drive => "drive",
            Command::FailedRequest => "failedrequest",
            Command::GroupMountRule => "groupmountrule",
            Command::ActivityMountRule => "activitymountrule",
            Command::LogicalLibrary => "logicallibrary",
            Command::PhysicalLibrary => "physicallibrary",
            Command::MediaType => "mediatype",
            Command::MountPolicy => "mountpolicy",
            Command::Repack => "repack",
            Command::RequesterMountRule => "requestermountrule",
            Command::ShowQueues => "showqueues",
            Command::StorageClass => "storageclass",
            Command::Tape => "tape",
            Command::TapeFile => "tapefile",
            Command::TapePool => "tapepool",
            Command::DiskSystem => "disksystem",
            Command::DiskInstance => "diskinstance",
            Command::DiskInstanceSpace => "diskinstancespace",
            Command::VirtualOrganization => "virtualorganization",
            Command::Version => "version",
            Command::RecycleTapeFile => "recycletf",
        }
    }

    /// Short alias accepted by the admin CLI.
    pub fn short_name(&self) -> &'static str {
        match self {
            Command::Admin => "ad",
            Command::ArchiveRoute => "ar",
            Command::Drive => "dr",
            Command::FailedRequest => "fr",
            Command::GroupMountRule => "gmr",
            Command::ActivityMountRule => "amr",
            Command::LogicalLibrary => "ll",
            Command::PhysicalLibrary => "pl",
            Command::MediaType => "mt",
            Command::MountPolicy => "mp",
            Command::Repack => "re",
            Command::RequesterMountRule => "rmr",
            Command::ShowQueues => "sq",
            Command::StorageClass => "sc",
            Command::Tape => "ta",
            Command::TapeFile => "tf",
            Command::TapePool => "tp",
            Command::DiskSystem => "ds",
            Command::DiskInstance => "di",
            Command::DiskInstanceSpace => "dis",
            Command::VirtualOrganization => "vo",
            Command::Version => "v",
            Command::RecycleTapeFile => "rtf",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Command::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.as_str() == lowered || cmd.short_name() == lowered)
            .ok_or_else(|| format!("Invalid command: '{}'", s))
    }
}

/// Admin subcommand (the verb). `None` is used by commands without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubCommand {
    #[default]
    None,
    Add,
    Ch,
    Rm,
    Ls,
    Err,
    Reclaim,
    Label,
    Up,
    Down,
    Retry,
    Restore,
}

impl SubCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubCommand::None => "",
            SubCommand::Add => "add",
            SubCommand::Ch => "ch",
            SubCommand::Rm => "rm",
            SubCommand::Ls => "ls",
            SubCommand::Err => "err",
            SubCommand::Reclaim => "reclaim",
            SubCommand::Label => "label",
            SubCommand::Up => "up",
            SubCommand::Down => "down",
            SubCommand::Retry => "retry",
            SubCommand::Restore => "restore",
        }
    }
}

impl fmt::Display for SubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, <Self as FromStr>::Err> {
        match s.to_lowercase().as_str() {
            "" => Ok(SubCommand::None),
            "add" => Ok(SubCommand::Add),
            "ch" => Ok(SubCommand::Ch),
            "rm" => Ok(SubCommand::Rm),
            "ls" => Ok(SubCommand::Ls),
            "err" => Ok(SubCommand::Err),
            "reclaim" => Ok(SubCommand::Reclaim),
            "label" => Ok(SubCommand::Label),
            "up" => Ok(SubCommand::Up),
            "down" => Ok(SubCommand::Down),
            "retry" => Ok(SubCommand::Retry),
            "restore" => Ok(SubCommand::Restore),
            _ => Err(format!("Invalid subcommand: '{}'", s)),
        }
    }
}

/// Boolean and flag options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOpt {
    All,
    Disabled,
    Encrypted,
    Full,
    FromCastor,
    JustArchive,
    JustRetrieve,
    ShowLogEntries,
    Summary,
    LookupNamespace,
}

impl BoolOpt {
    pub fn flag(&self) -> &'static str {
        match self {
            BoolOpt::All => "--all",
            BoolOpt::Disabled => "--disabled",
            BoolOpt::Encrypted => "--encrypted",
            BoolOpt::Full => "--full",
            BoolOpt::FromCastor => "--fromcastor",
            BoolOpt::JustArchive => "--justarchive",
            BoolOpt::JustRetrieve => "--justretrieve",
            BoolOpt::ShowLogEntries => "--log",
            BoolOpt::Summary => "--summary",
            BoolOpt::LookupNamespace => "--lookupnamespace",
        }
    }
}

/// Unsigned integer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum U64Opt {
    Capacity,
    CopyNumber,
    ArchiveFileId,
}

impl U64Opt {
    pub fn flag(&self) -> &'static str {
        match self {
            U64Opt::Capacity => "--capacity",
            U64Opt::CopyNumber => "--copynb",
            U64Opt::ArchiveFileId => "--id",
        }
    }
}

/// String options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrOpt {
    Drive,
    Vid,
    TapePool,
    MediaType,
    Vendor,
    LogicalLibrary,
    Vo,
    State,
    Instance,
    Fxid,
}

impl StrOpt {
    pub fn flag(&self) -> &'static str {
        match self {
            StrOpt::Drive => "--drive",
            StrOpt::Vid => "--vid",
            StrOpt::TapePool => "--tapepool",
            StrOpt::MediaType => "--mediatype",
            StrOpt::Vendor => "--vendor",
            StrOpt::LogicalLibrary => "--logicallibrary",
            StrOpt::Vo => "--virtualorganisation",
            StrOpt::State => "--state",
            StrOpt::Instance => "--instance",
            StrOpt::Fxid => "--fxid",
        }
    }
}

/// String list options (loaded from files by the CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrListOpt {
    Vid,
    FileId,
}

impl StrListOpt {
    pub fn flag(&self) -> &'static str {
        match self {
            StrListOpt::Vid => "--vidfile",
            StrListOpt::FileId => "--fxidfile",
        }
    }
}

/// Typed option values carried by a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub bools: BTreeMap<BoolOpt, bool>,
    pub uint64s: BTreeMap<U64Opt, u64>,
    pub strings: BTreeMap<StrOpt, String>,
    pub string_lists: BTreeMap<StrListOpt, Vec<String>>,
}

impl RequestOptions {
    pub fn is_empty(&self) -> bool {
        self.bools.is_empty()
            && self.uint64s.is_empty()
            && self.strings.is_empty()
            && self.string_lists.is_empty()
    }

    /// Flags of every option present, in a stable order.
    pub fn present_flags(&self) -> Vec<&'static str> {
        let mut flags: Vec<&'static str> = Vec::new();
        flags.extend(self.bools.keys().map(BoolOpt::flag));
        flags.extend(self.uint64s.keys().map(U64Opt::flag));
        flags.extend(self.strings.keys().map(StrOpt::flag));
        flags.extend(self.string_lists.keys().map(StrListOpt::flag));
        flags
    }
}

/// Admin request envelope as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRequest {
    pub cmd: Command,
    #[serde(default)]
    pub subcmd: SubCommand,
    #[serde(default)]
    pub options: RequestOptions,
}

impl AdminRequest {
    pub fn new(cmd: Command, subcmd: SubCommand) -> Self {
        Self {
            cmd,
            subcmd,
            options: RequestOptions::default(),
        }
    }

    pub fn with_flag(mut self, key: BoolOpt, value: bool) -> Self {
        self.options.bools.insert(key, value);
        self
    }

    pub fn with_u64(mut self, key: U64Opt, value: u64) -> Self {
        self.options.uint64s.insert(key, value);
        self
    }

    pub fn with_str(mut self, key: StrOpt, value: impl Into<String>) -> Self {
        self.options.strings.insert(key, value.into());
        self
    }

    pub fn with_str_list(mut self, key: StrListOpt, values: Vec<String>) -> Self {
        self.options.string_lists.insert(key, values);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_lookup_accepts_short_names() {
        assert_eq!("dr".parse::<Command>().unwrap(), Command::Drive);
        assert_eq!("FailedRequest".parse::<Command>().unwrap(), Command::FailedRequest);
        assert_eq!("rtf".parse::<Command>().unwrap(), Command::RecycleTapeFile);
        assert!("nonsense".parse::<Command>().is_err());
    }

    #[test]
    fn test_request_json_shape() {
        let req = AdminRequest::new(Command::FailedRequest, SubCommand::Ls)
            .with_flag(BoolOpt::Summary, true)
            .with_str(StrOpt::TapePool, "pool_a");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"failed_request\""));
        assert!(json.contains("\"summary\":true"));
        assert!(json.contains("\"tape_pool\":\"pool_a\""));

        let parsed: AdminRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn test_missing_options_default_to_empty() {
        let parsed: AdminRequest =
            serde_json::from_str(r#"{"cmd":"show_queues"}"#).unwrap();
        assert_eq!(parsed.subcmd, SubCommand::None);
        assert!(parsed.options.is_empty());
    }

    #[test]
    fn test_present_flags() {
        let req = AdminRequest::new(Command::Tape, SubCommand::Ls)
            .with_flag(BoolOpt::All, true)
            .with_str(StrOpt::Vid, "V00001");
        assert_eq!(req.options.present_flags(), vec!["--all", "--vid"]);
    }
}
