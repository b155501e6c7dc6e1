//! Validated admin queries.
//!
//! A [`Query`] is built once per request from an [`AdminRequest`]. Building it
//! checks the options against the table of allowed and required options for
//! the `(Command, SubCommand)` pair; command-specific constraints (mutually
//! exclusive flags and the like) are left to the command's own init.

use std::fmt;

use tapeflow_protocol::{
    AdminRequest, BoolOpt, Command, RequestOptions, StrListOpt, StrOpt, SubCommand, U64Opt,
};

use crate::error::{FrontendError, Result};

/// Any option key, whatever its value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKey {
    Bool(BoolOpt),
    U64(U64Opt),
    Str(StrOpt),
    StrList(StrListOpt),
}

impl OptKey {
    pub fn flag(&self) -> &'static str {
        match self {
            OptKey::Bool(opt) => opt.flag(),
            OptKey::U64(opt) => opt.flag(),
            OptKey::Str(opt) => opt.flag(),
            OptKey::StrList(opt) => opt.flag(),
        }
    }

    fn is_present(&self, options: &RequestOptions) -> bool {
        match self {
            OptKey::Bool(opt) => options.bools.contains_key(opt),
            OptKey::U64(opt) => options.uint64s.contains_key(opt),
            OptKey::Str(opt) => options.strings.contains_key(opt),
            OptKey::StrList(opt) => options.string_lists.contains_key(opt),
        }
    }
}

impl fmt::Display for OptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}

/// Allowed and required options of one command pair.
#[derive(Debug, Clone, Copy)]
pub struct OptionRules {
    pub required: &'static [OptKey],
    pub optional: &'static [OptKey],
}

const NO_OPTIONS: OptionRules = OptionRules {
    required: &[],
    optional: &[],
};

impl OptionRules {
    fn allows(&self, key: OptKey) -> bool {
        self.required.contains(&key) || self.optional.contains(&key)
    }

    /// Reject unknown options, missing required options and empty strings.
    pub fn check(&self, cmd: Command, subcmd: SubCommand, options: &RequestOptions) -> Result<()> {
        let present = options
            .bools
            .keys()
            .map(|k| OptKey::Bool(*k))
            .chain(options.uint64s.keys().map(|k| OptKey::U64(*k)))
            .chain(options.strings.keys().map(|k| OptKey::Str(*k)))
            .chain(options.string_lists.keys().map(|k| OptKey::StrList(*k)));

        for key in present {
            if !self.allows(key) {
                return Err(FrontendError::validation(format!(
                    "{} is not a valid option for '{} {}'",
                    key, cmd, subcmd
                )));
            }
        }

        if let Some(missing) = self.required.iter().find(|key| !key.is_present(options)) {
            return Err(FrontendError::validation(format!(
                "'{} {}' requires {}",
                cmd, subcmd, missing
            )));
        }

        if let Some((key, _)) = options.strings.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(FrontendError::validation(format!(
                "{} must not be empty",
                key.flag()
            )));
        }

        Ok(())
    }
}

/// Option table for every supported listing.
pub fn option_rules(cmd: Command, subcmd: SubCommand) -> Option<OptionRules> {
    use OptKey::*;

    let rules = match (cmd, subcmd) {
        (Command::Drive, SubCommand::Ls) => OptionRules {
            required: &[],
            optional: &[Str(StrOpt::Drive), Bool(BoolOpt::All)],
        },
        (Command::Repack, SubCommand::Ls) => OptionRules {
            required: &[],
            optional: &[Str(StrOpt::Vid)],
        },
        (Command::FailedRequest, SubCommand::Ls) => OptionRules {
            required: &[],
            optional: &[
                Bool(BoolOpt::JustArchive),
                Bool(BoolOpt::JustRetrieve),
                Str(StrOpt::TapePool),
                Str(StrOpt::Vid),
                Bool(BoolOpt::Summary),
                Bool(BoolOpt::ShowLogEntries),
            ],
        },
        (Command::Tape, SubCommand::Ls) => OptionRules {
            required: &[],
            optional: &[
                Str(StrOpt::Vid),
                Str(StrOpt::MediaType),
                Str(StrOpt::Vendor),
                Str(StrOpt::LogicalLibrary),
                Str(StrOpt::TapePool),
                Str(StrOpt::Vo),
                U64(U64Opt::Capacity),
                Bool(BoolOpt::Full),
                Bool(BoolOpt::FromCastor),
                Str(StrOpt::State),
                StrList(StrListOpt::Vid),
                Bool(BoolOpt::All),
            ],
        },
        (Command::RecycleTapeFile, SubCommand::Ls) => OptionRules {
            required: &[],
            optional: &[
                Str(StrOpt::Vid),
                Str(StrOpt::Fxid),
                StrList(StrListOpt::FileId),
                U64(U64Opt::CopyNumber),
                U64(U64Opt::ArchiveFileId),
                Str(StrOpt::Instance),
            ],
        },
        (Command::ShowQueues, SubCommand::None) | (Command::Version, SubCommand::None) => {
            NO_OPTIONS
        }
        (
            Command::Admin
            | Command::ArchiveRoute
            | Command::GroupMountRule
            | Command::RequesterMountRule
            | Command::ActivityMountRule
            | Command::LogicalLibrary
            | Command::PhysicalLibrary
            | Command::MediaType
            | Command::MountPolicy
            | Command::StorageClass
            | Command::TapePool
            | Command::DiskSystem
            | Command::DiskInstance
            | Command::DiskInstanceSpace
            | Command::VirtualOrganization,
            SubCommand::Ls,
        ) => NO_OPTIONS,
        _ => return None,
    };
    Some(rules)
}

/// A validated, immutable admin query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    cmd: Command,
    subcmd: SubCommand,
    options: RequestOptions,
}

impl Query {
    /// Validate `request` against the option table.
    pub fn from_request(request: &AdminRequest) -> Result<Self> {
        let rules = option_rules(request.cmd, request.subcmd).ok_or(
            FrontendError::NotImplemented {
                cmd: request.cmd,
                subcmd: request.subcmd,
            },
        )?;
        rules.check(request.cmd, request.subcmd, &request.options)?;
        Ok(Self {
            cmd: request.cmd,
            subcmd: request.subcmd,
            options: request.options.clone(),
        })
    }

    pub fn cmd(&self) -> Command {
        self.cmd
    }

    pub fn subcmd(&self) -> SubCommand {
        self.subcmd
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// True only when the flag is present and set.
    pub fn has_flag(&self, key: BoolOpt) -> bool {
        self.options.bools.get(&key).copied().unwrap_or(false)
    }

    pub fn get_u64(&self, key: U64Opt) -> Option<u64> {
        self.options.uint64s.get(&key).copied()
    }

    pub fn get_str(&self, key: StrOpt) -> Option<&str> {
        self.options.strings.get(&key).map(String::as_str)
    }

    pub fn get_str_list(&self, key: StrListOpt) -> Option<&[String]> {
        self.options.string_lists.get(&key).map(Vec::as_slice)
    }
}
