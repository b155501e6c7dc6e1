//! Command registry: `(Command, SubCommand)` to record source factory.
//!
//! [`CommandRegistry::open`] is the single entry point for a request. Lookup
//! happens first so an unknown pair never reaches validation; every outcome
//! produces one audit log line.

use std::collections::HashMap;
use std::time::Instant;

use tapeflow_protocol::{AdminRequest, Command, SubCommand};
use tracing::{info, warn};
use uuid::Uuid;

use crate::commands::{self, SourceFactory};
use crate::context::FrontendContext;
use crate::error::{FrontendError, Result};
use crate::metrics::METRICS;
use crate::query::Query;
use crate::stream::ResponseStream;

pub struct CommandRegistry {
    factories: HashMap<(Command, SubCommand), SourceFactory>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Every supported listing.
    pub fn standard() -> Self {
        use commands::listings;

        let mut registry = Self::new();
        registry.register(Command::Drive, SubCommand::Ls, commands::drive_ls::open);
        registry.register(Command::Repack, SubCommand::Ls, commands::repack_ls::open);
        registry.register(
            Command::FailedRequest,
            SubCommand::Ls,
            commands::failed_request_ls::open,
        );
        registry.register(Command::Tape, SubCommand::Ls, commands::tape_ls::open);
        registry.register(Command::ShowQueues, SubCommand::None, commands::show_queues::open);
        registry.register(
            Command::RecycleTapeFile,
            SubCommand::Ls,
            commands::recycle_tape_file_ls::open,
        );
        registry.register(Command::Version, SubCommand::None, listings::version);

        registry.register(Command::Admin, SubCommand::Ls, listings::admin_ls);
        registry.register(Command::ArchiveRoute, SubCommand::Ls, listings::archive_route_ls);
        registry.register(Command::GroupMountRule, SubCommand::Ls, listings::group_mount_rule_ls);
        registry.register(
            Command::RequesterMountRule,
            SubCommand::Ls,
            listings::requester_mount_rule_ls,
        );
        registry.register(
            Command::ActivityMountRule,
            SubCommand::Ls,
            listings::activity_mount_rule_ls,
        );
        registry.register(Command::LogicalLibrary, SubCommand::Ls, listings::logical_library_ls);
        registry.register(Command::PhysicalLibrary, SubCommand::Ls, listings::physical_library_ls);
        registry.register(Command::MediaType, SubCommand::Ls, listings::media_type_ls);
        registry.register(Command::MountPolicy, SubCommand::Ls, listings::mount_policy_ls);
        registry.register(Command::StorageClass, SubCommand::Ls, listings::storage_class_ls);
        registry.register(Command::TapePool, SubCommand::Ls, listings::tape_pool_ls);
        registry.register(Command::DiskSystem, SubCommand::Ls, listings::disk_system_ls);
        registry.register(Command::DiskInstance, SubCommand::Ls, listings::disk_instance_ls);
        registry.register(
            Command::DiskInstanceSpace,
            SubCommand::Ls,
            listings::disk_instance_space_ls,
        );
        registry.register(
            Command::VirtualOrganization,
            SubCommand::Ls,
            listings::virtual_organization_ls,
        );
        registry
    }

    pub fn register(&mut self, cmd: Command, subcmd: SubCommand, factory: SourceFactory) {
        self.factories.insert((cmd, subcmd), factory);
    }

    pub fn contains(&self, cmd: Command, subcmd: SubCommand) -> bool {
        self.factories.contains_key(&(cmd, subcmd))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Validate `request` and build its response stream.
    ///
    /// All validation and backend reads happen here, before any frame exists.
    pub fn open(&self, ctx: &FrontendContext, request: &AdminRequest) -> Result<ResponseStream> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let result = self.build(ctx, request);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let options = request.options.present_flags().join(" ");

        match &result {
            Ok(stream) => {
                METRICS.inc_streams_opened();
                info!(
                    request_id = %request_id,
                    cmd = %request.cmd,
                    subcmd = %request.subcmd,
                    options = %options,
                    kind = %stream.kind(),
                    status = "success",
                    elapsed_ms,
                    "Admin command"
                );
            }
            Err(err) => {
                if matches!(err, FrontendError::Validation(_)) {
                    METRICS.inc_validation_failures();
                }
                warn!(
                    request_id = %request_id,
                    cmd = %request.cmd,
                    subcmd = %request.subcmd,
                    options = %options,
                    status = "failure",
                    code = err.code(),
                    reason = %err,
                    elapsed_ms,
                    "Admin command"
                );
            }
        }
        result
    }

    fn build(&self, ctx: &FrontendContext, request: &AdminRequest) -> Result<ResponseStream> {
        let factory = self
            .factories
            .get(&(request.cmd, request.subcmd))
            .ok_or(FrontendError::NotImplemented {
                cmd: request.cmd,
                subcmd: request.subcmd,
            })?;
        let query = Query::from_request(request)?;
        let source = factory(ctx, &query)?;
        Ok(ResponseStream::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tapeflow_catalogue::MemoryBackend;
    use tapeflow_protocol::{BoolOpt, StrOpt};

    fn ctx() -> FrontendContext {
        FrontendContext::from_backend(Arc::new(MemoryBackend::default()))
    }

    #[test]
    fn test_standard_registry_covers_option_table() {
        let registry = CommandRegistry::standard();
        for cmd in Command::ALL {
            let subcmd = match cmd {
                Command::ShowQueues | Command::Version => SubCommand::None,
                _ => SubCommand::Ls,
            };
            assert_eq!(
                registry.contains(cmd, subcmd),
                crate::query::option_rules(cmd, subcmd).is_some(),
                "{}",
                cmd
            );
        }
    }

    #[test]
    fn test_unmapped_pair_is_not_implemented() {
        let registry = CommandRegistry::standard();
        let err = registry
            .open(&ctx(), &AdminRequest::new(Command::TapeFile, SubCommand::Ls))
            .unwrap_err();
        assert!(matches!(err, FrontendError::NotImplemented { .. }));
    }

    #[test]
    fn test_lookup_precedes_validation() {
        // Bogus options on an unmapped pair still report "not implemented"
        let registry = CommandRegistry::new();
        let req = AdminRequest::new(Command::Drive, SubCommand::Ls).with_str(StrOpt::Vid, "V1");
        assert!(matches!(
            registry.open(&ctx(), &req),
            Err(FrontendError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_validation_runs_before_factory() {
        let registry = CommandRegistry::standard();
        let req = AdminRequest::new(Command::FailedRequest, SubCommand::Ls)
            .with_flag(BoolOpt::Summary, true)
            .with_flag(BoolOpt::JustArchive, true)
            .with_flag(BoolOpt::JustRetrieve, true);
        let backend = Arc::new(MemoryBackend::default());
        let ctx = FrontendContext::from_backend(backend.clone());

        assert!(matches!(
            registry.open(&ctx, &req),
            Err(FrontendError::Validation(_))
        ));
        assert_eq!(backend.cursors_opened(), 0);
    }

    #[test]
    fn test_version_stream() {
        let registry = CommandRegistry::standard();
        let mut stream = registry
            .open(&ctx(), &AdminRequest::new(Command::Version, SubCommand::None))
            .unwrap();
        assert!(stream.next().unwrap().is_header());
        assert!(!stream.is_done());
        stream.next().unwrap();
        assert!(stream.is_done());
    }
}
