//! Canonical default values shared by the frontend and its clients.

pub const DEFAULT_INSTANCE_NAME: &str = "tapeflow";
pub const DEFAULT_STATE_FILE: &str = "tapeflow_state.json";
/// Pull transport buffer hint used when the host does not supply one.
pub const DEFAULT_FILL_HINT: usize = 64 * 1024;
/// Backend name substituted for drives without a `SchedulerBackendName` entry.
pub const UNKNOWN_SCHEDULER_BACKEND: &str = "unknown";
/// Drive config key holding the owning scheduler backend.
pub const SCHEDULER_BACKEND_CONFIG_KEY: &str = "SchedulerBackendName";
