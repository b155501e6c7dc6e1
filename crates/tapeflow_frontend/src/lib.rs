//! Tapeflow admin frontend.
//!
//! Turns an [`AdminRequest`](tapeflow_protocol::AdminRequest) into a
//! [`ResponseStream`] of records read from the catalogue and scheduler, then
//! drains it through a pull or push transport adapter.
//!
//! ```text
//! AdminRequest -> CommandRegistry::open -> ResponseStream -> PullAdapter / PushAdapter -> frames
//! ```

pub mod commands;
pub mod context;
pub mod error;
pub mod metrics;
pub mod query;
pub mod registry;
pub mod stream;
pub mod transport;

use std::path::PathBuf;

use clap::ValueEnum;
use tapeflow_protocol::defaults::{DEFAULT_FILL_HINT, DEFAULT_STATE_FILE};

pub use context::{Clock, FrontendContext, ManualClock, SystemClock};
pub use error::{FrontendError, Result, TransportError};
pub use metrics::METRICS;
pub use query::Query;
pub use registry::CommandRegistry;
pub use stream::{RecordSource, ResponseStream};
pub use transport::{PullAdapter, PullChunk, PushAdapter, PushOutcome, PushStep};

/// How the response is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum TransportMode {
    /// Caller-sized buffers, end-of-stream flag.
    #[default]
    Pull,
    /// One frame per completed write.
    Push,
}

/// Command-line configuration of the frontend binary.
#[derive(clap::Args, Debug, Clone)]
pub struct FrontendArgs {
    /// JSON state file backing the in-memory catalogue and scheduler
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Scheduler backend this frontend serves (defaults to the scheduler's own)
    #[arg(long, env = "TAPEFLOW_SCHEDULER_BACKEND")]
    pub backend_name: Option<String>,

    /// Instance name stamped on every record
    #[arg(long, env = "TAPEFLOW_INSTANCE_NAME")]
    pub instance_name: Option<String>,

    /// Admin request as JSON, e.g. '{"cmd":"drive","subcmd":"ls"}'
    #[arg(long)]
    pub request: String,

    #[arg(long, value_enum, default_value_t = TransportMode::Pull)]
    pub transport: TransportMode,

    /// Soft buffer size for pull fills, in bytes
    #[arg(long, default_value_t = DEFAULT_FILL_HINT)]
    pub fill_hint: usize,

    /// Log to stderr at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
