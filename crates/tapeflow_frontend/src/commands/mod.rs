//! One module per admin listing.
//!
//! Every command exposes a [`SourceFactory`]: it validates the command's own
//! constraints, performs the backend reads and returns the record source the
//! response stream drains.

pub mod drive_ls;
pub mod failed_request_ls;
pub mod listings;
pub mod recycle_tape_file_ls;
pub mod repack_ls;
pub mod show_queues;
pub mod tape_ls;

use crate::context::FrontendContext;
use crate::error::Result;
use crate::query::Query;
use crate::stream::RecordSource;

/// Builds the record source of one `(Command, SubCommand)` pair.
pub type SourceFactory = fn(&FrontendContext, &Query) -> Result<Box<dyn RecordSource>>;
