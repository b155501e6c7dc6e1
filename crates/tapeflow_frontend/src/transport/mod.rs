//! Transport adapters.
//!
//! Both drain a [`ResponseStream`](crate::stream::ResponseStream) into wire
//! frames. [`pull`] fills caller-sized buffers on demand; [`push`] writes one
//! frame per completed write.

pub mod pull;
pub mod push;

pub use pull::{PullAdapter, PullChunk};
pub use push::{ChannelWriter, FrameWriter, HostEvent, PushAdapter, PushOutcome, PushStep};
