//! Per-process frontend context: backends, identity and clock.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tapeflow_catalogue::{Catalogue, Scheduler, SchedulerDatabase};
use tapeflow_protocol::defaults::{DEFAULT_INSTANCE_NAME, UNKNOWN_SCHEDULER_BACKEND};
use tracing::warn;

/// Source of "now" in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Everything a command needs besides its query.
#[derive(Clone)]
pub struct FrontendContext {
    pub catalogue: Arc<dyn Catalogue>,
    pub scheduler: Arc<dyn Scheduler>,
    pub scheduler_db: Arc<dyn SchedulerDatabase>,
    pub instance_name: String,
    /// Backend this frontend serves; drive listings are filtered on it.
    pub scheduler_backend_name: String,
    pub server_version: String,
    pub clock: Arc<dyn Clock>,
}

impl FrontendContext {
    pub fn new(
        catalogue: Arc<dyn Catalogue>,
        scheduler: Arc<dyn Scheduler>,
        scheduler_db: Arc<dyn SchedulerDatabase>,
    ) -> Self {
        let scheduler_backend_name = scheduler.get_scheduler_backend_name().unwrap_or_else(|| {
            warn!("Scheduler reports no backend name, using '{}'", UNKNOWN_SCHEDULER_BACKEND);
            UNKNOWN_SCHEDULER_BACKEND.to_string()
        });
        Self {
            catalogue,
            scheduler,
            scheduler_db,
            instance_name: DEFAULT_INSTANCE_NAME.to_string(),
            scheduler_backend_name,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Context over one backend implementing all three read seams.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: Catalogue + Scheduler + SchedulerDatabase + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend)
    }

    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = name.into();
        self
    }

    pub fn with_backend_name(mut self, name: impl Into<String>) -> Self {
        self.scheduler_backend_name = name.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapeflow_catalogue::{CatalogueState, MemoryBackend};

    #[test]
    fn test_backend_name_from_scheduler() {
        let backend = Arc::new(MemoryBackend::new(CatalogueState {
            scheduler_backend_name: Some("ceph-a".to_string()),
            ..Default::default()
        }));
        let ctx = FrontendContext::from_backend(backend);
        assert_eq!(ctx.scheduler_backend_name, "ceph-a");
    }

    #[test]
    fn test_backend_name_falls_back_to_unknown() {
        let ctx = FrontendContext::from_backend(Arc::new(MemoryBackend::default()));
        assert_eq!(ctx.scheduler_backend_name, UNKNOWN_SCHEDULER_BACKEND);

        let ctx = ctx.with_backend_name("ceph-b");
        assert_eq!(ctx.scheduler_backend_name, "ceph-b");
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        clock.advance(5);
        assert_eq!(clock.now(), 105);
        clock.set(7);
        assert_eq!(clock.now(), 7);
    }
}
