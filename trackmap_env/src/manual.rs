//! Virtual-clock context for deterministic tests and fast-forward replay.

use crate::AnimationContext;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replay context backed by an explicitly advanced virtual clock.
///
/// Time only moves when the driver calls [`ManualContext::advance`] (or
/// `sleep`, which advances instead of blocking), so a replay run is
/// bit-for-bit reproducible regardless of host load.
pub struct ManualContext {
    /// Current virtual time (nanoseconds since context creation)
    virtual_time_ns: Arc<Mutex<u64>>,
}

impl ManualContext {
    /// Creates a new ManualContext at virtual time zero.
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Sets the virtual time to a specific value.
    pub fn set(&self, time: Duration) {
        let mut t = self.virtual_time_ns.lock().unwrap();
        *t = time.as_nanos() as u64;
    }
}

impl Default for ManualContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ManualContext {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
        }
    }
}

#[async_trait]
impl AnimationContext for ManualContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(*self.virtual_time_ns.lock().unwrap())
    }

    async fn sleep(&self, duration: Duration) {
        // In replay, sleeping is just advancing the virtual clock
        self.advance(duration);
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let _name = name.to_string();
        tokio::spawn(async move {
            future.await;
        });
    }
}
