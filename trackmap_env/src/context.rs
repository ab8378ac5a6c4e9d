//! Core environment context trait for trackmap engines.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the host's clock and task spawning so that the
/// animation engines can run in both production (tokio) and replay
/// (virtual clock) environments.
///
/// # Implementations
///
/// - **Production**: [`crate::TokioContext`] - wraps `Instant` and
///   `tokio::time`
/// - **Replay / tests**: [`crate::ManualContext`] - a virtual clock
///   advanced explicitly by the driver
///
/// # Determinism
///
/// All time observed by the engines flows through `now()`, so a replay
/// driver that advances a virtual clock in fixed steps reproduces the
/// exact same interpolation output on every run.
#[async_trait]
pub trait AnimationContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    fn now(&self) -> Duration;

    /// Returns the monotonic time in milliseconds.
    ///
    /// The interpolation store works in `f64` milliseconds (transition
    /// windows are ~200ms), so this is the unit handed to the engines.
    fn now_ms(&self) -> f64 {
        self.now().as_secs_f64() * 1000.0
    }

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`.
    /// In replay: advances the virtual clock.
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
