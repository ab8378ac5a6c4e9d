//! Track Animator - Orchestrates the animation engines with an injected clock.
//!
//! This is the integration layer between the pure engines (centerline,
//! car_store, projection) and the environment abstraction
//! ([`AnimationContext`]). The host owns the periodic loop; the animator
//! owns the lifecycle:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    TrackAnimator                       │
//! │  ┌──────────────────────────────────────────────────┐  │
//! │  │          Context: AnimationContext               │  │
//! │  │  • now_ms() → timestamps for ingest and ticks    │  │
//! │  └──────────────────────────────────────────────────┘  │
//! │                         │                              │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────────┐    │
//! │  │ CENTERLINE │  │  CAR STORE │  │   PROJECTION   │    │
//! │  └────────────┘  └────────────┘  └────────────────┘    │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! The animator is single-threaded by contract: ingest and tick must be
//! invoked from the same logical thread (e.g. one `select!` loop), which is
//! what makes the lock-free shared store safe.

use crate::car_store::{CarStore, StoreConfig};
use crate::centerline::{Centerline, TrackData};
use crate::projection::CarData;
use crate::telemetry::{CarId, TelemetrySample};
use std::sync::Arc;
use std::time::Duration;
use trackmap_env::AnimationContext;
use tracing::{info, warn};

/// Configuration for a track animator.
#[derive(Debug, Clone)]
pub struct AnimatorConfig {
    /// Animator's logical name (for logging)
    pub name: String,

    /// Tick rate in Hz (default: 60)
    pub tick_rate_hz: u32,

    /// Transition window per retarget in milliseconds (default: 200)
    pub transition_window_ms: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            name: "trackmap-animator".to_string(),
            tick_rate_hz: 60,
            transition_window_ms: crate::car_store::TRANSITION_WINDOW_MS,
        }
    }
}

/// Drives car animation for one track view.
///
/// Generic over the context so the same animator runs against the host
/// clock in production and a virtual clock in replay and tests.
pub struct TrackAnimator<Ctx>
where
    Ctx: AnimationContext,
{
    /// Environment context (the injected tick source's clock)
    pub context: Arc<Ctx>,

    /// Configuration
    pub config: AnimatorConfig,

    /// Car interpolation store
    store: CarStore,

    /// Name of the loaded track, if any
    track_name: Option<String>,

    /// Whether the scheduler is enabled
    running: bool,

    /// Ticks performed since creation
    tick_count: u64,
}

impl<Ctx> TrackAnimator<Ctx>
where
    Ctx: AnimationContext,
{
    /// Creates a new animator with no track loaded and the scheduler stopped.
    pub fn new(context: Arc<Ctx>, config: AnimatorConfig) -> Self {
        let store = CarStore::new(StoreConfig {
            transition_window_ms: config.transition_window_ms,
        });

        Self {
            context,
            config,
            store,
            track_name: None,
            running: false,
            tick_count: 0,
        }
    }

    // ========================================================================
    // TRACK LIFECYCLE
    // ========================================================================

    /// Installs a new track.
    ///
    /// Cars from the previous track are explicitly destroyed - positions
    /// resolved against another centerline carry no meaning here.
    pub fn load_track(&mut self, data: TrackData) {
        info!(
            animator = %self.config.name,
            track = %data.track,
            track_id = %data.track_id,
            points = data.centerline.len(),
            length = data.total_length,
            "loading track"
        );

        self.store.clear();
        self.track_name = Some(data.track.clone());
        self.store.set_centerline(Centerline::from(data));
    }

    /// Returns the loaded track's name.
    pub fn track_name(&self) -> Option<&str> {
        self.track_name.as_deref()
    }

    // ========================================================================
    // SCHEDULER LIFECYCLE
    // ========================================================================

    /// Enables the scheduler. Ticks before `start()` are no-ops, which is
    /// how a host parks the animator while the track is still loading.
    pub fn start(&mut self) {
        if !self.running {
            info!(animator = %self.config.name, "scheduler started");
        }
        self.running = true;
    }

    /// Disables the scheduler. The host's loop observes this and drops its
    /// timer; a stopped animator freezes cars where they are.
    pub fn stop(&mut self) {
        if self.running {
            info!(animator = %self.config.name, "scheduler stopped");
        }
        self.running = false;
    }

    /// Returns true while the scheduler is enabled.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The host loop's nominal sleep between ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.config.tick_rate_hz.max(1) as f64)
    }

    // ========================================================================
    // INGEST & TICK
    // ========================================================================

    /// Feeds one telemetry sample into the store at the context's current
    /// time.
    ///
    /// Rejected samples are logged and swallowed; a malformed sample must
    /// not take down the animation loop for every other car.
    pub fn ingest(&mut self, sample: &TelemetrySample) {
        let now_ms = self.context.now_ms();
        if let Err(error) = self.store.ingest(sample, now_ms) {
            warn!(
                animator = %self.config.name,
                car = %sample.id,
                %error,
                "dropping telemetry sample"
            );
        }
    }

    /// Advances every car to the context's current time.
    ///
    /// No-op unless the scheduler is running and a track is loaded.
    /// Returns the tick count.
    pub fn tick(&mut self) -> u64 {
        if !self.running || !self.store.track_loaded() {
            return self.tick_count;
        }

        self.tick_count += 1;
        self.store.advance(self.context.now_ms());
        self.tick_count
    }

    /// Returns the current tick count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ========================================================================
    // OUTPUT & ACCESSORS
    // ========================================================================

    /// Projects all cars into pixel space for the rendering layer.
    pub fn cars_data(&self, width: f64, height: f64, selected: Option<&CarId>) -> Vec<CarData> {
        self.store.cars_data(width, height, selected)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &CarStore {
        &self.store
    }

    /// Destroys all cars.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centerline::TrackPoint;
    use crate::telemetry::TelemetrySample;
    use trackmap_env::ManualContext;

    fn test_track() -> TrackData {
        TrackData {
            track: "Test Ring".to_string(),
            track_id: "test-ring".to_string(),
            total_length: 100.0,
            centerline: vec![
                TrackPoint::new(0.0, 0.0, 0.0),
                TrackPoint::new(100.0, 1.0, 0.0),
            ],
        }
    }

    fn animator() -> (Arc<ManualContext>, TrackAnimator<ManualContext>) {
        let ctx = ManualContext::shared();
        let animator = TrackAnimator::new(ctx.clone(), AnimatorConfig::default());
        (ctx, animator)
    }

    #[test]
    fn test_animator_config_default() {
        let config = AnimatorConfig::default();
        assert_eq!(config.tick_rate_hz, 60);
        assert_eq!(config.transition_window_ms, 200.0);
    }

    #[test]
    fn test_tick_is_noop_until_started_and_loaded() {
        let (_ctx, mut animator) = animator();

        assert_eq!(animator.tick(), 0);

        animator.start();
        // Still no track loaded
        assert_eq!(animator.tick(), 0);

        animator.load_track(test_track());
        assert_eq!(animator.tick(), 1);
        assert_eq!(animator.tick(), 2);

        animator.stop();
        assert_eq!(animator.tick(), 2);
    }

    #[test]
    fn test_ingest_and_tick_animate_car() {
        let (ctx, mut animator) = animator();
        animator.load_track(test_track());
        animator.start();

        animator.ingest(&TelemetrySample::new("44", Some(0), 0.0));
        ctx.advance(Duration::from_secs(1));
        animator.tick();

        animator.ingest(&TelemetrySample::new("44", Some(0), 50.0));
        ctx.advance(Duration::from_millis(100));
        animator.tick();

        let data = animator.cars_data(1000.0, 600.0, None);
        assert_eq!(data.len(), 1);
        assert!(data[0].x > 0.0 && data[0].x < 500.0);

        ctx.advance(Duration::from_millis(150));
        animator.tick();
        let data = animator.cars_data(1000.0, 600.0, None);
        assert_eq!(data[0].x, 500.0);
    }

    #[test]
    fn test_malformed_sample_does_not_halt_animation() {
        let (ctx, mut animator) = animator();
        animator.load_track(test_track());
        animator.start();

        animator.ingest(&TelemetrySample::new("44", Some(0), 25.0));
        // Malformed: swallowed with a warning, no panic
        animator.ingest(&TelemetrySample::new("", Some(0), 10.0));
        animator.ingest(&TelemetrySample::new("16", Some(0), f64::NAN));

        ctx.advance(Duration::from_millis(100));
        animator.tick();

        assert_eq!(animator.store().len(), 1);
    }

    #[test]
    fn test_ingest_before_track_load_is_noop() {
        let (_ctx, mut animator) = animator();
        animator.start();

        animator.ingest(&TelemetrySample::new("44", Some(0), 25.0));
        assert!(animator.store().is_empty());
    }

    #[test]
    fn test_load_track_destroys_previous_cars() {
        let (_ctx, mut animator) = animator();
        animator.load_track(test_track());
        animator.start();

        animator.ingest(&TelemetrySample::new("44", Some(0), 25.0));
        assert_eq!(animator.store().len(), 1);

        animator.load_track(test_track());
        assert!(animator.store().is_empty());
        assert_eq!(animator.track_name(), Some("Test Ring"));
    }

    #[test]
    fn test_tick_interval_from_rate() {
        let (_ctx, mut animator) = animator();
        animator.config.tick_rate_hz = 50;
        assert_eq!(animator.tick_interval(), Duration::from_millis(20));
    }
}
