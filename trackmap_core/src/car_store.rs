//! The "ANIMATION" Engine - Per-Car Interpolation Store & Scheduler
//!
//! Turns sparse telemetry into smooth motion using a current/target state
//! pair per car:
//! - Ingest resolves a sample to a coordinate and writes only the target
//!   side, so an in-flight transition is redirected, never restarted.
//! - The scheduler tick advances the current side toward the target over a
//!   fixed transition window, then settles.
//!
//! All timestamps are `f64` milliseconds from the host-injected monotonic
//! clock; the store itself never reads time.

use crate::centerline::{Centerline, ResolvedPoint};
use crate::interpolation::{lerp, lerp_angle};
use crate::projection::{self, CarData};
use crate::telemetry::{CarId, TelemetryError, TelemetrySample};
use std::collections::HashMap;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Duration of one ingest-to-settled transition, in milliseconds.
pub const TRANSITION_WINDOW_MS: f64 = 200.0;

/// Configuration for the CarStore.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Transition window applied to every retarget (default: 200ms)
    pub transition_window_ms: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            transition_window_ms: TRANSITION_WINDOW_MS,
        }
    }
}

// ============================================================================
// CAR STATE
// ============================================================================

/// Per-car animation record.
///
/// Field ownership is split three ways:
/// - `x`, `y`, `heading`, `timestamp`: written only by the scheduler tick
/// - `target_*`: written only by ingest
/// - passthrough telemetry: written only by ingest, last-write-wins
#[derive(Debug, Clone, PartialEq)]
pub struct CarState {
    /// Car identifier
    pub id: CarId,

    // === Current (scheduler-owned) ===
    /// Rendered x position, normalized [0, 1]
    pub x: f64,
    /// Rendered y position, normalized [0, 1]
    pub y: f64,
    /// Rendered heading in degrees
    pub heading: f64,
    /// Time of the last scheduler update (ms)
    pub timestamp: f64,

    // === Target (ingest-owned) ===
    pub target_x: f64,
    pub target_y: f64,
    pub target_heading: f64,
    /// Deadline by which current must reach target (ms)
    pub target_timestamp: f64,

    // === Passthrough telemetry (ingest-owned, no smoothing) ===
    pub lap: Option<u32>,
    pub speed: Option<f64>,
    pub tire_wear: Option<f64>,
    pub tire_temp_fl: Option<f64>,
    pub tire_temp_fr: Option<f64>,
    pub tire_temp_rl: Option<f64>,
    pub tire_temp_rr: Option<f64>,
    pub predicted_laps_to_cliff: Option<f64>,
}

impl CarState {
    /// Creates a car from its first sample: current equals target, so the
    /// car appears at the resolved point with no initial transition.
    fn from_sample(sample: &TelemetrySample, resolved: &ResolvedPoint, now_ms: f64) -> Self {
        let heading = sample.heading.unwrap_or(0.0);
        let mut car = Self {
            id: sample.id.clone(),
            x: resolved.x,
            y: resolved.y,
            heading,
            timestamp: now_ms,
            target_x: resolved.x,
            target_y: resolved.y,
            target_heading: heading,
            target_timestamp: now_ms,
            lap: None,
            speed: None,
            tire_wear: None,
            tire_temp_fl: None,
            tire_temp_fr: None,
            tire_temp_rl: None,
            tire_temp_rr: None,
            predicted_laps_to_cliff: None,
        };
        car.apply_passthrough(sample);
        car
    }

    /// Redirects the car toward a new target without touching the current
    /// side, so interpolation resumes from wherever the car visually is.
    fn retarget(
        &mut self,
        sample: &TelemetrySample,
        resolved: &ResolvedPoint,
        deadline_ms: f64,
    ) {
        self.target_x = resolved.x;
        self.target_y = resolved.y;
        // A sample without heading holds the car at its present bearing
        self.target_heading = sample.heading.unwrap_or(self.heading);
        self.target_timestamp = deadline_ms;
        self.apply_passthrough(sample);
    }

    /// Overwrites every passthrough field wholesale. Last write wins; there
    /// is no smoothing or staleness check on these.
    fn apply_passthrough(&mut self, sample: &TelemetrySample) {
        self.lap = sample.lap;
        self.speed = sample.speed;
        self.tire_wear = sample.tire_wear;
        self.tire_temp_fl = sample.tire_temp_fl;
        self.tire_temp_fr = sample.tire_temp_fr;
        self.tire_temp_rl = sample.tire_temp_rl;
        self.tire_temp_rr = sample.tire_temp_rr;
        self.predicted_laps_to_cliff = sample.predicted_laps_to_cliff;
    }

    /// Returns true once the rendered position has reached the target.
    pub fn is_settled(&self) -> bool {
        self.x == self.target_x && self.y == self.target_y && self.heading == self.target_heading
    }

    /// Advances the rendered position toward the target.
    ///
    /// Moving `(now - timestamp) / (target_timestamp - timestamp)` of the
    /// remaining gap each call traces the exact linear path from the
    /// retarget point and lands on the target precisely at the deadline.
    /// Stamping `timestamp = now` in both branches makes repeated calls at
    /// the same instant no-ops, and the `time_delta > 0` guard keeps the
    /// division away from zero (no NaN on overshoot or equal timestamps).
    pub fn advance(&mut self, now_ms: f64) {
        let time_delta = self.target_timestamp - self.timestamp;

        if time_delta > 0.0 && now_ms < self.target_timestamp {
            let alpha = ((now_ms - self.timestamp) / time_delta).clamp(0.0, 1.0);
            self.x = lerp(self.x, self.target_x, alpha);
            self.y = lerp(self.y, self.target_y, alpha);
            self.heading = lerp_angle(self.heading, self.target_heading, alpha);
        } else {
            // Settled or overshot the deadline: snap and hold
            self.x = self.target_x;
            self.y = self.target_y;
            self.heading = self.target_heading;
        }

        self.timestamp = now_ms;
    }
}

// ============================================================================
// CAR STORE (The Engine)
// ============================================================================

/// The per-car interpolation store.
///
/// Exclusively owns every [`CarState`]. Ingest and the scheduler tick share
/// it through `&mut self` on one logical thread; neither operation suspends
/// mid-mutation, so no locking is needed (see the concurrency notes in
/// DESIGN.md before porting to a multi-threaded host).
#[derive(Debug, Default)]
pub struct CarStore {
    /// All known cars, keyed by their stable id
    cars: HashMap<CarId, CarState>,

    /// The loaded track centerline (empty until a track is installed)
    centerline: Centerline,

    /// Total track length, derived once at install time
    track_length: f64,

    /// Runtime configuration
    config: StoreConfig,
}

impl CarStore {
    /// Creates a store with the given configuration and no track loaded.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            cars: HashMap::new(),
            centerline: Centerline::default(),
            track_length: 0.0,
            config,
        }
    }

    /// Creates a store with the default 200ms transition window.
    pub fn with_defaults() -> Self {
        Self::new(StoreConfig::default())
    }

    // ========================================================================
    // TRACK LIFECYCLE
    // ========================================================================

    /// Installs a centerline and derives the track length from it.
    ///
    /// Existing cars are kept; destroying them is the caller's explicit
    /// decision via [`CarStore::clear`].
    pub fn set_centerline(&mut self, centerline: Centerline) {
        self.track_length = centerline.total_length();
        self.centerline = centerline;
    }

    /// Returns the installed centerline.
    pub fn centerline(&self) -> &Centerline {
        &self.centerline
    }

    /// Returns the derived total track length.
    pub fn track_length(&self) -> f64 {
        self.track_length
    }

    /// Returns true if no usable centerline is installed.
    pub fn track_loaded(&self) -> bool {
        !self.centerline.is_empty()
    }

    // ========================================================================
    // INGEST (Telemetry → Target)
    // ========================================================================

    /// Applies one telemetry sample at the given time.
    ///
    /// Unwraps the multi-lap position into an absolute distance, resolves
    /// it on the centerline, then either creates the car settled at that
    /// point (first sighting) or redirects its target (existing car). The
    /// most recent sample always wins; out-of-order samples are applied
    /// as-is and may move a target backward.
    ///
    /// Rejections ([`TelemetryError`]) leave the store untouched.
    pub fn ingest(&mut self, sample: &TelemetrySample, now_ms: f64) -> Result<(), TelemetryError> {
        sample.validate()?;

        if !self.track_loaded() {
            return Err(TelemetryError::TrackNotLoaded);
        }

        let lap = sample.lap.unwrap_or(0);
        let absolute = lap as f64 * self.track_length + sample.lap_distance;
        let resolved = self.centerline.point_at_distance(absolute);

        match self.cars.get_mut(&sample.id) {
            Some(car) => {
                let deadline = now_ms + self.config.transition_window_ms;
                car.retarget(sample, &resolved, deadline);
            }
            None => {
                let car = CarState::from_sample(sample, &resolved, now_ms);
                self.cars.insert(car.id.clone(), car);
            }
        }

        Ok(())
    }

    // ========================================================================
    // SCHEDULER (Target → Current)
    // ========================================================================

    /// Advances every car's rendered position to the given time.
    ///
    /// O(number of cars), synchronous, idempotent at a fixed `now_ms`.
    pub fn advance(&mut self, now_ms: f64) {
        for car in self.cars.values_mut() {
            car.advance(now_ms);
        }
    }

    // ========================================================================
    // PROJECTION (Read-Only Output)
    // ========================================================================

    /// Projects every car into pixel space for the rendering layer.
    ///
    /// Pure and read-only. Output is sorted by car id so consumers see a
    /// stable order frame over frame.
    pub fn cars_data(&self, width: f64, height: f64, selected: Option<&CarId>) -> Vec<CarData> {
        let mut data: Vec<CarData> = self
            .cars
            .values()
            .map(|car| projection::project(car, width, height, selected == Some(&car.id)))
            .collect();
        data.sort_by(|a, b| a.id.cmp(&b.id));
        data
    }

    // ========================================================================
    // ACCESSORS & LIFECYCLE
    // ========================================================================

    /// Returns a car by id.
    pub fn get(&self, id: &CarId) -> Option<&CarState> {
        self.cars.get(id)
    }

    /// Iterates over all cars.
    pub fn cars(&self) -> impl Iterator<Item = &CarState> {
        self.cars.values()
    }

    /// Number of cars currently tracked.
    pub fn len(&self) -> usize {
        self.cars.len()
    }

    /// Returns true if no cars are tracked.
    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Removes a single car, returning its last state.
    pub fn remove(&mut self, id: &CarId) -> Option<CarState> {
        self.cars.remove(id)
    }

    /// Destroys all cars. This is the only bulk destruction path; cars are
    /// never expired automatically.
    pub fn clear(&mut self) {
        self.cars.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================
