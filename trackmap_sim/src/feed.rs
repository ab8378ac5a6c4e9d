//! Synthetic telemetry feed for replay runs.
//!
//! The feed maintains the "true" race state - per-car distance, lap count,
//! tire wear - and emits [`TelemetrySample`]s on a jittered per-car
//! schedule, mimicking the bursty cadence of a live timing transport. All
//! randomness comes from one ChaCha8 seed, so a replay is reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use trackmap_core::{CarId, TelemetrySample, TrackData, TrackPoint};

/// Tire wear accumulated per completed lap.
const WEAR_PER_LAP: f64 = 0.04;

/// One simulated car in the feed.
#[derive(Debug, Clone)]
pub struct FeedCar {
    /// Car identifier emitted on every sample
    pub id: CarId,

    /// Completed laps
    pub lap: u32,

    /// Distance within the current lap
    pub lap_distance: f64,

    /// Mean speed in track units per second
    base_speed: f64,

    /// Accumulated tire wear [0, 1]
    tire_wear: f64,

    /// Milliseconds until this car's next sample is due
    next_sample_in_ms: f64,
}

/// Seeded generator of race telemetry.
pub struct TelemetryFeed {
    /// RNG for speed noise, interval jitter and chaos injection
    rng: ChaCha8Rng,

    /// All simulated cars
    cars: Vec<FeedCar>,

    /// Track length the lap counter wraps at
    track_length: f64,

    /// Mean milliseconds between samples per car
    sample_interval_ms: f64,

    /// Std-dev of the interval jitter in milliseconds
    interval_jitter_ms: f64,

    /// Relative std-dev of per-sample speed noise
    speed_noise: f64,

    /// When set, occasionally emits malformed samples
    chaos: bool,

    /// Current feed time (milliseconds)
    current_time_ms: f64,
}

impl TelemetryFeed {
    /// Creates a feed for a track of the given length.
    pub fn new(seed: u64, track_length: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            cars: Vec::new(),
            track_length,
            sample_interval_ms: 250.0,
            interval_jitter_ms: 60.0,
            speed_noise: 0.05,
            chaos: false,
            current_time_ms: 0.0,
        }
    }

    /// Sets the mean per-car sample interval.
    pub fn set_sample_interval(&mut self, interval_ms: f64) {
        self.sample_interval_ms = interval_ms.max(1.0);
    }

    /// Enables chaos mode: roughly one sample in fifty is malformed
    /// (NaN distance or blank id), exercising the ingest reject path.
    pub fn set_chaos(&mut self, enabled: bool) {
        self.chaos = enabled;
    }

    /// Adds one car with the given mean speed.
    pub fn spawn_car(&mut self, id: impl Into<CarId>, base_speed: f64) {
        // Stagger first samples so the field doesn't report in lockstep
        let first_in = self.rng.gen_range(0.0..self.sample_interval_ms);
        self.cars.push(FeedCar {
            id: id.into(),
            lap: 0,
            lap_distance: 0.0,
            base_speed,
            tire_wear: 0.0,
            next_sample_in_ms: first_in,
        });
    }

    /// Adds a field of `count` cars with slightly staggered speeds.
    pub fn spawn_grid(&mut self, count: usize, base_speed: f64) {
        for i in 0..count {
            let speed = base_speed * (1.0 - 0.01 * i as f64);
            self.spawn_car(format!("{}", i + 1).as_str(), speed);
        }
    }

    /// Returns the current feed time in milliseconds.
    pub fn time_ms(&self) -> f64 {
        self.current_time_ms
    }

    /// Returns the simulated cars.
    pub fn cars(&self) -> &[FeedCar] {
        &self.cars
    }

    /// Total completed laps across the field.
    pub fn total_laps(&self) -> u32 {
        self.cars.iter().map(|c| c.lap).sum()
    }

    /// Advances the race by `dt_ms` and returns the samples that came due.
    pub fn step(&mut self, dt_ms: f64) -> Vec<TelemetrySample> {
        self.current_time_ms += dt_ms;
        let mut due = Vec::new();

        let speed_noise = Normal::new(0.0, self.speed_noise).unwrap();
        let interval_jitter = Normal::new(0.0, self.interval_jitter_ms).unwrap();

        for i in 0..self.cars.len() {
            // True race state advances every step
            let speed = {
                let car = &self.cars[i];
                car.base_speed * (1.0 + speed_noise.sample(&mut self.rng))
            };
            let car = &mut self.cars[i];
            car.lap_distance += speed.max(0.0) * dt_ms / 1000.0;
            while car.lap_distance >= self.track_length && self.track_length > 0.0 {
                car.lap_distance -= self.track_length;
                car.lap += 1;
                car.tire_wear = (car.tire_wear + WEAR_PER_LAP).min(1.0);
            }

            // Samples only fire on the car's own jittered schedule
            car.next_sample_in_ms -= dt_ms;
            if car.next_sample_in_ms > 0.0 {
                continue;
            }

            let jitter = interval_jitter.sample(&mut self.rng);
            self.cars[i].next_sample_in_ms = (self.sample_interval_ms + jitter).max(5.0);

            let sample = self.build_sample(i, speed);
            due.push(sample);
        }

        due
    }

    fn build_sample(&mut self, index: usize, speed: f64) -> TelemetrySample {
        let car = &self.cars[index];

        if self.chaos && self.rng.gen_bool(0.02) {
            // Malformed on purpose: the ingest path must shrug this off
            return TelemetrySample::new(car.id.clone(), Some(car.lap), f64::NAN);
        }

        let progress = if self.track_length > 0.0 {
            car.lap_distance / self.track_length
        } else {
            0.0
        };

        let mut sample = TelemetrySample::new(car.id.clone(), Some(car.lap), car.lap_distance);
        sample.heading = Some((progress * 360.0).rem_euclid(360.0));
        sample.speed = Some(speed * 3.6); // report km/h-style numbers
        sample.tire_wear = Some(car.tire_wear);
        let base_temp = 90.0 + 40.0 * car.tire_wear;
        sample.tire_temp_fl = Some(base_temp + self.rng.gen_range(-3.0..3.0));
        sample.tire_temp_fr = Some(base_temp + self.rng.gen_range(-3.0..3.0));
        sample.tire_temp_rl = Some(base_temp + self.rng.gen_range(-3.0..3.0));
        sample.tire_temp_rr = Some(base_temp + self.rng.gen_range(-3.0..3.0));
        sample.predicted_laps_to_cliff = Some(((1.0 - car.tire_wear) / WEAR_PER_LAP).max(0.0));
        sample
    }
}

/// Builds a closed oval centerline with `points` samples and exact
/// cumulative arc-length scaled to `total_length`.
pub fn synthetic_track(points: usize, total_length: f64) -> TrackData {
    let points = points.max(3);

    // Ellipse in normalized view space
    let raw: Vec<(f64, f64)> = (0..=points)
        .map(|i| {
            let theta = i as f64 / points as f64 * std::f64::consts::TAU;
            (0.5 + 0.4 * theta.cos(), 0.5 + 0.35 * theta.sin())
        })
        .collect();

    // Cumulative polyline length, then scale so the last m is total_length
    let mut cumulative = vec![0.0];
    for pair in raw.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        cumulative.push(cumulative.last().unwrap() + len);
    }
    let raw_total = *cumulative.last().unwrap();
    let scale = if raw_total > 0.0 {
        total_length / raw_total
    } else {
        1.0
    };

    let centerline = raw
        .iter()
        .zip(&cumulative)
        .map(|(&(x, y), &m)| TrackPoint::new(m * scale, x, y))
        .collect();

    TrackData {
        track: "Synthetic Oval".to_string(),
        track_id: "synthetic-oval".to_string(),
        total_length,
        centerline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_deterministic_for_seed() {
        let mut feed1 = TelemetryFeed::new(42, 5000.0);
        let mut feed2 = TelemetryFeed::new(42, 5000.0);
        feed1.spawn_grid(4, 80.0);
        feed2.spawn_grid(4, 80.0);

        for _ in 0..200 {
            assert_eq!(feed1.step(16.0), feed2.step(16.0));
        }
    }

    #[test]
    fn test_feed_counts_laps() {
        let mut feed = TelemetryFeed::new(7, 100.0);
        feed.spawn_car("44", 50.0); // 2s per lap

        for _ in 0..500 {
            feed.step(16.0); // 8 simulated seconds total
        }

        let car = &feed.cars()[0];
        assert!(car.lap >= 3, "expected >=3 laps, got {}", car.lap);
        assert!(car.lap_distance >= 0.0 && car.lap_distance < 100.0);
    }

    #[test]
    fn test_feed_samples_carry_valid_state() {
        let mut feed = TelemetryFeed::new(1, 1000.0);
        feed.spawn_car("16", 60.0);

        let mut seen = 0;
        for _ in 0..1000 {
            for sample in feed.step(16.0) {
                seen += 1;
                assert!(sample.validate().is_ok());
                assert!(sample.lap_distance < 1000.0);
                assert!(sample.heading.unwrap() >= 0.0);
                assert!(sample.heading.unwrap() < 360.0);
            }
        }
        assert!(seen > 10, "feed should have emitted samples, got {seen}");
    }

    #[test]
    fn test_chaos_emits_rejectable_samples() {
        let mut feed = TelemetryFeed::new(3, 1000.0);
        feed.set_chaos(true);
        feed.set_sample_interval(10.0);
        feed.spawn_grid(8, 70.0);

        let mut rejected = 0;
        for _ in 0..2000 {
            for sample in feed.step(16.0) {
                if sample.validate().is_err() {
                    rejected += 1;
                }
            }
        }
        assert!(rejected > 0, "chaos mode should produce malformed samples");
    }

    #[test]
    fn test_synthetic_track_arc_length() {
        let data = synthetic_track(240, 5800.0);

        assert_eq!(data.centerline.first().unwrap().m, 0.0);
        let last = data.centerline.last().unwrap();
        assert!((last.m - 5800.0).abs() < 1e-9);

        // Closed loop: last point coincides with the first
        let first = data.centerline.first().unwrap();
        assert!((first.x - last.x).abs() < 1e-12);
        assert!((first.y - last.y).abs() < 1e-12);

        // Monotone non-decreasing m
        for pair in data.centerline.windows(2) {
            assert!(pair[1].m >= pair[0].m);
        }
    }
}
