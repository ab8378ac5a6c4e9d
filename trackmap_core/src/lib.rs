//! Trackmap Core - Centerline Geometry & Telemetry-Driven Car Animation
//!
//! This library turns sparse, asynchronously arriving distance-along-track
//! telemetry into smooth, continuously animated 2D positions:
//! 1. **Distance Resolver**: arc-length → coordinate lookup with multi-lap
//!    wraparound (`centerline`)
//! 2. **Interpolation Store**: per-car current/target state advanced by a
//!    host-driven scheduler tick (`car_store`)
//! 3. **Nearest-Point Query**: pixel-space inverse lookup for hit-testing
//!    on the track (`centerline`)

pub mod animator;
pub mod car_store;
pub mod centerline;
pub mod interpolation;
pub mod projection;
pub mod telemetry;

// Re-export key types for convenience
pub use animator::{AnimatorConfig, TrackAnimator};
pub use car_store::{CarState, CarStore, StoreConfig};
pub use centerline::{Centerline, NearestPoint, ResolvedPoint, TrackData, TrackPoint};
pub use projection::CarData;
pub use telemetry::{CarId, TelemetryError, TelemetrySample};
