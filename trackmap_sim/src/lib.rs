//! Trackmap Replay Harness
//!
//! Drives the animation core with a seeded synthetic telemetry feed, either
//! fast-forwarded on a virtual clock (deterministic: the same seed always
//! produces the same final frame) or in realtime against the host clock.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      trackmap-sim                    │
//! │  ┌────────────────┐        ┌──────────────────────┐  │
//! │  │ TelemetryFeed  │ ─────► │    TrackAnimator     │  │
//! │  │ (seeded RNG,   │ samples│  (ManualContext or   │  │
//! │  │  lap counting) │        │   TokioContext)      │  │
//! │  └────────────────┘        └──────────────────────┘  │
//! │                                  │ cars_data()       │
//! │                                  ▼                   │
//! │                          JSON / log summary          │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod feed;

pub use feed::{synthetic_track, TelemetryFeed};
