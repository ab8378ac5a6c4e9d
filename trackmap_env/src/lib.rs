//! Trackmap Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the trackmap
//! animation engines to run against a **host clock** (tokio) or a
//! **virtual clock** (deterministic tests and fast-forward replay).
//!
//! # Core Concept: The Injected Tick Source
//!
//! The animation core never reads wall-clock time or owns a timer. Every
//! timestamp it sees comes from an [`AnimationContext`], so the same engine
//! code drives a live view (periodic `sleep`-paced ticks) and a replay that
//! fast-forwards hours of telemetry in milliseconds.
//!
//! # Example
//!
//! ```ignore
//! use trackmap_env::{AnimationContext, TokioContext};
//!
//! async fn animation_loop<Ctx: AnimationContext>(ctx: &Ctx) {
//!     loop {
//!         tokio::select! {
//!             sample = feed.recv() => ingest(sample),
//!             _ = ctx.sleep(Duration::from_millis(16)) => tick(),
//!         }
//!     }
//! }
//! ```

mod context;
mod manual;
mod tokio_impl;

pub use context::AnimationContext;
pub use manual::ManualContext;
pub use tokio_impl::TokioContext;
