//! Trackmap Replay CLI
//!
//! Replays a seeded synthetic race (or a real track file) through the
//! animation core and reports the final frame.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;
use trackmap_core::{AnimatorConfig, TrackAnimator, TrackData};
use trackmap_env::{AnimationContext, ManualContext, TokioContext};
use trackmap_sim::{synthetic_track, TelemetryFeed};

/// Trackmap deterministic replay CLI
#[derive(Parser, Debug)]
#[command(name = "trackmap-sim")]
#[command(about = "Replay synthetic race telemetry through the animation core", long_about = None)]
struct Args {
    /// Master seed for the telemetry feed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of cars on the grid
    #[arg(short, long, default_value = "8")]
    cars: usize,

    /// Simulated duration in seconds
    #[arg(short, long, default_value = "60")]
    duration: f64,

    /// Scheduler tick rate in Hz
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Mean per-car telemetry interval in milliseconds
    #[arg(long, default_value = "250")]
    sample_interval: f64,

    /// Load a TrackData JSON file instead of the synthetic oval
    #[arg(long)]
    track: Option<String>,

    /// Run against the host clock instead of fast-forwarding
    #[arg(long)]
    realtime: bool,

    /// Inject occasional malformed samples
    #[arg(long)]
    chaos: bool,

    /// View width in pixels for the final frame
    #[arg(long, default_value = "1000")]
    width: f64,

    /// View height in pixels for the final frame
    #[arg(long, default_value = "600")]
    height: f64,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_track(args: &Args) -> anyhow::Result<TrackData> {
    match &args.track {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading track file {path}"))?;
            TrackData::from_json(&json).with_context(|| format!("parsing track file {path}"))
        }
        None => Ok(synthetic_track(240, 5800.0)),
    }
}

fn build_feed(args: &Args, track_length: f64) -> TelemetryFeed {
    let mut feed = TelemetryFeed::new(args.seed, track_length);
    feed.set_sample_interval(args.sample_interval);
    feed.set_chaos(args.chaos);
    // ~75 m/s leaders, staggered down the grid
    feed.spawn_grid(args.cars, 75.0);
    feed
}

fn animator_config(args: &Args) -> AnimatorConfig {
    AnimatorConfig {
        name: "trackmap-sim".to_string(),
        tick_rate_hz: args.tick_rate,
        ..AnimatorConfig::default()
    }
}

/// Fast-forward replay on the virtual clock. Deterministic: the same seed
/// and arguments always produce the same final frame.
fn run_fast(args: &Args, track: TrackData) -> TrackAnimator<ManualContext> {
    let ctx = ManualContext::shared();
    let mut animator = TrackAnimator::new(ctx.clone(), animator_config(args));
    let mut feed = build_feed(args, track.total_length);

    animator.load_track(track);
    animator.start();

    let dt_ms = 1000.0 / args.tick_rate as f64;
    let total_ticks = (args.duration * args.tick_rate as f64) as u64;

    for tick in 0..total_ticks {
        for sample in feed.step(dt_ms) {
            animator.ingest(&sample);
        }
        ctx.advance(Duration::from_secs_f64(dt_ms / 1000.0));
        animator.tick();

        if tick % (args.tick_rate as u64 * 10) == 0 {
            debug!(
                "  t={:.0}s | cars={} | laps={}",
                feed.time_ms() / 1000.0,
                animator.store().len(),
                feed.total_laps()
            );
        }
    }

    animator.stop();
    animator
}

/// Realtime replay: the feed runs as a background task, the animator loop
/// multiplexes ingest and ticks cooperatively on one task. Breaking out of
/// the loop on stop releases the tick timer.
async fn run_realtime(args: &Args, track: TrackData) -> TrackAnimator<TokioContext> {
    let ctx = TokioContext::shared();
    let mut animator = TrackAnimator::new(ctx.clone(), animator_config(args));
    let mut feed = build_feed(args, track.total_length);

    animator.load_track(track);
    animator.start();

    let (tx, mut rx) = mpsc::channel(64);
    let feed_ctx = ctx.clone();
    const FEED_STEP_MS: f64 = 20.0;
    ctx.spawn("telemetry-feed", async move {
        loop {
            for sample in feed.step(FEED_STEP_MS) {
                if tx.send(sample).await.is_err() {
                    return; // animator gone, feed shuts down
                }
            }
            feed_ctx.sleep(Duration::from_millis(FEED_STEP_MS as u64)).await;
        }
    });

    let tick_interval = animator.tick_interval();
    let deadline = Duration::from_secs_f64(args.duration);

    loop {
        tokio::select! {
            Some(sample) = rx.recv() => {
                animator.ingest(&sample);
            }
            _ = ctx.sleep(tick_interval) => {
                animator.tick();
                if ctx.now() >= deadline {
                    animator.stop();
                    break;
                }
            }
        }
    }

    animator
}

fn report<Ctx: AnimationContext>(args: &Args, animator: &TrackAnimator<Ctx>) {
    let frame = animator.cars_data(args.width, args.height, None);
    let settled = animator
        .store()
        .cars()
        .filter(|car| car.is_settled())
        .count();

    if args.json {
        let summary = serde_json::json!({
            "seed": args.seed,
            "track": animator.track_name(),
            "ticks": animator.tick_count(),
            "cars": frame.len(),
            "settled": settled,
            "frame": frame,
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
        return;
    }

    info!(
        "replay finished: {} ticks, {} cars ({} settled)",
        animator.tick_count(),
        frame.len(),
        settled
    );
    for car in &frame {
        info!(
            "  #{:<4} px=({:7.1}, {:6.1}) heading={:6.1} lap={:?}",
            car.id.as_str(), car.x, car.y, car.heading, car.lap
        );
    }

    if args.verbose {
        // Demonstrate the inverse lookup: which centerline point sits under
        // the view center?
        let hit = animator
            .store()
            .centerline()
            .nearest_point(args.width / 2.0, args.height / 2.0, args.width, args.height);
        info!(
            "nearest centerline point to view center: index={} m={:.1} ({:.1}px away)",
            hit.index, hit.point.m, hit.distance
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let track = load_track(&args)?;
    info!(
        "replaying {} cars on '{}' for {}s (seed={}, {})",
        args.cars,
        track.track,
        args.duration,
        args.seed,
        if args.realtime { "realtime" } else { "fast-forward" }
    );

    if args.realtime {
        let animator = run_realtime(&args, track).await;
        report(&args, &animator);
    } else {
        let animator = run_fast(&args, track);
        report(&args, &animator);
    }

    Ok(())
}
