use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use quantum_splash::{ManualScheduler, PointerEvent, Splash, SplashConfig};

/// Steps the splash without a window, sweeping a fake cursor across it, and
/// logs per-frame cost.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 1280)]
    width: usize,
    #[arg(long, default_value_t = 720)]
    height: usize,
    #[arg(long, default_value_t = 600)]
    frames: u32,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    quantum_splash::init_logging();
    let args = Args::parse();

    let mut config = SplashConfig::load_or_default(args.config.as_deref());
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let scheduler = ManualScheduler::new();
    let mut splash = Splash::mount(config, args.width, args.height, scheduler.clone())
        .context("mounting splash")?;

    let (width, height) = (args.width as f32, args.height as f32);
    let mut busiest = 0usize;
    let mut total = Duration::ZERO;

    for frame in 0..args.frames {
        let progress = frame as f32 / args.frames.max(1) as f32;
        splash.handle_input(PointerEvent::MouseMove {
            x: width * progress,
            y: height / 2.0 + (progress * std::f32::consts::TAU).sin() * height / 4.0,
        });

        let handle = scheduler
            .take_pending()
            .context("splash stopped requesting frames")?;
        let start = Instant::now();
        splash.frame(handle, frame as f32 / 60.0);
        total += start.elapsed();

        let displaced = splash.field().particles.iter().filter(|p| p.displaced).count();
        busiest = busiest.max(displaced);
    }

    splash.handle_input(PointerEvent::MouseLeave);
    let frames = splash.frames_rendered().max(1);
    tracing::info!(
        frames = splash.frames_rendered(),
        particles = splash.field().len(),
        peak_displaced = busiest,
        trail = splash.trail().map_or(0, |t| t.len()),
        avg_frame_ms = total.as_secs_f64() * 1000.0 / frames as f64,
        "headless run complete"
    );

    splash.teardown();
    Ok(())
}
