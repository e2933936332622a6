//! Command-line demo for soundstage-core.
//!
//! Plays the built-in triangle-wave test signal through the default output
//! device while moving the virtual listener:
//!
//!   --sweep    listener sweeps left ↔ right across the room
//!   --orbit    listener circles the room centre at radius 1
//!   --spin     listener stands still and turns in place (default)
//!   --stdin    follow `x,y,yaw` CSV lines from stdin
//!   --stereo   use the 2-channel layout instead of 5.1

use anyhow::{Context, Result};
use soundstage_core::math::circular_point;
use soundstage_core::{
    ChannelLayout, Point, SoundstageDesc, SoundstageEngine, SoundstageWorld, TriangleWaveSource,
};
use std::io::BufRead;
use std::time::Duration;

/// Control cadence of the scripted motion modes.
const STEPS_PER_SEC: u64 = 100;
const RUN_SECONDS: u64 = 10;

enum Mode {
    Sweep,
    Orbit,
    Spin,
    Stdin,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut mode = Mode::Spin;
    let mut layout = ChannelLayout::five_one();
    for arg in &args[1..] {
        match arg.as_str() {
            "--sweep" => mode = Mode::Sweep,
            "--orbit" => mode = Mode::Orbit,
            "--spin" => mode = Mode::Spin,
            "--stdin" => mode = Mode::Stdin,
            "--stereo" => layout = ChannelLayout::stereo(),
            other => anyhow::bail!("unknown argument {}", other),
        }
    }

    let desc = SoundstageDesc {
        layout,
        ..Default::default()
    };
    let world = SoundstageWorld::new(desc.clone()).context("configuring world")?;
    let source = TriangleWaveSource::new(desc.sample_rate, desc.channels())
        .context("building test signal")?;
    let mut engine =
        SoundstageEngine::new(&world, Box::new(source)).context("constructing engine")?;
    engine.start().context("starting audio")?;

    match mode {
        Mode::Sweep => run_sweep(&world, &engine),
        Mode::Orbit => run_orbit(&world, &engine),
        Mode::Spin => run_spin(&world, &engine),
        Mode::Stdin => run_stdin(&world, &engine)?,
    }

    engine.stop().context("stopping audio")?;
    log::info!("Rendered {} frames", engine.frames_processed());
    Ok(())
}

fn drain_events(engine: &SoundstageEngine) {
    for event in engine.events().try_iter() {
        if event.is_error() {
            log::warn!("engine event: {:?}", event);
        } else {
            log::info!("engine event: {:?}", event);
        }
    }
}

fn log_gains(world: &SoundstageWorld, step: u64) {
    if step % STEPS_PER_SEC == 0 {
        let gains: Vec<String> = world
            .desc()
            .layout
            .roles()
            .iter()
            .zip(world.channel_gains())
            .map(|(role, gain)| format!("{} {:.2}", role, gain))
            .collect();
        log::info!("gains: {}", gains.join(", "));
    }
}

fn run_sweep(world: &SoundstageWorld, engine: &SoundstageEngine) {
    let total_steps = STEPS_PER_SEC * RUN_SECONDS;
    log::info!("Sweeping listener left to right for {}s", RUN_SECONDS);
    for step in 0..total_steps {
        let t = step as f32 / total_steps as f32;
        world.set_listener_position(Point::new(1.0 - t * 2.0, 0.0));
        log_gains(world, step);
        drain_events(engine);
        std::thread::sleep(Duration::from_millis(1000 / STEPS_PER_SEC));
    }
}

fn run_orbit(world: &SoundstageWorld, engine: &SoundstageEngine) {
    let total_steps = STEPS_PER_SEC * RUN_SECONDS;
    log::info!("Orbiting listener around the room centre for {}s", RUN_SECONDS);
    for step in 0..total_steps {
        let t = step as f32 / total_steps as f32;
        world.set_listener_position(circular_point(t, 1.0));
        log_gains(world, step);
        drain_events(engine);
        std::thread::sleep(Duration::from_millis(1000 / STEPS_PER_SEC));
    }
}

fn run_spin(world: &SoundstageWorld, engine: &SoundstageEngine) {
    let total_steps = STEPS_PER_SEC * RUN_SECONDS;
    log::info!("Spinning listener in place for {}s", RUN_SECONDS);
    for step in 0..total_steps {
        world.set_listener_yaw(step as f32 * 0.015);
        log_gains(world, step);
        drain_events(engine);
        std::thread::sleep(Duration::from_millis(1000 / STEPS_PER_SEC));
    }
}

/// Follows `x,y,yaw` lines (metres, metres, turn fraction) until stdin
/// closes. Malformed lines are skipped with a warning.
fn run_stdin(world: &SoundstageWorld, engine: &SoundstageEngine) -> Result<()> {
    log::info!("Following x,y,yaw lines from stdin");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let fields: Vec<&str> = line.trim().split(',').collect();
        let parsed: Option<(f32, f32, f32)> = match fields.as_slice() {
            [x, y, yaw] => x
                .trim()
                .parse()
                .ok()
                .zip(y.trim().parse().ok())
                .zip(yaw.trim().parse().ok())
                .map(|((x, y), yaw)| (x, y, yaw)),
            _ => None,
        };
        match parsed {
            Some((x, y, yaw)) => {
                world.set_listener_position(Point::new(x, y));
                world.set_listener_yaw(yaw);
            }
            None => log::warn!("skipping malformed line: {}", line),
        }
        drain_events(engine);
    }
    Ok(())
}
