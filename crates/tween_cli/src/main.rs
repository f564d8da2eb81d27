//! Tween CLI - developer tool for the tween animation engine
//!
//! Provides:
//! - `tween ease`: tabulate an easing curve
//! - `tween simulate`: run one tween against a synthetic clock and print
//!   every applied value

mod config;
mod simulate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tween_animation::{CubicBezier, Easing, PropertyTag};

use crate::config::CliConfig;
use crate::simulate::{Sample, Simulation};

/// Tabulate easing curves and simulate tweens
#[derive(Parser, Debug)]
#[command(name = "tween")]
#[command(about = "Tabulate easing curves and simulate tweens")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print t -> ease(t) for a named curve, or `bezier` with --bezier
    Ease(EaseArgs),
    /// Run a scalar tween on a synthetic clock
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct EaseArgs {
    /// Curve name (e.g. `in-out-cubic`, `easeOutBounce`) or `bezier`
    easing: String,

    /// Control points `x1,y1,x2,y2` for `bezier`
    #[arg(long, value_parser = parse_bezier)]
    bezier: Option<CubicBezier>,

    /// Number of evenly spaced samples, endpoints included
    #[arg(short, long, default_value = "11")]
    samples: usize,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Start value
    #[arg(long, allow_negative_numbers = true)]
    from: f32,

    /// End value
    #[arg(long, allow_negative_numbers = true)]
    to: f32,

    /// Duration in seconds
    #[arg(long)]
    duration: f64,

    /// Delay in seconds before the tween starts moving
    #[arg(long, default_value = "0")]
    delay: f64,

    /// Curve name
    #[arg(long, default_value = "linear")]
    easing: String,

    /// Property to animate (camelCase name, scalar properties only)
    #[arg(long, default_value = "opacity")]
    property: String,

    /// Pause the tween at this time (seconds)
    #[arg(long, requires = "pause_for")]
    pause_at: Option<f64>,

    /// How long to stay paused (seconds)
    #[arg(long, requires = "pause_at")]
    pause_for: Option<f64>,

    /// Frames per second, overriding the config file
    #[arg(long)]
    fps: Option<u32>,

    /// Config file (defaults to ./tween.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Ease(args) => cmd_ease(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_ease(args: EaseArgs) -> Result<()> {
    let easing = if args.easing.eq_ignore_ascii_case("bezier") {
        let curve = args
            .bezier
            .context("`bezier` requires --bezier x1,y1,x2,y2")?;
        Easing::CubicBezier(curve)
    } else {
        args.easing.parse::<Easing>()?
    };
    if args.samples < 2 {
        anyhow::bail!("--samples must be at least 2");
    }

    info!(%easing, samples = args.samples, "tabulating easing");
    println!("{easing}");
    for i in 0..args.samples {
        let t = i as f32 / (args.samples - 1) as f32;
        let value = tween_animation::ease(t, easing)?;
        println!("{t:>6.3}  {value:>9.5}  {}", bar(value));
    }
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> Result<()> {
    let config = CliConfig::discover(args.config.as_deref())?;
    let fps = args.fps.unwrap_or(config.simulation.fps);
    if fps == 0 {
        anyhow::bail!("--fps must be greater than zero");
    }

    let simulation = Simulation {
        property: args.property.parse::<PropertyTag>()?,
        from: args.from,
        to: args.to,
        duration: args.duration,
        delay: args.delay,
        easing: args.easing.parse::<Easing>()?,
        pause: args.pause_at.zip(args.pause_for),
        fps,
    };

    for sample in simulation.run(config.engine)? {
        match sample {
            Sample::Value {
                time,
                value,
                progress,
            } => println!("{time:>8.3}s  {value:>12.4}  ({progress:.3})"),
            Sample::Paused { time } => println!("{time:>8.3}s  paused"),
            Sample::Resumed { time } => println!("{time:>8.3}s  resumed"),
            Sample::Completed { time } => println!("{time:>8.3}s  completed"),
        }
    }
    Ok(())
}

fn parse_bezier(s: &str) -> Result<CubicBezier, String> {
    let points: Vec<f32> = s
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("invalid control point: {e}"))?;
    let [x1, y1, x2, y2] = points[..] else {
        return Err(format!("expected 4 control points, got {}", points.len()));
    };
    CubicBezier::new(x1, y1, x2, y2).map_err(|e| e.to_string())
}

/// A 40-column bar; overshoot beyond [0, 1] is clipped
fn bar(value: f32) -> String {
    let width = (value.clamp(0.0, 1.0) * 40.0).round() as usize;
    "#".repeat(width)
}
