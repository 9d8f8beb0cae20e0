//! Headless renderer: runs a preset or config file and writes PNG frames.

use anyhow::{bail, Context, Result};
use clap::Parser;
use reverie::config::PRESET_NAMES;
use reverie::{EngineConfig, RasterSurface, ShapeSource, Simulation};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reverie", version, about = "Render romantic particle effects to PNG frames")]
struct Cli {
    /// Built-in preset to run
    #[arg(short, long, conflicts_with = "config")]
    preset: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text for the target shape
    #[arg(short, long)]
    text: Option<String>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Number of frames to simulate
    #[arg(short = 'n', long, default_value_t = 300)]
    frames: u32,

    /// Write every Nth frame (0 writes only the last one)
    #[arg(short, long, default_value_t = 30)]
    every: u32,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short, long, default_value = "frames")]
    out: PathBuf,

    /// Write the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,

    /// List presets and exit
    #[arg(long)]
    list: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = verbosity(cli.verbose) {
        logger.filter_level(level);
    }
    logger.init();

    if cli.list {
        for name in PRESET_NAMES {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = build_config(&cli)?;

    if let Some(path) = &cli.dump_config {
        config
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    run(&cli, config)
}

/// `-v` count to a log level; `None` leaves `RUST_LOG` in charge.
fn verbosity(count: u8) -> Option<log::LevelFilter> {
    match count {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn build_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match (&cli.config, &cli.preset) {
        (Some(path), _) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        (None, Some(name)) => match EngineConfig::preset(name) {
            Some(config) => config,
            None => bail!(
                "Unknown preset '{}'. Available: {}",
                name,
                PRESET_NAMES.join(", ")
            ),
        },
        (None, None) => EngineConfig::text_fireworks("LOVE"),
    };

    if let Some(text) = &cli.text {
        if config.shape != ShapeSource::Text {
            log::warn!("--text given but '{}' does not assemble text", config.name);
        }
        config.text.text = text.clone();
    }
    if let Some(width) = cli.width {
        config.canvas.width = width;
    }
    if let Some(height) = cli.height {
        config.canvas.height = height;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(cli: &Cli, config: EngineConfig) -> Result<()> {
    fs::create_dir_all(&cli.out)
        .with_context(|| format!("Failed to create {}", cli.out.display()))?;

    let canvas = config.canvas;
    let mut surface = RasterSurface::new(canvas.width, canvas.height, config.visuals.background);
    let mut sim = Simulation::new(config)?;

    let mut written = 0;
    for frame in 1..=cli.frames {
        sim.frame(&mut surface);

        let due = if cli.every == 0 {
            frame == cli.frames
        } else {
            frame % cli.every == 0
        };
        if !due {
            continue;
        }

        let path = cli.out.join(format!("frame_{:05}.png", frame));
        surface
            .save_png(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written += 1;
        log::info!(
            "frame {}: {} live particles -> {}",
            frame,
            sim.pool().live_count(),
            path.display()
        );
    }

    println!(
        "Wrote {} frame(s) of '{}' to {} ({} live particles at the end)",
        written,
        sim.config().name,
        cli.out.display(),
        sim.pool().live_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(verbosity(0), None);
        assert_eq!(verbosity(1), Some(log::LevelFilter::Info));
        assert_eq!(verbosity(2), Some(log::LevelFilter::Debug));
        assert_eq!(verbosity(7), Some(log::LevelFilter::Trace));
    }

    #[test]
    fn test_cli_counts_verbose_flags() {
        let cli = Cli::parse_from(["reverie", "-vv", "--preset", "floating_hearts"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(verbosity(cli.verbose), Some(log::LevelFilter::Debug));
    }
}
