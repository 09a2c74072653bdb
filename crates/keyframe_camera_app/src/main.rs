// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe camera runner
//!
//! Drives saved camera sequences against a simulated camera:
//! - `list` shows the saved sequences
//! - `preview` plays one back frame by frame
//! - `demo` captures a sample orbit, saves it and plays it
//! - `init-config` writes the default settings file

mod runner;
mod sim_host;

use clap::{Parser, Subcommand};
use keyframe_camera_sequencer::{CameraSession, ManualClock, SequencerConfig, CONFIG_FILE_NAME};
use runner::{AppError, PreviewOptions, PreviewReport};
use sim_host::SimulatedCamera;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "keyframe_camera", version, about = "Keyframe camera sequencer")]
struct Cli {
    /// Settings file
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List saved sequences
    List,
    /// Play a saved sequence
    Preview {
        /// Sequence name, with or without extension
        name: String,
        #[command(flatten)]
        playback: PlaybackArgs,
    },
    /// Capture, save and play a sample sequence
    Demo {
        #[command(flatten)]
        playback: PlaybackArgs,
    },
    /// Write the default settings file
    InitConfig,
}

#[derive(Debug, clap::Args)]
struct PlaybackArgs {
    /// Simulated frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Upper bound on playback time
    #[arg(long, default_value_t = 60)]
    max_seconds: u64,
    /// Pace frames against the wall clock
    #[arg(long)]
    realtime: bool,
    /// Override the looping setting
    #[arg(long)]
    no_loop: bool,
}

impl PlaybackArgs {
    fn options(&self) -> PreviewOptions {
        PreviewOptions {
            fps: self.fps,
            max_seconds: self.max_seconds,
            realtime: self.realtime,
        }
    }
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,keyframe_camera_app=debug,keyframe_camera_sequencer=debug",
        )
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting keyframe camera v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    if let Command::InitConfig = cli.command {
        SequencerConfig::default().save(&cli.config)?;
        tracing::info!("Wrote {}", cli.config.display());
        return Ok(());
    }

    let config = SequencerConfig::load_or_default(&cli.config)?;
    let clock = ManualClock::new(0);
    let mut session = CameraSession::with_clock(config, SimulatedCamera::new(), clock.clone());

    match cli.command {
        Command::List => {
            let names = session.list_saved()?;
            if names.is_empty() {
                tracing::info!("No sequences in {}", session.store().dir().display());
            }
            for name in names {
                println!("{name}");
            }
        }
        Command::Preview { name, playback } => {
            session.load(&name)?;
            if playback.no_loop {
                session.set_looping(false);
            }
            let report = runner::preview(&mut session, &clock, playback.options())?;
            log_report(&report);
        }
        Command::Demo { playback } => {
            let count = runner::build_demo(&mut session);
            let path = session.save()?;
            tracing::info!("Saved {count} keyframes to {}", path.display());
            if playback.no_loop {
                session.set_looping(false);
            }
            let report = runner::preview(&mut session, &clock, playback.options())?;
            log_report(&report);
        }
        Command::InitConfig => {}
    }

    Ok(())
}

fn log_report(report: &PreviewReport) {
    tracing::info!(
        "Preview {}: {} frames, {} loop(s)",
        if report.finished { "finished" } else { "cut off" },
        report.frames,
        report.loops
    );
    if let Some(pose) = report.final_pose {
        tracing::info!(
            "Final pose focal=({:.1}, {:.1}, {:.1}) pitch={:.1} yaw={:.1} zoom={}",
            pose.focal_x,
            pose.focal_y,
            pose.focal_z,
            pose.pitch,
            pose.yaw,
            pose.zoom
        );
    }
}
