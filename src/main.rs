//! Roomtone - Hear a clip as if it were playing in a room
//!
//! The room is re-traced every frame, so the echoes and tone drift as the
//! simulated geometry does.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use roomtone::audio::{render_offline, AudioClip, AudioSystem, SpectralAnalyzer};
use roomtone::cli::Args;
use roomtone::session::{LiveSession, SimulationLoop};
use roomtone::sim::SyntheticRoom;
use roomtone::{logging, Result};

fn run(args: &Args) -> Result<()> {
    let config = args.load_config()?;
    let shape = args.room_shape()?;

    let clip = AudioClip::load_wav(&args.input)?;
    info!(
        path = %args.input.display(),
        seconds = %format!("{:.2}", clip.duration_s()),
        sample_rate = clip.sample_rate_hz(),
        "loaded clip"
    );

    let simulation = &config.simulation;
    let room = SyntheticRoom::new(
        shape,
        simulation.ir_bins,
        simulation.energy_bands,
        simulation.ir_sample_rate,
    );

    // Offline mode: no device, straight to WAV
    if let Some(recording) = args.create_recording_config() {
        render_offline(&clip, &config, room, &recording)?;
        return Ok(());
    }

    let timeline = SpectralAnalyzer::new(config.analysis.clone()).analyze(
        clip.samples(),
        clip.sample_rate_hz() as f32,
        &simulation.band_ranges,
    );
    info!(frames = timeline.len(), "analyzed clip");

    let audio = AudioSystem::new(&clip, args.looping, &config)?;
    let mut sim_loop = SimulationLoop::new(simulation.clone(), room);
    sim_loop.load_timeline(Arc::new(timeline));

    let duration = args.duration.and_then(|secs| Duration::try_from_secs_f32(secs).ok());
    let mut session = LiveSession::new(sim_loop, audio);
    session.run(args.frame_rate, duration);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "roomtone failed");
            ExitCode::FAILURE
        }
    }
}
