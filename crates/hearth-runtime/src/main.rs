// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Hearth runtime shell
// Runs a hot-reloadable simulation module at a fixed frame rate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hearth_infra::{
    debug_file_services, ConsoleInputProvider, CpalRingDevice, DylibLoader, MemoryRingDevice,
    MonotonicClock, OperatorConsole,
};
use hearth_sdk::prelude::*;
use hearth_sdk::{Backends, EngineConfig, EngineContext, DEFAULT_CONFIG_PATH};

/// Runs a simulation module inside the Hearth shell.
///
/// Operator commands are read from standard input, one per line:
/// `quit`, `pause`, `fullscreen`, `record <slot>`, `play <slot>`, `loop <slot>`.
#[derive(Parser, Debug)]
#[command(name = "hearth-runtime")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file. Defaults apply if it does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Simulation module artifact, overriding `module.path`.
    #[arg(short, long)]
    module: Option<PathBuf>,

    /// Use a wall-clock driven memory ring instead of the sound card.
    #[arg(long)]
    headless_audio: bool,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = EngineConfig::load(&args.config)?;
    if let Some(module) = args.module {
        config.module.path = module;
    }

    hearth_telemetry::logging::init(&config.telemetry.log_level)
        .context("Failed to install the logger")?;
    log::info!(
        "Hearth starting: {:.1} Hz, module '{}'",
        config.update_hz(),
        config.module.path.display()
    );

    let backends = Backends {
        clock: Box::new(MonotonicClock::new()),
        audio_device: open_audio(&config, args.headless_audio),
        module_loader: Box::new(DylibLoader::new()),
        input_provider: Box::new(ConsoleInputProvider::new(
            NullInputProvider,
            OperatorConsole::stdin().context("Failed to start the operator console")?,
        )),
        presenter: Box::new(NullPresenter::default()),
        debug_files: debug_file_services(),
    };

    let mut engine = EngineContext::new(&config, backends)?;
    let frames = engine.run(args.frames);

    log::info!("Hearth stopped after {frames} frames.");
    Ok(())
}

/// Opens the sound card, or a memory ring if that fails or was asked for.
fn open_audio(config: &EngineConfig, headless: bool) -> Box<dyn RingAudioDevice> {
    let requested = config.audio.samples_per_second;
    if !headless {
        match CpalRingDevice::open(requested) {
            Ok(device) => return Box::new(device),
            Err(e) => log::warn!("No audio output ({e:#}). Falling back to a silent ring."),
        }
    }
    Box::new(MemoryRingDevice::realtime(AudioFormat::stereo_i16(requested)))
}
