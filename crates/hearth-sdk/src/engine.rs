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

//! The engine context and the per-frame step.
//!
//! One frame, in order:
//!
//! 1. Rebind the simulation module if its artifact changed.
//! 2. Start a new input frame and drain platform events, applying keys and
//!    operator commands.
//! 3. Poll the mouse and gamepads.
//! 4. Record or replace the input when a session is active.
//! 5. Call `update_and_render`.
//! 6. Plan the audio fill, call `get_sound_samples`, write the ring.
//! 7. Wait out the rest of the frame.
//! 8. Present, mark the flip, swap input frames.
//!
//! While paused only steps 1 and 2 run, followed by a coarse sleep.

use crate::config::EngineConfig;
use anyhow::{Context, Result};
use hearth_core::audio::RingAudioDevice;
use hearth_core::command::OperatorCommand;
use hearth_core::memory::DebugFileServices;
use hearth_core::module::{Framebuffer, ModuleLoader, SoundBufferView};
use hearth_core::platform::{FramePresenter, InputProvider, PlatformEvent, MAX_GAMEPADS};
use hearth_core::{ClockSource, InputFrame, MemoryArena};
use hearth_io::{HotModule, ReloadOutcome, SessionRecorder, SessionState};
use hearth_lanes::{draw_sync_markers, AudioRingSynchronizer, FramePacer, InputSnapshotBuilder};
use hearth_telemetry::FrameTelemetry;
use std::time::Duration;

/// How long a paused frame sleeps.
const PAUSED_SLEEP: Duration = Duration::from_millis(10);

/// The platform services an engine runs on.
pub struct Backends {
    /// Time source for pacing.
    pub clock: Box<dyn ClockSource>,
    /// The circular audio output.
    pub audio_device: Box<dyn RingAudioDevice>,
    /// Opens simulation module builds.
    pub module_loader: Box<dyn ModuleLoader>,
    /// Keyboard, mouse, gamepads and operator commands.
    pub input_provider: Box<dyn InputProvider>,
    /// Puts frames on screen.
    pub presenter: Box<dyn FramePresenter>,
    /// Whole-file helpers handed to the simulation through its memory view.
    pub debug_files: DebugFileServices,
}

/// Everything the loop owns, passed by `&mut` through each frame.
pub struct EngineContext {
    running: bool,
    paused: bool,
    fullscreen: bool,
    frame_index: u64,
    sync_overlay: bool,

    arena: MemoryArena,
    framebuffer: Framebuffer,
    input: InputSnapshotBuilder,
    session: SessionRecorder,
    module: HotModule<Box<dyn ModuleLoader>>,

    audio: AudioRingSynchronizer,
    samples: Vec<i16>,

    pacer: FramePacer,
    telemetry: FrameTelemetry,
    events: Vec<PlatformEvent>,

    clock: Box<dyn ClockSource>,
    audio_device: Box<dyn RingAudioDevice>,
    input_provider: Box<dyn InputProvider>,
    presenter: Box<dyn FramePresenter>,
}

impl EngineContext {
    /// Allocates the arena and wires `backends` according to `config`.
    pub fn new(config: &EngineConfig, backends: Backends) -> Result<Self> {
        config.validate().context("Invalid engine configuration")?;

        let update_hz = config.update_hz();
        let Backends {
            clock,
            audio_device,
            module_loader,
            input_provider,
            presenter,
            debug_files,
        } = backends;

        let format = audio_device.format();
        let buffer_len = audio_device.buffer_len();
        let samples_capacity = (buffer_len / format.bytes_per_sample.max(1)) as usize
            * usize::from(format.channels);

        let mut arena =
            MemoryArena::new(config.memory.permanent_bytes(), config.memory.transient_bytes());
        arena.set_debug_file_services(debug_files);
        log::info!(
            "Memory arena: {} bytes permanent, {} bytes transient",
            arena.permanent_size(),
            arena.transient_size()
        );
        log::info!("Simulation runs at {update_hz:.2} Hz");

        let pacer = FramePacer::from_update_hz(update_hz, &*clock);

        Ok(Self {
            running: true,
            paused: false,
            fullscreen: false,
            frame_index: 0,
            sync_overlay: config.debug.audio_sync_overlay,
            arena,
            framebuffer: Framebuffer::new(config.framebuffer.width, config.framebuffer.height),
            input: InputSnapshotBuilder::new(),
            session: SessionRecorder::new(
                &config.replay.directory,
                config.replay.slot_count,
                config.replay.storage.into(),
            ),
            module: HotModule::new(module_loader, &config.module.path),
            audio: AudioRingSynchronizer::new(format, buffer_len, update_hz),
            samples: Vec::with_capacity(samples_capacity),
            pacer,
            telemetry: FrameTelemetry::new(config.telemetry.report_interval()),
            events: Vec::new(),
            clock,
            audio_device,
            input_provider,
            presenter,
        })
    }

    // --- State ---

    /// `false` once a quit was requested.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the simulation is frozen.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the presenter was last asked for fullscreen.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Frames fully completed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The simulation's memory.
    pub fn arena(&self) -> &MemoryArena {
        &self.arena
    }

    /// The frame last drawn by the simulation.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// The record/replay state.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// The input frame of the last completed frame.
    pub fn last_input(&self) -> &InputFrame {
        self.input.old_input()
    }

    /// The audio synchronizer.
    pub fn audio(&self) -> &AudioRingSynchronizer {
        &self.audio
    }

    /// Asks the loop to stop after the current frame.
    pub fn request_quit(&mut self) {
        self.running = false;
    }

    // --- Loop ---

    /// Runs frames until a quit is requested or `max_frames` frames have
    /// completed. Returns the number of completed frames.
    pub fn run(&mut self, max_frames: Option<u64>) -> u64 {
        log::info!("Entering the main loop");
        while self.running && max_frames.is_none_or(|max| self.frame_index < max) {
            self.run_frame();
        }

        let summary = self.telemetry.take_summary();
        if summary.frames > 0 {
            log::info!("Last interval: {summary}");
        }
        log::info!("Main loop finished after {} frames", self.frame_index);
        self.frame_index
    }

    /// Runs one iteration of the loop.
    pub fn run_frame(&mut self) {
        // --- Module ---
        if self.module.reload_if_changed() == ReloadOutcome::Reloaded {
            self.telemetry.record_reload();
        }

        // --- Events & commands ---
        let dt_for_frame = self.pacer.target_seconds();
        self.input.begin_frame(dt_for_frame);
        self.pump_events();
        if !self.running {
            return;
        }
        if self.paused {
            self.clock.sleep(PAUSED_SLEEP);
            return;
        }

        // --- Input ---
        let mouse = self.input_provider.mouse();
        self.input.apply_mouse(&mouse);
        let connected = self.input_provider.gamepad_count().min(MAX_GAMEPADS);
        for index in 0..MAX_GAMEPADS {
            let poll = if index < connected {
                self.input_provider.poll_gamepad(index)
            } else {
                None
            };
            self.input.apply_gamepad(index, poll);
        }

        // --- Session ---
        if let Err(e) = self.session.record_input(self.input.new_input()) {
            log::warn!("Recording stopped: {e}");
            self.session_stop_after_error();
        }
        if let Err(e) = self
            .session
            .playback_input(self.input.new_input_mut(), &mut self.arena)
        {
            log::warn!("Playback stopped: {e}");
        }

        // --- Simulation ---
        self.update_and_render();
        self.fill_audio();

        // --- Pacing & presentation ---
        let timing = self.pacer.wait_for_frame_end(&*self.clock);
        self.telemetry.record_frame(timing.frame_seconds, timing.missed);

        if self.sync_overlay {
            draw_sync_markers(
                self.audio.markers(),
                self.audio.format(),
                self.audio.state().buffer_len,
                &mut self.framebuffer,
            );
        }
        if let Err(e) = self.presenter.present(&self.framebuffer) {
            log::warn!("Present failed: {e:#}");
        }
        self.pacer.mark_flip(&*self.clock);
        self.audio.mark_flip(&mut *self.audio_device);

        self.input.swap();
        self.frame_index += 1;

        if let Some(summary) = self.telemetry.tick() {
            log::info!("{summary}");
        }
    }

    fn pump_events(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        events.clear();
        self.input_provider.pump_events(&mut events);

        for event in &events {
            match event {
                PlatformEvent::Quit => self.running = false,
                PlatformEvent::Key(key) => {
                    self.input.apply_key(key);
                    if let Some(command) = OperatorCommand::from_key_event(key) {
                        self.handle_command(command);
                    }
                }
                PlatformEvent::Command(command) => self.handle_command(*command),
            }
        }
        self.events = events;
    }

    /// Applies an operator command at the current frame boundary.
    pub fn handle_command(&mut self, command: OperatorCommand) {
        let result = match command {
            OperatorCommand::Quit => {
                self.running = false;
                Ok(())
            }
            OperatorCommand::TogglePause => {
                self.paused = !self.paused;
                if !self.paused {
                    self.pacer.restart(&*self.clock);
                    self.audio.invalidate();
                }
                log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
                Ok(())
            }
            OperatorCommand::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                self.presenter.set_fullscreen(self.fullscreen);
                Ok(())
            }
            OperatorCommand::ToggleRecord(slot) => self.session.toggle_recording(slot, &self.arena),
            OperatorCommand::TogglePlayback(slot) => {
                self.session.toggle_playback(slot, &mut self.arena)
            }
            OperatorCommand::CycleLoop(slot) => self.session.cycle(slot, &mut self.arena),
        };
        if let Err(e) = result {
            log::warn!("{command:?} ignored: {e}");
        }
    }

    fn session_stop_after_error(&mut self) {
        if let SessionState::Recording { slot } = self.session.state() {
            if let Err(e) = self.session.toggle_recording(slot, &self.arena) {
                log::debug!("Closing the failed recording: {e}");
            }
        }
    }

    fn update_and_render(&mut self) {
        let binding = self.module.binding();
        let Some(entry_points) = binding.entry_points() else {
            return;
        };
        let mut memory = self.arena.view();
        let mut framebuffer = self.framebuffer.view();
        let input: *const InputFrame = self.input.new_input();
        // SAFETY: the views point into buffers owned by `self` that outlive
        // the call, and the binding was fetched after this frame's reload
        // check, so the code it points into is still mapped.
        unsafe { (entry_points.update_and_render)(&mut memory, input, &mut framebuffer) };
        self.arena.absorb_view(&memory);
    }

    fn fill_audio(&mut self) {
        let seconds_since_flip = self.pacer.seconds_since_flip(&*self.clock);
        let Some(region) = self.audio.plan(&mut *self.audio_device, seconds_since_flip) else {
            self.telemetry.record_audio_dropout();
            return;
        };

        let format = self.audio.format();
        let sample_count = region.sample_count as usize;
        self.samples.clear();
        self.samples
            .resize(sample_count * usize::from(format.channels), 0);

        let binding = self.module.binding();
        if let Some(entry_points) = binding.entry_points() {
            let mut memory = self.arena.view();
            let mut sound = SoundBufferView {
                samples_per_second: format.samples_per_second as i32,
                sample_count: sample_count as i32,
                samples: self.samples.as_mut_ptr(),
            };
            // SAFETY: `samples` holds `channels * sample_count` values and
            // is not touched until the call returns; see `update_and_render`
            // for the memory view and binding.
            unsafe { (entry_points.get_sound_samples)(&mut memory, &mut sound) };
            self.arena.absorb_view(&memory);
        }

        if let Err(e) = self
            .audio
            .commit(&mut *self.audio_device, &region, &self.samples)
        {
            log::warn!("Audio write skipped: {e}");
            self.telemetry.record_audio_dropout();
        }
    }
}
