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

//! Deterministic session record and replay.
//!
//! Because the whole simulation state lives in the [`MemoryArena`], a session
//! is fully described by a copy of the arena taken when recording starts plus
//! the sequence of [`InputFrame`]s fed to the simulation afterwards. Playback
//! restores the copy and feeds the same frames again; when the stream runs
//! out it rewinds both, so a recorded stretch of play loops seamlessly.
//!
//! The input stream is a flat sequence of fixed-size records with no header
//! or framing.

mod error;
mod slot;

pub use error::ReplayError;
pub use slot::{ReplaySlot, SnapshotStorage};

use hearth_core::input::InputFrame;
use hearth_core::MemoryArena;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// What the recorder is doing. Recording and playback are never active at
/// the same time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Live input passes through untouched.
    #[default]
    Idle,
    /// Live input is appended to the slot's stream.
    Recording {
        /// The slot being recorded.
        slot: u8,
    },
    /// Live input is replaced by the slot's stream.
    Playing {
        /// The slot being played.
        slot: u8,
    },
}

/// Records and replays sessions through a fixed set of [`ReplaySlot`]s.
#[derive(Debug)]
pub struct SessionRecorder {
    directory: PathBuf,
    storage: SnapshotStorage,
    slots: Vec<ReplaySlot>,
    state: SessionState,
    writer: Option<BufWriter<File>>,
    reader: Option<BufReader<File>>,
    frames_recorded: u64,
    loops_played: u64,
}

impl SessionRecorder {
    /// Creates a recorder with slots `1..=slot_count` whose files live in
    /// `directory`. Nothing touches the filesystem until a slot is used.
    pub fn new(directory: impl Into<PathBuf>, slot_count: u8, storage: SnapshotStorage) -> Self {
        let directory = directory.into();
        let slots = (1..=slot_count)
            .map(|index| ReplaySlot::new(&directory, index))
            .collect();
        Self {
            directory,
            storage,
            slots,
            state: SessionState::Idle,
            writer: None,
            reader: None,
            frames_recorded: 0,
            loops_played: 0,
        }
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Where replay files are written.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Frames appended since the current recording started.
    pub fn frames_recorded(&self) -> u64 {
        self.frames_recorded
    }

    /// Times the current playback has wrapped back to its start.
    pub fn loops_played(&self) -> u64 {
        self.loops_played
    }

    /// Looks up a slot by number.
    pub fn slot(&self, slot: u8) -> Option<&ReplaySlot> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get(i as usize))
    }

    fn slot_mut(&mut self, slot: u8) -> Result<&mut ReplaySlot, ReplayError> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get_mut(i as usize))
            .ok_or(ReplayError::UnknownSlot(slot))
    }

    // --- Transitions ---

    /// Snapshots `memory` into `slot` and starts appending input.
    ///
    /// Any active recording or playback is stopped first, but only once the
    /// slot's files are ready; a failure leaves the current session running.
    pub fn begin_recording(&mut self, slot: u8, memory: &MemoryArena) -> Result<(), ReplayError> {
        if self.slot(slot).is_none() {
            return Err(ReplayError::UnknownSlot(slot));
        }
        let storage = self.storage;
        let directory = self.directory.clone();
        fs::create_dir_all(&directory).map_err(|e| ReplayError::io(&directory, e))?;
        self.slot_mut(slot)?
            .prepare_store(memory.as_bytes().len(), storage)?;

        // Re-recording the active slot truncates the file its writer points at.
        if self.state == (SessionState::Recording { slot }) {
            if let Some(writer) = self.writer.as_mut() {
                if let Err(e) = writer.flush() {
                    return Err(self.slot_io_error(slot, e));
                }
            }
        }
        let input_path = self.slot_mut(slot)?.input_path().to_path_buf();
        let file = File::create(&input_path).map_err(|e| ReplayError::io(&input_path, e))?;

        self.stop();
        self.slot_mut(slot)?.store_snapshot(memory.as_bytes(), storage)?;
        self.writer = Some(BufWriter::new(file));
        self.frames_recorded = 0;
        self.state = SessionState::Recording { slot };
        log::info!("Recording into replay slot {slot}");
        Ok(())
    }

    /// Flushes and closes the input stream.
    pub fn end_recording(&mut self) -> Result<(), ReplayError> {
        let SessionState::Recording { slot } = self.state else {
            return Ok(());
        };
        self.state = SessionState::Idle;
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| self.slot_io_error(slot, e))?;
        }
        log::info!(
            "Recorded {} frames into replay slot {slot}",
            self.frames_recorded
        );
        Ok(())
    }

    /// Restores `slot`'s snapshot over `memory` and starts reading its
    /// stream from the beginning.
    ///
    /// Any active recording or playback is stopped first, but only once the
    /// stream is open and the snapshot is known to fit the arena; a failure
    /// leaves the current session running.
    pub fn begin_playback(&mut self, slot: u8, memory: &mut MemoryArena) -> Result<(), ReplayError> {
        let storage = self.storage;
        let size = memory.as_bytes().len();
        let replay_slot = self.slot_mut(slot)?;
        let file = replay_slot.open_input()?;
        replay_slot.check_snapshot(size, storage)?;

        self.stop();
        self.loops_played = 0;
        self.slot_mut(slot)?
            .restore_snapshot(memory.as_bytes_mut(), storage)?;
        self.reader = Some(BufReader::new(file));
        self.state = SessionState::Playing { slot };
        log::info!("Playing back replay slot {slot}");
        Ok(())
    }

    /// Reopens the active slot from its start, rewinding `memory`.
    fn reopen_playback(&mut self, slot: u8, memory: &mut MemoryArena) -> Result<(), ReplayError> {
        let storage = self.storage;
        let replay_slot = self.slot_mut(slot)?;
        let file = replay_slot.open_input()?;
        replay_slot.restore_snapshot(memory.as_bytes_mut(), storage)?;
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    /// Closes the input stream and returns to idle.
    pub fn end_playback(&mut self) {
        if let SessionState::Playing { slot } = self.state {
            log::info!("Stopped playback of replay slot {slot}");
        }
        self.reader = None;
        self.state = SessionState::Idle;
    }

    fn stop(&mut self) {
        match self.state {
            SessionState::Idle => {}
            SessionState::Recording { .. } => {
                if let Err(e) = self.end_recording() {
                    log::warn!("Recording ended with an error: {e}");
                }
            }
            SessionState::Playing { .. } => self.end_playback(),
        }
    }

    /// Starts recording `slot`, or stops if it is the slot being recorded.
    pub fn toggle_recording(&mut self, slot: u8, memory: &MemoryArena) -> Result<(), ReplayError> {
        match self.state {
            SessionState::Recording { slot: current } if current == slot => self.end_recording(),
            _ => self.begin_recording(slot, memory),
        }
    }

    /// Starts playing `slot`, or stops if it is the slot being played.
    pub fn toggle_playback(&mut self, slot: u8, memory: &mut MemoryArena) -> Result<(), ReplayError> {
        match self.state {
            SessionState::Playing { slot: current } if current == slot => {
                self.end_playback();
                Ok(())
            }
            _ => self.begin_playback(slot, memory),
        }
    }

    /// Steps the single-key loop: idle starts recording, recording switches
    /// to playback of the same slot, playback returns to idle.
    pub fn cycle(&mut self, slot: u8, memory: &mut MemoryArena) -> Result<(), ReplayError> {
        match self.state {
            SessionState::Idle => self.begin_recording(slot, memory),
            SessionState::Recording { slot: current } => {
                self.end_recording()?;
                self.begin_playback(current, memory)
            }
            SessionState::Playing { .. } => {
                self.end_playback();
                Ok(())
            }
        }
    }

    // --- Per-frame ---

    /// Appends `input` to the stream while recording. Does nothing otherwise.
    pub fn record_input(&mut self, input: &InputFrame) -> Result<(), ReplayError> {
        let SessionState::Recording { slot } = self.state else {
            return Ok(());
        };
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.write_all(input.as_bytes()) {
                return Err(self.slot_io_error(slot, e));
            }
            self.frames_recorded += 1;
        }
        Ok(())
    }

    /// Replaces `input` with the next recorded frame while playing.
    ///
    /// At the end of the stream the slot is re-entered, which rewinds both
    /// the stream and `memory`, and the first frame is read. Returns `true`
    /// if `input` was replaced. A slot with no recorded frames leaves `input`
    /// untouched and stops playback.
    pub fn playback_input(
        &mut self,
        input: &mut InputFrame,
        memory: &mut MemoryArena,
    ) -> Result<bool, ReplayError> {
        let SessionState::Playing { slot } = self.state else {
            return Ok(false);
        };

        if self.read_next(input).map_err(|e| self.slot_io_error(slot, e))? {
            return Ok(true);
        }

        self.reader = None;
        if let Err(e) = self.reopen_playback(slot, memory) {
            self.end_playback();
            return Err(e);
        }
        self.loops_played += 1;
        log::debug!("Replay slot {slot} looped ({} times)", self.loops_played);

        if self.read_next(input).map_err(|e| self.slot_io_error(slot, e))? {
            return Ok(true);
        }

        log::warn!("Replay slot {slot} has no recorded frames; playback stopped");
        self.end_playback();
        Ok(false)
    }

    /// Reads one whole record. A clean or truncated end of stream reads as
    /// `false` and leaves `input` untouched.
    fn read_next(&mut self, input: &mut InputFrame) -> std::io::Result<bool> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };
        let mut record = InputFrame::default();
        let buffer = bytemuck::bytes_of_mut(&mut record);
        let mut filled = 0;
        while filled < buffer.len() {
            match reader.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        if filled < buffer.len() {
            if filled > 0 {
                log::debug!("Ignoring truncated trailing replay record ({filled} bytes)");
            }
            return Ok(false);
        }
        *input = record;
        Ok(true)
    }

    fn slot_io_error(&self, slot: u8, source: std::io::Error) -> ReplayError {
        let path = self
            .slot(slot)
            .map(|s| s.input_path().to_path_buf())
            .unwrap_or_else(|| self.directory.clone());
        ReplayError::io(path, source)
    }
}

impl Drop for SessionRecorder {
    fn drop(&mut self) {
        self.stop();
    }
}
