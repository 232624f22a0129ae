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

//! Computes and fills the region of the audio ring that covers the next frame.
//!
//! Every frame the synchronizer reads the device's play cursor `P` and write
//! cursor `W`, predicts where `P` will be when the upcoming frame is
//! presented, and writes exactly up to one frame past that point. When the
//! device is too slow for that prediction to be safe (its write cursor is
//! already past the predicted boundary), it falls back to writing one frame
//! plus a safety margin past `W`.

use super::sync_markers::SyncMarkerLog;
use hearth_core::audio::{AudioCursors, AudioDeviceError, AudioFormat, RingAudioDevice};

/// Cursor bookkeeping for the audio ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioCursorState {
    /// Samples written so far, modulo the ring length in samples.
    pub running_sample_index: u32,
    /// Sample frames per second.
    pub samples_per_second: u32,
    /// Bytes per sample frame.
    pub bytes_per_sample: u32,
    /// Ring length in bytes, a whole number of samples.
    pub buffer_len: u32,
    /// Extra bytes written past the write cursor on the fallback path.
    pub safety_bytes: u32,
    /// Bytes of audio covering one frame, a whole number of samples.
    pub frame_bytes: u32,
}

impl AudioCursorState {
    /// Derives the cursor constants for a ring running at `update_hz`.
    pub fn new(format: AudioFormat, buffer_len: u32, update_hz: f32) -> Self {
        let bytes_per_sample = format.bytes_per_sample.max(1);
        let bytes_per_second = (format.samples_per_second * bytes_per_sample) as f32;
        Self {
            running_sample_index: 0,
            samples_per_second: format.samples_per_second,
            bytes_per_sample,
            buffer_len: align_down(buffer_len, bytes_per_sample),
            safety_bytes: (bytes_per_second / update_hz / 3.0) as u32,
            frame_bytes: align_down((bytes_per_second / update_hz) as u32, bytes_per_sample),
        }
    }

    /// Ring length in samples.
    pub fn samples_in_buffer(&self) -> u32 {
        self.buffer_len / self.bytes_per_sample
    }

    /// Byte offset of the next sample to write.
    pub fn byte_to_lock(&self) -> u32 {
        if self.buffer_len == 0 {
            return 0;
        }
        ((self.running_sample_index as u64 * self.bytes_per_sample as u64)
            % self.buffer_len as u64) as u32
    }

    /// Moves the running index forward by `samples`.
    pub fn advance(&mut self, samples: u32) {
        let len = self.samples_in_buffer().max(1) as u64;
        self.running_sample_index = ((self.running_sample_index as u64 + samples as u64) % len) as u32;
    }

    /// Re-anchors the running index on the device's write cursor.
    pub fn resync(&mut self, write_cursor: u32) {
        let samples = self.samples_in_buffer().max(1);
        self.running_sample_index = (write_cursor / self.bytes_per_sample) % samples;
    }
}

fn align_down(value: u32, alignment: u32) -> u32 {
    value / alignment * alignment
}

/// The byte range of the ring to fill this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRegion {
    /// The cursors the region was computed from.
    pub cursors: AudioCursors,
    /// Where writing starts.
    pub byte_to_lock: u32,
    /// How many bytes to write, at most the ring length.
    pub bytes_to_write: u32,
    /// Where writing ends, modulo the ring length.
    pub target_cursor: u32,
    /// Predicted play cursor at the next flip, modulo the ring length.
    pub expected_frame_boundary_byte: u32,
    /// `true` if the region was sized from the predicted flip rather than
    /// from the write cursor.
    pub low_latency: bool,
    /// Sample frames to request from the simulation.
    pub sample_count: u32,
}

/// Plans the fill region from one cursor query.
///
/// `seconds_since_flip` is how far into the current frame we are;
/// `target_seconds` is the frame duration.
pub fn compute_fill_region(
    state: &AudioCursorState,
    cursors: AudioCursors,
    seconds_since_flip: f32,
    target_seconds: f32,
) -> FillRegion {
    let len = state.buffer_len.max(1) as u64;
    let play = cursors.play as u64 % len;
    let write = cursors.write as u64 % len;
    let frame_bytes = state.frame_bytes as u64;

    let byte_to_lock = state.byte_to_lock() as u64;

    // Bytes the play cursor will still cover before the flip.
    let frame_fraction = if target_seconds > 0.0 {
        (seconds_since_flip / target_seconds).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let elapsed_bytes = ((frame_fraction * frame_bytes as f32) as u64).min(frame_bytes);
    let expected_frame_boundary_byte = play + (frame_bytes - elapsed_bytes);

    let mut safe_write_cursor = write;
    if safe_write_cursor < play {
        safe_write_cursor += len;
    }
    safe_write_cursor += state.safety_bytes as u64;

    let low_latency = safe_write_cursor < expected_frame_boundary_byte;
    let target_unwrapped = if low_latency {
        expected_frame_boundary_byte + frame_bytes
    } else {
        write + frame_bytes + state.safety_bytes as u64
    };
    let target_cursor = align_down((target_unwrapped % len) as u32, state.bytes_per_sample) as u64;

    let bytes_to_write = (target_cursor + len - byte_to_lock) % len;

    FillRegion {
        cursors,
        byte_to_lock: byte_to_lock as u32,
        bytes_to_write: bytes_to_write as u32,
        target_cursor: target_cursor as u32,
        expected_frame_boundary_byte: (expected_frame_boundary_byte % len) as u32,
        low_latency,
        sample_count: bytes_to_write as u32 / state.bytes_per_sample,
    }
}

/// Feeds a [`RingAudioDevice`] one frame ahead of playback.
#[derive(Debug)]
pub struct AudioRingSynchronizer {
    state: AudioCursorState,
    format: AudioFormat,
    target_seconds: f32,
    is_valid: bool,
    markers: SyncMarkerLog,
}

impl AudioRingSynchronizer {
    /// Creates a synchronizer for a ring of `buffer_len` bytes updated at
    /// `update_hz`. It starts invalid and resynchronises on the first query.
    pub fn new(format: AudioFormat, buffer_len: u32, update_hz: f32) -> Self {
        Self {
            state: AudioCursorState::new(format, buffer_len, update_hz),
            format,
            target_seconds: 1.0 / update_hz,
            is_valid: false,
            markers: SyncMarkerLog::default(),
        }
    }

    /// The current cursor bookkeeping.
    pub fn state(&self) -> &AudioCursorState {
        &self.state
    }

    /// The device's PCM layout.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// `false` until the next successful cursor query after a failure.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Recent cursor history.
    pub fn markers(&self) -> &SyncMarkerLog {
        &self.markers
    }

    /// Forces a resync on the next query.
    pub fn invalidate(&mut self) {
        self.is_valid = false;
    }

    /// Queries the device and plans this frame's fill.
    ///
    /// Returns `None` if the cursors are unavailable; the frame's audio is
    /// skipped and the next successful query resynchronises.
    pub fn plan<D: RingAudioDevice + ?Sized>(
        &mut self,
        device: &mut D,
        seconds_since_flip: f32,
    ) -> Option<FillRegion> {
        let cursors = match device.cursors() {
            Ok(cursors) => cursors,
            Err(e) => {
                if self.is_valid {
                    log::warn!("Audio skipped until the device recovers: {e}");
                } else {
                    log::debug!("Audio still unavailable: {e}");
                }
                self.is_valid = false;
                return None;
            }
        };

        if !self.is_valid {
            self.state.resync(cursors.write);
            self.is_valid = true;
            log::debug!(
                "Audio resynchronised at sample {} (write cursor {})",
                self.state.running_sample_index,
                cursors.write
            );
        }

        let region =
            compute_fill_region(&self.state, cursors, seconds_since_flip, self.target_seconds);
        self.markers.record_output(
            cursors,
            region.byte_to_lock,
            region.bytes_to_write,
            region.expected_frame_boundary_byte,
        );
        log::trace!(
            "Audio fill: lock {} write {} target {} (P {} W {}, low latency: {})",
            region.byte_to_lock,
            region.bytes_to_write,
            region.target_cursor,
            cursors.play,
            cursors.write,
            region.low_latency
        );
        Some(region)
    }

    /// Writes `samples` (interleaved `i16`) into the planned region and
    /// advances the running index by the number of sample frames written.
    ///
    /// A short `samples` slice is padded with silence. On failure the
    /// synchronizer is invalidated and nothing is advanced.
    pub fn commit<D: RingAudioDevice + ?Sized>(
        &mut self,
        device: &mut D,
        region: &FillRegion,
        samples: &[i16],
    ) -> Result<(), AudioDeviceError> {
        if region.bytes_to_write == 0 {
            return Ok(());
        }

        let source: &[u8] = bytemuck::cast_slice(samples);
        let mut fill = |first: &mut [u8], second: &mut [u8]| {
            let mut consumed = 0;
            for dest in [first, second] {
                let start = consumed.min(source.len());
                let available = (source.len() - start).min(dest.len());
                dest[..available].copy_from_slice(&source[start..start + available]);
                dest[available..].fill(0);
                consumed += dest.len();
            }
        };

        if let Err(e) = device.write_region(region.byte_to_lock, region.bytes_to_write, &mut fill)
        {
            self.is_valid = false;
            return Err(e);
        }

        self.state.advance(region.sample_count);
        Ok(())
    }

    /// Records where the cursors were right after presentation.
    pub fn mark_flip<D: RingAudioDevice + ?Sized>(&mut self, device: &mut D) {
        if let Ok(cursors) = device.cursors() {
            self.markers.record_flip(cursors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::audio::SampleRing;

    const SPS: u32 = 48_000;
    const BPS: u32 = 4;
    const LEN: u32 = SPS * BPS;

    /// A ring device with scripted cursors.
    struct FakeDevice {
        ring: SampleRing,
        cursors: AudioCursors,
        fail_cursors: bool,
        fail_lock: bool,
    }

    impl FakeDevice {
        fn new() -> Self {
            Self {
                ring: SampleRing::new(LEN),
                cursors: AudioCursors::default(),
                fail_cursors: false,
                fail_lock: false,
            }
        }
    }

    impl RingAudioDevice for FakeDevice {
        fn format(&self) -> AudioFormat {
            AudioFormat::stereo_i16(SPS)
        }

        fn buffer_len(&self) -> u32 {
            self.ring.len()
        }

        fn cursors(&mut self) -> Result<AudioCursors, AudioDeviceError> {
            if self.fail_cursors {
                return Err(AudioDeviceError::CursorQuery("unplugged".into()));
            }
            Ok(self.cursors)
        }

        fn write_region(
            &mut self,
            offset: u32,
            len: u32,
            fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
        ) -> Result<(), AudioDeviceError> {
            if self.fail_lock {
                return Err(AudioDeviceError::Lock {
                    offset,
                    len,
                    reason: "busy".into(),
                });
            }
            let (first, second) = self.ring.regions_mut(offset, len);
            fill(first, second);
            Ok(())
        }

        fn clear(&mut self) -> Result<(), AudioDeviceError> {
            self.ring.clear();
            Ok(())
        }
    }

    fn synchronizer() -> AudioRingSynchronizer {
        AudioRingSynchronizer::new(AudioFormat::stereo_i16(SPS), LEN, 30.0)
    }

    #[test]
    fn cursor_constants_follow_the_format() {
        let state = AudioCursorState::new(AudioFormat::stereo_i16(SPS), LEN, 30.0);
        assert_eq!(state.frame_bytes, 6400);
        assert_eq!(state.safety_bytes, 2133);
        assert_eq!(state.samples_in_buffer(), SPS);
    }

    #[test]
    fn first_fill_from_a_fresh_device_starts_at_zero() {
        // ARRANGE
        let mut device = FakeDevice::new();
        let mut sync = synchronizer();

        // ACT
        let region = sync.plan(&mut device, 0.0).expect("cursors are available");

        // ASSERT
        assert_eq!(region.byte_to_lock, 0);
        assert!(region.low_latency, "An idle device allows low latency");
        assert_eq!(region.expected_frame_boundary_byte, 6400);
        assert_eq!(region.target_cursor, 12800);
        assert_eq!(region.bytes_to_write, 12800);
        assert_eq!(region.sample_count, 3200);
    }

    #[test]
    fn late_write_cursor_falls_back_to_the_safety_margin() {
        let mut state = AudioCursorState::new(AudioFormat::stereo_i16(SPS), LEN, 30.0);
        state.resync(8000);
        let cursors = AudioCursors {
            play: 0,
            write: 8000,
        };

        let region = compute_fill_region(&state, cursors, 0.0, 1.0 / 30.0);

        assert!(!region.low_latency);
        assert_eq!(region.target_cursor, (8000 + 6400 + 2133) / BPS * BPS);
        assert_eq!(region.byte_to_lock, 8000);
    }

    #[test]
    fn region_covers_exactly_lock_to_target_for_any_cursors() {
        // A deterministic LCG sweep over cursor positions and frame phase.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as u32
        };

        for _ in 0..10_000 {
            let mut state = AudioCursorState::new(AudioFormat::stereo_i16(SPS), LEN, 30.0);
            state.running_sample_index = next() % state.samples_in_buffer();
            let play = next() % LEN;
            let write = (play + next() % 8000) % LEN;
            let since_flip = (next() % 1000) as f32 / 1000.0 * 0.05;

            let region =
                compute_fill_region(&state, AudioCursors { play, write }, since_flip, 1.0 / 30.0);

            assert!(region.bytes_to_write <= LEN);
            assert_eq!(
                (region.byte_to_lock + region.bytes_to_write) % LEN,
                region.target_cursor,
                "lock + write must land on the target for P={play} W={write}"
            );
            assert_eq!(region.bytes_to_write % BPS, 0);
        }
    }

    #[test]
    fn commit_writes_samples_and_advances_the_index() {
        let mut device = FakeDevice::new();
        let mut sync = synchronizer();
        let region = sync.plan(&mut device, 0.0).expect("cursors are available");
        let samples: Vec<i16> = (0..region.sample_count as i16 * 2).collect();

        sync.commit(&mut device, &region, &samples)
            .expect("lock succeeds");

        assert_eq!(sync.state().running_sample_index, region.sample_count);
        let written: &[u8] = bytemuck::cast_slice(&samples);
        assert_eq!(&device.ring.as_bytes()[..written.len()], written);
    }

    #[test]
    fn commit_wraps_around_the_end_of_the_ring() {
        let mut device = FakeDevice::new();
        device.cursors = AudioCursors {
            play: LEN - 400,
            write: LEN - 400,
        };
        let mut sync = synchronizer();
        let region = sync.plan(&mut device, 0.0).expect("cursors are available");
        assert_eq!(region.byte_to_lock, LEN - 400);
        let samples = vec![0x0707i16; region.sample_count as usize * 2];

        sync.commit(&mut device, &region, &samples)
            .expect("lock succeeds");

        let bytes = device.ring.as_bytes();
        assert!(bytes[(LEN - 400) as usize..].iter().all(|b| *b == 7));
        assert_eq!(bytes[0], 7, "The region continues at the start of the ring");
        assert_eq!(
            sync.state().byte_to_lock(),
            region.target_cursor,
            "The next lock starts where this one ended"
        );
    }

    #[test]
    fn short_sample_buffer_is_padded_with_silence() {
        let mut device = FakeDevice::new();
        device.ring.regions_mut(0, LEN).0.fill(0xAA);
        let mut sync = synchronizer();
        let region = sync.plan(&mut device, 0.0).expect("cursors are available");

        sync.commit(&mut device, &region, &[1, 1])
            .expect("lock succeeds");

        let bytes = device.ring.as_bytes();
        assert_eq!(&bytes[..4], &[1, 0, 1, 0]);
        assert!(bytes[4..region.bytes_to_write as usize].iter().all(|b| *b == 0));
        assert_eq!(bytes[region.bytes_to_write as usize], 0xAA);
    }

    #[test]
    fn cursor_failure_skips_the_frame_and_resyncs_next() {
        let mut device = FakeDevice::new();
        let mut sync = synchronizer();
        sync.plan(&mut device, 0.0);
        device.fail_cursors = true;

        assert!(sync.plan(&mut device, 0.0).is_none());
        assert!(!sync.is_valid());

        device.fail_cursors = false;
        device.cursors = AudioCursors {
            play: 2000,
            write: 4000,
        };
        let region = sync.plan(&mut device, 0.0).expect("device recovered");

        assert!(sync.is_valid());
        assert_eq!(region.byte_to_lock, 4000, "Resync starts at the write cursor");
    }

    #[test]
    fn lock_failure_invalidates_without_advancing() {
        let mut device = FakeDevice::new();
        let mut sync = synchronizer();
        let region = sync.plan(&mut device, 0.0).expect("cursors are available");
        device.fail_lock = true;

        let result = sync.commit(&mut device, &region, &[0; 16]);

        assert!(result.is_err());
        assert!(!sync.is_valid());
        assert_eq!(sync.state().running_sample_index, 0);
    }

    #[test]
    fn flip_markers_close_each_frame() {
        let mut device = FakeDevice::new();
        let mut sync = synchronizer();
        sync.plan(&mut device, 0.0);
        device.cursors = AudioCursors {
            play: 640,
            write: 1920,
        };

        sync.mark_flip(&mut device);

        let marker = sync.markers().latest();
        assert_eq!(marker.output_byte_count, 12800);
        assert_eq!(marker.flip_cursors.play, 640);
    }
}
