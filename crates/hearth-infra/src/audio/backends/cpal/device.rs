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

//! Contains the `CpalRingDevice` struct.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hearth_core::audio::{
    AudioCursors, AudioDeviceError, AudioFormat, RingAudioDevice, SampleRing,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Lead of the write cursor over the play cursor until the first callback
/// has reported its period.
const MIN_WRITE_LEAD_MS: u32 = 10;

/// Shared between the engine and the audio callback thread. The callback
/// only reads the ring and advances `play`.
#[derive(Debug)]
struct PlaybackState {
    ring: SampleRing,
    play: u32,
    period_bytes: u32,
}

impl PlaybackState {
    fn new(buffer_len: u32) -> Self {
        Self {
            ring: SampleRing::new(buffer_len),
            play: 0,
            period_bytes: 0,
        }
    }

    /// Converts ring samples starting at `play` into `output` and moves
    /// `play` past them.
    fn render(&mut self, output: &mut [f32], channels: usize, bytes_per_sample: u32) {
        let len = self.ring.len();
        if len == 0 || channels == 0 {
            output.fill(0.0);
            return;
        }

        let mut sample = [0u8; 4];
        let mut cursor = self.play;
        let mut frames = 0;
        for frame in output.chunks_mut(channels) {
            self.ring.read_into(cursor, &mut sample);
            let left = f32::from(i16::from_le_bytes([sample[0], sample[1]])) / 32768.0;
            let right = f32::from(i16::from_le_bytes([sample[2], sample[3]])) / 32768.0;
            match frame {
                [mono] => *mono = 0.5 * (left + right),
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
            cursor = (cursor + bytes_per_sample) % len;
            frames += 1;
        }
        self.period_bytes = frames * bytes_per_sample;
        self.play = cursor;
    }
}

/// A [`RingAudioDevice`] whose ring is played through the host's default
/// output device via CPAL.
///
/// The ring is always interleaved stereo `i16`, one second long, at the
/// device's native rate. The audio callback converts it to the device's
/// `f32` frames. The write cursor is reported one callback period ahead of
/// the play cursor, which is the region the hardware may already have
/// consumed into its own buffers.
pub struct CpalRingDevice {
    state: Arc<Mutex<PlaybackState>>,
    stream_failed: Arc<AtomicBool>,
    format: AudioFormat,
    buffer_len: u32,
    min_write_lead: u32,
    _stream: cpal::Stream,
}

impl CpalRingDevice {
    /// Opens the default output device and starts playing a silent ring.
    ///
    /// `requested_samples_per_second` is advisory: if the device runs at
    /// another rate, the ring follows the device.
    pub fn open(requested_samples_per_second: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default output device available"))?;
        let config = device
            .default_output_config()
            .context("Failed to query the default output configuration")?;

        let sample_rate = config.sample_rate();
        if sample_rate != requested_samples_per_second {
            log::warn!(
                "Output device runs at {sample_rate} Hz, not {requested_samples_per_second} Hz; using the device rate"
            );
        }
        let ring_format = AudioFormat::stereo_i16(sample_rate);
        let buffer_len = ring_format.one_second_bytes();
        let channels = usize::from(config.channels());
        let bytes_per_sample = ring_format.bytes_per_sample;

        let state = Arc::new(Mutex::new(PlaybackState::new(buffer_len)));
        let stream_failed = Arc::new(AtomicBool::new(false));

        let callback_state = Arc::clone(&state);
        let audio_callback = move |output: &mut [f32], _: &cpal::OutputCallbackInfo| {
            match callback_state.lock() {
                Ok(mut state) => state.render(output, channels, bytes_per_sample),
                Err(_) => output.fill(0.0),
            }
        };

        let error_flag = Arc::clone(&stream_failed);
        let error_callback = move |err| {
            log::error!("An error occurred on the audio stream: {}", err);
            error_flag.store(true, Ordering::Relaxed);
        };

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                device.build_output_stream(&config.into(), audio_callback, error_callback, None)?
            }
            format => return Err(anyhow!("Unsupported sample format: {}", format)),
        };
        stream.play()?;

        let min_write_lead =
            (sample_rate * MIN_WRITE_LEAD_MS / 1000).max(1) * bytes_per_sample;
        log::info!(
            "Audio output: {sample_rate} Hz, {channels} channel(s), {buffer_len} byte ring"
        );

        Ok(Self {
            state,
            stream_failed,
            format: ring_format,
            buffer_len,
            min_write_lead,
            _stream: stream,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, PlaybackState>, AudioDeviceError> {
        if self.stream_failed.load(Ordering::Relaxed) {
            return Err(AudioDeviceError::Stream(
                "the output stream reported an error".to_owned(),
            ));
        }
        self.state
            .lock()
            .map_err(|_| AudioDeviceError::Stream("playback state is poisoned".to_owned()))
    }
}

impl RingAudioDevice for CpalRingDevice {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn buffer_len(&self) -> u32 {
        self.buffer_len
    }

    fn cursors(&mut self) -> Result<AudioCursors, AudioDeviceError> {
        let state = self.lock()?;
        let lead = state.period_bytes.max(self.min_write_lead);
        Ok(AudioCursors {
            play: state.play,
            write: (state.play + lead) % self.buffer_len,
        })
    }

    fn write_region(
        &mut self,
        offset: u32,
        len: u32,
        fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), AudioDeviceError> {
        if len > self.buffer_len {
            return Err(AudioDeviceError::Lock {
                offset,
                len,
                reason: format!("the ring is only {} bytes", self.buffer_len),
            });
        }
        let mut state = self.lock()?;
        let (first, second) = state.ring.regions_mut(offset, len);
        fill(first, second);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), AudioDeviceError> {
        self.lock()?.ring.clear();
        Ok(())
    }
}
