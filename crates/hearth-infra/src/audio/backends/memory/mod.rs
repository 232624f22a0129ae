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

//! A ring device with no hardware behind it.

use hearth_core::audio::{
    AudioCursors, AudioDeviceError, AudioFormat, RingAudioDevice, SampleRing,
};
use std::time::Instant;

/// How the simulated play cursor moves.
#[derive(Debug, Clone, Copy)]
enum Playback {
    /// Only [`MemoryRingDevice::advance`] moves it.
    Manual,
    /// It follows wall time from `started`.
    Realtime { started: Instant },
}

/// A [`RingAudioDevice`] that keeps its ring in memory and pretends to play
/// it.
///
/// Used for headless runs and tests. The write cursor leads the play cursor
/// by a fixed number of bytes, the way a hardware device reports the region
/// it has already fetched.
#[derive(Debug)]
pub struct MemoryRingDevice {
    ring: SampleRing,
    format: AudioFormat,
    play: u32,
    write_lead: u32,
    playback: Playback,
}

impl MemoryRingDevice {
    /// A one-second ring whose play cursor only moves through
    /// [`MemoryRingDevice::advance`].
    pub fn manual(format: AudioFormat, write_lead: u32) -> Self {
        let buffer_len = format.one_second_bytes();
        Self {
            ring: SampleRing::new(buffer_len),
            format,
            play: 0,
            write_lead: align_down(write_lead, format.bytes_per_sample) % buffer_len.max(1),
            playback: Playback::Manual,
        }
    }

    /// A one-second ring whose play cursor advances with wall time, with a
    /// 10 ms write lead.
    pub fn realtime(format: AudioFormat) -> Self {
        let lead = (format.samples_per_second / 100).max(1) * format.bytes_per_sample;
        let mut device = Self::manual(format, lead);
        device.playback = Playback::Realtime {
            started: Instant::now(),
        };
        device
    }

    /// Moves the play cursor forward by `bytes`, wrapping.
    pub fn advance(&mut self, bytes: u32) {
        if self.ring.is_empty() {
            return;
        }
        self.play = ((self.play as u64 + bytes as u64) % self.ring.len() as u64) as u32;
    }

    /// The ring contents.
    pub fn ring(&self) -> &SampleRing {
        &self.ring
    }

    fn sync_play_cursor(&mut self) {
        let Playback::Realtime { started } = self.playback else {
            return;
        };
        let len = self.ring.len() as u64;
        if len == 0 {
            return;
        }
        let samples = (started.elapsed().as_secs_f64() * self.format.samples_per_second as f64) as u64;
        self.play = ((samples * self.format.bytes_per_sample as u64) % len) as u32;
    }
}

fn align_down(bytes: u32, unit: u32) -> u32 {
    if unit == 0 {
        bytes
    } else {
        bytes - bytes % unit
    }
}

impl RingAudioDevice for MemoryRingDevice {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn buffer_len(&self) -> u32 {
        self.ring.len()
    }

    fn cursors(&mut self) -> Result<AudioCursors, AudioDeviceError> {
        self.sync_play_cursor();
        let len = self.ring.len().max(1);
        Ok(AudioCursors {
            play: self.play,
            write: (self.play + self.write_lead) % len,
        })
    }

    fn write_region(
        &mut self,
        offset: u32,
        len: u32,
        fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), AudioDeviceError> {
        if len > self.ring.len() {
            return Err(AudioDeviceError::Lock {
                offset,
                len,
                reason: format!("the ring is only {} bytes", self.ring.len()),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn format() -> AudioFormat {
        AudioFormat::stereo_i16(100)
    }

    #[test]
    fn write_cursor_leads_by_whole_samples() {
        let mut device = MemoryRingDevice::manual(format(), 10);

        let cursors = device.cursors().expect("cursors");

        assert_eq!(cursors.play, 0);
        assert_eq!(cursors.write, 8, "A 10-byte lead rounds down to 2 samples");
    }

    #[test]
    fn advance_wraps_both_cursors() {
        let mut device = MemoryRingDevice::manual(format(), 8);

        device.advance(396);
        let cursors = device.cursors().expect("cursors");

        assert_eq!(cursors.play, 396);
        assert_eq!(cursors.write, 4, "The write cursor wraps past the 400-byte ring");
    }

    #[test]
    fn wrapping_region_is_handed_out_in_two_parts() {
        let mut device = MemoryRingDevice::manual(format(), 8);

        device
            .write_region(392, 16, &mut |first, second| {
                first.fill(0xAA);
                second.fill(0xBB);
            })
            .expect("write");

        let bytes = device.ring().as_bytes();
        assert!(bytes[392..].iter().all(|&b| b == 0xAA));
        assert!(bytes[..8].iter().all(|&b| b == 0xBB));
        assert_eq!(bytes[8], 0);
    }

    #[test]
    fn oversized_region_is_refused() {
        let mut device = MemoryRingDevice::manual(format(), 8);

        let result = device.write_region(0, 401, &mut |_, _| {});

        assert!(matches!(result, Err(AudioDeviceError::Lock { len: 401, .. })));
    }
}
