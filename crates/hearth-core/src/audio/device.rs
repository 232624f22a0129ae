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

//! Defines the abstract `RingAudioDevice` trait.

use std::fmt;

/// The PCM layout of a ring audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// The number of sample frames per second (e.g., 48000 Hz).
    pub samples_per_second: u32,
    /// The number of interleaved channels (2 for stereo).
    pub channels: u16,
    /// The size in bytes of one sample frame across all channels.
    pub bytes_per_sample: u32,
}

impl AudioFormat {
    /// Interleaved stereo, signed 16-bit PCM.
    pub const fn stereo_i16(samples_per_second: u32) -> Self {
        Self {
            samples_per_second,
            channels: 2,
            bytes_per_sample: 2 * std::mem::size_of::<i16>() as u32,
        }
    }

    /// The byte length of a ring holding exactly one second of audio.
    pub const fn one_second_bytes(&self) -> u32 {
        self.samples_per_second * self.bytes_per_sample
    }
}

/// A snapshot of the device's play and write cursors, as byte offsets into
/// its ring.
///
/// Bytes between `play` and `write` are committed to the hardware and must
/// not be touched; everything else may be overwritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioCursors {
    /// Where the hardware is currently reading.
    pub play: u32,
    /// The first byte that is safe to write.
    pub write: u32,
}

/// An error reported by a ring audio device.
///
/// All variants are transient from the engine's point of view: the frame's
/// audio is skipped and the next frame resynchronises.
#[derive(Debug)]
pub enum AudioDeviceError {
    /// The device could not report its cursors.
    CursorQuery(String),
    /// The requested region could not be locked for writing.
    Lock {
        /// Byte offset of the requested region.
        offset: u32,
        /// Byte length of the requested region.
        len: u32,
        /// Why the lock was refused.
        reason: String,
    },
    /// The underlying output stream stopped or failed.
    Stream(String),
}

impl fmt::Display for AudioDeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioDeviceError::CursorQuery(reason) => {
                write!(f, "Failed to query audio cursors: {reason}")
            }
            AudioDeviceError::Lock {
                offset,
                len,
                reason,
            } => write!(
                f,
                "Failed to lock {len} audio bytes at offset {offset}: {reason}"
            ),
            AudioDeviceError::Stream(reason) => write!(f, "Audio stream error: {reason}"),
        }
    }
}

impl std::error::Error for AudioDeviceError {}

/// The abstract contract for a circular, cursor-driven audio output device.
///
/// Unlike a callback-driven device, the engine owns the timing here: each
/// frame it asks where the hardware is, decides how far ahead to write, and
/// pushes bytes into the ring itself.
pub trait RingAudioDevice {
    /// The PCM layout of the ring.
    fn format(&self) -> AudioFormat;

    /// The total length of the ring in bytes.
    fn buffer_len(&self) -> u32;

    /// Queries the current play and write cursors.
    fn cursors(&mut self) -> Result<AudioCursors, AudioDeviceError>;

    /// Locks `len` bytes starting at `offset` and hands them to `fill`.
    ///
    /// The region may wrap around the end of the ring, in which case `fill`
    /// receives two non-empty slices; otherwise the second slice is empty.
    fn write_region(
        &mut self,
        offset: u32,
        len: u32,
        fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), AudioDeviceError>;

    /// Zeroes the whole ring.
    fn clear(&mut self) -> Result<(), AudioDeviceError>;
}
