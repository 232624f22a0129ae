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

//! `#[repr(C)]` views and entry-point signatures shared with simulation modules.

use crate::input::InputFrame;
use crate::memory::MemoryView;

/// Exported name of the per-frame update entry point.
pub const UPDATE_AND_RENDER_SYMBOL: &[u8] = b"update_and_render\0";

/// Exported name of the audio entry point.
pub const GET_SOUND_SAMPLES_SYMBOL: &[u8] = b"get_sound_samples\0";

/// Advances the simulation one frame and draws into the framebuffer.
pub type UpdateAndRenderFn =
    unsafe extern "C" fn(*mut MemoryView, *const InputFrame, *mut FramebufferView);

/// Renders the requested number of interleaved stereo samples.
pub type GetSoundSamplesFn = unsafe extern "C" fn(*mut MemoryView, *mut SoundBufferView);

/// A 32-bit pixel buffer as seen by the simulation.
#[repr(C)]
#[derive(Debug)]
pub struct FramebufferView {
    /// First pixel of the top row.
    pub memory: *mut u32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Distance in bytes between the starts of two rows.
    pub pitch: i32,
}

/// A block of interleaved stereo `i16` samples to fill.
#[repr(C)]
#[derive(Debug)]
pub struct SoundBufferView {
    /// Playback rate of the samples.
    pub samples_per_second: i32,
    /// Number of stereo sample frames requested.
    pub sample_count: i32,
    /// `2 * sample_count` interleaved values.
    pub samples: *mut i16,
}

/// The owned pixel buffer the simulation draws into.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Creates a black framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major `0x00RRGGBB` pixels.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable access for shell-side overlays.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Builds the raw view for a simulation call.
    pub fn view(&mut self) -> FramebufferView {
        FramebufferView {
            memory: self.pixels.as_mut_ptr(),
            width: self.width as i32,
            height: self.height as i32,
            pitch: (self.width as usize * std::mem::size_of::<u32>()) as i32,
        }
    }
}
