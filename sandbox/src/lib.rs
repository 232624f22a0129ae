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

// Hearth Sandbox
// Demo simulation module for testing hot reload and looped replay.
//
// Every piece of state lives in permanent storage, so rebuilding the
// library while the shell runs keeps the square where it was, and a replay
// loop rewinds it.

use std::f32::consts::TAU;
use std::mem;

use hearth_core::input::{ControllerInput, InputFrame};
use hearth_core::memory::MemoryView;
use hearth_core::module::{FramebufferView, SoundBufferView};

const BASE_TONE_HZ: f32 = 256.0;
const TONE_VOLUME: f32 = 3000.0;
const SQUARE_SIZE: i32 = 10;
const SQUARE_COLOR: u32 = 0x00FF_FFFF;
const MOVE_SPEED: f32 = 240.0;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct DemoState {
    tone_hz: f32,
    t_sine: f32,
    blue_offset: i32,
    green_offset: i32,
    player_x: f32,
    player_y: f32,
}

/// Borrows the demo state at the start of permanent storage.
///
/// # Safety
/// `memory` must describe live storage owned by the caller.
unsafe fn demo_state<'a>(memory: &'a mut MemoryView) -> Option<&'a mut DemoState> {
    let size = mem::size_of::<DemoState>();
    if memory.permanent_storage.is_null() || (memory.permanent_storage_size as usize) < size {
        return None;
    }
    let bytes = std::slice::from_raw_parts_mut(memory.permanent_storage, size);
    bytemuck::try_from_bytes_mut(bytes).ok()
}

fn step(state: &mut DemoState, input: &InputFrame) {
    let dt = input.dt_for_frame;
    for controller in input.controllers.iter().filter(|c| c.is_connected()) {
        apply_controller(state, controller, dt);
    }
}

fn apply_controller(state: &mut DemoState, controller: &ControllerInput, dt: f32) {
    let buttons = &controller.buttons;
    if controller.is_analog() {
        state.blue_offset += (4.0 * controller.stick_average_x) as i32;
        state.tone_hz = BASE_TONE_HZ + 128.0 * controller.stick_average_y;
    }

    let mut dx = 0.0;
    let mut dy = 0.0;
    if buttons.move_left.is_down() {
        dx -= 1.0;
    }
    if buttons.move_right.is_down() {
        dx += 1.0;
    }
    if buttons.move_up.is_down() {
        dy -= 1.0;
    }
    if buttons.move_down.is_down() {
        dy += 1.0;
    }
    state.player_x += dx * MOVE_SPEED * dt;
    state.player_y += dy * MOVE_SPEED * dt;

    if buttons.action_down.is_down() {
        state.green_offset += 1;
    }
}

fn draw(state: &DemoState, framebuffer: &mut FramebufferView) {
    if framebuffer.memory.is_null() || framebuffer.width <= 0 || framebuffer.height <= 0 {
        return;
    }
    let (width, height) = (framebuffer.width, framebuffer.height);
    let stride = framebuffer.pitch as usize / mem::size_of::<u32>();
    // SAFETY: the shell hands out `height` rows of `pitch` bytes.
    let pixels =
        unsafe { std::slice::from_raw_parts_mut(framebuffer.memory, stride * height as usize) };

    for y in 0..height {
        let row = &mut pixels[y as usize * stride..][..width as usize];
        for (x, pixel) in row.iter_mut().enumerate() {
            let blue = (x as i32 + state.blue_offset) as u8;
            let green = (y + state.green_offset) as u8;
            *pixel = (u32::from(green) << 8) | u32::from(blue);
        }
    }

    let left = (state.player_x as i32).clamp(0, width);
    let top = (state.player_y as i32).clamp(0, height);
    let right = (left + SQUARE_SIZE).min(width);
    let bottom = (top + SQUARE_SIZE).min(height);
    for y in top..bottom {
        let row = &mut pixels[y as usize * stride..];
        row[left as usize..right as usize].fill(SQUARE_COLOR);
    }
}

fn output_sine(state: &mut DemoState, buffer: &mut [i16], samples_per_second: i32) {
    if samples_per_second <= 0 {
        buffer.fill(0);
        return;
    }
    let wave_period = samples_per_second as f32 / state.tone_hz.max(1.0);
    for frame in buffer.chunks_exact_mut(2) {
        let value = (state.t_sine.sin() * TONE_VOLUME) as i16;
        frame[0] = value;
        frame[1] = value;
        state.t_sine += TAU / wave_period;
        if state.t_sine > TAU {
            state.t_sine -= TAU;
        }
    }
}

/// Advances the demo one frame and draws it.
///
/// # Safety
/// The pointers must be valid for the duration of the call, as guaranteed
/// by the shell's call contract.
#[no_mangle]
pub unsafe extern "C" fn update_and_render(
    memory: *mut MemoryView,
    input: *const InputFrame,
    framebuffer: *mut FramebufferView,
) {
    let (Some(memory), Some(input), Some(framebuffer)) =
        (memory.as_mut(), input.as_ref(), framebuffer.as_mut())
    else {
        return;
    };
    let first_frame = memory.is_initialized == 0;
    let Some(state) = demo_state(memory) else {
        return;
    };
    if first_frame {
        *state = DemoState {
            tone_hz: BASE_TONE_HZ,
            player_x: 100.0,
            player_y: 100.0,
            ..bytemuck::Zeroable::zeroed()
        };
    }

    step(state, input);
    draw(state, framebuffer);
    memory.is_initialized = 1;
}

/// Fills the requested samples with the current tone.
///
/// # Safety
/// The pointers must be valid for the duration of the call, as guaranteed
/// by the shell's call contract.
#[no_mangle]
pub unsafe extern "C" fn get_sound_samples(memory: *mut MemoryView, buffer: *mut SoundBufferView) {
    let Some(buffer) = buffer.as_mut() else {
        return;
    };
    if buffer.samples.is_null() || buffer.sample_count <= 0 {
        return;
    }
    let samples = std::slice::from_raw_parts_mut(buffer.samples, 2 * buffer.sample_count as usize);
    match memory.as_mut().and_then(|memory| demo_state(memory)) {
        Some(state) if state.tone_hz > 0.0 => {
            output_sine(state, samples, buffer.samples_per_second)
        }
        _ => samples.fill(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::memory::MemoryArena;
    use hearth_core::module::Framebuffer;

    #[test]
    fn first_frame_initialises_permanent_state() {
        // ARRANGE
        let mut arena = MemoryArena::new(1024, 0);
        let mut view = arena.view();
        let input = InputFrame::default();
        let mut framebuffer = Framebuffer::new(16, 8);
        let mut fb_view = framebuffer.view();

        // ACT
        unsafe { update_and_render(&mut view, &input, &mut fb_view) };

        // ASSERT
        assert_eq!(view.is_initialized, 1);
        let state: &DemoState =
            bytemuck::from_bytes(&arena.permanent()[..mem::size_of::<DemoState>()]);
        assert_eq!(state.tone_hz, BASE_TONE_HZ);
        assert_eq!(framebuffer.pixels()[1], 0x0000_0001, "Blue ramps with x");
        assert_eq!(framebuffer.pixels()[16], 0x0000_0100, "Green ramps with y");
    }

    #[test]
    fn held_direction_moves_the_square() {
        let mut arena = MemoryArena::new(1024, 0);
        let mut view = arena.view();
        let mut framebuffer = Framebuffer::new(4, 4);
        let mut fb_view = framebuffer.view();
        let mut input = InputFrame {
            dt_for_frame: 0.5,
            ..InputFrame::default()
        };
        input.keyboard_mut().is_connected = 1;
        input.keyboard_mut().buttons.move_right.ended_down = 1;

        unsafe { update_and_render(&mut view, &input, &mut fb_view) };

        let state: &DemoState =
            bytemuck::from_bytes(&arena.permanent()[..mem::size_of::<DemoState>()]);
        assert_eq!(state.player_x, 100.0 + MOVE_SPEED * 0.5);
        assert_eq!(state.player_y, 100.0);
    }

    #[test]
    fn uninitialised_memory_produces_silence() {
        let mut arena = MemoryArena::new(1024, 0);
        let mut view = arena.view();
        let mut samples = vec![7i16; 8];
        let mut buffer = SoundBufferView {
            samples_per_second: 48_000,
            sample_count: 4,
            samples: samples.as_mut_ptr(),
        };

        unsafe { get_sound_samples(&mut view, &mut buffer) };

        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn tone_is_interleaved_stereo() {
        let mut state = DemoState {
            tone_hz: BASE_TONE_HZ,
            ..bytemuck::Zeroable::zeroed()
        };
        let mut samples = [0i16; 6];

        output_sine(&mut state, &mut samples, 48_000);

        assert_eq!(samples[0], 0, "The wave starts at phase zero");
        assert!(samples[2] > 0);
        assert_eq!(samples[2], samples[3], "Both channels carry the tone");
        assert!(state.t_sine > 0.0);
    }
}
