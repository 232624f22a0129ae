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

//! Double-buffered input snapshots with per-button edge counts.
//!
//! The builder owns two [`InputFrame`]s, *new* and *old*. Each frame it
//! fills *new* from provider state, comparing against *old* to count level
//! changes, and then [`InputSnapshotBuilder::swap`] flips their roles.

use hearth_core::input::{Button, ButtonState, ControllerInput, InputFrame, MAX_CONTROLLERS};
use hearth_core::platform::gamepad::LEFT_STICK_DEADZONE;
use hearth_core::platform::{GamepadButtons, GamepadState, Key, KeyEvent, MouseState, MAX_GAMEPADS};

/// Stick deflection past which the synthetic move buttons read as pressed.
pub const STICK_BUTTON_THRESHOLD: f32 = 0.5;

/// Maps a key to the keyboard controller's button, if it has one.
pub fn keyboard_button(key: Key) -> Option<Button> {
    match key {
        Key::W => Some(Button::MoveUp),
        Key::A => Some(Button::MoveLeft),
        Key::S => Some(Button::MoveDown),
        Key::D => Some(Button::MoveRight),
        Key::Q => Some(Button::LeftShoulder),
        Key::E => Some(Button::RightShoulder),
        Key::Up => Some(Button::ActionUp),
        Key::Left => Some(Button::ActionLeft),
        Key::Down => Some(Button::ActionDown),
        Key::Right => Some(Button::ActionRight),
        Key::Escape => Some(Button::Back),
        Key::Space => Some(Button::Start),
        _ => None,
    }
}

/// Normalises a raw stick axis to `[-1, 1]`, zeroing the dead zone.
pub fn normalize_stick(value: i16, dead_zone: i16) -> f32 {
    if value < -dead_zone {
        value as f32 / 32768.0
    } else if value > dead_zone {
        value as f32 / 32767.0
    } else {
        0.0
    }
}

/// Sets `new` to an instantaneous level, with one half transition if it
/// differs from `old`.
fn process_digital_button(is_down: bool, old: &ButtonState, new: &mut ButtonState) {
    new.ended_down = is_down as u32;
    new.half_transition_count = (old.is_down() != is_down) as i32;
}

/// Physical gamepad buttons and the controller buttons they drive.
const GAMEPAD_BUTTON_MAP: [(GamepadButtons, Button); 8] = [
    (GamepadButtons::A, Button::ActionDown),
    (GamepadButtons::B, Button::ActionRight),
    (GamepadButtons::X, Button::ActionLeft),
    (GamepadButtons::Y, Button::ActionUp),
    (GamepadButtons::LEFT_SHOULDER, Button::LeftShoulder),
    (GamepadButtons::RIGHT_SHOULDER, Button::RightShoulder),
    (GamepadButtons::BACK, Button::Back),
    (GamepadButtons::START, Button::Start),
];

/// Produces one [`InputFrame`] per frame from raw provider state.
#[derive(Debug, Default)]
pub struct InputSnapshotBuilder {
    frames: [InputFrame; 2],
    new_index: usize,
}

impl InputSnapshotBuilder {
    /// Creates a builder with two zeroed frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame being built.
    pub fn new_input(&self) -> &InputFrame {
        &self.frames[self.new_index]
    }

    /// The frame being built, mutably. Used by playback to override it.
    pub fn new_input_mut(&mut self) -> &mut InputFrame {
        &mut self.frames[self.new_index]
    }

    /// The previous frame.
    pub fn old_input(&self) -> &InputFrame {
        &self.frames[1 - self.new_index]
    }

    fn split(&mut self) -> (&InputFrame, &mut InputFrame) {
        let [first, second] = &mut self.frames;
        if self.new_index == 0 {
            (&*second, first)
        } else {
            (&*first, second)
        }
    }

    /// Starts a frame: the keyboard and mouse buttons carry their level
    /// forward from the previous frame with no transitions.
    pub fn begin_frame(&mut self, dt_for_frame: f32) {
        let (old, new) = self.split();
        new.dt_for_frame = dt_for_frame;

        let old_keyboard = *old.keyboard();
        let keyboard = new.keyboard_mut();
        *keyboard = ControllerInput {
            is_connected: 1,
            ..ControllerInput::default()
        };
        for (button, state) in old_keyboard.buttons.iter() {
            *keyboard.buttons.get_mut(button) = state.carried_forward();
        }

        for (new_button, old_button) in new.mouse_buttons.iter_mut().zip(old.mouse_buttons.iter()) {
            *new_button = old_button.carried_forward();
        }
    }

    /// Applies a keyboard event to the keyboard controller.
    ///
    /// Auto-repeat events carry no level change and are ignored.
    pub fn apply_key(&mut self, event: &KeyEvent) {
        if event.is_repeat() {
            return;
        }
        if let Some(button) = keyboard_button(event.key) {
            self.new_input_mut()
                .keyboard_mut()
                .buttons
                .get_mut(button)
                .apply_level(event.is_down);
        }
    }

    /// Applies the mouse: button levels with the keyboard edge rule,
    /// position and wheel verbatim.
    pub fn apply_mouse(&mut self, mouse: &MouseState) {
        let new = self.new_input_mut();
        for (state, is_down) in new.mouse_buttons.iter_mut().zip(mouse.buttons) {
            state.apply_level(is_down);
        }
        new.mouse_x = mouse.x;
        new.mouse_y = mouse.y;
        new.mouse_z = mouse.wheel;
    }

    /// Applies a gamepad poll to controller slot `index + 1`.
    ///
    /// A disconnected gamepad keeps its previous levels, with no transitions,
    /// and is flagged not connected.
    pub fn apply_gamepad(&mut self, index: usize, poll: Option<GamepadState>) {
        if index >= MAX_GAMEPADS || index + 1 >= MAX_CONTROLLERS {
            return;
        }
        let slot = index + 1;
        let (old, new) = self.split();
        let old = &old.controllers[slot];
        let new = &mut new.controllers[slot];

        let Some(pad) = poll else {
            *new = *old;
            for button in Button::ALL {
                *new.buttons.get_mut(button) = old.buttons.get(button).carried_forward();
            }
            new.is_connected = 0;
            return;
        };

        new.is_connected = 1;
        new.is_analog = old.is_analog;
        new.stick_average_x = normalize_stick(pad.stick_x, LEFT_STICK_DEADZONE);
        new.stick_average_y = normalize_stick(pad.stick_y, LEFT_STICK_DEADZONE);
        if new.stick_average_x != 0.0 || new.stick_average_y != 0.0 {
            new.is_analog = 1;
        }

        let dpad = [
            (GamepadButtons::DPAD_UP, 0.0, 1.0),
            (GamepadButtons::DPAD_DOWN, 0.0, -1.0),
            (GamepadButtons::DPAD_LEFT, -1.0, 0.0),
            (GamepadButtons::DPAD_RIGHT, 1.0, 0.0),
        ];
        for (flag, x, y) in dpad {
            if pad.buttons.contains(flag) {
                if x != 0.0 {
                    new.stick_average_x = x;
                }
                if y != 0.0 {
                    new.stick_average_y = y;
                }
                new.is_analog = 0;
            }
        }

        let (x, y) = (new.stick_average_x, new.stick_average_y);
        let synthetic = [
            (Button::MoveLeft, x < -STICK_BUTTON_THRESHOLD),
            (Button::MoveRight, x > STICK_BUTTON_THRESHOLD),
            (Button::MoveDown, y < -STICK_BUTTON_THRESHOLD),
            (Button::MoveUp, y > STICK_BUTTON_THRESHOLD),
        ];
        for (button, is_down) in synthetic {
            process_digital_button(is_down, old.buttons.get(button), new.buttons.get_mut(button));
        }

        for (flag, button) in GAMEPAD_BUTTON_MAP {
            process_digital_button(
                pad.buttons.contains(flag),
                old.buttons.get(button),
                new.buttons.get_mut(button),
            );
        }
    }

    /// Flips the roles of the two frames. The finished frame becomes *old*.
    pub fn swap(&mut self) {
        self.new_index = 1 - self.new_index;
    }
}
