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

//! The per-frame input record handed to the simulation.
//!
//! Every type here is `#[repr(C)]` plain old data: the record crosses the
//! module boundary by pointer and is persisted verbatim by the session
//! recorder, so its byte layout is part of the contract. Booleans are stored
//! as `u32` and exposed through accessor methods.

use bytemuck::{Pod, Zeroable};

/// Number of controller slots in a frame. Slot 0 is the keyboard.
pub const MAX_CONTROLLERS: usize = 5;

/// Index of the keyboard/mouse pseudo-controller.
pub const KEYBOARD_CONTROLLER: usize = 0;

/// Number of tracked mouse buttons.
pub const MOUSE_BUTTON_COUNT: usize = 5;

/// The state of one digital button at the end of a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ButtonState {
    /// How many times the level changed during the frame.
    pub half_transition_count: i32,
    /// Non-zero if the button was held when the frame ended.
    pub ended_down: u32,
}

impl ButtonState {
    /// Returns `true` if the button was held when the frame ended.
    pub fn is_down(&self) -> bool {
        self.ended_down != 0
    }

    /// Returns `true` if the button went down at least once this frame.
    pub fn was_pressed(&self) -> bool {
        self.half_transition_count > 1 || (self.half_transition_count == 1 && self.is_down())
    }

    /// The state a new frame starts from: same level, no transitions.
    pub fn carried_forward(&self) -> Self {
        Self {
            half_transition_count: 0,
            ended_down: self.ended_down,
        }
    }

    /// Applies an observed level, counting a half transition only if the
    /// level differs from the current one.
    pub fn apply_level(&mut self, is_down: bool) {
        if self.is_down() != is_down {
            self.ended_down = is_down as u32;
            self.half_transition_count += 1;
        }
    }
}

/// The named buttons of a controller slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Movement up.
    MoveUp,
    /// Movement down.
    MoveDown,
    /// Movement left.
    MoveLeft,
    /// Movement right.
    MoveRight,
    /// Upper face button.
    ActionUp,
    /// Lower face button.
    ActionDown,
    /// Left face button.
    ActionLeft,
    /// Right face button.
    ActionRight,
    /// Left shoulder.
    LeftShoulder,
    /// Right shoulder.
    RightShoulder,
    /// Back / select.
    Back,
    /// Start.
    Start,
}

impl Button {
    /// Every button, in record order.
    pub const ALL: [Button; 12] = [
        Button::MoveUp,
        Button::MoveDown,
        Button::MoveLeft,
        Button::MoveRight,
        Button::ActionUp,
        Button::ActionDown,
        Button::ActionLeft,
        Button::ActionRight,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::Back,
        Button::Start,
    ];
}

/// The fixed button set of one controller slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[allow(missing_docs)]
pub struct Buttons {
    pub move_up: ButtonState,
    pub move_down: ButtonState,
    pub move_left: ButtonState,
    pub move_right: ButtonState,
    pub action_up: ButtonState,
    pub action_down: ButtonState,
    pub action_left: ButtonState,
    pub action_right: ButtonState,
    pub left_shoulder: ButtonState,
    pub right_shoulder: ButtonState,
    pub back: ButtonState,
    pub start: ButtonState,
}

impl Buttons {
    /// Returns the state of a named button.
    pub fn get(&self, button: Button) -> &ButtonState {
        match button {
            Button::MoveUp => &self.move_up,
            Button::MoveDown => &self.move_down,
            Button::MoveLeft => &self.move_left,
            Button::MoveRight => &self.move_right,
            Button::ActionUp => &self.action_up,
            Button::ActionDown => &self.action_down,
            Button::ActionLeft => &self.action_left,
            Button::ActionRight => &self.action_right,
            Button::LeftShoulder => &self.left_shoulder,
            Button::RightShoulder => &self.right_shoulder,
            Button::Back => &self.back,
            Button::Start => &self.start,
        }
    }

    /// Returns a mutable reference to a named button.
    pub fn get_mut(&mut self, button: Button) -> &mut ButtonState {
        match button {
            Button::MoveUp => &mut self.move_up,
            Button::MoveDown => &mut self.move_down,
            Button::MoveLeft => &mut self.move_left,
            Button::MoveRight => &mut self.move_right,
            Button::ActionUp => &mut self.action_up,
            Button::ActionDown => &mut self.action_down,
            Button::ActionLeft => &mut self.action_left,
            Button::ActionRight => &mut self.action_right,
            Button::LeftShoulder => &mut self.left_shoulder,
            Button::RightShoulder => &mut self.right_shoulder,
            Button::Back => &mut self.back,
            Button::Start => &mut self.start,
        }
    }

    /// Iterates over every named button in record order.
    pub fn iter(&self) -> impl Iterator<Item = (Button, &ButtonState)> {
        Button::ALL.into_iter().map(move |button| (button, self.get(button)))
    }
}

/// One controller slot of an [`InputFrame`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ControllerInput {
    /// Non-zero if a device is attached to this slot.
    pub is_connected: u32,
    /// Non-zero if the stick values came from an analog source this frame.
    pub is_analog: u32,
    /// Average horizontal stick position over the frame, in `[-1, 1]`.
    pub stick_average_x: f32,
    /// Average vertical stick position over the frame, in `[-1, 1]`.
    pub stick_average_y: f32,
    /// The named buttons.
    pub buttons: Buttons,
}

impl ControllerInput {
    /// Returns `true` if a device is attached to this slot.
    pub fn is_connected(&self) -> bool {
        self.is_connected != 0
    }

    /// Returns `true` if the stick values are analog.
    pub fn is_analog(&self) -> bool {
        self.is_analog != 0
    }
}

/// The complete input state for one simulation frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InputFrame {
    /// Left, middle, right, and the two extended mouse buttons.
    pub mouse_buttons: [ButtonState; MOUSE_BUTTON_COUNT],
    /// Cursor x in framebuffer pixels.
    pub mouse_x: i32,
    /// Cursor y in framebuffer pixels.
    pub mouse_y: i32,
    /// Wheel position.
    pub mouse_z: i32,
    /// Seconds the frame is expected to cover.
    pub dt_for_frame: f32,
    /// Controller slots; slot 0 is the keyboard.
    pub controllers: [ControllerInput; MAX_CONTROLLERS],
}

impl InputFrame {
    /// The byte length of one persisted record.
    pub const RECORD_SIZE: usize = std::mem::size_of::<InputFrame>();

    /// The keyboard/mouse pseudo-controller.
    pub fn keyboard(&self) -> &ControllerInput {
        &self.controllers[KEYBOARD_CONTROLLER]
    }

    /// Mutable access to the keyboard/mouse pseudo-controller.
    pub fn keyboard_mut(&mut self) -> &mut ControllerInput {
        &mut self.controllers[KEYBOARD_CONTROLLER]
    }

    /// The record as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for InputFrame {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}
