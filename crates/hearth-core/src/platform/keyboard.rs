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

//! Keyboard and mouse events in a backend-agnostic form.

use crate::input::MOUSE_BUTTON_COUNT;

/// The physical keys the shell reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Left,
    Right,
    Escape,
    Space,
    Enter,
    P,
    L,
    F4,
    /// Any other key, by backend scan code.
    Other(u32),
}

/// A keyboard level change.
///
/// `was_down` is the level before this event; backends that auto-repeat
/// report `was_down == is_down` for repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Level after the event.
    pub is_down: bool,
    /// Level before the event.
    pub was_down: bool,
    /// Whether Alt was held.
    pub alt_down: bool,
}

impl KeyEvent {
    /// Returns `true` for auto-repeat events that carry no level change.
    pub fn is_repeat(&self) -> bool {
        self.is_down == self.was_down
    }
}

/// The mouse as seen at the start of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    /// Left, middle, right, and the two extended buttons.
    pub buttons: [bool; MOUSE_BUTTON_COUNT],
    /// Cursor x in framebuffer pixels.
    pub x: i32,
    /// Cursor y in framebuffer pixels.
    pub y: i32,
    /// Wheel position.
    pub wheel: i32,
}
