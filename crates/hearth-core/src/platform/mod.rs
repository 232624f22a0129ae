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

//! Abstract contracts for the host platform: raw input sources and the
//! presenter that puts finished frames on screen.

pub mod gamepad;
pub mod keyboard;
pub mod presenter;

pub use gamepad::{GamepadButtons, GamepadState};
pub use keyboard::{Key, KeyEvent, MouseState};
pub use presenter::{FramePresenter, NullPresenter};

use crate::command::OperatorCommand;

/// Maximum number of gamepads polled per frame.
pub const MAX_GAMEPADS: usize = 4;

/// A message pulled from the host's event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// A keyboard key changed level (or auto-repeated).
    Key(KeyEvent),
    /// The host asked the application to close.
    Quit,
    /// An operator command arrived from outside the keyboard path.
    Command(OperatorCommand),
}

/// A source of raw input.
///
/// The engine drains events and polls devices once per frame, on the
/// simulation thread.
pub trait InputProvider {
    /// Appends every event queued since the last call to `events`.
    fn pump_events(&mut self, events: &mut Vec<PlatformEvent>);

    /// The current mouse state.
    fn mouse(&self) -> MouseState;

    /// Number of gamepad slots the provider can report on, at most
    /// [`MAX_GAMEPADS`].
    fn gamepad_count(&self) -> usize;

    /// Polls gamepad `index`. `None` means nothing is connected there.
    fn poll_gamepad(&mut self, index: usize) -> Option<GamepadState>;
}

/// An input provider with no devices. Used when running headless.
#[derive(Debug, Default)]
pub struct NullInputProvider;

impl InputProvider for NullInputProvider {
    fn pump_events(&mut self, _events: &mut Vec<PlatformEvent>) {}

    fn mouse(&self) -> MouseState {
        MouseState::default()
    }

    fn gamepad_count(&self) -> usize {
        0
    }

    fn poll_gamepad(&mut self, _index: usize) -> Option<GamepadState> {
        None
    }
}
