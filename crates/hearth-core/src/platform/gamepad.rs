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

//! Raw gamepad state as reported by a polling backend.

use crate::hearth_bitflags;

/// Radius around the stick's rest position treated as zero.
pub const LEFT_STICK_DEADZONE: i16 = 7849;

hearth_bitflags! {
    /// The digital buttons of a gamepad.
    pub struct GamepadButtons: u16 {
        /// D-pad up.
        const DPAD_UP = 1 << 0;
        /// D-pad down.
        const DPAD_DOWN = 1 << 1;
        /// D-pad left.
        const DPAD_LEFT = 1 << 2;
        /// D-pad right.
        const DPAD_RIGHT = 1 << 3;
        /// Start.
        const START = 1 << 4;
        /// Back.
        const BACK = 1 << 5;
        /// Left shoulder.
        const LEFT_SHOULDER = 1 << 8;
        /// Right shoulder.
        const RIGHT_SHOULDER = 1 << 9;
        /// Bottom face button.
        const A = 1 << 12;
        /// Right face button.
        const B = 1 << 13;
        /// Left face button.
        const X = 1 << 14;
        /// Top face button.
        const Y = 1 << 15;
    }
}

/// One poll of a connected gamepad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadState {
    /// Pressed buttons.
    pub buttons: GamepadButtons,
    /// Left stick horizontal position, full `i16` range.
    pub stick_x: i16,
    /// Left stick vertical position, full `i16` range, up is positive.
    pub stick_y: i16,
}
