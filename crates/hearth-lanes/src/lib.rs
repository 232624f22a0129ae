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

//! # Hearth Lanes
//!
//! The hot-path algorithms run once per frame on the simulation thread:
//! frame pacing, audio ring synchronisation, and input snapshot building.
//! Lanes hold state but own no OS resources; every device is reached through
//! a `hearth-core` trait so each lane can be driven deterministically in tests.

#![warn(missing_docs)]

pub mod audio_lane;
pub mod input_lane;
pub mod timing_lane;

pub use audio_lane::{draw_sync_markers, AudioCursorState, AudioRingSynchronizer, FillRegion};
pub use input_lane::InputSnapshotBuilder;
pub use timing_lane::{FramePacer, FrameTiming};
