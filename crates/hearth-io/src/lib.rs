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

//! # Hearth IO
//!
//! Services that work against the filesystem on the simulation thread:
//!
//! - [`replay`]: the session recorder/player, which snapshots the memory
//!   arena and streams input frames to and from replay slots.
//! - [`hot_reload`]: the module hot-swap boundary, which watches the
//!   simulation artifact's timestamp and rebinds its entry points.

#![warn(missing_docs)]

pub mod hot_reload;
pub mod replay;

pub use hot_reload::{HotModule, ModuleLoadError, ReloadOutcome};
pub use replay::{ReplayError, SessionRecorder, SessionState, SnapshotStorage};
