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

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the session recorder.
///
/// None of these are fatal to the loop: the engine logs them and the
/// requested transition simply does not happen.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The slot number is outside the configured range.
    #[error("replay slot {0} does not exist")]
    UnknownSlot(u8),

    /// Playback was requested for a slot that was never recorded.
    #[error("replay slot {0} has no recorded snapshot")]
    NoSnapshot(u8),

    /// A persisted snapshot does not match the arena it would restore.
    #[error("snapshot for slot {slot} is {found} bytes but the arena is {expected} bytes")]
    SizeMismatch {
        /// The slot number.
        slot: u8,
        /// Arena size in bytes.
        expected: usize,
        /// Snapshot size in bytes.
        found: usize,
    },

    /// A replay file could not be created, mapped, read, or written.
    #[error("replay I/O failed on '{}': {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl ReplayError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReplayError::Io {
            path: path.into(),
            source,
        }
    }
}
