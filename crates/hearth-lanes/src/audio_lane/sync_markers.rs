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

//! A short history of cursor positions, for diagnosing audio sync.

use hearth_core::audio::AudioCursors;

/// Number of frames of history kept.
pub const SYNC_MARKER_COUNT: usize = 30;

/// Cursor positions observed during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncMarker {
    /// Cursors when the fill region was planned.
    pub output_cursors: AudioCursors,
    /// Byte offset the fill started at.
    pub output_location: u32,
    /// Bytes written.
    pub output_byte_count: u32,
    /// Where the play cursor was expected to be at the flip.
    pub expected_flip_play_cursor: u32,
    /// Cursors right after the frame was presented.
    pub flip_cursors: AudioCursors,
}

/// A fixed ring of [`SyncMarker`]s.
///
/// The output half of a marker is written while audio is planned, the flip
/// half after presentation; recording the flip closes the marker and moves on.
#[derive(Debug, Clone)]
pub struct SyncMarkerLog {
    markers: [SyncMarker; SYNC_MARKER_COUNT],
    index: usize,
}

impl Default for SyncMarkerLog {
    fn default() -> Self {
        Self {
            markers: [SyncMarker::default(); SYNC_MARKER_COUNT],
            index: 0,
        }
    }
}

impl SyncMarkerLog {
    /// Fills the output half of the current marker.
    pub fn record_output(
        &mut self,
        cursors: AudioCursors,
        location: u32,
        byte_count: u32,
        expected_flip_play_cursor: u32,
    ) {
        let marker = &mut self.markers[self.index];
        marker.output_cursors = cursors;
        marker.output_location = location;
        marker.output_byte_count = byte_count;
        marker.expected_flip_play_cursor = expected_flip_play_cursor;
    }

    /// Fills the flip half of the current marker and advances.
    pub fn record_flip(&mut self, cursors: AudioCursors) {
        self.markers[self.index].flip_cursors = cursors;
        log::trace!("Audio sync marker {}: {:?}", self.index, self.markers[self.index]);
        self.index = (self.index + 1) % SYNC_MARKER_COUNT;
    }

    /// The most recently closed marker.
    pub fn latest(&self) -> &SyncMarker {
        &self.markers[(self.index + SYNC_MARKER_COUNT - 1) % SYNC_MARKER_COUNT]
    }

    /// Every marker, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SyncMarker> {
        self.markers[self.index..]
            .iter()
            .chain(self.markers[..self.index].iter())
    }
}
