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

//! Holds the frame to a fixed target duration.

use hearth_core::ClockSource;
use std::time::Duration;

/// What one call to [`FramePacer::wait_for_frame_end`] measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Seconds spent on the frame's work, before any waiting.
    pub work_seconds: f32,
    /// Seconds from the previous frame end to this one, waiting included.
    pub frame_seconds: f32,
    /// `true` if the work alone overran the target.
    pub missed: bool,
}

/// Paces the loop to a fixed frame duration.
///
/// The pacer keeps two reference points: the *last counter*, taken when the
/// previous frame ended and only moved by [`FramePacer::wait_for_frame_end`],
/// and the *flip counter*, taken when the previous frame was presented and
/// used by the audio lane to locate the next frame boundary.
#[derive(Debug)]
pub struct FramePacer {
    target_seconds: f32,
    last_counter: u64,
    flip_counter: u64,
    missed_frames: u64,
}

impl FramePacer {
    /// Creates a pacer anchored at the clock's current time.
    pub fn new<C: ClockSource + ?Sized>(target_seconds: f32, clock: &C) -> Self {
        let now = clock.now();
        Self {
            target_seconds,
            last_counter: now,
            flip_counter: now,
            missed_frames: 0,
        }
    }

    /// Creates a pacer for `update_hz` frames per second.
    pub fn from_update_hz<C: ClockSource + ?Sized>(update_hz: f32, clock: &C) -> Self {
        Self::new(1.0 / update_hz, clock)
    }

    /// The target frame duration in seconds.
    pub fn target_seconds(&self) -> f32 {
        self.target_seconds
    }

    /// Number of frames whose work overran the target so far.
    pub fn missed_frames(&self) -> u64 {
        self.missed_frames
    }

    /// Waits until the target duration has elapsed since the previous frame
    /// ended, then starts the next measurement.
    ///
    /// With a granular clock the bulk of the remaining time is slept in whole
    /// milliseconds; the rest is spun so sleep overshoot on one frame does
    /// not accumulate. An overrun is reported, never waited on.
    pub fn wait_for_frame_end<C: ClockSource + ?Sized>(&mut self, clock: &C) -> FrameTiming {
        let work_seconds = clock.seconds_elapsed(self.last_counter, clock.now());
        let missed = work_seconds > self.target_seconds;

        if missed {
            self.missed_frames += 1;
            log::warn!(
                "Missed frame: work took {:.2} ms of a {:.2} ms budget",
                work_seconds * 1000.0,
                self.target_seconds * 1000.0
            );
        } else {
            if clock.sleep_is_granular() {
                let sleep_ms = ((self.target_seconds - work_seconds) * 1000.0) as u64;
                if sleep_ms > 0 {
                    clock.sleep(Duration::from_millis(sleep_ms));
                }
            }
            while clock.seconds_elapsed(self.last_counter, clock.now()) < self.target_seconds {
                std::hint::spin_loop();
            }
        }

        let end_counter = clock.now();
        let frame_seconds = clock.seconds_elapsed(self.last_counter, end_counter);
        self.last_counter = end_counter;

        FrameTiming {
            work_seconds,
            frame_seconds,
            missed,
        }
    }

    /// Re-anchors both reference points at the clock's current time.
    ///
    /// Used after a stall the pacer should not measure, such as a pause.
    pub fn restart<C: ClockSource + ?Sized>(&mut self, clock: &C) {
        let now = clock.now();
        self.last_counter = now;
        self.flip_counter = now;
    }

    /// Records the moment the frame was handed to the presenter.
    pub fn mark_flip<C: ClockSource + ?Sized>(&mut self, clock: &C) {
        self.flip_counter = clock.now();
    }

    /// Seconds since the last [`FramePacer::mark_flip`].
    pub fn seconds_since_flip<C: ClockSource + ?Sized>(&self, clock: &C) -> f32 {
        clock.seconds_elapsed(self.flip_counter, clock.now())
    }
}
