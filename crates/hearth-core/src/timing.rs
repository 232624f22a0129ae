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

//! Defines the abstract `ClockSource` trait used for frame pacing.

use std::time::Duration;

/// A monotonic, high-resolution time source.
///
/// Time is expressed in opaque integer ticks; `ticks_per_second` converts them
/// to seconds. Implementations must never go backwards.
pub trait ClockSource {
    /// Returns the current tick counter.
    fn now(&self) -> u64;

    /// Returns the number of ticks in one second.
    fn ticks_per_second(&self) -> u64;

    /// Yields the calling thread for roughly `duration`.
    ///
    /// The actual wait may overshoot; callers that need precision follow up
    /// with a spin on [`ClockSource::now`].
    fn sleep(&self, duration: Duration);

    /// Returns `true` if [`ClockSource::sleep`] has millisecond granularity
    /// and can be trusted for coarse waits.
    fn sleep_is_granular(&self) -> bool;

    /// Converts a tick interval into seconds.
    fn seconds_elapsed(&self, start: u64, end: u64) -> f32 {
        let ticks = end.saturating_sub(start);
        (ticks as f64 / self.ticks_per_second() as f64) as f32
    }
}
