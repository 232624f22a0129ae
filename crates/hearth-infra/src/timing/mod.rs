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

//! Contains the `MonotonicClock` struct.

use hearth_core::timing::ClockSource;
use std::time::{Duration, Instant};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// A [`ClockSource`] counting nanoseconds since it was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock at tick zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for MonotonicClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn ticks_per_second(&self) -> u64 {
        NANOS_PER_SECOND
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn sleep_is_granular(&self) -> bool {
        // Windows rounds sleeps up to the ~15.6 ms scheduler tick unless the
        // timer resolution is raised, so only spin there.
        cfg!(not(windows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_never_go_backwards() {
        let clock = MonotonicClock::new();
        let mut last = clock.now();
        for _ in 0..1000 {
            let now = clock.now();
            assert!(now >= last, "Clock went backwards: {now} < {last}");
            last = now;
        }
    }

    #[test]
    fn sleep_advances_at_least_the_requested_time() {
        let clock = MonotonicClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_millis(5));

        let elapsed = clock.seconds_elapsed(start, clock.now());
        assert!(elapsed >= 0.005, "Expected >= 5 ms, got {elapsed} s");
    }
}
