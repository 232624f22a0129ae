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

//! Frame timing statistics, reported once per interval.

use std::fmt;
use std::time::{Duration, Instant};

/// Statistics over the frames of one reporting interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSummary {
    /// Frames completed.
    pub frames: u64,
    /// Frames whose work overran the target duration.
    pub missed: u64,
    /// Average frame duration in milliseconds.
    pub average_ms: f32,
    /// Longest frame duration in milliseconds.
    pub worst_ms: f32,
    /// Frames whose audio write was skipped.
    pub audio_dropouts: u64,
    /// Module reloads.
    pub reloads: u64,
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, avg {:.2} ms, worst {:.2} ms, {} missed, {} audio dropouts, {} reloads",
            self.frames, self.average_ms, self.worst_ms, self.missed, self.audio_dropouts, self.reloads
        )
    }
}

/// Accumulates frame statistics and hands out a [`FrameSummary`] once per
/// update interval.
#[derive(Debug)]
pub struct FrameTelemetry {
    current: FrameSummary,
    total_ms: f64,
    last_update: Instant,
    update_interval: Duration,
}

impl FrameTelemetry {
    /// Creates a collector that reports every `update_interval`.
    pub fn new(update_interval: Duration) -> Self {
        Self {
            current: FrameSummary::default(),
            total_ms: 0.0,
            last_update: Instant::now(),
            update_interval,
        }
    }

    /// Records one finished frame.
    pub fn record_frame(&mut self, frame_seconds: f32, missed: bool) {
        let ms = frame_seconds * 1000.0;
        self.current.frames += 1;
        self.total_ms += f64::from(ms);
        self.current.worst_ms = self.current.worst_ms.max(ms);
        if missed {
            self.current.missed += 1;
        }
    }

    /// Records a frame whose audio write was skipped.
    pub fn record_audio_dropout(&mut self) {
        self.current.audio_dropouts += 1;
    }

    /// Records a module reload.
    pub fn record_reload(&mut self) {
        self.current.reloads += 1;
    }

    /// Should be called once per frame. Returns the summary of the elapsed
    /// interval when it is over and starts a new one.
    pub fn tick(&mut self) -> Option<FrameSummary> {
        if self.last_update.elapsed() < self.update_interval {
            return None;
        }
        self.last_update = Instant::now();
        Some(self.take_summary())
    }

    /// Returns the statistics gathered so far and resets them.
    pub fn take_summary(&mut self) -> FrameSummary {
        let mut summary = std::mem::take(&mut self.current);
        if summary.frames > 0 {
            summary.average_ms = (self.total_ms / summary.frames as f64) as f32;
        }
        self.total_ms = 0.0;
        summary
    }
}

impl Default for FrameTelemetry {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_aggregates_and_resets() {
        // ARRANGE
        let mut telemetry = FrameTelemetry::new(Duration::ZERO);
        telemetry.record_frame(0.010, false);
        telemetry.record_frame(0.030, true);
        telemetry.record_audio_dropout();
        telemetry.record_reload();

        // ACT
        let summary = telemetry.tick().expect("a zero interval always reports");

        // ASSERT
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.missed, 1);
        assert!((summary.average_ms - 20.0).abs() < 1e-3);
        assert!((summary.worst_ms - 30.0).abs() < 1e-3);
        assert_eq!(summary.audio_dropouts, 1);
        assert_eq!(summary.reloads, 1);

        let next = telemetry.take_summary();
        assert_eq!(next, FrameSummary::default(), "Counters restart each interval");
    }

    #[test]
    fn tick_waits_for_the_interval() {
        let mut telemetry = FrameTelemetry::new(Duration::from_secs(3600));
        telemetry.record_frame(0.016, false);

        assert!(telemetry.tick().is_none());
    }
}
