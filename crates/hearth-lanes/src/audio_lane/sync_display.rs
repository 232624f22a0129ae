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

//! Draws the sync marker history over a frame, one vertical line per cursor.
//!
//! Every marker's flip cursors share the top row. The latest marker gets
//! three rows of its own below that: output cursors, the written region, and
//! the flip cursors again, with the expected flip position spanning all three.

use super::{SyncMarker, SyncMarkerLog};
use hearth_core::audio::AudioFormat;
use hearth_core::module::Framebuffer;

const PAD_X: i32 = 16;
const PAD_Y: i32 = 16;
const LINE_HEIGHT: i32 = 64;

/// Samples past the flip play cursor shown as the play window.
const PLAY_WINDOW_SAMPLES: u32 = 480;

const PLAY_COLOR: u32 = 0x00FF_FFFF;
const WRITE_COLOR: u32 = 0x00FF_0000;
const EXPECTED_FLIP_COLOR: u32 = 0x00FF_FF00;
const PLAY_WINDOW_COLOR: u32 = 0x00FF_00FF;

struct Ruler {
    scale: f32,
}

impl Ruler {
    fn x(&self, byte: u32) -> i32 {
        PAD_X + (self.scale * byte as f32) as i32
    }
}

fn draw_vertical(framebuffer: &mut Framebuffer, x: i32, top: i32, bottom: i32, color: u32) {
    let width = framebuffer.width() as i32;
    let height = framebuffer.height() as i32;
    if x < 0 || x >= width {
        return;
    }
    let top = top.clamp(0, height);
    let bottom = bottom.clamp(0, height);
    let pixels = framebuffer.pixels_mut();
    for y in top..bottom {
        pixels[(y * width + x) as usize] = color;
    }
}

fn draw_flip(
    framebuffer: &mut Framebuffer,
    ruler: &Ruler,
    marker: &SyncMarker,
    play_window_bytes: u32,
    top: i32,
    bottom: i32,
) {
    let play = marker.flip_cursors.play;
    draw_vertical(framebuffer, ruler.x(play), top, bottom, PLAY_COLOR);
    draw_vertical(
        framebuffer,
        ruler.x(play.saturating_add(play_window_bytes)),
        top,
        bottom,
        PLAY_WINDOW_COLOR,
    );
    draw_vertical(framebuffer, ruler.x(marker.flip_cursors.write), top, bottom, WRITE_COLOR);
}

/// Overlays `log` on `framebuffer`, scaling `buffer_len` ring bytes to the
/// frame width minus padding.
pub fn draw_sync_markers(
    log: &SyncMarkerLog,
    format: AudioFormat,
    buffer_len: u32,
    framebuffer: &mut Framebuffer,
) {
    if buffer_len == 0 {
        return;
    }
    let ruler = Ruler {
        scale: (framebuffer.width() as f32 - 2.0 * PAD_X as f32) / buffer_len as f32,
    };
    let play_window_bytes = PLAY_WINDOW_SAMPLES * format.bytes_per_sample;
    let step = LINE_HEIGHT + PAD_Y;

    let latest = log.iter().count().saturating_sub(1);
    for (index, marker) in log.iter().enumerate() {
        let mut top = PAD_Y;
        let mut bottom = PAD_Y + LINE_HEIGHT;

        if index == latest {
            top += step;
            bottom += step;
            let first_top = top;

            let cursors = marker.output_cursors;
            draw_vertical(framebuffer, ruler.x(cursors.play), top, bottom, PLAY_COLOR);
            draw_vertical(framebuffer, ruler.x(cursors.write), top, bottom, WRITE_COLOR);

            top += step;
            bottom += step;
            let end = marker.output_location.saturating_add(marker.output_byte_count);
            draw_vertical(framebuffer, ruler.x(marker.output_location), top, bottom, PLAY_COLOR);
            draw_vertical(framebuffer, ruler.x(end), top, bottom, WRITE_COLOR);

            top += step;
            bottom += step;
            draw_vertical(
                framebuffer,
                ruler.x(marker.expected_flip_play_cursor),
                first_top,
                bottom,
                EXPECTED_FLIP_COLOR,
            );
        }

        draw_flip(framebuffer, &ruler, marker, play_window_bytes, top, bottom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::audio::AudioCursors;

    fn pixel(framebuffer: &Framebuffer, x: u32, y: u32) -> u32 {
        framebuffer.pixels()[(y * framebuffer.width() + x) as usize]
    }

    #[test]
    fn latest_marker_is_expanded_below_the_history_row() {
        // ARRANGE
        // 200 usable pixels over 2000 bytes: one pixel per ten bytes.
        let mut framebuffer = Framebuffer::new(232, 330);
        let mut log = SyncMarkerLog::default();
        log.record_output(AudioCursors { play: 100, write: 300 }, 300, 400, 900);
        log.record_flip(AudioCursors { play: 1000, write: 1500 });

        // ACT
        draw_sync_markers(&log, AudioFormat::stereo_i16(48_000), 2000, &mut framebuffer);

        // ASSERT
        assert_eq!(pixel(&framebuffer, 26, 120), PLAY_COLOR, "Output play cursor");
        assert_eq!(pixel(&framebuffer, 46, 120), WRITE_COLOR, "Output write cursor");
        assert_eq!(pixel(&framebuffer, 86, 200), WRITE_COLOR, "End of the written region");
        assert_eq!(pixel(&framebuffer, 106, 300), EXPECTED_FLIP_COLOR);
        assert_eq!(pixel(&framebuffer, 116, 300), PLAY_COLOR, "Flip play cursor");
        assert_eq!(pixel(&framebuffer, 166, 300), WRITE_COLOR, "Flip write cursor");
        assert_eq!(
            pixel(&framebuffer, 116, 40),
            0,
            "The latest marker is not drawn in the history row"
        );
        assert_eq!(
            pixel(&framebuffer, 16, 40),
            WRITE_COLOR,
            "Older empty markers sit at byte zero"
        );
    }

    #[test]
    fn lines_past_the_frame_are_clipped() {
        let mut framebuffer = Framebuffer::new(40, 20);
        let mut log = SyncMarkerLog::default();
        log.record_output(AudioCursors::default(), 0, 10_000, 0);
        log.record_flip(AudioCursors { play: 10_000, write: 10_000 });

        draw_sync_markers(&log, AudioFormat::stereo_i16(48_000), 100, &mut framebuffer);

        assert!(framebuffer.pixels().iter().any(|&p| p != 0));
    }
}
