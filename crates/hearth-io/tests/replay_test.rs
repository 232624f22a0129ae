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

use hearth_core::input::InputFrame;
use hearth_core::MemoryArena;
use hearth_io::replay::{ReplayError, SessionRecorder, SessionState, SnapshotStorage};
use std::fs::OpenOptions;
use std::io::Write;

fn frame(i: i32) -> InputFrame {
    let mut frame = InputFrame::default();
    frame.mouse_x = i;
    frame.dt_for_frame = 1.0 / 30.0;
    frame.controllers[0].is_connected = 1;
    frame.controllers[0].buttons.start.half_transition_count = i % 3;
    frame
}

fn sentinel() -> InputFrame {
    let mut frame = InputFrame::default();
    frame.mouse_x = -1;
    frame
}

fn arena() -> MemoryArena {
    MemoryArena::new(64, 64)
}

#[test]
fn playback_reproduces_the_recorded_stream_for_any_length() {
    for n in [0, 1, 2, 7] {
        // ARRANGE
        let dir = tempfile::tempdir().expect("temp dir");
        let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
        let mut memory = arena();
        let recorded: Vec<InputFrame> = (0..n).map(frame).collect();

        recorder
            .begin_recording(1, &memory)
            .expect("recording starts");
        for input in &recorded {
            recorder.record_input(input).expect("record succeeds");
        }
        recorder.end_recording().expect("recording ends");
        assert_eq!(recorder.frames_recorded(), n as u64);

        // ACT
        recorder
            .begin_playback(1, &mut memory)
            .expect("playback starts");
        let mut played = Vec::new();
        for _ in 0..n {
            let mut input = sentinel();
            let replaced = recorder
                .playback_input(&mut input, &mut memory)
                .expect("read succeeds");
            assert!(replaced, "Every recorded frame should be played back");
            played.push(input);
        }

        // ASSERT
        let recorded_bytes: Vec<u8> = recorded.iter().flat_map(|f| f.as_bytes().to_vec()).collect();
        let played_bytes: Vec<u8> = played.iter().flat_map(|f| f.as_bytes().to_vec()).collect();
        assert_eq!(played_bytes, recorded_bytes, "Stream of {n} frames differs");

        if n == 0 {
            let mut input = sentinel();
            let replaced = recorder
                .playback_input(&mut input, &mut memory)
                .expect("read succeeds");
            assert!(!replaced);
            assert_eq!(input, sentinel(), "An empty stream leaves live input alone");
            assert_eq!(recorder.state(), SessionState::Idle);
        }
    }
}

#[test]
fn end_of_stream_loops_back_to_the_first_record() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    let mut memory = arena();
    recorder.begin_recording(2, &memory).expect("recording starts");
    for i in 10..13 {
        recorder.record_input(&frame(i)).expect("record succeeds");
    }
    recorder.end_recording().expect("recording ends");
    recorder.begin_playback(2, &mut memory).expect("playback starts");

    let mut input = sentinel();
    for _ in 0..3 {
        recorder
            .playback_input(&mut input, &mut memory)
            .expect("read succeeds");
    }
    assert_eq!(input, frame(12));

    let replaced = recorder
        .playback_input(&mut input, &mut memory)
        .expect("read succeeds");

    assert!(replaced);
    assert_eq!(input, frame(10), "The stream restarts seamlessly");
    assert_eq!(recorder.loops_played(), 1);
    assert_eq!(recorder.state(), SessionState::Playing { slot: 2 });
}

#[test]
fn playback_restores_memory_captured_at_recording_entry() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    let mut memory = arena();
    memory.permanent_mut()[0] = 42;
    memory.transient_mut()[5] = 17;

    recorder.begin_recording(1, &memory).expect("recording starts");
    memory.permanent_mut()[0] = 99;
    recorder.record_input(&frame(0)).expect("record succeeds");
    recorder.end_recording().expect("recording ends");
    memory.permanent_mut()[0] = 7;
    memory.transient_mut()[5] = 0;

    recorder.begin_playback(1, &mut memory).expect("playback starts");

    assert_eq!(memory.permanent()[0], 42);
    assert_eq!(memory.transient()[5], 17);

    // Looping rewinds the arena again.
    let mut input = sentinel();
    recorder.playback_input(&mut input, &mut memory).expect("read succeeds");
    memory.permanent_mut()[0] = 5;
    recorder.playback_input(&mut input, &mut memory).expect("read succeeds");
    assert_eq!(memory.permanent()[0], 42);
}

#[test]
fn mapped_snapshots_survive_a_new_recorder() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut memory = arena();
    memory.permanent_mut()[3] = 0xAB;

    {
        let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::Mapped);
        recorder.begin_recording(3, &memory).expect("recording starts");
        recorder.record_input(&frame(1)).expect("record succeeds");
        recorder.end_recording().expect("recording ends");

        let slot = recorder.slot(3).expect("slot exists");
        let len = std::fs::metadata(slot.state_path()).expect("state file").len();
        assert_eq!(len as usize, memory.total_size());
    }

    memory.permanent_mut()[3] = 0;
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::Mapped);
    recorder.begin_playback(3, &mut memory).expect("playback starts");

    assert_eq!(memory.permanent()[3], 0xAB);
    let mut input = sentinel();
    assert!(recorder.playback_input(&mut input, &mut memory).expect("read succeeds"));
    assert_eq!(input, frame(1));
}

#[test]
fn cycle_steps_through_record_play_and_idle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    let mut memory = arena();

    recorder.cycle(1, &mut memory).expect("cycle");
    assert_eq!(recorder.state(), SessionState::Recording { slot: 1 });
    recorder.record_input(&frame(4)).expect("record succeeds");

    recorder.cycle(1, &mut memory).expect("cycle");
    assert_eq!(recorder.state(), SessionState::Playing { slot: 1 });

    recorder.cycle(1, &mut memory).expect("cycle");
    assert_eq!(recorder.state(), SessionState::Idle);
}

#[test]
fn toggles_never_leave_both_modes_active() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    let mut memory = arena();
    recorder.toggle_recording(1, &memory).expect("recording starts");
    recorder.record_input(&frame(0)).expect("record succeeds");

    recorder.toggle_playback(1, &mut memory).expect("playback starts");
    assert_eq!(recorder.state(), SessionState::Playing { slot: 1 });

    // Recording while playing stops the playback.
    recorder.toggle_recording(2, &memory).expect("recording starts");
    assert_eq!(recorder.state(), SessionState::Recording { slot: 2 });

    recorder.toggle_recording(2, &memory).expect("recording ends");
    assert_eq!(recorder.state(), SessionState::Idle);
}

#[test]
fn unavailable_slots_are_a_no_op() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    let mut memory = arena();

    let unknown = recorder.toggle_recording(9, &memory);
    assert!(matches!(unknown, Err(ReplayError::UnknownSlot(9))));
    assert!(matches!(
        recorder.toggle_recording(0, &memory),
        Err(ReplayError::UnknownSlot(0))
    ));

    recorder.begin_recording(1, &memory).expect("recording starts");
    let never_recorded = recorder.toggle_playback(2, &mut memory);

    assert!(matches!(never_recorded, Err(ReplayError::NoSnapshot(2))));
    assert_eq!(
        recorder.state(),
        SessionState::Recording { slot: 1 },
        "A failed toggle must not disturb the active session"
    );
}

#[test]
fn stream_without_snapshot_keeps_the_active_recording() {
    // ARRANGE: slot 2 has an input stream from an earlier recorder, but its
    // heap snapshot died with that recorder.
    let dir = tempfile::tempdir().expect("temp dir");
    let mut memory = arena();
    {
        let mut earlier = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
        earlier.begin_recording(2, &memory).expect("recording starts");
        earlier.record_input(&frame(4)).expect("record succeeds");
        earlier.end_recording().expect("recording ends");
    }
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    recorder.begin_recording(1, &memory).expect("recording starts");

    // ACT
    let result = recorder.toggle_playback(2, &mut memory);

    // ASSERT
    assert!(matches!(result, Err(ReplayError::NoSnapshot(2))));
    assert_eq!(
        recorder.state(),
        SessionState::Recording { slot: 1 },
        "The recording must survive a playback request it cannot honour"
    );
    recorder.record_input(&frame(5)).expect("still recording");
    assert_eq!(recorder.frames_recorded(), 1);
}

#[test]
fn mismatched_snapshot_keeps_the_active_playback() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let small = MemoryArena::new(8, 8);
        let mut earlier = SessionRecorder::new(dir.path(), 3, SnapshotStorage::Mapped);
        earlier.begin_recording(2, &small).expect("recording starts");
        earlier.end_recording().expect("recording ends");
    }
    let mut memory = arena();
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::Mapped);
    recorder.begin_recording(1, &memory).expect("recording starts");
    recorder.record_input(&frame(1)).expect("record succeeds");
    recorder.toggle_playback(1, &mut memory).expect("playback starts");

    let result = recorder.toggle_playback(2, &mut memory);

    assert!(matches!(result, Err(ReplayError::SizeMismatch { slot: 2, .. })));
    assert_eq!(recorder.state(), SessionState::Playing { slot: 1 });
    let mut input = sentinel();
    assert!(recorder.playback_input(&mut input, &mut memory).expect("read succeeds"));
    assert_eq!(input, frame(1));
}

#[test]
fn truncated_trailing_record_reads_as_end_of_stream() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    let mut memory = arena();
    recorder.begin_recording(1, &memory).expect("recording starts");
    recorder.record_input(&frame(8)).expect("record succeeds");
    recorder.end_recording().expect("recording ends");

    let input_path = recorder.slot(1).expect("slot exists").input_path().to_path_buf();
    let mut file = OpenOptions::new()
        .append(true)
        .open(&input_path)
        .expect("input stream exists");
    file.write_all(&[1, 2, 3]).expect("append partial record");
    drop(file);

    recorder.begin_playback(1, &mut memory).expect("playback starts");
    let mut input = sentinel();
    recorder.playback_input(&mut input, &mut memory).expect("read succeeds");
    input = sentinel();
    let replaced = recorder
        .playback_input(&mut input, &mut memory)
        .expect("read succeeds");

    assert!(replaced);
    assert_eq!(input, frame(8));
    assert_eq!(recorder.loops_played(), 1);
}

#[test]
fn record_input_is_ignored_when_idle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut recorder = SessionRecorder::new(dir.path(), 3, SnapshotStorage::InMemory);
    let mut memory = arena();

    recorder.record_input(&frame(1)).expect("no-op");
    let mut input = sentinel();
    let replaced = recorder
        .playback_input(&mut input, &mut memory)
        .expect("no-op");

    assert!(!replaced);
    assert_eq!(recorder.frames_recorded(), 0);
    assert!(!dir.path().join("loop_edit_1_input.hmi").exists());
}
