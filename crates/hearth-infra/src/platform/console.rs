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

//! A line-based operator console.
//!
//! A helper thread reads lines, parses them as [`OperatorCommand`]s and
//! sends them over a channel. The simulation thread drains the channel when
//! it pumps events, so commands always land on a frame boundary.

use crossbeam_channel::{Receiver, Sender};
use hearth_core::command::OperatorCommand;
use hearth_core::platform::{GamepadState, InputProvider, MouseState, PlatformEvent};
use std::io::{self, BufRead, BufReader};
use std::thread;

/// Receives operator commands typed on a text stream.
#[derive(Debug)]
pub struct OperatorConsole {
    receiver: Receiver<OperatorCommand>,
}

impl OperatorConsole {
    /// Reads commands from the process's standard input.
    pub fn stdin() -> io::Result<Self> {
        Self::spawn_reader(BufReader::new(io::stdin()))
    }

    /// Reads commands from `reader` on a background thread.
    ///
    /// The thread ends at end of input or once the console is dropped.
    pub fn spawn_reader<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name("operator-console".to_owned())
            .spawn(move || read_commands(reader, &sender))?;
        Ok(Self { receiver })
    }

    /// Moves every command received so far into `events`.
    pub fn drain(&self, events: &mut Vec<PlatformEvent>) {
        events.extend(self.receiver.try_iter().map(PlatformEvent::Command));
    }
}

fn read_commands<R: BufRead>(reader: R, sender: &Sender<OperatorCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Operator console stopped reading: {e}");
                return;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<OperatorCommand>() {
            Ok(command) => {
                log::debug!("Operator command: {command:?}");
                if sender.send(command).is_err() {
                    return;
                }
            }
            Err(e) => log::warn!("{e}"),
        }
    }
    log::debug!("Operator console reached end of input");
}

/// Wraps an [`InputProvider`] and appends console commands to its events.
#[derive(Debug)]
pub struct ConsoleInputProvider<P> {
    inner: P,
    console: OperatorConsole,
}

impl<P: InputProvider> ConsoleInputProvider<P> {
    /// Combines `inner` with `console`.
    pub fn new(inner: P, console: OperatorConsole) -> Self {
        Self { inner, console }
    }
}

impl<P: InputProvider> InputProvider for ConsoleInputProvider<P> {
    fn pump_events(&mut self, events: &mut Vec<PlatformEvent>) {
        self.inner.pump_events(events);
        self.console.drain(events);
    }

    fn mouse(&self) -> MouseState {
        self.inner.mouse()
    }

    fn gamepad_count(&self) -> usize {
        self.inner.gamepad_count()
    }

    fn poll_gamepad(&mut self, index: usize) -> Option<GamepadState> {
        self.inner.poll_gamepad(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::platform::NullInputProvider;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn parsed_lines_arrive_in_order_and_bad_lines_are_skipped() {
        // ARRANGE
        let input = Cursor::new("pause\n\nfrobnicate\nrecord 2\n  quit  \n");
        let console = OperatorConsole::spawn_reader(input).expect("spawn console");

        // ACT
        let mut received = Vec::new();
        while let Ok(command) = console.receiver.recv_timeout(Duration::from_secs(2)) {
            received.push(command);
        }

        // ASSERT
        assert_eq!(
            received,
            vec![
                OperatorCommand::TogglePause,
                OperatorCommand::ToggleRecord(2),
                OperatorCommand::Quit,
            ]
        );
    }

    #[test]
    fn provider_appends_console_commands_after_inner_events() {
        let console = OperatorConsole::spawn_reader(Cursor::new("fullscreen\n")).expect("spawn console");
        let mut provider = ConsoleInputProvider::new(NullInputProvider, console);

        let mut events = Vec::new();
        for _ in 0..200 {
            provider.pump_events(&mut events);
            if !events.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(
            events,
            vec![PlatformEvent::Command(OperatorCommand::ToggleFullscreen)]
        );
        assert_eq!(provider.gamepad_count(), 0);
    }
}
