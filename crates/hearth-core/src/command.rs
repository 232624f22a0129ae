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

//! Operator commands, consumed by the engine at frame boundaries.

use crate::platform::{Key, KeyEvent};
use std::fmt;
use std::str::FromStr;

/// The replay slot the `L` key drives.
pub const DEFAULT_LOOP_SLOT: u8 = 1;

/// A request from the person running the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Stop the loop after the current frame.
    Quit,
    /// Freeze or resume the simulation.
    TogglePause,
    /// Switch between windowed and fullscreen presentation.
    ToggleFullscreen,
    /// Start or stop recording into a replay slot.
    ToggleRecord(u8),
    /// Start or stop playing back a replay slot.
    TogglePlayback(u8),
    /// Step the single-key loop: idle, recording, playing, idle.
    CycleLoop(u8),
}

impl OperatorCommand {
    /// Maps a keyboard event to a shell command, if the key has one.
    ///
    /// Only key-down edges trigger commands.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if !event.is_down || event.is_repeat() {
            return None;
        }
        match event.key {
            Key::P => Some(OperatorCommand::TogglePause),
            Key::L => Some(OperatorCommand::CycleLoop(DEFAULT_LOOP_SLOT)),
            Key::Enter if event.alt_down => Some(OperatorCommand::ToggleFullscreen),
            Key::F4 if event.alt_down => Some(OperatorCommand::Quit),
            Key::Escape => Some(OperatorCommand::Quit),
            _ => None,
        }
    }
}

/// A console line that is not a known command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(String);

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown operator command: '{}'", self.0)
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for OperatorCommand {
    type Err = ParseCommandError;

    /// Parses console syntax: `quit`, `pause`, `fullscreen`, `record [slot]`,
    /// `play [slot]`, `loop [slot]`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| ParseCommandError(line.to_owned()))?;
        let slot = match words.next() {
            Some(word) => word
                .parse::<u8>()
                .map_err(|_| ParseCommandError(line.to_owned()))?,
            None => DEFAULT_LOOP_SLOT,
        };
        if words.next().is_some() {
            return Err(ParseCommandError(line.to_owned()));
        }

        match verb.to_ascii_lowercase().as_str() {
            "quit" | "exit" => Ok(OperatorCommand::Quit),
            "pause" => Ok(OperatorCommand::TogglePause),
            "fullscreen" => Ok(OperatorCommand::ToggleFullscreen),
            "record" => Ok(OperatorCommand::ToggleRecord(slot)),
            "play" => Ok(OperatorCommand::TogglePlayback(slot)),
            "loop" => Ok(OperatorCommand::CycleLoop(slot)),
            _ => Err(ParseCommandError(line.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(key: Key, alt_down: bool) -> KeyEvent {
        KeyEvent {
            key,
            is_down: true,
            was_down: false,
            alt_down,
        }
    }

    #[test]
    fn keys_map_to_commands_on_press_only() {
        assert_eq!(
            OperatorCommand::from_key_event(&key_down(Key::P, false)),
            Some(OperatorCommand::TogglePause)
        );
        assert_eq!(
            OperatorCommand::from_key_event(&key_down(Key::L, false)),
            Some(OperatorCommand::CycleLoop(1))
        );

        let release = KeyEvent {
            is_down: false,
            was_down: true,
            ..key_down(Key::P, false)
        };
        assert_eq!(OperatorCommand::from_key_event(&release), None);
    }

    #[test]
    fn alt_combinations_are_required() {
        assert_eq!(
            OperatorCommand::from_key_event(&key_down(Key::Enter, false)),
            None
        );
        assert_eq!(
            OperatorCommand::from_key_event(&key_down(Key::Enter, true)),
            Some(OperatorCommand::ToggleFullscreen)
        );
        assert_eq!(
            OperatorCommand::from_key_event(&key_down(Key::F4, true)),
            Some(OperatorCommand::Quit)
        );
    }

    #[test]
    fn console_lines_parse() {
        assert_eq!("pause".parse::<OperatorCommand>(), Ok(OperatorCommand::TogglePause));
        assert_eq!("record 2".parse::<OperatorCommand>(), Ok(OperatorCommand::ToggleRecord(2)));
        assert_eq!("PLAY".parse::<OperatorCommand>(), Ok(OperatorCommand::TogglePlayback(1)));
        assert!("record two".parse::<OperatorCommand>().is_err());
        assert!("dance".parse::<OperatorCommand>().is_err());
        assert!("".parse::<OperatorCommand>().is_err());
    }
}
