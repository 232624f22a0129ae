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

//! The `Hearth.toml` configuration file.
//!
//! Every field has a default, so a missing file or a partial one is fine.

use anyhow::{Context, Result};
use hearth_io::SnapshotStorage;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MIB: usize = 1024 * 1024;

/// The default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "Hearth.toml";

/// A configuration value the engine cannot run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// `timing.monitor_refresh_hz` or `timing.update_divisor` is zero.
    #[error("update rate is zero ({refresh_hz} Hz / {divisor})")]
    ZeroUpdateRate {
        /// The configured refresh rate.
        refresh_hz: u32,
        /// The configured divisor.
        divisor: u32,
    },
    /// `audio.samples_per_second` is zero.
    #[error("audio sample rate must be positive")]
    ZeroSampleRate,
    /// `memory.permanent_mib` is zero.
    #[error("permanent storage must be at least 1 MiB")]
    NoPermanentStorage,
    /// The arena size does not fit in the address space.
    #[error("memory arena of {permanent_mib} + {transient_mib} MiB is too large")]
    ArenaTooLarge {
        /// The configured permanent size.
        permanent_mib: usize,
        /// The configured transient size.
        transient_mib: usize,
    },
    /// `replay.slot_count` is zero.
    #[error("at least one replay slot is required")]
    NoReplaySlots,
    /// `framebuffer.width` or `framebuffer.height` is zero.
    #[error("framebuffer must not be empty ({width}x{height})")]
    EmptyFramebuffer {
        /// The configured width.
        width: u32,
        /// The configured height.
        height: u32,
    },
    /// `telemetry.report_interval_secs` is negative or not finite.
    #[error("telemetry report interval must be a non-negative number of seconds")]
    BadReportInterval,
}

/// Frame cadence.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Refresh rate assumed for the display.
    pub monitor_refresh_hz: u32,
    /// The simulation runs at `monitor_refresh_hz / update_divisor`.
    pub update_divisor: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            monitor_refresh_hz: 60,
            update_divisor: 2,
        }
    }
}

/// Audio output.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Requested output rate. The device's native rate wins if it differs.
    pub samples_per_second: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            samples_per_second: 48_000,
        }
    }
}

/// Memory arena sizes.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Permanent storage in MiB.
    pub permanent_mib: usize,
    /// Transient storage in MiB.
    pub transient_mib: usize,
}

impl MemoryConfig {
    /// Permanent storage in bytes, saturating for sizes [`EngineConfig::validate`]
    /// rejects.
    pub fn permanent_bytes(&self) -> usize {
        self.permanent_mib.saturating_mul(MIB)
    }

    /// Transient storage in bytes, saturating like [`Self::permanent_bytes`].
    pub fn transient_bytes(&self) -> usize {
        self.transient_mib.saturating_mul(MIB)
    }

    /// The whole arena in bytes, or `None` if it overflows `isize`.
    fn checked_total_bytes(&self) -> Option<usize> {
        let total = self
            .permanent_mib
            .checked_mul(MIB)?
            .checked_add(self.transient_mib.checked_mul(MIB)?)?;
        (total <= isize::MAX as usize).then_some(total)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            permanent_mib: 64,
            transient_mib: 128,
        }
    }
}

/// Where snapshots are kept, as spelled in the file.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplayStorage {
    /// Memory-mapped files in the replay directory.
    #[default]
    Mapped,
    /// Heap buffers.
    Memory,
}

impl From<ReplayStorage> for SnapshotStorage {
    fn from(storage: ReplayStorage) -> Self {
        match storage {
            ReplayStorage::Mapped => SnapshotStorage::Mapped,
            ReplayStorage::Memory => SnapshotStorage::InMemory,
        }
    }
}

/// Session record and replay.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReplayConfig {
    /// Directory for snapshot and input files.
    pub directory: PathBuf,
    /// Number of slots, numbered from 1.
    pub slot_count: u8,
    /// Snapshot storage.
    pub storage: ReplayStorage,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("replays"),
            slot_count: 4,
            storage: ReplayStorage::default(),
        }
    }
}

/// The simulation module.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModuleConfig {
    /// The build artifact to watch and load.
    pub path: PathBuf,
}

impl Default for ModuleConfig {
    /// Points at the demo module of a debug workspace build.
    fn default() -> Self {
        Self {
            path: PathBuf::from(format!(
                "target/debug/{}hearth_sandbox{}",
                std::env::consts::DLL_PREFIX,
                std::env::consts::DLL_SUFFIX
            )),
        }
    }
}

/// The pixel buffer handed to the simulation.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FramebufferConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
        }
    }
}

/// Logging and frame statistics.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Seconds between frame summaries.
    pub report_interval_secs: f32,
}

impl TelemetryConfig {
    /// The report interval as a `Duration`.
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs_f32(self.report_interval_secs.max(0.0))
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            report_interval_secs: 1.0,
        }
    }
}

/// Developer overlays.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Draw the audio sync marker history over each presented frame.
    pub audio_sync_overlay: bool,
}

/// Represents the structure of the `Hearth.toml` file.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame cadence.
    pub timing: TimingConfig,
    /// Audio output.
    pub audio: AudioConfig,
    /// Memory arena sizes.
    pub memory: MemoryConfig,
    /// Session record and replay.
    pub replay: ReplayConfig,
    /// The simulation module.
    pub module: ModuleConfig,
    /// The simulation's framebuffer.
    pub framebuffer: FramebufferConfig,
    /// Logging and statistics.
    pub telemetry: TelemetryConfig,
    /// Developer overlays.
    pub debug: DebugConfig,
}

impl EngineConfig {
    /// Loads `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            log::info!("Found '{}'. Loading configuration.", path.display());
            let config_str = fs::read_to_string(path).with_context(|| {
                format!("Failed to read configuration file at '{}'", path.display())
            })?;
            Self::from_toml_str(&config_str)
                .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))?
        } else {
            log::info!("No '{}' found. Using default configuration.", path.display());
            Self::default()
        };

        config
            .validate()
            .with_context(|| format!("Invalid configuration in '{}'", path.display()))?;
        Ok(config)
    }

    /// Parses a configuration document without validating it.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Checks the values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.monitor_refresh_hz == 0 || self.timing.update_divisor == 0 {
            return Err(ConfigError::ZeroUpdateRate {
                refresh_hz: self.timing.monitor_refresh_hz,
                divisor: self.timing.update_divisor,
            });
        }
        if self.audio.samples_per_second == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.memory.permanent_mib == 0 {
            return Err(ConfigError::NoPermanentStorage);
        }
        if self.memory.checked_total_bytes().is_none() {
            return Err(ConfigError::ArenaTooLarge {
                permanent_mib: self.memory.permanent_mib,
                transient_mib: self.memory.transient_mib,
            });
        }
        if self.replay.slot_count == 0 {
            return Err(ConfigError::NoReplaySlots);
        }
        if self.framebuffer.width == 0 || self.framebuffer.height == 0 {
            return Err(ConfigError::EmptyFramebuffer {
                width: self.framebuffer.width,
                height: self.framebuffer.height,
            });
        }
        let interval = self.telemetry.report_interval_secs;
        if !interval.is_finite() || interval < 0.0 {
            return Err(ConfigError::BadReportInterval);
        }
        Ok(())
    }

    /// Simulation updates per second.
    pub fn update_hz(&self) -> f32 {
        self.timing.monitor_refresh_hz as f32 / self.timing.update_divisor as f32
    }
}
