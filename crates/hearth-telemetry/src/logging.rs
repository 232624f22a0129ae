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

//! Logger setup.

use env_logger::{Builder, Env};
use log::{LevelFilter, SetLoggerError};

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` takes precedence; otherwise everything at `default_level` and
/// above is printed. Audio backend chatter is limited to warnings.
pub fn init(default_level: &str) -> Result<(), SetLoggerError> {
    Builder::from_env(Env::default().default_filter_or(default_level))
        .filter_module("cpal", LevelFilter::Warn)
        .try_init()
}
