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

//! The public-facing API of the Hearth runtime shell.
//!
//! Load an [`EngineConfig`], hand an [`EngineContext`] the platform
//! [`Backends`], and call [`EngineContext::run`].

#![warn(missing_docs)]

pub mod config;
pub mod engine;

pub use config::{ConfigError, DebugConfig, EngineConfig, DEFAULT_CONFIG_PATH};
pub use engine::{Backends, EngineContext};

/// Re-exports the types needed to wire an engine.
pub mod prelude {
    pub use hearth_core::audio::{AudioFormat, RingAudioDevice};
    pub use hearth_core::command::OperatorCommand;
    pub use hearth_core::memory::DebugFileServices;
    pub use hearth_core::module::ModuleLoader;
    pub use hearth_core::platform::{
        FramePresenter, InputProvider, NullInputProvider, NullPresenter, PlatformEvent,
    };
    pub use hearth_core::ClockSource;
}
