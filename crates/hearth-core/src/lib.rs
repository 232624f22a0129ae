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

//! # Hearth Core
//!
//! Foundational crate containing the traits, plain data types, and the
//! simulation call contract shared by every layer of the runtime shell.
//!
//! Nothing in here touches the operating system directly: clocks, audio
//! devices, input providers and module loaders are all described as traits,
//! and concrete backends live in `hearth-infra`.

#![warn(missing_docs)]

pub mod audio;
pub mod command;
pub mod input;
pub mod memory;
pub mod module;
pub mod platform;
pub mod timing;
pub mod utils;

pub use input::InputFrame;
pub use memory::MemoryArena;
pub use module::ModuleBinding;
pub use timing::ClockSource;
