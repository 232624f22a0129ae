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

//! # Hearth Infra
//!
//! Concrete implementations of the contracts declared in `hearth-core`:
//!
//! - [`timing::MonotonicClock`] over `std::time::Instant`.
//! - [`audio::CpalRingDevice`], a cursor-driven ring fed to the default
//!   output device through `cpal`, and [`audio::MemoryRingDevice`] for
//!   headless runs.
//! - [`module::DylibLoader`], which maps simulation modules with
//!   `libloading`.
//! - [`platform::OperatorConsole`], which turns stdin lines into operator
//!   commands, and [`platform::debug_file_services`] for the simulation.

#![warn(missing_docs)]

pub mod audio;
pub mod module;
pub mod platform;
pub mod timing;

pub use audio::{CpalRingDevice, MemoryRingDevice};
pub use module::DylibLoader;
pub use platform::{debug_file_services, ConsoleInputProvider, OperatorConsole};
pub use timing::MonotonicClock;
