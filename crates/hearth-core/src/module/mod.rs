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

//! The call contract between the runtime shell and a simulation module.
//!
//! A simulation module is a dynamic library exporting two C-ABI entry points,
//! [`abi::UPDATE_AND_RENDER_SYMBOL`] and [`abi::GET_SOUND_SAMPLES_SYMBOL`].
//! The shell binds them into a [`ModuleBinding`] and only calls through a
//! binding that is valid.

pub mod abi;
pub mod binding;
pub mod loader;

pub use abi::{
    Framebuffer, FramebufferView, GetSoundSamplesFn, SoundBufferView, UpdateAndRenderFn,
};
pub use binding::{EntryPoints, ModuleBinding};
pub use loader::{LoadedModule, ModuleLoader};
