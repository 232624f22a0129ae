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

//! Defines the abstract `ModuleLoader` and `LoadedModule` traits.

use super::abi::{GetSoundSamplesFn, UpdateAndRenderFn};
use anyhow::Result;
use std::path::Path;

/// Opens simulation module artifacts.
///
/// This trait is the boundary between the hot-swap logic and the platform's
/// dynamic linker.
pub trait ModuleLoader {
    /// Loads the library at `path`.
    ///
    /// The returned handle keeps the library mapped; dropping it unloads the
    /// library and invalidates every function pointer resolved from it.
    fn open(&mut self, path: &Path) -> Result<Box<dyn LoadedModule>>;
}

/// A library that is currently mapped into the process.
pub trait LoadedModule {
    /// Resolves the update entry point, if exported.
    fn update_and_render(&self) -> Option<UpdateAndRenderFn>;

    /// Resolves the audio entry point, if exported.
    fn get_sound_samples(&self) -> Option<GetSoundSamplesFn>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Box<L> {
    fn open(&mut self, path: &Path) -> Result<Box<dyn LoadedModule>> {
        (**self).open(path)
    }
}
