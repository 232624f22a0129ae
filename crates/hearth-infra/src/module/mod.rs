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

//! Contains the `DylibLoader` struct.

use anyhow::{Context, Result};
use hearth_core::module::abi::{GET_SOUND_SAMPLES_SYMBOL, UPDATE_AND_RENDER_SYMBOL};
use hearth_core::module::{GetSoundSamplesFn, LoadedModule, ModuleLoader, UpdateAndRenderFn};
use libloading::Library;
use std::path::Path;

/// A [`ModuleLoader`] backed by the platform's dynamic linker.
#[derive(Debug, Default)]
pub struct DylibLoader;

impl DylibLoader {
    /// Creates a new loader.
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for DylibLoader {
    fn open(&mut self, path: &Path) -> Result<Box<dyn LoadedModule>> {
        // SAFETY: loading runs the library's initialisers. Simulation
        // modules are built against the same call contract as the shell and
        // have no load-time side effects.
        let library = unsafe { Library::new(path) }
            .with_context(|| format!("Failed to load dynamic library '{}'", path.display()))?;
        Ok(Box::new(DylibModule { library }))
    }
}

struct DylibModule {
    library: Library,
}

impl DylibModule {
    /// # Safety
    ///
    /// `T` must be the exact function pointer type exported under `symbol`.
    unsafe fn resolve<T: Copy>(&self, symbol: &[u8]) -> Option<T> {
        match unsafe { self.library.get::<T>(symbol) } {
            Ok(resolved) => Some(*resolved),
            Err(e) => {
                log::debug!(
                    "Symbol '{}' not found: {e}",
                    String::from_utf8_lossy(symbol.strip_suffix(b"\0").unwrap_or(symbol))
                );
                None
            }
        }
    }
}

impl LoadedModule for DylibModule {
    fn update_and_render(&self) -> Option<UpdateAndRenderFn> {
        // SAFETY: the symbol name and type come from the same ABI module.
        unsafe { self.resolve(UPDATE_AND_RENDER_SYMBOL) }
    }

    fn get_sound_samples(&self) -> Option<GetSoundSamplesFn> {
        // SAFETY: the symbol name and type come from the same ABI module.
        unsafe { self.resolve(GET_SOUND_SAMPLES_SYMBOL) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_an_error() {
        let mut loader = DylibLoader::new();

        let result = loader.open(Path::new("definitely/not/a/module.so"));

        let message = format!("{:#}", result.err().expect("load must fail"));
        assert!(
            message.contains("definitely/not/a/module.so"),
            "The error should name the path: {message}"
        );
    }
}
