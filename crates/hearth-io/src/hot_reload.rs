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

//! The module hot-swap boundary.
//!
//! [`HotModule`] watches the simulation artifact's modification time. When it
//! changes, the current library is released, the artifact is copied to a
//! staging name (so the build can overwrite the original while the copy is
//! mapped), and the copy is loaded and rebound.

use hearth_core::module::{EntryPoints, LoadedModule, ModuleBinding, ModuleLoader};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Why a reload attempt did not produce a library.
#[derive(Debug, Error)]
pub enum ModuleLoadError {
    /// The artifact's metadata could not be read.
    #[error("cannot read module artifact '{}': {source}", .path.display())]
    Metadata {
        /// The artifact.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The artifact could not be copied to its staging name.
    #[error("cannot stage module '{}' as '{}': {source}", .from.display(), .to.display())]
    Stage {
        /// The artifact.
        from: PathBuf,
        /// The staging copy.
        to: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The dynamic loader rejected the staged copy.
    #[error("cannot load module '{}': {reason}", .path.display())]
    Open {
        /// The staging copy.
        path: PathBuf,
        /// The loader's error chain.
        reason: String,
    },
}

/// The result of one [`HotModule::reload_if_changed`] check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The artifact has not changed; the binding is untouched.
    Unchanged,
    /// A new build was loaded and both entry points are bound.
    Reloaded,
    /// A new build loaded but does not export both entry points. It is not
    /// retried until the artifact changes again.
    MissingEntryPoints,
    /// The artifact could not be read, staged or loaded. The check is
    /// repeated on the next frame.
    Failed,
}

/// Returns the load-safe name for `artifact`: `<stem>_temp.<ext>` in the
/// same directory.
pub fn staging_path_for(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match artifact.extension() {
        Some(ext) => format!("{stem}_temp.{}", ext.to_string_lossy()),
        None => format!("{stem}_temp"),
    };
    artifact.with_file_name(name)
}

/// A simulation module that is rebound whenever its artifact is rebuilt.
///
/// The [`ModuleBinding`] handed out by [`HotModule::binding`] borrows code
/// from the mapped library, so it must be fetched again after every
/// [`HotModule::reload_if_changed`] call and never kept across one.
pub struct HotModule<L: ModuleLoader> {
    loader: L,
    artifact_path: PathBuf,
    staging_path: PathBuf,
    binding: ModuleBinding,
    library: Option<Box<dyn LoadedModule>>,
    reload_count: u64,
    failing: bool,
}

impl<L: ModuleLoader> HotModule<L> {
    /// Watches `artifact_path`. Nothing is loaded until the first check.
    pub fn new(loader: L, artifact_path: impl Into<PathBuf>) -> Self {
        let artifact_path = artifact_path.into();
        let staging_path = staging_path_for(&artifact_path);
        Self {
            loader,
            artifact_path,
            staging_path,
            binding: ModuleBinding::inert(),
            library: None,
            reload_count: 0,
            failing: false,
        }
    }

    /// The current binding.
    pub fn binding(&self) -> ModuleBinding {
        self.binding
    }

    /// The watched artifact.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// The copy that is actually loaded.
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Successful reloads so far, including the first load.
    pub fn reload_count(&self) -> u64 {
        self.reload_count
    }

    /// Compares the artifact's timestamp with the bound build and reloads
    /// on any difference.
    ///
    /// An unreadable timestamp leaves the current binding in place.
    pub fn reload_if_changed(&mut self) -> ReloadOutcome {
        let write_time = match self.artifact_write_time() {
            Ok(time) => time,
            Err(e) => {
                self.report_failure(&e);
                return ReloadOutcome::Failed;
            }
        };
        if self.binding.last_write_time() == Some(write_time) {
            return ReloadOutcome::Unchanged;
        }

        // Invalidate before unmapping the code the binding points into.
        self.binding = ModuleBinding::inert();
        self.library = None;

        let library = match self.stage_and_open() {
            Ok(library) => library,
            Err(e) => {
                self.report_failure(&e);
                return ReloadOutcome::Failed;
            }
        };
        self.failing = false;

        let entry_points =
            EntryPoints::resolve(library.update_and_render(), library.get_sound_samples());
        if entry_points.is_none() {
            log::warn!(
                "Module '{}' does not export both entry points; simulation calls are skipped",
                self.artifact_path.display()
            );
            self.binding = ModuleBinding::new(None, Some(write_time));
            return ReloadOutcome::MissingEntryPoints;
        }

        self.library = Some(library);
        self.binding = ModuleBinding::new(entry_points, Some(write_time));
        self.reload_count += 1;
        log::info!(
            "Loaded module '{}' (load #{})",
            self.artifact_path.display(),
            self.reload_count
        );
        ReloadOutcome::Reloaded
    }

    /// Drops the binding and the library.
    pub fn unload(&mut self) {
        self.binding = ModuleBinding::inert();
        self.library = None;
    }

    fn artifact_write_time(&self) -> Result<SystemTime, ModuleLoadError> {
        fs::metadata(&self.artifact_path)
            .and_then(|meta| meta.modified())
            .map_err(|source| ModuleLoadError::Metadata {
                path: self.artifact_path.clone(),
                source,
            })
    }

    fn stage_and_open(&mut self) -> Result<Box<dyn LoadedModule>, ModuleLoadError> {
        match fs::remove_file(&self.staging_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::debug!(
                "Could not remove stale '{}': {e}",
                self.staging_path.display()
            ),
        }
        fs::copy(&self.artifact_path, &self.staging_path).map_err(|source| {
            ModuleLoadError::Stage {
                from: self.artifact_path.clone(),
                to: self.staging_path.clone(),
                source,
            }
        })?;
        self.loader
            .open(&self.staging_path)
            .map_err(|e| ModuleLoadError::Open {
                path: self.staging_path.clone(),
                reason: format!("{e:#}"),
            })
    }

    fn report_failure(&mut self, error: &ModuleLoadError) {
        if self.failing {
            log::debug!("{error}");
        } else {
            log::warn!("{error}; retrying every frame");
            self.failing = true;
        }
    }
}

impl<L: ModuleLoader> Drop for HotModule<L> {
    fn drop(&mut self) {
        self.unload();
    }
}
