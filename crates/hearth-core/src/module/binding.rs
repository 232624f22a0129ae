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

//! Defines `ModuleBinding`, the tagged handle to a module's entry points.

use super::abi::{GetSoundSamplesFn, UpdateAndRenderFn};
use std::time::SystemTime;

/// Both entry points of a loaded module.
///
/// Exists only when both symbols resolved; a module with one missing entry
/// point produces no `EntryPoints` at all.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoints {
    /// Per-frame update and render.
    pub update_and_render: UpdateAndRenderFn,
    /// Audio sample generation.
    pub get_sound_samples: GetSoundSamplesFn,
}

impl EntryPoints {
    /// Pairs two resolved symbols, or returns `None` if either is missing.
    pub fn resolve(
        update_and_render: Option<UpdateAndRenderFn>,
        get_sound_samples: Option<GetSoundSamplesFn>,
    ) -> Option<Self> {
        Some(Self {
            update_and_render: update_and_render?,
            get_sound_samples: get_sound_samples?,
        })
    }
}

/// The module currently bound to the shell.
///
/// A binding is replaced wholesale on every reload; it is never patched in
/// place. Callers branch on [`ModuleBinding::is_valid`] and skip the call for
/// the frame when it is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleBinding {
    entry_points: Option<EntryPoints>,
    last_write_time: Option<SystemTime>,
}

impl ModuleBinding {
    /// A binding with no callables and no known build.
    pub const fn inert() -> Self {
        Self {
            entry_points: None,
            last_write_time: None,
        }
    }

    /// A binding for a build observed at `last_write_time`.
    ///
    /// `entry_points` is `None` when the build loaded but did not export
    /// both symbols.
    pub fn new(entry_points: Option<EntryPoints>, last_write_time: Option<SystemTime>) -> Self {
        Self {
            entry_points,
            last_write_time,
        }
    }

    /// Returns `true` if both entry points are callable.
    pub fn is_valid(&self) -> bool {
        self.entry_points.is_some()
    }

    /// The bound entry points, if valid.
    pub fn entry_points(&self) -> Option<&EntryPoints> {
        self.entry_points.as_ref()
    }

    /// The artifact timestamp this binding was built from.
    pub fn last_write_time(&self) -> Option<SystemTime> {
        self.last_write_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputFrame;
    use crate::memory::MemoryView;
    use crate::module::abi::{FramebufferView, SoundBufferView};

    unsafe extern "C" fn update(_: *mut MemoryView, _: *const InputFrame, _: *mut FramebufferView) {}
    unsafe extern "C" fn sound(_: *mut MemoryView, _: *mut SoundBufferView) {}

    #[test]
    fn resolve_requires_both_entry_points() {
        assert!(EntryPoints::resolve(Some(update), Some(sound)).is_some());
        assert!(EntryPoints::resolve(Some(update), None).is_none());
        assert!(EntryPoints::resolve(None, Some(sound)).is_none());
    }

    #[test]
    fn inert_binding_is_invalid() {
        let binding = ModuleBinding::inert();
        assert!(!binding.is_valid());
        assert!(binding.last_write_time().is_none());
        assert!(!ModuleBinding::default().is_valid());
    }

    #[test]
    fn binding_without_entry_points_keeps_its_timestamp() {
        let now = SystemTime::now();
        let binding = ModuleBinding::new(None, Some(now));
        assert!(!binding.is_valid());
        assert_eq!(binding.last_write_time(), Some(now));
    }
}
