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

use hearth_core::input::InputFrame;
use hearth_core::memory::MemoryArena;
use hearth_core::module::{Framebuffer, ModuleLoader};
use hearth_infra::DylibLoader;
use hearth_io::{HotModule, ReloadOutcome};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Finds the demo module's cdylib among the build outputs of this test.
fn sandbox_artifact() -> PathBuf {
    let exe = std::env::current_exe().expect("test binary path");
    let deps = exe.parent().expect("deps directory");
    let prefix = format!("{DLL_PREFIX}hearth_sandbox");
    let candidates = [Some(deps), deps.parent()];

    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(|dir| fs::read_dir(dir).ok())
        .flatten()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(DLL_SUFFIX))
        })
        .unwrap_or_else(|| panic!("no {prefix}*{DLL_SUFFIX} next to '{}'", deps.display()));
    found
}

fn copy_into(dir: &Path, artifact: &Path) -> PathBuf {
    let target = dir.join(format!("{DLL_PREFIX}hearth_sandbox{DLL_SUFFIX}"));
    fs::copy(artifact, &target).expect("copy artifact");
    target
}

fn bump_mtime(path: &Path, seconds: u64) {
    OpenOptions::new()
        .write(true)
        .open(path)
        .expect("open artifact")
        .set_modified(SystemTime::now() + Duration::from_secs(seconds))
        .expect("set mtime");
}

#[test]
fn loader_resolves_both_entry_points_of_the_demo_module() {
    // ARRANGE
    let mut loader = DylibLoader::new();

    // ACT
    let module = loader.open(&sandbox_artifact()).expect("demo module loads");

    // ASSERT
    assert!(module.update_and_render().is_some());
    assert!(module.get_sound_samples().is_some());
}

#[test]
fn hot_module_stages_binds_and_runs_the_demo_module() {
    // ARRANGE
    let dir = tempfile::tempdir().expect("temp dir");
    let artifact = copy_into(dir.path(), &sandbox_artifact());
    let mut module = HotModule::new(DylibLoader::new(), &artifact);

    // ACT
    let outcome = module.reload_if_changed();

    // ASSERT
    assert_eq!(outcome, ReloadOutcome::Reloaded);
    assert!(module.binding().is_valid());
    assert!(module.staging_path().exists(), "The staged copy is what gets mapped");
    assert_eq!(module.reload_if_changed(), ReloadOutcome::Unchanged);

    let mut arena = MemoryArena::new(1024, 0);
    let mut framebuffer = Framebuffer::new(8, 8);
    let input = InputFrame::default();
    let entry_points = *module.binding().entry_points().expect("bound");
    let mut memory = arena.view();
    let mut view = framebuffer.view();
    unsafe { (entry_points.update_and_render)(&mut memory, &input, &mut view) };
    arena.absorb_view(&memory);

    assert!(arena.is_initialized(), "The demo module marks its state initialised");
    assert_eq!(framebuffer.pixels()[1], 1, "The gradient's blue ramps with x");
}

#[test]
fn rebuilt_artifact_is_staged_again() {
    let dir = tempfile::tempdir().expect("temp dir");
    let artifact = copy_into(dir.path(), &sandbox_artifact());
    let mut module = HotModule::new(DylibLoader::new(), &artifact);
    assert_eq!(module.reload_if_changed(), ReloadOutcome::Reloaded);

    bump_mtime(&artifact, 5);
    let outcome = module.reload_if_changed();

    assert_eq!(outcome, ReloadOutcome::Reloaded);
    assert_eq!(module.reload_count(), 2);
    assert!(module.binding().is_valid());
}
