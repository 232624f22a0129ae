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

//! A replay slot: one arena snapshot plus one input stream.

use super::error::ReplayError;
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Where arena snapshots are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotStorage {
    /// A memory-mapped file per slot. Snapshots survive a restart.
    #[default]
    Mapped,
    /// A heap buffer per slot.
    InMemory,
}

enum SnapshotStore {
    Memory(Vec<u8>),
    Mapped { map: MmapMut, _file: File },
}

impl SnapshotStore {
    fn as_slice(&self) -> &[u8] {
        match self {
            SnapshotStore::Memory(bytes) => &bytes[..],
            SnapshotStore::Mapped { map, .. } => &map[..],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            SnapshotStore::Memory(bytes) => &mut bytes[..],
            SnapshotStore::Mapped { map, .. } => &mut map[..],
        }
    }
}

/// One recording channel.
///
/// The snapshot store is created lazily, sized exactly to the arena, on the
/// first recording, and reused afterwards.
pub struct ReplaySlot {
    index: u8,
    state_path: PathBuf,
    input_path: PathBuf,
    snapshot: Option<SnapshotStore>,
}

impl std::fmt::Debug for ReplaySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaySlot")
            .field("index", &self.index)
            .field("state_path", &self.state_path)
            .field("input_path", &self.input_path)
            .field("has_snapshot", &self.snapshot.is_some())
            .finish()
    }
}

impl ReplaySlot {
    /// Describes slot `index` with its files under `dir`.
    pub fn new(dir: &Path, index: u8) -> Self {
        Self {
            index,
            state_path: dir.join(format!("loop_edit_{index}_state.hmi")),
            input_path: dir.join(format!("loop_edit_{index}_input.hmi")),
            snapshot: None,
        }
    }

    /// The slot number.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The input stream file.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// The mapped snapshot file, used with [`SnapshotStorage::Mapped`].
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Returns `true` if a snapshot is held in this process.
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Opens the recorded input stream for reading.
    pub fn open_input(&self) -> Result<File, ReplayError> {
        match File::open(&self.input_path) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ReplayError::NoSnapshot(self.index))
            }
            Err(e) => Err(ReplayError::io(&self.input_path, e)),
        }
    }

    /// Makes sure a store of exactly `size` bytes exists, creating or
    /// replacing it if needed. The stored bytes are not touched.
    pub fn prepare_store(&mut self, size: usize, storage: SnapshotStorage) -> Result<(), ReplayError> {
        let size_matches = self
            .snapshot
            .as_ref()
            .is_some_and(|store| store.as_slice().len() == size);
        if !size_matches {
            self.snapshot = Some(self.create_store(size, storage)?);
        }
        Ok(())
    }

    /// Copies `arena` into the slot, creating the store if needed.
    pub fn store_snapshot(&mut self, arena: &[u8], storage: SnapshotStorage) -> Result<(), ReplayError> {
        self.prepare_store(arena.len(), storage)?;
        if let Some(store) = self.snapshot.as_mut() {
            store.as_mut_slice().copy_from_slice(arena);
        }
        Ok(())
    }

    /// Checks that a snapshot of exactly `size` bytes can be restored.
    ///
    /// With mapped storage, a snapshot file left by an earlier run is picked
    /// up if its size matches.
    pub fn check_snapshot(&mut self, size: usize, storage: SnapshotStorage) -> Result<(), ReplayError> {
        if self.snapshot.is_none() && storage == SnapshotStorage::Mapped {
            self.snapshot = self.open_existing(size)?;
        }
        let store = self.snapshot.as_ref().ok_or(ReplayError::NoSnapshot(self.index))?;
        let found = store.as_slice().len();
        if found != size {
            return Err(ReplayError::SizeMismatch {
                slot: self.index,
                expected: size,
                found,
            });
        }
        Ok(())
    }

    /// Copies the slot's snapshot over `arena`.
    pub fn restore_snapshot(&mut self, arena: &mut [u8], storage: SnapshotStorage) -> Result<(), ReplayError> {
        self.check_snapshot(arena.len(), storage)?;
        if let Some(store) = self.snapshot.as_ref() {
            arena.copy_from_slice(store.as_slice());
        }
        Ok(())
    }

    fn create_store(&self, size: usize, storage: SnapshotStorage) -> Result<SnapshotStore, ReplayError> {
        if storage == SnapshotStorage::InMemory || size == 0 {
            return Ok(SnapshotStore::Memory(vec![0; size]));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.state_path)
            .map_err(|e| ReplayError::io(&self.state_path, e))?;
        file.set_len(size as u64)
            .map_err(|e| ReplayError::io(&self.state_path, e))?;
        self.map(file)
    }

    fn open_existing(&self, size: usize) -> Result<Option<SnapshotStore>, ReplayError> {
        let file = match OpenOptions::new().read(true).write(true).open(&self.state_path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ReplayError::io(&self.state_path, e)),
        };
        let found = file
            .metadata()
            .map_err(|e| ReplayError::io(&self.state_path, e))?
            .len() as usize;
        if found != size {
            return Err(ReplayError::SizeMismatch {
                slot: self.index,
                expected: size,
                found,
            });
        }
        log::info!(
            "Replay slot {}: using snapshot left at '{}'",
            self.index,
            self.state_path.display()
        );
        self.map(file).map(Some)
    }

    fn map(&self, file: File) -> Result<SnapshotStore, ReplayError> {
        // SAFETY: the file is opened read-write by this slot only, and the
        // mapping is dropped together with the handle that backs it.
        let map = unsafe { MmapMut::map_mut(&file) }
            .map_err(|e| ReplayError::io(&self.state_path, e))?;
        Ok(SnapshotStore::Mapped { map, _file: file })
    }
}
