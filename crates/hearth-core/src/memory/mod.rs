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

//! The simulation's memory arena.
//!
//! The arena is one contiguous, zero-initialised allocation made at startup
//! and never resized. Its first part is the *permanent* storage, which the
//! simulation keeps its state in for the lifetime of the process; the rest is
//! *transient* scratch space. Because the whole simulation state lives in this
//! single block, copying the block is enough to snapshot the simulation.

mod debug_file;

pub use debug_file::*;

use std::ptr;

/// Every sub-range starts on this boundary.
pub const ARENA_ALIGNMENT: usize = std::mem::align_of::<u64>();

/// The raw view of the arena handed to the simulation on every call.
#[repr(C)]
#[derive(Debug)]
pub struct MemoryView {
    /// Non-zero once the simulation has set up its permanent state.
    pub is_initialized: u32,
    /// Size in bytes of the permanent sub-range.
    pub permanent_storage_size: u64,
    /// Start of the permanent sub-range.
    pub permanent_storage: *mut u8,
    /// Size in bytes of the transient sub-range.
    pub transient_storage_size: u64,
    /// Start of the transient sub-range.
    pub transient_storage: *mut u8,
    /// Whole-file helpers for debug builds of the simulation.
    pub debug_file_services: DebugFileServices,
}

impl Default for MemoryView {
    fn default() -> Self {
        Self {
            is_initialized: 0,
            permanent_storage_size: 0,
            permanent_storage: ptr::null_mut(),
            transient_storage_size: 0,
            transient_storage: ptr::null_mut(),
            debug_file_services: DebugFileServices::NONE,
        }
    }
}

/// A fixed-size block split into disjoint, contiguous permanent and
/// transient sub-ranges.
#[derive(Debug)]
pub struct MemoryArena {
    storage: Vec<u64>,
    permanent_size: usize,
    transient_size: usize,
    is_initialized: bool,
    debug_file_services: DebugFileServices,
}

impl MemoryArena {
    /// Allocates a zeroed arena.
    ///
    /// The permanent size is rounded up to [`ARENA_ALIGNMENT`] so the
    /// transient range starts aligned.
    pub fn new(permanent_size: usize, transient_size: usize) -> Self {
        let permanent_size = permanent_size.next_multiple_of(ARENA_ALIGNMENT);
        let total = permanent_size + transient_size;
        let words = total.div_ceil(ARENA_ALIGNMENT);
        log::debug!(
            "Allocating memory arena: {permanent_size} permanent + {transient_size} transient bytes"
        );
        Self {
            storage: vec![0; words],
            permanent_size,
            transient_size,
            is_initialized: false,
            debug_file_services: DebugFileServices::NONE,
        }
    }

    /// Total size in bytes.
    pub fn total_size(&self) -> usize {
        self.permanent_size + self.transient_size
    }

    /// Size in bytes of the permanent sub-range.
    pub fn permanent_size(&self) -> usize {
        self.permanent_size
    }

    /// Size in bytes of the transient sub-range.
    pub fn transient_size(&self) -> usize {
        self.transient_size
    }

    /// The whole arena.
    pub fn as_bytes(&self) -> &[u8] {
        let total = self.total_size();
        &bytemuck::cast_slice::<u64, u8>(&self.storage)[..total]
    }

    /// The whole arena, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let total = self.total_size();
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.storage)[..total]
    }

    /// The permanent sub-range.
    pub fn permanent(&self) -> &[u8] {
        &self.as_bytes()[..self.permanent_size]
    }

    /// The permanent sub-range, mutably.
    pub fn permanent_mut(&mut self) -> &mut [u8] {
        let end = self.permanent_size;
        &mut self.as_bytes_mut()[..end]
    }

    /// The transient sub-range.
    pub fn transient(&self) -> &[u8] {
        &self.as_bytes()[self.permanent_size..]
    }

    /// The transient sub-range, mutably.
    pub fn transient_mut(&mut self) -> &mut [u8] {
        let start = self.permanent_size;
        &mut self.as_bytes_mut()[start..]
    }

    /// Whether the simulation has reported its permanent state as set up.
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Sets the debug file services handed out with every view.
    pub fn set_debug_file_services(&mut self, services: DebugFileServices) {
        self.debug_file_services = services;
    }

    /// Builds the raw view for a simulation call.
    ///
    /// The pointers stay valid until the arena is dropped; the arena never
    /// reallocates.
    pub fn view(&mut self) -> MemoryView {
        let permanent_size = self.permanent_size;
        let base = self.as_bytes_mut().as_mut_ptr();
        MemoryView {
            is_initialized: self.is_initialized as u32,
            permanent_storage_size: permanent_size as u64,
            permanent_storage: base,
            transient_storage_size: self.transient_size as u64,
            // SAFETY: `permanent_size <= total_size`, so the offset stays
            // within (or one past the end of) the allocation.
            transient_storage: unsafe { base.add(permanent_size) },
            debug_file_services: self.debug_file_services,
        }
    }

    /// Takes back the flags the simulation may have changed through a view.
    pub fn absorb_view(&mut self, view: &MemoryView) {
        self.is_initialized = view.is_initialized != 0;
    }
}
