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

//! Whole-file debug services passed to the simulation inside its
//! [`MemoryView`](super::MemoryView).
//!
//! They let a module load and save its own debug assets without linking
//! against anything but the call contract. Every entry is optional; a
//! `None` service is a null pointer on the C side.

use std::ffi::{c_char, c_void};
use std::ptr;

/// The outcome of [`DebugReadEntireFileFn`].
///
/// `contents` is null when the read failed. A non-null buffer must be handed
/// back to [`DebugFreeFileMemoryFn`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DebugReadFileResult {
    /// Bytes in `contents`.
    pub content_size: u32,
    /// The file's bytes, owned by the shell.
    pub contents: *mut c_void,
}

impl DebugReadFileResult {
    /// A failed read.
    pub const fn empty() -> Self {
        Self {
            content_size: 0,
            contents: ptr::null_mut(),
        }
    }
}

/// Reads the NUL-terminated path `file_name` into a shell-owned buffer.
pub type DebugReadEntireFileFn = unsafe extern "C" fn(file_name: *const c_char) -> DebugReadFileResult;

/// Writes `memory_size` bytes at `memory` to `file_name`, replacing it.
/// Returns non-zero on success.
pub type DebugWriteEntireFileFn =
    unsafe extern "C" fn(file_name: *const c_char, memory_size: u32, memory: *const c_void) -> u32;

/// Releases a buffer returned by a read. Null is ignored.
pub type DebugFreeFileMemoryFn = unsafe extern "C" fn(memory: *mut c_void);

/// The debug file services a shell offers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugFileServices {
    /// Reads a whole file.
    pub read_entire_file: Option<DebugReadEntireFileFn>,
    /// Writes a whole file.
    pub write_entire_file: Option<DebugWriteEntireFileFn>,
    /// Frees the result of `read_entire_file`.
    pub free_file_memory: Option<DebugFreeFileMemoryFn>,
}

impl DebugFileServices {
    /// No services; every pointer is null.
    pub const NONE: Self = Self {
        read_entire_file: None,
        write_entire_file: None,
        free_file_memory: None,
    };
}
