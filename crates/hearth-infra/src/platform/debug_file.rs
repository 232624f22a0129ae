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

//! Whole-file debug services for the simulation, backed by `std::fs`.
//!
//! A read returns a buffer owned by the shell. Its word-aligned allocation
//! starts with one header word holding the allocation length in words, so
//! the free service can rebuild it without the caller passing a size.

use hearth_core::memory::{DebugFileServices, DebugReadFileResult};
use std::ffi::{c_char, c_void, CStr};
use std::fs;
use std::path::PathBuf;
use std::ptr;

const HEADER_WORDS: usize = 1;
const WORD: usize = std::mem::size_of::<u64>();

/// The services, ready to be set on a [`hearth_core::MemoryArena`].
pub fn debug_file_services() -> DebugFileServices {
    DebugFileServices {
        read_entire_file: Some(read_entire_file),
        write_entire_file: Some(write_entire_file),
        free_file_memory: Some(free_file_memory),
    }
}

/// # Safety
/// `file_name` is null or a NUL-terminated string.
unsafe fn file_path(file_name: *const c_char) -> Option<PathBuf> {
    if file_name.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the call contract.
    match unsafe { CStr::from_ptr(file_name) }.to_str() {
        Ok(name) => Some(PathBuf::from(name)),
        Err(e) => {
            log::debug!("Debug file name is not UTF-8: {e}");
            None
        }
    }
}

fn into_shell_buffer(bytes: &[u8]) -> *mut c_void {
    let words = HEADER_WORDS + bytes.len().div_ceil(WORD);
    let mut storage = vec![0u64; words].into_boxed_slice();
    storage[0] = words as u64;
    // SAFETY: the storage holds `bytes.len()` bytes past the header.
    unsafe {
        ptr::copy_nonoverlapping(
            bytes.as_ptr(),
            storage.as_mut_ptr().add(HEADER_WORDS).cast::<u8>(),
            bytes.len(),
        );
    }
    let base = Box::into_raw(storage).cast::<u64>();
    // SAFETY: `words >= HEADER_WORDS`, so the offset stays in the allocation.
    unsafe { base.add(HEADER_WORDS).cast::<c_void>() }
}

unsafe extern "C" fn read_entire_file(file_name: *const c_char) -> DebugReadFileResult {
    // SAFETY: forwarded from the caller.
    let Some(path) = (unsafe { file_path(file_name) }) else {
        return DebugReadFileResult::empty();
    };
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Debug read of '{}' failed: {e}", path.display());
            return DebugReadFileResult::empty();
        }
    };
    let Ok(content_size) = u32::try_from(bytes.len()) else {
        log::debug!("Debug read of '{}' skipped: file exceeds 4 GiB", path.display());
        return DebugReadFileResult::empty();
    };
    DebugReadFileResult {
        content_size,
        contents: into_shell_buffer(&bytes),
    }
}

unsafe extern "C" fn write_entire_file(
    file_name: *const c_char,
    memory_size: u32,
    memory: *const c_void,
) -> u32 {
    // SAFETY: forwarded from the caller.
    let Some(path) = (unsafe { file_path(file_name) }) else {
        return 0;
    };
    let bytes: &[u8] = if memory_size == 0 {
        &[]
    } else if memory.is_null() {
        return 0;
    } else {
        // SAFETY: the caller owns `memory_size` readable bytes at `memory`.
        unsafe { std::slice::from_raw_parts(memory.cast::<u8>(), memory_size as usize) }
    };
    match fs::write(&path, bytes) {
        Ok(()) => 1,
        Err(e) => {
            log::debug!("Debug write of '{}' failed: {e}", path.display());
            0
        }
    }
}

unsafe extern "C" fn free_file_memory(memory: *mut c_void) {
    if memory.is_null() {
        return;
    }
    // SAFETY: `memory` came from `into_shell_buffer`, so the header word
    // sits right before it and records the allocation length.
    unsafe {
        let base = memory.cast::<u64>().sub(HEADER_WORDS);
        let words = *base as usize;
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(base, words)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn c_path(path: &std::path::Path) -> CString {
        CString::new(path.to_str().expect("utf-8 path")).expect("no interior NUL")
    }

    #[test]
    fn written_file_reads_back_through_a_shell_buffer() {
        // ARRANGE
        let dir = tempfile::tempdir().expect("temp dir");
        let name = c_path(&dir.path().join("level.bin"));
        let payload = b"hearth debug payload";

        // ACT
        let written = unsafe {
            write_entire_file(name.as_ptr(), payload.len() as u32, payload.as_ptr().cast())
        };
        let result = unsafe { read_entire_file(name.as_ptr()) };

        // ASSERT
        assert_eq!(written, 1);
        assert_eq!(result.content_size as usize, payload.len());
        assert!(!result.contents.is_null());
        let contents = unsafe {
            std::slice::from_raw_parts(result.contents.cast::<u8>(), payload.len())
        };
        assert_eq!(contents, payload);
        assert_eq!(result.contents as usize % WORD, 0, "Buffers are word aligned");

        unsafe { free_file_memory(result.contents) };
    }

    #[test]
    fn missing_file_yields_an_empty_result() {
        let dir = tempfile::tempdir().expect("temp dir");
        let name = c_path(&dir.path().join("absent.bin"));

        let result = unsafe { read_entire_file(name.as_ptr()) };

        assert!(result.contents.is_null());
        assert_eq!(result.content_size, 0);
        unsafe { free_file_memory(result.contents) };
    }

    #[test]
    fn services_are_all_present() {
        let services = debug_file_services();

        assert!(services.read_entire_file.is_some());
        assert!(services.write_entire_file.is_some());
        assert!(services.free_file_memory.is_some());
    }
}
