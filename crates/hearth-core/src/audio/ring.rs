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

//! A fixed-size byte ring with wrap-aware region access.

use std::ops::Range;

/// Splits a `len`-byte region starting at `offset` into at most two
/// contiguous ranges of a ring of `buffer_len` bytes.
///
/// The second range is empty unless the region wraps past the end.
/// `offset` is taken modulo `buffer_len` and `len` is capped at `buffer_len`.
pub fn ring_regions(offset: u32, len: u32, buffer_len: u32) -> (Range<usize>, Range<usize>) {
    if buffer_len == 0 {
        return (0..0, 0..0);
    }
    let offset = (offset % buffer_len) as usize;
    let len = len.min(buffer_len) as usize;
    let buffer_len = buffer_len as usize;

    let first_len = len.min(buffer_len - offset);
    let second_len = len - first_len;
    (offset..offset + first_len, 0..second_len)
}

/// Owned backing storage for a circular audio buffer.
#[derive(Debug, Clone)]
pub struct SampleRing {
    bytes: Vec<u8>,
}

impl SampleRing {
    /// Creates a zeroed ring of `len` bytes.
    pub fn new(len: u32) -> Self {
        Self {
            bytes: vec![0; len as usize],
        }
    }

    /// The ring length in bytes.
    pub fn len(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Returns `true` for a zero-length ring.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrows a possibly wrapping region as two mutable slices.
    pub fn regions_mut(&mut self, offset: u32, len: u32) -> (&mut [u8], &mut [u8]) {
        let (first, second) = ring_regions(offset, len, self.len());
        let (head, tail) = self.bytes.split_at_mut(first.start);
        let first_len = first.len();
        (&mut tail[..first_len], &mut head[..second.len()])
    }

    /// Copies `out.len()` bytes starting at `offset` into `out`, wrapping as needed.
    pub fn read_into(&self, offset: u32, out: &mut [u8]) {
        if self.bytes.is_empty() {
            out.fill(0);
            return;
        }
        let mut cursor = (offset % self.len()) as usize;
        for chunk in out.chunks_mut(self.bytes.len()) {
            let (first, second) = ring_regions(cursor as u32, chunk.len() as u32, self.len());
            let first_len = first.len();
            chunk[..first_len].copy_from_slice(&self.bytes[first]);
            chunk[first_len..].copy_from_slice(&self.bytes[second]);
            cursor = (cursor + chunk.len()) % self.bytes.len();
        }
    }

    /// Zeroes every byte.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// The raw contents, starting at offset zero.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_without_wrap_leave_second_empty() {
        let (first, second) = ring_regions(100, 50, 1000);
        assert_eq!(first, 100..150);
        assert!(second.is_empty(), "A region that fits should not wrap");
    }

    #[test]
    fn regions_split_at_the_end_of_the_ring() {
        let (first, second) = ring_regions(900, 300, 1000);
        assert_eq!(first, 900..1000);
        assert_eq!(second, 0..200);
        assert_eq!(first.len() + second.len(), 300);
    }

    #[test]
    fn regions_are_capped_at_ring_length() {
        let (first, second) = ring_regions(10, 5000, 1000);
        assert_eq!(first.len() + second.len(), 1000);
    }

    #[test]
    fn zero_length_ring_yields_empty_regions() {
        let (first, second) = ring_regions(3, 7, 0);
        assert!(first.is_empty() && second.is_empty());
    }

    #[test]
    fn regions_mut_writes_wrap_around() {
        // ARRANGE
        let mut ring = SampleRing::new(8);

        // ACT
        let (first, second) = ring.regions_mut(6, 4);
        first.fill(1);
        second.fill(2);

        // ASSERT
        assert_eq!(ring.as_bytes(), &[2, 2, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn read_into_follows_the_wrap() {
        let mut ring = SampleRing::new(4);
        {
            let (first, second) = ring.regions_mut(0, 4);
            first.copy_from_slice(&[1, 2, 3, 4]);
            assert!(second.is_empty());
        }

        let mut out = [0u8; 6];
        ring.read_into(2, &mut out);

        assert_eq!(out, [3, 4, 1, 2, 3, 4]);
    }
}
