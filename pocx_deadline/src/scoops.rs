// Copyright (c) 2025 Proof of Capacity Consortium
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Borrowed scoop runs with their length invariants checked up front
//!
//! The kernel never re-validates scoop data. [`Scoops`] guarantees a whole
//! number of scoops and [`ScoopBatch`] guarantees exactly one lane's worth,
//! so the lane builder can index without bounds surprises.

use crate::common::{Scoop, SCOOP_SIZE};
use crate::error::{PoCXDeadlineError, Result};
use std::slice::ChunksExact;

/// A contiguous run of scoops, one per nonce, indexed from 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scoops<'a> {
    data: &'a [u8],
}

impl<'a> Scoops<'a> {
    /// Wraps raw scoop bytes, e.g. a buffer read from a plot file.
    ///
    /// # Errors
    ///
    /// Returns `PoCXDeadlineError::BufferSizeError` if the length is not a
    /// multiple of the scoop size.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() % SCOOP_SIZE != 0 {
            return Err(PoCXDeadlineError::BufferSizeError(format!(
                "Scoop buffer of {} bytes is not a multiple of {}",
                data.len(),
                SCOOP_SIZE
            )));
        }
        Ok(Scoops { data })
    }

    pub fn from_scoops(scoops: &'a [Scoop]) -> Self {
        Scoops {
            data: scoops.as_flattened(),
        }
    }

    pub fn empty() -> Self {
        Scoops { data: &[] }
    }

    /// Number of scoops (nonces) in the run
    pub fn len(&self) -> usize {
        self.data.len() / SCOOP_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Scoop> {
        let start = index.checked_mul(SCOOP_SIZE)?;
        self.data
            .get(start..start.checked_add(SCOOP_SIZE)?)
            .and_then(|bytes| bytes.try_into().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Scoop> + 'a {
        self.data
            .chunks_exact(SCOOP_SIZE)
            .filter_map(|bytes| bytes.try_into().ok())
    }

    /// Splits after `nonces` scoops; the split point is clamped to the length
    pub fn split_at(&self, nonces: usize) -> (Scoops<'a>, Scoops<'a>) {
        let mid = nonces.min(self.len()) * SCOOP_SIZE;
        let (head, tail) = self.data.split_at(mid);
        (Scoops { data: head }, Scoops { data: tail })
    }

    /// Disjoint sub-runs of `nonces_per_chunk` scoops (the last may be short).
    ///
    /// A chunk size of 0 is treated as 1.
    pub fn chunks(&self, nonces_per_chunk: usize) -> impl Iterator<Item = Scoops<'a>> + 'a {
        let chunk_bytes = nonces_per_chunk.max(1).saturating_mul(SCOOP_SIZE);
        self.data
            .chunks(chunk_bytes)
            .map(|data| Scoops { data })
    }

    /// Full batches of `N` scoops, plus the tail that does not fill a batch
    pub fn batches<const N: usize>(&self) -> (ScoopBatches<'a, N>, Scoops<'a>) {
        const { assert!(N > 0, "lane width must be non-zero") };
        let (head, tail) = self.split_at(self.len() / N * N);
        (
            ScoopBatches {
                inner: head.data.chunks_exact(N * SCOOP_SIZE),
            },
            tail,
        )
    }
}

/// Exactly `N` scoops, one per lane of an `N`-wide engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoopBatch<'a, const N: usize> {
    data: &'a [u8],
}

impl<'a, const N: usize> ScoopBatch<'a, N> {
    /// Returns `None` unless `data` holds exactly `N` scoops
    pub fn new(data: &'a [u8]) -> Option<Self> {
        if data.len() == N * SCOOP_SIZE {
            Some(ScoopBatch { data })
        } else {
            None
        }
    }

    /// Scoops in lane order
    pub fn iter(&self) -> impl Iterator<Item = &'a Scoop> + 'a {
        self.data
            .chunks_exact(SCOOP_SIZE)
            .filter_map(|bytes| bytes.try_into().ok())
    }
}

pub struct ScoopBatches<'a, const N: usize> {
    inner: ChunksExact<'a, u8>,
}

impl<'a, const N: usize> Iterator for ScoopBatches<'a, N> {
    type Item = ScoopBatch<'a, N>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|data| ScoopBatch { data })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<const N: usize> ExactSizeIterator for ScoopBatches<'_, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(nonces: usize) -> Vec<u8> {
        (0..nonces * SCOOP_SIZE).map(|i| (i / SCOOP_SIZE) as u8).collect()
    }

    #[test]
    fn test_rejects_partial_scoop() {
        let data = vec![0u8; SCOOP_SIZE * 3 + 1];
        let result = Scoops::new(&data);
        assert!(matches!(result, Err(PoCXDeadlineError::BufferSizeError(_))));
    }

    #[test]
    fn test_len_and_get() {
        let data = pattern(5);
        let scoops = Scoops::new(&data).unwrap();
        assert_eq!(scoops.len(), 5);
        assert_eq!(scoops.get(3).unwrap()[0], 3);
        assert!(scoops.get(5).is_none());
        assert!(scoops.get(usize::MAX).is_none());
        assert_eq!(scoops.iter().count(), 5);
    }

    #[test]
    fn test_from_scoops() {
        let raw = [[1u8; SCOOP_SIZE], [2u8; SCOOP_SIZE]];
        let scoops = Scoops::from_scoops(&raw);
        assert_eq!(scoops.len(), 2);
        assert_eq!(scoops.get(1), Some(&[2u8; SCOOP_SIZE]));
    }

    #[test]
    fn test_batches_and_tail() {
        let data = pattern(19);
        let scoops = Scoops::new(&data).unwrap();
        let (batches, tail) = scoops.batches::<8>();
        assert_eq!(batches.len(), 2);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.get(0).unwrap()[0], 16);

        let lanes: Vec<u8> = scoops
            .batches::<8>()
            .0
            .flat_map(|batch| batch.iter().map(|scoop| scoop[0]).collect::<Vec<_>>())
            .collect();
        assert_eq!(lanes, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_chunks_cover_run() {
        let data = pattern(10);
        let scoops = Scoops::new(&data).unwrap();
        let sizes: Vec<usize> = scoops.chunks(4).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(scoops.chunks(0).count(), 10);
    }

    #[test]
    fn test_batch_requires_exact_size() {
        let data = pattern(4);
        assert!(ScoopBatch::<4>::new(&data).is_some());
        assert!(ScoopBatch::<8>::new(&data).is_none());
        assert!(ScoopBatch::<2>::new(&data).is_none());
    }
}
