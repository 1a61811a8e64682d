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

//! Running minimum over per-nonce deadlines

use serde::{Deserialize, Serialize};

use crate::common::Digest;

/// Reads the deadline out of a digest: its first 8 bytes in host byte order.
#[inline(always)]
pub fn deadline_from_digest(digest: &Digest) -> u64 {
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_ne_bytes(head)
}

/// Best deadline of a scan and the absolute nonce offset that produced it.
///
/// The scanner only ever improves a result, never resets it, so one value
/// can be threaded through any number of batches. A fresh result holds
/// `u64::MAX`, which every real deadline except `u64::MAX` itself beats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanResult {
    pub best_deadline: u64,
    pub best_offset: u64,
}

impl Default for ScanResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanResult {
    pub const fn new() -> Self {
        ScanResult {
            best_deadline: u64::MAX,
            best_offset: 0,
        }
    }

    /// Records `deadline` if it is strictly smaller than the current best.
    ///
    /// Offsets are offered in ascending order, so an equal deadline arriving
    /// later never displaces the earlier one.
    #[inline(always)]
    pub fn offer(&mut self, deadline: u64, offset: u64) -> bool {
        if deadline < self.best_deadline {
            self.best_deadline = deadline;
            self.best_offset = offset;
            true
        } else {
            false
        }
    }

    /// Offers the digests of one batch, lane 0 first. Offsets wrap at
    /// `u64::MAX`.
    #[inline]
    pub fn fold_digests(&mut self, digests: &[Digest], start_offset: u64) {
        for (lane, digest) in digests.iter().enumerate() {
            self.offer(
                deadline_from_digest(digest),
                start_offset.wrapping_add(lane as u64),
            );
        }
    }

    /// Combines results of disjoint ranges.
    ///
    /// Ties go to the smaller offset, which makes merging in any order agree
    /// with one sequential scan over the union.
    pub fn merge(&mut self, other: &ScanResult) {
        if other.best_deadline < self.best_deadline
            || (other.best_deadline == self.best_deadline && other.best_offset < self.best_offset)
        {
            *self = *other;
        }
    }

    /// Deadline scaled by the block's base target, as reported to a pool
    pub fn adjusted_deadline(&self, base_target: u64) -> Option<u64> {
        self.best_deadline.checked_div(base_target)
    }
}
