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

//! 4-lane NEON engine
//!
//! NEON is mandatory on AArch64, `detect()` still goes through the runtime
//! check so all engines are obtained the same way.

use std::arch::aarch64::*;

use crate::common::{Digest, NEON_VECTOR_SIZE};
use crate::engine::LaneEngine;
use crate::lane_word::LaneWord;
use crate::shabal_lanes::hash_lanes;
use crate::state::InitialState;
use crate::transpose::LaneBuffers;

/// Left rotation of every lane
macro_rules! vrotlq_n_u32 {
    ($a:expr, $n:literal, $m:literal) => {
        vorrq_u32(vshlq_n_u32::<$n>($a), vshrq_n_u32::<$m>($a))
    };
}

impl LaneWord for uint32x4_t {
    const LANES: usize = NEON_VECTOR_SIZE;

    #[inline(always)]
    unsafe fn splat(value: u32) -> Self {
        vdupq_n_u32(value)
    }

    #[inline(always)]
    unsafe fn load(words: &[u32]) -> Self {
        debug_assert!(words.len() >= NEON_VECTOR_SIZE);
        vld1q_u32(words.as_ptr())
    }

    #[inline(always)]
    unsafe fn store(self, words: &mut [u32]) {
        debug_assert!(words.len() >= NEON_VECTOR_SIZE);
        vst1q_u32(words.as_mut_ptr(), self)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        vaddq_u32(self, rhs)
    }

    #[inline(always)]
    unsafe fn sub(self, rhs: Self) -> Self {
        vsubq_u32(self, rhs)
    }

    #[inline(always)]
    unsafe fn xor(self, rhs: Self) -> Self {
        veorq_u32(self, rhs)
    }

    #[inline(always)]
    unsafe fn and_not(self, rhs: Self) -> Self {
        vbicq_u32(self, rhs)
    }

    #[inline(always)]
    unsafe fn rotl1(self) -> Self {
        vrotlq_n_u32!(self, 1, 31)
    }

    #[inline(always)]
    unsafe fn rotl15(self) -> Self {
        vrotlq_n_u32!(self, 15, 17)
    }

    #[inline(always)]
    unsafe fn rotl17(self) -> Self {
        vrotlq_n_u32!(self, 17, 15)
    }

    #[inline(always)]
    unsafe fn times3(self) -> Self {
        vaddq_u32(self, vshlq_n_u32::<1>(self))
    }

    #[inline(always)]
    unsafe fn times5(self) -> Self {
        vaddq_u32(self, vshlq_n_u32::<2>(self))
    }
}

/// NEON engine for AArch64
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NeonEngine {
    _detected: (),
}

impl NeonEngine {
    pub fn detect() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Some(NeonEngine { _detected: () })
        } else {
            None
        }
    }
}

impl LaneEngine<NEON_VECTOR_SIZE> for NeonEngine {
    fn name(&self) -> &'static str {
        "NEON"
    }

    #[inline]
    fn hash_batch(
        &self,
        state: &InitialState,
        buffers: &LaneBuffers<NEON_VECTOR_SIZE>,
    ) -> [Digest; NEON_VECTOR_SIZE] {
        // SAFETY: neon was detected when this engine was created
        unsafe { hash_lanes_neon(state, buffers) }
    }
}

#[target_feature(enable = "neon")]
unsafe fn hash_lanes_neon(
    state: &InitialState,
    buffers: &LaneBuffers<NEON_VECTOR_SIZE>,
) -> [Digest; NEON_VECTOR_SIZE] {
    hash_lanes::<uint32x4_t, NEON_VECTOR_SIZE>(state, buffers)
}
