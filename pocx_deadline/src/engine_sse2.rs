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

//! 4-lane SSE2 engine

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::common::{Digest, SSE2_VECTOR_SIZE};
use crate::engine::LaneEngine;
use crate::lane_word::LaneWord;
use crate::shabal_lanes::hash_lanes;
use crate::state::InitialState;
use crate::transpose::LaneBuffers;

impl LaneWord for __m128i {
    const LANES: usize = SSE2_VECTOR_SIZE;

    #[inline(always)]
    unsafe fn splat(value: u32) -> Self {
        _mm_set1_epi32(value as i32)
    }

    #[inline(always)]
    unsafe fn load(words: &[u32]) -> Self {
        debug_assert!(words.len() >= SSE2_VECTOR_SIZE);
        _mm_loadu_si128(words.as_ptr() as *const __m128i)
    }

    #[inline(always)]
    unsafe fn store(self, words: &mut [u32]) {
        debug_assert!(words.len() >= SSE2_VECTOR_SIZE);
        _mm_storeu_si128(words.as_mut_ptr() as *mut __m128i, self)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        _mm_add_epi32(self, rhs)
    }

    #[inline(always)]
    unsafe fn sub(self, rhs: Self) -> Self {
        _mm_sub_epi32(self, rhs)
    }

    #[inline(always)]
    unsafe fn xor(self, rhs: Self) -> Self {
        _mm_xor_si128(self, rhs)
    }

    #[inline(always)]
    unsafe fn and_not(self, rhs: Self) -> Self {
        _mm_andnot_si128(rhs, self)
    }

    #[inline(always)]
    unsafe fn rotl1(self) -> Self {
        _mm_or_si128(_mm_slli_epi32(self, 1), _mm_srli_epi32(self, 31))
    }

    #[inline(always)]
    unsafe fn rotl15(self) -> Self {
        _mm_or_si128(_mm_slli_epi32(self, 15), _mm_srli_epi32(self, 17))
    }

    #[inline(always)]
    unsafe fn rotl17(self) -> Self {
        _mm_or_si128(_mm_slli_epi32(self, 17), _mm_srli_epi32(self, 15))
    }

    #[inline(always)]
    unsafe fn times3(self) -> Self {
        _mm_add_epi32(self, _mm_slli_epi32(self, 1))
    }

    #[inline(always)]
    unsafe fn times5(self) -> Self {
        _mm_add_epi32(self, _mm_slli_epi32(self, 2))
    }
}

/// SSE2 engine. Only constructible on CPUs that report SSE2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sse2Engine {
    _detected: (),
}

impl Sse2Engine {
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("sse2") {
            Some(Sse2Engine { _detected: () })
        } else {
            None
        }
    }
}

impl LaneEngine<SSE2_VECTOR_SIZE> for Sse2Engine {
    fn name(&self) -> &'static str {
        "SSE2"
    }

    #[inline]
    fn hash_batch(
        &self,
        state: &InitialState,
        buffers: &LaneBuffers<SSE2_VECTOR_SIZE>,
    ) -> [Digest; SSE2_VECTOR_SIZE] {
        // SAFETY: sse2 was detected when this engine was created
        unsafe { hash_lanes_sse2(state, buffers) }
    }
}

#[target_feature(enable = "sse2")]
unsafe fn hash_lanes_sse2(
    state: &InitialState,
    buffers: &LaneBuffers<SSE2_VECTOR_SIZE>,
) -> [Digest; SSE2_VECTOR_SIZE] {
    hash_lanes::<__m128i, SSE2_VECTOR_SIZE>(state, buffers)
}
