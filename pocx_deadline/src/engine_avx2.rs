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

//! 8-lane AVX2 engine

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::common::{Digest, AVX2_VECTOR_SIZE};
use crate::engine::LaneEngine;
use crate::lane_word::LaneWord;
use crate::shabal_lanes::hash_lanes;
use crate::state::InitialState;
use crate::transpose::LaneBuffers;

impl LaneWord for __m256i {
    const LANES: usize = AVX2_VECTOR_SIZE;

    #[inline(always)]
    unsafe fn splat(value: u32) -> Self {
        _mm256_set1_epi32(value as i32)
    }

    #[inline(always)]
    unsafe fn load(words: &[u32]) -> Self {
        debug_assert!(words.len() >= AVX2_VECTOR_SIZE);
        _mm256_loadu_si256(words.as_ptr() as *const __m256i)
    }

    #[inline(always)]
    unsafe fn store(self, words: &mut [u32]) {
        debug_assert!(words.len() >= AVX2_VECTOR_SIZE);
        _mm256_storeu_si256(words.as_mut_ptr() as *mut __m256i, self)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        _mm256_add_epi32(self, rhs)
    }

    #[inline(always)]
    unsafe fn sub(self, rhs: Self) -> Self {
        _mm256_sub_epi32(self, rhs)
    }

    #[inline(always)]
    unsafe fn xor(self, rhs: Self) -> Self {
        _mm256_xor_si256(self, rhs)
    }

    #[inline(always)]
    unsafe fn and_not(self, rhs: Self) -> Self {
        _mm256_andnot_si256(rhs, self)
    }

    #[inline(always)]
    unsafe fn rotl1(self) -> Self {
        _mm256_or_si256(_mm256_slli_epi32(self, 1), _mm256_srli_epi32(self, 31))
    }

    #[inline(always)]
    unsafe fn rotl15(self) -> Self {
        _mm256_or_si256(_mm256_slli_epi32(self, 15), _mm256_srli_epi32(self, 17))
    }

    #[inline(always)]
    unsafe fn rotl17(self) -> Self {
        _mm256_or_si256(_mm256_slli_epi32(self, 17), _mm256_srli_epi32(self, 15))
    }

    #[inline(always)]
    unsafe fn times3(self) -> Self {
        _mm256_add_epi32(self, _mm256_slli_epi32(self, 1))
    }

    #[inline(always)]
    unsafe fn times5(self) -> Self {
        _mm256_add_epi32(self, _mm256_slli_epi32(self, 2))
    }
}

/// AVX2 engine. Only constructible on CPUs that report AVX2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Avx2Engine {
    _detected: (),
}

impl Avx2Engine {
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("avx2") {
            Some(Avx2Engine { _detected: () })
        } else {
            None
        }
    }
}

impl LaneEngine<AVX2_VECTOR_SIZE> for Avx2Engine {
    fn name(&self) -> &'static str {
        "AVX2"
    }

    #[inline]
    fn hash_batch(
        &self,
        state: &InitialState,
        buffers: &LaneBuffers<AVX2_VECTOR_SIZE>,
    ) -> [Digest; AVX2_VECTOR_SIZE] {
        // SAFETY: avx2 was detected when this engine was created
        unsafe { hash_lanes_avx2(state, buffers) }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn hash_lanes_avx2(
    state: &InitialState,
    buffers: &LaneBuffers<AVX2_VECTOR_SIZE>,
) -> [Digest; AVX2_VECTOR_SIZE] {
    hash_lanes::<__m256i, AVX2_VECTOR_SIZE>(state, buffers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::assert_matches_portable;

    #[test]
    fn test_avx2_matches_portable() {
        match Avx2Engine::detect() {
            Some(engine) => assert_matches_portable::<AVX2_VECTOR_SIZE, _>(&engine),
            None => println!("AVX2 not available, skipping"),
        }
    }
}
