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

//! One 32-bit Shabal word for every lane of a vector engine
//!
//! The Shabal round in [`crate::shabal_lanes`] is written once against this
//! trait. Each backend supplies an implementation for its register type, and
//! the portable `[u32; N]` implementation covers the scalar path and targets
//! without a dedicated backend.

/// Lane-parallel 32-bit word operations needed by the Shabal round.
///
/// # Safety
///
/// SIMD implementations issue instructions of their target feature without
/// checking for it. Callers must only use a type whose feature was detected,
/// which the engine constructors in [`crate::engine`] guarantee. `load` and
/// `store` read or write exactly `LANES` words and require slices at least
/// that long.
pub(crate) trait LaneWord: Copy {
    const LANES: usize;

    unsafe fn splat(value: u32) -> Self;
    unsafe fn load(words: &[u32]) -> Self;
    unsafe fn store(self, words: &mut [u32]);

    unsafe fn add(self, rhs: Self) -> Self;
    unsafe fn sub(self, rhs: Self) -> Self;
    unsafe fn xor(self, rhs: Self) -> Self;
    /// `self & !rhs`
    unsafe fn and_not(self, rhs: Self) -> Self;

    unsafe fn rotl1(self) -> Self;
    unsafe fn rotl15(self) -> Self;
    unsafe fn rotl17(self) -> Self;

    unsafe fn times3(self) -> Self;
    unsafe fn times5(self) -> Self;
}

impl<const N: usize> LaneWord for [u32; N] {
    const LANES: usize = N;

    #[inline(always)]
    unsafe fn splat(value: u32) -> Self {
        [value; N]
    }

    #[inline(always)]
    unsafe fn load(words: &[u32]) -> Self {
        let mut lanes = [0u32; N];
        lanes.copy_from_slice(&words[..N]);
        lanes
    }

    #[inline(always)]
    unsafe fn store(self, words: &mut [u32]) {
        words[..N].copy_from_slice(&self);
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i].wrapping_add(rhs[i]))
    }

    #[inline(always)]
    unsafe fn sub(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i].wrapping_sub(rhs[i]))
    }

    #[inline(always)]
    unsafe fn xor(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i] ^ rhs[i])
    }

    #[inline(always)]
    unsafe fn and_not(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i] & !rhs[i])
    }

    #[inline(always)]
    unsafe fn rotl1(self) -> Self {
        self.map(|w| w.rotate_left(1))
    }

    #[inline(always)]
    unsafe fn rotl15(self) -> Self {
        self.map(|w| w.rotate_left(15))
    }

    #[inline(always)]
    unsafe fn rotl17(self) -> Self {
        self.map(|w| w.rotate_left(17))
    }

    #[inline(always)]
    unsafe fn times3(self) -> Self {
        self.map(|w| w.wrapping_mul(3))
    }

    #[inline(always)]
    unsafe fn times5(self) -> Self {
        self.map(|w| w.wrapping_mul(5))
    }
}
