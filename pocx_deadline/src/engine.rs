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

//! Batched digest engines
//!
//! An engine hashes `N` transposed deadline messages in one call. The
//! portable engine runs on every target; vector engines live in their own
//! modules and can only be obtained through `detect()`, so holding one
//! proves its instruction set is present.

use crate::common::Digest;
use crate::shabal_lanes::hash_lanes;
use crate::state::InitialState;
use crate::transpose::LaneBuffers;

/// Hashes the `N` lanes of a [`LaneBuffers`] into `N` digests.
///
/// Lane `i` of the result is the Shabal256 digest of lane `i` of the input;
/// no lane depends on another.
pub trait LaneEngine<const N: usize> {
    /// Short display name, used in logs
    fn name(&self) -> &'static str;

    fn hash_batch(&self, state: &InitialState, buffers: &LaneBuffers<N>) -> [Digest; N];
}

/// Array-of-words engine, auto-vectorized by the compiler where possible.
///
/// With `N = 1` it is the scalar reference path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortableEngine;

impl<const N: usize> LaneEngine<N> for PortableEngine {
    fn name(&self) -> &'static str {
        if N == 1 {
            "scalar"
        } else {
            "portable"
        }
    }

    #[inline]
    fn hash_batch(&self, state: &InitialState, buffers: &LaneBuffers<N>) -> [Digest; N] {
        // SAFETY: [u32; N] has exactly N lanes and needs no CPU feature
        unsafe { hash_lanes::<[u32; N], N>(state, buffers) }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::common::{GenerationSignature, SCOOP_SIZE};
    use crate::scoops::ScoopBatch;
    use crate::state::init_cache;

    pub(crate) fn pseudo_random_scoops(lanes: usize, seed: u32) -> Vec<u8> {
        let mut x = seed.wrapping_mul(0x9E3779B9) | 1;
        (0..lanes * SCOOP_SIZE)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                x as u8
            })
            .collect()
    }

    /// Runs `engine` and the portable engine on the same input
    pub(crate) fn assert_matches_portable<const N: usize, E: LaneEngine<N>>(engine: &E) {
        for seed in 1..=4u32 {
            let gensig: GenerationSignature = std::array::from_fn(|i| (i as u32 * seed) as u8);
            let data = pseudo_random_scoops(N, seed);
            let mut buffers = LaneBuffers::<N>::new(&gensig);
            buffers.load_scoops(&ScoopBatch::<N>::new(&data).unwrap());

            let expected = PortableEngine.hash_batch(init_cache(), &buffers);
            let actual = engine.hash_batch(init_cache(), &buffers);
            assert_eq!(actual, expected, "{} seed {}", engine.name(), seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::common::SCOOP_SIZE;
    use crate::scoops::ScoopBatch;
    use crate::shabal_lanes::shabal256;
    use crate::state::init_cache;

    #[test]
    fn test_portable_lanes_match_scalar() {
        let gensig = [0x11u8; 32];
        let data = pseudo_random_scoops(8, 42);
        let mut wide = LaneBuffers::<8>::new(&gensig);
        wide.load_scoops(&ScoopBatch::new(&data).unwrap());
        let digests = PortableEngine.hash_batch(init_cache(), &wide);

        for (lane, digest) in digests.iter().enumerate() {
            let scoop = &data[lane * SCOOP_SIZE..(lane + 1) * SCOOP_SIZE];
            let mut single = LaneBuffers::<1>::new(&gensig);
            single.load_scoops(&ScoopBatch::new(scoop).unwrap());
            let [one] = PortableEngine.hash_batch(init_cache(), &single);
            assert_eq!(*digest, one);

            let mut message = gensig.to_vec();
            message.extend_from_slice(scoop);
            assert_eq!(*digest, shabal256(&message));
        }
    }

    #[test]
    fn test_portable_names() {
        assert_eq!(LaneEngine::<1>::name(&PortableEngine), "scalar");
        assert_eq!(LaneEngine::<8>::name(&PortableEngine), "portable");
    }
}
