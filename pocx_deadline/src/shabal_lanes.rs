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

//! Lane-generic Shabal256 round and the two-block deadline hash
//!
//! The state registers hold one [`LaneWord`] per Shabal word, so a single
//! round computes N independent hashes. Lanes never exchange data.

use crate::common::{Digest, BLOCK_WORDS, HALF_BLOCK_WORDS, HASH_SIZE};
use crate::lane_word::LaneWord;
use crate::state::{init_cache, InitialState};
use crate::transpose::LaneBuffers;

const A_WORDS: usize = 12;
const P_STEPS: usize = 3 * BLOCK_WORDS;
const A_ADDS: usize = 3 * A_WORDS;
/// Extra rounds over the final block after it has been absorbed
const FINAL_ROUNDS: usize = 3;

pub(crate) struct LaneState<V> {
    a: [V; A_WORDS],
    b: [V; BLOCK_WORDS],
    c: [V; BLOCK_WORDS],
}

impl<V: LaneWord> LaneState<V> {
    #[inline(always)]
    pub(crate) fn zeroed() -> Self
    where
        V: Default,
    {
        LaneState {
            a: [V::default(); A_WORDS],
            b: [V::default(); BLOCK_WORDS],
            c: [V::default(); BLOCK_WORDS],
        }
    }

    /// Copies the cached initial state into every lane
    #[inline(always)]
    pub(crate) unsafe fn broadcast(state: &InitialState) -> Self {
        let mut a = [V::splat(0); A_WORDS];
        let mut b = [V::splat(0); BLOCK_WORDS];
        let mut c = [V::splat(0); BLOCK_WORDS];
        for (lane, &word) in a.iter_mut().zip(state.a.iter()) {
            *lane = V::splat(word);
        }
        for (lane, &word) in b.iter_mut().zip(state.b.iter()) {
            *lane = V::splat(word);
        }
        for (lane, &word) in c.iter_mut().zip(state.c.iter()) {
            *lane = V::splat(word);
        }
        LaneState { a, b, c }
    }

    pub(crate) fn into_words(self) -> ([V; A_WORDS], [V; BLOCK_WORDS], [V; BLOCK_WORDS]) {
        (self.a, self.b, self.c)
    }

    /// Absorbs one message block with block counter `w`.
    ///
    /// Ends with C -= M and a B/C swap. Repeating the round on the same
    /// block therefore gives exactly the Shabal final rounds.
    #[inline(always)]
    pub(crate) unsafe fn round(&mut self, block: &[V; BLOCK_WORDS], w: u64) {
        for (b, &m) in self.b.iter_mut().zip(block.iter()) {
            *b = b.add(m);
        }

        self.a[0] = self.a[0].xor(V::splat(w as u32));
        self.a[1] = self.a[1].xor(V::splat((w >> 32) as u32));

        for b in self.b.iter_mut() {
            *b = b.rotl17();
        }

        self.permute(block);

        for (c, &m) in self.c.iter_mut().zip(block.iter()) {
            *c = c.sub(m);
        }
        std::mem::swap(&mut self.b, &mut self.c);
    }

    #[inline(always)]
    unsafe fn permute(&mut self, block: &[V; BLOCK_WORDS]) {
        let ones = V::splat(u32::MAX);
        let (a, b, c) = (&mut self.a, &mut self.b, &self.c);

        for step in 0..P_STEPS {
            let xa0 = step % A_WORDS;
            let xa1 = (step + A_WORDS - 1) % A_WORDS;
            let xb0 = step % BLOCK_WORDS;
            let xb1 = (step + 13) % BLOCK_WORDS;
            let xb2 = (step + 9) % BLOCK_WORDS;
            let xb3 = (step + 6) % BLOCK_WORDS;
            let xc = (24 - xb0) % BLOCK_WORDS;

            let mut t = a[xa1].rotl15().times5();
            t = a[xa0].xor(t).xor(c[xc]).times3();
            t = t
                .xor(b[xb1])
                .xor(b[xb2].and_not(b[xb3]))
                .xor(block[xb0]);
            a[xa0] = t;
            b[xb0] = b[xb0].rotl1().xor(t.xor(ones));
        }

        for k in 0..A_ADDS {
            let xa = A_WORDS - 1 - k % A_WORDS;
            let xc = (54 - k) % BLOCK_WORDS;
            a[xa] = a[xa].add(c[xc]);
        }
    }

    /// Writes the digest words C[8..16] of every lane as little-endian bytes
    #[inline(always)]
    unsafe fn digests<const N: usize>(&self) -> [Digest; N] {
        let mut words = [[0u32; N]; HALF_BLOCK_WORDS];
        for (out, reg) in words.iter_mut().zip(self.c[HALF_BLOCK_WORDS..].iter()) {
            reg.store(out);
        }

        let mut digests = [[0u8; HASH_SIZE]; N];
        for (lane, digest) in digests.iter_mut().enumerate() {
            for (k, bytes) in digest.chunks_exact_mut(4).enumerate() {
                bytes.copy_from_slice(&words[k][lane].to_le_bytes());
            }
        }
        digests
    }
}

/// Hashes the two transposed blocks of every lane.
///
/// Block 1 is absorbed with the initial counter, block 2 with the next one,
/// followed by the final rounds over block 2 at the same counter.
///
/// # Safety
///
/// `V` must be usable on the running CPU and `V::LANES` must equal `N`.
#[inline(always)]
pub(crate) unsafe fn hash_lanes<V: LaneWord, const N: usize>(
    state: &InitialState,
    buffers: &LaneBuffers<N>,
) -> [Digest; N] {
    debug_assert_eq!(V::LANES, N);

    let mut block1 = [V::splat(0); BLOCK_WORDS];
    let mut block2 = [V::splat(0); BLOCK_WORDS];
    for (reg, words) in block1.iter_mut().zip(buffers.block1().iter()) {
        *reg = V::load(words);
    }
    for (reg, words) in block2.iter_mut().zip(buffers.block2().iter()) {
        *reg = V::load(words);
    }

    let mut lanes = LaneState::<V>::broadcast(state);
    let w = state.w;
    lanes.round(&block1, w);

    let w = w.wrapping_add(1);
    for _ in 0..=FINAL_ROUNDS {
        lanes.round(&block2, w);
    }

    lanes.digests::<N>()
}

/// Single-lane Shabal256 over an arbitrary message.
///
/// Applies the standard padding (0x80, then zeros up to the block size),
/// so `shabal256(gensig ‖ scoop)` is the reference for what every lane
/// engine computes.
pub fn shabal256(message: &[u8]) -> Digest {
    let state = init_cache();
    let mut w = state.w;
    let mut words = [0u32; BLOCK_WORDS];

    // SAFETY: the portable lane word is plain integer arithmetic
    unsafe {
        let mut lanes = LaneState::<[u32; 1]>::broadcast(state);

        let mut blocks = message.chunks_exact(BLOCK_WORDS * 4);
        for chunk in &mut blocks {
            crate::common::read_words_le(chunk, &mut words);
            lanes.round(&words.map(|word| [word]), w);
            w = w.wrapping_add(1);
        }

        let rest = blocks.remainder();
        let mut last = [0u8; BLOCK_WORDS * 4];
        last[..rest.len()].copy_from_slice(rest);
        last[rest.len()] = 0x80;
        crate::common::read_words_le(&last, &mut words);
        let last_block = words.map(|word| [word]);
        for _ in 0..=FINAL_ROUNDS {
            lanes.round(&last_block, w);
        }

        let [digest] = lanes.digests::<1>();
        digest
    }
}
