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

//! Word-interleaved message buffers for N-lane Shabal
//!
//! Each deadline message is `gensig (32) ‖ scoop (64) ‖ terminator (32)`,
//! exactly two 64-byte blocks. A vector engine wants word `w` of every lane
//! next to each other, so both blocks are stored word-major:
//! `block[w][lane]`.
//!
//! ```text
//! block1: w0..w7  = gensig          (same in every lane)
//!         w8..w15 = scoop[0..32]    (per lane)
//! block2: w0..w7  = scoop[32..64]   (per lane)
//!         w8..w15 = 0x80, 0, 0, ... (same in every lane)
//! ```

use crate::common::{read_words_le, GenerationSignature, BLOCK_WORDS, HALF_BLOCK_WORDS, TERMINATOR};
use crate::scoops::ScoopBatch;

/// Transposed two-block messages for `N` lanes.
///
/// The signature and terminator words are written once by [`new`] and
/// survive every [`load_scoops`]; only the scoop words change per batch.
///
/// [`new`]: LaneBuffers::new
/// [`load_scoops`]: LaneBuffers::load_scoops
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneBuffers<const N: usize> {
    block1: [[u32; N]; BLOCK_WORDS],
    block2: [[u32; N]; BLOCK_WORDS],
}

impl<const N: usize> LaneBuffers<N> {
    /// Prepares the scan-constant parts. Scoop words start out zero.
    pub fn new(generation_signature: &GenerationSignature) -> Self {
        let mut gensig_words = [0u32; HALF_BLOCK_WORDS];
        let mut end_words = [0u32; HALF_BLOCK_WORDS];
        read_words_le(generation_signature, &mut gensig_words);
        read_words_le(&TERMINATOR, &mut end_words);

        let mut block1 = [[0u32; N]; BLOCK_WORDS];
        let mut block2 = [[0u32; N]; BLOCK_WORDS];
        for w in 0..HALF_BLOCK_WORDS {
            block1[w] = [gensig_words[w]; N];
            block2[HALF_BLOCK_WORDS + w] = [end_words[w]; N];
        }

        LaneBuffers { block1, block2 }
    }

    /// Scatters one batch of scoops into the per-lane words
    #[inline]
    pub fn load_scoops(&mut self, batch: &ScoopBatch<'_, N>) {
        let mut words = [0u32; BLOCK_WORDS];
        for (lane, scoop) in batch.iter().enumerate() {
            read_words_le(scoop, &mut words);
            for w in 0..HALF_BLOCK_WORDS {
                self.block1[HALF_BLOCK_WORDS + w][lane] = words[w];
                self.block2[w][lane] = words[HALF_BLOCK_WORDS + w];
            }
        }
    }

    pub fn block1(&self) -> &[[u32; N]; BLOCK_WORDS] {
        &self.block1
    }

    pub fn block2(&self) -> &[[u32; N]; BLOCK_WORDS] {
        &self.block2
    }

    /// Reassembles the 128-byte message of one lane
    pub fn lane_message(&self, lane: usize) -> Option<[u8; 2 * BLOCK_WORDS * 4]> {
        if lane >= N {
            return None;
        }
        let mut message = [0u8; 2 * BLOCK_WORDS * 4];
        let words = self.block1.iter().chain(self.block2.iter());
        for (bytes, lanes) in message.chunks_exact_mut(4).zip(words) {
            bytes.copy_from_slice(&lanes[lane].to_le_bytes());
        }
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{GENSIG_SIZE, SCOOP_SIZE};

    const SCOOP_OFFSET: usize = GENSIG_SIZE;

    fn gensig() -> GenerationSignature {
        std::array::from_fn(|i| i as u8)
    }

    fn scoop_bytes(lanes: usize, seed: u8) -> Vec<u8> {
        (0..lanes * SCOOP_SIZE)
            .map(|i| seed.wrapping_add((i * 13) as u8))
            .collect()
    }

    #[test]
    fn test_messages_are_signature_scoop_terminator() {
        let data = scoop_bytes(16, 1);
        let mut buffers = LaneBuffers::<16>::new(&gensig());
        buffers.load_scoops(&ScoopBatch::new(&data).unwrap());

        for lane in 0..16 {
            let message = buffers.lane_message(lane).unwrap();
            assert_eq!(&message[..SCOOP_OFFSET], &gensig()[..]);
            assert_eq!(
                &message[SCOOP_OFFSET..SCOOP_OFFSET + SCOOP_SIZE],
                &data[lane * SCOOP_SIZE..(lane + 1) * SCOOP_SIZE]
            );
            assert_eq!(&message[SCOOP_OFFSET + SCOOP_SIZE..], &TERMINATOR[..]);
        }
        assert!(buffers.lane_message(16).is_none());
    }

    #[test]
    fn test_word_major_layout() {
        let data = scoop_bytes(4, 7);
        let mut buffers = LaneBuffers::<4>::new(&gensig());
        buffers.load_scoops(&ScoopBatch::new(&data).unwrap());

        // word 8 of block 2 is the 0x80 terminator byte in every lane
        assert_eq!(buffers.block2()[8], [0x80; 4]);
        assert!(buffers.block2()[9..].iter().all(|lanes| *lanes == [0; 4]));
        // word 0 of block 1 is the first signature word in every lane
        assert_eq!(buffers.block1()[0], [0x03020100; 4]);
        // word 8 of block 1 is the first scoop word, one lane after another
        for lane in 0..4 {
            let at = lane * SCOOP_SIZE;
            let expected =
                u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
            assert_eq!(buffers.block1()[8][lane], expected);
        }
    }

    #[test]
    fn test_reload_keeps_constant_words() {
        let mut buffers = LaneBuffers::<8>::new(&gensig());
        let fresh = buffers.clone();

        let first = scoop_bytes(8, 3);
        let second = scoop_bytes(8, 200);
        buffers.load_scoops(&ScoopBatch::new(&first).unwrap());
        buffers.load_scoops(&ScoopBatch::new(&second).unwrap());

        assert_eq!(buffers.block1()[..8], fresh.block1()[..8]);
        assert_eq!(buffers.block2()[8..], fresh.block2()[8..]);
        let message = buffers.lane_message(5).unwrap();
        assert_eq!(
            &message[SCOOP_OFFSET..SCOOP_OFFSET + SCOOP_SIZE],
            &second[5 * SCOOP_SIZE..6 * SCOOP_SIZE]
        );
    }
}
