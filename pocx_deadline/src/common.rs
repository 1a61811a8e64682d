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

//! Sizes and fixed message parts shared by every deadline backend

/// Bytes in a generation signature
pub const GENSIG_SIZE: usize = 32;
/// Bytes in a Shabal256 digest
pub const HASH_SIZE: usize = 32;
/// Bytes in one scoop (two Shabal256 hashes)
pub const SCOOP_SIZE: usize = 64;
/// Scoops per nonce
pub const NUM_SCOOPS: usize = 4096;
/// 32-bit words per Shabal message block (64 bytes)
pub const BLOCK_WORDS: usize = 16;
/// 32-bit words in half a block
pub const HALF_BLOCK_WORDS: usize = BLOCK_WORDS / 2;

pub const SSE2_VECTOR_SIZE: usize = 4;
pub const AVX2_VECTOR_SIZE: usize = 8;
pub const AVX512_VECTOR_SIZE: usize = 16;
pub const NEON_VECTOR_SIZE: usize = 4;
pub const PORTABLE_VECTOR_SIZE: usize = 8;

/// Tail of every deadline message: 0x80 followed by 31 zero bytes
pub const TERMINATOR: [u8; 32] = {
    let mut end = [0u8; 32];
    end[0] = 0x80;
    end
};

/// Round-specific challenge shared by all nonces of a scan
pub type GenerationSignature = [u8; GENSIG_SIZE];
/// Precomputed per-nonce plot data
pub type Scoop = [u8; SCOOP_SIZE];
/// Shabal256 output
pub type Digest = [u8; HASH_SIZE];

/// Reads the little-endian 32-bit words of a byte run into `target`.
///
/// `source` must hold at least `4 * target.len()` bytes.
#[inline(always)]
pub(crate) fn read_words_le(source: &[u8], target: &mut [u32]) {
    for (word, bytes) in target.iter_mut().zip(source.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
}
