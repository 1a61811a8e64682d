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

//! Shabal256 initial state, computed once and shared read-only
//!
//! Every batch starts from the state Shabal reaches after absorbing its two
//! IV prefix blocks. That setup is identical for all batches, so it is done
//! once and each batch broadcasts a copy of the result into its lanes.

use crate::common::BLOCK_WORDS;
use crate::shabal_lanes::LaneState;
use std::sync::OnceLock;

/// Digest width every deadline backend produces
pub const DEADLINE_HASH_BITS: u32 = 256;

/// Shabal internal state after IV setup, before any message block.
///
/// Lane engines never mutate this value. They copy it into their own
/// working registers at the start of every batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitialState {
    pub(crate) a: [u32; 12],
    pub(crate) b: [u32; 16],
    pub(crate) c: [u32; 16],
    pub(crate) w: u64,
    output_bits: u32,
}

impl InitialState {
    /// Computes the Shabal state for the given digest width.
    ///
    /// Starting from an all-zero state, absorbs the block
    /// `output_bits + 0..16` with counter -1 and then the block
    /// `output_bits + 16..32` with counter 0. The counter is left at 1.
    pub fn new(output_bits: u32) -> Self {
        let mut lanes = LaneState::<[u32; 1]>::zeroed();
        let mut w = u64::MAX;

        for prefix in 0..2u32 {
            let block: [[u32; 1]; BLOCK_WORDS] =
                std::array::from_fn(|u| [output_bits.wrapping_add(prefix * 16 + u as u32)]);
            // SAFETY: the portable lane word is plain integer arithmetic
            unsafe { lanes.round(&block, w) };
            w = w.wrapping_add(1);
        }

        let (a, b, c) = lanes.into_words();
        InitialState {
            a: a.map(|lane| lane[0]),
            b: b.map(|lane| lane[0]),
            c: c.map(|lane| lane[0]),
            w,
            output_bits,
        }
    }

    /// Initial state for Shabal-256, the digest used for deadlines
    pub fn shabal256() -> Self {
        Self::new(DEADLINE_HASH_BITS)
    }

    /// Digest width this state was computed for
    pub fn output_bits(&self) -> u32 {
        self.output_bits
    }
}

static SHARED_STATE: OnceLock<InitialState> = OnceLock::new();

/// Returns the process-wide Shabal-256 initial state, computing it on first
/// use.
///
/// Safe to call from any thread and any number of times. Every call after the
/// first returns the same instance.
pub fn init_cache() -> &'static InitialState {
    SHARED_STATE.get_or_init(InitialState::shabal256)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A_IV: [u32; 12] = [
        0x52F84552, 0xE54B7999, 0x2D8EE3EC, 0xB9645191, 0xE0078B86, 0xBB7C44C9, 0xD2B5C1CA,
        0xB0D2EB8C, 0x14CE5A45, 0x22AF50DC, 0xEFFDBC6B, 0xEB21B74A,
    ];
    const B_IV: [u32; 16] = [
        0xB555C6EE, 0x3E710596, 0xA72A652F, 0x9301515F, 0xDA28C1FA, 0x696FD868, 0x9CB6BF72,
        0x0AFE4002, 0xA6E03615, 0x5138C1D4, 0xBE216306, 0xB38B8890, 0x3EA8B96B, 0x3299ACE4,
        0x30924DD4, 0x55CB34A5,
    ];
    const C_IV: [u32; 16] = [
        0xB405F031, 0xC4233EBA, 0xB3733979, 0xC0DD9D55, 0xC51C28AE, 0xA327B8E1, 0x56C56167,
        0xED614433, 0x88B59D60, 0x60E2CEBA, 0x758B4B8B, 0x83E82A7F, 0xBC968828, 0xE6E00BF7,
        0xBA839E55, 0x9B491C60,
    ];

    #[test]
    fn test_computed_state_matches_shabal256_iv() {
        let state = InitialState::shabal256();
        assert_eq!(state.a, A_IV);
        assert_eq!(state.b, B_IV);
        assert_eq!(state.c, C_IV);
        assert_eq!(state.w, 1);
        assert_eq!(state.output_bits(), 256);
    }

    #[test]
    fn test_other_widths_differ() {
        let s192 = InitialState::new(192);
        let s256 = InitialState::new(256);
        assert_ne!(s192.a, s256.a);
        assert_eq!(s192.w, s256.w);
    }

    #[test]
    fn test_init_cache_is_idempotent() {
        let first = init_cache();
        let second = init_cache();
        assert!(std::ptr::eq(first, second));
        assert_eq!(*first, InitialState::shabal256());
    }

    #[test]
    fn test_init_cache_concurrent_first_use() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| *init_cache()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), InitialState::shabal256());
        }
    }
}
