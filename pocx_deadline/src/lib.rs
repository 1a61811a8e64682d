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

#![crate_name = "pocx_deadline"]

//! # PoCX Deadline - Batched Deadline Search for Proof of Capacity
//!
//! This library implements the inner loop of a proof of capacity miner: for
//! every nonce in a run of precomputed scoops it hashes
//! `generation signature ‖ scoop` with Shabal256, takes the first 8 digest
//! bytes as the nonce's deadline and keeps the smallest deadline together
//! with the offset that produced it.
//!
//! ## Features
//!
//! - **SIMD Acceleration**: 4, 8 or 16 nonces per call on SSE2, AVX2,
//!   AVX512F and NEON, chosen by runtime detection
//! - **Exact Padding**: each lane hashes exactly the bytes a single-lane
//!   Shabal256 over the same message would
//! - **Streaming Minimum**: one [`ScanResult`] can be threaded through any
//!   number of batches, files or threads
//! - **Parallel Scans**: [`ParallelScanner`] splits a run over a rayon pool
//!   and merges to the same answer as a sequential scan
//!
//! ## Main Functions
//!
//! - [`DeadlineScanner::scan_batch`] - scan a run of scoops into a result
//! - [`find_best_deadline`] - scan a raw byte buffer with the best backend
//! - [`deadline_of`] - deadline of a single nonce
//! - [`calculate_scoop`] - scoop number for a block height and signature
//! - [`decode_generation_signature`] - hex string to signature bytes
//!
//! ## Example Usage
//!
//! ```rust
//! use pocx_deadline::*;
//!
//! let scanner = DeadlineScanner::with_shared_state(Backend::Auto)
//!     .expect("auto always resolves");
//! let data = vec![0u8; 64 * 32]; // 32 nonces worth of scoops
//! let scoops = Scoops::new(&data).expect("whole scoops");
//! let signature = [0u8; 32];
//!
//! let mut result = ScanResult::new();
//! scanner.scan_batch(&scoops, &signature, &mut result);
//! assert_eq!(result.best_deadline, deadline_of(&signature, &[0u8; 64]));
//! assert_eq!(result.best_offset, 0);
//! ```

use std::sync::OnceLock;

use cfg_if::cfg_if;

pub mod backend;
pub mod common;
pub mod config;
pub mod engine;
pub mod error;
mod lane_word;
pub mod parallel;
pub mod reducer;
pub mod scanner;
pub mod scoops;
mod shabal_lanes;
pub mod state;
pub mod transpose;

cfg_if! {
    if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        pub mod engine_avx2;
        pub mod engine_avx512;
        pub mod engine_sse2;

        pub use engine_avx2::Avx2Engine;
        pub use engine_avx512::Avx512Engine;
        pub use engine_sse2::Sse2Engine;
    } else if #[cfg(target_arch = "aarch64")] {
        pub mod engine_neon;

        pub use engine_neon::NeonEngine;
    }
}

pub use backend::Backend;
pub use common::{Digest, GenerationSignature, Scoop, NUM_SCOOPS, SCOOP_SIZE};
pub use config::{load_cfg, parse_cfg, validate_cfg, ScanCfg, ScanCfgBuilder};
pub use engine::{LaneEngine, PortableEngine};
pub use error::{PoCXDeadlineError, Result};
pub use parallel::ParallelScanner;
pub use reducer::{deadline_from_digest, ScanResult};
pub use scanner::DeadlineScanner;
pub use scoops::{ScoopBatch, Scoops};
pub use shabal_lanes::shabal256;
pub use state::{init_cache, InitialState};
pub use transpose::LaneBuffers;

/// Decode a hex generation signature into its 32 bytes.
///
/// # Example
///
/// ```rust
/// use pocx_deadline::decode_generation_signature;
///
/// let sig = decode_generation_signature(
///     "9821beb3b34d9a3b30127c05f8d1e9006f8a02f565a3572145134bbe34d37a76",
/// )
/// .unwrap();
/// assert_eq!(sig[0], 0x98);
/// ```
pub fn decode_generation_signature(generation_signature: &str) -> Result<GenerationSignature> {
    let mut generation_signature_bytes = [0; 32];
    hex::decode_to_slice(generation_signature, &mut generation_signature_bytes).map_err(|e| {
        PoCXDeadlineError::HexDecodeError(format!(
            "Failed to decode generation signature '{}': {}",
            generation_signature, e
        ))
    })?;
    Ok(generation_signature_bytes)
}

/// Scoop number to read for a block, always below [`NUM_SCOOPS`].
///
/// Hashes `signature ‖ height (big-endian)` and takes the low 12 bits of the
/// last two digest bytes.
pub fn calculate_scoop(block_height: u64, generation_signature_bytes: &GenerationSignature) -> u64 {
    let mut data = [0u8; 40];
    data[..32].copy_from_slice(generation_signature_bytes);
    data[32..].copy_from_slice(&block_height.to_be_bytes());

    let digest = shabal256(&data);
    (u64::from(digest[30] & 0x0F) << 8) | u64::from(digest[31])
}

/// Deadline of one nonce, hashed on the single-lane path
pub fn deadline_of(generation_signature: &GenerationSignature, scoop: &Scoop) -> u64 {
    let mut message = [0u8; 32 + SCOOP_SIZE];
    message[..32].copy_from_slice(generation_signature);
    message[32..].copy_from_slice(scoop);
    deadline_from_digest(&shabal256(&message))
}

fn default_scanner() -> Result<DeadlineScanner<'static>> {
    static SCANNER: OnceLock<Result<DeadlineScanner<'static>>> = OnceLock::new();
    SCANNER
        .get_or_init(|| DeadlineScanner::with_shared_state(Backend::Auto))
        .clone()
}

/// Best `(deadline, offset)` over the first `number_of_nonces` scoops of
/// `data`, using the widest backend the CPU supports.
///
/// An empty scan returns `(u64::MAX, 0)`.
pub fn find_best_deadline(
    data: &[u8],
    number_of_nonces: u64,
    generation_signature_bytes: &GenerationSignature,
) -> Result<(u64, u64)> {
    let scanner = default_scanner()?;
    let mut result = ScanResult::new();
    scanner.scan_bytes(data, number_of_nonces, generation_signature_bytes, &mut result)?;
    Ok((result.best_deadline, result.best_offset))
}
