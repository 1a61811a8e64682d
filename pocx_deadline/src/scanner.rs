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

//! Batched deadline scan
//!
//! A [`DeadlineScanner`] ties a resolved backend to the shared initial
//! state. Each scan builds the lane buffers once for its signature, then
//! streams full batches through the engine and folds every digest into the
//! caller's [`ScanResult`]. Nonces that do not fill a batch are hashed one
//! lane at a time.

use log::{error, info, trace};

use crate::backend::Backend;
use crate::common::{GenerationSignature, PORTABLE_VECTOR_SIZE, SCOOP_SIZE};
use crate::engine::{LaneEngine, PortableEngine};
use crate::error::{PoCXDeadlineError, Result};
use crate::reducer::ScanResult;
use crate::scoops::Scoops;
use crate::state::{init_cache, InitialState, DEADLINE_HASH_BITS};
use crate::transpose::LaneBuffers;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::common::{AVX2_VECTOR_SIZE, AVX512_VECTOR_SIZE, SSE2_VECTOR_SIZE};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::engine_avx2::Avx2Engine;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::engine_avx512::Avx512Engine;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::engine_sse2::Sse2Engine;

#[cfg(target_arch = "aarch64")]
use crate::common::NEON_VECTOR_SIZE;
#[cfg(target_arch = "aarch64")]
use crate::engine_neon::NeonEngine;

#[derive(Clone, Copy, Debug)]
enum Engine {
    Scalar,
    Portable,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Sse2(Sse2Engine),
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Avx2(Avx2Engine),
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Avx512(Avx512Engine),
    #[cfg(target_arch = "aarch64")]
    Neon(NeonEngine),
}

impl Engine {
    fn for_backend(backend: Backend) -> Option<Engine> {
        match backend {
            Backend::Scalar => Some(Engine::Scalar),
            Backend::Portable => Some(Engine::Portable),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Sse2 => Sse2Engine::detect().map(Engine::Sse2),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Avx2 => Avx2Engine::detect().map(Engine::Avx2),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Avx512f => Avx512Engine::detect().map(Engine::Avx512),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => NeonEngine::detect().map(Engine::Neon),
            _ => None,
        }
    }
}

/// Scans scoop runs for the smallest deadline.
///
/// Construction performs the capability probe. After that the scanner is
/// immutable, `Copy`, and can be shared freely between threads; only the
/// `ScanResult` passed to each call is written.
#[derive(Clone, Copy, Debug)]
pub struct DeadlineScanner<'s> {
    state: &'s InitialState,
    backend: Backend,
    engine: Engine,
}

impl<'s> DeadlineScanner<'s> {
    pub fn new(backend: Backend, state: &'s InitialState) -> Result<Self> {
        if state.output_bits() != DEADLINE_HASH_BITS {
            return Err(PoCXDeadlineError::InvalidInput(format!(
                "deadline scans need a {}-bit Shabal state, got {} bits",
                DEADLINE_HASH_BITS,
                state.output_bits()
            )));
        }

        let resolved = backend.resolve().inspect_err(|e| error!("{}", e))?;
        let engine = Engine::for_backend(resolved).ok_or_else(|| {
            let e = PoCXDeadlineError::UnsupportedBackend(resolved.to_string());
            error!("{}", e);
            e
        })?;

        if backend == Backend::Auto {
            info!(
                "deadline scanner: detected {}, {} lanes",
                resolved,
                resolved.lanes()
            );
        } else {
            info!("deadline scanner: {}, {} lanes", resolved, resolved.lanes());
        }

        Ok(DeadlineScanner {
            state,
            backend: resolved,
            engine,
        })
    }

    /// Scanner over the process-wide initial state
    pub fn with_shared_state(backend: Backend) -> Result<DeadlineScanner<'static>> {
        DeadlineScanner::new(backend, init_cache())
    }

    /// The concrete backend, never `Auto`
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn lanes(&self) -> usize {
        self.backend.lanes()
    }

    /// Scans `scoops` with nonce offsets counted from 0
    pub fn scan_batch(
        &self,
        scoops: &Scoops<'_>,
        signature: &GenerationSignature,
        result: &mut ScanResult,
    ) {
        self.scan_batch_at(scoops, signature, 0, result)
    }

    /// Scans `scoops`, reporting offsets starting at `start_offset`.
    ///
    /// `result` is only ever improved, so calling this for consecutive
    /// ranges accumulates the minimum over all of them. Offsets past
    /// `u64::MAX` wrap around to 0.
    pub fn scan_batch_at(
        &self,
        scoops: &Scoops<'_>,
        signature: &GenerationSignature,
        start_offset: u64,
        result: &mut ScanResult,
    ) {
        let state = self.state;
        match self.engine {
            Engine::Scalar => {
                scan_with::<_, 1>(&PortableEngine, state, scoops, signature, start_offset, result)
            }
            Engine::Portable => scan_with::<_, PORTABLE_VECTOR_SIZE>(
                &PortableEngine,
                state,
                scoops,
                signature,
                start_offset,
                result,
            ),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Engine::Sse2(engine) => scan_with::<_, SSE2_VECTOR_SIZE>(
                &engine,
                state,
                scoops,
                signature,
                start_offset,
                result,
            ),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Engine::Avx2(engine) => scan_with::<_, AVX2_VECTOR_SIZE>(
                &engine,
                state,
                scoops,
                signature,
                start_offset,
                result,
            ),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Engine::Avx512(engine) => scan_with::<_, AVX512_VECTOR_SIZE>(
                &engine,
                state,
                scoops,
                signature,
                start_offset,
                result,
            ),
            #[cfg(target_arch = "aarch64")]
            Engine::Neon(engine) => scan_with::<_, NEON_VECTOR_SIZE>(
                &engine,
                state,
                scoops,
                signature,
                start_offset,
                result,
            ),
        }
    }

    /// Scans the first `nonce_count` scoops of a raw byte buffer
    pub fn scan_bytes(
        &self,
        data: &[u8],
        nonce_count: u64,
        signature: &GenerationSignature,
        result: &mut ScanResult,
    ) -> Result<()> {
        let needed = usize::try_from(nonce_count)
            .ok()
            .and_then(|n| n.checked_mul(SCOOP_SIZE))
            .ok_or_else(|| {
                PoCXDeadlineError::InvalidInput(format!("nonce count {} too large", nonce_count))
            })?;
        if data.len() < needed {
            return Err(PoCXDeadlineError::BufferSizeError(format!(
                "{} nonces need {} bytes, buffer has {}",
                nonce_count,
                needed,
                data.len()
            )));
        }

        let scoops = Scoops::new(&data[..needed])?;
        self.scan_batch(&scoops, signature, result);
        Ok(())
    }
}

/// Runs all full `N`-batches of `scoops` through `engine`, then the tail
/// through the single-lane portable engine.
#[inline]
fn scan_with<E: LaneEngine<N>, const N: usize>(
    engine: &E,
    state: &InitialState,
    scoops: &Scoops<'_>,
    signature: &GenerationSignature,
    start_offset: u64,
    result: &mut ScanResult,
) {
    let (batches, tail) = scoops.batches::<N>();
    let mut buffers = LaneBuffers::<N>::new(signature);
    let mut offset = start_offset;

    for batch in batches {
        buffers.load_scoops(&batch);
        let digests = engine.hash_batch(state, &buffers);
        result.fold_digests(&digests, offset);
        offset = offset.wrapping_add(N as u64);
    }

    if !tail.is_empty() {
        trace!("{} tail nonces on the scalar path from offset {}", tail.len(), offset);
        let (singles, _) = tail.batches::<1>();
        let mut buffers = LaneBuffers::<1>::new(signature);
        for single in singles {
            buffers.load_scoops(&single);
            let digests = LaneEngine::<1>::hash_batch(&PortableEngine, state, &buffers);
            result.fold_digests(&digests, offset);
            offset = offset.wrapping_add(1);
        }
    }
}
