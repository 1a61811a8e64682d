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

//! Multi-threaded scanning over disjoint nonce ranges
//!
//! The kernel itself is single-threaded. This splits a run into chunks,
//! scans each chunk into its own [`ScanResult`] on a rayon pool and merges
//! the partial results, which gives the same answer as one sequential scan.

use log::debug;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::common::GenerationSignature;
use crate::config::{validate_cfg, ScanCfg};
use crate::error::Result;
use crate::reducer::ScanResult;
use crate::scanner::DeadlineScanner;
use crate::scoops::Scoops;

/// Builds a named rayon pool; 0 threads lets rayon pick one per core
pub fn new_thread_pool(num_threads: usize) -> Result<ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|id| format!("deadline-scan-{}", id))
        .build()?;
    Ok(pool)
}

/// Scans chunks of a run on a thread pool and merges the partial results
pub struct ParallelScanner<'s> {
    scanner: DeadlineScanner<'s>,
    pool: ThreadPool,
    chunk_nonces: usize,
}

impl ParallelScanner<'static> {
    /// Resolves the configured backend against the shared state and starts
    /// the pool
    pub fn from_cfg(cfg: &ScanCfg) -> Result<Self> {
        let scanner = DeadlineScanner::with_shared_state(cfg.backend)?;
        ParallelScanner::new(scanner, cfg)
    }
}

impl<'s> ParallelScanner<'s> {
    /// Uses `cfg` for the pool size and chunking. Its backend is ignored in
    /// favour of the one `scanner` already resolved.
    pub fn new(scanner: DeadlineScanner<'s>, cfg: &ScanCfg) -> Result<Self> {
        let cfg = validate_cfg(cfg.clone())?;
        let pool = new_thread_pool(cfg.cpu_threads)?;
        debug!(
            "parallel scanner: {} threads, {} nonces per chunk",
            pool.current_num_threads(),
            cfg.chunk_nonces
        );
        Ok(ParallelScanner {
            scanner,
            pool,
            chunk_nonces: cfg.chunk_nonces,
        })
    }

    pub fn scanner(&self) -> &DeadlineScanner<'s> {
        &self.scanner
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn chunk_nonces(&self) -> usize {
        self.chunk_nonces
    }

    pub fn scan(
        &self,
        scoops: &Scoops<'_>,
        signature: &GenerationSignature,
        result: &mut ScanResult,
    ) {
        self.scan_at(scoops, signature, 0, result)
    }

    /// Parallel counterpart of [`DeadlineScanner::scan_batch_at`]
    pub fn scan_at(
        &self,
        scoops: &Scoops<'_>,
        signature: &GenerationSignature,
        start_offset: u64,
        result: &mut ScanResult,
    ) {
        let chunks: Vec<Scoops<'_>> = scoops.chunks(self.chunk_nonces).collect();
        debug!(
            "scanning {} nonces in {} chunks from offset {}",
            scoops.len(),
            chunks.len(),
            start_offset
        );

        let scanner = &self.scanner;
        let chunk_nonces = self.chunk_nonces as u64;
        let best = self.pool.install(|| {
            chunks
                .par_iter()
                .enumerate()
                .map(|(i, chunk)| {
                    let mut partial = ScanResult::new();
                    let offset =
                        start_offset.wrapping_add((i as u64).wrapping_mul(chunk_nonces));
                    scanner.scan_batch_at(chunk, signature, offset, &mut partial);
                    partial
                })
                .reduce(ScanResult::new, |mut a, b| {
                    a.merge(&b);
                    a
                })
        });

        // chunk ties are settled by merge, the caller's result only improves
        result.offer(best.best_deadline, best.best_offset);
    }
}
