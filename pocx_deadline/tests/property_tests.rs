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

//! Property-based tests for pocx_deadline
//!
//! These check the scan invariants over random signatures and scoop runs:
//! minimum correctness, lane independence, monotonic accumulation and
//! determinism.

use pocx_deadline::{
    calculate_scoop, deadline_of, Backend, DeadlineScanner, GenerationSignature, ScanResult,
    Scoop, Scoops, NUM_SCOOPS, SCOOP_SIZE,
};
use proptest::prelude::*;
use quickcheck::QuickCheck;
use quickcheck_macros::quickcheck;

fn auto_scanner() -> DeadlineScanner<'static> {
    DeadlineScanner::with_shared_state(Backend::Auto).unwrap()
}

fn signature_from(bytes: &[u8]) -> GenerationSignature {
    let mut signature = [0u8; 32];
    for (dst, &src) in signature.iter_mut().zip(bytes) {
        *dst = src;
    }
    signature
}

/// Strategy for a single random scoop
fn scoop_strategy() -> impl Strategy<Value = Scoop> {
    prop::collection::vec(any::<u8>(), SCOOP_SIZE).prop_map(|bytes| {
        let mut scoop = [0u8; SCOOP_SIZE];
        scoop.copy_from_slice(&bytes);
        scoop
    })
}

/// Strategy for runs of 1 to 40 scoops
fn scoop_run_strategy() -> impl Strategy<Value = Vec<Scoop>> {
    prop::collection::vec(scoop_strategy(), 1..40)
}

fn scan(scoops: &[Scoop], signature: &GenerationSignature) -> ScanResult {
    let mut result = ScanResult::new();
    auto_scanner().scan_batch(&Scoops::from_scoops(scoops), signature, &mut result);
    result
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// best_deadline is the minimum and nothing before best_offset reaches it
    #[test]
    fn prop_minimum_is_first_minimum(
        signature in any::<[u8; 32]>(),
        scoops in scoop_run_strategy(),
    ) {
        let deadlines: Vec<u64> = scoops.iter().map(|s| deadline_of(&signature, s)).collect();
        let result = scan(&scoops, &signature);

        prop_assert_eq!(result.best_deadline, *deadlines.iter().min().unwrap());
        let offset = result.best_offset as usize;
        prop_assert_eq!(deadlines[offset], result.best_deadline);
        for &earlier in &deadlines[..offset] {
            prop_assert!(earlier > result.best_deadline);
        }
    }

    /// Reversing a batch moves the winner but not the winning deadline
    #[test]
    fn prop_lane_independence(
        signature in any::<[u8; 32]>(),
        scoops in prop::collection::vec(scoop_strategy(), 16),
    ) {
        let forward = scan(&scoops, &signature);
        let reversed: Vec<Scoop> = scoops.iter().rev().copied().collect();
        let backward = scan(&reversed, &signature);

        prop_assert_eq!(forward.best_deadline, backward.best_deadline);
        prop_assert_eq!(
            &scoops[forward.best_offset as usize],
            &reversed[backward.best_offset as usize]
        );
    }

    /// Every available backend agrees with the scalar path
    #[test]
    fn prop_backends_agree(
        signature in any::<[u8; 32]>(),
        scoops in scoop_run_strategy(),
    ) {
        let data = Scoops::from_scoops(&scoops);
        let mut expected = ScanResult::new();
        DeadlineScanner::with_shared_state(Backend::Scalar)
            .unwrap()
            .scan_batch(&data, &signature, &mut expected);

        for backend in Backend::ALL.into_iter().filter(|b| b.is_available()) {
            let mut result = ScanResult::new();
            DeadlineScanner::with_shared_state(backend)
                .unwrap()
                .scan_batch(&data, &signature, &mut result);
            prop_assert_eq!(result, expected);
        }
    }
}

/// A pre-populated result is never made worse by another range
#[test]
fn quickcheck_monotonic_accumulation() {
    fn prop(seed: Vec<u8>, split: u8, prior: u64) -> bool {
        let signature = signature_from(&seed);
        let data: Vec<u8> = (0..24 * SCOOP_SIZE)
            .map(|i| seed.get(i % seed.len().max(1)).copied().unwrap_or(0) ^ i as u8)
            .collect();
        let scoops = Scoops::new(&data).unwrap();
        let (first, second) = scoops.split_at(split as usize % 24);
        let scanner = auto_scanner();

        let mut alone_first = ScanResult::new();
        scanner.scan_batch_at(&first, &signature, 0, &mut alone_first);
        let mut alone_second = ScanResult::new();
        scanner.scan_batch_at(&second, &signature, first.len() as u64, &mut alone_second);

        let mut running = ScanResult {
            best_deadline: prior,
            best_offset: u64::MAX,
        };
        scanner.scan_batch_at(&first, &signature, 0, &mut running);
        scanner.scan_batch_at(&second, &signature, first.len() as u64, &mut running);

        running.best_deadline <= prior
            && running.best_deadline <= alone_first.best_deadline
            && running.best_deadline <= alone_second.best_deadline
    }

    QuickCheck::new()
        .tests(20)
        .quickcheck(prop as fn(Vec<u8>, u8, u64) -> bool);
}

#[quickcheck]
fn quickcheck_scan_is_deterministic(seed: Vec<u8>, nonces: u8) -> bool {
    let signature = signature_from(&seed);
    let nonces = nonces as usize % 33;
    let data: Vec<u8> = (0..nonces * SCOOP_SIZE)
        .map(|i| (i as u8).wrapping_mul(seed.len() as u8 | 1))
        .collect();
    let scoops = Scoops::new(&data).unwrap();
    let scanner = auto_scanner();

    let mut first = ScanResult::new();
    let mut second = ScanResult::new();
    scanner.scan_batch(&scoops, &signature, &mut first);
    scanner.scan_batch(&scoops, &signature, &mut second);
    first == second
}

#[quickcheck]
fn quickcheck_scoop_calculation_bounds(block_height: u64, gen_sig: Vec<u8>) -> bool {
    let scoop = calculate_scoop(block_height, &signature_from(&gen_sig));
    scoop < NUM_SCOOPS as u64
}
