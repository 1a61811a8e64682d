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

//! Backend selection and the startup capability probe

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::common::{
    AVX2_VECTOR_SIZE, AVX512_VECTOR_SIZE, NEON_VECTOR_SIZE, PORTABLE_VECTOR_SIZE,
    SSE2_VECTOR_SIZE,
};
use crate::error::{PoCXDeadlineError, Result};

/// Which digest engine a scanner runs on.
///
/// `Auto` defers to [`Backend::detect`]. Every other variant is a forced
/// choice that fails at construction if the CPU cannot run it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    #[default]
    Auto,
    /// One lane at a time
    Scalar,
    /// Eight lanes of plain integer arrays
    Portable,
    Sse2,
    Avx2,
    Avx512f,
    Neon,
}

impl Backend {
    pub const ALL: [Backend; 7] = [
        Backend::Auto,
        Backend::Scalar,
        Backend::Portable,
        Backend::Sse2,
        Backend::Avx2,
        Backend::Avx512f,
        Backend::Neon,
    ];

    /// Widest backend the running CPU supports
    pub fn detect() -> Backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("avx512f") {
                return Backend::Avx512f;
            } else if is_x86_feature_detected!("avx2") {
                return Backend::Avx2;
            } else if is_x86_feature_detected!("sse2") {
                return Backend::Sse2;
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Backend::Neon;
            }
        }

        Backend::Portable
    }

    /// Whether this backend can run on the current CPU
    pub fn is_available(self) -> bool {
        match self {
            Backend::Auto | Backend::Scalar | Backend::Portable => true,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Sse2 => crate::engine_sse2::Sse2Engine::detect().is_some(),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Avx2 => crate::engine_avx2::Avx2Engine::detect().is_some(),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Avx512f => crate::engine_avx512::Avx512Engine::detect().is_some(),
            #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
            Backend::Sse2 | Backend::Avx2 | Backend::Avx512f => false,
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => crate::engine_neon::NeonEngine::detect().is_some(),
            #[cfg(not(target_arch = "aarch64"))]
            Backend::Neon => false,
        }
    }

    /// Turns `Auto` into a concrete backend and rejects forced backends
    /// the CPU lacks.
    pub fn resolve(self) -> Result<Backend> {
        match self {
            Backend::Auto => Ok(Backend::detect()),
            backend if backend.is_available() => Ok(backend),
            backend => Err(PoCXDeadlineError::UnsupportedBackend(format!(
                "{} is not supported by this CPU",
                backend
            ))),
        }
    }

    /// Nonces hashed per engine call. `Auto` reports the detected backend.
    pub fn lanes(self) -> usize {
        match self {
            Backend::Auto => Backend::detect().lanes(),
            Backend::Scalar => 1,
            Backend::Portable => PORTABLE_VECTOR_SIZE,
            Backend::Sse2 => SSE2_VECTOR_SIZE,
            Backend::Avx2 => AVX2_VECTOR_SIZE,
            Backend::Avx512f => AVX512_VECTOR_SIZE,
            Backend::Neon => NEON_VECTOR_SIZE,
        }
    }

    /// Lowercase name, as accepted by `FromStr` and the config
    pub fn name(self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Scalar => "scalar",
            Backend::Portable => "portable",
            Backend::Sse2 => "sse2",
            Backend::Avx2 => "avx2",
            Backend::Avx512f => "avx512f",
            Backend::Neon => "neon",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = PoCXDeadlineError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Backend::ALL
            .into_iter()
            .find(|backend| backend.name().eq_ignore_ascii_case(wanted))
            .or_else(|| {
                // "avx512" is what the miner prints for the same instruction set
                wanted
                    .eq_ignore_ascii_case("avx512")
                    .then_some(Backend::Avx512f)
            })
            .ok_or_else(|| PoCXDeadlineError::InvalidInput(format!("unknown backend '{}'", s)))
    }
}

impl Serialize for Backend {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Backend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
