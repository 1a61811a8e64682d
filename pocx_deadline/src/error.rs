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

/// Error types for the pocx_deadline crate
use std::fmt;

/// Errors raised at the kernel boundary.
///
/// The scanning hot path itself never fails; these cover buffer validation,
/// signature parsing, configuration and the startup capability probe.
#[derive(Debug, Clone, PartialEq)]
pub enum PoCXDeadlineError {
    /// Scoop buffer does not hold a whole number of scoops, or is too short
    BufferSizeError(String),
    /// Invalid input parameters
    InvalidInput(String),
    /// Hexadecimal decoding error
    HexDecodeError(String),
    /// Requested SIMD backend is not available on this CPU
    UnsupportedBackend(String),
    /// Worker pool could not be created
    ThreadPoolError(String),
    /// Scan configuration could not be parsed
    ConfigError(String),
}

impl fmt::Display for PoCXDeadlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoCXDeadlineError::BufferSizeError(msg) => write!(f, "Buffer size error: {}", msg),
            PoCXDeadlineError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PoCXDeadlineError::HexDecodeError(msg) => write!(f, "Hex decode error: {}", msg),
            PoCXDeadlineError::UnsupportedBackend(msg) => {
                write!(f, "Unsupported backend: {}", msg)
            }
            PoCXDeadlineError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            PoCXDeadlineError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for PoCXDeadlineError {}

impl From<hex::FromHexError> for PoCXDeadlineError {
    fn from(err: hex::FromHexError) -> Self {
        PoCXDeadlineError::HexDecodeError(err.to_string())
    }
}

impl From<serde_yaml::Error> for PoCXDeadlineError {
    fn from(err: serde_yaml::Error) -> Self {
        PoCXDeadlineError::ConfigError(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for PoCXDeadlineError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        PoCXDeadlineError::ThreadPoolError(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PoCXDeadlineError>;
