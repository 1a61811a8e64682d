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

//! Scan configuration
//!
//! Loaded from YAML the same way the miner loads its config, or built in
//! code with [`ScanCfgBuilder`].

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::Backend;
use crate::common::AVX512_VECTOR_SIZE;
use crate::error::{PoCXDeadlineError, Result};

/// Chunks must hold whole batches for the widest engine
pub const CHUNK_ALIGNMENT: usize = AVX512_VECTOR_SIZE;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCfg {
    #[serde(default)]
    pub backend: Backend,

    /// 0 lets rayon pick one thread per core
    #[serde(default)]
    pub cpu_threads: usize,

    #[serde(default = "default_chunk_nonces")]
    pub chunk_nonces: usize,
}

impl Default for ScanCfg {
    fn default() -> Self {
        ScanCfgBuilder::new().build()
    }
}

fn default_chunk_nonces() -> usize {
    4096
}

/// Parses and validates a YAML scan configuration
pub fn parse_cfg(yaml: &str) -> Result<ScanCfg> {
    let cfg: ScanCfg = serde_yaml::from_str(yaml)?;
    validate_cfg(cfg)
}

pub fn load_cfg<P: AsRef<Path>>(path: P) -> Result<ScanCfg> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path).map_err(|e| {
        PoCXDeadlineError::ConfigError(format!(
            "failed to open config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_cfg(&yaml)
}

pub fn validate_cfg(cfg: ScanCfg) -> Result<ScanCfg> {
    if cfg.chunk_nonces == 0 || cfg.chunk_nonces % CHUNK_ALIGNMENT != 0 {
        return Err(PoCXDeadlineError::ConfigError(format!(
            "chunk_nonces must be a non-zero multiple of {}, got {}",
            CHUNK_ALIGNMENT, cfg.chunk_nonces
        )));
    }

    if let Ok(cores) = std::thread::available_parallelism() {
        if cfg.cpu_threads > cores.get() {
            warn!(
                "cpu_threads={} exceeds the {} available cores",
                cfg.cpu_threads, cores
            );
        }
    }

    Ok(cfg)
}

/// Builder for a scan configuration without a YAML file
#[derive(Debug, Clone)]
pub struct ScanCfgBuilder {
    backend: Backend,
    cpu_threads: usize,
    chunk_nonces: usize,
}

impl Default for ScanCfgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCfgBuilder {
    pub fn new() -> Self {
        Self {
            backend: Backend::Auto,
            cpu_threads: 0,
            chunk_nonces: default_chunk_nonces(),
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn cpu_threads(mut self, threads: usize) -> Self {
        self.cpu_threads = threads;
        self
    }

    pub fn chunk_nonces(mut self, nonces: usize) -> Self {
        self.chunk_nonces = nonces;
        self
    }

    /// Builds without validation, see [`validate_cfg`]
    pub fn build(self) -> ScanCfg {
        ScanCfg {
            backend: self.backend,
            cpu_threads: self.cpu_threads,
            chunk_nonces: self.chunk_nonces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = parse_cfg("{}").unwrap();
        assert_eq!(cfg, ScanCfg::default());
        assert_eq!(cfg.backend, Backend::Auto);
        assert_eq!(cfg.cpu_threads, 0);
        assert_eq!(cfg.chunk_nonces, 4096);
    }

    #[test]
    fn test_cfg_deserialization() {
        let yaml_content = r#"
backend: AVX2
cpu_threads: 4
chunk_nonces: 8192
"#;
        let cfg = parse_cfg(yaml_content).unwrap();
        assert_eq!(cfg.backend, Backend::Avx2);
        assert_eq!(cfg.cpu_threads, 4);
        assert_eq!(cfg.chunk_nonces, 8192);
    }

    #[test]
    fn test_invalid_chunk_size() {
        for bad in ["chunk_nonces: 0", "chunk_nonces: 100"] {
            assert!(matches!(
                parse_cfg(bad),
                Err(PoCXDeadlineError::ConfigError(_))
            ));
        }
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            parse_cfg("backend: [1, 2"),
            Err(PoCXDeadlineError::ConfigError(_))
        ));
        assert!(parse_cfg("backend: sse3").is_err());
    }

    #[test]
    fn test_builder() {
        let cfg = ScanCfgBuilder::new()
            .backend(Backend::Scalar)
            .cpu_threads(2)
            .chunk_nonces(32)
            .build();
        assert_eq!(validate_cfg(cfg.clone()).unwrap(), cfg);

        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert_eq!(parse_cfg(&yaml).unwrap(), cfg);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_cfg("/nonexistent/scan.yaml"),
            Err(PoCXDeadlineError::ConfigError(_))
        ));
    }
}
