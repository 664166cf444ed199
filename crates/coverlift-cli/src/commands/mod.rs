//! CLI command implementations

pub mod info;
pub mod process;

use anyhow::{Context, Result};
use coverlift_ops::Filter;
use coverlift_worker::{Algorithm, WorkerConfig};
use std::path::Path;

use crate::{AlgorithmArg, FilterArg};

/// Loads the worker config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<WorkerConfig> {
    match path {
        Some(p) => WorkerConfig::from_json_file(p)
            .with_context(|| format!("Failed to load config: {}", p.display())),
        None => Ok(WorkerConfig::default()),
    }
}

/// Reads an input file into memory.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))
}

impl From<AlgorithmArg> for Algorithm {
    fn from(a: AlgorithmArg) -> Self {
        match a {
            AlgorithmArg::Bicubic => Algorithm::Bicubic,
            AlgorithmArg::Lanczos => Algorithm::Lanczos,
            AlgorithmArg::Unsharp => Algorithm::Unsharp,
        }
    }
}

impl From<FilterArg> for Filter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::Nearest => Filter::Nearest,
            FilterArg::Bilinear => Filter::Bilinear,
            FilterArg::Bicubic => Filter::Bicubic,
            FilterArg::Lanczos3 => Filter::Lanczos3,
        }
    }
}
