//! Parallel processing configuration
//!
//! Block masking and spatial reductions run on rayon's global pool. This
//! module configures that pool and reports on the execution environment.

use crate::errors::{GridZoneError, Result};
use rayon::ThreadPoolBuilder;
use serde::Serialize;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Create a configuration that uses a specific number of threads
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    ///
    /// # Errors
    ///
    /// Returns an error for a zero thread count or if the global pool was
    /// already initialised.
    pub fn setup_global_pool(&self) -> Result<()> {
        match self.num_threads {
            Some(0) => {
                return Err(GridZoneError::ThreadPool(
                    "thread count must be at least 1".to_string(),
                ))
            }
            Some(num_threads) => {
                ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build_global()
                    .map_err(|e| {
                        GridZoneError::ThreadPool(format!(
                            "Failed to initialize thread pool with {num_threads} threads: {e}"
                        ))
                    })?;
                tracing::info!(threads = num_threads, "Configured parallel processing");
            }
            None => {
                tracing::info!(threads = rayon::current_num_threads(), "Using default thread pool");
            }
        }

        Ok(())
    }

    /// Get the current number of threads being used
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone, Serialize)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

/// Get information about the current parallel configuration
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

impl ParallelInfo {
    /// Log parallel processing information
    pub fn log(&self) {
        tracing::info!(
            current_threads = self.current_threads,
            available_cores = self.available_cores,
            available_parallelism = self.available_parallelism,
            "Parallel processing environment"
        );
    }
}
