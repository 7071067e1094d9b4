//! Configuration management for the network consolidator

/// Parameters of a consolidation run
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum distance for two nodes to fall into the same cluster,
    /// in the network's planar units
    pub eps: f64,

    /// Number of worker threads (0 = use all available cores)
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eps: 1.0,
            threads: 0,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(eps: f64, threads: usize) -> Self {
        Self { eps, threads }
    }

    /// Resolve the worker thread count, expanding 0 to the number of cores
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get()
        }
    }
}
