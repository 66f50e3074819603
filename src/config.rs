//! Solver configuration, defaults and validation.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::ConfigError;

/// Iteration cap used when none is given.
pub const DEFAULT_MAX_ITERS: usize = 20_000;
/// Convergence threshold used when none is given.
pub const DEFAULT_EPSILON: f64 = 0.1;
/// Worker counts above this still run, but are logged as unusual.
pub const RECOMMENDED_MAX_WORKERS: usize = 16;

/// Fixed Dirichlet values for the four edges of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Boundary {
    /// Same value on every edge.
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    fn edges(&self) -> [(&'static str, f64); 4] {
        [
            ("left", self.left),
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
        ]
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            left: 1.0,
            top: 1.0,
            right: 80.0,
            bottom: 80.0,
        }
    }
}

/// How a worker decides that it may stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergencePolicy {
    /// Each worker stops once its own max change drops below epsilon.
    /// Workers may stop on different iterations.
    Local,
    /// All workers stop together once the max change over every worker
    /// drops below epsilon.
    #[default]
    Global,
}

/// Which relaxation engine runs the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// One OS thread per worker, synchronized by a barrier.
    #[default]
    Threaded,
    /// Row-parallel sweeps on a rayon pool of `workers` threads.
    Rayon,
    /// Sequential reference implementation.
    Single,
}

/// Everything needed to run one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Interior grid size `N`; the grid is `(N+2)x(N+2)` with boundaries.
    pub size: usize,
    /// Number of parallel workers.
    pub workers: usize,
    #[serde(default)]
    pub boundary: Boundary,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    #[serde(default)]
    pub convergence: ConvergencePolicy,
    #[serde(default)]
    pub backend: Backend,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_max_iters() -> usize {
    DEFAULT_MAX_ITERS
}

impl SolverConfig {
    /// Config with default boundary, epsilon and iteration cap.
    pub fn new(size: usize, workers: usize) -> Self {
        Self {
            size,
            workers,
            boundary: Boundary::default(),
            epsilon: DEFAULT_EPSILON,
            max_iters: DEFAULT_MAX_ITERS,
            convergence: ConvergencePolicy::default(),
            backend: Backend::default(),
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_convergence(mut self, convergence: ConvergencePolicy) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Load and validate a config from a JSON file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the structural invariants. Runs before any worker starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.workers > self.size {
            return Err(ConfigError::TooManyWorkers {
                workers: self.workers,
                size: self.size,
            });
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(ConfigError::InvalidEpsilon {
                value: self.epsilon,
            });
        }
        if self.max_iters == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        for (edge, value) in self.boundary.edges() {
            if !value.is_finite() {
                return Err(ConfigError::InvalidBoundary { edge, value });
            }
        }
        if self.workers > RECOMMENDED_MAX_WORKERS {
            tracing::warn!(
                "{} workers requested; more than {} rarely helps",
                self.workers,
                RECOMMENDED_MAX_WORKERS
            );
        }
        Ok(())
    }
}
