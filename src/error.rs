//! Error types for the solver.
//!
//! Only configuration problems are reported as errors before a run starts.
//! Hitting the iteration cap is not an error: the run returns normally with
//! `converged == false`.

use std::error::Error;
use std::fmt;

/// Problems found while loading or validating a [`SolverConfig`](crate::SolverConfig).
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Grid size `N` is zero.
    ZeroSize,
    /// No workers requested.
    NoWorkers,
    /// More workers than interior rows; some worker would own no rows.
    TooManyWorkers {
        /// Requested worker count.
        workers: usize,
        /// Grid size `N`.
        size: usize,
    },
    /// Epsilon is NaN or negative.
    InvalidEpsilon {
        /// The rejected value.
        value: f64,
    },
    /// `max_iters` is zero.
    ZeroIterations,
    /// A boundary value is NaN or infinite.
    InvalidBoundary {
        /// Which edge ("left", "top", "right", "bottom").
        edge: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The config file could not be read.
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },
    /// The config file is not valid JSON for a `SolverConfig`.
    Parse {
        /// serde_json error message.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "grid size N must be at least 1"),
            Self::NoWorkers => write!(f, "at least one worker is required"),
            Self::TooManyWorkers { workers, size } => {
                write!(f, "{workers} workers requested for a grid of {size} rows")
            }
            Self::InvalidEpsilon { value } => {
                write!(f, "epsilon must be a non-negative number, got {value}")
            }
            Self::ZeroIterations => write!(f, "max_iters must be at least 1"),
            Self::InvalidBoundary { edge, value } => {
                write!(f, "{edge} boundary value must be finite, got {value}")
            }
            Self::Io { path, reason } => write!(f, "failed to read config {path}: {reason}"),
            Self::Parse { reason } => write!(f, "failed to parse config JSON: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Errors returned by [`solve`](crate::solve).
#[derive(Debug)]
pub enum SolveError {
    /// The configuration was rejected before any worker started.
    Config(ConfigError),
    /// The rayon backend could not build its thread pool.
    ThreadPool(rayon::ThreadPoolBuildError),
    /// A worker thread panicked.
    WorkerPanicked {
        /// Index of the worker.
        worker: usize,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::ThreadPool(e) => write!(f, "failed to build thread pool: {e}"),
            Self::WorkerPanicked { worker } => write!(f, "worker {worker} panicked"),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::ThreadPool(e) => Some(e),
            Self::WorkerPanicked { .. } => None,
        }
    }
}

impl From<ConfigError> for SolveError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for SolveError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}
