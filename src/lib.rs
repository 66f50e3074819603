//! Laplace's equation on a square grid by Jacobi relaxation, with the
//! interior rows split across a fixed pool of barrier-synchronized workers.
//!
//! ```no_run
//! use jacobi_laplace::{solve, SolverConfig};
//!
//! let solution = solve(&SolverConfig::new(64, 4))?;
//! println!("{} iterations", solution.iterations());
//! # Ok::<(), jacobi_laplace::SolveError>(())
//! ```

pub mod barrier;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod grid;
pub mod implementations;
pub mod partition;
pub mod report;

pub use config::{Backend, Boundary, ConvergencePolicy, SolverConfig};
pub use coordinator::{solve, Solution};
pub use error::{ConfigError, SolveError};
pub use grid::Grid;
pub use implementations::threaded::WorkerReport;
pub use partition::{partition, RowRange};
