//! Text output: usage, the results file, and the stdout summary.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::SolverConfig;
use crate::coordinator::Solution;

pub const DEFAULT_RESULTS_FILE: &str = "JacobiResults.txt";

pub const USAGE: &str = "\
jacobi usage

jacobi N numWorkers [L] [T] [R] [B] [E]
jacobi --config <file.json>

  N is the size of the grid that will be NxN (required)
  numWorkers is the number of worker threads (required, 1..=N, usually at most 16)
  L is the fixed value for the left edge of the grid [optional, default = 1.0]
  T is the fixed value for the top edge of the grid [optional, default = 1.0]
  R is the fixed value for the right edge of the grid [optional, default = 80.0]
  B is the fixed value for the bottom edge of the grid [optional, default = 80.0]
  E is the epsilon value used to decide when to stop [optional, default = 0.1]

The edge values and epsilon must be given all together or not at all.
Settings and the final grid are written to JacobiResults.txt.
Worker count, iterations and execution time go to standard output.
Set RUST_LOG (e.g. RUST_LOG=debug) for progress logging.
";

/// Split a duration the way the results file reports it.
pub fn seconds_and_micros(elapsed: Duration) -> (u64, u32) {
    (elapsed.as_secs(), elapsed.subsec_micros())
}

/// Settings header, execution time, then the grid as tab-indented rows.
pub fn write_results<W: Write>(out: &mut W, config: &SolverConfig, solution: &Solution) -> io::Result<()> {
    let n = config.size;
    let b = config.boundary;
    let (secs, micros) = seconds_and_micros(solution.elapsed());

    writeln!(out, "Grid\t = {n}x{n}")?;
    writeln!(out, "numProcs = {}", config.workers)?;
    writeln!(out, "left\t = {:.6}", b.left)?;
    writeln!(out, "top\t = {:.6}", b.top)?;
    writeln!(out, "right\t = {:.6}", b.right)?;
    writeln!(out, "bottom\t = {:.6}", b.bottom)?;
    writeln!(out, "epsilon\t = {:.6}", config.epsilon)?;
    writeln!(out, "iterations = {}", solution.iterations())?;
    writeln!(out, "execution time = {secs} seconds, {micros} microseconds")?;
    writeln!(out)?;

    for row in solution.grid().rows() {
        write!(out, "\t")?;
        for v in row {
            write!(out, "{v:07.4} ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// The short summary printed to stdout.
pub fn summary(config: &SolverConfig, solution: &Solution) -> String {
    let (secs, micros) = seconds_and_micros(solution.elapsed());
    let mut s = format!("main: numProcs = {}, N = {}\n", config.workers, config.size);
    s += &format!(
        "iterations = {}{}\n",
        solution.iterations(),
        if solution.converged() { "" } else { " (iteration cap reached)" }
    );
    s += &format!("execution time = {secs} seconds, {micros} microseconds\n");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Boundary;
    use crate::coordinator::solve;

    fn solved() -> (SolverConfig, Solution) {
        let config = SolverConfig::new(2, 1).with_boundary(Boundary::uniform(10.0));
        let solution = solve(&config).unwrap();
        (config, solution)
    }

    #[test]
    fn results_header_and_grid_rows() {
        let (config, solution) = solved();
        let mut buf = Vec::new();
        write_results(&mut buf, &config, &solution).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Grid\t = 2x2");
        assert_eq!(lines[1], "numProcs = 1");
        assert_eq!(lines[2], "left\t = 10.000000");
        assert!(lines[8].starts_with("execution time = "));
        assert_eq!(lines[9], "");
        // four grid rows, each N+2 cells wide
        assert_eq!(lines.len(), 14);
        assert_eq!(lines[10], "\t10.0000 10.0000 10.0000 10.0000 ");
        assert!(lines[11..].iter().all(|l| l.split_whitespace().count() == 4));
    }

    #[test]
    fn splits_elapsed_time() {
        let d = Duration::from_micros(3_000_250);
        assert_eq!(seconds_and_micros(d), (3, 250));
    }

    #[test]
    fn summary_mentions_workers_and_size() {
        let (config, solution) = solved();
        let s = summary(&config, &solution);
        assert!(s.starts_with("main: numProcs = 1, N = 2\n"));
        assert!(s.contains("execution time = "));
    }
}
