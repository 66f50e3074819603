use approx::assert_abs_diff_eq;
use jacobi_laplace::{solve, Boundary, ConvergencePolicy, SolverConfig};

/// Hot bottom edge, cold elsewhere.
fn hot_floor() -> Boundary {
    Boundary {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 100.0,
    }
}

#[test]
fn zero_boundary_converges_in_one_iteration() {
    let config = SolverConfig::new(4, 1)
        .with_boundary(Boundary::uniform(0.0))
        .with_epsilon(1e-6);
    let solution = solve(&config).unwrap();

    assert_eq!(solution.iterations(), 1);
    assert!(solution.converged());
    assert!(solution.grid().interior().all(|v| v == 0.0));
}

#[test]
fn uniform_boundary_gives_uniform_interior() {
    let config = SolverConfig::new(3, 1)
        .with_boundary(Boundary::uniform(10.0))
        .with_epsilon(1e-6);
    let first = solve(&config).unwrap();
    let again = solve(&config).unwrap();

    assert!(first.converged());
    assert!(first.iterations() < 40, "took {} iterations", first.iterations());
    assert_eq!(first.iterations(), again.iterations());
    // the remaining error is a small multiple of the last change
    for v in first.grid().interior() {
        assert_abs_diff_eq!(v, 10.0, epsilon = 1e-5);
    }
}

#[test]
fn boundary_untouched_after_every_iteration() {
    // a run capped at k iterations is the state after iteration k
    for workers in [1, 2, 3] {
        for k in 1..=25 {
            let config = SolverConfig::new(9, workers)
                .with_epsilon(0.0)
                .with_max_iters(k);
            let solution = solve(&config).unwrap();
            assert_eq!(solution.iterations(), k);
            assert!(
                solution.grid().boundary_intact(),
                "boundary changed at iteration {k} with {workers} workers"
            );
        }
    }
}

#[test]
fn result_does_not_depend_on_worker_count() {
    let base = SolverConfig::new(12, 1).with_epsilon(1e-4);
    let reference = solve(&base).unwrap();

    for workers in [2, 4] {
        let mut config = base.clone();
        config.workers = workers;
        let solution = solve(&config).unwrap();
        assert_eq!(solution.iterations(), reference.iterations());
        assert_eq!(solution.snapshot(), reference.snapshot(), "{workers} workers");
    }
}

#[test]
fn uneven_partition_matches_single_worker() {
    let base = SolverConfig::new(10, 1).with_boundary(hot_floor()).with_epsilon(1e-3);
    let reference = solve(&base).unwrap();
    let mut config = base.clone();
    config.workers = 3;
    let solution = solve(&config).unwrap();
    assert_eq!(solution.snapshot(), reference.snapshot());
}

#[test]
fn iteration_cap_with_unreachable_epsilon() {
    for workers in [1, 2, 4] {
        let config = SolverConfig::new(8, workers)
            .with_epsilon(0.0)
            .with_max_iters(1);
        let solution = solve(&config).unwrap();
        assert_eq!(solution.iterations(), 1);
        assert!(!solution.converged());
        assert!(solution.workers().iter().all(|w| w.iterations == 1));
    }
}

#[test]
fn local_convergence_terminates_with_staggered_stops() {
    let config = SolverConfig::new(16, 4)
        .with_boundary(hot_floor())
        .with_epsilon(1e-3)
        .with_convergence(ConvergencePolicy::Local);
    let solution = solve(&config).unwrap();

    let iterations: Vec<usize> = solution.workers().iter().map(|w| w.iterations).collect();
    assert!(solution.converged());
    // the band next to the hot edge is the last to settle
    assert_eq!(solution.iterations(), iterations[3]);
    assert!(iterations[0] < iterations[3], "{iterations:?}");
    assert!(solution.grid().boundary_intact());
}

#[test]
fn interior_stays_between_boundary_extremes() {
    let solution = solve(&SolverConfig::new(20, 4).with_epsilon(1e-2)).unwrap();
    // starting from zero, the iterates rise monotonically toward the
    // harmonic solution and never overshoot the largest edge value
    assert!(solution.grid().interior().all(|v| (0.0..=80.0).contains(&v)));
}
