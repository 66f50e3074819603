use jacobi_laplace::{solve, Backend, Boundary, SolverConfig};

fn run(backend: Backend, workers: usize) -> jacobi_laplace::Solution {
    let config = SolverConfig::new(24, workers)
        .with_boundary(Boundary {
            left: 5.0,
            top: 1.0,
            right: 50.0,
            bottom: 20.0,
        })
        .with_epsilon(1e-3)
        .with_backend(backend);
    solve(&config).unwrap()
}

#[test]
fn threaded_matches_single() {
    let single = run(Backend::Single, 1);
    for workers in [1, 2, 3, 4, 8] {
        let threaded = run(Backend::Threaded, workers);
        assert_eq!(threaded.iterations(), single.iterations());
        assert_eq!(
            threaded.snapshot(),
            single.snapshot(),
            "threaded with {workers} workers differs from single"
        );
    }
}

#[test]
fn rayon_matches_single() {
    let single = run(Backend::Single, 1);
    for workers in [1, 2, 4] {
        let rayon = run(Backend::Rayon, workers);
        assert_eq!(rayon.iterations(), single.iterations());
        assert_eq!(rayon.snapshot(), single.snapshot());
    }
}

#[test]
fn repeated_threaded_runs_are_identical() {
    let a = run(Backend::Threaded, 4);
    let b = run(Backend::Threaded, 4);
    assert_eq!(a.snapshot(), b.snapshot());
    assert_eq!(a.iterations(), b.iterations());
}

#[test]
fn every_backend_keeps_the_boundary() {
    for backend in [Backend::Single, Backend::Threaded, Backend::Rayon] {
        assert!(run(backend, 4).grid().boundary_intact(), "{backend:?}");
    }
}
