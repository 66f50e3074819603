//! Relaxation engines. `threaded` is the barrier-synchronized worker pool;
//! `single` and `rayon` run the same iteration and are used as references.

pub mod rayon;
pub mod single;
pub mod threaded;
