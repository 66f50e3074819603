use std::fmt;

use crate::config::Boundary;

/// Five-point stencil average. Every backend goes through this so that the
/// floating-point evaluation order is the same everywhere.
#[inline(always)]
pub fn average(up: f64, down: f64, left: f64, right: f64) -> f64 {
    (up + down + left + right) * 0.25
}

/// Double-buffered `(N+2)x(N+2)` grid, stored row-major.
///
/// Rows and columns `0` and `N+1` hold the Dirichlet boundary and are the
/// same in both buffers. Only interior cells are ever rewritten.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    n: usize,
    width: usize,
    boundary: Boundary,
    pub(crate) current: Vec<f64>,
    pub(crate) scratch: Vec<f64>,
}

impl Grid {
    pub fn new(n: usize, boundary: Boundary) -> Self {
        let width = n + 2;
        let mut current = vec![0.0; width * width];

        // Columns first, then rows, so the corners carry TOP and BOTTOM.
        for i in 0..width {
            current[i * width] = boundary.left;
            current[i * width + width - 1] = boundary.right;
        }
        for j in 0..width {
            current[j] = boundary.top;
            current[(width - 1) * width + j] = boundary.bottom;
        }

        let scratch = current.clone();
        Grid {
            n,
            width,
            boundary,
            current,
            scratch,
        }
    }

    /// Interior size `N`.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Row length including both boundary columns (`N+2`).
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.current[i * self.width + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.current[i * self.width..(i + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.current.chunks(self.width)
    }

    /// The current buffer, row-major, boundary cells included.
    pub fn snapshot(&self) -> &[f64] {
        &self.current
    }

    pub fn scratch(&self) -> &[f64] {
        &self.scratch
    }

    /// Iterator over the interior cells of the current buffer.
    pub fn interior(&self) -> impl Iterator<Item = f64> + '_ {
        (1..=self.n).flat_map(move |i| self.row(i)[1..=self.n].iter().copied())
    }

    /// True when every border cell of both buffers still holds its
    /// initial boundary value.
    pub fn boundary_intact(&self) -> bool {
        let pristine = Grid::new(self.n, self.boundary);
        let w = self.width;
        let on_border = |idx: usize| {
            let (i, j) = (idx / w, idx % w);
            i == 0 || j == 0 || i == w - 1 || j == w - 1
        };
        (0..w * w).filter(|&idx| on_border(idx)).all(|idx| {
            self.current[idx] == pristine.current[idx] && self.scratch[idx] == pristine.current[idx]
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for v in row {
                write!(f, "{:7.4} ", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
