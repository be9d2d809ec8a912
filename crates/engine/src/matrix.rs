//! Dense square matrix indexed by participant position.

use std::ops::{Index, IndexMut};

/// Row-major `N×N` matrix of `f64`.
///
/// Rows and columns are indexed by the position of a participant in the
/// activity roster. Growing the matrix keeps every existing entry at the same
/// `(row, col)` and fills the new row and column with zeros.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SquareMatrix {
    dim: usize,
    cells: Vec<f64>,
}

impl SquareMatrix {
    /// Creates a `dim×dim` matrix of zeros.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            cells: vec![0.0; dim * dim],
        }
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the entry at `(row, col)`, `None` when out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.dim && col < self.dim).then(|| self.cells[row * self.dim + col])
    }

    /// Borrows one row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= dim`.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.dim;
        &self.cells[start..start + self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics
        self.cells.chunks_exact(self.dim.max(1))
    }

    /// Sum of row `row`.
    #[must_use]
    pub fn row_sum(&self, row: usize) -> f64 {
        self.row(row).iter().sum()
    }

    /// Sum of column `col`.
    #[must_use]
    pub fn col_sum(&self, col: usize) -> f64 {
        (0..self.dim).map(|row| self[(row, col)]).sum()
    }

    /// Sum of every entry.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Appends one zero row and one zero column.
    pub fn grow(&mut self) {
        let old = self.dim;
        let new = old + 1;
        let mut cells = vec![0.0; new * new];
        for row in 0..old {
            let src = &self.cells[row * old..(row + 1) * old];
            cells[row * new..row * new + old].copy_from_slice(src);
        }
        self.dim = new;
        self.cells = cells;
    }

    /// Resets every entry to zero, keeping the dimension.
    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    /// Converts to nested rows, mostly useful for printing and assertions.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.dim && col < self.dim, "matrix index out of bounds");
        &self.cells[row * self.dim + col]
    }
}

impl IndexMut<(usize, usize)> for SquareMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.dim && col < self.dim, "matrix index out of bounds");
        &mut self.cells[row * self.dim + col]
    }
}
