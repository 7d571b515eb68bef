//! Grid data structures shared by every pipeline stage
//!
//! A [`Grid`] stores a 2D raster as a flat `Vec<T>` in row-major order. Cell
//! `(row, col)` in one grid refers to the same location in every other grid of
//! the same shape. Elementwise operations run in parallel with rayon.

use rayon::prelude::*;

use crate::error::{CrownFireError, Result};

/// Field data container for a raster of per-cell values
///
/// Stores 2D field data as a flat `Vec<T>` in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    /// Field values in row-major order (row * width + col)
    data: Vec<T>,
    /// Grid width in cells (columns)
    width: usize,
    /// Grid height in cells (rows)
    height: usize,
}

impl<T: Copy + Default> Grid<T> {
    /// Create a new grid with given dimensions, initialized to `T::default()`
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T: Copy> Grid<T> {
    /// Create a new grid with given dimensions, initialized to a value
    #[must_use]
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Wrap an existing row-major buffer
    ///
    /// # Errors
    ///
    /// Returns [`CrownFireError::InvalidGrid`] if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(CrownFireError::InvalidGrid(format!(
                "{} values cannot fill a {}x{} grid",
                data.len(),
                height,
                width
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Build a grid from nested rows (`rows[row][col]`)
    ///
    /// # Errors
    ///
    /// Returns [`CrownFireError::InvalidGrid`] if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(CrownFireError::InvalidGrid(format!(
                    "row {index} has {} cells, expected {width}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Grid width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Shape as `(rows, cols)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the grid has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get reference to field data
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        self.data[row * self.width + col]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        self.data[row * self.width + col] = value;
    }

    /// Copy out the grid as nested rows
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.data.chunks(self.width).map(<[T]>::to_vec).collect()
    }

    /// Check that `other` has this grid's shape
    ///
    /// # Errors
    ///
    /// Returns [`CrownFireError::ShapeMismatch`] tagged with `stage`.
    pub fn ensure_same_shape<U: Copy>(&self, stage: &'static str, other: &Grid<U>) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(CrownFireError::ShapeMismatch {
                stage,
                expected: self.shape(),
                found: other.shape(),
            })
        }
    }
}

impl<T: Copy + Send + Sync> Grid<T> {
    /// Apply `f` to every cell, producing a new grid of the same shape
    #[must_use]
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        U: Copy + Send,
        F: Fn(T) -> U + Sync + Send,
    {
        Grid {
            data: self.data.par_iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Combine two grids cell by cell
    ///
    /// # Errors
    ///
    /// Returns [`CrownFireError::ShapeMismatch`] tagged with `stage` if the
    /// grids differ in shape. Nothing is broadcast or truncated.
    pub fn zip_map<U, V, F>(&self, stage: &'static str, other: &Grid<U>, f: F) -> Result<Grid<V>>
    where
        U: Copy + Send + Sync,
        V: Copy + Send,
        F: Fn(T, U) -> V + Sync + Send,
    {
        self.ensure_same_shape(stage, other)?;
        Ok(Grid {
            data: self
                .data
                .par_iter()
                .zip(other.data.par_iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            width: self.width,
            height: self.height,
        })
    }

    /// Count cells satisfying `predicate`
    #[must_use]
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(T) -> bool + Sync + Send,
    {
        self.data.par_iter().filter(|&&v| predicate(v)).count()
    }

    /// Flat index of the first cell matching `predicate`, in row-major order
    #[must_use]
    pub fn position<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(T) -> bool + Sync + Send,
    {
        self.data.par_iter().position_first(|&v| predicate(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid: Grid<f64> = Grid::new(10, 20);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 20);
        assert_eq!(grid.shape(), (20, 10));
        assert_eq!(grid.len(), 200);
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_grid_filled() {
        let grid = Grid::filled(5, 5, 42.0);
        assert!(grid.as_slice().iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_grid_get_set() {
        let mut grid = Grid::filled(10, 10, 0.0);
        grid.set(4, 3, 123.45);
        assert_eq!(grid.get(4, 3), 123.45);

        // Verify row-major indexing
        assert_eq!(grid.as_slice()[4 * 10 + 3], 123.45);
    }

    #[test]
    fn test_from_rows_round_trips() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let grid = Grid::from_rows(rows.clone()).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.get(1, 0), 4.0);
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Grid::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, CrownFireError::InvalidGrid(_)));
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = Grid::from_vec(3, 3, vec![0.0; 8]).unwrap_err();
        assert!(matches!(err, CrownFireError::InvalidGrid(_)));
    }

    #[test]
    fn test_zip_map_rejects_mismatched_shapes() {
        let a = Grid::filled(2, 3, 1.0);
        let b = Grid::filled(3, 2, 1.0);
        let err = a.zip_map("test", &b, |x: f64, y: f64| x + y).unwrap_err();
        match err {
            CrownFireError::ShapeMismatch {
                stage,
                expected,
                found,
            } => {
                assert_eq!(stage, "test");
                assert_eq!(expected, (3, 2));
                assert_eq!(found, (2, 3));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_map_and_count() {
        let grid = Grid::from_vec(2, 2, vec![1.0, -1.0, 2.0, -2.0]).unwrap();
        let positive = grid.map(|v: f64| v > 0.0);
        assert_eq!(positive.to_rows(), vec![vec![true, false], vec![true, false]]);
        assert_eq!(grid.count(|v| v < 0.0), 2);
        assert_eq!(grid.position(|v| v < 0.0), Some(1));
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_grid_bounds_check() {
        let grid = Grid::filled(10, 10, 0.0);
        let _ = grid.get(10, 5);
    }
}
