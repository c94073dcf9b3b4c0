//! Dense row-major matrix with row-wise and column-wise traversal views.
//!
//! Designs, orthogonal arrays and Galois field tables are all stored in a [`Matrix`].
//! Element access through [`Matrix::get`] and [`Matrix::set`] is bounds-checked and
//! reports [`LhsError::OutOfRange`]. Traversals are exposed as [`Lane`] values, a
//! `start + stride + len` window over the backing storage, so that a row and a column
//! are walked the same way.
use crate::errors::{LhsError, Result};
use ndarray::Array2;
use num_traits::Zero;
use std::fmt;
use std::ops::{Index, IndexMut};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Traversal order of a [`Lane`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Walk the elements of one row
    RowWise,
    /// Walk the elements of one column
    ColumnWise,
}

/// A `rows x cols` matrix stored contiguously in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone + Zero> Matrix<T> {
    /// Zero-initialized matrix
    ///
    /// ```
    /// use oalhs::Matrix;
    ///
    /// let m = Matrix::<f64>::zeros(2, 3);
    /// assert_eq!(m.len(), 6);
    /// ```
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }
}

impl<T> Matrix<T> {
    /// Build a matrix from row-major elements.
    ///
    /// Fails with [`LhsError::DimensionMismatch`] when `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LhsError::DimensionMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Build a matrix from a list of rows of equal length
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(LhsError::DimensionMismatch {
                    expected: ncols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Matrix {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the matrix holds no element
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major backing storage
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major backing storage
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the matrix and returns its row-major storage
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(LhsError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Bounds-checked mutable access
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut T> {
        let i = self.offset(row, col)?;
        Ok(&mut self.data[i])
    }

    /// Bounds-checked write
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        *self.get_mut(row, col)? = value;
        Ok(())
    }

    /// Exchange two elements
    pub fn swap(&mut self, a: (usize, usize), b: (usize, usize)) -> Result<()> {
        let ia = self.offset(a.0, a.1)?;
        let ib = self.offset(b.0, b.1)?;
        self.data.swap(ia, ib);
        Ok(())
    }

    fn lane_bounds(&self, order: Order, index: usize) -> Result<(usize, usize, usize)> {
        match order {
            Order::RowWise if index < self.rows => Ok((index * self.cols, 1, self.cols)),
            Order::ColumnWise if index < self.cols => Ok((index, self.cols, self.rows)),
            Order::RowWise => Err(LhsError::OutOfRange {
                row: index,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            }),
            Order::ColumnWise => Err(LhsError::OutOfRange {
                row: 0,
                col: index,
                rows: self.rows,
                cols: self.cols,
            }),
        }
    }

    /// Read-only view over one row or one column
    pub fn lane(&self, order: Order, index: usize) -> Result<Lane<'_, T>> {
        let (start, stride, len) = self.lane_bounds(order, index)?;
        Ok(Lane {
            data: &self.data,
            start,
            stride,
            len,
            pos: 0,
        })
    }

    /// Mutable view over one row or one column
    pub fn lane_mut(&mut self, order: Order, index: usize) -> Result<LaneMut<'_, T>> {
        let (start, stride, len) = self.lane_bounds(order, index)?;
        Ok(LaneMut {
            inner: self.data[start..].iter_mut().step_by(stride).take(len),
        })
    }

    /// Elements of row `i`
    pub fn rowwise(&self, i: usize) -> Result<Lane<'_, T>> {
        self.lane(Order::RowWise, i)
    }

    /// Elements of column `j`
    pub fn columnwise(&self, j: usize) -> Result<Lane<'_, T>> {
        self.lane(Order::ColumnWise, j)
    }

    /// Mutable elements of row `i`
    pub fn rowwise_mut(&mut self, i: usize) -> Result<LaneMut<'_, T>> {
        self.lane_mut(Order::RowWise, i)
    }

    /// Mutable elements of column `j`
    pub fn columnwise_mut(&mut self, j: usize) -> Result<LaneMut<'_, T>> {
        self.lane_mut(Order::ColumnWise, j)
    }

    /// Elements in row-major order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Applies `f` to every element
    pub fn map<U, Func: FnMut(&T) -> U>(&self, f: Func) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Copy> Matrix<T> {
    /// Bounds-checked read
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let i = self.offset(row, col)?;
        Ok(self.data[i])
    }

    /// Copy of row `i`
    pub fn row_vec(&self, i: usize) -> Result<Vec<T>> {
        Ok(self.rowwise(i)?.copied().collect())
    }

    /// Copy of column `j`
    pub fn column_vec(&self, j: usize) -> Result<Vec<T>> {
        Ok(self.columnwise(j)?.copied().collect())
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            data.extend((0..self.rows).map(|i| self.data[i * self.cols + j]));
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Stacks `times` copies of the rows one after the other
    pub fn repeat_rows(&self, times: usize) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.data.len() * times);
        for _ in 0..times {
            data.extend_from_slice(&self.data);
        }
        Matrix {
            rows: self.rows * times,
            cols: self.cols,
            data,
        }
    }

    /// Keeps the first `ncols` columns
    pub fn first_columns(&self, ncols: usize) -> Result<Matrix<T>> {
        if ncols > self.cols {
            return Err(LhsError::DimensionMismatch {
                expected: self.cols,
                actual: ncols,
            });
        }
        let mut data = Vec::with_capacity(self.rows * ncols);
        for i in 0..self.rows {
            data.extend_from_slice(&self.data[i * self.cols..i * self.cols + ncols]);
        }
        Ok(Matrix {
            rows: self.rows,
            cols: ncols,
            data,
        })
    }

    /// Copy as an ndarray `(rows, cols)` array
    pub fn to_array(&self) -> Array2<T> {
        Array2::from_shape_fn((self.rows, self.cols), |(i, j)| {
            self.data[i * self.cols + j]
        })
    }
}

impl<T: Clone> From<Array2<T>> for Matrix<T> {
    fn from(array: Array2<T>) -> Self {
        let (rows, cols) = array.dim();
        Matrix {
            rows,
            cols,
            data: array.iter().cloned().collect(),
        }
    }
}

impl<T> TryFrom<Matrix<T>> for Array2<T> {
    type Error = LhsError;

    fn try_from(matrix: Matrix<T>) -> Result<Self> {
        let Matrix { rows, cols, data } = matrix;
        Ok(Array2::from_shape_vec((rows, cols), data)?)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of range for a {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of range for a {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Read-only strided view over a row or a column of a [`Matrix`].
///
/// The view borrows the matrix, so the matrix cannot be modified while it lives.
#[derive(Clone, Copy, Debug)]
pub struct Lane<'a, T> {
    data: &'a [T],
    start: usize,
    stride: usize,
    len: usize,
    pos: usize,
}

impl<'a, T> Lane<'a, T> {
    /// Number of elements of the whole lane
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a lane of a matrix without rows (or columns)
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `i`th element of the lane
    pub fn get(&self, i: usize) -> Option<&'a T> {
        if i < self.len {
            self.data.get(self.start + i * self.stride)
        } else {
            None
        }
    }
}

impl<'a, T> Iterator for Lane<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.get(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.len - self.pos;
        (left, Some(left))
    }
}

impl<T> ExactSizeIterator for Lane<'_, T> {}

/// Mutable strided view over a row or a column of a [`Matrix`]
pub struct LaneMut<'a, T> {
    inner: std::iter::Take<std::iter::StepBy<std::slice::IterMut<'a, T>>>,
}

impl<'a, T> Iterator for LaneMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
