//! Distances between design points and design quality criteria.
//!
//! Two criteria are available, with a fixed "better" convention used by every optimizer:
//! * [`Criterion::S`]: sum of the inverse pairwise distances, **lower is better**
//!   (equivalently, the S-optimality `1 / sum` is higher);
//! * [`Criterion::Maximin`]: minimum pairwise distance, **higher is better**, ties broken
//!   by the number of pairs at that distance (fewer is better).
use crate::errors::{LhsError, Result};
use crate::matrix::Matrix;
use std::cmp::Ordering;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Relative margin a score must gain to count as an improvement
const IMPROVEMENT_TOL: f64 = 1e-12;

/// Sum of the squared coordinate differences of two points.
///
/// Points may be slices, vectors or matrix lanes. Fails with
/// [`LhsError::DimensionMismatch`] when they do not have the same length.
///
/// ```
/// use oalhs::distance::distance_squared;
///
/// assert_eq!(distance_squared(&[0., 0.], &[3., 4.]).unwrap(), 25.);
/// ```
pub fn distance_squared<'a, T>(
    a: impl IntoIterator<Item = &'a T>,
    b: impl IntoIterator<Item = &'a T>,
) -> Result<f64>
where
    T: Copy + Into<f64> + 'a,
{
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    let mut sum = 0.;
    let mut len = 0;
    loop {
        match (a.next(), b.next()) {
            (Some(&x), Some(&y)) => {
                let d = x.into() - y.into();
                sum += d * d;
                len += 1;
            }
            (None, None) => return Ok(sum),
            (Some(_), None) => {
                return Err(LhsError::DimensionMismatch {
                    expected: len,
                    actual: len + 1 + a.count(),
                })
            }
            (None, Some(_)) => {
                return Err(LhsError::DimensionMismatch {
                    expected: len,
                    actual: len + 1 + b.count(),
                })
            }
        }
    }
}

/// Euclidean distance between two points
pub fn distance<'a, T>(
    a: impl IntoIterator<Item = &'a T>,
    b: impl IntoIterator<Item = &'a T>,
) -> Result<f64>
where
    T: Copy + Into<f64> + 'a,
{
    Ok(distance_squared(a, b)?.sqrt())
}

/// Squared distances between row pairs `(i, j)`, `i < j`, in lexicographic order
pub fn pairwise_squared_distances<T: Copy + Into<f64>>(design: &Matrix<T>) -> Result<Vec<f64>> {
    let n = design.rows();
    let mut res = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            res.push(distance_squared(design.rowwise(i)?, design.rowwise(j)?)?);
        }
    }
    Ok(res)
}

/// Condensed distance vector of the rows of a design (`n (n - 1) / 2` values)
pub fn pairwise_distances<T: Copy + Into<f64>>(design: &Matrix<T>) -> Result<Vec<f64>> {
    Ok(pairwise_squared_distances(design)?
        .into_iter()
        .map(f64::sqrt)
        .collect())
}

/// Smallest distance between two rows of a design
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinDistance {
    /// Minimum distance
    pub value: f64,
    /// First row pair `(i, j)`, `i < j`, achieving it
    pub pair: (usize, usize),
    /// Number of row pairs achieving it
    pub count: usize,
}

fn check_pairs<T>(design: &Matrix<T>) -> Result<()> {
    if design.rows() < 2 {
        return Err(LhsError::invalid(format!(
            "a design needs at least 2 rows to compare points, got {}",
            design.rows()
        )));
    }
    Ok(())
}

fn min_squared_distance<T: Copy + Into<f64>>(design: &Matrix<T>) -> Result<MinDistance> {
    check_pairs(design)?;
    let n = design.rows();
    let mut best = MinDistance {
        value: f64::INFINITY,
        pair: (0, 1),
        count: 0,
    };
    for i in 0..n {
        for j in i + 1..n {
            let d = distance_squared(design.rowwise(i)?, design.rowwise(j)?)?;
            if d < best.value {
                best = MinDistance {
                    value: d,
                    pair: (i, j),
                    count: 1,
                };
            } else if d == best.value {
                best.count += 1;
            }
        }
    }
    Ok(best)
}

/// Scans every row pair for the minimum distance
pub fn min_pairwise_distance<T: Copy + Into<f64>>(design: &Matrix<T>) -> Result<MinDistance> {
    let mut best = min_squared_distance(design)?;
    best.value = best.value.sqrt();
    Ok(best)
}

/// Sum over row pairs of the inverse distance, pairs at distance zero contribute zero
pub fn sum_inverse_distance<T: Copy + Into<f64>>(design: &Matrix<T>) -> Result<f64> {
    check_pairs(design)?;
    Ok(pairwise_squared_distances(design)?
        .into_iter()
        .map(inverse_distance)
        .sum())
}

/// S-optimality `1 / sum_inverse_distance`, higher is better
pub fn s_optimality<T: Copy + Into<f64>>(design: &Matrix<T>) -> Result<f64> {
    Ok(1. / sum_inverse_distance(design)?)
}

/// Morris-Mitchell criterion `(sum d^-p)^(1/p)`, lower is better
pub fn phi_p(design: &Matrix<f64>, p: f64) -> Result<f64> {
    check_pairs(design)?;
    let sum: f64 = pairwise_distances(design)?
        .into_iter()
        .map(|d| d.powf(-p))
        .sum();
    Ok(sum.powf(1. / p))
}

fn inverse_distance(d2: f64) -> f64 {
    if d2 > 0. {
        1. / d2.sqrt()
    } else {
        0.
    }
}

/// Design quality criterion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Criterion {
    /// Sum of inverse distances (S-optimality)
    #[default]
    S,
    /// Minimum pairwise distance
    Maximin,
}

/// Value of a criterion for one design
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Score {
    /// Sum of inverse pairwise distances
    S {
        /// The sum, lower is better
        inverse_distance: f64,
    },
    /// Minimum pairwise distance
    Maximin {
        /// Squared minimum distance, higher is better
        min_squared: f64,
        /// Number of pairs at the minimum, fewer is better
        count: usize,
    },
}

impl Score {
    /// Scores `design` under `criterion`
    pub fn evaluate<T: Copy + Into<f64>>(criterion: Criterion, design: &Matrix<T>) -> Result<Score> {
        match criterion {
            Criterion::S => Ok(Score::S {
                inverse_distance: sum_inverse_distance(design)?,
            }),
            Criterion::Maximin => {
                let min = min_squared_distance(design)?;
                Ok(Score::Maximin {
                    min_squared: min.value,
                    count: min.count,
                })
            }
        }
    }

    /// Criterion the score belongs to
    pub fn criterion(&self) -> Criterion {
        match self {
            Score::S { .. } => Criterion::S,
            Score::Maximin { .. } => Criterion::Maximin,
        }
    }

    /// Sum of inverse distances for S, minimum distance for maximin
    pub fn value(&self) -> f64 {
        match self {
            Score::S { inverse_distance } => *inverse_distance,
            Score::Maximin { min_squared, .. } => min_squared.sqrt(),
        }
    }

    /// Strict improvement test, the single accept rule of the optimizers.
    ///
    /// Scores of different criteria never compare as better.
    pub fn is_better_than(&self, other: &Score) -> bool {
        match (self, other) {
            (Score::S { inverse_distance: a }, Score::S { inverse_distance: b }) => {
                *a < *b - IMPROVEMENT_TOL * b.abs()
            }
            (
                Score::Maximin {
                    min_squared: a,
                    count: ca,
                },
                Score::Maximin {
                    min_squared: b,
                    count: cb,
                },
            ) => {
                let tol = IMPROVEMENT_TOL * b.abs();
                *a > *b + tol || ((*a - *b).abs() <= tol && ca < cb)
            }
            _ => false,
        }
    }

    /// Best first total order between scores, without tolerance.
    ///
    /// Scores of different criteria compare as equal.
    pub fn cmp_quality(&self, other: &Score) -> Ordering {
        match (self, other) {
            (Score::S { inverse_distance: a }, Score::S { inverse_distance: b }) => a.total_cmp(b),
            (
                Score::Maximin {
                    min_squared: a,
                    count: ca,
                },
                Score::Maximin {
                    min_squared: b,
                    count: cb,
                },
            ) => b.total_cmp(a).then(ca.cmp(cb)),
            _ => Ordering::Equal,
        }
    }

    /// Score of a design with fewer than two points
    pub(crate) fn without_pairs(criterion: Criterion) -> Score {
        match criterion {
            Criterion::S => Score::S {
                inverse_distance: 0.,
            },
            Criterion::Maximin => MinAcc::default().into_score(),
        }
    }

    /// Criterion gain from `previous` to `self`.
    ///
    /// `None` when the criterion value did not move (a maximin tie broken on the
    /// number of closest pairs).
    pub fn gain_over(&self, previous: &Score) -> Option<f64> {
        let gain = (self.value() - previous.value()).abs();
        (gain > 0.).then_some(gain)
    }
}

/// Squared distance cache of a design, scoring single column swaps incrementally
#[derive(Clone, Debug)]
pub struct PairwiseState {
    coords: Matrix<f64>,
    d2: Matrix<f64>,
}

impl PairwiseState {
    /// Caches the squared distances between the rows of `design`
    pub fn new<T: Copy + Into<f64>>(design: &Matrix<T>) -> Result<Self> {
        check_pairs(design)?;
        let coords = design.map(|&v| v.into());
        let n = coords.rows();
        let mut d2 = Matrix::zeros(n, n);
        for i in 0..n {
            for j in i + 1..n {
                let d = distance_squared(coords.rowwise(i)?, coords.rowwise(j)?)?;
                d2[(i, j)] = d;
                d2[(j, i)] = d;
            }
        }
        Ok(PairwiseState { coords, d2 })
    }

    /// Cached coordinates
    pub fn coords(&self) -> &Matrix<f64> {
        &self.coords
    }

    /// Current score under `criterion`
    pub fn score(&self, criterion: Criterion) -> Score {
        let n = self.coords.rows();
        match criterion {
            Criterion::S => {
                let mut sum = 0.;
                for i in 0..n {
                    for j in i + 1..n {
                        sum += inverse_distance(self.d2[(i, j)]);
                    }
                }
                Score::S {
                    inverse_distance: sum,
                }
            }
            Criterion::Maximin => {
                let mut acc = MinAcc::default();
                for i in 0..n {
                    for j in i + 1..n {
                        acc.push(self.d2[(i, j)]);
                    }
                }
                acc.into_score()
            }
        }
    }

    fn check_swap(&self, col: usize, r1: usize, r2: usize) -> Result<()> {
        let (rows, cols) = self.coords.shape();
        for r in [r1, r2] {
            if r >= rows || col >= cols {
                return Err(LhsError::OutOfRange {
                    row: r,
                    col,
                    rows,
                    cols,
                });
            }
        }
        if r1 == r2 {
            return Err(LhsError::invalid(format!("cannot swap row {r1} with itself")));
        }
        Ok(())
    }

    /// Squared distances of rows `r1` and `r2` to every row once their values in
    /// column `col` are exchanged
    fn swapped_rows(&self, col: usize, r1: usize, r2: usize) -> (Vec<f64>, Vec<f64>) {
        let n = self.coords.rows();
        let x1 = self.coords[(r1, col)];
        let x2 = self.coords[(r2, col)];
        let mut new1 = vec![0.; n];
        let mut new2 = vec![0.; n];
        for o in 0..n {
            if o == r1 || o == r2 {
                continue;
            }
            let xo = self.coords[(o, col)];
            let delta = (x2 - xo).powi(2) - (x1 - xo).powi(2);
            new1[o] = self.d2[(r1, o)] + delta;
            new2[o] = self.d2[(r2, o)] - delta;
        }
        (new1, new2)
    }

    /// Score the design would have after exchanging rows `r1` and `r2` in column `col`.
    ///
    /// `O(n)` for [`Criterion::S`] given `current`, `O(n^2)` for [`Criterion::Maximin`].
    pub fn swap_score(
        &self,
        criterion: Criterion,
        current: &Score,
        col: usize,
        r1: usize,
        r2: usize,
    ) -> Result<Score> {
        self.check_swap(col, r1, r2)?;
        let n = self.coords.rows();
        let (new1, new2) = self.swapped_rows(col, r1, r2);
        match (criterion, current) {
            (Criterion::S, Score::S { inverse_distance: base }) => {
                let mut sum = *base;
                for o in (0..n).filter(|&o| o != r1 && o != r2) {
                    sum += inverse_distance_delta(self.d2[(r1, o)], new1[o]);
                    sum += inverse_distance_delta(self.d2[(r2, o)], new2[o]);
                }
                Ok(Score::S {
                    inverse_distance: sum,
                })
            }
            (Criterion::Maximin, Score::Maximin { .. }) => {
                let mut acc = MinAcc::default();
                for i in (0..n).filter(|&i| i != r1 && i != r2) {
                    for j in (i + 1..n).filter(|&j| j != r1 && j != r2) {
                        acc.push(self.d2[(i, j)]);
                    }
                    acc.push(new1[i]);
                    acc.push(new2[i]);
                }
                acc.push(self.d2[(r1, r2)]);
                Ok(acc.into_score())
            }
            _ => Err(LhsError::invalid(format!(
                "a {:?} score cannot be updated under the {criterion:?} criterion",
                current.criterion()
            ))),
        }
    }

    /// Exchanges rows `r1` and `r2` in column `col` and updates the cache
    pub fn apply_swap(&mut self, col: usize, r1: usize, r2: usize) -> Result<()> {
        self.check_swap(col, r1, r2)?;
        let (new1, new2) = self.swapped_rows(col, r1, r2);
        for o in (0..self.coords.rows()).filter(|&o| o != r1 && o != r2) {
            self.d2[(r1, o)] = new1[o];
            self.d2[(o, r1)] = new1[o];
            self.d2[(r2, o)] = new2[o];
            self.d2[(o, r2)] = new2[o];
        }
        self.coords.swap((r1, col), (r2, col))
    }
}

fn inverse_distance_delta(old: f64, new: f64) -> f64 {
    inverse_distance(new) - inverse_distance(old)
}

struct MinAcc {
    min: f64,
    count: usize,
}

impl Default for MinAcc {
    fn default() -> Self {
        MinAcc {
            min: f64::INFINITY,
            count: 0,
        }
    }
}

impl MinAcc {
    fn push(&mut self, d2: f64) {
        if d2 < self.min {
            self.min = d2;
            self.count = 1;
        } else if d2 == self.min {
            self.count += 1;
        }
    }

    fn into_score(self) -> Score {
        Score::Maximin {
            min_squared: self.min,
            count: self.count,
        }
    }
}
