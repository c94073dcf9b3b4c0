//! Orthogonal arrays built from Galois field arithmetic.
//!
//! An orthogonal array OA(N, k, q, t) is an `N x k` matrix of symbols `0..q` such
//! that, in any `t` columns, every `t`-tuple of symbols appears the same number of
//! times. The available constructions are:
//!
//! | Construction | Array | Requirements |
//! |---|---|---|
//! | [`Bose`] | OA(q², k, q, 2) | q prime power, k ≤ q+1 |
//! | [`Bush`] | OA(q^t, k, q, t) | q prime power, t ≤ k ≤ q+1 |
//! | [`BoseBush`] | OA(2q², k, q, 2) | q = 2^m, k ≤ 2q+1 |
//! | [`BoseBushLambda`] | OA(λq², k, q, 2) | λ, q powers of the same prime, k ≤ λq+1 |
//! | [`AddelmanKempthorne`] | OA(2q², k, q, 2) | q odd prime power or q ≤ 4, k ≤ 2q+1 |
//! | [`AddelmanKempthorne3`] | OA(2q³, k, q, 2) | q odd prime power or q ≤ 4, k ≤ 2q²+2q+1 |
//!
//! ```
//! use oalhs::oa::{Bose, Construction};
//!
//! let oa = Bose::try_new(3).unwrap().construct(4).unwrap();
//! assert_eq!(oa.runs(), 9);
//! assert_eq!(oa.factors(), 4);
//! assert!(oa.is_orthogonal(2).unwrap());
//! ```
mod addelman;
mod addelman3;
mod bose;
mod bose_bush;
mod bush;

pub use addelman::AddelmanKempthorne;
pub use addelman3::AddelmanKempthorne3;
pub use bose::Bose;
pub use bose_bush::{BoseBush, BoseBushLambda};
pub use bush::Bush;

use crate::errors::{LhsError, Result};
use crate::matrix::Matrix;
use crate::random::RandomStream;
use crate::gf::is_supported_order;
use log::debug;
use ndarray_rand::rand::Rng;
use std::fmt;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Family of algebraic construction an array comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum OaFamily {
    /// OA(q², k, q, 2)
    Bose,
    /// OA(q^t, k, q, t)
    Bush,
    /// OA(2q², k, q, 2) with q a power of 2
    BoseBush,
    /// OA(λq², k, q, 2)
    BoseBushLambda,
    /// OA(2q², k, q, 2)
    AddelmanKempthorne,
    /// OA(2q³, k, q, 2)
    AddelmanKempthorne3,
}

impl fmt::Display for OaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OaFamily::Bose => "Bose",
            OaFamily::Bush => "Bush",
            OaFamily::BoseBush => "Bose-Bush",
            OaFamily::BoseBushLambda => "Bose-Bush (lambda)",
            OaFamily::AddelmanKempthorne => "Addelman-Kempthorne",
            OaFamily::AddelmanKempthorne3 => "Addelman-Kempthorne (n=3)",
        };
        write!(f, "{name}")
    }
}

/// An algebraic orthogonal array construction
pub trait Construction: Send + Sync {
    /// Human readable name
    fn name(&self) -> &'static str;

    /// Family of the produced arrays
    fn family(&self) -> OaFamily;

    /// Number of symbols `q`
    fn levels(&self) -> u32;

    /// Strength of the produced arrays
    fn strength(&self) -> u32;

    /// Number of rows of the produced arrays
    fn runs(&self) -> usize;

    /// Largest number of columns the construction provides
    fn max_factors(&self) -> usize;

    /// Builds the array restricted to its first `factors` columns.
    ///
    /// Fails with [`LhsError::Construction`] when `factors` is zero or above
    /// [`Construction::max_factors`].
    fn construct(&self, factors: usize) -> Result<OrthogonalArray>;
}

pub(crate) fn check_factors(name: &str, factors: usize, max: usize) -> Result<()> {
    if factors == 0 {
        return Err(LhsError::construction(format!(
            "nonpositive number of columns requested for the {name} design"
        )));
    }
    if factors > max {
        return Err(LhsError::construction(format!(
            "the {name} design needs at most {max} columns, {factors} were requested"
        )));
    }
    Ok(())
}

/// Integer matrix of field symbols with the orthogonal array balance property
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct OrthogonalArray {
    levels: Matrix<u32>,
    q: u32,
    strength: u32,
    family: OaFamily,
}

/// First unbalanced column tuple found by [`OrthogonalArray::balance`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Imbalance {
    /// Columns of the tuple
    pub columns: Vec<usize>,
    /// Symbols of the tuple with a wrong count
    pub symbols: Vec<u32>,
    /// Count every tuple of symbols should have
    pub expected: usize,
    /// Count found in the array
    pub found: usize,
}

/// Outcome of a balance check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceReport {
    /// Strength checked
    pub strength: u32,
    /// Number of column tuples checked
    pub tuples_checked: usize,
    /// First imbalance, `None` when the array is balanced
    pub imbalance: Option<Imbalance>,
}

impl BalanceReport {
    /// True when no imbalance was found
    pub fn is_balanced(&self) -> bool {
        self.imbalance.is_none()
    }
}

impl OrthogonalArray {
    pub(crate) fn new(levels: Matrix<u32>, q: u32, strength: u32, family: OaFamily) -> Self {
        OrthogonalArray {
            levels,
            q,
            strength,
            family,
        }
    }

    /// Symbol matrix
    pub fn levels(&self) -> &Matrix<u32> {
        &self.levels
    }

    /// Consumes the array and returns its symbol matrix
    pub fn into_levels(self) -> Matrix<u32> {
        self.levels
    }

    /// Number of symbols
    pub fn q(&self) -> u32 {
        self.q
    }

    /// Strength guaranteed by the construction
    pub fn strength(&self) -> u32 {
        self.strength
    }

    /// Construction family
    pub fn family(&self) -> OaFamily {
        self.family
    }

    /// Number of rows
    pub fn runs(&self) -> usize {
        self.levels.rows()
    }

    /// Number of columns
    pub fn factors(&self) -> usize {
        self.levels.cols()
    }

    /// Counts the symbol tuples of every set of `strength` columns.
    ///
    /// With `N` runs every tuple must appear `N / q^strength` times.
    pub fn balance(&self, strength: u32) -> Result<BalanceReport> {
        let t = strength as usize;
        if t == 0 || t > self.factors() {
            return Err(LhsError::invalid(format!(
                "cannot check strength {strength} on an array with {} columns",
                self.factors()
            )));
        }
        let cells = self
            .q
            .checked_pow(strength)
            .map(|c| c as usize)
            .ok_or_else(|| LhsError::invalid(format!("{}^{strength} is too large", self.q)))?;
        let expected = self.runs() / cells;
        let mut report = BalanceReport {
            strength,
            tuples_checked: 0,
            imbalance: None,
        };
        if self.runs() % cells != 0 {
            report.imbalance = Some(Imbalance {
                columns: (0..t).collect(),
                symbols: vec![],
                expected,
                found: self.runs(),
            });
            return Ok(report);
        }
        let mut counts = vec![0usize; cells];
        for columns in Combinations::new(self.factors(), t) {
            report.tuples_checked += 1;
            counts.iter_mut().for_each(|c| *c = 0);
            for i in 0..self.runs() {
                let cell = columns.iter().try_fold(0usize, |acc, &j| {
                    let v = self.levels.get(i, j)?;
                    if v >= self.q {
                        return Err(LhsError::OutOfRange {
                            row: i,
                            col: j,
                            rows: self.runs(),
                            cols: self.factors(),
                        });
                    }
                    Ok(acc * self.q as usize + v as usize)
                })?;
                counts[cell] += 1;
            }
            if let Some(cell) = counts.iter().position(|&c| c != expected) {
                report.imbalance = Some(Imbalance {
                    symbols: decode_cell(cell, self.q, t),
                    found: counts[cell],
                    columns,
                    expected,
                });
                return Ok(report);
            }
        }
        Ok(report)
    }

    /// True when every set of `strength` columns is balanced
    pub fn is_orthogonal(&self, strength: u32) -> Result<bool> {
        Ok(self.balance(strength)?.is_balanced())
    }

    /// Relabels the symbols of each column with an independent random permutation
    pub fn randomize_levels<R: Rng>(&mut self, rng: &mut RandomStream<R>) -> Result<()> {
        for j in 0..self.factors() {
            let perm = rng.permutation(self.q as usize);
            for v in self.levels.columnwise_mut(j)? {
                *v = perm[*v as usize] as u32;
            }
        }
        Ok(())
    }

    /// Array made of `times` stacked copies of the rows
    pub fn replicate(&self, times: usize) -> Result<OrthogonalArray> {
        if times == 0 {
            return Err(LhsError::invalid("replication factor must be > 0"));
        }
        Ok(OrthogonalArray {
            levels: self.levels.repeat_rows(times),
            q: self.q,
            strength: self.strength,
            family: self.family,
        })
    }
}

fn decode_cell(mut cell: usize, q: u32, t: usize) -> Vec<u32> {
    let mut symbols = vec![0; t];
    for s in symbols.iter_mut().rev() {
        *s = (cell % q as usize) as u32;
        cell /= q as usize;
    }
    symbols
}

/// Increasing `t`-subsets of `0..n` in lexicographic order
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, t: usize) -> Self {
        let current = (t <= n).then(|| (0..t).collect());
        Combinations { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.take()?;
        let t = out.len();
        let mut next = out.clone();
        let mut i = t;
        while i > 0 {
            i -= 1;
            if next[i] < self.n - t + i {
                next[i] += 1;
                for j in i + 1..t {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }
        Some(out)
    }
}

/// Explicit orthogonal array request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct OaRequest {
    /// Number of symbols, a prime power
    pub q: u32,
    /// Strength of the array
    pub strength: u32,
    /// Number of columns
    pub factors: usize,
}

impl Default for OaRequest {
    fn default() -> Self {
        OaRequest {
            q: 2,
            strength: 2,
            factors: 3,
        }
    }
}

impl OaRequest {
    /// Request of a strength 2 array with `factors` columns over `q` symbols
    pub fn new(q: u32, factors: usize) -> Self {
        OaRequest {
            q,
            factors,
            ..Default::default()
        }
    }

    /// Sets the number of symbols
    pub fn q(mut self, q: u32) -> Self {
        self.q = q;
        self
    }

    /// Sets the strength
    pub fn strength(mut self, strength: u32) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the number of columns
    pub fn factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }
}

/// Builds the array described by `request`.
///
/// Strength 2 uses [`Bose`] (q² runs), any other strength uses [`Bush`] (q^t runs).
pub fn build_oa(request: &OaRequest) -> Result<OrthogonalArray> {
    if request.strength == 0 {
        return Err(LhsError::invalid("strength must be an integer > 0"));
    }
    let oa = if request.strength == 2 {
        Bose::try_new(request.q)?.construct(request.factors)?
    } else {
        Bush::try_new(request.q, request.strength)?.construct(request.factors)?
    };
    debug!(
        "{} OA({}, {}, {}, {}) built",
        oa.family(),
        oa.runs(),
        oa.factors(),
        oa.q(),
        oa.strength()
    );
    Ok(oa)
}

/// A candidate array retained by [`select_design`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct OaDesign {
    /// Construction family
    pub family: OaFamily,
    /// Number of symbols
    pub q: u32,
    /// Number of rows of the array
    pub runs: usize,
    /// Number of columns of the array
    pub factors: usize,
}

impl OaDesign {
    /// Builds the selected array
    pub fn construct(&self) -> Result<OrthogonalArray> {
        let construction: Box<dyn Construction> = match self.family {
            OaFamily::Bose => Box::new(Bose::try_new(self.q)?),
            OaFamily::Bush => Box::new(Bush::try_new(self.q, 2)?),
            OaFamily::BoseBush => Box::new(BoseBush::try_new(self.q)?),
            OaFamily::BoseBushLambda => {
                let lambda = self.runs / (self.q as usize).pow(2);
                Box::new(BoseBushLambda::try_new(lambda as u32, self.q)?)
            }
            OaFamily::AddelmanKempthorne => Box::new(AddelmanKempthorne::try_new(self.q)?),
            OaFamily::AddelmanKempthorne3 => Box::new(AddelmanKempthorne3::try_new(self.q)?),
        };
        construction.construct(self.factors)
    }
}

/// Smallest `q` with `factor * q^power >= n` when `larger`, largest `q` with
/// `factor * q^power <= n` otherwise
fn root_bound(n: usize, factor: usize, power: u32, larger: bool) -> i64 {
    let runs = |q: i64| factor as u128 * (q.max(0) as u128).pow(power);
    let target = n as u128;
    let mut q = (n as f64 / factor as f64).powf(1. / power as f64).round() as i64;
    if larger {
        while q > 0 && runs(q - 1) >= target {
            q -= 1;
        }
        while runs(q) < target {
            q += 1;
        }
    } else {
        while q > 0 && runs(q) > target {
            q -= 1;
        }
        while runs(q + 1) <= target {
            q += 1;
        }
    }
    q
}

/// Field order nearest to `start` (searching upwards when `larger`) accepted by `valid`
fn step_order(start: i64, larger: bool, valid: impl Fn(u32) -> bool) -> Option<u32> {
    let mut q = if larger { start.max(2) } else { start };
    while q >= 2 && q <= i64::from(u16::MAX) {
        if valid(q as u32) {
            return Some(q as u32);
        }
        q += if larger { 1 } else { -1 };
    }
    None
}

/// Candidate family of [`select_design`]
struct Family {
    family: OaFamily,
    /// `runs = factor * q^power`
    factor: usize,
    power: u32,
    max_factors: fn(usize) -> usize,
    valid: fn(u32) -> bool,
}

fn ak_order(q: u32) -> bool {
    is_supported_order(q) && (q % 2 == 1 || q <= 4)
}

fn bose_bush_order(q: u32) -> bool {
    q.is_power_of_two() && is_supported_order(2 * q)
}

fn families() -> [Family; 4] {
    [
        Family {
            family: OaFamily::AddelmanKempthorne,
            factor: 2,
            power: 2,
            max_factors: |q| 2 * q + 1,
            valid: ak_order,
        },
        Family {
            family: OaFamily::AddelmanKempthorne3,
            factor: 2,
            power: 3,
            max_factors: |q| 2 * q * q + 2 * q + 1,
            valid: ak_order,
        },
        Family {
            family: OaFamily::Bose,
            factor: 1,
            power: 2,
            max_factors: |q| q + 1,
            valid: is_supported_order,
        },
        Family {
            family: OaFamily::BoseBush,
            factor: 2,
            power: 2,
            max_factors: |q| 2 * q + 1,
            valid: bose_bush_order,
        },
    ]
}

/// Chooses the strength 2 array whose run count best fits `n` points in `k` dimensions.
///
/// Candidates are an Addelman-Kempthorne array with `q ≈ sqrt(n/2)`, a three dimensional
/// Addelman-Kempthorne array with `q ≈ cbrt(n/2)`, a Bose array with `q ≈ sqrt(n)` and a
/// Bose-Bush array with `q ≈ sqrt(n/2)`.
///
/// With `choose_larger` the field order of each family is rounded up, then stepped up
/// until the array provides `k` columns. Otherwise it is rounded down and candidates with
/// fewer than `k` columns are dropped. When some candidate has at least `n` runs,
/// candidates below `n` are heavily penalized so that the smallest array with at least
/// `n` runs wins; otherwise the closest run count wins.
pub fn select_design(n: usize, k: usize, choose_larger: bool) -> Result<OaDesign> {
    if n == 0 || k == 0 {
        return Err(LhsError::invalid(format!(
            "n and k must be integers > 0, n={n} k={k}"
        )));
    }
    let mut candidates = Vec::with_capacity(4);
    for f in &families() {
        let start = root_bound(n, f.factor, f.power, choose_larger);
        let q = step_order(start, choose_larger, |q| {
            (f.valid)(q) && (!choose_larger || (f.max_factors)(q as usize) >= k)
        });
        if let Some(q) = q {
            let max_factors = (f.max_factors)(q as usize);
            let candidate = OaDesign {
                family: f.family,
                q,
                runs: f.factor * (q as usize).pow(f.power),
                factors: k.min(max_factors),
            };
            debug!(
                "Candidate OA: {} with q={} n={} k={}",
                candidate.family, candidate.q, candidate.runs, candidate.factors
            );
            if max_factors >= k {
                candidates.push(candidate);
            }
        }
    }

    let any_above = candidates.iter().any(|c| c.runs >= n);
    let gap = |c: &OaDesign| {
        if !any_above {
            c.runs.abs_diff(n)
        } else if c.runs >= n {
            c.runs - n
        } else {
            (n - c.runs) * 100
        }
    };
    let selected = candidates.into_iter().min_by_key(gap).ok_or_else(|| {
        LhsError::construction(format!(
            "no orthogonal array close to {n} runs provides {k} columns"
        ))
    })?;
    debug!("{} selected", selected.family);
    Ok(selected)
}
