//! Latin hypercubes seeded by orthogonal arrays.
//!
//! Each symbol of an array column is replaced by a block of consecutive strata, one per
//! occurrence of the symbol, given to its rows in random order. The resulting latin
//! hypercube keeps the balance of the array over its coarse `q` level grid.
use super::convert::{ensure_valid, to_continuous};
use super::progress_level;
use crate::errors::{LhsError, Result};
use crate::matrix::Matrix;
use crate::oa::{select_design, OrthogonalArray};
use crate::params::{as_i64, check_n_k};
use crate::random::RandomStream;
use log::log;
use ndarray_rand::rand::Rng;
use std::collections::BTreeMap;

/// An orthogonal array based latin hypercube
#[derive(Clone, Debug, PartialEq)]
pub struct OaLhs {
    /// Array the design derives from, replicated to the number of points
    pub oa: OrthogonalArray,
    /// Integer strata of the design
    pub strata: Matrix<u32>,
    /// Design in `[0, 1]^k`
    pub design: Matrix<f64>,
}

/// Replaces every symbol by its block of strata, columns processed left to right and
/// symbols in increasing order
fn replace_levels<R: Rng>(levels: &Matrix<u32>, rng: &mut RandomStream<R>) -> Result<Matrix<u32>> {
    let (n, k) = levels.shape();
    let mut strata = Matrix::zeros(n, k);
    for j in 0..k {
        let mut rows_by_symbol: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, &symbol) in levels.columnwise(j)?.enumerate() {
            rows_by_symbol.entry(symbol).or_default().push(i);
        }
        let mut base = 0;
        for rows in rows_by_symbol.values() {
            let order = rng.order(rows.len());
            for (&i, o) in rows.iter().zip(order) {
                strata[(i, j)] = (base + o) as u32;
            }
            base += rows.len();
        }
    }
    Ok(strata)
}

/// Turns `oa` into an `n` point latin hypercube.
///
/// `n` must be a multiple of the number of runs of the array, the array is then stacked
/// `n / runs` times.
pub fn oa_to_lhs<R: Rng>(oa: &OrthogonalArray, n: usize, rng: &mut RandomStream<R>) -> Result<OaLhs> {
    check_n_k(as_i64(n), as_i64(oa.factors()))?;
    let runs = oa.runs();
    if runs == 0 || n % runs != 0 {
        return Err(LhsError::invalid(format!(
            "n={n} is not a multiple of the {runs} runs of the orthogonal array"
        )));
    }
    let oa = oa.replicate(n / runs)?;
    let strata = replace_levels(oa.levels(), rng)?;
    ensure_valid(&strata)?;
    let design = to_continuous(&strata, rng)?;
    Ok(OaLhs { oa, strata, design })
}

/// Latin hypercube built on the strength 2 orthogonal array best fitting `n` points in
/// `k` dimensions.
///
/// The design has as many points as the selected array has runs, which is the smallest
/// run count at or above `n` found by [`select_design`].
///
/// ```
/// use oalhs::{create_oalhs, is_valid_lhs, RandomStream};
///
/// let mut rng = RandomStream::from_seed(42);
/// let oalhs = create_oalhs(9, 4, true, false, &mut rng).unwrap();
/// assert_eq!(oalhs.design.shape(), (9, 4));
/// assert!(is_valid_lhs(&oalhs.design));
/// ```
pub fn create_oalhs<R: Rng>(
    n: usize,
    k: usize,
    choose_larger: bool,
    verbose: bool,
    rng: &mut RandomStream<R>,
) -> Result<OaLhs> {
    check_n_k(as_i64(n), as_i64(k))?;
    let level = progress_level(verbose);
    let selected = select_design(n, k, choose_larger)?;
    log!(
        level,
        "{} design selected with q={}: {} runs, {} factors",
        selected.family,
        selected.q,
        selected.runs,
        selected.factors
    );
    let oa = selected.construct()?;
    oa_to_lhs(&oa, oa.runs(), rng)
}
