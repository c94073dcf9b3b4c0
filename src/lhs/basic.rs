use super::convert::{ensure_valid, place_in_bin, to_continuous};
use crate::errors::Result;
use crate::matrix::Matrix;
use crate::params::{as_i64, check_n_k};
use crate::random::RandomStream;
use ndarray_rand::rand::Rng;

/// `1 x k` design of uniform draws, the only latin hypercube with a single point
pub(crate) fn single_point<R: Rng>(k: usize, rng: &mut RandomStream<R>) -> Matrix<f64> {
    let mut design = Matrix::zeros(1, k);
    for v in design.as_mut_slice() {
        *v = rng.open_uniform();
    }
    design
}

/// Integer latin hypercube: every column is a random permutation of the strata `0..n`.
///
/// Column `j` takes the order of `n` fresh uniform draws.
pub fn random_int_lhs<R: Rng>(n: usize, k: usize, rng: &mut RandomStream<R>) -> Result<Matrix<u32>> {
    check_n_k(as_i64(n), as_i64(k))?;
    let mut strata = Matrix::zeros(n, k);
    for j in 0..k {
        let order = rng.order(n);
        for (s, o) in strata.columnwise_mut(j)?.zip(order) {
            *s = o as u32;
        }
    }
    Ok(strata)
}

/// Random latin hypercube of `n` points in `[0, 1]^k`.
///
/// Each column is a random permutation of the strata jittered inside their bins. With
/// `preserve_draw` the permutation and the jitter of a column are drawn together, column
/// after column, so that the first columns do not depend on `k`; otherwise every
/// permutation is drawn before the jitters.
///
/// ```
/// use oalhs::{is_valid_lhs, random_lhs, RandomStream};
///
/// let mut rng = RandomStream::from_seed(42);
/// let design = random_lhs(10, 3, false, &mut rng).unwrap();
/// assert!(is_valid_lhs(&design));
/// ```
pub fn random_lhs<R: Rng>(
    n: usize,
    k: usize,
    preserve_draw: bool,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<f64>> {
    check_n_k(as_i64(n), as_i64(k))?;
    if n == 1 {
        return Ok(single_point(k, rng));
    }
    let design = if preserve_draw {
        let mut design = Matrix::zeros(n, k);
        for j in 0..k {
            let order = rng.order(n);
            for (v, o) in design.columnwise_mut(j)?.zip(order) {
                *v = place_in_bin(o as u32, n, rng.open_uniform());
            }
        }
        design
    } else {
        let strata = random_int_lhs(n, k, rng)?;
        to_continuous(&strata, rng)?
    };
    ensure_valid(&design)?;
    Ok(design)
}

/// Latin hypercube with every point at the centre of its bins
pub fn centered_lhs<R: Rng>(n: usize, k: usize, rng: &mut RandomStream<R>) -> Result<Matrix<f64>> {
    check_n_k(as_i64(n), as_i64(k))?;
    let nf = n as f64;
    let mut centres: Vec<f64> = (0..n).map(|s| (s as f64 + 0.5) / nf).collect();
    let mut design = Matrix::zeros(n, k);
    for j in 0..k {
        rng.shuffle(&mut centres);
        for (v, c) in design.columnwise_mut(j)?.zip(centres.iter()) {
            *v = *c;
        }
    }
    Ok(design)
}
