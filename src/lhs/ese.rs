//! Enhanced Stochastic Evolutionary (ESE) optimization of a continuous design.
//!
//! See Jin, R. and Chen, W. and Sudjianto, A. (2005), "An efficient algorithm for
//! constructing optimal design of computer experiments." Journal of Statistical
//! Planning and Inference, 134:268-287.
use super::convert::{ensure_valid, is_valid_lhs};
use crate::distance::{distance_squared, phi_p};
use crate::errors::{LhsError, Result};
use crate::matrix::Matrix;
use crate::random::RandomStream;
use log::debug;
use ndarray::Array1;
use ndarray_rand::rand::Rng;
use ndarray_stats::QuantileExt;
use std::cmp;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Loop sizes of the ESE search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct EseParams {
    /// Number of temperature updates
    pub outer_loop: usize,
    /// Number of exchange trials per temperature
    pub inner_loop: usize,
}

impl EseParams {
    /// Defaults for a `nx` dimensional design
    pub fn for_dim(nx: usize) -> Self {
        EseParams {
            outer_loop: cmp::min((1.5 * nx as f64) as usize, 30).max(1),
            inner_loop: cmp::min(20 * nx, 100),
        }
    }
}

/// phi_p of `x` once rows `i1` and `i2` exchange their values in column `k`, computed
/// from the distances of the two rows only
fn phip_swap(x: &Matrix<f64>, k: usize, phip: f64, p: f64, i1: usize, i2: usize) -> Result<f64> {
    let mut res = 0.;
    for o in (0..x.rows()).filter(|&o| o != i1 && o != i2) {
        let d1 = distance_squared(x.rowwise(i1)?, x.rowwise(o)?)?;
        let d2 = distance_squared(x.rowwise(i2)?, x.rowwise(o)?)?;
        let m1 = (x[(o, k)] - x[(i1, k)]).powi(2);
        let m2 = (x[(o, k)] - x[(i2, k)]).powi(2);
        let nd1 = d1 - m1 + m2;
        let nd2 = d2 + m1 - m2;
        res += nd1.powf(-p / 2.) - d1.powf(-p / 2.) + nd2.powf(-p / 2.) - d2.powf(-p / 2.);
    }
    Ok((phip.powf(p) + res).powf(1. / p))
}

/// Temperature schedule followed after an outer iteration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Schedule {
    /// The best design improved during the iteration
    Improvement,
    /// No improvement, the search moves away from the current design
    Exploration,
}

/// Temperature of the next outer iteration
fn next_temperature(t: f64, schedule: Schedule, p_accpt: f64, p_imp: f64) -> f64 {
    match schedule {
        Schedule::Improvement => {
            if p_accpt >= 0.1 && p_imp < p_accpt {
                t * 0.8
            } else if p_accpt >= 0.1 && (p_imp - p_accpt).abs() < f64::EPSILON {
                t
            } else {
                t / 0.8
            }
        }
        Schedule::Exploration => {
            if p_accpt <= 0.1 {
                t / 0.7
            } else {
                t * 0.9
            }
        }
    }
}

/// Best design found and schedules followed by the successive outer iterations
fn ese_search<R: Rng>(
    design: &Matrix<f64>,
    params: &EseParams,
    rng: &mut RandomStream<R>,
) -> Result<(Matrix<f64>, Vec<Schedule>)> {
    let nx = design.cols();
    let n = design.rows();
    // hard-coded params
    let j_range = 20;
    let p = 10.;
    let tol = 1e-3;

    let mut current = design.clone();
    let mut phip = phi_p(&current, p)?;
    let phip_start = phip;
    let mut t = 0.005 * phip;
    let mut best = current.clone();
    let mut phip_best = phip;
    let mut schedules = Vec::with_capacity(params.outer_loop);

    for _ in 0..params.outer_loop {
        let phip_best_old = phip_best;
        let mut n_acpt = 0.;
        let mut n_imp = 0.;

        for i in 0..params.inner_loop {
            let modulo = (i + 1) % nx;
            // j_range single exchange plans, the best one is tried
            let mut l_phip = Vec::with_capacity(j_range);
            let mut pairs = Vec::with_capacity(j_range);
            for _ in 0..j_range {
                let i1 = rng.below(n)?;
                let mut i2 = rng.below(n)?;
                while i2 == i1 {
                    i2 = rng.below(n)?;
                }
                l_phip.push(phip_swap(&current, modulo, phip, p, i1, i2)?);
                pairs.push((i1, i2));
            }
            let l_phip = Array1::from(l_phip);
            let k = l_phip
                .argmin()
                .map_err(|e| LhsError::InvalidDesign(format!("phi_p undefined: {e}")))?;
            let phip_try = l_phip[k];
            let (i1, i2) = pairs[k];
            // threshold of acceptance
            if phip_try - phip <= t * rng.uniform() {
                phip = phip_try;
                n_acpt += 1.;
                current.swap((i1, modulo), (i2, modulo))?;

                if phip < phip_best {
                    best.clone_from(&current);
                    phip_best = phip;
                    n_imp += 1.;
                }
            }
        }
        let p_accpt = n_acpt / params.inner_loop.max(1) as f64;
        let p_imp = n_imp / params.inner_loop.max(1) as f64;

        let schedule = if phip_best_old - phip_best > tol {
            Schedule::Improvement
        } else {
            Schedule::Exploration
        };
        t = next_temperature(t, schedule, p_accpt, p_imp);
        schedules.push(schedule);
    }
    debug!("ESE phi_p improved from {phip_start} to {phip_best}");
    Ok((best, schedules))
}

/// Improves the phi_p criterion of `design` by exchanging values within its columns.
///
/// Column exchanges keep the latin hypercube property of a latin hypercube input.
pub fn ese_lhs<R: Rng>(
    design: &Matrix<f64>,
    params: &EseParams,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<f64>> {
    let (n, nx) = design.shape();
    if n < 2 || nx == 0 {
        return Ok(design.clone());
    }
    let (best, _) = ese_search(design, params, rng)?;
    if is_valid_lhs(design) {
        ensure_valid(&best)?;
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lhs::{centered_lhs, random_lhs};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_phip_swap() {
        let mut p0 = Matrix::from_rows(vec![
            vec![0.45, 0.75],
            vec![0.75, 0.95],
            vec![0.05, 0.45],
            vec![0.55, 0.15000000000000002],
            vec![0.35000000000000003, 0.25],
            vec![0.95, 0.8500000000000001],
            vec![0.15000000000000002, 0.55],
            vec![0.25, 0.05],
            vec![0.8500000000000001, 0.35000000000000003],
            vec![0.6500000000000001, 0.6500000000000001],
        ])
        .unwrap();
        let p = 10.;
        let start = phi_p(&p0, p).unwrap();
        let swapped = phip_swap(&p0, 1, start, p, 2, 7).unwrap();
        p0.swap((2, 1), (7, 1)).unwrap();
        assert_abs_diff_eq!(swapped, phi_p(&p0, p).unwrap(), epsilon = 1e-6);
    }

    #[test]
    fn test_ese_lhs() {
        let mut rng = RandomStream::from_seed(42);
        let design = random_lhs(10, 2, false, &mut rng).unwrap();
        let optimized = ese_lhs(&design, &EseParams::for_dim(2), &mut rng).unwrap();
        assert!(is_valid_lhs(&optimized));
        assert!(phi_p(&optimized, 10.).unwrap() <= phi_p(&design, 10.).unwrap());
    }

    #[test]
    fn test_next_temperature() {
        assert_abs_diff_eq!(next_temperature(1., Schedule::Improvement, 0.5, 0.2), 0.8);
        assert_abs_diff_eq!(next_temperature(1., Schedule::Improvement, 0.5, 0.5), 1.);
        assert_abs_diff_eq!(next_temperature(1., Schedule::Improvement, 0.05, 0.01), 1. / 0.8);
        assert_abs_diff_eq!(next_temperature(1., Schedule::Exploration, 0.05, 0.), 1. / 0.7);
        assert_abs_diff_eq!(next_temperature(1., Schedule::Exploration, 0.5, 0.), 0.9);
    }

    #[test]
    fn test_ese_explores_without_improvement() {
        // two points: every exchange gives back the same design
        let design = Matrix::from_rows(vec![vec![0.2, 0.7], vec![0.8, 0.1]]).unwrap();
        let params = EseParams {
            outer_loop: 5,
            inner_loop: 10,
        };
        let mut rng = RandomStream::from_seed(3);
        let (best, schedules) = ese_search(&design, &params, &mut rng).unwrap();
        assert_eq!(schedules, vec![Schedule::Exploration; 5]);
        assert!(is_valid_lhs(&best));
    }

    #[test]
    fn test_ese_explores_once_converged() {
        let mut rng = RandomStream::from_seed(42);
        let design = random_lhs(5, 2, false, &mut rng).unwrap();
        let params = EseParams {
            outer_loop: 30,
            inner_loop: 50,
        };
        let (best, schedules) = ese_search(&design, &params, &mut rng).unwrap();
        assert!(schedules.contains(&Schedule::Exploration));
        assert!(phi_p(&best, 10.).unwrap() <= phi_p(&design, 10.).unwrap());
    }

    #[test]
    fn test_ese_on_centered_design() {
        let mut rng = RandomStream::from_seed(0);
        let design = centered_lhs(6, 3, &mut rng).unwrap();
        let optimized = ese_lhs(&design, &EseParams::for_dim(3), &mut rng).unwrap();
        assert!(is_valid_lhs(&optimized));
    }
}
