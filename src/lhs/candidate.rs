//! Point by point latin hypercube construction.
//!
//! Points are placed from the last row upwards. For every new point, `dup` times the
//! number of remaining strata candidates are drawn from the strata still available in
//! each dimension, and the candidate whose distance to the points already placed best
//! fits the goal is kept.
use super::basic::single_point;
use super::convert::{ensure_valid, to_continuous};
use crate::errors::Result;
use crate::matrix::Matrix;
use crate::params::{as_i64, check_dup};
use crate::random::RandomStream;
use log::debug;
use ndarray_rand::rand::Rng;

/// Goal of the candidate selection
#[derive(Clone, Copy, Debug, PartialEq)]
enum Goal {
    /// Minimum distance as close as possible to the given squared distance
    Target(f64),
    /// Largest minimum distance
    Spread,
}

fn squared_gap(a: &[u32], b: &[u32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum()
}

/// Integer design built with `dup` candidates per remaining stratum
fn candidate_strata<R: Rng>(
    n: usize,
    k: usize,
    dup: usize,
    goal: Goal,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<u32>> {
    // points[i] is the i-th point, avail[r][..count] the strata still free in dimension r
    let mut points: Vec<Vec<u32>> = vec![vec![0; k]; n];
    let mut avail: Vec<Vec<u32>> = (0..k).map(|_| (0..n as u32).collect()).collect();

    for r in 0..k {
        let v = rng.below(n)?;
        points[n - 1][r] = v as u32;
        avail[r][v] = (n - 1) as u32;
    }

    let mut candidates: Vec<Vec<u32>> = Vec::with_capacity(dup * n);
    for count in (1..n).rev() {
        let pool = dup * count;
        candidates.clear();
        candidates.resize(pool, vec![0; k]);
        for (r, free) in avail.iter().enumerate() {
            let mut draws: Vec<u32> = free[..count]
                .iter()
                .copied()
                .cycle()
                .take(pool)
                .collect();
            for c in (1..=pool).rev() {
                let idx = rng.below(c)?;
                candidates[c - 1][r] = draws[idx];
                draws[idx] = draws[c - 1];
            }
        }

        let mut best = 0;
        let mut best_fit = f64::INFINITY;
        for (c, candidate) in candidates.iter().enumerate() {
            let min_d2 = points[count..]
                .iter()
                .map(|p| squared_gap(candidate, p))
                .fold(f64::INFINITY, f64::min);
            let fit = match goal {
                Goal::Target(opt2) => (min_d2 - opt2).abs(),
                Goal::Spread => -min_d2,
            };
            if fit < best_fit {
                best = c;
                best_fit = fit;
            }
        }
        points[count - 1].clone_from(&candidates[best]);

        for (r, free) in avail.iter_mut().enumerate() {
            let chosen = points[count - 1][r];
            if let Some(pos) = free[..count].iter().position(|&s| s == chosen) {
                free[pos] = free[count - 1];
            }
        }
    }
    for (r, free) in avail.iter().enumerate() {
        points[0][r] = free[0];
    }

    let strata = Matrix::from_rows(points)?;
    ensure_valid(&strata)?;
    Ok(strata)
}

fn candidate_lhs<R: Rng>(
    n: usize,
    k: usize,
    dup: usize,
    goal: Goal,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<f64>> {
    check_dup(as_i64(n), as_i64(k), as_i64(dup))?;
    if n == 1 {
        return Ok(single_point(k, rng));
    }
    let strata = candidate_strata(n, k, dup, goal, rng)?;
    debug!("{goal:?} candidate design of {n} points in {k} dimensions built");
    to_continuous(&strata, rng)
}

/// Latin hypercube whose nearest neighbour distances approach the uniform spacing.
///
/// The target distance between points is `n / n^(1/k)` in strata units: each new point
/// is the candidate whose minimum distance to the placed points is the closest to it.
pub fn improved_lhs<R: Rng>(
    n: usize,
    k: usize,
    dup: usize,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<f64>> {
    let nf = n as f64;
    let opt = nf / nf.powf(1. / k.max(1) as f64);
    candidate_lhs(n, k, dup, Goal::Target(opt * opt), rng)
}

/// Latin hypercube built by keeping, at each step, the candidate farthest from the
/// points already placed
pub fn maximin_lhs<R: Rng>(
    n: usize,
    k: usize,
    dup: usize,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<f64>> {
    candidate_lhs(n, k, dup, Goal::Spread, rng)
}
