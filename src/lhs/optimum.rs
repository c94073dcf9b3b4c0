//! Column sweep optimization of latin hypercubes.
//!
//! A sweep visits every column and applies, in each, the single row exchange that
//! improves the criterion the most. Exchanging two values of a column keeps the latin
//! hypercube property, so optimized designs stay valid.
use super::basic::{random_int_lhs, single_point};
use super::convert::{ensure_valid, to_continuous};
use super::progress_level;
use crate::distance::{Criterion, PairwiseState, Score};
use crate::errors::{LhsError, Result};
use crate::matrix::Matrix;
use crate::params::{as_i64, check_sweeps};
use crate::random::RandomStream;
use log::log;
use ndarray_rand::rand::Rng;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Settings of the sweep optimizer
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct OptimumParams {
    /// Maximum number of full sweeps
    pub max_sweeps: usize,
    /// Relative gain under which the sweeps stop
    pub eps: f64,
    /// Criterion to optimize
    pub criterion: Criterion,
    /// Reports progress at info level instead of debug
    pub verbose: bool,
}

impl Default for OptimumParams {
    fn default() -> Self {
        OptimumParams {
            max_sweeps: 2,
            eps: 0.1,
            criterion: Criterion::S,
            verbose: false,
        }
    }
}

impl OptimumParams {
    /// Sets the maximum number of sweeps
    pub fn max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Sets the stopping gain ratio
    pub fn eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Sets the criterion
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Sets the verbosity
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn check(&self, n: usize, k: usize) -> Result<()> {
        check_sweeps(as_i64(n), as_i64(k), as_i64(self.max_sweeps), self.eps)
    }
}

/// Why the sweeps stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// The sweep budget was used up
    MaxSweeps,
    /// A column offered no improving exchange
    NoImprovement,
    /// A column gain fell under `eps` times the gain of the first column
    Converged,
}

/// Outcome of an optimization
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct OptimizationReport {
    /// Score of the starting design
    pub initial: Score,
    /// Score of the returned design
    pub final_score: Score,
    /// Number of sweeps started
    pub sweeps: usize,
    /// Number of exchanges applied
    pub swaps: usize,
    /// Why the optimization stopped
    pub stop_reason: StopReason,
}

/// An optimized continuous design with its report
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizedLhs {
    /// Design in `[0, 1]^k`
    pub design: Matrix<f64>,
    /// Optimization outcome
    pub report: OptimizationReport,
}

/// Greedy column sweep optimizer
#[derive(Clone, Copy, Debug, Default)]
pub struct SweepOptimizer {
    params: OptimumParams,
}

impl SweepOptimizer {
    /// Optimizer with the given settings
    pub fn new(params: OptimumParams) -> Self {
        SweepOptimizer { params }
    }

    /// Optimizer settings
    pub fn params(&self) -> &OptimumParams {
        &self.params
    }

    /// Improves `design` in place by exchanging values within its columns.
    ///
    /// Every applied exchange strictly improves the criterion, so the final score is
    /// never worse than the initial one. The sweeps stop when the sweep budget is spent,
    /// when a column has no improving exchange, or when the gain of a column (after the
    /// first) falls under `eps` times the gain of the first column of the sweep.
    pub fn optimize<T: Copy + Into<f64>>(&self, design: &mut Matrix<T>) -> Result<OptimizationReport> {
        let (n, k) = design.shape();
        self.params.check(n, k)?;
        let level = progress_level(self.params.verbose);
        let criterion = self.params.criterion;
        if n < 2 {
            let score = Score::without_pairs(criterion);
            return Ok(OptimizationReport {
                initial: score,
                final_score: score,
                sweeps: 0,
                swaps: 0,
                stop_reason: StopReason::NoImprovement,
            });
        }

        let mut state = PairwiseState::new(design)?;
        let initial = state.score(criterion);
        log!(level, "Beginning Optimality Criterion {}", initial.value());
        let mut score = initial;
        let mut first_gain = 0.;
        let mut sweeps = 0;
        let mut swaps = 0;

        let stop_reason = 'sweeps: loop {
            if sweeps == self.params.max_sweeps {
                break 'sweeps StopReason::MaxSweeps;
            }
            sweeps += 1;
            for col in 0..k {
                let mut best: Option<(Score, usize, usize)> = None;
                for r1 in 0..n - 1 {
                    for r2 in r1 + 1..n {
                        let candidate = state.swap_score(criterion, &score, col, r1, r2)?;
                        if best.map_or(true, |(b, _, _)| candidate.is_better_than(&b)) {
                            best = Some((candidate, r1, r2));
                        }
                    }
                }
                let (r1, r2) = match best {
                    Some((candidate, r1, r2)) if candidate.is_better_than(&score) => (r1, r2),
                    _ => {
                        log!(level, "Algorithm stopped when no improvement was found in column {col}");
                        break 'sweeps StopReason::NoImprovement;
                    }
                };
                state.apply_swap(col, r1, r2)?;
                design.swap((r1, col), (r2, col))?;
                swaps += 1;
                let updated = state.score(criterion);
                let gain = updated.gain_over(&score);
                score = updated;
                if col == 0 {
                    first_gain = gain.unwrap_or(0.);
                } else if matches!(gain, Some(g) if g < self.params.eps * first_gain) {
                    log!(
                        level,
                        "Algorithm stopped when the change in the optimality criterion was less than {} times the first change",
                        self.params.eps
                    );
                    break 'sweeps StopReason::Converged;
                }
            }
            log!(level, "{sweeps} full sweeps completed");
        };

        log!(level, "Final Optimality Criterion {}", score.value());
        if !initial.is_better_than(&score) {
            Ok(OptimizationReport {
                initial,
                final_score: score,
                sweeps,
                swaps,
                stop_reason,
            })
        } else {
            Err(LhsError::InvalidDesign(format!(
                "optimization degraded the criterion from {} to {}",
                initial.value(),
                score.value()
            )))
        }
    }
}

/// Random latin hypercube improved by [`SweepOptimizer`].
///
/// The optimization runs on the integer strata, the jitter is drawn afterwards.
///
/// ```
/// use oalhs::{is_valid_lhs, optimum_lhs, OptimumParams, RandomStream};
///
/// let mut rng = RandomStream::from_seed(42);
/// let optimized = optimum_lhs(10, 2, &OptimumParams::default(), &mut rng).unwrap();
/// assert!(is_valid_lhs(&optimized.design));
/// assert!(optimized.report.final_score.value() <= optimized.report.initial.value());
/// ```
pub fn optimum_lhs<R: Rng>(
    n: usize,
    k: usize,
    params: &OptimumParams,
    rng: &mut RandomStream<R>,
) -> Result<OptimizedLhs> {
    params.check(n, k)?;
    if n == 1 {
        let score = Score::without_pairs(params.criterion);
        return Ok(OptimizedLhs {
            design: single_point(k, rng),
            report: OptimizationReport {
                initial: score,
                final_score: score,
                sweeps: 0,
                swaps: 0,
                stop_reason: StopReason::NoImprovement,
            },
        });
    }
    let mut strata = random_int_lhs(n, k, rng)?;
    let report = SweepOptimizer::new(*params).optimize(&mut strata)?;
    ensure_valid(&strata)?;
    Ok(OptimizedLhs {
        design: to_continuous(&strata, rng)?,
        report,
    })
}

/// Optimizes a caller supplied `n x k` design with [`SweepOptimizer`].
///
/// The values of `seed` are only exchanged within their columns, so a latin hypercube
/// seed gives a latin hypercube.
pub fn opt_seeded_lhs(
    n: usize,
    k: usize,
    seed: &Matrix<f64>,
    params: &OptimumParams,
) -> Result<OptimizedLhs> {
    params.check(n, k)?;
    if seed.shape() != (n, k) {
        return Err(LhsError::invalid(format!(
            "the seed design must be {n} x {k}, got {} x {}",
            seed.rows(),
            seed.cols()
        )));
    }
    if seed.iter().any(|v| !v.is_finite()) {
        return Err(LhsError::invalid("the seed design holds non finite values"));
    }
    let mut design = seed.clone();
    let report = SweepOptimizer::new(*params).optimize(&mut design)?;
    Ok(OptimizedLhs { design, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lhs::{is_valid_lhs, random_lhs};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_optimize_never_degrades() {
        for criterion in [Criterion::S, Criterion::Maximin] {
            for seed in 0..5 {
                let mut rng = RandomStream::from_seed(seed);
                let mut strata = random_int_lhs(12, 3, &mut rng).unwrap();
                let params = OptimumParams::default().criterion(criterion).max_sweeps(5);
                let report = SweepOptimizer::new(params).optimize(&mut strata).unwrap();
                assert!(is_valid_lhs(&strata));
                assert!(report.sweeps <= 5);
                assert!(!report.initial.is_better_than(&report.final_score));
                let rescored = Score::evaluate(criterion, &strata).unwrap();
                assert_abs_diff_eq!(rescored.value(), report.final_score.value(), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_optimize_improves_s() {
        let mut rng = RandomStream::from_seed(42);
        let mut strata = random_int_lhs(20, 2, &mut rng).unwrap();
        let report = SweepOptimizer::new(OptimumParams::default())
            .optimize(&mut strata)
            .unwrap();
        assert!(report.swaps > 0);
        assert!(report.final_score.is_better_than(&report.initial));
    }

    #[test]
    fn test_single_sweep_budget() {
        let mut rng = RandomStream::from_seed(7);
        let mut strata = random_int_lhs(15, 4, &mut rng).unwrap();
        let params = OptimumParams::default().max_sweeps(1).eps(1e-9);
        let report = SweepOptimizer::new(params).optimize(&mut strata).unwrap();
        assert_eq!(report.sweeps, 1);
        assert!(report.swaps <= 4);
    }

    #[test]
    fn test_optimum_lhs() {
        let mut rng = RandomStream::from_seed(42);
        let optimized = optimum_lhs(10, 3, &OptimumParams::default(), &mut rng).unwrap();
        assert_eq!(optimized.design.shape(), (10, 3));
        assert!(is_valid_lhs(&optimized.design));

        let single = optimum_lhs(1, 3, &OptimumParams::default(), &mut rng).unwrap();
        assert_eq!(single.design.shape(), (1, 3));
        assert_eq!(single.report.sweeps, 0);
    }

    #[test]
    fn test_optimum_lhs_rejects_bad_params() {
        let mut rng = RandomStream::from_seed(0);
        for params in [
            OptimumParams::default().eps(0.),
            OptimumParams::default().eps(f64::NAN),
            OptimumParams::default().max_sweeps(0),
        ] {
            assert!(matches!(
                optimum_lhs(5, 2, &params, &mut rng),
                Err(LhsError::InvalidParameter(_))
            ));
        }
    }

    #[cfg(feature = "serializable")]
    #[test]
    fn test_params_serde() {
        let params = OptimumParams::default().criterion(Criterion::Maximin).max_sweeps(7);
        let json = serde_json::to_string(&params).unwrap();
        let back: OptimumParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }

    #[test]
    fn test_opt_seeded_lhs() {
        let mut rng = RandomStream::from_seed(3);
        let seed = random_lhs(8, 2, false, &mut rng).unwrap();
        let optimized = opt_seeded_lhs(8, 2, &seed, &OptimumParams::default()).unwrap();
        assert!(is_valid_lhs(&optimized.design));
        for j in 0..2 {
            let mut before = seed.column_vec(j).unwrap();
            let mut after = optimized.design.column_vec(j).unwrap();
            before.sort_by(f64::total_cmp);
            after.sort_by(f64::total_cmp);
            assert_eq!(before, after);
        }
        assert!(opt_seeded_lhs(8, 3, &seed, &OptimumParams::default()).is_err());
    }
}
