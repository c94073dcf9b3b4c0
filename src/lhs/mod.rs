//! Latin hypercube generation and optimization.
//!
//! A latin hypercube of `n` points in `k` dimensions divides every dimension into `n`
//! strata and places exactly one point in each stratum of each dimension. Integer designs
//! hold the zero-based strata, continuous designs hold values in `(0, 1)`.
mod basic;
mod candidate;
mod convert;
mod ese;
mod genetic;
mod oalhs;
mod optimum;

pub use basic::{centered_lhs, random_int_lhs, random_lhs};
pub use candidate::{improved_lhs, maximin_lhs};
pub use convert::{is_valid_lhs, to_continuous, to_strata, LatinHypercube};
pub use ese::{ese_lhs, EseParams};
pub use genetic::{genetic_lhs, GeneticParams};
pub use oalhs::{create_oalhs, oa_to_lhs, OaLhs};
pub use optimum::{
    opt_seeded_lhs, optimum_lhs, OptimizationReport, OptimizedLhs, OptimumParams, StopReason,
    SweepOptimizer,
};

use crate::errors::{LhsError, Result};
use crate::random::RandomStream;
use crate::SamplingMethod;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Level of the progress messages
pub(crate) fn progress_level(verbose: bool) -> log::Level {
    if verbose {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

/// Kinds of Latin Hypercube Design
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsKind {
    /// sample is choosen randomly within its latin hypercube intervals
    Classic,
    /// sample is the middle of its latin hypercube intervals
    Centered,
    /// points are added one by one, each close to the optimal spacing
    Improved {
        /// candidate pool multiplier
        dup: usize,
    },
    /// points are added one by one, each as far as possible from the previous ones
    Maximin {
        /// candidate pool multiplier
        dup: usize,
    },
    /// random design improved by greedy column sweeps
    Optimum(OptimumParams),
    /// best design of a genetic search
    Genetic(GeneticParams),
    /// samples locations is optimized using the Enhanced Stochastic Evolutionary algorithm (ESE)
    /// See Jin, R. and Chen, W. and Sudjianto, A. (2005), “An efficient algorithm for constructing
    /// optimal design of computer experiments.” Journal of Statistical Planning and Inference, 134:268-287.
    Optimized,
}

/// The LHS design is built as follows: each dimension space is divided into ns sections
/// where ns is the number of sampling points, and one point in selected in each section.
/// The selection method gives different kind of LHS (see [LhsKind])
///
/// ```
/// use oalhs::{Lhs, LhsKind, SamplingMethod};
/// use ndarray::arr2;
///
/// let xlimits = arr2(&[[5., 10.], [0., 1.]]);
/// let doe = Lhs::new(&xlimits).kind(LhsKind::Classic).seed(42).sample(5).unwrap();
/// assert_eq!(doe.dim(), (5, 2));
/// ```
///
/// The random generator is shared by the clones of a `Lhs` and advances with every
/// sample, successive samples are therefore different designs.
#[derive(Clone, Debug)]
pub struct Lhs<R: Rng + Clone = Xoshiro256Plus> {
    /// Sampling space definition as a (nx, 2) matrix
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of x
    xlimits: Array2<f64>,
    /// The requested kind of LHS
    kind: LhsKind,
    /// Progress messages at info level
    verbose: bool,
    /// Random generator used for reproducibility
    rng: Arc<RwLock<R>>,
}

/// LHS with default random generator
impl Lhs<Xoshiro256Plus> {
    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// The generator is seeded from entropy, see [Lhs::seed] for reproducible designs.
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Self {
        Self::new_with_rng(xlimits, Xoshiro256Plus::from_entropy())
    }

    /// Seeds the default generator
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(RwLock::new(Xoshiro256Plus::seed_from_u64(seed)));
        self
    }
}

impl<R: Rng + Clone> SamplingMethod for Lhs<R> {
    fn sampling_space(&self) -> &Array2<f64> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Result<Array2<f64>> {
        if self.xlimits.ncols() != 2 {
            return Err(LhsError::DimensionMismatch {
                expected: 2,
                actual: self.xlimits.ncols(),
            });
        }
        let nx = self.xlimits.nrows();
        let mut generator = self.rng.write().unwrap_or_else(PoisonError::into_inner);
        let mut rng = RandomStream::with_rng(&mut *generator);
        let doe = match self.kind {
            LhsKind::Classic => random_lhs(ns, nx, false, &mut rng)?,
            LhsKind::Centered => centered_lhs(ns, nx, &mut rng)?,
            LhsKind::Improved { dup } => improved_lhs(ns, nx, dup, &mut rng)?,
            LhsKind::Maximin { dup } => maximin_lhs(ns, nx, dup, &mut rng)?,
            LhsKind::Optimum(params) => {
                let params = OptimumParams {
                    verbose: params.verbose || self.verbose,
                    ..params
                };
                optimum_lhs(ns, nx, &params, &mut rng)?.design
            }
            LhsKind::Genetic(params) => {
                let params = GeneticParams {
                    verbose: params.verbose || self.verbose,
                    ..params
                };
                genetic_lhs(ns, nx, &params, &mut rng)?
            }
            LhsKind::Optimized => {
                let doe = random_lhs(ns, nx, false, &mut rng)?;
                ese_lhs(&doe, &EseParams::for_dim(nx), &mut rng)?
            }
        };
        Ok(Array2::try_from(doe)?)
    }
}

impl<R: Rng + Clone> Lhs<R> {
    /// Constructor with given design space and random generator.
    /// * `xlimits`: (nx, 2) matrix where nx is the dimension of the samples and the ith row
    /// is the definition interval of the ith component of x.
    /// * `rng`: random generator
    pub fn new_with_rng(xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>, rng: R) -> Self {
        Lhs {
            xlimits: xlimits.to_owned(),
            kind: LhsKind::Optimized,
            verbose: false,
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Reports optimization progress at info level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Lhs<R2> {
        Lhs {
            xlimits: self.xlimits,
            kind: self.kind,
            verbose: self.verbose,
            rng: Arc::new(RwLock::new(rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Criterion;
    use crate::matrix::Matrix;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, Axis};

    fn kinds() -> Vec<LhsKind> {
        vec![
            LhsKind::Classic,
            LhsKind::Centered,
            LhsKind::Improved { dup: 2 },
            LhsKind::Maximin { dup: 2 },
            LhsKind::Optimum(OptimumParams::default()),
            LhsKind::Optimum(OptimumParams::default().criterion(Criterion::Maximin)),
            LhsKind::Genetic(GeneticParams::default().pop(10).gen(2)),
            LhsKind::Optimized,
        ]
    }

    #[test]
    fn test_lhs_kinds() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        for kind in kinds() {
            let doe = Lhs::new(&xlimits).kind(kind).seed(42).sample(7).unwrap();
            assert_eq!(doe.dim(), (7, 2), "{kind:?}");
            for row in doe.axis_iter(Axis(0)) {
                assert!(row[0] > 5. && row[0] < 10.);
                assert!(row[1] > 0. && row[1] < 1.);
            }
            let unit = Lhs::new(&xlimits)
                .kind(kind)
                .seed(42)
                .normalized_sample(7)
                .unwrap();
            assert!(is_valid_lhs(&Matrix::from(unit)), "{kind:?}");
        }
    }

    #[test]
    fn test_lhs_is_reproducible() {
        let xlimits = arr2(&[[0., 1.], [0., 1.], [-1., 1.]]);
        let a = Lhs::new(&xlimits).seed(42).sample(6).unwrap();
        let b = Lhs::new(&xlimits).seed(42).sample(6).unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        let c = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(6)
            .unwrap();
        assert_abs_diff_eq!(a, c, epsilon = 1e-12);
    }

    #[test]
    fn test_lhs_generator_advances() {
        let xlimits = arr2(&[[0., 1.], [0., 1.]]);
        let lhs = Lhs::new(&xlimits).kind(LhsKind::Classic).seed(42);
        let first = lhs.sample(6).unwrap();
        let second = lhs.sample(6).unwrap();
        assert_ne!(first, second);

        // a fresh generator with the same seed replays the same sequence
        let replay = Lhs::new(&xlimits).kind(LhsKind::Classic).seed(42);
        assert_eq!(replay.sample(6).unwrap(), first);
        assert_eq!(replay.sample(6).unwrap(), second);

        let lhs = Lhs::new(&xlimits).kind(LhsKind::Classic);
        assert_ne!(lhs.sample(6).unwrap(), lhs.sample(6).unwrap());
    }

    #[test]
    fn test_centered_lhs_sample() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        let doe = Lhs::new(&xlimits)
            .kind(LhsKind::Centered)
            .seed(0)
            .sample(5)
            .unwrap();
        let mut first: Vec<f64> = doe.column(0).to_vec();
        first.sort_by(f64::total_cmp);
        assert_abs_diff_eq!(
            ndarray::Array1::from(first),
            ndarray::array![5.5, 6.5, 7.5, 8.5, 9.5],
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_lhs_errors() {
        let bad = arr2(&[[0., 1., 2.]]);
        assert!(matches!(
            Lhs::new(&bad).sample(3),
            Err(LhsError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        let xlimits = arr2(&[[0., 1.]]);
        assert!(matches!(
            Lhs::new(&xlimits).sample(0),
            Err(LhsError::InvalidParameter(_))
        ));
        assert!(Lhs::new(&xlimits)
            .kind(LhsKind::Genetic(GeneticParams::default().pop(3)))
            .sample(4)
            .is_err());
    }
}
