//! Genetic search over a population of integer latin hypercubes.
//!
//! Every generation ranks the population, keeps the best design, crosses it with the
//! rest of the ranked population by exchanging whole columns, and mutates the offspring
//! by swapping two values within a column. Columns are only ever copied whole from a
//! latin hypercube or permuted, so every member stays a latin hypercube.
use super::basic::{random_int_lhs, single_point};
use super::convert::{ensure_valid, to_continuous};
use super::progress_level;
use crate::distance::{Criterion, Score};
use crate::errors::Result;
use crate::matrix::Matrix;
use crate::params::{as_i64, check_genetic};
use crate::random::RandomStream;
use log::log;
use ndarray_rand::rand::Rng;
use rayon::prelude::*;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Settings of the genetic search
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GeneticParams {
    /// Population size, even
    pub pop: usize,
    /// Number of generations
    pub gen: usize,
    /// Probability of a mutation in each column of an offspring
    pub p_mut: f64,
    /// Criterion ranking the population
    pub criterion: Criterion,
    /// Reports progress at info level instead of debug
    pub verbose: bool,
}

impl Default for GeneticParams {
    fn default() -> Self {
        GeneticParams {
            pop: 100,
            gen: 4,
            p_mut: 0.1,
            criterion: Criterion::S,
            verbose: false,
        }
    }
}

impl GeneticParams {
    /// Sets the population size
    pub fn pop(mut self, pop: usize) -> Self {
        self.pop = pop;
        self
    }

    /// Sets the number of generations
    pub fn gen(mut self, gen: usize) -> Self {
        self.gen = gen;
        self
    }

    /// Sets the mutation probability
    pub fn p_mut(mut self, p_mut: f64) -> Self {
        self.p_mut = p_mut;
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
}

fn copy_column(dst: &mut Matrix<u32>, dst_col: usize, src: &Matrix<u32>, src_col: usize) -> Result<()> {
    for (d, s) in dst.columnwise_mut(dst_col)?.zip(src.columnwise(src_col)?) {
        *d = *s;
    }
    Ok(())
}

/// Population indices, best first
fn rank(population: &[Matrix<u32>], criterion: Criterion) -> Result<Vec<usize>> {
    let scores = population
        .par_iter()
        .map(|design| Score::evaluate(criterion, design))
        .collect::<Result<Vec<_>>>()?;
    let mut ranking: Vec<usize> = (0..population.len()).collect();
    ranking.sort_by(|&a, &b| scores[a].cmp_quality(&scores[b]));
    Ok(ranking)
}

/// Integer design kept by the genetic search
fn genetic_strata<R: Rng>(
    n: usize,
    k: usize,
    params: &GeneticParams,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<u32>> {
    let level = progress_level(params.verbose);
    let pop = params.pop;
    let half = pop / 2;
    let mut population = (0..pop)
        .map(|_| random_int_lhs(n, k, rng))
        .collect::<Result<Vec<_>>>()?;

    for generation in 0..params.gen {
        let ranking = rank(&population, params.criterion)?;
        let best = &population[ranking[0]];
        let mut next: Vec<Matrix<u32>> = Vec::with_capacity(pop);
        next.extend(std::iter::repeat(best).take(half).cloned());
        if half == 1 {
            population = next;
            break;
        }
        next.extend(ranking[..half].iter().map(|&i| population[i].clone()));

        // the first half crosses the best design with the ranked designs, the second
        // half crosses the ranked designs with the best one
        let (head, tail) = next.split_at_mut(half);
        for i in 1..half {
            let to = rng.below(k)?;
            let from = rng.below(k)?;
            copy_column(&mut head[i], to, &tail[i], from)?;
        }
        for child in tail.iter_mut() {
            let to = rng.below(k)?;
            let from = rng.below(k)?;
            copy_column(child, to, best, from)?;
        }

        for child in next.iter_mut().skip(1) {
            for j in 0..k {
                if rng.uniform() <= params.p_mut {
                    let a = rng.below(n)?;
                    let b = rng.below(n)?;
                    child.swap((a, j), (b, j))?;
                }
            }
        }
        population = next;
        log!(level, "Generation {} completed", generation + 1);
    }

    let strata = population.swap_remove(0);
    Ok(strata)
}

/// Latin hypercube found by a genetic search over `params.pop` random designs.
///
/// ```
/// use oalhs::{genetic_lhs, is_valid_lhs, GeneticParams, RandomStream};
///
/// let mut rng = RandomStream::from_seed(42);
/// let params = GeneticParams::default().pop(10).gen(2);
/// let design = genetic_lhs(8, 2, &params, &mut rng).unwrap();
/// assert!(is_valid_lhs(&design));
/// ```
pub fn genetic_lhs<R: Rng>(
    n: usize,
    k: usize,
    params: &GeneticParams,
    rng: &mut RandomStream<R>,
) -> Result<Matrix<f64>> {
    check_genetic(
        as_i64(n),
        as_i64(k),
        as_i64(params.pop),
        as_i64(params.gen),
        params.p_mut,
    )?;
    if n == 1 {
        return Ok(single_point(k, rng));
    }
    let strata = genetic_strata(n, k, params, rng)?;
    ensure_valid(&strata)?;
    to_continuous(&strata, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::sum_inverse_distance;
    use crate::errors::LhsError;
    use crate::lhs::is_valid_lhs;

    #[test]
    fn test_rank() {
        let spread = Matrix::from_vec(3, 2, vec![0u32, 0, 1, 2, 2, 1]).unwrap();
        let diagonal = Matrix::from_vec(3, 2, vec![0u32, 0, 1, 1, 2, 2]).unwrap();
        let population = vec![diagonal, spread];
        assert_eq!(rank(&population, Criterion::S).unwrap(), vec![1, 0]);
        assert_eq!(rank(&population, Criterion::Maximin).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_genetic_lhs() {
        for criterion in [Criterion::S, Criterion::Maximin] {
            let mut rng = RandomStream::from_seed(42);
            let params = GeneticParams::default().pop(20).gen(3).criterion(criterion);
            let design = genetic_lhs(10, 3, &params, &mut rng).unwrap();
            assert_eq!(design.shape(), (10, 3));
            assert!(is_valid_lhs(&design));
        }
    }

    #[test]
    fn test_genetic_keeps_best() {
        let params = GeneticParams::default().pop(20).gen(4);
        let mut rng = RandomStream::from_seed(5);
        let strata = genetic_strata(12, 2, &params, &mut rng).unwrap();
        let mut rng = RandomStream::from_seed(5);
        let first = (0..20)
            .map(|_| random_int_lhs(12, 2, &mut rng).unwrap())
            .map(|d| sum_inverse_distance(&d).unwrap())
            .fold(f64::INFINITY, f64::min);
        assert!(sum_inverse_distance(&strata).unwrap() <= first);
    }

    #[test]
    fn test_population_of_two() {
        let mut rng = RandomStream::from_seed(1);
        let params = GeneticParams::default().pop(2).gen(3);
        assert!(is_valid_lhs(&genetic_lhs(5, 2, &params, &mut rng).unwrap()));
    }

    #[test]
    fn test_genetic_rejects_bad_params() {
        let mut rng = RandomStream::from_seed(1);
        for params in [
            GeneticParams::default().pop(3),
            GeneticParams::default().gen(0),
            GeneticParams::default().p_mut(1.5),
        ] {
            assert!(matches!(
                genetic_lhs(5, 2, &params, &mut rng),
                Err(LhsError::InvalidParameter(_))
            ));
        }
    }
}
