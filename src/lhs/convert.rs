//! Conversions between integer strata and continuous designs
use crate::errors::{LhsError, Result};
use crate::matrix::Matrix;
use crate::random::RandomStream;
use ndarray_rand::rand::Rng;

/// Value of `stratum` jittered by `u` in `(0, 1)`, strictly inside `[s/n, (s+1)/n)`.
///
/// Falls back to the bin centre when rounding would push the value onto a bin edge.
pub(crate) fn place_in_bin(stratum: u32, n: usize, u: f64) -> f64 {
    let nf = n as f64;
    let s = stratum as f64;
    let v = (s + u) / nf;
    if v > s / nf && (v * nf).floor() == s {
        v
    } else {
        (s + 0.5) / nf
    }
}

/// Jitters every stratum of an integer design inside its bin.
///
/// Draws are taken column after column. Every value must be a stratum below the number
/// of rows.
pub fn to_continuous<R: Rng>(strata: &Matrix<u32>, rng: &mut RandomStream<R>) -> Result<Matrix<f64>> {
    let (n, k) = strata.shape();
    let mut design = Matrix::zeros(n, k);
    for j in 0..k {
        for i in 0..n {
            let s = strata[(i, j)];
            if s as usize >= n {
                return Err(LhsError::OutOfRange {
                    row: s as usize,
                    col: j,
                    rows: n,
                    cols: k,
                });
            }
            design[(i, j)] = place_in_bin(s, n, rng.open_uniform());
        }
    }
    Ok(design)
}

/// Strata `floor(v * n)` of a continuous design with values in `[0, 1]`, `1` falling in
/// the last stratum
pub fn to_strata(design: &Matrix<f64>) -> Result<Matrix<u32>> {
    let n = design.rows();
    let nf = n as f64;
    let mut strata = Matrix::zeros(n, design.cols());
    for (s, &v) in strata.as_mut_slice().iter_mut().zip(design.iter()) {
        if !(0. ..=1.).contains(&v) {
            return Err(LhsError::InvalidDesign(format!(
                "value {v} is outside of [0, 1]"
            )));
        }
        *s = ((v * nf).floor() as u32).min(n.saturating_sub(1) as u32);
    }
    Ok(strata)
}

fn is_permutation<'a>(column: impl Iterator<Item = &'a u32>, n: usize) -> bool {
    let mut seen = vec![false; n];
    for &s in column {
        match seen.get_mut(s as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    seen.into_iter().all(|b| b)
}

/// Designs whose columns can be checked for the latin hypercube property
pub trait LatinHypercube {
    /// True when every column holds each of the `n` strata exactly once
    fn is_latin_hypercube(&self) -> bool;
}

impl LatinHypercube for Matrix<u32> {
    fn is_latin_hypercube(&self) -> bool {
        let n = self.rows();
        (0..self.cols()).all(|j| {
            self.columnwise(j)
                .map(|col| is_permutation(col, n))
                .unwrap_or(false)
        })
    }
}

impl LatinHypercube for Matrix<f64> {
    fn is_latin_hypercube(&self) -> bool {
        to_strata(self)
            .map(|s| s.is_latin_hypercube())
            .unwrap_or(false)
    }
}

/// True when every column of `design` is a permutation of the strata
///
/// ```
/// use oalhs::{is_valid_lhs, Matrix};
///
/// let strata = Matrix::from_vec(3, 2, vec![0u32, 2, 1, 0, 2, 1]).unwrap();
/// assert!(is_valid_lhs(&strata));
/// ```
pub fn is_valid_lhs<D: LatinHypercube>(design: &D) -> bool {
    design.is_latin_hypercube()
}

/// Post condition of every generator
pub(crate) fn ensure_valid<D: LatinHypercube>(design: &D) -> Result<()> {
    if design.is_latin_hypercube() {
        Ok(())
    } else {
        Err(LhsError::InvalidDesign(
            "a column does not hold every stratum exactly once".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_in_bin() {
        for n in [1, 3, 10, 1000] {
            for s in 0..n.min(10) as u32 {
                for u in [1e-300, 0.25, 0.5, 1. - f64::EPSILON] {
                    let v = place_in_bin(s, n, u);
                    assert_eq!((v * n as f64).floor() as u32, s);
                    assert!(v > 0. && v < 1.);
                }
            }
        }
    }

    #[test]
    fn test_to_continuous_and_back() {
        let strata = Matrix::from_vec(4, 2, vec![3u32, 0, 1, 2, 0, 3, 2, 1]).unwrap();
        let mut rng = RandomStream::from_seed(5);
        let design = to_continuous(&strata, &mut rng).unwrap();
        assert_eq!(to_strata(&design).unwrap(), strata);
        assert!(is_valid_lhs(&design));

        let bad = Matrix::from_vec(2, 1, vec![0u32, 2]).unwrap();
        assert!(to_continuous(&bad, &mut rng).is_err());
    }

    #[test]
    fn test_to_strata_edges() {
        let design = Matrix::from_vec(2, 1, vec![1., 0.]).unwrap();
        assert_eq!(to_strata(&design).unwrap().as_slice(), &[1, 0]);
        let design = Matrix::from_vec(2, 1, vec![1.5, 0.]).unwrap();
        assert!(matches!(to_strata(&design), Err(LhsError::InvalidDesign(_))));
    }

    #[test]
    fn test_validity() {
        let ok = Matrix::from_vec(3, 2, vec![0u32, 1, 1, 2, 2, 0]).unwrap();
        assert!(is_valid_lhs(&ok));
        let repeated = Matrix::from_vec(3, 2, vec![0u32, 1, 0, 2, 2, 0]).unwrap();
        assert!(!is_valid_lhs(&repeated));
        let out = Matrix::from_vec(2, 1, vec![0u32, 2]).unwrap();
        assert!(!is_valid_lhs(&out));
        assert!(ensure_valid(&repeated).is_err());
        let continuous = Matrix::from_vec(2, 1, vec![0.2, 0.3]).unwrap();
        assert!(!is_valid_lhs(&continuous));
    }
}
