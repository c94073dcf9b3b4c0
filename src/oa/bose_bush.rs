use super::{check_factors, Construction, OaFamily, OrthogonalArray};
use crate::errors::{LhsError, Result};
use crate::gf::GaloisField;
use crate::matrix::Matrix;
use crate::utils::prime_power;

/// Rows `(i, k)` of the Bose-Bush array with `s` symbols over GF(λs): column `j < λs`
/// holds `(i * j mod s) + k`, the last column `i mod s`
fn bose_bush_levels(gf: &GaloisField, s: u32, factors: usize) -> Result<Matrix<u32>> {
    let q_star = gf.order();
    let runs = (q_star * s) as usize;
    let mut full = Matrix::zeros(runs, q_star as usize + 1);
    let mut row = 0;
    for i in 0..q_star {
        for k in 0..s {
            for (j, v) in full.rowwise_mut(row)?.enumerate() {
                *v = if j < q_star as usize {
                    gf.sum(gf.prod(i, j as u32) % s, k)
                } else {
                    i % s
                };
            }
            row += 1;
        }
    }
    full.first_columns(factors)
}

/// Bose-Bush construction of OA(2q², k, q, 2) for `q = 2^m`, `k <= 2q + 1`.
///
/// Built over GF(2q): the product `i * j` is folded into `0..q` and shifted by each
/// symbol `s` of GF(q) viewed inside GF(2q).
#[derive(Clone, Debug)]
pub struct BoseBush {
    q: u32,
    field: GaloisField,
}

impl BoseBush {
    /// Bose-Bush construction with `q` symbols, `q` a power of 2
    pub fn try_new(q: u32) -> Result<Self> {
        if q < 2 || !q.is_power_of_two() {
            return Err(LhsError::construction(format!(
                "the Bose-Bush design needs q = 2^m, got q={q}"
            )));
        }
        Ok(BoseBush {
            q,
            field: GaloisField::new(2 * q)?,
        })
    }
}

impl Construction for BoseBush {
    fn name(&self) -> &'static str {
        "Bose-Bush"
    }

    fn family(&self) -> OaFamily {
        OaFamily::BoseBush
    }

    fn levels(&self) -> u32 {
        self.q
    }

    fn strength(&self) -> u32 {
        2
    }

    fn runs(&self) -> usize {
        2 * (self.q as usize).pow(2)
    }

    fn max_factors(&self) -> usize {
        2 * self.q as usize + 1
    }

    fn construct(&self, factors: usize) -> Result<OrthogonalArray> {
        check_factors(self.name(), factors, self.max_factors())?;
        let levels = bose_bush_levels(&self.field, self.q, factors)?;
        Ok(OrthogonalArray::new(levels, self.q, 2, OaFamily::BoseBush))
    }
}

/// Bose-Bush construction of OA(λq², k, q, 2), `k <= λq + 1`.
///
/// `λ` and `q` must be powers of the same prime; the array is built over GF(λq).
/// `λ = 2` gives the [`BoseBush`] arrays.
#[derive(Clone, Debug)]
pub struct BoseBushLambda {
    q: u32,
    lambda: u32,
    field: GaloisField,
}

impl BoseBushLambda {
    /// Bose-Bush construction with `q` symbols, each pair of symbols appearing `lambda`
    /// times in any two columns
    pub fn try_new(lambda: u32, q: u32) -> Result<Self> {
        let (pq, _) = prime_power(q).ok_or_else(|| {
            LhsError::construction(format!(
                "the Bose-Bush design needs q to be a prime power, got q={q}"
            ))
        })?;
        let (pl, _) = prime_power(lambda).ok_or_else(|| {
            LhsError::construction(format!(
                "the Bose-Bush design needs lambda to be a prime power, got lambda={lambda}"
            ))
        })?;
        if pl != pq {
            return Err(LhsError::construction(format!(
                "the Bose-Bush design needs lambda and q to be powers of the same prime, \
                 got lambda={lambda} and q={q}"
            )));
        }
        let order = lambda.checked_mul(q).ok_or_else(|| {
            LhsError::construction(format!("lambda={lambda} times q={q} is too large"))
        })?;
        Ok(BoseBushLambda {
            q,
            lambda,
            field: GaloisField::new(order)?,
        })
    }

    /// Number of times each pair of symbols appears in two columns
    pub fn lambda(&self) -> u32 {
        self.lambda
    }
}

impl Construction for BoseBushLambda {
    fn name(&self) -> &'static str {
        "Bose-Bush (lambda)"
    }

    fn family(&self) -> OaFamily {
        OaFamily::BoseBushLambda
    }

    fn levels(&self) -> u32 {
        self.q
    }

    fn strength(&self) -> u32 {
        2
    }

    fn runs(&self) -> usize {
        self.lambda as usize * (self.q as usize).pow(2)
    }

    fn max_factors(&self) -> usize {
        (self.lambda * self.q) as usize + 1
    }

    fn construct(&self, factors: usize) -> Result<OrthogonalArray> {
        check_factors(self.name(), factors, self.max_factors())?;
        let levels = bose_bush_levels(&self.field, self.q, factors)?;
        Ok(OrthogonalArray::new(levels, self.q, 2, OaFamily::BoseBushLambda))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bose_bush_q2() {
        let bb = BoseBush::try_new(2).unwrap();
        let oa = bb.construct(bb.max_factors()).unwrap();
        assert_eq!((oa.runs(), oa.factors()), (8, 5));
        assert!(oa.levels().iter().all(|&v| v < 2));
        assert!(oa.is_orthogonal(2).unwrap());
    }

    #[test]
    fn test_bose_bush_q4() {
        let bb = BoseBush::try_new(4).unwrap();
        let oa = bb.construct(9).unwrap();
        assert_eq!(oa.runs(), 32);
        assert!(oa.is_orthogonal(2).unwrap());
        let oa = bb.construct(3).unwrap();
        assert_eq!(oa.factors(), 3);
        assert!(oa.is_orthogonal(2).unwrap());
    }

    #[test]
    fn test_bose_bush_q8() {
        let bb = BoseBush::try_new(8).unwrap();
        let oa = bb.construct(bb.max_factors()).unwrap();
        assert_eq!((oa.runs(), oa.factors()), (128, 17));
        assert!(oa.balance(2).unwrap().is_balanced());
    }

    #[test]
    fn test_bose_bush_lambda() {
        for (lambda, q) in [(2, 2), (4, 2), (2, 4), (3, 3), (9, 3), (3, 9), (5, 5)] {
            let bb = BoseBushLambda::try_new(lambda, q).unwrap();
            let oa = bb.construct(bb.max_factors()).unwrap();
            assert_eq!(oa.runs(), (lambda * q * q) as usize);
            assert_eq!(oa.factors(), (lambda * q + 1) as usize);
            assert!(oa.levels().iter().all(|&v| v < q));
            assert!(oa.is_orthogonal(2).unwrap(), "lambda={lambda} q={q}");
        }
    }

    #[test]
    fn test_bose_bush_lambda_matches_bose_bush() {
        let bb = BoseBush::try_new(4).unwrap().construct(9).unwrap();
        let bbl = BoseBushLambda::try_new(2, 4).unwrap().construct(9).unwrap();
        assert_eq!(bb.levels(), bbl.levels());
    }

    #[test]
    fn test_bose_bush_lambda_rejects_mixed_primes() {
        assert!(matches!(
            BoseBushLambda::try_new(2, 3),
            Err(LhsError::Construction(_))
        ));
        assert!(BoseBushLambda::try_new(6, 2).is_err());
        assert!(BoseBushLambda::try_new(3, 3).unwrap().construct(11).is_err());
    }

    #[test]
    fn test_bose_bush_rejects_odd_q() {
        assert!(BoseBush::try_new(3).is_err());
        assert!(BoseBush::try_new(6).is_err());
        assert!(BoseBush::try_new(2).unwrap().construct(6).is_err());
    }
}
