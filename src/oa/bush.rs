use super::{check_factors, Construction, OaFamily, OrthogonalArray};
use crate::errors::{LhsError, Result};
use crate::gf::GaloisField;
use crate::matrix::Matrix;
use crate::utils::ipow;

/// Bush construction of OA(q^t, k, q, t), `t <= k <= q + 1`.
///
/// Row `i` reads the base-`q` digits of `i` as the coefficients of a polynomial of
/// degree `< t` over GF(q). The first column is its leading coefficient, column `1 + x`
/// its value at `x`.
#[derive(Clone, Debug)]
pub struct Bush {
    field: GaloisField,
    strength: u32,
    runs: usize,
}

impl Bush {
    /// Bush construction of strength `strength` over GF(q)
    pub fn try_new(q: u32, strength: u32) -> Result<Self> {
        if strength == 0 {
            return Err(LhsError::invalid("strength must be an integer > 0"));
        }
        let field = GaloisField::new(q)?;
        let runs = ipow(q, strength).ok_or_else(|| {
            LhsError::construction(format!("{q}^{strength} runs is too large"))
        })? as usize;
        Ok(Bush {
            field,
            strength,
            runs,
        })
    }
}

impl Construction for Bush {
    fn name(&self) -> &'static str {
        "Bush"
    }

    fn family(&self) -> OaFamily {
        OaFamily::Bush
    }

    fn levels(&self) -> u32 {
        self.field.order()
    }

    fn strength(&self) -> u32 {
        self.strength
    }

    fn runs(&self) -> usize {
        self.runs
    }

    fn max_factors(&self) -> usize {
        self.levels() as usize + 1
    }

    fn construct(&self, factors: usize) -> Result<OrthogonalArray> {
        check_factors(self.name(), factors, self.max_factors())?;
        if self.strength as usize > factors {
            return Err(LhsError::construction(format!(
                "an array of strength {} needs at least {} columns, {factors} were requested",
                self.strength, self.strength
            )));
        }
        let q = self.levels();
        let t = self.strength as usize;
        let gf = &self.field;
        let mut a = Matrix::zeros(self.runs, factors);
        let mut coef = vec![0u32; t];
        for i in 0..self.runs {
            let mut rest = i;
            for c in coef.iter_mut() {
                *c = (rest % q as usize) as u32;
                rest /= q as usize;
            }
            for (col, v) in a.rowwise_mut(i)?.enumerate() {
                *v = if col == 0 {
                    coef[t - 1]
                } else {
                    let x = col as u32 - 1;
                    // Horner
                    coef.iter().rev().fold(0, |acc, &c| gf.sum(gf.prod(acc, x), c))
                };
            }
        }
        Ok(OrthogonalArray::new(a, q, self.strength, OaFamily::Bush))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bush_strength_3() {
        let bush = Bush::try_new(3, 3).unwrap();
        assert_eq!(bush.runs(), 27);
        let oa = bush.construct(4).unwrap();
        assert_eq!(oa.factors(), 4);
        assert!(oa.is_orthogonal(3).unwrap());
        assert!(oa.is_orthogonal(2).unwrap());
    }

    #[test]
    fn test_bush_strength_2_over_gf4() {
        let oa = Bush::try_new(4, 2).unwrap().construct(5).unwrap();
        assert_eq!(oa.runs(), 16);
        assert!(oa.is_orthogonal(2).unwrap());
    }

    #[test]
    fn test_bush_strength_1() {
        let oa = Bush::try_new(5, 1).unwrap().construct(3).unwrap();
        assert_eq!(oa.runs(), 5);
        assert!(oa.is_orthogonal(1).unwrap());
    }

    #[test]
    fn test_bush_invalid() {
        assert!(Bush::try_new(3, 0).is_err());
        let bush = Bush::try_new(3, 3).unwrap();
        assert!(matches!(bush.construct(2), Err(LhsError::Construction(_))));
        assert!(matches!(bush.construct(5), Err(LhsError::Construction(_))));
    }
}
