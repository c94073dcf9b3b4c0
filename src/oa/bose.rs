use super::{check_factors, Construction, OaFamily, OrthogonalArray};
use crate::errors::Result;
use crate::gf::GaloisField;
use crate::matrix::Matrix;

/// Bose construction of OA(q², k, q, 2), `k <= q + 1`.
///
/// Row `(i, j)` holds `i`, `j`, then `j + i * c` for `c = 1..q`, in GF(q).
#[derive(Clone, Debug)]
pub struct Bose {
    field: GaloisField,
}

impl Bose {
    /// Bose construction over GF(q)
    pub fn try_new(q: u32) -> Result<Self> {
        Ok(Bose {
            field: GaloisField::new(q)?,
        })
    }
}

impl Construction for Bose {
    fn name(&self) -> &'static str {
        "Bose"
    }

    fn family(&self) -> OaFamily {
        OaFamily::Bose
    }

    fn levels(&self) -> u32 {
        self.field.order()
    }

    fn strength(&self) -> u32 {
        2
    }

    fn runs(&self) -> usize {
        (self.levels() as usize).pow(2)
    }

    fn max_factors(&self) -> usize {
        self.levels() as usize + 1
    }

    fn construct(&self, factors: usize) -> Result<OrthogonalArray> {
        check_factors(self.name(), factors, self.max_factors())?;
        let q = self.levels();
        let gf = &self.field;
        let mut a = Matrix::zeros(self.runs(), factors);
        for i in 0..q {
            for j in 0..q {
                let row = (i * q + j) as usize;
                for (col, v) in a.rowwise_mut(row)?.enumerate() {
                    *v = match col {
                        0 => i,
                        1 => j,
                        c => gf.sum(j, gf.prod(i, c as u32 - 1)),
                    };
                }
            }
        }
        Ok(OrthogonalArray::new(a, q, 2, OaFamily::Bose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LhsError;

    #[test]
    fn test_bose_l9() {
        let oa = Bose::try_new(3).unwrap().construct(4).unwrap();
        assert_eq!(oa.runs(), 9);
        assert_eq!(oa.factors(), 4);
        assert_eq!(oa.levels().row_vec(4).unwrap(), vec![1, 1, 2, 0]);
        assert!(oa.is_orthogonal(2).unwrap());
    }

    #[test]
    fn test_bose_extension_fields() {
        for q in [4, 8, 9] {
            let bose = Bose::try_new(q).unwrap();
            let oa = bose.construct(bose.max_factors()).unwrap();
            assert_eq!(oa.runs(), (q * q) as usize);
            assert!(oa.is_orthogonal(2).unwrap(), "Bose over GF({q})");
        }
    }

    #[test]
    fn test_bose_factor_limits() {
        let bose = Bose::try_new(5).unwrap();
        assert!(matches!(bose.construct(7), Err(LhsError::Construction(_))));
        assert!(matches!(bose.construct(0), Err(LhsError::Construction(_))));
        assert!(Bose::try_new(10).is_err());
    }
}
