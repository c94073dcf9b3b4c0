use super::addelman::{ak_constants, ak_field};
use super::{check_factors, Construction, OaFamily, OrthogonalArray};
use crate::errors::Result;
use crate::gf::GaloisField;
use crate::matrix::Matrix;

/// Addelman-Kempthorne construction of OA(2q³, k, q, 2), `k <= 2q² + 2q + 1`.
///
/// Rows are indexed by `(x, y, z)` in GF(q)³, twice: the first half evaluates the
/// linear forms in `x, y, z` and the quadratic forms `x² + mx + y (+ nz)`, the second
/// half shifts them with the same constants as [`AddelmanKempthorne`](super::AddelmanKempthorne).
/// Available for odd prime powers `q` and for `q` in `{2, 4}`.
#[derive(Clone, Debug)]
pub struct AddelmanKempthorne3 {
    field: GaloisField,
}

impl AddelmanKempthorne3 {
    /// Three dimensional Addelman-Kempthorne construction over GF(q)
    pub fn try_new(q: u32) -> Result<Self> {
        let field = ak_field("Addelman-Kempthorne (n=3)", q)?;
        Ok(AddelmanKempthorne3 { field })
    }
}

impl Construction for AddelmanKempthorne3 {
    fn name(&self) -> &'static str {
        "Addelman-Kempthorne (n=3)"
    }

    fn family(&self) -> OaFamily {
        OaFamily::AddelmanKempthorne3
    }

    fn levels(&self) -> u32 {
        self.field.order()
    }

    fn strength(&self) -> u32 {
        2
    }

    fn runs(&self) -> usize {
        2 * (self.levels() as usize).pow(3)
    }

    fn max_factors(&self) -> usize {
        let q = self.levels() as usize;
        2 * q * q + 2 * q + 1
    }

    fn construct(&self, factors: usize) -> Result<OrthogonalArray> {
        check_factors(self.name(), factors, self.max_factors())?;
        let gf = &self.field;
        let q = gf.order();
        let cube = (q * q * q) as usize;
        let consts = ak_constants(gf)?;
        let mut a = Matrix::zeros(self.runs(), self.max_factors());

        for shifted in [false, true] {
            // b(m) shift of the linear forms, the quadratic forms use kx² + k(m)x + c(m)
            let b = |m: u32| if shifted { consts.b[m as usize] } else { 0 };
            let kx = |m: u32, x: u32| {
                if shifted {
                    gf.prod(consts.k[m as usize], x)
                } else {
                    gf.prod(m, x)
                }
            };
            let c = |m: u32| if shifted { consts.c[m as usize] } else { 0 };
            for x in 0..q {
                let square = gf.prod(x, x);
                let lead = if shifted {
                    gf.prod(consts.kay, square)
                } else {
                    square
                };
                for y in 0..q {
                    for z in 0..q {
                        let mut row = Vec::with_capacity(self.max_factors());
                        row.push(y);
                        row.extend((1..q).map(|m| gf.sum(gf.sum(x, gf.prod(m, y)), b(m))));
                        row.push(z);
                        row.extend((1..q).map(|m| gf.sum(gf.sum(x, gf.prod(m, z)), b(m))));
                        row.extend((1..q).map(|m| gf.sum(y, gf.prod(m, z))));
                        for m1 in 1..q {
                            let xy = gf.sum(x, gf.prod(m1, y));
                            row.extend((1..q).map(|m2| gf.sum(gf.sum(xy, gf.prod(m2, z)), b(m1))));
                        }
                        for w in [y, z] {
                            row.extend(
                                (0..q).map(|m| gf.sum(gf.sum(lead, gf.sum(w, kx(m, x))), c(m))),
                            );
                        }
                        for m1 in 0..q {
                            let base = gf.sum(lead, gf.sum(y, kx(m1, x)));
                            row.extend(
                                (1..q).map(|m2| gf.sum(gf.sum(base, gf.prod(m2, z)), c(m1))),
                            );
                        }
                        row.push(x);

                        let index = (x * q * q + y * q + z) as usize + if shifted { cube } else { 0 };
                        for (v, r) in a.rowwise_mut(index)?.zip(row) {
                            *v = r;
                        }
                    }
                }
            }
        }
        let levels = a.first_columns(factors)?;
        Ok(OrthogonalArray::new(
            levels,
            q,
            2,
            OaFamily::AddelmanKempthorne3,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LhsError;

    #[test]
    fn test_addelman_kempthorne3() {
        for q in [2, 3, 4, 5] {
            let ak = AddelmanKempthorne3::try_new(q).unwrap();
            let oa = ak.construct(ak.max_factors()).unwrap();
            assert_eq!(oa.runs(), 2 * (q * q * q) as usize);
            assert_eq!(oa.factors(), (2 * q * q + 2 * q + 1) as usize);
            assert!(oa.is_orthogonal(2).unwrap(), "GF({q})");
        }
    }

    #[test]
    fn test_addelman_kempthorne3_first_columns() {
        let ak = AddelmanKempthorne3::try_new(2).unwrap();
        let oa = ak.construct(6).unwrap();
        assert_eq!((oa.runs(), oa.factors()), (16, 6));
        assert!(oa.is_orthogonal(2).unwrap());
        assert_eq!(oa.family(), OaFamily::AddelmanKempthorne3);
    }

    #[test]
    fn test_addelman_kempthorne3_limits() {
        assert!(matches!(
            AddelmanKempthorne3::try_new(8),
            Err(LhsError::Construction(_))
        ));
        assert!(matches!(
            AddelmanKempthorne3::try_new(6),
            Err(LhsError::UnsupportedField { .. })
        ));
        let ak = AddelmanKempthorne3::try_new(3).unwrap();
        assert!(ak.construct(26).is_err());
        assert!(ak.construct(0).is_err());
    }
}
