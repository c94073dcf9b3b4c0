use super::{check_factors, Construction, OaFamily, OrthogonalArray};
use crate::errors::{LhsError, Result};
use crate::gf::GaloisField;
use crate::matrix::Matrix;

/// Addelman-Kempthorne construction of OA(2q², k, q, 2), `k <= 2q + 1`.
///
/// Available for odd prime powers `q` and for `q` in `{2, 4}`.
#[derive(Clone, Debug)]
pub struct AddelmanKempthorne {
    field: GaloisField,
}

/// Constants `kay`, `b`, `c`, `k` of the second half of the Addelman-Kempthorne arrays
pub(super) struct AkConstants {
    pub(super) kay: u32,
    pub(super) b: Vec<u32>,
    pub(super) c: Vec<u32>,
    pub(super) k: Vec<u32>,
}

/// GF(q) for an Addelman-Kempthorne array named `name`
pub(super) fn ak_field(name: &str, q: u32) -> Result<GaloisField> {
    let field = GaloisField::new(q)?;
    if field.characteristic() == 2 && q > 4 {
        return Err(LhsError::construction(format!(
            "the {name} design is only available for odd prime powers \
             and q <= 4, got q={q}"
        )));
    }
    Ok(field)
}

pub(super) fn ak_constants(gf: &GaloisField) -> Result<AkConstants> {
    let q = gf.order();
    let qs = q as usize;
    if gf.characteristic() == 2 {
        let (b, c) = match q {
            2 => (vec![0, 1], vec![0, 1]),
            _ => (vec![0, 2, 1, 3], vec![0, 2, 1, 3]),
        };
        return Ok(AkConstants {
            kay: 1,
            b,
            c,
            k: (0..q).collect(),
        });
    }
    // largest non square element
    let kay = (2..q)
        .rev()
        .find(|&i| gf.root()[i as usize].is_none())
        .ok_or_else(|| LhsError::construction(format!("no non square element in GF({q})")))?;
    let four = if gf.characteristic() == 3 { 1 } else { 4 };
    let num = gf.sum(kay, gf.characteristic() - 1);
    let inv_four = gf.inverse(four)?;
    let mut consts = AkConstants {
        kay,
        b: vec![0; qs],
        c: vec![0; qs],
        k: vec![0; qs],
    };
    for i in 1..q {
        let den = gf.prod(gf.prod(kay, four), i);
        let iu = i as usize;
        consts.b[iu] = gf.prod(num, gf.inverse(den)?);
        consts.k[iu] = gf.prod(kay, i);
        consts.c[iu] = gf.prod(gf.prod(gf.prod(i, i), num), inv_four);
    }
    Ok(consts)
}

impl AddelmanKempthorne {
    /// Addelman-Kempthorne construction over GF(q)
    pub fn try_new(q: u32) -> Result<Self> {
        let field = ak_field("Addelman-Kempthorne", q)?;
        Ok(AddelmanKempthorne { field })
    }
}

impl Construction for AddelmanKempthorne {
    fn name(&self) -> &'static str {
        "Addelman-Kempthorne"
    }

    fn family(&self) -> OaFamily {
        OaFamily::AddelmanKempthorne
    }

    fn levels(&self) -> u32 {
        self.field.order()
    }

    fn strength(&self) -> u32 {
        2
    }

    fn runs(&self) -> usize {
        2 * (self.levels() as usize).pow(2)
    }

    fn max_factors(&self) -> usize {
        2 * self.levels() as usize + 1
    }

    fn construct(&self, factors: usize) -> Result<OrthogonalArray> {
        check_factors(self.name(), factors, self.max_factors())?;
        let gf = &self.field;
        let q = gf.order();
        let half = (q * q) as usize;
        let consts = ak_constants(gf)?;
        let mut a = Matrix::zeros(self.runs(), self.max_factors());

        for i in 0..q {
            let square = gf.prod(i, i);
            for j in 0..q {
                let mut row = Vec::with_capacity(self.max_factors());
                row.push(j);
                row.extend((1..q).map(|m| gf.sum(i, gf.prod(m, j))));
                row.extend((0..q).map(|m| gf.sum(gf.sum(j, gf.prod(m, i)), square)));
                row.push(i);
                for (v, r) in a.rowwise_mut((i * q + j) as usize)?.zip(row) {
                    *v = r;
                }
            }
        }

        for i in 0..q {
            let ksquare = gf.prod(consts.kay, gf.prod(i, i));
            for j in 0..q {
                let first = (i * q + j) as usize;
                let mut row = Vec::with_capacity(self.max_factors());
                row.push(j);
                for m in 1..q {
                    row.push(gf.sum(a[(first, m as usize)], consts.b[m as usize]));
                }
                row.push(gf.sum(ksquare, j));
                for m in 1..q {
                    let t = gf.sum(j, gf.sum(ksquare, gf.prod(i, consts.k[m as usize])));
                    row.push(gf.sum(t, consts.c[m as usize]));
                }
                row.push(i);
                for (v, r) in a.rowwise_mut(half + first)?.zip(row) {
                    *v = r;
                }
            }
        }
        let levels = a.first_columns(factors)?;
        Ok(OrthogonalArray::new(
            levels,
            q,
            2,
            OaFamily::AddelmanKempthorne,
        ))
    }
}
