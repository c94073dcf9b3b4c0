//! Galois field arithmetic over GF(q), q a prime power.
//!
//! Element `i` of GF(p^m) is the polynomial of degree `< m` whose coefficients are the
//! base-`p` digits of `i` (lowest degree first). Sums are taken digit-wise modulo `p`,
//! products are reduced with a fixed expression of `x^m` as a polynomial of lower degree.
//! All tables are computed once in [`GaloisField::new`] and never modified afterwards,
//! so a field may be shared read-only between threads.
use crate::errors::{LhsError, Result};
use crate::matrix::Matrix;
use crate::utils::prime_power;

/// Largest prime order handled for prime fields
pub const MAX_PRIME_ORDER: u32 = 1024;

/// `x^m = sum(xton[j] x^j)` for the supported extension fields GF(p^m)
fn reduction_polynomial(p: u32, m: u32) -> Option<&'static [u32]> {
    let xton: &'static [u32] = match (p, m) {
        (2, 2) => &[1, 1],
        (2, 3) => &[1, 0, 1],
        (2, 4) => &[1, 0, 0, 1],
        (2, 5) => &[1, 0, 0, 1, 0],
        (2, 6) => &[1, 0, 0, 0, 0, 1],
        (2, 7) => &[1, 0, 0, 0, 0, 0, 1],
        (2, 8) => &[1, 0, 0, 0, 1, 1, 1, 0],
        (2, 9) => &[1, 0, 0, 0, 0, 1, 0, 0, 0],
        (2, 10) => &[1, 0, 0, 0, 0, 0, 0, 1, 0, 0],
        (3, 2) => &[1, 2],
        (3, 3) => &[2, 0, 1],
        (3, 4) => &[1, 0, 0, 2],
        (3, 5) => &[2, 0, 2, 0, 2],
        (3, 6) => &[1, 0, 0, 0, 0, 2],
        (5, 2) => &[3, 4],
        (5, 3) => &[3, 0, 4],
        (5, 4) => &[2, 4, 0, 4],
        (7, 2) => &[4, 6],
        (7, 3) => &[5, 6, 6],
        (11, 2) => &[4, 10],
        (13, 2) => &[11, 12],
        (17, 2) => &[14, 16],
        (19, 2) => &[17, 18],
        (23, 2) => &[16, 22],
        (29, 2) => &[26, 28],
        (31, 2) => &[19, 30],
        _ => return None,
    };
    Some(xton)
}

/// True when [`GaloisField::new`] can build GF(q)
pub(crate) fn is_supported_order(q: u32) -> bool {
    match prime_power(q) {
        Some((p, 1)) => p <= MAX_PRIME_ORDER,
        Some((p, m)) => reduction_polynomial(p, m).is_some(),
        None => false,
    }
}

/// Finite field of order `q = p^m` with precomputed operation tables
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaloisField {
    q: u32,
    p: u32,
    degree: u32,
    xton: Vec<u32>,
    plus: Matrix<u32>,
    times: Matrix<u32>,
    neg: Vec<u32>,
    inv: Vec<Option<u32>>,
    root: Vec<Option<u32>>,
}

impl GaloisField {
    /// Builds GF(q).
    ///
    /// Fails with [`LhsError::UnsupportedField`] when `q < 2`, when `q` is not a prime
    /// power, when `q` is a prime above [`MAX_PRIME_ORDER`] or when no reduction
    /// polynomial is tabulated for the extension field.
    ///
    /// ```
    /// use oalhs::GaloisField;
    ///
    /// let gf = GaloisField::new(4).unwrap();
    /// // x * x = x + 1 in GF(4)
    /// assert_eq!(gf.multiply(2, 2).unwrap(), 3);
    /// ```
    pub fn new(q: u32) -> Result<Self> {
        if q < 2 {
            return Err(LhsError::unsupported_field(
                q,
                "a field needs at least 2 elements",
            ));
        }
        let (p, m) = prime_power(q)
            .ok_or_else(|| LhsError::unsupported_field(q, "not a prime power"))?;
        let xton: Vec<u32> = if m == 1 {
            if p > MAX_PRIME_ORDER {
                return Err(LhsError::unsupported_field(
                    q,
                    format!("prime fields are limited to p <= {MAX_PRIME_ORDER}"),
                ));
            }
            vec![0]
        } else {
            reduction_polynomial(p, m)
                .ok_or_else(|| {
                    LhsError::unsupported_field(
                        q,
                        format!("GF({p}^{m}) has no tabulated reduction polynomial"),
                    )
                })?
                .to_vec()
        };
        Self::from_reduction(p, m, xton)
    }

    fn from_reduction(p: u32, m: u32, xton: Vec<u32>) -> Result<Self> {
        let q = p.pow(m);
        let qs = q as usize;
        let polys: Vec<Vec<u64>> = (0..q).map(|i| to_poly(i, p, m)).collect();

        let mut plus = Matrix::zeros(qs, qs);
        let mut times = Matrix::zeros(qs, qs);
        for i in 0..qs {
            for j in 0..qs {
                let sum: Vec<u64> = polys[i]
                    .iter()
                    .zip(&polys[j])
                    .map(|(a, b)| (a + b) % p as u64)
                    .collect();
                plus[(i, j)] = from_poly(&sum, p);
                times[(i, j)] = from_poly(&poly_product(&polys[i], &polys[j], &xton, p), p);
            }
        }

        let mut neg = Vec::with_capacity(qs);
        let mut inv = Vec::with_capacity(qs);
        for i in 0..qs {
            let n = (0..qs).find(|&j| plus[(i, j)] == 0).ok_or_else(|| {
                LhsError::unsupported_field(q, format!("element {i} has no negative"))
            })?;
            neg.push(n as u32);
            let r = (0..qs).find(|&j| times[(i, j)] == 1).map(|j| j as u32);
            if i > 0 && r.is_none() {
                return Err(LhsError::unsupported_field(
                    q,
                    format!("element {i} has no reciprocal"),
                ));
            }
            inv.push(r);
        }
        let mut root = vec![None; qs];
        for j in 0..qs {
            root[times[(j, j)] as usize] = Some(j as u32);
        }

        Ok(GaloisField {
            q,
            p,
            degree: m,
            xton,
            plus,
            times,
            neg,
            inv,
            root,
        })
    }

    /// Number of elements `q`
    pub fn order(&self) -> u32 {
        self.q
    }

    /// Prime `p` with `q = p^m`
    pub fn characteristic(&self) -> u32 {
        self.p
    }

    /// Exponent `m` with `q = p^m`
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Coefficients of `x^m` as a polynomial of degree `< m`
    pub fn reduction(&self) -> &[u32] {
        &self.xton
    }

    /// Addition table
    pub fn plus(&self) -> &Matrix<u32> {
        &self.plus
    }

    /// Multiplication table
    pub fn times(&self) -> &Matrix<u32> {
        &self.times
    }

    /// Additive inverse of each element
    pub fn neg(&self) -> &[u32] {
        &self.neg
    }

    /// Multiplicative inverse of each element, `None` for zero
    pub fn inv(&self) -> &[Option<u32>] {
        &self.inv
    }

    /// A square root of each element, `None` for non squares
    pub fn root(&self) -> &[Option<u32>] {
        &self.root
    }

    fn check(&self, a: u32) -> Result<usize> {
        if a >= self.q {
            return Err(LhsError::OutOfRange {
                row: a as usize,
                col: 0,
                rows: self.q as usize,
                cols: 1,
            });
        }
        Ok(a as usize)
    }

    /// `a + b`
    pub fn add(&self, a: u32, b: u32) -> Result<u32> {
        self.plus.get(a as usize, b as usize)
    }

    /// `a - b`
    pub fn sub(&self, a: u32, b: u32) -> Result<u32> {
        let nb = self.negate(b)?;
        self.add(a, nb)
    }

    /// `a * b`
    pub fn multiply(&self, a: u32, b: u32) -> Result<u32> {
        self.times.get(a as usize, b as usize)
    }

    /// `-a`
    pub fn negate(&self, a: u32) -> Result<u32> {
        Ok(self.neg[self.check(a)?])
    }

    /// `1 / a`, fails for `a == 0`
    pub fn inverse(&self, a: u32) -> Result<u32> {
        self.inv[self.check(a)?]
            .ok_or_else(|| LhsError::invalid("0 has no multiplicative inverse"))
    }

    /// A square root of `a` when `a` is a square
    pub fn sqrt(&self, a: u32) -> Result<Option<u32>> {
        Ok(self.root[self.check(a)?])
    }

    /// Table lookup for indices already known to be field elements
    pub(crate) fn sum(&self, a: u32, b: u32) -> u32 {
        self.plus[(a as usize, b as usize)]
    }

    /// Table lookup for indices already known to be field elements
    pub(crate) fn prod(&self, a: u32, b: u32) -> u32 {
        self.times[(a as usize, b as usize)]
    }
}

/// Base-`p` digits of `i`, lowest degree first
fn to_poly(mut i: u32, p: u32, m: u32) -> Vec<u64> {
    (0..m)
        .map(|_| {
            let d = i % p;
            i /= p;
            d as u64
        })
        .collect()
}

fn from_poly(poly: &[u64], p: u32) -> u32 {
    poly.iter()
        .rev()
        .fold(0u64, |acc, &c| acc * p as u64 + c) as u32
}

/// `a * b` with coefficients modulo `p` and `x^m` replaced by `xton`
fn poly_product(a: &[u64], b: &[u64], xton: &[u32], p: u32) -> Vec<u64> {
    let m = a.len();
    let p = p as u64;
    let mut long = vec![0u64; 2 * m - 1];
    for (i, ai) in a.iter().enumerate() {
        for (j, bj) in b.iter().enumerate() {
            long[i + j] = (long[i + j] + ai * bj) % p;
        }
    }
    for i in (m..2 * m - 1).rev() {
        let top = long[i];
        for (j, x) in xton.iter().enumerate() {
            long[i - m + j] = (long[i - m + j] + *x as u64 * top) % p;
        }
    }
    long.truncate(m);
    long
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_field_axioms(gf: &GaloisField) {
        let q = gf.order();
        for a in 0..q {
            assert_eq!(gf.add(a, 0).unwrap(), a);
            assert_eq!(gf.multiply(a, 1).unwrap(), a);
            assert_eq!(gf.add(a, gf.negate(a).unwrap()).unwrap(), 0);
            if a > 0 {
                assert_eq!(gf.multiply(a, gf.inverse(a).unwrap()).unwrap(), 1);
            }
            for b in 0..q {
                assert_eq!(gf.add(a, b).unwrap(), gf.add(b, a).unwrap());
                assert_eq!(gf.multiply(a, b).unwrap(), gf.multiply(b, a).unwrap());
                if a > 0 && b > 0 {
                    assert_ne!(gf.multiply(a, b).unwrap(), 0);
                }
            }
        }
        // each row of the tables is a permutation
        for a in 0..q as usize {
            let mut row = gf.plus().row_vec(a).unwrap();
            row.sort_unstable();
            assert_eq!(row, (0..q).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_prime_field() {
        let gf = GaloisField::new(7).unwrap();
        assert_eq!(gf.characteristic(), 7);
        assert_eq!(gf.degree(), 1);
        assert_eq!(gf.add(5, 4).unwrap(), 2);
        assert_eq!(gf.multiply(3, 5).unwrap(), 1);
        assert_eq!(gf.sub(2, 5).unwrap(), 4);
        assert_eq!(gf.inverse(3).unwrap(), 5);
        assert_field_axioms(&gf);
    }

    #[test]
    fn test_extension_fields() {
        for q in [4, 8, 9, 16, 25, 27, 49] {
            let gf = GaloisField::new(q).unwrap();
            assert_eq!(gf.order(), q);
            assert_field_axioms(&gf);
        }
    }

    #[test]
    fn test_large_extension_fields() {
        for q in [1024, 729, 961] {
            let gf = GaloisField::new(q).unwrap();
            for a in 1..q {
                assert_eq!(gf.multiply(a, gf.inverse(a).unwrap()).unwrap(), 1);
            }
            // distributivity on a strided subset
            for a in (0..q).step_by(37) {
                for b in (0..q).step_by(41) {
                    for c in (0..q).step_by(43) {
                        let left = gf.multiply(a, gf.add(b, c).unwrap()).unwrap();
                        let right = gf
                            .add(gf.multiply(a, b).unwrap(), gf.multiply(a, c).unwrap())
                            .unwrap();
                        assert_eq!(left, right, "GF({q})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_gf4_tables() {
        let gf = GaloisField::new(4).unwrap();
        // characteristic 2: every element is its own negative
        assert_eq!(gf.neg(), &[0, 1, 2, 3]);
        assert_eq!(gf.add(2, 3).unwrap(), 1);
        assert_eq!(gf.multiply(2, 3).unwrap(), 1);
        assert_eq!(gf.multiply(3, 3).unwrap(), 2);
    }

    #[test]
    fn test_square_roots() {
        let gf = GaloisField::new(5).unwrap();
        assert_eq!(gf.sqrt(4).unwrap().map(|r| gf.multiply(r, r).unwrap()), Some(4));
        assert_eq!(gf.sqrt(2).unwrap(), None);
        assert_eq!(gf.sqrt(3).unwrap(), None);
        assert_eq!(gf.sqrt(0).unwrap(), Some(0));
    }

    #[test]
    fn test_unsupported_fields() {
        for q in [0, 1, 6, 12, 1031, 2048, 121 * 11] {
            assert!(
                matches!(GaloisField::new(q), Err(LhsError::UnsupportedField { .. })),
                "GF({q}) should be rejected"
            );
        }
    }

    #[test]
    fn test_supported_orders() {
        for q in (0..130).chain([243, 343, 1031, 1331, 2048, 3125]) {
            assert_eq!(is_supported_order(q), GaloisField::new(q).is_ok(), "GF({q})");
        }
    }

    #[test]
    fn test_out_of_domain() {
        let gf = GaloisField::new(3).unwrap();
        assert!(matches!(gf.add(3, 0), Err(LhsError::OutOfRange { .. })));
        assert!(matches!(gf.negate(5), Err(LhsError::OutOfRange { .. })));
        assert!(gf.inverse(0).is_err());
    }

    #[test]
    fn test_field_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GaloisField>();
    }
}
