//! Argument checks run before any generation work.
//!
//! The checks take loosely typed host values (signed integers, unchecked floats) so that
//! a binding layer can forward its arguments untouched and surface the error message
//! verbatim. They are pure: the same inputs always yield the same outcome.
use crate::errors::{LhsError, Result};

/// `n` points and `k` dimensions must both be positive
pub fn check_n_k(n: i64, k: i64) -> Result<()> {
    if n < 1 || k < 1 {
        return Err(LhsError::invalid(format!(
            "n and k must be integers > 0, n={n} k={k}"
        )));
    }
    Ok(())
}

/// [`check_n_k`] and a positive duplication factor
pub fn check_dup(n: i64, k: i64, dup: i64) -> Result<()> {
    check_n_k(n, k)?;
    if dup < 1 {
        return Err(LhsError::invalid(format!(
            "dup must be an integer > 0, dup={dup}"
        )));
    }
    Ok(())
}

/// [`check_n_k`], a positive sweep budget and a finite `eps` in `(0, 1)`
pub fn check_sweeps(n: i64, k: i64, max_sweeps: i64, eps: f64) -> Result<()> {
    check_n_k(n, k)?;
    if !eps.is_finite() {
        return Err(LhsError::invalid("eps may not be NaN or +-Inf"));
    }
    if max_sweeps < 1 {
        return Err(LhsError::invalid(format!(
            "maxsweeps must be an integer > 0, maxsweeps={max_sweeps}"
        )));
    }
    if eps <= 0. || eps >= 1. {
        return Err(LhsError::invalid(format!(
            "eps must be a double on the interval (0,1), eps={eps}"
        )));
    }
    Ok(())
}

/// [`check_n_k`] and the genetic algorithm settings
pub fn check_genetic(n: i64, k: i64, pop: i64, gen: i64, p_mut: f64) -> Result<()> {
    check_n_k(n, k)?;
    if pop < 1 || gen < 1 {
        return Err(LhsError::invalid(format!(
            "pop and gen should be integers greater than 0, pop={pop} gen={gen}"
        )));
    }
    if pop % 2 != 0 {
        return Err(LhsError::invalid(format!(
            "pop should be an even number, pop={pop}"
        )));
    }
    if !p_mut.is_finite() || p_mut <= 0. || p_mut >= 1. {
        return Err(LhsError::invalid(format!(
            "pMut should be between 0 and 1, pMut={p_mut}"
        )));
    }
    Ok(())
}

/// Saturating conversion used to hand validated sizes to the checks
pub(crate) fn as_i64(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_n_k() {
        assert!(check_n_k(5, 2).is_ok());
        let err = check_n_k(0, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid Argument: n and k must be integers > 0, n=0 k=2"
        );
        assert!(check_n_k(3, -1).is_err());
    }

    #[test]
    fn test_check_dup() {
        assert!(check_dup(4, 3, 2).is_ok());
        assert!(check_dup(4, 3, 0)
            .unwrap_err()
            .to_string()
            .contains("dup must be an integer > 0"));
        assert!(check_dup(0, 3, 2).is_err());
    }

    #[test]
    fn test_check_sweeps() {
        assert!(check_sweeps(10, 2, 2, 0.1).is_ok());
        assert!(check_sweeps(10, 2, 0, 0.1)
            .unwrap_err()
            .to_string()
            .contains("maxsweeps"));
        for eps in [0., 1., -0.5, 2., f64::NAN, f64::INFINITY] {
            assert!(
                matches!(check_sweeps(10, 2, 2, eps), Err(LhsError::InvalidParameter(_))),
                "eps={eps} should be rejected"
            );
        }
    }

    #[test]
    fn test_check_genetic() {
        assert!(check_genetic(10, 2, 4, 2, 0.1).is_ok());
        assert!(check_genetic(10, 2, 3, 2, 0.1).is_err());
        assert!(check_genetic(10, 2, 4, 0, 0.1).is_err());
        assert!(check_genetic(10, 2, 4, 2, 1.).is_err());
        assert!(check_genetic(10, 2, 0, 2, 0.5).is_err());
    }

    #[test]
    fn test_checks_are_idempotent() {
        let inputs = [(0, 1, 1, 0.1), (3, 3, 1, 0.5), (2, 2, 0, 0.2), (4, 4, 5, 1.5)];
        for (n, k, s, eps) in inputs {
            assert_eq!(check_sweeps(n, k, s, eps), check_sweeps(n, k, s, eps));
            assert_eq!(check_dup(n, k, s), check_dup(n, k, s));
        }
    }
}
