//! Prime and prime power arithmetic

/// Trial division primality test
pub fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let n = n as u64;
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Decomposes `q = p^m` with `p` prime, `None` when `q` is not a prime power
pub fn prime_power(q: u32) -> Option<(u32, u32)> {
    if q < 2 {
        return None;
    }
    let p = (2..=q).find(|d| q % d == 0)?;
    let mut rest = q;
    let mut m = 0;
    while rest % p == 0 {
        rest /= p;
        m += 1;
    }
    (rest == 1).then_some((p, m))
}

/// True when `q = p^m` for some prime `p` and `m >= 1`
pub fn is_prime_power(q: u32) -> bool {
    prime_power(q).is_some()
}

/// `base^exp`, `None` on overflow
pub fn ipow(base: u32, exp: u32) -> Option<u32> {
    base.checked_pow(exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime() {
        let primes: Vec<u32> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(is_prime(1021));
        assert!(!is_prime(1023));
    }

    #[test]
    fn test_prime_power() {
        assert_eq!(prime_power(8), Some((2, 3)));
        assert_eq!(prime_power(9), Some((3, 2)));
        assert_eq!(prime_power(7), Some((7, 1)));
        assert_eq!(prime_power(12), None);
        assert_eq!(prime_power(1), None);
        assert_eq!(prime_power(0), None);
        assert!(is_prime_power(125));
        assert!(!is_prime_power(6));
    }

    #[test]
    fn test_ipow() {
        assert_eq!(ipow(3, 4), Some(81));
        assert_eq!(ipow(2, 0), Some(1));
        assert_eq!(ipow(2, 40), None);
    }
}
