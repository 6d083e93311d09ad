/// LWE parameter set over `q = 2^logq` with a power-of-two plaintext modulus.
#[derive(Debug, Clone, Copy)]
pub struct LweParams {
    /// LWE dimension (secret length)
    pub n: usize,
    /// log2 of the ciphertext modulus; only 64 is supported (native u64 wrapping)
    pub logq: u64,
    /// Plaintext modulus, a power of two
    pub p: u64,
    /// Noise parameter
    pub noise_stddev: f64,
}

impl LweParams {
    /// Scaling factor Δ = q / p. Both moduli are powers of two, so q = Δ·p
    /// exactly and `Δ·x mod q` projects `x` onto `x mod p`.
    pub fn delta(&self) -> u64 {
        debug_assert!(self.p.is_power_of_two());
        1u64 << (self.logq - u64::from(self.p.ilog2()))
    }
}

/// Security table for q = 2^64: (LWE dimension, max samples the adversary
/// sees, noise width). Entries target ~128-bit security; the sample bound is
/// the database width `m`, since every query exposes one LWE sample per
/// column.
const PARAMS_Q64: &[(usize, u64, f64)] = &[(1408, 1 << 13, 6.4), (2048, 1 << 20, 6.4)];

/// Pick parameters for a fixed plaintext modulus: smallest secure dimension
/// for `m` samples at `q = 2^logq`. Returns `None` when `logq` is unsupported,
/// `p` is not a power of two, or no table entry covers `m`.
pub fn params_fixed_p(logq: u64, m: usize, p: u64) -> Option<LweParams> {
    if logq != 64 || !p.is_power_of_two() {
        return None;
    }
    for &(n, max_m, noise_stddev) in PARAMS_Q64 {
        if m as u64 <= max_m {
            return Some(LweParams {
                n,
                logq,
                p,
                noise_stddev,
            });
        }
    }
    None
}
