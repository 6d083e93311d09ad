use crate::params::LweParams;
use rand::Rng;
use rand_distr::{Distribution, Normal};

// ============================================================================
// Reusable LWE primitives
// ============================================================================

/// Dot product a·s mod q (wrapping arithmetic)
pub fn dot_product(a: &[u64], s: &[u64]) -> u64 {
    a.iter()
        .zip(s.iter())
        .map(|(&ai, &si)| ai.wrapping_mul(si))
        .fold(0u64, |acc, x| acc.wrapping_add(x))
}

/// Round and decode: converts a noisy value to its plaintext.
/// noisy = e + Δ·μ → μ
pub fn round_decode(noisy: u64, params: &LweParams) -> u64 {
    let delta = params.delta();
    let half_delta = delta / 2;
    (noisy.wrapping_add(half_delta) / delta) % params.p
}

/// Sample noise from a centered discrete Gaussian.
///
/// We sample from N(0, σ²), round to the nearest integer, then cast to u64.
/// Negative values wrap around mod 2^64, which is the correct embedding into
/// ℤ_q arithmetic.
pub fn sample_noise(stddev: f64, rng: &mut impl Rng) -> u64 {
    if stddev == 0.0 {
        return 0;
    }
    let normal = Normal::new(0.0, stddev).expect("stddev must be finite and positive");
    let sample: f64 = normal.sample(rng);
    sample.round() as i64 as u64
}

// ============================================================================
// Gadget decomposition (hint offload)
// ============================================================================

/// Log of the gadget base used to decompose hint entries.
pub const KS_BASE_LOG: u64 = 16;
/// Digits per u64 entry: 64 / KS_BASE_LOG.
pub const KS_DIGITS: usize = 4;

/// Digit `level` of the base-2^16 decomposition of `x`.
#[inline]
pub fn gadget_digit(x: u64, level: usize) -> u64 {
    (x >> (KS_BASE_LOG * level as u64)) & ((1u64 << KS_BASE_LOG) - 1)
}
