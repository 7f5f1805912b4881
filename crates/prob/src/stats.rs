//! Log-space arithmetic.
//!
//! Probabilities of whole trees are products of many small factors, so they
//! are carried as logarithms. Summing alternatives then needs log-sum-exp:
//! shift by the maximum so the largest term becomes `exp(0) = 1` and nothing
//! overflows or underflows to zero.

/// `log₂(Σ 2^xᵢ)`, computed stably.
///
/// Empty input, or input where every term is `−∞`, yields `−∞`
/// (an impossible event). Any `+∞` term yields `+∞`.
///
/// # Example
///
/// ```rust
/// use tsg_prob::log2_sum_exp;
///
/// // 0.3 + 0.2 = 0.5
/// let sum = log2_sum_exp(&[0.3_f64.log2(), 0.2_f64.log2()]);
/// assert!((sum - 0.5_f64.log2()).abs() < 1e-12);
/// ```
pub fn log2_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    let sum: f64 = values.iter().map(|&x| (x - max).exp2()).sum();
    max + sum.log2()
}

/// `ln(Σ eˣⁱ)`, computed stably. Same edge cases as [`log2_sum_exp`].
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    let sum: f64 = values.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}
