//! Student-t significance for correlation coefficients.
//!
//! `t = r·√(n−2)/√(1−r²)` with `df = n − 2`; the two-tailed survival is
//! `I_{df/(df+t²)}(df/2, 1/2)`.

use super::special::regularized_incomplete_beta;
use crate::StatError;

/// t statistic for a sample correlation `r` over `n` pairs.
///
/// |r| = 1 gives an infinite statistic with the sign of `r`.
pub fn t_statistic(r: f64, n: u64) -> f64 {
    let df = n.saturating_sub(2) as f64;
    let denom = (1.0 - r * r).max(0.0).sqrt();
    if denom == 0.0 {
        return if r.is_sign_negative() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    r * df.sqrt() / denom
}

/// Two-tailed P(|T| ≥ |t|) for Student's t with `df` degrees of freedom.
pub fn two_tailed_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(x, 0.5 * df, 0.5).clamp(0.0, 1.0)
}

/// Two-tailed p-value for a Pearson (or rank) correlation `r` over `n` pairs.
pub fn correlation_p_value(r: f64, n: u64) -> Result<f64, StatError> {
    if n < 3 {
        return Err(StatError::InsufficientData { n, required: 3 });
    }
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }
    Ok(two_tailed_p(t_statistic(r, n), (n - 2) as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn cauchy_case_has_closed_form() {
        // df = 1: p = 1 - (2/π)·atan(|t|)
        let p = two_tailed_p(1.0, 1.0);
        assert!(close(p, 0.5, 1e-9), "p={p}");
    }

    #[test]
    fn df_two_closed_form() {
        let t: f64 = 1.0;
        let expected = 1.0 - t / (2.0 + t * t).sqrt();
        assert!(close(two_tailed_p(t, 2.0), expected, 1e-9));
    }

    #[test]
    fn critical_value_df10_gives_five_percent() {
        let p = two_tailed_p(2.228_138_852, 10.0);
        assert!(close(p, 0.05, 1e-6), "p={p}");
    }

    #[test]
    fn zero_t_is_not_significant() {
        assert!(close(two_tailed_p(0.0, 25.0), 1.0, 1e-12));
    }

    #[test]
    fn symmetric_in_sign() {
        assert!(close(two_tailed_p(-1.7, 12.0), two_tailed_p(1.7, 12.0), 1e-14));
    }

    #[test]
    fn t_statistic_formula() {
        let t = t_statistic(0.5, 27);
        let expected = 0.5 * 25f64.sqrt() / (0.75f64).sqrt();
        assert!(close(t, expected, 1e-12));
        assert!(t_statistic(1.0, 10).is_infinite());
        assert!(t_statistic(-1.0, 10) < 0.0);
    }

    #[test]
    fn p_value_requires_three_pairs() {
        assert_eq!(
            correlation_p_value(0.9, 2),
            Err(StatError::InsufficientData { n: 2, required: 3 })
        );
    }

    #[test]
    fn perfect_correlation_has_zero_p() {
        assert_eq!(correlation_p_value(1.0, 10), Ok(0.0));
        assert_eq!(correlation_p_value(-1.0, 10), Ok(0.0));
    }

    #[test]
    fn strong_correlation_on_large_sample_is_tiny() {
        let p = correlation_p_value(0.3, 10_000).unwrap_or(1.0);
        assert!(p < 1e-100);
    }
}
