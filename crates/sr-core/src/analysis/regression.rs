//! Simple linear regression from moments.
//!
//! R² is the square of the Pearson r computed from the same moments, never
//! a residual sum, so the two can not drift apart.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::Estimate;
use sr_math::{correlation_p_value, ols_line, MomentState};

use super::{undefined_from, AxisLabels};

/// Effect-size class of R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectSize {
    /// `≥ 0.25` large, `≥ 0.09` medium, `≥ 0.01` small.
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared >= 0.25 {
            EffectSize::Large
        } else if r_squared >= 0.09 {
            EffectSize::Medium
        } else if r_squared >= 0.01 {
            EffectSize::Small
        } else {
            EffectSize::Negligible
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectSize::Negligible => "negligible",
            EffectSize::Small => "small",
            EffectSize::Medium => "medium",
            EffectSize::Large => "large",
        }
    }
}

impl std::fmt::Display for EffectSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson r of the same moments.
    pub r: f64,
    pub r_squared: f64,
    pub effect_size: EffectSize,
    /// Slope significance (equal to the correlation t-test); absent when n < 3.
    pub p_value: Option<f64>,
    pub significant: bool,
    pub n: u64,
}

/// Regress y on x.
///
/// A constant y yields a flat line but no r, so the whole result is
/// undefined rather than reporting an R² that was never measured.
pub fn regress(
    moments: &MomentState,
    alpha: f64,
    labels: AxisLabels,
) -> Estimate<RegressionResult> {
    let line = match ols_line(moments) {
        Ok(line) => line,
        Err(e) => return undefined_from(&e, moments.n, labels),
    };
    let r = match moments.pearson() {
        Ok(r) => r,
        Err(e) => return undefined_from(&e, moments.n, labels),
    };

    let r_squared = r * r;
    let p_value = correlation_p_value(r, moments.n).ok();
    Estimate::Defined(RegressionResult {
        slope: line.slope,
        intercept: line.intercept,
        r,
        r_squared,
        effect_size: EffectSize::from_r_squared(r_squared),
        p_value,
        significant: p_value.is_some_and(|p| p < alpha),
        n: moments.n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_common::UndefinedReason;

    #[test]
    fn effect_size_thresholds() {
        assert_eq!(EffectSize::from_r_squared(0.0), EffectSize::Negligible);
        assert_eq!(EffectSize::from_r_squared(0.0099), EffectSize::Negligible);
        assert_eq!(EffectSize::from_r_squared(0.01), EffectSize::Small);
        assert_eq!(EffectSize::from_r_squared(0.09), EffectSize::Medium);
        assert_eq!(EffectSize::from_r_squared(0.25), EffectSize::Large);
        assert_eq!(EffectSize::from_r_squared(1.0), EffectSize::Large);
    }

    #[test]
    fn r_squared_is_r_squared() {
        let m = MomentState::from_pairs(&[0.8, -0.2, 0.5], &[5.0, 2.0, 4.0]);
        let reg = regress(&m, 0.001, AxisLabels::SENTIMENT_RATING);
        let reg = reg.defined().unwrap();
        assert!(reg.r > 0.0);
        assert!((reg.r_squared - reg.r * reg.r).abs() < 1e-6);
        assert!(reg.slope > 0.0);
        // line passes through the means
        let mean_x = (0.8 - 0.2 + 0.5) / 3.0;
        let mean_y = 11.0 / 3.0;
        assert!((reg.intercept + reg.slope * mean_x - mean_y).abs() < 1e-12);
    }

    #[test]
    fn perfect_line() {
        let xs = [-0.5, 0.0, 0.5, 1.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 + 2.0 * x).collect();
        let reg = regress(&MomentState::from_pairs(&xs, &ys), 0.05, AxisLabels::CHANGES);
        let reg = reg.defined().unwrap();
        assert!((reg.slope - 2.0).abs() < 1e-12);
        assert!((reg.intercept - 3.0).abs() < 1e-12);
        assert_eq!(reg.effect_size, EffectSize::Large);
        assert!(reg.p_value.unwrap() < 1e-10);
    }

    #[test]
    fn constant_x_is_undefined() {
        let m = MomentState::from_pairs(&[0.2, 0.2, 0.2], &[1.0, 3.0, 5.0]);
        match regress(&m, 0.05, AxisLabels::CHANGES) {
            Estimate::Undefined { reason, detail, n } => {
                assert_eq!(reason, UndefinedReason::ZeroVariance);
                assert!(detail.contains("sentiment_change"));
                assert_eq!(n, 3);
            }
            other => panic!("expected undefined, got {other:?}"),
        }
    }

    #[test]
    fn constant_y_is_undefined() {
        let m = MomentState::from_pairs(&[0.1, 0.2, 0.3], &[4.0, 4.0, 4.0]);
        assert!(!regress(&m, 0.05, AxisLabels::SENTIMENT_RATING).is_defined());
    }
}
