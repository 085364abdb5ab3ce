//! Running sufficient statistics for a pair of variables.
//!
//! A [`MomentState`] is a plain value: `absorb` is O(1), and two states built
//! over disjoint data merge by field-wise summation into exactly the state
//! that absorbing everything would have produced. That makes it safe to
//! partition work across threads and reduce afterwards.

use serde::{Deserialize, Serialize};

use crate::{Axis, StatError};

/// Relative tolerance below which a centered sum of squares counts as zero.
const ZERO_VARIANCE_RTOL: f64 = 1e-12;

/// Count plus raw sums `Σx, Σy, Σx², Σy², Σxy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentState {
    pub n: u64,
    pub sum_x: f64,
    pub sum_y: f64,
    pub sum_xx: f64,
    pub sum_yy: f64,
    pub sum_xy: f64,
}

impl MomentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from paired slices (extra elements of the longer one are ignored).
    pub fn from_pairs(xs: &[f64], ys: &[f64]) -> Self {
        let mut state = Self::new();
        for (&x, &y) in xs.iter().zip(ys) {
            state.absorb(x, y);
        }
        state
    }

    #[inline]
    pub fn absorb(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }

    /// Fold another state into this one.
    pub fn merge(&mut self, other: &MomentState) {
        self.n += other.n;
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
        self.sum_xx += other.sum_xx;
        self.sum_yy += other.sum_yy;
        self.sum_xy += other.sum_xy;
    }

    pub fn merged(mut self, other: &MomentState) -> Self {
        self.merge(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    fn require(&self, required: u64) -> Result<f64, StatError> {
        if self.n < required {
            return Err(StatError::InsufficientData {
                n: self.n,
                required,
            });
        }
        Ok(self.n as f64)
    }

    pub fn mean_x(&self) -> Result<f64, StatError> {
        Ok(self.sum_x / self.require(1)?)
    }

    pub fn mean_y(&self) -> Result<f64, StatError> {
        Ok(self.sum_y / self.require(1)?)
    }

    /// Σ(x − x̄)², computed from raw sums and snapped to zero within tolerance.
    pub fn centered_xx(&self) -> Result<f64, StatError> {
        let n = self.require(1)?;
        Ok(centered(self.sum_xx, self.sum_x * self.sum_x / n))
    }

    pub fn centered_yy(&self) -> Result<f64, StatError> {
        let n = self.require(1)?;
        Ok(centered(self.sum_yy, self.sum_y * self.sum_y / n))
    }

    /// Σ(x − x̄)(y − ȳ).
    pub fn centered_xy(&self) -> Result<f64, StatError> {
        let n = self.require(1)?;
        Ok(self.sum_xy - self.sum_x * self.sum_y / n)
    }

    /// Sample variance of x (n − 1 denominator).
    pub fn variance_x(&self) -> Result<f64, StatError> {
        let n = self.require(2)?;
        Ok(self.centered_xx()? / (n - 1.0))
    }

    pub fn variance_y(&self) -> Result<f64, StatError> {
        let n = self.require(2)?;
        Ok(self.centered_yy()? / (n - 1.0))
    }

    pub fn std_x(&self) -> Result<f64, StatError> {
        self.variance_x().map(f64::sqrt)
    }

    pub fn std_y(&self) -> Result<f64, StatError> {
        self.variance_y().map(f64::sqrt)
    }

    /// Sample covariance (n − 1 denominator).
    pub fn covariance(&self) -> Result<f64, StatError> {
        let n = self.require(2)?;
        Ok(self.centered_xy()? / (n - 1.0))
    }

    /// Pearson product-moment correlation, clamped to [-1, 1].
    pub fn pearson(&self) -> Result<f64, StatError> {
        self.require(2)?;
        let sxx = self.centered_xx()?;
        if sxx == 0.0 {
            return Err(StatError::ZeroVariance { axis: Axis::X });
        }
        let syy = self.centered_yy()?;
        if syy == 0.0 {
            return Err(StatError::ZeroVariance { axis: Axis::Y });
        }
        let r = self.centered_xy()? / (sxx * syy).sqrt();
        Ok(r.clamp(-1.0, 1.0))
    }
}

fn centered(raw_sq: f64, correction: f64) -> f64 {
    let c = raw_sq - correction;
    if c <= ZERO_VARIANCE_RTOL * raw_sq.abs() {
        0.0
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn empty_state_is_undefined() {
        let s = MomentState::new();
        assert!(s.is_empty());
        assert_eq!(
            s.mean_x(),
            Err(StatError::InsufficientData { n: 0, required: 1 })
        );
        assert_eq!(
            s.pearson(),
            Err(StatError::InsufficientData { n: 0, required: 2 })
        );
    }

    #[test]
    fn single_observation_has_mean_but_no_variance() {
        let s = MomentState::from_pairs(&[0.4], &[3.0]);
        assert_eq!(s.mean_x(), Ok(0.4));
        assert_eq!(
            s.variance_x(),
            Err(StatError::InsufficientData { n: 1, required: 2 })
        );
    }

    #[test]
    fn variance_and_covariance_match_hand_computation() {
        let s = MomentState::from_pairs(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 5.0, 9.0]);
        assert!(close(s.variance_x().unwrap(), 5.0 / 3.0, 1e-12));
        // mean y = 5, deviations (-3,-1,0,4) dotted with (-1.5,-0.5,0.5,1.5)
        assert!(close(s.covariance().unwrap(), 11.0 / 3.0, 1e-12));
    }

    #[test]
    fn constant_x_is_zero_variance_not_nan() {
        let s = MomentState::from_pairs(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]);
        assert_eq!(s.pearson(), Err(StatError::ZeroVariance { axis: Axis::X }));
    }

    #[test]
    fn constant_y_is_zero_variance() {
        let s = MomentState::from_pairs(&[0.1, 0.5, 0.9], &[4.0, 4.0, 4.0]);
        assert_eq!(s.pearson(), Err(StatError::ZeroVariance { axis: Axis::Y }));
    }

    #[test]
    fn perfect_linear_relation_is_one() {
        let s = MomentState::from_pairs(&[-1.0, 0.0, 1.0, 2.0], &[1.0, 3.0, 5.0, 7.0]);
        assert!(close(s.pearson().unwrap(), 1.0, 1e-12));
    }

    #[test]
    fn merge_equals_single_pass() {
        let xs = [0.8, -0.2, 0.5, 0.1, -0.9, 0.3];
        let ys = [5.0, 2.0, 4.0, 3.0, 1.0, 4.0];
        let whole = MomentState::from_pairs(&xs, &ys);
        let left = MomentState::from_pairs(&xs[..2], &ys[..2]);
        let right = MomentState::from_pairs(&xs[2..], &ys[2..]);
        let merged = left.merged(&right);
        assert_eq!(merged.n, whole.n);
        assert!(close(merged.pearson().unwrap(), whole.pearson().unwrap(), 1e-12));
    }

    #[test]
    fn serde_round_trip_is_exact() {
        let s = MomentState::from_pairs(&[0.123_456_789, -0.987], &[1.0, 5.0]);
        let json = serde_json::to_string(&s).unwrap();
        let back: MomentState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
