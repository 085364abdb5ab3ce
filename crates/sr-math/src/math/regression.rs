//! Closed-form simple least squares from accumulated moments.

use serde::{Deserialize, Serialize};

use super::moments::MomentState;
use crate::{Axis, StatError};

/// `y = intercept + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OlsLine {
    pub slope: f64,
    pub intercept: f64,
}

impl OlsLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y` on `x`: `β = Sxy/Sxx`, `α = ȳ − β·x̄`.
///
/// Only x needs spread; a constant y gives a flat line.
pub fn ols_line(moments: &MomentState) -> Result<OlsLine, StatError> {
    if moments.n < 2 {
        return Err(StatError::InsufficientData {
            n: moments.n,
            required: 2,
        });
    }
    let sxx = moments.centered_xx()?;
    if sxx == 0.0 {
        return Err(StatError::ZeroVariance { axis: Axis::X });
    }
    let slope = moments.centered_xy()? / sxx;
    let intercept = moments.mean_y()? - slope * moments.mean_x()?;
    Ok(OlsLine { slope, intercept })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_is_recovered() {
        let m = MomentState::from_pairs(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]);
        let line = ols_line(&m).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
        assert!((line.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn flat_response_has_zero_slope() {
        let m = MomentState::from_pairs(&[1.0, 2.0, 3.0], &[0.4, 0.4, 0.4]);
        let line = ols_line(&m).unwrap();
        assert!(line.slope.abs() < 1e-12);
        assert!((line.intercept - 0.4).abs() < 1e-12);
    }

    #[test]
    fn constant_x_cannot_be_fit() {
        let m = MomentState::from_pairs(&[2.0, 2.0], &[1.0, 5.0]);
        assert_eq!(ols_line(&m), Err(StatError::ZeroVariance { axis: Axis::X }));
    }

    #[test]
    fn needs_two_points() {
        let m = MomentState::from_pairs(&[2.0], &[1.0]);
        assert_eq!(
            ols_line(&m),
            Err(StatError::InsufficientData { n: 1, required: 2 })
        );
    }
}
