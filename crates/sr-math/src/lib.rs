//! Numerical kernels for sentiment/rating analysis.
//!
//! Everything here is pure and allocation-light: running moment sums,
//! average ranks, closed-form least squares and the Student-t tail used
//! for correlation significance.

pub mod error;
pub mod math;

pub use error::{Axis, StatError};
pub use math::moments::MomentState;
pub use math::rank::{average_ranks, spearman};
pub use math::regression::{ols_line, OlsLine};
pub use math::special::{log_beta, log_gamma, regularized_incomplete_beta};
pub use math::student_t::{correlation_p_value, t_statistic, two_tailed_p};
