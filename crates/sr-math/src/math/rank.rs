//! Rank transform and Spearman correlation.

use super::moments::MomentState;
use crate::StatError;

/// 1-based ranks; tied values share the average of the ranks they span.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1 ..= end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Spearman's rho: Pearson correlation of the average ranks.
pub fn spearman(pairs: &[(f64, f64)]) -> Result<f64, StatError> {
    if pairs.len() < 2 {
        return Err(StatError::InsufficientData {
            n: pairs.len() as u64,
            required: 2,
        });
    }
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    MomentState::from_pairs(&average_ranks(&xs), &average_ranks(&ys)).pearson()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axis;

    #[test]
    fn distinct_values_get_positions() {
        assert_eq!(average_ranks(&[0.3, -1.0, 2.0]), vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn ties_share_average_rank() {
        assert_eq!(
            average_ranks(&[4.0, 5.0, 4.0, 1.0, 4.0]),
            vec![3.0, 5.0, 3.0, 1.0, 3.0]
        );
    }

    #[test]
    fn empty_input() {
        assert!(average_ranks(&[]).is_empty());
    }

    #[test]
    fn monotone_relation_is_one() {
        let pairs = [(0.1, 1.0), (0.2, 4.0), (0.5, 9.0), (0.9, 100.0)];
        let rho = spearman(&pairs).unwrap();
        assert!((rho - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reversed_relation_is_minus_one() {
        let pairs = [(0.1, 5.0), (0.2, 4.0), (0.5, 2.0), (0.9, 1.0)];
        let rho = spearman(&pairs).unwrap();
        assert!((rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_rating_is_undefined() {
        let pairs = [(0.1, 3.0), (0.2, 3.0), (0.5, 3.0)];
        assert_eq!(
            spearman(&pairs),
            Err(StatError::ZeroVariance { axis: Axis::Y })
        );
    }

    #[test]
    fn single_pair_is_insufficient() {
        assert_eq!(
            spearman(&[(0.1, 3.0)]),
            Err(StatError::InsufficientData { n: 1, required: 2 })
        );
    }
}
