//! Property-based tests for sr-math kernels.

use proptest::prelude::*;
use sr_math::{average_ranks, correlation_p_value, ols_line, MomentState};

/// Helper to check approximate equality with a relative floor.
fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

fn two_pass_pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    sxy / (sxx * syy).sqrt()
}

fn two_pass_var(xs: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let m = xs.iter().sum::<f64>() / n;
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1.0)
}

/// Sentiment-like x in [-1, 1], rating-like y in [1, 5].
fn paired_sample() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-1.0..1.0f64, 1u8..=5), 3..200)
        .prop_map(|v| v.into_iter().map(|(x, r)| (x, r as f64)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Streaming Pearson equals the two-pass definition.
    #[test]
    fn streaming_pearson_matches_two_pass(pairs in paired_sample()) {
        let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        prop_assume!(two_pass_var(&xs) > 1e-6 && two_pass_var(&ys) > 1e-6);

        let streamed = MomentState::from_pairs(&xs, &ys).pearson().unwrap();
        let direct = two_pass_pearson(&xs, &ys);
        prop_assert!(approx_eq(streamed, direct, 1e-9), "streamed={} direct={}", streamed, direct);
    }

    /// Merging partial states at any split point equals one pass over all data.
    #[test]
    fn merge_is_split_invariant(pairs in paired_sample(), split in 0usize..200) {
        let split = split.min(pairs.len());
        let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();

        let whole = MomentState::from_pairs(&xs, &ys);
        let left = MomentState::from_pairs(&xs[..split], &ys[..split]);
        let right = MomentState::from_pairs(&xs[split..], &ys[split..]);

        let lr = left.merged(&right);
        let rl = right.merged(&left);
        prop_assert_eq!(lr.n, whole.n);
        prop_assert!(approx_eq(lr.sum_xy, whole.sum_xy, 1e-9));
        prop_assert!(approx_eq(rl.sum_xx, whole.sum_xx, 1e-9));
        prop_assert!(approx_eq(lr.sum_y, rl.sum_y, 1e-12));
    }

    /// For simple regression the squared correlation equals explained / total variation.
    #[test]
    fn r_squared_is_pearson_squared(pairs in paired_sample()) {
        let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        prop_assume!(two_pass_var(&xs) > 1e-6 && two_pass_var(&ys) > 1e-6);

        let m = MomentState::from_pairs(&xs, &ys);
        let r = m.pearson().unwrap();
        let line = ols_line(&m).unwrap();
        let my = ys.iter().sum::<f64>() / ys.len() as f64;
        let ss_tot: f64 = ys.iter().map(|y| (y - my).powi(2)).sum();
        let ss_res: f64 = xs.iter().zip(&ys).map(|(x, y)| (y - line.predict(*x)).powi(2)).sum();
        prop_assert!(approx_eq(r * r, 1.0 - ss_res / ss_tot, 1e-7));
    }

    /// Ranks are a permutation-invariant relabelling summing to n(n+1)/2.
    #[test]
    fn ranks_sum_to_triangular(values in prop::collection::vec(-5i32..5, 1..100)) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let ranks = average_ranks(&values);
        let n = values.len() as f64;
        prop_assert!(approx_eq(ranks.iter().sum::<f64>(), n * (n + 1.0) / 2.0, 1e-9));
        prop_assert!(ranks.iter().all(|r| *r >= 1.0 && *r <= n));
    }

    /// p-values stay in [0, 1] and shrink as |r| grows for fixed n.
    #[test]
    fn p_value_is_monotone_in_r(r in 0.0..0.95f64, n in 5u64..5_000) {
        let p = correlation_p_value(r, n).unwrap();
        let p_stronger = correlation_p_value(r + 0.04, n).unwrap();
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert!(p_stronger <= p + 1e-12, "p({})={} p({})={}", r, p, r + 0.04, p_stronger);
    }
}
