//! Markdown report.

use std::fmt::Write;

use sr_common::Estimate;

use super::{coefficient, p_value};
use crate::analysis::{CorrelationResult, RegressionResult};
use crate::report::AnalysisReport;

pub fn render_markdown(report: &AnalysisReport) -> String {
    let mut md = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut md, report);
    md
}

fn write_report(md: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    writeln!(md, "# Sentiment / Rating Analysis")?;
    writeln!(md)?;
    writeln!(md, "- Run: `{}`", report.run_id)?;
    writeln!(md, "- Generated: {}", report.generated_at.to_rfc3339())?;
    writeln!(
        md,
        "- Config: preset `{}` from {}",
        report.config.preset, report.config.source
    )?;
    writeln!(md)?;

    let ingest = &report.ingest;
    writeln!(md, "## Ingest")?;
    writeln!(md)?;
    writeln!(
        md,
        "{} records seen, {} accepted, {} skipped (rate {:.2}%) in {} batches.",
        ingest.seen,
        ingest.accepted,
        ingest.skipped,
        ingest.skip_rate * 100.0,
        ingest.batches
    )?;
    if !ingest.skip_reasons.is_empty() {
        writeln!(md)?;
        writeln!(md, "| Reason | Count |")?;
        writeln!(md, "|---|---:|")?;
        for (reason, count) in &ingest.skip_reasons {
            writeln!(md, "| {reason} | {count} |")?;
        }
    }
    writeln!(md)?;

    let summary = &report.summary;
    writeln!(md, "## Sentiment")?;
    writeln!(md)?;
    match &summary.sentiment {
        Estimate::Defined(s) => writeln!(
            md,
            "Mean {:.4}, std {}, range [{:.3}, {:.3}].",
            s.mean,
            s.std.map_or("n/a".to_string(), |v| format!("{v:.4}")),
            s.min,
            s.max
        )?,
        Estimate::Undefined { reason, .. } => writeln!(md, "Undefined ({reason}).")?,
    }
    if let Some(range) = &summary.date_range {
        writeln!(
            md,
            "Reviews from {} to {}.",
            range.first.format("%Y-%m-%d"),
            range.last.format("%Y-%m-%d")
        )?;
    }
    writeln!(md)?;
    writeln!(md, "| Category | Count | Share |")?;
    writeln!(md, "|---|---:|---:|")?;
    for c in &summary.categories {
        writeln!(md, "| {} | {} | {:.1}% |", c.category.as_str(), c.count, c.percent)?;
    }
    writeln!(md)?;
    writeln!(md, "| Rating | Count | Share |")?;
    writeln!(md, "|---|---:|---:|")?;
    for r in &summary.ratings {
        writeln!(md, "| {} | {} | {:.1}% |", r.rating, r.count, r.percent)?;
    }
    writeln!(md)?;
    writeln!(
        md,
        "Anomalies: {} high-rating negative, {} low-rating positive ({:.2}% of reviews).",
        summary.anomalies.high_rating_negative,
        summary.anomalies.low_rating_positive,
        summary.anomalies.anomaly_rate * 100.0
    )?;
    writeln!(md)?;

    writeln!(md, "## Correlation")?;
    writeln!(md)?;
    writeln!(md, "| Measure | Coefficient | p-value | n |")?;
    writeln!(md, "|---|---:|---:|---:|")?;
    correlation_row(md, "Pearson", &report.pearson)?;
    correlation_row(md, "Spearman", &report.spearman)?;
    correlation_row(md, "Pearson, single-review users", &report.segments.single_review)?;
    correlation_row(md, "Pearson, multi-review users", &report.segments.multi_review)?;
    writeln!(md)?;

    writeln!(md, "## Regression")?;
    writeln!(md)?;
    regression_line(md, "Rating on sentiment", &report.regression)?;
    regression_line(md, "Rating change on sentiment change", &report.change_regression)?;
    writeln!(md)?;

    writeln!(md, "## Users")?;
    writeln!(md)?;
    let entities = &report.entities;
    writeln!(
        md,
        "{} users: {} with one review, {} with several ({} clustered).",
        entities.entities,
        entities.single_review,
        entities.multi_review,
        entities.eligible_for_clustering
    )?;
    writeln!(md)?;
    match &report.clustering {
        Estimate::Defined(c) => {
            writeln!(
                md,
                "k = {} on {}; {} iterations, {}.",
                c.k,
                c.used_features.join(", "),
                c.iterations,
                if c.converged {
                    "converged"
                } else {
                    "not converged"
                }
            )?;
            writeln!(md)?;
            writeln!(md, "| # | Name | Members | Share | Mean sentiment | Mean rating |")?;
            writeln!(md, "|---:|---|---:|---:|---:|---:|")?;
            for cluster in &c.clusters {
                writeln!(
                    md,
                    "| {} | {} | {} | {:.1}% | {:.3} | {:.2} |",
                    cluster.index,
                    cluster.name,
                    cluster.member_count,
                    cluster.share * 100.0,
                    cluster.means.get("mean_sentiment").copied().unwrap_or(f64::NAN),
                    cluster.means.get("mean_rating").copied().unwrap_or(f64::NAN)
                )?;
            }
        }
        Estimate::Undefined { reason, detail, .. } => {
            writeln!(md, "Clustering undefined: {reason} ({detail}).")?
        }
    }

    if !report.warnings.is_empty() {
        writeln!(md)?;
        writeln!(md, "## Warnings")?;
        writeln!(md)?;
        for w in &report.warnings {
            writeln!(md, "- {}", w.message)?;
        }
    }
    Ok(())
}

fn correlation_row(
    md: &mut String,
    label: &str,
    estimate: &Estimate<CorrelationResult>,
) -> std::fmt::Result {
    match estimate {
        Estimate::Defined(c) => writeln!(
            md,
            "| {label} | {:.4} | {} | {}{} |",
            c.coefficient,
            p_value(c.p_value),
            c.n,
            if c.sampled { " (sampled)" } else { "" }
        ),
        Estimate::Undefined { n, .. } => {
            writeln!(md, "| {label} | {} | n/a | {n} |", coefficient(estimate))
        }
    }
}

fn regression_line(
    md: &mut String,
    label: &str,
    estimate: &Estimate<RegressionResult>,
) -> std::fmt::Result {
    match estimate {
        Estimate::Defined(r) => writeln!(
            md,
            "- {label}: y = {:.4} + {:.4}·x, R² = {:.4} ({}), p = {}, n = {}",
            r.intercept,
            r.slope,
            r.r_squared,
            r.effect_size,
            p_value(r.p_value),
            r.n
        ),
        Estimate::Undefined { reason, detail, .. } => {
            writeln!(md, "- {label}: undefined, {reason} ({detail})")
        }
    }
}
