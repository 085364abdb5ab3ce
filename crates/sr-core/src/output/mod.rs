//! Rendering of reports for stdout.
//!
//! JSON is the contract; Markdown and the one-line summary are for people.

pub mod markdown;

use sr_common::{Estimate, OutputFormat, Result};

use crate::analysis::CorrelationResult;
use crate::report::AnalysisReport;

pub use markdown::render_markdown;

/// Render a report in the requested format.
pub fn render_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Md => render_markdown(report),
        OutputFormat::Summary => render_summary(report),
    })
}

/// One line: counts, headline correlation, clustering state.
pub fn render_summary(report: &AnalysisReport) -> String {
    let clusters = match &report.clustering {
        Estimate::Defined(c) if c.converged => format!("{} clusters", c.clusters.len()),
        Estimate::Defined(c) => format!("{} clusters (not converged)", c.clusters.len()),
        Estimate::Undefined { reason, .. } => format!("clustering undefined ({reason})"),
    };
    format!(
        "{}: {} reviews ({} skipped), {} users, pearson {}, {}",
        report.run_id,
        report.ingest.accepted,
        report.ingest.skipped,
        report.entities.entities,
        coefficient(&report.pearson),
        clusters
    )
}

pub(crate) fn coefficient(estimate: &Estimate<CorrelationResult>) -> String {
    match estimate {
        Estimate::Defined(c) => format!("r={:.3}", c.coefficient),
        Estimate::Undefined { reason, .. } => format!("undefined ({reason})"),
    }
}

/// Format a p-value, using scientific notation for very small values.
pub(crate) fn p_value(p: Option<f64>) -> String {
    match p {
        None => "n/a".to_string(),
        Some(p) if p > 0.0 && p < 1e-4 => format!("{p:.2e}"),
        Some(p) => format!("{p:.4}"),
    }
}
