//! End-of-run summary and CSV export of the sample table.

use std::fs::File;
use std::path::Path;

use crate::data::{RpmAnalysis, SampleTable, TableSummary};
use crate::error::ReportError;

/// Render the summary block printed after a run.
pub fn format_summary(summary: &TableSummary, analysis: &RpmAnalysis) -> String {
    let mut out = format!("Summary over {} samples\n", summary.samples);
    out.push_str(&format!("  Max temperature:  {:.1}°C\n", summary.max_temperature));
    out.push_str(&format!("  Mean temperature: {:.1}°C\n", summary.mean_temperature));
    out.push_str(&format!("  Max RPM:          {:.0}\n", summary.max_rpm));
    out.push_str(&format!("  Mean RPM:         {:.0}\n", summary.mean_rpm));
    out.push_str(&format!("  Min RPM:          {:.0}\n", summary.min_rpm));
    out.push_str(&format!("  RPM variation:    {:.1}%\n", summary.rpm_variation_pct));

    if analysis.irregularities.is_empty() {
        out.push_str("RPM pattern: stable\n");
    } else {
        out.push_str("Irregularities in the RPM window:\n");
        for irregularity in &analysis.irregularities {
            out.push_str(&format!("  • {}\n", irregularity));
        }
        out.push_str("Probable faults:\n");
        for fault in &analysis.probable_faults {
            out.push_str(&format!("  • {}\n", fault));
        }
    }

    out
}

/// Summary for `table`, or `None` when no samples were collected.
pub fn summarize(table: &SampleTable, analysis: &RpmAnalysis) -> Option<String> {
    table.summary().map(|s| format_summary(&s, analysis))
}

/// Write the sample table as CSV to `path`.
///
/// Returns the number of rows written.
pub fn export_csv(table: &SampleTable, path: &Path) -> Result<usize, ReportError> {
    if table.is_empty() {
        return Err(ReportError::Empty);
    }

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for sample in table.rows() {
        writer.serialize(sample)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = table.len(), "exported samples");
    Ok(table.len())
}
