//! Provider summary view of a snapshot

use crate::snapshot::RegistryData;

/// Formats the per-provider summary of a snapshot as a plain-text table
pub fn format_snapshot_summary(data: &RegistryData) -> String {
    let summaries = data.summaries();
    let mut out = String::new();

    out.push_str(&format!(
        "Snapshot v{} updated {} ({} providers, {} models)\n\n",
        data.version,
        data.updated_at.to_rfc3339(),
        summaries.len(),
        data.model_count()
    ));

    let slug_width = summaries
        .iter()
        .map(|s| s.provider.len())
        .max()
        .unwrap_or(0)
        .max("PROVIDER".len());
    let name_width = summaries
        .iter()
        .map(|s| s.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    out.push_str(&format!(
        "{:<slug_width$}  {:<name_width$}  {:>6}  COLUMNS\n",
        "PROVIDER", "NAME", "MODELS"
    ));

    for summary in &summaries {
        out.push_str(&format!(
            "{:<slug_width$}  {:<name_width$}  {:>6}  {}\n",
            summary.provider,
            summary.display_name,
            summary.model_count,
            summary.columns.join(", ")
        ));
    }

    out
}

/// Prints the per-provider summary of a snapshot to stdout
pub fn print_snapshot_summary(data: &RegistryData) {
    print!("{}", format_snapshot_summary(data));
}
