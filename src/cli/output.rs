//! Output formatting helpers for CLI commands

use crate::pipeline::{BatchItem, BatchStatus, PipelineOutput};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Human-readable summary of one generated post
pub fn format_post_summary(output: &PipelineOutput) -> String {
    let post = &output.post;
    let mut lines = vec![
        format!("{} {}", "✓".green(), post.title.bold()),
        format!("  slug:      {}", post.slug),
        format!("  read time: {}", post.read_time_estimate),
        format!("  sections:  {}", post.table_of_contents.len()),
        format!("  tags:      {}", post.tags.join(", ")),
        format!("  excerpt:   {}", post.excerpt),
    ];

    if !output.failures.is_empty() {
        lines.push(format!(
            "{} {} stage(s) failed:",
            "!".yellow(),
            output.failures.len()
        ));
        for failure in &output.failures {
            lines.push(format!("  - {}", failure));
        }
    }

    lines.join("\n")
}

/// Full pipeline output as JSON
pub fn format_output_json(output: &PipelineOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(output)
}

fn status_cell(status: BatchStatus) -> String {
    match status {
        BatchStatus::Done => "Done".green().to_string(),
        BatchStatus::Failed => "Failed".red().to_string(),
        BatchStatus::Running => "Running".cyan().to_string(),
        BatchStatus::Pending => "Pending".yellow().to_string(),
    }
}

/// Format batch results as a table
pub fn format_batch_table(items: &[BatchItem]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Topic", "Status", "Slug", "Sections", "Issues"]);

    for item in items {
        let (slug, sections, issues) = match &item.output {
            Some(output) => (
                output.post.slug.clone(),
                output.post.table_of_contents.len().to_string(),
                output.failures.len().to_string(),
            ),
            None => (
                "-".to_string(),
                "-".to_string(),
                item.error.clone().unwrap_or_else(|| "-".to_string()),
            ),
        };

        table.add_row(vec![
            Cell::new(&item.topic),
            Cell::new(status_cell(item.status)),
            Cell::new(slug),
            Cell::new(sections),
            Cell::new(issues),
        ]);
    }

    table.to_string()
}

/// Format batch results as JSON
pub fn format_batch_json(items: &[BatchItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "items": items }))
}
