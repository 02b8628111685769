//! Review progress and paging summaries

use crate::review::{ReviewCounts, ReviewView};

/// Format a ratio in `0.0..=1.0` as a percentage
pub fn format_percentage(ratio: f64) -> String {
    let pct = ratio * 100.0;
    if pct > 0.0 && pct < 0.1 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Simple progress bar for a ratio in `0.0..=1.0`
pub fn format_bar(ratio: f64, width: usize) -> String {
    if ratio <= 0.0 {
        return "░".repeat(width);
    }

    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Status counts and overall progress
pub fn format_review_summary(counts: &ReviewCounts) -> String {
    if counts.total == 0 {
        return "No transactions loaded. Import a bank statement to start reviewing.\n".to_string();
    }

    let mut output = String::new();
    output.push_str("Review Summary\n");
    output.push_str(&"─".repeat(40));
    output.push('\n');
    output.push_str(&format!("{:<12} {:>8}\n", "Total", counts.total));
    output.push_str(&format!("{:<12} {:>8}\n", "Pending", counts.pending));
    output.push_str(&format!("{:<12} {:>8}\n", "Excluded", counts.excluded));
    output.push_str(&format!("{:<12} {:>8}\n", "Skipped", counts.skipped));
    output.push_str(&format!("{:<12} {:>8}\n", "Reviewed", counts.reviewed()));
    output.push_str(&format!(
        "\n{} {}\n",
        format_bar(counts.progress(), 30),
        format_percentage(counts.progress())
    ));
    output
}

/// One-line footer below a page of results
pub fn format_view_footer(view: &ReviewView) -> String {
    let mut parts = vec![
        view.result_text.clone(),
        format!("page {}/{}", view.page_index + 1, view.page_count),
        format!("sort: {}", view.sort),
    ];
    if view.selected_count > 0 {
        parts.push(format!("{} selected", view.selected_count));
    }
    if let Some(undo) = &view.undo_description {
        parts.push(undo.clone());
    }
    parts.join(" | ")
}
