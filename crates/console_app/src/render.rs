use chrono::{DateTime, Utc};
use console_core::{AppViewModel, CatalogEntry, StreamRowView, SystemSnapshot};

pub fn format_created_at(secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(at) if secs > 0 => at.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

pub fn stream_row(row: &StreamRowView) -> String {
    format!(
        "{:>6}  {:<24} {:<6} {:<16} {}  {}",
        row.id,
        truncate(&row.name, 24),
        row.transport.as_str(),
        truncate(row.scenario.as_deref().unwrap_or("-"), 16),
        format_created_at(row.created_at),
        row.path
    )
}

pub fn feed_footer(view: &AppViewModel) -> String {
    let more = if view.has_more { ", more available" } else { "" };
    format!(
        "{} of {} streams, page {}{}",
        view.rows.len(),
        view.total,
        view.page,
        more
    )
}

pub fn catalog_row(entry: &CatalogEntry) -> String {
    format!(
        "{:>4}  {:<24} {}",
        entry.category_id, entry.category_name, entry.count
    )
}

pub fn system_line(snapshot: &SystemSnapshot) -> String {
    let load = snapshot
        .load_avg
        .iter()
        .map(|value| format!("{value:.2}"))
        .collect::<Vec<_>>()
        .join(" ");
    let mut line = format!(
        "{} cpu {:.1}% ({} cores, load {}) mem {:.1}% ({:.1}/{:.1} GB)",
        if snapshot.hostname.is_empty() {
            "host"
        } else {
            &snapshot.hostname
        },
        snapshot.cpu_percent,
        snapshot.cpu_cores,
        if load.is_empty() { "-" } else { &load },
        snapshot.memory_percent,
        snapshot.memory_used_gb,
        snapshot.memory_total_gb
    );
    for gpu in &snapshot.gpus {
        line.push_str(&format!(
            " | {} {:.0}% mem {:.0}%",
            gpu.name, gpu.load_percent, gpu.memory_percent
        ));
    }
    line
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
