use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::types::Priority;

/// Global output format setting
static OUTPUT_JSON: AtomicBool = AtomicBool::new(false);

pub fn set_json_output(json: bool) {
    OUTPUT_JSON.store(json, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    OUTPUT_JSON.load(Ordering::Relaxed)
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        let json = serde_json::to_string_pretty(items).unwrap_or_default();
        println!("{json}");
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        let json = serde_json::to_string_pretty(item).unwrap_or_default();
        println!("{json}");
    } else {
        display(item);
    }
}

/// Print a message (skipped in JSON mode, or prints simple object)
pub fn print_message(message: &str) {
    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

/// Format a priority key ("0".."4") with color
pub fn priority_colored(key: &str) -> String {
    match Priority::from_key(key) {
        Some(priority) => priority.colored(),
        None => format!("P{key}"),
    }
}

/// Format status with color based on workflow state type
pub fn status_colored(status: &str, state_type: &str) -> String {
    match state_type {
        "completed" => status.green().to_string(),
        "started" => status.blue().to_string(),
        "canceled" => status.red().to_string(),
        "backlog" | "triage" => status.bright_black().to_string(),
        _ => status.to_string(),
    }
}

/// Format a date string nicely using chrono
pub fn format_date(iso: &str) -> String {
    use chrono::{DateTime, Local, Utc};

    if let Ok(dt) = iso.parse::<DateTime<Utc>>() {
        let local: DateTime<Local> = dt.into();
        local.format("%Y-%m-%d %H:%M").to_string()
    } else {
        // Fallback: just extract date portion
        iso.split('T').next().unwrap_or(iso).to_string()
    }
}

/// Format a unix timestamp in seconds
pub fn format_timestamp(secs: u64) -> String {
    use chrono::{DateTime, Local, Utc};

    let parsed = i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0));

    match parsed {
        Some(dt) => {
            let local: DateTime<Local> = dt.into();
            local.format("%Y-%m-%d %H:%M").to_string()
        }
        None => secs.to_string(),
    }
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
