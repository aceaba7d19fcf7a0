//! Terminal output helpers for consistent CLI formatting

use memberscope_core::{AuditRecord, AuditSummary};

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Print a warning message (yellow)
pub fn print_warning(message: &str) {
    if use_color() {
        eprintln!("\x1b[33mWarning:\x1b[0m {}", message);
    } else {
        eprintln!("Warning: {}", message);
    }
}

/// Print a header with decorative border
pub fn print_header(title: &str) {
    let border = "═".repeat(59);
    println!();
    println!("{}", border);
    println!("{:^59}", title);
    println!("{}", border);
    println!();
}

/// Print a key-value pair with consistent formatting
pub fn print_key_value(key: &str, value: &str) {
    if use_color() {
        println!("  \x1b[1m{}:\x1b[0m {}", key, value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Truncate a string for table display, handling Unicode safely.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Print one identity's groups as a table.
pub fn print_group_table(records: &[AuditRecord]) {
    println!("{:<40} {:<14} {:<30}", "GROUP", "SCOPE", "SCOPE NAME");
    println!("{}", "-".repeat(86));

    for record in records {
        let scope = record
            .scope_type
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:<14} {:<30}",
            truncate(&record.group_name, 38),
            scope,
            truncate(&record.scope_name, 28)
        );
    }
}

/// Print run totals.
pub fn print_summary(summary: &AuditSummary) {
    print_key_value(
        "Identities",
        &format!(
            "{} processed of {} ({} failed, {} skipped)",
            summary.identities_processed,
            summary.identities_total,
            summary.identities_failed,
            summary.identities_skipped
        ),
    );
    print_key_value(
        "Groups",
        &format!(
            "{} resolved of {} discovered ({} failed, {} excluded)",
            summary.groups_resolved,
            summary.groups_discovered,
            summary.groups_failed,
            summary.groups_excluded
        ),
    );
    if summary.nested_lookups_failed > 0 {
        print_key_value(
            "Nested lookups failed",
            &summary.nested_lookups_failed.to_string(),
        );
    }
    print_key_value(
        "Records",
        &format!(
            "{} memberships, {} without groups",
            summary.records, summary.sentinel_records
        ),
    );
    print_key_value(
        "Group cache",
        &format!("{} hits, {} fetches", summary.cache_hits, summary.cache_fetches),
    );
    print_key_value("Elapsed", &format!("{:.1?}", summary.elapsed));
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{:.2} MB", b / (KB * KB))
    }
}
