use crate::enums::connection_status::ConnectionStatus;
use crate::enums::priority::Priority;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::bulk_outcome::BulkOutcome;
use crate::structs::engine_status::EngineStatus;
use crate::structs::history_group::HistoryGroup;
use crate::structs::line_history_entry::LineHistoryEntry;
use crate::structs::validation_report::{IssueSeverity, ValidationReport};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Terminal tables for the one-shot CLI commands.
pub struct ReportPrinter;

impl ReportPrinter {
    pub fn print_status(engine_url: &str, connection: ConnectionStatus, status: Option<&EngineStatus>) {
        println!("\n🩺 Engine status");
        println!("{}", RULE);
        println!("  URL:          {}", engine_url);
        println!("  Connection:   {}", connection);
        match status {
            Some(status) => {
                let health = if status.is_healthy() { "✅" } else { "⚠️" };
                println!("  Health:       {} {}", health, status.status);
                println!("  Version:      {}", status.version);
                println!("  Uptime:       {}s", status.uptime);
                println!("  Connections:  {}", status.active_connections);
                println!("  Pending:      {}", status.pending_approvals);
            }
            None => println!("  Health:       ❌ unreachable"),
        }
        println!("{}", RULE);
    }

    pub fn print_queue(groups: &[(Priority, Vec<ApprovalRequest>)]) {
        let total: usize = groups.iter().map(|(_, requests)| requests.len()).sum();
        println!("\n📋 Pending approvals ({})", total);
        println!("{}", RULE);
        if total == 0 {
            println!("  Nothing waiting for a decision 🎉");
        }
        for (priority, requests) in groups {
            println!("\n{} {} priority", priority.emoji(), priority);
            for request in requests {
                println!(
                    "  {:<38} {} ({} line(s), {})",
                    request.id,
                    request.title,
                    request.line_change_count(),
                    request.created_at.format("%Y-%m-%d %H:%M")
                );
                for path in request.file_paths() {
                    println!("      📄 {}", path);
                }
            }
        }
        println!("{}", RULE);
    }

    pub fn print_history(groups: &[HistoryGroup], has_more: bool) {
        println!("\n📜 Change history");
        println!("{}", RULE);
        if groups.is_empty() {
            println!("  No resolved requests yet");
        }
        for group in groups {
            println!("\n📅 {}", group.label);
            for entry in &group.entries {
                let decided = entry.effective_time().format("%H:%M");
                println!("  {} {} {:<10} {}", decided, entry.status.emoji(), entry.status, entry.title);
                if let Some(reason) = &entry.reason {
                    println!("        💬 {}", reason);
                }
            }
        }
        if has_more {
            println!("\n  … more available (use --pages to load further)");
        }
        println!("{}", RULE);
    }

    pub fn print_line_history(file_path: &str, line: usize, entries: &[LineHistoryEntry]) {
        println!("\n🕰️ History of {}:{}", file_path, line);
        println!("{}", RULE);
        if entries.is_empty() {
            println!("  No recorded changes");
        }
        for entry in entries {
            let status = entry.status.map(|s| format!("{} {}", s.emoji(), s)).unwrap_or_default();
            println!(
                "  {} {:<9} {} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.change_type.as_str(),
                entry.author.as_deref().unwrap_or("-"),
                status
            );
            if let Some(content) = &entry.content {
                println!("      | {}", content);
            }
        }
        println!("{}", RULE);
    }

    pub fn print_validation(report: &ValidationReport) {
        let verdict = if report.valid { "✅ valid" } else { "❌ invalid" };
        println!("\n🔎 Validation of {}: {}", report.file_path, verdict);
        for issue in &report.issues {
            let marker = match issue.severity {
                IssueSeverity::Error => "\x1b[31m🛑\x1b[0m",
                IssueSeverity::Warning => "\x1b[33m⚠️\x1b[0m",
            };
            println!("  {} line {:<5} {}", marker, issue.line, issue.message);
        }
    }

    pub fn print_bulk(outcome: &BulkOutcome, verb: &str) {
        if outcome.failed.is_empty() {
            println!("✅ {}", outcome.summary(verb));
            return;
        }
        println!("⚠️ {}", outcome.summary(verb));
        for (id, error) in &outcome.failed {
            println!("   ❌ {}: {}", id, error.user_message());
        }
    }
}
