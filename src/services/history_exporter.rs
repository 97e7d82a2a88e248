use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use crate::enums::export_format::ExportFormat;
use crate::errors::{ClientError, ClientResult};
use crate::structs::change_history_entry::ChangeHistoryEntry;

const CSV_HEADER: [&str; 10] = [
    "id",
    "requestId",
    "title",
    "status",
    "priority",
    "files",
    "changeCount",
    "createdAt",
    "completedAt",
    "reason",
];

/// Formats loaded history records. No I/O happens here; callers decide where
/// the text goes.
pub struct HistoryExporter;

impl HistoryExporter {
    pub fn export(entries: &[ChangeHistoryEntry], format: ExportFormat, exported_at: DateTime<Utc>) -> ClientResult<String> {
        match format {
            ExportFormat::Json => Self::to_json(entries, exported_at),
            ExportFormat::Csv => Self::to_csv(entries),
        }
    }

    pub fn to_json(entries: &[ChangeHistoryEntry], exported_at: DateTime<Utc>) -> ClientResult<String> {
        let document = json!({
            "exportedAt": exported_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "count": entries.len(),
            "entries": entries,
        });
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn to_csv(entries: &[ChangeHistoryEntry]) -> ClientResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER).map_err(csv_error)?;

        for entry in entries {
            let completed_at = entry
                .completed_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default();
            let files = entry.file_paths.join(";");
            let change_count = entry.change_count.to_string();
            let created_at = entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
            writer
                .write_record([
                    entry.id.as_str(),
                    entry.request_id.as_str(),
                    entry.title.as_str(),
                    entry.status.as_str(),
                    entry.priority.as_str(),
                    files.as_str(),
                    change_count.as_str(),
                    created_at.as_str(),
                    completed_at.as_str(),
                    entry.reason.as_deref().unwrap_or(""),
                ])
                .map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ClientError::system_error("CSV export", &e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ClientError::parse("CSV", &e.to_string()))
    }
}

fn csv_error(error: csv::Error) -> ClientError {
    ClientError::system_error("CSV export", &error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::approval_status::ApprovalStatus;
    use crate::services::fake_engine::{at, history_entry};

    #[test]
    fn json_export_wraps_entries_with_metadata() {
        let entries = vec![history_entry("h1", ApprovalStatus::Approved, at(10))];

        let text = HistoryExporter::export(&entries, ExportFormat::Json, at(60)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["exportedAt"], "2024-05-01T10:00:00Z");
        assert_eq!(value["entries"][0]["requestId"], "req-h1");
        assert_eq!(value["entries"][0]["status"], "approved");
    }

    #[test]
    fn csv_export_quotes_fields_containing_commas() {
        let mut entry = history_entry("h1", ApprovalStatus::Rejected, at(10));
        entry.title = "Rename a, b".to_string();
        entry.reason = Some("too risky".to_string());
        entry.file_paths.push("src/b.ts".to_string());

        let text = HistoryExporter::to_csv(&[entry]).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), CSV_HEADER.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("h1,req-h1,\"Rename a, b\",rejected,medium,src/a.ts;src/b.ts,1,"));
        assert!(row.ends_with(",2024-05-01T09:10:00Z,too risky"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_history_still_exports_a_header() {
        let text = HistoryExporter::to_csv(&[]).unwrap();
        assert_eq!(text.trim_end(), CSV_HEADER.join(","));
    }
}
