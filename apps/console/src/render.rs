use finconsole_core::execution::{ExecutionRecord, ExecutionStatus};
use finconsole_core::form::{EditMode, FieldKind, FieldSpec};
use finconsole_core::pages::PageCatalog;
use finconsole_core::session::PageSession;
use finconsole_core::view::{HistoryRow, RecordDetail};
use serde_json::Value;
use std::fmt::Write;

pub const HELP: &str = "\
Commands:
  pages                  list debug pages
  open <key>             open a page (resets form and history)
  show                   show the current form
  set <field> <value>    edit one field (form mode)
  mode [form|json]       switch or toggle the edit mode
  raw <json>             replace the JSON text (switches to json mode)
  fill                   AI auto-fill (form mode)
  submit                 execute the current payload
  history                list execution records, newest first
  view <n|id>            show one record in full
  env [DEV|TEST|PROD]    show or switch the environment
  help                   this text
  quit                   leave";

pub fn pages(catalog: &PageCatalog, current: &str) -> String {
    let mut out = String::new();
    for page in catalog.iter() {
        let marker = if page.key == current { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:<10} {:<22} {} {}",
            marker, page.key, page.title, page.method, page.endpoint
        );
    }
    out.trim_end().to_string()
}

pub fn page(session: &PageSession) -> String {
    let page = session.page();
    let form = session.form();
    let mut out = String::new();

    let _ = writeln!(out, "== {} [{}] ==", page.title, session.environment());
    let _ = writeln!(out, "{}", page.description);
    let _ = writeln!(out, "{} {}", page.method, page.endpoint);

    match form.mode() {
        EditMode::Structured => {
            let _ = writeln!(out, "-- Request Parameters (form) --");
            for field in form.fields() {
                let value = form.value(&field.name).unwrap_or(&Value::Null);
                let _ = writeln!(out, "{}", field_line(field, value));
            }
            let missing = form.missing_required();
            if !missing.is_empty() {
                let _ = writeln!(out, "required but empty: {}", missing.join(", "));
            }
        }
        EditMode::Raw => {
            let _ = writeln!(out, "-- Request Parameters (json) --");
            let _ = writeln!(out, "{}", form.raw_text());
        }
    }
    out.trim_end().to_string()
}

fn field_line(field: &FieldSpec, value: &Value) -> String {
    let marker = if field.required { "*" } else { " " };
    let shown = match value {
        Value::String(s) if s.is_empty() => field
            .placeholder
            .as_ref()
            .map(|p| format!("<{}>", p))
            .unwrap_or_default(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut line = format!(
        "{} {:<18} {:<16} = {}",
        marker,
        field.label,
        format!("{} ({})", field.name, field.kind),
        shown
    );
    if field.kind == FieldKind::Select {
        let choices: Vec<String> = field
            .options
            .iter()
            .flatten()
            .map(|o| match &o.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        let _ = write!(line, "   [{}]", choices.join("|"));
    }
    line
}

pub fn history(rows: &[HistoryRow]) -> String {
    if rows.is_empty() {
        return "No executions yet.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "-- Execution History --");
    let _ = writeln!(
        out,
        "{:>3}  {:<8} {:<9} {:<22} {:>8}  {}",
        "#", "STATUS", "TIME", "SUMMARY", "LATENCY", "ID"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>3}  {:<8} {:<9} {:<22} {:>8}  {}",
            row.index,
            row.status.as_str(),
            row.time,
            row.summary,
            row.latency,
            &row.id[..8]
        );
    }
    out.trim_end().to_string()
}

pub fn detail(detail: &RecordDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Transaction Details [{}] ==", detail.status.as_str());
    let _ = writeln!(out, "ID: {}  ENV: {}", detail.id, detail.environment);
    let _ = writeln!(out, "{}: {}", detail.headline, detail.summary);
    let _ = writeln!(out, "-- Request Payload --");
    let _ = writeln!(out, "{}", detail.request_json);
    let _ = writeln!(out, "-- Response Payload --");
    let _ = writeln!(out, "{}", detail.response_json);
    out.trim_end().to_string()
}

pub fn record_line(record: &ExecutionRecord) -> String {
    let mark = match record.status {
        ExecutionStatus::Success => "ok",
        ExecutionStatus::Error => "!!",
    };
    format!(
        "[{}] {} {} in {}ms ({})",
        mark,
        record.status.as_str(),
        record.summary,
        record.latency_ms,
        &record.id.to_string()[..8]
    )
}

pub fn alert(message: &str) -> String {
    format!("ALERT: {}", message)
}
