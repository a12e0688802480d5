//! Output boundary.
//!
//! Commands produce plain JSON values; a [`Renderer`] turns them into
//! console output. [`ConsoleRenderer`] is what the binary uses,
//! [`MemoryRenderer`] records everything for tests and embedders.

use std::sync::Mutex;

use comfy_table::{Table, presets};
use serde_json::{Map, Value};

use crate::options::OutputFormat;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub format: OutputFormat,
    /// Properties shown in text and csv output. `None` shows everything.
    pub default_properties: Option<&'a [&'a str]>,
}

pub trait Renderer: Send + Sync {
    /// Emits a command's result value.
    fn render(&self, value: &Value, options: &RenderOptions<'_>);

    /// Emits a progress or informational line on stderr.
    fn status(&self, message: &str);
}

/// Formats `value` for display.
pub fn format_value(value: &Value, options: &RenderOptions<'_>) -> String {
    match options.format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
        OutputFormat::Text => format_text(value, options.default_properties),
        OutputFormat::Csv => format_csv(value, options.default_properties),
    }
}

fn rows(value: &Value) -> Vec<&Map<String, Value>> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(object) => vec![object],
        _ => Vec::new(),
    }
}

/// Column names: the requested properties, or the union of all keys.
fn columns(rows: &[&Map<String, Value>], properties: Option<&[&str]>) -> Vec<String> {
    if let Some(properties) = properties {
        return properties.iter().map(|p| p.to_string()).collect();
    }
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn format_text(value: &Value, properties: Option<&[&str]>) -> String {
    match value {
        Value::Array(_) => {
            let rows = rows(value);
            let columns = columns(&rows, properties);
            let mut table = Table::new();
            table.load_preset(presets::NOTHING);
            table.set_header(columns.clone());
            for row in &rows {
                table.add_row(columns.iter().map(|c| cell(row.get(c))).collect::<Vec<_>>());
            }
            table.to_string()
        }
        Value::Object(object) => columns(&[object], properties)
            .iter()
            .map(|key| format!("{key}: {}", cell(object.get(key))))
            .collect::<Vec<_>>()
            .join("\n"),
        other => cell(Some(other)),
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_csv(value: &Value, properties: Option<&[&str]>) -> String {
    let rows = rows(value);
    if rows.is_empty() {
        return cell(Some(value));
    }
    let columns = columns(&rows, properties);
    let mut lines = vec![
        columns
            .iter()
            .map(|c| csv_field(c))
            .collect::<Vec<_>>()
            .join(","),
    ];
    for row in &rows {
        lines.push(
            columns
                .iter()
                .map(|c| csv_field(&cell(row.get(c))))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Writes results to stdout and status lines to stderr.
#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn render(&self, value: &Value, options: &RenderOptions<'_>) {
        println!("{}", format_value(value, options));
    }

    fn status(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Records rendered values and status lines in memory.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    values: Mutex<Vec<Value>>,
    status: Mutex<Vec<String>>,
}

impl MemoryRenderer {
    pub fn values(&self) -> Vec<Value> {
        self.values.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn status_lines(&self) -> Vec<String> {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Total number of emitted lines, results and status combined.
    pub fn line_count(&self) -> usize {
        self.values().len() + self.status_lines().len()
    }
}

impl Renderer for MemoryRenderer {
    fn render(&self, value: &Value, _options: &RenderOptions<'_>) {
        if let Ok(mut values) = self.values.lock() {
            values.push(value.clone());
        }
    }

    fn status(&self, message: &str) {
        if let Ok(mut status) = self.status.lock() {
            status.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const APP_PROPERTIES: &[&str] = &["Title", "ID"];

    fn apps() -> Value {
        json!([
            {"ID": "b2307a39", "Title": "online, solution", "Deployed": true},
            {"ID": "e5f65aef", "Title": "onprem \"solution\"", "Deployed": false}
        ])
    }

    fn options(
        format: OutputFormat,
        properties: Option<&'static [&'static str]>,
    ) -> RenderOptions<'static> {
        RenderOptions {
            format,
            default_properties: properties,
        }
    }

    #[test]
    fn json_output_keeps_all_properties() {
        let out = format_value(&apps(), &options(OutputFormat::Json, Some(APP_PROPERTIES)));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, apps());
    }

    #[test]
    fn csv_output_projects_and_quotes() {
        let out = format_value(&apps(), &options(OutputFormat::Csv, Some(APP_PROPERTIES)));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Title,ID");
        assert_eq!(lines[1], "\"online, solution\",b2307a39");
        assert_eq!(lines[2], "\"onprem \"\"solution\"\"\",e5f65aef");
    }

    #[test]
    fn csv_without_projection_uses_all_keys() {
        let out = format_value(&apps(), &options(OutputFormat::Csv, None));
        assert_eq!(out.lines().next(), Some("Deployed,ID,Title"));
    }

    #[test]
    fn text_table_shows_only_default_properties() {
        let out = format_value(&apps(), &options(OutputFormat::Text, Some(APP_PROPERTIES)));
        assert!(out.contains("Title"));
        assert!(out.contains("b2307a39"));
        assert!(!out.contains("Deployed"));
    }

    #[test]
    fn text_object_prints_key_value_lines() {
        let out = format_value(
            &json!({"id": "1", "accountEnabled": false}),
            &options(OutputFormat::Text, None),
        );
        assert_eq!(out, "accountEnabled: false\nid: 1");
    }

    #[test]
    fn memory_renderer_records_everything() {
        let renderer = MemoryRenderer::default();
        renderer.render(&apps(), &options(OutputFormat::Json, None));
        renderer.status("No apps found.");
        assert_eq!(renderer.values(), vec![apps()]);
        assert_eq!(renderer.status_lines(), vec!["No apps found."]);
        assert_eq!(renderer.line_count(), 2);
    }
}
