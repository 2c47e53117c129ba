use serde::Deserialize;
use tracing::trace;

use crate::domain::CatError;

/// Split delimited text into rows of raw cells.
///
/// Quoted fields may contain commas and newlines, `""` inside quotes is a
/// literal quote, and a bare `\r` outside quotes is dropped so CRLF and LF
/// input produce the same rows. The lexer never fails: an unterminated quote
/// swallows the rest of the input into the current field.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            '\r' => {}
            _ => field.push(c),
        }
    }
    row.push(field);
    rows.push(row);

    trace!("Lexed {} rows", rows.len());
    rows
}

/// True when every cell of the row is empty after trimming.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

// Google Sheets "gviz" responses wrap a JSON object in a JS callback.
#[derive(Debug, Deserialize)]
struct GvizResponse {
    table: GvizTableJson,
}

#[derive(Debug, Default, Deserialize)]
struct GvizTableJson {
    #[serde(default)]
    cols: Vec<GvizCol>,
    #[serde(default)]
    rows: Vec<GvizRow>,
}

#[derive(Debug, Deserialize)]
struct GvizCol {
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GvizRow {
    #[serde(default)]
    c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Deserialize)]
struct GvizCell {
    #[serde(default)]
    v: Option<serde_json::Value>,
}

/// Cells and column labels extracted from a gviz response.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GvizTable {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Unwrap a gviz `google.visualization.Query.setResponse(...)` payload.
///
/// Cell values are stringified and trimmed, `null` cells become empty strings.
pub fn parse_gviz(text: &str) -> Result<GvizTable, CatError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => return Err(CatError::LoadingFailed("gviz wrapper not found".into())),
    };

    let response: GvizResponse = serde_json::from_str(&text[start..=end])?;
    let labels = response
        .table
        .cols
        .iter()
        .map(|c| c.label.clone().unwrap_or_default())
        .collect();
    let rows = response
        .table
        .rows
        .iter()
        .map(|r| {
            r.c.iter()
                .map(|cell| {
                    cell.as_ref()
                        .and_then(|c| c.v.as_ref())
                        .map(json_cell_to_string)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok(GvizTable { labels, rows })
}

fn json_cell_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
