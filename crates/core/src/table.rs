//! Tabular results and the normalizer for delimited-text payloads

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Cell values read as "no value"; all become `""`.
const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Named columns and positionally aligned rows.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularResult {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when no data rows came back, even if a header did
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse a CSV payload (header line, then data lines) into a [`TabularResult`].
///
/// Short rows are padded with empty strings and null-like cells are replaced
/// by `""`. A row wider than the header is rejected.
pub fn normalize(payload: &str) -> Result<TabularResult> {
    let mut records = parse_records(payload)?.into_iter();

    let header = match records.next() {
        Some(header) => header,
        None => return Ok(TabularResult::default()),
    };
    let columns = header.fields;
    let width = columns.len();

    let mut rows = Vec::new();
    for record in records {
        if record.fields.len() > width {
            return Err(CoreError::RaggedRow {
                line: record.line,
                expected: width,
                actual: record.fields.len(),
            });
        }

        let mut row: Vec<String> = record.fields.into_iter().map(normalize_cell).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(TabularResult { columns, rows })
}

fn normalize_cell(cell: String) -> String {
    if NULL_MARKERS.contains(&cell.as_str()) {
        String::new()
    } else {
        cell
    }
}

struct Record {
    /// Line the record starts on (1-based)
    line: usize,
    fields: Vec<String>,
}

/// RFC 4180 reader: comma separated, `"` quoted, `""` escapes a quote,
/// quoted fields may span lines. Blank lines are skipped.
fn parse_records(payload: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut touched = false;
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut record_line = 1;

    let mut chars = payload.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
                touched = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                touched = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                if touched || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    records.push(Record {
                        line: record_line,
                        fields: std::mem::take(&mut fields),
                    });
                }
                touched = false;
                line += 1;
                record_line = line;
            }
            _ => {
                field.push(ch);
                touched = true;
            }
        }
    }

    if in_quotes {
        return Err(CoreError::UnterminatedQuote(quote_line));
    }

    if touched || !field.is_empty() {
        fields.push(field);
        records.push(Record {
            line: record_line,
            fields,
        });
    }

    Ok(records)
}
