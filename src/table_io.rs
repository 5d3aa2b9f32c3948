// Delimited-text reader for raw probe logs and writers for the RTT table.
// Handles double-quoted fields (with "" escapes); one record per line.

use std::io::{BufRead, Write};

use crate::error::{PipelineError, Result};
use crate::models::{ProbeRecord, RttTable};

/// Raw log column holding the flow identifier.
pub const FLOW_ID_COLUMN: &str = "ssid";
/// Raw log column holding the probe send timestamp.
pub const SEND_TIME_COLUMN: &str = "test_tx";
/// Raw log column holding the reply receive timestamp.
pub const REPLY_TIME_COLUMN: &str = "reply_rx";

/// Reads probe records from a delimited table with a header row. Column order is free and
/// extra columns are ignored. An empty or header-only input yields no records.
///
/// Timestamps must be finite; `NaN` or `inf` is a parse error. They are read as `f64`, so
/// integer stamps above 2^53 (e.g. nanosecond epochs) lose precision before the RTT
/// subtraction. Microsecond epochs and smaller units are exact.
pub fn read_probes<R: BufRead>(reader: R, separator: char) -> Result<Vec<ProbeRecord>> {
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break split_record(&line, separator);
                }
            }
            None => return Ok(Vec::new()),
        }
    };
    let position = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::Schema {
                column: name.to_string(),
            })
    };
    let flow_idx = position(FLOW_ID_COLUMN)?;
    let send_idx = position(SEND_TIME_COLUMN)?;
    let reply_idx = position(REPLY_TIME_COLUMN)?;

    let mut records = Vec::new();
    for (n, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = n + 1;
        let fields = split_record(&line, separator);
        let field = |idx: usize, name: &str| {
            fields.get(idx).ok_or_else(|| PipelineError::Parse {
                line: line_no,
                column: name.to_string(),
                value: String::new(),
            })
        };
        let number = |idx: usize, name: &str| -> Result<f64> {
            let raw = field(idx, name)?;
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PipelineError::Parse {
                    line: line_no,
                    column: name.to_string(),
                    value: raw.clone(),
                })
        };
        records.push(ProbeRecord {
            flow_id: field(flow_idx, FLOW_ID_COLUMN)?.clone(),
            send_time: number(send_idx, SEND_TIME_COLUMN)?,
            reply_time: number(reply_idx, REPLY_TIME_COLUMN)?,
        });
    }
    Ok(records)
}

/// Writes `Time`, `Aggregate-Flow`, then one column per flow. Gaps become empty fields.
pub fn write_table<W: Write>(mut writer: W, table: &RttTable, separator: char) -> Result<()> {
    let sep = separator.to_string();
    let header: Vec<String> = table
        .header()
        .into_iter()
        .map(|h| quote_field(h, separator))
        .collect();
    writeln!(writer, "{}", header.join(&sep))?;

    let columns: Vec<&Vec<Option<f64>>> = table.flows.values().collect();
    for row in 0..table.len() {
        let mut cells = Vec::with_capacity(2 + columns.len());
        cells.push(table.time[row].to_string());
        cells.push(table.aggregate[row].to_string());
        cells.extend(
            columns
                .iter()
                .map(|col| col[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        writeln!(writer, "{}", cells.join(&sep))?;
    }
    writer.flush()?;
    Ok(())
}

/// JSON form of the table; gaps serialize as `null`.
pub fn write_table_json<W: Write>(mut writer: W, table: &RttTable) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, table)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Splits one line into trimmed fields, honouring double quotes.
fn split_record(line: &str, separator: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn quote_field(field: &str, separator: char) -> String {
    if field.contains(separator) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
