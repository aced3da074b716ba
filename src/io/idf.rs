//! IDF text reading and writing.
//!
//! Objects are written one per block:
//!
//! ```text
//! Fan:OnOff,
//!     Supply Fan,                             !- Name
//!     Always On Discrete,                     !- Availability Schedule Name
//!     0.6;                                    !- Fan Total Efficiency
//! ```
//!
//! Implicit records (nodes) are skipped when writing and rebuilt from node
//! references when reading.

use crate::error::IdfError;
use crate::idf::{IdfFieldKind, IdfRecord, IdfValue, Workspace, schema_for};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

const COMMENT_COLUMN: usize = 40;

/// Writes a workspace to an IDF file.
pub fn write_idf(path: &Path, workspace: &Workspace) -> Result<()> {
    let content = to_idf_string(workspace);
    fs::write(path, content)
        .with_context(|| format!("Failed to write IDF file: {}", path.display()))?;
    Ok(())
}

/// Reads a workspace from an IDF file.
pub fn read_idf(path: &Path) -> Result<Workspace> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read IDF file: {}", path.display()))?;
    from_idf_string(&content).with_context(|| format!("Failed to parse IDF file: {}", path.display()))
}

pub fn to_idf_string(workspace: &Workspace) -> String {
    let mut out = String::new();
    for (_, record) in workspace.records() {
        if record.schema().implicit {
            continue;
        }
        write_record(&mut out, record);
        out.push('\n');
    }
    out
}

fn write_record(out: &mut String, record: &IdfRecord) {
    let schema = record.schema();
    let mut lines: Vec<(String, String)> = Vec::new();
    if schema.has_name {
        lines.push((record.name().unwrap_or_default().to_string(), "Name".to_string()));
    }

    // Trailing blank fields are omitted unless extensible values follow.
    let values = record.values();
    let used = if record.extensible().is_empty() {
        values.iter().rposition(|v| !v.is_blank()).map_or(0, |i| i + 1)
    } else {
        values.len()
    };
    for (field, value) in schema.fields.iter().zip(values).take(used) {
        lines.push((value.to_string(), field.name.to_string()));
    }
    for (i, value) in record.extensible().iter().enumerate() {
        lines.push((value.to_string(), format!("Field {}", i + 1)));
    }

    let _ = writeln!(out, "{},", schema.name);
    let last = lines.len().saturating_sub(1);
    for (i, (value, comment)) in lines.iter().enumerate() {
        let sep = if i == last { ';' } else { ',' };
        let entry = format!("    {value}{sep}");
        let _ = writeln!(out, "{entry:<COMMENT_COLUMN$}!- {comment}");
    }
    if lines.is_empty() {
        // Objects with nothing to write still need a terminator.
        out.pop();
        out.pop();
        out.push_str(";\n");
    }
}

/// One object as read from text: type, fields and the line it starts on.
struct RawObject {
    line: usize,
    tokens: Vec<String>,
}

fn tokenize(content: &str) -> Result<Vec<RawObject>, IdfError> {
    let mut objects = Vec::new();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = None;

    for (i, raw_line) in content.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.split('!').next().unwrap_or_default();
        for c in line.chars() {
            match c {
                ',' | ';' => {
                    start.get_or_insert(line_no);
                    tokens.push(current.trim().to_string());
                    current.clear();
                    if c == ';' {
                        objects.push(RawObject {
                            line: start.take().unwrap_or(line_no),
                            tokens: std::mem::take(&mut tokens),
                        });
                    }
                }
                _ => {
                    if !c.is_whitespace() {
                        start.get_or_insert(line_no);
                    }
                    current.push(c);
                }
            }
        }
        current.push(' ');
    }

    if let Some(line) = start {
        return Err(IdfError::Parse {
            line,
            message: "object is not terminated with ';'".to_string(),
        });
    }
    Ok(objects)
}

fn parse_value(text: &str, kind: IdfFieldKind) -> IdfValue {
    if text.is_empty() {
        return IdfValue::Blank;
    }
    match kind {
        IdfFieldKind::Real => text
            .parse::<f64>()
            .map(IdfValue::Real)
            .unwrap_or_else(|_| IdfValue::Text(text.to_string())),
        _ => IdfValue::Text(text.to_string()),
    }
}

fn parse_object(raw: RawObject) -> Result<IdfRecord, IdfError> {
    let parse_err = |message: String| IdfError::Parse {
        line: raw.line,
        message,
    };
    let mut tokens = raw.tokens.iter();
    let type_name = tokens.next().map(String::as_str).unwrap_or_default();
    let schema = schema_for(type_name)
        .ok_or_else(|| parse_err(format!("unknown object type '{type_name}'")))?;

    let name = if schema.has_name {
        tokens.next().map(String::as_str).filter(|s| !s.is_empty())
    } else {
        None
    };
    let mut record = IdfRecord::new(schema.name, name).map_err(|e| parse_err(e.to_string()))?;

    for (i, text) in tokens.enumerate() {
        match schema.fields.get(i) {
            Some(field) => record.set_value_at(i, parse_value(text, field.kind)),
            None => {
                let kind = schema.extensible.ok_or_else(|| {
                    parse_err(format!(
                        "{} takes at most {} field(s)",
                        schema.name,
                        schema.fields.len() + usize::from(schema.has_name)
                    ))
                })?;
                record
                    .push_extensible(parse_value(text, kind))
                    .map_err(|e| parse_err(e.to_string()))?;
            }
        }
    }
    Ok(record)
}

/// Parses IDF text into a workspace.
///
/// Record names must be unique within their name group (all schedule types,
/// all fan types, ...). Node records are added for every referenced node name.
pub fn from_idf_string(content: &str) -> Result<Workspace> {
    let mut workspace = Workspace::new();
    for raw in tokenize(content)? {
        let line = raw.line;
        let record = parse_object(raw)?;
        if let Some(name) = record.name() {
            if workspace.is_name_taken(record.type_name(), name) {
                return Err(IdfError::Parse {
                    line,
                    message: format!("duplicate name {}", record.brief_description()),
                }
                .into());
            }
        }
        workspace.insert(record);
    }
    let nodes = workspace.materialize_nodes();
    debug!(records = workspace.len(), nodes, "Parsed IDF text");
    Ok(workspace)
}
