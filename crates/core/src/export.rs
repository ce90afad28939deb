// crates/core/src/export.rs
//! File exporter for caller-supplied data (JSON and CSV).
//!
//! Fire-and-forget from the bridge's perspective: each call writes exactly
//! one file under the configured export directory and returns its path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;

/// Writes export files under a fixed output directory.
pub struct Exporter {
    out_dir: PathBuf,
}

impl Exporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// The directory this exporter writes into.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write `data` as pretty-printed JSON. Returns the written path.
    pub fn write_json(&self, name: &str, data: &serde_json::Value) -> Result<PathBuf, ExportError> {
        let path = self.target_path(name, "json")?;
        let mut bytes = serde_json::to_vec_pretty(data)?;
        bytes.push(b'\n');
        fs::write(&path, bytes).map_err(|e| ExportError::io(&path, e))?;
        tracing::info!(path = %path.display(), "wrote JSON export");
        Ok(path)
    }

    /// Write tabular rows as RFC 4180 CSV. Returns the written path.
    pub fn write_csv(
        &self,
        name: &str,
        header: &[String],
        rows: &[Vec<String>],
    ) -> Result<PathBuf, ExportError> {
        let path = self.target_path(name, "csv")?;
        let mut csv = String::new();
        push_row(&mut csv, header);
        for row in rows {
            push_row(&mut csv, row);
        }
        fs::write(&path, csv).map_err(|e| ExportError::io(&path, e))?;
        tracing::info!(path = %path.display(), rows = rows.len(), "wrote CSV export");
        Ok(path)
    }

    /// Resolve the suggested name to a flat file inside `out_dir`, creating
    /// the directory on first use.
    fn target_path(&self, name: &str, ext: &str) -> Result<PathBuf, ExportError> {
        let stem = sanitize_name(name);
        if stem.is_empty() {
            return Err(ExportError::EmptyName {
                name: name.to_string(),
            });
        }
        fs::create_dir_all(&self.out_dir).map_err(|e| ExportError::io(&self.out_dir, e))?;
        Ok(self.out_dir.join(format!("{stem}.{ext}")))
    }
}

/// Reduce a suggested name to a safe flat file stem.
///
/// Path separators and anything outside `[A-Za-z0-9._-]` become `_`; leading
/// dots are stripped so the result can never traverse out of the directory
/// or hide itself.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn push_row(csv: &mut String, fields: &[String]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape_csv_field(f)).collect();
    csv.push_str(&escaped.join(","));
    csv.push('\n');
}

/// Escape a CSV field per RFC 4180.
///
/// Fields containing comma, double quote, or a line break are wrapped in
/// double quotes with internal quotes doubled.
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
