use anyhow::{anyhow, Result};
use std::{fmt::Write as FmtWrite, fs, path::Path};

/// Builds a `Vec<String>` row from heterogeneous displayable values.
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        vec![$($value.to_string()),*]
    };
}

/// Rectangular table rendered as comma-separated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: ToString>(header: &[S]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.header.len() {
            return Err(anyhow!(
                "Row has {} fields but header has {}",
                row.len(),
                self.header.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for fields in std::iter::once(&self.header).chain(self.rows.iter()) {
            let line = fields
                .iter()
                .map(|f| escape(f))
                .collect::<Vec<String>>()
                .join(",");
            let _ = writeln!(out, "{}", line);
        }
        out
    }

    /// Writes the CSV to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_csv())
            .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))
    }
}

fn escape(field: &str) -> String {
    if field.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
