// CSV loading: reads the whole input file up front so the importer can walk
// the same rows once per resource type without touching the disk again.

use crate::error::{ImportError, Result};
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Header names and raw cell values, both trimmed. Headers are neither
/// deduplicated nor checked here.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
    /// File line each record starts on. Quoted cells may span lines and
    /// blank lines are skipped, so this is not simply the record index.
    pub lines: Vec<usize>,
}

/// One data line viewed through the header row.
#[derive(Debug, Clone)]
pub struct Row {
    line: usize,
    fields: HashMap<String, String>,
}

impl Row {
    pub fn new(line: usize, headers: &[String], values: &[String]) -> Self {
        let fields = headers
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.clone(), v.trim().to_string()))
            .collect();
        Row { line, fields }
    }

    /// 1-based line number in the source file (the header is line 1).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Non-empty value of `column`, if any.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value of `column`, or the empty string.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

impl CsvTable {
    /// Read the file at `path`. The first line is the header row.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ImportError::Input(format!(
                "CSV file not found: {}",
                path.display()
            )));
        }
        let file = File::open(path).map_err(|e| {
            ImportError::Input(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(BufReader::new(file));

        let parse_err =
            |e: csv::Error| ImportError::Input(format!("cannot parse {}: {}", path.display(), e));

        let headers = rdr
            .headers()
            .map_err(parse_err)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        let mut lines = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(parse_err)?;
            lines.push(record.position().map(|p| p.line() as usize).unwrap_or(0));
            records.push(record.iter().map(|c| c.trim().to_string()).collect());
        }
        tracing::debug!(rows = records.len(), "loaded {}", path.display());
        Ok(CsvTable {
            headers,
            records,
            lines,
        })
    }

    pub fn rows(&self) -> Vec<Row> {
        self.records
            .iter()
            .enumerate()
            .map(|(idx, values)| {
                let line = self
                    .lines
                    .get(idx)
                    .copied()
                    .filter(|l| *l > 0)
                    .unwrap_or(idx + 2);
                Row::new(line, &self.headers, values)
            })
            .collect()
    }
}
