//! Training dataset loader
//!
//! CSV layout: a header of symptom column names followed by one label
//! column, then one row per case with 0/1 symptom cells.

use crate::error::ScreenerError;
use crate::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// Symptom column names, in column order
    pub features: Vec<String>,
    pub rows: Vec<Vec<u8>>,
    pub labels: Vec<String>,
}

impl TrainingDataset {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScreenerError::DataUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| ScreenerError::DataUnavailable("dataset is empty".to_string()))?;

        let raw_header: Vec<String> = split_row(header_line);
        let width = raw_header.len();

        // Exports often carry a trailing unnamed column; drop those
        let mut header = raw_header;
        while header.last().is_some_and(|h| h.is_empty()) {
            header.pop();
        }
        if header.len() < 2 {
            return Err(ScreenerError::DataUnavailable(
                "dataset needs at least one symptom column and a label column".to_string(),
            ));
        }

        let n_features = header.len() - 1;
        let features = dedupe_columns(&header[..n_features]);

        let mut rows = Vec::new();
        let mut labels = Vec::new();

        for (line_idx, line) in lines {
            let line_no = line_idx + 1;
            let cells = split_row(line);
            if cells.len() != width && cells.len() != header.len() {
                return Err(ScreenerError::DataUnavailable(format!(
                    "line {}: expected {} cells, found {}",
                    line_no,
                    width,
                    cells.len()
                )));
            }

            let mut row = Vec::with_capacity(n_features);
            for (col, cell) in cells[..n_features].iter().enumerate() {
                let value: f64 = cell.parse().map_err(|_| {
                    ScreenerError::DataUnavailable(format!(
                        "line {}: column '{}' has non-numeric value '{}'",
                        line_no, features[col], cell
                    ))
                })?;
                row.push(u8::from(value != 0.0));
            }

            let label = cells[n_features].clone();
            if label.is_empty() {
                return Err(ScreenerError::DataUnavailable(format!(
                    "line {}: missing label",
                    line_no
                )));
            }

            rows.push(row);
            labels.push(label);
        }

        if rows.is_empty() {
            return Err(ScreenerError::DataUnavailable(
                "dataset has a header but no rows".to_string(),
            ));
        }

        Ok(Self {
            features,
            rows,
            labels,
        })
    }

    /// Sorted distinct labels and each row's index into them
    pub fn encode_labels(&self) -> (Vec<String>, Vec<usize>) {
        let classes: Vec<String> = self
            .labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let encoded = self
            .labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        (classes, encoded)
    }
}

/// Rename repeated column names in column order: `x`, `x.1`, `x.2`, ...
/// A generated name that collides with a later header keeps counting up.
fn dedupe_columns(names: &[String]) -> Vec<String> {
    let taken: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut assigned: HashSet<String> = HashSet::with_capacity(names.len());
    let mut columns = Vec::with_capacity(names.len());

    for name in names {
        let mut column = name.clone();
        if assigned.contains(&column) {
            let count = counts.entry(name.as_str()).or_insert(0);
            loop {
                *count += 1;
                let candidate = format!("{}.{}", name, count);
                if !taken.contains(candidate.as_str()) && !assigned.contains(&candidate) {
                    column = candidate;
                    break;
                }
            }
        }
        assigned.insert(column.clone());
        columns.push(column);
    }

    columns
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| cell.trim().trim_matches('"').trim().to_string())
        .collect()
}
