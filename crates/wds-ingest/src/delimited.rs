//! Delimited-text parsing with delimiter sniffing.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{IngestError, Result};
use crate::source::{SourceData, rows_to_source};

/// Load a delimited text file. The delimiter is sniffed from the header
/// line among comma, semicolon, and tab; comma wins ties.
pub fn load(path: &Path) -> Result<SourceData> {
    let content = fs::read_to_string(path)?;
    let header_line = content
        .lines()
        .next()
        .ok_or_else(|| IngestError::EmptySource(path.display().to_string()))?;
    let delimiter = sniff_delimiter(header_line);
    debug!(delimiter = %(delimiter as char), "sniffed delimiter");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    rows_to_source(rows, path)
}

fn sniff_delimiter(header: &str) -> u8 {
    let mut best = b',';
    let mut best_count = count(header, b',');
    for candidate in [b';', b'\t'] {
        let candidate_count = count(header, candidate);
        if candidate_count > best_count {
            best = candidate;
            best_count = candidate_count;
        }
    }
    best
}

fn count(line: &str, byte: u8) -> usize {
    line.bytes().filter(|b| *b == byte).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_comma_separated() {
        let (_dir, path) = write_temp("data.csv", "name,age\nalice,30\nbob,41\n");
        let source = load(&path).unwrap();
        assert_eq!(source.columns, vec!["name".to_string(), "age".to_string()]);
        assert_eq!(source.records.len(), 2);
        assert_eq!(source.records[0]["name"], "alice");
        assert_eq!(source.records[1]["age"], "41");
    }

    #[test]
    fn sniffs_semicolon() {
        let (_dir, path) = write_temp("data.csv", "name;age\nalice;30\n");
        let source = load(&path).unwrap();
        assert_eq!(source.columns, vec!["name".to_string(), "age".to_string()]);
        assert_eq!(source.records[0]["age"], "30");
    }

    #[test]
    fn sniffs_tab() {
        let (_dir, path) = write_temp("data.txt", "name\tage\nalice\t30\n");
        let source = load(&path).unwrap();
        assert_eq!(source.columns, vec!["name".to_string(), "age".to_string()]);
    }

    #[test]
    fn missing_trailing_cells_become_empty() {
        let (_dir, path) = write_temp("data.csv", "a,b,c\n1,2\n");
        let source = load(&path).unwrap();
        assert_eq!(source.records[0]["c"], "");
    }

    #[test]
    fn empty_file_is_an_error() {
        let (_dir, path) = write_temp("data.csv", "");
        assert!(matches!(load(&path), Err(IngestError::EmptySource(_))));
    }

    #[test]
    fn comma_wins_delimiter_ties() {
        let (_dir, path) = write_temp("data.csv", "a,b\n1,2\n");
        let source = load(&path).unwrap();
        assert_eq!(source.columns.len(), 2);
    }
}
