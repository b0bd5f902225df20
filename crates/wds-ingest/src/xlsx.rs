//! Minimal XLSX worksheet reading.
//!
//! An .xlsx file is a zip container of XML parts. This reader resolves
//! the shared-string table and walks the first worksheet's cells; styles,
//! formulas, and additional sheets are ignored. Only what the mapping
//! workflow needs: a header row and text values.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{IngestError, Result};
use crate::source::{SourceData, rows_to_source};

pub fn load(path: &Path) -> Result<SourceData> {
    let file = File::open(path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| IngestError::Workbook(e.to_string()))?;

    let shared = match read_entry_optional(&mut archive, "xl/sharedStrings.xml")? {
        Some(bytes) => parse_shared_strings(&bytes)?,
        None => Vec::new(),
    };

    let sheet_path = first_sheet_path(&archive)?;
    let sheet_bytes = read_entry(&mut archive, &sheet_path)?;
    let rows = parse_sheet(&sheet_bytes, &shared)?;
    rows_to_source(rows, path)
}

fn first_sheet_path(archive: &ZipArchive<File>) -> Result<String> {
    let mut sheets: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    if sheets.iter().any(|s| s == "xl/worksheets/sheet1.xml") {
        return Ok("xl/worksheets/sheet1.xml".to_string());
    }
    sheets.sort();
    sheets
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::Workbook("workbook contains no worksheets".to_string()))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| IngestError::Workbook(e.to_string()))?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn read_entry_optional(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(IngestError::Workbook(e.to_string())),
    }
}

fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"si" => {
                current.clear();
                in_si = true;
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" && in_si => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| IngestError::Xml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"si" => {
                strings.push(current.clone());
                in_si = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(IngestError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

fn parse_sheet(xml: &[u8], shared: &[String]) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    // (row, col) -> value; rows assembled densely afterwards.
    let mut cells: Vec<(u32, u32, String)> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"c" => {
                let start = e.to_owned();
                if let Some(cell) = parse_cell(&mut reader, &start, shared)? {
                    cells.push(cell);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(IngestError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(assemble_rows(cells))
}

fn parse_cell(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    shared: &[String],
) -> Result<Option<(u32, u32, String)>> {
    let address = attr_value(start, b"r")?
        .ok_or_else(|| IngestError::Xml("cell missing address".to_string()))?;
    let (row, col) = address_to_index(&address)
        .ok_or_else(|| IngestError::Xml(format!("invalid cell address: {address}")))?;
    let cell_type = attr_value(start, b"t")?;

    let mut value_text: Option<String> = None;
    let mut inline_text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"v" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| IngestError::Xml(e.to_string()))?;
                value_text = Some(text.into_owned());
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| IngestError::Xml(e.to_string()))?;
                inline_text = Some(text.into_owned());
            }
            Ok(Event::End(e)) if e.name().as_ref() == start.name().as_ref() => break,
            Ok(Event::Eof) => {
                return Err(IngestError::Xml("unexpected EOF inside cell".to_string()));
            }
            Err(e) => return Err(IngestError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let value = match (inline_text, value_text, cell_type.as_deref()) {
        (Some(text), _, _) => text,
        (None, Some(raw), Some("s")) => {
            let index: usize = raw
                .trim()
                .parse()
                .map_err(|_| IngestError::Workbook(format!("bad shared-string index: {raw}")))?;
            shared
                .get(index)
                .cloned()
                .ok_or_else(|| {
                    IngestError::Workbook(format!("shared string index {index} out of bounds"))
                })?
        }
        (None, Some(raw), _) => raw,
        (None, None, _) => return Ok(None),
    };

    Ok(Some((row, col, value)))
}

fn attr_value(start: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| IngestError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| IngestError::Xml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parse an A1 address into zero-based (row, col). `None` when malformed.
fn address_to_index(a1: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_letter = false;
    let mut saw_digit = false;

    for ch in a1.chars() {
        if ch.is_ascii_alphabetic() {
            if saw_digit {
                return None;
            }
            saw_letter = true;
            let upper = ch.to_ascii_uppercase() as u8;
            col = col.checked_mul(26)?.checked_add(u32::from(upper - b'A' + 1))?;
        } else if ch.is_ascii_digit() {
            saw_digit = true;
            row = row
                .checked_mul(10)?
                .checked_add(u32::from(ch as u8 - b'0'))?;
        } else {
            return None;
        }
    }

    if !saw_letter || !saw_digit || row == 0 || col == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

fn assemble_rows(cells: Vec<(u32, u32, String)>) -> Vec<Vec<String>> {
    use std::collections::BTreeMap;

    let width = cells
        .iter()
        .map(|(_, col, _)| *col as usize + 1)
        .max()
        .unwrap_or(0);
    let mut by_row: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (row, col, value) in cells {
        let slots = by_row.entry(row).or_insert_with(|| vec![String::new(); width]);
        if let Some(slot) = slots.get_mut(col as usize) {
            *slot = value;
        }
    }
    by_row.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_workbook(entries: &[(&str, &str)]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let cursor = writer.finish().unwrap();
        std::fs::write(&path, cursor.into_inner()).unwrap();
        (dir, path)
    }

    #[test]
    fn address_parsing() {
        assert_eq!(address_to_index("A1"), Some((0, 0)));
        assert_eq!(address_to_index("B3"), Some((2, 1)));
        assert_eq!(address_to_index("AA10"), Some((9, 26)));
        assert_eq!(address_to_index("1A"), None);
        assert_eq!(address_to_index(""), None);
        assert_eq!(address_to_index("A0"), None);
    }

    #[test]
    fn reads_shared_and_inline_strings_and_numbers() {
        let (_dir, path) = write_workbook(&[
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>name</t></si><si><t>alice</t></si></sst>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>age</t></is></c></row>
                    <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2"><v>30</v></c></row>
                </sheetData></worksheet>"#,
            ),
        ]);
        let source = load(&path).unwrap();
        assert_eq!(source.columns, vec!["name".to_string(), "age".to_string()]);
        assert_eq!(source.records.len(), 1);
        assert_eq!(source.records[0]["name"], "alice");
        assert_eq!(source.records[0]["age"], "30");
    }

    #[test]
    fn workbook_without_worksheets_is_an_error() {
        let (_dir, path) = write_workbook(&[("xl/workbook.xml", "<workbook/>")]);
        assert!(matches!(load(&path), Err(IngestError::Workbook(_))));
    }

    #[test]
    fn shared_string_index_out_of_bounds_is_an_error() {
        let (_dir, path) = write_workbook(&[(
            "xl/worksheets/sheet1.xml",
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>7</v></c></row></sheetData></worksheet>"#,
        )]);
        assert!(matches!(load(&path), Err(IngestError::Workbook(_))));
    }
}
