//! Dump of dBase attribute tables.
//!
//! Prints the field definitions, the field names and then every record,
//! one per line and numbered from 1.

use crate::error::{MapError, Result};
use shapefile::dbase::{self, FieldValue};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const DESCRIPTOR_TERMINATOR: u8 = 0x0D;
/// Offset of the decimal count within a field descriptor.
const DECIMAL_COUNT_OFFSET: usize = 17;

/// Name, type, width and decimal count of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: String,
    pub length: u8,
    pub decimal_count: u8,
}

impl std::fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {}, {})",
            self.name, self.field_type, self.length, self.decimal_count
        )
    }
}

/// Dumps the table at `dbf_path` to `out`, returning the record count.
pub fn dump(dbf_path: &Path, out: &mut impl Write) -> Result<usize> {
    if !dbf_path.exists() {
        return Err(MapError::FileNotFound(dbf_path.to_path_buf()));
    }
    let file = File::open(dbf_path)?;
    dump_reader(BufReader::new(file), dbf_path, out)
}

/// Dumps a table read from any seekable source.
pub fn dump_reader<T: Read + Seek>(
    mut source: T,
    name: &Path,
    out: &mut impl Write,
) -> Result<usize> {
    let decimals = decimal_counts(&mut source).map_err(|e| MapError::file_format(name, e))?;
    let mut reader = dbase::Reader::new(source).map_err(|e| MapError::file_format(name, e))?;

    let definitions: Vec<FieldDefinition> = reader
        .fields()
        .iter()
        .enumerate()
        .map(|(i, info)| FieldDefinition {
            name: info.name().to_string(),
            field_type: format!("{:?}", info.field_type()),
            length: info.length(),
            decimal_count: decimals.get(i).copied().unwrap_or(0),
        })
        .collect();
    let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();

    let listed: Vec<String> = definitions.iter().map(|d| d.to_string()).collect();
    writeln!(out, "[{}]", listed.join(", "))?;
    writeln!(out, "{:?}", names)?;

    let mut count = 0;
    for (index, result) in reader.iter_records().enumerate() {
        let record = result.map_err(|e| MapError::file_format(name, e))?;
        let cells: Vec<String> = names
            .iter()
            .map(|field| {
                let value = record.get(*field).map(format_value).unwrap_or_default();
                format!("{}={}", field, value)
            })
            .collect();
        writeln!(out, "{} {}", index + 1, cells.join(", "))?;
        count += 1;
    }

    log::debug!("Dumped {} records from {}", count, name.display());
    Ok(count)
}

/// Reads the decimal count of each field descriptor, then rewinds.
fn decimal_counts<T: Read + Seek>(source: &mut T) -> std::io::Result<Vec<u8>> {
    source.seek(SeekFrom::Start(0))?;
    let mut header = [0u8; HEADER_LEN];
    source.read_exact(&mut header)?;

    let mut counts = Vec::new();
    let mut descriptor = [0u8; DESCRIPTOR_LEN];
    loop {
        source.read_exact(&mut descriptor[..1])?;
        if descriptor[0] == DESCRIPTOR_TERMINATOR {
            break;
        }
        source.read_exact(&mut descriptor[1..])?;
        counts.push(descriptor[DECIMAL_COUNT_OFFSET]);
    }

    source.seek(SeekFrom::Start(0))?;
    Ok(counts)
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Character(Some(s)) => s.trim_end().to_string(),
        FieldValue::Numeric(Some(n)) => n.to_string(),
        FieldValue::Logical(Some(b)) => b.to_string(),
        FieldValue::Float(Some(f)) => f.to_string(),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Logical(None)
        | FieldValue::Float(None) => String::new(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::testdata::dbf_file;
    use std::io::Cursor;

    fn boroughs() -> Vec<u8> {
        dbf_file(
            &[("BORONAME", b'C', 13), ("POP", b'N', 10)],
            &[
                vec!["Manhattan", "1694251"],
                vec!["Queens", "2405464"],
                vec!["Staten Island", "495747"],
            ],
        )
    }

    #[test]
    fn test_dump_numbers_records_from_one() {
        let mut out = Vec::new();
        let count = dump_reader(Cursor::new(boroughs()), Path::new("boroughs.dbf"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(count, 3);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("[BORONAME ("));
        assert!(lines[0].contains(", 13, 0), POP ("));
        assert!(lines[0].ends_with(", 10, 0)]"));
        assert_eq!(lines[1], r#"["BORONAME", "POP"]"#);
        assert_eq!(lines[2], "1 BORONAME=Manhattan, POP=1694251");
        assert_eq!(lines[3], "2 BORONAME=Queens, POP=2405464");
        assert!(lines[4].starts_with("3 BORONAME=Staten Island"));
    }

    #[test]
    fn test_dump_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boroughs.dbf");
        std::fs::write(&path, boroughs()).unwrap();

        let mut out = Vec::new();
        assert_eq!(dump(&path, &mut out).unwrap(), 3);
    }

    #[test]
    fn test_missing_file() {
        let mut out = Vec::new();
        let result = dump(Path::new("/no/such/table.dbf"), &mut out);
        assert!(matches!(result, Err(MapError::FileNotFound(_))));
    }

    #[test]
    fn test_garbage_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.dbf");
        std::fs::write(&path, b"not a table").unwrap();

        let mut out = Vec::new();
        let result = dump(&path, &mut out);
        assert!(matches!(result, Err(MapError::FileFormat { .. })));
    }
}
