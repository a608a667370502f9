use crate::types::{Cell, RawTable};
use csv::ReaderBuilder;
use std::error::Error;
use std::fs::File;
use std::io::Read;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub total_columns: usize,
}

/// Read a delimited byte stream into a `RawTable`.
///
/// No schema assumptions here: headers are kept verbatim (normalization
/// strips them later) and empty fields become `Cell::Missing`. Ragged rows
/// are accepted; short rows read as missing past their end.
pub fn load_table<R: Read>(reader: R) -> Result<RawTable, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err("file has no header row".into());
    }

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Missing
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    if rows.is_empty() {
        return Err("file contains a header but no data rows".into());
    }

    Ok(RawTable { headers, rows })
}

pub fn load_table_path(path: &str) -> Result<(RawTable, LoadReport), Box<dyn Error>> {
    let file = File::open(path)?;
    let table = load_table(file)?;
    let report = LoadReport {
        total_rows: table.rows.len(),
        total_columns: table.headers.len(),
    };
    Ok((table, report))
}
