use crate::types::CanonicalTable;
use crate::util::format_plain;
use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export the canonical table, row-major, header row equal to the canonical
/// column names. Optional columns appear only when derivable; numbers use a
/// plain decimal point and missing values export as empty fields.
pub fn write_canonical_csv(path: &str, table: &CanonicalTable) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["product", "stock_out", "stock_in", "stock_end"];
    if table.has_price {
        header.push("price");
        header.push("price_numeric");
    }
    if table.has_value_total {
        header.push("value_total");
    }
    if table.has_value {
        header.push("value_numeric");
    }
    wtr.write_record(&header)?;

    for r in &table.records {
        let mut fields = vec![
            r.product.clone(),
            format_plain(Some(r.stock_out)),
            format_plain(Some(r.stock_in)),
            format_plain(Some(r.stock_end)),
        ];
        if table.has_price {
            fields.push(r.price_raw.as_ref().map(|c| c.render()).unwrap_or_default());
            fields.push(format_plain(r.price_numeric));
        }
        if table.has_value_total {
            fields.push(r.value_raw.as_ref().map(|c| c.render()).unwrap_or_default());
        }
        if table.has_value {
            fields.push(format_plain(r.value_numeric));
        }
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
