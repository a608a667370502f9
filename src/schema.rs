// Schema normalization: map whatever column labels the export carries onto
// the fixed vocabulary the rest of the pipeline understands, and coerce the
// stock counters to numbers.
//
// Recognition is an exact match on the stripped label, no fuzzy matching.
// The rename table covers the labels the source system is known to emit;
// canonical labels pass through untouched, so normalizing an
// already-canonical table is a no-op.
use crate::types::{Cell, NormalizedTable, ProductSource, RawTable};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static RENAME_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Unnamed: 0", "product"),
        ("Produk", "product"),
        ("Stock Keluar", "stock_out"),
        ("Stock Masuk", "stock_in"),
        ("Stock Akhir", "stock_end"),
        ("Harga", "price"),
        ("Value Total", "value_total"),
    ])
});

/// Normalize an arbitrary raw table into the recognized column set.
///
/// Total over any tabular input: missing columns trigger fallbacks or
/// column-level absence, never an error.
pub fn normalize(raw: &RawTable) -> NormalizedTable {
    let labels: Vec<String> = raw
        .headers
        .iter()
        .map(|h| {
            let stripped = h.trim();
            RENAME_MAP
                .get(stripped)
                .map(|c| c.to_string())
                .unwrap_or_else(|| stripped.to_string())
        })
        .collect();
    let find = |name: &str| labels.iter().position(|l| l == name);
    let n = raw.rows.len();

    let stock_column = |idx: Option<usize>| -> Vec<f64> {
        match idx {
            Some(i) => (0..n).map(|r| coerce_stock(raw.cell(r, i))).collect(),
            None => vec![0.0; n],
        }
    };
    let stock_out_idx = find("stock_out");
    let stock_in_idx = find("stock_in");
    let stock_end_idx = find("stock_end");

    let raw_column = |idx: Option<usize>| -> Option<Vec<Cell>> {
        idx.map(|i| (0..n).map(|r| raw.cell(r, i).clone()).collect())
    };
    let price = raw_column(find("price"));
    let value_total = raw_column(find("value_total"));

    // Columns already claimed by a recognized numeric role are not product
    // candidates; the stock counters have been coerced away from text.
    let claimed: Vec<usize> = [stock_out_idx, stock_in_idx, stock_end_idx]
        .into_iter()
        .flatten()
        .collect();
    let (product, product_source) = match find("product") {
        Some(i) => (
            (0..n).map(|r| product_cell(raw.cell(r, i), r)).collect(),
            ProductSource::Renamed,
        ),
        None => match first_text_column(raw, &claimed) {
            Some(i) => (
                (0..n).map(|r| product_cell(raw.cell(r, i), r)).collect(),
                ProductSource::TextColumn(labels[i].clone()),
            ),
            None => (
                (0..n).map(|r| r.to_string()).collect(),
                ProductSource::Positional,
            ),
        },
    };

    NormalizedTable {
        product,
        product_source,
        stock_out: stock_column(stock_out_idx),
        stock_in: stock_column(stock_in_idx),
        stock_end: stock_column(stock_end_idx),
        price,
        value_total,
    }
}

/// Stock counters default to zero on corrupt or missing input. This is a
/// deliberate policy distinct from price/value handling, where unparsable
/// cells stay missing.
fn coerce_stock(cell: &Cell) -> f64 {
    match cell {
        Cell::Missing => 0.0,
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    }
}

fn product_cell(cell: &Cell, row: usize) -> String {
    match cell {
        // A hole in an otherwise usable product column falls back to the
        // row position so every record keeps a non-empty identifier.
        Cell::Missing => row.to_string(),
        other => other.render(),
    }
}

/// First column, left to right, whose non-missing values are predominantly
/// non-numeric text. Columns listed in `skip` are never considered.
fn first_text_column(raw: &RawTable, skip: &[usize]) -> Option<usize> {
    (0..raw.headers.len()).find(|&i| {
        if skip.contains(&i) {
            return false;
        }
        let mut present = 0usize;
        let mut textual = 0usize;
        for r in 0..raw.rows.len() {
            match raw.cell(r, i) {
                Cell::Missing => {}
                Cell::Number(_) => present += 1,
                Cell::Text(s) => {
                    present += 1;
                    if s.trim().parse::<f64>().is_err() {
                        textual += 1;
                    }
                }
            }
        }
        present > 0 && textual * 2 > present
    })
}
