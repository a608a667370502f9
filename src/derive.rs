// Field derivation: turn the normalized table into canonical records with
// numeric price/value columns attached.
//
// A direct `value_total` cell always wins over the `stock_out * price`
// estimate; the estimate only fills rows where no direct value could be
// parsed. When both are computable for a row and disagree, the estimate is
// discarded silently; we only count the disagreement as a diagnostic.
use crate::currency;
use crate::types::{CanonicalRecord, CanonicalTable, Cell, NormalizedTable};

/// Tolerance for the direct-vs-estimate discrepancy diagnostic.
const DISCREPANCY_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Default)]
pub struct DeriveReport {
    pub rows: usize,
    pub unparsable_prices: usize,
    pub unparsable_values: usize,
    pub value_discrepancies: usize,
}

/// Derive `price_numeric` and `value_numeric` and assemble the canonical
/// table. Consumes the normalized table; records are immutable afterwards.
pub fn derive(norm: NormalizedTable) -> (CanonicalTable, DeriveReport) {
    let n = norm.len();
    let has_price = norm.price.is_some();
    let has_value_total = norm.value_total.is_some();
    // The value column exists if either source can produce it; otherwise it
    // is absent from the schema entirely, not an all-missing column.
    let has_value = has_value_total || has_price;

    let mut report = DeriveReport {
        rows: n,
        ..DeriveReport::default()
    };
    let mut records = Vec::with_capacity(n);

    for i in 0..n {
        let price_raw = norm.price.as_ref().map(|col| col[i].clone());
        let price_numeric = price_raw.as_ref().and_then(currency::parse);
        if let Some(Cell::Text(_)) = &price_raw {
            if price_numeric.is_none() {
                report.unparsable_prices += 1;
            }
        }

        let stock_out = norm.stock_out[i];
        let value_raw = norm.value_total.as_ref().map(|col| col[i].clone());
        let estimate = price_numeric.map(|p| stock_out * p);
        let value_numeric = match &value_raw {
            Some(cell) => {
                let direct = currency::parse(cell);
                if direct.is_none() {
                    if let Cell::Text(_) = cell {
                        report.unparsable_values += 1;
                    }
                }
                if let (Some(d), Some(e)) = (direct, estimate) {
                    if (d - e).abs() > DISCREPANCY_EPS {
                        report.value_discrepancies += 1;
                    }
                }
                direct.or(estimate)
            }
            // Missing price propagates: no zero-fill for the estimate.
            None => estimate,
        };

        records.push(CanonicalRecord {
            product: norm.product[i].clone(),
            stock_out,
            stock_in: norm.stock_in[i],
            stock_end: norm.stock_end[i],
            price_raw,
            price_numeric,
            value_raw,
            value_numeric: if has_value { value_numeric } else { None },
        });
    }

    (
        CanonicalTable {
            records,
            has_price,
            has_value_total,
            has_value,
        },
        report,
    )
}
