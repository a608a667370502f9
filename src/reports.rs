// Read-only views over the canonical table: grouped top-N rankings,
// predicate subsets and scalar totals, plus the report rows the CLI renders.
//
// All views are total over a well-formed table. The only errors are caller
// contract violations: asking for a measure column the schema does not have,
// or a non-positive N. Data-quality problems never surface here; they were
// already resolved to missing/zero during cleaning.
use crate::types::{
    CanonicalRecord, CanonicalTable, NegativeValueRow, SummaryStats, TopMoverRow, TopValueRow,
    ZeroMovementRow,
};
use crate::util::format_number;
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("measure column `{0}` does not exist in this table")]
    UnknownColumn(&'static str),
    #[error("top-N must be a positive integer, got {0}")]
    InvalidTopN(usize),
}

/// Numeric columns a view can aggregate or rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    StockOut,
    StockIn,
    StockEnd,
    PriceNumeric,
    ValueNumeric,
}

impl Measure {
    pub fn label(self) -> &'static str {
        match self {
            Measure::StockOut => "stock_out",
            Measure::StockIn => "stock_in",
            Measure::StockEnd => "stock_end",
            Measure::PriceNumeric => "price_numeric",
            Measure::ValueNumeric => "value_numeric",
        }
    }

    fn of(self, r: &CanonicalRecord) -> Option<f64> {
        match self {
            Measure::StockOut => Some(r.stock_out),
            Measure::StockIn => Some(r.stock_in),
            Measure::StockEnd => Some(r.stock_end),
            Measure::PriceNumeric => r.price_numeric,
            Measure::ValueNumeric => r.value_numeric,
        }
    }

    fn exists_in(self, table: &CanonicalTable) -> bool {
        match self {
            Measure::PriceNumeric => table.has_price,
            Measure::ValueNumeric => table.has_value,
            _ => true,
        }
    }
}

/// Columns whose distinct values partition records for summation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Product,
}

impl GroupKey {
    fn of(self, r: &CanonicalRecord) -> &str {
        match self {
            GroupKey::Product => &r.product,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSum {
    pub key: String,
    pub total: f64,
}

fn check_measure(table: &CanonicalTable, measure: Measure) -> Result<(), ViewError> {
    if measure.exists_in(table) {
        Ok(())
    } else {
        Err(ViewError::UnknownColumn(measure.label()))
    }
}

/// Group records by `group_key`, sum `measure` within each group and return
/// the first `n` groups by total.
///
/// Missing measures are excluded from sums; a group whose measure is missing
/// in every record is excluded from the result entirely. Ties keep the
/// first-seen group order (the sort is stable).
pub fn top_n_by_sum(
    table: &CanonicalTable,
    group_key: GroupKey,
    measure: Measure,
    n: usize,
    descending: bool,
) -> Result<Vec<GroupSum>, ViewError> {
    check_measure(table, measure)?;
    if n == 0 {
        return Err(ViewError::InvalidTopN(n));
    }

    struct Acc {
        key: String,
        total: f64,
        seen: bool,
    }
    let mut order: Vec<Acc> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for r in &table.records {
        let key = group_key.of(r);
        let slot = *index.entry(key.to_string()).or_insert_with(|| {
            order.push(Acc {
                key: key.to_string(),
                total: 0.0,
                seen: false,
            });
            order.len() - 1
        });
        if let Some(v) = measure.of(r) {
            order[slot].total += v;
            order[slot].seen = true;
        }
    }

    let mut groups: Vec<GroupSum> = order
        .into_iter()
        .filter(|a| a.seen)
        .map(|a| GroupSum {
            key: a.key,
            total: a.total,
        })
        .collect();
    groups.sort_by(|a, b| {
        let ord = a.total.partial_cmp(&b.total).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    groups.truncate(n);
    Ok(groups)
}

/// Records whose measure is strictly negative, most negative first. Missing
/// compares as zero here, so a record with no value never qualifies.
pub fn negative_subset(
    table: &CanonicalTable,
    measure: Measure,
) -> Result<Vec<&CanonicalRecord>, ViewError> {
    check_measure(table, measure)?;
    let mut hits: Vec<&CanonicalRecord> = table
        .records
        .iter()
        .filter(|r| measure.of(r).unwrap_or(0.0) < 0.0)
        .collect();
    hits.sort_by(|a, b| {
        let av = measure.of(a).unwrap_or(0.0);
        let bv = measure.of(b).unwrap_or(0.0);
        av.partial_cmp(&bv).unwrap_or(Ordering::Equal)
    });
    Ok(hits)
}

/// Records whose measure is exactly zero. Missing is not zero and is
/// excluded.
pub fn zero_subset(
    table: &CanonicalTable,
    measure: Measure,
) -> Result<Vec<&CanonicalRecord>, ViewError> {
    check_measure(table, measure)?;
    Ok(table
        .records
        .iter()
        .filter(|r| measure.of(r) == Some(0.0))
        .collect())
}

/// Sum of `measure` across all records with missing treated as zero.
/// Returns 0.0 for an empty or entirely-missing column.
pub fn scalar_sum(table: &CanonicalTable, measure: Measure) -> Result<f64, ViewError> {
    check_measure(table, measure)?;
    Ok(table
        .records
        .iter()
        .map(|r| measure.of(r).unwrap_or(0.0))
        .sum())
}

pub fn top_mover_rows(table: &CanonicalTable, n: usize) -> Result<Vec<TopMoverRow>, ViewError> {
    let groups = top_n_by_sum(table, GroupKey::Product, Measure::StockOut, n, true)?;
    Ok(groups
        .into_iter()
        .enumerate()
        .map(|(idx, g)| TopMoverRow {
            rank: idx + 1,
            product: g.key,
            total_stock_out: format_number(g.total, 0),
        })
        .collect())
}

pub fn top_value_rows(table: &CanonicalTable, n: usize) -> Result<Vec<TopValueRow>, ViewError> {
    let groups = top_n_by_sum(table, GroupKey::Product, Measure::ValueNumeric, n, true)?;
    Ok(groups
        .into_iter()
        .enumerate()
        .map(|(idx, g)| TopValueRow {
            rank: idx + 1,
            product: g.key,
            total_value: format_number(g.total, 2),
        })
        .collect())
}

pub fn negative_value_rows(table: &CanonicalTable) -> Result<Vec<NegativeValueRow>, ViewError> {
    let hits = negative_subset(table, Measure::ValueNumeric)?;
    Ok(hits
        .into_iter()
        .map(|r| NegativeValueRow {
            product: r.product.clone(),
            value: format_number(r.value_numeric.unwrap_or(0.0), 2),
        })
        .collect())
}

pub fn zero_movement_rows(table: &CanonicalTable) -> Result<Vec<ZeroMovementRow>, ViewError> {
    let hits = zero_subset(table, Measure::StockOut)?;
    Ok(hits
        .into_iter()
        .map(|r| ZeroMovementRow {
            product: r.product.clone(),
            stock_end: format_number(r.stock_end, 0),
        })
        .collect())
}

/// Summary totals for the whole table. Value-based figures degrade to zero
/// when the value column is absent instead of erroring.
pub fn generate_summary(table: &CanonicalTable) -> Result<SummaryStats, ViewError> {
    let (total_value, negative_value_count) = if table.has_value {
        (
            scalar_sum(table, Measure::ValueNumeric)?,
            negative_subset(table, Measure::ValueNumeric)?.len(),
        )
    } else {
        (0.0, 0)
    };
    Ok(SummaryStats {
        total_products: table.records.len(),
        total_stock_out: scalar_sum(table, Measure::StockOut)?,
        total_stock_in: scalar_sum(table, Measure::StockIn)?,
        total_value,
        negative_value_count,
        zero_movement_count: zero_subset(table, Measure::StockOut)?.len(),
        generated_at: chrono::Local::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive;
    use crate::schema;
    use crate::types::{Cell, RawTable};

    fn canonical(headers: &[&str], rows: &[&[&str]]) -> CanonicalTable {
        let raw = RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| {
                    r.iter()
                        .map(|c| {
                            if c.is_empty() {
                                Cell::Missing
                            } else {
                                Cell::Text(c.to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
        };
        derive::derive(schema::normalize(&raw)).0
    }

    #[test]
    fn top_n_sums_per_group_and_truncates() {
        let table = canonical(
            &["Produk", "Stock Keluar"],
            &[&["A", "5"], &["B", "2"], &["A", "4"], &["C", "8"]],
        );
        let top = top_n_by_sum(&table, GroupKey::Product, Measure::StockOut, 2, true).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], GroupSum { key: "A".into(), total: 9.0 });
        assert_eq!(top[1], GroupSum { key: "C".into(), total: 8.0 });
    }

    #[test]
    fn top_n_returns_all_groups_when_fewer_than_n() {
        let table = canonical(&["Produk", "Stock Keluar"], &[&["A", "1"], &["B", "2"]]);
        let top = top_n_by_sum(&table, GroupKey::Product, Measure::StockOut, 10, true).unwrap();
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn top_n_ties_keep_first_seen_order() {
        let table = canonical(
            &["Produk", "Stock Keluar"],
            &[&["B", "3"], &["A", "3"], &["C", "3"]],
        );
        let top = top_n_by_sum(&table, GroupKey::Product, Measure::StockOut, 3, true).unwrap();
        let keys: Vec<&str> = top.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[test]
    fn top_n_ascending_reverses_order() {
        let table = canonical(
            &["Produk", "Stock Keluar"],
            &[&["A", "5"], &["B", "1"], &["C", "3"]],
        );
        let top = top_n_by_sum(&table, GroupKey::Product, Measure::StockOut, 3, false).unwrap();
        let keys: Vec<&str> = top.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "C", "A"]);
    }

    #[test]
    fn all_missing_groups_are_excluded() {
        let table = canonical(
            &["Produk", "Stock Keluar", "Harga"],
            &[&["A", "2", "Rp10"], &["B", "3", ""], &["A", "1", "Rp10"]],
        );
        // B has no price anywhere, so it has no value sum at all.
        let top =
            top_n_by_sum(&table, GroupKey::Product, Measure::ValueNumeric, 5, true).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "A");
        assert_eq!(top[0].total, 30.0);
    }

    #[test]
    fn zero_n_is_a_caller_error() {
        let table = canonical(&["Produk", "Stock Keluar"], &[&["A", "1"]]);
        assert_eq!(
            top_n_by_sum(&table, GroupKey::Product, Measure::StockOut, 0, true),
            Err(ViewError::InvalidTopN(0))
        );
    }

    #[test]
    fn absent_measure_column_is_a_caller_error() {
        let table = canonical(&["Produk", "Stock Keluar"], &[&["A", "1"]]);
        assert_eq!(
            scalar_sum(&table, Measure::ValueNumeric),
            Err(ViewError::UnknownColumn("value_numeric"))
        );
        assert_eq!(
            top_n_by_sum(&table, GroupKey::Product, Measure::PriceNumeric, 1, true),
            Err(ViewError::UnknownColumn("price_numeric"))
        );
    }

    #[test]
    fn negative_subset_sorts_most_negative_first() {
        let table = canonical(
            &["Produk", "Stock Keluar", "Value Total"],
            &[
                &["A", "1", "-Rp500"],
                &["B", "1", "Rp200"],
                &["C", "1", "-Rp900"],
                &["D", "1", ""],
            ],
        );
        let neg = negative_subset(&table, Measure::ValueNumeric).unwrap();
        let products: Vec<&str> = neg.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(products, vec!["C", "A"]);
    }

    #[test]
    fn zero_subset_excludes_missing() {
        let table = canonical(
            &["Produk", "Stock Keluar", "Value Total"],
            &[&["A", "0", "Rp0"], &["B", "0", ""], &["C", "1", "Rp5"]],
        );
        let zero_value = zero_subset(&table, Measure::ValueNumeric).unwrap();
        assert_eq!(zero_value.len(), 1);
        assert_eq!(zero_value[0].product, "A");
        // B's missing value is not zero; its stock_out of 0 still counts.
        let zero_out = zero_subset(&table, Measure::StockOut).unwrap();
        assert_eq!(zero_out.len(), 2);
    }

    #[test]
    fn negative_and_zero_subsets_are_disjoint() {
        let table = canonical(
            &["Produk", "Stock Keluar", "Value Total"],
            &[
                &["A", "1", "-Rp5"],
                &["B", "1", "Rp0"],
                &["C", "1", "Rp7"],
                &["D", "1", ""],
            ],
        );
        let neg = negative_subset(&table, Measure::ValueNumeric).unwrap();
        let zero = zero_subset(&table, Measure::ValueNumeric).unwrap();
        for n in &neg {
            assert!(!zero.iter().any(|z| z.product == n.product));
        }
        // D is defined-missing and falls into neither subset.
        assert_eq!(neg.len() + zero.len(), 2);
    }

    #[test]
    fn scalar_sum_treats_missing_as_zero() {
        let empty = CanonicalTable {
            records: vec![],
            has_price: false,
            has_value_total: false,
            has_value: false,
        };
        assert_eq!(scalar_sum(&empty, Measure::StockOut), Ok(0.0));

        let table = canonical(
            &["Produk", "Stock Keluar", "Value Total"],
            &[&["A", "1", ""], &["B", "2", ""]],
        );
        assert_eq!(scalar_sum(&table, Measure::ValueNumeric), Ok(0.0));
        assert_eq!(scalar_sum(&table, Measure::StockOut), Ok(3.0));
        assert_eq!(scalar_sum(&table, Measure::StockEnd), Ok(0.0));
    }

    #[test]
    fn price_measure_works_when_price_column_exists() {
        let table = canonical(
            &["Produk", "Stock Keluar", "Harga"],
            &[&["A", "1", "Rp100"], &["B", "1", ""]],
        );
        assert_eq!(scalar_sum(&table, Measure::PriceNumeric), Ok(100.0));
        assert_eq!(
            zero_subset(&table, Measure::PriceNumeric).unwrap().len(),
            0
        );
    }

    #[test]
    fn end_to_end_scenario() {
        // Row A has price but no value_total; row B has a direct negative
        // value. The derived table must estimate A and parse B.
        let table = canonical(
            &["Produk", "Stock Keluar", "Harga", "Value Total"],
            &[&["A", "10", "Rp1.000", ""], &["B", "0", "", "-Rp500"]],
        );
        assert_eq!(table.records[0].value_numeric, Some(10_000.0));
        assert_eq!(table.records[1].value_numeric, Some(-500.0));

        let neg = negative_subset(&table, Measure::ValueNumeric).unwrap();
        assert_eq!(neg.len(), 1);
        assert_eq!(neg[0].product, "B");

        let zero = zero_subset(&table, Measure::StockOut).unwrap();
        assert_eq!(zero.len(), 1);
        assert_eq!(zero[0].product, "B");

        let top = top_n_by_sum(&table, GroupKey::Product, Measure::StockOut, 1, true).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "A");
    }

    #[test]
    fn summary_degrades_value_totals_when_column_absent() {
        let table = canonical(&["Produk", "Stock Keluar"], &[&["A", "4"], &["B", "0"]]);
        let summary = generate_summary(&table).unwrap();
        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.negative_value_count, 0);
        assert_eq!(summary.total_stock_out, 4.0);
        assert_eq!(summary.zero_movement_count, 1);
    }
}
