use serde::Serialize;
use tabled::Tabled;

/// A single cell of the uploaded table.
///
/// CSV ingestion only ever produces `Text` and `Missing`, but the currency
/// parser also accepts `Number` so already-typed values pass through
/// unchanged when a table is built programmatically.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// Render the cell the way it arrived, with missing as an empty field.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{}", n),
            Cell::Missing => String::new(),
        }
    }
}

/// The table exactly as the file claims it: arbitrary column labels, one
/// `Cell` per field. Short rows are tolerated; out-of-range lookups read as
/// missing.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Missing)
    }
}

/// Where the product identifier came from during normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductSource {
    /// A column renamed (or already named) `product`.
    Renamed,
    /// The first predominantly-textual column, identified by its label.
    TextColumn(String),
    /// No usable column; 0-based positional indices were synthesized.
    Positional,
}

/// Output of the schema normalizer: recognized columns pulled out by name,
/// stock counters already coerced to numbers, price/value kept raw for the
/// deriver. Column-level absence is an `Option` on the whole column, never
/// an all-missing vector.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub product: Vec<String>,
    pub product_source: ProductSource,
    pub stock_out: Vec<f64>,
    pub stock_in: Vec<f64>,
    pub stock_end: Vec<f64>,
    pub price: Option<Vec<Cell>>,
    pub value_total: Option<Vec<Cell>>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.product.len()
    }
}

/// One row of the canonical table. Constructed once during derivation and
/// never updated in place; every report view is a new collection.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    pub product: String,
    pub stock_out: f64,
    pub stock_in: f64,
    pub stock_end: f64,
    pub price_raw: Option<Cell>,
    pub price_numeric: Option<f64>,
    pub value_raw: Option<Cell>,
    pub value_numeric: Option<f64>,
}

/// The canonical table plus its effective schema. `has_price` / `has_value`
/// say whether the optional derived columns exist at all; a `false` here
/// means the column is absent, which downstream code must treat as "no data"
/// rather than a column of zeros.
#[derive(Debug, Clone)]
pub struct CanonicalTable {
    pub records: Vec<CanonicalRecord>,
    pub has_price: bool,
    pub has_value_total: bool,
    pub has_value: bool,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopMoverRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "TotalStockOut")]
    #[tabled(rename = "TotalStockOut")]
    pub total_stock_out: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopValueRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "TotalValue")]
    #[tabled(rename = "TotalValue")]
    pub total_value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct NegativeValueRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ZeroMovementRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "StockEnd")]
    #[tabled(rename = "StockEnd")]
    pub stock_end: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_products: usize,
    pub total_stock_out: f64,
    pub total_stock_in: f64,
    pub total_value: f64,
    pub negative_value_count: usize,
    pub zero_movement_count: usize,
    pub generated_at: String,
}
