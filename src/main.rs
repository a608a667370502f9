// Entry point and high-level CLI flow.
//
// - Option [1] loads the monthly sales CSV, normalizes the schema and
//   derives the numeric price/value columns, printing diagnostics.
// - Option [2] generates the report set (top movers, top value, negative
//   value, zero movement), the cleaned-table export and a JSON summary.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
mod currency;
mod derive;
mod loader;
mod output;
mod reports;
mod schema;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{CanonicalTable, ProductSource};

const DEFAULT_PATH: &str = "sales_september.csv";
const DEFAULT_TOP_N: usize = 10;

// Simple in-memory app state so we only load/clean the CSV once but can
// generate reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<CanonicalTable>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_line_with_prompt(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line_with_prompt("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Ask for the top-N cutoff. Empty input takes the default; anything that is
/// not a positive integer is rejected here so the view layer never sees an
/// invalid N.
fn prompt_top_n() -> usize {
    loop {
        let resp = read_line_with_prompt(&format!("Top N [{}]: ", DEFAULT_TOP_N));
        if resp.is_empty() {
            return DEFAULT_TOP_N;
        }
        match resp.parse::<usize>() {
            Ok(n) if n > 0 => return n,
            _ => println!("Invalid value. Please enter a positive integer."),
        }
    }
}

/// Handle option [1]: load, normalize and derive the CSV file.
///
/// On success the canonical table replaces the previous one in `APP_STATE`;
/// on failure the previous table is left untouched.
fn handle_load() {
    let path = {
        let p = read_line_with_prompt(&format!("CSV path [{}]: ", DEFAULT_PATH));
        if p.is_empty() {
            DEFAULT_PATH.to_string()
        } else {
            p
        }
    };
    let (raw, load_report) = match loader::load_table_path(&path) {
        Ok(ok) => ok,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };

    let normalized = schema::normalize(&raw);
    match &normalized.product_source {
        ProductSource::Renamed => {}
        ProductSource::TextColumn(label) => {
            println!("Info: product names taken from column '{}'.", label);
        }
        ProductSource::Positional => {
            println!("Info: no product column found; using positional row indices.");
        }
    }
    let (table, derive_report) = derive::derive(normalized);

    println!(
        "Processing dataset... ({} rows, {} columns)",
        util::format_int(load_report.total_rows as i64),
        util::format_int(load_report.total_columns as i64)
    );
    if derive_report.unparsable_prices > 0 || derive_report.unparsable_values > 0 {
        println!(
            "Note: {} price and {} value cells could not be parsed and stay empty.",
            util::format_int(derive_report.unparsable_prices as i64),
            util::format_int(derive_report.unparsable_values as i64)
        );
    }
    if derive_report.value_discrepancies > 0 {
        println!(
            "Info: {} rows where the reported value disagrees with stock_out x price.",
            util::format_int(derive_report.value_discrepancies as i64)
        );
    }
    if !table.has_value {
        println!("Info: no price or value column; value-based reports will be skipped.");
    }
    println!();

    let mut state = APP_STATE.lock().unwrap();
    state.data = Some(table);
}

/// Handle option [2]: generate all reports, the cleaned export and the JSON
/// summary.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    let top_n = prompt_top_n();
    println!("\nGenerating reports...");
    println!("Outputs saved to individual files...\n");

    let r1 = match reports::top_mover_rows(&data, top_n) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Report error: {}", e);
            return;
        }
    };
    let file1 = "report1_top_movers.csv";
    if let Err(e) = output::write_csv(file1, &r1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Top {} Products by Stock Out\n", top_n);
    output::preview_table_rows(&r1, 5);
    println!("(Full table exported to {})\n", file1);

    if data.has_value {
        let r2 = match reports::top_value_rows(&data, top_n) {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("Report error: {}", e);
                return;
            }
        };
        let file2 = "report2_top_value.csv";
        if let Err(e) = output::write_csv(file2, &r2) {
            eprintln!("Write error: {}", e);
        }
        println!("Report 2: Top {} Products by Value (Rp)\n", top_n);
        output::preview_table_rows(&r2, 5);
        println!("(Full table exported to {})\n", file2);

        let r3 = match reports::negative_value_rows(&data) {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("Report error: {}", e);
                return;
            }
        };
        let file3 = "report3_negative_value.csv";
        if let Err(e) = output::write_csv(file3, &r3) {
            eprintln!("Write error: {}", e);
        }
        println!("Report 3: Negative Value Products");
        if r3.is_empty() {
            println!("(no negative value products)\n");
        } else {
            println!();
            output::preview_table_rows(&r3, 5);
        }
        println!("(Full table exported to {})\n", file3);
    } else {
        println!("Reports 2 and 3 skipped: no price or value column in the upload.\n");
    }

    let r4 = match reports::zero_movement_rows(&data) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Report error: {}", e);
            return;
        }
    };
    let file4 = "report4_zero_movement.csv";
    if let Err(e) = output::write_csv(file4, &r4) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 4: Products with Zero Movement (stock_out = 0)");
    println!("Count: {}\n", util::format_int(r4.len() as i64));
    output::preview_table_rows(&r4, 5);
    println!("(Full table exported to {})\n", file4);

    let cleaned = "cleaned_sales.csv";
    if let Err(e) = output::write_canonical_csv(cleaned, &data) {
        eprintln!("Write error: {}", e);
    }
    println!("(Cleaned canonical table exported to {})\n", cleaned);

    match reports::generate_summary(&data) {
        Ok(summary) => {
            if let Err(e) = output::write_json("summary.json", &summary) {
                eprintln!("Write error: {}", e);
            }
            println!("Summary Stats (summary.json):");
            println!(
                "Total Stock Out: {}  Total Stock In: {}  Total Value (Rp): {}  Minus Products: {}\n",
                util::format_number(summary.total_stock_out, 0),
                util::format_number(summary.total_stock_in, 0),
                util::format_number(summary.total_value, 0),
                util::format_int(summary.negative_value_count as i64)
            );
        }
        Err(e) => eprintln!("Report error: {}", e),
    }
}

fn main() {
    loop {
        println!("Monthly Sales Report");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
