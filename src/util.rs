// Console number formatting.
//
// Report previews and KPI lines use thousands separators for readability;
// the canonical CSV export deliberately does not go through these helpers,
// since exported numbers must keep a plain decimal point.
use num_format::{Locale, ToFormattedString};

pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for row/cell counts in console diagnostics.
    n.to_formatted_string(&Locale::en)
}

/// Plain decimal rendering for exported numbers, missing as an empty field.
pub fn format_plain(n: Option<f64>) -> String {
    match n {
        Some(v) => format!("{}", v),
        None => String::new(),
    }
}
