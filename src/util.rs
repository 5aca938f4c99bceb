// Utility helpers for parsing, guarded ratios, and number formatting.
//
// This module centralizes all the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values, and holds the division guards
// every ratio in the engine goes through.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    // `?` propagates `None` early if the option is missing. Negative values
    // fail the `u64` parse, which is exactly what we want for count fields.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<u64>().ok()
}

/// Trim an optional text field down to a plain `String`.
///
/// Missing and blank values both collapse to `""`; the aggregation code
/// treats an empty categorical as "value absent for this dimension".
pub fn clean_text(s: Option<&str>) -> String {
    s.map(str::trim).unwrap_or("").to_string()
}

pub fn mean(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Percentage ratio with a division guard: `num / den * 100`, or `0` when
/// the denominator is zero.
pub fn pct(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den * 100.0
    } else {
        0.0
    }
}

/// Percentage ratio that reports an undefined denominator as `None` instead
/// of collapsing it to zero. Used where "no data" and "0%" mean different
/// things (per-channel campaign metrics).
pub fn pct_opt(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 {
        Some(num / den * 100.0)
    } else {
        None
    }
}

/// Plain guarded division returning `None` on a zero denominator.
pub fn div_opt(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

/// Plain guarded division collapsing a zero denominator to `0`.
pub fn div_or_zero(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
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

/// Render an optional metric, printing `n/a` for an undefined value.
pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    match n {
        Some(v) => format_number(v, decimals),
        None => "n/a".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `1,240 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_rejects_text_and_blank() {
        assert_eq!(parse_f64_safe(Some("12.5")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("1,200.50")), Some(1200.5));
        assert_eq!(parse_f64_safe(Some("  ")), None);
        assert_eq!(parse_f64_safe(Some("12x")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_u64_rejects_negatives() {
        assert_eq!(parse_u64_safe(Some("42")), Some(42));
        assert_eq!(parse_u64_safe(Some("-3")), None);
        assert_eq!(parse_u64_safe(Some("1,000")), Some(1000));
    }

    #[test]
    fn pct_guards_zero_denominator() {
        assert_eq!(pct(1.0, 0.0), 0.0);
        assert_eq!(pct(3.0, 10.0), 30.0);
        assert_eq!(pct_opt(1.0, 0.0), None);
        assert_eq!(pct_opt(5.0, 20.0), Some(25.0));
        assert_eq!(div_opt(4.0, 0.0), None);
        assert_eq!(div_or_zero(4.0, 0.0), 0.0);
    }

    #[test]
    fn format_number_inserts_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.5, 1), "-42.5");
        assert_eq!(format_number(7.0, 0), "7");
    }
}
