// Utility helpers for parsing, basic statistics and number formatting.
//
// Parsing is forgiving about CSV export noise (whitespace, thousands
// separators) but never guesses: anything that does not read as a number
// comes back as `None` and the caller decides which error to raise.
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

use crate::types::ValueStats;

/// Parse a string-like value into `f64`.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (so `NaN`/`inf` never
///   sneak in from a CSV cell).
/// - Strips thousands separators like `","` before parsing.
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

/// Treat empty or whitespace-only cells as absent.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|v| !v.is_empty())
}

pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

fn sorted(mut v: Vec<f64>) -> Vec<f64> {
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

pub fn median(v: Vec<f64>) -> f64 {
    // Even-length inputs average the two middle values.
    if v.is_empty() {
        return 0.0;
    }
    let v = sorted(v);
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

/// Quantile of an already sorted slice using linear interpolation between
/// the closest ranks.
fn quantile_sorted(v: &[f64], q: f64) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (v.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    v[lo] + (v[hi] - v[lo]) * frac
}

/// Count, mean, sample standard deviation, min, quartiles and max.
pub fn describe(values: &[f64]) -> ValueStats {
    let count = values.len();
    let mean = average(values);
    let std = if count > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        0.0
    };
    let v = sorted(values.to_vec());
    ValueStats {
        count,
        mean,
        std,
        min: v.first().copied().unwrap_or(0.0),
        p25: quantile_sorted(&v, 0.25),
        p50: quantile_sorted(&v, 0.5),
        p75: quantile_sorted(&v, 0.75),
        max: v.last().copied().unwrap_or(0.0),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus en-locale thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
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
    n.to_formatted_string(&Locale::en)
}

// Cell renderers for console previews. CSV output keeps the raw numbers.

pub fn display_money(v: &f64) -> String {
    format_number(*v, 2)
}

pub fn display_share(v: &f64) -> String {
    format!("{:.2}%", v * 100.0)
}

pub fn display_score(v: &f64) -> String {
    format!("{:.1}", v)
}
