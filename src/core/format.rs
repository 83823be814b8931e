//! Rupee display strings for projection figures.
//!
//! Large amounts are abbreviated to lakh (`L`) and crore (`Cr`); smaller ones
//! use Indian digit grouping (`99,999`, `12,34,567`).

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

pub fn format_inr(value: f64) -> String {
    if let Some(text) = non_finite_text(value) {
        return format!("₹{text}");
    }

    if value >= CRORE {
        format!("₹{:.2} Cr", value / CRORE)
    } else if value >= LAKH {
        format!("₹{:.2} L", value / LAKH)
    } else {
        format!("₹{}", format_indian_grouped(value))
    }
}

/// Indian-grouped number with at most three fraction digits, trailing zeros
/// trimmed.
pub fn format_indian_grouped(value: f64) -> String {
    if let Some(text) = non_finite_text(value) {
        return text.to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    signed(
        value,
        &group_indian(int_part),
        frac_part,
        int_part == "0" && frac_part.is_empty(),
    )
}

/// A growth ratio as a percentage with two decimals: `0.4567` renders as
/// `45.67%`.
pub fn format_percent(ratio: f64) -> String {
    let percent = ratio * 100.0;
    if let Some(text) = non_finite_text(percent) {
        return format!("{text}%");
    }

    let fixed = format!("{:.2}", percent.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let is_zero = int_part == "0" && frac_part.bytes().all(|b| b == b'0');

    format!(
        "{}%",
        signed(percent, &group_thousands(int_part), frac_part, is_zero)
    )
}

fn non_finite_text(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("∞")
    } else if value == f64::NEG_INFINITY {
        Some("-∞")
    } else {
        None
    }
}

fn signed(value: f64, int_part: &str, frac_part: &str, is_zero: bool) -> String {
    let mut out = String::with_capacity(int_part.len() + frac_part.len() + 2);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

// Last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    let first = match head.len() % 2 {
        0 => 2,
        n => n,
    };
    out.push_str(&head[..first]);
    let mut idx = first;
    while idx < head.len() {
        out.push(',');
        out.push_str(&head[idx..idx + 2]);
        idx += 2;
    }
    out.push(',');
    out.push_str(tail);
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let lead = match digits.len() % 3 {
        0 => 3.min(digits.len()),
        n => n,
    };
    out.push_str(&digits[..lead]);
    let mut idx = lead;
    while idx < digits.len() {
        out.push(',');
        out.push_str(&digits[idx..idx + 3]);
        idx += 3;
    }
    out
}
