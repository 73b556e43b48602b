//! Pure derivation functions shared by the workflow services.
//!
//! Everything here is I/O-free and total: malformed input coerces to a safe
//! default (`0`, `"N/A"`) instead of erroring, because a single bad
//! spreadsheet cell must never take down a whole view.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel rendered for dates that cannot be parsed.
pub const DATE_SENTINEL: &str = "N/A";

/// Total quantity for a planning line. BOS ("Balance of System") item types
/// multiply by the per-set quantity from the master catalog; every other
/// item type forces the set quantity to 1.
pub fn total_qty(qty: f64, qty_set: f64, is_bos: bool) -> f64 {
    if is_bos {
        qty * qty_set
    } else {
        qty
    }
}

/// GST-inclusive line amount: discount applies to the base, GST applies to
/// the discounted amount.
pub fn line_amount(rate: f64, qty: f64, discount_pct: f64, gst_pct: f64) -> f64 {
    let base = rate * qty;
    let after_discount = base - base * discount_pct / 100.0;
    after_discount + after_discount * gst_pct / 100.0
}

/// Total for one received line; transport charge is added after GST.
pub fn receiving_line_total(received_qty: f64, rate: f64, gst_pct: f64, transport_charge: f64) -> f64 {
    received_qty * rate * (1.0 + gst_pct / 100.0) + transport_charge
}

/// Outstanding balance on a billed line.
pub fn pending_amount(bill_amount: f64, payment_done: f64) -> f64 {
    bill_amount - payment_done
}

/// Derives the next code in a `{prefix}-NN` sequence from every code seen so
/// far. Codes that do not match `^{prefix}-\d{pad,}$` (header cells, blanks,
/// legacy formats) are ignored rather than rejected; with no match at all the
/// sequence starts at `{prefix}-01`.
pub fn next_sequence_number(existing_codes: &[String], prefix: &str, pad: usize) -> String {
    let pattern = format!(r"^{}-(\d{{{},}})$", regex::escape(prefix), pad);
    let re = Regex::new(&pattern).expect("sequence pattern is valid");
    let max = existing_codes
        .iter()
        .filter_map(|code| re.captures(code.trim()))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{}-{:0width$}", prefix, max + 1, width = pad)
}

static EXPORT_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    // "Date(YYYY,MM,DD)" or "Date(YYYY,MM,DD,HH,MM,SS)" — a spreadsheet
    // export artifact. The month is already 0-indexed.
    Regex::new(r"^Date\((\d{4}),(\d{1,2}),(\d{1,2})(?:,(\d{1,2}),(\d{1,2}),(\d{1,2}))?\)$")
        .expect("export date pattern is valid")
});

fn parse_export_artifact(value: &str) -> Option<NaiveDate> {
    let caps = EXPORT_DATE_RE.captures(value)?;
    let year: i32 = caps[1].parse().ok()?;
    let month0: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month0 + 1, day)
}

fn parse_generic(value: &str) -> Option<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    // RFC 3339 with offset, as some export paths produce.
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parses any supported date serialization. The `Date(YYYY,MM,DD[,HH,MM,SS])`
/// export artifact is tried first, then the common formats.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_export_artifact(trimmed).or_else(|| parse_generic(trimmed))
}

/// Formats any cell that should hold a date as `dd/mm/yyyy`; anything
/// unparseable renders as [`DATE_SENTINEL`] instead of failing.
pub fn format_display_date(value: &str) -> String {
    match parse_date(value) {
        Some(date) => format!("{:02}/{:02}/{}", date.day(), date.month(), date.year()),
        None => DATE_SENTINEL.to_string(),
    }
}

/// Month bucket label for activity roll-ups, e.g. `Jan 2024`.
pub fn month_label(value: &str) -> Option<String> {
    parse_date(value).map(|date| date.format("%b %Y").to_string())
}

/// Audit-row timestamp format: `dd/mm/yyyy HH:MM:SS`.
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    format!(
        "{:02}/{:02}/{} {:02}:{:02}:{:02}",
        dt.day(),
        dt.month(),
        dt.year(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}
