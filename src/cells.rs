use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%d/%m/%Y";

const DAY_FIRST_PATTERNS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];
const SHORT_YEAR_PATTERNS: &[&str] = &["%d/%m/%y", "%d-%m-%y"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let patterns = if has_two_digit_year(value) {
        SHORT_YEAR_PATTERNS
    } else {
        DAY_FIRST_PATTERNS
    };
    patterns
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(value, pattern).ok())
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_quantity(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|n| *n >= 0.0)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// Whole quantities print without a fractional part; re-saving a stored
// cell must stay byte-identical.
pub fn format_quantity(quantity: f64) -> String {
    if quantity == quantity.trunc() && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        quantity.to_string()
    }
}

fn has_two_digit_year(value: &str) -> bool {
    let mut parts = value.split(['/', '-']);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(_), Some(last), None) => first.len() <= 2 && last.len() <= 2,
        _ => false,
    }
}
