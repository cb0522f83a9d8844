// Display helpers for dashboard values.

use chrono::NaiveDate;

/// `1234567` -> `"1,234,567"`.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Seconds as `m:ss` (minutes are not wrapped into hours).
pub fn format_duration(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// GA4 reports rates as fractions (`0.2761` is 27.61%).
pub fn fraction_to_percent(rate: f64) -> f64 {
    rate * 100.0
}

/// A percentage with one decimal and a percent sign.
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Rounds to one decimal place for chart values.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `"20240105"` -> `"Jan 5"`. Anything that isn't a `YYYYMMDD` date is
/// returned untouched.
pub fn format_report_date(date: &str) -> String {
    if date.len() != 8 {
        return date.to_string();
    }

    NaiveDate::parse_from_str(date, "%Y%m%d")
        .map(|d| d.format("%b %-d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Turns a page path into a table label: `/` is "Home", otherwise the last
/// path segment with dashes as spaces and the first letter capitalized.
pub fn format_page_path(page_path: &str) -> String {
    let mut path = page_path.split('?').next().unwrap_or_default();
    if path.len() > 1 && path.ends_with('/') {
        path = &path[..path.len() - 1];
    }

    if path.is_empty() || path == "/" {
        return "Home".to_string();
    }

    let last = path.rsplit('/').next().unwrap_or_default();
    capitalize_first_letter(&last.replace('-', " "))
}

pub fn capitalize_first_letter(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(32_400), "32,400");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(152), "2:32");
        assert_eq!(format_duration(3_725), "62:05");
    }

    #[test]
    fn test_percent_and_rounding() {
        assert_eq!(format_percent(48.23), "48.2%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(fraction_to_percent(0.4823)), "48.2%");
        assert_eq!(round_one_decimal(0.5349), 0.5);
        assert_eq!(round_one_decimal(61.26), 61.3);
    }

    #[test]
    fn test_format_report_date() {
        assert_eq!(format_report_date("20240105"), "Jan 5");
        assert_eq!(format_report_date("20241231"), "Dec 31");
        assert_eq!(format_report_date("2024-01-05"), "2024-01-05");
        assert_eq!(format_report_date("20241399"), "20241399");
    }

    #[test]
    fn test_format_page_path() {
        assert_eq!(format_page_path("/"), "Home");
        assert_eq!(format_page_path(""), "Home");
        assert_eq!(format_page_path("/?utm_source=x"), "Home");
        assert_eq!(format_page_path("/projects/"), "Projects");
        assert_eq!(format_page_path("/blog/rust-error-handling"), "Rust error handling");
        assert_eq!(format_page_path("/ai-playground?tab=chat"), "Ai playground");
    }

    #[test]
    fn test_capitalize_first_letter() {
        assert_eq!(capitalize_first_letter("desktop"), "Desktop");
        assert_eq!(capitalize_first_letter(""), "");
        assert_eq!(capitalize_first_letter("éclair"), "Éclair");
    }
}
