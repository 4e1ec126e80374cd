//! Best-effort parsing of free-form invoice dates for sorting.

use std::cmp::Reverse;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::record::InvoiceRecord;

lazy_static! {
    // 1.2.2024, 01/02/24, 1. 2. 2024, 01-02-2024
    static ref DATE_DMY: Regex = Regex::new(
        r"^\s*(\d{1,2})\s*[./\-]\s*(\d{1,2})\s*[./\-]\s*(\d{4}|\d{2})\.?\s*$"
    ).unwrap();

    // 2024-02-01, 2024/02/01
    static ref DATE_YMD: Regex = Regex::new(
        r"^\s*(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\s*$"
    ).unwrap();
}

/// Parse an invoice date written day-first or as ISO year-first.
pub fn parse_invoice_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_YMD.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let caps = DATE_DMY.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(if s.len() == 2 { 2000 + year } else { year })
}

/// Sort newest first. Records with unparseable dates keep their relative
/// order after all dated ones.
pub fn sort_by_date_desc(records: &mut [InvoiceRecord]) {
    records.sort_by_key(|r| match parse_invoice_date(&r.invoice_date) {
        Some(date) => (false, Reverse(Some(date))),
        None => (true, Reverse(None)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parse_separators() {
        assert_eq!(parse_invoice_date("01.02.2024"), date(2024, 2, 1));
        assert_eq!(parse_invoice_date("1/2/2024"), date(2024, 2, 1));
        assert_eq!(parse_invoice_date("01-02-24"), date(2024, 2, 1));
        assert_eq!(parse_invoice_date("1. 2. 2024"), date(2024, 2, 1));
        assert_eq!(parse_invoice_date("2024-02-01"), date(2024, 2, 1));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_invoice_date(""), None);
        assert_eq!(parse_invoice_date("februar 2024"), None);
        assert_eq!(parse_invoice_date("31.02.2024"), None);
    }

    #[test]
    fn test_sort_newest_first_unknown_last() {
        let mut records: Vec<InvoiceRecord> = ["unknown", "01.01.2024", "?", "15.03.2024", "2023-12-31"]
            .iter()
            .map(|d| InvoiceRecord {
                invoice_date: d.to_string(),
                ..Default::default()
            })
            .collect();

        sort_by_date_desc(&mut records);

        let dates: Vec<&str> = records.iter().map(|r| r.invoice_date.as_str()).collect();
        assert_eq!(dates, vec!["15.03.2024", "01.01.2024", "2023-12-31", "unknown", "?"]);
    }
}
