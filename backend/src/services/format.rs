//! Display formatting shared by the chart payload and both exports.
//!
//! Dates follow the dashboard's Indonesian locale conventions.

use chrono::{DateTime, NaiveDate, Utc};

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy, HH.MM.SS`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y, %H.%M.%S").to_string()
}

/// Optional timestamp as a date, `-` when absent.
pub fn format_optional_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| format_date(t.date_naive()))
        .unwrap_or_else(|| "-".to_string())
}

/// Indonesian month name for a 1-based month; empty when out of range.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

/// `"min - max"`, collapsing to one year when both bounds agree.
pub fn format_year_range(min: i32, max: i32) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{} - {}", min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 7).unwrap();
        assert_eq!(format_date(date), "07/03/2023");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 2, 9, 5, 30).unwrap();
        assert_eq!(format_timestamp(ts), "02/11/2024, 09.05.30");
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), "Januari");
        assert_eq!(month_name(12), "Desember");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
    }

    #[test]
    fn test_year_range() {
        assert_eq!(format_year_range(2023, 2023), "2023");
        assert_eq!(format_year_range(2021, 2024), "2021 - 2024");
    }

    #[test]
    fn test_optional_date() {
        assert_eq!(format_optional_date(None), "-");
        let ts = Utc.with_ymd_and_hms(2022, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(format_optional_date(Some(ts)), "31/12/2022");
    }
}
