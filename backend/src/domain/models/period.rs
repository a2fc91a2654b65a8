use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// A calendar month, written `YYYY-MM` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> anyhow::Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "Invalid month: {}. Must be between 1 and 12",
                month
            )));
        }
        if !(1900..=9999).contains(&year) {
            return Err(DomainError::validation(format!("Invalid year: {}", year)));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // year and month are validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or_default()
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The `count` months ending at (and including) this one, oldest first
    pub fn trailing(&self, count: usize) -> Vec<YearMonth> {
        let mut months = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            months.push(current);
            current = current.previous();
        }
        months.reverse();
        months
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| DomainError::validation(format!("Invalid month '{}', expected YYYY-MM", s)))?;
        let year: i32 = year
            .parse()
            .map_err(|_| DomainError::validation(format!("Invalid month '{}', expected YYYY-MM", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| DomainError::validation(format!("Invalid month '{}', expected YYYY-MM", s)))?;
        YearMonth::new(year, month)
    }
}

/// Get the human-readable name for a month number
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "Invalid Month",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2025-06".parse().unwrap();
        assert_eq!(ym, YearMonth { year: 2025, month: 6 });
        assert_eq!(ym.to_string(), "2025-06");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("june".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(YearMonth::new(2025, 1).unwrap().days_in_month(), 31);
        assert_eq!(YearMonth::new(2025, 4).unwrap().days_in_month(), 30);
        assert_eq!(YearMonth::new(2025, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2024, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_navigation_wraps_years() {
        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.previous(), YearMonth { year: 2024, month: 12 });
        assert_eq!(jan.previous().next(), jan);
    }

    #[test]
    fn test_trailing_is_oldest_first() {
        let feb = YearMonth::new(2025, 2).unwrap();
        let months: Vec<String> = feb.trailing(3).iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Invalid Month");
    }
}
