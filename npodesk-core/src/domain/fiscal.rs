//! Fiscal period selection — a reporting year plus an optional ending month.
//!
//! Filings are scoped by the calendar year in which the reporting period
//! ends; the ending month further narrows to organizations whose fiscal
//! year closes in that month. The month is only meaningful relative to the
//! year it was chosen under, so changing the year always drops it.

use serde::{Deserialize, Serialize};

/// A confirmed fiscal period: a reporting year and an optional ending month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub year: i32,
    pub month: Option<u32>,
}

/// In-progress fiscal period selection.
///
/// Owns the year/month pair while the user is still choosing. The month is
/// reset whenever the year changes — a month resolved under one year has no
/// meaning under another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiscalSelection {
    year: Option<i32>,
    month: Option<u32>,
}

impl FiscalSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// Select a reporting year. Returns true if the year actually changed,
    /// in which case any previously selected month has been dropped.
    pub fn select_year(&mut self, year: i32) -> bool {
        if self.year == Some(year) {
            return false;
        }
        self.year = Some(year);
        self.month = None;
        true
    }

    /// Select (or clear) the fiscal ending month. Months are 1–12; anything
    /// else is ignored and reported as false. Membership in the year's
    /// resolved month list is the wizard's concern, not this type's.
    pub fn select_month(&mut self, month: Option<u32>) -> bool {
        match month {
            Some(m) if !(1..=12).contains(&m) => false,
            other => {
                self.month = other;
                true
            }
        }
    }

    /// The confirmed period, available once a year is selected.
    pub fn period(&self) -> Option<FiscalPeriod> {
        self.year.map(|year| FiscalPeriod {
            year,
            month: self.month,
        })
    }

    pub fn reset(&mut self) {
        self.year = None;
        self.month = None;
    }
}

/// English name for a fiscal ending month (1–12).
pub fn month_name(month: u32) -> Option<&'static str> {
    let m = chrono::Month::try_from(u8::try_from(month).ok()?).ok()?;
    Some(m.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_change_drops_month() {
        let mut sel = FiscalSelection::new();
        sel.select_year(2023);
        sel.select_month(Some(6));
        assert_eq!(sel.month(), Some(6));

        sel.select_year(2022);
        assert_eq!(sel.year(), Some(2022));
        assert_eq!(sel.month(), None);
    }

    #[test]
    fn reselecting_same_year_keeps_month() {
        let mut sel = FiscalSelection::new();
        sel.select_year(2023);
        sel.select_month(Some(12));

        assert!(!sel.select_year(2023));
        assert_eq!(sel.month(), Some(12));
    }

    #[test]
    fn month_range_enforced() {
        let mut sel = FiscalSelection::new();
        sel.select_year(2023);
        assert!(!sel.select_month(Some(0)));
        assert!(!sel.select_month(Some(13)));
        assert_eq!(sel.month(), None);
        assert!(sel.select_month(Some(1)));
        assert!(sel.select_month(None));
        assert_eq!(sel.month(), None);
    }

    #[test]
    fn period_requires_year() {
        let mut sel = FiscalSelection::new();
        assert_eq!(sel.period(), None);
        sel.select_year(2021);
        assert_eq!(
            sel.period(),
            Some(FiscalPeriod {
                year: 2021,
                month: None
            })
        );
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(6), Some("June"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
