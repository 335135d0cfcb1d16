//! Serial date conversion
//!
//! Spreadsheets store dates as serial day numbers. In the 1900 date system day 0 is
//! 1899-12-31 and the historical "1900 leap year" bug is preserved: serial 60 is the
//! non-existent 1900-02-29, so serials below 60 are one day off from a plain day count.
//! That date cannot be represented, so serials 59 and 60 both convert to 1900-02-28 and
//! 1900-02-28 converts back to 59. The 1904 date system counts plainly from 1904-01-01.

use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate};

/// Serial of the fictional 1900-02-29
const LEAP_BUG_SERIAL: i64 = 60;

/// Date system used to interpret serial numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateSystem {
    /// 1900 system with the leap-year bug (Windows default)
    #[default]
    Excel1900,
    /// 1904 system (legacy Mac workbooks)
    Excel1904,
}

impl DateSystem {
    fn epoch(self) -> NaiveDate {
        let epoch = match self {
            // Day 1 is 1900-01-01 once the leap-bug shift is applied
            DateSystem::Excel1900 => NaiveDate::from_ymd_opt(1899, 12, 30),
            DateSystem::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
        };
        epoch.expect("epoch is a valid calendar date")
    }
}

/// Convert a non-negative serial number to a calendar date.
///
/// Fractional serials (time of day) are truncated.
pub fn serial_to_date(serial: f64, system: DateSystem) -> Result<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > i32::MAX as f64 {
        return Err(Error::InvalidDate(serial));
    }
    let mut days = serial.trunc() as i64;
    if system == DateSystem::Excel1900 && days < LEAP_BUG_SERIAL {
        days += 1;
    }
    system
        .epoch()
        .checked_add_signed(Duration::days(days))
        .ok_or(Error::InvalidDate(serial))
}

/// Convert a calendar date to its serial number.
pub fn date_to_serial(date: NaiveDate, system: DateSystem) -> f64 {
    let mut days = (date - system.epoch()).num_days();
    if system == DateSystem::Excel1900 && days <= LEAP_BUG_SERIAL {
        days -= 1;
    }
    days as f64
}
