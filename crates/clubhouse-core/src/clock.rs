//! Time source for the services.
//!
//! Role tenures start and end on "today". Services never read the system
//! clock directly; the store hands them a [`Clock`] so tests can pin the date.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;

  fn today(&self) -> NaiveDate { self.now().date_naive() }
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
  /// Midnight UTC on `date`.
  pub fn on(date: NaiveDate) -> Self {
    Self(date.and_time(NaiveTime::MIN).and_utc())
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_clock_reports_its_date() {
    let date  = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let clock = FixedClock::on(date);
    assert_eq!(clock.today(), date);
    assert_eq!(clock.now().date_naive(), date);
  }
}
