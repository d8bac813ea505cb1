use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of "now" for date-keyed logic. Always expressed in the configured
/// attendance timezone, never ambient system local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Tz>,
}

impl FixedClock {
    pub fn new(at: DateTime<Tz>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    #[test]
    fn today_is_taken_in_clock_timezone() {
        // 20:00 UTC on May 31st is already June 1st in Kolkata (+05:30)
        let utc = Utc.with_ymd_and_hms(2024, 5, 31, 20, 0, 0).unwrap();
        let clock = FixedClock::new(utc.with_timezone(&Kolkata));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(clock.now().format("%H:%M").to_string(), "01:30");
    }

    #[test]
    fn system_clock_reports_configured_zone() {
        let clock = SystemClock::new(Kolkata);
        assert_eq!(clock.now().timezone(), Kolkata);
    }
}
