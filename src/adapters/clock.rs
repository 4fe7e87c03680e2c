use crate::domain::ports::Clock;
use chrono::NaiveDate;

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

/// Clock picked at startup: a configured override or the real date.
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl ConfiguredClock {
    pub fn from_override(today: Option<NaiveDate>) -> Self {
        match today {
            Some(date) => ConfiguredClock::Fixed(FixedClock::new(date)),
            None => ConfiguredClock::System(SystemClock),
        }
    }
}

impl Clock for ConfiguredClock {
    fn today(&self) -> NaiveDate {
        match self {
            ConfiguredClock::System(clock) => clock.today(),
            ConfiguredClock::Fixed(clock) => clock.today(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(FixedClock::new(date).today(), date);
        assert_eq!(ConfiguredClock::from_override(Some(date)).today(), date);
    }

    #[test]
    fn test_system_clock_without_override() {
        let clock = ConfiguredClock::from_override(None);
        assert!(matches!(clock, ConfiguredClock::System(_)));
        let today = chrono::Local::now().date_naive();
        // Allow for the test running across midnight.
        assert!((clock.today() - today).num_days().abs() <= 1);
    }
}
