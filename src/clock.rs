use chrono::{DateTime, Utc};

/// Source of "now" for rows that carry no trading date.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Default, Debug, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
