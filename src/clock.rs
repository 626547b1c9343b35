use chrono::{Local, NaiveDateTime};

/// Injectable "current time" source so the week calculator and the
/// past-date guard stay deterministic under test. Local time: the whole
/// schedule speaks in the server's local calendar days.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant; used by tests.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
