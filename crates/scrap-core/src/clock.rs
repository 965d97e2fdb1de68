//! Time source and scrap id generation

use std::cell::Cell;

use chrono::{DateTime, Local, Locale};

use crate::ScrapId;

/// Timestamp layout of the `ko-KR` locale, e.g. `2025. 10. 16. 오후 3:04:05`
const TIMESTAMP_FORMAT: &str = "%Y. %-m. %-d. %p %-I:%M:%S";

/// Wall-clock source
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Human-readable creation time
pub fn format_timestamp(time: &DateTime<Local>, locale: Locale) -> String {
    time.format_localized(TIMESTAMP_FORMAT, locale).to_string()
}

/// Millisecond ids, unique within one generator.
///
/// Two ids requested in the same millisecond get a `-1`, `-2`... suffix.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: Cell<i64>,
    collisions: Cell<u32>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, now: &DateTime<Local>) -> ScrapId {
        let millis = now.timestamp_millis();
        if millis != self.last_millis.get() {
            self.last_millis.set(millis);
            self.collisions.set(0);
            return ScrapId::new(millis.to_string());
        }
        let n = self.collisions.get() + 1;
        self.collisions.set(n);
        ScrapId::new(format!("{millis}-{n}"))
    }
}
