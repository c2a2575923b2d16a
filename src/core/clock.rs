use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use std::fmt::Debug;
use std::sync::RwLock;

/// Trip-local wall clock. Detectors compare schedule dates and hours against it.
pub trait Clock: Send + Sync + Debug {
    /// Wall-clock time at the trip destination
    fn local_now(&self) -> NaiveDateTime;

    /// Offset of the destination's local time from UTC
    fn offset(&self) -> FixedOffset;

    fn now(&self) -> DateTime<Utc> {
        let local = self.local_now();
        let shift = Duration::seconds(i64::from(self.offset().local_minus_utc()));
        Utc.from_utc_datetime(&(local - shift))
    }

    fn today(&self) -> NaiveDate {
        self.local_now().date()
    }
}

/// Indochina time, where the default trip data lives.
pub fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix())
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(default_offset())
    }
}

impl Clock for SystemClock {
    fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// A clock pinned to a local time, movable from tests.
#[derive(Debug)]
pub struct FixedClock {
    local: RwLock<NaiveDateTime>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            local: RwLock::new(local),
            offset: default_offset(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn set(&self, local: NaiveDateTime) {
        *self.local.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = local;
    }

    pub fn advance(&self, by: Duration) {
        let mut local = self.local.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *local += by;
    }
}

impl Clock for FixedClock {
    fn local_now(&self) -> NaiveDateTime {
        *self.local.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
