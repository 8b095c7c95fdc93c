//! The daily slot grid.
//!
//! A [`Workday`] describes one day's bookable window: the hour the first
//! session starts, the hour the day closes, and the fixed length of every
//! session. Each slot on the grid is addressed by an index in
//! `0..max_sessions_per_day()`, and its start time is a pure function of
//! `(day, index, workday)` — see [`Workday::slot_start`].
//!
//! The same configuration applies to every resource and every day. It is
//! passed explicitly into the locators, so several grids can coexist in one
//! process.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::SlotError;

/// Validated grid configuration for a working day.
///
/// Invariants (enforced by [`Workday::new`] and by deserialization):
/// `opening_hour < closing_hour <= 24`, and `session_minutes` is a
/// positive divisor of 60.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use slot_engine::Workday;
///
/// let workday = Workday::new(9, 17, 20).unwrap();
/// assert_eq!(workday.sessions_per_hour(), 3);
/// assert_eq!(workday.max_sessions_per_day(), 24);
///
/// let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
/// assert_eq!(workday.slot_start(day, 4).to_string(), "2026-03-16 10:20:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WorkdayParams", into = "WorkdayParams")]
pub struct Workday {
    opening_hour: u32,
    closing_hour: u32,
    session_minutes: u32,
}

/// Raw, unvalidated form used for (de)serialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WorkdayParams {
    opening_hour: u32,
    closing_hour: u32,
    session_minutes: u32,
}

impl TryFrom<WorkdayParams> for Workday {
    type Error = SlotError;

    fn try_from(p: WorkdayParams) -> Result<Self, Self::Error> {
        Workday::new(p.opening_hour, p.closing_hour, p.session_minutes)
    }
}

impl From<Workday> for WorkdayParams {
    fn from(w: Workday) -> Self {
        WorkdayParams {
            opening_hour: w.opening_hour,
            closing_hour: w.closing_hour,
            session_minutes: w.session_minutes,
        }
    }
}

impl Workday {
    /// Build a grid configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidWorkday`] if the hours are out of order or
    /// outside a single day, or if `session_minutes` does not evenly divide
    /// an hour.
    pub fn new(
        opening_hour: u32,
        closing_hour: u32,
        session_minutes: u32,
    ) -> Result<Self, SlotError> {
        if closing_hour > 24 {
            return Err(SlotError::InvalidWorkday(format!(
                "closing hour {closing_hour} is past the end of the day"
            )));
        }
        if opening_hour >= closing_hour {
            return Err(SlotError::InvalidWorkday(format!(
                "opening hour {opening_hour} must be before closing hour {closing_hour}"
            )));
        }
        if session_minutes == 0 || 60 % session_minutes != 0 {
            return Err(SlotError::InvalidWorkday(format!(
                "session length of {session_minutes} minutes does not divide an hour"
            )));
        }
        Ok(Workday {
            opening_hour,
            closing_hour,
            session_minutes,
        })
    }

    /// Length of one session.
    pub fn session_length(&self) -> Duration {
        Duration::minutes(i64::from(self.session_minutes))
    }

    pub fn sessions_per_hour(&self) -> usize {
        (60 / self.session_minutes) as usize
    }

    pub fn max_sessions_per_day(&self) -> usize {
        (self.closing_hour - self.opening_hour) as usize * self.sessions_per_hour()
    }

    /// Start of the first session on `day`.
    pub fn opening(&self, day: NaiveDate) -> NaiveDateTime {
        midnight(day) + Duration::hours(i64::from(self.opening_hour))
    }

    /// End of the bookable window on `day`. With a closing hour of 24 this is
    /// midnight of the following day.
    pub fn closing(&self, day: NaiveDate) -> NaiveDateTime {
        midnight(day) + Duration::hours(i64::from(self.closing_hour))
    }

    /// Half-open window `[opening, closing)` in grid time, suitable for a
    /// bookings range query.
    pub fn day_window(&self, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (self.opening(day), self.closing(day))
    }

    /// Expected start time of slot `index` on `day`.
    ///
    /// Defined for any index; indices at or past
    /// [`max_sessions_per_day`](Self::max_sessions_per_day) land at or after
    /// closing time.
    pub fn slot_start(&self, day: NaiveDate, index: usize) -> NaiveDateTime {
        self.opening(day) + self.session_length() * index as i32
    }

    /// Start time of the final slot of `day`.
    pub fn last_slot_start(&self, day: NaiveDate) -> NaiveDateTime {
        self.slot_start(day, self.max_sessions_per_day() - 1)
    }

    /// Grid index of `time` on `day`, or `None` if `time` is not exactly the
    /// start of one of that day's slots.
    pub fn slot_index(&self, day: NaiveDate, time: NaiveDateTime) -> Option<usize> {
        let offset = time - self.opening(day);
        if offset < Duration::zero() {
            return None;
        }
        let step = self.session_length().num_seconds();
        let seconds = offset.num_seconds();
        if seconds % step != 0 || offset.subsec_nanos() != 0 {
            return None;
        }
        let index = (seconds / step) as usize;
        (index < self.max_sessions_per_day()).then_some(index)
    }

    /// Every slot start on `day`, in order.
    pub fn slots(&self, day: NaiveDate) -> impl Iterator<Item = NaiveDateTime> {
        let workday = *self;
        (0..self.max_sessions_per_day()).map(move |i| workday.slot_start(day, i))
    }
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

// ── Tests ───────────────────────────────────────────────────────────────────
