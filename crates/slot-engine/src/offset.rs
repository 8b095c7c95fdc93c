//! Conversion between stored appointment times and grid times.
//!
//! Appointment stores may keep times shifted by a fixed amount relative to
//! the wall-clock grid (for example, a constant display correction applied
//! on write). [`StorageOffset`] captures that shift once; every stored
//! booking is normalized through it before any comparison against
//! [`Workday::slot_start`](crate::Workday::slot_start), and found slots are
//! denormalized through it before being written back.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::SlotError;
use crate::workday::Workday;

/// Largest accepted shift, in minutes, in either direction.
pub const MAX_OFFSET_MINUTES: i64 = 24 * 60 - 1;

/// Fixed shift from grid time to stored time: `stored = grid + offset`.
///
/// Always strictly less than a day in magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct StorageOffset {
    minutes: i64,
}

impl TryFrom<i64> for StorageOffset {
    type Error = SlotError;

    fn try_from(minutes: i64) -> Result<Self, Self::Error> {
        StorageOffset::from_minutes(minutes)
    }
}

impl From<StorageOffset> for i64 {
    fn from(offset: StorageOffset) -> Self {
        offset.minutes
    }
}

impl StorageOffset {
    /// Stored times equal grid times.
    pub const ZERO: StorageOffset = StorageOffset { minutes: 0 };

    /// # Errors
    ///
    /// Returns [`SlotError::InvalidOffset`] if `|minutes|` exceeds
    /// [`MAX_OFFSET_MINUTES`].
    pub fn from_minutes(minutes: i64) -> Result<Self, SlotError> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(SlotError::InvalidOffset(minutes));
        }
        Ok(StorageOffset { minutes })
    }

    pub fn from_hours(hours: i64) -> Result<Self, SlotError> {
        let minutes = hours
            .checked_mul(60)
            .ok_or(SlotError::InvalidOffset(hours))?;
        StorageOffset::from_minutes(minutes)
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    fn duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.minutes)
    }

    /// Stored time → grid time. `None` only past the end of the calendar.
    pub fn normalize(&self, stored: NaiveDateTime) -> Option<NaiveDateTime> {
        stored.checked_sub_signed(self.duration()?)
    }

    /// Grid time → stored time. `None` only past the end of the calendar.
    pub fn denormalize(&self, grid: NaiveDateTime) -> Option<NaiveDateTime> {
        grid.checked_add_signed(self.duration()?)
    }

    /// The day's half-open bookable window expressed in stored time.
    pub fn window(
        &self,
        workday: &Workday,
        day: NaiveDate,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (open, close) = workday.day_window(day);
        Some((self.denormalize(open)?, self.denormalize(close)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
    }

    #[test]
    fn test_zero_offset_is_identity() {
        let t = day().and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(StorageOffset::ZERO.normalize(t), Some(t));
        assert_eq!(StorageOffset::ZERO.denormalize(t), Some(t));
        assert_eq!(StorageOffset::default(), StorageOffset::ZERO);
    }

    #[test]
    fn test_two_hour_shift() {
        let offset = StorageOffset::from_hours(2).unwrap();
        let stored = day().and_hms_opt(19, 0, 0).unwrap();
        let grid = day().and_hms_opt(17, 0, 0).unwrap();
        assert_eq!(offset.normalize(stored), Some(grid));
        assert_eq!(offset.denormalize(grid), Some(stored));
    }

    #[test]
    fn test_negative_shift_crosses_midnight() {
        let offset = StorageOffset::from_minutes(-90).unwrap();
        let grid = day().and_hms_opt(0, 30, 0).unwrap();
        let stored = offset.denormalize(grid).unwrap();
        let previous_evening = NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        assert_eq!(stored, previous_evening);
        assert_eq!(offset.normalize(stored), Some(grid));
    }

    #[test]
    fn test_window_in_stored_time() {
        let workday = Workday::new(9, 17, 60).unwrap();
        let offset = StorageOffset::from_hours(2).unwrap();
        let (open, close) = offset.window(&workday, day()).unwrap();
        assert_eq!(open, day().and_hms_opt(11, 0, 0).unwrap());
        assert_eq!(close, day().and_hms_opt(19, 0, 0).unwrap());
    }

    // ── bounds ──────────────────────────────────────────────────────────

    #[test]
    fn test_bounds_accepted() {
        assert!(StorageOffset::from_minutes(MAX_OFFSET_MINUTES).is_ok());
        assert!(StorageOffset::from_minutes(-MAX_OFFSET_MINUTES).is_ok());
    }

    #[test]
    fn test_a_full_day_or_more_rejected() {
        assert_eq!(
            StorageOffset::from_minutes(24 * 60),
            Err(SlotError::InvalidOffset(24 * 60))
        );
        assert!(StorageOffset::from_hours(-24).is_err());
        assert!(StorageOffset::from_hours(i64::MAX).is_err());
        assert!(StorageOffset::from_minutes(i64::MIN).is_err());
    }

    #[test]
    fn test_shift_at_calendar_edge_is_none() {
        let offset = StorageOffset::from_hours(2).unwrap();
        assert_eq!(offset.denormalize(NaiveDateTime::MAX), None);
        assert_eq!(offset.normalize(NaiveDateTime::MIN), None);
    }

    // ── serde ───────────────────────────────────────────────────────────

    #[test]
    fn test_serde_as_minutes() {
        let offset: StorageOffset = serde_json::from_str("120").unwrap();
        assert_eq!(offset, StorageOffset::from_hours(2).unwrap());
        assert_eq!(serde_json::to_string(&offset).unwrap(), "120");
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let err = serde_json::from_str::<StorageOffset>("9223372036854775807")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid storage offset"), "got: {err}");
        assert!(serde_json::from_str::<StorageOffset>("-1440").is_err());
    }
}
