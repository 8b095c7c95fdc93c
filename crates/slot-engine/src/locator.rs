//! Next free slot for a single resource.
//!
//! Bookings fill the grid from the opening slot onwards. Because the input is
//! strictly ascending and on-grid, `booked[i] == slot_start(i)` holds for every
//! position before the first gap and fails for every position after it. That
//! monotone predicate lets the interior case use a binary search.

use chrono::{NaiveDate, NaiveDateTime};

use crate::booked::BookedSlots;
use crate::error::Result;
use crate::offset::StorageOffset;
use crate::workday::Workday;

/// Find the earliest free slot on `day` given the resource's booked starts.
///
/// `booked_starts` are grid times, sorted ascending. Returns `Ok(None)` when
/// the day is fully booked.
///
/// # Errors
///
/// Returns a [`SlotError`](crate::SlotError) if `booked_starts` is unsorted,
/// contains duplicates or off-grid times, or is longer than the day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use slot_engine::{find_nearest_free_slot, Workday};
///
/// let workday = Workday::new(9, 17, 60).unwrap();
/// let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
/// let booked: Vec<_> = (9..13).map(|h| day.and_hms_opt(h, 0, 0).unwrap()).collect();
///
/// let next = find_nearest_free_slot(day, &booked, &workday).unwrap();
/// assert_eq!(next, day.and_hms_opt(13, 0, 0));
/// ```
pub fn find_nearest_free_slot(
    day: NaiveDate,
    booked_starts: &[NaiveDateTime],
    workday: &Workday,
) -> Result<Option<NaiveDateTime>> {
    Ok(BookedSlots::new(day, booked_starts, workday)?.nearest_free_slot())
}

/// Like [`find_nearest_free_slot`], for bookings read straight from storage.
///
/// Stored times are normalized through `offset` before the search; the
/// returned slot is in grid time.
pub fn find_nearest_free_slot_stored(
    day: NaiveDate,
    stored_starts: &[NaiveDateTime],
    workday: &Workday,
    offset: StorageOffset,
) -> Result<Option<NaiveDateTime>> {
    Ok(BookedSlots::from_stored(day, stored_starts, workday, offset)?.nearest_free_slot())
}

/// Core search over validated grid times.
pub(crate) fn locate(
    day: NaiveDate,
    starts: &[NaiveDateTime],
    workday: &Workday,
) -> Option<NaiveDateTime> {
    let max = workday.max_sessions_per_day();
    let first = workday.slot_start(day, 0);

    // Front gap.
    match starts.first() {
        Some(&booked) if booked == first => {}
        _ => {
            tracing::trace!(%day, slot = %first, "free slot at opening");
            return Some(first);
        }
    }

    // Back gap: one opening left and it is the final slot.
    let last = workday.last_slot_start(day);
    if starts.len() == max - 1 && starts.last() != Some(&last) {
        tracing::trace!(%day, slot = %last, "free slot at end of day");
        return Some(last);
    }

    // Interior gap. `low` ends on the first index whose booking is not the
    // expected slot start.
    let (mut low, mut high) = (0, starts.len());
    while low < high {
        let mid = low + (high - low) / 2;
        if starts[mid] == workday.slot_start(day, mid) {
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    let candidate = workday.slot_start(day, low);
    if candidate > last {
        tracing::trace!(%day, booked = starts.len(), "day full");
        return None;
    }
    tracing::trace!(%day, slot = %candidate, index = low, "free slot in gap");
    Some(candidate)
}

// ── Tests ───────────────────────────────────────────────────────────────────
