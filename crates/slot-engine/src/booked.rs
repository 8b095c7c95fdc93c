//! Validated snapshot of one resource's bookings for one day.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, SlotError};
use crate::locator;
use crate::offset::StorageOffset;
use crate::workday::Workday;

/// A resource's booked slot starts for a single day, normalized to grid time.
///
/// Construction checks the locator's preconditions once: at most
/// `max_sessions_per_day` entries, every entry exactly on the day's grid,
/// strictly ascending. After that, [`nearest_free_slot`](Self::nearest_free_slot)
/// cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedSlots {
    day: NaiveDate,
    workday: Workday,
    starts: Vec<NaiveDateTime>,
}

impl BookedSlots {
    /// Validate bookings already expressed in grid time.
    pub fn new(day: NaiveDate, starts: &[NaiveDateTime], workday: &Workday) -> Result<Self> {
        Self::from_stored(day, starts, workday, StorageOffset::ZERO)
    }

    /// Normalize stored times through `offset`, then validate.
    ///
    /// # Errors
    ///
    /// - [`SlotError::TooManyBookings`] if there are more entries than slots.
    /// - [`SlotError::OffGrid`] for an entry that is not a slot start of `day`.
    /// - [`SlotError::Unsorted`] for an entry not strictly after its
    ///   predecessor (duplicates included).
    pub fn from_stored(
        day: NaiveDate,
        stored: &[NaiveDateTime],
        workday: &Workday,
        offset: StorageOffset,
    ) -> Result<Self> {
        let max = workday.max_sessions_per_day();
        if stored.len() > max {
            return Err(SlotError::TooManyBookings {
                count: stored.len(),
                max,
            });
        }

        let mut starts = Vec::with_capacity(stored.len());
        for (index, &raw) in stored.iter().enumerate() {
            let Some(current) = offset
                .normalize(raw)
                .filter(|&t| workday.slot_index(day, t).is_some())
            else {
                return Err(SlotError::OffGrid(raw));
            };
            if let Some(&previous) = starts.last() {
                if current <= previous {
                    return Err(SlotError::Unsorted {
                        index,
                        previous,
                        current,
                    });
                }
            }
            starts.push(current);
        }

        Ok(BookedSlots {
            day,
            workday: *workday,
            starts,
        })
    }

    /// Booked starts in grid time, ascending.
    pub fn as_slice(&self) -> &[NaiveDateTime] {
        &self.starts
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Every slot of the day is taken.
    pub fn is_full(&self) -> bool {
        self.starts.len() == self.workday.max_sessions_per_day()
    }

    /// Earliest free slot start in grid time, or `None` when the day is full.
    pub fn nearest_free_slot(&self) -> Option<NaiveDateTime> {
        locator::locate(self.day, &self.starts, &self.workday)
    }
}
