//! Where a resource's bookings come from.
//!
//! The locators never read storage themselves. They call a
//! [`BookingSource`] for each resource and day. Any
//! `Fn(&R, NaiveDate) -> Vec<NaiveDateTime>` qualifies, and
//! [`InMemoryBookings`] provides a ready-made appointment book with the same
//! half-open range query a database-backed source would run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::category::{find_nearest_free_slot_in_category, CategoryMatch};
use crate::error::{Result, SlotError};
use crate::locator::find_nearest_free_slot_stored;
use crate::offset::StorageOffset;
use crate::workday::Workday;

/// Supplies a resource's booked slot starts for a day.
///
/// Implementations must return stored times sorted ascending, restricted to
/// that resource and to the day's bookable window.
pub trait BookingSource<R: ?Sized> {
    fn booked_starts(&self, resource: &R, day: NaiveDate) -> Vec<NaiveDateTime>;
}

impl<R: ?Sized, F> BookingSource<R> for F
where
    F: Fn(&R, NaiveDate) -> Vec<NaiveDateTime>,
{
    fn booked_starts(&self, resource: &R, day: NaiveDate) -> Vec<NaiveDateTime> {
        self(resource, day)
    }
}

/// A single booked appointment, in stored time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Appointment<R> {
    pub resource: R,
    pub start: NaiveDateTime,
}

/// In-memory appointment book keyed by resource.
///
/// Times are kept as stored (offset applied). Day queries use the window
/// `[opening, closing)` shifted into stored time.
#[derive(Debug, Clone)]
pub struct InMemoryBookings<R> {
    workday: Workday,
    offset: StorageOffset,
    by_resource: BTreeMap<R, BTreeSet<NaiveDateTime>>,
}

impl<R: Ord + Clone + Debug> InMemoryBookings<R> {
    pub fn new(workday: Workday, offset: StorageOffset) -> Self {
        InMemoryBookings {
            workday,
            offset,
            by_resource: BTreeMap::new(),
        }
    }

    pub fn workday(&self) -> &Workday {
        &self.workday
    }

    pub fn offset(&self) -> StorageOffset {
        self.offset
    }

    /// Record an appointment. Returns `false` if that resource already has
    /// one at `start`.
    pub fn book(&mut self, resource: R, start: NaiveDateTime) -> bool {
        self.by_resource.entry(resource).or_default().insert(start)
    }

    /// Remove an appointment. Returns `false` if there was none.
    pub fn cancel(&mut self, resource: &R, start: NaiveDateTime) -> bool {
        let Some(starts) = self.by_resource.get_mut(resource) else {
            return false;
        };
        let removed = starts.remove(&start);
        if starts.is_empty() {
            self.by_resource.remove(resource);
        }
        removed
    }

    /// Total number of appointments held.
    pub fn len(&self) -> usize {
        self.by_resource.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_resource.is_empty()
    }

    /// Every appointment held, ordered by resource and then by start time.
    pub fn appointments(&self) -> Vec<Appointment<R>> {
        self.by_resource
            .iter()
            .flat_map(|(resource, starts)| {
                starts.iter().map(move |&start| Appointment {
                    resource: resource.clone(),
                    start,
                })
            })
            .collect()
    }

    /// Every appointment on `day` across all resources, ordered by start time
    /// and then by resource.
    pub fn appointments_on(&self, day: NaiveDate) -> Vec<Appointment<R>> {
        let Some((start, end)) = self.offset.window(&self.workday, day) else {
            return Vec::new();
        };
        let mut all: Vec<Appointment<R>> = self
            .by_resource
            .iter()
            .flat_map(|(resource, starts)| {
                starts.range(start..end).map(move |&t| Appointment {
                    resource: resource.clone(),
                    start: t,
                })
            })
            .collect();
        all.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.resource.cmp(&b.resource)));
        all
    }

    /// Book `resource` into its earliest free slot on `day`.
    ///
    /// Returns the new appointment, or `None` when the day is full.
    pub fn book_nearest(&mut self, resource: R, day: NaiveDate) -> Result<Option<Appointment<R>>> {
        let stored = self.booked_starts(&resource, day);
        let Some(slot) = find_nearest_free_slot_stored(day, &stored, &self.workday, self.offset)?
        else {
            tracing::info!(?resource, %day, "day is full");
            return Ok(None);
        };
        let start = self.stored(slot)?;
        self.book(resource.clone(), start);
        tracing::info!(?resource, %start, "booked nearest slot");
        Ok(Some(Appointment { resource, start }))
    }

    /// Book the earliest free slot on `day` among `category`.
    pub fn book_nearest_in_category(
        &mut self,
        category: &[R],
        day: NaiveDate,
    ) -> Result<Option<Appointment<R>>> {
        let found = self.nearest_in_category(category, day)?;
        let Some((resource, slot)) = found else {
            tracing::info!(%day, "category is full");
            return Ok(None);
        };
        let start = self.stored(slot)?;
        self.book(resource.clone(), start);
        tracing::info!(?resource, %start, "booked nearest slot in category");
        Ok(Some(Appointment { resource, start }))
    }

    /// Move an existing appointment to the earliest free slot on `day`.
    ///
    /// With `category` set, any resource in it may take the appointment;
    /// otherwise it stays with the same resource. The old slot is released
    /// before searching. If nothing is free the old appointment is restored
    /// and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// [`SlotError::UnknownAppointment`] if `current` is not in the book;
    /// nothing is booked in that case.
    pub fn reschedule(
        &mut self,
        current: &Appointment<R>,
        day: NaiveDate,
        category: Option<&[R]>,
    ) -> Result<Option<Appointment<R>>> {
        if !self.cancel(&current.resource, current.start) {
            return Err(SlotError::UnknownAppointment(format!(
                "{:?} at {}",
                current.resource, current.start
            )));
        }
        let moved = match category {
            Some(resources) => self.book_nearest_in_category(resources, day),
            None => self.book_nearest(current.resource.clone(), day),
        };
        if !matches!(moved, Ok(Some(_))) {
            self.book(current.resource.clone(), current.start);
        }
        moved
    }

    fn stored(&self, slot: NaiveDateTime) -> Result<NaiveDateTime> {
        self.offset.denormalize(slot).ok_or(SlotError::OffGrid(slot))
    }

    fn nearest_in_category(&self, category: &[R], day: NaiveDate) -> Result<Option<(R, NaiveDateTime)>> {
        let found: Option<CategoryMatch<'_, R>> =
            find_nearest_free_slot_in_category(day, category, self, &self.workday, self.offset)?;
        Ok(found.map(|m| (m.resource.clone(), m.start)))
    }
}

impl<R: Ord + Clone + Debug> BookingSource<R> for InMemoryBookings<R> {
    fn booked_starts(&self, resource: &R, day: NaiveDate) -> Vec<NaiveDateTime> {
        let Some((start, end)) = self.offset.window(&self.workday, day) else {
            return Vec::new();
        };
        self.by_resource
            .get(resource)
            .map(|starts| starts.range(start..end).copied().collect())
            .unwrap_or_default()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
