//! Earliest free slot across a category of resources.
//!
//! Each resource is searched independently with the single-resource locator.
//! The winner is the strictly earliest slot; on equal times the resource that
//! comes first in the category keeps the win. The parallel variant collects
//! every per-resource outcome in enumeration order before reducing, so both
//! variants always agree.

use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::Serialize;

use crate::booked::BookedSlots;
use crate::error::Result;
use crate::offset::StorageOffset;
use crate::source::BookingSource;
use crate::workday::Workday;

/// The resource holding the category's earliest free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryMatch<'a, R> {
    /// Free slot start in grid time.
    pub start: NaiveDateTime,
    /// The resource that owns the slot.
    pub resource: &'a R,
    /// Position of `resource` within the category.
    pub position: usize,
}

/// Find the earliest free slot on `day` among `resources`, in order.
///
/// Bookings are fetched from `source` one resource at a time and normalized
/// through `offset`. Resources whose day is full are skipped. Returns
/// `Ok(None)` for an empty category or when every resource is full.
///
/// # Errors
///
/// Returns the first [`SlotError`](crate::SlotError) raised while validating
/// a resource's bookings; resources after it are not fetched.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveDateTime};
/// use slot_engine::{find_nearest_free_slot_in_category, StorageOffset, Workday};
///
/// let workday = Workday::new(9, 17, 60).unwrap();
/// let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
/// let bookings = |doctor: &&str, d: NaiveDate| -> Vec<NaiveDateTime> {
///     match *doctor {
///         "a" => workday.slots(d).collect(),
///         _ => vec![d.and_hms_opt(9, 0, 0).unwrap()],
///     }
/// };
///
/// let found = find_nearest_free_slot_in_category(
///     day, &["a", "b"], &bookings, &workday, StorageOffset::ZERO,
/// )
/// .unwrap()
/// .unwrap();
/// assert_eq!(*found.resource, "b");
/// assert_eq!(found.start, day.and_hms_opt(10, 0, 0).unwrap());
/// ```
pub fn find_nearest_free_slot_in_category<'a, R, S>(
    day: NaiveDate,
    resources: &'a [R],
    source: &S,
    workday: &Workday,
    offset: StorageOffset,
) -> Result<Option<CategoryMatch<'a, R>>>
where
    R: Debug,
    S: BookingSource<R> + ?Sized,
{
    let outcomes = resources
        .iter()
        .map(|resource| locate_for(day, resource, source, workday, offset));
    select_earliest(resources, outcomes)
}

/// Parallel form of [`find_nearest_free_slot_in_category`].
///
/// Fetches and searches every resource on the rayon pool, then reduces the
/// ordered results exactly as the sequential version does. All resources are
/// fetched even if one of them reports an error; the error returned is the
/// one from the earliest-enumerated failing resource.
pub fn find_nearest_free_slot_in_category_par<'a, R, S>(
    day: NaiveDate,
    resources: &'a [R],
    source: &S,
    workday: &Workday,
    offset: StorageOffset,
) -> Result<Option<CategoryMatch<'a, R>>>
where
    R: Debug + Sync,
    S: BookingSource<R> + Sync + ?Sized,
{
    let outcomes: Vec<Result<Option<NaiveDateTime>>> = resources
        .par_iter()
        .map(|resource| locate_for(day, resource, source, workday, offset))
        .collect();
    select_earliest(resources, outcomes)
}

fn locate_for<R, S>(
    day: NaiveDate,
    resource: &R,
    source: &S,
    workday: &Workday,
    offset: StorageOffset,
) -> Result<Option<NaiveDateTime>>
where
    R: Debug,
    S: BookingSource<R> + ?Sized,
{
    let stored = source.booked_starts(resource, day);
    let booked = BookedSlots::from_stored(day, &stored, workday, offset).inspect_err(|e| {
        tracing::warn!(?resource, %day, error = %e, "rejected bookings");
    })?;
    Ok(booked.nearest_free_slot())
}

/// Order-respecting reduction: a candidate replaces the best only when it is
/// strictly earlier.
fn select_earliest<'a, R, I>(resources: &'a [R], outcomes: I) -> Result<Option<CategoryMatch<'a, R>>>
where
    R: Debug,
    I: IntoIterator<Item = Result<Option<NaiveDateTime>>>,
{
    let mut best: Option<CategoryMatch<'a, R>> = None;
    for (position, (resource, outcome)) in resources.iter().zip(outcomes).enumerate() {
        let Some(start) = outcome? else {
            tracing::debug!(?resource, "no free slot, skipping");
            continue;
        };
        if best.as_ref().is_none_or(|b| start < b.start) {
            tracing::debug!(?resource, %start, "new earliest slot");
            best = Some(CategoryMatch {
                start,
                resource,
                position,
            });
        }
    }
    Ok(best)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotError;
    use std::collections::HashMap;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn hourly() -> Workday {
        Workday::new(9, 17, 60).unwrap()
    }

    type Resource = &'static str;

    fn source(
        map: HashMap<Resource, Vec<NaiveDateTime>>,
    ) -> impl Fn(&Resource, NaiveDate) -> Vec<NaiveDateTime> + Sync {
        move |r: &Resource, _: NaiveDate| map.get(r).cloned().unwrap_or_default()
    }

    /// Runs both variants and checks they agree.
    fn both<'a>(
        resources: &'a [Resource],
        src: &(impl Fn(&Resource, NaiveDate) -> Vec<NaiveDateTime> + Sync),
    ) -> Result<Option<CategoryMatch<'a, Resource>>> {
        let workday = hourly();
        let seq =
            find_nearest_free_slot_in_category(day(), resources, src, &workday, StorageOffset::ZERO);
        let par = find_nearest_free_slot_in_category_par(
            day(),
            resources,
            src,
            &workday,
            StorageOffset::ZERO,
        );
        assert_eq!(seq, par);
        seq
    }

    // ── selection ───────────────────────────────────────────────────────

    #[test]
    fn test_full_resource_is_skipped() {
        let src = source(HashMap::from([
            ("a", hourly().slots(day()).collect()),
            ("b", vec![at(9, 0)]),
        ]));
        let found = both(&["a", "b"], &src).unwrap().unwrap();
        assert_eq!(found.start, at(10, 0));
        assert_eq!(*found.resource, "b");
        assert_eq!(found.position, 1);
    }

    #[test]
    fn test_strictly_earlier_wins() {
        let src = source(HashMap::from([
            ("a", vec![at(9, 0), at(10, 0), at(11, 0)]),
            ("b", vec![at(9, 0)]),
        ]));
        let found = both(&["a", "b"], &src).unwrap().unwrap();
        assert_eq!(*found.resource, "b");
        assert_eq!(found.start, at(10, 0));
    }

    #[test]
    fn test_tie_keeps_first_enumerated() {
        let src = source(HashMap::from([
            ("a", vec![at(9, 0)]),
            ("b", vec![at(9, 0)]),
        ]));
        let found = both(&["a", "b"], &src).unwrap().unwrap();
        assert_eq!(*found.resource, "a");
        assert_eq!(found.start, at(10, 0));

        let found = both(&["b", "a"], &src).unwrap().unwrap();
        assert_eq!(*found.resource, "b");
    }

    #[test]
    fn test_later_resource_with_earlier_slot_replaces_best() {
        let src = source(HashMap::from([
            ("a", vec![at(9, 0), at(10, 0)]),
            ("b", vec![at(9, 0), at(10, 0), at(11, 0)]),
            ("c", vec![]),
        ]));
        let found = both(&["a", "b", "c"], &src).unwrap().unwrap();
        assert_eq!(*found.resource, "c");
        assert_eq!(found.start, at(9, 0));
    }

    // ── empty results ───────────────────────────────────────────────────

    #[test]
    fn test_empty_category() {
        let src = source(HashMap::new());
        assert_eq!(both(&[], &src).unwrap(), None);
    }

    #[test]
    fn test_all_full() {
        let full: Vec<_> = hourly().slots(day()).collect();
        let src = source(HashMap::from([("a", full.clone()), ("b", full)]));
        assert_eq!(both(&["a", "b"], &src).unwrap(), None);
    }

    // ── errors ──────────────────────────────────────────────────────────

    #[test]
    fn test_invalid_bookings_propagate() {
        let src = source(HashMap::from([
            ("a", vec![at(9, 0)]),
            ("b", vec![at(10, 30)]),
        ]));
        assert_eq!(both(&["a", "b"], &src).unwrap_err(), SlotError::OffGrid(at(10, 30)));
    }

    #[test]
    fn test_first_error_in_order_wins() {
        let src = source(HashMap::from([
            ("a", vec![at(11, 0), at(10, 0)]),
            ("b", vec![at(10, 30)]),
        ]));
        let err = both(&["a", "b"], &src).unwrap_err();
        assert!(matches!(err, SlotError::Unsorted { .. }));
    }

    // ── offset ──────────────────────────────────────────────────────────

    #[test]
    fn test_stored_offset_applies_to_every_resource() {
        let offset = StorageOffset::from_hours(2).unwrap();
        let src = source(HashMap::from([
            ("a", vec![at(11, 0), at(12, 0)]),
            ("b", vec![at(11, 0)]),
        ]));
        let found = find_nearest_free_slot_in_category(day(), &["a", "b"], &src, &hourly(), offset)
            .unwrap()
            .unwrap();
        assert_eq!(*found.resource, "b");
        assert_eq!(found.start, at(10, 0));
        assert_eq!(offset.denormalize(found.start), Some(at(12, 0)));
    }

    // ── properties ──────────────────────────────────────────────────────

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parallel_matches_sequential_and_brute_force(
                prefixes in prop::collection::vec(0usize..=8, 0..12)
            ) {
                let workday = hourly();
                let resources: Vec<usize> = (0..prefixes.len()).collect();
                let src = |r: &usize, d: NaiveDate| -> Vec<NaiveDateTime> {
                    workday.slots(d).take(prefixes[*r]).collect()
                };

                let seq = find_nearest_free_slot_in_category(day(), &resources, &src, &workday, StorageOffset::ZERO).unwrap();
                let par = find_nearest_free_slot_in_category_par(day(), &resources, &src, &workday, StorageOffset::ZERO).unwrap();
                prop_assert_eq!(seq, par);

                let expected = prefixes
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| **n < 8)
                    .min_by_key(|(i, n)| (**n, *i))
                    .map(|(i, n)| (workday.slot_start(day(), *n), i));
                prop_assert_eq!(seq.map(|m| (m.start, m.position)), expected);
            }
        }
    }
}
