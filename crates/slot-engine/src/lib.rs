//! # slot-engine
//!
//! Deterministic appointment slot search on a fixed daily grid.
//!
//! A day is divided into equal sessions between an opening and a closing
//! hour. Given the sorted bookings of a resource (a doctor, a room, …) for a
//! day, the engine finds the next free slot; given a category of resources,
//! it finds the earliest free slot among all of them, preferring the first
//! resource listed on ties.
//!
//! All search functions are pure: the caller supplies the bookings (or a
//! [`BookingSource`] that fetches them) and the [`Workday`] configuration.
//! A fully booked day is `Ok(None)`; malformed input is a [`SlotError`].
//!
//! ## Modules
//!
//! - [`workday`] — Grid configuration and slot start-time arithmetic
//! - [`offset`] — Stored-time ↔ grid-time normalization
//! - [`booked`] — Validated per-day booking snapshots
//! - [`locator`] — Next free slot for one resource
//! - [`category`] — Earliest free slot across resources, sequential or parallel
//! - [`source`] — Booking source trait and an in-memory appointment book
//! - [`parse`] — Day and datetime parsing
//! - [`error`] — Error types

pub mod booked;
pub mod category;
pub mod error;
pub mod locator;
pub mod offset;
pub mod parse;
pub mod source;
pub mod workday;

pub use booked::BookedSlots;
pub use category::{
    find_nearest_free_slot_in_category, find_nearest_free_slot_in_category_par, CategoryMatch,
};
pub use error::SlotError;
pub use locator::{find_nearest_free_slot, find_nearest_free_slot_stored};
pub use offset::StorageOffset;
pub use parse::{parse_datetime, parse_day};
pub use source::{Appointment, BookingSource, InMemoryBookings};
pub use workday::Workday;
