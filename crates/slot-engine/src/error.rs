//! Error types for slot-engine operations.
//!
//! A fully booked day is not an error: the locators return `Ok(None)` for it.
//! Everything here is a precondition violation in the caller's input.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid workday: {0}")]
    InvalidWorkday(String),

    #[error("Unsorted bookings: entry {index} ({current}) is not after {previous}")]
    Unsorted {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("Booking off the slot grid: {0}")]
    OffGrid(NaiveDateTime),

    #[error("Too many bookings: {count} exceeds {max} slots per day")]
    TooManyBookings { count: usize, max: usize },

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid storage offset: {0} minutes is not within a day")]
    InvalidOffset(i64),

    #[error("Couldn't find an appointment: {0}")]
    UnknownAppointment(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
