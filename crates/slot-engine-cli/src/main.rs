//! `slotfind` — find and book the nearest free appointment slot in a schedule file.
//!
//! ```text
//! slotfind resource   --schedule clinic.json --day 2026-03-16 --id 10
//! slotfind category   --schedule clinic.json --day 2026-03-16 --id 1 --parallel
//! slotfind day        --schedule clinic.json --day 2026-03-16 [--resource 10 | --category 1]
//! slotfind book       --schedule clinic.json --day 2026-03-16 (--resource 10 | --category 1)
//! slotfind reschedule --schedule clinic.json --day 2026-03-17 --resource 10 --start 2026-03-16T09:00:00 [--category 1]
//! slotfind cancel     --schedule clinic.json --resource 10 --start 2026-03-16T09:00:00
//! ```
//!
//! `--today YYYY-MM-DD` rejects searches and bookings on earlier days.
//! Appointment times on the command line and in the file are stored times.
//! Results are printed as JSON on stdout. Logs go to stderr and are
//! controlled by `RUST_LOG`.

mod schedule;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use slot_engine::{
    find_nearest_free_slot_in_category, find_nearest_free_slot_in_category_par,
    find_nearest_free_slot_stored, parse_datetime, parse_day, Appointment, BookingSource,
};
use tracing_subscriber::EnvFilter;

use crate::schedule::{ResourceId, Schedule};

#[derive(Parser)]
#[command(name = "slotfind", version, about = "Find the nearest free appointment slot")]
struct Cli {
    /// Reject searches and bookings on days before this one (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_day_arg)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Nearest free slot for one resource
    Resource {
        #[command(flatten)]
        query: DayQuery,
        /// Resource id
        #[arg(long)]
        id: ResourceId,
    },
    /// Earliest free slot across every resource of a category
    Category {
        #[command(flatten)]
        query: DayQuery,
        /// Category id
        #[arg(long)]
        id: ResourceId,
        /// Fetch and search resources in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// List the appointments booked on a day
    Day {
        #[command(flatten)]
        query: DayQuery,
        /// Only this resource's appointments
        #[arg(long, conflicts_with = "category")]
        resource: Option<ResourceId>,
        /// Only appointments of this category's resources
        #[arg(long)]
        category: Option<ResourceId>,
    },
    /// Book the nearest free slot and save the schedule
    Book {
        #[command(flatten)]
        query: DayQuery,
        /// Book with this resource
        #[arg(long, conflicts_with = "category", required_unless_present = "category")]
        resource: Option<ResourceId>,
        /// Book with whichever resource of this category is free first
        #[arg(long)]
        category: Option<ResourceId>,
    },
    /// Move an appointment to the nearest free slot on a day and save the schedule
    Reschedule {
        #[command(flatten)]
        query: DayQuery,
        /// Resource currently holding the appointment
        #[arg(long)]
        resource: ResourceId,
        /// Current start of the appointment
        #[arg(long, value_parser = parse_datetime_arg)]
        start: NaiveDateTime,
        /// Let any resource of this category take the appointment
        #[arg(long)]
        category: Option<ResourceId>,
    },
    /// Cancel an appointment and save the schedule
    Cancel {
        /// Schedule file (JSON)
        #[arg(long)]
        schedule: PathBuf,
        #[arg(long)]
        resource: ResourceId,
        /// Start of the appointment
        #[arg(long, value_parser = parse_datetime_arg)]
        start: NaiveDateTime,
    },
}

#[derive(Args)]
struct DayQuery {
    /// Schedule file (JSON)
    #[arg(long)]
    schedule: PathBuf,
    /// Day to search (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day_arg)]
    day: NaiveDate,
}

impl DayQuery {
    /// Load the schedule for a search or booking on `self.day`.
    fn load_upcoming(&self, today: Option<NaiveDate>) -> Result<Schedule> {
        if let Some(today) = today {
            if self.day < today {
                bail!("{} is an old date", self.day);
            }
        }
        Schedule::load(&self.schedule)
    }
}

fn parse_day_arg(s: &str) -> Result<NaiveDate, String> {
    parse_day(s).map_err(|e| e.to_string())
}

fn parse_datetime_arg(s: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let today = cli.today;
    let output = match cli.command {
        Command::Resource { query, id } => nearest_for_resource(&query, today, id)?,
        Command::Category {
            query,
            id,
            parallel,
        } => nearest_in_category(&query, today, id, parallel)?,
        Command::Day {
            query,
            resource,
            category,
        } => appointments_on_day(&query, resource, category)?,
        Command::Book {
            query,
            resource,
            category,
        } => book(&query, today, resource, category)?,
        Command::Reschedule {
            query,
            resource,
            start,
            category,
        } => reschedule(&query, today, Appointment { resource, start }, category)?,
        Command::Cancel {
            schedule,
            resource,
            start,
        } => cancel(&schedule, Appointment { resource, start })?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn nearest_for_resource(query: &DayQuery, today: Option<NaiveDate>, id: ResourceId) -> Result<Value> {
    let schedule = query.load_upcoming(today)?;
    let resource = schedule.resource(id)?;

    let stored = schedule.bookings.booked_starts(&id, query.day);
    let slot =
        find_nearest_free_slot_stored(query.day, &stored, schedule.workday(), schedule.offset())?;
    if slot.is_none() {
        eprintln!("This day is full, try another day!");
    }

    Ok(json!({
        "day": query.day,
        "resource": resource.id,
        "name": resource.name,
        "slot": slot,
        "stored_start": stored_start(&schedule, slot),
    }))
}

fn nearest_in_category(
    query: &DayQuery,
    today: Option<NaiveDate>,
    id: ResourceId,
    parallel: bool,
) -> Result<Value> {
    let schedule = query.load_upcoming(today)?;
    let category = schedule.category(id)?;
    let (workday, offset) = (schedule.workday(), schedule.offset());

    let (day, members, source) = (query.day, &category.resources, &schedule.bookings);
    let found = if parallel {
        find_nearest_free_slot_in_category_par(day, members, source, workday, offset)?
    } else {
        find_nearest_free_slot_in_category(day, members, source, workday, offset)?
    };
    if found.is_none() {
        eprintln!("This day is full!");
    }

    let slot = found.map(|m| m.start);
    Ok(json!({
        "day": query.day,
        "category": category.id,
        "name": category.name,
        "slot": slot,
        "stored_start": stored_start(&schedule, slot),
        "resource": found.map(|m| *m.resource),
    }))
}

fn appointments_on_day(
    query: &DayQuery,
    resource: Option<ResourceId>,
    category: Option<ResourceId>,
) -> Result<Value> {
    // Listing past days is allowed.
    let schedule = Schedule::load(&query.schedule)?;
    let members: Option<Vec<ResourceId>> = match (resource, category) {
        (Some(id), _) => Some(vec![schedule.resource(id)?.id]),
        (None, Some(id)) => Some(schedule.category(id)?.resources.clone()),
        (None, None) => None,
    };

    let appointments: Vec<_> = schedule
        .bookings
        .appointments_on(query.day)
        .into_iter()
        .filter(|a| members.as_ref().is_none_or(|m| m.contains(&a.resource)))
        .collect();
    tracing::debug!(count = appointments.len(), day = %query.day, "appointments listed");

    Ok(json!({
        "day": query.day,
        "appointments": appointments,
    }))
}

fn book(
    query: &DayQuery,
    today: Option<NaiveDate>,
    resource: Option<ResourceId>,
    category: Option<ResourceId>,
) -> Result<Value> {
    let mut schedule = query.load_upcoming(today)?;
    let booked = match (resource, category) {
        (Some(id), _) => {
            schedule.resource(id)?;
            schedule.bookings.book_nearest(id, query.day)?
        }
        (None, Some(id)) => {
            let members = schedule.category(id)?.resources.clone();
            schedule.bookings.book_nearest_in_category(&members, query.day)?
        }
        (None, None) => bail!("either --resource or --category is required"),
    };
    let Some(appointment) = booked else {
        bail!("This day is full, try another day!");
    };

    schedule.save(&query.schedule)?;
    Ok(json!({
        "day": query.day,
        "booked": appointment,
    }))
}

fn reschedule(
    query: &DayQuery,
    today: Option<NaiveDate>,
    current: Appointment<ResourceId>,
    category: Option<ResourceId>,
) -> Result<Value> {
    let mut schedule = query.load_upcoming(today)?;
    schedule.resource(current.resource)?;
    let members = match category {
        Some(id) => Some(schedule.category(id)?.resources.clone()),
        None => None,
    };

    let moved = schedule
        .bookings
        .reschedule(&current, query.day, members.as_deref())?;
    let Some(appointment) = moved else {
        bail!("This day is full, try another day!");
    };

    schedule.save(&query.schedule)?;
    Ok(json!({
        "from": current,
        "to": appointment,
    }))
}

fn cancel(path: &Path, appointment: Appointment<ResourceId>) -> Result<Value> {
    let mut schedule = Schedule::load(path)?;
    if !schedule.bookings.cancel(&appointment.resource, appointment.start) {
        bail!(
            "couldn't find an appointment for resource {} at {}",
            appointment.resource,
            appointment.start
        );
    }

    schedule.save(path)?;
    Ok(json!({ "cancelled": appointment }))
}

fn stored_start(schedule: &Schedule, slot: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    slot.and_then(|s| schedule.offset().denormalize(s))
}
