//! Schedule file: grid configuration, resources, categories and existing
//! appointments, loaded from and saved back to JSON.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use slot_engine::{Appointment, InMemoryBookings, StorageOffset, Workday};

pub type ResourceId = u64;

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleFile {
    pub workday: Workday,
    #[serde(default, rename = "storage_offset_minutes")]
    pub storage_offset: StorageOffset,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub appointments: Vec<Appointment<ResourceId>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    pub resources: Vec<ResourceId>,
}

/// A loaded schedule with its appointments indexed for lookups.
#[derive(Debug)]
pub struct Schedule {
    pub file: ScheduleFile,
    pub bookings: InMemoryBookings<ResourceId>,
}

impl Schedule {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading schedule {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing schedule {}", path.display()))
    }

    /// Write the schedule back with the current appointment book.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.file.appointments = self.bookings.appointments();
        let text = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(path, text + "\n")
            .with_context(|| format!("writing schedule {}", path.display()))?;
        tracing::debug!(appointments = self.file.appointments.len(), "schedule saved");
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ScheduleFile = serde_json::from_str(text)?;

        for category in &file.categories {
            for id in &category.resources {
                if !file.resources.iter().any(|r| r.id == *id) {
                    bail!("category {} lists unknown resource {}", category.id, id);
                }
            }
        }

        let mut bookings = InMemoryBookings::new(file.workday, file.storage_offset);
        for appt in &file.appointments {
            if !bookings.book(appt.resource, appt.start) {
                tracing::warn!(resource = appt.resource, start = %appt.start, "duplicate appointment ignored");
            }
        }
        tracing::debug!(
            resources = file.resources.len(),
            categories = file.categories.len(),
            appointments = bookings.len(),
            "schedule loaded"
        );

        Ok(Schedule { file, bookings })
    }

    pub fn resource(&self, id: ResourceId) -> Result<&ResourceEntry> {
        self.file
            .resources
            .iter()
            .find(|r| r.id == id)
            .with_context(|| format!("couldn't find a resource with id {id}"))
    }

    pub fn category(&self, id: ResourceId) -> Result<&CategoryEntry> {
        self.file
            .categories
            .iter()
            .find(|c| c.id == id)
            .with_context(|| format!("couldn't find a category with id {id}"))
    }

    pub fn workday(&self) -> &Workday {
        self.bookings.workday()
    }

    pub fn offset(&self) -> StorageOffset {
        self.bookings.offset()
    }
}
