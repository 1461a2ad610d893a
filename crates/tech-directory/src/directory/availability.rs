//! Real-time availability derived from status flags and the weekly schedule.

use super::domain::{AvailabilityStatus, Technician, WorkingDay};
use chrono::{Datelike, Local, NaiveDateTime, NaiveTime};

/// Wall-clock reading the evaluator compares schedules against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceInstant {
    pub weekday: WorkingDay,
    pub time: NaiveTime,
}

impl ReferenceInstant {
    pub const fn new(weekday: WorkingDay, time: NaiveTime) -> Self {
        Self { weekday, time }
    }

    pub fn from_local(datetime: NaiveDateTime) -> Self {
        Self {
            weekday: datetime.weekday().into(),
            time: datetime.time(),
        }
    }
}

/// Source of "now" for a search. Sampled once per request.
pub trait Clock: Send + Sync {
    fn now(&self) -> ReferenceInstant;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> ReferenceInstant {
        ReferenceInstant::from_local(Local::now().naive_local())
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub ReferenceInstant);

impl Clock for FixedClock {
    fn now(&self) -> ReferenceInstant {
        self.0
    }
}

pub fn is_available_at(technician: &Technician, now: &ReferenceInstant) -> bool {
    if !technician.active
        || !technician.available
        || technician.availability_status != AvailabilityStatus::Available
    {
        return false;
    }

    if !technician.working_days.contains(&now.weekday) {
        return false;
    }

    match (technician.working_hours_start, technician.working_hours_end) {
        // Open interval: the window edges themselves do not count.
        (Some(start), Some(end)) => now.time > start && now.time < end,
        _ => false,
    }
}
