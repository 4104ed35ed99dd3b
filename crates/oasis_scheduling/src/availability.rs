// --- File: crates/oasis_scheduling/src/availability.rs ---
//! Availability Calculator: a read-only projection over the booking set.
//!
//! Discretizes an operating window into fixed slots, counts free resources
//! per slot, and merges adjacent slots with identical free counts into
//! maximal ranges. Pure and idempotent: the same inputs always produce the
//! same output.

use chrono::Duration;
use oasis_common::{validation_error, OasisError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::ResourceEntry;
use crate::models::{Booking, TimeSlot};

pub const DEFAULT_SLOT_SIZE_MINUTES: i64 = 30;

/// A merged run of slots sharing the same free-resource count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeRange {
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
    pub free_count: usize,
}

/// Result of an availability computation. `NoResources` distinguishes
/// "nothing to book into" from "fully booked" (which is `Open(vec![])`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Availability {
    NoResources,
    Open(Vec<FreeRange>),
}

/// Computes merged free-time ranges for the given resources over `day_window`.
///
/// Per slot, a resource is busy when any non-cancelled booking on its
/// concrete key overlaps the slot. Output ranges carry `free_count > 0` only,
/// are maximal (no two adjacent ranges share a count), and are sorted by
/// duration descending; callers typically keep the top 3.
pub fn compute_free_ranges(
    resources: &[ResourceEntry],
    bookings: &[Booking],
    day_window: TimeSlot,
    slot_size_minutes: i64,
) -> Result<Availability, OasisError> {
    if slot_size_minutes < 1 {
        return Err(validation_error(format!(
            "slot size must be positive, got {slot_size_minutes}"
        )));
    }
    if resources.is_empty() {
        return Ok(Availability::NoResources);
    }

    // Index active bookings by the concrete resource they occupy.
    let mut busy_by_key: HashMap<&str, Vec<TimeSlot>> = HashMap::new();
    for booking in bookings.iter().filter(|b| b.status.is_active()) {
        busy_by_key
            .entry(booking.concrete_key())
            .or_default()
            .push(booking.slot());
    }

    let slot_size = Duration::minutes(slot_size_minutes);
    let mut ranges: Vec<FreeRange> = Vec::new();
    let mut slot_start = day_window.start;

    while slot_start < day_window.end {
        let slot_end = (slot_start + slot_size).min(day_window.end);
        let slot = TimeSlot {
            start: slot_start,
            end: slot_end,
        };

        let busy_count = resources
            .iter()
            .filter(|resource| {
                busy_by_key
                    .get(resource.concrete_key())
                    .map(|slots| slots.iter().any(|busy| busy.overlaps(&slot)))
                    .unwrap_or(false)
            })
            .count();
        let free_count = resources.len() - busy_count;

        match ranges.last_mut() {
            Some(last) if last.free_count == free_count && last.end == slot_start => {
                last.end = slot_end;
            }
            _ => ranges.push(FreeRange {
                start: slot_start,
                end: slot_end,
                free_count,
            }),
        }

        slot_start = slot_end;
    }

    // Fully-busy runs were needed for correct merging but are not reported.
    ranges.retain(|r| r.free_count > 0);

    // Longest ranges first; ties keep chronological order.
    ranges.sort_by(|a, b| (b.end - b.start).cmp(&(a.end - a.start)).then(a.start.cmp(&b.start)));

    Ok(Availability::Open(ranges))
}
