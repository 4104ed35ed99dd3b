// --- File: crates/oasis_scheduling/src/models.rs ---
//! Domain types for the scheduling core.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use oasis_common::{validation_error, OasisError};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Room category; also the compatibility axis between services and resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    HeadSpa,
    BodySpa,
    NailSpa,
    Other,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomType::HeadSpa => "HEAD_SPA",
            RoomType::BodySpa => "BODY_SPA",
            RoomType::NailSpa => "NAIL_SPA",
            RoomType::Other => "OTHER",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Processing,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Terminal states accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Active bookings are the ones that occupy a resource.
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Processing => "processing",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Where a booking came from. `Linked` tags system-generated upsell chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingSource {
    Online,
    Manual,
    Offline,
    Linked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Service,
    Product,
}

/// `HH:mm` serde representation for operating hours, matching the wire format.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub operating_hours: OperatingHours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub room_type: RoomType,
    pub capacity: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    pub id: String,
    pub room_id: String,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Price in minor currency units.
    pub price: i64,
    pub duration_minutes: Option<i64>,
    /// Cleanup buffer after the service. Informational for this core.
    #[serde(default)]
    pub break_minutes: i64,
    pub required_room_type: Option<RoomType>,
    pub kind: ServiceKind,
}

/// An upsell line item recorded on the parent booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub name: String,
    pub qty: u32,
    pub price: i64,
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, OasisError> {
        if end <= start {
            return Err(validation_error(format!(
                "interval end ({end}) must be after start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn from_duration(start: DateTime<Utc>, minutes: i64) -> Result<Self, OasisError> {
        Self::new(start, start + Duration::minutes(minutes))
    }

    /// Half-open overlap: `a.start < b.end && a.end > b.start`.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub service_id: String,
    pub branch_id: String,
    pub room_id: String,
    pub bed_id: Option<String>,
    pub staff_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub source: BookingSource,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub services_done: Vec<ServiceLine>,
}

impl Booking {
    /// The concrete resource this booking occupies: the bed when assigned,
    /// otherwise the room itself (legacy/unbedded rooms only).
    pub fn concrete_key(&self) -> &str {
        self.bed_id.as_deref().unwrap_or(&self.room_id)
    }

    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistItem {
    pub id: Uuid,
    pub customer_name: String,
    pub phone: String,
    /// Free-text service description; the room-type heuristic keys off this.
    pub service_name: String,
    pub preferred_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Explicit session identity threaded into every mutating operation.
/// There is no ambient current-user anywhere in the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub actor: String,
}

impl SessionContext {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }
}

/// Input for the booking create path (UI create, waitlist match, upsell chain).
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_name: String,
    pub phone: String,
    pub service_id: String,
    pub branch_id: String,
    /// Opaque resource identifier; resolved by the catalog.
    pub resource_id: String,
    pub slot: TimeSlot,
    pub staff_id: Option<String>,
    pub status: BookingStatus,
    pub source: BookingSource,
    pub note: String,
}
