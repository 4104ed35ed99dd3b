// --- File: crates/oasis_scheduling/src/inference.rs ---
//! Keyword heuristic mapping a free-text service name to a room type.
//!
//! This is a bounded legacy fallback, not business logic: the authoritative
//! signal is `Service::required_room_type`. The heuristic only runs for
//! waitlist entries (free text by nature) and for service records that
//! predate the `required_room_type` field.

use crate::models::RoomType;

/// Head/hair category keywords.
pub const HEAD_SPA_KEYWORDS: &[&str] = &["head", "hair", "scalp", "shampoo", "wash"];

/// Nail category keywords.
pub const NAIL_SPA_KEYWORDS: &[&str] = &["nail", "mani", "pedi", "polish", "gel"];

/// Body category keywords.
pub const BODY_SPA_KEYWORDS: &[&str] = &["body", "massage", "facial", "stone", "sauna"];

/// Infers the expected room type for a service name.
///
/// Categories are checked head, then nail, then body; anything unmatched
/// defaults to BODY_SPA.
pub fn infer_room_type(service_name: &str) -> RoomType {
    let normalized = service_name.to_lowercase();

    if contains_any(&normalized, HEAD_SPA_KEYWORDS) {
        RoomType::HeadSpa
    } else if contains_any(&normalized, NAIL_SPA_KEYWORDS) {
        RoomType::NailSpa
    } else {
        // Body keywords and anything unmatched both land here.
        RoomType::BodySpa
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}
