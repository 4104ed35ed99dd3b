// --- File: crates/oasis_scheduling/src/catalog.rs ---
//! Resource Catalog: the branch → room → bed hierarchy.
//!
//! Resolves opaque resource identifiers to concrete (room, bed?) pairs and
//! lists the bookable resources of a branch. For legacy rooms with
//! `capacity > 1` and no provisioned beds, virtual beds `{roomId}_bed_{n}`
//! are synthesized; a room with at least one explicit bed never synthesizes
//! (the two paths are mutually exclusive).

use oasis_common::{not_found, validation_error, OasisError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Bed, Branch, Room, RoomType, Service};

/// Separator of the legacy composite virtual-bed key.
const VIRTUAL_BED_INFIX: &str = "_bed_";

/// A resolved concrete resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedResource {
    pub branch_id: String,
    pub room_id: String,
    pub bed_id: Option<String>,
    pub room_type: RoomType,
}

impl ResolvedResource {
    /// The identity used for overlap checking: bed id when present,
    /// otherwise the room id.
    pub fn concrete_key(&self) -> &str {
        self.bed_id.as_deref().unwrap_or(&self.room_id)
    }
}

/// One bookable resource as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Opaque identifier callers hand back to `resolve`.
    pub id: String,
    pub room_id: String,
    pub bed_id: Option<String>,
    pub room_type: RoomType,
    pub label: String,
}

impl ResourceEntry {
    pub fn concrete_key(&self) -> &str {
        self.bed_id.as_deref().unwrap_or(&self.room_id)
    }
}

/// Seed document the catalog is built from at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub branches: Vec<Branch>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub beds: Vec<Bed>,
    #[serde(default)]
    pub services: Vec<Service>,
}

struct BedRecord {
    bed: Bed,
    room_id: String,
}

pub struct ResourceCatalog {
    branches: HashMap<String, Branch>,
    rooms: HashMap<String, Room>,
    rooms_by_branch: HashMap<String, Vec<String>>,
    /// Explicit beds per room, ordered by sort_order.
    beds_by_room: HashMap<String, Vec<Bed>>,
    bed_index: HashMap<String, BedRecord>,
    services: HashMap<String, Service>,
}

impl ResourceCatalog {
    pub fn from_seed(seed: CatalogSeed) -> Result<Self, OasisError> {
        let mut branches = HashMap::new();
        for branch in seed.branches {
            if branch.operating_hours.close <= branch.operating_hours.open {
                return Err(validation_error(format!(
                    "branch {}: close must be after open",
                    branch.id
                )));
            }
            branches.insert(branch.id.clone(), branch);
        }

        let mut rooms = HashMap::new();
        let mut rooms_by_branch: HashMap<String, Vec<String>> = HashMap::new();
        for room in seed.rooms {
            if !branches.contains_key(&room.branch_id) {
                return Err(validation_error(format!(
                    "room {} references unknown branch {}",
                    room.id, room.branch_id
                )));
            }
            if room.capacity < 1 {
                return Err(validation_error(format!(
                    "room {}: capacity must be at least 1",
                    room.id
                )));
            }
            rooms_by_branch
                .entry(room.branch_id.clone())
                .or_default()
                .push(room.id.clone());
            rooms.insert(room.id.clone(), room);
        }
        // Stable listing order per branch.
        for ids in rooms_by_branch.values_mut() {
            ids.sort();
        }

        let mut beds_by_room: HashMap<String, Vec<Bed>> = HashMap::new();
        let mut bed_index = HashMap::new();
        for bed in seed.beds {
            if !rooms.contains_key(&bed.room_id) {
                return Err(validation_error(format!(
                    "bed {} references unknown room {}",
                    bed.id, bed.room_id
                )));
            }
            bed_index.insert(
                bed.id.clone(),
                BedRecord {
                    room_id: bed.room_id.clone(),
                    bed: bed.clone(),
                },
            );
            beds_by_room.entry(bed.room_id.clone()).or_default().push(bed);
        }
        for beds in beds_by_room.values_mut() {
            beds.sort_by_key(|b| b.sort_order);
        }

        let services = seed
            .services
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        Ok(Self {
            branches,
            rooms,
            rooms_by_branch,
            beds_by_room,
            bed_index,
            services,
        })
    }

    pub fn branch(&self, branch_id: &str) -> Result<&Branch, OasisError> {
        self.branches
            .get(branch_id)
            .ok_or_else(|| not_found(format!("unknown branch: {branch_id}")))
    }

    pub fn room(&self, room_id: &str) -> Result<&Room, OasisError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| not_found(format!("unknown room: {room_id}")))
    }

    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services.get(service_id)
    }

    /// Service lookup by display name, exact match first then
    /// case-insensitive. Upsell requests arrive with names, not ids.
    pub fn service_by_name(&self, name: &str) -> Option<&Service> {
        self.services
            .values()
            .find(|s| s.name == name)
            .or_else(|| {
                self.services
                    .values()
                    .find(|s| s.name.eq_ignore_ascii_case(name))
            })
    }

    /// Resolves an opaque resource identifier to a concrete resource.
    ///
    /// Resolution order: explicit bed id, bare room id, legacy composite
    /// `{roomId}_bed_{n}`. Bare room ids only resolve for sole-resource rooms
    /// (no beds, capacity 1); anything else would alias with the per-bed keys
    /// and break overlap accounting.
    pub fn resolve(&self, resource_id: &str) -> Result<ResolvedResource, OasisError> {
        if let Some(record) = self.bed_index.get(resource_id) {
            let room = self.room(&record.room_id)?;
            return Ok(ResolvedResource {
                branch_id: room.branch_id.clone(),
                room_id: room.id.clone(),
                bed_id: Some(record.bed.id.clone()),
                room_type: room.room_type,
            });
        }

        if let Some(room) = self.rooms.get(resource_id) {
            if self.has_explicit_beds(&room.id) {
                return Err(validation_error(format!(
                    "room {} has explicit beds; a bed must be selected",
                    room.id
                )));
            }
            if room.capacity > 1 {
                return Err(validation_error(format!(
                    "room {} has capacity {}; use one of its virtual beds",
                    room.id, room.capacity
                )));
            }
            return Ok(ResolvedResource {
                branch_id: room.branch_id.clone(),
                room_id: room.id.clone(),
                bed_id: None,
                room_type: room.room_type,
            });
        }

        if let Some(resolved) = self.resolve_virtual(resource_id) {
            return Ok(resolved);
        }

        Err(not_found(format!("unknown resource: {resource_id}")))
    }

    /// Parses the legacy `{roomId}_bed_{n}` composite key back into
    /// (roomId, index). Only valid for rooms without explicit beds and
    /// with `1 <= n <= capacity`.
    fn resolve_virtual(&self, resource_id: &str) -> Option<ResolvedResource> {
        let (room_id, index_raw) = resource_id.rsplit_once(VIRTUAL_BED_INFIX)?;
        let index: u32 = index_raw.parse().ok()?;
        let room = self.rooms.get(room_id)?;
        if self.has_explicit_beds(room_id) {
            return None;
        }
        if index < 1 || index > room.capacity {
            return None;
        }
        Some(ResolvedResource {
            branch_id: room.branch_id.clone(),
            room_id: room.id.clone(),
            bed_id: Some(resource_id.to_string()),
            room_type: room.room_type,
        })
    }

    fn has_explicit_beds(&self, room_id: &str) -> bool {
        self.beds_by_room
            .get(room_id)
            .map(|beds| !beds.is_empty())
            .unwrap_or(false)
    }

    /// Lists the bookable resources of a branch, optionally filtered by room
    /// type. Inactive rooms are excluded.
    pub fn list_resources(
        &self,
        branch_id: &str,
        room_type_filter: Option<RoomType>,
    ) -> Result<Vec<ResourceEntry>, OasisError> {
        self.branch(branch_id)?;

        let mut entries = Vec::new();
        let room_ids = self
            .rooms_by_branch
            .get(branch_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for room_id in room_ids {
            let room = &self.rooms[room_id];
            if !room.is_active {
                continue;
            }
            if let Some(filter) = room_type_filter {
                if room.room_type != filter {
                    continue;
                }
            }

            if let Some(beds) = self.beds_by_room.get(room_id).filter(|b| !b.is_empty()) {
                for bed in beds {
                    entries.push(ResourceEntry {
                        id: bed.id.clone(),
                        room_id: room.id.clone(),
                        bed_id: Some(bed.id.clone()),
                        room_type: room.room_type,
                        label: format!("{} · {}", room.name, bed.name),
                    });
                }
            } else if room.capacity > 1 {
                for index in 1..=room.capacity {
                    let virtual_id = format!("{}{}{}", room.id, VIRTUAL_BED_INFIX, index);
                    entries.push(ResourceEntry {
                        id: virtual_id.clone(),
                        room_id: room.id.clone(),
                        bed_id: Some(virtual_id),
                        room_type: room.room_type,
                        label: format!("{} · Bed {}", room.name, index),
                    });
                }
            } else {
                entries.push(ResourceEntry {
                    id: room.id.clone(),
                    room_id: room.id.clone(),
                    bed_id: None,
                    room_type: room.room_type,
                    label: room.name.clone(),
                });
            }
        }

        Ok(entries)
    }
}
