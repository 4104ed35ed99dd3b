#[cfg(test)]
mod tests {
    use crate::availability::{compute_free_ranges, Availability};
    use crate::catalog::ResourceEntry;
    use crate::models::{Booking, BookingSource, BookingStatus, RoomType, TimeSlot};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn day_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn entries(count: usize) -> Vec<ResourceEntry> {
        (0..count)
            .map(|i| ResourceEntry {
                id: format!("r{i}"),
                room_id: format!("r{i}"),
                bed_id: None,
                room_type: RoomType::BodySpa,
                label: format!("r{i}"),
            })
            .collect()
    }

    fn booking_on(key: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_name: "Prop".to_string(),
            phone: "0900000000".to_string(),
            service_id: "svc".to_string(),
            branch_id: "b1".to_string(),
            room_id: key.to_string(),
            bed_id: None,
            staff_id: None,
            start_time: start,
            end_time: end,
            status: BookingStatus::Confirmed,
            source: BookingSource::Manual,
            note: String::new(),
            services_done: vec![],
        }
    }

    // Random bookings: (resource index, start offset in minutes, duration in minutes).
    fn bookings_strategy(
        resource_count: usize,
    ) -> impl Strategy<Value = Vec<(usize, i64, i64)>> {
        prop::collection::vec(
            (0..resource_count, 0..540i64, 15..180i64),
            0..12,
        )
    }

    proptest! {
        #[test]
        fn ranges_stay_within_window_and_counts_are_bounded(
            resource_count in 1..4usize,
            raw_bookings in bookings_strategy(4),
            slot_minutes in prop::sample::select(vec![15i64, 30, 60]),
        ) {
            let resources = entries(resource_count);
            let window = TimeSlot::new(day_start(), day_start() + Duration::minutes(540)).unwrap();
            let bookings: Vec<Booking> = raw_bookings
                .iter()
                .map(|(idx, offset, duration)| {
                    let start = day_start() + Duration::minutes(*offset);
                    booking_on(
                        &format!("r{}", idx % resource_count),
                        start,
                        start + Duration::minutes(*duration),
                    )
                })
                .collect();

            let result = compute_free_ranges(&resources, &bookings, window, slot_minutes).unwrap();
            let ranges = match result {
                Availability::NoResources => unreachable!("resource_count >= 1"),
                Availability::Open(ranges) => ranges,
            };

            for range in &ranges {
                prop_assert!(range.start >= window.start && range.end <= window.end,
                    "range {:?} escapes the window", range);
                prop_assert!(range.start < range.end, "empty range {:?}", range);
                prop_assert!(range.free_count >= 1 && range.free_count <= resource_count,
                    "free count out of bounds: {:?}", range);
            }
        }

        #[test]
        fn ranges_are_maximal_and_sorted_by_duration(
            resource_count in 1..4usize,
            raw_bookings in bookings_strategy(4),
        ) {
            let resources = entries(resource_count);
            let window = TimeSlot::new(day_start(), day_start() + Duration::minutes(540)).unwrap();
            let bookings: Vec<Booking> = raw_bookings
                .iter()
                .map(|(idx, offset, duration)| {
                    let start = day_start() + Duration::minutes(*offset);
                    booking_on(
                        &format!("r{}", idx % resource_count),
                        start,
                        start + Duration::minutes(*duration),
                    )
                })
                .collect();

            let ranges = match compute_free_ranges(&resources, &bookings, window, 30).unwrap() {
                Availability::NoResources => unreachable!(),
                Availability::Open(ranges) => ranges,
            };

            // Sorted longest first.
            for pair in ranges.windows(2) {
                prop_assert!(
                    pair[0].end - pair[0].start >= pair[1].end - pair[1].start,
                    "not sorted by duration: {:?} before {:?}", pair[0], pair[1]
                );
            }

            // Maximal: no two chronologically adjacent ranges share a count
            // (they would have been merged).
            let mut chronological = ranges.clone();
            chronological.sort_by_key(|r| r.start);
            for pair in chronological.windows(2) {
                if pair[0].end == pair[1].start {
                    prop_assert_ne!(
                        pair[0].free_count, pair[1].free_count,
                        "adjacent ranges with equal counts were not merged: {:?} / {:?}",
                        &pair[0], &pair[1]
                    );
                }
            }
        }

        #[test]
        fn unbooked_day_is_one_full_range(
            resource_count in 1..4usize,
            slot_minutes in prop::sample::select(vec![15i64, 30, 60, 45]),
        ) {
            let resources = entries(resource_count);
            let window = TimeSlot::new(day_start(), day_start() + Duration::minutes(540)).unwrap();

            let ranges = match compute_free_ranges(&resources, &[], window, slot_minutes).unwrap() {
                Availability::NoResources => unreachable!(),
                Availability::Open(ranges) => ranges,
            };

            prop_assert_eq!(ranges.len(), 1);
            prop_assert_eq!(ranges[0].start, window.start);
            prop_assert_eq!(ranges[0].end, window.end);
            prop_assert_eq!(ranges[0].free_count, resource_count);
        }
    }
}
