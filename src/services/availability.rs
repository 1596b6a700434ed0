use serde::Serialize;

/// One hour of a court's day in the availability grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourSlot {
    pub start_hour: i16,
    pub end_hour: i16,
    pub available: bool,
}

/// Half-open hour ranges `[start, end)` overlap iff each starts before
/// the other ends
pub fn ranges_overlap(a: (i16, i16), b: (i16, i16)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Whether `[start, end)` is a well-formed range inside the court's
/// operating hours
pub fn range_within_hours(open: i16, close: i16, start: i16, end: i16) -> bool {
    start < end && start >= open && end <= close
}

/// Builds the hourly grid between the court's operating hours. An hour is
/// unavailable when any confirmed booking or owner block covers it.
pub fn hourly_slots(
    open_hour: i16,
    close_hour: i16,
    booked: &[(i16, i16)],
    blocked: &[(i16, i16)],
) -> Vec<HourSlot> {
    (open_hour..close_hour)
        .map(|hour| {
            let range = (hour, hour + 1);
            let taken = booked.iter().any(|&b| ranges_overlap(range, b))
                || blocked.iter().any(|&b| ranges_overlap(range, b));

            HourSlot {
                start_hour: hour,
                end_hour: hour + 1,
                available: !taken,
            }
        })
        .collect()
}

/// Whether the whole of `[start, end)` is free of bookings and blocks
pub fn range_is_free(start: i16, end: i16, booked: &[(i16, i16)], blocked: &[(i16, i16)]) -> bool {
    let range = (start, end);

    !booked.iter().any(|&b| ranges_overlap(range, b))
        && !blocked.iter().any(|&b| ranges_overlap(range, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_half_open() {
        assert!(ranges_overlap((9, 11), (10, 12)));
        assert!(ranges_overlap((10, 12), (9, 11)));
        // Touching ranges do not overlap
        assert!(!ranges_overlap((9, 10), (10, 11)));
        assert!(!ranges_overlap((10, 11), (9, 10)));
    }

    #[test]
    fn test_grid_covers_operating_hours() {
        let slots = hourly_slots(8, 12, &[], &[]);

        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start_hour, 8);
        assert_eq!(slots[3].end_hour, 12);
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_bookings_and_blocks_both_take_slots() {
        let slots = hourly_slots(8, 12, &[(9, 10)], &[(11, 12)]);

        let availability: Vec<bool> = slots.iter().map(|s| s.available).collect();
        assert_eq!(availability, vec![true, false, true, false]);
    }

    #[test]
    fn test_multi_hour_booking_takes_every_hour() {
        let slots = hourly_slots(8, 12, &[(8, 11)], &[]);

        let availability: Vec<bool> = slots.iter().map(|s| s.available).collect();
        assert_eq!(availability, vec![false, false, false, true]);
    }

    #[test]
    fn test_range_within_hours() {
        assert!(range_within_hours(8, 22, 9, 11));
        assert!(!range_within_hours(8, 22, 7, 9));
        assert!(!range_within_hours(8, 22, 21, 23));
        assert!(!range_within_hours(8, 22, 11, 11));
        assert!(!range_within_hours(8, 22, 12, 10));
    }

    #[test]
    fn test_range_is_free() {
        let booked = [(9, 10)];
        let blocked = [(14, 16)];

        assert!(range_is_free(10, 12, &booked, &blocked));
        assert!(!range_is_free(9, 11, &booked, &blocked));
        assert!(!range_is_free(15, 17, &booked, &blocked));
    }
}
