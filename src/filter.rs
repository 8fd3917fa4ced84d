// Catalog filtering for the nearby-parking view

use chrono::{NaiveTime, Timelike};

use crate::models::{ParkingFilter, ParkingLot};

// Minute resolution, matching the "HH:MM" hours lots are published with
fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

pub fn is_open_at(lot: &ParkingLot, time: NaiveTime) -> bool {
    let time = truncate_to_minute(time);
    lot.open_time <= time && time <= lot.close_time
}

pub fn matches(lot: &ParkingLot, filter: &ParkingFilter, now: NaiveTime) -> bool {
    if let Some(min) = filter.min_available_spots {
        if lot.available_spots < min {
            return false;
        }
    }
    if let Some(max_price) = filter.max_price {
        if lot.hourly_rate > max_price {
            return false;
        }
    }
    if let Some(max_distance) = filter.max_distance {
        // Lots without a known distance count as right here
        if lot.distance.unwrap_or(0.0) > max_distance {
            return false;
        }
    }
    if filter.open_now == Some(true) && !is_open_at(lot, now) {
        return false;
    }
    true
}

// Keeps catalog order; an empty filter returns every lot
pub fn apply(lots: &[ParkingLot], filter: &ParkingFilter, now: NaiveTime) -> Vec<ParkingLot> {
    lots.iter()
        .filter(|lot| matches(lot, filter, now))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSource, StaticCatalog};

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn catalog() -> Vec<ParkingLot> {
        StaticCatalog::new(7).load().unwrap()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let lots = catalog();
        let filtered = apply(&lots, &ParkingFilter::default(), at(12, 0));
        assert_eq!(filtered, lots);
    }

    #[test]
    fn test_min_available_spots() {
        let lots = catalog();
        let threshold = lots[0].available_spots;
        let filter = ParkingFilter { min_available_spots: Some(threshold), ..Default::default() };
        let filtered = apply(&lots, &filter, at(12, 0));
        assert!(filtered.iter().any(|lot| lot.id == lots[0].id));
        assert!(filtered.iter().all(|lot| lot.available_spots >= threshold));
    }

    #[test]
    fn test_max_price_and_distance_combine() {
        let lots = catalog();
        let filter = ParkingFilter {
            max_price: Some(2.5),
            max_distance: Some(1.0),
            ..Default::default()
        };
        let ids: Vec<_> = apply(&lots, &filter, at(12, 0)).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["lot1".to_string()]);
    }

    #[test]
    fn test_unknown_distance_passes_distance_filter() {
        let mut lots = catalog();
        lots[3].distance = None;
        let filter = ParkingFilter { max_distance: Some(0.1), ..Default::default() };
        let ids: Vec<_> = apply(&lots, &filter, at(12, 0)).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["lot4".to_string()]);
    }

    #[test]
    fn test_open_now_bounds_are_inclusive() {
        let lots = catalog();
        let riverside = lots.iter().find(|l| l.id == "lot3").unwrap(); // 08:00 - 20:00
        assert!(is_open_at(riverside, at(8, 0)));
        assert!(is_open_at(riverside, at(20, 0)));
        assert!(!is_open_at(riverside, at(7, 59)));
        assert!(!is_open_at(riverside, at(20, 1)));
        // Seconds past the closing minute still count as that minute
        assert!(is_open_at(riverside, NaiveTime::from_hms_opt(20, 0, 45).unwrap()));
    }

    #[test]
    fn test_open_now_filters_closed_lots() {
        let lots = catalog();
        let filter = ParkingFilter { open_now: Some(true), ..Default::default() };
        // Only Harbor View (06:30 - 23:30) is open at 23:15
        let ids: Vec<_> = apply(&lots, &filter, at(23, 15)).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["lot4".to_string()]);

        let nobody = apply(&lots, &filter, at(3, 0));
        assert!(nobody.is_empty());
    }

    #[test]
    fn test_open_now_false_imposes_no_constraint() {
        let lots = catalog();
        let filter = ParkingFilter { open_now: Some(false), ..Default::default() };
        assert_eq!(apply(&lots, &filter, at(3, 0)).len(), lots.len());
    }
}
