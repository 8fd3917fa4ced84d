// Parking catalog: the data source, derived statistics and the admin table view

use chrono::NaiveTime;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::{
    error::CatalogError,
    models::{ParkingLot, ParkingSpot, SpotStatus, Statistics},
};

// Supplies a complete catalog of lots with their spots
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<Vec<ParkingLot>, CatalogError>;
}

struct LotTemplate {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    spot_prefix: char,
    total_spots: u32,
    // Probability a generated spot is free
    free_ratio: f64,
    hourly_rate: f64,
    coordinates: (f64, f64),
    distance: f64,
    estimated_time: u32,
    open: (u32, u32),
    close: (u32, u32),
    image: &'static str,
}

const LOT_TEMPLATES: [LotTemplate; 4] = [
    LotTemplate {
        id: "lot1",
        name: "Downtown Garage",
        address: "123 Main St, Downtown",
        spot_prefix: 'A',
        total_spots: 120,
        free_ratio: 0.6,
        hourly_rate: 2.5,
        coordinates: (40.7128, -74.006),
        distance: 0.5,
        estimated_time: 3,
        open: (6, 0),
        close: (23, 0),
        image: "https://images.unsplash.com/photo-1470224114660-3f6686c562eb",
    },
    LotTemplate {
        id: "lot2",
        name: "Central Park Parking",
        address: "45 Park Ave, Midtown",
        spot_prefix: 'B',
        total_spots: 80,
        free_ratio: 0.2,
        hourly_rate: 3.0,
        coordinates: (40.7736, -73.9656),
        distance: 1.2,
        estimated_time: 6,
        open: (7, 0),
        close: (22, 0),
        image: "https://images.unsplash.com/photo-1573348722427-f1d6819fdf98",
    },
    LotTemplate {
        id: "lot3",
        name: "Riverside Parking",
        address: "78 River Rd, Westside",
        spot_prefix: 'C',
        total_spots: 60,
        free_ratio: 0.5,
        hourly_rate: 1.75,
        coordinates: (40.8075, -73.9626),
        distance: 2.4,
        estimated_time: 10,
        open: (8, 0),
        close: (20, 0),
        image: "https://images.unsplash.com/photo-1590674899484-8da3b9f7c5f9",
    },
    LotTemplate {
        id: "lot4",
        name: "Harbor View Parking",
        address: "221 Harbor St, Eastside",
        spot_prefix: 'D',
        total_spots: 100,
        free_ratio: 0.65,
        hourly_rate: 2.25,
        coordinates: (40.7214, -73.9998),
        distance: 3.1,
        estimated_time: 13,
        open: (6, 30),
        close: (23, 30),
        image: "https://images.unsplash.com/photo-1573167710701-90d965d3707e",
    },
];

// Built-in demo catalog; spot occupancy is drawn from a seeded RNG
pub struct StaticCatalog {
    seed: u64,
}

impl StaticCatalog {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

fn hours(template: &LotTemplate) -> Result<(NaiveTime, NaiveTime), CatalogError> {
    let open = NaiveTime::from_hms_opt(template.open.0, template.open.1, 0);
    let close = NaiveTime::from_hms_opt(template.close.0, template.close.1, 0);
    open.zip(close).ok_or_else(|| {
        CatalogError::SourceUnavailable(format!("invalid opening hours for {}", template.id))
    })
}

impl CatalogSource for StaticCatalog {
    fn load(&self) -> Result<Vec<ParkingLot>, CatalogError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut lots = Vec::with_capacity(LOT_TEMPLATES.len());

        for template in &LOT_TEMPLATES {
            let (open_time, close_time) = hours(template)?;
            let spots = (1..=template.total_spots)
                .map(|n| ParkingSpot {
                    id: format!("{}-spot-{}", template.id, n),
                    status: if rng.gen_bool(template.free_ratio) {
                        SpotStatus::Available
                    } else {
                        SpotStatus::Occupied
                    },
                    spot_number: format!("{}{}", template.spot_prefix, n),
                })
                .collect();

            let mut lot = ParkingLot {
                id: template.id.to_string(),
                name: template.name.to_string(),
                address: template.address.to_string(),
                total_spots: 0,
                available_spots: 0,
                hourly_rate: template.hourly_rate,
                coordinates: template.coordinates,
                distance: Some(template.distance),
                estimated_time: Some(template.estimated_time),
                open_time,
                close_time,
                image: Some(template.image.to_string()),
                spots,
            };
            lot.sync_counts();
            lots.push(lot);
        }

        tracing::debug!(seed = self.seed, lots = lots.len(), "Generated static parking catalog");
        Ok(lots)
    }
}

impl Statistics {
    pub fn from_lots(lots: &[ParkingLot]) -> Self {
        let total_spots: u32 = lots.iter().map(|lot| lot.total_spots).sum();
        let available_spots: u32 = lots.iter().map(|lot| lot.available_spots).sum();
        let occupancy_rate = if total_spots == 0 {
            0
        } else {
            ((1.0 - available_spots as f64 / total_spots as f64) * 100.0).round() as u32
        };

        Statistics {
            total_parking_lots: lots.len() as u32,
            total_spots,
            available_spots,
            occupancy_rate,
        }
    }
}

// Columns the admin table can be sorted by
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Name,
    Address,
    TotalSpots,
    AvailableSpots,
    HourlyRate,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

// Case-insensitive search over name and address, then a stable sort on one column.
// The query is matched as typed, surrounding whitespace included.
pub fn admin_table(
    lots: &[ParkingLot],
    query: &str,
    field: SortField,
    direction: SortDirection,
) -> Vec<ParkingLot> {
    let needle = query.to_lowercase();
    let mut rows: Vec<ParkingLot> = lots
        .iter()
        .filter(|lot| {
            needle.is_empty()
                || lot.name.to_lowercase().contains(&needle)
                || lot.address.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Address => a.address.cmp(&b.address),
            SortField::TotalSpots => a.total_spots.cmp(&b.total_spots),
            SortField::AvailableSpots => a.available_spots.cmp(&b.available_spots),
            SortField::HourlyRate => a.hourly_rate.total_cmp(&b.hourly_rate),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    rows
}
