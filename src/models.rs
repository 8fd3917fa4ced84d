// Data structures shared by the state manager and the HTTP layer
// e.g., ParkingLot, User, ParkingFilter, BookingDetails

use chrono::{DateTime, Local, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Occupancy status of a single spot
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
    Reserved,
    Disabled,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpot {
    pub id: String,
    pub status: SpotStatus,
    pub spot_number: String, // Display label, e.g. "A12"
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLot {
    pub id: String,
    pub name: String,
    pub address: String,
    pub total_spots: u32,
    pub available_spots: u32, // Always equals the number of Available spots
    pub hourly_rate: f64,
    pub coordinates: (f64, f64), // (latitude, longitude)
    pub distance: Option<f64>, // Kilometres from the user
    pub estimated_time: Option<u32>, // Minutes of travel
    #[serde(with = "hhmm")]
    pub open_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub close_time: NaiveTime,
    pub image: Option<String>,
    pub spots: Vec<ParkingSpot>,
}

impl ParkingLot {
    pub fn count_available(&self) -> u32 {
        self.spots
            .iter()
            .filter(|spot| spot.status == SpotStatus::Available)
            .count() as u32
    }

    // Re-derive the counters from the spot list after any spot mutation
    pub fn sync_counts(&mut self) {
        self.total_spots = self.spots.len() as u32;
        self.available_spots = self.count_available();
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub use_indian_number_format: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub preferences: Option<UserPreferences>,
    pub vehicle_number: Option<String>,
}

impl User {
    // Number formatting falls back to Indian grouping when unset
    pub fn uses_indian_format(&self) -> bool {
        self.preferences
            .as_ref()
            .and_then(|p| p.use_indian_number_format)
            .unwrap_or(true)
    }
}

// Criteria received from the frontend filter panel; absent fields impose no constraint
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParkingFilter {
    pub min_available_spots: Option<u32>,
    pub max_price: Option<f64>,
    pub max_distance: Option<f64>,
    pub open_now: Option<bool>,
}

// A reservation awaiting payment
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub id: Uuid,
    pub user: User,
    pub parking_lot_id: String,
    pub parking_lot_name: String,
    pub spot: ParkingSpot,
    pub start_time: DateTime<Local>,
    pub duration: u32, // Hours
    pub base_fare: f64,
    pub taxes: f64,
    pub total_amount: f64,
}

impl BookingDetails {
    // None when the duration can't be represented past `start_time`
    pub fn end_time(&self) -> Option<DateTime<Local>> {
        let length = TimeDelta::try_hours(i64::from(self.duration))?;
        self.start_time.checked_add_signed(length)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_parking_lots: u32,
    pub total_spots: u32,
    pub available_spots: u32,
    pub occupancy_rate: u32, // Percent of spots not available
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    Wallet,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Canceled,
}

// Ledger entry written when a payment completes; its id is the receipt identifier
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub parking_lot_id: String,
    pub parking_lot_name: String,
    pub spot_id: String,
    pub spot_number: String,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
}

// Credentials posted to /login
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// Lot opening hours travel as "HH:MM" strings
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}
