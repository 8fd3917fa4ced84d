// Reservation state manager
//
// `ParkingContext` is the single owner of the parking catalog, the active
// filter, the lot selection, the signed-in user, the pending booking and the
// payment ledger. Every mutation goes through the methods below; callers only
// ever get cloned snapshots back.

use std::{sync::Arc, time::Duration};

use chrono::NaiveTime;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{AdminCredentials, UserRegistry},
    catalog::{self, CatalogSource, SortDirection, SortField},
    clock::Clock,
    config::Settings,
    error::{BookingError, CatalogError},
    filter,
    models::{
        BookingDetails, ParkingFilter, ParkingLot, PaymentMethod, SpotStatus, Statistics,
        Transaction, TransactionStatus, User,
    },
};

pub const TAX_RATE: f64 = 0.18;
pub const MAX_BOOKING_HOURS: u32 = 24;

// Fixed round-trip delays standing in for a backend
#[derive(Debug, Clone, Copy, Default)]
pub struct Latency {
    pub refresh: Duration,
    pub login: Duration,
    pub payment: Duration,
}

impl Latency {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            refresh: Duration::from_millis(settings.refresh_latency_ms),
            login: Duration::from_millis(settings.login_latency_ms),
            payment: Duration::from_millis(settings.payment_latency_ms),
        }
    }
}

async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// Read-only view handed to the presentation layer
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSnapshot {
    pub parking_lots: Vec<ParkingLot>,
    pub filtered_parking_lots: Vec<ParkingLot>,
    pub statistics: Statistics,
    pub current_user: Option<User>,
    pub loading_parking_data: bool,
    pub selected_lot: Option<ParkingLot>,
    pub filter: ParkingFilter,
    pub booking_details: Option<BookingDetails>,
}

struct Inner {
    lots: Vec<ParkingLot>,
    filtered: Vec<ParkingLot>,
    statistics: Statistics,
    filter: ParkingFilter,
    selected_lot_id: Option<String>,
    current_user: Option<User>,
    booking: Option<BookingDetails>,
    registry: UserRegistry,
    transactions: Vec<Transaction>,
    refreshes_in_flight: u32,
}

impl Inner {
    fn selected_lot(&self) -> Option<&ParkingLot> {
        let id = self.selected_lot_id.as_deref()?;
        self.lots.iter().find(|lot| lot.id == id)
    }

    // Derived views follow every catalog or filter change
    fn recompute(&mut self, now: NaiveTime) {
        self.filtered = filter::apply(&self.lots, &self.filter, now);
        self.statistics = Statistics::from_lots(&self.lots);
    }
}

fn new_receipt_id(existing: &[Transaction]) -> String {
    loop {
        let id = format!("PK-{}", Uuid::new_v4().simple().to_string()[..8].to_uppercase());
        if !existing.iter().any(|t| t.id == id) {
            return id;
        }
    }
}

#[derive(Clone)]
pub struct ParkingContext {
    inner: Arc<RwLock<Inner>>,
    source: Arc<dyn CatalogSource>,
    clock: Arc<dyn Clock>,
    latency: Latency,
    admin: Arc<AdminCredentials>,
}

impl ParkingContext {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        registry: UserRegistry,
        admin: AdminCredentials,
        clock: Arc<dyn Clock>,
        latency: Latency,
    ) -> Self {
        let inner = Inner {
            lots: Vec::new(),
            filtered: Vec::new(),
            statistics: Statistics::default(),
            filter: ParkingFilter::default(),
            selected_lot_id: None,
            current_user: None,
            booking: None,
            registry,
            transactions: Vec::new(),
            refreshes_in_flight: 0,
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
            source,
            clock,
            latency,
            admin: Arc::new(admin),
        }
    }

    /// Reloads the catalog from the data source.
    ///
    /// The loading flag is raised for the whole simulated round trip. On a
    /// source failure the previous catalog stays in place.
    pub async fn refresh_catalog(&self) -> Result<(), CatalogError> {
        self.inner.write().await.refreshes_in_flight += 1;
        tracing::info!("Refreshing parking catalog...");

        simulate(self.latency.refresh).await;
        let loaded = self.source.load();
        let now = self.clock.now().time();

        let mut inner = self.inner.write().await;
        inner.refreshes_in_flight = inner.refreshes_in_flight.saturating_sub(1);
        match loaded {
            Ok(lots) => {
                inner.lots = lots;
                inner.recompute(now);
                tracing::info!(
                    lots = inner.lots.len(),
                    available = inner.statistics.available_spots,
                    "Parking catalog loaded"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Catalog refresh failed, keeping previous data: {}", e);
                Err(e)
            }
        }
    }

    // Replaces the filter and returns the recomputed view
    pub async fn set_filter(&self, criteria: ParkingFilter) -> Vec<ParkingLot> {
        let now = self.clock.now().time();
        let mut inner = self.inner.write().await;
        tracing::debug!(filter = ?criteria, "Applying parking filter");
        inner.filter = criteria;
        inner.recompute(now);
        inner.filtered.clone()
    }

    // An unknown id clears the selection just like `None`
    pub async fn select_lot(&self, lot_id: Option<&str>) -> Option<ParkingLot> {
        let mut inner = self.inner.write().await;
        let selected = lot_id
            .filter(|id| inner.lots.iter().any(|lot| lot.id == *id))
            .map(str::to_string);
        inner.selected_lot_id = selected;
        if lot_id.is_some() && inner.selected_lot_id.is_none() {
            tracing::debug!("No parking lot with id {:?}; selection cleared", lot_id);
        }
        inner.selected_lot().cloned()
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        simulate(self.latency.login).await;

        let mut inner = self.inner.write().await;
        match inner.registry.authenticate(email, password, &self.admin) {
            Some(user) => {
                tracing::info!("User {} signed in as {:?}", user.id, user.role);
                // A pending booking made by someone else doesn't carry over
                if inner.booking.as_ref().is_some_and(|b| b.user.id != user.id) {
                    inner.booking = None;
                }
                inner.current_user = Some(user);
                true
            }
            None => {
                tracing::warn!("Sign-in rejected for {}", email);
                false
            }
        }
    }

    pub async fn logout(&self) {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.current_user.take() {
            tracing::info!("User {} signed out", user.id);
        }
        inner.booking = None;
    }

    /// Prices a booking for a spot in the selected lot and holds it for payment.
    ///
    /// The catalog is not touched until `complete_payment` succeeds.
    pub async fn create_booking(
        &self,
        spot_id: &str,
        duration_hours: u32,
    ) -> Result<BookingDetails, BookingError> {
        let start_time = self.clock.now();
        let mut inner = self.inner.write().await;

        let booking = {
            let user = inner.current_user.as_ref().ok_or(BookingError::NotSignedIn)?;
            let lot = inner.selected_lot().ok_or(BookingError::NoLotSelected)?;
            if !(1..=MAX_BOOKING_HOURS).contains(&duration_hours) {
                return Err(BookingError::InvalidDuration);
            }
            let spot = lot
                .spots
                .iter()
                .find(|spot| spot.id == spot_id)
                .ok_or_else(|| BookingError::SpotNotFound(spot_id.to_string()))?;
            if spot.status != SpotStatus::Available {
                return Err(BookingError::SpotUnavailable(spot_id.to_string()));
            }

            let base_fare = lot.hourly_rate * f64::from(duration_hours);
            let taxes = base_fare * TAX_RATE;
            BookingDetails {
                id: Uuid::new_v4(),
                user: user.clone(),
                parking_lot_id: lot.id.clone(),
                parking_lot_name: lot.name.clone(),
                spot: spot.clone(),
                start_time,
                duration: duration_hours,
                base_fare,
                taxes,
                total_amount: base_fare + taxes,
            }
        };

        if booking.end_time().is_none() {
            return Err(BookingError::InvalidDuration);
        }

        tracing::info!(
            booking = %booking.id,
            lot = %booking.parking_lot_id,
            spot = %booking.spot.id,
            total = booking.total_amount,
            "Booking created, awaiting payment"
        );
        inner.booking = Some(booking.clone());
        Ok(booking)
    }

    // Returns whether a booking was discarded
    pub async fn clear_booking(&self) -> bool {
        let discarded = self.inner.write().await.booking.take();
        if let Some(booking) = &discarded {
            tracing::info!(booking = %booking.id, "Booking cleared");
        }
        discarded.is_some()
    }

    // Clears the pending booking only if it is still the one identified by `booking_id`
    pub async fn expire_booking(&self, booking_id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        if inner.booking.as_ref().is_some_and(|b| b.id == booking_id) {
            inner.booking = None;
            true
        } else {
            false
        }
    }

    /// Settles the pending booking and returns its receipt identifier.
    ///
    /// The spot flip, the lot's count update and the ledger entry happen in
    /// one write section. Returns `None` when there is nothing to pay for.
    pub async fn complete_payment(&self, method: PaymentMethod) -> Option<String> {
        let Some(booking_id) = self.inner.read().await.booking.as_ref().map(|b| b.id) else {
            tracing::warn!("Payment requested with no pending booking");
            return None;
        };

        simulate(self.latency.payment).await;
        let now = self.clock.now().time();

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        // No longer the booking this payment started for
        if inner.booking.as_ref().is_none_or(|b| b.id != booking_id) {
            tracing::warn!(booking = %booking_id, "Booking changed before payment completed");
            return None;
        }
        let booking = inner.booking.take()?;

        let Some(end_time) = booking.end_time() else {
            tracing::warn!(booking = %booking.id, "Booking end time out of range");
            return None;
        };
        let Some(lot) = inner.lots.iter_mut().find(|lot| lot.id == booking.parking_lot_id) else {
            tracing::warn!("Lot {} vanished before payment completed", booking.parking_lot_id);
            return None;
        };
        let Some(spot) = lot.spots.iter_mut().find(|spot| spot.id == booking.spot.id) else {
            tracing::warn!("Spot {} vanished before payment completed", booking.spot.id);
            return None;
        };
        if spot.status != SpotStatus::Available {
            tracing::warn!("Spot {} was taken before payment completed", booking.spot.id);
            return None;
        }
        let receipt_id = new_receipt_id(&inner.transactions);

        spot.status = SpotStatus::Reserved;
        lot.sync_counts();
        let lot_name = lot.name.clone();
        inner.transactions.push(Transaction {
            id: receipt_id.clone(),
            user_id: booking.user.id.clone(),
            parking_lot_id: booking.parking_lot_id.clone(),
            parking_lot_name: lot_name,
            spot_id: booking.spot.id.clone(),
            spot_number: booking.spot.spot_number.clone(),
            start_time: booking.start_time,
            end_time: Some(end_time),
            amount: booking.total_amount,
            payment_method: method,
            status: TransactionStatus::Completed,
        });
        inner.recompute(now);

        tracing::info!(
            receipt = %receipt_id,
            method = ?method,
            lot = %booking.parking_lot_id,
            spot = %booking.spot.id,
            "Payment completed"
        );
        Some(receipt_id)
    }

    /// Replaces the lot with the same id, as edited from the admin table.
    ///
    /// Counters are re-derived from the new spot list. Returns `false` when no
    /// lot has that id.
    pub async fn update_parking_lot(&self, mut updated: ParkingLot) -> bool {
        let now = self.clock.now().time();
        let mut inner = self.inner.write().await;
        let Some(slot) = inner.lots.iter_mut().find(|lot| lot.id == updated.id) else {
            tracing::warn!("No parking lot with id {} to update", updated.id);
            return false;
        };
        updated.sync_counts();
        tracing::info!(lot = %updated.id, available = updated.available_spots, "Parking lot updated");
        *slot = updated;
        inner.recompute(now);
        true
    }

    pub async fn snapshot(&self) -> ParkingSnapshot {
        let inner = self.inner.read().await;
        ParkingSnapshot {
            parking_lots: inner.lots.clone(),
            filtered_parking_lots: inner.filtered.clone(),
            statistics: inner.statistics.clone(),
            current_user: inner.current_user.clone(),
            loading_parking_data: inner.refreshes_in_flight > 0,
            selected_lot: inner.selected_lot().cloned(),
            filter: inner.filter.clone(),
            booking_details: inner.booking.clone(),
        }
    }

    pub async fn parking_lots(&self) -> Vec<ParkingLot> {
        self.inner.read().await.lots.clone()
    }

    pub async fn filtered_parking_lots(&self) -> Vec<ParkingLot> {
        self.inner.read().await.filtered.clone()
    }

    pub async fn statistics(&self) -> Statistics {
        self.inner.read().await.statistics.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.read().await.current_user.clone()
    }

    pub async fn selected_lot(&self) -> Option<ParkingLot> {
        self.inner.read().await.selected_lot().cloned()
    }

    pub async fn filter(&self) -> ParkingFilter {
        self.inner.read().await.filter.clone()
    }

    pub async fn booking(&self) -> Option<BookingDetails> {
        self.inner.read().await.booking.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.refreshes_in_flight > 0
    }

    pub async fn receipt(&self, receipt_id: &str) -> Option<Transaction> {
        let inner = self.inner.read().await;
        inner.transactions.iter().find(|t| t.id == receipt_id).cloned()
    }

    // Parking history, newest first
    pub async fn transactions_for(&self, user_id: &str) -> Vec<Transaction> {
        let inner = self.inner.read().await;
        inner
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn admin_lots(
        &self,
        query: &str,
        field: SortField,
        direction: SortDirection,
    ) -> Vec<ParkingLot> {
        let inner = self.inner.read().await;
        catalog::admin_table(&inner.lots, query, field, direction)
    }
}
