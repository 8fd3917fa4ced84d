// Payment hold: a pending booking is only payable for a limited time

use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::state::ParkingContext;

// Expires `booking_id` after `hold` unless it was paid, cancelled or replaced first
pub fn spawn_hold(ctx: ParkingContext, booking_id: Uuid, hold: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(hold).await;
        if ctx.expire_booking(booking_id).await {
            tracing::info!(booking = %booking_id, "Reservation time expired; booking cleared");
        } else {
            tracing::debug!(booking = %booking_id, "Hold elapsed for a booking that is no longer pending");
        }
    })
}
