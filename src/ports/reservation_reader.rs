//! Read side for reservation listings.
//!
//! Kept separate from the write-side store so listing queries can join
//! whatever the view needs without widening the transactional port.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ActorRole, DomainError, ReservationId, UserId};
use crate::domain::payment::PaymentStatus;
use crate::domain::reservation::ReservationStatus;

/// Offset pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page number.
    pub page: u32,

    /// Rows per page, clamped to [1, 100].
    pub size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 20;

    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// One row of a reservation listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub reservation_id: ReservationId,

    /// Display name of the other party (advisor for clients, client for
    /// advisors).
    pub counterparty_name: String,

    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub reservation_status: ReservationStatus,
    pub payment_status: PaymentStatus,
}

/// Port for reservation listing queries.
#[async_trait]
pub trait ReservationReader: Send + Sync {
    /// Lists reservations the actor is a party to, newest slot first.
    async fn list_for_actor(
        &self,
        actor_id: UserId,
        role: ActorRole,
        page: Page,
    ) -> Result<Vec<ReservationSummary>, DomainError>;
}
