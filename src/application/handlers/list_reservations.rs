//! ListReservationsHandler - read-side listing for either party.

use std::sync::Arc;

use crate::domain::foundation::{Actor, UserId};
use crate::domain::reservation::ReservationError;
use crate::ports::{Page, ReservationReader, ReservationSummary};

/// Command to list an actor's reservations.
#[derive(Debug, Clone)]
pub struct ListReservationsCommand {
    pub actor: Actor,
    pub page: Page,
}

/// Handler for reservation listings.
pub struct ListReservationsHandler {
    reader: Arc<dyn ReservationReader>,
}

impl ListReservationsHandler {
    pub fn new(reader: Arc<dyn ReservationReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        cmd: ListReservationsCommand,
    ) -> Result<Vec<ReservationSummary>, ReservationError> {
        let summaries = self
            .reader
            .list_for_actor(cmd.actor.id, cmd.actor.role, cmd.page)
            .await?;
        Ok(summaries)
    }
}
