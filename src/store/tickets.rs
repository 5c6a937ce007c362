use tracing::debug;

use crate::{
    api::{
        self,
        ticket::{self, Status},
    },
    backend::{Backend, Error, Scope},
};

/// Tickets visible to the current principal.
///
/// Visibility is decided by the backend from the scope the principal's role
/// maps to. The store never filters what it gets back.
#[derive(Debug, Default)]
pub struct Tickets {
    items: Vec<api::Ticket>,
    loaded: bool,
}

impl Tickets {
    pub fn all(&self) -> &[api::Ticket] {
        &self.items
    }

    pub fn get(&self, id: ticket::Id) -> Option<&api::Ticket> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub async fn fetch_for(
        &mut self,
        backend: &dyn Backend,
        principal: &api::Principal,
    ) -> Result<(), Error> {
        self.items = match Scope::for_principal(principal) {
            Some(scope) => backend.list_tickets(&scope).await?,
            None => {
                debug!(
                    username = %principal.username,
                    "no department assigned, nothing to fetch"
                );
                Vec::new()
            }
        };
        self.loaded = true;
        Ok(())
    }

    /// The backend assigns the number, timestamps and the initial
    /// [`Status::Open`].
    pub async fn create(
        &mut self,
        backend: &dyn Backend,
        draft: &ticket::Draft,
    ) -> Result<&api::Ticket, Error> {
        let created = backend.create_ticket(draft).await?;
        Ok(super::upsert(&mut self.items, created, |a, b| a.id == b.id))
    }

    pub async fn update_status(
        &mut self,
        backend: &dyn Backend,
        id: ticket::Id,
        status: Status,
    ) -> Result<&api::Ticket, Error> {
        let updated = backend.update_ticket_status(id, status).await?;
        Ok(super::upsert(&mut self.items, updated, |a, b| a.id == b.id))
    }

    /// Forgets everything, e.g. when the principal logs out.
    pub fn clear(&mut self) {
        self.items.clear();
        self.loaded = false;
    }
}
