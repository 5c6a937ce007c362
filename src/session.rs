//! Who is logged in.

use tracing::{info, warn};

use crate::{
    api::{
        self,
        user::{Credentials, Registration},
    },
    backend::{self, Backend},
    storage::Storage,
};

/// Storage key of the persisted principal.
pub const KEY: &str = "user";

pub struct Session {
    storage: Box<dyn Storage>,
    principal: Option<api::Principal>,
}

impl Session {
    /// Restores the principal persisted by a previous run, if any. Never
    /// touches the network.
    pub async fn restore(storage: Box<dyn Storage>) -> Self {
        let principal = match storage.get(KEY).await {
            Ok(Some(saved)) => {
                match serde_json::from_str::<api::Principal>(&saved) {
                    Ok(principal) => Some(principal),
                    Err(e) => {
                        warn!("discarding unreadable saved session: {e}");
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!("failed to read saved session: {e}");
                None
            }
        };
        if let Some(p) = &principal {
            info!(username = %p.username, role = %p.role, "session restored");
        }
        Self { storage, principal }
    }

    pub fn principal(&self) -> Option<&api::Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// On failure the session is left as it was.
    pub async fn login(
        &mut self,
        backend: &dyn Backend,
        credentials: &Credentials,
    ) -> Result<&api::Principal, backend::Error> {
        let principal = backend.login(credentials).await?;
        info!(
            username = %principal.username,
            role = %principal.role,
            "logged in"
        );
        self.persist(&principal).await;
        Ok(self.principal.insert(principal))
    }

    pub async fn register(
        &self,
        backend: &dyn Backend,
        registration: &Registration,
    ) -> Result<(), backend::Error> {
        backend.register(registration).await?;
        info!(username = %registration.username, "account registered");
        Ok(())
    }

    pub async fn logout(&mut self) {
        if let Some(p) = self.principal.take() {
            info!(username = %p.username, "logged out");
        }
        if let Err(e) = self.storage.remove(KEY).await {
            warn!("failed to clear saved session: {e}");
        }
    }

    async fn persist(&self, principal: &api::Principal) {
        let saved = match serde_json::to_string(principal) {
            Ok(saved) => saved,
            Err(e) => {
                warn!("failed to encode session: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(KEY, saved).await {
            warn!("failed to save session: {e}");
        }
    }
}
