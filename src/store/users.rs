use crate::{
    api::{self, department, user},
    backend::{Backend, Error},
};

/// User accounts, as administered on the users screen.
#[derive(Debug, Default)]
pub struct Users {
    items: Vec<api::Principal>,
    loaded: bool,
}

impl Users {
    pub fn all(&self) -> &[api::Principal] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub async fn fetch(&mut self, backend: &dyn Backend) -> Result<(), Error> {
        self.items = backend.list_users().await?;
        self.loaded = true;
        Ok(())
    }

    pub async fn update_role(
        &mut self,
        backend: &dyn Backend,
        id: user::Id,
        role: user::Role,
    ) -> Result<&api::Principal, Error> {
        let updated = backend.update_user_role(id, role).await?;
        Ok(super::upsert(&mut self.items, updated, |a, b| a.id == b.id))
    }

    /// `None` removes the user from any department.
    pub async fn update_department(
        &mut self,
        backend: &dyn Backend,
        id: user::Id,
        department: Option<&department::Id>,
    ) -> Result<&api::Principal, Error> {
        let updated = backend.update_user_department(id, department).await?;
        Ok(super::upsert(&mut self.items, updated, |a, b| a.id == b.id))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.loaded = false;
    }
}
