use crate::{
    api::{self, department},
    backend::{Backend, Error},
};

/// Reference list of departments, shared by every screen that offers a
/// department selector.
#[derive(Debug, Default)]
pub struct Departments {
    items: Vec<api::Department>,
    loaded: bool,
}

impl Departments {
    pub fn all(&self) -> &[api::Department] {
        &self.items
    }

    pub fn get(&self, id: &department::Id) -> Option<&api::Department> {
        self.items.iter().find(|d| &d.id == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub async fn fetch(&mut self, backend: &dyn Backend) -> Result<(), Error> {
        self.items = backend.list_departments().await?;
        self.loaded = true;
        Ok(())
    }

    pub async fn create(
        &mut self,
        backend: &dyn Backend,
        department: &api::Department,
    ) -> Result<&api::Department, Error> {
        let created = backend.create_department(department).await?;
        Ok(super::upsert(&mut self.items, created, |a, b| a.id == b.id))
    }

    pub async fn update(
        &mut self,
        backend: &dyn Backend,
        id: &department::Id,
        name: &str,
    ) -> Result<&api::Department, Error> {
        let updated = backend.rename_department(id, name).await?;
        Ok(super::upsert(&mut self.items, updated, |a, b| a.id == b.id))
    }

    /// Tickets and users referencing the department keep the reference.
    pub async fn delete(
        &mut self,
        backend: &dyn Backend,
        id: &department::Id,
    ) -> Result<(), Error> {
        backend.delete_department(id).await?;
        self.items.retain(|d| &d.id != id);
        Ok(())
    }
}
