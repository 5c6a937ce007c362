//! Input forms and their required-field checks.
//!
//! Nothing is sent to the backend until a form converts cleanly.

use derive_more::Display;

use crate::{
    api::{
        self, department,
        ticket::{self, Category, Priority},
        user,
    },
    store::Departments,
};

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Invalid {
    #[display("{_0} is required")]
    Missing(&'static str),

    #[display("department {_0} does not exist")]
    UnknownDepartment(department::Id),
}

impl std::error::Error for Invalid {}

#[derive(Clone, Debug, Default)]
pub struct TicketForm {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Priority,
    pub location: String,
    pub department: Option<department::Id>,
}

impl TicketForm {
    /// Builds the draft filed by `principal`. The department has to be one of
    /// the loaded `departments`.
    pub fn into_draft(
        self,
        principal: &api::Principal,
        departments: &Departments,
    ) -> Result<ticket::Draft, Invalid> {
        let title = required(self.title, "title")?;
        let description = required(self.description, "description")?;
        let category = self.category.ok_or(Invalid::Missing("category"))?;
        let department =
            self.department.ok_or(Invalid::Missing("department"))?;
        if departments.get(&department).is_none() {
            return Err(Invalid::UnknownDepartment(department));
        }
        let location = self.location.trim();

        Ok(ticket::Draft {
            title,
            description,
            category,
            priority: self.priority,
            location: (!location.is_empty()).then(|| location.to_owned()),
            department,
            created_by: principal.id,
            created_by_name: principal.display_name.clone(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct DepartmentForm {
    pub id: String,
    pub name: String,
}

impl DepartmentForm {
    /// Department codes are stored upper-case.
    pub fn into_department(self) -> Result<api::Department, Invalid> {
        let id = required(self.id, "department id")?.to_uppercase();
        let name = required(self.name, "department name")?;
        Ok(api::Department {
            id: id.into(),
            name,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl RegistrationForm {
    pub fn into_registration(self) -> Result<user::Registration, Invalid> {
        let username = required(self.username, "username")?;
        if self.password.is_empty() {
            return Err(Invalid::Missing("password"));
        }
        let display_name = required(self.display_name, "name")?;
        Ok(user::Registration {
            username,
            password: self.password,
            display_name,
        })
    }
}

/// Checks a new department name.
pub fn department_name(name: String) -> Result<String, Invalid> {
    required(name, "department name")
}

fn required(value: String, field: &'static str) -> Result<String, Invalid> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Invalid::Missing(field));
    }
    Ok(trimmed.to_owned())
}
