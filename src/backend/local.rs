use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

use crate::api::{
    self, department,
    ticket::{self, Category, Priority, Status},
    user::{self, Credentials, Registration, Role},
};

use super::{Backend, Error, Scope};

/// In-memory backend with the same rules as the municipal server.
///
/// Nothing survives the process. Use [`Local::seeded`] for a backend that
/// starts with the demo accounts, departments and tickets.
#[derive(Default)]
pub struct Local {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    departments: Vec<api::Department>,
    tickets: Vec<api::Ticket>,
    last_user_id: i64,
    last_ticket_id: i64,
}

struct Account {
    principal: api::Principal,
    password: String,
}

impl Local {
    /// Password shared by every seeded account.
    pub const DEMO_PASSWORD: &'static str = "password";

    pub fn seeded() -> Self {
        let mut state = State::default();

        let citizen = state.add_account(
            "citizen1",
            "John Doe",
            Role::Citizen,
            None,
        );
        state.add_account(
            "staff1",
            "Jane Smith",
            Role::Staff,
            Some("SANITATION".into()),
        );
        state.add_account("collector1", "Alice Brown", Role::Collector, None);
        state.add_account("admin1", "Bob White", Role::Admin, None);

        for (id, name) in [
            ("SANITATION", "Sanitation Department"),
            ("WATER_SUPPLY", "Water Supply Department"),
            ("ELECTRICITY", "Electricity Department"),
        ] {
            state.departments.push(api::Department {
                id: id.into(),
                name: name.into(),
            });
        }

        state.add_ticket(ticket::Draft {
            title: "Streetlight not working".into(),
            description: "Streetlight near main park is not working for a \
                          week."
                .into(),
            category: Category::Streetlights,
            priority: Priority::High,
            location: Some("Main Park, Sector 10".into()),
            department: "ELECTRICITY".into(),
            created_by: citizen.id,
            created_by_name: citizen.display_name.clone(),
        });
        state.add_ticket(ticket::Draft {
            title: "Garbage not collected".into(),
            description: "Garbage has not been collected from our area for \
                          3 days."
                .into(),
            category: Category::Sanitation,
            priority: Priority::Medium,
            location: Some("Block C, Apartment 5".into()),
            department: "SANITATION".into(),
            created_by: citizen.id,
            created_by_name: citizen.display_name,
        });

        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn add_account(
        &mut self,
        username: &str,
        display_name: &str,
        role: Role,
        department: Option<department::Id>,
    ) -> api::Principal {
        self.last_user_id += 1;
        let principal = api::Principal {
            id: user::Id::from(self.last_user_id),
            username: username.to_owned(),
            display_name: display_name.to_owned(),
            role,
            department,
        };
        self.accounts.push(Account {
            principal: principal.clone(),
            password: Local::DEMO_PASSWORD.to_owned(),
        });
        principal
    }

    fn add_ticket(&mut self, draft: ticket::Draft) -> api::Ticket {
        self.last_ticket_id += 1;
        let now = now();
        let ticket = api::Ticket {
            id: ticket::Id::from(self.last_ticket_id),
            ticket_number: format!("TKT{:05}", self.last_ticket_id),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            priority: draft.priority,
            status: Status::Open,
            location: draft.location,
            department: draft.department,
            created_by: draft.created_by,
            created_by_name: draft.created_by_name,
            created_at: now,
            updated_at: now,
        };
        self.tickets.push(ticket.clone());
        ticket
    }

    fn account_mut(&mut self, id: user::Id) -> Result<&mut Account, Error> {
        self.accounts
            .iter_mut()
            .find(|a| a.principal.id == id)
            .ok_or(Error::NotFound)
    }
}

#[async_trait]
impl Backend for Local {
    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<api::Principal, Error> {
        self.state()
            .accounts
            .iter()
            .find(|a| {
                a.principal.username == credentials.username
                    && a.password == credentials.password
            })
            .map(|a| a.principal.clone())
            .ok_or(Error::Unauthorized)
    }

    async fn register(&self, registration: &Registration) -> Result<(), Error> {
        let mut state = self.state();
        if state
            .accounts
            .iter()
            .any(|a| a.principal.username == registration.username)
        {
            return Err(Error::Conflict);
        }

        state.last_user_id += 1;
        let principal = api::Principal {
            id: user::Id::from(state.last_user_id),
            username: registration.username.clone(),
            display_name: registration.display_name.clone(),
            role: Role::Citizen,
            department: None,
        };
        debug!(id = %principal.id, "registered local account");
        state.accounts.push(Account {
            principal,
            password: registration.password.clone(),
        });
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<api::Department>, Error> {
        Ok(self.state().departments.clone())
    }

    async fn create_department(
        &self,
        department: &api::Department,
    ) -> Result<api::Department, Error> {
        let mut state = self.state();
        match state.departments.iter_mut().find(|d| d.id == department.id) {
            Some(existing) => existing.name.clone_from(&department.name),
            None => state.departments.push(department.clone()),
        }
        Ok(department.clone())
    }

    async fn rename_department(
        &self,
        id: &department::Id,
        name: &str,
    ) -> Result<api::Department, Error> {
        let mut state = self.state();
        let department = state
            .departments
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or(Error::NotFound)?;
        department.name = name.to_owned();
        Ok(department.clone())
    }

    async fn delete_department(
        &self,
        id: &department::Id,
    ) -> Result<(), Error> {
        let mut state = self.state();
        let before = state.departments.len();
        state.departments.retain(|d| &d.id != id);
        if state.departments.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn list_tickets(
        &self,
        scope: &Scope,
    ) -> Result<Vec<api::Ticket>, Error> {
        Ok(self
            .state()
            .tickets
            .iter()
            .filter(|t| match scope {
                Scope::CreatedBy(id) => t.created_by == *id,
                Scope::Department(id) => t.department == *id,
                Scope::All => true,
            })
            .cloned()
            .collect())
    }

    async fn create_ticket(
        &self,
        draft: &ticket::Draft,
    ) -> Result<api::Ticket, Error> {
        Ok(self.state().add_ticket(draft.clone()))
    }

    async fn update_ticket_status(
        &self,
        id: ticket::Id,
        status: Status,
    ) -> Result<api::Ticket, Error> {
        let mut state = self.state();
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound)?;
        ticket.status = status;
        ticket.updated_at = now();
        Ok(ticket.clone())
    }

    async fn list_users(&self) -> Result<Vec<api::Principal>, Error> {
        Ok(self
            .state()
            .accounts
            .iter()
            .map(|a| a.principal.clone())
            .collect())
    }

    async fn update_user_role(
        &self,
        id: user::Id,
        role: Role,
    ) -> Result<api::Principal, Error> {
        let mut state = self.state();
        let account = state.account_mut(id)?;
        account.principal.role = role;
        Ok(account.principal.clone())
    }

    async fn update_user_department(
        &self,
        id: user::Id,
        department: Option<&department::Id>,
    ) -> Result<api::Principal, Error> {
        let mut state = self.state();
        let account = state.account_mut(id)?;
        account.principal.department = department.cloned();
        Ok(account.principal.clone())
    }
}

fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: Local::DEMO_PASSWORD.into(),
        }
    }

    #[tokio::test]
    async fn seeds_demo_data() {
        let local = Local::seeded();

        let users = local.list_users().await.unwrap();
        assert_eq!(users.len(), 4);
        let departments = local.list_departments().await.unwrap();
        assert_eq!(departments.len(), 3);
        let tickets = local.list_tickets(&Scope::All).await.unwrap();
        assert_eq!(tickets.len(), 2);
        assert!(tickets.iter().all(|t| t.status == Status::Open));
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let local = Local::seeded();
        let err = local
            .login(&Credentials {
                username: "citizen1".into(),
                password: "nope".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[tokio::test]
    async fn registers_citizens_only_once() {
        let local = Local::seeded();
        let registration = Registration {
            username: "citizen2".into(),
            password: "secret".into(),
            display_name: "Mary Major".into(),
        };

        local.register(&registration).await.unwrap();
        let err = local.register(&registration).await.unwrap_err();
        assert!(matches!(err, Error::Conflict));

        let principal = local
            .login(&Credentials {
                username: "citizen2".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(principal.role, Role::Citizen);
        assert_eq!(principal.id, user::Id::from(5));
    }

    #[tokio::test]
    async fn filters_tickets_by_scope() {
        let local = Local::seeded();
        let citizen = local.login(&credentials("citizen1")).await.unwrap();

        let own = local
            .list_tickets(&Scope::CreatedBy(citizen.id))
            .await
            .unwrap();
        assert_eq!(own.len(), 2);

        let sanitation = local
            .list_tickets(&Scope::Department("SANITATION".into()))
            .await
            .unwrap();
        assert_eq!(sanitation.len(), 1);
        assert_eq!(sanitation[0].title, "Garbage not collected");

        let nobody = local
            .list_tickets(&Scope::CreatedBy(user::Id::from(99)))
            .await
            .unwrap();
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn stamps_updates() {
        let local = Local::seeded();
        let ticket = local
            .update_ticket_status(ticket::Id::from(1), Status::InProgress)
            .await
            .unwrap();
        assert_eq!(ticket.status, Status::InProgress);
        assert!(ticket.updated_at >= ticket.created_at);

        let err = local
            .update_ticket_status(ticket::Id::from(42), Status::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn deleting_unknown_department_is_not_found() {
        let local = Local::seeded();
        let err = local
            .delete_department(&"PARKS".into())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }
}
