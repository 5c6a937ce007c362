//! Source of truth for principals, departments and tickets.
//!
//! The application talks to a [`Backend`] trait object chosen at start-up:
//! [`Remote`] speaks the REST API of the municipal server, [`Local`] keeps
//! seeded dummy data in memory and applies the same rules the server does.

pub mod local;
pub mod remote;

use std::error::Error as StdError;

use async_trait::async_trait;
use derive_more::{Display, From};
use reqwest::StatusCode;

use crate::api::{
    self, department,
    ticket::{self, Status},
    user::{self, Credentials, Registration, Role},
};
use crate::route::Visibility;

pub use self::{local::Local, remote::Remote};

#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<api::Principal, Error>;

    async fn register(&self, registration: &Registration) -> Result<(), Error>;

    async fn list_departments(&self) -> Result<Vec<api::Department>, Error>;

    async fn create_department(
        &self,
        department: &api::Department,
    ) -> Result<api::Department, Error>;

    async fn rename_department(
        &self,
        id: &department::Id,
        name: &str,
    ) -> Result<api::Department, Error>;

    async fn delete_department(&self, id: &department::Id)
        -> Result<(), Error>;

    async fn list_tickets(
        &self,
        scope: &Scope,
    ) -> Result<Vec<api::Ticket>, Error>;

    async fn create_ticket(
        &self,
        draft: &ticket::Draft,
    ) -> Result<api::Ticket, Error>;

    async fn update_ticket_status(
        &self,
        id: ticket::Id,
        status: Status,
    ) -> Result<api::Ticket, Error>;

    async fn list_users(&self) -> Result<Vec<api::Principal>, Error>;

    async fn update_user_role(
        &self,
        id: user::Id,
        role: Role,
    ) -> Result<api::Principal, Error>;

    async fn update_user_department(
        &self,
        id: user::Id,
        department: Option<&department::Id>,
    ) -> Result<api::Principal, Error>;
}

/// Server-side filter applied when listing tickets.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Scope {
    /// Tickets filed by one user.
    #[display("created by user {_0}")]
    CreatedBy(user::Id),

    /// Tickets routed to one department.
    #[display("department {_0}")]
    Department(department::Id),

    #[display("all tickets")]
    All,
}

impl Scope {
    /// Tickets the principal is allowed to see, as the role's capabilities
    /// describe them. `None` when nothing is visible, e.g. staff not yet
    /// assigned to a department.
    pub fn for_principal(principal: &api::Principal) -> Option<Self> {
        match principal.role.capabilities().tickets {
            Visibility::Own => Some(Self::CreatedBy(principal.id)),
            Visibility::Department => {
                principal.department.clone().map(Self::Department)
            }
            Visibility::All => Some(Self::All),
        }
    }
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("wrong username or password")]
    Unauthorized,

    #[display("username is already taken")]
    Conflict,

    #[display("record not found")]
    NotFound,

    #[display("unexpected response status {_0}")]
    Status(StatusCode),

    #[display("request failed: {_0}")]
    #[from]
    Transport(reqwest::Error),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Unauthorized
            | Self::Conflict
            | Self::NotFound
            | Self::Status(_) => None,
        }
    }
}
