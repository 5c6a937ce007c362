use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{
    self, department,
    ticket::{self, Status},
    user::{self, Credentials, Registration, Role},
};

use super::{Backend, Error, Scope};

/// REST client of the municipal ticket server.
pub struct Remote {
    inner: reqwest::Client,
    base_url: String,
}

impl Remote {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl Backend for Remote {
    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<api::Principal, Error> {
        debug!(username = %credentials.username, "POST /login");
        let res = self
            .inner
            .post(self.url("/login"))
            .json(credentials)
            .send()
            .await?;
        json(res).await
    }

    async fn register(&self, registration: &Registration) -> Result<(), Error> {
        debug!(username = %registration.username, "POST /register");
        let res = self
            .inner
            .post(self.url("/register"))
            .json(registration)
            .send()
            .await?;
        check(res).map(drop)
    }

    async fn list_departments(&self) -> Result<Vec<api::Department>, Error> {
        debug!("GET /departments");
        let res = self.inner.get(self.url("/departments")).send().await?;
        json(res).await
    }

    async fn create_department(
        &self,
        department: &api::Department,
    ) -> Result<api::Department, Error> {
        debug!(id = %department.id, "POST /departments");
        let res = self
            .inner
            .post(self.url("/departments"))
            .json(department)
            .send()
            .await?;
        json(res).await
    }

    async fn rename_department(
        &self,
        id: &department::Id,
        name: &str,
    ) -> Result<api::Department, Error> {
        debug!(%id, "PUT /departments/{{id}}");
        let res = self
            .inner
            .put(self.url(&format!("/departments/{id}")))
            .json(&department::Rename {
                name: name.to_owned(),
            })
            .send()
            .await?;
        json(res).await
    }

    async fn delete_department(
        &self,
        id: &department::Id,
    ) -> Result<(), Error> {
        debug!(%id, "DELETE /departments/{{id}}");
        let res = self
            .inner
            .delete(self.url(&format!("/departments/{id}")))
            .send()
            .await?;
        check(res).map(drop)
    }

    async fn list_tickets(
        &self,
        scope: &Scope,
    ) -> Result<Vec<api::Ticket>, Error> {
        debug!(%scope, "GET /tickets");
        let mut req = self.inner.get(self.url("/tickets"));
        req = match scope {
            Scope::CreatedBy(id) => req.query(&[("userId", id.to_string())]),
            Scope::Department(id) => req.query(&[("department", id.as_str())]),
            Scope::All => req,
        };
        json(req.send().await?).await
    }

    async fn create_ticket(
        &self,
        draft: &ticket::Draft,
    ) -> Result<api::Ticket, Error> {
        debug!(department = %draft.department, "POST /tickets");
        let res = self
            .inner
            .post(self.url("/tickets"))
            .json(draft)
            .send()
            .await?;
        json(res).await
    }

    async fn update_ticket_status(
        &self,
        id: ticket::Id,
        status: Status,
    ) -> Result<api::Ticket, Error> {
        debug!(%id, %status, "PUT /tickets/{{id}}/status");
        let res = self
            .inner
            .put(self.url(&format!("/tickets/{id}/status")))
            .json(&status)
            .send()
            .await?;
        json(res).await
    }

    async fn list_users(&self) -> Result<Vec<api::Principal>, Error> {
        debug!("GET /users");
        let res = self.inner.get(self.url("/users")).send().await?;
        json(res).await
    }

    async fn update_user_role(
        &self,
        id: user::Id,
        role: Role,
    ) -> Result<api::Principal, Error> {
        debug!(%id, %role, "PUT /users/{{id}}/role");
        let res = self
            .inner
            .put(self.url(&format!("/users/{id}/role")))
            .json(&role)
            .send()
            .await?;
        json(res).await
    }

    async fn update_user_department(
        &self,
        id: user::Id,
        department: Option<&department::Id>,
    ) -> Result<api::Principal, Error> {
        debug!(%id, ?department, "PUT /users/{{id}}/department");
        let res = self
            .inner
            .put(self.url(&format!("/users/{id}/department")))
            .json(&department)
            .send()
            .await?;
        json(res).await
    }
}

fn check(res: Response) -> Result<Response, Error> {
    match res.status() {
        status if status.is_success() => Ok(res),
        StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
        StatusCode::CONFLICT => Err(Error::Conflict),
        StatusCode::NOT_FOUND => Err(Error::NotFound),
        status => Err(Error::Status(status)),
    }
}

async fn json<T: DeserializeOwned>(res: Response) -> Result<T, Error> {
    Ok(check(res)?.json::<T>().await?)
}
