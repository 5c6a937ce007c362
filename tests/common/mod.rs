use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use constcat::concat;
use municipal_tickets::{
    api::{
        self, department,
        ticket::{self, Status},
        user::{self, Credentials, Registration, Role},
    },
    backend::{self, Backend, Local, Remote, Scope},
    storage::{Memory, Storage},
    App,
};
use serde::Deserialize;
use tokio::net::TcpListener;

const API: &str = "/api";
const LOGIN: &str = concat!(API, "/login");
const REGISTER: &str = concat!(API, "/register");
const DEPARTMENTS: &str = concat!(API, "/departments");
const DEPARTMENT: &str = concat!(DEPARTMENTS, "/:id");
const TICKETS: &str = concat!(API, "/tickets");
const TICKET_STATUS: &str = concat!(TICKETS, "/:id/status");
const USERS: &str = concat!(API, "/users");
const USER_ROLE: &str = concat!(USERS, "/:id/role");
const USER_DEPARTMENT: &str = concat!(USERS, "/:id/department");

type SharedBackend = Arc<Local>;

/// Municipal server stand-in: the seeded local backend behind the REST API,
/// listening on a free port.
pub struct Server {
    pub backend: SharedBackend,
    pub base_url: String,
}

impl Server {
    pub async fn start() -> Self {
        let backend = Arc::new(Local::seeded());
        let app = Router::new()
            .route(LOGIN, post(login))
            .route(REGISTER, post(register))
            .route(DEPARTMENTS, get(list_departments).post(create_department))
            .route(DEPARTMENT, put(rename_department).delete(delete_department))
            .route(TICKETS, get(list_tickets).post(create_ticket))
            .route(TICKET_STATUS, put(update_ticket_status))
            .route(USERS, get(list_users))
            .route(USER_ROLE, put(update_user_role))
            .route(USER_DEPARTMENT, put(update_user_department))
            .with_state(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind a port");
        let addr = listener.local_addr().expect("failed to get an address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server failed");
        });

        Self {
            backend,
            base_url: format!("http://{addr}{API}"),
        }
    }

    pub fn client(&self) -> Remote {
        Remote::new(&self.base_url)
    }

    /// Application talking to this server, with an in-memory session.
    pub async fn app(&self) -> App {
        self.app_with(Box::new(Memory::default())).await
    }

    pub async fn app_with(&self, storage: Box<dyn Storage>) -> App {
        App::start(Box::new(self.client()), storage).await
    }
}

pub fn credentials(username: &str) -> Credentials {
    Credentials {
        username: username.into(),
        password: Local::DEMO_PASSWORD.into(),
    }
}

struct Failure(backend::Error);

impl From<backend::Error> for Failure {
    fn from(e: backend::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        use backend::Error as E;

        match self.0 {
            E::Unauthorized => StatusCode::UNAUTHORIZED,
            E::Conflict => StatusCode::CONFLICT,
            E::NotFound => StatusCode::NOT_FOUND,
            E::Status(_) | E::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

async fn login(
    State(backend): State<SharedBackend>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<api::Principal>, Failure> {
    Ok(Json(backend.login(&credentials).await?))
}

async fn register(
    State(backend): State<SharedBackend>,
    Json(registration): Json<Registration>,
) -> Result<StatusCode, Failure> {
    backend.register(&registration).await?;
    Ok(StatusCode::CREATED)
}

async fn list_departments(
    State(backend): State<SharedBackend>,
) -> Result<Json<Vec<api::Department>>, Failure> {
    Ok(Json(backend.list_departments().await?))
}

async fn create_department(
    State(backend): State<SharedBackend>,
    Json(department): Json<api::Department>,
) -> Result<Json<api::Department>, Failure> {
    Ok(Json(backend.create_department(&department).await?))
}

async fn rename_department(
    State(backend): State<SharedBackend>,
    Path(id): Path<String>,
    Json(department::Rename { name }): Json<department::Rename>,
) -> Result<Json<api::Department>, Failure> {
    Ok(Json(backend.rename_department(&id.into(), &name).await?))
}

async fn delete_department(
    State(backend): State<SharedBackend>,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    backend.delete_department(&id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketsQuery {
    user_id: Option<i64>,
    department: Option<String>,
}

async fn list_tickets(
    State(backend): State<SharedBackend>,
    Query(TicketsQuery {
        user_id,
        department,
    }): Query<TicketsQuery>,
) -> Result<Json<Vec<api::Ticket>>, Failure> {
    let scope = match (user_id, department) {
        (Some(id), _) => Scope::CreatedBy(id.into()),
        (None, Some(department)) => Scope::Department(department.into()),
        (None, None) => Scope::All,
    };
    Ok(Json(backend.list_tickets(&scope).await?))
}

async fn create_ticket(
    State(backend): State<SharedBackend>,
    Json(draft): Json<ticket::Draft>,
) -> Result<Json<api::Ticket>, Failure> {
    Ok(Json(backend.create_ticket(&draft).await?))
}

async fn update_ticket_status(
    State(backend): State<SharedBackend>,
    Path(id): Path<i64>,
    Json(status): Json<Status>,
) -> Result<Json<api::Ticket>, Failure> {
    Ok(Json(backend.update_ticket_status(id.into(), status).await?))
}

async fn list_users(
    State(backend): State<SharedBackend>,
) -> Result<Json<Vec<api::Principal>>, Failure> {
    Ok(Json(backend.list_users().await?))
}

async fn update_user_role(
    State(backend): State<SharedBackend>,
    Path(id): Path<i64>,
    Json(role): Json<Role>,
) -> Result<Json<api::Principal>, Failure> {
    Ok(Json(backend.update_user_role(user::Id::from(id), role).await?))
}

/// `null` and `""` both clear the department.
async fn update_user_department(
    State(backend): State<SharedBackend>,
    Path(id): Path<i64>,
    Json(department): Json<Option<String>>,
) -> Result<Json<api::Principal>, Failure> {
    let department = department
        .filter(|d| !d.is_empty())
        .map(department::Id::from);
    Ok(Json(
        backend
            .update_user_department(user::Id::from(id), department.as_ref())
            .await?,
    ))
}
