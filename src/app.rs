//! Application state and the commands that change it.
//!
//! Every command catches its own failure, logs it and leaves a [`Notice`]
//! for the user. Nothing here is fatal.

use tracing::{error, info, warn};

use crate::{
    api::{
        self, department, ticket,
        user::{self, Credentials, Role},
    },
    backend::{self, Backend},
    form::{self, DepartmentForm, RegistrationForm, TicketForm},
    guard::{self, Decision},
    route::Route,
    session::Session,
    storage::Storage,
    store::{Departments, Tickets, Users},
    view::{self, StatusFilter, TicketFilter},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Outcome message shown until dismissed or replaced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

pub struct App {
    backend: Box<dyn Backend>,
    session: Session,
    departments: Departments,
    tickets: Tickets,
    users: Users,
    route: Route,

    /// Protected route the user asked for before being sent to log in.
    return_to: Option<Route>,
    filter: TicketFilter,
    notice: Option<Notice>,
}

impl App {
    /// Restores the saved session, runs the initial load and opens the
    /// landing screen.
    pub async fn start(
        backend: Box<dyn Backend>,
        storage: Box<dyn Storage>,
    ) -> Self {
        let session = Session::restore(storage).await;
        let mut app = Self {
            backend,
            session,
            departments: Departments::default(),
            tickets: Tickets::default(),
            users: Users::default(),
            route: Route::Login,
            return_to: None,
            filter: TicketFilter::default(),
            notice: None,
        };
        app.load().await;
        if app.session.is_authenticated() {
            app.go(Route::Dashboard).await;
        }
        app
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn departments(&self) -> &Departments {
        &self.departments
    }

    pub fn tickets(&self) -> &Tickets {
        &self.tickets
    }

    pub fn users(&self) -> &Users {
        &self.users
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn filter(&self) -> &TicketFilter {
        &self.filter
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.notice = None;
    }

    /// Opens `path` if the guard lets it render.
    pub async fn navigate(&mut self, path: &str) -> Decision {
        self.go(Route::parse(path)).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let credentials = Credentials {
            username: username.trim().to_owned(),
            password: password.to_owned(),
        };
        if let Err(e) = self.session.login(&*self.backend, &credentials).await {
            error!(username = %credentials.username, "login failed: {e}");
            self.fail("Login failed. Please check your credentials.");
            return false;
        }
        self.notice = None;
        self.load().await;

        let role = self.role();
        let target = self
            .return_to
            .take()
            .filter(|r| guard::check_route(role, *r) == Decision::Render)
            .unwrap_or(Route::Dashboard);
        self.go(target).await;
        true
    }

    pub async fn register(&mut self, form: RegistrationForm) -> bool {
        let registration = match form.into_registration() {
            Ok(registration) => registration,
            Err(e) => return self.reject(e),
        };
        match self.session.register(&*self.backend, &registration).await {
            Ok(()) => {
                self.succeed("Registration successful! Please log in.");
                self.route = Route::Login;
                true
            }
            Err(e) => {
                error!(
                    username = %registration.username,
                    "registration failed: {e}"
                );
                self.fail(match e {
                    backend::Error::Conflict => {
                        "Registration failed: Username already exists."
                    }
                    _ => "Registration failed. Please try again.",
                });
                false
            }
        }
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.tickets.clear();
        self.users.clear();
        self.return_to = None;
        self.filter = TicketFilter::default();
        self.route = Route::Login;
        self.succeed("You have been logged out.");
    }

    pub async fn create_ticket(&mut self, form: TicketForm) -> bool {
        let Some(principal) = self.authorize(Route::CreateTicket).await else {
            return false;
        };
        let draft = match form.into_draft(&principal, &self.departments) {
            Ok(draft) => draft,
            Err(e) => return self.reject(e),
        };
        match self.tickets.create(&*self.backend, &draft).await {
            Ok(ticket) => {
                info!(number = %ticket.ticket_number, "ticket created");
                self.succeed("Ticket created successfully!");
                self.go(Route::MyTickets).await;
                true
            }
            Err(e) => {
                error!("failed to create ticket: {e}");
                self.fail("Failed to create ticket.");
                false
            }
        }
    }

    /// Moves a visible ticket one status forward.
    pub async fn advance_ticket(&mut self, id: ticket::Id) -> bool {
        let Some(principal) = self.principal() else {
            self.go(Route::DepartmentTickets).await;
            return false;
        };
        if !principal.role.capabilities().advances_tickets {
            warn!(role = %principal.role, "not allowed to advance tickets");
            self.fail("You are not allowed to update ticket status.");
            return false;
        }
        let Some(ticket) = self.tickets.get(id) else {
            self.fail(format!("Ticket {id} not found."));
            return false;
        };
        let (number, status) = (ticket.ticket_number.clone(), ticket.status);
        let Some(next) = status.next() else {
            self.fail(format!("Ticket #{number} is already closed."));
            return false;
        };

        match self.tickets.update_status(&*self.backend, id, next).await {
            Ok(ticket) => {
                let text = format!(
                    "Ticket #{} status updated to {}.",
                    ticket.ticket_number,
                    ticket.status.label(),
                );
                self.succeed(text);
                true
            }
            Err(e) => {
                error!(
                    %id,
                    status = %next,
                    "failed to update ticket status: {e}"
                );
                self.fail("Failed to update ticket status.");
                false
            }
        }
    }

    pub async fn create_department(&mut self, form: DepartmentForm) -> bool {
        if self.authorize(Route::Departments).await.is_none() {
            return false;
        }
        let department = match form.into_department() {
            Ok(department) => department,
            Err(e) => return self.reject(e),
        };
        match self.departments.create(&*self.backend, &department).await {
            Ok(_) => {
                self.succeed("Department created successfully!");
                true
            }
            Err(e) => {
                error!(id = %department.id, "failed to create department: {e}");
                self.fail("Failed to create department.");
                false
            }
        }
    }

    pub async fn rename_department(
        &mut self,
        id: department::Id,
        name: String,
    ) -> bool {
        if self.authorize(Route::Departments).await.is_none() {
            return false;
        }
        let name = match form::department_name(name) {
            Ok(name) => name,
            Err(e) => return self.reject(e),
        };
        match self.departments.update(&*self.backend, &id, &name).await {
            Ok(_) => {
                self.succeed("Department updated successfully!");
                true
            }
            Err(e) => {
                error!(%id, "failed to update department: {e}");
                self.fail("Failed to update department.");
                false
            }
        }
    }

    pub async fn delete_department(&mut self, id: department::Id) -> bool {
        if self.authorize(Route::Departments).await.is_none() {
            return false;
        }
        match self.departments.delete(&*self.backend, &id).await {
            Ok(()) => {
                self.succeed("Department deleted successfully!");
                true
            }
            Err(e) => {
                error!(%id, "failed to delete department: {e}");
                self.fail("Failed to delete department.");
                false
            }
        }
    }

    pub async fn change_user_role(&mut self, id: user::Id, role: Role) -> bool {
        if !self.may_edit_user(id).await {
            return false;
        }
        match self.users.update_role(&*self.backend, id, role).await {
            Ok(_) => {
                self.succeed("User role updated successfully!");
                true
            }
            Err(e) => {
                error!(%id, %role, "failed to update user role: {e}");
                self.fail("Failed to update user role.");
                false
            }
        }
    }

    /// `None` clears the user's department.
    pub async fn change_user_department(
        &mut self,
        id: user::Id,
        department: Option<department::Id>,
    ) -> bool {
        if !self.may_edit_user(id).await {
            return false;
        }
        if let Some(d) = &department {
            if self.departments.get(d).is_none() {
                return self.reject(form::Invalid::UnknownDepartment(d.clone()));
            }
        }
        match self
            .users
            .update_department(&*self.backend, id, department.as_ref())
            .await
        {
            Ok(_) => {
                self.succeed("User department updated successfully!");
                true
            }
            Err(e) => {
                error!(%id, "failed to update user department: {e}");
                self.fail("Failed to update user department.");
                false
            }
        }
    }

    pub fn filter_status(&mut self, status: StatusFilter) {
        self.filter.status = status;
    }

    /// Department filtering is only offered on the all-tickets screen.
    pub fn filter_department(
        &mut self,
        department: Option<department::Id>,
    ) -> bool {
        if self.route != Route::AllTickets {
            self.fail("Department filter is only available on All Tickets.");
            return false;
        }
        self.filter.department = department;
        true
    }

    /// The current screen, preceded by the menu once logged in.
    pub fn render(&self) -> String {
        let departments = &self.departments;
        let tickets = &self.tickets;
        let Some(principal) = self.session.principal() else {
            return match self.route {
                Route::Register => view::Register.to_string(),
                _ => view::Login.to_string(),
            };
        };

        let screen = match self.route {
            Route::Login => view::Login.to_string(),
            Route::Register => view::Register.to_string(),
            Route::Dashboard => view::Dashboard {
                principal,
                tickets,
                departments,
            }
            .to_string(),
            Route::CreateTicket => {
                view::CreateTicket { departments }.to_string()
            }
            route @ (Route::MyTickets
            | Route::DepartmentTickets
            | Route::AllTickets) => view::TicketList {
                route,
                principal,
                tickets,
                departments,
                filter: &self.filter,
            }
            .to_string(),
            Route::Departments => {
                view::DepartmentTable { departments }.to_string()
            }
            Route::Users => view::UserTable {
                principal,
                users: &self.users,
                departments,
            }
            .to_string(),
            Route::Settings => view::Settings.to_string(),
        };
        let menu = view::Menu {
            principal,
            current: self.route,
        };
        format!("{menu}\n{screen}")
    }

    fn principal(&self) -> Option<api::Principal> {
        self.session.principal().cloned()
    }

    fn role(&self) -> Option<Role> {
        self.session.principal().map(|p| p.role)
    }

    /// Applies the guard to `route`. On [`Decision::Render`] the route opens
    /// and its data is loaded if missing.
    async fn go(&mut self, route: Route) -> Decision {
        let decision = guard::check_route(self.role(), route);
        let target = match decision {
            Decision::Render => route,
            Decision::RedirectToLogin { from } => {
                info!(%from, "login required");
                self.return_to = Some(from);
                Route::Login
            }
            Decision::RedirectToDashboard => {
                warn!(%route, "route not allowed for role");
                Route::Dashboard
            }
        };
        if target != self.route {
            self.filter = TicketFilter::default();
        }
        self.route = target;

        if target == Route::Users && !self.users.is_loaded() {
            if let Err(e) = self.users.fetch(&*self.backend).await {
                error!("failed to load users: {e}");
                self.fail("Failed to load users.");
            }
        }
        decision
    }

    /// Commands are allowed where their screen is. A refused command
    /// redirects the same way navigating to the screen would.
    async fn authorize(&mut self, route: Route) -> Option<api::Principal> {
        match guard::check_route(self.role(), route) {
            Decision::Render => self.principal(),
            _ => {
                self.go(route).await;
                if self.session.is_authenticated() {
                    self.fail("You are not allowed to do that.");
                }
                None
            }
        }
    }

    async fn may_edit_user(&mut self, id: user::Id) -> bool {
        let Some(admin) = self.authorize(Route::Users).await else {
            return false;
        };
        if admin.id == id {
            self.fail("You cannot change your own account.");
            return false;
        }
        true
    }

    /// Fetches departments and, once logged in, the visible tickets.
    async fn load(&mut self) {
        let backend = &*self.backend;
        let (departments, tickets) = match self.session.principal() {
            Some(principal) => {
                let (d, t) = futures::join!(
                    self.departments.fetch(backend),
                    self.tickets.fetch_for(backend, principal),
                );
                (d, Some(t))
            }
            None => (self.departments.fetch(backend).await, None),
        };

        if let Err(e) = departments {
            error!("failed to load departments: {e}");
            self.fail("Failed to load departments.");
        }
        if let Some(Err(e)) = tickets {
            error!("failed to load tickets: {e}");
            self.fail("Failed to load tickets.");
        }
    }

    fn succeed(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Success,
            text: text.into(),
        });
    }

    fn fail(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        });
    }

    fn reject(&mut self, invalid: form::Invalid) -> bool {
        warn!("rejected input: {invalid}");
        self.fail(format!("Please check the form: {invalid}."));
        false
    }
}
