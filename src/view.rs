//! Text screens.
//!
//! Every view borrows what it shows and renders through [`fmt::Display`].
//! None of them hold state of their own.

use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::{
    api::{
        self, department,
        ticket::{Category, Priority, Status},
        user::Role,
    },
    route::Route,
    store::{Departments, Tickets, Users},
};

/// Status selection of a ticket list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl FromStr for StatusFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

/// Client-side filters over the fetched tickets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TicketFilter {
    pub status: StatusFilter,

    /// Only offered on the all-tickets screen.
    pub department: Option<department::Id>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &api::Ticket) -> bool {
        let status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => ticket.status == status,
        };
        let department = self
            .department
            .as_ref()
            .map_or(true, |id| &ticket.department == id);
        status && department
    }

    pub fn apply<'a>(
        &'a self,
        tickets: &'a [api::Ticket],
    ) -> impl Iterator<Item = &'a api::Ticket> + 'a {
        tickets.iter().filter(move |t| self.matches(t))
    }
}

/// Button moving a ticket to its next status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Action {
    pub status: Status,
    pub label: &'static str,
}

impl Action {
    /// The single action offered for `ticket` to `role`, if any.
    pub fn for_ticket(ticket: &api::Ticket, role: Role) -> Option<Self> {
        if !role.capabilities().advances_tickets {
            return None;
        }
        let status = ticket.status.next()?;
        let label = match status {
            // `next()` never yields `Open`.
            Status::Open | Status::InProgress => "Start Progress",
            Status::Resolved => "Mark Resolved",
            Status::Closed => "Close Ticket",
        };
        Some(Self { status, label })
    }
}

pub struct Menu<'a> {
    pub principal: &'a api::Principal,
    pub current: Route,
}

impl fmt::Display for Menu<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.principal.role.menu().format_with(" | ", |r, f| {
            if r == self.current {
                f(&format_args!("[{}]", r.title()))
            } else {
                f(&format_args!("{} ({r})", r.title()))
            }
        });
        writeln!(f, "{entries}")?;
        writeln!(
            f,
            "Signed in as {} ({})",
            self.principal.display_name, self.principal.role,
        )
    }
}

pub struct Login;

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Municipal Ticketing System ==")?;
        writeln!(f, "Sign in:        login <username> <password>")?;
        writeln!(f, "No account yet? go /register")
    }
}

pub struct Register;

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Register ==")?;
        writeln!(
            f,
            "Create an account: register <username> <password> <name>",
        )?;
        writeln!(f, "Already registered? go /login")
    }
}

/// Ticket counts over everything the principal can see.
pub struct Dashboard<'a> {
    pub principal: &'a api::Principal,
    pub tickets: &'a Tickets,
    pub departments: &'a Departments,
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.tickets.all().iter().counts_by(|t| t.status);
        let count = |status: Status| counts.get(&status).copied().unwrap_or(0);

        writeln!(f, "== Dashboard ==")?;
        writeln!(f, "Welcome, {}!", self.principal.display_name)?;
        write!(f, "Role: {}", self.principal.role)?;
        if let Some(id) = &self.principal.department {
            let department = DepartmentName {
                id,
                departments: self.departments,
            };
            write!(f, "  Department: {department}")?;
        }
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "Total tickets: {}", self.tickets.all().len())?;
        writeln!(f, "Open:          {}", count(Status::Open))?;
        writeln!(f, "In progress:   {}", count(Status::InProgress))?;
        writeln!(f, "Resolved:      {}", count(Status::Resolved))
    }
}

pub struct TicketCard<'a> {
    pub ticket: &'a api::Ticket,
    pub departments: &'a Departments,
    pub action: Option<Action>,
}

impl fmt::Display for TicketCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.ticket;
        let department = DepartmentName {
            id: &t.department,
            departments: self.departments,
        };

        writeln!(
            f,
            "#{} {} [{}] {} (id {})",
            t.ticket_number,
            t.title,
            t.status.label(),
            t.priority,
            t.id,
        )?;
        writeln!(f, "  {}", t.description)?;
        writeln!(
            f,
            "  Category: {}  Department: {department}  Created: {}",
            t.category,
            t.created_at.date(),
        )?;
        if let Some(location) = &t.location {
            writeln!(f, "  Location: {location}")?;
        }
        writeln!(f, "  Reported by: {}", t.created_by_name)?;
        if let Some(action) = self.action {
            writeln!(f, "  > {}: advance {}", action.label, t.id)?;
        }
        Ok(())
    }
}

/// My, department and all tickets screens.
pub struct TicketList<'a> {
    pub route: Route,
    pub principal: &'a api::Principal,
    pub tickets: &'a Tickets,
    pub departments: &'a Departments,
    pub filter: &'a TicketFilter,
}

impl TicketList<'_> {
    fn shows_actions(&self) -> bool {
        matches!(self.route, Route::DepartmentTickets | Route::AllTickets)
    }

    fn filters_departments(&self) -> bool {
        self.route == Route::AllTickets
    }
}

impl fmt::Display for TicketList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.route.title())?;
        if self.route == Route::DepartmentTickets {
            match &self.principal.department {
                Some(id) => writeln!(
                    f,
                    "Department: {}",
                    DepartmentName {
                        id,
                        departments: self.departments,
                    },
                )?,
                None => {
                    return writeln!(f, "You are not assigned to a department.")
                }
            }
        }

        let statuses = [StatusFilter::All]
            .into_iter()
            .chain(Status::ALL.map(StatusFilter::Only))
            .map(|s| Choice(s, s == self.filter.status))
            .join(" ");
        writeln!(f, "Status: {statuses}  (filter status <value>)")?;
        if self.filters_departments() {
            let departments = [Choice(
                "ALL".to_owned(),
                self.filter.department.is_none(),
            )]
            .into_iter()
            .chain(self.departments.all().iter().map(|d| {
                Choice(
                    d.id.to_string(),
                    self.filter.department.as_ref() == Some(&d.id),
                )
            }))
            .join(" ");
            writeln!(f, "Department: {departments}  (filter department <id>)")?;
        }
        writeln!(f)?;

        let mut shown = 0;
        for ticket in self.filter.apply(self.tickets.all()) {
            let action = if self.shows_actions() {
                Action::for_ticket(ticket, self.principal.role)
            } else {
                None
            };
            let card = TicketCard {
                ticket,
                departments: self.departments,
                action,
            };
            writeln!(f, "{card}")?;
            shown += 1;
        }
        if shown == 0 {
            writeln!(f, "No tickets found.")?;
        }
        Ok(())
    }
}

/// Lists the choices for every field of a new ticket.
pub struct CreateTicket<'a> {
    pub departments: &'a Departments,
}

impl fmt::Display for CreateTicket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Create New Ticket ==")?;
        writeln!(f, "Categories:  {}", Category::ALL.iter().join(", "))?;
        writeln!(
            f,
            "Priorities:  {}, {}, {} (default {})",
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::default(),
        )?;
        if self.departments.all().is_empty() {
            writeln!(f, "Departments: none available")?;
        } else {
            let departments = self
                .departments
                .all()
                .iter()
                .format_with(", ", |d, f| {
                    f(&format_args!("{} ({})", d.id, d.name))
                });
            writeln!(f, "Departments: {departments}")?;
        }
        writeln!(f, "Start the form with: create-ticket")
    }
}

pub struct DepartmentTable<'a> {
    pub departments: &'a Departments,
}

impl fmt::Display for DepartmentTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Manage Departments ==")?;
        for d in self.departments.all() {
            writeln!(f, "{:<16} {}", d.id, d.name)?;
        }
        if self.departments.all().is_empty() {
            writeln!(f, "No departments yet.")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "dept add <id> <name> | dept rename <id> <name> | \
             dept delete <id>",
        )
    }
}

/// The admin's own row is shown but cannot be edited.
pub struct UserTable<'a> {
    pub principal: &'a api::Principal,
    pub users: &'a Users,
    pub departments: &'a Departments,
}

impl fmt::Display for UserTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Manage Users ==")?;
        for u in self.users.all() {
            let department = u
                .department
                .as_ref()
                .map(|id| {
                    DepartmentName {
                        id,
                        departments: self.departments,
                    }
                    .to_string()
                })
                .unwrap_or_else(|| "-".to_owned());
            write!(
                f,
                "{:>4} {:<14} {:<20} {:<10} {department}",
                u.id, u.username, u.display_name, u.role,
            )?;
            if u.id == self.principal.id {
                write!(f, "  (you)")?;
            }
            writeln!(f)?;
        }
        if self.users.all().is_empty() {
            writeln!(f, "No users found.")?;
        }
        writeln!(f)?;
        writeln!(f, "Roles: {}", Role::ALL.iter().join(", "))?;
        writeln!(f, "user role <id> <role> | user dept <id> <department|none>")
    }
}

pub struct Settings;

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== System Settings ==")?;
        writeln!(f, "Nothing to configure yet.")
    }
}

/// Falls back to the bare id for departments that no longer exist.
struct DepartmentName<'a> {
    id: &'a department::Id,
    departments: &'a Departments,
}

impl fmt::Display for DepartmentName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.departments.get(self.id) {
            Some(d) => f.write_str(&d.name),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Option of a selector, bracketed when selected.
struct Choice<T>(T, bool);

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 {
            write!(f, "[{}]", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
