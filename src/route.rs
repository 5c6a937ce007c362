//! Screens of the application and what each role may do.

use derive_more::Display;

use crate::api::user::Role;

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Route {
    #[display("/login")]
    Login,
    #[display("/register")]
    Register,
    #[display("/dashboard")]
    Dashboard,
    #[display("/create-ticket")]
    CreateTicket,
    #[display("/my-tickets")]
    MyTickets,
    #[display("/department-tickets")]
    DepartmentTickets,
    #[display("/all-tickets")]
    AllTickets,
    #[display("/departments")]
    Departments,
    #[display("/users")]
    Users,
    #[display("/settings")]
    Settings,
}

impl Route {
    pub const ALL: [Self; 10] = [
        Self::Login,
        Self::Register,
        Self::Dashboard,
        Self::CreateTicket,
        Self::MyTickets,
        Self::DepartmentTickets,
        Self::AllTickets,
        Self::Departments,
        Self::Users,
        Self::Settings,
    ];

    /// Resolves a path. `/` and unknown paths land on the dashboard.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL
            .into_iter()
            .find(|r| r.to_string() == path)
            .unwrap_or(Self::Dashboard)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Dashboard => "Dashboard",
            Self::CreateTicket => "Create Ticket",
            Self::MyTickets => "My Tickets",
            Self::DepartmentTickets => "Department Tickets",
            Self::AllTickets => "All Tickets",
            Self::Departments => "Manage Departments",
            Self::Users => "Manage Users",
            Self::Settings => "System Settings",
        }
    }

    /// Routes reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Roles allowed to open this route. Empty means any authenticated
    /// principal.
    pub fn required_roles(self) -> Vec<Role> {
        let allowed = Role::ALL
            .into_iter()
            .filter(|role| role.capabilities().routes.contains(&self))
            .collect::<Vec<_>>();
        if allowed.len() == Role::ALL.len() {
            Vec::new()
        } else {
            allowed
        }
    }
}

/// Which tickets a role gets from the server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visibility {
    /// Only the tickets the principal filed.
    Own,

    /// Only the tickets of the principal's department.
    Department,

    All,
}

/// Everything a role is allowed to see and do.
#[derive(Debug)]
pub struct Capabilities {
    /// Screens in navigation-menu order.
    pub routes: &'static [Route],
    pub tickets: Visibility,
    pub advances_tickets: bool,
}

const CITIZEN: Capabilities = Capabilities {
    routes: &[Route::Dashboard, Route::CreateTicket, Route::MyTickets],
    tickets: Visibility::Own,
    advances_tickets: false,
};

const STAFF: Capabilities = Capabilities {
    routes: &[Route::Dashboard, Route::DepartmentTickets],
    tickets: Visibility::Department,
    advances_tickets: true,
};

const COLLECTOR: Capabilities = Capabilities {
    routes: &[Route::Dashboard, Route::AllTickets, Route::Departments],
    tickets: Visibility::All,
    advances_tickets: true,
};

const ADMIN: Capabilities = Capabilities {
    routes: &[
        Route::Dashboard,
        Route::AllTickets,
        Route::Users,
        Route::Settings,
    ],
    tickets: Visibility::All,
    advances_tickets: true,
};

impl Role {
    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            Self::Citizen => &CITIZEN,
            Self::Staff => &STAFF,
            Self::Collector => &COLLECTOR,
            Self::Admin => &ADMIN,
        }
    }

    /// Navigation menu entries for this role.
    pub fn menu(self) -> impl Iterator<Item = Route> {
        self.capabilities().routes.iter().copied()
    }
}
