//! Terminal command line parsing.

use derive_more::Display;

use crate::{
    api::{
        department,
        ticket,
        user::{self, Role},
    },
    view::StatusFilter,
};

pub const HELP: &str = "\
login <username> <password>
register <username> <password> <name>
logout
go <path>                         e.g. go /all-tickets
filter status <ALL|OPEN|IN_PROGRESS|RESOLVED|CLOSED>
filter department <id|ALL>
create-ticket
advance <ticket id>
dept add <id> <name>
dept rename <id> <name>
dept delete <id>
user role <user id> <role>
user dept <user id> <department|none>
menu
dismiss
help
quit";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        display_name: String,
    },
    Logout,
    Go(String),
    FilterStatus(StatusFilter),

    /// `None` shows every department.
    FilterDepartment(Option<department::Id>),

    /// Fields are prompted for one by one.
    CreateTicket,
    Advance(ticket::Id),
    AddDepartment {
        id: String,
        name: String,
    },
    RenameDepartment {
        id: department::Id,
        name: String,
    },
    DeleteDepartment(department::Id),
    UserRole {
        id: user::Id,
        role: Role,
    },
    UserDepartment {
        id: user::Id,
        department: Option<department::Id>,
    },
    Menu,
    Dismiss,
    Help,
    Quit,
}

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ParseError {
    #[display("unknown command `{_0}`, try `help`")]
    Unknown(String),

    #[display("usage: {_0}")]
    Usage(&'static str),

    #[display("invalid {what} `{value}`")]
    Invalid { what: &'static str, value: String },
}

impl std::error::Error for ParseError {}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        use ParseError as E;

        let (name, rest) = split(line);
        let command = match name {
            "" => return Ok(None),
            "login" => match words(rest).as_slice() {
                [username, password] => Self::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(E::Usage("login <username> <password>")),
            },
            "register" => {
                let (username, rest) = split(rest);
                let (password, display_name) = split(rest);
                if display_name.is_empty() {
                    return Err(E::Usage(
                        "register <username> <password> <name>",
                    ));
                }
                Self::Register {
                    username: username.into(),
                    password: password.into(),
                    display_name: display_name.into(),
                }
            }
            "logout" => Self::Logout,
            "go" => match words(rest).as_slice() {
                [path] => Self::Go(path.to_string()),
                _ => return Err(E::Usage("go <path>")),
            },
            "filter" => match words(rest).as_slice() {
                ["status", value] => Self::FilterStatus(
                    value.parse().map_err(|()| invalid("status", value))?,
                ),
                ["department", value] => {
                    Self::FilterDepartment(optional_department(value, "ALL"))
                }
                _ => {
                    return Err(E::Usage(
                        "filter status <value> | filter department <id>",
                    ))
                }
            },
            "create-ticket" => Self::CreateTicket,
            "advance" => match words(rest).as_slice() {
                [id] => Self::Advance(
                    id.parse().map_err(|_| invalid("ticket id", id))?,
                ),
                _ => return Err(E::Usage("advance <ticket id>")),
            },
            "dept" => {
                let (action, rest) = split(rest);
                let (id, name) = split(rest);
                let named = !id.is_empty() && !name.is_empty();
                match (action, name) {
                    ("add", name) if named => Self::AddDepartment {
                        id: id.into(),
                        name: name.into(),
                    },
                    ("rename", name) if named => Self::RenameDepartment {
                        id: department_id(id),
                        name: name.into(),
                    },
                    ("delete", "") if !id.is_empty() => {
                        Self::DeleteDepartment(department_id(id))
                    }
                    _ => {
                        return Err(E::Usage(
                            "dept add|rename <id> <name> | dept delete <id>",
                        ))
                    }
                }
            }
            "user" => match words(rest).as_slice() {
                ["role", id, role] => Self::UserRole {
                    id: user_id(id)?,
                    role: role.parse().map_err(|()| invalid("role", role))?,
                },
                ["dept", id, department] => Self::UserDepartment {
                    id: user_id(id)?,
                    department: optional_department(department, "none"),
                },
                _ => {
                    return Err(E::Usage(
                        "user role <id> <role> | \
                         user dept <id> <department|none>",
                    ))
                }
            },
            "menu" => Self::Menu,
            "dismiss" => Self::Dismiss,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(E::Unknown(other.into())),
        };
        Ok(Some(command))
    }
}

/// First word and the trimmed remainder.
fn split(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (s, ""),
    }
}

fn words(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

fn invalid(what: &'static str, value: &str) -> ParseError {
    ParseError::Invalid {
        what,
        value: value.into(),
    }
}

fn user_id(value: &str) -> Result<user::Id, ParseError> {
    value.parse().map_err(|_| invalid("user id", value))
}

/// Department codes are matched upper-case.
fn department_id(value: &str) -> department::Id {
    value.to_uppercase().into()
}

/// `none_word` (any case) stands for no department.
fn optional_department(
    value: &str,
    none_word: &str,
) -> Option<department::Id> {
    (!value.eq_ignore_ascii_case(none_word)).then(|| department_id(value))
}
