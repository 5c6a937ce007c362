use std::fmt;

use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::api::department;

/// Authenticated user as returned by the login and user endpoints.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Principal {
    pub id: Id,
    pub username: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<department::Id>,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i64);

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    enum_utils::FromStr,
    Hash,
    PartialEq,
    Serialize,
)]
#[enumeration(case_insensitive, rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Files tickets and follows their progress.
    #[display("CITIZEN")]
    Citizen,

    /// Works the tickets of a single department.
    #[display("STAFF")]
    Staff,

    /// Oversees all tickets and maintains the department list.
    #[display("COLLECTOR")]
    Collector,

    /// Oversees all tickets and manages user accounts.
    #[display("ADMIN")]
    Admin,
}

impl Role {
    pub const ALL: [Self; 4] =
        [Self::Citizen, Self::Staff, Self::Collector, Self::Admin];
}

#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// New account request. Accounts are always created as [`Role::Citizen`].
#[derive(Clone, Deserialize, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_server_user() {
        let principal = serde_json::from_value::<Principal>(json!({
            "id": 2,
            "username": "staff1",
            "password": "$2a$10$hash",
            "role": "STAFF",
            "name": "Jane Smith",
            "department": "SANITATION",
        }))
        .unwrap();

        assert_eq!(principal.id, Id::from(2));
        assert_eq!(principal.display_name, "Jane Smith");
        assert_eq!(principal.role, Role::Staff);
        assert_eq!(
            principal.department,
            Some(department::Id::from("SANITATION"))
        );
    }

    #[test]
    fn decodes_user_without_department() {
        let principal = serde_json::from_value::<Principal>(json!({
            "id": 1,
            "username": "citizen1",
            "role": "CITIZEN",
            "name": "John Doe",
            "department": null,
        }))
        .unwrap();
        assert_eq!(principal.department, None);
    }

    #[test]
    fn parses_role_names() {
        assert_eq!("COLLECTOR".parse::<Role>(), Ok(Role::Collector));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("MAYOR".parse::<Role>().is_err());
        assert_eq!(Role::Staff.to_string(), "STAFF");
    }

    #[test]
    fn hides_password_in_debug_output() {
        let credentials = Credentials {
            username: "citizen1".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
