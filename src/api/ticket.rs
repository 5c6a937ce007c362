use derive_more::{Display, FromStr};
use enum_utils::TryFromRepr;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::api::{department, user};

time::serde::format_description!(
    local_date_time,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Id,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub location: Option<String>,
    pub department: department::Id,
    pub created_by: user::Id,
    pub created_by_name: String,
    #[serde(with = "local_date_time")]
    pub created_at: PrimitiveDateTime,
    #[serde(with = "local_date_time")]
    pub updated_at: PrimitiveDateTime,
}

/// Fields a citizen submits. The server assigns the number, status and
/// timestamps.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub location: Option<String>,
    pub department: department::Id,
    pub created_by: user::Id,
    pub created_by_name: String,
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
    TryFromRepr,
)]
#[enumeration(case_insensitive, rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Status {
    /// Reported and waiting for someone to pick it up.
    #[display("OPEN")]
    Open = 1,

    /// Being worked on by the department.
    #[display("IN_PROGRESS")]
    InProgress = 2,

    /// Work is done, waiting to be closed.
    #[display("RESOLVED")]
    Resolved = 3,

    #[display("CLOSED")]
    Closed = 4,
}

impl Status {
    pub const ALL: [Self; 4] =
        [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    /// Status that follows this one, if any. Tickets only ever move forward
    /// one step at a time.
    pub fn next(self) -> Option<Self> {
        Self::try_from(self as u8 + 1).ok()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub enum Priority {
    #[display("LOW")]
    Low,
    #[default]
    #[display("MEDIUM")]
    Medium,
    #[display("HIGH")]
    High,
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
pub enum Category {
    #[display("SANITATION")]
    Sanitation,
    #[display("WATER_SUPPLY")]
    WaterSupply,
    #[display("STREETLIGHTS")]
    Streetlights,
    #[display("ROADS")]
    Roads,
    #[serde(other)]
    #[display("OTHER")]
    Other,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Sanitation,
        Self::WaterSupply,
        Self::Streetlights,
        Self::Roads,
        Self::Other,
    ];
}
