pub mod department;
pub mod ticket;
pub mod user;

pub use self::{department::Department, ticket::Ticket, user::Principal};
