pub mod api;
pub mod app;
pub mod backend;
pub mod command;
pub mod config;
pub mod form;
pub mod guard;
pub mod route;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;

pub use self::{app::App, config::Config};
