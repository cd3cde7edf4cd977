//! Headless dashboard for the user directory: a typed REST client, the
//! search/delete controller and the pieces of the terminal front end.

pub mod api;
pub mod command;
pub mod config;
pub mod controller;
pub mod render;

pub use api::{ApiError, User, UserId, UsersApiClient, UsersBackend};
pub use config::DashboardConfig;
pub use controller::{DashboardController, DashboardState, DeleteConfirmation, DEFAULT_DEBOUNCE_DELAY};
