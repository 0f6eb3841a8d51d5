pub mod auth;
pub mod config;
pub mod http;
pub mod service;
pub mod store;

pub use auth::{AuthApi, HttpAuthApi};
pub use config::ClientConfig;
pub use http::ApiClient;
pub use service::{check_connection, AuthService, ConnectionStatus, IncidentService};
pub use store::{HttpIncidentStore, IncidentStore};
