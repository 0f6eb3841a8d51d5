//! # Incident Tracker CLI
//!
//! Terminal front end over `itr_api` (HTTP boundary and services) and `itr_core` (domain rules).
//!
//! ```bash
//! incident-tracker login -e ana@example.com -p secreto
//! incident-tracker list --status Abierto --sort newest
//! incident-tracker report 12 --out informes/
//! ```

pub mod cli;
pub mod render;
