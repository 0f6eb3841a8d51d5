//! Command-line front end for the incident tracker.
//!
//! ## Available Commands
//!
//! - `login` / `register` / `logout` / `whoami` - account and session
//! - `list` - filtered, sorted incident list
//! - `show` - one incident
//! - `create` - report a new incident
//! - `set-status` / `assign` / `resolve` / `delete` - edit an incident
//! - `stats` - dashboard statistics
//! - `report` - write the PDF report of an incident
//! - `ping` - check that the backend answers

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itr_core::error::AppError;

pub use commands::*;

/// Incident tracker client
///
/// Talks to the incident backend over HTTP. Settings come from an optional TOML file, then
/// `ITR_*` environment variables, then the flags below.
#[derive(Parser, Debug)]
#[command(name = "incident-tracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "ITR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and ITR_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the cached session
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and remember the user
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "ITR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm_password: String,
    },

    /// Forget the logged-in user
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List incidents
    List {
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        /// Only incidents created on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// priority, newest, oldest or id
        #[arg(short, long, default_value = "priority")]
        sort: String,
    },

    /// Show one incident
    Show { id: i64 },

    /// Report a new incident
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        priority: String,

        /// Creation date (YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<String>,
    },

    /// Change the status of an incident
    SetStatus { id: i64, status: String },

    /// Assign a technician; without one, unassign
    Assign { id: i64, technician: Option<String> },

    /// Record the resolution text; without one, clear it
    Resolve { id: i64, text: Option<String> },

    /// Delete an incident
    Delete { id: i64 },

    /// Dashboard statistics
    Stats,

    /// Write the PDF report of an incident
    Report {
        id: i64,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Check that the backend is reachable
    Ping,
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Commands::Login { email, password } => cmd_login(&ctx, email, password),
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => cmd_register(&ctx, name, email, password, confirm_password),
        Commands::Logout => cmd_logout(&ctx),
        Commands::Whoami => cmd_whoami(&ctx),
        Commands::List {
            category,
            status,
            priority,
            since,
            sort,
        } => cmd_list(
            &ctx,
            ListArgs {
                category,
                status,
                priority,
                since,
                sort,
            },
        ),
        Commands::Show { id } => cmd_show(&ctx, id),
        Commands::Create {
            title,
            description,
            category,
            priority,
            date,
        } => cmd_create(&ctx, title, description, category, priority, date),
        Commands::SetStatus { id, status } => cmd_set_status(&ctx, id, &status),
        Commands::Assign { id, technician } => cmd_assign(&ctx, id, technician.as_deref()),
        Commands::Resolve { id, text } => cmd_resolve(&ctx, id, text.as_deref()),
        Commands::Delete { id } => cmd_delete(&ctx, id),
        Commands::Stats => cmd_stats(&ctx),
        Commands::Report { id, out } => cmd_report(&ctx, id, &out),
        Commands::Ping => cmd_ping(&ctx),
    }
}
