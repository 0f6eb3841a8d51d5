//! # CLI Command Implementations

use std::path::Path;

use itr_api::auth::HttpAuthApi;
use itr_api::config::ClientConfig;
use itr_api::http::ApiClient;
use itr_api::service::{check_connection, AuthService, ConnectionStatus, IncidentService};
use itr_api::store::HttpIncidentStore;
use itr_core::auth::{LoginForm, RegistrationForm};
use itr_core::draft::{CreatedAtChoice, IncidentDraft};
use itr_core::error::AppError;
use itr_core::filter::FilterSpec;
use itr_core::normalize::dates::parse_date_input;
use itr_core::session::{Session, SessionEvent, Subscription};
use itr_core::sort::SortMode;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::Cli;
use crate::render;

/// Resolved settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ClientConfig,
    pub json: bool,
}

/// Defaults, then the TOML file, then `ITR_*` variables read through `env`, then flags.
pub fn resolve_config(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_file(path)?,
        None => ClientConfig::default(),
    };
    config.apply_env_from(env)?;
    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout_ms = ms;
    }
    config.validated()
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, AppError> {
        Ok(Self {
            config: resolve_config(cli, |key| std::env::var(key).ok())?,
            json: cli.json,
        })
    }

    fn client(&self) -> Result<ApiClient, AppError> {
        ApiClient::from_config(&self.config)
    }

    fn incidents(&self) -> Result<IncidentService<HttpIncidentStore>, AppError> {
        Ok(IncidentService::new(HttpIncidentStore::new(self.client()?)))
    }

    fn auth(&self) -> Result<AuthService<HttpAuthApi>, AppError> {
        let session = Session::restore(self.config.session_store())?;
        Ok(AuthService::new(HttpAuthApi::new(self.client()?), session))
    }

    /// Like `auth`, for commands that replace the stored user anyway: an unreadable session file
    /// is reported and then ignored.
    fn auth_replacing_session(&self) -> Result<AuthService<HttpAuthApi>, AppError> {
        let store = self.config.session_store();
        let session = match Session::restore(store.clone()) {
            Ok(session) => session,
            Err(err) if err.code == "SESSION_READ_FAILED" => {
                warn!(
                    path = %store.path().display(),
                    details = ?err.details,
                    "ignoring unreadable session file"
                );
                Session::with_store(store)
            }
            Err(err) => return Err(err),
        };
        Ok(AuthService::new(HttpAuthApi::new(self.client()?), session))
    }

    /// Print `value` as JSON in `--json` mode, otherwise the text produced by `text`.
    fn emit<T: Serialize>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<(), AppError> {
        if self.json {
            let out = serde_json::to_string_pretty(value).map_err(|e| {
                AppError::new("OUTPUT_ENCODE_FAILED", "Failed to encode output")
                    .with_details(e.to_string())
            })?;
            println!("{out}");
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

/// Log session transitions the way the navigation bar reacts to them.
fn announce_session_changes(session: &Session) -> Subscription {
    session.subscribe(|event| match event {
        SessionEvent::LoggedIn(user) => {
            info!(user_id = user.id, email = %user.email, "logged in")
        }
        SessionEvent::LoggedOut => info!("logged out"),
    })
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn cmd_login(ctx: &Context, email: String, password: String) -> Result<(), AppError> {
    let mut auth = ctx.auth_replacing_session()?;
    let _announce = announce_session_changes(auth.session());
    let user = auth.login(&LoginForm { email, password })?;
    ctx.emit(&user, || format!("Bienvenido, {}\n", user.name))
}

pub fn cmd_register(
    ctx: &Context,
    name: String,
    email: String,
    password: String,
    confirm_password: String,
) -> Result<(), AppError> {
    let mut auth = ctx.auth()?;
    let user = auth.register(&RegistrationForm {
        name,
        email,
        password,
        confirm_password,
    })?;
    info!(user_id = ?user.as_ref().map(|u| u.id), "account registered");
    ctx.emit(&user, || {
        "Usuario registrado. Inicie sesión para continuar.\n".to_string()
    })
}

pub fn cmd_logout(ctx: &Context) -> Result<(), AppError> {
    let mut auth = ctx.auth_replacing_session()?;
    let _announce = announce_session_changes(auth.session());
    auth.logout()?;
    ctx.emit(&serde_json::json!({ "ok": true }), || "Sesión cerrada\n".to_string())
}

pub fn cmd_whoami(ctx: &Context) -> Result<(), AppError> {
    let auth = ctx.auth()?;
    let user = auth.session().current_user();
    ctx.emit(&user, || format!("{}\n", render::user_line(user)))
}

/// Options of the `list` command, before parsing.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub category: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub since: Option<String>,
    pub sort: String,
}

impl ListArgs {
    pub fn filter_spec(&self) -> Result<FilterSpec, AppError> {
        let mut spec = FilterSpec::default();
        if let Some(category) = &self.category {
            spec = spec.with_category(category.as_str());
        }
        if let Some(status) = &self.status {
            spec = spec.with_status(status.as_str());
        }
        if let Some(priority) = &self.priority {
            spec = spec.with_priority(priority.as_str());
        }
        if let Some(since) = &self.since {
            spec = spec.with_min_date(parse_date_input("since", since)?);
        }
        Ok(spec)
    }

    pub fn sort_mode(&self) -> Result<SortMode, AppError> {
        self.sort.parse()
    }
}

pub fn cmd_list(ctx: &Context, args: ListArgs) -> Result<(), AppError> {
    let spec = args.filter_spec()?;
    let mode = args.sort_mode()?;
    let now = now();

    let mut service = ctx.incidents()?;
    service.refresh(now)?;
    let board = service.board_mut();
    board.set_filter(spec, now);
    board.set_sort_mode(mode, now);

    let view = service.board().view();
    ctx.emit(&view, || render::incident_table(view, now))
}

pub fn cmd_show(ctx: &Context, id: i64) -> Result<(), AppError> {
    let now = now();
    let mut service = ctx.incidents()?;
    let incident = service.load_detail(id, now)?;
    ctx.emit(&incident, || render::incident_detail(&incident, now))
}

pub fn cmd_create(
    ctx: &Context,
    title: String,
    description: String,
    category: String,
    priority: String,
    date: Option<String>,
) -> Result<(), AppError> {
    let created_at = match date {
        Some(raw) => CreatedAtChoice::OnDate(parse_date_input("date", &raw)?),
        None => CreatedAtChoice::Now,
    };
    let draft = IncidentDraft {
        title,
        description,
        category,
        priority,
        created_at,
    };

    let mut service = ctx.incidents()?;
    let created = service.submit_draft(draft, now())?;
    info!(id = created.id, "incident reported");
    ctx.emit(&created, || {
        format!("Incidente reportado exitosamente con ID {}\n", created.id)
    })
}

pub fn cmd_set_status(ctx: &Context, id: i64, status: &str) -> Result<(), AppError> {
    let now = now();
    let mut service = ctx.incidents()?;
    let saved = service.update_status(id, status, now)?;
    info!(id, status = %saved.status, "status changed");
    ctx.emit(&saved, || render::incident_detail(&saved, now))
}

pub fn cmd_assign(ctx: &Context, id: i64, technician: Option<&str>) -> Result<(), AppError> {
    let now = now();
    let mut service = ctx.incidents()?;
    let saved = service.assign(id, technician, now)?;
    info!(id, technician = ?saved.assigned_to, "assignment changed");
    ctx.emit(&saved, || render::incident_detail(&saved, now))
}

pub fn cmd_resolve(ctx: &Context, id: i64, text: Option<&str>) -> Result<(), AppError> {
    let now = now();
    let mut service = ctx.incidents()?;
    let saved = service.resolve(id, text, now)?;
    info!(id, "resolution saved");
    ctx.emit(&saved, || render::incident_detail(&saved, now))
}

pub fn cmd_delete(ctx: &Context, id: i64) -> Result<(), AppError> {
    let mut service = ctx.incidents()?;
    service.delete(id, now())?;
    info!(id, "incident deleted");
    ctx.emit(&serde_json::json!({ "deleted": id }), || {
        format!("Incidente #{id} eliminado\n")
    })
}

pub fn cmd_stats(ctx: &Context) -> Result<(), AppError> {
    let mut service = ctx.incidents()?;
    service.refresh(now())?;
    let dashboard = service.dashboard();
    ctx.emit(&dashboard, || render::dashboard_text(&dashboard))
}

pub fn cmd_report(ctx: &Context, id: i64, out: &Path) -> Result<(), AppError> {
    let service = ctx.incidents()?;
    let path = service.export_report(id, out, now())?;
    info!(id, path = %path.display(), "report written");
    ctx.emit(&serde_json::json!({ "path": path.display().to_string() }), || {
        format!("Informe guardado en {}\n", path.display())
    })
}

pub fn cmd_ping(ctx: &Context) -> Result<(), AppError> {
    let service = ctx.incidents()?;
    match check_connection(service.store()) {
        ConnectionStatus::Connected => ctx.emit(
            &serde_json::json!({ "connected": true, "base_url": ctx.config.base_url }),
            || format!("Conectado a {}\n", ctx.config.base_url),
        ),
        ConnectionStatus::Unreachable(message) => Err(AppError::new(
            "API_UNREACHABLE",
            "No se pudo conectar con el servidor",
        )
        .with_details(format!("base_url={}; {message}", ctx.config.base_url))
        .with_retryable(true)),
    }
}
