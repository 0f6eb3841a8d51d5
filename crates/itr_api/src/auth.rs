use itr_core::auth::{AuthResponse, LoginForm, RegisterRequest};
use itr_core::error::AppError;

use crate::http::{ApiClient, Reply};

const REGISTER_PATH: &str = "/usuarios/register/";
const LOGIN_PATH: &str = "/usuarios/login/";

pub trait AuthApi {
    fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError>;
    fn login(&self, form: &LoginForm) -> Result<AuthResponse, AppError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

/// Rejections (4xx) carry the same envelope as successes, so those bodies are decoded too. Server
/// errors, and any non-2xx reply without an envelope, are plain status failures.
fn envelope(reply: Reply) -> Result<AuthResponse, AppError> {
    if reply.status >= 500 {
        return Err(reply.status_error());
    }
    match reply.json::<AuthResponse>() {
        Ok(resp) => Ok(resp),
        Err(_) if !reply.is_success() => Err(reply.status_error()),
        Err(e) => Err(e),
    }
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl AuthApi for HttpAuthApi {
    fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        envelope(self.client.post(REGISTER_PATH, request)?)
    }

    fn login(&self, form: &LoginForm) -> Result<AuthResponse, AppError> {
        envelope(self.client.post(LOGIN_PATH, form)?)
    }
}
