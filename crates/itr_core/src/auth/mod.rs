use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::session::User;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_LOGIN_ERROR: &str = "Error al iniciar sesión";
pub const DEFAULT_REGISTER_ERROR: &str = "Error al registrar usuario";

fn required(fields: &[&str]) -> Result<(), AppError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::new(
            "AUTH_FIELDS_REQUIRED",
            "Todos los campos son obligatorios",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body sent to `POST /usuarios/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    /// Client-side checks, in the order the user sees them.
    pub fn validate(&self) -> Result<RegisterRequest, AppError> {
        required(&[&self.name[..], &self.email[..], &self.password[..]])?;
        if self.password != self.confirm_password {
            return Err(AppError::new(
                "AUTH_PASSWORD_MISMATCH",
                "Las contraseñas no coinciden",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::new(
                "AUTH_PASSWORD_TOO_SHORT",
                format!("La contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres"),
            ));
        }
        Ok(RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), AppError> {
        required(&[&self.email[..], &self.password[..]])
    }
}

/// Envelope returned by both auth endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl AuthResponse {
    fn rejection(&self, preferred_field: Option<&str>, default: &str) -> AppError {
        let field_error = preferred_field.and_then(|f| {
            self.errors
                .as_ref()
                .and_then(|errs| errs.get(f))
                .and_then(|msgs| msgs.first())
        });
        let message = field_error
            .or(self.message.as_ref())
            .cloned()
            .unwrap_or_else(|| default.to_string());
        let mut err = AppError::new("AUTH_REJECTED", message);
        if let Some(errors) = &self.errors {
            err = err.with_details(format!("{errors:?}"));
        }
        err
    }

    /// The logged-in user, or the backend's rejection as an error.
    pub fn into_login_user(mut self) -> Result<User, AppError> {
        if self.success {
            if let Some(user) = self.user.take() {
                return Ok(user);
            }
        }
        Err(self.rejection(None, DEFAULT_LOGIN_ERROR))
    }

    pub fn into_registration(self) -> Result<Option<User>, AppError> {
        if self.success {
            return Ok(self.user);
        }
        Err(self.rejection(Some("email"), DEFAULT_REGISTER_ERROR))
    }
}
