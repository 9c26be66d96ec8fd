//! Auth service for the jobboard client.
//!
//! Wraps `POST /login`, `POST /register` and `POST /verify-email`. Login
//! answers with a [`Session`] ready for the session manager; registration
//! validates the form before anything is sent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::transport::{ApiRequest, Transport};
use crate::types::errors::{ApiError, SessionError};
use crate::types::session::Session;
use crate::types::user::{Role, UserData};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;

/// Sign-up form as entered by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user_data: UserData,
    access_token: String,
}

/// Server reply to a successful registration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_data: UserData,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

/// Trait defining account operations.
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError>;
    async fn register(&self, form: &RegisterForm) -> Result<RegisterResponse, SessionError>;
    async fn verify_email(&self, email: &str, code: &str) -> Result<String, SessionError>;
}

/// Auth endpoints over a transport.
pub struct AuthService {
    transport: Arc<dyn Transport>,
}

impl AuthService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

/// Loose structural check: one `@`, a non-empty local part, a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(head, tail)| !head.is_empty() && !tail.is_empty() && !tail.ends_with('.'))
            .unwrap_or(false)
}

/// Validates the sign-up form, reporting the first problem found.
pub fn validate_registration(form: &RegisterForm) -> Result<(), SessionError> {
    let invalid = |msg: &str| Err(SessionError::InvalidInput(msg.to_string()));

    if form.email.trim().is_empty() {
        return invalid("Email is required");
    }
    if !is_valid_email(form.email.trim()) {
        return invalid("Invalid email address");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return invalid("Password must be at least 6 characters");
    }
    if form.confirm_password.is_empty() {
        return invalid("Confirm Password is required");
    }
    if form.password != form.confirm_password {
        return invalid("Passwords must match");
    }
    if form.name.trim().chars().count() < MIN_NAME_LEN {
        return invalid("Name must be at least 2 characters");
    }
    match Role::parse(&form.role) {
        Some(Role::Employer) | Some(Role::Jobseeker) => Ok(()),
        _ => invalid("Role is required"),
    }
}

/// The body actually sent: email lower-cased, name trimmed, role upper-cased.
pub fn registration_payload(form: &RegisterForm) -> serde_json::Value {
    json!({
        "email": form.email.trim().to_lowercase(),
        "name": form.name.trim(),
        "role": form.role.trim().to_uppercase(),
        "password": form.password,
        "confirmPassword": form.confirm_password,
    })
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(SessionError::InvalidInput("Email and password are required".to_string()));
        }
        let request = ApiRequest::post("login", json!({ "email": email.trim(), "password": password }));
        let response = self.transport.send(request).await.and_then(|r| r.into_result());
        let reply: LoginResponse = match response.and_then(|r| r.decode()) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "login failed");
                return Err(e.into());
            }
        };

        let role_name = reply.user_data.role.to_lowercase();
        let role = Role::parse(&role_name)
            .ok_or_else(|| ApiError::Decode(format!("unknown role '{}'", role_name)))?;
        info!(user = %reply.user_data.id, role = %role, "logged in");
        Ok(Session {
            user_id: reply.user_data.id.clone(),
            role,
            token: reply.access_token.clone(),
            name: reply.user_data.name.clone(),
            email: reply.user_data.email.clone(),
        })
    }

    async fn register(&self, form: &RegisterForm) -> Result<RegisterResponse, SessionError> {
        validate_registration(form)?;
        let request = ApiRequest::post("register", registration_payload(form));
        let reply: RegisterResponse = self.transport.send(request).await?.into_result()?.decode()?;
        info!(user = %reply.user_data.id, "registered; verification pending");
        Ok(reply)
    }

    /// Confirms the one-time code mailed after registration.
    async fn verify_email(&self, email: &str, code: &str) -> Result<String, SessionError> {
        if code.trim().is_empty() {
            return Err(SessionError::InvalidInput("Verification code is required".to_string()));
        }
        let request = ApiRequest::post("verify-email", json!({ "email": email.trim(), "code": code.trim() }));
        let reply: MessageResponse = self.transport.send(request).await?.into_result()?.decode()?;
        Ok(reply.message)
    }
}
