//! Employer profile service.
//!
//! Wraps `GET /employer/profile` and `PUT /employer/update-details`. The
//! profile carries the subscription figures the dashboard shows, so it is
//! fetched after an employer signs in and again after every edit.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::api::transport::{ApiRequest, Transport};
use crate::services::auth_service::is_valid_email;
use crate::types::errors::{ApiError, SessionError};
use crate::types::user::EmployerProfile;

const PROFILE_PATH: &str = "employer/profile";
const UPDATE_PATH: &str = "employer/update-details";

/// Editable part of the company profile, as sent on save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDetails {
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone_number: String,
    pub company_website: String,
    pub industry: String,
    pub company_size: String,
    pub company_location: String,
}

impl ProfileDetails {
    /// Pre-fills the form from a fetched profile.
    pub fn from_profile(profile: &EmployerProfile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            company_name: text(&profile.company_name),
            phone_number: text(&profile.phone_number),
            company_website: text(&profile.company_website),
            industry: text(&profile.industry),
            company_size: text(&profile.company_size),
            company_location: text(&profile.company_location),
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.name.trim().is_empty() {
            return Err(SessionError::InvalidInput("Name is required".to_string()));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(SessionError::InvalidInput("Invalid email address".to_string()));
        }
        Ok(())
    }
}

/// Trait defining employer profile operations.
#[async_trait]
pub trait EmployerServiceTrait: Send + Sync {
    async fn fetch_profile(&self, bearer: &str) -> Result<EmployerProfile, SessionError>;
    async fn update_details(
        &self,
        bearer: &str,
        current: &EmployerProfile,
        details: &ProfileDetails,
    ) -> Result<EmployerProfile, SessionError>;
}

/// Employer endpoints over a transport.
pub struct EmployerService {
    transport: Arc<dyn Transport>,
}

impl EmployerService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

/// Copies every key of `changes` onto `target` when both are objects.
fn overlay(target: &mut Value, changes: &Value) {
    if let (Value::Object(target), Value::Object(changes)) = (target, changes) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// The profile after a successful save: the sent details over `current`,
/// then whatever profile fields the server answered with.
pub fn apply_details(
    current: &EmployerProfile,
    details: &ProfileDetails,
    reply: Option<&Value>,
) -> Result<EmployerProfile, serde_json::Error> {
    let mut merged = serde_json::to_value(current)?;
    overlay(&mut merged, &serde_json::to_value(details)?);
    if let Some(reply) = reply {
        // Some deployments wrap the profile, others return it bare.
        let body = reply.get("employer").unwrap_or(reply);
        let same_employer = body
            .get("id")
            .and_then(Value::as_str)
            .map_or(true, |id| id == current.id);
        if same_employer {
            overlay(&mut merged, body);
        }
    }
    serde_json::from_value(merged)
}

#[async_trait]
impl EmployerServiceTrait for EmployerService {
    async fn fetch_profile(&self, bearer: &str) -> Result<EmployerProfile, SessionError> {
        let request = ApiRequest::get(PROFILE_PATH).with_bearer(Some(bearer));
        let profile: EmployerProfile = self.transport.send(request).await?.into_result()?.decode()?;
        debug!(employer = %profile.id, plan = ?profile.subscription_plan, "employer profile fetched");
        Ok(profile)
    }

    async fn update_details(
        &self,
        bearer: &str,
        current: &EmployerProfile,
        details: &ProfileDetails,
    ) -> Result<EmployerProfile, SessionError> {
        details.validate()?;
        let body = serde_json::to_value(details).map_err(|e| ApiError::Decode(e.to_string()))?;
        let request = ApiRequest::put(UPDATE_PATH, body).with_bearer(Some(bearer));
        let response = self.transport.send(request).await?.into_result()?;
        let updated = apply_details(current, details, response.body.as_ref())
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        info!(employer = %updated.id, "employer profile updated");
        Ok(updated)
    }
}
