use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId};

/// Role of a signed-in user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Jobseeker,
    Employer,
    Admin,
}

impl Role {
    /// Parses a role name case-insensitively (`EMPLOYER`, `employer`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "jobseeker" => Some(Role::Jobseeker),
            "employer" => Some(Role::Employer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Jobseeker => "jobseeker",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account data returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub subscription_plan: Option<String>,
    #[serde(default)]
    pub job_post_quota: Option<i64>,
    #[serde(default)]
    pub subscription_start_date: Option<String>,
    #[serde(default)]
    pub subscription_end_date: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

/// Company profile of a signed-in employer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subscription_plan: Option<String>,
    #[serde(default)]
    pub job_post_quota: i64,
    #[serde(default)]
    pub subscription_start_date: Option<String>,
    #[serde(default)]
    pub subscription_end_date: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub company_location: Option<String>,
}

/// A generic row on the admin back-office (users, employers, job seekers).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminItem {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Record for AdminItem {
    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}
