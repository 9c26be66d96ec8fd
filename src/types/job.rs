use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId};

/// Salary bounds in whole currency units.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

/// A job listing as shown to job seekers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub salary_range: SalaryRange,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Record for Job {
    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "company" => Some(&self.company),
            "location" => Some(&self.location),
            "employmentType" | "employment_type" => Some(&self.employment_type),
            "description" => Some(&self.description),
            "category" => self.category.as_deref(),
            _ => None,
        }
    }
}

/// Where the work happens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WorkplaceType {
    #[serde(rename = "On-site")]
    OnSite,
    Remote,
    Hybrid,
}

/// Contracted hours.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WorkHours {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
}

/// A job as listed on the employer and admin boards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployerJob {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub workplace_type: Option<WorkplaceType>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub work_hours: Option<WorkHours>,
}

impl Record for EmployerJob {
    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            "location" => Some(&self.location),
            "salary" => self.salary.as_deref(),
            _ => None,
        }
    }
}

/// Salary bounds as typed into the posting form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SalaryDraft {
    pub min: String,
    pub max: String,
}

/// A job posting being composed in the post-job wizard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub location: String,
    pub salary_range: SalaryDraft,
    pub employment_type: String,
    pub application_deadline: String,
    pub application_instructions: String,
    pub required_documents: Vec<String>,
    pub status: String,
    pub category: String,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            description: String::new(),
            requirements: Vec::new(),
            location: String::new(),
            salary_range: SalaryDraft::default(),
            employment_type: String::new(),
            application_deadline: String::new(),
            application_instructions: String::new(),
            required_documents: Vec::new(),
            status: "draft".to_string(),
            category: String::new(),
        }
    }
}

/// Formats a salary amount in thousands, e.g. `45000` → `45k`.
pub fn format_salary(amount: f64) -> String {
    format!("{:.0}k", amount / 1000.0)
}

/// Human-readable age of a posting relative to `now`, e.g. `3 days`.
///
/// Returns `None` when the timestamp is not RFC 3339.
pub fn posted_ago(created_at: &str, now: DateTime<Utc>) -> Option<String> {
    let created = DateTime::parse_from_rfc3339(created_at).ok()?.with_timezone(&Utc);
    let delta = now.signed_duration_since(created);

    let minutes = delta.num_minutes().max(0);
    let text = if minutes < 1 {
        "less than a minute".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if minutes < 60 * 24 {
        plural(delta.num_hours(), "hour")
    } else if delta.num_days() < 30 {
        plural(delta.num_days(), "day")
    } else if delta.num_days() < 365 {
        plural(delta.num_days() / 30, "month")
    } else {
        plural(delta.num_days() / 365, "year")
    };
    Some(text)
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
