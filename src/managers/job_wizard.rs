//! Post-job wizard.
//!
//! Three steps: job details, application process, review. `next` validates
//! the step being left; `submit` re-validates everything and posts the draft
//! as the signed-in employer. One idempotency key covers every retry of a
//! draft and is renewed only when the wizard resets after a successful post.

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::transport::{ApiRequest, Transport};
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::types::errors::WizardError;
use crate::types::job::JobDraft;
use crate::types::user::Role;

pub const FIRST_STEP: u8 = 1;
pub const REVIEW_STEP: u8 = 3;

const POST_JOB_PATH: &str = "job/postJob";
const DEFAULT_SUCCESS: &str = "Your job has been posted successfully.";
const DEFAULT_FAILURE: &str = "Failed to post job.";

/// Wizard state: current step and the draft being edited.
pub struct JobWizard {
    step: u8,
    draft: JobDraft,
    idempotency_key: String,
}

impl Default for JobWizard {
    fn default() -> Self {
        Self::new()
    }
}

fn required(value: &str, field: &'static str) -> Result<(), WizardError> {
    if value.trim().is_empty() {
        return Err(WizardError::MissingField(field));
    }
    Ok(())
}

fn parse_amount(raw: &str) -> Result<Option<f64>, WizardError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(Some)
        .ok_or_else(|| WizardError::InvalidSalaryRange(format!("'{}' is not an amount", raw)))
}

/// Checks the fields owned by `step`.
pub fn validate_step(draft: &JobDraft, step: u8) -> Result<(), WizardError> {
    match step {
        1 => {
            required(&draft.title, "title")?;
            required(&draft.company, "company")?;
            required(&draft.description, "description")?;
            required(&draft.location, "location")?;
            required(&draft.employment_type, "employmentType")?;
            required(&draft.category, "category")?;
            let min = parse_amount(&draft.salary_range.min)?;
            let max = parse_amount(&draft.salary_range.max)?;
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(WizardError::InvalidSalaryRange(format!(
                        "minimum {} exceeds maximum {}",
                        min, max
                    )));
                }
            }
            Ok(())
        }
        2 => required(&draft.application_instructions, "applicationInstructions"),
        _ => Ok(()),
    }
}

impl JobWizard {
    pub fn new() -> Self {
        Self {
            step: FIRST_STEP,
            draft: JobDraft::default(),
            idempotency_key: Uuid::new_v4().to_string(),
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn draft(&self) -> &JobDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut JobDraft {
        &mut self.draft
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    /// Overwrites draft fields from a JSON object of camelCase keys.
    pub fn update(&mut self, fields: &Value) -> Result<(), WizardError> {
        let mut current =
            serde_json::to_value(&self.draft).map_err(|e| WizardError::InvalidField(e.to_string()))?;
        match (&mut current, fields) {
            (Value::Object(target), Value::Object(changes)) => {
                for (key, value) in changes {
                    if !target.contains_key(key) {
                        return Err(WizardError::InvalidField(format!("unknown field '{}'", key)));
                    }
                    target.insert(key.clone(), value.clone());
                }
            }
            _ => return Err(WizardError::InvalidField("expected an object of fields".to_string())),
        }
        self.draft = serde_json::from_value(current).map_err(|e| WizardError::InvalidField(e.to_string()))?;
        Ok(())
    }

    /// Validates the current step and advances; stays put on the review step.
    pub fn next(&mut self) -> Result<u8, WizardError> {
        validate_step(&self.draft, self.step)?;
        self.step = (self.step + 1).min(REVIEW_STEP);
        Ok(self.step)
    }

    /// Goes back one step; stays put on the first step.
    pub fn back(&mut self) -> u8 {
        self.step = self.step.saturating_sub(1).max(FIRST_STEP);
        self.step
    }

    /// Discards the draft and starts over with a fresh idempotency key.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Posts the draft as the signed-in employer.
    ///
    /// Returns the server's confirmation message. The wizard resets only on
    /// `201 Created`; on any failure the draft and step are kept for a retry.
    pub async fn submit(&mut self, transport: &dyn Transport, sessions: &SessionManager) -> Result<String, WizardError> {
        if self.step != REVIEW_STEP {
            return Err(WizardError::NotOnReviewStep(self.step));
        }
        let session = sessions.require_role(Role::Employer)?;
        validate_step(&self.draft, 1)?;
        validate_step(&self.draft, 2)?;

        let body = serde_json::to_value(&self.draft).map_err(|e| WizardError::InvalidField(e.to_string()))?;
        let request = ApiRequest::post(POST_JOB_PATH, body)
            .with_bearer(Some(session.bearer()))
            .with_idempotency_key(self.idempotency_key.clone());
        let response = transport.send(request).await?;

        let server_message = |key: &str| {
            response
                .body
                .as_ref()
                .and_then(|b| b.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        if !response.is_success() {
            let message = server_message("error").unwrap_or_else(|| DEFAULT_FAILURE.to_string());
            warn!(status = response.status, error = %message, "job posting rejected");
            return Err(WizardError::Rejected(message));
        }

        let message = server_message("message").unwrap_or_else(|| DEFAULT_SUCCESS.to_string());
        if response.status == 201 {
            info!(title = %self.draft.title, "job posted");
            self.reset();
        }
        Ok(message)
    }
}
