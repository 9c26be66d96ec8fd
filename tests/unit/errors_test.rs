//! Display and conversion tests for the jobboard error types.

use jobboard::types::errors::*;

// === ApiError Tests ===

#[test]
fn api_error_display_variants() {
    assert_eq!(
        ApiError::Transport("connection refused".to_string()).to_string(),
        "Transport error: connection refused"
    );
    assert_eq!(
        ApiError::Status { status: 404, message: "job not found".to_string() }.to_string(),
        "Server returned status 404: job not found"
    );
    assert_eq!(
        ApiError::Decode("expected array".to_string()).to_string(),
        "Malformed response: expected array"
    );
}

#[test]
fn api_error_status_only_for_status_variant() {
    assert_eq!(ApiError::Status { status: 500, message: String::new() }.status(), Some(500));
    assert_eq!(ApiError::Transport("x".to_string()).status(), None);
}

// === ViewError Tests ===

#[test]
fn view_error_is_transparent_over_api_error() {
    let err: ViewError = ApiError::Decode("bad body".to_string()).into();
    assert_eq!(err.to_string(), "Malformed response: bad body");
    assert!(matches!(err, ViewError::Api(_)));
}

#[test]
fn view_error_display_variants() {
    assert_eq!(ViewError::Closed("jobs".to_string()).to_string(), "View is closed: jobs");
    assert_eq!(ViewError::UnknownView("x".to_string()).to_string(), "Unknown view: x");
    assert_eq!(ViewError::MissingRecord("job 7".to_string()).to_string(), "Record not found: job 7");
}

#[test]
fn view_error_wraps_session_error() {
    let err: ViewError = SessionError::NotAuthenticated.into();
    assert_eq!(err.to_string(), "Not authenticated");
}

// === SessionError Tests ===

#[test]
fn session_error_forbidden_names_both_roles() {
    let err = SessionError::Forbidden {
        required: "admin".to_string(),
        actual: "jobseeker".to_string(),
    };
    assert_eq!(err.to_string(), "Forbidden: requires role admin, signed in as jobseeker");
}

#[test]
fn session_error_from_preference_error() {
    let err: SessionError = PreferenceError::Storage("disk full".to_string()).into();
    assert_eq!(err.to_string(), "Session storage error: Preference storage error: disk full");
}

// === PaymentError Tests ===

#[test]
fn payment_error_display_variants() {
    assert_eq!(PaymentError::InvalidAmount(-1.0).to_string(), "Invalid payment amount: -1");
    assert_eq!(
        PaymentError::InvalidPhone("123".to_string()).to_string(),
        "Invalid phone number: 123"
    );
    assert_eq!(PaymentError::Unauthenticated.to_string(), "Payment requires an authenticated session");
}

// === WizardError Tests ===

#[test]
fn wizard_error_display_variants() {
    assert_eq!(WizardError::MissingField("title").to_string(), "Missing required field: title");
    assert_eq!(WizardError::NotOnReviewStep(2).to_string(), "Cannot submit from step 2");
    assert_eq!(
        WizardError::Rejected("quota exhausted".to_string()).to_string(),
        "Job posting rejected: quota exhausted"
    );
}

// === PreferenceError / SettingsError Tests ===

#[test]
fn preference_error_from_rusqlite() {
    let err: PreferenceError = rusqlite::Error::InvalidQuery.into();
    assert!(matches!(err, PreferenceError::Storage(_)));
}

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("nope".to_string()).to_string(),
        "Invalid settings key: nope"
    );
    assert_eq!(
        SettingsError::IoError("denied".to_string()).to_string(),
        "Settings I/O error: denied"
    );
}

#[test]
fn errors_implement_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(ViewError::Closed("jobs".to_string()));
    assert!(err.source().is_none());
}
