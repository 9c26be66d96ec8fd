use thiserror::Error;

// === ApiError ===

/// Errors returned by every network-calling function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request could not complete (connection refused, timeout, DNS).
    #[error("Transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("Server returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns the HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// === ViewError ===

/// Errors related to collection view operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The underlying request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The view was closed before the operation completed.
    #[error("View is closed: {0}")]
    Closed(String),
    /// The requested view does not exist.
    #[error("Unknown view: {0}")]
    UnknownView(String),
    /// The record the operation targets is not loaded.
    #[error("Record not found: {0}")]
    MissingRecord(String),
    /// Persisting view-owned preferences failed.
    #[error(transparent)]
    Preference(#[from] PreferenceError),
    /// The view requires a session the user does not have.
    #[error(transparent)]
    Session(#[from] SessionError),
}

// === PreferenceError ===

/// Errors related to the local preference cache.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The backing store failed.
    #[error("Preference storage error: {0}")]
    Storage(String),
    /// A stored value could not be serialized or deserialized.
    #[error("Preference serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for PreferenceError {
    fn from(e: rusqlite::Error) -> Self {
        PreferenceError::Storage(e.to_string())
    }
}

// === SessionError ===

/// Errors related to authentication and the session context.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No user is signed in.
    #[error("Not authenticated")]
    NotAuthenticated,
    /// The signed-in user does not have the required role.
    #[error("Forbidden: requires role {required}, signed in as {actual}")]
    Forbidden { required: String, actual: String },
    /// Client-side validation rejected the submitted form.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The auth endpoint failed.
    #[error("Auth request failed: {0}")]
    Api(#[from] ApiError),
    /// The session could not be persisted or restored.
    #[error("Session storage error: {0}")]
    Preference(#[from] PreferenceError),
}

// === PaymentError ===

/// Errors related to payment processing.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The amount is zero, negative or not finite.
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(f64),
    /// The mobile-money phone number is missing or malformed.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
    /// The selected plan does not exist or cannot be billed this way.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
    /// The provider declined or could not process the payment.
    #[error("Payment declined: {0}")]
    Declined(String),
    /// A signed-in session with a token is required.
    #[error("Payment requires an authenticated session")]
    Unauthenticated,
    /// The payment endpoint failed.
    #[error("Payment request failed: {0}")]
    Api(#[from] ApiError),
}

// === WizardError ===

/// Errors related to the job posting wizard.
#[derive(Debug, Error)]
pub enum WizardError {
    /// A required field for the current step is empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// A draft update did not fit the posting's fields.
    #[error("Invalid field value: {0}")]
    InvalidField(String),
    /// The salary range is not a valid pair of amounts.
    #[error("Invalid salary range: {0}")]
    InvalidSalaryRange(String),
    /// Submitting before reaching the review step.
    #[error("Cannot submit from step {0}")]
    NotOnReviewStep(u8),
    /// The server rejected the posting; carries its message when it sent one.
    #[error("Job posting rejected: {0}")]
    Rejected(String),
    /// The posting request failed.
    #[error("Job posting request failed: {0}")]
    Api(#[from] ApiError),
    /// Posting requires an authenticated employer.
    #[error(transparent)]
    Session(#[from] SessionError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
