//! Session Manager for the jobboard client.
//!
//! Holds the signed-in user's [`Session`] and, for employers, their company
//! profile. The session is mirrored to the preference store so a restarted
//! client comes back signed in. The employer profile is never persisted; it
//! is fetched from `/employer/profile` after an employer logs in or whenever
//! the client asks for it again.

use std::sync::Arc;

use tracing::{info, warn};

use crate::services::preference_store::{read_json, write_json, PreferenceStore};
use crate::types::errors::{PreferenceError, SessionError};
use crate::types::session::Session;
use crate::types::user::{EmployerProfile, Role};

/// Preference key of the persisted session.
pub const SESSION_KEY: &str = "auth.session";

/// Trait defining session context operations.
pub trait SessionManagerTrait {
    fn start(&mut self, session: Session) -> Result<(), SessionError>;
    fn current(&self) -> Option<&Session>;
    fn require(&self) -> Result<&Session, SessionError>;
    fn require_role(&self, role: Role) -> Result<&Session, SessionError>;
    fn logout(&mut self) -> Result<(), SessionError>;
    fn restore(&mut self) -> Result<bool, SessionError>;
}

/// Session context backed by a preference store.
pub struct SessionManager {
    store: Arc<dyn PreferenceStore>,
    session: Option<Session>,
    employer: Option<EmployerProfile>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            session: None,
            employer: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Bearer token of the current session, if any.
    pub fn token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.bearer().to_string())
    }

    pub fn employer_profile(&self) -> Option<&EmployerProfile> {
        self.employer.as_ref()
    }

    /// Stores the company profile; only an employer session may carry one.
    pub fn set_employer_profile(&mut self, profile: EmployerProfile) -> Result<(), SessionError> {
        self.require_role(Role::Employer)?;
        self.employer = Some(profile);
        Ok(())
    }

    pub fn clear_employer_profile(&mut self) {
        self.employer = None;
    }
}

impl SessionManagerTrait for SessionManager {
    /// Signs a user in, replacing any previous session.
    fn start(&mut self, session: Session) -> Result<(), SessionError> {
        write_json(self.store.as_ref(), SESSION_KEY, &session)?;
        info!(user = %session.user_id, role = %session.role, "session started");
        self.employer = None;
        self.session = Some(session);
        Ok(())
    }

    fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn require(&self) -> Result<&Session, SessionError> {
        self.session.as_ref().ok_or(SessionError::NotAuthenticated)
    }

    /// Admits only a session whose role is exactly `role`.
    fn require_role(&self, role: Role) -> Result<&Session, SessionError> {
        let session = self.require()?;
        if session.role != role {
            return Err(SessionError::Forbidden {
                required: role.to_string(),
                actual: session.role.to_string(),
            });
        }
        Ok(session)
    }

    fn logout(&mut self) -> Result<(), SessionError> {
        self.session = None;
        self.employer = None;
        self.store.remove(SESSION_KEY)?;
        info!("session ended");
        Ok(())
    }

    /// Loads a persisted session. Returns whether one was found.
    ///
    /// A corrupt entry is removed and reported as no session.
    fn restore(&mut self) -> Result<bool, SessionError> {
        match read_json::<Session>(self.store.as_ref(), SESSION_KEY) {
            Ok(Some(session)) => {
                info!(user = %session.user_id, "session restored");
                self.session = Some(session);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(PreferenceError::Serialization(msg)) => {
                warn!(error = %msg, "dropping unreadable session");
                self.store.remove(SESSION_KEY)?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
