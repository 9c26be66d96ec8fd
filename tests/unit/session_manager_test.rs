//! Tests for the session context: start, role checks, logout and restore.

use std::sync::Arc;

use jobboard::managers::session_manager::{SessionManager, SessionManagerTrait, SESSION_KEY};
use jobboard::services::preference_store::{MemoryPreferenceStore, PreferenceStore};
use jobboard::types::errors::SessionError;
use jobboard::types::session::Session;
use jobboard::types::user::{EmployerProfile, Role};
use rstest::rstest;

fn session(role: Role) -> Session {
    Session {
        user_id: "42".to_string(),
        role,
        token: "tok-123".to_string(),
        name: "Ann".to_string(),
        email: "ann@example.test".to_string(),
    }
}

fn profile() -> EmployerProfile {
    serde_json::from_value(serde_json::json!({
        "id": "e1",
        "name": "Acme",
        "email": "hr@acme.test",
        "subscriptionPlan": "Starter",
        "jobPostQuota": 20
    }))
    .unwrap()
}

#[test]
fn test_no_session_initially() {
    let sessions = SessionManager::new(Arc::new(MemoryPreferenceStore::new()));
    assert!(!sessions.is_authenticated());
    assert!(sessions.token().is_none());
    assert!(matches!(sessions.require(), Err(SessionError::NotAuthenticated)));
}

#[rstest]
#[case(Role::Employer, Role::Employer, true)]
#[case(Role::Admin, Role::Admin, true)]
#[case(Role::Jobseeker, Role::Employer, false)]
#[case(Role::Admin, Role::Employer, false)]
fn test_require_role_is_exact(#[case] actual: Role, #[case] required: Role, #[case] allowed: bool) {
    let mut sessions = SessionManager::new(Arc::new(MemoryPreferenceStore::new()));
    sessions.start(session(actual)).unwrap();
    assert_eq!(sessions.require_role(required).is_ok(), allowed);
}

#[test]
fn test_session_is_restored_from_store() {
    let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
    {
        let mut sessions = SessionManager::new(store.clone());
        sessions.start(session(Role::Employer)).unwrap();
    }
    let mut restored = SessionManager::new(store);
    assert!(restored.restore().unwrap());
    assert_eq!(restored.token().as_deref(), Some("tok-123"));
    assert_eq!(restored.current().unwrap().role, Role::Employer);
}

#[test]
fn test_logout_forgets_session_and_store_entry() {
    let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
    let mut sessions = SessionManager::new(store.clone());
    sessions.start(session(Role::Employer)).unwrap();
    sessions.set_employer_profile(profile()).unwrap();

    sessions.logout().unwrap();
    assert!(sessions.current().is_none());
    assert!(sessions.employer_profile().is_none());
    assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    assert!(!SessionManager::new(store).restore().unwrap());
}

#[test]
fn test_corrupt_session_is_dropped() {
    let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
    store.set(SESSION_KEY, "{\"user_id\": 1").unwrap();
    let mut sessions = SessionManager::new(store.clone());
    assert!(!sessions.restore().unwrap());
    assert_eq!(store.get(SESSION_KEY).unwrap(), None);
}

#[test]
fn test_employer_profile_requires_employer() {
    let mut sessions = SessionManager::new(Arc::new(MemoryPreferenceStore::new()));
    sessions.start(session(Role::Jobseeker)).unwrap();
    assert!(matches!(
        sessions.set_employer_profile(profile()),
        Err(SessionError::Forbidden { .. })
    ));

    sessions.start(session(Role::Employer)).unwrap();
    sessions.set_employer_profile(profile()).unwrap();
    assert_eq!(sessions.employer_profile().unwrap().job_post_quota, 20);
}

#[test]
fn test_debug_output_redacts_token() {
    let debug = format!("{:?}", session(Role::Admin));
    assert!(!debug.contains("tok-123"));
    assert!(debug.contains("<redacted>"));
}
