// Jobboard services
// Services talk to the outside world: auth, employer profile, payments, pricing, settings and the preference store.

pub mod auth_service;
pub mod employer_service;
pub mod payment_service;
pub mod preference_store;
pub mod pricing;
pub mod settings_engine;
