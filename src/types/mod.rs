// Jobboard shared type definitions
// Each submodule defines types used across the client core.

pub mod blog;
pub mod errors;
pub mod job;
pub mod payment;
pub mod record;
pub mod session;
pub mod settings;
pub mod user;
pub mod view;
