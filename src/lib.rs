//! Jobboard: client core for a job board.
//!
//! Remote collections (jobs, blog posts, admin items) are fetched into
//! [`managers::collection_view::CollectionView`]s that filter and paginate
//! locally and dispatch edits back to the server. Around them sit the session
//! context, bookmark sets, the post-job wizard and the payment services.
//!
//! This library crate exposes all modules for use by the binaries and
//! integration tests.

pub mod api;
pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
