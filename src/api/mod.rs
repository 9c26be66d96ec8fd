//! Jobboard REST layer.
//!
//! [`Transport`] is the seam to the backend services; [`ResourceClient`]
//! gives typed CRUD over one resource on top of it.

pub mod client;
#[cfg(feature = "network")]
pub mod http;
pub mod memory;
pub mod transport;

pub use client::ResourceClient;
#[cfg(feature = "network")]
pub use http::HttpTransport;
pub use memory::MemoryTransport;
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
