//! Jobboard database layer: SQLite connection and schema migrations.
//!
//! ```no_run
//! use jobboard::database::Database;
//!
//! let db = Database::open("preferences.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
