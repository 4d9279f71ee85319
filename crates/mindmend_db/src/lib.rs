//! SQL storage for MindMend schedules
//!
//! Availability windows and unavailability records live in two tables and are
//! served through the store ports from `mindmend-common`, so the slot
//! calculator never sees SQL. SQLx's `Any` driver keeps the crate database
//! agnostic; pick the backend with a feature flag:
//!
//! ```toml
//! [dependencies]
//! mindmend-db = { version = "0.1.0", features = ["postgres"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use mindmend_db::{DbClient, SqlScheduleRepository};
//!
//! async fn setup() -> Result<SqlScheduleRepository, mindmend_db::DbError> {
//!     let client = DbClient::from_url("sqlite://data/mindmend.db").await?;
//!     let repository = SqlScheduleRepository::new(client);
//!     repository.init_schema().await?;
//!     Ok(repository)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::{DbBackend, DbClient};
pub use error::DbError;
pub use repositories::SqlScheduleRepository;
