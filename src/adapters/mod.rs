//! External system integrations for Caredesk.
//!
//! - [`api`] - HTTP client for the clinical-record and job API
//! - [`storage`] - Durable key-value storage for session state
//!
//! # Design Pattern
//!
//! Adapters isolate third-party crates behind small traits
//! ([`api::JobStatusSource`], [`storage::ContextStorage`]) so the orchestration
//! core can be exercised with in-memory implementations.
//!
//! ```rust,no_run
//! use caredesk::adapters::api::ApiClient;
//! use caredesk::adapters::storage::{ContextStorage, JsonFileStorage};
//! use caredesk::config::CaredeskConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CaredeskConfig::default();
//! let client = ApiClient::new(&config.api)?;
//! let storage = JsonFileStorage::new(&config.session.storage_path);
//! let saved = storage.load(&config.session.storage_key)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod storage;
