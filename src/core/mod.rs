//! Core orchestration for Caredesk.
//!
//! # Modules
//!
//! - [`context`] - Shared session context, transitions and persistence
//! - [`events`] - Cross-module event bus and its bridge into the context
//! - [`polling`] - Job status polling with cancellation
//! - [`modules`] - Module catalogue, capability gating and mounting
//! - [`pages`] - Page composition and output handling
//! - [`session`] - Per-user bundle of the services above
//! - [`workflow`] - Pre-authorization submission flows
//!
//! # Example
//!
//! ```rust,no_run
//! use caredesk::config::load_config;
//! use caredesk::core::modules::ModuleRegistry;
//! use caredesk::core::session::Session;
//! use caredesk::core::workflow::submit_and_track;
//! use caredesk::domain::EntityId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("caredesk.toml")?;
//! let session = Session::open(&config, ModuleRegistry::bundled()?)?;
//!
//! let report = submit_and_track(&session, &EntityId::new("pa-1")?, |job| {
//!     println!("{} {}%", job.status, job.progress);
//! })
//! .await?;
//!
//! println!("job {} finished: {}", report.job_id, report.succeeded());
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod events;
pub mod modules;
pub mod pages;
pub mod polling;
pub mod session;
pub mod workflow;
