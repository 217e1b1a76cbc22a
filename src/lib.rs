// Caredesk - Clinical Workstation Session Orchestrator
// Copyright (c) 2025 Caredesk Contributors
// Licensed under the MIT License

//! # Caredesk - clinical workstation session orchestrator
//!
//! Caredesk coordinates the independent panels of a clinical workstation:
//! which patient, encounter, pre-authorization and job the user is working on,
//! how panels learn about each other's selections, when a panel has enough
//! context to mount, and how long-running server jobs are followed to the end.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Shared context, event bus, job polling, module gating, pages
//! - [`adapters`] - Remote API client and durable key-value storage
//! - [`domain`] - Identifiers, job and pre-authorization views, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use caredesk::config::load_config_or_default;
//! use caredesk::core::context::Transition;
//! use caredesk::core::modules::ModuleRegistry;
//! use caredesk::core::pages::{Page, PageState};
//! use caredesk::core::session::Session;
//! use caredesk::domain::EntityId;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("caredesk.toml")?;
//! let session = Session::open(&config, ModuleRegistry::bundled()?)?;
//!
//! session.dispatch(Transition::SetPatient(Some(EntityId::new("pat-1")?)));
//!
//! let mut state = PageState::default();
//! for outcome in session.render_page(Page::Workspace, &mut state) {
//!     if let Some(placeholder) = outcome.placeholder() {
//!         println!("{placeholder}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Shared context
//!
//! The context only changes through transitions. Selecting a different patient
//! clears the encounter, pre-authorization and job, so nothing from the
//! previous patient leaks into the next one. Every change is persisted and
//! announced to subscribers after it has been applied.
//!
//! ## Job tracking
//!
//! [`core::polling::JobPoller`] polls a job until it is terminal. Sessions are
//! cancelled by dropping or cancelling their handle; once cancellation returns,
//! no further callback runs.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
