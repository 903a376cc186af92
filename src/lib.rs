//! # Tool Orchestrator
//!
//! Control plane for a curated catalog of containerized developer tools.
//!
//! ## Features
//!
//! - **Catalog**: service definitions persisted in SQLite, seeded with a built-in tool set
//! - **Lifecycle**: start, stop and restart one container per service (`orch_<id>`)
//! - **Resolved status**: live runtime state merged with the last recorded operation
//! - **Events**: lifecycle changes pushed to WebSocket subscribers
//! - **HTTP API**: axum router over all of the above
//!
//! ## Quick Start
//!
//! ```no_run
//! use tool_orchestrator::{Orchestrator, Settings};
//!
//! # async fn example() -> tool_orchestrator::Result<()> {
//! let orchestrator = Orchestrator::builder()
//!     .settings(Settings::from_env()?)
//!     .build()
//!     .await?;
//!
//! let handle = orchestrator.start_container("grist").await?;
//! println!("started {}", handle.id);
//!
//! orchestrator.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! - All operations take `&self`; share the orchestrator behind an `Arc`
//! - Start, stop and restart for the same service are serialized by a per-service lock
//! - Every runtime call is bounded by a timeout
//! - Event delivery never blocks the operation that caused it

#![allow(unused_assignments)]

pub mod api;
pub mod catalog;
pub mod config;
pub mod docker;
pub mod error;
pub mod events;
pub mod healthcheck;
pub mod orchestrator;
pub mod runtime;
pub mod state;

pub use catalog::{NewService, ServiceDefinition};
pub use config::Settings;
pub use error::{Error, Result};
pub use events::{EventBroadcaster, LifecycleEvent};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, ResolvedStatus};
pub use runtime::{ContainerStats, RuntimeGateway};
pub use state::Store;
