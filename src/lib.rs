//! # temporal-provider
//!
//! Declarative management of Temporal namespaces and schedules.
//!
//! ## Overview
//!
//! `temporal-provider` turns resource configuration into calls against a
//! Temporal server. Its core is the schedule spec grammar: cron-style strings
//! (`CRON_TZ=`, 5/6/7 fields, `@daily`, `@every 1h/15m`) are compiled into
//! structured calendar and interval specs before they are sent.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use temporal_provider::{ProviderConfig, Resource, ScheduleModel, StartWorkflowModel, TemporalProvider};
//! use temporal_provider::client::memory::MemoryClient;
//!
//! # async fn example() -> temporal_provider::Result<()> {
//! let mut provider = TemporalProvider::new("0.1.0");
//! provider.configure(
//!     &ProviderConfig::default().with_hostport("localhost:7233"),
//!     Arc::new(MemoryClient::new()),
//! )?;
//!
//! let schedules = provider.schedule_resource()?;
//! let config = ScheduleModel::new("nightly", StartWorkflowModel::new("Report", "reports"))
//!     .with_crons(["CRON_TZ=Europe/Berlin 0 2 * * *"]);
//! let plan = schedules.plan(config, None)?;
//! let state = schedules.create(&plan.planned).await?;
//!
//! println!("Created: {}", state.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **spec** - cron/interval string parser and structured spec types
//! - **duration** - duration strings (`1h30m`, `1.5s`, `2d`) and canonical form
//! - **TemporalClient** trait - the only way resources reach the server
//! - **model** - nullable resource models with an explicit defaulting pass
//! - **Resource** / **DataSource** traits - plan and CRUD lifecycle
//! - **TemporalProvider** - configuration and resource factory

pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod model;
pub mod provider;
pub mod resource;
pub mod spec;

// Re-export core types
pub use client::{OverlapPolicy, ScheduleDefinition, TemporalClient};
pub use config::{ProviderConfig, ResolvedConfig};
pub use duration::{format_duration, parse_duration};
pub use error::{ProviderError, Result};
pub use model::{NamespaceModel, ScheduleModel, StartWorkflowModel};
pub use provider::TemporalProvider;
pub use resource::{DataSource, Plan, Resource};
pub use spec::{parse_spec, CalendarSpec, IntervalSpec, ParsedSpec, ScheduleRange, SpecKind};

// Re-export the in-memory client for convenience
pub use client::memory::MemoryClient;
