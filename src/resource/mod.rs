//! Managed resources and data sources
//!
//! A resource goes through `plan` (pure: defaults, validation, replacement
//! detection) and then the async CRUD calls, which delegate to a
//! [`TemporalClient`](crate::client::TemporalClient).

mod data_source;
mod namespace;
mod schedule;

pub use data_source::{
    DataSource, NamespaceDataSource, ScheduleDataSource, ScheduleDataSourceModel,
};
pub use namespace::NamespaceResource;
pub use schedule::ScheduleResource;

use crate::error::{ProviderError, Result};
use async_trait::async_trait;

/// Outcome of planning a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan<M> {
    /// Configuration with defaults and carried-forward values applied
    pub planned: M,
    /// Attributes whose change forces destroy-then-create
    pub replace: Vec<&'static str>,
    /// Whether `planned` differs from the prior state
    pub changed: bool,
}

impl<M> Plan<M> {
    pub fn requires_replace(&self) -> bool {
        !self.replace.is_empty()
    }
}

/// Lifecycle of a managed resource
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Clone + PartialEq + Send + Sync;

    /// Resource type name (e.g., "temporal_namespace")
    fn type_name(&self) -> &'static str;

    /// Compute the planned state from configuration and prior state
    fn plan(
        &self,
        config: Self::Model,
        prior: Option<&Self::Model>,
    ) -> Result<Plan<Self::Model>>;

    /// Create the remote entity and return the resulting state
    async fn create(&self, planned: &Self::Model) -> Result<Self::Model>;

    /// Refresh state; `None` means the entity is gone
    async fn read(&self, state: &Self::Model) -> Result<Option<Self::Model>>;

    /// Apply an in-place update
    async fn update(&self, planned: &Self::Model, prior: &Self::Model) -> Result<Self::Model>;

    /// Delete the remote entity. Deleting something already gone succeeds.
    async fn delete(&self, state: &Self::Model) -> Result<()>;

    /// Adopt an existing remote entity by its id
    async fn import(&self, id: &str) -> Result<Self::Model>;
}

/// Shared planning flow: carry forward, default, validate, diff
pub(crate) fn plan_with<M, F>(
    mut planned: M,
    prior: Option<&M>,
    carry_forward: impl FnOnce(&mut M, &M),
    finish: F,
    replace_on: impl Fn(&M, &M) -> Vec<&'static str>,
) -> Result<Plan<M>>
where
    M: Clone + PartialEq,
    F: FnOnce(&mut M) -> Result<()>,
{
    if let Some(prior) = prior {
        carry_forward(&mut planned, prior);
    }
    finish(&mut planned)?;

    let (replace, changed) = match prior {
        Some(prior) => (replace_on(prior, &planned), *prior != planned),
        None => (Vec::new(), true),
    };

    Ok(Plan {
        planned,
        replace,
        changed,
    })
}

/// Name the failed operation and entity in a remote error
pub(crate) fn remote_error(err: ProviderError, operation: &str, entity: &str) -> ProviderError {
    match err {
        ProviderError::NotFound(msg) => {
            ProviderError::NotFound(format!("{} {}: {}", operation, entity, msg))
        }
        ProviderError::AlreadyExists(msg) => {
            ProviderError::AlreadyExists(format!("{} {}: {}", operation, entity, msg))
        }
        ProviderError::Client(msg) => {
            ProviderError::Client(format!("{} {}: {}", operation, entity, msg))
        }
        other => other,
    }
}
