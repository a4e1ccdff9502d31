//! Read-only data sources

use super::remote_error;
use crate::client::TemporalClient;
use crate::error::Result;
use crate::model::NamespaceModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A read-only lookup of remote state
#[async_trait]
pub trait DataSource: Send + Sync {
    type Model: Send + Sync;

    /// Data source type name (e.g., "temporal_schedule")
    fn type_name(&self) -> &'static str;

    /// Look up the entity named by `config` and fill in its attributes
    async fn read(&self, config: &Self::Model) -> Result<Self::Model>;
}

/// Namespace lookup by name
pub struct NamespaceDataSource {
    client: Arc<dyn TemporalClient>,
}

impl NamespaceDataSource {
    pub fn new(client: Arc<dyn TemporalClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for NamespaceDataSource {
    type Model = NamespaceModel;

    fn type_name(&self) -> &'static str {
        "temporal_namespace"
    }

    async fn read(&self, config: &NamespaceModel) -> Result<NamespaceModel> {
        let desc = self
            .client
            .describe_namespace(&config.name)
            .await
            .map_err(|e| {
                remote_error(e, "read", &format!("data.temporal_namespace '{}'", config.name))
            })?;
        Ok(NamespaceModel::from_description(&desc))
    }
}

/// `data.temporal_schedule` attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDataSourceModel {
    pub id: String,
    /// Full schedule description as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl ScheduleDataSourceModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: None,
        }
    }
}

/// Schedule lookup by id in the provider's namespace
pub struct ScheduleDataSource {
    client: Arc<dyn TemporalClient>,
    namespace: String,
}

impl ScheduleDataSource {
    pub fn new(client: Arc<dyn TemporalClient>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl DataSource for ScheduleDataSource {
    type Model = ScheduleDataSourceModel;

    fn type_name(&self) -> &'static str {
        "temporal_schedule"
    }

    async fn read(&self, config: &ScheduleDataSourceModel) -> Result<ScheduleDataSourceModel> {
        let desc = self
            .client
            .describe_schedule(&self.namespace, &config.id)
            .await
            .map_err(|e| {
                remote_error(
                    e,
                    "read",
                    &format!(
                        "data.temporal_schedule '{}' in namespace '{}'",
                        config.id, self.namespace
                    ),
                )
            })?;
        tracing::debug!(schedule = %config.id, "Read schedule description");

        Ok(ScheduleDataSourceModel {
            id: desc.id.clone(),
            desc: Some(serde_json::to_string(&desc)?),
        })
    }
}
