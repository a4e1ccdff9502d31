//! `temporal_namespace` resource

use super::{plan_with, remote_error, Plan, Resource};
use crate::client::TemporalClient;
use crate::error::Result;
use crate::model::NamespaceModel;
use async_trait::async_trait;
use std::sync::Arc;

pub struct NamespaceResource {
    client: Arc<dyn TemporalClient>,
}

impl NamespaceResource {
    pub fn new(client: Arc<dyn TemporalClient>) -> Self {
        Self { client }
    }

    async fn describe(&self, operation: &str, name: &str) -> Result<NamespaceModel> {
        let desc = self
            .client
            .describe_namespace(name)
            .await
            .map_err(|e| remote_error(e, operation, &entity(name)))?;
        Ok(NamespaceModel::from_description(&desc))
    }
}

fn entity(name: &str) -> String {
    format!("temporal_namespace '{}'", name)
}

#[async_trait]
impl Resource for NamespaceResource {
    type Model = NamespaceModel;

    fn type_name(&self) -> &'static str {
        "temporal_namespace"
    }

    fn plan(
        &self,
        config: NamespaceModel,
        prior: Option<&NamespaceModel>,
    ) -> Result<Plan<NamespaceModel>> {
        plan_with(
            config,
            prior,
            NamespaceModel::carry_forward,
            |planned| {
                planned.apply_defaults();
                planned.validate()
            },
            |prior, planned| {
                if prior.name != planned.name {
                    vec!["name"]
                } else {
                    Vec::new()
                }
            },
        )
    }

    async fn create(&self, planned: &NamespaceModel) -> Result<NamespaceModel> {
        self.client
            .register_namespace(&planned.to_registration())
            .await
            .map_err(|e| remote_error(e, "create", &entity(&planned.name)))?;
        tracing::info!(namespace = %planned.name, "Created namespace");

        self.describe("create", &planned.name).await
    }

    async fn read(&self, state: &NamespaceModel) -> Result<Option<NamespaceModel>> {
        match self.client.describe_namespace(&state.name).await {
            Ok(desc) => {
                let mut refreshed = state.clone();
                refreshed.refresh(&desc);
                Ok(Some(refreshed))
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(namespace = %state.name, "Namespace no longer exists");
                Ok(None)
            }
            Err(e) => Err(remote_error(e, "read", &entity(&state.name))),
        }
    }

    async fn update(
        &self,
        planned: &NamespaceModel,
        _prior: &NamespaceModel,
    ) -> Result<NamespaceModel> {
        self.client
            .update_namespace(&planned.to_update())
            .await
            .map_err(|e| remote_error(e, "update", &entity(&planned.name)))?;
        tracing::info!(namespace = %planned.name, "Updated namespace");

        self.describe("update", &planned.name).await
    }

    async fn delete(&self, state: &NamespaceModel) -> Result<()> {
        match self.client.delete_namespace(&state.name).await {
            Ok(()) => {
                tracing::info!(namespace = %state.name, "Deleted namespace");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(namespace = %state.name, "Namespace already deleted");
                Ok(())
            }
            Err(e) => Err(remote_error(e, "delete", &entity(&state.name))),
        }
    }

    async fn import(&self, id: &str) -> Result<NamespaceModel> {
        let model = self.describe("import", id).await?;
        tracing::info!(namespace = %id, "Imported namespace");
        Ok(model)
    }
}
