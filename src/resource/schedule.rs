//! `temporal_schedule` resource

use super::{plan_with, remote_error, Plan, Resource};
use crate::client::TemporalClient;
use crate::error::Result;
use crate::model::ScheduleModel;
use async_trait::async_trait;
use std::sync::Arc;

/// Schedules in the provider's namespace
pub struct ScheduleResource {
    client: Arc<dyn TemporalClient>,
    namespace: String,
}

impl ScheduleResource {
    pub fn new(client: Arc<dyn TemporalClient>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn entity(&self, id: &str) -> String {
        format!("temporal_schedule '{}' in namespace '{}'", id, self.namespace)
    }

    async fn refreshed(
        &self,
        operation: &str,
        model: &ScheduleModel,
    ) -> Result<ScheduleModel> {
        let desc = self
            .client
            .describe_schedule(&self.namespace, &model.id)
            .await
            .map_err(|e| remote_error(e, operation, &self.entity(&model.id)))?;
        let mut state = model.clone();
        state.refresh(&desc);
        Ok(state)
    }
}

#[async_trait]
impl Resource for ScheduleResource {
    type Model = ScheduleModel;

    fn type_name(&self) -> &'static str {
        "temporal_schedule"
    }

    fn plan(
        &self,
        config: ScheduleModel,
        prior: Option<&ScheduleModel>,
    ) -> Result<Plan<ScheduleModel>> {
        plan_with(
            config,
            prior,
            ScheduleModel::carry_forward,
            |planned| {
                planned.apply_defaults();
                planned.validate()
            },
            |prior, planned| {
                if prior.id != planned.id {
                    vec!["id"]
                } else {
                    Vec::new()
                }
            },
        )
    }

    async fn create(&self, planned: &ScheduleModel) -> Result<ScheduleModel> {
        let definition = planned.to_definition()?;
        let trigger = planned.trigger_immediately.unwrap_or(false);
        self.client
            .create_schedule(&self.namespace, &planned.id, &definition, trigger)
            .await
            .map_err(|e| remote_error(e, "create", &self.entity(&planned.id)))?;
        tracing::info!(
            namespace = %self.namespace,
            schedule = %planned.id,
            calendars = definition.spec.calendars.len(),
            intervals = definition.spec.intervals.len(),
            "Created schedule"
        );

        self.refreshed("create", planned).await
    }

    async fn read(&self, state: &ScheduleModel) -> Result<Option<ScheduleModel>> {
        match self.client.describe_schedule(&self.namespace, &state.id).await {
            Ok(desc) => {
                let mut refreshed = state.clone();
                refreshed.refresh(&desc);
                if refreshed != *state {
                    tracing::debug!(schedule = %state.id, "Schedule drifted from state");
                }
                Ok(Some(refreshed))
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    namespace = %self.namespace,
                    schedule = %state.id,
                    "Schedule no longer exists"
                );
                Ok(None)
            }
            Err(e) => Err(remote_error(e, "read", &self.entity(&state.id))),
        }
    }

    async fn update(
        &self,
        planned: &ScheduleModel,
        _prior: &ScheduleModel,
    ) -> Result<ScheduleModel> {
        let definition = planned.to_definition()?;
        self.client
            .update_schedule(&self.namespace, &planned.id, &definition)
            .await
            .map_err(|e| remote_error(e, "update", &self.entity(&planned.id)))?;
        tracing::info!(namespace = %self.namespace, schedule = %planned.id, "Updated schedule");

        self.refreshed("update", planned).await
    }

    async fn delete(&self, state: &ScheduleModel) -> Result<()> {
        match self.client.delete_schedule(&self.namespace, &state.id).await {
            Ok(()) => {
                tracing::info!(namespace = %self.namespace, schedule = %state.id, "Deleted schedule");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(schedule = %state.id, "Schedule already deleted");
                Ok(())
            }
            Err(e) => Err(remote_error(e, "delete", &self.entity(&state.id))),
        }
    }

    async fn import(&self, id: &str) -> Result<ScheduleModel> {
        let desc = self
            .client
            .describe_schedule(&self.namespace, id)
            .await
            .map_err(|e| remote_error(e, "import", &self.entity(id)))?;
        tracing::info!(namespace = %self.namespace, schedule = %id, "Imported schedule");
        Ok(ScheduleModel::from_description(&desc))
    }
}
