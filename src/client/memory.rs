//! In-memory Temporal client
//!
//! Keeps namespaces and schedules in process, behaving like a single-node
//! server for the operations resources need. Useful for tests and for
//! validating configuration without a running cluster.

use super::{
    NamespaceDescription, NamespaceRegistration, NamespaceState, NamespaceUpdate,
    ScheduleDefinition, ScheduleDescription, ScheduleInfo, TemporalClient,
};
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Namespace every fresh server starts with
pub const DEFAULT_NAMESPACE: &str = "default";

const DEFAULT_NAMESPACE_RETENTION: Duration = Duration::from_secs(72 * 3600);

/// In-memory `TemporalClient`
pub struct MemoryClient {
    namespaces: RwLock<HashMap<String, NamespaceDescription>>,
    /// (namespace, schedule id) → schedule
    schedules: RwLock<HashMap<(String, String), ScheduleDescription>>,
}

impl Default for MemoryClient {
    fn default() -> Self {
        let mut namespaces = HashMap::new();
        namespaces.insert(
            DEFAULT_NAMESPACE.to_string(),
            NamespaceDescription {
                name: DEFAULT_NAMESPACE.to_string(),
                description: String::new(),
                owner_email: String::new(),
                retention: DEFAULT_NAMESPACE_RETENTION,
                state: NamespaceState::Registered,
            },
        );
        Self {
            namespaces: RwLock::new(namespaces),
            schedules: RwLock::new(HashMap::new()),
        }
    }
}

impl MemoryClient {
    /// A server with only the `default` namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// A server with no namespaces at all
    pub fn empty() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            schedules: RwLock::new(HashMap::new()),
        }
    }

    /// Number of registered namespaces
    pub async fn namespace_count(&self) -> usize {
        self.namespaces.read().await.len()
    }

    /// Number of schedules across all namespaces
    pub async fn schedule_count(&self) -> usize {
        self.schedules.read().await.len()
    }

    async fn require_namespace(&self, namespace: &str) -> Result<()> {
        if self.namespaces.read().await.contains_key(namespace) {
            Ok(())
        } else {
            Err(ProviderError::NotFound(format!("namespace '{}'", namespace)))
        }
    }
}

fn schedule_key(namespace: &str, schedule_id: &str) -> (String, String) {
    (namespace.to_string(), schedule_id.to_string())
}

fn schedule_not_found(namespace: &str, schedule_id: &str) -> ProviderError {
    ProviderError::NotFound(format!(
        "schedule '{}' in namespace '{}'",
        schedule_id, namespace
    ))
}

#[async_trait]
impl TemporalClient for MemoryClient {
    async fn register_namespace(&self, request: &NamespaceRegistration) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        if namespaces.contains_key(&request.name) {
            return Err(ProviderError::AlreadyExists(format!(
                "namespace '{}'",
                request.name
            )));
        }
        namespaces.insert(
            request.name.clone(),
            NamespaceDescription {
                name: request.name.clone(),
                description: request.description.clone(),
                owner_email: request.owner_email.clone(),
                retention: request.retention,
                state: NamespaceState::Registered,
            },
        );
        tracing::debug!(namespace = %request.name, "Registered namespace");
        Ok(())
    }

    async fn describe_namespace(&self, name: &str) -> Result<NamespaceDescription> {
        self.namespaces
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("namespace '{}'", name)))
    }

    async fn update_namespace(&self, request: &NamespaceUpdate) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        let namespace = namespaces
            .get_mut(&request.name)
            .ok_or_else(|| ProviderError::NotFound(format!("namespace '{}'", request.name)))?;

        if let Some(description) = &request.description {
            namespace.description = description.clone();
        }
        if let Some(owner_email) = &request.owner_email {
            namespace.owner_email = owner_email.clone();
        }
        if let Some(retention) = request.retention {
            namespace.retention = retention;
        }
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        if self.namespaces.write().await.remove(name).is_none() {
            return Err(ProviderError::NotFound(format!("namespace '{}'", name)));
        }
        // Schedules go with their namespace
        self.schedules.write().await.retain(|(ns, _), _| ns != name);
        Ok(())
    }

    async fn create_schedule(
        &self,
        namespace: &str,
        schedule_id: &str,
        schedule: &ScheduleDefinition,
        trigger_immediately: bool,
    ) -> Result<()> {
        self.require_namespace(namespace).await?;

        let mut schedules = self.schedules.write().await;
        let key = schedule_key(namespace, schedule_id);
        if schedules.contains_key(&key) {
            return Err(ProviderError::AlreadyExists(format!(
                "schedule '{}' in namespace '{}'",
                schedule_id, namespace
            )));
        }

        let mut stored = schedule.clone();
        let mut action_count = 0;
        if trigger_immediately {
            action_count = 1;
            if stored.state.remaining_actions > 0 {
                stored.state.remaining_actions -= 1;
            }
        }

        schedules.insert(
            key,
            ScheduleDescription {
                id: schedule_id.to_string(),
                schedule: stored,
                info: ScheduleInfo {
                    action_count,
                    created_at: Utc::now(),
                    updated_at: None,
                },
            },
        );
        tracing::debug!(namespace, schedule_id, "Created schedule");
        Ok(())
    }

    async fn describe_schedule(
        &self,
        namespace: &str,
        schedule_id: &str,
    ) -> Result<ScheduleDescription> {
        self.schedules
            .read()
            .await
            .get(&schedule_key(namespace, schedule_id))
            .cloned()
            .ok_or_else(|| schedule_not_found(namespace, schedule_id))
    }

    async fn update_schedule(
        &self,
        namespace: &str,
        schedule_id: &str,
        schedule: &ScheduleDefinition,
    ) -> Result<()> {
        let mut schedules = self.schedules.write().await;
        let existing = schedules
            .get_mut(&schedule_key(namespace, schedule_id))
            .ok_or_else(|| schedule_not_found(namespace, schedule_id))?;
        existing.schedule = schedule.clone();
        existing.info.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_schedule(&self, namespace: &str, schedule_id: &str) -> Result<()> {
        self.schedules
            .write()
            .await
            .remove(&schedule_key(namespace, schedule_id))
            .map(|_| ())
            .ok_or_else(|| schedule_not_found(namespace, schedule_id))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
