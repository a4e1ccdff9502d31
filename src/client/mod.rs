//! Temporal client capability, the seam between resources and the server
//!
//! Resources only talk to Temporal through `TemporalClient`. Any backend that
//! implements it (a gRPC client, the in-memory `MemoryClient`, a test double)
//! can be bound to the provider.

use crate::duration::serde_str;
use crate::error::{ProviderError, Result};
use crate::spec::{CalendarSpec, IntervalSpec};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub mod memory;

/// Core trait for Temporal backends
#[async_trait]
pub trait TemporalClient: Send + Sync {
    /// Register a new namespace
    async fn register_namespace(&self, request: &NamespaceRegistration) -> Result<()>;

    /// Describe a namespace by name
    async fn describe_namespace(&self, name: &str) -> Result<NamespaceDescription>;

    /// Apply a partial update to a namespace
    async fn update_namespace(&self, request: &NamespaceUpdate) -> Result<()>;

    /// Delete a namespace by name
    async fn delete_namespace(&self, name: &str) -> Result<()>;

    /// Create a schedule, optionally taking one action right away
    async fn create_schedule(
        &self,
        namespace: &str,
        schedule_id: &str,
        schedule: &ScheduleDefinition,
        trigger_immediately: bool,
    ) -> Result<()>;

    /// Describe a schedule by id
    async fn describe_schedule(
        &self,
        namespace: &str,
        schedule_id: &str,
    ) -> Result<ScheduleDescription>;

    /// Replace a schedule's definition
    async fn update_schedule(
        &self,
        namespace: &str,
        schedule_id: &str,
        schedule: &ScheduleDefinition,
    ) -> Result<()>;

    /// Delete a schedule by id
    async fn delete_schedule(&self, namespace: &str, schedule_id: &str) -> Result<()>;

    /// Backend name (e.g., "memory", "grpc")
    fn name(&self) -> &str;
}

// ============================================================================
// Namespaces
// ============================================================================

/// Request to register a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRegistration {
    pub name: String,
    pub description: String,
    pub owner_email: String,
    /// Workflow execution retention period
    #[serde(with = "serde_str")]
    pub retention: Duration,
}

/// Partial namespace update; `None` leaves the value unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceUpdate {
    pub name: String,
    pub description: Option<String>,
    pub owner_email: Option<String>,
    #[serde(with = "serde_str::option", default)]
    pub retention: Option<Duration>,
}

/// Namespace lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceState {
    #[default]
    Registered,
    Deprecated,
    Deleted,
}

impl fmt::Display for NamespaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceState::Registered => write!(f, "registered"),
            NamespaceState::Deprecated => write!(f, "deprecated"),
            NamespaceState::Deleted => write!(f, "deleted"),
        }
    }
}

/// Server view of a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDescription {
    pub name: String,
    pub description: String,
    pub owner_email: String,
    #[serde(with = "serde_str")]
    pub retention: Duration,
    #[serde(default)]
    pub state: NamespaceState,
}

// ============================================================================
// Schedules
// ============================================================================

/// What happens when an action would start while a previous one still runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Don't start the new action
    #[default]
    #[serde(rename = "SCHEDULE_OVERLAP_POLICY_SKIP")]
    Skip,
    /// Start it after the running one completes; buffer at most one
    #[serde(rename = "SCHEDULE_OVERLAP_POLICY_BUFFER_ONE")]
    BufferOne,
    /// Buffer every missed start
    #[serde(rename = "SCHEDULE_OVERLAP_POLICY_BUFFER_ALL")]
    BufferAll,
    /// Cancel the running action, then start
    #[serde(rename = "SCHEDULE_OVERLAP_POLICY_CANCEL_OTHER")]
    CancelOther,
    /// Terminate the running action, then start
    #[serde(rename = "SCHEDULE_OVERLAP_POLICY_TERMINATE_OTHER")]
    TerminateOther,
    /// Start regardless
    #[serde(rename = "SCHEDULE_OVERLAP_POLICY_ALLOW_ALL")]
    AllowAll,
}

impl OverlapPolicy {
    pub const ALL: [OverlapPolicy; 6] = [
        OverlapPolicy::Skip,
        OverlapPolicy::BufferOne,
        OverlapPolicy::BufferAll,
        OverlapPolicy::CancelOther,
        OverlapPolicy::TerminateOther,
        OverlapPolicy::AllowAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapPolicy::Skip => "SCHEDULE_OVERLAP_POLICY_SKIP",
            OverlapPolicy::BufferOne => "SCHEDULE_OVERLAP_POLICY_BUFFER_ONE",
            OverlapPolicy::BufferAll => "SCHEDULE_OVERLAP_POLICY_BUFFER_ALL",
            OverlapPolicy::CancelOther => "SCHEDULE_OVERLAP_POLICY_CANCEL_OTHER",
            OverlapPolicy::TerminateOther => "SCHEDULE_OVERLAP_POLICY_TERMINATE_OTHER",
            OverlapPolicy::AllowAll => "SCHEDULE_OVERLAP_POLICY_ALLOW_ALL",
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `SCHEDULE_OVERLAP_POLICY_SKIP` or `skip`, case-insensitive
impl FromStr for OverlapPolicy {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        const PREFIX: &str = "SCHEDULE_OVERLAP_POLICY_";
        let upper = s.trim().to_ascii_uppercase();
        let short = upper.strip_prefix(PREFIX).unwrap_or(&upper);
        OverlapPolicy::ALL
            .into_iter()
            .find(|p| p.as_str().strip_prefix(PREFIX) == Some(short))
            .ok_or_else(|| {
                ProviderError::validation(
                    "overlap",
                    format!(
                        "unknown overlap policy '{}', expected one of: {}",
                        s,
                        OverlapPolicy::ALL.map(|p| p.as_str()).join(", ")
                    ),
                )
            })
    }
}

/// When a schedule fires
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSpec {
    #[serde(default)]
    pub calendars: Vec<CalendarSpec>,
    #[serde(default)]
    pub intervals: Vec<IntervalSpec>,
    /// Random delay of up to this much added to each action
    #[serde(with = "serde_str", default)]
    pub jitter: Duration,
    /// IANA zone name; empty means UTC
    #[serde(default)]
    pub time_zone: String,
}

/// Start a workflow each time the schedule fires
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartWorkflowAction {
    pub workflow_id: String,
    pub workflow_type: String,
    pub task_queue: String,
    #[serde(with = "serde_str::option", default)]
    pub execution_timeout: Option<Duration>,
    #[serde(with = "serde_str::option", default)]
    pub run_timeout: Option<Duration>,
    #[serde(with = "serde_str::option", default)]
    pub task_timeout: Option<Duration>,
}

/// Server-side policies of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    pub overlap: OverlapPolicy,
    /// Maximum lateness tolerated before a missed action is skipped
    #[serde(with = "serde_str")]
    pub catchup_window: Duration,
    pub pause_on_failure: bool,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            overlap: OverlapPolicy::Skip,
            catchup_window: Duration::from_secs(60),
            pause_on_failure: false,
        }
    }
}

/// Mutable runtime state of a schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    #[serde(default)]
    pub note: String,
    pub paused: bool,
    /// Actions left before the schedule stops; 0 means unlimited
    pub remaining_actions: u64,
}

/// Full definition sent on create/update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDefinition {
    pub spec: ScheduleSpec,
    pub action: StartWorkflowAction,
    pub policy: SchedulePolicy,
    pub state: ScheduleState,
}

/// Server bookkeeping about a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    /// Number of actions taken so far
    pub action_count: u64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Server view of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDescription {
    pub id: String,
    pub schedule: ScheduleDefinition,
    pub info: ScheduleInfo,
}
