//! `temporal_namespace` data model

use crate::client::{NamespaceDescription, NamespaceRegistration, NamespaceUpdate};
use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Temporal's minimum namespace retention
pub const MIN_RETENTION_HOURS: i64 = 24;

/// Retention applied when none is configured (3 days)
pub const DEFAULT_RETENTION_HOURS: i64 = 24 * 3;

/// A namespace as written in configuration and kept in state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceModel {
    /// Computed; always equal to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Namespace name. Changing it replaces the namespace.
    pub name: String,

    /// Workflow execution retention in hours (at least 24)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_hours: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

impl NamespaceModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_retention_hours(mut self, hours: i64) -> Self {
        self.retention_hours = Some(hours);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_owner_email(mut self, owner_email: impl Into<String>) -> Self {
        self.owner_email = Some(owner_email.into());
        self
    }

    /// Fill defaults for unset attributes
    pub fn apply_defaults(&mut self) {
        self.retention_hours.get_or_insert(DEFAULT_RETENTION_HOURS);
    }

    /// Keep prior computed values for attributes the configuration leaves unset
    pub fn carry_forward(&mut self, prior: &NamespaceModel) {
        if self.id.is_none() {
            self.id = prior.id.clone();
        }
        if self.description.is_none() {
            self.description = prior.description.clone();
        }
        if self.owner_email.is_none() {
            self.owner_email = prior.owner_email.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ProviderError::validation("name", "must not be empty"));
        }
        if let Some(hours) = self.retention_hours {
            if hours < MIN_RETENTION_HOURS {
                return Err(ProviderError::validation(
                    "retention_hours",
                    format!("must be at least {}, got {}", MIN_RETENTION_HOURS, hours),
                ));
            }
            if hours.checked_mul(3600).is_none() {
                return Err(ProviderError::validation(
                    "retention_hours",
                    format!("{} hours is too large", hours),
                ));
            }
        }
        Ok(())
    }

    pub fn retention(&self) -> Duration {
        let hours = self.retention_hours.unwrap_or(DEFAULT_RETENTION_HOURS).max(0) as u64;
        Duration::from_secs(hours.saturating_mul(3600))
    }

    pub fn to_registration(&self) -> NamespaceRegistration {
        NamespaceRegistration {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            owner_email: self.owner_email.clone().unwrap_or_default(),
            retention: self.retention(),
        }
    }

    pub fn to_update(&self) -> NamespaceUpdate {
        NamespaceUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
            owner_email: self.owner_email.clone(),
            retention: Some(self.retention()),
        }
    }

    /// Overwrite with the server's view
    pub fn refresh(&mut self, desc: &NamespaceDescription) {
        self.name = desc.name.clone();
        self.id = Some(desc.name.clone());
        self.description = Some(desc.description.clone());
        self.owner_email = Some(desc.owner_email.clone());
        self.retention_hours = Some((desc.retention.as_secs() / 3600) as i64);
    }

    pub fn from_description(desc: &NamespaceDescription) -> Self {
        let mut model = Self::new(desc.name.clone());
        model.refresh(desc);
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NamespaceState;

    #[test]
    fn test_defaults() {
        let mut model = NamespaceModel::new("orders");
        model.apply_defaults();
        assert_eq!(model.retention_hours, Some(DEFAULT_RETENTION_HOURS));
        assert_eq!(model.retention(), Duration::from_secs(72 * 3600));

        let mut model = NamespaceModel::new("orders").with_retention_hours(48);
        model.apply_defaults();
        assert_eq!(model.retention_hours, Some(48));
    }

    #[test]
    fn test_validate() {
        assert!(NamespaceModel::new("orders").validate().is_ok());
        assert!(NamespaceModel::new("orders")
            .with_retention_hours(24)
            .validate()
            .is_ok());

        let err = NamespaceModel::new("orders")
            .with_retention_hours(12)
            .validate()
            .unwrap_err();
        assert!(
            matches!(err, ProviderError::Validation { ref attribute, .. } if attribute == "retention_hours")
        );

        assert!(NamespaceModel::new(" ").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_retention() {
        let model = NamespaceModel::new("orders").with_retention_hours(i64::MAX);
        let err = model.validate().unwrap_err();
        assert!(
            matches!(err, ProviderError::Validation { ref attribute, .. } if attribute == "retention_hours")
        );
        // still no panic if called without validation
        assert_eq!(model.retention(), Duration::from_secs(u64::MAX));

        let largest = i64::MAX / 3600;
        assert!(NamespaceModel::new("orders")
            .with_retention_hours(largest)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_carry_forward_keeps_computed_values() {
        let prior = NamespaceModel {
            id: Some("orders".into()),
            name: "orders".into(),
            retention_hours: Some(72),
            description: Some("from server".into()),
            owner_email: Some("ops@example.com".into()),
        };
        let mut planned = NamespaceModel::new("orders").with_description("new");
        planned.carry_forward(&prior);
        assert_eq!(planned.id.as_deref(), Some("orders"));
        assert_eq!(planned.description.as_deref(), Some("new"));
        assert_eq!(planned.owner_email.as_deref(), Some("ops@example.com"));
        assert_eq!(planned.retention_hours, None);
    }

    #[test]
    fn test_requests() {
        let model = NamespaceModel::new("orders").with_retention_hours(48);
        let reg = model.to_registration();
        assert_eq!(reg.description, "");
        assert_eq!(reg.retention, Duration::from_secs(48 * 3600));

        let update = model.to_update();
        assert_eq!(update.description, None);
        assert_eq!(update.retention, Some(Duration::from_secs(48 * 3600)));
    }

    #[test]
    fn test_from_description() {
        let desc = NamespaceDescription {
            name: "orders".into(),
            description: "order processing".into(),
            owner_email: "ops@example.com".into(),
            retention: Duration::from_secs(48 * 3600 + 1800),
            state: NamespaceState::Registered,
        };
        let model = NamespaceModel::from_description(&desc);
        assert_eq!(model.id.as_deref(), Some("orders"));
        assert_eq!(model.retention_hours, Some(48));
        assert_eq!(model.description.as_deref(), Some("order processing"));
    }
}
