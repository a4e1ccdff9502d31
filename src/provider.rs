//! Provider entry point
//!
//! Resolves configuration once, binds a client, and hands out resources and
//! data sources that share it.

use crate::client::TemporalClient;
use crate::config::{ProviderConfig, ResolvedConfig};
use crate::error::{ProviderError, Result};
use crate::logging;
use crate::resource::{
    NamespaceDataSource, NamespaceResource, ScheduleDataSource, ScheduleResource,
};
use std::sync::Arc;

const RESOURCE_TYPES: &[&str] = &["temporal_namespace", "temporal_schedule"];
const DATA_SOURCE_TYPES: &[&str] = &["temporal_namespace", "temporal_schedule"];

struct Configured {
    config: ResolvedConfig,
    client: Arc<dyn TemporalClient>,
}

/// The `temporal` provider
pub struct TemporalProvider {
    version: String,
    configured: Option<Configured>,
}

impl TemporalProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            configured: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        "temporal"
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Resolve `config` against the environment and bind `client`
    pub fn configure(
        &mut self,
        config: &ProviderConfig,
        client: Arc<dyn TemporalClient>,
    ) -> Result<&ResolvedConfig> {
        let resolved = config.resolve()?;
        Ok(self.configure_resolved(resolved, client))
    }

    /// Bind `client` with an already resolved configuration. Installs the
    /// log subscriber at debug level when `config.debug` is set.
    pub fn configure_resolved(
        &mut self,
        config: ResolvedConfig,
        client: Arc<dyn TemporalClient>,
    ) -> &ResolvedConfig {
        logging::init(config.debug);
        tracing::info!(
            hostport = %config.hostport,
            namespace = %config.namespace,
            identity = %config.identity,
            client = client.name(),
            version = %self.version,
            "Configured temporal provider"
        );
        &self
            .configured
            .insert(Configured { config, client })
            .config
    }

    pub fn is_configured(&self) -> bool {
        self.configured.is_some()
    }

    pub fn config(&self) -> Option<&ResolvedConfig> {
        self.configured.as_ref().map(|c| &c.config)
    }

    fn bound(&self) -> Result<&Configured> {
        self.configured.as_ref().ok_or_else(|| {
            ProviderError::Config("provider is not configured; call configure first".to_string())
        })
    }

    pub fn namespace_resource(&self) -> Result<NamespaceResource> {
        let bound = self.bound()?;
        Ok(NamespaceResource::new(bound.client.clone()))
    }

    pub fn schedule_resource(&self) -> Result<ScheduleResource> {
        let bound = self.bound()?;
        Ok(ScheduleResource::new(
            bound.client.clone(),
            bound.config.namespace.clone(),
        ))
    }

    pub fn namespace_data_source(&self) -> Result<NamespaceDataSource> {
        let bound = self.bound()?;
        Ok(NamespaceDataSource::new(bound.client.clone()))
    }

    pub fn schedule_data_source(&self) -> Result<ScheduleDataSource> {
        let bound = self.bound()?;
        Ok(ScheduleDataSource::new(
            bound.client.clone(),
            bound.config.namespace.clone(),
        ))
    }

    pub fn resource_types(&self) -> &'static [&'static str] {
        RESOURCE_TYPES
    }

    pub fn data_source_types(&self) -> &'static [&'static str] {
        DATA_SOURCE_TYPES
    }
}
