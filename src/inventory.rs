//! Inventory capabilities
//!
//! The three narrow boundaries through which the resolver reaches external
//! services: metrics listing, compute-instance inventory and resource tag
//! search. Each one is a trait so tests can substitute in-memory doubles;
//! [`crate::aws::client::InventoryClient`] implements all three over HTTP.

use crate::error::UpstreamError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub type CapabilityResult<T> = std::result::Result<T, UpstreamError>;

/// Tag/attribute filter passed through to the inventory APIs unchanged.
///
/// Filters are ANDed across keys and ORed within `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub key: String,
    pub values: Vec<String>,
}

impl FilterSpec {
    pub fn new(key: &str, values: Vec<String>) -> Self {
        Self {
            key: key.to_string(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metric {
    #[serde(default)]
    pub namespace: Option<String>,
    pub metric_name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Block-device mapping attached to an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub device_name: Option<String>,
    pub volume_id: Option<String>,
}

/// One compute instance as reported by the inventory
#[derive(Debug, Clone)]
pub struct Instance {
    pub instance_id: String,
    pub tags: Vec<Tag>,
    pub block_devices: Vec<BlockDevice>,
    /// Raw attribute bag, queried by dot-separated paths
    pub attributes: Value,
}

impl From<&Value> for Instance {
    fn from(value: &Value) -> Self {
        let str_field = |v: &Value, key: &str| v.get(key).and_then(|v| v.as_str()).map(String::from);

        let tags = value
            .get("Tags")
            .cloned()
            .and_then(|v| serde_json::from_value::<Vec<Tag>>(v).ok())
            .unwrap_or_default();

        let block_devices = value
            .get("BlockDeviceMappings")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .map(|m| BlockDevice {
                        device_name: str_field(m, "DeviceName"),
                        volume_id: m.get("Ebs").and_then(|ebs| str_field(ebs, "VolumeId")),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            instance_id: str_field(value, "InstanceId").unwrap_or_default(),
            tags,
            block_devices,
            attributes: value.clone(),
        }
    }
}

impl Instance {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }

    /// Look up an attribute by name.
    ///
    /// `InstanceId` is always available; `Tags.<key>` reads a tag; anything
    /// else is a dot-separated path into the attribute bag. Only scalar
    /// values are returned.
    pub fn attribute(&self, name: &str) -> Option<String> {
        if name == "InstanceId" {
            return Some(self.instance_id.clone()).filter(|id| !id.is_empty());
        }
        if let Some(tag_key) = name.strip_prefix("Tags.") {
            return self.tag(tag_key).map(String::from);
        }

        let mut current = &self.attributes;
        for part in name.split('.') {
            current = match part.parse::<usize>() {
                Ok(idx) => current.get(idx)?,
                Err(_) => current.get(part)?,
            };
        }

        match current {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Resource found by tag search
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceTagMapping {
    #[serde(rename = "ResourceARN")]
    pub resource_arn: String,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<Tag>,
}

/// Metrics listing capability
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn list_metrics(
        &self,
        region: &str,
        namespace: Option<&str>,
    ) -> CapabilityResult<Vec<Metric>>;
}

/// Compute inventory capability
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn list_regions(&self) -> CapabilityResult<Vec<String>>;

    async fn describe_instances(
        &self,
        region: &str,
        filters: &[FilterSpec],
    ) -> CapabilityResult<Vec<Instance>>;
}

/// Resource tag search capability
#[async_trait]
pub trait TaggingApi: Send + Sync {
    async fn get_resources_by_tag(
        &self,
        region: &str,
        resource_type: &str,
        filters: &[FilterSpec],
    ) -> CapabilityResult<Vec<ResourceTagMapping>>;
}

/// Bundle of the three capabilities used by the resolver
#[derive(Clone)]
pub struct Inventory {
    pub metrics: Arc<dyn MetricsApi>,
    pub compute: Arc<dyn ComputeApi>,
    pub tagging: Arc<dyn TaggingApi>,
}

impl Inventory {
    pub fn new(
        metrics: Arc<dyn MetricsApi>,
        compute: Arc<dyn ComputeApi>,
        tagging: Arc<dyn TaggingApi>,
    ) -> Self {
        Self {
            metrics,
            compute,
            tagging,
        }
    }

    /// Use one client for every capability
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: MetricsApi + ComputeApi + TaggingApi + 'static,
    {
        Self::new(client.clone(), client.clone(), client)
    }
}
