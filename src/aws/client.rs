//! Inventory Client
//!
//! Implements the metrics, compute and tagging capabilities against an
//! inventory gateway that speaks the AWS JSON action shapes:
//! `POST {endpoint}/{region}/{service}/{Action}`.

use super::http::InventoryHttpClient;
use crate::error::UpstreamError;
use crate::inventory::{
    CapabilityResult, ComputeApi, FilterSpec, Instance, Metric, MetricsApi, ResourceTagMapping,
    TaggingApi,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use url::Url;

/// Upper bound on pages followed for a single call
const MAX_PAGES: usize = 1000;

/// Main inventory client
#[derive(Clone)]
pub struct InventoryClient {
    pub http: InventoryHttpClient,
    pub endpoint: String,
    /// Region used for calls that are not region-scoped (DescribeRegions)
    pub default_region: String,
}

impl InventoryClient {
    /// Create a new inventory client
    pub fn new(endpoint: &str, default_region: &str, token: Option<String>) -> Result<Self> {
        let parsed = Url::parse(endpoint).context("Invalid inventory endpoint URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported endpoint scheme: {}", parsed.scheme());
        }

        let http = InventoryHttpClient::new(token).context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            endpoint: parsed.as_str().trim_end_matches('/').to_string(),
            default_region: default_region.to_string(),
        })
    }

    /// Build the URL of a service action in a region
    pub fn action_url(&self, region: &str, service: &str, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.endpoint,
            urlencoding::encode(region),
            service,
            action
        )
    }

    /// Call a paginated action, following `token_field` until it is absent or empty,
    /// and concatenate the arrays found under `items_field` in page order.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        region: &str,
        service: &str,
        action: &str,
        mut body: Map<String, Value>,
        items_field: &str,
        token_field: &str,
    ) -> CapabilityResult<Vec<T>> {
        let url = self.action_url(region, service, action);
        let mut all_items = Vec::new();

        for page in 0..MAX_PAGES {
            let response = self
                .http
                .post_action(action, &url, &Value::Object(body.clone()))
                .await?;

            let items = match response.get(items_field) {
                None | Some(Value::Null) => Vec::new(),
                Some(v) => serde_json::from_value::<Vec<T>>(v.clone())
                    .map_err(|e| UpstreamError::decode(action, e.to_string()))?,
            };
            tracing::debug!("{} page {}: {} items", action, page + 1, items.len());
            all_items.extend(items);

            let next_token = response
                .get(token_field)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty());

            match next_token {
                Some(token) => {
                    body.insert(token_field.to_string(), Value::String(token.to_string()));
                }
                None => return Ok(all_items),
            }
        }

        Err(UpstreamError::decode(
            action,
            format!("pagination did not finish after {} pages", MAX_PAGES),
        ))
    }
}

fn filters_body(filters: &[FilterSpec], key_field: &str) -> Value {
    Value::Array(
        filters
            .iter()
            .map(|f| {
                let mut entry = Map::new();
                entry.insert(key_field.to_string(), Value::String(f.key.clone()));
                entry.insert("Values".to_string(), json!(f.values));
                Value::Object(entry)
            })
            .collect(),
    )
}

#[async_trait]
impl MetricsApi for InventoryClient {
    async fn list_metrics(
        &self,
        region: &str,
        namespace: Option<&str>,
    ) -> CapabilityResult<Vec<Metric>> {
        let mut body = Map::new();
        if let Some(namespace) = namespace {
            body.insert("Namespace".to_string(), Value::String(namespace.to_string()));
        }

        self.fetch_all(region, "monitoring", "ListMetrics", body, "Metrics", "NextToken")
            .await
    }
}

#[async_trait]
impl ComputeApi for InventoryClient {
    async fn list_regions(&self) -> CapabilityResult<Vec<String>> {
        let url = self.action_url(&self.default_region, "ec2", "DescribeRegions");
        let response = self
            .http
            .post_action("DescribeRegions", &url, &json!({}))
            .await?;

        let mut regions: Vec<String> = response
            .get("Regions")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|r| r.get("RegionName").and_then(|v| v.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        regions.sort();

        Ok(regions)
    }

    async fn describe_instances(
        &self,
        region: &str,
        filters: &[FilterSpec],
    ) -> CapabilityResult<Vec<Instance>> {
        let mut body = Map::new();
        if !filters.is_empty() {
            body.insert("Filters".to_string(), filters_body(filters, "Name"));
        }

        let reservations: Vec<Value> = self
            .fetch_all(region, "ec2", "DescribeInstances", body, "Reservations", "NextToken")
            .await?;

        // Reservation order, then instance order within each reservation
        Ok(reservations
            .iter()
            .filter_map(|r| r.get("Instances").and_then(|v| v.as_array()))
            .flatten()
            .map(Instance::from)
            .collect())
    }
}

#[async_trait]
impl TaggingApi for InventoryClient {
    async fn get_resources_by_tag(
        &self,
        region: &str,
        resource_type: &str,
        filters: &[FilterSpec],
    ) -> CapabilityResult<Vec<ResourceTagMapping>> {
        let mut body = Map::new();
        body.insert("ResourceTypeFilters".to_string(), json!([resource_type]));
        if !filters.is_empty() {
            body.insert("TagFilters".to_string(), filters_body(filters, "Key"));
        }

        self.fetch_all(
            region,
            "tagging",
            "GetResources",
            body,
            "ResourceTagMappingList",
            "PaginationToken",
        )
        .await
    }
}
