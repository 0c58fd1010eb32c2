//! Query dispatch
//!
//! Routes each [`Query`] variant to its resolution routine. Routines either
//! return a complete result list or an error; there is no partial success.

use super::assemble::{in_order, sorted_unique, ResultItem};
use super::request::Query;
use crate::aws::{catalog, regions};
use crate::cache::{EnumerationCache, EnumerationKind, DEFAULT_FRESHNESS};
use crate::error::{ResolveError, Result, UpstreamError};
use crate::inventory::{FilterSpec, Inventory, Metric};
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;

/// Settings a resolver is constructed with (one resolver per datasource)
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Region substituted for the `default` alias
    pub default_region: String,
    /// Freshness window of the enumeration cache
    pub cache_freshness: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            default_region: "us-east-1".to_string(),
            cache_freshness: DEFAULT_FRESHNESS,
        }
    }
}

pub struct Resolver {
    inventory: Inventory,
    cache: EnumerationCache,
    default_region: String,
}

impl Resolver {
    pub fn new(inventory: Inventory, options: ResolverOptions) -> Self {
        Self {
            inventory,
            cache: EnumerationCache::new(options.cache_freshness),
            default_region: options.default_region,
        }
    }

    /// Parse an untyped request and resolve it
    pub async fn resolve_raw(&self, query_type: &str, params: &Value) -> Result<Vec<ResultItem>> {
        let query = Query::parse(query_type, params)?;
        self.resolve(query).await
    }

    pub async fn resolve(&self, query: Query) -> Result<Vec<ResultItem>> {
        let query = query.with_default_region(&self.default_region)?;
        tracing::debug!("Resolving {:?}", query);

        let items = match &query {
            Query::Regions => self.regions().await?,
            Query::Namespaces => sorted_unique(catalog::namespaces()),
            Query::Metrics { region, namespace } => {
                self.enumerate(region, namespace, EnumerationKind::Metrics)
                    .await?
            }
            Query::DimensionKeys { region, namespace } => {
                self.enumerate(region, namespace, EnumerationKind::Dimensions)
                    .await?
            }
            Query::DimensionValues {
                region,
                namespace,
                metric_name,
                dimension_key,
                filters,
            } => {
                self.dimension_values(region, namespace, metric_name, dimension_key, filters)
                    .await?
            }
            Query::EbsVolumeIds {
                region,
                instance_ids,
            } => self.ebs_volume_ids(region, instance_ids).await?,
            Query::Ec2InstanceAttribute {
                region,
                attribute_name,
                filters,
            } => {
                self.ec2_instance_attribute(region, attribute_name, filters)
                    .await?
            }
            Query::ResourceArns {
                region,
                resource_type,
                filters,
            } => self.resource_arns(region, resource_type, filters).await?,
        };

        tracing::info!(
            "Resolved {} query{}: {} items",
            query.query_type(),
            query.region().map(|r| format!(" in {}", r)).unwrap_or_default(),
            items.len()
        );
        Ok(items)
    }

    async fn regions(&self) -> Result<Vec<ResultItem>> {
        let mut all = regions::known_regions();
        all.extend(self.inventory.compute.list_regions().await?);
        Ok(sorted_unique(all))
    }

    /// Metric names or dimension keys of a namespace. Catalogued namespaces
    /// are answered locally; custom ones go through the enumeration cache.
    async fn enumerate(
        &self,
        region: &str,
        namespace: &str,
        kind: EnumerationKind,
    ) -> Result<Vec<ResultItem>> {
        let catalogued = match kind {
            EnumerationKind::Metrics => catalog::metrics(namespace),
            EnumerationKind::Dimensions => catalog::dimension_keys(namespace),
        };
        if let Some(names) = catalogued {
            return Ok(sorted_unique(names.iter().copied()));
        }

        let metrics_api = &self.inventory.metrics;
        let names = self
            .cache
            .get_or_fetch(region, namespace, kind, || async move {
                let metrics = metrics_api.list_metrics(region, Some(namespace)).await?;
                Ok::<_, UpstreamError>(enumeration_names(metrics, kind))
            })
            .await
            .map_err(|source| ResolveError::CacheFetch {
                region: region.to_string(),
                namespace: namespace.to_string(),
                source,
            })?;

        Ok(sorted_unique(names))
    }

    async fn dimension_values(
        &self,
        region: &str,
        namespace: &str,
        metric_name: &str,
        dimension_key: &str,
        filters: &[FilterSpec],
    ) -> Result<Vec<ResultItem>> {
        let metrics = self
            .inventory
            .metrics
            .list_metrics(region, Some(namespace))
            .await?;

        let values = metrics
            .iter()
            .filter(|m| m.metric_name == metric_name && matches_dimensions(m, filters))
            .flat_map(|m| m.dimensions.iter())
            .filter(|d| d.name == dimension_key)
            .filter_map(|d| d.value.clone());

        Ok(sorted_unique(values))
    }

    async fn ec2_instance_attribute(
        &self,
        region: &str,
        attribute_name: &str,
        filters: &[FilterSpec],
    ) -> Result<Vec<ResultItem>> {
        let instances = self
            .inventory
            .compute
            .describe_instances(region, filters)
            .await?;

        let values = instances.iter().filter_map(|instance| {
            let value = instance.attribute(attribute_name);
            if value.is_none() {
                tracing::warn!(
                    "Instance {} has no attribute {}, skipping",
                    instance.instance_id,
                    attribute_name
                );
            }
            value
        });

        Ok(in_order(values))
    }

    async fn ebs_volume_ids(
        &self,
        region: &str,
        instance_ids: &[String],
    ) -> Result<Vec<ResultItem>> {
        let filters = [FilterSpec::new("instance-id", instance_ids.to_vec())];
        let instances = self
            .inventory
            .compute
            .describe_instances(region, &filters)
            .await?;

        let volume_ids = instances
            .iter()
            .flat_map(|instance| instance.block_devices.iter())
            .filter_map(|device| device.volume_id.clone());

        Ok(in_order(volume_ids))
    }

    async fn resource_arns(
        &self,
        region: &str,
        resource_type: &str,
        filters: &[FilterSpec],
    ) -> Result<Vec<ResultItem>> {
        let resources = self
            .inventory
            .tagging
            .get_resources_by_tag(region, resource_type, filters)
            .await?;

        Ok(in_order(resources.into_iter().map(|r| r.resource_arn)))
    }
}

/// Distinct metric names, or distinct dimension keys, across listed metrics
fn enumeration_names(metrics: Vec<Metric>, kind: EnumerationKind) -> BTreeSet<String> {
    match kind {
        EnumerationKind::Metrics => metrics.into_iter().map(|m| m.metric_name).collect(),
        EnumerationKind::Dimensions => metrics
            .into_iter()
            .flat_map(|m| m.dimensions.into_iter().map(|d| d.name))
            .collect(),
    }
}

/// A metric matches when, for every filter, it has that dimension with one of the values
fn matches_dimensions(metric: &Metric, filters: &[FilterSpec]) -> bool {
    filters.iter().all(|filter| {
        metric.dimensions.iter().any(|d| {
            d.name == filter.key
                && d.value
                    .as_ref()
                    .is_some_and(|v| filter.values.iter().any(|fv| fv == v))
        })
    })
}
