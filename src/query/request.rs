//! Typed query requests
//!
//! Converts the loosely-typed parameter bag sent by dashboards into one
//! [`Query`] variant per query type, validating every field up front.

use super::multiselect::{parse_multi_select, parse_multi_select_all};
use crate::error::{ResolveError, Result};
use crate::inventory::FilterSpec;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Region value that stands for the datasource default region
pub const DEFAULT_REGION_ALIAS: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Regions,
    Namespaces,
    Metrics,
    DimensionKeys,
    DimensionValues,
    EbsVolumeIds,
    Ec2InstanceAttribute,
    ResourceArns,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Regions => "regions",
            QueryType::Namespaces => "namespaces",
            QueryType::Metrics => "metrics",
            QueryType::DimensionKeys => "dimension_keys",
            QueryType::DimensionValues => "dimension_values",
            QueryType::EbsVolumeIds => "ebs_volume_ids",
            QueryType::Ec2InstanceAttribute => "ec2_instance_attribute",
            QueryType::ResourceArns => "resource_arns",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        let query_type = match s.trim() {
            "regions" => QueryType::Regions,
            "namespaces" => QueryType::Namespaces,
            "metrics" | "custom-metrics-for-namespace" => QueryType::Metrics,
            "dimension_keys" | "dimension-keys" => QueryType::DimensionKeys,
            "dimension_values" | "dimension-values" => QueryType::DimensionValues,
            "ebs_volume_ids" | "ebs-volume-ids" => QueryType::EbsVolumeIds,
            "ec2_instance_attribute" | "ec2-instance-attribute" => {
                QueryType::Ec2InstanceAttribute
            }
            "resource_arns" | "resource-arns" => QueryType::ResourceArns,
            other => return Err(ResolveError::UnsupportedQueryType(other.to_string())),
        };
        Ok(query_type)
    }
}

/// A validated query, carrying only the fields its routine needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Regions,
    Namespaces,
    Metrics {
        region: String,
        namespace: String,
    },
    DimensionKeys {
        region: String,
        namespace: String,
    },
    DimensionValues {
        region: String,
        namespace: String,
        metric_name: String,
        dimension_key: String,
        filters: Vec<FilterSpec>,
    },
    EbsVolumeIds {
        region: String,
        instance_ids: Vec<String>,
    },
    Ec2InstanceAttribute {
        region: String,
        attribute_name: String,
        filters: Vec<FilterSpec>,
    },
    ResourceArns {
        region: String,
        resource_type: String,
        filters: Vec<FilterSpec>,
    },
}

impl Query {
    /// Build a query from its type tag and parameter bag
    pub fn parse(query_type: &str, params: &Value) -> Result<Self> {
        Self::from_parameters(query_type.parse()?, params)
    }

    pub fn from_parameters(query_type: QueryType, params: &Value) -> Result<Self> {
        if !params.is_object() && !params.is_null() {
            return Err(ResolveError::invalid(
                "parameters",
                "expected an object of query parameters",
            ));
        }

        let query = match query_type {
            QueryType::Regions => Query::Regions,
            QueryType::Namespaces => Query::Namespaces,
            QueryType::Metrics => Query::Metrics {
                region: get_param_str(params, "region")?,
                namespace: get_param_str(params, "namespace")?,
            },
            QueryType::DimensionKeys => Query::DimensionKeys {
                region: get_param_str(params, "region")?,
                namespace: get_param_str(params, "namespace")?,
            },
            QueryType::DimensionValues => Query::DimensionValues {
                region: get_param_str(params, "region")?,
                namespace: get_param_str(params, "namespace")?,
                metric_name: get_param_str(params, "metricName")?,
                dimension_key: get_param_str(params, "dimensionKey")?,
                filters: parse_filter_bag(params, "dimensionFilters", false)?,
            },
            QueryType::EbsVolumeIds => {
                let region = get_param_str(params, "region")?;
                let raw = params
                    .get("instanceId")
                    .ok_or_else(|| ResolveError::missing("instanceId"))?;
                let instance_ids = multi_select_values("instanceId", raw)?;
                if instance_ids.is_empty() {
                    return Err(ResolveError::invalid("instanceId", "no instance ids given"));
                }
                Query::EbsVolumeIds {
                    region,
                    instance_ids,
                }
            }
            QueryType::Ec2InstanceAttribute => Query::Ec2InstanceAttribute {
                region: get_param_str(params, "region")?,
                attribute_name: get_param_str(params, "attributeName")?,
                filters: parse_filter_bag(params, "filters", false)?,
            },
            QueryType::ResourceArns => Query::ResourceArns {
                region: get_param_str(params, "region")?,
                resource_type: get_param_str(params, "resourceType")?,
                filters: parse_filter_bag(params, "tags", true)?,
            },
        };

        Ok(query)
    }

    pub fn query_type(&self) -> QueryType {
        match self {
            Query::Regions => QueryType::Regions,
            Query::Namespaces => QueryType::Namespaces,
            Query::Metrics { .. } => QueryType::Metrics,
            Query::DimensionKeys { .. } => QueryType::DimensionKeys,
            Query::DimensionValues { .. } => QueryType::DimensionValues,
            Query::EbsVolumeIds { .. } => QueryType::EbsVolumeIds,
            Query::Ec2InstanceAttribute { .. } => QueryType::Ec2InstanceAttribute,
            Query::ResourceArns { .. } => QueryType::ResourceArns,
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            Query::Regions | Query::Namespaces => None,
            Query::Metrics { region, .. }
            | Query::DimensionKeys { region, .. }
            | Query::DimensionValues { region, .. }
            | Query::EbsVolumeIds { region, .. }
            | Query::Ec2InstanceAttribute { region, .. }
            | Query::ResourceArns { region, .. } => Some(region),
        }
    }

    /// Replace the `default` region alias with a concrete region
    pub fn with_default_region(mut self, default_region: &str) -> Result<Self> {
        match &mut self {
            Query::Regions | Query::Namespaces => {}
            Query::Metrics { region, .. }
            | Query::DimensionKeys { region, .. }
            | Query::DimensionValues { region, .. }
            | Query::EbsVolumeIds { region, .. }
            | Query::Ec2InstanceAttribute { region, .. }
            | Query::ResourceArns { region, .. } => {
                if region == DEFAULT_REGION_ALIAS {
                    let default_region = default_region.trim();
                    if default_region.is_empty() {
                        return Err(ResolveError::invalid(
                            "region",
                            "no default region is configured",
                        ));
                    }
                    *region = default_region.to_string();
                }
            }
        }
        Ok(self)
    }
}

/// Read a required, non-blank string parameter (a one-element list is accepted)
fn get_param_str(params: &Value, key: &str) -> Result<String> {
    let value = params.get(key).ok_or_else(|| ResolveError::missing(key))?;
    let s = match value {
        Value::String(s) => s.as_str(),
        Value::Array(arr) if arr.len() > 1 => {
            return Err(ResolveError::invalid(key, "expected a single value"))
        }
        Value::Array(arr) => arr
            .first()
            .and_then(|v| v.as_str())
            .ok_or_else(|| ResolveError::invalid(key, "expected a string"))?,
        Value::Null => return Err(ResolveError::missing(key)),
        _ => return Err(ResolveError::invalid(key, "expected a string")),
    };

    let s = s.trim();
    if s.is_empty() {
        return Err(ResolveError::missing(key));
    }
    Ok(s.to_string())
}

/// Parse a `{key: values}` bag into filters, running every value through the
/// multi-select parser. Each value may be a string or a list of strings.
fn parse_filter_bag(params: &Value, key: &str, keep_empty: bool) -> Result<Vec<FilterSpec>> {
    let map = match params.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(ResolveError::invalid(key, "expected an object")),
    };

    let mut filters = Vec::with_capacity(map.len());
    for (name, raw) in map {
        let values = multi_select_values(key, raw).map_err(|_| {
            ResolveError::invalid(key, format!("values of '{}' must be strings", name))
        })?;

        if values.is_empty() && !keep_empty {
            tracing::debug!("Skipping filter '{}' with no values", name);
            continue;
        }
        filters.push(FilterSpec::new(name, values));
    }

    filters.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(filters)
}

/// Values of a string or list-of-strings parameter, each run through the
/// multi-select parser and concatenated in order
fn multi_select_values(key: &str, raw: &Value) -> Result<Vec<String>> {
    match raw {
        Value::String(s) => Ok(parse_multi_select(s)),
        Value::Array(arr) => {
            let items = arr
                .iter()
                .map(|v| {
                    v.as_str()
                        .ok_or_else(|| ResolveError::invalid(key, "expected strings"))
                })
                .collect::<Result<Vec<&str>>>()?;
            Ok(parse_multi_select_all(items))
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(ResolveError::invalid(key, "expected a string or a list of strings")),
    }
}
