//! End-to-end resolver tests against in-memory capability doubles
//!
//! Each mock records the calls it receives so tests can assert both the
//! resolved items and what was asked of the inventory.

use async_trait::async_trait;
use cwvars::inventory::{
    CapabilityResult, ComputeApi, Dimension, FilterSpec, Instance, Metric, MetricsApi,
    ResourceTagMapping, TaggingApi,
};
use cwvars::{Inventory, ResolveError, Resolver, ResolverOptions, ResultItem, UpstreamError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockInventory {
    metrics: Vec<Metric>,
    regions: Vec<String>,
    instances: Vec<Value>,
    resources: Vec<ResourceTagMapping>,
    fail_with: Option<u16>,
    calls: AtomicUsize,
    seen_filters: Mutex<Vec<FilterSpec>>,
    seen_regions: Mutex<Vec<String>>,
}

impl MockInventory {
    fn record(&self, operation: &str, region: &str) -> CapabilityResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_regions.lock().unwrap().push(region.to_string());
        match self.fail_with {
            Some(status) => Err(UpstreamError::status(operation, status)),
            None => Ok(()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsApi for MockInventory {
    async fn list_metrics(
        &self,
        region: &str,
        _namespace: Option<&str>,
    ) -> CapabilityResult<Vec<Metric>> {
        self.record("ListMetrics", region)?;
        Ok(self.metrics.clone())
    }
}

#[async_trait]
impl ComputeApi for MockInventory {
    async fn list_regions(&self) -> CapabilityResult<Vec<String>> {
        self.record("DescribeRegions", "")?;
        Ok(self.regions.clone())
    }

    async fn describe_instances(
        &self,
        region: &str,
        filters: &[FilterSpec],
    ) -> CapabilityResult<Vec<Instance>> {
        self.record("DescribeInstances", region)?;
        self.seen_filters.lock().unwrap().extend(filters.iter().cloned());
        Ok(self.instances.iter().map(Instance::from).collect())
    }
}

#[async_trait]
impl TaggingApi for MockInventory {
    async fn get_resources_by_tag(
        &self,
        region: &str,
        _resource_type: &str,
        filters: &[FilterSpec],
    ) -> CapabilityResult<Vec<ResourceTagMapping>> {
        self.record("GetResources", region)?;
        self.seen_filters.lock().unwrap().extend(filters.iter().cloned());
        Ok(self.resources.clone())
    }
}

fn resolver(mock: Arc<MockInventory>) -> Resolver {
    Resolver::new(
        Inventory::from_client(mock),
        ResolverOptions {
            default_region: "eu-central-1".to_string(),
            ..ResolverOptions::default()
        },
    )
}

fn texts(items: &[ResultItem]) -> Vec<&str> {
    items.iter().map(|i| i.text.as_str()).collect()
}

fn metric(name: &str, dims: &[(&str, Option<&str>)]) -> Metric {
    Metric {
        namespace: None,
        metric_name: name.to_string(),
        dimensions: dims
            .iter()
            .map(|(n, v)| Dimension {
                name: n.to_string(),
                value: v.map(String::from),
            })
            .collect(),
    }
}

mod metrics_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_custom_metrics_and_dimension_keys() {
        let mock = Arc::new(MockInventory {
            metrics: vec![metric("Test_MetricName", &[("Test_DimensionName", None)])],
            ..Default::default()
        });
        let resolver = resolver(mock.clone());
        let params = json!({"region": "us-east-1", "namespace": "Custom"});

        let metrics = resolver.resolve_raw("metrics", &params).await.unwrap();
        assert!(texts(&metrics).contains(&"Test_MetricName"));

        let keys = resolver.resolve_raw("dimension_keys", &params).await.unwrap();
        assert!(texts(&keys).contains(&"Test_DimensionName"));
    }

    #[tokio::test]
    async fn test_duplicates_sorted_regardless_of_upstream_order() {
        let forward = vec![
            metric("b", &[("Y", None)]),
            metric("a", &[("X", None)]),
            metric("b", &[("X", None)]),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let mut results = Vec::new();
        for metrics in [forward, backward] {
            let mock = Arc::new(MockInventory {
                metrics,
                ..Default::default()
            });
            let params = json!({"region": "us-east-1", "namespace": "Custom"});
            let r = resolver(mock);
            results.push((
                r.resolve_raw("metrics", &params).await.unwrap(),
                r.resolve_raw("dimension_keys", &params).await.unwrap(),
            ));
        }

        assert_eq!(results[0], results[1]);
        assert_eq!(texts(&results[0].0), vec!["a", "b"]);
        assert_eq!(texts(&results[0].1), vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn test_catalogued_namespace_needs_no_upstream_call() {
        let mock = Arc::new(MockInventory::default());
        let resolver = resolver(mock.clone());

        let items = resolver
            .resolve_raw("metrics", &json!({"region": "us-east-1", "namespace": "AWS/EC2"}))
            .await
            .unwrap();

        assert!(texts(&items).contains(&"CPUUtilization"));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_within_window() {
        let mock = Arc::new(MockInventory {
            metrics: vec![metric("Latency", &[])],
            ..Default::default()
        });
        let resolver = resolver(mock.clone());
        let params = json!({"region": "us-east-1", "namespace": "Custom"});

        resolver.resolve_raw("metrics", &params).await.unwrap();
        resolver.resolve_raw("metrics", &params).await.unwrap();
        assert_eq!(mock.calls(), 1);

        // Different kind is a different cache key
        resolver.resolve_raw("dimension_keys", &params).await.unwrap();
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_default_region_alias() {
        let mock = Arc::new(MockInventory {
            metrics: vec![metric("Latency", &[])],
            ..Default::default()
        });
        let resolver = resolver(mock.clone());

        resolver
            .resolve_raw("metrics", &json!({"region": "default", "namespace": "Custom"}))
            .await
            .unwrap();

        assert_eq!(*mock.seen_regions.lock().unwrap(), vec!["eu-central-1"]);
    }

    #[tokio::test]
    async fn test_dimension_values() {
        let mock = Arc::new(MockInventory {
            metrics: vec![
                metric("Latency", &[("Service", Some("web")), ("Stage", Some("prod"))]),
                metric("Latency", &[("Service", Some("api")), ("Stage", Some("prod"))]),
                metric("Latency", &[("Service", Some("batch")), ("Stage", Some("dev"))]),
                metric("Errors", &[("Service", Some("auth")), ("Stage", Some("prod"))]),
                metric("Latency", &[("Service", Some("api")), ("Stage", Some("prod"))]),
            ],
            ..Default::default()
        });
        let resolver = resolver(mock);

        let items = resolver
            .resolve_raw(
                "dimension_values",
                &json!({
                    "region": "us-east-1",
                    "namespace": "Custom",
                    "metricName": "Latency",
                    "dimensionKey": "Service",
                    "dimensionFilters": {"Stage": "prod"}
                }),
            )
            .await
            .unwrap();

        assert_eq!(texts(&items), vec!["api", "web"]);
    }
}

mod regions_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_regions_merge_static_and_fetched() {
        let mock = Arc::new(MockInventory {
            regions: vec!["ap-northeast-2".into(), "xx-test-1".into()],
            ..Default::default()
        });
        let items = resolver(mock).resolve_raw("regions", &json!({})).await.unwrap();

        let texts = texts(&items);
        assert_eq!(&texts[..3], &["af-south-1", "ap-east-1", "ap-northeast-1"]);
        assert_eq!(texts.iter().filter(|r| **r == "ap-northeast-2").count(), 1);
        assert!(texts.contains(&"xx-test-1"));
        assert!(texts.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_namespaces_are_sorted() {
        let items = resolver(Arc::new(MockInventory::default()))
            .resolve_raw("namespaces", &Value::Null)
            .await
            .unwrap();

        let texts = texts(&items);
        assert!(texts.contains(&"AWS/EC2"));
        assert!(texts.windows(2).all(|w| w[0] < w[1]));
    }
}

mod ec2_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_instance_attribute_by_tag_filter() {
        let mock = Arc::new(MockInventory {
            instances: vec![json!({
                "InstanceId": "i-12345678",
                "Tags": [{"Key": "Environment", "Value": "production"}]
            })],
            ..Default::default()
        });
        let items = resolver(mock.clone())
            .resolve_raw(
                "ec2_instance_attribute",
                &json!({
                    "region": "us-east-1",
                    "attributeName": "InstanceId",
                    "filters": {"tag:Environment": ["production"]}
                }),
            )
            .await
            .unwrap();

        assert_eq!(texts(&items), vec!["i-12345678"]);
        assert_eq!(
            *mock.seen_filters.lock().unwrap(),
            vec![FilterSpec::new("tag:Environment", vec!["production".into()])]
        );
    }

    #[tokio::test]
    async fn test_missing_attribute_skips_instance_only() {
        let mock = Arc::new(MockInventory {
            instances: vec![
                json!({"InstanceId": "i-1", "PrivateIpAddress": "10.0.0.1"}),
                json!({"InstanceId": "i-2"}),
                json!({"InstanceId": "i-3", "PrivateIpAddress": "10.0.0.3"}),
            ],
            ..Default::default()
        });
        let items = resolver(mock)
            .resolve_raw(
                "ec2_instance_attribute",
                &json!({"region": "us-east-1", "attributeName": "PrivateIpAddress"}),
            )
            .await
            .unwrap();

        assert_eq!(texts(&items), vec!["10.0.0.1", "10.0.0.3"]);
    }

    #[tokio::test]
    async fn test_instance_attribute_keeps_upstream_order() {
        let mock = Arc::new(MockInventory {
            instances: vec![
                json!({"InstanceId": "i-c", "Tags": [{"Key": "Name", "Value": "zeta"}]}),
                json!({"InstanceId": "i-a", "Tags": [{"Key": "Name", "Value": "alpha"}]}),
            ],
            ..Default::default()
        });
        let items = resolver(mock)
            .resolve_raw(
                "ec2_instance_attribute",
                &json!({"region": "us-east-1", "attributeName": "Tags.Name"}),
            )
            .await
            .unwrap();

        assert_eq!(texts(&items), vec!["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_ebs_volume_ids_in_instance_then_device_order() {
        let instances = (1..=4)
            .map(|i| {
                json!({
                    "InstanceId": format!("i-{}", i),
                    "BlockDeviceMappings": [
                        {"Ebs": {"VolumeId": format!("vol-{}-1", i)}},
                        {"Ebs": {"VolumeId": format!("vol-{}-2", i)}}
                    ]
                })
            })
            .collect();
        let mock = Arc::new(MockInventory {
            instances,
            ..Default::default()
        });

        let items = resolver(mock.clone())
            .resolve_raw(
                "ebs_volume_ids",
                &json!({"region": "us-east-1", "instanceId": "{i-1, i-2, i-3, i-4}"}),
            )
            .await
            .unwrap();

        assert_eq!(items.len(), 8);
        assert_eq!(
            texts(&items),
            vec![
                "vol-1-1", "vol-1-2", "vol-2-1", "vol-2-2", "vol-3-1", "vol-3-2", "vol-4-1",
                "vol-4-2"
            ]
        );
        assert!(items.iter().all(|i| i.text == i.value));
        assert_eq!(
            mock.seen_filters.lock().unwrap()[0],
            FilterSpec::new(
                "instance-id",
                vec!["i-1".into(), "i-2".into(), "i-3".into(), "i-4".into()]
            )
        );
    }
    #[tokio::test]
    async fn test_ebs_volume_ids_from_instance_id_list() {
        let mock = Arc::new(MockInventory {
            instances: vec![
                json!({"InstanceId": "i-1", "BlockDeviceMappings": [{"Ebs": {"VolumeId": "vol-1"}}]}),
                json!({"InstanceId": "i-2", "BlockDeviceMappings": [{"Ebs": {"VolumeId": "vol-2"}}]}),
            ],
            ..Default::default()
        });

        let items = resolver(mock.clone())
            .resolve_raw(
                "ebs_volume_ids",
                &json!({"region": "us-east-1", "instanceId": ["i-1", "i-2"]}),
            )
            .await
            .unwrap();

        assert_eq!(texts(&items), vec!["vol-1", "vol-2"]);
        assert_eq!(
            mock.seen_filters.lock().unwrap()[0],
            FilterSpec::new("instance-id", vec!["i-1".into(), "i-2".into()])
        );
    }
}

mod tagging_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_resource_arns_preserve_upstream_order() {
        let arns = [
            "arn:aws:ec2:us-east-1:123456789012:instance/i-12345678901234567",
            "arn:aws:ec2:us-east-1:123456789012:instance/i-76543210987654321",
        ];
        let mock = Arc::new(MockInventory {
            resources: arns
                .iter()
                .map(|arn| ResourceTagMapping {
                    resource_arn: arn.to_string(),
                    tags: vec![],
                })
                .collect(),
            ..Default::default()
        });

        let items = resolver(mock.clone())
            .resolve_raw(
                "resource_arns",
                &json!({
                    "region": "us-east-1",
                    "resourceType": "ec2:instance",
                    "tags": {"Environment": ["production"]}
                }),
            )
            .await
            .unwrap();

        assert_eq!(texts(&items), arns.to_vec());
        assert!(items.iter().all(|i| i.text == i.value));
        assert_eq!(
            *mock.seen_filters.lock().unwrap(),
            vec![FilterSpec::new("Environment", vec!["production".into()])]
        );
    }
}

mod error_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_unknown_query_type() {
        let mock = Arc::new(MockInventory::default());
        let err = resolver(mock.clone())
            .resolve_raw("bogus", &json!({"region": "us-east-1"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::UnsupportedQueryType(_)));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_region_fails_before_any_call() {
        let mock = Arc::new(MockInventory::default());
        let err = resolver(mock.clone())
            .resolve_raw("ebs_volume_ids", &json!({"instanceId": "i-1"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::InvalidParameter { .. }));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_partial() {
        let mock = Arc::new(MockInventory {
            instances: vec![json!({"InstanceId": "i-1"})],
            fail_with: Some(429),
            ..Default::default()
        });
        let err = resolver(mock)
            .resolve_raw(
                "ec2_instance_attribute",
                &json!({"region": "us-east-1", "attributeName": "InstanceId"}),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Upstream(UpstreamError::Status { status: 429, .. })
        ));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_failed_cache_fill_is_retried_next_call() {
        let mock = Arc::new(MockInventory {
            fail_with: Some(500),
            ..Default::default()
        });
        let resolver = resolver(mock.clone());
        let params = json!({"region": "us-east-1", "namespace": "Custom"});

        assert!(resolver.resolve_raw("metrics", &params).await.is_err());
        assert!(resolver.resolve_raw("metrics", &params).await.is_err());
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_blank_default_region_fails_before_any_call() {
        let mock = Arc::new(MockInventory::default());
        let resolver = Resolver::new(
            Inventory::from_client(mock.clone()),
            ResolverOptions {
                default_region: String::new(),
                ..ResolverOptions::default()
            },
        );

        let err = resolver
            .resolve_raw("metrics", &json!({"region": "default", "namespace": "Custom"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::InvalidParameter { ref name, .. } if name == "region"));
        assert!(err.is_client_error());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_region_list_is_rejected() {
        let mock = Arc::new(MockInventory::default());
        let err = resolver(mock.clone())
            .resolve_raw(
                "metrics",
                &json!({"region": ["us-east-1", "eu-west-1"], "namespace": "Custom"}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::InvalidParameter { .. }));
        assert_eq!(mock.calls(), 0);
    }
}

mod split_capability_scenarios {
    use super::*;

    /// Each capability can come from a different backend
    #[tokio::test]
    async fn test_capabilities_from_separate_backends() {
        let metrics = Arc::new(MockInventory {
            metrics: vec![metric("Latency", &[])],
            ..Default::default()
        });
        let compute = Arc::new(MockInventory {
            instances: vec![json!({"InstanceId": "i-1"})],
            ..Default::default()
        });
        let tagging = Arc::new(MockInventory::default());

        let resolver = Resolver::new(
            Inventory::new(metrics.clone(), compute.clone(), tagging.clone()),
            ResolverOptions::default(),
        );

        let items = resolver
            .resolve_raw("metrics", &json!({"region": "us-east-1", "namespace": "Custom"}))
            .await
            .unwrap();
        assert_eq!(texts(&items), vec!["Latency"]);

        let items = resolver
            .resolve_raw(
                "ec2_instance_attribute",
                &json!({"region": "us-east-1", "attributeName": "InstanceId"}),
            )
            .await
            .unwrap();
        assert_eq!(texts(&items), vec!["i-1"]);

        assert_eq!(metrics.calls(), 1);
        assert_eq!(compute.calls(), 1);
        assert_eq!(tagging.calls(), 0);
    }
}
