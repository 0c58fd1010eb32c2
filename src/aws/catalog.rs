//! Built-in namespace catalog
//!
//! Metric names and dimension keys of the AWS-published namespaces. Queries
//! for these namespaces are answered from here without calling ListMetrics;
//! any namespace missing from the catalog is treated as a custom namespace.

struct NamespaceDef {
    name: &'static str,
    metrics: &'static [&'static str],
    dimensions: &'static [&'static str],
}

const CATALOG: &[NamespaceDef] = &[
    NamespaceDef {
        name: "AWS/EBS",
        metrics: &[
            "BurstBalance",
            "VolumeConsumedReadWriteOps",
            "VolumeIdleTime",
            "VolumeQueueLength",
            "VolumeReadBytes",
            "VolumeReadOps",
            "VolumeThroughputPercentage",
            "VolumeTotalReadTime",
            "VolumeTotalWriteTime",
            "VolumeWriteBytes",
            "VolumeWriteOps",
        ],
        dimensions: &["VolumeId"],
    },
    NamespaceDef {
        name: "AWS/EC2",
        metrics: &[
            "CPUCreditBalance",
            "CPUCreditUsage",
            "CPUSurplusCreditBalance",
            "CPUSurplusCreditsCharged",
            "CPUUtilization",
            "DiskReadBytes",
            "DiskReadOps",
            "DiskWriteBytes",
            "DiskWriteOps",
            "EBSByteBalance%",
            "EBSIOBalance%",
            "EBSReadBytes",
            "EBSReadOps",
            "EBSWriteBytes",
            "EBSWriteOps",
            "NetworkIn",
            "NetworkOut",
            "NetworkPacketsIn",
            "NetworkPacketsOut",
            "StatusCheckFailed",
            "StatusCheckFailed_Instance",
            "StatusCheckFailed_System",
        ],
        dimensions: &[
            "AutoScalingGroupName",
            "ImageId",
            "InstanceId",
            "InstanceType",
        ],
    },
    NamespaceDef {
        name: "AWS/ELB",
        metrics: &[
            "BackendConnectionErrors",
            "HTTPCode_Backend_2XX",
            "HTTPCode_Backend_3XX",
            "HTTPCode_Backend_4XX",
            "HTTPCode_Backend_5XX",
            "HTTPCode_ELB_4XX",
            "HTTPCode_ELB_5XX",
            "HealthyHostCount",
            "Latency",
            "RequestCount",
            "SpilloverCount",
            "SurgeQueueLength",
            "UnHealthyHostCount",
        ],
        dimensions: &["AvailabilityZone", "LoadBalancerName"],
    },
    NamespaceDef {
        name: "AWS/Lambda",
        metrics: &[
            "ConcurrentExecutions",
            "DeadLetterErrors",
            "Duration",
            "Errors",
            "Invocations",
            "IteratorAge",
            "Throttles",
            "UnreservedConcurrentExecutions",
        ],
        dimensions: &["ExecutedVersion", "FunctionName", "Resource"],
    },
    NamespaceDef {
        name: "AWS/RDS",
        metrics: &[
            "BinLogDiskUsage",
            "CPUUtilization",
            "DatabaseConnections",
            "DiskQueueDepth",
            "FreeStorageSpace",
            "FreeableMemory",
            "NetworkReceiveThroughput",
            "NetworkTransmitThroughput",
            "ReadIOPS",
            "ReadLatency",
            "ReadThroughput",
            "ReplicaLag",
            "SwapUsage",
            "WriteIOPS",
            "WriteLatency",
            "WriteThroughput",
        ],
        dimensions: &[
            "DBClusterIdentifier",
            "DBInstanceIdentifier",
            "DatabaseClass",
            "EngineName",
        ],
    },
    NamespaceDef {
        name: "AWS/S3",
        metrics: &[
            "AllRequests",
            "BucketSizeBytes",
            "BytesDownloaded",
            "BytesUploaded",
            "FirstByteLatency",
            "GetRequests",
            "NumberOfObjects",
            "PutRequests",
            "TotalRequestLatency",
        ],
        dimensions: &["BucketName", "FilterId", "StorageType"],
    },
    NamespaceDef {
        name: "AWS/SQS",
        metrics: &[
            "ApproximateAgeOfOldestMessage",
            "ApproximateNumberOfMessagesDelayed",
            "ApproximateNumberOfMessagesNotVisible",
            "ApproximateNumberOfMessagesVisible",
            "NumberOfEmptyReceives",
            "NumberOfMessagesDeleted",
            "NumberOfMessagesReceived",
            "NumberOfMessagesSent",
            "SentMessageSize",
        ],
        dimensions: &["QueueName"],
    },
    NamespaceDef {
        name: "AWS/DynamoDB",
        metrics: &[
            "ConditionalCheckFailedRequests",
            "ConsumedReadCapacityUnits",
            "ConsumedWriteCapacityUnits",
            "ProvisionedReadCapacityUnits",
            "ProvisionedWriteCapacityUnits",
            "ReadThrottleEvents",
            "ReturnedItemCount",
            "SuccessfulRequestLatency",
            "SystemErrors",
            "ThrottledRequests",
            "UserErrors",
            "WriteThrottleEvents",
        ],
        dimensions: &["GlobalSecondaryIndexName", "Operation", "TableName"],
    },
];

fn find(namespace: &str) -> Option<&'static NamespaceDef> {
    CATALOG.iter().find(|ns| ns.name == namespace)
}

/// All catalogued namespaces
pub fn namespaces() -> Vec<&'static str> {
    CATALOG.iter().map(|ns| ns.name).collect()
}

/// Metric names of a catalogued namespace
pub fn metrics(namespace: &str) -> Option<&'static [&'static str]> {
    find(namespace).map(|ns| ns.metrics)
}

/// Dimension keys of a catalogued namespace
pub fn dimension_keys(namespace: &str) -> Option<&'static [&'static str]> {
    find(namespace).map(|ns| ns.dimensions)
}
