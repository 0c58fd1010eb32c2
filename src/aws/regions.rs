//! Known AWS regions

/// Regions that are always offered, merged with whatever DescribeRegions
/// reports (opt-in regions only appear there once enabled)
pub fn known_regions() -> Vec<String> {
    [
        // Africa / Asia Pacific
        "af-south-1",
        "ap-east-1",
        "ap-northeast-1",
        "ap-northeast-2",
        "ap-northeast-3",
        "ap-south-1",
        "ap-southeast-1",
        "ap-southeast-2",
        // Americas
        "ca-central-1",
        "sa-east-1",
        "us-east-1",
        "us-east-2",
        "us-west-1",
        "us-west-2",
        // China / GovCloud
        "cn-north-1",
        "cn-northwest-1",
        "us-gov-east-1",
        "us-gov-west-1",
        // Europe / Middle East
        "eu-central-1",
        "eu-north-1",
        "eu-south-1",
        "eu-west-1",
        "eu-west-2",
        "eu-west-3",
        "me-south-1",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}
