//! AWS inventory interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Inventory client implementing the capability traits over HTTP
//! - [`http`] - HTTP utilities for gateway action calls
//! - [`regions`] - Statically known regions
//! - [`catalog`] - Metric and dimension names of the AWS namespaces
//!
//! # Example
//!
//! ```ignore
//! use cwvars::aws::client::InventoryClient;
//! use cwvars::inventory::MetricsApi;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = InventoryClient::new("http://localhost:4000", "us-east-1", None)?;
//!     let metrics = client.list_metrics("us-east-1", Some("MyApp")).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod http;
pub mod regions;
