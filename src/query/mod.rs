//! Template-variable query resolution
//!
//! # Architecture
//!
//! - [`multiselect`] - Splits `{a,b,c}` multi-value fields into tokens
//! - [`request`] - Validates the untyped parameter bag into a typed [`Query`]
//! - [`dispatch`] - Routes each query to its resolution routine
//! - [`assemble`] - Sorting, de-duplication and shaping of result items
//!
//! # Example
//!
//! ```ignore
//! use cwvars::query::{Resolver, ResolverOptions};
//!
//! async fn instance_ids(resolver: &Resolver) -> cwvars::error::Result<()> {
//!     let params = serde_json::json!({
//!         "region": "us-east-1",
//!         "attributeName": "InstanceId",
//!         "filters": {"tag:Environment": "{production, staging}"}
//!     });
//!     let items = resolver.resolve_raw("ec2_instance_attribute", &params).await?;
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod dispatch;
pub mod multiselect;
pub mod request;

pub use assemble::ResultItem;
pub use dispatch::{Resolver, ResolverOptions};
pub use multiselect::parse_multi_select;
pub use request::{Query, QueryType};
