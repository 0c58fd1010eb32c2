//! Template-variable query resolver for CloudWatch-style inventories
//!
//! Turns a small query description (query type plus parameter bag) into an
//! ordered list of `(text, value)` options by calling metrics listing,
//! compute inventory and resource tag search services.

pub mod aws;
pub mod cache;
pub mod config;
pub mod error;
pub mod inventory;
pub mod query;

pub use error::{ResolveError, UpstreamError};
pub use inventory::{FilterSpec, Inventory};
pub use query::{parse_multi_select, Query, QueryType, Resolver, ResolverOptions, ResultItem};
