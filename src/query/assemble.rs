//! Result assembly
//!
//! Shapes resolved values into the `(text, value)` pairs returned to
//! dashboards. Every emitted item has a non-empty text and value.

use serde::{Deserialize, Serialize};

/// One selectable option of a template variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub text: String,
    pub value: String,
}

impl ResultItem {
    /// Item whose label is its own value; `None` when the value is empty
    pub fn same(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            return None;
        }
        Some(Self {
            text: value.clone(),
            value,
        })
    }
}

/// Sort ascending (case-sensitive, byte order) and drop duplicates
pub fn sorted_unique<I, S>(values: I) -> Vec<ResultItem>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
    values.sort_unstable();
    values.dedup();
    values.into_iter().filter_map(ResultItem::same).collect()
}

/// Keep the upstream order exactly, only dropping empty values
pub fn in_order<I, S>(values: I) -> Vec<ResultItem>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().filter_map(ResultItem::same).collect()
}
