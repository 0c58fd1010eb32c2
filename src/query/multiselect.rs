//! Multi-select value parsing
//!
//! Dashboard variables with several selected values are interpolated as
//! `{a,b,c}`. This turns such a field back into its individual values.

/// Split a possibly brace-wrapped, comma-separated field into trimmed tokens.
///
/// Only a brace pair enclosing the entire trimmed input triggers splitting;
/// anything else is one literal token. Empty tokens are dropped.
pub fn parse_multi_select(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let Some(inner) = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return vec![trimmed.to_string()];
    };

    inner
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Parse every entry of a list and concatenate the results in order
pub fn parse_multi_select_all<'a, I>(raw_values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    raw_values
        .into_iter()
        .flat_map(parse_multi_select)
        .collect()
}
