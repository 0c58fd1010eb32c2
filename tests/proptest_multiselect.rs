//! Property-based tests using proptest
//!
//! These tests verify the multi-select parser against randomized inputs.

use cwvars::parse_multi_select;
use proptest::prelude::*;

/// A token as produced by a dashboard variable: no commas, braces or edge whitespace
fn arb_token() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_.:/-]{0,20}"
}

fn arb_token_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_token(), 1..10)
}

proptest! {
    /// Joining tokens as `{a, b, c}` and parsing gives the tokens back in order
    #[test]
    fn braced_list_round_trips(tokens in arb_token_list(), pad in "[ ]{0,3}") {
        let raw = format!("{pad}{{{}}}{pad}", tokens.join(&format!(",{pad}")));
        prop_assert_eq!(parse_multi_select(&raw), tokens);
    }

    /// A single parsed token re-wrapped in braces parses to itself
    #[test]
    fn single_token_reparse_is_stable(token in arb_token()) {
        let first = parse_multi_select(&token);
        prop_assert_eq!(first.len(), 1);

        let rewrapped = format!("{{{}}}", first.join(","));
        prop_assert_eq!(parse_multi_select(&rewrapped), first);
    }

    /// Tokens are never empty and never carry edge whitespace
    #[test]
    fn tokens_are_trimmed_and_non_empty(raw in ".{0,64}") {
        for token in parse_multi_select(&raw) {
            prop_assert!(!token.is_empty());
            prop_assert_eq!(token.trim(), token.as_str());
        }
    }

    /// Input not wrapped in braces is one literal token
    #[test]
    fn unwrapped_input_is_literal(prefix in arb_token(), inner in arb_token()) {
        let raw = format!("{prefix}{{{inner}}}");
        prop_assert_eq!(parse_multi_select(&raw), vec![raw.clone()]);
    }

    /// Parsing is deterministic
    #[test]
    fn parse_is_deterministic(raw in ".{0,64}") {
        prop_assert_eq!(parse_multi_select(&raw), parse_multi_select(&raw));
    }
}
