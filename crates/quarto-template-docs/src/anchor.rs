//! Anchor identifiers shared by index links and page sections.
//!
//! Both the source linker and the index builder go through [`identifier`], so a
//! hyperlink target and the element it points at always agree. The
//! `template--` and `function--` prefixes are part of the page's public
//! contract: deep links depend on them.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub const TEMPLATE_PREFIX: &str = "template--";
pub const FUNCTION_PREFIX: &str = "function--";

/// Everything except unreserved URL characters is encoded.
const ANCHOR_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// What an anchor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    Template,
    Function,
}

impl AnchorKind {
    pub fn prefix(self) -> &'static str {
        match self {
            AnchorKind::Template => TEMPLATE_PREFIX,
            AnchorKind::Function => FUNCTION_PREFIX,
        }
    }
}

/// Build the anchor id for `name`.
pub fn identifier(kind: AnchorKind, name: &str) -> String {
    format!(
        "{}{}",
        kind.prefix(),
        utf8_percent_encode(name, ANCHOR_ENCODE_SET)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_unchanged() {
        assert_eq!(identifier(AnchorKind::Template, "nav"), "template--nav");
        assert_eq!(identifier(AnchorKind::Function, "now"), "function--now");
    }

    #[test]
    fn test_special_characters_are_encoded() {
        assert_eq!(
            identifier(AnchorKind::Template, "partials/nav bar\"x\""),
            "template--partials%2Fnav%20bar%22x%22"
        );
        assert_eq!(identifier(AnchorKind::Template, "é"), "template--%C3%A9");
    }

    #[test]
    fn test_kinds_never_collide() {
        for name in ["", "nav", "a b", "template--x"] {
            assert_ne!(
                identifier(AnchorKind::Template, name),
                identifier(AnchorKind::Function, name)
            );
        }
    }

    #[test]
    fn test_distinct_names_stay_distinct() {
        let names = ["a b", "a+b", "a%20b", "a/b", "a%2Fb", "A b"];
        let ids: std::collections::HashSet<String> = names
            .iter()
            .map(|n| identifier(AnchorKind::Template, n))
            .collect();
        assert_eq!(ids.len(), names.len());
    }

    #[test]
    fn test_identifier_is_deterministic() {
        assert_eq!(
            identifier(AnchorKind::Template, "x y"),
            identifier(AnchorKind::Template, "x y")
        );
    }
}
