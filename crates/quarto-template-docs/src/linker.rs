//! Source linking: turn `{{template "name" ...}}` calls into hyperlinks.
//!
//! Linking is a text transformation over the escaped reproduction of a tree.
//! It never expands the invoked template, so self-referential and mutually
//! recursive templates need no special handling.

use once_cell::sync::Lazy;
use quarto_gotemplate::{Tree, ast::unquote};
use regex::{Captures, Regex};
use tracing::debug;

use crate::anchor::{AnchorKind, identifier};
use crate::layout;

/// A template invocation in escaped source. Ungreedy so that the first `}}`
/// ends each match; `.` stops at line ends.
static TEMPLATE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mU)\{\{template\s+&#34;.+&#34;.*\}\}").expect("template call pattern is valid")
});

/// The Go string literal naming the invoked template, in unescaped text.
static CALLED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\{\{template\s+("(?:\\.|[^\\"])*")"#).expect("called name pattern is valid")
});

/// Escape text the same way Go's `html.EscapeString` does.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`]. Unknown entities are left as they are.
pub fn unescape_html(s: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&#39;", '\''),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&#34;", '"'),
        ("&quot;", '"'),
    ];

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escaped source of `tree` with every template invocation linked to the
/// invoked template's section. Absent trees and roots produce `""`.
pub fn linkify(tree: Option<&Tree>) -> String {
    match tree.and_then(|t| t.root.as_ref()) {
        Some(root) => linkify_source(&root.to_string()),
        None => String::new(),
    }
}

/// Escape `source` and link its template invocations.
///
/// Never fails: text that does not look like a complete invocation is left
/// escaped but otherwise unchanged.
pub fn linkify_source(source: &str) -> String {
    let escaped = escape_html(source);
    TEMPLATE_CALL
        .replace_all(&escaped, |caps: &Captures<'_>| link_invocation(&caps[0]))
        .into_owned()
}

fn link_invocation(matched: &str) -> String {
    let call = unescape_html(matched);
    let Some(name) = CALLED_NAME
        .captures(&call)
        .and_then(|caps| caps.get(1))
        .and_then(|literal| unquote(literal.as_str()))
    else {
        return matched.to_string();
    };
    let link = identifier(AnchorKind::Template, &name);
    match layout::render_template_link(&link, &call) {
        Ok(html) => html,
        Err(err) => {
            debug!(%err, invocation = matched, "leaving template invocation unlinked");
            matched.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarto_gotemplate::TreeSet;

    fn parse_tree(name: &str, source: &str) -> Tree {
        let mut set = TreeSet::new();
        set.parse(name, source).expect("source should parse");
        set.get(name).cloned().expect("tree exists")
    }

    #[test]
    fn test_escape_matches_go() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let original = r#"&lt; literally, <b>"bold"</b> & 'quoted' &unknown;"#;
        assert_eq!(unescape_html(&escape_html(original)), original);
    }

    #[test]
    fn test_links_invocation() {
        let html = linkify(Some(&parse_tree("footer", r#"<footer>{{template "nav" .}}</footer>"#)));
        assert!(html.starts_with("&lt;footer&gt;<a href=\"#template--nav\">"), "{}", html);
        assert!(html.ends_with("</a>&lt;/footer&gt;"), "{}", html);
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_links_invocation_without_pipeline() {
        let html = linkify_source(r#"{{template "nav"}}"#);
        assert!(html.contains("<a href=\"#template--nav\">"), "{}", html);
    }

    #[test]
    fn test_links_each_invocation_independently() {
        let html = linkify_source("{{template \"a\" .}}{{template \"b\" .X}}\n{{template \"c\" .}}");
        assert!(html.contains("href=\"#template--a\""));
        assert!(html.contains("href=\"#template--b\""));
        assert!(html.contains("href=\"#template--c\""));
        assert_eq!(html.matches("<a ").count(), 3);
    }

    #[test]
    fn test_names_are_percent_encoded() {
        let html = linkify_source(r#"{{template "partials/a b&c" .}}"#);
        assert!(html.contains("href=\"#template--partials%2Fa%20b%26c\""), "{}", html);
    }

    #[test]
    fn test_escaped_names_link_to_their_sections() {
        let mut set = TreeSet::new();
        set.parse(
            "names",
            concat!(
                "{{define \"a\\\"b\"}}A{{end}}",
                "{{define \"t\\tb\"}}T{{end}}",
                "{{define \"back\\\\slash\"}}S{{end}}",
                "{{define \"c\"}}{{template \"a\\\"b\" .}}{{template \"t\\tb\"}}{{end}}",
                "{{define \"d\"}}{{template \"back\\\\slash\" .}}{{end}}",
            ),
        )
        .expect("names should parse");

        let ids: Vec<String> = set
            .iter()
            .map(|tree| identifier(AnchorKind::Template, &tree.name))
            .collect();
        let href = Regex::new(r##"href="#([^"]+)""##).unwrap();
        let mut targets = Vec::new();
        for caller in ["c", "d"] {
            let html = linkify(set.get(caller));
            for caps in href.captures_iter(&html) {
                targets.push(caps[1].to_string());
            }
        }
        assert_eq!(
            targets,
            vec!["template--a%22b", "template--t%09b", "template--back%5Cslash"]
        );
        for target in &targets {
            assert!(ids.contains(target), "{} has no section in {:?}", target, ids);
        }
    }

    #[test]
    fn test_undecodable_name_is_left_alone() {
        let source = r#"{{template "bad \q" .}}"#;
        assert_eq!(linkify_source(source), escape_html(source));
    }

    #[test]
    fn test_self_reference_is_plain_link() {
        let html = linkify(Some(&parse_tree(
            "loop",
            r#"{{if .Next}}{{template "loop" .Next}}{{end}}"#,
        )));
        assert!(html.contains("href=\"#template--loop\""));
    }

    #[test]
    fn test_source_without_invocations_is_only_escaped() {
        let source = "<p>{{.Title | printf \"%q\"}}</p>\n{{range .}}{{end}}";
        assert_eq!(linkify_source(source), escape_html(source));
    }

    #[test]
    fn test_malformed_invocations_are_left_alone() {
        for source in [
            "",
            "{{template \"unterminated",
            "{{template unquoted .}}",
            "{{template \"\" .}}",
            "\"\"\"\"",
            "{{{{template }}}}",
        ] {
            assert_eq!(linkify_source(source), escape_html(source), "for {:?}", source);
        }
    }

    #[test]
    fn test_never_shrinks_escaped_source() {
        for source in [
            "{{template \"a\" .}}",
            "{{template \"x\" {{template \"y\" .}} }}",
            "{{template \"é\" .}}{{template \"<>\" .}}",
            "{{template \"a\" . }}}}}}",
        ] {
            let linked = linkify_source(source);
            assert!(linked.len() >= escape_html(source).len(), "for {:?}", source);
        }
    }

    #[test]
    fn test_absent_tree_or_root() {
        assert_eq!(linkify(None), "");
        assert_eq!(linkify(Some(&Tree::new("rootless"))), "");
    }
}
