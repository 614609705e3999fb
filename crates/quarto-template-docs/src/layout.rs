//! HTML layout for the documentation page.
//!
//! The page and the link snippet are minijinja templates compiled into the
//! binary. Both use HTML autoescaping; linked source is inserted with `safe`
//! because it is escaped before links are added.

use minijinja::{Environment, context};
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::index::PageModel;

const PAGE: &str = "page.html";
const TEMPLATE_LINK: &str = "template_link.html";

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template(PAGE, include_str!("../templates/page.html"))
        .expect("page layout is valid");
    env.add_template(TEMPLATE_LINK, include_str!("../templates/template_link.html"))
        .expect("template link snippet is valid");
    env
});

/// Render the full documentation page for `model`.
pub fn render_page(model: &dyn PageModel) -> Result<String> {
    let template = TEMPLATES.get_template(PAGE)?;
    let html = template.render(context! {
        template_links => model.template_links(),
        function_links => model.function_links(),
        definitions => model.definitions(),
    })?;
    Ok(html)
}

/// Render an anchor pointing at `#link` whose text is `source`.
pub fn render_template_link(link: &str, source: &str) -> Result<String> {
    let template = TEMPLATES.get_template(TEMPLATE_LINK)?;
    Ok(template.render(context! { link => link, source => source })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Definition;
    use crate::index::Link;
    use pretty_assertions::assert_eq;

    struct Fixed;

    impl PageModel for Fixed {
        fn template_links(&self) -> Vec<Link> {
            vec![Link::template("nav")]
        }

        fn function_links(&self) -> Vec<Link> {
            vec![Link::new(crate::anchor::AnchorKind::Function, "now")]
        }

        fn definitions(&self) -> Vec<Definition> {
            vec![Definition {
                name: "nav".into(),
                id: "template--nav".into(),
                source_html: "&lt;nav&gt;<a href=\"#template--x\">x</a>".into(),
            }]
        }
    }

    #[test]
    fn test_template_link_snippet() {
        let html = render_template_link("template--nav", "plain").unwrap();
        assert_eq!(html, "<a href=\"#template--nav\">plain</a>");
    }

    #[test]
    fn test_template_link_escapes_source() {
        let html = render_template_link("template--nav", "<b>").unwrap();
        assert!(html.starts_with("<a href=\"#template--nav\">"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_page_sections() {
        let html = render_page(&Fixed).unwrap();
        assert!(html.contains("<nav id=\"index\">"));
        assert!(html.contains("<a href=\"#template--nav\">"));
        assert!(html.contains("<a href=\"#function--now\">now</a>"));
        assert!(html.contains("<div class=\"define-template\" id=\"template--nav\">"));
        assert!(html.contains("<div class=\"define-function\" id=\"function--now\">"));
        // Linked source is inserted verbatim.
        assert!(html.contains("<pre>&lt;nav&gt;<a href=\"#template--x\">x</a></pre>"));
    }

    #[test]
    fn test_empty_page_still_renders() {
        struct Empty;
        impl PageModel for Empty {
            fn template_links(&self) -> Vec<Link> {
                Vec::new()
            }
            fn function_links(&self) -> Vec<Link> {
                Vec::new()
            }
            fn definitions(&self) -> Vec<Definition> {
                Vec::new()
            }
        }
        let html = render_page(&Empty).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("define-template"));
    }
}
