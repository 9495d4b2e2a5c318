//! Parsing entry points.

use scraper::Html;

use super::Document;

impl Document {
    /// Parse a full HTML document.
    ///
    /// html5ever always synthesizes `<html>`, `<head>` and `<body>`.
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        let root = html.tree.root().id();
        Self { html, root }
    }

    /// Parse an HTML fragment in `<body>` context.
    ///
    /// The fragment's top-level nodes become children of [`Document::root`].
    pub fn parse_fragment(html: &str) -> Self {
        let html = Html::parse_fragment(html);
        let root = html.root_element().id();
        Self { html, root }
    }
}

#[cfg(test)]
mod tests {
    use scraper::Node;

    use super::*;

    #[test]
    fn keeps_doctype() {
        let doc = Document::parse("<!DOCTYPE html><html><body></body></html>");
        assert_eq!(doc.doctype(), Some("html"));
        let bare = Document::parse("<p>no doctype</p>");
        assert_eq!(bare.doctype(), None);
    }

    #[test]
    fn repairs_missing_structure() {
        let doc = Document::parse("<p>loose</p>");
        assert!(doc.document_element().is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn fragment_top_level_nodes_under_root() {
        let doc = Document::parse_fragment(r#"<header id="header"></header><!-- c --><p>x</p>"#);
        let kinds: Vec<String> = doc
            .children(doc.root())
            .into_iter()
            .map(|c| match doc.element_ref(c) {
                Some(el) => el.value().name().to_string(),
                None if doc.html.tree.get(c).is_some_and(|n| n.value().is_comment()) => {
                    "#comment".to_string()
                }
                None => "#other".to_string(),
            })
            .collect();
        assert_eq!(kinds, vec!["header", "#comment", "p"]);
    }

    #[test]
    fn attributes_preserved() {
        let doc = Document::parse_fragment(
            r#"<a href="../about/index.html" data-base-path class="nav-link">About</a>"#,
        );
        let a = doc.select_first("a").unwrap();
        assert_eq!(doc.attr(a, "href"), Some("../about/index.html"));
        assert_eq!(doc.attr(a, "data-base-path"), Some(""));
        assert!(doc.has_class(a, "nav-link"));
    }

    #[test]
    fn noscript_content_is_raw_text() {
        let doc = Document::parse(r#"<body><noscript><img src="a.png"></noscript></body>"#);
        let noscript = doc.select_first("noscript").unwrap();
        let children = doc.children(noscript);
        assert_eq!(children.len(), 1);
        assert!(matches!(
            doc.html.tree.get(children[0]).map(|n| n.value()),
            Some(Node::Text(_))
        ));
        assert!(doc.select("img").is_empty());
    }

    #[test]
    fn entities_decoded_in_text() {
        let doc = Document::parse_fragment("<p>R&amp;D &lt;team&gt;</p>");
        assert_eq!(doc.text_content(doc.root()), "R&D <team>");
    }
}
