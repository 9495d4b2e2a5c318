//! HTML serialization through html5ever.
//!
//! Scripting is treated as enabled on both sides: html5ever parses
//! `<noscript>` contents as raw text, so they are written back unescaped.

use std::io;

use ego_tree::NodeRef;
use ego_tree::iter::Edge;
use html5ever::serialize::{self, Serialize, SerializeOpts, Serializer, TraversalScope};
use scraper::Node;
use tracing::warn;

use super::{Document, NodeId};

/// A node and its subtree, in the shape html5ever's serializer walks.
struct Subtree<'a>(NodeRef<'a, Node>);

impl Serialize for Subtree<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        let skip_self = matches!(traversal_scope, TraversalScope::ChildrenOnly(_));
        for edge in self.0.traverse() {
            match edge {
                Edge::Open(node) => {
                    if skip_self && node == self.0 {
                        continue;
                    }
                    match node.value() {
                        Node::Doctype(doctype) => serializer.write_doctype(doctype.name())?,
                        Node::Comment(comment) => serializer.write_comment(comment)?,
                        Node::Text(text) => serializer.write_text(text)?,
                        Node::Element(element) => {
                            let attrs = element.attrs.iter().map(|(name, value)| (name, &value[..]));
                            serializer.start_elem(element.name.clone(), attrs)?;
                        }
                        Node::Document | Node::Fragment | Node::ProcessingInstruction(_) => {}
                    }
                }
                Edge::Close(node) => {
                    if skip_self && node == self.0 {
                        continue;
                    }
                    if let Node::Element(element) = node.value() {
                        serializer.end_elem(element.name.clone())?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn write(node: NodeRef<'_, Node>, traversal_scope: TraversalScope) -> String {
    let opts = SerializeOpts {
        scripting_enabled: true,
        traversal_scope,
        create_missing_parent: false,
    };
    let mut buf = Vec::new();
    if let Err(e) = serialize::serialize(&mut buf, &Subtree(node), opts) {
        warn!(error = %e, "html serialization stopped early");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

impl Document {
    /// Serialize the whole document (doctype included) or fragment.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root)
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let parent = node.value().as_element().map(|el| el.name.clone());
        write(node, TraversalScope::ChildrenOnly(parent))
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        self.node(id)
            .map(|node| write(node, TraversalScope::IncludeNode))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_simple_document() {
        let doc = Document::parse(
            r#"<!DOCTYPE html><html><head></head><body><p class="x">hi</p></body></html>"#,
        );
        assert_eq!(
            doc.to_html(),
            r#"<!DOCTYPE html><html><head></head><body><p class="x">hi</p></body></html>"#
        );
    }

    #[test]
    fn attributes_keep_source_order() {
        let doc = Document::parse_fragment(r#"<img src="a.png" alt=""><br>"#);
        assert_eq!(doc.to_html(), r#"<img src="a.png" alt=""><br>"#);
    }

    #[test]
    fn escapes_text_and_attributes() {
        let mut doc = Document::parse_fragment("<p></p>");
        let p = doc.children(doc.root())[0];
        doc.set_attr(p, "title", r#"a "b" & c"#);
        let text = doc.create_text("1 < 2 & 3 > 2");
        doc.append_child(p, text);
        assert_eq!(
            doc.outer_html(p),
            r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3 &gt; 2</p>"#
        );
    }

    #[test]
    fn script_text_not_escaped() {
        let doc = Document::parse_fragment("<script>if (a < b && c) {}</script>");
        assert_eq!(doc.to_html(), "<script>if (a < b && c) {}</script>");
        let script = doc.select_first("script").unwrap();
        assert_eq!(doc.inner_html(script), "if (a < b && c) {}");
    }

    #[test]
    fn noscript_markup_survives() {
        let html = r#"<!DOCTYPE html><html><head></head><body><noscript><img src="a.png"></noscript></body></html>"#;
        let doc = Document::parse(html);
        assert_eq!(doc.to_html(), html);

        let mut page = Document::parse("<body><div id=\"footer-placeholder\"></div></body>");
        let target = page.element_by_id("footer-placeholder").unwrap();
        page.set_inner_html(target, r#"<noscript><img src="pixel.gif" alt=""></noscript>"#);
        assert_eq!(
            page.inner_html(target),
            r#"<noscript><img src="pixel.gif" alt=""></noscript>"#
        );
    }

    #[test]
    fn svg_namespaced_attributes_keep_prefix() {
        let markup = r##"<button id="mobileMenuToggle"><svg class="icon"><use xlink:href="#icon-menu"></use></svg></button>"##;
        let doc = Document::parse_fragment(markup);
        assert_eq!(doc.to_html(), markup);

        let mut page = Document::parse(r#"<body><div id="header-placeholder"></div></body>"#);
        let target = page.element_by_id("header-placeholder").unwrap();
        page.set_inner_html(target, markup);
        assert!(page.to_html().contains(r##"<use xlink:href="#icon-menu"></use>"##));
    }

    #[test]
    fn created_void_elements_have_no_end_tag() {
        let mut doc = Document::parse_fragment("<p></p>");
        let p = doc.children(doc.root())[0];
        let br = doc.create_element("BR");
        doc.append_child(p, br);
        assert_eq!(doc.outer_html(p), "<p><br></p>");
    }

    #[test]
    fn comments_preserved() {
        let doc = Document::parse_fragment("<!-- shared header -->");
        assert_eq!(doc.to_html(), "<!-- shared header -->");
    }

    #[test]
    fn detached_subtree_not_serialized() {
        let mut doc = Document::parse_fragment(r#"<p id="a">a</p><p id="b">b</p>"#);
        let a = doc.element_by_id("a").unwrap();
        doc.detach(a);
        assert_eq!(doc.to_html(), r#"<p id="b">b</p>"#);
        assert_eq!(doc.outer_html(a), r#"<p id="a">a</p>"#);
    }
}
