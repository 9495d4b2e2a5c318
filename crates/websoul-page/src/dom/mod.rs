//! Owned, mutable HTML document.
//!
//! A [`Document`] is a `scraper::Html` tree edited in place through
//! `ego_tree`. Queries take CSS selectors and match them with
//! `scraper::Selector`; parsing and serialization both go through html5ever.
//! Detached nodes stay in the tree but are unreachable from the root.

mod parse;
mod serialize;

pub use ego_tree::NodeId;

use ego_tree::NodeRef;
use html5ever::{LocalName, Namespace, QualName};
use scraper::node::{Attributes, Element, Text};
use scraper::{ElementRef, Html, Node, Selector, StrTendril};
use tracing::debug;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse a CSS selector. Invalid selectors are logged and yield `None`.
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            debug!(css, error = %e, "invalid selector");
            None
        }
    }
}

/// Name of an attribute in no namespace.
fn attr_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

/// An HTML document or fragment.
#[derive(Clone, Debug)]
pub struct Document {
    html: Html,
    /// The tree root for documents, the `<html>` context element for fragments.
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document.
    pub fn new() -> Self {
        let html = Html::new_document();
        let root = html.tree.root().id();
        Self { html, root }
    }

    /// Node whose children are the document's (or fragment's) top level.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    /// Element payload, if `id` is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id)?.value().as_element()
    }

    /// `id` as a `scraper` element, for selector matching.
    pub fn element_ref(&self, id: NodeId) -> Option<ElementRef<'_>> {
        ElementRef::wrap(self.node(id)?)
    }

    /// Doctype name, if the source declared one.
    pub fn doctype(&self) -> Option<&str> {
        self.html
            .tree
            .root()
            .children()
            .find_map(|child| match child.value() {
                Node::Doctype(doctype) => Some(doctype.name()),
                _ => None,
            })
    }

    /// Lowercase tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    /// Parent node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent().map(|p| p.id())
    }

    /// Direct children.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    /// All descendants in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.descendants().skip(1).map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether element `id` matches `selector`.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element_ref(id)
            .is_some_and(|element| selector.matches(&element))
    }

    /// Elements under `scope` matching `css`, in document order.
    pub fn select_within(&self, scope: NodeId, css: &str) -> Vec<NodeId> {
        let Some(selector) = selector(css) else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.matches(*id, &selector))
            .collect()
    }

    /// Elements in the document matching `css`.
    pub fn select(&self, css: &str) -> Vec<NodeId> {
        self.select_within(self.root, css)
    }

    /// First element in the document matching `css`.
    pub fn select_first(&self, css: &str) -> Option<NodeId> {
        let selector = selector(css)?;
        self.node(self.root)?
            .descendants()
            .skip(1)
            .map(|node| node.id())
            .find(|id| self.matches(*id, &selector))
    }

    /// First element with `id="<id>"`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.node(self.root)?
            .descendants()
            .find(|node| node.value().as_element().and_then(Element::id) == Some(id))
            .map(|node| node.id())
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .into_iter()
            .find(|id| self.tag_name(*id) == Some("html"))
    }

    /// The `<body>` element.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .into_iter()
            .find(|id| self.tag_name(*id) == Some("body"))
    }

    /// `id` itself or its nearest ancestor matching `css`.
    pub fn closest(&self, id: NodeId, css: &str) -> Option<NodeId> {
        let selector = selector(css)?;
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, &selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Attribute of an element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Run `edit` on an element's attributes.
    ///
    /// `scraper` caches the id and class list on first use, so the element
    /// is rebuilt around the edited attributes.
    fn edit_attrs<R>(&mut self, id: NodeId, edit: impl FnOnce(&mut Attributes) -> R) -> Option<R> {
        let mut node = self.html.tree.get_mut(id)?;
        let Node::Element(element) = node.value() else {
            return None;
        };
        let mut attrs = std::mem::take(&mut element.attrs);
        let result = edit(&mut attrs);
        let mut rebuilt = Element::new(element.name.clone(), Vec::new());
        rebuilt.attrs = attrs;
        *element = rebuilt;
        Some(result)
    }

    /// Set or replace an attribute, keeping its position. No-op on
    /// non-elements.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let _ = self.edit_attrs(id, |attrs| {
            attrs.insert(attr_name(name), StrTendril::from_slice(value))
        });
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.edit_attrs(id, |attrs| attrs.shift_remove(&attr_name(name)))?
            .map(|value| value.to_string())
    }

    /// Class tokens of an element.
    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attr(id, "class").unwrap_or_default().split_whitespace()
    }

    /// Whether an element has a class token.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    /// Add a class token if absent.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.element(id).is_none() || self.has_class(id, class) {
            return;
        }
        let joined = match self.attr(id, "class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &joined);
    }

    /// Keep only the class tokens for which `keep` returns true.
    pub fn retain_classes(&mut self, id: NodeId, mut keep: impl FnMut(&str) -> bool) {
        let Some(current) = self.attr(id, "class") else {
            return;
        };
        let joined = current
            .split_whitespace()
            .filter(|c| keep(c))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &joined);
    }

    /// Remove a class token.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            self.retain_classes(id, |c| c != class);
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            for text in node.descendants().filter_map(|d| d.value().as_text()) {
                out.push_str(text);
            }
        }
        out
    }

    /// New detached HTML element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(name.to_ascii_lowercase()),
        );
        self.html
            .tree
            .orphan(Node::Element(Element::new(name, Vec::new())))
            .id()
    }

    /// New detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let text = Text {
            text: StrTendril::from_slice(text),
        };
        self.html.tree.orphan(Node::Text(text)).id()
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.node(child).is_none() {
            return;
        }
        if let Some(mut node) = self.html.tree.get_mut(parent) {
            let _ = node.append_id(child);
        }
    }

    /// Move `child` to the front of `parent`'s children.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.node(child).is_none() {
            return;
        }
        if let Some(mut node) = self.html.tree.get_mut(parent) {
            let _ = node.prepend_id(child);
        }
    }

    /// Unlink a node from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Unlink all children of a node.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.detach(child);
        }
    }

    /// Replace the children of `id` with the parsed nodes of `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        let fragment = Html::parse_fragment(html);
        self.clear_children(id);
        self.import_children(id, *fragment.root_element());
    }

    /// Deep-copy the children of `source` under `target`.
    fn import_children(&mut self, target: NodeId, source: NodeRef<'_, Node>) {
        for child in source.children() {
            let Some(mut parent) = self.html.tree.get_mut(target) else {
                return;
            };
            let copied = parent.append(child.value().clone()).id();
            self.import_children(copied, child);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
