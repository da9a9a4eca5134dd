//! Normalized node tree produced by the parser.
//!
//! Nodes live in one vector indexed by [`NodeId`]; parent links are ids used
//! for lookup only. Ids are assigned in document order, so the root is always
//! `NodeId(0)` and a parent's id is smaller than any of its descendants'.

pub mod arena;
pub mod attributes;
pub mod element_ref;
pub mod semantic;
pub mod style;
pub mod tree_sink;

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use serde::Serialize;

use self::arena::{escape_attr, escape_text};
use self::attributes::{Attribute, EventHandler, is_void_element};
pub use self::semantic::{Classification, SectionKind};
use self::style::StyleDeclaration;

/// Stable identifier of a node within one parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Fragment,
}

/// Namespace an element was parsed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementNamespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

/// Attributes of an element, split by how they are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttributes {
    /// Every attribute as written, in source order.
    pub raw: Vec<(String, String)>,
    /// Plain attributes (everything except class, style and events).
    pub attrs: Vec<Attribute>,
    pub events: Vec<EventHandler>,
    pub style: Vec<StyleDeclaration>,
    /// The unparsed `style` attribute.
    pub style_source: Option<String>,
    /// Whitespace-normalized class string.
    pub class_name: Option<String>,
}

impl NodeAttributes {
    /// Raw attribute value by source name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.raw
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Individual class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// One node of the normalized tree.
#[derive(Debug, Clone)]
pub struct ParsedNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Lowercase tag name (SVG tags keep their adjusted case, e.g. `linearGradient`).
    pub tag: Option<String>,
    pub namespace: ElementNamespace,
    pub attributes: NodeAttributes,
    pub children: Vec<NodeId>,
    /// Payload of text and comment nodes.
    pub text: Option<String>,
    pub semantic: Option<Classification>,
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Rendered as `<tag />`: void elements and empty foreign elements.
    pub self_closing: bool,
}

impl ParsedNode {
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Tag name, or an empty string for non-elements.
    pub fn tag_name(&self) -> &str {
        self.tag.as_deref().unwrap_or_default()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes.classes()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attributes.has_class(class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn is_void(&self) -> bool {
        self.is_element() && is_void_element(self.tag_name())
    }
}

/// Facts collected about the whole document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub lang: Option<String>,
    pub viewport: Option<String>,
    pub charset: Option<String>,
    pub description: Option<String>,
    pub tags: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub ids: BTreeSet<String>,
    pub element_count: usize,
    pub text_count: usize,
    pub comment_count: usize,
    pub max_depth: usize,
    /// Bodies of every `<style>` element, in document order.
    pub stylesheets: Vec<String>,
    /// Set when `max_depth` cut off part of the tree.
    pub truncated: bool,
}

/// A subtree recognised as a structural section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SemanticSection {
    pub node: NodeId,
    pub kind: SectionKind,
    pub confidence: f32,
}

/// Result of parsing one markup string.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub(crate) nodes: Vec<ParsedNode>,
    pub metadata: DocumentMetadata,
    pub sections: Vec<SemanticSection>,
    pub warnings: Vec<String>,
}

impl ParsedDocument {
    /// The fragment node holding the body content.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&ParsedNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut ParsedNode> {
        self.nodes.get_mut(id.index())
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the body produced no content.
    pub fn is_empty(&self) -> bool {
        self.node(self.root()).is_none_or(|n| n.children.is_empty())
    }

    /// Element nodes in document order.
    pub fn elements(&self) -> impl Iterator<Item = &ParsedNode> {
        self.nodes.iter().filter(|n| n.is_element())
    }

    /// Children of `id` that are elements.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|&c| self.node(c).is_some_and(ParsedNode::is_element))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every node below `id` in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Number of element descendants of `id`.
    pub fn descendant_element_count(&self, id: NodeId) -> usize {
        self.descendants(id)
            .into_iter()
            .filter(|&d| self.node(d).is_some_and(ParsedNode::is_element))
            .count()
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.node(parent).and_then(|n| n.parent);
        }
        false
    }

    /// Concatenated, whitespace-collapsed text below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for d in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(node) = self.node(d)
                && node.kind == NodeKind::Text
                && let Some(text) = &node.text
            {
                out.push_str(text);
            }
        }
        crate::util::collapse_whitespace(&out).trim().to_string()
    }

    /// The semantic section rooted at `id`, if any.
    pub fn section_for(&self, id: NodeId) -> Option<&SemanticSection> {
        self.sections.iter().find(|s| s.node == id)
    }

    /// Serialize a node (and its subtree) back to HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match node.kind {
            NodeKind::Fragment => {
                for &child in &node.children {
                    self.write_html(child, out);
                }
            }
            NodeKind::Text => {
                let text = node.text.as_deref().unwrap_or_default();
                let raw = node
                    .parent
                    .and_then(|p| self.node(p))
                    .is_some_and(|p| matches!(p.tag_name(), "script" | "style"));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeKind::Comment => {
                let _ = write!(out, "<!--{}-->", node.text.as_deref().unwrap_or_default());
            }
            NodeKind::Element => {
                let tag = node.tag_name();
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.attributes.raw {
                    let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
                }
                if node.is_void() {
                    out.push('>');
                    return;
                }
                if node.self_closing {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in &node.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}
