//! Markup → [`ParsedDocument`].
//!
//! html5ever builds a raw [`ArenaDom`] with browser error recovery; this
//! module walks its `<body>` in document order, assigning ids and depths,
//! normalizing attributes, vacuuming layout whitespace and collecting
//! document metadata from `<head>`. Semantic classification runs last, once
//! the whole tree exists.

use html5ever::ns;

use crate::dom::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};
use crate::dom::attributes::{
    EventHandler, event_prop_name, is_void_element, normalize_attribute,
};
use crate::dom::semantic::classify;
use crate::dom::style::parse_inline_style;
use crate::dom::{
    DocumentMetadata, ElementNamespace, NodeAttributes, NodeId, NodeKind, ParsedDocument,
    ParsedNode, SemanticSection,
};
use crate::error::{Error, Result};
use crate::util::collapse_whitespace;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Deepest node depth kept (root fragment is depth 0). `None` keeps all.
    pub max_depth: Option<usize>,
    /// Keep comment nodes.
    pub preserve_comments: bool,
    /// Keep whitespace-only text and runs of whitespace verbatim.
    pub preserve_whitespace: bool,
    /// Minimum confidence for an element to be listed as a semantic section.
    pub section_threshold: f32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(64),
            preserve_comments: false,
            preserve_whitespace: false,
            section_threshold: 0.5,
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    pub fn with_whitespace(mut self, preserve: bool) -> Self {
        self.preserve_whitespace = preserve;
        self
    }

    pub fn with_section_threshold(mut self, threshold: f32) -> Self {
        self.section_threshold = threshold;
        self
    }
}

/// Parse markup into a normalized document.
///
/// Malformed markup never fails; it is repaired the way a browser would.
///
/// ```
/// use jsxkit::parser::{parse, ParseOptions};
///
/// let doc = parse("<ul><li>One<li>Two</ul>", &ParseOptions::default()).unwrap();
/// assert_eq!(doc.metadata.element_count, 3);
/// ```
pub fn parse(markup: &str, options: &ParseOptions) -> Result<ParsedDocument> {
    let arena = ArenaDom::parse(markup);
    from_arena(&arena, options)
}

/// Parse markup that may be absent.
///
/// `None` is a contract violation and fails with [`Error::MissingInput`];
/// an empty string is a valid, empty document.
pub fn parse_optional(markup: Option<&str>, options: &ParseOptions) -> Result<ParsedDocument> {
    parse(markup.ok_or(Error::MissingInput)?, options)
}

/// Build a [`ParsedDocument`] from an already parsed arena.
pub fn from_arena(arena: &ArenaDom, options: &ParseOptions) -> Result<ParsedDocument> {
    let html = arena
        .child_by_tag(arena.document(), "html")
        .ok_or_else(|| Error::Parse("document has no root element".into()))?;
    let body = arena
        .child_by_tag(html, "body")
        .ok_or_else(|| Error::Parse("document has no body".into()))?;

    let mut builder = Builder {
        arena,
        options,
        nodes: Vec::new(),
        metadata: DocumentMetadata::default(),
        warnings: Vec::new(),
    };
    builder.read_head(html);
    builder.metadata.lang = arena.get_attr(html, "lang").map(str::to_string);

    let root = builder.push(ParsedNode {
        id: NodeId(0),
        kind: NodeKind::Fragment,
        tag: None,
        namespace: ElementNamespace::Html,
        attributes: NodeAttributes::default(),
        children: Vec::new(),
        text: None,
        semantic: None,
        depth: 0,
        parent: None,
        self_closing: false,
    });
    builder.build_children(body, root, 1, false);

    let Builder {
        nodes,
        metadata,
        warnings,
        ..
    } = builder;
    let mut doc = ParsedDocument {
        nodes,
        metadata,
        sections: Vec::new(),
        warnings,
    };
    classify_sections(&mut doc, options.section_threshold);

    tracing::debug!(
        nodes = doc.len(),
        elements = doc.metadata.element_count,
        sections = doc.sections.len(),
        "parsed markup"
    );
    Ok(doc)
}

fn classify_sections(doc: &mut ParsedDocument, threshold: f32) {
    let ids: Vec<NodeId> = doc.elements().map(|n| n.id).collect();
    for id in ids {
        let Some(classification) = classify(doc, id) else {
            continue;
        };
        if let Some(node) = doc.node_mut(id) {
            node.semantic = Some(classification);
        }
        if classification.confidence >= threshold {
            doc.sections.push(SemanticSection {
                node: id,
                kind: classification.kind,
                confidence: classification.confidence,
            });
        }
    }
}

struct Builder<'a> {
    arena: &'a ArenaDom,
    options: &'a ParseOptions,
    nodes: Vec<ParsedNode>,
    metadata: DocumentMetadata,
    warnings: Vec<String>,
}

impl Builder<'_> {
    fn push(&mut self, mut node: ParsedNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.id = id;
        if let Some(parent) = node.parent
            && let Some(p) = self.nodes.get_mut(parent.index())
        {
            p.children.push(id);
        }
        self.metadata.max_depth = self.metadata.max_depth.max(node.depth);
        self.nodes.push(node);
        id
    }

    fn read_head(&mut self, html: ArenaNodeId) {
        let arena = self.arena;
        let Some(head) = arena.child_by_tag(html, "head") else {
            return;
        };
        for id in arena.descendants(head) {
            let Some(tag) = arena.element_name(id) else {
                continue;
            };
            match tag.as_ref() {
                "title" => {
                    let title = collapse_whitespace(&arena.collect_text(id)).trim().to_string();
                    if !title.is_empty() {
                        self.metadata.title = Some(title);
                    }
                }
                "meta" => self.read_meta(id),
                "style" => self.metadata.stylesheets.push(arena.collect_text(id)),
                _ => {}
            }
        }
    }

    fn read_meta(&mut self, id: ArenaNodeId) {
        let arena = self.arena;
        if let Some(charset) = arena.get_attr(id, "charset") {
            self.metadata.charset = Some(charset.trim().to_ascii_lowercase());
            return;
        }
        let content = arena.get_attr(id, "content").map(str::to_string);
        let name = arena
            .get_attr(id, "name")
            .or_else(|| arena.get_attr(id, "http-equiv"))
            .map(str::to_ascii_lowercase);
        match (name.as_deref(), content) {
            (Some("viewport"), Some(content)) => self.metadata.viewport = Some(content),
            (Some("description"), Some(content)) => self.metadata.description = Some(content),
            (Some("content-type"), Some(content)) => {
                if let Some((_, charset)) = content.to_ascii_lowercase().split_once("charset=") {
                    self.metadata.charset = Some(charset.trim().to_string());
                }
            }
            _ => {}
        }
    }

    /// Convert the children of `source` and attach them under `parent`.
    fn build_children(&mut self, source: ArenaNodeId, parent: NodeId, depth: usize, pre: bool) {
        let arena = self.arena;
        let children: Vec<ArenaNodeId> = arena.children(source).collect();
        if children.is_empty() {
            return;
        }
        if self.options.max_depth.is_some_and(|max| depth > max) {
            self.metadata.truncated = true;
            return;
        }

        let last = children.len() - 1;
        for (i, child) in children.into_iter().enumerate() {
            let Some(node) = arena.get(child) else {
                continue;
            };
            match &node.data {
                ArenaNodeData::Element { name, .. } => {
                    let id = self.build_element(child, name, parent, depth);
                    let tag = name.local.as_ref();
                    let raw_text = matches!(tag, "pre" | "textarea" | "script" | "style");
                    if !is_void_element(tag) {
                        self.build_children(child, id, depth + 1, pre || raw_text);
                    }
                    let childless = self.nodes[id.index()].children.is_empty();
                    let foreign = name.ns != ns!(html);
                    self.nodes[id.index()].self_closing =
                        is_void_element(tag) || (foreign && childless);
                }
                ArenaNodeData::Text(text) => {
                    let Some(text) = self.normalize_text(text, pre, i == 0, i == last) else {
                        continue;
                    };
                    self.metadata.text_count += 1;
                    self.push(leaf(NodeKind::Text, text, parent, depth));
                }
                ArenaNodeData::Comment(text) => {
                    self.metadata.comment_count += 1;
                    if self.options.preserve_comments {
                        self.push(leaf(NodeKind::Comment, text.clone(), parent, depth));
                    }
                }
                ArenaNodeData::Document | ArenaNodeData::Doctype { .. } => {}
            }
        }
    }

    fn normalize_text(&self, text: &str, pre: bool, first: bool, last: bool) -> Option<String> {
        if pre || self.options.preserve_whitespace {
            return (!text.is_empty()).then(|| text.to_string());
        }
        if text.trim().is_empty() {
            // Inline spacing between siblings survives; layout indentation does not.
            if text.contains('\n') || first || last {
                return None;
            }
            return Some(" ".to_string());
        }
        Some(collapse_whitespace(text))
    }

    fn build_element(
        &mut self,
        source: ArenaNodeId,
        name: &html5ever::QualName,
        parent: NodeId,
        depth: usize,
    ) -> NodeId {
        let arena = self.arena;
        let tag = name.local.to_string();
        let namespace = if name.ns == ns!(svg) {
            ElementNamespace::Svg
        } else if name.ns == ns!(mathml) {
            ElementNamespace::MathMl
        } else {
            ElementNamespace::Html
        };

        let mut attributes = NodeAttributes::default();
        for attr in arena.attrs(source) {
            let attr_name = attr.qualified_name();
            let value = attr.value.clone();
            attributes.raw.push((attr_name.clone(), value.clone()));

            if attr_name == "class" {
                let classes = collapse_whitespace(&value).trim().to_string();
                for class in classes.split_whitespace() {
                    self.metadata.classes.insert(class.to_string());
                }
                if !classes.is_empty() {
                    attributes.class_name = Some(classes);
                }
            } else if attr_name == "style" {
                attributes.style = parse_inline_style(&value);
                if attributes.style.is_empty() && !value.trim().is_empty() {
                    self.warnings.push(format!(
                        "<{tag}>: ignoring unparseable style attribute {value:?}"
                    ));
                }
                attributes.style_source = Some(value);
            } else if let Some(event) = event_prop_name(&attr_name) {
                attributes.events.push(EventHandler {
                    name: event,
                    source: attr_name,
                    handler: value,
                });
            } else {
                if attr_name == "id" && !value.trim().is_empty() {
                    self.metadata.ids.insert(value.trim().to_string());
                }
                attributes.attrs.push(normalize_attribute(&attr_name, &value));
            }
        }

        self.metadata.element_count += 1;
        self.metadata.tags.insert(tag.clone());
        if tag == "style" {
            self.metadata.stylesheets.push(arena.collect_text(source));
        }

        self.push(ParsedNode {
            id: NodeId(0),
            kind: NodeKind::Element,
            tag: Some(tag),
            namespace,
            attributes,
            children: Vec::new(),
            text: None,
            semantic: None,
            depth,
            parent: Some(parent),
            self_closing: false,
        })
    }
}

fn leaf(kind: NodeKind, text: String, parent: NodeId, depth: usize) -> ParsedNode {
    ParsedNode {
        id: NodeId(0),
        kind,
        tag: None,
        namespace: ElementNamespace::Html,
        attributes: NodeAttributes::default(),
        children: Vec::new(),
        text: Some(text),
        semantic: None,
        depth,
        parent: Some(parent),
        self_closing: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::attributes::AttrValue;

    fn parse_default(html: &str) -> ParsedDocument {
        parse(html, &ParseOptions::default()).unwrap()
    }

    fn element<'a>(doc: &'a ParsedDocument, tag: &str) -> &'a ParsedNode {
        doc.elements().find(|n| n.tag_name() == tag).unwrap()
    }

    #[test]
    fn test_root_is_fragment_of_body_children() {
        let doc = parse_default("<div>a</div><p>b</p>");
        let root = doc.node(doc.root()).unwrap();
        assert_eq!(root.kind, NodeKind::Fragment);
        assert_eq!(root.depth, 0);
        assert_eq!(root.children.len(), 2);
        assert_eq!(doc.node(root.children[0]).unwrap().depth, 1);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        assert!(matches!(
            parse_optional(None, &ParseOptions::default()),
            Err(Error::MissingInput)
        ));
        let empty = parse_optional(Some(""), &ParseOptions::default()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_attribute_normalization() {
        let doc = parse_default(
            r#"<label for="email" class=" a   b " onclick="go()" style="font-size: 12px" data-x="1">x</label>"#,
        );
        let label = element(&doc, "label");
        assert_eq!(label.attributes.class_name.as_deref(), Some("a b"));
        assert_eq!(label.attributes.events[0].name, "onClick");
        assert_eq!(label.attributes.events[0].handler, "go()");
        assert_eq!(label.attributes.style[0].property, "fontSize");
        let names: Vec<_> = label.attributes.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["htmlFor", "data-x"]);
    }

    #[test]
    fn test_boolean_attributes() {
        let doc = parse_default(r#"<input type="checkbox" checked disabled>"#);
        let input = element(&doc, "input");
        let checked = input.attributes.attrs.iter().find(|a| a.name == "checked").unwrap();
        assert_eq!(checked.value, AttrValue::Bool(true));
        assert!(input.self_closing);
        assert!(input.children.is_empty());
    }

    #[test]
    fn test_void_elements_never_get_children() {
        let doc = parse_default("<p>a<br>b<img src=x.png>c</p>");
        for node in doc.elements().filter(|n| n.is_void()) {
            assert!(node.children.is_empty(), "{} has children", node.tag_name());
        }
    }

    #[test]
    fn test_whitespace_vacuum() {
        let doc = parse_default("<div>\n  <p>Hello   <b>big</b> <i>world</i></p>\n</div>");
        let div = element(&doc, "div");
        assert_eq!(div.children.len(), 1);
        let p = element(&doc, "p");
        let texts: Vec<_> = p
            .children
            .iter()
            .filter_map(|&c| doc.node(c).and_then(|n| n.text.clone()))
            .collect();
        assert_eq!(texts, vec!["Hello ", " "]);
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let doc = parse_default("<pre>  a\n   b</pre>");
        let pre = element(&doc, "pre");
        let text = doc.node(pre.children[0]).unwrap().text.clone().unwrap();
        assert_eq!(text, "  a\n   b");
    }

    #[test]
    fn test_comments_are_optional() {
        let html = "<div><!-- note --><p>x</p></div>";
        let doc = parse_default(html);
        assert_eq!(doc.metadata.comment_count, 1);
        assert!(doc.nodes().iter().all(|n| n.kind != NodeKind::Comment));

        let doc = parse(html, &ParseOptions::default().with_comments(true)).unwrap();
        assert!(doc.nodes().iter().any(|n| n.kind == NodeKind::Comment));
    }

    #[test]
    fn test_max_depth_truncates() {
        let doc = parse(
            "<div><div><div><p>deep</p></div></div></div>",
            &ParseOptions::default().with_max_depth(Some(2)),
        )
        .unwrap();
        assert!(doc.metadata.truncated);
        assert!(doc.nodes().iter().all(|n| n.depth <= 2));
    }

    #[test]
    fn test_metadata() {
        let doc = parse_default(
            r#"<!DOCTYPE html><html lang="en"><head><meta charset="UTF-8">
            <meta name="viewport" content="width=device-width">
            <meta name="description" content="Demo page">
            <title> Landing </title><style>.a{color:red}</style></head>
            <body><div id="app" class="a"><p>x</p></div></body></html>"#,
        );
        let meta = &doc.metadata;
        assert_eq!(meta.title.as_deref(), Some("Landing"));
        assert_eq!(meta.lang.as_deref(), Some("en"));
        assert_eq!(meta.charset.as_deref(), Some("utf-8"));
        assert_eq!(meta.viewport.as_deref(), Some("width=device-width"));
        assert_eq!(meta.description.as_deref(), Some("Demo page"));
        assert!(meta.ids.contains("app"));
        assert!(meta.classes.contains("a"));
        assert_eq!(meta.stylesheets, vec![".a{color:red}"]);
        assert_eq!(meta.element_count, 2);
    }

    #[test]
    fn test_semantic_sections_are_collected() {
        let doc = parse_default("<header>h</header><main><p>m</p></main><footer>f</footer>");
        let kinds: Vec<_> = doc.sections.iter().map(|s| s.kind.label()).collect();
        assert_eq!(kinds, vec!["header", "main", "footer"]);
    }

    #[test]
    fn test_outer_html_round_trips_structure() {
        let doc = parse_default(r#"<div class="card"><img src="a.png"><p>Hi &amp; bye</p></div>"#);
        let div = element(&doc, "div");
        assert_eq!(
            doc.outer_html(div.id),
            r#"<div class="card"><img src="a.png"><p>Hi &amp; bye</p></div>"#
        );
    }
}
