//! Component boundary detection.
//!
//! The splitter walks the parsed tree and decides, element by element,
//! whether it becomes its own component. Rules are tried in priority order
//! and the first one whose confidence clears the threshold wins:
//!
//! | rule | confidence |
//! |---|---|
//! | semantic tag (`header`, `nav`, `main`, `footer`, `aside`, `article`, `section`, `form`) | 0.7-0.95 |
//! | member of a repeating pattern | pattern similarity |
//! | BEM block root / component class keyword | 0.85 / 0.75 |
//! | custom selector / `data-component` | 0.9 / 0.95 |
//! | structural complexity | up to 0.8 |
//!
//! A repeating pattern yields one component (built from its first member);
//! the remaining members are rendered as instances of it by the parent. A
//! template that is also a semantic element keeps the semantic-tag reason.

pub mod bem;
pub mod naming;
pub mod pattern;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dom::element_ref::CompiledSelector;
use crate::dom::semantic::tag_to_section;
use crate::dom::{NodeId, NodeKind, ParsedDocument, ParsedNode, SectionKind};
use crate::error::Result;
use crate::parser::{ParseOptions, parse};

use self::bem::{BemInfo, block_root, decompose};
use self::naming::{NameGenerator, is_utility_class};
use self::pattern::{
    PatternDetectionResult, PatternId, PatternInstance, PatternOptions, PropSlot, detect_patterns,
};

/// Class keywords that mark an element as a reusable widget.
const COMPONENT_KEYWORDS: &[&str] = &[
    "accordion",
    "banner",
    "card",
    "carousel",
    "dropdown",
    "feature",
    "gallery",
    "hero",
    "modal",
    "navbar",
    "panel",
    "pricing",
    "sidebar",
    "tabs",
    "testimonial",
    "toolbar",
    "widget",
];

/// Tags that never become components and are not walked into.
const OPAQUE_TAGS: &[&str] = &["script", "style", "template", "svg", "math", "noscript"];

/// Type of a component prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Number,
    Boolean,
    Function,
    Unknown,
}

/// A prop a component accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PropType,
    pub required: bool,
    /// Default value as a JavaScript literal.
    pub default: Option<String>,
    /// Where the value is substituted in a pattern template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<PropSlot>,
}

impl PropDefinition {
    pub fn new(name: impl Into<String>, ty: PropType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            slot: None,
        }
    }
}

/// Index of a component within a [`SplitResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(pub u32);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Why an element was extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionReason {
    Root,
    SemanticTag,
    Pattern,
    ClassPattern,
    CustomSelector,
    Complexity,
}

impl ExtractionReason {
    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::SemanticTag => "semantic-tag",
            Self::Pattern => "pattern",
            Self::ClassPattern => "class-pattern",
            Self::CustomSelector => "custom-selector",
            Self::Complexity => "complexity",
        }
    }
}

/// Broad role of a component in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentRole {
    Page,
    Layout,
    Section,
    Item,
    Widget,
    Container,
}

/// Counts and flags describing a component's own markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    pub element_count: usize,
    pub text_count: usize,
    pub interactive: bool,
    pub has_form: bool,
    pub has_media: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub id: ComponentId,
    pub name: String,
    /// Node the component renders (the fragment root for a multi-root page).
    pub node: NodeId,
    pub tag: String,
    /// Original markup of the subtree.
    pub markup: String,
    pub depth: usize,
    pub classes: Vec<String>,
    pub bem: Option<BemInfo>,
    pub parent: Option<ComponentId>,
    pub children: Vec<ComponentId>,
    pub pattern: Option<PatternId>,
    pub role: ComponentRole,
    pub reason: ExtractionReason,
    pub confidence: f32,
    pub props: Vec<PropDefinition>,
    /// Elements rendered as `<Name ... />` with per-instance prop values.
    pub instances: Vec<PatternInstance>,
    pub metadata: ComponentMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// The child sits somewhere inside the parent's markup.
    Contains,
    /// The child is the parent's only element.
    Wraps,
    /// The parent renders the child once per pattern member.
    Renders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentEdge {
    pub from: ComponentId,
    pub to: ComponentId,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentTree {
    pub root: ComponentId,
    pub edges: Vec<ComponentEdge>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitMetadata {
    pub component_count: usize,
    pub pattern_count: usize,
    pub max_depth: usize,
    pub reasons: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResult {
    pub components: Vec<ComponentDefinition>,
    pub tree: ComponentTree,
    pub patterns: Vec<PatternDetectionResult>,
    pub metadata: SplitMetadata,
    pub warnings: Vec<String>,
}

impl SplitResult {
    pub fn root(&self) -> &ComponentDefinition {
        &self.components[self.tree.root.index()]
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentDefinition> {
        self.components.get(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&ComponentDefinition> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn pattern(&self, id: PatternId) -> Option<&PatternDetectionResult> {
        self.patterns.get(id.0 as usize)
    }
}

/// Splitter configuration.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Name of the root component (defaults to `App`).
    pub root_name: Option<String>,
    pub patterns: PatternOptions,
    pub detect_patterns: bool,
    /// Minimum confidence for a rule to extract an element.
    pub confidence_threshold: f32,
    /// Descendant element count at which complexity alone extracts.
    pub complexity_threshold: usize,
    /// Extra selectors marking component roots.
    pub custom_selectors: Vec<String>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            root_name: None,
            patterns: PatternOptions::default(),
            detect_patterns: true,
            confidence_threshold: 0.6,
            complexity_threshold: 12,
            custom_selectors: Vec::new(),
        }
    }
}

impl SplitOptions {
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub fn with_min_occurrences(mut self, min: usize) -> Self {
        self.patterns.min_occurrences = min;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.patterns.similarity_threshold = threshold;
        self
    }

    pub fn with_custom_selector(mut self, selector: impl Into<String>) -> Self {
        self.custom_selectors.push(selector.into());
        self
    }

    pub fn with_complexity_threshold(mut self, threshold: usize) -> Self {
        self.complexity_threshold = threshold;
        self
    }
}

/// Parse and split markup in one call.
pub fn split(markup: &str, options: &SplitOptions) -> Result<SplitResult> {
    let doc = parse(markup, &ParseOptions::default())?;
    ComponentSplitter::new(options.clone()).split(&doc)
}

/// Splits a parsed document into component definitions.
#[derive(Debug, Clone, Default)]
pub struct ComponentSplitter {
    options: SplitOptions,
}

struct Decision {
    reason: ExtractionReason,
    confidence: f32,
}

struct SplitState<'a> {
    doc: &'a ParsedDocument,
    names: NameGenerator,
    components: Vec<ComponentDefinition>,
    edges: Vec<ComponentEdge>,
    pattern_of: HashMap<NodeId, PatternId>,
    templated: HashMap<PatternId, ComponentId>,
    selectors: Vec<CompiledSelector>,
    warnings: Vec<String>,
}

impl ComponentSplitter {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Split `doc` into components. Always yields at least the root.
    pub fn split(&self, doc: &ParsedDocument) -> Result<SplitResult> {
        let patterns = if self.options.detect_patterns {
            detect_patterns(doc, &self.options.patterns)
        } else {
            Vec::new()
        };

        let mut warnings = Vec::new();
        let mut selectors = Vec::new();
        for source in &self.options.custom_selectors {
            match CompiledSelector::parse(source) {
                Some(selector) => selectors.push(selector),
                None => warnings.push(format!("ignoring invalid component selector {source:?}")),
            }
        }

        let mut state = SplitState {
            doc,
            names: NameGenerator::new(),
            components: Vec::new(),
            edges: Vec::new(),
            pattern_of: patterns
                .iter()
                .flat_map(|p| p.members.iter().map(move |&m| (m, p.id)))
                .collect(),
            templated: HashMap::new(),
            selectors,
            warnings,
        };

        let root_node = root_node(doc);
        let root_name = self
            .options
            .root_name
            .clone()
            .or_else(|| doc.node(root_node).and_then(|n| n.attr("data-component")).map(str::to_string))
            .unwrap_or_else(|| "App".to_string());
        let root_name = state.names.claim(&root_name);
        let root = state.add(root_node, root_name, None, Decision {
            reason: ExtractionReason::Root,
            confidence: 1.0,
        }, None);

        let children = doc.node(root_node).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.visit(&mut state, child, root, &patterns);
        }

        let SplitState {
            components,
            edges,
            warnings,
            ..
        } = state;
        let mut reasons = BTreeMap::new();
        for component in &components {
            *reasons.entry(component.reason.label().to_string()).or_insert(0) += 1;
        }
        let metadata = SplitMetadata {
            component_count: components.len(),
            pattern_count: patterns.len(),
            max_depth: components.iter().map(|c| c.depth).max().unwrap_or(0),
            reasons,
        };
        tracing::debug!(
            components = metadata.component_count,
            patterns = metadata.pattern_count,
            "split document"
        );

        Ok(SplitResult {
            components,
            tree: ComponentTree { root, edges },
            patterns,
            metadata,
            warnings,
        })
    }

    fn visit(
        &self,
        state: &mut SplitState<'_>,
        id: NodeId,
        owner: ComponentId,
        patterns: &[PatternDetectionResult],
    ) {
        let doc = state.doc;
        let Some(node) = doc.node(id).filter(|n| n.is_element()) else {
            return;
        };
        if OPAQUE_TAGS.contains(&node.tag_name()) {
            return;
        }

        if let Some(&pattern_id) = state.pattern_of.get(&id) {
            self.visit_pattern_member(state, id, owner, &patterns[pattern_id.0 as usize]);
            return;
        }

        let mut next_owner = owner;
        if let Some(decision) = self.decide(state, node) {
            let parent_name = state.components[owner.index()].name.clone();
            let name = state.names.name_for(doc, id, Some(&parent_name), "Component");
            next_owner = state.add(id, name, Some(owner), decision, None);
        }
        for &child in &node.children {
            self.visit(state, child, next_owner, patterns);
        }
    }

    fn visit_pattern_member(
        &self,
        state: &mut SplitState<'_>,
        id: NodeId,
        owner: ComponentId,
        pattern: &PatternDetectionResult,
    ) {
        if state.templated.contains_key(&pattern.id) || pattern.template() != id {
            return;
        }
        let parent_name = state.components[owner.index()].name.clone();
        let name = state
            .names
            .name_for(state.doc, id, Some(&parent_name), &pattern.label);
        let decision = state
            .doc
            .node(id)
            .and_then(|node| self.semantic_decision(node))
            .unwrap_or(Decision {
                reason: ExtractionReason::Pattern,
                confidence: pattern.confidence,
            });
        let component = state.add(id, name, Some(owner), decision, Some(pattern));
        state.templated.insert(pattern.id, component);
    }

    /// The semantic-tag rule, which outranks every other rule including
    /// pattern membership.
    fn semantic_decision(&self, node: &ParsedNode) -> Option<Decision> {
        if !matches!(
            node.tag_name(),
            "header" | "nav" | "main" | "footer" | "aside" | "article" | "section" | "form"
        ) {
            return None;
        }
        let section = tag_to_section(node.tag_name())?;
        (section.confidence >= self.options.confidence_threshold).then_some(Decision {
            reason: ExtractionReason::SemanticTag,
            confidence: section.confidence,
        })
    }

    /// Apply the extraction rules in priority order.
    fn decide(&self, state: &SplitState<'_>, node: &ParsedNode) -> Option<Decision> {
        let threshold = self.options.confidence_threshold;
        let doc = state.doc;
        let clears = |reason, confidence: f32| {
            (confidence >= threshold).then_some(Decision { reason, confidence })
        };

        if let Some(decision) = self.semantic_decision(node) {
            return Some(decision);
        }

        if block_root(doc, node.id).is_some()
            && let Some(decision) = clears(ExtractionReason::ClassPattern, 0.85)
        {
            return Some(decision);
        }
        let keyword = node.classes().any(|class| {
            let lower = class.to_ascii_lowercase();
            !lower.contains("__")
                && COMPONENT_KEYWORDS
                    .iter()
                    .any(|k| lower == *k || lower.starts_with(&format!("{k}-")) || lower.ends_with(&format!("-{k}")))
        });
        if keyword && let Some(decision) = clears(ExtractionReason::ClassPattern, 0.75) {
            return Some(decision);
        }

        let explicit = node.attr("data-component").is_some_and(|v| !v.trim().is_empty());
        if explicit && let Some(decision) = clears(ExtractionReason::CustomSelector, 0.95) {
            return Some(decision);
        }
        if state.selectors.iter().any(|s| s.matches(doc, node.id))
            && let Some(decision) = clears(ExtractionReason::CustomSelector, 0.9)
        {
            return Some(decision);
        }

        let complexity = self.options.complexity_threshold.max(1);
        let count = doc.descendant_element_count(node.id);
        let ratio = (count as f32 / complexity as f32).min(1.0);
        if count >= complexity / 2 {
            return clears(ExtractionReason::Complexity, ratio * 0.8);
        }
        None
    }
}

impl SplitState<'_> {
    fn add(
        &mut self,
        node_id: NodeId,
        name: String,
        parent: Option<ComponentId>,
        decision: Decision,
        pattern: Option<&PatternDetectionResult>,
    ) -> ComponentId {
        let doc = self.doc;
        let id = ComponentId(self.components.len() as u32);
        let node = doc.node(node_id);
        let classes: Vec<String> = node
            .map(|n| n.classes().map(str::to_string).collect())
            .unwrap_or_default();
        let tag = node
            .map(|n| if n.is_element() { n.tag_name() } else { "fragment" })
            .unwrap_or("fragment")
            .to_string();

        let role = match (decision.reason, node.and_then(|n| n.semantic)) {
            (ExtractionReason::Root, _) => ComponentRole::Page,
            _ if pattern.is_some() => ComponentRole::Item,
            (_, Some(s)) => match s.kind {
                SectionKind::Header
                | SectionKind::Nav
                | SectionKind::Main
                | SectionKind::Footer
                | SectionKind::Aside => ComponentRole::Layout,
                SectionKind::Card => ComponentRole::Widget,
                _ => ComponentRole::Section,
            },
            (ExtractionReason::ClassPattern | ExtractionReason::CustomSelector, None) => {
                ComponentRole::Widget
            }
            _ => ComponentRole::Container,
        };

        let (props, instances, pattern_id) = match pattern {
            Some(p) => (p.props.clone(), p.instances.clone(), Some(p.id)),
            None => (Vec::new(), Vec::new(), None),
        };

        if let Some(parent) = parent {
            let parent_node = self.components[parent.index()].node;
            let kind = if pattern.is_some() {
                EdgeKind::Renders
            } else if doc.element_children(parent_node) == [node_id] {
                EdgeKind::Wraps
            } else {
                EdgeKind::Contains
            };
            self.edges.push(ComponentEdge {
                from: parent,
                to: id,
                kind,
            });
            self.components[parent.index()].children.push(id);
        }

        let markup = doc.outer_html(node_id);
        let depth = node.map(|n| n.depth).unwrap_or(0);
        tracing::trace!(
            component = %name,
            reason = decision.reason.label(),
            confidence = decision.confidence,
            "extracted component"
        );
        self.components.push(ComponentDefinition {
            id,
            name,
            node: node_id,
            tag,
            markup,
            depth,
            bem: decompose(classes.iter().map(String::as_str).filter(|c| !is_utility_class(c))),
            classes,
            parent,
            children: Vec::new(),
            pattern: pattern_id,
            role,
            reason: decision.reason,
            confidence: decision.confidence,
            props,
            instances,
            metadata: component_metadata(doc, node_id),
        });
        id
    }
}

/// The single top-level element, or the fragment when there are several.
fn root_node(doc: &ParsedDocument) -> NodeId {
    let root = doc.root();
    let Some(fragment) = doc.node(root) else {
        return root;
    };
    let elements = doc.element_children(root);
    let stray_text = fragment.children.iter().any(|&c| {
        doc.node(c)
            .is_some_and(|n| n.kind == NodeKind::Text && n.text.as_deref().is_some_and(|t| !t.trim().is_empty()))
    });
    match elements.as_slice() {
        [only] if !stray_text && doc.node(*only).is_some_and(|n| !OPAQUE_TAGS.contains(&n.tag_name())) => *only,
        _ => root,
    }
}

fn component_metadata(doc: &ParsedDocument, id: NodeId) -> ComponentMetadata {
    let mut meta = ComponentMetadata::default();
    for node in std::iter::once(id)
        .chain(doc.descendants(id))
        .filter_map(|d| doc.node(d))
    {
        match node.kind {
            NodeKind::Element => {
                meta.element_count += 1;
                let tag = node.tag_name();
                if !node.attributes.events.is_empty()
                    || matches!(tag, "button" | "a" | "input" | "select" | "textarea" | "details")
                {
                    meta.interactive = true;
                }
                if matches!(tag, "form" | "input" | "select" | "textarea") {
                    meta.has_form = true;
                }
                if matches!(tag, "img" | "picture" | "video" | "audio" | "svg" | "iframe") {
                    meta.has_media = true;
                }
            }
            NodeKind::Text => meta.text_count += 1,
            _ => {}
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_default(html: &str) -> SplitResult {
        split(html, &SplitOptions::default()).unwrap()
    }

    fn names(result: &SplitResult) -> Vec<&str> {
        result.components.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_single_container_is_one_component() {
        let result = split_default(r#"<div class="container"><p>Hello World</p></div>"#);
        assert_eq!(names(&result), vec!["App"]);
        let root = result.root();
        assert_eq!(root.tag, "div");
        assert_eq!(root.reason, ExtractionReason::Root);
        assert_eq!(root.classes, vec!["container"]);
    }

    #[test]
    fn test_empty_document_has_only_root() {
        let result = split_default("");
        assert_eq!(result.components.len(), 1);
        assert_eq!(result.root().tag, "fragment");
    }

    #[test]
    fn test_semantic_sections_become_components() {
        let result = split_default(
            "<header><h1>Site</h1></header><main><p>Body</p></main><footer>(c)</footer>",
        );
        assert_eq!(names(&result), vec!["App", "Header", "MainContent", "Footer"]);
        assert!(result.components[1..]
            .iter()
            .all(|c| c.reason == ExtractionReason::SemanticTag));
        assert!(result.tree.edges.iter().all(|e| e.kind == EdgeKind::Contains));
    }

    #[test]
    fn test_pattern_yields_one_component_with_instances() {
        let items: String = (1..=5)
            .map(|i| format!(r#"<li class="card"><h3>Item {i}</h3></li>"#))
            .collect();
        let result = split_default(&format!("<ul>{items}</ul>"));
        assert_eq!(result.patterns.len(), 1);
        let card = result.by_name("Card").unwrap();
        assert_eq!(card.reason, ExtractionReason::Pattern);
        assert_eq!(card.instances.len(), 5);
        assert_eq!(card.pattern, Some(result.patterns[0].id));
        assert_eq!(card.props[0].name, "title");
        let edge = result.tree.edges.iter().find(|e| e.to == card.id).unwrap();
        assert_eq!(edge.kind, EdgeKind::Renders);
    }

    #[test]
    fn test_semantic_tag_outranks_pattern_membership() {
        let result = split_default(
            "<div><section><h2>A</h2></section><section><h2>B</h2></section><section><h2>C</h2></section></div>",
        );
        assert_eq!(result.patterns.len(), 1);
        let section = result
            .components
            .iter()
            .find(|c| c.pattern.is_some())
            .unwrap();
        assert_eq!(section.reason, ExtractionReason::SemanticTag);
        assert_eq!(section.role, ComponentRole::Item);
        assert_eq!(section.pattern, Some(result.patterns[0].id));
        assert_eq!(section.instances.len(), 3);
        assert_eq!(result.components.len(), 2);
        let edge = result.tree.edges.iter().find(|e| e.to == section.id).unwrap();
        assert_eq!(edge.kind, EdgeKind::Renders);
    }

    #[test]
    fn test_bem_block_and_context_naming() {
        let result = split_default(
            r#"<div><div class="profile"><div class="profile__body"><p>x</p></div></div><p>y</p></div>"#,
        );
        let profile = result.by_name("Profile").unwrap();
        assert_eq!(profile.reason, ExtractionReason::ClassPattern);
        assert_eq!(profile.bem.as_ref().unwrap().block, "profile");
    }

    #[test]
    fn test_data_component_and_custom_selector() {
        let options = SplitOptions::default().with_custom_selector(".promo");
        let result = split(
            r#"<div><div data-component="signup-box"><p>a</p></div><aside class="promo-x"><p>b</p></aside><div class="promo"><p>c</p></div></div>"#,
            &options,
        )
        .unwrap();
        let signup = result.by_name("SignupBox").unwrap();
        assert_eq!(signup.reason, ExtractionReason::CustomSelector);
        let promo = result
            .components
            .iter()
            .find(|c| c.classes == ["promo"])
            .unwrap();
        assert_eq!(promo.reason, ExtractionReason::CustomSelector);
    }

    #[test]
    fn test_invalid_selector_is_a_warning() {
        let options = SplitOptions::default().with_custom_selector("div >");
        let result = split("<p>x</p>", &options).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_complexity_threshold() {
        let inner: String = (0..12).map(|i| format!("<span>{i}</span>")).collect();
        let html = format!("<div><div><p>{inner}</p></div><p>x</p></div>");
        let result = split_default(&html);
        assert!(result
            .components
            .iter()
            .any(|c| c.reason == ExtractionReason::Complexity));
    }

    #[test]
    fn test_names_are_unique() {
        let result = split_default(
            "<section><h2>A</h2></section><div><section><h2>B</h2></section></div><section><p>C</p></section>",
        );
        let mut all = names(&result);
        let before = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), before);
    }

    #[test]
    fn test_wraps_edge() {
        let result = split_default("<div><main><p>x</p></main></div><p>y</p>");
        let main = result.by_name("MainContent").unwrap();
        let edge = result.tree.edges.iter().find(|e| e.to == main.id).unwrap();
        assert_eq!(edge.kind, EdgeKind::Contains);

        let result = split_default("<section><article><p>x</p></article></section><p>y</p>");
        let article = result.by_name("Article").unwrap();
        let edge = result.tree.edges.iter().find(|e| e.to == article.id).unwrap();
        assert_eq!(edge.kind, EdgeKind::Wraps);
    }
}
