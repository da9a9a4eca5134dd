//! Component name generation.
//!
//! Candidate precedence for an element:
//!
//! 1. an explicit `data-component` attribute,
//! 2. its BEM block (or `block__element`) in PascalCase,
//! 3. its semantic kind (`<nav>` → `Navigation`),
//! 4. text it carries (heading, button or link text),
//! 5. a caller-provided fallback.
//!
//! Generic part names (`header`, `item`, `body`, ...) are prefixed with the
//! enclosing component's name, and every candidate is run through a
//! [`NameRegistry`] so that names are unique within one conversion.

use std::collections::BTreeSet;

use crate::dom::{NodeId, ParsedDocument, ParsedNode, SectionKind};
use crate::util::{pascal_case, split_words};

use super::bem::BemClass;

/// Globals a component name must not shadow.
const RESERVED_NAMES: &[&str] = &[
    "Array", "Audio", "Boolean", "Date", "Document", "Element", "Error", "Event", "Fragment",
    "Function", "History", "Image", "Infinity", "Intl", "JSON", "Location", "Map", "Math", "NaN",
    "Node", "Number", "Object", "Option", "Promise", "Proxy", "React", "Reflect", "RegExp",
    "Request", "Response", "Set", "Storage", "String", "StrictMode", "Suspense", "Symbol", "Text",
    "URL", "Window",
];

/// Part names that only make sense qualified by their parent component.
const CONTEXT_PARTS: &[&str] = &[
    "actions", "body", "content", "footer", "header", "image", "inner", "item", "list", "media",
    "meta", "title", "wrapper",
];

/// Classes that say nothing about what an element is.
const UTILITY_CLASSES: &[&str] = &[
    "active", "clearfix", "col", "column", "columns", "container", "container-fluid", "d-flex",
    "flex", "grid", "hidden", "row", "show", "visible",
];

/// Tracks names already handed out and resolves collisions.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    taken: BTreeSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with names that already exist.
    pub fn with_taken<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Return `base` if free, otherwise `base` with a numeric suffix one
    /// past the highest suffix already in use for that stem.
    ///
    /// ```
    /// use jsxkit::split::naming::NameRegistry;
    ///
    /// let mut names = NameRegistry::with_taken(["Panel", "Panel5", "Panel10"]);
    /// assert_eq!(names.claim("Panel"), "Panel11");
    /// ```
    pub fn claim(&mut self, base: &str) -> String {
        if !self.taken.contains(base) {
            self.taken.insert(base.to_string());
            return base.to_string();
        }
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        let stem = if stem.is_empty() { base } else { stem };
        let highest = self
            .taken
            .iter()
            .filter_map(|name| suffix_of(name, stem))
            .max()
            .unwrap_or(1);
        let name = highest
            .checked_add(1)
            .map(|next| format!("{stem}{next}"))
            .filter(|name| !self.taken.contains(name))
            .unwrap_or_else(|| self.first_free(stem));
        self.taken.insert(name.clone());
        name
    }

    /// The lowest `stem{n}` with `n >= 2` that is not taken.
    fn first_free(&self, stem: &str) -> String {
        (2u64..)
            .map(|n| format!("{stem}{n}"))
            .find(|name| !self.taken.contains(name))
            .unwrap_or_else(|| format!("{stem}{}", self.taken.len() + 2))
    }
}

/// The numeric suffix of `name` relative to `stem` (a bare stem counts as 1).
fn suffix_of(name: &str, stem: &str) -> Option<u64> {
    let rest = name.strip_prefix(stem)?;
    if rest.is_empty() {
        return Some(1);
    }
    if rest.chars().all(|c| c.is_ascii_digit()) {
        rest.parse().ok()
    } else {
        None
    }
}

/// Turn arbitrary text into a PascalCase identifier, or `None` if nothing
/// usable remains.
pub fn sanitize_identifier(text: &str) -> Option<String> {
    let mut name = pascal_case(text);
    if name.is_empty() {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Component");
    }
    if RESERVED_NAMES.contains(&name.as_str()) {
        name.push_str("View");
    }
    Some(name)
}

/// Whether a class carries no naming information.
pub fn is_utility_class(class: &str) -> bool {
    let lower = class.to_ascii_lowercase();
    UTILITY_CLASSES.contains(&lower.as_str())
        || lower.contains(':')
        || lower.chars().any(|c| c.is_ascii_digit())
        || ["is-", "has-", "js-", "u-"]
            .iter()
            .any(|p| lower.starts_with(p))
}

fn is_context_part(word: &str) -> bool {
    CONTEXT_PARTS.contains(&word.to_ascii_lowercase().as_str())
}

/// Name for a semantic kind.
pub fn semantic_name(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Header => "Header",
        SectionKind::Nav => "Navigation",
        SectionKind::Main => "MainContent",
        SectionKind::Footer => "Footer",
        SectionKind::Aside => "Sidebar",
        SectionKind::Article => "Article",
        SectionKind::Section => "Section",
        SectionKind::Form => "Form",
        SectionKind::Table => "DataTable",
        SectionKind::Card => "Card",
        SectionKind::Hero => "Hero",
    }
}

/// Produces unique component names for elements of one document.
#[derive(Debug, Default)]
pub struct NameGenerator {
    registry: NameRegistry,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: NameRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Reserve an exact name (e.g. the root component) through the registry.
    pub fn claim(&mut self, base: &str) -> String {
        let base = sanitize_identifier(base).unwrap_or_else(|| "Component".to_string());
        self.registry.claim(&base)
    }

    /// Generate and claim a name for element `id`.
    pub fn name_for(
        &mut self,
        doc: &ParsedDocument,
        id: NodeId,
        parent: Option<&str>,
        fallback: &str,
    ) -> String {
        let base = doc
            .node(id)
            .and_then(|node| candidate(doc, node, parent))
            .or_else(|| sanitize_identifier(fallback))
            .unwrap_or_else(|| "Component".to_string());
        self.registry.claim(&base)
    }
}

/// Unclaimed best candidate for a node.
fn candidate(doc: &ParsedDocument, node: &ParsedNode, parent: Option<&str>) -> Option<String> {
    if let Some(explicit) = node.attr("data-component").and_then(sanitize_identifier) {
        return Some(explicit);
    }
    if let Some(name) = bem_candidate(node, parent) {
        return Some(name);
    }
    if let Some(kind) = node.semantic.map(|s| s.kind) {
        let name = semantic_name(kind);
        return Some(qualify(name, parent));
    }
    content_candidate(doc, node)
}

fn bem_candidate(node: &ParsedNode, parent: Option<&str>) -> Option<String> {
    let class = node.classes().find(|c| !is_utility_class(c))?;
    let bem = BemClass::parse(class)?;
    let name = match &bem.element {
        Some(element) => format!("{} {element}", bem.block),
        None => bem.block.clone(),
    };
    let name = sanitize_identifier(&name)?;
    if bem.element.is_none() {
        return Some(qualify(&name, parent));
    }
    Some(name)
}

/// Prefix a generic part name with its parent (`Card` + `Header`).
fn qualify(name: &str, parent: Option<&str>) -> String {
    match parent {
        Some(parent) if is_context_part(name) && !name.starts_with(parent) => {
            format!("{parent}{name}")
        }
        _ => name.to_string(),
    }
}

fn content_candidate(doc: &ParsedDocument, node: &ParsedNode) -> Option<String> {
    let (text, suffix) = match node.tag_name() {
        "button" => (doc.text_content(node.id), "Button"),
        "a" => (doc.text_content(node.id), "Link"),
        _ => {
            let heading = doc.descendants(node.id).into_iter().find(|&d| {
                doc.node(d)
                    .is_some_and(|n| matches!(n.tag_name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6"))
            })?;
            (doc.text_content(heading), "")
        }
    };
    let words: Vec<String> = split_words(&text).into_iter().take(3).collect();
    if words.is_empty() {
        return None;
    }
    let mut name = sanitize_identifier(&words.join(" "))?;
    if !name.ends_with(suffix) {
        name.push_str(suffix);
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse};

    fn name_first(html: &str, tag: &str, parent: Option<&str>) -> String {
        let doc = parse(html, &ParseOptions::default()).unwrap();
        let id = doc.elements().find(|n| n.tag_name() == tag).unwrap().id;
        NameGenerator::new().name_for(&doc, id, parent, "Component")
    }

    #[test]
    fn test_claim_increments_past_highest_suffix() {
        let mut names = NameRegistry::with_taken(["Card", "Card2", "Card3"]);
        assert_eq!(names.claim("Card"), "Card4");
        assert_eq!(names.claim("Card"), "Card5");

        let mut names = NameRegistry::with_taken(["Panel", "Panel5", "Panel10"]);
        assert_eq!(names.claim("Panel"), "Panel11");
    }

    #[test]
    fn test_claim_free_name_and_second_claim() {
        let mut names = NameRegistry::new();
        assert_eq!(names.claim("Hero"), "Hero");
        assert_eq!(names.claim("Hero"), "Hero2");
        assert_eq!(names.claim("Hero2"), "Hero3");
    }

    #[test]
    fn test_claim_at_largest_suffix_falls_back_to_gap() {
        let max = format!("Card{}", u64::MAX);
        let mut names = NameRegistry::with_taken(["Card".to_string(), max.clone(), "Card2".into()]);
        let name = names.claim("Card");
        assert_eq!(name, "Card3");
        assert!(names.contains(&max));
        assert_ne!(names.claim("Card"), name);
    }

    #[test]
    fn test_suffix_ignores_other_stems() {
        let mut names = NameRegistry::with_taken(["Card", "CardList9"]);
        assert_eq!(names.claim("Card"), "Card2");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("pricing-table").as_deref(), Some("PricingTable"));
        assert_eq!(sanitize_identifier("404 page").as_deref(), Some("Component404Page"));
        assert_eq!(sanitize_identifier("image").as_deref(), Some("ImageView"));
        assert_eq!(sanitize_identifier("!!!"), None);
    }

    #[test]
    fn test_data_component_wins() {
        let html = r#"<nav data-component="main-menu" class="navbar">x</nav>"#;
        assert_eq!(name_first(html, "nav", None), "MainMenu");
    }

    #[test]
    fn test_bem_block_and_element() {
        assert_eq!(
            name_first(r#"<div class="pricing-card">x</div>"#, "div", None),
            "PricingCard"
        );
        assert_eq!(
            name_first(r#"<div class="card__header">x</div>"#, "div", None),
            "CardHeader"
        );
    }

    #[test]
    fn test_context_composition() {
        assert_eq!(
            name_first(r#"<div class="header">x</div>"#, "div", Some("Card")),
            "CardHeader"
        );
        assert_eq!(name_first("<footer>x</footer>", "footer", Some("Card")), "CardFooter");
        assert_eq!(name_first("<footer>x</footer>", "footer", None), "Footer");
    }

    #[test]
    fn test_semantic_and_content_names() {
        assert_eq!(name_first("<nav><a href=/>Home</a></nav>", "nav", None), "Navigation");
        assert_eq!(
            name_first("<button>sign up now</button>", "button", None),
            "SignUpNowButton"
        );
        assert_eq!(
            name_first("<div><h2>Meet the team</h2></div>", "div", None),
            "MeetTheTeam"
        );
    }

    #[test]
    fn test_utility_classes_fall_through() {
        assert_eq!(
            name_first(r#"<div class="container mt-4">x</div>"#, "div", None),
            "Component"
        );
    }
}
