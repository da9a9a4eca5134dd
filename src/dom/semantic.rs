//! Maps elements to structural section kinds.
//!
//! Classification looks at the tag first, then an explicit ARIA `role`, then
//! class-name keywords, and finally a content heuristic for hero banners.
//! Each rule carries a fixed confidence.

use serde::Serialize;

use super::{NodeId, ParsedDocument, ParsedNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Nav,
    Main,
    Footer,
    Aside,
    Article,
    Section,
    Form,
    Table,
    Card,
    Hero,
}

impl SectionKind {
    /// Lowercase label, also the base for generated component names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Nav => "nav",
            Self::Main => "main",
            Self::Footer => "footer",
            Self::Aside => "aside",
            Self::Article => "article",
            Self::Section => "section",
            Self::Form => "form",
            Self::Table => "table",
            Self::Card => "card",
            Self::Hero => "hero",
        }
    }
}

/// A semantic kind with a confidence in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub kind: SectionKind,
    pub confidence: f32,
}

impl Classification {
    fn new(kind: SectionKind, confidence: f32) -> Self {
        Self { kind, confidence }
    }
}

/// Map a tag name to its section kind.
pub fn tag_to_section(tag: &str) -> Option<Classification> {
    use SectionKind::*;
    let (kind, confidence) = match tag {
        "header" => (Header, 0.95),
        "nav" => (Nav, 0.95),
        "main" => (Main, 0.95),
        "footer" => (Footer, 0.95),
        "aside" => (Aside, 0.9),
        "article" => (Article, 0.9),
        "form" => (Form, 0.9),
        "table" => (Table, 0.9),
        "section" => (Section, 0.7),
        _ => return None,
    };
    Some(Classification::new(kind, confidence))
}

fn role_to_section(role: &str) -> Option<Classification> {
    use SectionKind::*;
    let kind = match role.trim().to_ascii_lowercase().as_str() {
        "banner" => Header,
        "navigation" => Nav,
        "main" => Main,
        "contentinfo" => Footer,
        "complementary" => Aside,
        "article" => Article,
        "form" | "search" => Form,
        "table" | "grid" => Table,
        "region" => Section,
        _ => return None,
    };
    Some(Classification::new(kind, 0.85))
}

fn class_to_section(node: &ParsedNode) -> Option<Classification> {
    for class in node.classes() {
        let lower = class.to_ascii_lowercase();
        let stem = lower.split("__").next().unwrap_or(&lower);
        let stem = stem.split("--").next().unwrap_or(stem);
        let kind = match stem {
            "hero" | "jumbotron" | "banner" | "masthead" | "splash" => SectionKind::Hero,
            "card" | "tile" => SectionKind::Card,
            "navbar" | "nav" | "navigation" | "menu" => SectionKind::Nav,
            "header" | "site-header" | "topbar" => SectionKind::Header,
            "footer" | "site-footer" => SectionKind::Footer,
            "sidebar" => SectionKind::Aside,
            _ => continue,
        };
        // Only the block itself counts, not `card__title`.
        if stem != lower && !lower.starts_with(&format!("{stem}--")) {
            continue;
        }
        return Some(Classification::new(kind, 0.8));
    }
    None
}

/// A section or div whose first element is an `h1` and that contains a call
/// to action reads as a hero banner.
fn looks_like_hero(doc: &ParsedDocument, node: &ParsedNode) -> bool {
    if !matches!(node.tag_name(), "section" | "div") {
        return false;
    }
    let first = doc
        .element_children(node.id)
        .first()
        .and_then(|&c| doc.node(c))
        .map(|c| c.tag_name().to_string());
    if first.as_deref() != Some("h1") {
        return false;
    }
    doc.descendants(node.id).into_iter().any(|d| {
        doc.node(d)
            .is_some_and(|n| matches!(n.tag_name(), "button" | "a"))
    })
}

/// Classify one element of a parsed document.
pub fn classify(doc: &ParsedDocument, id: NodeId) -> Option<Classification> {
    let node = doc.node(id).filter(|n| n.is_element())?;
    let by_tag = tag_to_section(node.tag_name());
    if by_tag.is_some_and(|c| c.confidence >= 0.9) {
        return by_tag;
    }
    if let Some(by_role) = node.attr("role").and_then(role_to_section) {
        return Some(by_role);
    }
    if let Some(by_class) = class_to_section(node) {
        return Some(by_class);
    }
    if looks_like_hero(doc, node) {
        return Some(Classification::new(SectionKind::Hero, 0.6));
    }
    by_tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse};

    fn classify_first(html: &str, tag: &str) -> Option<Classification> {
        let doc = parse(html, &ParseOptions::default()).unwrap();
        let id = doc.elements().find(|n| n.tag_name() == tag).unwrap().id;
        classify(&doc, id)
    }

    #[test]
    fn test_semantic_tags() {
        let c = classify_first("<header>Site</header>", "header").unwrap();
        assert_eq!(c.kind, SectionKind::Header);
        assert!(c.confidence > 0.9);
        assert_eq!(
            classify_first("<table><tr><td>1</td></tr></table>", "table").unwrap().kind,
            SectionKind::Table
        );
    }

    #[test]
    fn test_role_attribute() {
        let c = classify_first(r#"<div role="navigation">x</div>"#, "div").unwrap();
        assert_eq!(c.kind, SectionKind::Nav);
    }

    #[test]
    fn test_class_keywords_ignore_bem_elements() {
        assert_eq!(
            classify_first(r#"<div class="card">x</div>"#, "div").unwrap().kind,
            SectionKind::Card
        );
        assert_eq!(
            classify_first(r#"<div class="hero--dark">x</div>"#, "div").unwrap().kind,
            SectionKind::Hero
        );
        assert!(classify_first(r#"<div class="card__title">x</div>"#, "div").is_none());
    }

    #[test]
    fn test_hero_heuristic() {
        let c = classify_first(
            r#"<section><h1>Ship faster</h1><p>Copy</p><a href="/go">Start</a></section>"#,
            "section",
        )
        .unwrap();
        assert_eq!(c.kind, SectionKind::Hero);
        assert!((c.confidence - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_plain_div_is_unclassified() {
        assert!(classify_first("<div><p>Hello</p></div>", "div").is_none());
    }
}
