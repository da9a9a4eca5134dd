//! selectors crate Element implementation for ParsedDocument.
//!
//! Used to evaluate user-supplied component selectors (`.widget`,
//! `section > .panel`, `[data-component]`) against the parsed tree.

use std::fmt;

use html5ever::{LocalName, Namespace, ns};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, QuirksMode, SelectorCaches};
use selectors::matching::{
    ElementSelectorFlags, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags,
};
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::{ElementNamespace, NodeId, NodeKind, ParsedDocument, ParsedNode};

/// Selector implementation for the selectors crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSelectors;

/// Identifier string type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        let mut h: u32 = 0;
        for byte in self.0.bytes() {
            h = h.wrapping_mul(31).wrapping_add(byte as u32);
        }
        h
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for IdentStr {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Wrapper type for LocalName that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(LocalName::from(s))
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Wrapper type for Namespace that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'i> selectors::parser::Parser<'i> for MarkupSelectors {
    type Impl = MarkupSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// Pseudo-element type (required by the trait, never produced).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = MarkupSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

/// Non-TS pseudo-class type. Only `:link` can match a static mockup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
    Hover,
    Focus,
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = MarkupSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, Self::Hover)
    }

    fn is_user_action_state(&self) -> bool {
        matches!(self, Self::Hover | Self::Focus)
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Link => dest.write_str(":link"),
            Self::Hover => dest.write_str(":hover"),
            Self::Focus => dest.write_str(":focus"),
        }
    }
}

impl SelectorImpl for MarkupSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Reference to an element in a ParsedDocument for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub doc: &'a ParsedDocument,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(doc: &'a ParsedDocument, id: NodeId) -> Self {
        Self { doc, id }
    }

    fn node(&self) -> Option<&'a ParsedNode> {
        self.doc.node(self.id)
    }

    fn sibling_element(&self, step: isize) -> Option<Self> {
        let node = self.node()?;
        let parent = self.doc.node(node.parent?)?;
        let pos = parent.children.iter().position(|&c| c == self.id)? as isize;
        let mut i = pos + step;
        while i >= 0 && (i as usize) < parent.children.len() {
            let candidate = parent.children[i as usize];
            if self.doc.node(candidate).is_some_and(ParsedNode::is_element) {
                return Some(Self::new(self.doc, candidate));
            }
            i += step;
        }
        None
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("tag", &self.node().map(ParsedNode::tag_name))
            .finish()
    }
}

impl<'a> selectors::Element for ElementRef<'a> {
    type Impl = MarkupSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.node()?.parent?;
        self.doc
            .node(parent)
            .filter(|p| p.is_element())
            .map(|_| Self::new(self.doc, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(-1)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(1)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc
            .element_children(self.id)
            .first()
            .map(|&c| Self::new(self.doc, c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.node()
            .is_some_and(|n| n.namespace == ElementNamespace::Html)
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.node().is_some_and(|n| n.tag_name() == name.as_ref())
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        let Some(node) = self.node() else {
            return false;
        };
        let own = match node.namespace {
            ElementNamespace::Html => ns!(html),
            ElementNamespace::Svg => ns!(svg),
            ElementNamespace::MathMl => ns!(mathml),
        };
        own == ns.0
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.node().map(ParsedNode::tag_name) == other.node().map(ParsedNode::tag_name)
    }

    fn attr_matches(
        &self,
        _ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        self.node()
            .and_then(|n| n.attr(local_name.as_ref()))
            .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            NonTSPseudoClass::Link => self.is_link(),
            NonTSPseudoClass::Hover | NonTSPseudoClass::Focus => false,
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        self.node()
            .is_some_and(|n| n.tag_name() == "a" && n.attr("href").is_some())
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.node()
            .and_then(|n| n.attr("id"))
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.node().is_some_and(|n| {
            n.classes()
                .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        let Some(node) = self.node() else {
            return true;
        };
        node.children.iter().all(|&c| match self.doc.node(c) {
            Some(child) => match child.kind {
                NodeKind::Element => false,
                NodeKind::Text => child.text.as_deref().unwrap_or_default().trim().is_empty(),
                _ => true,
            },
            None => true,
        })
    }

    fn is_root(&self) -> bool {
        // The top-level elements of the fragment behave as roots.
        self.node()
            .and_then(|n| n.parent)
            .is_some_and(|p| p == self.doc.root())
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

/// A compiled selector list.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    pub source: String,
    list: SelectorList<MarkupSelectors>,
}

impl CompiledSelector {
    /// Compile a selector list, returning `None` if it does not parse.
    pub fn parse(source: &str) -> Option<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&MarkupSelectors, &mut parser, ParseRelative::No).ok()?;
        Some(Self {
            source: source.to_string(),
            list,
        })
    }

    /// Whether the element `id` matches any selector in the list.
    pub fn matches(&self, doc: &ParsedDocument, id: NodeId) -> bool {
        if !doc.node(id).is_some_and(ParsedNode::is_element) {
            return false;
        }
        let element = ElementRef::new(doc, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        self.list.slice().iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &element, &mut context)
        })
    }

    /// All matching elements in document order.
    pub fn select(&self, doc: &ParsedDocument) -> Vec<NodeId> {
        doc.elements()
            .map(|n| n.id)
            .filter(|&id| self.matches(doc, id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse};

    fn doc(html: &str) -> ParsedDocument {
        parse(html, &ParseOptions::default()).unwrap()
    }

    fn first(doc: &ParsedDocument, tag: &str) -> NodeId {
        doc.elements().find(|n| n.tag_name() == tag).unwrap().id
    }

    #[test]
    fn test_tag_and_class_selectors() {
        let d = doc(r#"<div><p class="intro highlight">Hello</p></div>"#);
        let p = first(&d, "p");
        assert!(CompiledSelector::parse("p").unwrap().matches(&d, p));
        assert!(CompiledSelector::parse(".intro").unwrap().matches(&d, p));
        assert!(CompiledSelector::parse("p.highlight").unwrap().matches(&d, p));
        assert!(!CompiledSelector::parse(".missing").unwrap().matches(&d, p));
    }

    #[test]
    fn test_combinators() {
        let d = doc("<div><span><p>Nested</p></span></div>");
        let p = first(&d, "p");
        assert!(CompiledSelector::parse("div p").unwrap().matches(&d, p));
        assert!(CompiledSelector::parse("span > p").unwrap().matches(&d, p));
        assert!(!CompiledSelector::parse("div > p").unwrap().matches(&d, p));
    }

    #[test]
    fn test_attribute_selector() {
        let d = doc(r#"<section data-component="Pricing"><h2>Plans</h2></section>"#);
        let sel = CompiledSelector::parse("[data-component]").unwrap();
        assert_eq!(sel.select(&d), vec![first(&d, "section")]);
    }

    #[test]
    fn test_sibling_selectors() {
        let d = doc("<ul><li>a</li><li>b</li><li class=last>c</li></ul>");
        let sel = CompiledSelector::parse("li + li.last").unwrap();
        assert_eq!(sel.select(&d).len(), 1);
        let sel = CompiledSelector::parse("li:first-child").unwrap();
        assert_eq!(sel.select(&d).len(), 1);
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        assert!(CompiledSelector::parse("div >").is_none());
        assert!(CompiledSelector::parse("").is_none());
    }
}
