//! Stylesheet generation.
//!
//! Three strategies share one interface. Each one is built for a single
//! parsed document and answers two questions deterministically:
//!
//! - how an element's `class` and `style` are rendered in JSX
//!   ([`CssConverter::style_element`]), and
//! - what stylesheet (plus any config files) goes into the project
//!   ([`CssConverter::convert`]).
//!
//! Code generation and the CSS stage build their own converter from the same
//! document and options, so they agree without sharing state.

pub mod modules;
pub mod stylesheet;
pub mod tailwind;
pub mod vanilla;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dom::style::{StyleDeclaration, to_style_string};
use crate::dom::{ParsedDocument, ParsedNode};
use crate::error::{Error, Result};
use crate::parser::{ParseOptions, parse};
use crate::util::sha1_hex;

pub use self::modules::CssModulesConverter;
use self::stylesheet::{Declaration, Stylesheet};
pub use self::tailwind::TailwindConverter;
pub use self::vanilla::VanillaConverter;

/// Output shape for styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CssStrategy {
    /// Utility classes with an `@apply` layer for stylesheet rules.
    Tailwind,
    /// Locally scoped `styles.module.css` bound through `styles.x`.
    CssModules,
    /// One plain stylesheet with the original selectors.
    #[default]
    Vanilla,
}

impl CssStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tailwind => "tailwind",
            Self::CssModules => "css-modules",
            Self::Vanilla => "vanilla",
        }
    }
}

impl fmt::Display for CssStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CssStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tailwind" => Ok(Self::Tailwind),
            "css-modules" | "modules" | "module" => Ok(Self::CssModules),
            "vanilla" | "css" | "plain" => Ok(Self::Vanilla),
            other => Err(Error::Css(format!("unknown CSS strategy {other:?}"))),
        }
    }
}

/// CSS conversion configuration.
#[derive(Debug, Clone)]
pub struct CssOptions {
    pub strategy: CssStrategy,
    /// Move inline `style` attributes into generated classes.
    pub extract_inline_styles: bool,
    /// Carry rules from the document's `<style>` elements into the output.
    pub include_document_styles: bool,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            strategy: CssStrategy::default(),
            extract_inline_styles: true,
            include_document_styles: true,
        }
    }
}

impl CssOptions {
    pub fn new(strategy: CssStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_extract_inline_styles(mut self, extract: bool) -> Self {
        self.extract_inline_styles = extract;
        self
    }

    pub fn with_document_styles(mut self, include: bool) -> Self {
        self.include_document_styles = include;
        self
    }
}

/// How an element's class list is written in JSX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassBinding {
    /// `className="a b"`
    Literal(String),
    /// `className={expr}`
    Expression(String),
}

/// Class and remaining inline style of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementStyling {
    pub class: Option<ClassBinding>,
    pub style: Vec<StyleDeclaration>,
}

/// A file produced by a strategy, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssFile {
    pub path: String,
    pub contents: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssResult {
    pub strategy: CssStrategy,
    /// The consolidated stylesheet.
    pub css: String,
    pub stylesheet_path: String,
    /// Stylesheet first, then any strategy config files.
    pub files: Vec<CssFile>,
    /// Import for the application entry point (`src/main.jsx`), if global.
    pub entry_import: Option<String>,
    /// Declarations left as inline styles.
    pub unmapped: Vec<String>,
    pub warnings: Vec<String>,
}

/// One output strategy bound to one document.
pub trait CssConverter {
    fn strategy(&self) -> CssStrategy;

    /// How `node`'s class list and inline style are rendered.
    fn style_element(&self, node: &ParsedNode) -> ElementStyling;

    /// Import line a component file needs when any of its elements uses a
    /// [`ClassBinding::Expression`].
    fn component_import(&self) -> Option<String> {
        None
    }

    /// Produce the stylesheet and supporting files.
    fn convert(&self) -> CssResult;
}

/// Build the converter for `options.strategy`.
pub fn converter<'a>(doc: &'a ParsedDocument, options: &CssOptions) -> Box<dyn CssConverter + 'a> {
    match options.strategy {
        CssStrategy::Tailwind => Box::new(TailwindConverter::new(doc, options.clone())),
        CssStrategy::CssModules => Box::new(CssModulesConverter::new(doc, options.clone())),
        CssStrategy::Vanilla => Box::new(VanillaConverter::new(doc, options.clone())),
    }
}

/// Parse `markup` and convert its styles in one call.
pub fn convert(markup: &str, options: &CssOptions) -> Result<CssResult> {
    let doc = parse(markup, &ParseOptions::default())?;
    Ok(converter(&doc, options).convert())
}

/// Class generated for an inline style: `s-` plus a short content hash, so
/// identical styles share one class.
pub fn extracted_class_name(style: &[StyleDeclaration]) -> String {
    let digest = sha1_hex(to_style_string(style).as_bytes());
    format!("s-{}", &digest[..6])
}

/// Rules from every `<style>` element, in document order.
pub(crate) fn document_stylesheet(doc: &ParsedDocument) -> Stylesheet {
    let mut sheet = Stylesheet::default();
    for body in &doc.metadata.stylesheets {
        sheet.extend(Stylesheet::parse(body));
    }
    sheet
}

/// Extracted inline-style rules keyed by generated class name.
pub(crate) fn inline_rules(doc: &ParsedDocument) -> BTreeMap<String, Vec<Declaration>> {
    doc.elements()
        .filter(|n| !n.attributes.style.is_empty())
        .map(|n| {
            let style = &n.attributes.style;
            let decls = style
                .iter()
                .map(|d| Declaration::new(d.css_property.clone(), d.value.clone()))
                .collect();
            (extracted_class_name(style), decls)
        })
        .collect()
}

pub(crate) fn class_list(node: &ParsedNode) -> Vec<String> {
    node.classes().map(str::to_string).collect()
}

/// Literal binding for a class list, `None` when empty.
pub(crate) fn literal_binding(classes: &[String]) -> Option<ClassBinding> {
    (!classes.is_empty()).then(|| ClassBinding::Literal(classes.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><style>.card { padding: 16px; color: red } h1 { margin: 0 }</style></head>
<body><div class="card" style="display: flex; margin-top: 8px"><h1>T</h1></div>
<p style="display: flex; margin-top: 8px">same</p><span style="color: blue">x</span></body></html>"#;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("tailwind".parse::<CssStrategy>().unwrap(), CssStrategy::Tailwind);
        assert_eq!("CSS-Modules".parse::<CssStrategy>().unwrap(), CssStrategy::CssModules);
        assert_eq!("vanilla".parse::<CssStrategy>().unwrap(), CssStrategy::Vanilla);
        assert!("sass".parse::<CssStrategy>().is_err());
        assert_eq!(CssStrategy::CssModules.to_string(), "css-modules");
    }

    #[test]
    fn test_identical_styles_share_a_class() {
        let doc = parse(PAGE, &ParseOptions::default()).unwrap();
        let rules = inline_rules(&doc);
        assert_eq!(rules.len(), 2);
        assert!(rules.keys().all(|k| k.starts_with("s-") && k.len() == 8));
    }

    #[test]
    fn test_every_strategy_is_idempotent() {
        for strategy in [CssStrategy::Tailwind, CssStrategy::CssModules, CssStrategy::Vanilla] {
            let options = CssOptions::new(strategy);
            let first = convert(PAGE, &options).unwrap();
            let second = convert(PAGE, &options).unwrap();
            assert_eq!(first.css, second.css, "{strategy}");
            assert_eq!(first.files, second.files, "{strategy}");
        }
    }

    #[test]
    fn test_output_independent_of_element_order() {
        let a = r#"<p style="color: red">a</p><p style="margin: 0">b</p>"#;
        let b = r#"<p style="margin: 0">b</p><p style="color: red">a</p>"#;
        let options = CssOptions::new(CssStrategy::Vanilla);
        assert_eq!(convert(a, &options).unwrap().css, convert(b, &options).unwrap().css);
    }
}
