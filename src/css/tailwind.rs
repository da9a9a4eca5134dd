//! Tailwind utility mapping.
//!
//! Inline declarations become utility classes: a fixed table for keyword
//! properties, the default spacing scale for lengths that fall on it, and
//! arbitrary values (`p-[13px]`, `[grid-area:main]`) otherwise. Declarations
//! whose values cannot be written as an arbitrary value stay inline.
//! Single-class stylesheet rules whose declarations all map are moved into an
//! `@layer components` block with `@apply`; everything else is kept as plain
//! CSS after the layer.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::dom::style::StyleDeclaration;
use crate::dom::{ParsedDocument, ParsedNode};

use super::stylesheet::{CssRule, Declaration, Stylesheet, format_rule};
use super::{
    CssConverter, CssFile, CssOptions, CssResult, CssStrategy, ElementStyling, class_list,
    document_stylesheet, literal_binding,
};

pub const STYLESHEET_PATH: &str = "src/styles/tailwind.css";

const CONFIG: &str = r#"/** @type {import('tailwindcss').Config} */
export default {
  content: ['./index.html', './src/**/*.{js,jsx,ts,tsx}'],
  theme: {
    extend: {},
  },
  plugins: [],
};
"#;

const POSTCSS_CONFIG: &str = r#"export default {
  plugins: {
    tailwindcss: {},
    autoprefixer: {},
  },
};
"#;

/// Keyword values with a direct utility.
const KEYWORDS: &[(&str, &str, &str)] = &[
    ("align-items", "baseline", "items-baseline"),
    ("align-items", "center", "items-center"),
    ("align-items", "flex-end", "items-end"),
    ("align-items", "flex-start", "items-start"),
    ("align-items", "stretch", "items-stretch"),
    ("cursor", "default", "cursor-default"),
    ("cursor", "not-allowed", "cursor-not-allowed"),
    ("cursor", "pointer", "cursor-pointer"),
    ("display", "block", "block"),
    ("display", "contents", "contents"),
    ("display", "flex", "flex"),
    ("display", "grid", "grid"),
    ("display", "inline", "inline"),
    ("display", "inline-block", "inline-block"),
    ("display", "inline-flex", "inline-flex"),
    ("display", "inline-grid", "inline-grid"),
    ("display", "none", "hidden"),
    ("display", "table", "table"),
    ("flex-direction", "column", "flex-col"),
    ("flex-direction", "column-reverse", "flex-col-reverse"),
    ("flex-direction", "row", "flex-row"),
    ("flex-direction", "row-reverse", "flex-row-reverse"),
    ("flex-wrap", "nowrap", "flex-nowrap"),
    ("flex-wrap", "wrap", "flex-wrap"),
    ("font-style", "italic", "italic"),
    ("font-style", "normal", "not-italic"),
    ("font-weight", "100", "font-thin"),
    ("font-weight", "200", "font-extralight"),
    ("font-weight", "300", "font-light"),
    ("font-weight", "400", "font-normal"),
    ("font-weight", "500", "font-medium"),
    ("font-weight", "600", "font-semibold"),
    ("font-weight", "700", "font-bold"),
    ("font-weight", "800", "font-extrabold"),
    ("font-weight", "900", "font-black"),
    ("font-weight", "bold", "font-bold"),
    ("font-weight", "normal", "font-normal"),
    ("justify-content", "center", "justify-center"),
    ("justify-content", "flex-end", "justify-end"),
    ("justify-content", "flex-start", "justify-start"),
    ("justify-content", "space-around", "justify-around"),
    ("justify-content", "space-between", "justify-between"),
    ("justify-content", "space-evenly", "justify-evenly"),
    ("list-style", "none", "list-none"),
    ("list-style-type", "none", "list-none"),
    ("overflow", "auto", "overflow-auto"),
    ("overflow", "hidden", "overflow-hidden"),
    ("overflow", "scroll", "overflow-scroll"),
    ("overflow", "visible", "overflow-visible"),
    ("position", "absolute", "absolute"),
    ("position", "fixed", "fixed"),
    ("position", "relative", "relative"),
    ("position", "static", "static"),
    ("position", "sticky", "sticky"),
    ("text-align", "center", "text-center"),
    ("text-align", "justify", "text-justify"),
    ("text-align", "left", "text-left"),
    ("text-align", "right", "text-right"),
    ("text-decoration", "line-through", "line-through"),
    ("text-decoration", "none", "no-underline"),
    ("text-decoration", "underline", "underline"),
    ("text-transform", "capitalize", "capitalize"),
    ("text-transform", "lowercase", "lowercase"),
    ("text-transform", "none", "normal-case"),
    ("text-transform", "uppercase", "uppercase"),
    ("white-space", "nowrap", "whitespace-nowrap"),
];

/// Length properties and their utility prefix.
const LENGTHS: &[(&str, &str)] = &[
    ("bottom", "bottom"),
    ("gap", "gap"),
    ("height", "h"),
    ("left", "left"),
    ("margin", "m"),
    ("margin-bottom", "mb"),
    ("margin-left", "ml"),
    ("margin-right", "mr"),
    ("margin-top", "mt"),
    ("max-height", "max-h"),
    ("max-width", "max-w"),
    ("min-height", "min-h"),
    ("min-width", "min-w"),
    ("padding", "p"),
    ("padding-bottom", "pb"),
    ("padding-left", "pl"),
    ("padding-right", "pr"),
    ("padding-top", "pt"),
    ("right", "right"),
    ("top", "top"),
    ("width", "w"),
];

/// Steps of the default spacing scale (in units of 0.25rem / 4px).
const SPACING_STEPS: &[u32] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 60,
    64, 72, 80, 96,
];

const NAMED_COLORS: &[&str] = &["black", "inherit", "transparent", "white"];

pub struct TailwindConverter<'a> {
    doc: &'a ParsedDocument,
    options: CssOptions,
}

impl<'a> TailwindConverter<'a> {
    pub fn new(doc: &'a ParsedDocument, options: CssOptions) -> Self {
        Self { doc, options }
    }

    /// Utilities for an inline style plus the declarations left unmapped.
    fn map_inline(style: &[StyleDeclaration]) -> (Vec<String>, Vec<StyleDeclaration>) {
        let mut utilities = Vec::new();
        let mut rest = Vec::new();
        for decl in style {
            match utility_for(&decl.css_property, &decl.value) {
                Some(utility) => {
                    if !utilities.contains(&utility) {
                        utilities.push(utility);
                    }
                }
                None => rest.push(decl.clone()),
            }
        }
        (utilities, rest)
    }

    fn render(&self) -> (String, BTreeSet<String>) {
        let mut out = String::from("@tailwind base;\n@tailwind components;\n@tailwind utilities;\n");
        let mut unmapped = BTreeSet::new();

        if self.options.include_document_styles {
            let sheet = document_stylesheet(self.doc);
            let mut layer = String::new();
            let mut plain = Stylesheet::default();
            for rule in sheet.rules {
                let applied = match &rule {
                    CssRule::Style(style) if style.single_class().is_some() => {
                        apply_utilities(&style.declarations)
                    }
                    _ => None,
                };
                let layered = match (&rule, applied) {
                    (CssRule::Style(style), Some(utilities)) => {
                        let _ = writeln!(
                            layer,
                            "  {} {{\n    @apply {};\n  }}",
                            style.selectors.trim(),
                            utilities.join(" ")
                        );
                        true
                    }
                    _ => false,
                };
                if !layered {
                    plain.rules.push(rule);
                }
            }
            if !layer.is_empty() {
                let _ = write!(out, "\n@layer components {{\n{layer}}}\n");
            }
            if !plain.is_empty() {
                out.push('\n');
                out.push_str(&plain.to_css());
            }
        }

        if self.options.extract_inline_styles {
            let mut leftovers: Vec<(String, Vec<Declaration>)> = Vec::new();
            for node in self.doc.elements() {
                let (_, rest) = Self::map_inline(&node.attributes.style);
                for decl in &rest {
                    unmapped.insert(format!("{}: {}", decl.css_property, decl.value));
                }
                if !rest.is_empty() {
                    let class = super::extracted_class_name(&rest);
                    if !leftovers.iter().any(|(c, _)| *c == class) {
                        let decls = rest
                            .iter()
                            .map(|d| Declaration::new(d.css_property.clone(), d.value.clone()))
                            .collect();
                        leftovers.push((class, decls));
                    }
                }
            }
            leftovers.sort();
            if !leftovers.is_empty() {
                out.push_str("\n/* Declarations without a utility */\n");
                for (i, (class, decls)) in leftovers.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    out.push_str(&format_rule(&format!(".{class}"), decls, ""));
                }
            }
        }
        (out, unmapped)
    }
}

impl CssConverter for TailwindConverter<'_> {
    fn strategy(&self) -> CssStrategy {
        CssStrategy::Tailwind
    }

    fn style_element(&self, node: &ParsedNode) -> ElementStyling {
        let mut classes = class_list(node);
        let style = &node.attributes.style;
        if !self.options.extract_inline_styles || style.is_empty() {
            return ElementStyling {
                class: literal_binding(&classes),
                style: style.clone(),
            };
        }
        let (utilities, rest) = Self::map_inline(style);
        for utility in utilities {
            if !classes.contains(&utility) {
                classes.push(utility);
            }
        }
        if !rest.is_empty() {
            classes.push(super::extracted_class_name(&rest));
        }
        ElementStyling {
            class: literal_binding(&classes),
            style: Vec::new(),
        }
    }

    fn convert(&self) -> CssResult {
        let (css, unmapped) = self.render();
        let warnings = if unmapped.is_empty() {
            Vec::new()
        } else {
            vec![format!(
                "{} declaration(s) had no Tailwind utility and were kept as CSS",
                unmapped.len()
            )]
        };
        CssResult {
            strategy: CssStrategy::Tailwind,
            stylesheet_path: STYLESHEET_PATH.to_string(),
            files: vec![
                CssFile {
                    path: STYLESHEET_PATH.to_string(),
                    contents: css.clone(),
                },
                CssFile {
                    path: "tailwind.config.js".to_string(),
                    contents: CONFIG.to_string(),
                },
                CssFile {
                    path: "postcss.config.js".to_string(),
                    contents: POSTCSS_CONFIG.to_string(),
                },
            ],
            css,
            entry_import: Some("./styles/tailwind.css".to_string()),
            unmapped: unmapped.into_iter().collect(),
            warnings,
        }
    }
}

/// Utilities for every declaration, or `None` if any one does not map.
fn apply_utilities(declarations: &[Declaration]) -> Option<Vec<String>> {
    if declarations.is_empty() {
        return None;
    }
    declarations
        .iter()
        .map(|d| {
            let utility = utility_for(&d.property, &d.value)?;
            // @apply cannot take arbitrary properties
            (!utility.starts_with('[')).then(|| {
                if d.important {
                    format!("!{utility}")
                } else {
                    utility
                }
            })
        })
        .collect()
}

/// The utility class for one declaration.
///
/// ```
/// use jsxkit::css::tailwind::utility_for;
///
/// assert_eq!(utility_for("display", "flex").as_deref(), Some("flex"));
/// assert_eq!(utility_for("padding", "16px").as_deref(), Some("p-4"));
/// assert_eq!(utility_for("padding", "13px").as_deref(), Some("p-[13px]"));
/// assert_eq!(utility_for("grid-area", "main").as_deref(), Some("[grid-area:main]"));
/// ```
pub fn utility_for(property: &str, value: &str) -> Option<String> {
    let property = property.trim().to_ascii_lowercase();
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let lower = value.to_ascii_lowercase();

    if let Some((_, _, utility)) = KEYWORDS
        .iter()
        .find(|(p, v, _)| *p == property && *v == lower)
    {
        return Some((*utility).to_string());
    }

    if let Some((_, prefix)) = LENGTHS.iter().find(|(p, _)| *p == property)
        && !value.contains(char::is_whitespace)
    {
        return length_utility(prefix, value);
    }

    let prefixed = |prefix: &str| arbitrary_value(value).map(|v| format!("{prefix}-[{v}]"));
    match property.as_str() {
        "color" => color_utility("text", value),
        "background-color" => color_utility("bg", value),
        "background" if !value.contains(char::is_whitespace) && !value.contains('(') => {
            color_utility("bg", value)
        }
        "border-color" => color_utility("border", value),
        "font-size" => prefixed("text"),
        "line-height" => prefixed("leading"),
        "letter-spacing" => prefixed("tracking"),
        "border-radius" => match lower.as_str() {
            "0" | "0px" => Some("rounded-none".to_string()),
            "9999px" | "50%" => Some("rounded-full".to_string()),
            _ => prefixed("rounded"),
        },
        "opacity" => {
            let percent = value.parse::<f32>().ok().map(|v| (v * 100.0).round() as i32);
            match percent {
                Some(p) if (0..=100).contains(&p) && p % 5 == 0 => Some(format!("opacity-{p}")),
                _ => prefixed("opacity"),
            }
        }
        "z-index" => match value {
            "0" | "10" | "20" | "30" | "40" | "50" => Some(format!("z-{value}")),
            "auto" => Some("z-auto".to_string()),
            _ => prefixed("z"),
        },
        _ => arbitrary_value(value).map(|v| format!("[{property}:{v}]")),
    }
}

fn length_utility(prefix: &str, value: &str) -> Option<String> {
    let negative = value.starts_with('-') && prefix.starts_with('m');
    let magnitude = if negative { &value[1..] } else { value };
    let sign = if negative { "-" } else { "" };
    let named = match magnitude {
        "0" | "0px" => Some("0".to_string()),
        "auto" => Some("auto".to_string()),
        "100%" => Some("full".to_string()),
        "1px" => Some("px".to_string()),
        "100vw" if prefix.ends_with('w') => Some("screen".to_string()),
        "100vh" if prefix.ends_with('h') => Some("screen".to_string()),
        _ => spacing_step(magnitude).map(|s| s.to_string()),
    };
    match named {
        Some(step) => Some(format!("{sign}{prefix}-{step}")),
        None => arbitrary_value(value).map(|v| format!("{prefix}-[{v}]")),
    }
}

/// Step on the spacing scale for `Npx` or `Nrem` values.
fn spacing_step(value: &str) -> Option<u32> {
    let quarters = if let Some(px) = value.strip_suffix("px") {
        let px: f32 = px.parse().ok()?;
        px / 4.0
    } else if let Some(rem) = value.strip_suffix("rem") {
        let rem: f32 = rem.parse().ok()?;
        rem * 4.0
    } else {
        return None;
    };
    if quarters.fract() != 0.0 || quarters < 0.0 {
        return None;
    }
    let step = quarters as u32;
    SPACING_STEPS.contains(&step).then_some(step)
}

fn color_utility(prefix: &str, value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    if NAMED_COLORS.contains(&lower.as_str()) {
        return Some(format!("{prefix}-{lower}"));
    }
    if lower == "currentcolor" {
        return Some(format!("{prefix}-current"));
    }
    arbitrary_value(value).map(|v| format!("{prefix}-[{v}]"))
}

/// The value as written inside `[...]`, with spaces as underscores.
fn arbitrary_value(value: &str) -> Option<String> {
    if value
        .chars()
        .any(|c| matches!(c, '_' | '"' | '\'' | '[' | ']' | ';' | '{' | '}' | '\\'))
    {
        return None;
    }
    Some(value.split_whitespace().collect::<Vec<_>>().join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{ClassBinding, converter};
    use crate::parser::{ParseOptions, parse};

    #[test]
    fn test_keyword_and_spacing_utilities() {
        assert_eq!(utility_for("display", "none").as_deref(), Some("hidden"));
        assert_eq!(utility_for("font-weight", "bold").as_deref(), Some("font-bold"));
        assert_eq!(utility_for("margin", "0").as_deref(), Some("m-0"));
        assert_eq!(utility_for("margin-top", "-8px").as_deref(), Some("-mt-2"));
        assert_eq!(utility_for("width", "100%").as_deref(), Some("w-full"));
        assert_eq!(utility_for("padding", "1.5rem").as_deref(), Some("p-6"));
        assert_eq!(utility_for("gap", "1px").as_deref(), Some("gap-px"));
    }

    #[test]
    fn test_arbitrary_values() {
        assert_eq!(utility_for("color", "#ff0000").as_deref(), Some("text-[#ff0000]"));
        assert_eq!(utility_for("color", "white").as_deref(), Some("text-white"));
        assert_eq!(utility_for("font-size", "18px").as_deref(), Some("text-[18px]"));
        assert_eq!(
            utility_for("margin", "0 auto").as_deref(),
            Some("[margin:0_auto]")
        );
        assert_eq!(utility_for("opacity", "0.5").as_deref(), Some("opacity-50"));
        assert_eq!(utility_for("font-family", "\"Helvetica Neue\""), None);
    }

    #[test]
    fn test_style_element_merges_utilities() {
        let doc = parse(
            r#"<div class="box" style="display: flex; font-family: 'Inter'; padding: 8px">x</div>"#,
            &ParseOptions::default(),
        )
        .unwrap();
        let div = doc.elements().find(|n| n.tag_name() == "div").unwrap();
        let tw = TailwindConverter::new(&doc, CssOptions::new(CssStrategy::Tailwind));
        let styling = tw.style_element(div);
        let Some(ClassBinding::Literal(class)) = styling.class else {
            panic!("expected literal class");
        };
        assert!(class.starts_with("box flex p-2 s-"));
        assert!(styling.style.is_empty());

        let result = tw.convert();
        assert_eq!(result.unmapped, vec!["font-family: 'Inter'"]);
        assert!(result.css.contains("/* Declarations without a utility */"));
        assert_eq!(result.files.len(), 3);
    }

    #[test]
    fn test_apply_layer_and_plain_fallback() {
        let doc = parse(
            r#"<style>.btn { display: inline-block; padding: 8px !important } .hero h1 { margin: 0 } .odd { font-family: "X" }</style><p>x</p>"#,
            &ParseOptions::default(),
        )
        .unwrap();
        let css = converter(&doc, &CssOptions::new(CssStrategy::Tailwind)).convert().css;
        assert!(css.starts_with("@tailwind base;\n@tailwind components;\n@tailwind utilities;\n"));
        assert!(css.contains("@layer components {\n  .btn {\n    @apply inline-block !p-2;\n  }\n}\n"));
        assert!(css.contains(".hero h1 {\n  margin: 0;\n}\n"));
        assert!(css.contains(".odd {\n"));
    }
}
