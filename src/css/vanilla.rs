//! Plain global stylesheet.

use std::fmt::Write;

use crate::dom::{ParsedDocument, ParsedNode};

use super::stylesheet::format_rule;
use super::{
    CssConverter, CssFile, CssOptions, CssResult, CssStrategy, ElementStyling, class_list,
    document_stylesheet, extracted_class_name, inline_rules, literal_binding,
};

pub const STYLESHEET_PATH: &str = "src/styles.css";

pub struct VanillaConverter<'a> {
    doc: &'a ParsedDocument,
    options: CssOptions,
}

impl<'a> VanillaConverter<'a> {
    pub fn new(doc: &'a ParsedDocument, options: CssOptions) -> Self {
        Self { doc, options }
    }
}

impl CssConverter for VanillaConverter<'_> {
    fn strategy(&self) -> CssStrategy {
        CssStrategy::Vanilla
    }

    fn style_element(&self, node: &ParsedNode) -> ElementStyling {
        let mut classes = class_list(node);
        let style = &node.attributes.style;
        if self.options.extract_inline_styles && !style.is_empty() {
            classes.push(extracted_class_name(style));
            return ElementStyling {
                class: literal_binding(&classes),
                style: Vec::new(),
            };
        }
        ElementStyling {
            class: literal_binding(&classes),
            style: style.clone(),
        }
    }

    fn convert(&self) -> CssResult {
        let css = render_plain(self.doc, &self.options);
        CssResult {
            strategy: CssStrategy::Vanilla,
            stylesheet_path: STYLESHEET_PATH.to_string(),
            files: vec![CssFile {
                path: STYLESHEET_PATH.to_string(),
                contents: css.clone(),
            }],
            css,
            entry_import: Some("./styles.css".to_string()),
            unmapped: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Document rules followed by extracted inline-style classes.
///
/// Shared with the CSS-Modules strategy, whose file content is identical.
pub(crate) fn render_plain(doc: &ParsedDocument, options: &CssOptions) -> String {
    let mut out = String::new();
    if options.include_document_styles {
        let sheet = document_stylesheet(doc);
        if !sheet.is_empty() {
            out.push_str(&sheet.to_css());
        }
    }
    if options.extract_inline_styles {
        let rules = inline_rules(doc);
        if !rules.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "/* Extracted inline styles */");
            for (i, (class, decls)) in rules.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&format_rule(&format!(".{class}"), decls, ""));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{ClassBinding, converter};
    use crate::parser::{ParseOptions, parse};

    #[test]
    fn test_preserves_selectors_and_extracts_inline() {
        let doc = parse(
            r#"<style>nav > a.active { color: red }</style><nav><a class="active" style="margin: 0">x</a></nav>"#,
            &ParseOptions::default(),
        )
        .unwrap();
        let css = converter(&doc, &CssOptions::default()).convert();
        assert!(css.css.starts_with("nav > a.active {\n  color: red;\n}\n"));
        assert!(css.css.contains("/* Extracted inline styles */\n.s-"));
        assert!(css.css.contains("  margin: 0;\n"));
        assert_eq!(css.files[0].path, "src/styles.css");
    }

    #[test]
    fn test_style_element_adds_extracted_class() {
        let doc = parse(r#"<p class="lead" style="color: red">x</p>"#, &ParseOptions::default()).unwrap();
        let p = doc.elements().find(|n| n.tag_name() == "p").unwrap();
        let vanilla = VanillaConverter::new(&doc, CssOptions::default());
        let styling = vanilla.style_element(p);
        let Some(ClassBinding::Literal(class)) = styling.class else {
            panic!("expected literal class");
        };
        assert!(class.starts_with("lead s-"));
        assert!(styling.style.is_empty());

        let keep = VanillaConverter::new(&doc, CssOptions::default().with_extract_inline_styles(false));
        let styling = keep.style_element(p);
        assert_eq!(styling.class, Some(ClassBinding::Literal("lead".into())));
        assert_eq!(styling.style.len(), 1);
    }

    #[test]
    fn test_empty_document_gives_empty_sheet() {
        let doc = parse("<p>plain</p>", &ParseOptions::default()).unwrap();
        assert_eq!(converter(&doc, &CssOptions::default()).convert().css, "");
    }
}
