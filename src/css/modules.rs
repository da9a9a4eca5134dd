//! CSS Modules: a locally scoped stylesheet imported as `styles`.

use std::collections::BTreeSet;

use crate::dom::{ParsedDocument, ParsedNode};

use super::vanilla::render_plain;
use super::{
    ClassBinding, CssConverter, CssFile, CssOptions, CssResult, CssStrategy, ElementStyling,
    class_list, document_stylesheet, extracted_class_name, inline_rules,
};

pub const STYLESHEET_PATH: &str = "src/styles.module.css";

pub struct CssModulesConverter<'a> {
    doc: &'a ParsedDocument,
    options: CssOptions,
    /// Classes defined by the module stylesheet.
    scoped: BTreeSet<String>,
}

impl<'a> CssModulesConverter<'a> {
    pub fn new(doc: &'a ParsedDocument, options: CssOptions) -> Self {
        let mut scoped = BTreeSet::new();
        if options.include_document_styles {
            for rule in document_stylesheet(doc).style_rules() {
                scoped.extend(rule.class_names());
            }
        }
        if options.extract_inline_styles {
            scoped.extend(inline_rules(doc).into_keys());
        }
        Self {
            doc,
            options,
            scoped,
        }
    }

    pub fn is_scoped(&self, class: &str) -> bool {
        self.scoped.contains(class)
    }
}

/// `styles.card` or `styles["card-title"]`.
pub fn style_reference(class: &str) -> String {
    let identifier = class
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && class
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        format!("styles.{class}")
    } else {
        format!("styles[\"{}\"]", class.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

impl CssConverter for CssModulesConverter<'_> {
    fn strategy(&self) -> CssStrategy {
        CssStrategy::CssModules
    }

    fn style_element(&self, node: &ParsedNode) -> ElementStyling {
        let mut classes = class_list(node);
        let mut style = node.attributes.style.clone();
        if self.options.extract_inline_styles && !style.is_empty() {
            classes.push(extracted_class_name(&style));
            style.clear();
        }
        if classes.is_empty() {
            return ElementStyling { class: None, style };
        }
        if !classes.iter().any(|c| self.is_scoped(c)) {
            return ElementStyling {
                class: Some(ClassBinding::Literal(classes.join(" "))),
                style,
            };
        }
        let binding = match classes.as_slice() {
            [only] => style_reference(only),
            _ => {
                let parts: Vec<String> = classes
                    .iter()
                    .map(|c| {
                        if self.is_scoped(c) {
                            format!("${{{}}}", style_reference(c))
                        } else {
                            c.replace('`', "\\`").replace('$', "\\$")
                        }
                    })
                    .collect();
                format!("`{}`", parts.join(" "))
            }
        };
        ElementStyling {
            class: Some(ClassBinding::Expression(binding)),
            style,
        }
    }

    fn component_import(&self) -> Option<String> {
        Some("import styles from '../styles.module.css';".to_string())
    }

    fn convert(&self) -> CssResult {
        let css = render_plain(self.doc, &self.options);
        CssResult {
            strategy: CssStrategy::CssModules,
            stylesheet_path: STYLESHEET_PATH.to_string(),
            files: vec![CssFile {
                path: STYLESHEET_PATH.to_string(),
                contents: css.clone(),
            }],
            css,
            entry_import: None,
            unmapped: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse};

    fn styling(html: &str, tag: &str) -> ElementStyling {
        let doc = parse(html, &ParseOptions::default()).unwrap();
        let node = doc.elements().find(|n| n.tag_name() == tag).unwrap();
        CssModulesConverter::new(&doc, CssOptions::new(CssStrategy::CssModules)).style_element(node)
    }

    #[test]
    fn test_style_reference() {
        assert_eq!(style_reference("card"), "styles.card");
        assert_eq!(style_reference("card-title"), "styles[\"card-title\"]");
        assert_eq!(style_reference("2col"), "styles[\"2col\"]");
    }

    #[test]
    fn test_scoped_and_global_classes() {
        let html = r#"<style>.card { padding: 0 } .card-title { margin: 0 }</style>
            <div class="card">a</div><h2 class="card-title container">b</h2><p class="lead">c</p>"#;
        assert_eq!(
            styling(html, "div").class,
            Some(ClassBinding::Expression("styles.card".into()))
        );
        assert_eq!(
            styling(html, "h2").class,
            Some(ClassBinding::Expression(
                "`${styles[\"card-title\"]} container`".into()
            ))
        );
        assert_eq!(styling(html, "p").class, Some(ClassBinding::Literal("lead".into())));
    }

    #[test]
    fn test_extracted_inline_style_is_scoped() {
        let s = styling(r#"<p style="color: red">x</p>"#, "p");
        let Some(ClassBinding::Expression(expr)) = s.class else {
            panic!("expected expression binding");
        };
        assert!(expr.starts_with("styles[\"s-"));
        assert!(s.style.is_empty());
    }
}
