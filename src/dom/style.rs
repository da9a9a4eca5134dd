//! Inline `style` attribute handling.

use serde::Serialize;

use crate::css::stylesheet::parse_declarations;
use crate::util::css_property_to_camel;

/// One inline style declaration with both spellings of its property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDeclaration {
    /// React style key (`backgroundColor`).
    pub property: String,
    /// CSS property (`background-color`).
    pub css_property: String,
    pub value: String,
}

/// Parse an inline style string into camelCased declarations.
///
/// `!important` is dropped since React style objects cannot express it.
/// Later declarations of the same property replace earlier ones, keeping the
/// position of the first.
pub fn parse_inline_style(style: &str) -> Vec<StyleDeclaration> {
    let mut out: Vec<StyleDeclaration> = Vec::new();
    for decl in parse_declarations(style) {
        let property = css_property_to_camel(&decl.property);
        match out.iter_mut().find(|d| d.property == property) {
            Some(existing) => existing.value = decl.value,
            None => out.push(StyleDeclaration {
                property,
                css_property: decl.property,
                value: decl.value,
            }),
        }
    }
    out
}

/// Render declarations back to a `style` attribute string.
pub fn to_style_string(declarations: &[StyleDeclaration]) -> String {
    declarations
        .iter()
        .map(|d| format!("{}: {}", d.css_property, d.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelcases_properties() {
        let decls = parse_inline_style("background-color: #fff; -webkit-transition: all 1s");
        assert_eq!(decls[0].property, "backgroundColor");
        assert_eq!(decls[0].css_property, "background-color");
        assert_eq!(decls[0].value, "#fff");
        assert_eq!(decls[1].property, "WebkitTransition");
    }

    #[test]
    fn test_duplicate_property_keeps_last_value() {
        let decls = parse_inline_style("color: red; margin: 0; color: blue !important");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "blue");
    }

    #[test]
    fn test_garbage_is_ignored() {
        assert!(parse_inline_style(";;; nonsense").is_empty());
        assert_eq!(
            to_style_string(&parse_inline_style("color:red;padding : 4px")),
            "color: red; padding: 4px"
        );
    }
}
