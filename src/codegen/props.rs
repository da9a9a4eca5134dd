//! Props inference and signature rendering.

use std::fmt::Write;

use crate::split::{PropDefinition, PropType};

/// A `{expr}` attribute value seen while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionUse {
    /// JSX attribute name (`onClick`, `disabled`, `title`).
    pub attribute: String,
    pub expr: String,
    pub event: bool,
    pub boolean: bool,
}

/// Words marking a numeric prop.
const NUMERIC_HINTS: &[&str] = &[
    "count", "num", "total", "index", "amount", "size", "price", "quantity", "rating",
];

/// Infer props from the expressions a component references.
///
/// Only bare identifiers (`{title}`) and `props.x` members become props;
/// literals are rendered inline and other expressions are left alone.
pub fn infer_props(uses: &[ExpressionUse]) -> Vec<PropDefinition> {
    let mut props: Vec<PropDefinition> = Vec::new();
    for expr_use in uses {
        let Some(name) = referenced_prop(&expr_use.expr) else {
            continue;
        };
        if props.iter().any(|p| p.name == name) {
            continue;
        }
        let ty = infer_prop_type(name, expr_use);
        props.push(PropDefinition::new(name, ty));
    }
    props
}

/// The prop an expression reads, if it is a bare reference.
pub fn referenced_prop(expr: &str) -> Option<&str> {
    let expr = expr.trim();
    let name = expr.strip_prefix("props.").unwrap_or(expr);
    if is_literal(name) || !is_identifier(name) || RESERVED.contains(&name) {
        return None;
    }
    Some(name)
}

const RESERVED: &[&str] = &[
    "true", "false", "null", "undefined", "this", "NaN", "Infinity", "window", "document",
];

fn is_literal(expr: &str) -> bool {
    matches!(expr, "true" | "false" | "null" | "undefined") || expr.parse::<f64>().is_ok()
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Type of a prop from its name and where it is used.
pub fn infer_prop_type(name: &str, expr_use: &ExpressionUse) -> PropType {
    let lower = name.to_ascii_lowercase();
    let has_word_prefix = |prefix: &str| {
        name.strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_uppercase())
    };

    if expr_use.event
        || has_word_prefix("on")
        || has_word_prefix("handle")
        || lower.contains("callback")
        || lower.contains("handler")
    {
        return PropType::Function;
    }
    if expr_use.boolean
        || ["is", "has", "should", "can", "show"]
            .iter()
            .any(|p| has_word_prefix(p))
    {
        return PropType::Boolean;
    }
    if NUMERIC_HINTS.iter().any(|hint| lower.contains(hint)) {
        return PropType::Number;
    }
    PropType::String
}

/// Merge prop lists; a later definition replaces an earlier one of the same
/// name but keeps its position.
pub fn merge_props(
    base: Vec<PropDefinition>,
    overrides: impl IntoIterator<Item = PropDefinition>,
) -> Vec<PropDefinition> {
    let mut merged = base;
    for prop in overrides {
        match merged.iter_mut().find(|p| p.name == prop.name) {
            Some(existing) => {
                let slot = existing.slot.take();
                *existing = PropDefinition {
                    slot: prop.slot.clone().or(slot),
                    ..prop
                };
            }
            None => merged.push(prop),
        }
    }
    merged
}

/// TypeScript type for a prop.
pub fn ts_type(ty: PropType) -> &'static str {
    match ty {
        PropType::String => "string",
        PropType::Number => "number",
        PropType::Boolean => "boolean",
        PropType::Function => "(...args: any[]) => void",
        PropType::Unknown => "unknown",
    }
}

/// `interface NameProps { ... }` for a typed component.
pub fn render_interface(component: &str, props: &[PropDefinition], indent: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "interface {component}Props {{");
    for prop in props {
        let optional = if prop.required && prop.default.is_none() {
            ""
        } else {
            "?"
        };
        let _ = writeln!(out, "{indent}{}{optional}: {};", prop.name, ts_type(prop.ty));
    }
    out.push('}');
    out
}

/// Parameter list of the component function: `()` or a destructured object.
pub fn render_parameters(component: &str, props: &[PropDefinition], typed: bool) -> String {
    if props.is_empty() {
        return "()".to_string();
    }
    let names: Vec<String> = props
        .iter()
        .map(|p| match &p.default {
            Some(default) => format!("{} = {default}", p.name),
            None => p.name.clone(),
        })
        .collect();
    if typed {
        format!("({{ {} }}: {component}Props)", names.join(", "))
    } else {
        format!("({{ {} }})", names.join(", "))
    }
}

/// A value as it appears in JSX for a prop of type `ty`: `"text"`, `{3}`.
pub fn prop_value_literal(value: &str, ty: PropType) -> String {
    let trimmed = value.trim();
    match ty {
        PropType::Number if trimmed.parse::<f64>().is_ok() => format!("{{{trimmed}}}"),
        PropType::Boolean if matches!(trimmed, "true" | "false") => format!("{{{trimmed}}}"),
        _ => super::jsx::attribute_literal(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(attribute: &str, expr: &str) -> ExpressionUse {
        ExpressionUse {
            attribute: attribute.to_string(),
            expr: expr.to_string(),
            event: attribute.starts_with("on"),
            boolean: false,
        }
    }

    #[test]
    fn test_infers_names_and_types() {
        let props = infer_props(&[
            expr("title", "heading"),
            expr("data-count", "itemCount"),
            expr("hidden", "isOpen"),
            expr("onClick", "handleClick"),
            expr("data-cb", "onSelect"),
            expr("value", "props.label"),
            expr("tabIndex", "3"),
            expr("title", "heading"),
            expr("title", "a + b"),
        ]);
        let got: Vec<(&str, PropType)> = props.iter().map(|p| (p.name.as_str(), p.ty)).collect();
        assert_eq!(
            got,
            vec![
                ("heading", PropType::String),
                ("itemCount", PropType::Number),
                ("isOpen", PropType::Boolean),
                ("handleClick", PropType::Function),
                ("onSelect", PropType::Function),
                ("label", PropType::String),
            ]
        );
    }

    #[test]
    fn test_merge_explicit_overrides_by_name() {
        let inferred = vec![
            PropDefinition::new("title", PropType::String),
            PropDefinition::new("count", PropType::Number),
        ];
        let mut explicit = PropDefinition::new("count", PropType::String);
        explicit.default = Some("\"0\"".into());
        let merged = merge_props(inferred, [explicit, PropDefinition::new("extra", PropType::Boolean)]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].ty, PropType::String);
        assert_eq!(merged[1].default.as_deref(), Some("\"0\""));
        assert_eq!(merged[2].name, "extra");
    }

    #[test]
    fn test_signature_rendering() {
        assert_eq!(render_parameters("Card", &[], true), "()");
        let mut props = vec![PropDefinition::new("title", PropType::String)];
        props[0].required = true;
        props.push(PropDefinition::new("count", PropType::Number));
        props[1].default = Some("0".into());
        assert_eq!(
            render_parameters("Card", &props, true),
            "({ title, count = 0 }: CardProps)"
        );
        assert_eq!(render_parameters("Card", &props, false), "({ title, count = 0 })");
        assert_eq!(
            render_interface("Card", &props, "  "),
            "interface CardProps {\n  title: string;\n  count?: number;\n}"
        );
    }

    #[test]
    fn test_prop_value_literal() {
        assert_eq!(prop_value_literal("42", PropType::Number), "{42}");
        assert_eq!(prop_value_literal("true", PropType::Boolean), "{true}");
        assert_eq!(prop_value_literal("Hi", PropType::String), "\"Hi\"");
        assert_eq!(prop_value_literal("say \"hi\"", PropType::String), "{\"say \\\"hi\\\"\"}");
    }
}
