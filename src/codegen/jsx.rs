//! JSX body rendering for one component.
//!
//! The writer walks the component's subtree and emits one element per line.
//! Elements whose only child is text are kept on one line. Nested component
//! boundaries become `<Child />`, and members of a repeating pattern become
//! `<Template prop="value" />` with that member's values.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

use crate::css::{ClassBinding, CssConverter};
use crate::dom::attributes::{
    AttrValue, Attribute, EventHandler, expression_body, is_boolean_attribute,
    react_attribute_name,
};
use crate::dom::style::StyleDeclaration;
use crate::dom::{NodeId, NodeKind, ParsedDocument, ParsedNode};
use crate::split::pattern::SlotTarget;
use crate::split::{ComponentDefinition, ComponentId, ExtractionReason, SplitResult};

use super::GeneratorOptions;
use super::props::{ExpressionUse, is_identifier, prop_value_literal};

/// Elements dropped from generated markup.
const OMITTED_TAGS: &[&str] = &["script", "style"];

/// CSS properties React renders without a `px` suffix.
const UNITLESS: &[&str] = &[
    "animationIterationCount",
    "aspectRatio",
    "columnCount",
    "flex",
    "flexGrow",
    "flexShrink",
    "fontWeight",
    "gridColumn",
    "gridRow",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "widows",
    "zIndex",
    "zoom",
];

/// Where component boundaries and pattern instances sit in the tree.
#[derive(Debug, Default)]
pub struct RenderTargets {
    boundaries: HashMap<NodeId, ComponentId>,
    instances: HashMap<NodeId, (ComponentId, usize)>,
}

impl RenderTargets {
    pub fn new(split: &SplitResult) -> Self {
        let mut targets = Self::default();
        for component in &split.components {
            if component.reason == ExtractionReason::Root {
                continue;
            }
            targets.boundaries.insert(component.node, component.id);
            for (i, instance) in component.instances.iter().enumerate() {
                targets.instances.insert(instance.node, (component.id, i));
            }
        }
        targets
    }
}

/// What rendering one component produced.
#[derive(Debug, Default)]
pub struct JsxOutput {
    /// The returned JSX expression, indented for the `return (...)` block.
    pub body: String,
    /// Child components referenced by the body.
    pub components: BTreeSet<String>,
    pub uses_styles: bool,
    pub expressions: Vec<ExpressionUse>,
    pub elements: usize,
    pub warnings: Vec<String>,
}

pub struct JsxWriter<'a> {
    doc: &'a ParsedDocument,
    split: &'a SplitResult,
    component: &'a ComponentDefinition,
    css: &'a dyn CssConverter,
    options: &'a GeneratorOptions,
    targets: &'a RenderTargets,
    slots: HashMap<NodeId, Vec<(&'a SlotTarget, &'a str)>>,
    indent: String,
    out: JsxOutput,
}

impl<'a> JsxWriter<'a> {
    pub fn new(
        doc: &'a ParsedDocument,
        split: &'a SplitResult,
        component: &'a ComponentDefinition,
        css: &'a dyn CssConverter,
        options: &'a GeneratorOptions,
        targets: &'a RenderTargets,
    ) -> Self {
        let mut slots: HashMap<NodeId, Vec<(&SlotTarget, &str)>> = HashMap::new();
        for prop in &component.props {
            if let Some(slot) = &prop.slot {
                slots
                    .entry(slot.node)
                    .or_default()
                    .push((&slot.target, prop.name.as_str()));
            }
        }
        Self {
            doc,
            split,
            component,
            css,
            options,
            targets,
            slots,
            indent: " ".repeat(options.indent),
            out: JsxOutput::default(),
        }
    }

    /// Render the component body starting at `depth` indentation levels.
    pub fn render(mut self, depth: usize) -> JsxOutput {
        let root = self.component.node;
        let Some(node) = self.doc.node(root) else {
            self.line(depth, "null");
            return self.out;
        };
        if node.kind == NodeKind::Fragment {
            let children: Vec<NodeId> = node
                .children
                .iter()
                .copied()
                .filter(|&c| self.renders(c))
                .collect();
            self.note_omitted(&node.children);
            match children.as_slice() {
                [] => self.line(depth, "null"),
                [only] => self.write_node(*only, depth),
                _ => {
                    self.line(depth, "<>");
                    for child in children {
                        self.write_node(child, depth + 1);
                    }
                    self.line(depth, "</>");
                }
            }
        } else {
            self.write_element(node, depth);
        }
        self.out
    }

    /// Whether a node produces any output.
    fn renders(&self, id: NodeId) -> bool {
        let Some(node) = self.doc.node(id) else {
            return false;
        };
        match node.kind {
            NodeKind::Text => node.text.as_deref().is_some_and(|t| !t.is_empty()),
            NodeKind::Comment => true,
            NodeKind::Element => !OMITTED_TAGS.contains(&node.tag_name()),
            NodeKind::Fragment => false,
        }
    }

    fn note_omitted(&mut self, children: &[NodeId]) {
        for &child in children {
            if let Some(node) = self.doc.node(child)
                && node.is_element()
                && OMITTED_TAGS.contains(&node.tag_name())
            {
                self.out.warnings.push(format!(
                    "{}: omitted <{}> element",
                    self.component.name,
                    node.tag_name()
                ));
            }
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.body.push_str(&self.indent);
        }
        self.out.body.push_str(text);
        self.out.body.push('\n');
    }

    fn write_node(&mut self, id: NodeId, depth: usize) {
        let Some(node) = self.doc.node(id) else {
            return;
        };
        match node.kind {
            NodeKind::Text => {
                if let Some(prop) = self.text_slot(id) {
                    self.line(depth, &format!("{{{prop}}}"));
                } else if let Some(text) = &node.text {
                    let rendered = block_text(text);
                    if !rendered.is_empty() {
                        self.line(depth, &rendered);
                    }
                }
            }
            NodeKind::Comment => {
                let text = node.text.as_deref().unwrap_or_default().replace("*/", "* /");
                self.line(depth, &format!("{{/* {} */}}", text.trim()));
            }
            NodeKind::Element => {
                if let Some(&(component, index)) = self.targets.instances.get(&id) {
                    let tag = self.instance_tag(component, index);
                    self.line(depth, &tag);
                } else if let Some(&component) = self.targets.boundaries.get(&id) {
                    let name = self.split.components[component.index()].name.clone();
                    self.line(depth, &format!("<{name} />"));
                    self.out.components.insert(name);
                } else {
                    self.write_element(node, depth);
                }
            }
            NodeKind::Fragment => {}
        }
    }

    fn write_element(&mut self, node: &ParsedNode, depth: usize) {
        let tag = node.tag_name();
        self.out.elements += 1;
        let attrs = self.attributes(node);

        self.note_omitted(&node.children);
        let children: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|&c| self.renders(c))
            .collect();

        if children.is_empty() {
            if node.self_closing || node.is_void() {
                self.line(depth, &format!("<{tag}{attrs} />"));
            } else {
                self.line(depth, &format!("<{tag}{attrs}></{tag}>"));
            }
            return;
        }

        if let [only] = children.as_slice()
            && let Some(child) = self.doc.node(*only)
            && child.kind == NodeKind::Text
        {
            let inner = match self.text_slot(*only) {
                Some(prop) => format!("{{{prop}}}"),
                None if matches!(tag, "pre" | "textarea") => {
                    format!("{{{}}}", js_string(child.text.as_deref().unwrap_or_default()))
                }
                None => inline_text(child.text.as_deref().unwrap_or_default()),
            };
            self.line(depth, &format!("<{tag}{attrs}>{inner}</{tag}>"));
            return;
        }

        self.line(depth, &format!("<{tag}{attrs}>"));
        for child in children {
            self.write_node(child, depth + 1);
        }
        self.line(depth, &format!("</{tag}>"));
    }

    fn text_slot(&self, id: NodeId) -> Option<&'a str> {
        self.slots
            .get(&id)?
            .iter()
            .find(|(target, _)| matches!(target, SlotTarget::Text))
            .map(|(_, prop)| *prop)
    }

    fn attribute_slot(&self, id: NodeId, source: &str) -> Option<&'a str> {
        self.slots
            .get(&id)?
            .iter()
            .find(|(target, _)| {
                matches!(target, SlotTarget::Attribute { name } if name.eq_ignore_ascii_case(source))
            })
            .map(|(_, prop)| *prop)
    }

    /// Boolean attributes whose presence is a prop: `(source name, prop)`.
    fn presence_slots(&self, id: NodeId) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.slots.get(&id).into_iter().flatten().filter_map(|(target, prop)| match *target {
            SlotTarget::Presence { name } => Some((name.as_str(), *prop)),
            _ => None,
        })
    }

    /// `<Template a="x" b={2} />` for one pattern member.
    fn instance_tag(&mut self, component: ComponentId, index: usize) -> String {
        let definition = &self.split.components[component.index()];
        self.out.components.insert(definition.name.clone());
        let mut tag = format!("<{}", definition.name);
        if let Some(instance) = definition.instances.get(index) {
            for (prop, value) in definition.props.iter().zip(&instance.values) {
                let _ = write!(tag, " {}={}", prop.name, prop_value_literal(value, prop.ty));
            }
        }
        tag.push_str(" />");
        tag
    }

    /// Rendered attribute list with a leading space per attribute.
    fn attributes(&mut self, node: &ParsedNode) -> String {
        let styling = self.css.style_element(node);
        let mut parts: Vec<String> = Vec::new();
        let mut class_done = false;

        for (source, _) in &node.attributes.raw {
            let lower = source.to_ascii_lowercase();
            if lower == "class" || lower == "style" {
                if !class_done {
                    class_done = true;
                    if let Some(class) = &styling.class {
                        parts.push(self.class_attribute(class));
                    }
                }
                if lower == "style" && !styling.style.is_empty() {
                    parts.push(format!("style={{{}}}", style_object(&styling.style)));
                }
                continue;
            }
            if let Some(event) = node.attributes.events.iter().find(|e| e.source == *source) {
                parts.push(self.event_attribute(event));
                continue;
            }
            if let Some(attr) = node.attributes.attrs.iter().find(|a| a.source == *source) {
                let presence = self
                    .presence_slots(node.id)
                    .find(|(name, _)| name.eq_ignore_ascii_case(source))
                    .map(|(_, prop)| prop);
                let rendered = match self.attribute_slot(node.id, source).or(presence) {
                    Some(prop) => format!("{}={{{prop}}}", attr.name),
                    None => self.plain_attribute(attr),
                };
                parts.push(rendered);
            }
        }
        let absent: Vec<String> = self
            .presence_slots(node.id)
            .filter(|(name, _)| node.attr(name).is_none())
            .map(|(name, prop)| format!("{}={{{prop}}}", react_attribute_name(name)))
            .collect();
        parts.extend(absent);
        if !class_done && let Some(class) = &styling.class {
            parts.insert(0, self.class_attribute(class));
        }

        parts.iter().fold(String::new(), |mut out, part| {
            out.push(' ');
            out.push_str(part);
            out
        })
    }

    fn class_attribute(&mut self, class: &ClassBinding) -> String {
        let name = if self.options.class_name {
            "className"
        } else {
            "class"
        };
        match class {
            ClassBinding::Literal(value) => format!("{name}={}", attribute_literal(value)),
            ClassBinding::Expression(expr) => {
                self.out.uses_styles = true;
                format!("{name}={{{expr}}}")
            }
        }
    }

    fn event_attribute(&mut self, event: &EventHandler) -> String {
        if let Some(expr) = expression_body(&event.handler) {
            self.out.expressions.push(ExpressionUse {
                attribute: event.name.clone(),
                expr: expr.to_string(),
                event: true,
                boolean: false,
            });
            return format!("{}={{{expr}}}", event.name);
        }
        let handler = event.handler.trim().trim_end_matches(';');
        let params = if handler.contains("event") {
            "(event)"
        } else {
            "()"
        };
        format!("{}={{{params} => {{ {handler}; }}}}", event.name)
    }

    fn plain_attribute(&mut self, attr: &Attribute) -> String {
        match &attr.value {
            AttrValue::Bool(true) => attr.name.clone(),
            AttrValue::Bool(false) => format!("{}={{false}}", attr.name),
            AttrValue::Expr(expr) => {
                self.out.expressions.push(ExpressionUse {
                    attribute: attr.name.clone(),
                    expr: expr.clone(),
                    event: false,
                    boolean: is_boolean_attribute(&attr.source),
                });
                format!("{}={{{expr}}}", attr.name)
            }
            AttrValue::Text(value) => format!("{}={}", attr.name, attribute_literal(value)),
        }
    }
}

/// `"value"`, or `{"value"}` when the value cannot sit in a JSX string.
pub fn attribute_literal(value: &str) -> String {
    if value.contains(['"', '\\', '\n', '\r']) {
        format!("{{{}}}", js_string(value))
    } else {
        format!("\"{value}\"")
    }
}

/// A double-quoted JavaScript string literal.
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `{{ color: "red", padding: 16 }}` contents (without the outer braces).
pub fn style_object(style: &[StyleDeclaration]) -> String {
    let entries: Vec<String> = style
        .iter()
        .map(|d| {
            let key = if is_identifier(&d.property) {
                d.property.clone()
            } else {
                js_string(&d.property)
            };
            format!("{key}: {}", style_value(&d.property, &d.value))
        })
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

/// Numbers React can take directly; everything else as a string.
fn style_value(property: &str, value: &str) -> String {
    let value = value.trim();
    let is_number = |s: &str| !s.is_empty() && s.parse::<f64>().is_ok_and(f64::is_finite);
    if property.starts_with("--") {
        return js_string(value);
    }
    if UNITLESS.contains(&property) && is_number(value) {
        return value.to_string();
    }
    if value == "0" {
        return "0".to_string();
    }
    if let Some(px) = value.strip_suffix("px")
        && is_number(px)
        && !UNITLESS.contains(&property)
    {
        return px.to_string();
    }
    js_string(value)
}

/// Escape text for a JSX child position.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("{\"{\"}"),
            '}' => out.push_str("{\"}\"}"),
            c => out.push(c),
        }
    }
    out
}

/// Text on the same line as its tags; spaces are kept by JSX as written.
fn inline_text(text: &str) -> String {
    escape_text(text)
}

/// Text on its own line: JSX drops edge whitespace there, so significant
/// spaces are written as `{" "}`.
fn block_text(text: &str) -> String {
    if text.trim().is_empty() {
        return if text.is_empty() {
            String::new()
        } else {
            "{\" \"}".to_string()
        };
    }
    let mut out = String::new();
    if text.starts_with(char::is_whitespace) {
        out.push_str("{\" \"}");
    }
    out.push_str(&escape_text(text.trim()));
    if text.ends_with(char::is_whitespace) {
        out.push_str("{\" \"}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::style::parse_inline_style;

    #[test]
    fn test_attribute_literal() {
        assert_eq!(attribute_literal("card"), "\"card\"");
        assert_eq!(attribute_literal("a \"b\""), "{\"a \\\"b\\\"\"}");
        assert_eq!(attribute_literal("line\nbreak"), "{\"line\\nbreak\"}");
    }

    #[test]
    fn test_style_object_discriminates_numbers() {
        let style = parse_inline_style(
            "background-color: #fff; padding: 16px; opacity: 0.5; margin: 0 auto; line-height: 1.5; width: 0; --gap: 4px",
        );
        assert_eq!(
            style_object(&style),
            "{ backgroundColor: \"#fff\", padding: 16, opacity: 0.5, margin: \"0 auto\", lineHeight: 1.5, width: 0, \"--gap\": \"4px\" }"
        );
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(escape_text("a < b & {c}"), "a &lt; b &amp; {\"{\"}c{\"}\"}");
        assert_eq!(block_text("Hello "), "Hello{\" \"}");
        assert_eq!(block_text(" world"), "{\" \"}world");
        assert_eq!(block_text(" "), "{\" \"}");
        assert_eq!(inline_text("Hello World"), "Hello World");
    }
}
