//! Repeating-pattern detection.
//!
//! Sibling elements are bucketed by a signature (tag plus block classes),
//! then a bucket becomes a pattern when it has enough members and their
//! average pairwise structural similarity clears the threshold. Values that
//! differ between members (text, attribute values, presence of boolean
//! attributes) become inferred props.
//!
//! Only members with exactly the template's structure are rendered as
//! instances. A similar sibling with an extra or missing child stays out of
//! the pattern and is rendered through the normal rules, so none of its
//! content is lost.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write;

use serde::Serialize;

use crate::dom::attributes::is_boolean_attribute;
use crate::dom::{NodeId, NodeKind, ParsedDocument, ParsedNode};
use crate::util::{camel_case, pascal_case};

use super::bem::BemClass;
use super::naming::{is_utility_class, sanitize_identifier};
use super::{PropDefinition, PropType};

/// Identifier of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PatternId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    List,
    Grid,
    Card,
    Navigation,
    Table,
    Generic,
}

/// Where a varying value sits inside the template member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SlotTarget {
    Text,
    Attribute { name: String },
    /// Whether a boolean attribute is present (`"true"` / `"false"`).
    Presence { name: String },
}

/// A prop's location in the template member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropSlot {
    /// Node of the template member holding the value.
    pub node: NodeId,
    pub target: SlotTarget,
}

/// One member's values, in prop order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternInstance {
    pub node: NodeId,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternDetectionResult {
    pub id: PatternId,
    /// Suggested component name for the repeated element.
    pub label: String,
    pub count: usize,
    /// Average pairwise similarity of the sibling group.
    pub confidence: f32,
    pub kind: PatternKind,
    /// Element whose children form the pattern.
    pub parent: NodeId,
    /// Members sharing the template's exact structure, in document order.
    pub members: Vec<NodeId>,
    pub props: Vec<PropDefinition>,
    pub instances: Vec<PatternInstance>,
}

impl PatternDetectionResult {
    /// The member used as the component template.
    pub fn template(&self) -> NodeId {
        self.members[0]
    }
}

/// Detection thresholds.
#[derive(Debug, Clone)]
pub struct PatternOptions {
    pub min_occurrences: usize,
    pub similarity_threshold: f32,
    /// Depth of the structural fingerprint below each member.
    pub shape_depth: usize,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            similarity_threshold: 0.75,
            shape_depth: 3,
        }
    }
}

/// Find repeating sibling groups in document order.
///
/// Patterns nested inside another pattern's members are not reported; the
/// outer member's template already covers them.
pub fn detect_patterns(
    doc: &ParsedDocument,
    options: &PatternOptions,
) -> Vec<PatternDetectionResult> {
    let mut patterns = Vec::new();
    let mut members_seen: HashSet<NodeId> = HashSet::new();
    let min = options.min_occurrences.max(2);

    let parents = std::iter::once(doc.root()).chain(doc.elements().map(|n| n.id));
    for parent in parents {
        if inside_member(doc, parent, &members_seen) {
            continue;
        }
        let mut buckets: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        for child in doc.element_children(parent) {
            if let Some(node) = doc.node(child)
                && !matches!(node.tag_name(), "script" | "style" | "template")
            {
                buckets.entry(signature(node)).or_default().push(child);
            }
        }

        let mut groups: Vec<Vec<NodeId>> = buckets
            .into_values()
            .filter(|members| members.len() >= min)
            .collect();
        groups.sort_by_key(|members| members[0]);

        for members in groups {
            let shapes: Vec<Vec<String>> = members
                .iter()
                .map(|&m| shape(doc, m, options.shape_depth))
                .collect();
            let confidence = average_similarity(&shapes);
            if confidence < options.similarity_threshold {
                tracing::debug!(
                    parent = %parent,
                    members = members.len(),
                    confidence,
                    "sibling group too dissimilar for a pattern"
                );
                continue;
            }

            let Some(members) = conforming_members(doc, &members, min) else {
                tracing::debug!(
                    parent = %parent,
                    "too few siblings share one exact structure"
                );
                continue;
            };

            let id = PatternId(patterns.len() as u32);
            let (props, instances) = infer_props(doc, &members);
            members_seen.extend(members.iter().copied());
            patterns.push(PatternDetectionResult {
                id,
                label: label_for(doc, members[0]),
                count: members.len(),
                confidence,
                kind: classify(doc, parent, members[0]),
                parent,
                members,
                props,
                instances,
            });
        }
    }
    patterns
}

/// The largest group of `members` with identical exact structure (earliest
/// group on ties), if it still has `min` members.
fn conforming_members(doc: &ParsedDocument, members: &[NodeId], min: usize) -> Option<Vec<NodeId>> {
    let mut groups: Vec<(String, Vec<NodeId>)> = Vec::new();
    for &member in members {
        let key = exact_shape(doc, member);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(member),
            None => groups.push((key, vec![member])),
        }
    }
    let mut best: Option<Vec<NodeId>> = None;
    for (_, group) in groups {
        if best.as_ref().is_none_or(|b| group.len() > b.len()) {
            best = Some(group);
        }
    }
    let best = best.filter(|group| group.len() >= min)?;
    if best.len() < members.len() {
        tracing::debug!(
            kept = best.len(),
            divergent = members.len() - best.len(),
            "siblings with a different structure render on their own"
        );
    }
    Some(best)
}

/// Full-depth structure of a member: everything the template renders
/// verbatim, with slot-able values left out.
///
/// Text nodes and attribute values outside `class`, `style` and event
/// handlers can become props, so only their presence counts. Boolean
/// attributes are left out entirely; they become presence props.
fn exact_shape(doc: &ParsedDocument, id: NodeId) -> String {
    let mut key = String::new();
    write_shape(doc, id, &mut key);
    key
}

fn write_shape(doc: &ParsedDocument, id: NodeId, key: &mut String) {
    let Some(node) = doc.node(id) else {
        return;
    };
    match node.kind {
        NodeKind::Element => {
            let _ = write!(key, "<{}", node.tag_name());
            let mut attrs: Vec<(&str, &str)> = node
                .attributes
                .raw
                .iter()
                .filter(|(name, _)| !is_boolean_attribute(name))
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            attrs.sort_unstable();
            for (name, value) in attrs {
                if matches!(name, "class" | "style") || name.starts_with("on") {
                    let _ = write!(key, " {name}={value:?}");
                } else {
                    let _ = write!(key, " {name}");
                }
            }
            key.push('>');
            for &child in &node.children {
                write_shape(doc, child, key);
            }
            key.push_str("</>");
        }
        NodeKind::Text => {
            let blank = node.text.as_deref().is_none_or(|t| t.trim().is_empty());
            key.push_str(if blank { "#ws" } else { "#text" });
        }
        NodeKind::Comment => {
            let _ = write!(key, "<!--{:?}-->", node.text.as_deref().unwrap_or_default());
        }
        NodeKind::Fragment => {}
    }
}

fn inside_member(doc: &ParsedDocument, id: NodeId, members: &HashSet<NodeId>) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if members.contains(&node) {
            return true;
        }
        current = doc.node(node).and_then(|n| n.parent);
    }
    false
}

/// Grouping key: tag plus sorted block classes (modifiers and utility
/// classes ignored so `card card--featured` groups with `card`).
fn signature(node: &ParsedNode) -> String {
    let mut classes: Vec<&str> = node
        .classes()
        .filter(|c| !c.contains("--") && !is_utility_class(c))
        .collect();
    classes.sort_unstable();
    classes.dedup();
    format!("{}.{}", node.tag_name(), classes.join("."))
}

/// Structural fingerprint: one token per element down to `max_depth`.
fn shape(doc: &ParsedDocument, id: NodeId, max_depth: usize) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut stack = vec![(id, 0usize)];
    while let Some((current, level)) = stack.pop() {
        let Some(node) = doc.node(current) else {
            continue;
        };
        match node.kind {
            NodeKind::Element => {
                tokens.push(format!("{level}:{}", signature(node)));
                if level < max_depth {
                    stack.extend(node.children.iter().rev().map(|&c| (c, level + 1)));
                }
            }
            NodeKind::Text => tokens.push(format!("{level}:#text")),
            _ => {}
        }
    }
    tokens.sort_unstable();
    tokens
}

/// Dice coefficient over sorted token multisets.
fn similarity(a: &[String], b: &[String]) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let (mut i, mut j, mut common) = (0, 0, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    (2 * common) as f32 / (a.len() + b.len()) as f32
}

/// Mean similarity over all pairs; large groups compare against the first.
fn average_similarity(shapes: &[Vec<String>]) -> f32 {
    const PAIRWISE_LIMIT: usize = 48;
    let mut total = 0.0;
    let mut pairs = 0usize;
    if shapes.len() <= PAIRWISE_LIMIT {
        for i in 0..shapes.len() {
            for j in i + 1..shapes.len() {
                total += similarity(&shapes[i], &shapes[j]);
                pairs += 1;
            }
        }
    } else {
        for other in &shapes[1..] {
            total += similarity(&shapes[0], other);
            pairs += 1;
        }
    }
    if pairs == 0 { 0.0 } else { total / pairs as f32 }
}

fn classify(doc: &ParsedDocument, parent: NodeId, template: NodeId) -> PatternKind {
    let parent_node = doc.node(parent);
    let parent_tag = parent_node.map(ParsedNode::tag_name).unwrap_or_default();
    let Some(member) = doc.node(template) else {
        return PatternKind::Generic;
    };
    let member_tag = member.tag_name();

    if member_tag == "tr" || matches!(parent_tag, "table" | "tbody" | "thead") {
        return PatternKind::Table;
    }
    let in_nav = parent_tag == "nav"
        || parent_node.is_some_and(|p| {
            p.parent
                .and_then(|gp| doc.node(gp))
                .is_some_and(|gp| gp.tag_name() == "nav")
        });
    let member_links = doc.element_children(template);
    let link_only = member_tag == "a"
        || (!member_links.is_empty()
            && member_links
                .iter()
                .all(|&c| doc.node(c).is_some_and(|n| n.tag_name() == "a")));
    if in_nav || (link_only && in_nav_like(parent_node)) {
        return PatternKind::Navigation;
    }
    if member
        .classes()
        .any(|c| c.to_ascii_lowercase().contains("card") || c.eq_ignore_ascii_case("tile"))
    {
        return PatternKind::Card;
    }
    let grid_parent = parent_node.is_some_and(|p| {
        p.classes().any(|c| {
            let c = c.to_ascii_lowercase();
            c.contains("grid") || c == "row" || c.contains("columns")
        }) || p
            .attributes
            .style
            .iter()
            .any(|d| d.css_property == "display" && d.value.contains("grid"))
    });
    if grid_parent {
        return PatternKind::Grid;
    }
    if member_tag == "li" || matches!(parent_tag, "ul" | "ol") {
        return PatternKind::List;
    }
    PatternKind::Generic
}

fn in_nav_like(parent: Option<&ParsedNode>) -> bool {
    parent.is_some_and(|p| {
        p.attr("role") == Some("navigation")
            || p.classes().any(|c| {
                let c = c.to_ascii_lowercase();
                c.contains("nav") || c.contains("menu")
            })
    })
}

/// Suggested component name for a pattern member.
fn label_for(doc: &ParsedDocument, template: NodeId) -> String {
    let Some(node) = doc.node(template) else {
        return "Item".to_string();
    };
    let from_class = node
        .classes()
        .find(|c| !is_utility_class(c))
        .and_then(BemClass::parse)
        .and_then(|bem| match bem.element {
            Some(element) => sanitize_identifier(&format!("{} {element}", bem.block)),
            None => sanitize_identifier(&bem.block),
        });
    if let Some(name) = from_class {
        return name;
    }
    match node.tag_name() {
        "li" => "ListItem",
        "tr" => "TableRow",
        "a" => "NavLink",
        "article" => "ArticleItem",
        "figure" => "Figure",
        "option" => "SelectOption",
        _ => "Item",
    }
    .to_string()
}

/// Child-index path from `root` to `id`.
fn path_to(doc: &ParsedDocument, root: NodeId, id: NodeId) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut current = id;
    while current != root {
        let parent = doc.node(current)?.parent?;
        let index = doc.node(parent)?.children.iter().position(|&c| c == current)?;
        path.push(index);
        current = parent;
    }
    path.reverse();
    Some(path)
}

fn follow(doc: &ParsedDocument, root: NodeId, path: &[usize]) -> Option<NodeId> {
    let mut current = root;
    for &index in path {
        current = *doc.node(current)?.children.get(index)?;
    }
    Some(current)
}

/// Candidate value locations in the template.
fn candidate_slots(doc: &ParsedDocument, template: NodeId) -> Vec<PropSlot> {
    let mut slots = Vec::new();
    for id in std::iter::once(template).chain(doc.descendants(template)) {
        let Some(node) = doc.node(id) else {
            continue;
        };
        match node.kind {
            NodeKind::Text if node.text.as_deref().is_some_and(|t| !t.trim().is_empty()) => {
                slots.push(PropSlot {
                    node: id,
                    target: SlotTarget::Text,
                });
            }
            NodeKind::Element => {
                for (name, _) in &node.attributes.raw {
                    let skip = matches!(name.as_str(), "class" | "style")
                        || name.starts_with("on")
                        || is_boolean_attribute(name);
                    if !skip {
                        slots.push(PropSlot {
                            node: id,
                            target: SlotTarget::Attribute { name: name.clone() },
                        });
                    }
                }
            }
            _ => {}
        }
    }
    slots
}

/// Boolean attributes present on some member at each element of the
/// template.
fn presence_slots(doc: &ParsedDocument, members: &[NodeId]) -> Vec<PropSlot> {
    let template = members[0];
    let mut slots = Vec::new();
    for id in std::iter::once(template).chain(doc.descendants(template)) {
        if !doc.node(id).is_some_and(ParsedNode::is_element) {
            continue;
        }
        let Some(path) = path_to(doc, template, id) else {
            continue;
        };
        let names: BTreeSet<String> = members
            .iter()
            .filter_map(|&m| follow(doc, m, &path).and_then(|n| doc.node(n)))
            .flat_map(|n| n.attributes.raw.iter().map(|(name, _)| name))
            .filter(|name| is_boolean_attribute(name))
            .map(|name| name.to_ascii_lowercase())
            .collect();
        slots.extend(names.into_iter().map(|name| PropSlot {
            node: id,
            target: SlotTarget::Presence { name },
        }));
    }
    slots
}

fn slot_value(doc: &ParsedDocument, id: NodeId, target: &SlotTarget) -> Option<String> {
    let node = doc.node(id)?;
    match target {
        SlotTarget::Text => (node.kind == NodeKind::Text)
            .then(|| node.text.as_deref().unwrap_or_default().trim().to_string()),
        SlotTarget::Attribute { name } => node.attr(name).map(str::to_string),
        SlotTarget::Presence { name } => node
            .is_element()
            .then(|| node.attr(name).is_some().to_string()),
    }
}

/// Prop name for a slot, derived from where the value sits.
fn slot_prop_name(doc: &ParsedDocument, slot: &PropSlot) -> String {
    match &slot.target {
        SlotTarget::Attribute { name } => {
            let tag = doc.node(slot.node).map(ParsedNode::tag_name).unwrap_or_default();
            match (tag, name.as_str()) {
                ("img", "src") => "image".to_string(),
                ("img", "alt") => "imageAlt".to_string(),
                ("a", "href") => "href".to_string(),
                (_, attr) => camel_case(attr.trim_start_matches("data-")),
            }
        }
        SlotTarget::Presence { name } => format!("is{}", pascal_case(name)),
        SlotTarget::Text => {
            let Some(element) = doc.node(slot.node).and_then(|n| n.parent).and_then(|p| doc.node(p))
            else {
                return "text".to_string();
            };
            let from_class = element
                .classes()
                .filter_map(BemClass::parse)
                .find_map(|bem| bem.element)
                .map(|e| camel_case(&e));
            if let Some(name) = from_class.filter(|n| !n.is_empty()) {
                return name;
            }
            match element.tag_name() {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "title",
                "p" => "description",
                "a" => "linkText",
                "button" => "buttonText",
                "strong" | "b" | "em" => "highlight",
                "span" | "label" => "label",
                "figcaption" | "caption" => "caption",
                "time" => "date",
                _ => "text",
            }
            .to_string()
        }
    }
}

/// Prop type from the set of observed values.
pub fn infer_value_type<'a>(values: impl IntoIterator<Item = &'a str>) -> PropType {
    let values: Vec<&str> = values.into_iter().map(str::trim).collect();
    if values.is_empty() {
        return PropType::String;
    }
    if values.iter().all(|v| matches!(*v, "true" | "false")) {
        return PropType::Boolean;
    }
    if values
        .iter()
        .all(|v| !v.is_empty() && v.parse::<f64>().is_ok_and(f64::is_finite))
    {
        return PropType::Number;
    }
    PropType::String
}

fn infer_props(
    doc: &ParsedDocument,
    members: &[NodeId],
) -> (Vec<PropDefinition>, Vec<PatternInstance>) {
    let template = members[0];
    let mut props: Vec<PropDefinition> = Vec::new();
    let mut columns: Vec<Vec<String>> = Vec::new();

    let slots = candidate_slots(doc, template)
        .into_iter()
        .chain(presence_slots(doc, members));
    for slot in slots {
        let Some(path) = path_to(doc, template, slot.node) else {
            continue;
        };
        let values: Option<Vec<String>> = members
            .iter()
            .map(|&m| {
                follow(doc, m, &path).and_then(|node| slot_value(doc, node, &slot.target))
            })
            .collect();
        let Some(values) = values else {
            // Missing in some member: leave the template's literal in place.
            continue;
        };
        if values.iter().all(|v| v == &values[0]) {
            continue;
        }

        let base = slot_prop_name(doc, &slot);
        let mut name = base.clone();
        let mut n = 2;
        while props.iter().any(|p| p.name == name) {
            name = format!("{base}{n}");
            n += 1;
        }
        props.push(PropDefinition {
            name,
            ty: infer_value_type(values.iter().map(String::as_str)),
            required: true,
            default: None,
            slot: Some(slot),
        });
        columns.push(values);
    }

    let instances = members
        .iter()
        .enumerate()
        .map(|(i, &node)| PatternInstance {
            node,
            values: columns.iter().map(|col| col[i].clone()).collect(),
        })
        .collect();
    (props, instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse};

    fn detect(html: &str) -> (ParsedDocument, Vec<PatternDetectionResult>) {
        let doc = parse(html, &ParseOptions::default()).unwrap();
        let patterns = detect_patterns(&doc, &PatternOptions::default());
        (doc, patterns)
    }

    #[test]
    fn test_five_identical_cards() {
        let items: String = (1..=5)
            .map(|i| format!(r#"<li class="card"><h3>Item {i}</h3><p>Body</p></li>"#))
            .collect();
        let (_, patterns) = detect(&format!("<ul>{items}</ul>"));
        assert_eq!(patterns.len(), 1);
        let pattern = &patterns[0];
        assert_eq!(pattern.count, 5);
        assert_eq!(pattern.members.len(), 5);
        assert_eq!(pattern.kind, PatternKind::Card);
        assert_eq!(pattern.label, "Card");
        assert!((pattern.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_below_min_occurrences() {
        let (_, patterns) = detect("<ul><li>a</li><li>b</li></ul>");
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_dissimilar_siblings_are_not_a_pattern() {
        let (_, patterns) = detect(
            "<div>\
             <section><h2>A</h2></section>\
             <section><form><input><input><button>x</button></form><table><tr><td>1</td></tr></table></section>\
             <section><ul><li>1</li><li>2</li><li>3</li></ul><img src=a.png></section>\
             </div>",
        );
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_varying_values_become_typed_props() {
        let (doc, patterns) = detect(
            r#"<div class="grid">
              <div class="product"><img src="a.png"><h3>Alpha</h3><span>10</span><em>true</em></div>
              <div class="product"><img src="b.png"><h3>Beta</h3><span>20</span><em>false</em></div>
              <div class="product"><img src="c.png"><h3>Gamma</h3><span>30</span><em>true</em></div>
            </div>"#,
        );
        let pattern = &patterns[0];
        assert_eq!(pattern.kind, PatternKind::Grid);
        let props: Vec<_> = pattern.props.iter().map(|p| (p.name.as_str(), p.ty)).collect();
        assert_eq!(
            props,
            vec![
                ("image", PropType::String),
                ("title", PropType::String),
                ("label", PropType::Number),
                ("highlight", PropType::Boolean),
            ]
        );
        assert_eq!(pattern.instances[1].values, vec!["b.png", "Beta", "20", "false"]);
        let slot = pattern.props[1].slot.as_ref().unwrap();
        assert_eq!(doc.node(slot.node).unwrap().text.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_member_with_extra_child_stays_out_of_the_pattern() {
        let (doc, patterns) = detect(
            r#"<ul>
              <li class="card"><h3>Alpha</h3></li>
              <li class="card"><h3>Beta</h3><span class="badge">NEW-ONLY-HERE</span></li>
              <li class="card"><h3>Gamma</h3></li>
              <li class="card"><h3>Delta</h3></li>
            </ul>"#,
        );
        assert_eq!(patterns.len(), 1);
        let pattern = &patterns[0];
        assert_eq!(pattern.count, 3);
        let titles: Vec<_> = pattern.instances.iter().map(|i| i.values[0].as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Gamma", "Delta"]);

        let badge = doc
            .elements()
            .find(|n| n.classes().any(|c| c == "badge"))
            .and_then(|n| n.parent)
            .unwrap();
        assert!(!pattern.members.contains(&badge));
        assert!(pattern.instances.iter().all(|i| i.node != badge));
    }

    #[test]
    fn test_too_few_exact_members_is_no_pattern() {
        let (_, patterns) = detect(
            r#"<ul>
              <li class="card"><h3>A</h3></li>
              <li class="card"><h3>B</h3><p>x</p></li>
              <li class="card"><h3>C</h3></li>
            </ul>"#,
        );
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_boolean_attribute_presence_becomes_prop() {
        let (_, patterns) = detect(
            r#"<ul>
              <li class="choice"><input type="checkbox"><span>Email</span></li>
              <li class="choice"><input type="checkbox" checked><span>Phone</span></li>
              <li class="choice"><input type="checkbox"><span>Post</span></li>
            </ul>"#,
        );
        let pattern = &patterns[0];
        assert_eq!(pattern.count, 3);
        let props: Vec<_> = pattern.props.iter().map(|p| (p.name.as_str(), p.ty)).collect();
        assert_eq!(props, vec![("label", PropType::String), ("isChecked", PropType::Boolean)]);
        assert_eq!(pattern.instances[1].values, vec!["Phone", "true"]);
        assert_eq!(pattern.instances[2].values, vec!["Post", "false"]);
        assert_eq!(
            pattern.props[1].slot.as_ref().unwrap().target,
            SlotTarget::Presence { name: "checked".into() }
        );
    }

    #[test]
    fn test_nested_patterns_inside_members_are_skipped() {
        let card = r#"<div class="card"><ul><li>a</li><li>b</li><li>c</li></ul></div>"#;
        let (_, patterns) = detect(&format!("<div>{card}{card}{card}</div>"));
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].label, "Card");
    }

    #[test]
    fn test_navigation_and_table_kinds() {
        let (_, patterns) = detect(r#"<nav><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a></nav>"#);
        assert_eq!(patterns[0].kind, PatternKind::Navigation);
        assert_eq!(patterns[0].props[0].name, "href");

        let (_, patterns) = detect(
            "<table><tr><td>1</td></tr><tr><td>2</td></tr><tr><td>3</td></tr></table>",
        );
        assert_eq!(patterns[0].kind, PatternKind::Table);
    }

    #[test]
    fn test_infer_value_type() {
        assert_eq!(infer_value_type(["1", "2.5", "-3"]), PropType::Number);
        assert_eq!(infer_value_type(["true", "false"]), PropType::Boolean);
        assert_eq!(infer_value_type(["1", "two"]), PropType::String);
        assert_eq!(infer_value_type(["", "1"]), PropType::String);
    }
}
