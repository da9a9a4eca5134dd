//! Block-Element-Modifier class decomposition.

use serde::Serialize;

use crate::dom::{NodeId, ParsedDocument};

/// One class split into its BEM parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BemClass {
    pub block: String,
    pub element: Option<String>,
    pub modifier: Option<String>,
}

impl BemClass {
    /// Parse `block__element--modifier`. Returns `None` for malformed names
    /// such as `__x` or `a____b`.
    pub fn parse(class: &str) -> Option<Self> {
        let (rest, modifier) = match class.split_once("--") {
            Some((rest, modifier)) => (rest, Some(modifier)),
            None => (class, None),
        };
        let (block, element) = match rest.split_once("__") {
            Some((block, element)) => (block, Some(element)),
            None => (rest, None),
        };
        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                && !part.contains("__")
        };
        if !valid(block) || !element.is_none_or(valid) || !modifier.is_none_or(valid) {
            return None;
        }
        Some(Self {
            block: block.to_string(),
            element: element.map(str::to_string),
            modifier: modifier.map(str::to_string),
        })
    }

    /// A bare block class (`card`, not `card__title` or `card--wide`).
    pub fn is_block(&self) -> bool {
        self.element.is_none() && self.modifier.is_none()
    }
}

/// BEM decomposition of an element's class list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BemInfo {
    pub block: String,
    pub element: Option<String>,
    pub modifiers: Vec<String>,
}

/// Decompose a class list. The first class carrying BEM structure decides the
/// block; modifiers of that same block/element are collected.
pub fn decompose<'a>(classes: impl IntoIterator<Item = &'a str>) -> Option<BemInfo> {
    let parsed: Vec<BemClass> = classes.into_iter().filter_map(BemClass::parse).collect();
    let anchor = parsed
        .iter()
        .find(|c| c.element.is_some() || c.modifier.is_some())
        .or_else(|| parsed.first())?;
    let modifiers = parsed
        .iter()
        .filter(|c| c.block == anchor.block && c.element == anchor.element)
        .filter_map(|c| c.modifier.clone())
        .collect();
    Some(BemInfo {
        block: anchor.block.clone(),
        element: anchor.element.clone(),
        modifiers,
    })
}

/// The block name if `id` is the root of a BEM block: it carries a bare
/// block class and some descendant carries `block__element`.
pub fn block_root(doc: &ParsedDocument, id: NodeId) -> Option<String> {
    let node = doc.node(id)?;
    let blocks: Vec<&str> = node
        .classes()
        .filter(|c| BemClass::parse(c).is_some_and(|b| b.is_block()))
        .collect();
    if blocks.is_empty() {
        return None;
    }
    let descendants = doc.descendants(id);
    blocks
        .into_iter()
        .find(|block| {
            let prefix = format!("{block}__");
            descendants.iter().any(|&d| {
                doc.node(d)
                    .is_some_and(|n| n.classes().any(|c| c.starts_with(&prefix)))
            })
        })
        .map(str::to_string)
}
