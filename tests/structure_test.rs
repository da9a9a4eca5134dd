//! Structural invariants over generated markup.

use std::collections::HashSet;

use proptest::prelude::*;

use jsxkit::css::{self, CssOptions};
use jsxkit::dom::attributes::is_void_element;
use jsxkit::split::naming::NameRegistry;
use jsxkit::{ConversionOptions, Converter, CssStrategy, NodeId, ParseOptions, parse};

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,12}"
}

fn void_element() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<br>".to_string()),
        Just("<hr>".to_string()),
        Just(r#"<img src="a.png" alt="a">"#.to_string()),
        Just(r#"<input type="text" name="q">"#.to_string()),
    ]
}

fn container_tag() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["div", "section", "article", "span", "p", "ul", "li", "header", "nav"])
}

fn class_attr() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(r#" class="card""#.to_string()),
        Just(r#" class="a b""#.to_string()),
        Just(r#" style="color: red; padding: 4px""#.to_string()),
    ]
}

/// Random, possibly invalid, nested markup.
fn markup() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![text(), void_element()];
    leaf.prop_recursive(5, 48, 6, |inner| {
        (
            container_tag(),
            class_attr(),
            prop::collection::vec(inner, 0..6),
        )
            .prop_map(|(tag, attrs, children)| {
                format!("<{tag}{attrs}>{}</{tag}>", children.concat())
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ids_are_unique_and_depths_consistent(html in markup()) {
        let doc = parse(&html, &ParseOptions::default()).unwrap();
        let mut seen = HashSet::new();
        for (index, node) in doc.nodes().iter().enumerate() {
            prop_assert_eq!(node.id, NodeId(index as u32));
            prop_assert!(seen.insert(node.id));
            match node.parent {
                Some(parent) => {
                    let parent = doc.node(parent).unwrap();
                    prop_assert_eq!(node.depth, parent.depth + 1);
                    prop_assert!(parent.children.contains(&node.id));
                }
                None => {
                    prop_assert_eq!(node.id, doc.root());
                    prop_assert_eq!(node.depth, 0);
                }
            }
        }
    }

    #[test]
    fn prop_void_elements_are_childless_and_self_closing(html in markup()) {
        let doc = parse(&html, &ParseOptions::default()).unwrap();
        for node in doc.elements() {
            if node.tag.as_deref().is_some_and(is_void_element) {
                prop_assert!(node.children.is_empty());
                prop_assert!(node.self_closing);
            }
        }

        let result = Converter::new()
            .without_fetcher()
            .convert_markup(&html, ConversionOptions::default());
        prop_assert!(result.is_success());
        for file in result.files.iter().filter(|f| f.path.starts_with("src/components/")) {
            let source = file.contents.as_deref().unwrap();
            for tag in ["br", "hr", "img", "input"] {
                let closing = format!("</{tag}>");
                prop_assert!(!source.contains(&closing));
            }
            prop_assert!(!source.contains(" class="));
        }
    }

    #[test]
    fn prop_css_output_is_stable(html in markup()) {
        for strategy in [CssStrategy::Tailwind, CssStrategy::CssModules, CssStrategy::Vanilla] {
            let options = CssOptions::new(strategy);
            let first = css::convert(&html, &options).unwrap();
            let second = css::convert(&html, &options).unwrap();
            prop_assert_eq!(first.css, second.css);
            prop_assert_eq!(first.files, second.files);
        }
    }

    #[test]
    fn prop_claimed_names_are_unique(
        bases in prop::collection::vec(prop::sample::select(vec!["Card", "Card2", "Panel", "Panel10", "Item"]), 1..40)
    ) {
        let mut registry = NameRegistry::new();
        let mut claimed = HashSet::new();
        for base in bases {
            let name = registry.claim(base);
            prop_assert!(name.starts_with(base.trim_end_matches(|c: char| c.is_ascii_digit())));
            prop_assert!(claimed.insert(name));
        }
    }
}
