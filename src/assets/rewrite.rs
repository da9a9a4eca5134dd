//! Substituting asset references with their packaged paths.
//!
//! Rewrites are token-exact: a whole attribute value, one `srcset`
//! candidate or one `url(...)` token is replaced only when it equals a
//! reference's original text. A URL that is a substring of another URL is
//! never touched inside the longer one.

use std::collections::{BTreeMap, HashSet};

use crate::codegen::FileKind;
use crate::css::stylesheet::rewrite_urls;
use crate::dom::arena::{ArenaDom, ArenaNodeId};

use super::{AssetExtractionResult, ReferenceContext, srcset_urls};

/// Rewrite the markup an extraction result was produced from.
///
/// Only extracted assets are substituted; failed and skipped ones keep
/// their original URLs. The document is re-serialized from the DOM.
pub fn rewrite_html(markup: &str, result: &AssetExtractionResult) -> String {
    let mut dom = ArenaDom::parse(markup);
    rewrite_dom(&mut dom, result);
    dom.to_html()
}

/// In-place variant of [`rewrite_html`] for a DOM parsed from the same markup.
pub fn rewrite_dom(dom: &mut ArenaDom, result: &AssetExtractionResult) {
    let replacements = result.replacements();
    if replacements.is_empty() {
        return;
    }
    let lookup = |url: &str| replacements.get(url.trim()).cloned();

    let mut done: HashSet<(ArenaNodeId, ReferenceContext, Option<String>)> = HashSet::new();
    for asset in result.extracted() {
        for reference in &asset.references {
            let key = (reference.node, reference.context, reference.attribute.clone());
            if !done.insert(key) {
                continue;
            }
            match (reference.context, reference.attribute.as_deref()) {
                (ReferenceContext::Attribute, Some(name)) => {
                    if let Some(value) = dom.get_attr(reference.node, name)
                        && let Some(replacement) = lookup(value)
                    {
                        dom.set_attr(reference.node, name, replacement);
                    }
                }
                (ReferenceContext::Srcset, Some(name)) => {
                    if let Some(value) = dom.get_attr(reference.node, name) {
                        let rewritten = rewrite_srcset(value, &lookup);
                        dom.set_attr(reference.node, name, rewritten);
                    }
                }
                (ReferenceContext::InlineStyle, Some(name)) => {
                    if let Some(value) = dom.get_attr(reference.node, name) {
                        let rewritten = rewrite_urls(value, &lookup);
                        dom.set_attr(reference.node, name, rewritten);
                    }
                }
                (ReferenceContext::StyleElement, _) => {
                    let texts: Vec<ArenaNodeId> = dom.children(reference.node).collect();
                    for text_id in texts {
                        if let Some(css) = dom.text_content(text_id) {
                            let rewritten = rewrite_urls(css, &lookup);
                            dom.set_text(text_id, rewritten);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Replace matching candidates of a `srcset` value, keeping descriptors.
pub fn rewrite_srcset<F>(srcset: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(srcset.len());
    let mut last = 0;
    for range in srcset_urls(srcset) {
        if let Some(replacement) = lookup(&srcset[range.clone()]) {
            out.push_str(&srcset[last..range.start]);
            out.push_str(&replacement);
            last = range.end;
        }
    }
    out.push_str(&srcset[last..]);
    out
}

/// Rewrite references inside a generated source file.
///
/// CSS is rewritten per `url(...)` token. Script sources are rewritten per
/// double-quoted string literal: a literal equal to an original URL is
/// replaced, otherwise its `url(...)` tokens and `srcset` candidates are.
/// In markup (JSX, TSX, HTML) literals never pair across a tag boundary, so
/// a stray quote in text content cannot shift the pairing of later
/// attribute values.
pub fn rewrite_references(
    source: &str,
    kind: FileKind,
    replacements: &BTreeMap<String, String>,
) -> String {
    if replacements.is_empty() {
        return source.to_string();
    }
    let lookup = |url: &str| replacements.get(url.trim()).cloned();
    let literal = |literal: &str| {
        if let Some(replacement) = lookup(literal) {
            return replacement;
        }
        if literal.contains("url(") {
            return rewrite_urls(literal, &lookup).replace('"', "'");
        }
        rewrite_srcset(literal, &lookup)
    };
    match kind {
        FileKind::Css => rewrite_urls(source, lookup),
        FileKind::Jsx | FileKind::Tsx | FileKind::Html => rewrite_markup_literals(source, &literal),
        FileKind::Js | FileKind::Ts => rewrite_string_literals(source, &literal),
        _ => source.to_string(),
    }
}

/// Markup variant of [`rewrite_string_literals`]: text between tags and
/// each tag are rewritten separately.
fn rewrite_markup_literals<F>(source: &str, map: &F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while !rest.is_empty() {
        let text_len = tag_start(rest).unwrap_or(rest.len());
        out.push_str(&rewrite_string_literals(&rest[..text_len], map));
        rest = &rest[text_len..];
        if rest.is_empty() {
            break;
        }
        let tag_len = tag_len(rest);
        rewrite_tag_literals(&rest[..tag_len], map, &mut out);
        rest = &rest[tag_len..];
    }
    out
}

/// Byte offset of the next `<` that opens a tag (`<a`, `</a`, `<>`, `<!`).
fn tag_start(text: &str) -> Option<usize> {
    text.match_indices('<').map(|(i, _)| i).find(|&i| {
        text[i + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '>' | '!'))
    })
}

/// Length of the tag at the start of `text`, through its closing `>`.
///
/// A `>` inside quotes or a `{...}` expression (`=>` in a handler) does not
/// close the tag.
fn tag_len(text: &str) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return i + 1,
            _ => {}
        }
    }
    text.len()
}

/// Rewrite the double-quoted literals of one tag, stepping over single
/// quoted and template literals so a `"` inside them is not paired.
fn rewrite_tag_literals<F>(tag: &str, map: &F, out: &mut String)
where
    F: Fn(&str) -> String,
{
    let mut rest = tag;
    while let Some(open) = rest.find(['"', '\'', '`']) {
        let quote = char::from(rest.as_bytes()[open]);
        out.push_str(&rest[..=open]);
        let body_start = open + 1;
        let Some(len) = quoted_len(&rest[body_start..], quote) else {
            out.push_str(&rest[body_start..]);
            return;
        };
        let body = &rest[body_start..body_start + len];
        if quote == '"' && !body.contains(['\\', '\n']) {
            out.push_str(&map(body));
        } else {
            out.push_str(body);
        }
        out.push(quote);
        rest = &rest[body_start + len + 1..];
    }
    out.push_str(rest);
}

/// Apply `map` to the body of every double-quoted literal in `source`.
fn rewrite_string_literals<F>(source: &str, map: &F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(open) = rest.find('"') {
        out.push_str(&rest[..=open]);
        let body_start = open + 1;
        let Some(len) = literal_len(&rest[body_start..]) else {
            out.push_str(&rest[body_start..]);
            return out;
        };
        let body = &rest[body_start..body_start + len];
        if body.contains(['\\', '\n']) {
            out.push_str(body);
        } else {
            out.push_str(&map(body));
        }
        out.push('"');
        rest = &rest[body_start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Length of a string literal body up to its closing quote.
fn literal_len(text: &str) -> Option<usize> {
    quoted_len(text, '"')
}

/// Length of a literal body opened by `quote`. Only template literals may
/// span lines.
fn quoted_len(text: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            _ if c == quote => return Some(i),
            '\n' if quote != '`' => return None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetExtractor, Fetched, Fetcher, FetchError};

    struct Echo;

    impl Fetcher for Echo {
        fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
            if url.contains("missing") {
                return Err(FetchError::Request("offline".into()));
            }
            Ok(Fetched::new(vec![1, 2, 3]))
        }
    }

    fn extract(html: &str) -> AssetExtractionResult {
        AssetExtractor::default().extract_with_download(html, &Echo)
    }

    #[test]
    fn test_substring_urls_are_not_corrupted() {
        let html = r#"<img src="https://cdn.test/a.png"><img src="https://cdn.test/a.png.bak/b.png">"#;
        let result = extract(html);
        let out = rewrite_html(html, &result);
        assert!(out.contains(r#"src="/assets/images/a.png""#));
        assert!(out.contains(r#"src="/assets/images/b.png""#));
        assert!(!out.contains("cdn.test"));
    }

    #[test]
    fn test_rewrites_srcset_style_and_style_element() {
        let html = r#"<html><head><style>.a { background: url(https://cdn.test/bg.jpg) }</style></head>
            <body><img srcset="https://cdn.test/s.png 1x, https://cdn.test/missing.png 2x">
            <div style="background: url('https://cdn.test/bg.jpg')"></div></body></html>"#;
        let result = extract(html);
        let out = rewrite_html(html, &result);
        assert!(out.contains(r#"url("/assets/images/bg.jpg")"#));
        assert!(out.contains("/assets/images/s.png 1x, https://cdn.test/missing.png 2x"));
        assert!(!out.contains("url('https://cdn.test/bg.jpg')"));
    }

    #[test]
    fn test_rewrite_generated_sources() {
        let mut map = BTreeMap::new();
        map.insert("/img/a.png".to_string(), "/assets/images/a.png".to_string());
        let jsx = r#"<img src="/img/a.png" alt="/img/a.png.old" style={{ backgroundImage: "url(/img/a.png)" }} />"#;
        let out = rewrite_references(jsx, FileKind::Jsx, &map);
        assert_eq!(
            out,
            r#"<img src="/assets/images/a.png" alt="/img/a.png.old" style={{ backgroundImage: "url('/assets/images/a.png')" }} />"#
        );
        let css = ".x { background: url(/img/a.png); } .y { content: \"/img/a.png\"; }";
        assert_eq!(
            rewrite_references(css, FileKind::Css, &map),
            ".x { background: url(\"/assets/images/a.png\"); } .y { content: \"/img/a.png\"; }"
        );
    }

    #[test]
    fn test_stray_quote_in_text_does_not_shift_attributes() {
        let mut map = BTreeMap::new();
        map.insert("https://cdn.test/a.png".to_string(), "/assets/images/a.png".to_string());
        let jsx = "<div>\n  <p>5\" screen</p>\n  <img src=\"https://cdn.test/a.png\" alt=\"A\" />\n</div>";
        let out = rewrite_references(jsx, FileKind::Jsx, &map);
        assert_eq!(
            out,
            "<div>\n  <p>5\" screen</p>\n  <img src=\"/assets/images/a.png\" alt=\"A\" />\n</div>"
        );

        let handler = r#"<button onClick={() => { alert('5" wide'); }}>Go</button><img src="https://cdn.test/a.png" />"#;
        let out = rewrite_references(handler, FileKind::Tsx, &map);
        assert!(out.ends_with(r#"<img src="/assets/images/a.png" />"#));
        assert!(out.contains(r#"alert('5" wide')"#));
    }

    #[test]
    fn test_script_literals_outside_tags_are_rewritten() {
        let mut map = BTreeMap::new();
        map.insert("/img/a.png".to_string(), "/assets/images/a.png".to_string());
        let jsx = "export default function Hero({ image = \"/img/a.png\" }) {\n  return <img src={image} />;\n}";
        let out = rewrite_references(jsx, FileKind::Jsx, &map);
        assert!(out.contains(r#"image = "/assets/images/a.png""#));
    }

    #[test]
    fn test_nothing_extracted_leaves_sources_alone() {
        let map = BTreeMap::new();
        assert_eq!(rewrite_references("a \"b\"", FileKind::Jsx, &map), "a \"b\"");
    }
}
