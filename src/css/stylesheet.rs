//! Lenient stylesheet and declaration-list parsing.
//!
//! Rules keep their selector text and declaration values verbatim so that
//! re-serialization preserves what the author wrote. At-rules are kept as raw
//! blocks.

use std::fmt::Write;
use std::ops::Range;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, Delimiter, ParseError, Parser, ParserInput,
    ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};

/// A CSS declaration (property: value).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Declaration {
    /// Lowercased property name (`background-color`).
    pub property: String,
    /// Value text without `!important`.
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }

    /// Render as `property: value` (with `!important` if set).
    pub fn to_css(&self) -> String {
        if self.important {
            format!("{}: {} !important", self.property, self.value)
        } else {
            format!("{}: {}", self.property, self.value)
        }
    }
}

/// A style rule with its selector text preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: String,
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    /// Class names referenced anywhere in the selector list.
    pub fn class_names(&self) -> Vec<String> {
        selector_class_names(&self.selectors)
    }

    /// The class name if the selector is exactly one `.class`.
    pub fn single_class(&self) -> Option<&str> {
        let name = self.selectors.trim().strip_prefix('.')?;
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then_some(name)
    }
}

/// An at-rule kept verbatim (`@media`, `@import`, `@font-face`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    /// Raw text between the braces, `None` for statement at-rules.
    pub block: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssRule {
    Style(StyleRule),
    At(AtRule),
}

/// A parsed CSS stylesheet.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    /// Parse a CSS stylesheet from a string.
    ///
    /// Invalid rules are skipped; parsing never fails.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            if let Err((err, slice)) = result {
                tracing::debug!(kind = ?err.kind, rule = slice, "skipping invalid CSS rule");
            }
        }

        Self { rules }
    }

    /// Check if the stylesheet is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Style rules in source order.
    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|r| match r {
            CssRule::Style(rule) => Some(rule),
            CssRule::At(_) => None,
        })
    }

    /// Append the rules of another stylesheet.
    pub fn extend(&mut self, other: Stylesheet) {
        self.rules.extend(other.rules);
    }

    /// Serialize with two-space indentation and one blank line between rules.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match rule {
                CssRule::Style(style) => {
                    out.push_str(&format_rule(&style.selectors, &style.declarations, ""));
                }
                CssRule::At(at) => {
                    let _ = write!(out, "@{}", at.name);
                    if !at.prelude.is_empty() {
                        let _ = write!(out, " {}", at.prelude);
                    }
                    match &at.block {
                        Some(block) => {
                            let _ = writeln!(out, " {{\n{}\n}}", reindent(block, "  "));
                        }
                        None => out.push_str(";\n"),
                    }
                }
            }
        }
        out
    }
}

/// Format one rule block at the given indentation.
pub fn format_rule(selectors: &str, declarations: &[Declaration], indent: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{indent}{} {{", selectors.trim());
    for decl in declarations {
        let _ = writeln!(out, "{indent}  {};", decl.to_css());
    }
    let _ = writeln!(out, "{indent}}}");
    out
}

fn reindent(block: &str, indent: &str) -> String {
    block
        .trim()
        .lines()
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a declaration list such as the body of a `style` attribute.
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();
    let mut decl_parser = DeclarationListParser {
        declarations: &mut declarations,
    };
    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        if let Err((err, slice)) = result {
            tracing::debug!(kind = ?err.kind, declaration = slice, "skipping invalid declaration");
        }
    }
    declarations
}

/// Class names referenced in a selector list.
pub fn selector_class_names(selectors: &str) -> Vec<String> {
    let mut input = ParserInput::new(selectors);
    let mut parser = Parser::new(&mut input);
    let mut names = Vec::new();
    collect_class_names(&mut parser, &mut names);
    names.dedup();
    names
}

fn collect_class_names(parser: &mut Parser<'_, '_>, names: &mut Vec<String>) {
    let mut after_dot = false;
    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Delim('.') => {
                after_dot = true;
                continue;
            }
            Token::Ident(name) if after_dot => names.push(name.to_string()),
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                let _ = parser.parse_nested_block(|p| {
                    collect_class_names(p, names);
                    Ok::<_, ParseError<'_, ()>>(())
                });
            }
            _ => {}
        }
        after_dot = false;
    }
}

/// A `url(...)` reference found in CSS text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlToken {
    /// Byte range of the whole `url(...)` token in the source text.
    pub range: Range<usize>,
    pub url: String,
}

/// Every `url(...)` reference in CSS text, in source order.
///
/// Works on full stylesheets and bare declaration lists alike.
pub fn url_tokens(css: &str) -> Vec<UrlToken> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut out = Vec::new();
    collect_urls(&mut parser, &mut out);
    out
}

fn collect_urls(parser: &mut Parser<'_, '_>, out: &mut Vec<UrlToken>) {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::UnquotedUrl(url) => out.push(UrlToken {
                range: start.byte_index()..parser.position().byte_index(),
                url: url.to_string(),
            }),
            Token::Function(name) if name.eq_ignore_ascii_case("url") => {
                let url = parser.parse_nested_block(|p| {
                    let url = p.expect_string()?.to_string();
                    Ok::<_, ParseError<'_, ()>>(url)
                });
                if let Ok(url) = url {
                    out.push(UrlToken {
                        range: start.byte_index()..parser.position().byte_index(),
                        url,
                    });
                }
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                let _ = parser.parse_nested_block(|p| {
                    collect_urls(p, out);
                    Ok::<_, ParseError<'_, ()>>(())
                });
            }
            _ => {}
        }
    }
}

/// Replace each `url(...)` token whose URL `map` returns a substitute for.
///
/// Only whole tokens are rewritten; text outside `url()` is never touched.
pub fn rewrite_urls<F>(css: &str, mut map: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(css.len());
    let mut last = 0;
    for token in url_tokens(css) {
        if let Some(replacement) = map(&token.url) {
            out.push_str(&css[last..token.range.start]);
            let _ = write!(out, "url(\"{}\")", replacement.replace('"', "%22"));
            last = token.range.end;
        }
    }
    out.push_str(&css[last..]);
    out
}

// ============================================================================
// cssparser trait impls
// ============================================================================

/// Parser for top-level stylesheet rules.
struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = (String, String);
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let prelude = input.slice_from(start).trim().to_string();
        Ok((name.to_ascii_lowercase(), prelude))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        let (name, prelude) = prelude;
        self.rules.push(CssRule::At(AtRule {
            name,
            prelude,
            block: None,
        }));
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let (name, prelude) = prelude;
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let block = input.slice_from(start).to_string();
        self.rules.push(CssRule::At(AtRule {
            name,
            prelude,
            block: Some(block),
        }));
        Ok(())
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = String;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let selectors = input.slice_from(start).trim();
        if selectors.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(selectors.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut declarations = Vec::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };
        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }
        self.rules.push(CssRule::Style(StyleRule {
            selectors: prelude,
            declarations,
        }));
        Ok(())
    }
}

struct DeclarationListParser<'a> {
    declarations: &'a mut Vec<Declaration>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        input.parse_until_before(Delimiter::Bang, |input| {
            while input.next().is_ok() {}
            Ok::<_, ParseError<'i, ()>>(())
        })?;
        let value = input.slice_from(start).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        let important = input.try_parse(cssparser::parse_important).is_ok();
        input.expect_exhausted()?;

        let property = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        self.declarations.push(Declaration {
            property,
            value: value.to_string(),
            important,
        });
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations("color: red; Margin: 0 auto !important;; bogus");
        assert_eq!(
            decls,
            vec![
                Declaration::new("color", "red"),
                Declaration {
                    property: "margin".into(),
                    value: "0 auto".into(),
                    important: true,
                },
            ]
        );
    }

    #[test]
    fn test_value_with_function_and_url() {
        let decls = parse_declarations("background: url(a.png) no-repeat, rgba(0, 0, 0, .5)");
        assert_eq!(decls[0].value, "url(a.png) no-repeat, rgba(0, 0, 0, .5)");
    }

    #[test]
    fn test_stylesheet_keeps_selectors_and_at_rules() {
        let sheet = Stylesheet::parse(
            "@import url(base.css);\n.card > h2,  .title { font-weight: bold }\n@media (max-width: 600px) { .card { padding: 0 } }",
        );
        assert_eq!(sheet.rules.len(), 3);
        let style: Vec<_> = sheet.style_rules().collect();
        assert_eq!(style[0].selectors, ".card > h2, .title");
        assert_eq!(style[0].class_names(), vec!["card", "title"]);
        match &sheet.rules[2] {
            CssRule::At(at) => {
                assert_eq!(at.name, "media");
                assert_eq!(at.prelude, "(max-width: 600px)");
                assert!(at.block.as_deref().unwrap().contains(".card"));
            }
            other => panic!("expected at-rule, got {other:?}"),
        }
    }

    #[test]
    fn test_to_css_is_stable() {
        let css = ".a { color: red; }\n\n.b { margin: 0; }\n";
        let once = Stylesheet::parse(css).to_css();
        let twice = Stylesheet::parse(&once).to_css();
        assert_eq!(once, twice);
        assert_eq!(once, ".a {\n  color: red;\n}\n\n.b {\n  margin: 0;\n}\n");
    }

    #[test]
    fn test_single_class() {
        let sheet = Stylesheet::parse(".btn { color: red } .btn:hover { color: blue }");
        let rules: Vec<_> = sheet.style_rules().collect();
        assert_eq!(rules[0].single_class(), Some("btn"));
        assert_eq!(rules[1].single_class(), None);
    }

    #[test]
    fn test_url_tokens_and_rewrite() {
        let css = r#"body { background: url(img/bg.png) } .x { src: url("img/bg.png.bak") }"#;
        let tokens = url_tokens(css);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].url, "img/bg.png");
        assert_eq!(&css[tokens[0].range.clone()], "url(img/bg.png)");
        assert_eq!(tokens[1].url, "img/bg.png.bak");

        let rewritten = rewrite_urls(css, |url| {
            (url == "img/bg.png").then(|| "/assets/images/bg.png".to_string())
        });
        assert!(rewritten.contains(r#"url("/assets/images/bg.png")"#));
        assert!(rewritten.contains(r#"url("img/bg.png.bak")"#));
    }
}
