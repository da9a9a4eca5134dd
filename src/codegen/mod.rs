//! React component source generation.
//!
//! One generator serves both output flavours. What differs between plain
//! JSX and typed TSX is described by [`Capabilities`], chosen when the
//! generator is built:
//!
//! - `typed_props`: infer props from `{expr}` attribute values
//! - `props_interface`: render an `interface NameProps` and annotate the
//!   parameter with it
//!
//! Formatting is delegated to a [`Formatter`] through
//! [`format_or_identity`], so a failing formatter never fails generation.

pub mod format;
pub mod jsx;
pub mod props;

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::css::CssConverter;
use crate::dom::ParsedDocument;
use crate::error::{Error, Result};
use crate::split::{ComponentDefinition, PropDefinition, SplitResult};

pub use self::format::{
    CommandFormatter, FormatError, Formatter, WhitespaceFormatter, format_or_identity,
};
use self::jsx::{JsxWriter, RenderTargets};
use self::props::{infer_props, merge_props, render_interface, render_parameters};

/// Kind of a generated or packaged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Jsx,
    Tsx,
    Js,
    Ts,
    Css,
    Json,
    Html,
    Markdown,
    Asset,
}

impl FileKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jsx => "jsx",
            Self::Tsx => "tsx",
            Self::Js => "js",
            Self::Ts => "ts",
            Self::Css => "css",
            Self::Json => "json",
            Self::Html => "html",
            Self::Markdown => "md",
            Self::Asset => "bin",
        }
    }

    /// Kind from a file path's extension.
    pub fn from_path(path: &str) -> Self {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "jsx" => Self::Jsx,
            "tsx" => Self::Tsx,
            "js" | "mjs" | "cjs" => Self::Js,
            "ts" => Self::Ts,
            "css" => Self::Css,
            "json" => Self::Json,
            "html" | "htm" => Self::Html,
            "md" => Self::Markdown,
            _ => Self::Asset,
        }
    }
}

/// Optional behaviour of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub typed_props: bool,
    pub props_interface: bool,
}

impl Capabilities {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn typed() -> Self {
        Self {
            typed_props: true,
            props_interface: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Emit `.tsx` instead of `.jsx`.
    pub typescript: bool,
    pub capabilities: Capabilities,
    /// Add `import React from 'react';`.
    pub import_react: bool,
    /// Extra import statements (or bare module specifiers) for every file.
    pub custom_imports: Vec<String>,
    /// Render `class` as `className`.
    pub class_name: bool,
    pub indent: usize,
    /// Props supplied by the caller, keyed by component name. They override
    /// inferred props of the same name.
    pub explicit_props: BTreeMap<String, Vec<PropDefinition>>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            typescript: false,
            capabilities: Capabilities::plain(),
            import_react: true,
            custom_imports: Vec::new(),
            class_name: true,
            indent: 2,
            explicit_props: BTreeMap::new(),
        }
    }
}

impl GeneratorOptions {
    /// Typed output implies the typed capabilities.
    pub fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self.capabilities = if typescript {
            Capabilities::typed()
        } else {
            Capabilities::plain()
        };
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_import_react(mut self, import_react: bool) -> Self {
        self.import_react = import_react;
        self
    }

    pub fn with_class_name(mut self, class_name: bool) -> Self {
        self.class_name = class_name;
        self
    }

    pub fn with_custom_import(mut self, import: impl Into<String>) -> Self {
        self.custom_imports.push(import.into());
        self
    }

    pub fn with_explicit_props(mut self, component: impl Into<String>, props: Vec<PropDefinition>) -> Self {
        self.explicit_props.insert(component.into(), props);
        self
    }

    pub fn file_kind(&self) -> FileKind {
        if self.typescript {
            FileKind::Tsx
        } else {
            FileKind::Jsx
        }
    }
}

/// One generated source file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedComponent {
    pub name: String,
    pub filename: String,
    pub source: String,
    pub kind: FileKind,
    pub props: Vec<PropDefinition>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorStats {
    pub components: usize,
    pub elements: usize,
    pub props: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratorResult {
    pub files: Vec<GeneratedComponent>,
    pub warnings: Vec<String>,
    pub stats: GeneratorStats,
}

/// Generates one source file per component.
pub struct CodeGenerator {
    options: GeneratorOptions,
    formatter: Box<dyn Formatter>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl CodeGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            formatter: Box::new(WhitespaceFormatter),
        }
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate every component of `split`, in component order.
    pub fn generate(
        &self,
        doc: &ParsedDocument,
        split: &SplitResult,
        css: &dyn CssConverter,
    ) -> Result<GeneratorResult> {
        let targets = RenderTargets::new(split);
        let mut result = GeneratorResult::default();
        for component in &split.components {
            let (file, warnings, elements) =
                self.generate_component(doc, split, &targets, component, css)?;
            result.stats.components += 1;
            result.stats.elements += elements;
            result.stats.props += file.props.len();
            result.stats.lines += file.source.lines().count();
            result.warnings.extend(warnings);
            result.files.push(file);
        }
        tracing::debug!(
            files = result.files.len(),
            lines = result.stats.lines,
            "generated components"
        );
        Ok(result)
    }

    /// Generate the source of a single component.
    pub fn generate_component(
        &self,
        doc: &ParsedDocument,
        split: &SplitResult,
        targets: &RenderTargets,
        component: &ComponentDefinition,
        css: &dyn CssConverter,
    ) -> Result<(GeneratedComponent, Vec<String>, usize)> {
        if doc.node(component.node).is_none() {
            return Err(Error::Codegen(format!(
                "component {} points at missing node {}",
                component.name, component.node
            )));
        }
        let options = &self.options;
        let output = JsxWriter::new(doc, split, component, css, options, targets).render(2);

        let mut props = component.props.clone();
        if options.capabilities.typed_props {
            props = merge_props(props, infer_props(&output.expressions));
        }
        if let Some(explicit) = options.explicit_props.get(&component.name) {
            props = merge_props(props, explicit.iter().cloned());
        }

        let indent = " ".repeat(options.indent);
        let mut source = String::new();

        let mut imports: Vec<String> = Vec::new();
        if options.import_react {
            imports.push("import React from 'react';".to_string());
        }
        for import in &options.custom_imports {
            let import = import.trim();
            if import.starts_with("import ") {
                imports.push(import.trim_end_matches(';').to_string() + ";");
            } else if !import.is_empty() {
                imports.push(format!("import '{import}';"));
            }
        }
        for child in &output.components {
            imports.push(format!("import {child} from './{child}';"));
        }
        if output.uses_styles
            && let Some(import) = css.component_import()
        {
            imports.push(import);
        }
        for import in &imports {
            let _ = writeln!(source, "{import}");
        }
        if !imports.is_empty() {
            source.push('\n');
        }

        let typed = options.typescript && options.capabilities.props_interface && !props.is_empty();
        if typed {
            let _ = writeln!(source, "{}\n", render_interface(&component.name, &props, &indent));
        }

        let _ = writeln!(
            source,
            "export default function {}{} {{",
            component.name,
            render_parameters(&component.name, &props, typed)
        );
        let _ = writeln!(source, "{indent}return (");
        source.push_str(&output.body);
        let _ = writeln!(source, "{indent});");
        source.push_str("}\n");

        let kind = options.file_kind();
        let source = format_or_identity(self.formatter.as_ref(), &source, kind);
        let file = GeneratedComponent {
            name: component.name.clone(),
            filename: format!("{}.{}", component.name, kind.extension()),
            source,
            kind,
            props,
        };
        Ok((file, output.warnings, output.elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{CssOptions, CssStrategy, converter};
    use crate::parser::{ParseOptions, parse};
    use crate::split::{ComponentSplitter, SplitOptions};

    fn generate_with(html: &str, options: GeneratorOptions, css: CssOptions) -> GeneratorResult {
        let doc = parse(html, &ParseOptions::default()).unwrap();
        let split = ComponentSplitter::new(SplitOptions::default()).split(&doc).unwrap();
        let css = converter(&doc, &css);
        CodeGenerator::new(options)
            .generate(&doc, &split, css.as_ref())
            .unwrap()
    }

    fn generate(html: &str) -> GeneratorResult {
        generate_with(html, GeneratorOptions::default(), CssOptions::default())
    }

    #[test]
    fn test_single_container() {
        let result = generate(r#"<div class="container"><p>Hello World</p></div>"#);
        assert_eq!(result.files.len(), 1);
        let app = &result.files[0];
        assert_eq!(app.filename, "App.jsx");
        assert_eq!(
            app.source,
            "import React from 'react';\n\nexport default function App() {\n  return (\n    <div className=\"container\">\n      <p>Hello World</p>\n    </div>\n  );\n}\n"
        );
        assert!(!app.source.contains(" class="));
    }

    #[test]
    fn test_void_and_boolean_attributes() {
        let result = generate(
            r#"<div><form><label for="q">Search</label><input id="q" type="text" disabled tabindex="2"><br></form></div>"#,
        );
        let source = &result.files.iter().find(|f| f.name == "Form").unwrap().source;
        assert!(source.contains("<label htmlFor=\"q\">Search</label>"));
        assert!(source.contains("<input id=\"q\" type=\"text\" disabled tabIndex=\"2\" />"));
        assert!(source.contains("<br />"));
    }

    #[test]
    fn test_events_and_styles() {
        let result = generate_with(
            r#"<button onclick="track(event)" style="padding: 8px; color: red">Go</button>"#,
            GeneratorOptions::default(),
            CssOptions::default().with_extract_inline_styles(false),
        );
        let source = &result.files[0].source;
        assert!(source.contains(
            "<button onClick={(event) => { track(event); }} style={{ padding: 8, color: \"red\" }}>Go</button>"
        ));
    }

    #[test]
    fn test_child_components_are_imported() {
        let result = generate("<header><h1>Site</h1></header><main><p>Body</p></main>");
        let app = &result.files[0];
        assert!(app.source.contains("import Header from './Header';"));
        assert!(app.source.contains("import MainContent from './MainContent';"));
        assert!(app.source.contains("    <>\n      <Header />\n      <MainContent />\n    </>\n"));
        assert_eq!(result.stats.components, 3);
    }

    #[test]
    fn test_pattern_template_and_instances() {
        let items: String = (1..=3)
            .map(|i| format!(r#"<li class="card"><h3>Item {i}</h3><span>{i}</span></li>"#))
            .collect();
        let result = generate_with(
            &format!("<ul>{items}</ul>"),
            GeneratorOptions::default().with_typescript(true),
            CssOptions::default(),
        );
        let app = result.files.iter().find(|f| f.name == "App").unwrap();
        assert!(app.source.contains("<Card title=\"Item 2\" label={2} />"));
        let card = result.files.iter().find(|f| f.name == "Card").unwrap();
        assert_eq!(card.filename, "Card.tsx");
        assert!(card.source.contains("interface CardProps {\n  title: string;\n  label: number;\n}"));
        assert!(card.source.contains("export default function Card({ title, label }: CardProps) {"));
        assert!(card.source.contains("<h3>{title}</h3>"));
        assert!(card.source.contains("<span>{label}</span>"));
    }

    #[test]
    fn test_divergent_member_keeps_its_content() {
        let result = generate(
            r#"<ul><li class="card"><h3>Alpha</h3></li><li class="card"><h3>Beta</h3><span class="badge">NEW-ONLY-HERE</span></li><li class="card"><h3>Gamma</h3></li><li class="card"><h3>Delta</h3></li></ul>"#,
        );
        let all: String = result.files.iter().map(|f| f.source.as_str()).collect();
        assert!(all.contains("NEW-ONLY-HERE"));
        assert!(all.contains("Beta"));
        let app = result.files.iter().find(|f| f.name == "App").unwrap();
        assert!(app.source.contains("<Card title=\"Gamma\" />"));
        assert!(!app.source.contains("<Card title=\"Beta\" />"));
    }

    #[test]
    fn test_presence_prop_renders_boolean_attribute() {
        let result = generate(
            r#"<ul><li class="choice"><input type="checkbox"><span>Email</span></li><li class="choice"><input type="checkbox" checked><span>Phone</span></li><li class="choice"><input type="checkbox"><span>Post</span></li></ul>"#,
        );
        let app = result.files.iter().find(|f| f.name == "App").unwrap();
        assert!(app.source.contains("<Choice label=\"Phone\" isChecked={true} />"));
        assert!(app.source.contains("<Choice label=\"Post\" isChecked={false} />"));
        let choice = result.files.iter().find(|f| f.name == "Choice").unwrap();
        assert!(choice.source.contains("<input type=\"checkbox\" checked={isChecked} />"));
    }

    #[test]
    fn test_typed_inference_and_explicit_override() {
        let explicit = {
            let mut p = PropDefinition::new("count", crate::split::PropType::String);
            p.default = Some("\"0\"".into());
            vec![p]
        };
        let result = generate_with(
            r#"<div><button onclick="{onSave}" disabled="{isBusy}" data-count="{count}">Save</button></div>"#,
            GeneratorOptions::default()
                .with_typescript(true)
                .with_explicit_props("App", explicit),
            CssOptions::default(),
        );
        let source = &result.files[0].source;
        assert!(source.contains("onSave?: (...args: any[]) => void;"));
        assert!(source.contains("isBusy?: boolean;"));
        assert!(source.contains("count?: string;"));
        assert!(source.contains("function App({ onSave, isBusy, count = \"0\" }: AppProps)"));
        assert!(source.contains("disabled={isBusy}"));
    }

    #[test]
    fn test_untyped_has_no_props_parameter() {
        let result = generate_with(
            "<p>x</p>",
            GeneratorOptions::default().with_typescript(true),
            CssOptions::default(),
        );
        assert!(result.files[0].source.contains("export default function App() {"));
        assert!(!result.files[0].source.contains("interface"));
    }

    #[test]
    fn test_css_modules_binding_and_import() {
        let result = generate_with(
            r#"<style>.card { padding: 0 }</style><div class="card"><p>x</p></div>"#,
            GeneratorOptions::default().with_import_react(false),
            CssOptions::new(CssStrategy::CssModules),
        );
        let source = &result.files[0].source;
        assert!(source.starts_with("import styles from '../styles.module.css';\n\n"));
        assert!(source.contains("<div className={styles.card}>"));
    }

    #[test]
    fn test_script_is_omitted_with_warning() {
        let result = generate("<div><script>alert(1)</script><p>x</p></div>");
        assert!(!result.files[0].source.contains("script"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let html = r#"<nav class="menu"><a href="/a" style="color: red">A</a></nav><section class="hero"><h1>Hi {there}</h1><button>Go</button></section>"#;
        let a = generate_with(html, GeneratorOptions::default(), CssOptions::new(CssStrategy::Tailwind));
        let b = generate_with(html, GeneratorOptions::default(), CssOptions::new(CssStrategy::Tailwind));
        let sources = |r: &GeneratorResult| r.files.iter().map(|f| f.source.clone()).collect::<Vec<_>>();
        assert_eq!(sources(&a), sources(&b));
        assert!(sources(&a).iter().any(|s| s.contains("Hi {\"{\"}there{\"}\"}")));
    }
}
