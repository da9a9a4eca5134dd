//! # jsxkit
//!
//! Turns a static HTML mockup into a React project.
//!
//! ## Features
//!
//! - Spec-compliant HTML parsing with a normalized, typed tree
//! - Component boundary detection, including repeating patterns
//! - JSX or TSX output with inferred props
//! - Tailwind, CSS Modules or plain stylesheet output
//! - Deduplicated asset extraction with reference rewriting
//! - A deterministic, ready-to-run Vite project as a ZIP archive
//!
//! ## Quick Start
//!
//! ```no_run
//! use jsxkit::{ConversionOptions, Converter};
//!
//! let markup = r#"<div class="container"><p>Hello World</p></div>"#;
//! let result = Converter::new().convert_markup(markup, ConversionOptions::default());
//!
//! assert!(result.is_success());
//! std::fs::write("app.zip", result.archive.unwrap()).unwrap();
//! ```
//!
//! ## Working with Stages
//!
//! Each stage is usable on its own:
//!
//! ```
//! use jsxkit::css::{self, CssOptions};
//! use jsxkit::{ComponentSplitter, ParseOptions, SplitOptions, parse};
//!
//! let doc = parse("<header><h1>Acme</h1></header>", &ParseOptions::default()).unwrap();
//! let split = ComponentSplitter::new(SplitOptions::default()).split(&doc).unwrap();
//! assert_eq!(split.root().name, "App");
//!
//! let styles = css::convert("<p style=\"color: red\">Hi</p>", &CssOptions::default()).unwrap();
//! assert!(styles.css.contains("color: red"));
//! ```

pub mod assets;
pub mod codegen;
pub mod css;
pub mod dom;
pub mod error;
pub mod package;
pub mod parser;
pub mod pipeline;
pub mod settings;
pub mod split;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use assets::{AssetExtractionResult, AssetExtractor, AssetOptions, ExtractedAsset, Fetcher};
pub use codegen::{CodeGenerator, FileKind, GeneratedComponent, GeneratorOptions, GeneratorResult};
pub use css::{CssConverter, CssOptions, CssResult, CssStrategy};
pub use dom::{NodeId, ParsedDocument, ParsedNode};
pub use error::{Error, Result};
pub use package::{Package, PackageManifest, PackageOptions, Packager};
pub use parser::{ParseOptions, parse};
pub use pipeline::{
    CancellationToken, ConversionOptions, ConversionRequest, ConversionResult, Converter, Outcome,
    StageName, StageReport, StageStatus, convert,
};
pub use settings::{JsonFileSettings, MemorySettings, SettingsStore, StoredSettings};
pub use split::{ComponentSplitter, SplitOptions, SplitResult};
