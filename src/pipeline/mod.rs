//! The conversion orchestrator.
//!
//! [`Converter::convert`] runs six timed stages:
//!
//! | Stage | Produces |
//! |---|---|
//! | `parse` | [`ParsedDocument`] |
//! | `split` | [`SplitResult`] |
//! | `generate` | one source file per component |
//! | `css` | the consolidated stylesheet |
//! | `assets` | deduplicated [`ExtractedAsset`](crate::assets::ExtractedAsset)s |
//! | `package` | the project archive and manifest |
//!
//! Every stage that runs is reported as `{name, status, duration, message}`.
//! A failing stage stops the run; cancellation is checked between stages.
//! Either way the caller gets a [`ConversionResult`] carrying whatever files
//! and stage reports exist. `convert` never returns an error and never
//! unwinds.

pub mod stage;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::assets::{AssetExtractionResult, AssetExtractor, AssetOptions, Fetcher};
use crate::codegen::{CodeGenerator, FileKind, Formatter, GeneratorOptions, GeneratorResult};
use crate::css::{self, CssOptions, CssResult, CssStrategy};
use crate::dom::ParsedDocument;
use crate::package::{COMPONENTS_DIR, Package, PackageFile, PackageManifest, PackageOptions, Packager};
use crate::parser::{self, ParseOptions};
use crate::settings::{SettingsStore, StoredSettings};
use crate::split::{ComponentSplitter, SplitOptions, SplitResult};
use crate::util::now_millis;

pub use stage::{Halt, StageLog, StageName, StageReport, StageStatus};

/// Cooperative cancellation flag shared between a caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call options. Unset fields fall back to stored settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    pub typescript: Option<bool>,
    pub component_name: Option<String>,
    pub css_strategy: Option<CssStrategy>,
    pub extract_styles: Option<bool>,
    pub class_name: Option<bool>,
    pub download_assets: Option<bool>,
    pub base_url: Option<String>,
    pub project_name: Option<String>,
    pub integrity: Option<bool>,
}

impl ConversionOptions {
    pub fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = Some(typescript);
        self
    }

    pub fn with_component_name(mut self, name: impl Into<String>) -> Self {
        self.component_name = Some(name.into());
        self
    }

    pub fn with_css_strategy(mut self, strategy: CssStrategy) -> Self {
        self.css_strategy = Some(strategy);
        self
    }

    pub fn with_extract_styles(mut self, extract: bool) -> Self {
        self.extract_styles = Some(extract);
        self
    }

    pub fn with_class_name(mut self, class_name: bool) -> Self {
        self.class_name = Some(class_name);
        self
    }

    pub fn with_download_assets(mut self, download: bool) -> Self {
        self.download_assets = Some(download);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn with_integrity(mut self, integrity: bool) -> Self {
        self.integrity = Some(integrity);
        self
    }

    /// Overlay these options on stored defaults.
    pub fn resolve(&self, stored: &StoredSettings) -> ResolvedOptions {
        ResolvedOptions {
            typescript: self.typescript.unwrap_or(stored.typescript),
            component_name: self
                .component_name
                .clone()
                .or_else(|| stored.component_name.clone()),
            css_strategy: self.css_strategy.unwrap_or(stored.css_strategy),
            extract_styles: self.extract_styles.unwrap_or(stored.extract_styles),
            class_name: self.class_name.unwrap_or(stored.class_name),
            download_assets: self.download_assets.unwrap_or(stored.download_assets),
            base_url: self.base_url.clone().or_else(|| stored.base_url.clone()),
            project_name: self
                .project_name
                .clone()
                .or_else(|| stored.project_name.clone()),
            integrity: self.integrity.unwrap_or(stored.integrity),
            indent: stored.indent,
        }
    }
}

/// Options after merging explicit values over stored settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub typescript: bool,
    pub component_name: Option<String>,
    pub css_strategy: CssStrategy,
    pub extract_styles: bool,
    pub class_name: bool,
    pub download_assets: bool,
    pub base_url: Option<String>,
    pub project_name: Option<String>,
    pub integrity: bool,
    pub indent: usize,
}

/// One input and its options.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// `None` is a contract violation reported as a failed `parse` stage.
    pub markup: Option<String>,
    pub options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: Some(markup.into()),
            options: ConversionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }
}

/// Tagged outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Completed,
    Failed { stage: StageName, message: String },
    Cancelled { before: StageName },
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Completed => "conversion completed".to_string(),
            Outcome::Failed { stage, message } => format!("{stage} stage failed: {message}"),
            Outcome::Cancelled { before } => format!("conversion cancelled before the {before} stage"),
        }
    }
}

/// A file of the output, as shown in a live preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub path: String,
    pub kind: FileKind,
    pub size: usize,
    /// Text contents; `None` for binary assets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl From<&PackageFile> for OutputFile {
    fn from(file: &PackageFile) -> Self {
        Self {
            path: file.path.clone(),
            kind: file.kind,
            size: file.contents.len(),
            contents: file.as_text().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    pub files: usize,
    pub components: usize,
    pub patterns: usize,
    pub assets: usize,
    pub warnings: usize,
    /// Milliseconds.
    pub elapsed: f64,
}

/// Everything a run produced, complete or not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub outcome: Outcome,
    /// Flat file list, sorted by path.
    pub files: Vec<OutputFile>,
    pub stages: Vec<StageReport>,
    pub stats: ConversionStats,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PackageManifest>,
    /// ZIP bytes when the `package` stage completed with output.
    #[serde(skip)]
    pub archive: Option<Vec<u8>>,
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Completed
    }

    pub fn file(&self, path: &str) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// State accumulated while stages run.
#[derive(Default)]
struct RunState {
    files: BTreeMap<String, OutputFile>,
    warnings: Vec<String>,
    components: usize,
    patterns: usize,
    assets: usize,
    manifest: Option<PackageManifest>,
    archive: Option<Vec<u8>>,
}

impl RunState {
    fn add_file(&mut self, file: OutputFile) {
        self.files.insert(file.path.clone(), file);
    }
}

/// Runs conversions. Holds collaborators only; no state is kept between
/// runs, so one converter can serve many independent conversions.
pub struct Converter {
    settings: Option<Box<dyn SettingsStore>>,
    fetcher: Option<Box<dyn Fetcher>>,
    formatter: Option<Arc<dyn Formatter>>,
    parse_options: ParseOptions,
    split_options: SplitOptions,
    asset_options: AssetOptions,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// A converter with default options. Remote downloads use HTTP when the
    /// `download` feature is enabled; otherwise remote assets are skipped.
    pub fn new() -> Self {
        Self {
            settings: None,
            fetcher: default_fetcher(),
            formatter: None,
            parse_options: ParseOptions::default(),
            split_options: SplitOptions::default(),
            asset_options: AssetOptions::default(),
        }
    }

    pub fn with_settings(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings = Some(Box::new(store));
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Never fetch remote assets.
    pub fn without_fetcher(mut self) -> Self {
        self.fetcher = None;
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    pub fn with_split_options(mut self, options: SplitOptions) -> Self {
        self.split_options = options;
        self
    }

    pub fn with_asset_options(mut self, options: AssetOptions) -> Self {
        self.asset_options = options;
        self
    }

    /// Convert `markup` with explicit options and no cancellation.
    pub fn convert_markup(&self, markup: &str, options: ConversionOptions) -> ConversionResult {
        let request = ConversionRequest::new(markup).with_options(options);
        self.convert(&request, &CancellationToken::new())
    }

    /// Run all six stages. Never fails; see [`ConversionResult::outcome`].
    pub fn convert(&self, request: &ConversionRequest, cancel: &CancellationToken) -> ConversionResult {
        let start = now_millis();
        let mut state = RunState::default();
        let options = self.resolve_options(&request.options, &mut state.warnings);
        let mut log = StageLog::new();

        let outcome = match self.run(request.markup.as_deref(), &options, cancel, &mut log, &mut state) {
            Ok(()) => Outcome::Completed,
            Err(Halt::Failed { stage, message }) => Outcome::Failed { stage, message },
            Err(Halt::Cancelled { before }) => {
                tracing::info!(stage = %before, "conversion cancelled");
                Outcome::Cancelled { before }
            }
        };

        let files: Vec<OutputFile> = state.files.into_values().collect();
        let stats = ConversionStats {
            files: files.len(),
            components: state.components,
            patterns: state.patterns,
            assets: state.assets,
            warnings: state.warnings.len(),
            elapsed: (now_millis() - start).max(0.0),
        };
        tracing::info!(
            files = stats.files,
            components = stats.components,
            elapsed_ms = stats.elapsed,
            "{}",
            outcome.message()
        );
        ConversionResult {
            outcome,
            files,
            stages: log.into_reports(),
            stats,
            warnings: state.warnings,
            manifest: state.manifest,
            archive: state.archive,
        }
    }

    fn resolve_options(&self, explicit: &ConversionOptions, warnings: &mut Vec<String>) -> ResolvedOptions {
        let stored = match &self.settings {
            Some(store) => store.load().unwrap_or_else(|err| {
                tracing::warn!(%err, "using built-in defaults");
                warnings.push(format!("settings could not be loaded: {err}"));
                StoredSettings::default()
            }),
            None => StoredSettings::default(),
        };
        explicit.resolve(&stored)
    }

    fn run(
        &self,
        markup: Option<&str>,
        options: &ResolvedOptions,
        cancel: &CancellationToken,
        log: &mut StageLog,
        state: &mut RunState,
    ) -> Result<(), Halt> {
        let check = |before: StageName| {
            if cancel.is_cancelled() {
                Err(Halt::Cancelled { before })
            } else {
                Ok(())
            }
        };

        check(StageName::Parse)?;
        let doc: ParsedDocument = log.run(
            StageName::Parse,
            || parser::parse_optional(markup, &self.parse_options),
            |doc| {
                format!(
                    "parsed {} elements, {} sections",
                    doc.metadata.element_count,
                    doc.sections.len()
                )
            },
        )?;
        state.warnings.extend(doc.warnings.iter().cloned());
        let empty = is_empty_document(&doc);
        if empty {
            state.warnings.push("input markup is empty; nothing to convert".to_string());
        }

        check(StageName::Split)?;
        let split_options = match &options.component_name {
            Some(name) => self.split_options.clone().with_root_name(name.clone()),
            None => self.split_options.clone(),
        };
        let split: SplitResult = log.run(
            StageName::Split,
            || ComponentSplitter::new(split_options).split(&doc),
            |split| {
                format!(
                    "{} components, {} patterns",
                    split.components.len(),
                    split.patterns.len()
                )
            },
        )?;
        state.warnings.extend(split.warnings.iter().cloned());
        state.patterns = split.patterns.len();

        let css_options = CssOptions::new(options.css_strategy)
            .with_extract_inline_styles(options.extract_styles);

        check(StageName::Generate)?;
        let generated: GeneratorResult = log.run(
            StageName::Generate,
            || {
                if empty {
                    return Ok(GeneratorResult::default());
                }
                let mut generator_options = GeneratorOptions::default()
                    .with_typescript(options.typescript)
                    .with_class_name(options.class_name);
                generator_options.indent = options.indent;
                let mut generator = CodeGenerator::new(generator_options);
                if let Some(formatter) = &self.formatter {
                    generator = generator.with_formatter(Box::new(Arc::clone(formatter)));
                }
                let converter = css::converter(&doc, &css_options);
                generator.generate(&doc, &split, converter.as_ref())
            },
            |result| format!("generated {} component files", result.files.len()),
        )?;
        state.warnings.extend(generated.warnings.iter().cloned());
        state.components = generated.files.len();
        for file in &generated.files {
            state.add_file(OutputFile {
                path: format!("{COMPONENTS_DIR}/{}", file.filename),
                kind: file.kind,
                size: file.source.len(),
                contents: Some(file.source.clone()),
            });
        }

        check(StageName::Css)?;
        let css_result: Option<CssResult> = log.run(
            StageName::Css,
            || Ok((!empty).then(|| css::converter(&doc, &css_options).convert())),
            |css| match css {
                Some(css) => format!("{} stylesheet ({} bytes)", css.strategy, css.css.len()),
                None => "no styles".to_string(),
            },
        )?;
        if let Some(css) = &css_result {
            state.warnings.extend(css.warnings.iter().cloned());
            for file in &css.files {
                state.add_file(OutputFile {
                    path: file.path.clone(),
                    kind: FileKind::from_path(&file.path),
                    size: file.contents.len(),
                    contents: Some(file.contents.clone()),
                });
            }
        }

        check(StageName::Assets)?;
        let assets: AssetExtractionResult = log.run(
            StageName::Assets,
            || Ok(self.extract_assets(markup.unwrap_or_default(), options)),
            |assets| {
                format!(
                    "{} assets, {} extracted, {} failed",
                    assets.stats.total, assets.stats.extracted, assets.stats.failed
                )
            },
        )?;
        state.warnings.extend(assets.warnings.iter().cloned());
        state.assets = assets.stats.extracted;

        check(StageName::Package)?;
        let package: Option<Package> = log.run(
            StageName::Package,
            || {
                if empty {
                    return Ok(None);
                }
                let package_options = PackageOptions {
                    project_name: options
                        .project_name
                        .clone()
                        .or_else(|| doc.metadata.title.clone())
                        .unwrap_or_else(|| "jsxkit-app".to_string()),
                    typescript: options.typescript,
                    css_strategy: options.css_strategy,
                    root_component: split.root().name.clone(),
                    integrity: options.integrity,
                    ..PackageOptions::default()
                };
                Packager::new(package_options)
                    .package(&generated.files, css_result.as_ref(), Some(&assets))
                    .map(Some)
            },
            |package| match package {
                Some(package) => format!(
                    "{} files, {} byte archive",
                    package.files.len(),
                    package.archive.len()
                ),
                None => "nothing to package".to_string(),
            },
        )?;

        if let Some(package) = package {
            state.files.clear();
            for file in &package.files {
                state.add_file(OutputFile::from(file));
            }
            state.manifest = Some(package.manifest);
            state.archive = Some(package.archive);
        }
        Ok(())
    }

    fn extract_assets(&self, markup: &str, options: &ResolvedOptions) -> AssetExtractionResult {
        let mut asset_options = self.asset_options.clone();
        if let Some(base) = &options.base_url {
            asset_options.base_url = Some(base.clone());
        }
        asset_options.download = options.download_assets && self.fetcher.is_some();
        let extractor = AssetExtractor::new(asset_options);
        match &self.fetcher {
            Some(fetcher) => extractor.extract_with_download(markup, fetcher.as_ref()),
            None => extractor.extract_with_download(markup, &crate::assets::NoFetcher),
        }
    }
}

fn is_empty_document(doc: &ParsedDocument) -> bool {
    doc.metadata.element_count == 0
        && doc
            .nodes()
            .iter()
            .all(|n| n.text.as_deref().is_none_or(|t| t.trim().is_empty()))
}

#[cfg(all(feature = "download", not(target_arch = "wasm32")))]
fn default_fetcher() -> Option<Box<dyn Fetcher>> {
    match crate::assets::HttpFetcher::new() {
        Ok(fetcher) => Some(Box::new(fetcher)),
        Err(err) => {
            tracing::warn!(%err, "HTTP client unavailable, remote assets will be skipped");
            None
        }
    }
}

#[cfg(not(all(feature = "download", not(target_arch = "wasm32"))))]
fn default_fetcher() -> Option<Box<dyn Fetcher>> {
    None
}

/// Convert with a fresh default [`Converter`].
pub fn convert(markup: &str, options: ConversionOptions) -> ConversionResult {
    Converter::new().convert_markup(markup, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{FetchError, Fetched};
    use crate::settings::MemorySettings;

    struct Offline;

    impl Fetcher for Offline {
        fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
            Err(FetchError::Request(format!("offline: {url}")))
        }
    }

    fn converter() -> Converter {
        Converter::new().with_fetcher(Offline)
    }

    #[test]
    fn test_container_converts_to_one_component() {
        let result = converter().convert_markup(
            r#"<div class="container"><p>Hello World</p></div>"#,
            ConversionOptions::default(),
        );
        assert!(result.is_success(), "{:?}", result.outcome);
        assert_eq!(result.stats.components, 1);
        let app = result.file("src/components/App.jsx").unwrap();
        let source = app.contents.as_deref().unwrap();
        assert!(source.contains(r#"className="container""#));
        assert!(!source.contains(" class="));
        assert_eq!(result.stages.len(), 6);
        assert!(result.stages.iter().all(|s| s.status == StageStatus::Complete));
        let names: Vec<StageName> = result.stages.iter().map(|s| s.name).collect();
        assert_eq!(names, StageName::ALL);
        assert!(result.archive.is_some());
    }

    #[test]
    fn test_missing_markup_fails_parse_stage() {
        let request = ConversionRequest::default();
        let result = converter().convert(&request, &CancellationToken::new());
        match &result.outcome {
            Outcome::Failed { stage, message } => {
                assert_eq!(*stage, StageName::Parse);
                assert_eq!(message, "no markup was supplied");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(result.stages.len(), 1);
        assert_eq!(result.stages[0].status, StageStatus::Error);
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_empty_markup_is_a_valid_empty_run() {
        let result = converter().convert_markup("", ConversionOptions::default());
        assert!(result.is_success());
        assert!(result.files.is_empty());
        assert!(result.archive.is_none());
        assert_eq!(result.stages.len(), 6);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = converter().convert(&ConversionRequest::new("<p>hi</p>"), &cancel);
        assert_eq!(
            result.outcome,
            Outcome::Cancelled {
                before: StageName::Parse
            }
        );
        assert!(result.stages.is_empty());
    }

    #[test]
    fn test_explicit_options_override_settings() {
        let stored = StoredSettings {
            typescript: true,
            css_strategy: CssStrategy::Tailwind,
            component_name: Some("Stored".into()),
            ..StoredSettings::default()
        };
        let converter = converter().with_settings(MemorySettings::new(stored));
        let result = converter.convert_markup(
            "<section><h2>Plans</h2></section>",
            ConversionOptions::default().with_component_name("Pricing"),
        );
        assert!(result.is_success());
        assert!(result.file("src/components/Pricing.tsx").is_some());
        assert!(result.file("src/styles/tailwind.css").is_some());
        assert!(result.file("tsconfig.json").is_some());
    }

    #[test]
    fn test_failed_download_is_a_warning() {
        let result = converter().convert_markup(
            r#"<img src="https://cdn.test/a.png" alt="A">"#,
            ConversionOptions::default(),
        );
        assert!(result.is_success());
        assert_eq!(result.stats.assets, 0);
        assert!(result.warnings.iter().any(|w| w.contains("cdn.test/a.png")));
    }

    #[test]
    fn test_result_serializes_for_preview() {
        let result = converter().convert_markup("<p>Hi</p>", ConversionOptions::default());
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["outcome"]["status"], "completed");
        assert_eq!(json["stages"][0]["name"], "parse");
        assert_eq!(json["stages"][0]["status"], "complete");
        assert!(json["files"].as_array().unwrap().len() > 1);
        assert!(json.get("archive").is_none());
    }

    #[test]
    fn test_options_resolve() {
        let stored = StoredSettings::default();
        let resolved = ConversionOptions::default()
            .with_typescript(true)
            .with_extract_styles(false)
            .resolve(&stored);
        assert!(resolved.typescript);
        assert!(!resolved.extract_styles);
        assert!(resolved.class_name);
        assert_eq!(resolved.css_strategy, CssStrategy::Vanilla);
    }
}
