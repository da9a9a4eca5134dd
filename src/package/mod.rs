//! Project layout and ZIP packaging.
//!
//! Layout of the archive:
//!
//! ```text
//! package.json, vite.config.(js|ts), tsconfig.json (typed only)
//! index.html, README.md, .gitignore, jsxkit-manifest.json
//! src/main.(jsx|tsx)
//! src/components/<Component>.(jsx|tsx)
//! src/<stylesheet>            one consolidated stylesheet per strategy
//! public/assets/<category>/   deduplicated extracted assets
//! ```
//!
//! Archives are deterministic: entries are sorted by path and carry a fixed
//! timestamp, so identical inputs produce identical bytes.

pub mod scaffold;

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::assets::{AssetExtractionResult, rewrite_references};
use crate::codegen::{FileKind, GeneratedComponent};
use crate::css::{CssResult, CssStrategy};
use crate::error::Result;

pub const MANIFEST_PATH: &str = "jsxkit-manifest.json";
pub const COMPONENTS_DIR: &str = "src/components";

/// Configuration for packaging.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Human-readable project name; slugified for `package.json`.
    pub project_name: String,
    pub typescript: bool,
    pub css_strategy: CssStrategy,
    /// Component mounted by `src/main`.
    pub root_component: String,
    /// Emit the Vite project files around the components.
    pub scaffold: bool,
    /// Deflate level (0-9, default 6).
    pub compression_level: Option<i64>,
    /// Compute a `sha256-` digest of the archive.
    pub integrity: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            project_name: "jsxkit-app".to_string(),
            typescript: false,
            css_strategy: CssStrategy::default(),
            root_component: "App".to_string(),
            scaffold: true,
            compression_level: Some(6),
            integrity: false,
        }
    }
}

impl PackageOptions {
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self
    }

    pub fn with_css_strategy(mut self, strategy: CssStrategy) -> Self {
        self.css_strategy = strategy;
        self
    }

    pub fn with_root_component(mut self, name: impl Into<String>) -> Self {
        self.root_component = name.into();
        self
    }

    pub fn with_scaffold(mut self, scaffold: bool) -> Self {
        self.scaffold = scaffold;
        self
    }

    pub fn with_integrity(mut self, integrity: bool) -> Self {
        self.integrity = integrity;
        self
    }
}

/// One file of the generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub path: String,
    pub kind: FileKind,
    pub contents: Vec<u8>,
}

impl PackageFile {
    pub fn text(path: impl Into<String>, contents: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            kind: FileKind::from_path(&path),
            path,
            contents: contents.into().into_bytes(),
        }
    }

    pub fn binary(path: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Asset,
            contents,
        }
    }

    /// Contents as text, `None` for binary assets.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            FileKind::Asset => None,
            _ => std::str::from_utf8(&self.contents).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub kind: FileKind,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAsset {
    pub path: String,
    pub original_url: String,
    pub mime_type: String,
    pub size: usize,
    pub references: usize,
}

/// Description of a packaged project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    pub generator: String,
    pub typescript: bool,
    pub css_strategy: CssStrategy,
    pub root_component: String,
    pub components: Vec<String>,
    pub files: Vec<ManifestEntry>,
    pub assets: Vec<ManifestAsset>,
    pub total_size: usize,
    /// Digest of the archive bytes; not part of the archived manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

/// A laid-out and compressed project.
#[derive(Debug, Clone)]
pub struct Package {
    /// Sorted by path; includes the archived manifest.
    pub files: Vec<PackageFile>,
    pub archive: Vec<u8>,
    pub manifest: PackageManifest,
}

/// Lays out generated files and compresses them into one archive.
#[derive(Debug, Clone, Default)]
pub struct Packager {
    options: PackageOptions,
}

impl Packager {
    pub fn new(options: PackageOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PackageOptions {
        &self.options
    }

    /// Place every file at its project path.
    ///
    /// Extracted asset references in component and stylesheet sources are
    /// rewritten to the assets' public paths.
    pub fn layout(
        &self,
        components: &[GeneratedComponent],
        css: Option<&CssResult>,
        assets: Option<&AssetExtractionResult>,
    ) -> Vec<PackageFile> {
        let replacements = assets.map(|a| a.replacements()).unwrap_or_default();
        let mut files: BTreeMap<String, PackageFile> = BTreeMap::new();
        let mut add = |file: PackageFile| {
            if let Some(previous) = files.insert(file.path.clone(), file) {
                tracing::debug!(path = %previous.path, "package file replaced");
            }
        };

        for component in components {
            let source = rewrite_references(&component.source, component.kind, &replacements);
            add(PackageFile::text(
                format!("{COMPONENTS_DIR}/{}", component.filename),
                source,
            ));
        }

        if let Some(css) = css {
            for file in &css.files {
                let contents = rewrite_references(&file.contents, FileKind::Css, &replacements);
                add(PackageFile::text(file.path.clone(), contents));
            }
        }

        if let Some(assets) = assets {
            for asset in assets.extracted() {
                if let Some(data) = &asset.data {
                    add(PackageFile::binary(asset.output_path.clone(), data.clone()));
                }
            }
        }

        if self.options.scaffold {
            let typescript = self.options.typescript;
            let names: Vec<String> = components.iter().map(|c| c.name.clone()).collect();
            let asset_count = assets.map_or(0, |a| a.extracted().count());
            let ext = if typescript { "tsx" } else { "jsx" };
            let (vite_path, vite_source) = scaffold::vite_config(typescript);

            add(PackageFile::text("package.json", scaffold::package_json(&self.options)));
            add(PackageFile::text(vite_path, vite_source));
            if typescript {
                add(PackageFile::text("tsconfig.json", scaffold::tsconfig_json()));
            }
            add(PackageFile::text(
                "index.html",
                scaffold::index_html(&self.options.project_name, typescript),
            ));
            add(PackageFile::text(
                format!("src/main.{ext}"),
                scaffold::main_entry(
                    &self.options.root_component,
                    css.and_then(|c| c.entry_import.as_deref()),
                    typescript,
                ),
            ));
            add(PackageFile::text(
                "README.md",
                scaffold::readme(&self.options, &names, asset_count),
            ));
            add(PackageFile::text(".gitignore", scaffold::GITIGNORE));
        }

        files.into_values().collect()
    }

    /// Manifest describing `files` (which must not include the manifest).
    pub fn manifest(
        &self,
        files: &[PackageFile],
        components: &[GeneratedComponent],
        assets: Option<&AssetExtractionResult>,
    ) -> PackageManifest {
        let entries: Vec<ManifestEntry> = files
            .iter()
            .map(|f| ManifestEntry {
                path: f.path.clone(),
                kind: f.kind,
                size: f.contents.len(),
            })
            .collect();
        let asset_entries = assets
            .map(|a| {
                a.extracted()
                    .map(|asset| ManifestAsset {
                        path: asset.output_path.clone(),
                        original_url: asset.original_url.clone(),
                        mime_type: asset.mime_type.clone(),
                        size: asset.size,
                        references: asset.references.len(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        PackageManifest {
            name: scaffold::project_slug(&self.options.project_name),
            generator: concat!("jsxkit ", env!("CARGO_PKG_VERSION")).to_string(),
            typescript: self.options.typescript,
            css_strategy: self.options.css_strategy,
            root_component: self.options.root_component.clone(),
            components: components.iter().map(|c| c.name.clone()).collect(),
            total_size: entries.iter().map(|e| e.size).sum(),
            files: entries,
            assets: asset_entries,
            integrity: None,
        }
    }

    /// Compress files into a ZIP archive, in the order given.
    pub fn write_archive(&self, files: &[PackageFile]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let base = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);
        let deflated = base
            .compression_method(CompressionMethod::Deflated)
            .compression_level(self.options.compression_level);
        let stored = base.compression_method(CompressionMethod::Stored);

        for file in files {
            let options = if file.kind == FileKind::Asset && is_precompressed(&file.path) {
                stored
            } else {
                deflated
            };
            zip.start_file(file.path.as_str(), options)?;
            zip.write_all(&file.contents)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Lay out, describe and compress a whole project.
    pub fn package(
        &self,
        components: &[GeneratedComponent],
        css: Option<&CssResult>,
        assets: Option<&AssetExtractionResult>,
    ) -> Result<Package> {
        let mut files = self.layout(components, css, assets);
        let mut manifest = self.manifest(&files, components, assets);
        let manifest_json = serde_json::to_string_pretty(&manifest)?;
        files.push(PackageFile::text(MANIFEST_PATH, manifest_json + "\n"));
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let archive = self.write_archive(&files)?;
        if self.options.integrity {
            manifest.integrity = Some(integrity_digest(&archive));
        }
        tracing::debug!(
            files = files.len(),
            bytes = archive.len(),
            "package written"
        );
        Ok(Package {
            files,
            archive,
            manifest,
        })
    }
}

/// Subresource-integrity style digest: `sha256-<base64>`.
pub fn integrity_digest(bytes: &[u8]) -> String {
    format!("sha256-{}", STANDARD.encode(Sha256::digest(bytes)))
}

fn is_precompressed(path: &str) -> bool {
    let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    matches!(
        ext.as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "avif" | "woff" | "woff2" | "mp4" | "webm" | "mp3" | "ogg")
    )
}
