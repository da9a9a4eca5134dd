//! Asset discovery, classification and materialization.
//!
//! The extractor walks the raw [`ArenaDom`] (head included) and collects
//! every reference a generated project needs to carry along:
//!
//! | Where | What |
//! |---|---|
//! | `<img>`, `<source>` | `src`, `srcset` |
//! | `<video>`, `<audio>`, `<track>` | `src`, `poster` |
//! | `<link>` | `href` of stylesheet, icon, preload and manifest links |
//! | `<script>` | `src` |
//! | SVG `<image>`, `<use>` | `href`, `xlink:href` |
//! | any `style` attribute, `<style>` body | `url(...)` tokens |
//!
//! Identity is the content hash for `data:` URLs and the resolved URL for
//! everything else. References with the same identity collapse into one
//! [`ExtractedAsset`] that keeps every reference.

pub mod fetch;
pub mod mime;
pub mod rewrite;

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::css::stylesheet::url_tokens;
use crate::dom::arena::{ArenaDom, ArenaNodeId};

pub use fetch::{FetchError, Fetched, Fetcher, LocalFetcher, NoFetcher};
#[cfg(all(feature = "download", not(target_arch = "wasm32")))]
pub use fetch::HttpFetcher;
pub use mime::AssetCategory;
pub use rewrite::{rewrite_html, rewrite_references};

/// Where an asset's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSource {
    /// Inline `data:` URL, base64 or percent-encoded.
    Base64,
    Remote,
    Local,
}

/// Where in the markup a reference sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceContext {
    Attribute,
    Srcset,
    InlineStyle,
    StyleElement,
}

/// One occurrence of an asset URL in the markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReference {
    pub tag: String,
    /// Attribute holding the URL; `None` inside a `<style>` body.
    pub attribute: Option<String>,
    pub context: ReferenceContext,
    /// The URL exactly as written.
    pub original: String,
    #[serde(skip)]
    pub(crate) node: ArenaNodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Pending,
    Extracted,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedAsset {
    pub identity: String,
    pub source: AssetSource,
    pub category: AssetCategory,
    /// File extension without the dot (`png`), empty when unknown.
    pub format: String,
    pub original_url: String,
    pub resolved_url: String,
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
    pub mime_type: String,
    pub size: usize,
    pub references: Vec<AssetReference>,
    pub filename: String,
    /// Path inside the packaged project (`public/assets/images/logo.png`).
    pub output_path: String,
    /// URL the generated project serves it from (`/assets/images/logo.png`).
    pub public_path: String,
    pub status: ExtractionStatus,
    pub error: Option<String>,
}

impl ExtractedAsset {
    pub fn is_extracted(&self) -> bool {
        self.status == ExtractionStatus::Extracted && self.data.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct AssetOptions {
    /// Base for relative and protocol-relative references.
    pub base_url: Option<String>,
    /// Fetch remote assets in [`AssetExtractor::extract_with_download`].
    pub download: bool,
    /// Directory local references are read from.
    pub local_root: Option<PathBuf>,
    /// Payloads larger than this fail instead of being packaged.
    pub max_size: Option<usize>,
    /// Package directory assets are written under.
    pub output_dir: String,
    /// URL prefix the output directory is served at.
    pub public_prefix: String,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            download: true,
            local_root: None,
            max_size: Some(10 * 1024 * 1024),
            output_dir: "public/assets".to_string(),
            public_prefix: "/assets".to_string(),
        }
    }
}

impl AssetOptions {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    pub fn with_local_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_root = Some(root.into());
        self
    }

    pub fn with_max_size(mut self, max_size: Option<usize>) -> Self {
        self.max_size = max_size;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetStats {
    pub total: usize,
    pub extracted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
    pub references: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetExtractionResult {
    /// In order of first discovery.
    pub assets: Vec<ExtractedAsset>,
    pub warnings: Vec<String>,
    pub stats: AssetStats,
}

impl AssetExtractionResult {
    pub fn extracted(&self) -> impl Iterator<Item = &ExtractedAsset> {
        self.assets.iter().filter(|a| a.is_extracted())
    }

    pub fn by_identity(&self, identity: &str) -> Option<&ExtractedAsset> {
        self.assets.iter().find(|a| a.identity == identity)
    }

    /// Original reference text → public path, for every extracted asset.
    pub fn replacements(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for asset in self.extracted() {
            for reference in &asset.references {
                map.insert(reference.original.clone(), asset.public_path.clone());
            }
        }
        map
    }

    fn recount(&mut self) {
        let mut stats = AssetStats {
            total: self.assets.len(),
            ..AssetStats::default()
        };
        for asset in &self.assets {
            stats.references += asset.references.len();
            match asset.status {
                ExtractionStatus::Extracted => {
                    stats.extracted += 1;
                    stats.bytes += asset.size;
                }
                ExtractionStatus::Failed => stats.failed += 1,
                ExtractionStatus::Skipped => stats.skipped += 1,
                ExtractionStatus::Pending => stats.pending += 1,
            }
        }
        self.stats = stats;
    }
}

/// Scans markup for assets and optionally materializes them.
#[derive(Debug, Clone, Default)]
pub struct AssetExtractor {
    options: AssetOptions,
}

impl AssetExtractor {
    pub fn new(options: AssetOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssetOptions {
        &self.options
    }

    /// Pure scan: inline `data:` payloads are decoded, everything else stays
    /// [`ExtractionStatus::Pending`].
    pub fn extract_from_html(&self, markup: &str) -> AssetExtractionResult {
        let dom = ArenaDom::parse(markup);
        self.extract_from_dom(&dom)
    }

    pub fn extract_from_dom(&self, dom: &ArenaDom) -> AssetExtractionResult {
        let mut result = self.collect(dom);
        self.assign_paths(&mut result.assets);
        result.recount();
        result
    }

    /// Scan, then fetch every pending asset once through `fetcher`.
    ///
    /// Local references go through a [`LocalFetcher`] when a local root is
    /// configured and are skipped otherwise. A failed fetch marks only that
    /// asset as failed and adds one warning.
    pub fn extract_with_download(&self, markup: &str, fetcher: &dyn Fetcher) -> AssetExtractionResult {
        let dom = ArenaDom::parse(markup);
        self.extract_from_dom_with_download(&dom, fetcher)
    }

    pub fn extract_from_dom_with_download(
        &self,
        dom: &ArenaDom,
        fetcher: &dyn Fetcher,
    ) -> AssetExtractionResult {
        let mut result = self.collect(dom);
        let router = fetch::RoutingFetcher {
            remote: fetcher,
            local: self.options.local_root.clone().map(LocalFetcher::new),
        };

        for asset in &mut result.assets {
            if asset.status != ExtractionStatus::Pending {
                continue;
            }
            let wanted = match asset.source {
                AssetSource::Remote => self.options.download,
                AssetSource::Local => router.local.is_some(),
                AssetSource::Base64 => false,
            };
            if !wanted {
                asset.status = ExtractionStatus::Skipped;
                continue;
            }
            match router.fetch(&asset.resolved_url) {
                Ok(fetched) => self.accept(asset, fetched.data, fetched.mime_type),
                Err(err) => {
                    tracing::warn!(url = %asset.resolved_url, %err, "asset download failed");
                    asset.status = ExtractionStatus::Failed;
                    asset.error = Some(err.to_string());
                }
            }
            if asset.status == ExtractionStatus::Failed {
                result.warnings.push(format!(
                    "failed to extract {}: {}",
                    asset.original_url,
                    asset.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        self.assign_paths(&mut result.assets);
        result.recount();
        result
    }

    fn collect(&self, dom: &ArenaDom) -> AssetExtractionResult {
        let mut result = AssetExtractionResult::default();
        let mut index: BTreeMap<String, usize> = BTreeMap::new();

        for (reference, hint) in scan(dom) {
            let Some(mut asset) = self.classify(&reference.original, hint) else {
                continue;
            };
            match index.get(&asset.identity) {
                Some(&i) => result.assets[i].references.push(reference),
                None => {
                    if asset.status == ExtractionStatus::Failed {
                        result.warnings.push(format!(
                            "failed to extract {}: {}",
                            truncate(&asset.original_url, 64),
                            asset.error.as_deref().unwrap_or("unknown error")
                        ));
                    }
                    index.insert(asset.identity.clone(), result.assets.len());
                    asset.references.push(reference);
                    result.assets.push(asset);
                }
            }
        }
        tracing::debug!(assets = result.assets.len(), "asset scan finished");
        result
    }

    /// Build the asset record for one URL; `None` for references that are
    /// not assets (fragments, `javascript:`, template expressions).
    fn classify(&self, url: &str, hint: Option<AssetCategory>) -> Option<ExtractedAsset> {
        let url = url.trim();
        if !is_asset_url(url) {
            return None;
        }

        let mut asset = ExtractedAsset {
            identity: String::new(),
            source: AssetSource::Local,
            category: AssetCategory::Other,
            format: String::new(),
            original_url: url.to_string(),
            resolved_url: url.to_string(),
            data: None,
            mime_type: mime::OCTET_STREAM.to_string(),
            size: 0,
            references: Vec::new(),
            filename: String::new(),
            output_path: String::new(),
            public_path: String::new(),
            status: ExtractionStatus::Pending,
            error: None,
        };

        if url.starts_with("data:") {
            asset.source = AssetSource::Base64;
            match parse_data_url(url) {
                Some((mime_type, data)) => {
                    asset.identity = format!("sha256:{}", sha256_hex(&data));
                    asset.mime_type = mime_type;
                    self.accept(&mut asset, data, None);
                }
                None => {
                    asset.identity = format!("sha256:{}", sha256_hex(url.as_bytes()));
                    asset.status = ExtractionStatus::Failed;
                    asset.error = Some("malformed data URL".to_string());
                }
            }
        } else {
            let resolved = match &self.options.base_url {
                Some(base) => resolve_url(base, url),
                None if url.starts_with("//") => format!("https:{url}"),
                None => url.to_string(),
            };
            asset.source = if is_remote(&resolved) {
                AssetSource::Remote
            } else {
                AssetSource::Local
            };
            asset.identity = strip_fragment(&resolved).to_string();
            asset.mime_type = mime::guess_mime(&resolved).to_string();
            asset.resolved_url = resolved;
        }

        asset.category = categorize(&asset.mime_type, hint);
        asset.format = format_for(&asset.resolved_url, &asset.mime_type);
        Some(asset)
    }

    /// Store a payload on an asset, enforcing the size limit.
    fn accept(&self, asset: &mut ExtractedAsset, data: Vec<u8>, reported_mime: Option<String>) {
        if let Some(limit) = self.options.max_size
            && data.len() > limit
        {
            asset.status = ExtractionStatus::Failed;
            asset.error = Some(format!("{} bytes exceeds the {limit} byte limit", data.len()));
            return;
        }
        if asset.mime_type == mime::OCTET_STREAM {
            let reported = reported_mime
                .as_deref()
                .map(|m| m.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
                .filter(|m| !m.is_empty() && m != mime::OCTET_STREAM);
            if let Some(found) = reported.or_else(|| mime::sniff_mime(&data).map(str::to_string)) {
                asset.mime_type = found;
                asset.category = categorize(&asset.mime_type, Some(asset.category));
                asset.format = format_for(&asset.resolved_url, &asset.mime_type);
            }
        }
        asset.size = data.len();
        asset.data = Some(data);
        asset.status = ExtractionStatus::Extracted;
    }

    /// Assign filenames and paths in discovery order.
    fn assign_paths(&self, assets: &mut [ExtractedAsset]) {
        let mut taken: BTreeSet<String> = BTreeSet::new();
        for asset in assets.iter_mut() {
            let base = match asset.source {
                AssetSource::Base64 => {
                    let hash = asset.identity.trim_start_matches("sha256:");
                    let stem = format!("{}-{}", category_stem(asset.category), &hash[..hash.len().min(8)]);
                    with_extension(&stem, &asset.format)
                }
                _ => filename_from_url(&asset.resolved_url, &asset.format),
            };
            let dir = asset.category.directory();
            let filename = unique_filename(&base, |candidate| {
                taken.contains(&format!("{dir}/{candidate}"))
            });
            taken.insert(format!("{dir}/{filename}"));
            asset.output_path = format!("{}/{dir}/{filename}", self.options.output_dir);
            asset.public_path = format!("{}/{dir}/{filename}", self.options.public_prefix);
            asset.filename = filename;
        }
    }
}

/// Pure scan with the given options.
pub fn extract_from_html(markup: &str, options: &AssetOptions) -> AssetExtractionResult {
    AssetExtractor::new(options.clone()).extract_from_html(markup)
}

/// Scan and fetch with the given options.
pub fn extract_with_download(
    markup: &str,
    options: &AssetOptions,
    fetcher: &dyn Fetcher,
) -> AssetExtractionResult {
    AssetExtractor::new(options.clone()).extract_with_download(markup, fetcher)
}

// ============================================================================
// Scanning
// ============================================================================

/// `rel` values whose `href` is a packaged asset.
const ASSET_LINK_RELS: &[&str] = &[
    "stylesheet",
    "icon",
    "shortcut",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "mask-icon",
    "manifest",
    "preload",
    "prefetch",
    "modulepreload",
];

/// Every candidate reference in document order, with a category hint.
fn scan(dom: &ArenaDom) -> Vec<(AssetReference, Option<AssetCategory>)> {
    let mut out = Vec::new();
    for id in dom.descendants(dom.document()) {
        let Some(tag) = dom.element_name(id).map(|n| n.to_string()) else {
            continue;
        };
        let reference = |attribute: Option<&str>, context, original: &str| AssetReference {
            tag: tag.clone(),
            attribute: attribute.map(str::to_string),
            context,
            original: original.trim().to_string(),
            node: id,
        };

        let mut attribute_refs: Vec<(&str, Option<AssetCategory>)> = Vec::new();
        match tag.as_str() {
            "img" | "source" | "input" => attribute_refs.push(("src", None)),
            "video" | "audio" | "track" | "embed" => {
                attribute_refs.push(("src", None));
                attribute_refs.push(("poster", Some(AssetCategory::Image)));
            }
            "script" => attribute_refs.push(("src", Some(AssetCategory::Script))),
            "link" => {
                if let Some(hint) = link_hint(dom, id) {
                    attribute_refs.push(("href", hint));
                }
            }
            "image" | "use" | "feImage" => {
                attribute_refs.push(("href", Some(AssetCategory::Image)));
                attribute_refs.push(("xlink:href", Some(AssetCategory::Image)));
            }
            "style" => {
                let css: String = dom.collect_text(id);
                for token in url_tokens(&css) {
                    out.push((reference(None, ReferenceContext::StyleElement, &token.url), None));
                }
            }
            _ => {}
        }
        if tag == "input" && dom.get_attr(id, "type") != Some("image") {
            attribute_refs.clear();
        }

        for (name, hint) in attribute_refs {
            if let Some(value) = dom.get_attr(id, name) {
                out.push((reference(Some(name), ReferenceContext::Attribute, value), hint));
            }
        }
        if matches!(tag.as_str(), "img" | "source")
            && let Some(srcset) = dom.get_attr(id, "srcset")
        {
            for range in srcset_urls(srcset) {
                out.push((
                    reference(Some("srcset"), ReferenceContext::Srcset, &srcset[range]),
                    Some(AssetCategory::Image),
                ));
            }
        }
        if let Some(style) = dom.get_attr(id, "style") {
            for token in url_tokens(style) {
                out.push((
                    reference(Some("style"), ReferenceContext::InlineStyle, &token.url),
                    None,
                ));
            }
        }
    }
    out
}

/// Category hint for a `<link>`, or `None` if its href is not an asset.
fn link_hint(dom: &ArenaDom, id: ArenaNodeId) -> Option<Option<AssetCategory>> {
    let rel = dom.get_attr(id, "rel").unwrap_or_default().to_ascii_lowercase();
    let rels: Vec<&str> = rel.split_ascii_whitespace().collect();
    if rels.contains(&"stylesheet") {
        return Some(Some(AssetCategory::Stylesheet));
    }
    if rels.iter().any(|r| r.contains("icon")) {
        return Some(Some(AssetCategory::Icon));
    }
    let has_as = dom.get_attr(id, "as").is_some();
    (has_as || rels.iter().any(|r| ASSET_LINK_RELS.contains(r))).then_some(None)
}

/// Byte ranges of the URLs in a `srcset` value.
pub fn srcset_urls(srcset: &str) -> Vec<Range<usize>> {
    let bytes = srcset.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
            pos += 1;
        }
        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let mut end = pos;
        // A trailing comma without a descriptor belongs to the separator.
        while end > start && bytes[end - 1] == b',' {
            end -= 1;
        }
        if end > start {
            out.push(start..end);
        }
        // Skip the descriptor up to the next candidate.
        while pos < bytes.len() && bytes[pos] != b',' {
            pos += 1;
        }
    }
    out
}

// ============================================================================
// URL helpers
// ============================================================================

pub(crate) fn is_remote(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_asset_url(url: &str) -> bool {
    if url.is_empty() || url.starts_with('#') || url.contains('{') {
        return false;
    }
    let lower = url.get(..11).unwrap_or(url).to_ascii_lowercase();
    !["javascript:", "mailto:", "tel:", "about:", "blob:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

/// Resolve `reference` against `base` (`https://site.test/blog/`).
pub fn resolve_url(base: &str, reference: &str) -> String {
    if reference.starts_with("data:") || is_remote(reference) {
        return reference.to_string();
    }
    let (scheme, rest) = base.split_once("://").unwrap_or(("https", base));
    if let Some(host_relative) = reference.strip_prefix("//") {
        return format!("{scheme}://{host_relative}");
    }
    let (host, base_path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let origin = if base.contains("://") {
        format!("{scheme}://{host}")
    } else {
        host.to_string()
    };

    let path = if reference.starts_with('/') {
        reference.to_string()
    } else {
        let base_path = base_path.split(['?', '#']).next().unwrap_or(base_path);
        let dir = &base_path[..base_path.rfind('/').map_or(0, |i| i + 1)];
        format!("{dir}{reference}")
    };
    format!("{origin}{}", normalize_path(&path))
}

/// Collapse `.` and `..` segments of an absolute path, keeping the query.
fn normalize_path(path: &str) -> String {
    let (path, suffix) = match path.find(['?', '#']) {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    };
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/').skip(1) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    if path.ends_with("/.") || path.ends_with("/..") {
        segments.push("");
    }
    format!("/{}{suffix}", segments.join("/"))
}

/// Decode a `data:` URL into `(mime, bytes)`.
pub fn parse_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mut params = header.split(';');
    let mime_type = params
        .next()
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "text/plain".to_string());
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let compact = percent_decode_str(&compact).decode_utf8_lossy().into_owned();
        STANDARD.decode(compact.as_bytes()).ok()?
    } else {
        percent_decode_str(payload).collect()
    };
    Some((mime_type, data))
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{b:02x}")).collect()
}

fn categorize(mime_type: &str, hint: Option<AssetCategory>) -> AssetCategory {
    let from_mime = AssetCategory::from_mime(mime_type);
    match (from_mime, hint) {
        (AssetCategory::Image | AssetCategory::Icon, Some(AssetCategory::Icon)) => AssetCategory::Icon,
        (found, _) => found,
    }
}

fn format_for(url: &str, mime_type: &str) -> String {
    if !url.starts_with("data:")
        && let Some(ext) = mime::url_extension(url)
    {
        return ext.to_ascii_lowercase();
    }
    mime::extension_for_mime(mime_type)
        .unwrap_or_default()
        .to_string()
}

fn category_stem(category: AssetCategory) -> &'static str {
    match category {
        AssetCategory::Image => "image",
        AssetCategory::Font => "font",
        AssetCategory::Stylesheet => "style",
        AssetCategory::Script => "script",
        AssetCategory::Video => "video",
        AssetCategory::Audio => "audio",
        AssetCategory::Icon => "icon",
        AssetCategory::Other => "asset",
    }
}

/// Sanitized, lower-cased final path segment of a URL.
pub fn filename_from_url(url: &str, format: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or_default();
    let decoded = percent_decode_str(segment).decode_utf8_lossy().to_ascii_lowercase();
    let sanitized = sanitize_filename(&decoded);

    let (stem, ext) = match sanitized.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem.to_string(), ext.to_string()),
        _ => (sanitized.clone(), String::new()),
    };
    let stem = if stem.is_empty() { "asset".to_string() } else { stem };
    if ext.is_empty() {
        with_extension(&stem, format)
    } else {
        format!("{stem}.{ext}")
    }
}

fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches(['-', '.']).to_string()
}

fn with_extension(stem: &str, ext: &str) -> String {
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{ext}")
    }
}

/// First of `name`, `stem-2.ext`, `stem-3.ext`, ... not rejected by `taken`.
pub fn unique_filename(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    (2..)
        .map(|n| match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        })
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((i, _)) => format!("{}...", &text[..i]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    /// Serves fixed bytes and fails for URLs containing "broken".
    struct MockFetcher {
        calls: RefCell<Vec<String>>,
    }

    impl MockFetcher {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            if url.contains("broken") {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(Fetched::new(url.as_bytes().to_vec()))
        }
    }

    #[test]
    fn test_identical_data_urls_collapse() {
        let html = format!(r#"<img src="{PIXEL}"><div><img src="{PIXEL}" alt="again"></div>"#);
        let result = AssetExtractor::default().extract_from_html(&html);
        assert_eq!(result.assets.len(), 1);
        let asset = &result.assets[0];
        assert_eq!(asset.references.len(), 2);
        assert_eq!(asset.source, AssetSource::Base64);
        assert_eq!(asset.status, ExtractionStatus::Extracted);
        assert_eq!(asset.mime_type, "image/png");
        assert!(asset.identity.starts_with("sha256:"));
        assert!(asset.filename.starts_with("image-") && asset.filename.ends_with(".png"));
        assert!(asset.output_path.starts_with("public/assets/images/"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scans_every_reference_kind() {
        let html = r##"<html><head>
            <link rel="stylesheet" href="/css/site.css">
            <link rel="icon" href="/favicon.ico">
            <link rel="canonical" href="https://site.test/">
            <script src="/js/app.js"></script>
            <style>.hero { background: url('/img/hero.jpg'); }</style>
          </head><body>
            <img src="/img/a.png" srcset="/img/a.png 1x, /img/a@2x.png 2x">
            <div style="background-image: url(/img/bg.webp)"></div>
            <video poster="/img/poster.jpg"><source src="/media/clip.mp4"></video>
            <svg><use href="#icon"></use><image href="/img/vector.svg"></image></svg>
            <a href="/about">About</a>
          </body></html>"##;
        let result = AssetExtractor::default().extract_from_html(html);
        let urls: Vec<&str> = result.assets.iter().map(|a| a.original_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "/css/site.css",
                "/favicon.ico",
                "/js/app.js",
                "/img/hero.jpg",
                "/img/a.png",
                "/img/a@2x.png",
                "/img/bg.webp",
                "/img/poster.jpg",
                "/media/clip.mp4",
                "/img/vector.svg",
            ]
        );
        let a = result.by_identity("/img/a.png").unwrap();
        assert_eq!(a.references.len(), 2);
        assert_eq!(a.references[1].context, ReferenceContext::Srcset);
        assert_eq!(result.by_identity("/favicon.ico").unwrap().category, AssetCategory::Icon);
        assert_eq!(result.by_identity("/js/app.js").unwrap().category, AssetCategory::Script);
        assert_eq!(result.stats.pending, 10);
    }

    #[test]
    fn test_one_failing_download_is_isolated() {
        let html = r#"
            <img src="https://cdn.test/one.png">
            <img src="https://cdn.test/broken.png">
            <img src="https://cdn.test/two.png">
            <img src="https://cdn.test/one.png">"#;
        let fetcher = MockFetcher::new();
        let result = AssetExtractor::default().extract_with_download(html, &fetcher);
        assert_eq!(result.assets.len(), 3);
        assert_eq!(result.extracted().count(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("broken.png"));
        let broken = result.by_identity("https://cdn.test/broken.png").unwrap();
        assert_eq!(broken.status, ExtractionStatus::Failed);
        assert!(broken.error.as_deref().unwrap().contains("404"));
        // One attempt per asset, no retry.
        assert_eq!(fetcher.calls.borrow().len(), 3);
    }

    #[test]
    fn test_downloads_disabled_skip_remote() {
        let html = r#"<img src="https://cdn.test/a.png">"#;
        let extractor = AssetExtractor::new(AssetOptions::default().with_download(false));
        let result = extractor.extract_with_download(html, &MockFetcher::new());
        assert_eq!(result.assets[0].status, ExtractionStatus::Skipped);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_filenames_are_sanitized_and_unique() {
        let html = r#"
            <img src="https://a.test/img/My%20Logo.PNG">
            <img src="https://b.test/assets/my-logo.png">
            <img src="https://c.test/download?id=3">"#;
        let result = AssetExtractor::default().extract_with_download(html, &MockFetcher::new());
        let names: Vec<&str> = result.assets.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["my-logo.png", "my-logo-2.png", "download"]);
        assert_eq!(result.assets[2].category, AssetCategory::Other);
        assert_eq!(result.assets[0].public_path, "/assets/images/my-logo.png");
    }

    #[test]
    fn test_base_url_resolution() {
        assert_eq!(
            resolve_url("https://site.test/blog/post.html", "../img/a.png"),
            "https://site.test/img/a.png"
        );
        assert_eq!(resolve_url("https://site.test/blog/", "/x.css"), "https://site.test/x.css");
        assert_eq!(resolve_url("http://site.test", "//cdn.test/y.js"), "http://cdn.test/y.js");
        assert_eq!(resolve_url("https://site.test", "./a.png?v=1"), "https://site.test/a.png?v=1");

        let options = AssetOptions::default().with_base_url("https://site.test/page/");
        let result = AssetExtractor::new(options).extract_from_html(r#"<img src="a.png">"#);
        assert_eq!(result.assets[0].source, AssetSource::Remote);
        assert_eq!(result.assets[0].resolved_url, "https://site.test/page/a.png");
    }

    #[test]
    fn test_percent_encoded_data_url() {
        let (mime, data) = parse_data_url("data:image/svg+xml,%3Csvg%2F%3E").unwrap();
        assert_eq!(mime, "image/svg+xml");
        assert_eq!(data, b"<svg/>");
        assert!(parse_data_url("data:image/png;base64,@@@").is_none());
    }

    #[test]
    fn test_malformed_and_oversized_payloads_warn() {
        let html = r#"<img src="data:image/png;base64,@@@"><img src="data:text/plain,hello">"#;
        let extractor = AssetExtractor::new(AssetOptions::default().with_max_size(Some(3)));
        let result = extractor.extract_from_html(html);
        assert_eq!(result.assets.len(), 2);
        assert!(result.assets.iter().all(|a| a.status == ExtractionStatus::Failed));
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.stats.failed, 2);
    }

    #[test]
    fn test_ignores_non_asset_references() {
        let html = r##"<img src=""><img src="{avatarUrl}"><svg><use xlink:href="#i"></use></svg>
            <script src="javascript:void(0)"></script>"##;
        let result = AssetExtractor::default().extract_from_html(html);
        assert!(result.assets.is_empty());
    }

    #[test]
    fn test_srcset_ranges() {
        let srcset = "a.png 1x,b.png 2x, c.png";
        let urls: Vec<&str> = srcset_urls(srcset).into_iter().map(|r| &srcset[r]).collect();
        assert_eq!(urls, vec!["a.png", "b.png", "c.png"]);
    }
}
