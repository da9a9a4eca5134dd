//! Extension and MIME tables for extracted assets.

use serde::Serialize;

/// Broad asset class; decides the output sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Image,
    Font,
    Stylesheet,
    Script,
    Video,
    Audio,
    Icon,
    Other,
}

impl AssetCategory {
    /// Directory under `public/assets/`.
    pub fn directory(self) -> &'static str {
        match self {
            AssetCategory::Image => "images",
            AssetCategory::Font => "fonts",
            AssetCategory::Stylesheet => "css",
            AssetCategory::Script => "js",
            AssetCategory::Video => "videos",
            AssetCategory::Audio => "audio",
            AssetCategory::Icon => "icons",
            AssetCategory::Other => "other",
        }
    }

    /// Category implied by a MIME type.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence {
            "image/x-icon" | "image/vnd.microsoft.icon" => AssetCategory::Icon,
            "text/css" => AssetCategory::Stylesheet,
            "application/javascript" | "text/javascript" | "application/ecmascript" => {
                AssetCategory::Script
            }
            m if m.starts_with("image/") => AssetCategory::Image,
            m if m.starts_with("font/") || m.contains("font") => AssetCategory::Font,
            m if m.starts_with("video/") => AssetCategory::Video,
            m if m.starts_with("audio/") => AssetCategory::Audio,
            _ => AssetCategory::Other,
        }
    }
}

pub const OCTET_STREAM: &str = "application/octet-stream";

/// (extension, MIME type)
const EXTENSIONS: &[(&str, &str)] = &[
    ("apng", "image/apng"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("css", "text/css"),
    ("eot", "application/vnd.ms-fontobject"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("m4a", "audio/mp4"),
    ("mjs", "application/javascript"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("oga", "audio/ogg"),
    ("ogg", "audio/ogg"),
    ("ogv", "video/ogg"),
    ("otf", "font/otf"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("ttf", "font/ttf"),
    ("wav", "audio/wav"),
    ("webm", "video/webm"),
    ("webmanifest", "application/manifest+json"),
    ("webp", "image/webp"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
];

/// MIME type for a file extension (case-insensitive).
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Preferred extension for a MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/jpeg" => Some("jpg"),
        "image/svg+xml" => Some("svg"),
        "text/javascript" | "application/javascript" => Some("js"),
        other => EXTENSIONS.iter().find(|(_, m)| *m == other).map(|(e, _)| *e),
    }
}

/// Extension of the last path segment of a URL, ignoring query and fragment.
pub fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}

/// MIME type for a URL from its extension, or the generic binary type.
pub fn guess_mime(url: &str) -> &'static str {
    url_extension(url)
        .and_then(mime_for_extension)
        .unwrap_or(OCTET_STREAM)
}

/// Sniff a MIME type from magic bytes.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF8") {
        Some("image/gif")
    } else if data.starts_with(b"RIFF") && data.len() > 12 && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else if data.starts_with(b"wOF2") {
        Some("font/woff2")
    } else if data.starts_with(b"wOFF") {
        Some("font/woff")
    } else if data.starts_with(b"<svg") || data.starts_with(b"<?xml") {
        Some("image/svg+xml")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("https://cdn.test/a/logo.PNG?v=2"), "image/png");
        assert_eq!(guess_mime("/fonts/inter.woff2#x"), "font/woff2");
        assert_eq!(guess_mime("https://cdn.test/a/download"), OCTET_STREAM);
        assert_eq!(guess_mime("archive.xyz"), OCTET_STREAM);
    }

    #[test]
    fn test_categories() {
        assert_eq!(AssetCategory::from_mime("image/png"), AssetCategory::Image);
        assert_eq!(AssetCategory::from_mime("image/x-icon"), AssetCategory::Icon);
        assert_eq!(AssetCategory::from_mime("font/woff2"), AssetCategory::Font);
        assert_eq!(AssetCategory::from_mime("text/css; charset=utf-8"), AssetCategory::Stylesheet);
        assert_eq!(AssetCategory::from_mime(OCTET_STREAM), AssetCategory::Other);
        assert_eq!(AssetCategory::Other.directory(), "other");
    }

    #[test]
    fn test_extension_round() {
        assert_eq!(extension_for_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_mime("image/svg+xml"), Some("svg"));
        assert_eq!(extension_for_mime("application/x-unknown"), None);
        assert_eq!(url_extension("https://x.test/path/"), None);
        assert_eq!(url_extension("https://x.test/.hidden"), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(sniff_mime(&[0x89, b'P', b'N', b'G', 0x0d]), Some("image/png"));
        assert_eq!(sniff_mime(b"GIF89a"), Some("image/gif"));
        assert_eq!(sniff_mime(b"hello"), None);
    }
}
