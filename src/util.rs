//! Utility functions with platform-specific implementations.

use std::borrow::Cow;

/// Milliseconds elapsed on a monotonic-enough clock.
///
/// On native platforms, uses `Instant` relative to a process-wide anchor.
/// On WASM, uses `js_sys::Date::now()`.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    ANCHOR.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> f64 {
    js_sys::Date::now()
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<meta charset="...">`)
/// 3. Falls back to Windows-1252 (common in hand-saved mockups)
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find the charset declared by a `<meta charset>` tag in the first kilobyte.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let rest = &prefix[pos + 8..];
    let rest = rest
        .strip_prefix(b"\"")
        .or_else(|| rest.strip_prefix(b"'"))
        .unwrap_or(rest);
    let end = rest
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
        .unwrap_or(rest.len());
    std::str::from_utf8(&rest[..end]).ok().filter(|s| !s.is_empty())
}

// ============================================================================
// Case Conversion
// ============================================================================

/// Split an identifier-ish string into lowercase words.
///
/// Word boundaries are non-alphanumeric characters and lower-to-upper
/// transitions (`cardHeader` → `card`, `header`).
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            current.push(c.to_ascii_lowercase());
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert text to `PascalCase`.
///
/// ```
/// use jsxkit::util::pascal_case;
///
/// assert_eq!(pascal_case("card__header"), "CardHeader");
/// assert_eq!(pascal_case("Pricing plans!"), "PricingPlans");
/// ```
pub fn pascal_case(text: &str) -> String {
    split_words(text)
        .iter()
        .map(|w| capitalize(w))
        .collect::<String>()
}

/// Convert text to `camelCase`.
pub fn camel_case(text: &str) -> String {
    let pascal = pascal_case(text);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Convert a hyphenated CSS property to its camelCased DOM name.
///
/// Vendor prefixes keep their leading capital the way React expects
/// (`-webkit-transition` → `WebkitTransition`), except `-ms-` which React
/// spells lowercase (`msTransition`). Custom properties are returned as-is.
pub fn css_property_to_camel(property: &str) -> String {
    let property = property.trim();
    if property.starts_with("--") {
        return property.to_string();
    }
    let lower = property.to_ascii_lowercase();
    let (body, capitalize_first) = if let Some(rest) = lower.strip_prefix("-ms-") {
        (format!("ms-{rest}"), false)
    } else if let Some(rest) = lower.strip_prefix('-') {
        (rest.to_string(), true)
    } else {
        (lower, false)
    };

    let mut out = String::with_capacity(body.len());
    let mut upper_next = capitalize_first;
    for c in body.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a camelCased DOM style name back to its hyphenated CSS form.
pub fn camel_to_css_property(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if out.starts_with("ms-") {
        out.insert(0, '-');
    }
    out
}

/// Generate a lowercase hyphenated slug, as used for package and file names.
///
/// ```
/// use jsxkit::util::slugify;
///
/// assert_eq!(slugify("Landing Page"), "landing-page");
/// assert_eq!(slugify("  Hero -- Banner!! "), "hero-banner");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Lowercase hex SHA-1 digest of a byte slice.
pub fn sha1_hex(data: &[u8]) -> String {
    sha1_smol::Sha1::from(data).digest().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_passthrough() {
        assert_eq!(decode_text("héllo".as_bytes(), None), "héllo");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0xE9 is é in CP1252 and invalid as a lone UTF-8 byte
        assert_eq!(decode_text(b"caf\xE9", None), "café");
    }

    #[test]
    fn test_sniff_meta_charset() {
        assert_eq!(
            sniff_meta_charset(br#"<html><head><meta charset="iso-8859-1">"#),
            Some("iso-8859-1")
        );
        assert_eq!(sniff_meta_charset(b"<p>no charset</p>"), None);
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("cardHeader"), vec!["card", "header"]);
        assert_eq!(split_words("nav__item--active"), vec!["nav", "item", "active"]);
        assert_eq!(split_words("  "), Vec::<String>::new());
    }

    #[test]
    fn test_pascal_and_camel_case() {
        assert_eq!(pascal_case("site-header"), "SiteHeader");
        assert_eq!(pascal_case("hero_banner"), "HeroBanner");
        assert_eq!(camel_case("Read more"), "readMore");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_css_property_to_camel() {
        assert_eq!(css_property_to_camel("background-color"), "backgroundColor");
        assert_eq!(css_property_to_camel("-webkit-transition"), "WebkitTransition");
        assert_eq!(css_property_to_camel("-ms-transform"), "msTransform");
        assert_eq!(css_property_to_camel("--brand-color"), "--brand-color");
        assert_eq!(css_property_to_camel("COLOR"), "color");
    }

    #[test]
    fn test_camel_to_css_property() {
        assert_eq!(camel_to_css_property("backgroundColor"), "background-color");
        assert_eq!(camel_to_css_property("WebkitTransition"), "-webkit-transition");
        assert_eq!(camel_to_css_property("msTransform"), "-ms-transform");
        assert_eq!(camel_to_css_property("--gap"), "--gap");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My App"), "my-app");
        assert_eq!(slugify("___"), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
    }

    #[test]
    fn test_sha1_hex() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
