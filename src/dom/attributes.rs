//! HTML → React attribute normalization.
//!
//! The alias table is total: every HTML name listed in [`ALIASES`] maps to
//! exactly one JSX prop name, and [`react_attribute_name`] gives every other
//! name a deterministic spelling as well.

use crate::util::camel_case;

/// Elements that can never have children and always render self-closing.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Attributes whose mere presence means `true`.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "inert",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

/// Fixed HTML → JSX alias table, sorted by HTML name.
pub const ALIASES: &[(&str, &str)] = &[
    ("accept-charset", "acceptCharset"),
    ("accesskey", "accessKey"),
    ("allowfullscreen", "allowFullScreen"),
    ("autocapitalize", "autoCapitalize"),
    ("autocomplete", "autoComplete"),
    ("autofocus", "autoFocus"),
    ("autoplay", "autoPlay"),
    ("cellpadding", "cellPadding"),
    ("cellspacing", "cellSpacing"),
    ("charset", "charSet"),
    ("class", "className"),
    ("clip-path", "clipPath"),
    ("clip-rule", "clipRule"),
    ("colspan", "colSpan"),
    ("contenteditable", "contentEditable"),
    ("contextmenu", "contextMenu"),
    ("controlslist", "controlsList"),
    ("crossorigin", "crossOrigin"),
    ("datetime", "dateTime"),
    ("enctype", "encType"),
    ("enterkeyhint", "enterKeyHint"),
    ("fill-opacity", "fillOpacity"),
    ("fill-rule", "fillRule"),
    ("font-family", "fontFamily"),
    ("font-size", "fontSize"),
    ("for", "htmlFor"),
    ("formaction", "formAction"),
    ("formenctype", "formEncType"),
    ("formmethod", "formMethod"),
    ("formnovalidate", "formNoValidate"),
    ("formtarget", "formTarget"),
    ("frameborder", "frameBorder"),
    ("hreflang", "hrefLang"),
    ("http-equiv", "httpEquiv"),
    ("inputmode", "inputMode"),
    ("itemprop", "itemProp"),
    ("itemscope", "itemScope"),
    ("itemtype", "itemType"),
    ("marginheight", "marginHeight"),
    ("marginwidth", "marginWidth"),
    ("maxlength", "maxLength"),
    ("mediagroup", "mediaGroup"),
    ("minlength", "minLength"),
    ("nomodule", "noModule"),
    ("novalidate", "noValidate"),
    ("playsinline", "playsInline"),
    ("readonly", "readOnly"),
    ("referrerpolicy", "referrerPolicy"),
    ("rowspan", "rowSpan"),
    ("spellcheck", "spellCheck"),
    ("srcdoc", "srcDoc"),
    ("srclang", "srcLang"),
    ("srcset", "srcSet"),
    ("stop-color", "stopColor"),
    ("stop-opacity", "stopOpacity"),
    ("stroke-dasharray", "strokeDasharray"),
    ("stroke-dashoffset", "strokeDashoffset"),
    ("stroke-linecap", "strokeLinecap"),
    ("stroke-linejoin", "strokeLinejoin"),
    ("stroke-miterlimit", "strokeMiterlimit"),
    ("stroke-opacity", "strokeOpacity"),
    ("stroke-width", "strokeWidth"),
    ("tabindex", "tabIndex"),
    ("text-anchor", "textAnchor"),
    ("usemap", "useMap"),
    ("viewbox", "viewBox"),
    ("xlink:href", "xlinkHref"),
    ("xml:lang", "xmlLang"),
    ("xml:space", "xmlSpace"),
    ("xmlns:xlink", "xmlnsXlink"),
];

/// DOM event names whose React spelling is not a plain capitalization.
const EVENT_ALIASES: &[(&str, &str)] = &[
    ("animationend", "onAnimationEnd"),
    ("animationstart", "onAnimationStart"),
    ("beforeinput", "onBeforeInput"),
    ("canplay", "onCanPlay"),
    ("compositionend", "onCompositionEnd"),
    ("contextmenu", "onContextMenu"),
    ("dblclick", "onDoubleClick"),
    ("doubleclick", "onDoubleClick"),
    ("dragend", "onDragEnd"),
    ("dragenter", "onDragEnter"),
    ("dragleave", "onDragLeave"),
    ("dragover", "onDragOver"),
    ("dragstart", "onDragStart"),
    ("focusin", "onFocus"),
    ("focusout", "onBlur"),
    ("keydown", "onKeyDown"),
    ("keypress", "onKeyPress"),
    ("keyup", "onKeyUp"),
    ("loadeddata", "onLoadedData"),
    ("mousedown", "onMouseDown"),
    ("mouseenter", "onMouseEnter"),
    ("mouseleave", "onMouseLeave"),
    ("mousemove", "onMouseMove"),
    ("mouseout", "onMouseOut"),
    ("mouseover", "onMouseOver"),
    ("mouseup", "onMouseUp"),
    ("pointerdown", "onPointerDown"),
    ("pointerup", "onPointerUp"),
    ("timeupdate", "onTimeUpdate"),
    ("touchend", "onTouchEnd"),
    ("touchmove", "onTouchMove"),
    ("touchstart", "onTouchStart"),
    ("transitionend", "onTransitionEnd"),
];

/// Normalized attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Plain string, rendered quoted.
    Text(String),
    /// Bare boolean attribute (`disabled`).
    Bool(bool),
    /// JavaScript expression written as `{expr}` in the source.
    Expr(String),
}

/// A normalized, JSX-ready attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written in the markup (`tabindex`).
    pub source: String,
    /// JSX prop name (`tabIndex`).
    pub name: String,
    pub value: AttrValue,
}

/// An inline event handler attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHandler {
    /// React prop name (`onClick`).
    pub name: String,
    /// Name as written in the markup (`onclick`).
    pub source: String,
    /// Handler source text, preserved verbatim.
    pub handler: String,
}

/// Check whether a tag is a void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Check whether an attribute is boolean by presence.
pub fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str())
}

/// Look up a name in the fixed alias table.
pub fn alias_for(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    ALIASES
        .binary_search_by(|(html, _)| html.cmp(&lower.as_str()))
        .ok()
        .map(|i| ALIASES[i].1)
}

/// JSX prop name for an HTML attribute.
///
/// Resolution order: `data-*`/`aria-*` pass through unchanged, then the alias
/// table, then hyphenated or prefixed names are camelCased; anything else is
/// kept verbatim.
///
/// ```
/// use jsxkit::dom::attributes::react_attribute_name;
///
/// assert_eq!(react_attribute_name("class"), "className");
/// assert_eq!(react_attribute_name("for"), "htmlFor");
/// assert_eq!(react_attribute_name("data-id"), "data-id");
/// assert_eq!(react_attribute_name("href"), "href");
/// ```
pub fn react_attribute_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("data-") || lower.starts_with("aria-") {
        return lower;
    }
    if let Some(alias) = alias_for(&lower) {
        return alias.to_string();
    }
    if lower.contains('-') || lower.contains(':') {
        return camel_case(&lower);
    }
    // SVG names arrive case-adjusted from the tree builder (viewBox).
    name.to_string()
}

/// React prop name for an inline event attribute, or `None` if `name` is
/// not an event handler.
///
/// Matches the `on<event>` shape: lowercase HTML spellings (`onclick`) as
/// well as already camelCased ones (`onClick`).
pub fn event_prop_name(name: &str) -> Option<String> {
    let rest = name.strip_prefix("on")?;
    if rest.len() < 3 || !rest.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let lower = rest.to_ascii_lowercase();
    if let Some((_, react)) = EVENT_ALIASES.iter().find(|(ev, _)| *ev == lower) {
        return Some((*react).to_string());
    }
    let mut chars = rest.chars();
    let first = chars.next()?;
    let tail: String = if rest.chars().any(|c| c.is_ascii_uppercase()) {
        chars.collect()
    } else {
        chars.as_str().to_ascii_lowercase()
    };
    Some(format!("on{}{tail}", first.to_ascii_uppercase()))
}

/// The inner expression of a `{expr}`-shaped attribute value.
pub fn expression_body(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let inner = trimmed.strip_prefix('{')?.strip_suffix('}')?;
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}

/// Normalize one raw attribute into its JSX form.
///
/// `class`, `style` and event attributes are handled by the caller; this
/// covers the remaining plain attributes.
pub fn normalize_attribute(source: &str, value: &str) -> Attribute {
    let name = react_attribute_name(source);
    let value = if let Some(expr) = expression_body(value) {
        AttrValue::Expr(expr.to_string())
    } else if is_boolean_attribute(source) {
        match value.trim().to_ascii_lowercase().as_str() {
            "false" => AttrValue::Bool(false),
            _ => AttrValue::Bool(true),
        }
    } else {
        AttrValue::Text(value.to_string())
    };
    Attribute {
        source: source.to_string(),
        name,
        value,
    }
}
