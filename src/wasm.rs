//! WASM bindings for in-browser conversion.
//!
//! Options are passed as a JSON string with the same camelCase fields as
//! [`ConversionOptions`]. Remote assets are never downloaded in the browser;
//! they are reported as skipped.

use wasm_bindgen::prelude::*;

use crate::pipeline::{ConversionOptions, Converter};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn parse_options(options: &str) -> Result<ConversionOptions, JsValue> {
    if options.trim().is_empty() {
        return Ok(ConversionOptions::default());
    }
    serde_json::from_str(options).map_err(|e| JsValue::from_str(&format!("invalid options: {e}")))
}

/// Convert markup to a project archive.
///
/// Returns the ZIP bytes, or throws the failure message of the stage that
/// stopped the conversion.
#[wasm_bindgen]
pub fn convert_to_zip(markup: &str, options: &str) -> Result<Vec<u8>, JsValue> {
    let options = parse_options(options)?;
    let result = Converter::new().without_fetcher().convert_markup(markup, options);
    if !result.is_success() {
        return Err(JsValue::from_str(&result.outcome.message()));
    }
    Ok(result.archive.unwrap_or_default())
}

/// Convert markup and return the full report as JSON, for live previews.
///
/// Never throws for conversion failures; inspect `outcome.status`.
#[wasm_bindgen]
pub fn convert_preview(markup: &str, options: &str) -> Result<String, JsValue> {
    let options = parse_options(options)?;
    let result = Converter::new().without_fetcher().convert_markup(markup, options);
    result.to_json().map_err(|e| JsValue::from_str(&e.to_string()))
}
