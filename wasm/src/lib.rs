use placeholder_rs::{Config, FontStore, RenderSpec, parse_config, render_svg, resolve_request};
use wasm_bindgen::prelude::*;

fn build_config(config_json: Option<String>) -> Result<Config, String> {
    match config_json {
        Some(raw_config) => parse_config(&raw_config).map_err(|error| format!("{error:#}")),
        None => Ok(Config::default()),
    }
}

fn resolve(request: &str, config_json: Option<String>) -> Result<RenderSpec, String> {
    let config = build_config(config_json)?;
    resolve_request(request, &config).map_err(|error| error.to_string())
}

/// Resolves a placeholder request and returns the options as JSON.
#[wasm_bindgen]
pub fn resolve_placeholder(request: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let spec = resolve(request, config_json).map_err(|error| JsValue::from_str(&error))?;
    serde_json::to_string(&spec).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Renders a placeholder request to SVG markup. Font files are not available
/// here, so text is emitted as a plain `<text>` element.
#[wasm_bindgen]
pub fn render_placeholder_svg(request: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let spec = resolve(request, config_json).map_err(|error| JsValue::from_str(&error))?;
    Ok(render_svg(&spec, &FontStore::new()))
}
