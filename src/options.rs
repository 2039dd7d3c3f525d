use crate::color::contrast_color;
use crate::config::Config;
use crate::error::{PlaceholderError, PlaceholderResult};
use crate::format::{ImageFormat, allowed_format};
use crate::parser::{PathTokens, QueryTokens, parse_path, parse_query};
use serde::Serialize;
use url::Url;

/// Fully resolved parameters for one placeholder image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSpec {
    pub format: ImageFormat,
    pub background: String,
    pub foreground: String,
    /// Requested size, clamped to `[min_size, max_size]`.
    pub real_width: u32,
    pub real_height: u32,
    /// Output size after scaling, clamped to `max_size` only.
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub text: String,
    pub font: String,
    pub fontsize: u32,
}

fn clamp_size(value: u32, config: &Config) -> u32 {
    value.min(config.max_size).max(config.min_size)
}

fn clamp_scale(value: f64, config: &Config) -> f64 {
    value.min(config.max_scale).max(config.min_scale)
}

fn scaled(real: u32, scale: f64, config: &Config) -> u32 {
    let pixels = (f64::from(real) * scale).floor();
    if pixels >= f64::from(config.max_size) {
        config.max_size
    } else {
        pixels as u32
    }
}

/// Merges path tokens, query overrides and configuration into a [`RenderSpec`].
pub fn resolve(path: &PathTokens, query: &QueryTokens, config: &Config) -> RenderSpec {
    let format = path
        .format
        .as_deref()
        .and_then(|token| allowed_format(token, &config.formats))
        .unwrap_or(config.default_format);

    let background = path
        .background
        .clone()
        .unwrap_or_else(|| config.default_background.clone());
    let foreground = match (&path.foreground, &path.background) {
        (Some(foreground), _) => foreground.clone(),
        (None, None) => config.default_foreground.clone(),
        (None, Some(_)) => contrast_color(&background).to_string(),
    };

    let scale = clamp_scale(
        path.scale.map(f64::from).unwrap_or(config.default_scale),
        config,
    );
    let real_width = clamp_size(path.width, config);
    let real_height = clamp_size(path.height.unwrap_or(path.width), config);
    let width = scaled(real_width, scale, config);
    let height = scaled(real_height, scale, config);

    let text = query
        .text
        .clone()
        .unwrap_or_else(|| format!("{real_width} x {real_height}"));
    let font = query
        .font
        .clone()
        .unwrap_or_else(|| config.default_font.clone());
    let fontsize = query
        .fontsize
        .unwrap_or_else(|| ((f64::from(width.max(height)) * 0.1).floor() as u32).max(1));

    RenderSpec {
        format,
        background,
        foreground,
        real_width,
        real_height,
        width,
        height,
        scale,
        text,
        font,
        fontsize,
    }
}

/// Splits a request target (`/path?query#fragment`, absolute or relative)
/// into its path and query.
fn split_request(request: &str) -> PlaceholderResult<(String, String)> {
    let base = Url::parse("http://placeholder.invalid/")
        .map_err(|err| PlaceholderError::InvalidUrl(err.to_string()))?;
    let url = base
        .join(request)
        .map_err(|err| PlaceholderError::InvalidUrl(format!("{request}: {err}")))?;
    Ok((url.path().to_string(), url.query().unwrap_or_default().to_string()))
}

/// Resolves a request target such as `/300x200@2x/ff0000/fff.png?text=Hi`.
#[tracing::instrument(skip(config))]
pub fn resolve_request(request: &str, config: &Config) -> PlaceholderResult<RenderSpec> {
    let (path, query) = split_request(request)?;
    let path = parse_path(&path, config).inspect_err(|err| {
        tracing::debug!(segment = err.segment(), "rejecting request path: {err}");
    })?;
    let query = parse_query(&query, config);
    Ok(resolve(&path, &query, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;

    fn config() -> Config {
        Config {
            colors: [("red", "#ff0000"), ("green", "#00ff00"), ("blue", "#0000ff")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            formats: [ImageFormat::Png, ImageFormat::Jpg].into_iter().collect(),
            fonts: [("arial", "Arial.ttf"), ("verdana", "Verdana.ttf")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            default_format: ImageFormat::Svg,
            default_background: "#ffffff".to_string(),
            default_foreground: "#000000".to_string(),
            default_scale: 1.0,
            min_scale: 0.5,
            max_scale: 2.0,
            min_size: 10,
            max_size: 1000,
            default_font: "arial".to_string(),
            ..Config::default()
        }
    }

    fn resolve_ok(request: &str) -> RenderSpec {
        resolve_request(request, &config()).unwrap()
    }

    #[test]
    fn height_defaults_to_width() {
        let spec = resolve_ok("300");
        assert_eq!(spec.real_width, 300);
        assert_eq!(spec.real_height, 300);
        assert_eq!(spec.text, "300 x 300");
    }

    #[test]
    fn clamps_real_size() {
        assert_eq!(resolve_ok("2000").real_width, 1000);
        assert_eq!(resolve_ok("300x2000").real_height, 1000);
        assert_eq!(resolve_ok("5").real_width, 10);
        assert_eq!(resolve_ok("300x5").real_height, 10);
        assert_eq!(resolve_ok("99999999999999").real_width, 1000);
    }

    #[test]
    fn default_colors_without_background() {
        let spec = resolve_ok("300x200");
        assert_eq!(spec.background, "#ffffff");
        assert_eq!(spec.foreground, "#000000");
    }

    #[test]
    fn contrast_foreground_for_explicit_background() {
        assert_eq!(resolve_ok("300x200/red").foreground, "#ffffff");
        assert_eq!(resolve_ok("300x200/green").foreground, "#000000");
        assert_eq!(resolve_ok("300x200/red/blue").foreground, "#0000ff");
    }

    #[test]
    fn fragment_is_not_part_of_the_path() {
        let spec = resolve_ok("300x200/#ggg");
        assert_eq!(spec.background, "#ffffff");
        assert_eq!(spec.foreground, "#000000");
    }

    #[test]
    fn scale_multiplies_and_clamps() {
        let spec = resolve_ok("300x200@2x");
        assert_eq!((spec.width, spec.height), (600, 400));
        assert_eq!(spec.scale, 2.0);
        assert_eq!(resolve_ok("300x200@3x").scale, 2.0);
        assert_eq!(resolve_ok("600x400@2x").width, 1000);
        assert_eq!(resolve_ok("400x600@2x").height, 1000);
    }

    #[test]
    fn sub_one_scale_is_not_reclamped_to_min_size() {
        let config = Config {
            default_scale: 0.5,
            ..config()
        };
        let spec = resolve_request("12x10", &config).unwrap();
        assert_eq!(spec.scale, 0.5);
        assert_eq!((spec.real_width, spec.real_height), (12, 10));
        assert_eq!((spec.width, spec.height), (6, 5));
        assert_eq!(spec.fontsize, 1);
    }

    #[test]
    fn format_defaults_and_validation() {
        assert_eq!(resolve_ok("300x200").format, ImageFormat::Svg);
        assert_eq!(resolve_ok("300x200.png").format, ImageFormat::Png);
        assert_eq!(resolve_ok("300x200/red/blue/png").format, ImageFormat::Png);
        // `/` formats skip the allow-list in the parser but never escape it
        assert_eq!(resolve_ok("300x200/red/blue/gif").format, ImageFormat::Svg);
    }

    #[test]
    fn path_failures_short_circuit() {
        let err = resolve_request("300x200/png/red", &config()).unwrap_err();
        assert!(matches!(
            err,
            PlaceholderError::InvalidPath(PathError::InvalidBackground(ref s)) if s == "png"
        ));
        assert!(resolve_request("300x200.invalid", &config()).is_err());
        assert!(resolve_request("300x200@0.5x", &config()).is_err());
        assert!(resolve_request("200x", &config()).is_err());
    }

    #[test]
    fn query_overrides() {
        let spec = resolve_ok("300x200?font=verdana&fontsize=24&text=Hello%20World");
        assert_eq!(spec.font, "verdana");
        assert_eq!(spec.fontsize, 24);
        assert_eq!(spec.text, "Hello World");
    }

    #[test]
    fn invalid_query_values_fall_back() {
        let spec = resolve_ok("300x200?font=invalidfont&fontsize=invalidsize");
        assert_eq!(spec.font, "arial");
        assert_eq!(spec.fontsize, 30);
    }

    #[test]
    fn default_fontsize_uses_scaled_size() {
        let spec = resolve_ok("100x150@2x");
        assert_eq!((spec.width, spec.height), (200, 300));
        assert_eq!(spec.fontsize, 30);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(resolve_ok("300x200.png")).unwrap();
        assert_eq!(json["format"], "png");
        assert_eq!(json["realWidth"], 300);
        assert_eq!(json["fontsize"], 30);
    }
}
