use crate::color::{default_color_table, is_hex_color, resolve_color};
use crate::format::ImageFormat;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

const DEFAULT_FONTS: [(&str, &str); 10] = [
    ("lato", "Lato-Bold.ttf"),
    ("lora", "Lora-Bold.ttf"),
    ("montserrat", "Montserrat-Bold.ttf"),
    ("open-sans", "OpenSans-Bold.ttf"),
    ("oswald", "Oswald-Bold.ttf"),
    ("playfair-display", "PlayfairDisplay-Bold.ttf"),
    ("pt-sans", "PTSans-Bold.ttf"),
    ("raleway", "Raleway-Bold.ttf"),
    ("roboto", "Roboto-Bold.ttf"),
    ("source-sans-3", "SourceSans3-Bold.ttf"),
];

/// Read-only snapshot of allow-lists, bounds and defaults.
///
/// Built once at startup and passed by reference into every parse and
/// resolve call.
#[derive(Debug, Clone)]
pub struct Config {
    /// Color name to 3- or 6-digit hex (with or without `#`).
    pub colors: HashMap<String, String>,
    pub formats: BTreeSet<ImageFormat>,
    pub fonts_dir: PathBuf,
    /// Font key to font file, relative to `fonts_dir`.
    pub fonts: BTreeMap<String, String>,
    pub default_format: ImageFormat,
    pub default_background: String,
    pub default_foreground: String,
    pub default_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub min_size: u32,
    pub max_size: u32,
    pub default_font: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            colors: default_color_table(),
            formats: ImageFormat::ALL.into_iter().collect(),
            fonts_dir: PathBuf::from("./fonts"),
            fonts: DEFAULT_FONTS
                .iter()
                .map(|(key, file)| (key.to_string(), file.to_string()))
                .collect(),
            default_format: ImageFormat::Svg,
            default_background: "#dddddd".to_string(),
            default_foreground: "#999999".to_string(),
            default_scale: 1.0,
            min_scale: 1.0,
            max_scale: 3.0,
            min_size: 10,
            max_size: 4000,
            default_font: "lato".to_string(),
        }
    }
}

impl Config {
    pub fn has_font(&self, key: &str) -> bool {
        self.fonts.contains_key(key)
    }

    pub fn font_path(&self, key: &str) -> Option<PathBuf> {
        self.fonts.get(key).map(|file| self.fonts_dir.join(file))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, hex) in &self.colors {
            if !is_hex_color(hex) {
                bail!("colors: '{name}' maps to invalid hex color '{hex}'");
            }
        }
        if !is_normalized_hex(&self.default_background) {
            bail!("defaultBackground: '{}' is not a #rrggbb color", self.default_background);
        }
        if !is_normalized_hex(&self.default_foreground) {
            bail!("defaultForeground: '{}' is not a #rrggbb color", self.default_foreground);
        }
        if self.formats.is_empty() {
            bail!("formats: at least one format is required");
        }
        if !self.formats.contains(&self.default_format) {
            bail!("defaultFormat: '{}' is not listed in 'formats'", self.default_format);
        }
        if self.min_size == 0 {
            bail!("minSize: must be a positive integer");
        }
        if self.min_size > self.max_size {
            bail!("minSize: {} exceeds maxSize {}", self.min_size, self.max_size);
        }
        if !self.min_scale.is_finite() || self.min_scale <= 0.0 {
            bail!("minScale: must be a positive number");
        }
        if !self.max_scale.is_finite() || self.min_scale > self.max_scale {
            bail!("minScale: {} exceeds maxScale {}", self.min_scale, self.max_scale);
        }
        if !self.default_scale.is_finite() || self.default_scale <= 0.0 {
            bail!("defaultScale: must be a positive number");
        }
        if !self.fonts.contains_key(&self.default_font) {
            bail!("defaultFont: font '{}' is not defined in the 'fonts' option", self.default_font);
        }
        Ok(())
    }
}

fn is_normalized_hex(value: &str) -> bool {
    value.len() == 7 && value.starts_with('#') && is_hex_color(value)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    colors: Option<HashMap<String, String>>,
    formats: Option<Vec<String>>,
    fonts_dir: Option<PathBuf>,
    fonts: Option<BTreeMap<String, String>>,
    default_format: Option<String>,
    default_background: Option<String>,
    default_foreground: Option<String>,
    default_scale: Option<f64>,
    min_scale: Option<f64>,
    max_scale: Option<f64>,
    min_size: Option<u32>,
    max_size: Option<u32>,
    default_font: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse_config_file(contents: &str) -> Result<ConfigFile> {
    let json_err = match serde_json::from_str(contents) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };
    let json5_err = match json5::from_str(contents) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };
    serde_yaml::from_str(contents).map_err(|yaml_err| {
        anyhow!("not valid JSON ({json_err}), JSON5 ({json5_err}) or YAML ({yaml_err})")
    })
}

/// Parses JSON, relaxed JSON5 or YAML overrides and merges them onto the defaults.
pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed = parse_config_file(contents)?;

    let mut config = Config::default();

    if let Some(colors) = parsed.colors {
        config.colors.extend(colors);
    }
    if let Some(formats) = parsed.formats {
        config.formats = formats
            .iter()
            .map(|token| parse_format(token, "formats"))
            .collect::<Result<_>>()?;
    }
    if let Some(v) = parsed.default_format {
        config.default_format = parse_format(&v, "defaultFormat")?;
    }
    if let Some(v) = parsed.default_background {
        config.default_background = resolve_color(&v, &config.colors)
            .ok_or_else(|| anyhow!("defaultBackground: invalid color '{v}'"))?;
    }
    if let Some(v) = parsed.default_foreground {
        config.default_foreground = resolve_color(&v, &config.colors)
            .ok_or_else(|| anyhow!("defaultForeground: invalid color '{v}'"))?;
    }
    if let Some(v) = parsed.fonts_dir {
        config.fonts_dir = v;
    }
    if let Some(v) = parsed.fonts {
        config.fonts = v;
    }
    if let Some(v) = parsed.default_font {
        config.default_font = v;
    }
    if let Some(v) = parsed.default_scale {
        config.default_scale = v;
    }
    if let Some(v) = parsed.min_scale {
        config.min_scale = v;
    }
    if let Some(v) = parsed.max_scale {
        config.max_scale = v;
    }
    if let Some(v) = parsed.min_size {
        config.min_size = v;
    }
    if let Some(v) = parsed.max_size {
        config.max_size = v;
    }

    config.validate()?;
    Ok(config)
}

fn parse_format(token: &str, option: &str) -> Result<ImageFormat> {
    ImageFormat::from_token(token).ok_or_else(|| anyhow!("{option}: unknown image format '{token}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.formats.len(), 6);
        assert!(config.has_font("lato"));
        assert_eq!(
            config.font_path("roboto"),
            Some(PathBuf::from("./fonts").join("Roboto-Bold.ttf"))
        );
        assert_eq!(config.font_path("comic-sans"), None);
    }

    #[test]
    fn merges_overrides_onto_defaults() {
        let config = parse_config(
            r##"{
                "defaultBackground": "navy",
                "defaultForeground": "#ABC",
                "defaultFormat": "png",
                "maxSize": 2000,
                "maxScale": 4
            }"##,
        )
        .unwrap();
        assert_eq!(config.default_background, "#000080");
        assert_eq!(config.default_foreground, "#aabbcc");
        assert_eq!(config.default_format, ImageFormat::Png);
        assert_eq!(config.max_size, 2000);
        assert_eq!(config.min_size, 10);
        assert_eq!(config.max_scale, 4.0);
    }

    #[test]
    fn accepts_json5() {
        let config = parse_config(
            "{
                // brand palette
                colors: { brand: 'ff6600' },
                defaultBackground: 'brand',
            }",
        )
        .unwrap();
        assert_eq!(config.default_background, "#ff6600");
        assert!(config.colors.contains_key("aliceblue"));
    }

    #[test]
    fn accepts_yaml() {
        let config = parse_config(
            "# config.yml
colors:
  brand: ff6600
defaultBackground: brand
defaultForeground: '#FFF'
formats: [svg, png]
maxSize: 2000
",
        )
        .unwrap();
        assert_eq!(config.default_background, "#ff6600");
        assert_eq!(config.default_foreground, "#ffffff");
        assert_eq!(config.formats.len(), 2);
        assert_eq!(config.max_size, 2000);
        assert!(config.colors.contains_key("aliceblue"));
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let err = parse_config("port: 3000\n").unwrap_err();
        assert!(err.to_string().contains("YAML"), "{err}");
    }

    #[test]
    fn rejects_default_font_outside_fonts() {
        let err = parse_config(r#"{"fonts": {"roboto": "Roboto-Bold.ttf"}}"#).unwrap_err();
        assert!(err.to_string().contains("defaultFont"), "{err}");

        let config = parse_config(
            r#"{"fonts": {"roboto": "Roboto-Bold.ttf"}, "defaultFont": "roboto"}"#,
        )
        .unwrap();
        assert_eq!(config.fonts.len(), 1);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_config(r#"{"defaultBackground": "nope"}"#).is_err());
        assert!(parse_config(r#"{"defaultFormat": "bmp"}"#).is_err());
        assert!(parse_config(r#"{"formats": ["png"]}"#).is_err());
        assert!(parse_config(r#"{"minSize": 0}"#).is_err());
        assert!(parse_config(r#"{"minSize": 500, "maxSize": 100}"#).is_err());
        assert!(parse_config(r#"{"minScale": 0}"#).is_err());
        assert!(parse_config(r#"{"colors": {"bad": "xyz"}}"#).is_err());
        assert!(parse_config(r#"{"port": 3000}"#).is_err());
        assert!(parse_config("not a config").is_err());
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.default_font, "lato");
        assert!(load_config(Some(Path::new("/definitely/not/here.json"))).is_err());
    }
}
