use crate::config::Config;
use crate::options::RenderSpec;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::fmt::Write as _;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Raw font files keyed by the configured font key, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct FontStore {
    fonts: HashMap<String, Vec<u8>>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every configured font from `fonts_dir`. Fonts that cannot be read
    /// or parsed are skipped; requests using them get the text fallback.
    pub fn load(config: &Config) -> Self {
        let mut store = Self::new();
        for key in config.fonts.keys() {
            let Some(path) = config.font_path(key) else {
                continue;
            };
            let result = std::fs::read(&path)
                .map_err(anyhow::Error::from)
                .and_then(|data| store.insert(key.clone(), data));
            match result {
                Ok(()) => tracing::debug!(font = %key, path = %path.display(), "loaded font"),
                Err(err) => {
                    tracing::warn!(font = %key, path = %path.display(), "failed to load font: {err}")
                }
            }
        }
        store
    }

    pub fn insert(&mut self, key: impl Into<String>, data: Vec<u8>) -> Result<()> {
        Face::parse(&data, 0).map_err(|err| anyhow!("invalid font data: {err}"))?;
        self.fonts.insert(key.into(), data);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fonts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn font_data(&self) -> impl Iterator<Item = &[u8]> {
        self.fonts.values().map(Vec::as_slice)
    }

    fn face(&self, key: &str) -> Option<Face<'_>> {
        let data = self.fonts.get(key)?;
        Face::parse(data, 0).ok()
    }
}

/// Emits SVG path commands for glyph outlines, translated to the pen
/// position and flipped into SVG's y-down space.
struct SvgPathBuilder {
    d: String,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl SvgPathBuilder {
    fn new(scale: f32, baseline: f32) -> Self {
        Self {
            d: String::new(),
            scale,
            origin_x: 0.0,
            baseline,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for SvgPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "M{x:.2} {y:.2}");
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "L{x:.2} {y:.2}");
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "Q{x1:.2} {y1:.2} {x:.2} {y:.2}");
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        let _ = write!(self.d, "C{x1:.2} {y1:.2} {x2:.2} {y2:.2} {x:.2} {y:.2}");
    }

    fn close(&mut self) {
        self.d.push('Z');
    }
}

/// Single-line glyph run centred on (`center_x`, `center_y`).
fn text_path(face: &Face<'_>, text: &str, font_size: f32, center_x: f32, center_y: f32) -> String {
    let scale = font_size / f32::from(face.units_per_em().max(1));
    let glyphs: Vec<GlyphId> = text
        .chars()
        .filter(|ch| !ch.is_control())
        .map(|ch| face.glyph_index(ch).unwrap_or(GlyphId(0)))
        .collect();
    let advance: f32 = glyphs
        .iter()
        .map(|glyph| f32::from(face.glyph_hor_advance(*glyph).unwrap_or(0)))
        .sum();

    let middle = (f32::from(face.ascender()) + f32::from(face.descender())) / 2.0;
    let mut builder = SvgPathBuilder::new(scale, center_y + middle * scale);
    builder.origin_x = center_x - advance * scale / 2.0;
    for glyph in glyphs {
        face.outline_glyph(glyph, &mut builder);
        builder.origin_x += f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale;
    }
    builder.d
}

/// The text layer of a placeholder: outlined glyphs when the font is loaded,
/// a plain `<text>` element otherwise.
pub fn glyph_markup(spec: &RenderSpec, fonts: &FontStore) -> String {
    let center_x = (spec.width / 2) as f32;
    let center_y = (spec.height / 2) as f32;

    if let Some(face) = fonts.face(&spec.font) {
        let d = text_path(&face, &spec.text, spec.fontsize as f32, center_x, center_y);
        return format!("<path fill=\"{}\" d=\"{}\"/>", spec.foreground, d);
    }

    tracing::warn!(font = %spec.font, "font not loaded, falling back to plain text");
    format!(
        "<text x=\"50%\" y=\"50%\" dominant-baseline=\"middle\" text-anchor=\"middle\" fill=\"{}\" font-family=\"sans-serif\" font-size=\"{}\">{}</text>",
        spec.foreground,
        spec.fontsize,
        escape_xml(&spec.text)
    )
}

pub fn render_svg(spec: &RenderSpec, fonts: &FontStore) -> String {
    let mut svg = String::new();
    let (width, height) = (spec.width, spec.height);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        spec.background
    ));
    svg.push_str(&glyph_markup(spec, fonts));
    svg.push_str("</svg>");
    svg
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
