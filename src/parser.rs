use crate::color::resolve_color;
use crate::config::Config;
use crate::error::PathError;
use crate::format::allowed_format;
use url::form_urlencoded;

/// Raw tokens read from a request path, before defaults and clamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTokens {
    pub width: u32,
    pub height: Option<u32>,
    pub scale: Option<u32>,
    /// Normalized `#rrggbb`.
    pub background: Option<String>,
    /// Normalized `#rrggbb`.
    pub foreground: Option<String>,
    /// Only checked against the allow-list when given as a `.ext` suffix.
    pub format: Option<String>,
}

/// Optional overrides read from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTokens {
    pub font: Option<String>,
    pub fontsize: Option<u32>,
    pub text: Option<String>,
}

/// Single-pass cursor over the trimmed path. Optional grammar units take a
/// snapshot first and restore it when they do not match.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn snapshot(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Decimal digits without a leading zero.
    fn number(&mut self) -> Option<u32> {
        if self.peek() == Some(b'0') {
            return None;
        }
        saturating_digits(self.take_while(|b| b.is_ascii_digit()))
    }

    fn alphanumeric(&mut self) -> Option<&'a str> {
        let token = self.take_while(|b| b.is_ascii_alphanumeric());
        (!token.is_empty()).then_some(token)
    }

    /// Runs an optional unit, rewinding when it yields nothing.
    fn optional<T>(&mut self, unit: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let mark = self.snapshot();
        let value = unit(self);
        if value.is_none() {
            self.restore(mark);
        }
        value
    }
}

/// Value of an all-digit string, saturating at `u32::MAX`. `None` when empty.
fn saturating_digits(digits: &str) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    Some(digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    }))
}

enum ColorSegment {
    Color(String),
    Format(String),
}

#[derive(Clone, Copy)]
enum ColorSlot {
    Background,
    Foreground,
}

/// `'/' TOKEN` in a color position. A format token only wins when it is the
/// last segment; anything else must resolve as a color.
fn color_segment(
    cursor: &mut Cursor<'_>,
    config: &Config,
    slot: ColorSlot,
) -> Result<Option<ColorSegment>, PathError> {
    let mark = cursor.snapshot();
    if !cursor.eat(b'/') {
        return Ok(None);
    }
    let Some(token) = cursor.alphanumeric() else {
        cursor.restore(mark);
        return Ok(None);
    };
    if cursor.is_at_end() && allowed_format(token, &config.formats).is_some() {
        return Ok(Some(ColorSegment::Format(token.to_string())));
    }
    match resolve_color(token, &config.colors) {
        Some(color) => Ok(Some(ColorSegment::Color(color))),
        None => Err(match slot {
            ColorSlot::Background => PathError::InvalidBackground(token.to_string()),
            ColorSlot::Foreground => PathError::InvalidForeground(token.to_string()),
        }),
    }
}

fn trim_separators(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Parses `WIDTH ['x' HEIGHT] ['@' SCALE 'x'] ['/' BG] ['/' FG] ('.' FORMAT | '/' FORMAT)`.
///
/// The whole path must be consumed; there are no partial results.
pub fn parse_path(path: &str, config: &Config) -> Result<PathTokens, PathError> {
    let path = trim_separators(path);
    let mut cursor = Cursor::new(path);

    let width = cursor.number().ok_or_else(|| {
        let segment = path.split('/').next().unwrap_or(path);
        PathError::InvalidWidth(segment.to_string())
    })?;
    let mut tokens = PathTokens {
        width,
        ..PathTokens::default()
    };

    tokens.height = cursor.optional(|c| {
        c.eat(b'x').then_some(())?;
        c.number()
    });

    tokens.scale = cursor.optional(|c| {
        c.eat(b'@').then_some(())?;
        let scale = c.number()?;
        c.eat(b'x').then_some(scale)
    });

    match color_segment(&mut cursor, config, ColorSlot::Background)? {
        Some(ColorSegment::Format(format)) => tokens.format = Some(format),
        Some(ColorSegment::Color(background)) => {
            tokens.background = Some(background);
            match color_segment(&mut cursor, config, ColorSlot::Foreground)? {
                Some(ColorSegment::Format(format)) => tokens.format = Some(format),
                Some(ColorSegment::Color(foreground)) => tokens.foreground = Some(foreground),
                None => {}
            }
        }
        None => {}
    }

    if tokens.format.is_none() {
        if cursor.peek() == Some(b'.') {
            tokens.format = cursor.optional(|c| {
                c.eat(b'.');
                let token = c.alphanumeric()?;
                allowed_format(token, &config.formats).map(|_| token.to_string())
            });
        } else {
            tokens.format = cursor.optional(|c| {
                c.eat(b'/').then_some(())?;
                c.alphanumeric().map(str::to_string)
            });
        }
    }

    if !cursor.is_at_end() {
        return Err(PathError::TrailingInput(cursor.rest().to_string()));
    }

    Ok(tokens)
}

/// Integer prefix of `value`, like a lenient `parseInt`: optional leading
/// whitespace and `+`, then digits. Anything after the digits is ignored and
/// oversized values saturate.
fn integer_prefix(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let end = value
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(value.len());
    saturating_digits(&value[..end])
}

/// Reads `font`, `fontsize` and `text`. Invalid values are dropped, never
/// reported; the first occurrence of a key wins.
pub fn parse_query(query: &str, config: &Config) -> QueryTokens {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut tokens = QueryTokens::default();
    let mut seen_font = false;
    let mut seen_fontsize = false;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "font" if !seen_font => {
                seen_font = true;
                if config.has_font(&value) {
                    tokens.font = Some(value.into_owned());
                } else {
                    tracing::debug!(font = %value, "dropping unknown font");
                }
            }
            "fontsize" if !seen_fontsize => {
                seen_fontsize = true;
                match integer_prefix(&value).filter(|size| *size > 0) {
                    Some(size) => tokens.fontsize = Some(size),
                    None => tracing::debug!(fontsize = %value, "dropping invalid font size"),
                }
            }
            "text" if tokens.text.is_none() => {
                tokens.text = Some(value.into_owned());
            }
            _ => {}
        }
    }

    tokens
}
