use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

pub const WHITE: &str = "#ffffff";
pub const BLACK: &str = "#000000";

// https://www.w3.org/TR/css-color-4/#named-colors
pub const NAMED_COLORS: [(&str, &str); 149] = [
    ("aliceblue", "f0f8ff"),
    ("antiquewhite", "faebd7"),
    ("aqua", "0ff"),
    ("aquamarine", "7fffd4"),
    ("azure", "f0ffff"),
    ("beige", "f5f5dc"),
    ("bisque", "ffe4c4"),
    ("black", "000"),
    ("blanchedalmond", "ffebcd"),
    ("blue", "00f"),
    ("blueviolet", "8a2be2"),
    ("brown", "a52a2a"),
    ("burlywood", "deb887"),
    ("burntsienna", "ea7e5d"),
    ("cadetblue", "5f9ea0"),
    ("chartreuse", "7fff00"),
    ("chocolate", "d2691e"),
    ("coral", "ff7f50"),
    ("cornflowerblue", "6495ed"),
    ("cornsilk", "fff8dc"),
    ("crimson", "dc143c"),
    ("cyan", "0ff"),
    ("darkblue", "00008b"),
    ("darkcyan", "008b8b"),
    ("darkgoldenrod", "b8860b"),
    ("darkgray", "a9a9a9"),
    ("darkgreen", "006400"),
    ("darkgrey", "a9a9a9"),
    ("darkkhaki", "bdb76b"),
    ("darkmagenta", "8b008b"),
    ("darkolivegreen", "556b2f"),
    ("darkorange", "ff8c00"),
    ("darkorchid", "9932cc"),
    ("darkred", "8b0000"),
    ("darksalmon", "e9967a"),
    ("darkseagreen", "8fbc8f"),
    ("darkslateblue", "483d8b"),
    ("darkslategray", "2f4f4f"),
    ("darkslategrey", "2f4f4f"),
    ("darkturquoise", "00ced1"),
    ("darkviolet", "9400d3"),
    ("deeppink", "ff1493"),
    ("deepskyblue", "00bfff"),
    ("dimgray", "696969"),
    ("dimgrey", "696969"),
    ("dodgerblue", "1e90ff"),
    ("firebrick", "b22222"),
    ("floralwhite", "fffaf0"),
    ("forestgreen", "228b22"),
    ("fuchsia", "f0f"),
    ("gainsboro", "dcdcdc"),
    ("ghostwhite", "f8f8ff"),
    ("gold", "ffd700"),
    ("goldenrod", "daa520"),
    ("gray", "808080"),
    ("green", "008000"),
    ("greenyellow", "adff2f"),
    ("grey", "808080"),
    ("honeydew", "f0fff0"),
    ("hotpink", "ff69b4"),
    ("indianred", "cd5c5c"),
    ("indigo", "4b0082"),
    ("ivory", "fffff0"),
    ("khaki", "f0e68c"),
    ("lavender", "e6e6fa"),
    ("lavenderblush", "fff0f5"),
    ("lawngreen", "7cfc00"),
    ("lemonchiffon", "fffacd"),
    ("lightblue", "add8e6"),
    ("lightcoral", "f08080"),
    ("lightcyan", "e0ffff"),
    ("lightgoldenrodyellow", "fafad2"),
    ("lightgray", "d3d3d3"),
    ("lightgreen", "90ee90"),
    ("lightgrey", "d3d3d3"),
    ("lightpink", "ffb6c1"),
    ("lightsalmon", "ffa07a"),
    ("lightseagreen", "20b2aa"),
    ("lightskyblue", "87cefa"),
    ("lightslategray", "789"),
    ("lightslategrey", "789"),
    ("lightsteelblue", "b0c4de"),
    ("lightyellow", "ffffe0"),
    ("lime", "0f0"),
    ("limegreen", "32cd32"),
    ("linen", "faf0e6"),
    ("magenta", "f0f"),
    ("maroon", "800000"),
    ("mediumaquamarine", "66cdaa"),
    ("mediumblue", "0000cd"),
    ("mediumorchid", "ba55d3"),
    ("mediumpurple", "9370db"),
    ("mediumseagreen", "3cb371"),
    ("mediumslateblue", "7b68ee"),
    ("mediumspringgreen", "00fa9a"),
    ("mediumturquoise", "48d1cc"),
    ("mediumvioletred", "c71585"),
    ("midnightblue", "191970"),
    ("mintcream", "f5fffa"),
    ("mistyrose", "ffe4e1"),
    ("moccasin", "ffe4b5"),
    ("navajowhite", "ffdead"),
    ("navy", "000080"),
    ("oldlace", "fdf5e6"),
    ("olive", "808000"),
    ("olivedrab", "6b8e23"),
    ("orange", "ffa500"),
    ("orangered", "ff4500"),
    ("orchid", "da70d6"),
    ("palegoldenrod", "eee8aa"),
    ("palegreen", "98fb98"),
    ("paleturquoise", "afeeee"),
    ("palevioletred", "db7093"),
    ("papayawhip", "ffefd5"),
    ("peachpuff", "ffdab9"),
    ("peru", "cd853f"),
    ("pink", "ffc0cb"),
    ("plum", "dda0dd"),
    ("powderblue", "b0e0e6"),
    ("purple", "800080"),
    ("rebeccapurple", "663399"),
    ("red", "f00"),
    ("rosybrown", "bc8f8f"),
    ("royalblue", "4169e1"),
    ("saddlebrown", "8b4513"),
    ("salmon", "fa8072"),
    ("sandybrown", "f4a460"),
    ("seagreen", "2e8b57"),
    ("seashell", "fff5ee"),
    ("sienna", "a0522d"),
    ("silver", "c0c0c0"),
    ("skyblue", "87ceeb"),
    ("slateblue", "6a5acd"),
    ("slategray", "708090"),
    ("slategrey", "708090"),
    ("snow", "fffafa"),
    ("springgreen", "00ff7f"),
    ("steelblue", "4682b4"),
    ("tan", "d2b48c"),
    ("teal", "008080"),
    ("thistle", "d8bfd8"),
    ("tomato", "ff6347"),
    ("turquoise", "40e0d0"),
    ("violet", "ee82ee"),
    ("wheat", "f5deb3"),
    ("white", "fff"),
    ("whitesmoke", "f5f5f5"),
    ("yellow", "ff0"),
    ("yellowgreen", "9acd32"),
];

pub fn default_color_table() -> HashMap<String, String> {
    NAMED_COLORS
        .iter()
        .map(|(name, hex)| (name.to_string(), hex.to_string()))
        .collect()
}

pub fn is_hex_color(token: &str) -> bool {
    HEX_COLOR_RE.is_match(token)
}

/// Normalizes a 3- or 6-digit hex token to lower-case `#rrggbb`.
fn normalize_hex(hex: &str) -> String {
    let digits = hex.trim_start_matches('#').to_ascii_lowercase();
    if digits.len() == 3 {
        let mut out = String::with_capacity(7);
        out.push('#');
        for ch in digits.chars() {
            out.push(ch);
            out.push(ch);
        }
        return out;
    }
    format!("#{digits}")
}

/// Resolves a hex token or a color name to `#rrggbb`.
///
/// Returns `None` when the token is neither valid hex nor a known name. Table
/// entries that are not valid hex are treated as unknown.
pub fn resolve_color(token: &str, colors: &HashMap<String, String>) -> Option<String> {
    if is_hex_color(token) {
        return Some(normalize_hex(token));
    }
    colors
        .get(token)
        .filter(|hex| is_hex_color(hex))
        .map(|hex| normalize_hex(hex))
}

fn hex_channels(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

// https://www.w3.org/TR/AERT/#color-contrast
pub fn contrast_color(background: &str) -> &'static str {
    let (r, g, b) = hex_channels(background).unwrap_or_default();
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance < 128.0 { WHITE } else { BLACK }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HashMap<String, String> {
        [("red", "#ff0000"), ("blue", "00f"), ("broken", "zzz")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn expands_short_hex() {
        assert_eq!(resolve_color("abc", &table()).as_deref(), Some("#aabbcc"));
        assert_eq!(resolve_color("#FFF", &table()).as_deref(), Some("#ffffff"));
        assert_eq!(resolve_color("0a0B0c", &table()).as_deref(), Some("#0a0b0c"));
    }

    #[test]
    fn rejects_other_hex_lengths() {
        assert!(resolve_color("abcd", &table()).is_none());
        assert!(resolve_color("abcde", &table()).is_none());
        assert!(resolve_color("#ggg", &table()).is_none());
        assert!(resolve_color("", &table()).is_none());
    }

    #[test]
    fn resolves_names_through_table() {
        assert_eq!(resolve_color("red", &table()).as_deref(), Some("#ff0000"));
        assert_eq!(resolve_color("blue", &table()).as_deref(), Some("#0000ff"));
        assert!(resolve_color("broken", &table()).is_none());
        assert!(resolve_color("green", &table()).is_none());
    }

    #[test]
    fn default_table_covers_css_names() {
        let colors = default_color_table();
        assert_eq!(colors.len(), NAMED_COLORS.len());
        assert_eq!(resolve_color("rebeccapurple", &colors).as_deref(), Some("#663399"));
        assert_eq!(resolve_color("lightslategray", &colors).as_deref(), Some("#778899"));
        assert!(NAMED_COLORS.iter().all(|(_, hex)| is_hex_color(hex)));
    }

    #[test]
    fn contrast_uses_luminance_threshold() {
        assert_eq!(contrast_color("#000000"), WHITE);
        assert_eq!(contrast_color("#ffffff"), BLACK);
        assert_eq!(contrast_color("#ff0000"), WHITE);
        assert_eq!(contrast_color("#ffff00"), BLACK);
        assert_eq!(contrast_color("#818181"), BLACK);
        assert_eq!(contrast_color("#7f7f7f"), WHITE);
    }
}
