#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod encode;
pub mod error;
pub mod format;
pub mod options;
pub mod parser;
pub mod render;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config, parse_config};
pub use encode::Encoder;
pub use error::{PathError, PlaceholderError, PlaceholderResult};
pub use format::ImageFormat;
pub use options::{RenderSpec, resolve, resolve_request};
pub use parser::{PathTokens, QueryTokens, parse_path, parse_query};
pub use render::{FontStore, glyph_markup, render_svg};

/// Resolves `request` and renders it to the bytes of the resolved format.
pub fn render_request(
    request: &str,
    config: &Config,
    fonts: &FontStore,
    encoder: &Encoder,
) -> PlaceholderResult<(RenderSpec, Vec<u8>)> {
    let spec = resolve_request(request, config)?;
    let svg = render_svg(&spec, fonts);
    let bytes = encoder
        .encode(&svg, spec.format)
        .map_err(|err| PlaceholderError::render(format!("{:#}", err)))?;
    Ok((spec, bytes))
}
