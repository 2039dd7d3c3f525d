use crate::config::load_config;
use crate::encode::Encoder;
use crate::format::ImageFormat;
use crate::options::resolve_request;
use crate::render::{FontStore, render_svg};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "placeholder", version, about = "Placeholder image generator")]
pub struct Args {
    /// Request path, e.g. '300x200@2x/ff0000/fff.png?text=Hi&font=lato'
    pub request: String,

    /// Output file. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file (JSON, JSON5 or YAML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory holding the configured font files
    #[arg(long = "fonts-dir")]
    pub fonts_dir: Option<PathBuf>,

    /// Print the resolved options as JSON instead of rendering
    #[arg(long = "dump")]
    pub dump: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = args.fonts_dir {
        config.fonts_dir = dir;
    }

    let spec = resolve_request(&args.request, &config)?;
    if args.dump {
        println!("{}", serde_json::to_string_pretty(&spec)?);
        return Ok(());
    }

    let fonts = FontStore::load(&config);
    tracing::info!(loaded = fonts.len(), configured = config.fonts.len(), "fonts ready");
    let encoder = Encoder::new(&fonts);

    let svg = render_svg(&spec, &fonts);
    let bytes = encoder.encode(&svg, spec.format)?;
    match ensure_output(args.output.as_deref(), spec.format)? {
        Some(path) => std::fs::write(path, &bytes)?,
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

/// SVG may go to stdout; binary formats need an output path.
fn ensure_output(output: Option<&Path>, format: ImageFormat) -> Result<Option<&Path>> {
    if output.is_none() && format.is_raster() {
        return Err(anyhow::anyhow!(
            "Output path required for {} output",
            format
        ));
    }
    Ok(output)
}
