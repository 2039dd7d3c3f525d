use crate::format::ImageFormat;
use crate::render::FontStore;
use anyhow::Result;

/// Turns placeholder markup into the bytes of the requested format.
///
/// SVG passes through untouched. Raster formats are drawn with resvg and
/// need the `raster` feature.
pub struct Encoder {
    #[cfg(feature = "raster")]
    fontdb: std::sync::Arc<usvg::fontdb::Database>,
}

impl Encoder {
    pub fn new(fonts: &FontStore) -> Self {
        #[cfg(feature = "raster")]
        {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            for data in fonts.font_data() {
                db.load_font_data(data.to_vec());
            }
            tracing::debug!(faces = db.len(), "prepared rasterizer font database");
            Self {
                fontdb: std::sync::Arc::new(db),
            }
        }
        #[cfg(not(feature = "raster"))]
        {
            let _ = fonts;
            Self {}
        }
    }

    pub fn encode(&self, svg: &str, format: ImageFormat) -> Result<Vec<u8>> {
        if format == ImageFormat::Svg {
            return Ok(svg.as_bytes().to_vec());
        }
        self.encode_raster(svg, format)
    }

    #[cfg(feature = "raster")]
    fn encode_raster(&self, svg: &str, format: ImageFormat) -> Result<Vec<u8>> {
        let target = image::ImageFormat::from_extension(format.as_str())
            .ok_or_else(|| anyhow::anyhow!("no raster encoder for {format}"))?;
        let pixmap = self.rasterize(svg)?;
        if target == image::ImageFormat::Png {
            return Ok(pixmap.encode_png()?);
        }

        let mut rgba = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        let buffer = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
            .ok_or_else(|| anyhow::anyhow!("Pixmap size does not match its data"))?;
        // JPEG has no alpha channel
        let image = if target == image::ImageFormat::Jpeg {
            image::DynamicImage::ImageRgb8(image::DynamicImage::ImageRgba8(buffer).to_rgb8())
        } else {
            image::DynamicImage::ImageRgba8(buffer)
        };

        let mut out = std::io::Cursor::new(Vec::new());
        image.write_to(&mut out, target)?;
        Ok(out.into_inner())
    }

    #[cfg(feature = "raster")]
    fn rasterize(&self, svg: &str) -> Result<resvg::tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = self.fontdb.clone();

        let tree = usvg::Tree::from_str(svg, &opt)?;
        let size = tree.size().to_int_size();
        let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

        let mut pixmap_mut = pixmap.as_mut();
        resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
        Ok(pixmap)
    }

    #[cfg(not(feature = "raster"))]
    fn encode_raster(&self, _svg: &str, format: ImageFormat) -> Result<Vec<u8>> {
        Err(anyhow::anyhow!(
            "{} output requires the `raster` feature",
            format
        ))
    }
}
