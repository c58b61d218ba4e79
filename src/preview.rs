use base64::{engine::general_purpose::STANDARD, Engine};
use image::{imageops::FilterType, ImageFormat, RgbImage};
use std::{io::Cursor, path::Path, time::Instant};
use thiserror::Error;
use tracing::debug;

mod pdfium;

pub use pdfium::{exclusive_session, PdfiumRasterizer};

pub const THUMBNAIL_WIDTH: u32 = 150;

pub const THUMBNAIL_HEIGHT: u32 = 200;

/// The only page ever rasterized for a preview.
pub const PREVIEW_PAGE: u16 = 0;

/// Turns a single page of a document into pixels at its native resolution.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, path: &Path, page: u16) -> Result<RgbImage, PreviewError>;
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("pdfium: {0}")]
    Library(String),

    #[error("{path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("png: {0}")]
    Encode(#[from] image::ImageError),
}

impl PreviewError {
    pub fn decode(path: &Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub image: RgbImage,
}

impl Thumbnail {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> Result<Vec<u8>, PreviewError> {
        let mut buf = Cursor::new(vec![]);
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// PNG encoded as a `data:` URI for inline `<img>` tags.
    pub fn data_uri(&self) -> Result<String, PreviewError> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

pub struct Previewer {
    rasterizer: Box<dyn PageRasterizer>,
}

impl Previewer {
    pub fn new(rasterizer: impl PageRasterizer + 'static) -> Self {
        Self {
            rasterizer: Box::new(rasterizer),
        }
    }

    /// Renders the first page of the document at `path` and squashes it to
    /// exactly [THUMBNAIL_WIDTH] x [THUMBNAIL_HEIGHT]. The source file is
    /// only read.
    pub fn thumbnail(&self, path: &Path) -> Result<Thumbnail, PreviewError> {
        let start = Instant::now();

        let page = self.rasterizer.rasterize(path, PREVIEW_PAGE)?;

        let image = image::imageops::resize(
            &page,
            THUMBNAIL_WIDTH,
            THUMBNAIL_HEIGHT,
            FilterType::CatmullRom,
        );

        debug!(
            "Rendered {} ({}x{}) in {}ms",
            path.display(),
            page.width(),
            page.height(),
            start.elapsed().as_millis()
        );

        Ok(Thumbnail { image })
    }
}

impl std::fmt::Debug for Previewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Previewer").finish_non_exhaustive()
    }
}
