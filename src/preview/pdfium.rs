//! PDFium backed page rasterizer.
//!
//! `Pdfium` is not shareable across threads, so the library is bound on
//! demand for every render instead of being kept in the application state.
//! Dropping a `Pdfium` tears down the library for the whole process, so a
//! session (bind, load, render, drop) never overlaps with another one.

use image::RgbImage;
use pdfium_render::prelude::*;
use std::{
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tracing::debug;

use super::{PageRasterizer, PreviewError};

#[cfg(target_os = "windows")]
const LIBRARY_NAME: &str = "pdfium.dll";

#[cfg(target_os = "macos")]
const LIBRARY_NAME: &str = "libpdfium.dylib";

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LIBRARY_NAME: &str = "libpdfium.so";

static LIBRARY_SESSION: Mutex<()> = Mutex::new(());

/// Runs `f` while no other PDFium session is alive in this process.
pub fn exclusive_session<T>(f: impl FnOnce() -> T) -> T {
    let _guard = LIBRARY_SESSION
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f()
}

#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    /// Explicit library location, tried before the search paths.
    library: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(library: Option<PathBuf>) -> Self {
        Self { library }
    }

    fn bind(&self) -> Result<Pdfium, PreviewError> {
        for path in self.search_paths() {
            if !path.exists() {
                continue;
            }

            match Pdfium::bind_to_library(&path) {
                Ok(bindings) => return Ok(Pdfium::new(bindings)),
                Err(e) => debug!("Unable to bind {}: {e:?}", path.display()),
            }
        }

        Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| PreviewError::Library(format!("{e:?}")))
    }

    fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![];

        if let Some(library) = &self.library {
            paths.push(library.clone());
        }

        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join("lib").join(LIBRARY_NAME));
            paths.push(cwd.join(LIBRARY_NAME));
        }

        if let Ok(exe) = std::env::current_exe() {
            if let Some(parent) = exe.parent() {
                paths.push(parent.join(LIBRARY_NAME));
            }
        }

        paths
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, path: &Path, page: u16) -> Result<RgbImage, PreviewError> {
        exclusive_session(|| self.render_page(path, page))
    }
}

impl PdfiumRasterizer {
    fn render_page(&self, path: &Path, page: u16) -> Result<RgbImage, PreviewError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| PreviewError::decode(path, format!("{e:?}")))?;

        let page = document
            .pages()
            .get(page)
            .map_err(|e| PreviewError::decode(path, format!("{e:?}")))?;

        // One pixel per point, the page's own size
        let width = (page.width().value.round() as i32).max(1);
        let height = (page.height().value.round() as i32).max(1);

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PreviewError::decode(path, format!("{e:?}")))?;

        Ok(bitmap.as_image().to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    #[test]
    fn configured_library_is_tried_first() {
        let rasterizer = PdfiumRasterizer::new(Some(PathBuf::from("/opt/pdfium/libpdfium.so")));
        let paths = rasterizer.search_paths();
        assert_eq!(PathBuf::from("/opt/pdfium/libpdfium.so"), paths[0]);
        assert!(paths[1..].iter().all(|p| p.ends_with(LIBRARY_NAME)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        match PdfiumRasterizer::default().rasterize(&path, 0) {
            // No shared library on this machine, nothing to decode with
            Err(PreviewError::Library(_)) => return,
            Err(PreviewError::Decode { path: failed, .. }) => {
                assert_eq!(path.display().to_string(), failed)
            }
            other => panic!("expected a decode error, got {other:?}"),
        }

        assert_eq!(b"this is not a pdf", &std::fs::read(&path).unwrap()[..]);
    }

    #[test]
    fn sessions_never_overlap() {
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..4 {
                        exclusive_session(|| {
                            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(2));
                            active.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                });
            }
        });

        assert_eq!(1, peak.load(Ordering::SeqCst));
    }
}
