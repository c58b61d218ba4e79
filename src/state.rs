use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, CatalogEntry, MaterialRequest},
    config::Config,
    error::HubError,
    page::{MaterialCard, PageView, Pages, DEFAULT_PROFILE},
    preview::Previewer,
    records::RecordLog,
    student::{StudentRecord, SuggestionRecord},
};

#[derive(Debug, Clone)]
pub struct Hub {
    pub pages: Arc<Pages>,

    pub catalog: Catalog,

    pub previewer: Arc<Previewer>,

    pub downloads: Arc<RecordLog>,

    pub suggestions: Arc<RecordLog>,

    pub sidebar_image: PathBuf,
}

impl Hub {
    pub fn new(config: Config, previewer: Previewer) -> Result<Self, HubError> {
        let Config {
            title,
            materials_root,
            sidebar_image,
            profile,
            download_log,
            suggestion_log,
            quote_fields,
            ..
        } = config;

        let profile = match profile {
            Some(path) => fs::read_to_string(path)?,
            None => DEFAULT_PROFILE.to_string(),
        };

        Ok(Self {
            pages: Arc::new(Pages::new(title, &profile)?),
            catalog: Catalog::new(materials_root),
            previewer: Arc::new(previewer),
            downloads: Arc::new(RecordLog::new(
                download_log,
                &StudentRecord::HEADER,
                quote_fields,
            )),
            suggestions: Arc::new(RecordLog::new(
                suggestion_log,
                &SuggestionRecord::HEADER,
                quote_fields,
            )),
            sidebar_image: PathBuf::from(sidebar_image),
        })
    }

    pub fn render(&self, view: &PageView) -> Result<String, HubError> {
        self.pages.render(view)
    }

    /// Lists the request's PDFs and renders a thumbnail for each, one after
    /// the other on a blocking thread. A file that fails to render keeps its
    /// card, just without a thumbnail.
    pub async fn material_cards(
        &self,
        request: MaterialRequest,
    ) -> Result<Vec<MaterialCard>, HubError> {
        let entries = self.catalog.list(&request)?;

        if entries.is_empty() {
            info!(
                "No materials in {}",
                self.catalog.resolve(&request).display()
            );
            return Ok(vec![]);
        }

        let previewer = self.previewer.clone();

        let cards = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let total = entries.len();

            let cards = entries
                .into_iter()
                .map(|entry| preview_card(&previewer, &request, entry))
                .collect::<Vec<_>>();

            debug!(
                "Rendered {total} previews in {}ms",
                start.elapsed().as_millis()
            );

            cards
        })
        .await?;

        Ok(cards)
    }
}

fn preview_card(
    previewer: &Previewer,
    request: &MaterialRequest,
    entry: CatalogEntry,
) -> MaterialCard {
    let CatalogEntry {
        file_name,
        file_path,
    } = entry;

    let thumbnail = match render_data_uri(previewer, &file_path) {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!("Skipping preview of {}: {e}", file_path.display());
            None
        }
    };

    MaterialCard::new(request, file_name, thumbnail)
}

fn render_data_uri(previewer: &Previewer, path: &Path) -> Result<String, HubError> {
    Ok(previewer.thumbnail(path)?.data_uri()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{ClassLevel, MaterialType},
        preview::{exclusive_session, tests::FakeRasterizer, PageRasterizer, PreviewError},
    };
    use image::RgbImage;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    /// Holds the library session like the PDFium rasterizer does and
    /// records how many renders were in flight at once.
    #[derive(Debug, Default)]
    struct SessionCounter {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl PageRasterizer for Arc<SessionCounter> {
        fn rasterize(&self, _path: &Path, _page: u16) -> Result<RgbImage, PreviewError> {
            exclusive_session(|| {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                self.calls.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                self.active.fetch_sub(1, Ordering::SeqCst);
                Ok(RgbImage::new(612, 792))
            })
        }
    }

    fn hub_with(root: &Path, previewer: Previewer) -> Hub {
        let config = Config {
            materials_root: root.display().to_string(),
            download_log: root.join("download_logs.csv").display().to_string(),
            suggestion_log: root.join("suggestions.csv").display().to_string(),
            ..Default::default()
        };
        Hub::new(config, previewer).unwrap()
    }

    fn hub(root: &Path) -> Hub {
        hub_with(root, Previewer::new(FakeRasterizer::new(612, 792)))
    }

    #[tokio::test]
    async fn one_broken_file_does_not_stop_the_batch() {
        let root = tempfile::tempdir().unwrap();
        let hub = hub(root.path());
        let request = MaterialRequest::new(ClassLevel::Twelve, MaterialType::Books);

        let dir = hub.catalog.resolve(&request);
        fs::create_dir_all(&dir).unwrap();
        for name in ["algebra.pdf", "broken.pdf", "optics.pdf"] {
            fs::write(dir.join(name), b"%PDF-1.4").unwrap();
        }

        let mut cards = hub.material_cards(request).await.unwrap();
        cards.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        assert_eq!(3, cards.len());
        assert!(cards[0].thumbnail.is_some());
        assert!(cards[1].thumbnail.is_none());
        assert!(cards[2].thumbnail.is_some());
        assert_eq!("/materials/12/books/broken.pdf", cards[1].download_url);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_requests_render_one_at_a_time() {
        let root = tempfile::tempdir().unwrap();
        let counter = Arc::new(SessionCounter::default());
        let hub = hub_with(root.path(), Previewer::new(counter.clone()));

        let request = MaterialRequest::new(ClassLevel::Ten, MaterialType::Notes);
        let dir = hub.catalog.resolve(&request);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..4 {
            fs::write(dir.join(format!("chapter{i}.pdf")), b"%PDF-1.4").unwrap();
        }

        let mut tasks = vec![];
        for _ in 0..6 {
            let hub = hub.clone();
            tasks.push(tokio::spawn(async move {
                hub.material_cards(request).await.unwrap()
            }));
        }

        for task in tasks {
            let cards = task.await.unwrap();
            assert_eq!(4, cards.len());
            assert!(cards.iter().all(|card| card.thumbnail.is_some()));
        }

        assert_eq!(24, counter.calls.load(Ordering::SeqCst));
        assert_eq!(1, counter.peak.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn no_directory_no_cards() {
        let root = tempfile::tempdir().unwrap();
        let hub = hub(root.path());
        let request = MaterialRequest::new(ClassLevel::Nine, MaterialType::Notes);

        assert!(hub.material_cards(request).await.unwrap().is_empty());
    }

    #[test]
    fn custom_profile_is_read() {
        let root = tempfile::tempdir().unwrap();
        let profile = root.path().join("profile.md");
        fs::write(&profile, "# Ms. Rao\n\nPhysics teacher").unwrap();

        let config = Config {
            profile: Some(profile.display().to_string()),
            ..Default::default()
        };
        let hub = Hub::new(config, Previewer::new(FakeRasterizer::new(1, 1))).unwrap();

        let html = hub.render(&PageView::default()).unwrap();
        assert!(html.contains("<h1>Ms. Rao</h1>"));
    }

    #[test]
    fn missing_profile_is_an_error() {
        let config = Config {
            profile: Some("/definitely/not/here.md".to_string()),
            ..Default::default()
        };
        let result = Hub::new(config, Previewer::new(FakeRasterizer::new(1, 1)));
        assert!(matches!(result, Err(HubError::IO(_))));
    }
}
