use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::{
    config::{Config, StartArgs},
    preview::{PdfiumRasterizer, Previewer},
    state::Hub,
};

pub mod catalog;
pub mod config;
pub mod error;
pub mod page;
pub mod preview;
pub mod records;
pub mod router;
pub mod state;
pub mod student;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let StartArgs {
        config_path,
        address: host,
        port,
        log_level: level,
    } = StartArgs::parse();

    tracing_subscriber::fmt().with_max_level(level).init();

    let addr = format!("{host}:{port}");

    let config = Config::read_or_default(&config_path).expect("invalid config file");

    let library = config
        .pdfium_library
        .clone()
        .or_else(|| std::env::var("PDFIUM_LIB_PATH").ok())
        .map(PathBuf::from);

    let previewer = Previewer::new(PdfiumRasterizer::new(library));

    let hub = Hub::new(config, previewer).expect("unable to set up pages");

    info!(
        "Serving materials from {}, logging to {} and {}",
        hub.catalog.root().display(),
        hub.downloads.path().display(),
        hub.suggestions.path().display()
    );

    info!("Now listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("error while starting TCP listener");

    axum::serve(listener, router::router(hub))
        .await
        .expect("error while starting server");
}
