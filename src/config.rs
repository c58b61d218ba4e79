use crate::error::HubError;
use clap::Parser;
use serde::Deserialize;
use std::{fs, io, path::Path};

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    #[arg(short, long, default_value = "config.json")]
    pub config_path: String,

    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    #[arg(short, long, default_value = "3030")]
    pub port: u16,

    #[arg(short, long, default_value = "INFO")]
    pub log_level: tracing::Level,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The page title shown in the browser tab
    pub title: String,

    /// Directory holding the `class_<N>_materials` directories.
    pub materials_root: String,

    /// Photo shown at the top of the sidebar.
    pub sidebar_image: String,

    /// Markdown file with the sidebar profile. The built in profile is used
    /// when unset.
    pub profile: Option<String>,

    pub download_log: String,

    pub suggestion_log: String,

    /// Quote log fields that contain commas, quotes or line breaks.
    /// Off by default so the files stay byte compatible with older logs.
    pub quote_fields: bool,

    /// Location of the PDFium shared library.
    pub pdfium_library: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Learning Hub".to_string(),
            materials_root: ".".to_string(),
            sidebar_image: "mritunjay.png".to_string(),
            profile: None,
            download_log: "download_logs.csv".to_string(),
            suggestion_log: "suggestions.csv".to_string(),
            quote_fields: false,
            pdfium_library: None,
        }
    }
}

impl Config {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, HubError> {
        let config = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&config)?)
    }

    /// Like [Config::read], but a missing file yields the defaults.
    pub fn read_or_default(path: impl AsRef<Path>) -> Result<Self, HubError> {
        match Self::read(path) {
            Err(HubError::IO(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            result => result,
        }
    }
}
