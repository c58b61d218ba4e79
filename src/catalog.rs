//! Maps a class and material selection onto the fixed on-disk layout
//! `<root>/class_<N>_materials/<type>/*.pdf`.

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::HubError;

/// Suffix a file must carry to be listed. Matched case-sensitively.
pub const PDF_SUFFIX: &str = ".pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLevel {
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "11")]
    Eleven,
    #[serde(rename = "12")]
    Twelve,
}

impl ClassLevel {
    pub const ALL: [ClassLevel; 4] = [Self::Nine, Self::Ten, Self::Eleven, Self::Twelve];

    pub fn directory(self) -> &'static str {
        match self {
            Self::Nine => "class_9_materials",
            Self::Ten => "class_10_materials",
            Self::Eleven => "class_11_materials",
            Self::Twelve => "class_12_materials",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Nine => "Class 9",
            Self::Ten => "Class 10",
            Self::Eleven => "Class 11",
            Self::Twelve => "Class 12",
        }
    }

    /// Value used in form fields and download URLs.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Eleven => "11",
            Self::Twelve => "12",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Notes,
    Assignments,
    Books,
}

impl MaterialType {
    pub const ALL: [MaterialType; 3] = [Self::Notes, Self::Assignments, Self::Books];

    pub fn directory(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Assignments => "assignments",
            Self::Books => "books",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Notes => "Notes",
            Self::Assignments => "Assignments",
            Self::Books => "Books",
        }
    }

    pub fn slug(self) -> &'static str {
        self.directory()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialRequest {
    pub class: ClassLevel,
    pub material: MaterialType,
}

impl MaterialRequest {
    pub fn new(class: ClassLevel, material: MaterialType) -> Self {
        Self { class, material }
    }

    pub fn relative_dir(&self) -> PathBuf {
        Path::new(self.class.directory()).join(self.material.directory())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// File name with extension
    pub file_name: String,

    pub file_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, request: &MaterialRequest) -> PathBuf {
        self.root.join(request.relative_dir())
    }

    /// Lists the PDFs for the request in directory listing order.
    ///
    /// A missing directory and a directory without PDFs both produce an
    /// empty listing.
    pub fn list(&self, request: &MaterialRequest) -> Result<Vec<CatalogEntry>, HubError> {
        let dir = self.resolve(request);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist", dir.display());
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        let mut pdfs = vec![];

        for entry in entries.filter_map(Result::ok) {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };

            if !file_name.ends_with(PDF_SUFFIX) {
                continue;
            }

            let file_path = entry.path();
            if file_path.is_dir() {
                continue;
            }

            pdfs.push(CatalogEntry {
                file_name,
                file_path,
            });
        }

        debug!("Found {} PDFs in {}", pdfs.len(), dir.display());

        Ok(pdfs)
    }

    /// Finds a single listed file, refusing anything that could escape the
    /// resolved directory.
    pub fn locate(
        &self,
        request: &MaterialRequest,
        file_name: &str,
    ) -> Result<Option<PathBuf>, HubError> {
        if file_name.contains(['/', '\\']) || matches!(file_name, "." | "..") {
            return Ok(None);
        }

        Ok(self
            .list(request)?
            .into_iter()
            .find(|entry| entry.file_name == file_name)
            .map(|entry| entry.file_path))
    }
}
